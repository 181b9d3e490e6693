//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the resource routes
//! - Wire up middleware (request ID, tracing, timeout, CORS, body limit)
//! - Bind server to listener
//! - Stop accepting on shutdown and drain in-flight requests

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::client::{ApiClient, ClientBuildError};
use crate::config::GatewayConfig;
use crate::http::handlers::{health, resource_routes};
use crate::http::request::{propagate_request_id_layer, request_span, set_request_id_layer};

/// CORS for the configured origins. `"*"` allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::POST, Method::DELETE])
        .allow_headers(Any);

    if origins.iter().any(|origin| origin == "*") {
        layer.allow_origin(Any)
    } else {
        let origins = origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect::<Vec<_>>();
        layer.allow_origin(origins)
    }
}

/// HTTP gateway exposing the upstream resources.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a server around an existing client.
    pub fn new(config: GatewayConfig, client: ApiClient) -> Self {
        let router = Self::build_router(&config, &client);
        Self { router, config }
    }

    /// Create a server and its HTTP client from configuration.
    pub fn from_config(config: GatewayConfig) -> Result<Self, ClientBuildError> {
        let client = ApiClient::new(&config.upstream, config.retries)?;
        Ok(Self::new(config, client))
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, client: &ApiClient) -> Router {
        // The deadline spans every retry of the upstream call.
        let middleware = ServiceBuilder::new()
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(propagate_request_id_layer())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::GATEWAY_TIMEOUT,
                Duration::from_secs(config.listener.request_timeout_secs),
            ));

        Router::new()
            .route("/health", get(health))
            .merge(resource_routes(client.users().clone()))
            .merge(resource_routes(client.parcs().clone()))
            .merge(resource_routes(client.bookings().clone()))
            .layer(DefaultBodyLimit::max(config.listener.max_body_bytes))
            .layer(cors_layer(&config.listener.cors_allow_origins))
            .layer(middleware)
    }

    /// The fully layered router, for serving without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
