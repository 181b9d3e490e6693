//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use serde_json::{json, Value};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use resource_gateway::client::ApiClient;
use resource_gateway::config::{GatewayConfig, UpstreamConfig};
use resource_gateway::http::HttpServer;
use resource_gateway::lifecycle::Shutdown;
use resource_gateway::RetryPolicy;

/// Three retries with a short delay so tests stay fast.
pub fn fast_policy() -> RetryPolicy {
    RetryPolicy::new(3, 10)
}

pub fn upstream_config(base_url: &str) -> UpstreamConfig {
    UpstreamConfig {
        base_url: base_url.to_string(),
        timeout_ms: 2000,
    }
}

pub fn client_for(server: &MockServer, policy: RetryPolicy) -> ApiClient {
    ApiClient::new(&upstream_config(&server.uri()), policy).unwrap()
}

/// Address nothing listens on; connecting to it is refused.
pub fn refused_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Number of requests the mock upstream has seen.
pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap_or_default().len()
}

/// Respond with `status` to every matching request.
pub async fn mock_status(server: &MockServer, verb: &str, route: &str, status: u16) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Respond with `status` to every matching request, with a JSON body.
pub async fn mock_json(server: &MockServer, verb: &str, route: &str, status: u16, body: Value) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Respond with `status` and a plain text body to every matching request.
pub async fn mock_text(server: &MockServer, verb: &str, route: &str, status: u16, body: &str) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// First `fail_count` requests get `fail_status`, later ones get `body`.
pub async fn mock_flaky(
    server: &MockServer,
    verb: &str,
    route: &str,
    fail_count: u64,
    fail_status: u16,
    success_status: u16,
    body: Value,
) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(fail_status))
        .up_to_n_times(fail_count)
        .mount(server)
        .await;

    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(success_status).set_body_json(body))
        .mount(server)
        .await;
}

/// Gateway configuration in front of `upstream_url` on an ephemeral port.
pub fn gateway_config(upstream_url: &str, policy: RetryPolicy) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.upstream = upstream_config(upstream_url);
    config.retries = policy;
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config
}

/// Start a gateway in front of `upstream_url` on an ephemeral port.
pub async fn start_gateway(upstream_url: &str, policy: RetryPolicy) -> (SocketAddr, Shutdown) {
    start_gateway_with(gateway_config(upstream_url, policy)).await
}

pub async fn start_gateway_with(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::from_config(config).unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub fn user_json(id: &str, name: &str, email: &str) -> Value {
    json!({ "id": id, "name": name, "email": email })
}

pub fn parc_json(id: &str, name: &str, description: &str) -> Value {
    json!({ "id": id, "name": name, "description": description })
}

pub fn booking_json(id: &str, date: &str, comments: &str) -> Value {
    json!({
        "id": id,
        "user": user_json("1", "John Doe", "john@example.com"),
        "parc": parc_json("1", "Test Parc", "Test Description"),
        "bookingdate": date,
        "comments": comments,
    })
}
