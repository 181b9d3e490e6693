//! Retrying gateway for an unreliable users/parcs/bookings API.

pub mod client;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use client::ApiClient;
pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resilience::{ApiError, RetryExecutor, RetryPolicy};
