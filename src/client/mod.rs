//! Upstream resource client.
//!
//! # Data Flow
//! ```text
//! caller
//!     → resource.rs (typed list/get/create/delete for one resource kind)
//!     → resilience::RetryExecutor (one closure per operation)
//!     → transport.rs (one HTTP request per attempt)
//!     → upstream API
//! ```
//!
//! # Design Decisions
//! - One generic operation set, instantiated for users, parcs and bookings
//! - Retry policy and transport are injected, never looked up globally
//! - Transport is a trait object so tests can script attempts

pub mod resource;
pub mod transport;
pub mod types;

use std::sync::Arc;

pub use resource::ResourceClient;
pub use transport::{
    ClientBuildError, HttpTransport, Transport, TransportError, TransportRequest, UpstreamResponse,
};
pub use types::{
    Booking, CreateBooking, CreateParc, CreateUser, FieldError, ListEnvelope, Parc, Resource, User,
    Validate,
};

use crate::config::UpstreamConfig;
use crate::resilience::{RetryExecutor, RetryPolicy};

/// Client for every resource kind exposed by the upstream API.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    users: ResourceClient<User>,
    parcs: ResourceClient<Parc>,
    bookings: ResourceClient<Booking>,
    policy: RetryPolicy,
}

impl ApiClient {
    /// Build a client over HTTP from resolved configuration.
    pub fn new(upstream: &UpstreamConfig, policy: RetryPolicy) -> Result<Self, ClientBuildError> {
        let transport = HttpTransport::new(upstream)?;
        tracing::info!(
            base_url = %transport.base_url(),
            timeout_ms = upstream.timeout_ms,
            max_attempts = policy.max_attempts,
            delay_ms = policy.delay_ms,
            "Upstream client initialized"
        );
        Ok(Self::with_transport(Arc::new(transport), policy))
    }

    /// Build a client over any transport.
    pub fn with_transport(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        let executor = RetryExecutor::new(policy);
        Self {
            users: ResourceClient::new(transport.clone(), executor.clone()),
            parcs: ResourceClient::new(transport.clone(), executor.clone()),
            bookings: ResourceClient::new(transport, executor),
            policy,
        }
    }

    pub fn users(&self) -> &ResourceClient<User> {
        &self.users
    }

    pub fn parcs(&self) -> &ResourceClient<Parc> {
        &self.parcs
    }

    pub fn bookings(&self) -> &ResourceClient<Booking> {
        &self.bookings
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}
