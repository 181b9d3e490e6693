//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (retries, upstream requests, server lifecycle)
//!     → logging.rs (subscriber: env filter + fmt layer)
//!
//! Consumers:
//!     → stdout, human-readable or JSON
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event, never formatted-in values
//! - Request ID flows through the HTTP layer into every span
//! - RUST_LOG wins over the configured level

pub mod logging;

pub use logging::init_logging;
