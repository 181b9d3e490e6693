//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Resource operation:
//!     → retries.rs (run the attempt, classify the failure)
//!     → On retryable failure: fixed delay, same closure again
//!     → On client failure or spent budget: errors.rs (ApiError)
//! ```
//!
//! # Design Decisions
//! - Fixed delay between attempts, no backoff growth and no jitter
//! - Any status below 500 is final; everything else is retried
//! - Policy is plain configuration handed to the executor at construction

pub mod errors;
pub mod retries;

pub use errors::{ApiError, ApiResult, BoxError};
pub use retries::{classify, ClassifiedFailure, HasStatus, RetryExecutor, RetryPolicy};
