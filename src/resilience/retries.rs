//! Retry logic.
//!
//! # Responsibilities
//! - Classify a failed attempt as final (status below 500) or retryable
//! - Re-run the same operation after a fixed delay while budget remains
//! - Translate the terminal outcome into [`ApiError`]
//!
//! # Design Decisions
//! - Explicit bounded loop with a mutable attempt counter
//! - Attempts never overlap; the delay is an `.await` point
//! - Non-idempotent operations are retried too; callers opt in by passing them

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::resilience::errors::{ApiError, ApiResult};

/// A failure that may carry the HTTP status of a received response.
pub trait HasStatus {
    /// Status of the response, or `None` when no response was received.
    fn status_code(&self) -> Option<u16>;
}

/// Retry policy applied to every call made through a [`RetryExecutor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_attempts: u32,

    /// Fixed wait between attempts in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 1000,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay_ms: u64) -> Self {
        Self {
            max_attempts,
            delay_ms,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Upper bound on invocations of a single operation.
    pub fn max_invocations(&self) -> u32 {
        self.max_attempts.saturating_add(1)
    }
}

/// A failed attempt seen through the retry policy.
#[derive(Debug)]
pub enum ClassifiedFailure<E> {
    /// Response received with a status in `[100, 500)`.
    ClientError { status: u16, cause: E },
    /// No response at all, or a status of 500 and above.
    Retryable(E),
}

/// Classify a failure. Computed fresh for every failed attempt.
pub fn classify<E: HasStatus>(failure: E) -> ClassifiedFailure<E> {
    match failure.status_code() {
        Some(status) if (100..500).contains(&status) => ClassifiedFailure::ClientError {
            status,
            cause: failure,
        },
        _ => ClassifiedFailure::Retryable(failure),
    }
}

/// Runs remote operations under a [`RetryPolicy`].
///
/// Holds no mutable state; one executor can serve any number of concurrent
/// calls, each with its own attempt counter.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute `operation` until it succeeds, fails with a client status, or
    /// the retry budget is spent.
    ///
    /// The closure is invoked at most `max_attempts + 1` times, strictly one
    /// after another.
    pub async fn execute<T, E, F, Fut>(&self, mut operation: F) -> ApiResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: HasStatus + std::error::Error + Send + Sync + 'static,
    {
        let mut attempt: u32 = 1;

        loop {
            let failure = match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            match classify(failure) {
                ClassifiedFailure::ClientError { status, cause } => {
                    tracing::debug!(attempt, status, error = %cause, "Client error, not retrying");
                    return Err(ApiError::client(status, cause));
                }
                ClassifiedFailure::Retryable(cause) if attempt <= self.policy.max_attempts => {
                    tracing::warn!(
                        attempt,
                        delay_ms = self.policy.delay_ms,
                        error = %cause,
                        "Attempt failed, retrying"
                    );
                    tokio::time::sleep(self.policy.delay()).await;
                    attempt += 1;
                }
                ClassifiedFailure::Retryable(cause) => {
                    tracing::error!(
                        attempts = attempt,
                        retries = self.policy.max_attempts,
                        error = %cause,
                        "Retry budget exhausted"
                    );
                    return Err(ApiError::exhausted(self.policy.max_attempts, cause));
                }
            }
        }
    }
}
