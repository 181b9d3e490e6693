//! Caller-facing error taxonomy.

use thiserror::Error;

/// Boxed underlying cause carried by every terminal error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// HTTP status reported for an exhausted retry budget.
pub const SERVICE_UNAVAILABLE: u16 = 503;

/// Terminal outcome of a retried remote call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The remote answered with a status in `[100, 500)`. Never retried.
    #[error("API Error: {source}")]
    Client {
        status: u16,
        #[source]
        source: BoxError,
    },

    /// Every permitted attempt failed with a retryable condition.
    #[error("API call failed after {attempts} retries: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: BoxError,
    },
}

impl ApiError {
    pub fn client(status: u16, source: impl Into<BoxError>) -> Self {
        Self::Client {
            status,
            source: source.into(),
        }
    }

    pub fn exhausted(attempts: u32, source: impl Into<BoxError>) -> Self {
        Self::Exhausted {
            attempts,
            source: source.into(),
        }
    }

    /// Status a boundary should report for this error.
    ///
    /// `Exhausted` is always 503, whatever the last attempt returned.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Client { status, .. } => *status,
            ApiError::Exhausted { .. } => SERVICE_UNAVAILABLE,
        }
    }

    /// Message of the underlying cause, without the taxonomy prefix.
    pub fn cause_message(&self) -> String {
        match self {
            ApiError::Client { source, .. } | ApiError::Exhausted { source, .. } => {
                source.to_string()
            }
        }
    }

    pub fn is_client(&self) -> bool {
        matches!(self, ApiError::Client { .. })
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, ApiError::Exhausted { .. })
    }
}

/// Result type for retried remote calls.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_reports_service_unavailable() {
        let err = ApiError::exhausted(3, "Bad Gateway");
        assert_eq!(err.status_code(), 503);
        assert!(err.is_exhausted());
        assert_eq!(err.to_string(), "API call failed after 3 retries: Bad Gateway");
    }

    #[test]
    fn test_client_keeps_original_status() {
        let err = ApiError::client(409, "Conflict");
        assert_eq!(err.status_code(), 409);
        assert!(err.is_client());
        assert!(err.to_string().starts_with("API Error"));
        assert_eq!(err.cause_message(), "Conflict");
    }
}
