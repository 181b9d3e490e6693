//! Error responses.
//!
//! # Responsibilities
//! - Map the client error taxonomy to HTTP status codes
//! - Render a uniform JSON error body
//!
//! # Design Decisions
//! - Client errors keep the upstream status; exhausted retries are always 503
//! - A success response with an unusable body is reported as 502
//! - Local validation failures are 400 and never reach the upstream

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resilience::ApiError;

/// Error returned by a route handler.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid request body")]
    Validation(Vec<String>),
}

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub message: String,
    pub status_code: u16,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Api(e) => match StatusCode::from_u16(e.status_code()) {
                Ok(status) if status.is_client_error() || status.is_server_error() => status,
                // Upstream answered, but not with anything usable.
                _ => StatusCode::BAD_GATEWAY,
            },
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn body(&self) -> ErrorBody {
        let status = self.status();
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        match self {
            AppError::Api(e) => ErrorBody {
                message: match e {
                    ApiError::Exhausted { attempts, .. } => {
                        format!("{} (after {} attempts)", e, attempts)
                    }
                    ApiError::Client { .. } => e.to_string(),
                },
                status_code: status.as_u16(),
                timestamp,
                original_error: Some(e.cause_message()),
                attempts: match e {
                    ApiError::Exhausted { attempts, .. } => Some(*attempts),
                    ApiError::Client { .. } => None,
                },
                errors: Vec::new(),
            },
            AppError::Validation(errors) => ErrorBody {
                message: self.to_string(),
                status_code: status.as_u16(),
                timestamp,
                original_error: None,
                attempts: None,
                errors: errors.clone(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Api(e) if status.is_server_error() => {
                tracing::error!(status = status.as_u16(), error = %e, "Upstream call failed")
            }
            _ => tracing::debug!(status = status.as_u16(), error = %self, "Request rejected"),
        }
        (status, Json(self.body())).into_response()
    }
}
