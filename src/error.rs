// src/error.rs
use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::message::ErrorResponse;

/// Failures reported by the upstream generation API.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("upstream overloaded (status: {status}): {message}")]
    Overloaded { status: u16, message: String },

    #[error("upstream rejected credentials (status: {status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("API request failed (status: {status}): {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    /// Only an overload is transient; everything else fails on first sight.
    pub fn is_overloaded(&self) -> bool {
        matches!(self, Self::Overloaded { .. })
    }
}

/// Terminal outcome of the retry loop.
#[derive(Debug, Clone, Error)]
pub enum RetryError {
    #[error("non-retryable upstream failure after {attempts} attempt(s): {source}")]
    Fatal {
        attempts: u32,
        #[source]
        source: GenerationError,
    },

    #[error("upstream still overloaded after {attempts} attempt(s): {last}")]
    Exhausted { attempts: u32, last: GenerationError },
}

impl RetryError {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Fatal { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Upstream(#[from] RetryError),

    #[error("no upstream reply within {0:?}")]
    DeadlineExceeded(Duration),
}

pub const MISSING_MESSAGE: &str = "Message is required in the request body.";
pub const INVALID_BODY: &str =
    "Request body must be a JSON object with a string message.";
pub const MISSING_API_KEY: &str = "API key not configured on the server.";
pub const UPSTREAM_FAILED: &str = "Failed to get response from AI due to a non-retryable error.";
pub const UPSTREAM_UNAVAILABLE: &str =
    "The AI service is temporarily unavailable. Please try again in a moment.";
pub const UPSTREAM_TIMED_OUT: &str =
    "The AI service took too long to respond. Please try again in a moment.";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Details stay in the log; clients only ever see the fixed strings.
        let (status, message) = match &self {
            Self::Validation(msg) => {
                tracing::debug!(reason = %msg, "rejected chat request");
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Self::Configuration(detail) => {
                tracing::error!(detail = %detail, "chat service misconfigured");
                (StatusCode::INTERNAL_SERVER_ERROR, MISSING_API_KEY.to_string())
            }
            Self::Upstream(err @ RetryError::Fatal { .. }) => {
                tracing::error!(attempts = err.attempts(), error = %err, "upstream call failed");
                (StatusCode::INTERNAL_SERVER_ERROR, UPSTREAM_FAILED.to_string())
            }
            Self::Upstream(err @ RetryError::Exhausted { .. }) => {
                tracing::error!(attempts = err.attempts(), error = %err, "upstream retries exhausted");
                (StatusCode::SERVICE_UNAVAILABLE, UPSTREAM_UNAVAILABLE.to_string())
            }
            Self::DeadlineExceeded(limit) => {
                tracing::error!(deadline = ?limit, "upstream call exceeded request deadline");
                (StatusCode::GATEWAY_TIMEOUT, UPSTREAM_TIMED_OUT.to_string())
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
