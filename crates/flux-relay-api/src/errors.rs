//! Error types for the HTTP service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use flux_relay_core::{AlertError, NotifierError};
use tracing::{error, warn};

use crate::responses::ErrorResponse;

/// Webhook handler errors with HTTP status code mapping
///
/// Every per-request failure ends here and is turned into a response; none
/// of them propagate to the transport layer.
///
/// | Variant | Status | Body |
/// |---------|--------|------|
/// | `Unauthorized` | 401 | `{"error":"Unauthorized"}` |
/// | `InvalidJson` | 400 | `{"error":"Invalid JSON"}` |
/// | `UpstreamFailed` | 500 | `{"error":"Failed to send to Pushover","details":...}` |
///
/// # Security Considerations
///
/// The presented credential is never logged or echoed. Upstream details are
/// limited to what the provider returned, or a URL-free transport error.
#[derive(Debug, thiserror::Error)]
pub enum WebhookHandlerError {
    /// Missing or incorrect `Authorization: Bearer` header
    #[error("Unauthorized")]
    Unauthorized,

    /// Body is not a non-empty JSON object of the expected shape
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] AlertError),

    /// Pushover did not accept the notification
    #[error("Failed to send to Pushover: {0}")]
    UpstreamFailed(#[from] NotifierError),
}

impl WebhookHandlerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebhookHandlerError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            Self::Unauthorized => {
                warn!("Rejected webhook with missing or invalid bearer token");
                ErrorResponse::new("Unauthorized")
            }
            Self::InvalidJson(ref e) => {
                warn!(error = %e, "Rejected webhook with invalid payload");
                ErrorResponse::new("Invalid JSON")
            }
            Self::UpstreamFailed(ref e) => {
                error!(
                    error = %e,
                    timeout = e.is_timeout(),
                    "Failed to relay alert to Pushover"
                );
                ErrorResponse::with_details("Failed to send to Pushover", e.details())
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Service-level errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("Server failed: {message}")]
    ServerFailed { message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

impl ServiceError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::BindFailed { .. } => 1,
            Self::ServerFailed { .. } => 2,
            Self::Configuration(_) => 3,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration loading failed: {0}")]
    Loading(#[from] config::ConfigError),
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
