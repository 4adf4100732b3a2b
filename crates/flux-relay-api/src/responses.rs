//! Response bodies for the API.

use serde::Serialize;

/// Body returned when an alert was relayed.
#[derive(Debug, Serialize)]
pub struct RelayResponse {
    pub status: &'static str,
}

impl RelayResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

/// Body returned for every webhook failure.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &'static str) -> Self {
        Self {
            error,
            details: None,
        }
    }

    pub fn with_details(error: &'static str, details: String) -> Self {
        Self {
            error,
            details: Some(details),
        }
    }
}
