//! FluxCD alert payload.
//!
//! The notification-controller posts events in the shape below. Every field is
//! optional: an absent (or `null`) field is replaced by a fixed default when
//! read through the accessor methods, so field extraction itself never fails.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity used when the alert does not carry one.
pub const DEFAULT_SEVERITY: &str = "INFO";

/// Message used when the alert does not carry one.
pub const DEFAULT_MESSAGE: &str = "No Message";

/// Placeholder for any other missing text field.
pub const UNKNOWN: &str = "Unknown";

/// Errors raised while turning a request body into a [`FluxAlert`].
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    /// The body is not syntactically valid JSON, or a known field has the
    /// wrong JSON type.
    #[error("Alert payload is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The body parsed to an empty value (`null`, `{}`, `[]`, `""`, `0`, `false`).
    #[error("Alert payload is empty")]
    Empty,

    /// The body parsed to a non-empty value that is not a JSON object.
    #[error("Alert payload must be a JSON object, got {kind}")]
    NotAnObject { kind: &'static str },
}

/// An alert emitted by the FluxCD notification-controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FluxAlert {
    pub severity: Option<String>,
    pub message: Option<String>,
    pub reason: Option<String>,
    pub reporting_controller: Option<String>,
    pub reporting_instance: Option<String>,
    pub timestamp: Option<String>,
    pub metadata: Option<AlertMetadata>,
    pub involved_object: Option<InvolvedObject>,
}

/// The `metadata` block of an alert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertMetadata {
    pub revision: Option<String>,
    pub summary: Option<String>,
}

/// The Kubernetes object the alert is about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvolvedObject {
    pub kind: Option<String>,
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub api_version: Option<String>,
}

impl FluxAlert {
    /// Parse a raw request body.
    ///
    /// # Errors
    ///
    /// - [`AlertError::Malformed`] for invalid JSON or mistyped known fields
    /// - [`AlertError::Empty`] when the body parses to an empty value
    /// - [`AlertError::NotAnObject`] for arrays, strings, numbers and `true`
    pub fn from_slice(body: &[u8]) -> Result<Self, AlertError> {
        let value: Value = serde_json::from_slice(body)?;

        if is_empty_value(&value) {
            return Err(AlertError::Empty);
        }

        if !value.is_object() {
            return Err(AlertError::NotAnObject {
                kind: json_kind(&value),
            });
        }

        Ok(serde_json::from_value(value)?)
    }

    pub fn severity(&self) -> &str {
        self.severity.as_deref().unwrap_or(DEFAULT_SEVERITY)
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or(DEFAULT_MESSAGE)
    }

    pub fn reason(&self) -> &str {
        self.reason.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn controller(&self) -> &str {
        self.reporting_controller.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn revision(&self) -> &str {
        self.metadata
            .as_ref()
            .and_then(|m| m.revision.as_deref())
            .unwrap_or(UNKNOWN)
    }

    pub fn object_kind(&self) -> &str {
        self.involved_object
            .as_ref()
            .and_then(|o| o.kind.as_deref())
            .unwrap_or(UNKNOWN)
    }

    pub fn object_name(&self) -> &str {
        self.involved_object
            .as_ref()
            .and_then(|o| o.name.as_deref())
            .unwrap_or(UNKNOWN)
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "alert_tests.rs"]
mod tests;
