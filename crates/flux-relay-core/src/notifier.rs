//! Outbound notification seam.

use async_trait::async_trait;

use crate::alert::FluxAlert;
use crate::message::format_message;

/// Title attached to every relayed notification.
pub const NOTIFICATION_TITLE: &str = "FluxCD";

/// A rendered notification, ready to hand to a [`Notifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn from_alert(alert: &FluxAlert) -> Self {
        Self {
            title: NOTIFICATION_TITLE.to_string(),
            message: format_message(alert),
        }
    }
}

/// Delivery failures.
///
/// Every variant is surfaced to the webhook caller as a `500` whose `details`
/// field is [`NotifierError::details`].
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    /// The provider answered with something other than `200 OK`.
    #[error("Notification provider returned HTTP {status}")]
    Rejected { status: u16, body: String },

    /// The connect or read timeout elapsed.
    #[error("Notification provider did not respond in time: {message}")]
    Timeout { message: String },

    /// Connection, TLS or protocol failure.
    #[error("Failed to reach notification provider: {message}")]
    Transport { message: String },

    /// The HTTP client could not be constructed.
    #[error("Notifier configuration is invalid: {message}")]
    Configuration { message: String },
}

impl NotifierError {
    /// Text echoed back to the webhook caller.
    ///
    /// For a rejection this is the provider's response body verbatim; for all
    /// other failures it is the error description.
    pub fn details(&self) -> String {
        match self {
            Self::Rejected { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Interface for delivering notifications to a push provider.
///
/// One call is one delivery attempt. Implementations must not retry.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifierError>;
}
