//! # Flux-Relay Core
//!
//! Domain types for relaying FluxCD alerts to Pushover.
//!
//! This crate provides:
//! - [`FluxAlert`]: the inbound alert payload with explicit default substitution
//! - [`format_message`]: rendering of an alert into notification text
//! - [`Credentials`]: the Pushover secrets and bearer-token check
//! - [`Notifier`]: the outbound delivery seam, with [`PushoverClient`] as the
//!   production implementation

pub mod alert;
pub mod credentials;
pub mod message;
pub mod notifier;
pub mod pushover;

pub use alert::{AlertError, AlertMetadata, FluxAlert, InvolvedObject};
pub use credentials::{Credentials, CredentialsError};
pub use message::format_message;
pub use notifier::{Notification, Notifier, NotifierError, NOTIFICATION_TITLE};
pub use pushover::{PushoverClient, PushoverClientConfig, PUSHOVER_API_URL};
