//! Pushover delivery over HTTPS.
//!
//! Sends a single form-encoded `POST` to the Pushover messages endpoint per
//! notification. Only an exact `200 OK` counts as delivered; any other status,
//! a timeout, or a transport failure is reported as a [`NotifierError`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::credentials::Credentials;
use crate::notifier::{Notification, Notifier, NotifierError};

/// Pushover messages endpoint.
pub const PUSHOVER_API_URL: &str = "https://api.pushover.net/1/messages.json";

/// Configuration for [`PushoverClient`].
///
/// # Examples
///
/// ```
/// use flux_relay_core::PushoverClientConfig;
/// use std::time::Duration;
///
/// let config = PushoverClientConfig::default()
///     .with_connect_timeout(Duration::from_secs(5))
///     .with_read_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct PushoverClientConfig {
    /// Messages endpoint
    pub api_url: String,
    /// Time allowed to establish the connection
    pub connect_timeout: Duration,
    /// Time allowed between reads once connected
    pub read_timeout: Duration,
}

impl Default for PushoverClientConfig {
    fn default() -> Self {
        Self {
            api_url: PUSHOVER_API_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(10),
        }
    }
}

impl PushoverClientConfig {
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

/// Form body accepted by the Pushover messages API.
#[derive(Serialize)]
struct MessageForm<'a> {
    token: &'a str,
    user: &'a str,
    message: &'a str,
    title: &'a str,
}

/// [`Notifier`] backed by the Pushover messages API.
pub struct PushoverClient {
    http: reqwest::Client,
    config: PushoverClientConfig,
    credentials: Arc<Credentials>,
}

impl PushoverClient {
    /// Build a client with the given timeouts and credentials.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError::Configuration`] if the TLS backend cannot be
    /// initialised.
    pub fn new(
        config: PushoverClientConfig,
        credentials: Arc<Credentials>,
    ) -> Result<Self, NotifierError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .user_agent(concat!("flux-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NotifierError::Configuration {
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            config,
            credentials,
        })
    }

    pub fn config(&self) -> &PushoverClientConfig {
        &self.config
    }
}

impl std::fmt::Debug for PushoverClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushoverClient")
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .finish()
    }
}

#[async_trait]
impl Notifier for PushoverClient {
    #[instrument(skip_all, fields(api_url = %self.config.api_url))]
    async fn send(&self, notification: &Notification) -> Result<(), NotifierError> {
        let form = MessageForm {
            token: self.credentials.api_token(),
            user: self.credentials.user_key(),
            message: &notification.message,
            title: &notification.title,
        };

        let response = self
            .http
            .post(&self.config.api_url)
            .form(&form)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(error = %e.without_url(), "Could not read Pushover error body");
                    String::new()
                }
            };
            warn!(status = status.as_u16(), "Pushover rejected notification");
            return Err(NotifierError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Pushover accepted notification");
        Ok(())
    }
}

/// Map a reqwest failure onto [`NotifierError`], stripping the URL from the
/// description.
fn classify_transport_error(error: reqwest::Error) -> NotifierError {
    let timed_out = error.is_timeout();
    let message = error.without_url().to_string();

    if timed_out {
        NotifierError::Timeout { message }
    } else {
        NotifierError::Transport { message }
    }
}

#[cfg(test)]
#[path = "pushover_tests.rs"]
mod tests;
