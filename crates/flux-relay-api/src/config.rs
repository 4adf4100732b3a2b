//! Configuration types for the HTTP service
//!
//! Only non-secret settings live here. The Pushover user key and API token
//! are loaded separately through [`flux_relay_core::Credentials`] and have no
//! file or default source.

use std::time::Duration;

use flux_relay_core::{PushoverClientConfig, PUSHOVER_API_URL};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Environment variable naming an extra YAML file to load.
pub const CONFIG_FILE_VAR: &str = "FLUX_RELAY_CONFIG_FILE";

/// Prefix for environment overrides, e.g. `RELAY__SERVER__PORT=9090`.
pub const ENV_PREFIX: &str = "RELAY";

const SYSTEM_CONFIG_FILE: &str = "/etc/flux-relay/service";
const LOCAL_CONFIG_FILE: &str = "config/service";

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Outbound Pushover settings
    pub pushover: PushoverConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,

    /// Maximum request size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_seconds: 30,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Pushover client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushoverConfig {
    /// Messages endpoint
    pub api_url: String,

    /// Connect timeout in seconds
    pub connect_timeout_seconds: u64,

    /// Read timeout in seconds
    pub read_timeout_seconds: u64,
}

impl Default for PushoverConfig {
    fn default() -> Self {
        Self {
            api_url: PUSHOVER_API_URL.to_string(),
            connect_timeout_seconds: 10,
            read_timeout_seconds: 10,
        }
    }
}

impl From<&PushoverConfig> for PushoverClientConfig {
    fn from(config: &PushoverConfig) -> Self {
        PushoverClientConfig::default()
            .with_api_url(config.api_url.clone())
            .with_connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .with_read_timeout(Duration::from_secs(config.read_timeout_seconds))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the standard sources.
    ///
    /// Sources (applied in order, later sources override earlier ones):
    ///  1. `/etc/flux-relay/service.yaml`
    ///  2. `./config/service.yaml`
    ///  3. The file named by `FLUX_RELAY_CONFIG_FILE`, which must exist if set
    ///  4. Environment variables prefixed `RELAY__`
    pub fn load() -> Result<Self, ConfigError> {
        let explicit_path = std::env::var(CONFIG_FILE_VAR)
            .ok()
            .filter(|p| !p.is_empty());
        Self::load_from(explicit_path.as_deref(), None)
    }

    /// Load configuration with an optional explicit file and an optional
    /// replacement for the process environment.
    ///
    /// Passing `Some(vars)` makes the environment layer read from `vars`
    /// instead of the real environment.
    pub fn load_from(
        explicit_path: Option<&str>,
        env_vars: Option<config::Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(
                config::File::with_name(SYSTEM_CONFIG_FILE)
                    .required(false)
                    .format(config::FileFormat::Yaml),
            )
            .add_source(
                config::File::with_name(LOCAL_CONFIG_FILE)
                    .required(false)
                    .format(config::FileFormat::Yaml),
            );

        if let Some(path) = explicit_path {
            builder = builder.add_source(
                config::File::with_name(path)
                    .required(true)
                    .format(config::FileFormat::Yaml),
            );
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(env_vars),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Reject values that would leave the service unable to run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.parse::<std::net::IpAddr>().is_err() {
            return Err(ConfigError::Invalid {
                message: format!("server.host '{}' is not an IP address", self.server.host),
            });
        }

        if self.server.port == 0 {
            return Err(ConfigError::Invalid {
                message: "server.port must be non-zero".to_string(),
            });
        }

        if self.server.max_body_size == 0 {
            return Err(ConfigError::Invalid {
                message: "server.max_body_size must be non-zero".to_string(),
            });
        }

        if self.pushover.connect_timeout_seconds == 0 || self.pushover.read_timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                message: "pushover timeouts must be at least one second".to_string(),
            });
        }

        if let Err(e) = tracing_subscriber::EnvFilter::try_new(&self.logging.level) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "logging.level '{}' is not a valid filter: {}",
                    self.logging.level, e
                ),
            });
        }

        let api_url = url::Url::parse(&self.pushover.api_url).map_err(|e| ConfigError::Invalid {
            message: format!("pushover.api_url is not a valid URL: {}", e),
        })?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                message: format!(
                    "pushover.api_url must use http or https, got '{}'",
                    api_url.scheme()
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
