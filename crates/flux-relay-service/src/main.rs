//! # Flux-Relay Service
//!
//! Binary entry point for the FluxCD → Pushover relay.
//!
//! This executable:
//! - Loads non-secret configuration from files and `RELAY__*` variables
//! - Initializes logging
//! - Loads the Pushover credentials, refusing to start without them
//! - Starts the HTTP server from flux-relay-api
//!
//! Exit codes: `3` configuration error (always before any listener is bound),
//! `1` bind failure, `2` server failure.

use anyhow::Context;
use flux_relay_api::{start_server, AppState, LoggingConfig, ServiceConfig};
use flux_relay_core::{Credentials, PushoverClient, PushoverClientConfig};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CONFIG_EXIT_CODE: i32 = 3;
const FALLBACK_LOG_LEVEL: &str = "info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging settings come from the same sources as everything else, so the
    // configuration is read before the subscriber exists and its error (if
    // any) is reported right after.
    let loaded = ServiceConfig::load();
    let logging = loaded
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    init_tracing(&logging)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Flux-Relay Service");

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration; aborting");
            std::process::exit(CONFIG_EXIT_CODE);
        }
    };

    if let Err(e) = config.validate() {
        error!(error = %e, "Service configuration is invalid; aborting");
        std::process::exit(CONFIG_EXIT_CODE);
    }

    let credentials = match Credentials::from_env() {
        Ok(credentials) => Arc::new(credentials),
        Err(e) => {
            error!(error = %e, "Refusing to start");
            std::process::exit(CONFIG_EXIT_CODE);
        }
    };

    let notifier = match PushoverClient::new(
        PushoverClientConfig::from(&config.pushover),
        credentials.clone(),
    ) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!(error = %e, "Failed to build Pushover client; aborting");
            std::process::exit(CONFIG_EXIT_CODE);
        }
    };

    info!(
        host = %config.server.host,
        port = config.server.port,
        pushover_url = %config.pushover.api_url,
        connect_timeout_seconds = config.pushover.connect_timeout_seconds,
        read_timeout_seconds = config.pushover.read_timeout_seconds,
        "Starting HTTP server"
    );

    let state = AppState::new(credentials, notifier);
    if let Err(e) = start_server(config, state).await {
        error!("Failed to start server: {}", e);
        std::process::exit(e.exit_code());
    }

    Ok(())
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `logging.level`. A malformed
/// `logging.level` falls back to `info` here and is rejected by
/// [`ServiceConfig::validate`] once logging is up.
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_LOG_LEVEL));

    let (json_layer, text_layer) = if logging.json_format {
        (Some(fmt::layer().json()), None)
    } else {
        (None, Some(fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .context("failed to install tracing subscriber")
}
