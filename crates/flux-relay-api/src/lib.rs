//! # Flux-Relay HTTP Service
//!
//! HTTP server that receives FluxCD notification-controller alerts and
//! relays them to Pushover.
//!
//! | Method | Path | Behaviour |
//! |--------|------|-----------|
//! | `GET` | `/` | `400` with usage hint |
//! | `GET` | `/health` | `200 healthy`, unconditionally |
//! | `POST` | `/webhook` | Authenticate, parse, format, deliver |

pub mod config;
pub mod errors;
pub mod responses;

pub use config::{LoggingConfig, PushoverConfig, ServerConfig, ServiceConfig};
pub use errors::{ConfigError, ServiceError, WebhookHandlerError};
pub use responses::{ErrorResponse, RelayResponse};

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use flux_relay_core::{Credentials, FluxAlert, Notification, Notifier};
use std::{
    future::{Future, IntoFuture},
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Duration,
};
use tokio::sync::oneshot;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultOnFailure, TraceLayer};
use tracing::{error, info, instrument, warn, Level};

/// Body returned for requests to `/`.
pub const ROOT_HINT: &str = "Requests need to be made to /webhook";

/// Body returned by `/health`.
pub const HEALTHY: &str = "healthy";

const CORRELATION_HEADER: &str = "x-correlation-id";

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
///
/// Read-only after startup; handlers share it without locking.
#[derive(Clone)]
pub struct AppState {
    /// Pushover secrets, also used to authenticate callers
    pub credentials: Arc<Credentials>,

    /// Outbound delivery
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(credentials: Arc<Credentials>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            credentials,
            notifier,
        }
    }
}

// ============================================================================
// HTTP Server
// ============================================================================

/// Create HTTP router with all endpoints
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health_check))
        .route("/webhook", post(handle_webhook))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .on_failure(DefaultOnFailure::new().level(Level::DEBUG)),
                )
                .layer(middleware::from_fn(request_logging_middleware))
                .layer(DefaultBodyLimit::max(server.max_body_size))
                .into_inner(),
        )
        .with_state(state)
}

/// Start HTTP server
///
/// Binds `server.host:server.port` and serves until SIGINT or SIGTERM, then
/// gives in-flight requests `server.shutdown_timeout_seconds` to finish.
pub async fn start_server(config: ServiceConfig, state: AppState) -> Result<(), ServiceError> {
    let app = create_router(state, &config.server);

    let host = config.server.host.parse::<IpAddr>().map_err(|e| {
        ServiceError::Configuration(ConfigError::Invalid {
            message: format!("server.host '{}' is not an IP address: {}", config.server.host, e),
        })
    })?;
    let addr = SocketAddr::new(host, config.server.port);

    let listener =
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServiceError::BindFailed {
                address: addr.to_string(),
                message: e.to_string(),
            })?;

    info!("Starting HTTP server on {}", addr);

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
    let (signalled_tx, signalled_rx) = oneshot::channel();

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!(
                "Draining in-flight requests for up to {}s",
                shutdown_timeout.as_secs()
            );
            let _ = signalled_tx.send(());
        })
        .into_future();

    drain_with_deadline(server, signalled_rx, shutdown_timeout).await?;

    info!("HTTP server shutdown complete");
    Ok(())
}

/// Drive `server` to completion, allowing at most `deadline` after
/// `signalled` fires for in-flight requests to finish.
async fn drain_with_deadline<F, E>(
    server: F,
    mut signalled: oneshot::Receiver<()>,
    deadline: Duration,
) -> Result<(), ServiceError>
where
    F: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    tokio::pin!(server);

    let server_failed = |e: E| ServiceError::ServerFailed {
        message: e.to_string(),
    };

    tokio::select! {
        result = &mut server => return result.map_err(server_failed),
        Ok(()) = &mut signalled => {}
    }

    match tokio::time::timeout(deadline, server).await {
        Ok(result) => result.map_err(server_failed),
        Err(_) => {
            warn!(
                deadline_seconds = deadline.as_secs(),
                "Graceful shutdown deadline expired with requests still in flight"
            );
            Err(ServiceError::ServerFailed {
                message: format!(
                    "graceful shutdown did not complete within {}s",
                    deadline.as_secs()
                ),
            })
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Guidance for requests that hit the root path
async fn handle_root() -> (StatusCode, &'static str) {
    (StatusCode::BAD_REQUEST, ROOT_HINT)
}

/// Liveness probe; performs no dependency checks
async fn handle_health_check() -> &'static str {
    HEALTHY
}

/// Relay a FluxCD alert to Pushover
///
/// 1. Verify `Authorization: Bearer <token>` (before the body is looked at)
/// 2. Parse the body as a non-empty JSON object
/// 3. Render the notification text, filling defaults for absent fields
/// 4. Make one delivery attempt; no retries
#[instrument(skip_all)]
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RelayResponse>, WebhookHandlerError> {
    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    if !state.credentials.authorizes(authorization) {
        return Err(WebhookHandlerError::Unauthorized);
    }

    let alert = FluxAlert::from_slice(&body)?;

    info!(
        severity = alert.severity(),
        reason = alert.reason(),
        controller = alert.controller(),
        kind = alert.object_kind(),
        name = alert.object_name(),
        "Received FluxCD alert"
    );

    let notification = Notification::from_alert(&alert);
    state.notifier.send(&notification).await?;

    info!("Relayed alert to Pushover");
    Ok(Json(RelayResponse::ok()))
}

// ============================================================================
// Middleware
// ============================================================================

/// Request logging middleware with correlation ID tracking
///
/// Reuses an inbound `x-correlation-id` or generates one, records it on the
/// span, and echoes it on the response.
#[instrument(skip(request, next), fields(
    method = %request.method(),
    uri = %request.uri(),
    correlation_id
))]
async fn request_logging_middleware(
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let correlation_id = request
        .headers()
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    tracing::Span::current().record("correlation_id", correlation_id.as_str());

    let mut response = next.run(request).await;
    let duration = start.elapsed();

    if let Ok(header_value) = correlation_id.parse() {
        response
            .headers_mut()
            .insert(CORRELATION_HEADER, header_value);
    }

    let status = response.status();
    // The handler logs the cause of a 5xx at error level.
    if status.is_server_error() {
        warn!(
            correlation_id = %correlation_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = duration.as_millis() as u64,
            "Request failed"
        );
    } else if status.is_client_error() {
        warn!(
            correlation_id = %correlation_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = duration.as_millis() as u64,
            "Request rejected"
        );
    } else {
        info!(
            correlation_id = %correlation_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = duration.as_millis() as u64,
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
