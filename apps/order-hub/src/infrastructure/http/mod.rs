//! HTTP Surface
//!
//! The service's public HTTP endpoints, served by axum with permissive
//! CORS.
//!
//! # Endpoints
//!
//! - `GET /health` - liveness check, `{"health":"OK"}`
//! - `GET /stats` - statistics report over the current snapshot
//! - `POST /` - trigger one sync cycle (the webhook ping target)
//! - `GET /ws` - upgrade to a WebSocket that receives refresh notices

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use crate::application::services::sync::SyncService;
use crate::domain::stats;
use crate::infrastructure::notify::{NotificationHub, RefreshNotice};
use crate::infrastructure::snapshot::SnapshotStore;

/// How long one WebSocket write may take before the subscriber is dropped.
const WS_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Wire form of a refresh notice: a content-free JSON object.
const NOTICE_PAYLOAD: &str = "{}";

// =============================================================================
// State
// =============================================================================

/// Shared state behind the HTTP handlers.
pub struct ApiState {
    snapshot: Arc<SnapshotStore>,
    hub: Arc<NotificationHub>,
    sync: Arc<SyncService>,
}

impl ApiState {
    /// Create new handler state.
    #[must_use]
    pub fn new(
        snapshot: Arc<SnapshotStore>,
        hub: Arc<NotificationHub>,
        sync: Arc<SyncService>,
    ) -> Self {
        Self {
            snapshot,
            hub,
            sync,
        }
    }
}

/// Build the service router.
#[must_use]
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/", post(trigger_sync_handler))
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// Server
// =============================================================================

/// HTTP server wrapper with graceful shutdown.
pub struct ApiServer {
    port: u16,
    state: Arc<ApiState>,
    cancel: CancellationToken,
}

impl ApiServer {
    /// Create a new server.
    #[must_use]
    pub const fn new(port: u16, state: Arc<ApiState>, cancel: CancellationToken) -> Self {
        Self {
            port,
            state,
            cancel,
        }
    }

    /// Run the server until cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError`] if binding fails or the HTTP server
    /// encounters a fatal error while running.
    pub async fn run(self) -> Result<(), ApiServerError> {
        let app = router(self.state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ApiServerError::BindFailed(self.port, e.to_string()))?;

        tracing::info!(port = self.port, "HTTP server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| ApiServerError::ServerFailed(e.to_string()))?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// HTTP server error.
#[derive(Debug, thiserror::Error)]
pub enum ApiServerError {
    /// Binding the listen port failed.
    #[error("failed to bind HTTP server to port {0}: {1}")]
    BindFailed(u16, String),
    /// The server failed while running.
    #[error("HTTP server failed: {0}")]
    ServerFailed(String),
}

// =============================================================================
// Handlers
// =============================================================================

/// Liveness response.
#[derive(Debug, Clone, Serialize)]
struct HealthResponse {
    health: &'static str,
}

/// Error payload returned instead of a partial result.
#[derive(Debug, Clone, Serialize)]
struct ErrorResponse {
    error: String,
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse { health: "OK" })
}

async fn stats_handler(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    // One read; the report is computed over a single consistent snapshot
    // even if a refresh lands mid-computation.
    let snapshot = state.snapshot.read();
    Json(stats::aggregate(&snapshot, Utc::now()))
}

async fn trigger_sync_handler(State(state): State<Arc<ApiState>>) -> Response {
    match state.sync.run_cycle().await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "sync cycle failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn ws_handler(
    State(state): State<Arc<ApiState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let notices = state.hub.subscribe();
    ws.on_upgrade(move |socket| subscriber_loop(socket, notices))
}

/// Forward refresh notices to one subscriber until it goes away.
///
/// A failed or timed-out write drops this subscriber only; peers each run
/// their own copy of this loop on their own receiver.
async fn subscriber_loop(mut socket: WebSocket, mut notices: broadcast::Receiver<RefreshNotice>) {
    tracing::info!("websocket subscriber connected");

    loop {
        tokio::select! {
            notice = notices.recv() => match notice {
                Ok(RefreshNotice) => {
                    let write = tokio::time::timeout(
                        WS_WRITE_TIMEOUT,
                        socket.send(Message::Text(NOTICE_PAYLOAD.into())),
                    );
                    match write.await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => {
                            tracing::info!(error = %e, "websocket write failed, dropping subscriber");
                            break;
                        }
                        Err(_) => {
                            tracing::info!("websocket write timed out, dropping subscriber");
                            break;
                        }
                    }
                }
                // Notices are content-free, so missed ones collapse into the
                // next delivery.
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::debug!(missed, "subscriber lagged behind refresh notices");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            inbound = socket.recv() => match inbound {
                // Inbound frames are ignored; reading them keeps close
                // detection prompt.
                Some(Ok(_)) => {}
                Some(Err(_)) | None => {
                    tracing::info!("websocket subscriber disconnected");
                    break;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_payload_is_an_empty_json_object() {
        let value: serde_json::Value = serde_json::from_str(NOTICE_PAYLOAD).unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[test]
    fn health_response_shape() {
        let json = serde_json::to_value(HealthResponse { health: "OK" }).unwrap();
        assert_eq!(json, serde_json::json!({"health": "OK"}));
    }
}
