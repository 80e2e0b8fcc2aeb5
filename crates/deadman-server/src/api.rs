//! HTTP ingest surface: webhook intake and liveness probe.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use deadman::{STATUS_FIRING, WatchRegistry, WebhookMessage};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Shared state for the ingest handlers.
#[derive(Clone)]
pub struct AppState {
    /// Heartbeat registry, shared with the sweeper
    pub registry: Arc<WatchRegistry>,

    /// Grace period applied to every upserted alert
    pub expire_duration: Duration,
}

/// Build the ingest router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping_handler))
        .route("/webhook", post(webhook_handler))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Handler for the liveness probe. No registry interaction.
async fn ping_handler() -> &'static str {
    "pong"
}

/// Handler for webhook ingest.
///
/// The body is parsed by hand so a schema mismatch maps to the fixed
/// rejection shape instead of axum's default rejection, and so nothing
/// touches the registry before the whole batch has been validated.
async fn webhook_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let message: WebhookMessage = match serde_json::from_slice(&body) {
        Ok(message) => message,
        Err(e) => {
            debug!(error = %e, "Webhook payload format invalid, skipping event");
            return reject("payload-format-error");
        }
    };

    // Only firing webhooks are applied; any other batch status is
    // rejected wholesale.
    if message.status != STATUS_FIRING {
        debug!(status = %message.status, "Webhook status is not firing, skipping event");
        return reject("webhook-not-firing");
    }

    for alert in message.alerts {
        state.registry.upsert(alert, state.expire_duration);
    }

    (StatusCode::OK, Json(json!({"status": "ok"}))).into_response()
}

fn reject(reason: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"status": "error", "reason": reason})),
    )
        .into_response()
}
