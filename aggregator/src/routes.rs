//! Aggregator HTTP surface: detection intake, listing and health.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use relay_core::{model::EXCHANGE_PATH, DetectionEvent};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::inbound::InboundQueue;
use crate::store::PersistenceClient;

/// Shared state injected into every handler via `State`.
#[derive(Clone)]
pub struct AppState {
    pub inbound: InboundQueue,
    pub store: Arc<dyn PersistenceClient>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(EXCHANGE_PATH, post(receive_detection))
        .route("/detections", get(list_detections))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// POST /a — one detection event from an edge relay.
async fn receive_detection(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let event: DetectionEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "cannot decode detection event");
            return (StatusCode::BAD_REQUEST, "malformed detection event");
        }
    };

    match state.inbound.submit(event).await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            error!(error = %e, "cannot queue detection");
            (StatusCode::SERVICE_UNAVAILABLE, "persistence unavailable")
        }
    }
}

/// GET /detections — every stored detection as a JSON array.
async fn list_detections(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.list().await {
        Ok(rows) => Ok(Json(rows)),
        Err(e) => {
            error!(error = %e, "cannot list detections");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}
