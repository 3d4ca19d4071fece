//! Config receiver: accepts tracked-species lists pushed by the aggregator.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use relay_core::{model::EXCHANGE_PATH, TrackedSpecies};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::filter::SpeciesUpdater;

pub fn router(updater: SpeciesUpdater) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(EXCHANGE_PATH, post(receive_species))
        .layer(TraceLayer::new_for_http())
        .with_state(updater)
}

/// POST /a — body is a JSON array of species names.
async fn receive_species(State(updater): State<SpeciesUpdater>, body: Bytes) -> impl IntoResponse {
    match serde_json::from_slice::<TrackedSpecies>(&body) {
        Ok(list) => {
            updater.replace(list);
            (StatusCode::OK, "species list updated")
        }
        Err(e) => {
            warn!(error = %e, "cannot decode species list");
            (StatusCode::BAD_REQUEST, "expected a JSON array of species names")
        }
    }
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}
