//! HTTP handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use pc4map::map::MapState;
use pc4map::SearchOutcome;

use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/map", get(map_handler))
        .route("/v1/reload", post(reload_handler))
        .route("/v1/search", get(search_handler).delete(clear_search_handler))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Current overlays, viewport and status messages
async fn map_handler(State(state): State<Arc<AppState>>) -> Json<MapState> {
    Json(state.map.snapshot())
}

/// Clear the bulk layer and re-run the batch plot
async fn reload_handler(
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, (StatusCode, String)> {
    if state.runner.start(true).is_some() {
        Ok(StatusCode::ACCEPTED)
    } else {
        warn!("Reload requested while a batch run is in flight");
        Err((
            StatusCode::CONFLICT,
            "A batch run is already in progress".to_string(),
        ))
    }
}

#[derive(Deserialize)]
struct SearchQueryParams {
    /// Raw user input, e.g. "3572RB"
    q: String,
}

async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQueryParams>,
) -> Json<SearchOutcome> {
    let outcome = state
        .search
        .search(&params.q, state.map.as_ref(), state.map.as_ref())
        .await;
    Json(outcome)
}

async fn clear_search_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    state.search.clear(state.map.as_ref(), state.map.as_ref());
    StatusCode::NO_CONTENT
}
