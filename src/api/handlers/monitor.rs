use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::AppState;

/// GET /api/monitor/status: Poller state and watermark.
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let watermark = state.poller.watermark().await;
    Json(json!({
        "state": state.poller.state(),
        "watermark": watermark,
    }))
}

/// POST /api/monitor/start: Start polling. No-op when already running.
pub async fn start(State(state): State<AppState>) -> impl IntoResponse {
    let started = state.poller.start().is_some();
    if started {
        tracing::info!("Trade poller STARTED via control API");
    }
    (
        StatusCode::OK,
        Json(json!({ "state": state.poller.state(), "started": started })),
    )
}

/// POST /api/monitor/stop: Stop polling after the in-flight cycle.
pub async fn stop(State(state): State<AppState>) -> impl IntoResponse {
    state.poller.stop();
    tracing::warn!("Trade poller STOPPED via control API");
    (StatusCode::OK, Json(json!({ "state": state.poller.state() })))
}
