use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render))
        // Wallets
        .route("/api/wallets/:address", get(handlers::wallets::detail))
        .route("/api/wallets/:address/trades", get(handlers::wallets::trades))
        // Monitor control
        .route("/api/monitor/status", get(handlers::monitor::status))
        .route("/api/monitor/start", post(handlers::monitor::start))
        .route("/api/monitor/stop", post(handlers::monitor::stop))
        // Live alert push
        .route("/ws", get(handlers::ws::handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
