pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod ingestion;
pub mod intelligence;
pub mod metrics;
pub mod models;
pub mod polymarket;
pub mod services;

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::api::ws_types::WsMessage;
use crate::config::AppConfig;
use crate::db::TradeStore;
use crate::services::trade_poller::Poller;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TradeStore>,
    pub config: AppConfig,
    pub poller: Arc<Poller>,
    pub ws_tx: broadcast::Sender<WsMessage>,
    pub metrics_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
}
