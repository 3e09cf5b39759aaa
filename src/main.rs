use std::sync::Arc;

use tokio::sync::broadcast;

use polywatch::api::router::create_router;
use polywatch::api::ws_types::WsMessage;
use polywatch::config::AppConfig;
use polywatch::db::{self, MemoryStore, PgStore, TradeStore};
use polywatch::ingestion::pipeline::TradePipeline;
use polywatch::polymarket::{DataClient, MarketFeed};
use polywatch::services::dispatcher::AlertDispatcher;
use polywatch::services::ledger::Ledger;
use polywatch::services::trade_poller::Poller;
use polywatch::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let metrics_handle = polywatch::metrics::init_metrics()?;
    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    let store: Arc<dyn TradeStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let pool = db::init_pool(url).await?;
            tracing::info!("Database connected");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, wallets and trades are kept in memory only");
            // Trades are only needed for the rapid-accumulation window.
            let store = config
                .detection
                .rapid_window()
                .map(MemoryStore::with_retention)
                .unwrap_or_default();
            Arc::new(store)
        }
    };

    let http = reqwest::Client::new();
    let feed: Arc<dyn MarketFeed> = Arc::new(DataClient::with_base_url(
        http.clone(),
        config.data_api_base.clone(),
    ));

    // --- Live alert broadcast for WebSocket subscribers ---
    let (ws_tx, _) = broadcast::channel::<WsMessage>(256);

    let dispatcher = Arc::new(AlertDispatcher::from_config(&config, http, ws_tx.clone()));
    let pipeline = TradePipeline::new(
        Ledger::new(store.clone()),
        feed.clone(),
        dispatcher,
        config.detection.clone(),
    );
    let poller = Arc::new(Poller::new(feed, pipeline, config.poller.clone()));

    tracing::info!(
        large_bet_threshold = %config.detection.large_bet_threshold,
        new_wallet_age_days = %config.detection.new_wallet_age_days,
        rapid_accumulation_hours = %config.detection.rapid_accumulation_hours,
        rapid_accumulation_threshold = %config.detection.rapid_accumulation_threshold,
        concentrated_bet_threshold = %config.detection.concentrated_bet_threshold,
        "Detection thresholds loaded"
    );
    poller.start();

    let state = AppState {
        store,
        config,
        poller: poller.clone(),
        ws_tx,
        metrics_handle: Some(metrics_handle),
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received");
            poller.stop();
        })
        .await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();
}
