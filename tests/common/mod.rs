use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use polywatch::config::{DetectionConfig, PollerConfig};
use polywatch::db::{MemoryStore, StoreError, TradeStore};
use polywatch::ingestion::pipeline::TradePipeline;
use polywatch::models::{Alert, Position, Side, Trade, Wallet};
use polywatch::polymarket::{DataClientError, MarketFeed};
use polywatch::services::dispatcher::AlertDispatcher;
use polywatch::services::ledger::Ledger;
use polywatch::services::notifier::{AlertChannel, ChannelError};

/// Feed that replays scripted trade batches, one per fetch. An empty script
/// returns an empty batch.
#[derive(Default)]
pub struct ScriptedFeed {
    batches: Mutex<VecDeque<Result<Vec<Trade>, String>>>,
    positions: Mutex<HashMap<String, Vec<Position>>>,
    positions_delay: Mutex<Option<std::time::Duration>>,
    pub fetches: Mutex<usize>,
}

#[allow(dead_code)]
impl ScriptedFeed {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_batch(&self, trades: Vec<Trade>) {
        self.batches.lock().unwrap().push_back(Ok(trades));
    }

    pub fn push_failure(&self, reason: &str) {
        self.batches.lock().unwrap().push_back(Err(reason.to_string()));
    }

    pub fn set_positions(&self, wallet: &str, positions: Vec<Position>) {
        self.positions
            .lock()
            .unwrap()
            .insert(wallet.to_string(), positions);
    }

    /// Make every positions fetch take `delay`.
    pub fn set_positions_delay(&self, delay: std::time::Duration) {
        *self.positions_delay.lock().unwrap() = Some(delay);
    }

    pub fn fetch_count(&self) -> usize {
        *self.fetches.lock().unwrap()
    }
}

#[async_trait]
impl MarketFeed for ScriptedFeed {
    async fn fetch_recent_trades(&self, _limit: usize) -> Result<Vec<Trade>, DataClientError> {
        *self.fetches.lock().unwrap() += 1;
        match self.batches.lock().unwrap().pop_front() {
            Some(Ok(trades)) => Ok(trades),
            Some(Err(reason)) => Err(DataClientError::Unexpected(reason)),
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_wallet_positions(&self, address: &str) -> Result<Vec<Position>, DataClientError> {
        let delay = *self.positions_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .positions
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .unwrap_or_default())
    }
}

/// Channel that records every alert it is asked to deliver.
pub struct RecordingChannel {
    name: &'static str,
    fail: bool,
    pub received: Mutex<Vec<Alert>>,
}

#[allow(dead_code)]
impl RecordingChannel {
    pub fn ok(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail: false,
            received: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail: true,
            received: Mutex::new(Vec::new()),
        })
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertChannel for RecordingChannel {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn send(&self, _message: &str, alert: &Alert) -> Result<(), ChannelError> {
        self.received.lock().unwrap().push(alert.clone());
        if self.fail {
            return Err(ChannelError::Rejected { status: 502 });
        }
        Ok(())
    }
}

/// Store whose every call fails.
#[allow(dead_code)]
pub struct FailingStore;

#[async_trait]
impl TradeStore for FailingStore {
    async fn find_wallet(&self, _address: &str) -> Result<Option<Wallet>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn insert_wallet(&self, _wallet: &Wallet) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn insert_trade(&self, _trade: &Trade) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn find_trades_since(
        &self,
        _address: &str,
        _since: DateTime<Utc>,
    ) -> Result<Vec<Trade>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

#[allow(dead_code)]
pub fn test_detection_config() -> DetectionConfig {
    DetectionConfig {
        large_bet_threshold: Decimal::from(500),
        new_wallet_age_days: Decimal::from(7),
        rapid_accumulation_hours: Decimal::from(24),
        rapid_accumulation_threshold: Decimal::from(50_000),
        concentrated_bet_threshold: Decimal::new(5, 1),
    }
}

#[allow(dead_code)]
pub fn test_poller_config() -> PollerConfig {
    PollerConfig {
        poll_interval: std::time::Duration::from_millis(10),
        fetch_limit: 500,
    }
}

#[allow(dead_code)]
pub fn make_trade(wallet: &str, size: i64, price: Decimal, at: DateTime<Utc>) -> Trade {
    Trade {
        wallet: wallet.into(),
        side: Side::Buy,
        size: Decimal::from(size),
        price,
        market_title: "Will the Fed cut rates?".into(),
        market_slug: "will-the-fed-cut-rates".into(),
        condition_id: "0xcondition".into(),
        outcome: "Yes".into(),
        timestamp: at,
        transaction_hash: Some(format!("0x{wallet}-{}-{size}", at.timestamp_millis())),
    }
}

/// Pipeline over a memory store with a single recording channel.
#[allow(dead_code)]
pub fn build_pipeline(
    store: Arc<dyn TradeStore>,
    feed: Arc<ScriptedFeed>,
    channel: Arc<RecordingChannel>,
    config: DetectionConfig,
) -> TradePipeline {
    let channels: Vec<Arc<dyn AlertChannel>> = vec![channel];
    let dispatcher = Arc::new(AlertDispatcher::new(channels, None));
    TradePipeline::new(Ledger::new(store), feed, dispatcher, config)
}

#[allow(dead_code)]
pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}
