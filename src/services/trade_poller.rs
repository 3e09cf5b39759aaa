use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::config::PollerConfig;
use crate::ingestion::pipeline::TradePipeline;
use crate::models::Trade;
use crate::polymarket::{DataClientError, MarketFeed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollerState {
    Stopped,
    Running,
}

/// Failures that abandon a whole cycle. The watermark is left untouched.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("trade feed unavailable: {0}")]
    Feed(#[from] DataClientError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    pub new_trades: usize,
    pub alerts: usize,
    pub watermark: DateTime<Utc>,
}

/// Polls the trade feed and drives every new trade through the pipeline.
///
/// Flow per cycle:
/// 1. Fetch the most recent trades (bounded batch)
/// 2. Keep trades strictly newer than the watermark, oldest first
/// 3. Ingest them one at a time
/// 4. Advance the watermark to the newest trade seen
///
/// Stop is cooperative: it is observed between cycles, and neither an
/// in-flight cycle nor the inter-cycle sleep is interrupted.
pub struct Poller {
    feed: Arc<dyn MarketFeed>,
    pipeline: TradePipeline,
    config: PollerConfig,
    // Serializes cycles. Held for a whole cycle, never by readers.
    cycle_lock: Mutex<()>,
    // Read at cycle start, written at cycle end.
    watermark: Mutex<DateTime<Utc>>,
    running: AtomicBool,
    // Bumped on every start so a loop left over from a previous run exits.
    generation: AtomicU64,
}

impl Poller {
    /// The watermark starts at the current time: only trades after startup
    /// are processed.
    pub fn new(feed: Arc<dyn MarketFeed>, pipeline: TradePipeline, config: PollerConfig) -> Self {
        Self::with_watermark(feed, pipeline, config, Utc::now())
    }

    pub fn with_watermark(
        feed: Arc<dyn MarketFeed>,
        pipeline: TradePipeline,
        config: PollerConfig,
        watermark: DateTime<Utc>,
    ) -> Self {
        Self {
            feed,
            pipeline,
            config,
            cycle_lock: Mutex::new(()),
            watermark: Mutex::new(watermark),
            running: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> PollerState {
        if self.running.load(Ordering::SeqCst) {
            PollerState::Running
        } else {
            PollerState::Stopped
        }
    }

    pub async fn watermark(&self) -> DateTime<Utc> {
        *self.watermark.lock().await
    }

    /// Transition to RUNNING and spawn the cycle loop. Logs and returns
    /// `None` when already running.
    pub fn start(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!("Trade poller is already running");
            return None;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(
            interval_secs = self.config.poll_interval.as_secs_f64(),
            fetch_limit = self.config.fetch_limit,
            "Trade poller started"
        );

        let poller = Arc::clone(self);
        Some(tokio::spawn(async move { poller.run_loop(generation).await }))
    }

    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            tracing::info!("Stopping trade poller");
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.running.load(Ordering::SeqCst) && self.generation.load(Ordering::SeqCst) == generation
    }

    async fn run_loop(self: Arc<Self>, generation: u64) {
        while self.is_current(generation) {
            match self.run_cycle().await {
                Ok(outcome) => {
                    if outcome.new_trades > 0 {
                        tracing::info!(
                            new_trades = outcome.new_trades,
                            alerts = outcome.alerts,
                            watermark = %outcome.watermark,
                            "Poll cycle complete"
                        );
                    }
                }
                Err(e) => {
                    counter!("poll_cycle_failures_total").increment(1);
                    tracing::error!(error = %e, "Poll cycle failed, retrying from same watermark");
                }
            }

            sleep(self.config.poll_interval).await;
        }

        tracing::info!("Trade poller stopped");
    }

    /// Run exactly one cycle. Concurrent calls run one after another; the
    /// watermark stays readable throughout.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, CycleError> {
        let _cycle = self.cycle_lock.lock().await;
        counter!("poll_cycles_total").increment(1);

        let since = self.watermark().await;
        tracing::debug!(watermark = %since, "Checking for new trades");
        let trades = self.feed.fetch_recent_trades(self.config.fetch_limit).await?;
        let fresh = select_new_trades(trades, since);

        tracing::info!(count = fresh.len(), "Found new trades");

        let mut alerts = 0;
        for trade in &fresh {
            alerts += self.pipeline.process_trade(trade).await.len();
        }

        let mut watermark = self.watermark.lock().await;
        if let Some(latest) = fresh.iter().map(|t| t.timestamp).max() {
            if latest > *watermark {
                *watermark = latest;
                gauge!("watermark_seconds").set(latest.timestamp() as f64);
            }
        }

        Ok(CycleOutcome {
            new_trades: fresh.len(),
            alerts,
            watermark: *watermark,
        })
    }
}

/// Trades strictly newer than `watermark`, in ascending occurrence order.
pub fn select_new_trades(trades: Vec<Trade>, watermark: DateTime<Utc>) -> Vec<Trade> {
    let mut fresh: Vec<Trade> = trades
        .into_iter()
        .filter(|t| t.timestamp > watermark)
        .collect();
    fresh.sort_by_key(|t| t.timestamp);
    fresh
}
