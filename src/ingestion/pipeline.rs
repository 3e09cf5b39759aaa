use std::sync::Arc;

use chrono::Utc;
use metrics::counter;

use crate::config::DetectionConfig;
use crate::intelligence::detector;
use crate::models::{Alert, Trade};
use crate::polymarket::MarketFeed;
use crate::services::dispatcher::AlertDispatcher;
use crate::services::ledger::Ledger;

/// Per-trade ingestion: persist, evaluate every detection rule, dispatch.
pub struct TradePipeline {
    ledger: Ledger,
    feed: Arc<dyn MarketFeed>,
    dispatcher: Arc<AlertDispatcher>,
    config: DetectionConfig,
}

impl TradePipeline {
    pub fn new(
        ledger: Ledger,
        feed: Arc<dyn MarketFeed>,
        dispatcher: Arc<AlertDispatcher>,
        config: DetectionConfig,
    ) -> Self {
        Self {
            ledger,
            feed,
            dispatcher,
            config,
        }
    }

    /// Process a single trade:
    /// 1. Record it in the store
    /// 2. New/young wallet large-bet rule
    /// 3. Rapid accumulation over the trailing window
    /// 4. Concentration across the wallet's open positions
    ///
    /// Rules are independent; one trade may raise several alerts. Each alert
    /// is dispatched as soon as its rule fires. Returns the raised alerts.
    pub async fn process_trade(&self, trade: &Trade) -> Vec<Alert> {
        counter!("trades_ingested_total").increment(1);
        tracing::debug!(
            wallet = %trade.wallet,
            side = %trade.side,
            notional = %trade.notional(),
            market = %trade.market_title,
            "Ingesting trade"
        );

        self.ledger.record_trade(trade).await;

        let mut raised = Vec::new();
        let now = Utc::now();

        if detector::is_large_bet(trade, &self.config) {
            let status = self.ledger.ensure_wallet(&trade.wallet, trade).await;
            if let Some(alert) = detector::check_large_bet(trade, &status, now, &self.config) {
                self.raise(alert, &mut raised).await;
            }
        }

        match detector::rapid_window_start(now, &self.config) {
            Some(since) => {
                let recent = self.ledger.trades_since(&trade.wallet, since).await;
                if let Some(alert) =
                    detector::check_rapid_accumulation(&trade.wallet, &recent, now, &self.config)
                {
                    self.raise(alert, &mut raised).await;
                }
            }
            None => {
                tracing::warn!(
                    hours = %self.config.rapid_accumulation_hours,
                    "Rapid accumulation window out of range, skipping check"
                );
            }
        }

        match self.feed.fetch_wallet_positions(&trade.wallet).await {
            Ok(positions) => {
                if let Some(alert) =
                    detector::check_concentration(&trade.wallet, &positions, now, &self.config)
                {
                    self.raise(alert, &mut raised).await;
                }
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    wallet = %trade.wallet,
                    "Failed to fetch positions, skipping concentration check"
                );
            }
        }

        raised
    }

    async fn raise(&self, alert: Alert, raised: &mut Vec<Alert>) {
        self.dispatcher.send_alert(&alert).await;
        raised.push(alert);
    }
}
