use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::db::TradeStore;
use crate::models::{Trade, Wallet};

/// Outcome of resolving a trade's wallet against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum WalletStatus {
    /// No record existed; this trade created it.
    Created,
    /// Record already present.
    Existing(Wallet),
    /// The lookup failed, so the wallet's history is unknown for this trade.
    Unavailable,
}

/// Wallet first-seen bookkeeping and trade history. Store failures are
/// logged here and never propagate: a failed write only degrades detection
/// for the trade being processed.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn TradeStore>,
}

impl Ledger {
    pub fn new(store: Arc<dyn TradeStore>) -> Self {
        Self { store }
    }

    pub async fn record_trade(&self, trade: &Trade) {
        if let Err(e) = self.store.insert_trade(trade).await {
            tracing::error!(
                error = %e,
                wallet = %trade.wallet,
                tx_hash = trade.transaction_hash.as_deref().unwrap_or("-"),
                "Failed to record trade"
            );
        }
    }

    /// Look up the wallet and create its first-seen record from `first_trade`
    /// when absent.
    pub async fn ensure_wallet(&self, address: &str, first_trade: &Trade) -> WalletStatus {
        match self.store.find_wallet(address).await {
            Ok(Some(wallet)) => return WalletStatus::Existing(wallet),
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, wallet = %address, "Wallet lookup failed");
                return WalletStatus::Unavailable;
            }
        }

        let wallet = Wallet::from_first_trade(first_trade);
        match self.store.insert_wallet(&wallet).await {
            Ok(true) => {
                tracing::info!(wallet = %address, "Saved new wallet");
                WalletStatus::Created
            }
            // Lost an insert race to another writer; the row that won is authoritative.
            Ok(false) => match self.store.find_wallet(address).await {
                Ok(Some(existing)) => WalletStatus::Existing(existing),
                _ => WalletStatus::Unavailable,
            },
            Err(e) => {
                // The lookup did say the wallet was unseen, so it is still new.
                tracing::error!(error = %e, wallet = %address, "Failed to save new wallet");
                WalletStatus::Created
            }
        }
    }

    /// The wallet's trades at or after `since`. Empty on store failure.
    pub async fn trades_since(&self, address: &str, since: DateTime<Utc>) -> Vec<Trade> {
        match self.store.find_trades_since(address, since).await {
            Ok(trades) => trades,
            Err(e) => {
                tracing::error!(error = %e, wallet = %address, "Failed to load recent trades");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::Side;
    use rust_decimal::Decimal;

    fn make_trade(wallet: &str) -> Trade {
        Trade {
            wallet: wallet.into(),
            side: Side::Buy,
            size: Decimal::from(1_000),
            price: Decimal::new(90, 2),
            market_title: "Election winner".into(),
            market_slug: "election-winner".into(),
            condition_id: "0xcond".into(),
            outcome: "Yes".into(),
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            transaction_hash: None,
        }
    }

    #[tokio::test]
    async fn test_ensure_wallet_creates_once() {
        let store = Arc::new(MemoryStore::new());
        let ledger = Ledger::new(store.clone());
        let trade = make_trade("0xA");

        assert_eq!(ledger.ensure_wallet("0xA", &trade).await, WalletStatus::Created);

        match ledger.ensure_wallet("0xA", &trade).await {
            WalletStatus::Existing(wallet) => {
                assert_eq!(wallet.first_seen, trade.timestamp);
                assert_eq!(wallet.first_trade_market, "Election winner");
                assert_eq!(wallet.first_trade_amount, Decimal::from(900));
            }
            other => panic!("expected existing wallet, got {other:?}"),
        }
        assert_eq!(store.wallet_count().await, 1);
    }
}
