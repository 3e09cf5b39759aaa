use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;

use super::{StoreError, TradeStore};
use crate::models::{Trade, Wallet};

#[derive(Debug, Default)]
struct Tables {
    wallets: HashMap<String, Wallet>,
    trades: HashMap<String, Vec<Trade>>,
    tx_hashes: HashSet<String>,
    newest: Option<DateTime<Utc>>,
}

impl Tables {
    /// Drop trades older than `cutoff` along with their hashes.
    fn prune(&mut self, cutoff: DateTime<Utc>) {
        let Tables {
            trades, tx_hashes, ..
        } = self;
        trades.retain(|_, list| {
            list.retain(|t| {
                let keep = t.timestamp >= cutoff;
                if !keep {
                    if let Some(hash) = &t.transaction_hash {
                        tx_hashes.remove(hash);
                    }
                }
                keep
            });
            !list.is_empty()
        });
    }
}

/// In-process store with the same insert semantics as the Postgres one.
/// Used when no `DATABASE_URL` is configured. Nothing survives a restart.
///
/// With a retention window, trades older than the newest trade minus the
/// window are dropped, so memory stays bounded. Wallets are kept.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    retention: Option<TimeDelta>,
}

impl MemoryStore {
    /// Unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retention: TimeDelta) -> Self {
        Self {
            tables: Mutex::default(),
            retention: Some(retention),
        }
    }

    pub async fn wallet_count(&self) -> usize {
        self.tables.lock().await.wallets.len()
    }

    pub async fn trade_count(&self) -> usize {
        self.tables.lock().await.trades.values().map(Vec::len).sum()
    }

    #[cfg(test)]
    async fn hash_count(&self) -> usize {
        self.tables.lock().await.tx_hashes.len()
    }
}

#[async_trait]
impl TradeStore for MemoryStore {
    async fn find_wallet(&self, address: &str) -> Result<Option<Wallet>, StoreError> {
        Ok(self.tables.lock().await.wallets.get(address).cloned())
    }

    async fn insert_wallet(&self, wallet: &Wallet) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.wallets.contains_key(&wallet.address) {
            return Ok(false);
        }
        tables.wallets.insert(wallet.address.clone(), wallet.clone());
        Ok(true)
    }

    async fn insert_trade(&self, trade: &Trade) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        if let Some(hash) = &trade.transaction_hash {
            if tables.tx_hashes.contains(hash) {
                return Ok(());
            }
        }

        let newest = tables
            .newest
            .map_or(trade.timestamp, |n| n.max(trade.timestamp));
        let cutoff = self
            .retention
            .and_then(|window| newest.checked_sub_signed(window));

        // Already outside the window: it would be pruned straight away.
        if cutoff.is_some_and(|c| trade.timestamp < c) {
            return Ok(());
        }

        if let Some(hash) = &trade.transaction_hash {
            tables.tx_hashes.insert(hash.clone());
        }
        tables
            .trades
            .entry(trade.wallet.clone())
            .or_default()
            .push(trade.clone());

        if tables.newest != Some(newest) {
            tables.newest = Some(newest);
            if let Some(cutoff) = cutoff {
                tables.prune(cutoff);
            }
        }
        Ok(())
    }

    async fn find_trades_since(
        &self,
        address: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Trade>, StoreError> {
        let tables = self.tables.lock().await;
        let mut trades: Vec<Trade> = tables
            .trades
            .get(address)
            .map(|list| {
                list.iter()
                    .filter(|t| t.timestamp >= since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        trades.sort_by_key(|t| t.timestamp);
        Ok(trades)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Side;
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn make_trade(wallet: &str, hash: Option<&str>, hours_ago: i64) -> Trade {
        Trade {
            wallet: wallet.into(),
            side: Side::Buy,
            size: Decimal::from(100),
            price: Decimal::new(50, 2),
            market_title: "Test market".into(),
            market_slug: "test-market".into(),
            condition_id: "0xcond".into(),
            outcome: "Yes".into(),
            timestamp: Utc::now() - Duration::hours(hours_ago),
            transaction_hash: hash.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_insert_wallet_only_once() {
        let store = MemoryStore::new();
        let wallet = Wallet::from_first_trade(&make_trade("0xA", None, 0));

        assert!(store.insert_wallet(&wallet).await.unwrap());
        assert!(!store.insert_wallet(&wallet).await.unwrap());
        assert_eq!(store.wallet_count().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_tx_hash_ignored() {
        let store = MemoryStore::new();
        let trade = make_trade("0xA", Some("0xhash"), 0);

        store.insert_trade(&trade).await.unwrap();
        store.insert_trade(&trade).await.unwrap();
        store.insert_trade(&make_trade("0xA", None, 0)).await.unwrap();
        store.insert_trade(&make_trade("0xA", None, 0)).await.unwrap();

        assert_eq!(store.trade_count().await, 3);
    }

    #[tokio::test]
    async fn test_find_trades_since_filters_wallet_and_time() {
        let store = MemoryStore::new();
        store.insert_trade(&make_trade("0xA", None, 1)).await.unwrap();
        store.insert_trade(&make_trade("0xA", None, 30)).await.unwrap();
        store.insert_trade(&make_trade("0xB", None, 1)).await.unwrap();

        let since = Utc::now() - Duration::hours(24);
        let trades = store.find_trades_since("0xA", since).await.unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].wallet, "0xA");
    }

    #[tokio::test]
    async fn test_retention_prunes_old_trades_and_hashes() {
        let store = MemoryStore::with_retention(TimeDelta::hours(24));
        let old = make_trade("0xA", Some("0xold"), 30);

        store.insert_trade(&old).await.unwrap();
        assert_eq!(store.trade_count().await, 1);

        store
            .insert_trade(&make_trade("0xB", Some("0xnew"), 0))
            .await
            .unwrap();
        assert_eq!(store.trade_count().await, 1);
        assert_eq!(store.hash_count().await, 1);

        // Re-delivered after pruning: still outside the window, not stored again.
        store.insert_trade(&old).await.unwrap();
        assert_eq!(store.trade_count().await, 1);

        let since = Utc::now() - Duration::days(7);
        assert!(store.find_trades_since("0xA", since).await.unwrap().is_empty());
        assert_eq!(store.find_trades_since("0xB", since).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_retention_keeps_trades_inside_window() {
        let store = MemoryStore::with_retention(TimeDelta::hours(24));
        for hours_ago in [23, 12, 1, 0] {
            let hash = format!("0x{hours_ago}");
            store
                .insert_trade(&make_trade("0xA", Some(&hash), hours_ago))
                .await
                .unwrap();
        }
        assert_eq!(store.trade_count().await, 4);
        assert_eq!(store.hash_count().await, 4);
    }
}
