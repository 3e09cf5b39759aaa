pub mod memory;
pub mod trade_repo;
pub mod wallet_repo;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::models::{Trade, Wallet};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Narrow read/write contract over the wallet and trade store.
#[async_trait]
pub trait TradeStore: Send + Sync {
    async fn find_wallet(&self, address: &str) -> Result<Option<Wallet>, StoreError>;

    /// Insert if absent. Returns `true` when a new row was written.
    async fn insert_wallet(&self, wallet: &Wallet) -> Result<bool, StoreError>;

    async fn insert_trade(&self, trade: &Trade) -> Result<(), StoreError>;

    /// Trades for `address` with occurrence time `>= since`.
    async fn find_trades_since(
        &self,
        address: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Trade>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

pub async fn init_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    // Verify connectivity
    sqlx::query("SELECT 1").execute(&pool).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Postgres-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TradeStore for PgStore {
    async fn find_wallet(&self, address: &str) -> Result<Option<Wallet>, StoreError> {
        Ok(wallet_repo::get_wallet_by_address(&self.pool, address).await?)
    }

    async fn insert_wallet(&self, wallet: &Wallet) -> Result<bool, StoreError> {
        Ok(wallet_repo::insert_wallet(&self.pool, wallet).await?)
    }

    async fn insert_trade(&self, trade: &Trade) -> Result<(), StoreError> {
        trade_repo::insert_trade(&self.pool, trade).await?;
        Ok(())
    }

    async fn find_trades_since(
        &self,
        address: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Trade>, StoreError> {
        Ok(trade_repo::get_trades_since(&self.pool, address, since).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
