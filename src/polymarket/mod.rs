pub mod data_client;
pub mod types;

pub use data_client::{DataClient, DataClientError};
pub use types::{ApiPosition, ApiTrade};

use async_trait::async_trait;

use crate::models::{Position, Trade};

/// Read-only access to the upstream trade and position source.
#[async_trait]
pub trait MarketFeed: Send + Sync {
    async fn fetch_recent_trades(&self, limit: usize) -> Result<Vec<Trade>, DataClientError>;

    async fn fetch_wallet_positions(&self, address: &str) -> Result<Vec<Position>, DataClientError>;
}
