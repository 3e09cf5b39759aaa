use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use super::types::{ApiPosition, ApiTrade};
use super::MarketFeed;
use crate::models::{Position, Trade};

pub const DATA_API_BASE: &str = "https://data-api.polymarket.com";

/// Page size used when listing a wallet's positions.
const POSITIONS_LIMIT: usize = 500;

#[derive(Debug, Error)]
pub enum DataClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

#[derive(Debug, Clone)]
pub struct DataClient {
    http: Client,
    base_url: String,
}

impl DataClient {
    pub fn new(http: Client) -> Self {
        Self::with_base_url(http, DATA_API_BASE)
    }

    pub fn with_base_url(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the most recent taker trades across all markets.
    pub async fn get_recent_trades(&self, limit: usize) -> Result<Vec<ApiTrade>, DataClientError> {
        let url = format!("{}/trades", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("limit", limit.to_string()), ("takerOnly", "true".into())])
            .send()
            .await?
            .error_for_status()?;

        let trades: Vec<ApiTrade> = resp.json().await?;
        Ok(trades)
    }

    /// Fetch current positions for a wallet address.
    pub async fn get_positions(&self, wallet: &str) -> Result<Vec<ApiPosition>, DataClientError> {
        let url = format!("{}/positions", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("user", wallet.to_string()), ("limit", POSITIONS_LIMIT.to_string())])
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = resp.json().await?;
        if !body.is_array() {
            return Err(DataClientError::Unexpected(format!(
                "positions response for {wallet} is not an array"
            )));
        }
        serde_json::from_value(body).map_err(|e| DataClientError::Unexpected(e.to_string()))
    }
}

#[async_trait]
impl MarketFeed for DataClient {
    async fn fetch_recent_trades(&self, limit: usize) -> Result<Vec<Trade>, DataClientError> {
        let raw = self.get_recent_trades(limit).await?;
        let fetched = raw.len();

        let trades: Vec<Trade> = raw.into_iter().filter_map(ApiTrade::into_trade).collect();
        if trades.len() < fetched {
            tracing::debug!(
                skipped = fetched - trades.len(),
                "Dropped malformed trades from feed"
            );
        }

        tracing::info!(count = trades.len(), "Fetched recent trades");
        Ok(trades)
    }

    async fn fetch_wallet_positions(&self, address: &str) -> Result<Vec<Position>, DataClientError> {
        let positions = self.get_positions(address).await?;
        Ok(positions.into_iter().map(Position::from).collect())
    }
}
