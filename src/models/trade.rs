use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Side;

/// One executed market transaction as observed on the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub wallet: String,
    pub side: Side,
    pub size: Decimal,
    pub price: Decimal,
    pub market_title: String,
    pub market_slug: String,
    pub condition_id: String,
    pub outcome: String,
    pub timestamp: DateTime<Utc>,
    pub transaction_hash: Option<String>,
}

impl Trade {
    /// Dollar-equivalent value of the trade: size × price.
    pub fn notional(&self) -> Decimal {
        self.size * self.price
    }
}

/// Database row for the trades table.
#[derive(Debug, Clone, FromRow)]
pub struct TradeRow {
    pub id: Uuid,
    pub wallet_address: String,
    pub side: String,
    pub size: Decimal,
    pub price: Decimal,
    pub market_title: String,
    pub market_slug: String,
    pub condition_id: String,
    pub outcome: String,
    pub traded_at: DateTime<Utc>,
    pub transaction_hash: Option<String>,
}

impl TradeRow {
    /// Rows with an unrecognised side are dropped.
    pub fn into_trade(self) -> Option<Trade> {
        let side = Side::from_api_str(&self.side)?;
        Some(Trade {
            wallet: self.wallet_address,
            side,
            size: self.size,
            price: self.price,
            market_title: self.market_title,
            market_slug: self.market_slug,
            condition_id: self.condition_id,
            outcome: self.outcome,
            timestamp: self.traded_at,
            transaction_hash: self.transaction_hash,
        })
    }
}
