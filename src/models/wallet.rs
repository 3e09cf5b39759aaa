use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Trade;

/// First-observation record for an address. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Wallet {
    pub address: String,
    pub first_seen: DateTime<Utc>,
    pub first_trade_market: String,
    pub first_trade_amount: Decimal,
}

impl Wallet {
    pub fn from_first_trade(trade: &Trade) -> Self {
        Self {
            address: trade.wallet.clone(),
            first_seen: trade.timestamp,
            first_trade_market: trade.market_title.clone(),
            first_trade_amount: trade.notional(),
        }
    }
}
