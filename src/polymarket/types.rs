use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Position, Side, Trade};

// ---------------------------------------------------------------------------
// Trade (Data API, REST)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTrade {
    #[serde(default)]
    pub proxy_wallet: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub size: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub condition_id: Option<String>,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
}

impl ApiTrade {
    /// Convert to the domain type. Returns `None` when the wallet, side or
    /// timestamp is missing or unparseable.
    pub fn into_trade(self) -> Option<Trade> {
        let wallet = self.proxy_wallet.filter(|w| !w.is_empty())?;
        let side = Side::from_api_str(self.side.as_deref()?)?;
        let timestamp = parse_trade_timestamp(self.timestamp.as_ref())?;

        Some(Trade {
            wallet,
            side,
            size: self.size.unwrap_or(Decimal::ZERO),
            price: self.price.unwrap_or(Decimal::ZERO),
            market_title: self.title.unwrap_or_default(),
            market_slug: self.slug.unwrap_or_default(),
            condition_id: self.condition_id.unwrap_or_default(),
            outcome: self.outcome.unwrap_or_default(),
            timestamp,
            transaction_hash: self.transaction_hash.filter(|h| !h.is_empty()),
        })
    }
}

// ---------------------------------------------------------------------------
// Position (Data API, REST)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPosition {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub current_value: Option<Decimal>,
}

impl From<ApiPosition> for Position {
    fn from(p: ApiPosition) -> Self {
        Position {
            market_title: p.title.unwrap_or_default(),
            current_value: p.current_value.unwrap_or(Decimal::ZERO),
        }
    }
}

/// Accepts epoch seconds, epoch milliseconds (either as numbers or numeric
/// strings) and RFC 3339 strings.
pub fn parse_trade_timestamp(ts: Option<&serde_json::Value>) -> Option<DateTime<Utc>> {
    ts.and_then(|t| match t {
        serde_json::Value::Number(n) => from_epoch(n.as_i64()?),
        serde_json::Value::String(s) => {
            if let Ok(secs) = s.parse::<i64>() {
                return from_epoch(secs);
            }
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }
        _ => None,
    })
}

fn from_epoch(value: i64) -> Option<DateTime<Utc>> {
    // If >1e12, it's milliseconds
    if value > 1_000_000_000_000 {
        DateTime::from_timestamp(value / 1000, ((value % 1000) * 1_000_000) as u32)
    } else {
        DateTime::from_timestamp(value, 0)
    }
}
