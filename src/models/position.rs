use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A wallet's current holding in one market, as reported by the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub market_title: String,
    pub current_value: Decimal,
}
