use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use super::Side;

// ---------------------------------------------------------------------------
// Alert: detection result, one payload shape per kind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Alert {
    NewWalletLargeBet {
        wallet: String,
        amount: Decimal,
        market: String,
        side: Side,
        timestamp: DateTime<Utc>,
    },
    YoungWalletLargeBet {
        wallet: String,
        amount: Decimal,
        market: String,
        side: Side,
        /// Rounded to one decimal place.
        wallet_age_days: Decimal,
        timestamp: DateTime<Utc>,
    },
    RapidAccumulation {
        wallet: String,
        amount: Decimal,
        trade_count: usize,
        timeframe: String,
        timestamp: DateTime<Utc>,
    },
    ConcentratedBet {
        wallet: String,
        amount: Decimal,
        market: String,
        /// Percentage with one decimal place, e.g. "60.0%".
        concentration: String,
        timestamp: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    NewWalletLargeBet,
    YoungWalletLargeBet,
    RapidAccumulation,
    ConcentratedBet,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::NewWalletLargeBet => "NEW_WALLET_LARGE_BET",
            AlertKind::YoungWalletLargeBet => "YOUNG_WALLET_LARGE_BET",
            AlertKind::RapidAccumulation => "RAPID_ACCUMULATION",
            AlertKind::ConcentratedBet => "CONCENTRATED_BET",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            AlertKind::NewWalletLargeBet => "🆕",
            AlertKind::YoungWalletLargeBet => "👶",
            AlertKind::RapidAccumulation => "⚡",
            AlertKind::ConcentratedBet => "🎯",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Alert {
    pub fn kind(&self) -> AlertKind {
        match self {
            Alert::NewWalletLargeBet { .. } => AlertKind::NewWalletLargeBet,
            Alert::YoungWalletLargeBet { .. } => AlertKind::YoungWalletLargeBet,
            Alert::RapidAccumulation { .. } => AlertKind::RapidAccumulation,
            Alert::ConcentratedBet { .. } => AlertKind::ConcentratedBet,
        }
    }

    pub fn wallet(&self) -> &str {
        match self {
            Alert::NewWalletLargeBet { wallet, .. }
            | Alert::YoungWalletLargeBet { wallet, .. }
            | Alert::RapidAccumulation { wallet, .. }
            | Alert::ConcentratedBet { wallet, .. } => wallet,
        }
    }

    pub fn amount(&self) -> Option<Decimal> {
        match self {
            Alert::NewWalletLargeBet { amount, .. }
            | Alert::YoungWalletLargeBet { amount, .. }
            | Alert::RapidAccumulation { amount, .. }
            | Alert::ConcentratedBet { amount, .. } => Some(*amount),
        }
    }

    pub fn market(&self) -> Option<&str> {
        match self {
            Alert::NewWalletLargeBet { market, .. }
            | Alert::YoungWalletLargeBet { market, .. }
            | Alert::ConcentratedBet { market, .. } => Some(market),
            Alert::RapidAccumulation { .. } => None,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Alert::NewWalletLargeBet { timestamp, .. }
            | Alert::YoungWalletLargeBet { timestamp, .. }
            | Alert::RapidAccumulation { timestamp, .. }
            | Alert::ConcentratedBet { timestamp, .. } => *timestamp,
        }
    }
}
