use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::config::DetectionConfig;
use crate::models::{Alert, Position, Trade};
use crate::services::ledger::WalletStatus;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Whether the trade's notional reaches the large-bet threshold.
pub fn is_large_bet(trade: &Trade, config: &DetectionConfig) -> bool {
    trade.notional() >= config.large_bet_threshold
}

/// Continuous wallet age in days (fractional, no calendar truncation).
/// A `first_seen` ahead of `now` (feed clock skew) counts as zero.
pub fn wallet_age_days(first_seen: DateTime<Utc>, now: DateTime<Utc>) -> Decimal {
    let millis = (now - first_seen).num_milliseconds().max(0);
    Decimal::from(millis) / Decimal::from(MILLIS_PER_DAY)
}

/// New/young wallet large-bet rule. At most one of the two kinds fires.
pub fn check_large_bet(
    trade: &Trade,
    status: &WalletStatus,
    now: DateTime<Utc>,
    config: &DetectionConfig,
) -> Option<Alert> {
    if !is_large_bet(trade, config) {
        return None;
    }

    match status {
        WalletStatus::Created => Some(Alert::NewWalletLargeBet {
            wallet: trade.wallet.clone(),
            amount: trade.notional(),
            market: trade.market_title.clone(),
            side: trade.side,
            timestamp: trade.timestamp,
        }),
        WalletStatus::Existing(wallet) => {
            let age = wallet_age_days(wallet.first_seen, now);
            if age >= config.new_wallet_age_days {
                return None;
            }
            Some(Alert::YoungWalletLargeBet {
                wallet: trade.wallet.clone(),
                amount: trade.notional(),
                market: trade.market_title.clone(),
                side: trade.side,
                wallet_age_days: age.round_dp(1),
                timestamp: trade.timestamp,
            })
        }
        WalletStatus::Unavailable => None,
    }
}

/// Inclusive lower bound of the rapid-accumulation window ending at `now`.
/// `None` when the window reaches past the representable range.
pub fn rapid_window_start(now: DateTime<Utc>, config: &DetectionConfig) -> Option<DateTime<Utc>> {
    now.checked_sub_signed(config.rapid_window()?)
}

/// Rapid accumulation rule over a wallet's recent trades. Trades outside
/// `[now - window, now]` are ignored.
pub fn check_rapid_accumulation(
    address: &str,
    trades: &[Trade],
    now: DateTime<Utc>,
    config: &DetectionConfig,
) -> Option<Alert> {
    let since = rapid_window_start(now, config)?;
    let window: Vec<&Trade> = trades
        .iter()
        .filter(|t| t.wallet == address && t.timestamp >= since && t.timestamp <= now)
        .collect();

    if window.is_empty() {
        return None;
    }

    let total: Decimal = window.iter().map(|t| t.notional()).sum();
    if total < config.rapid_accumulation_threshold {
        return None;
    }

    Some(Alert::RapidAccumulation {
        wallet: address.to_string(),
        amount: total,
        trade_count: window.len(),
        timeframe: format!("{} hours", config.rapid_accumulation_hours.normalize()),
        timestamp: now,
    })
}

/// Concentrated bet rule: reports the first position (feed order) holding at
/// least the configured share of the wallet's total value.
pub fn check_concentration(
    address: &str,
    positions: &[Position],
    now: DateTime<Utc>,
    config: &DetectionConfig,
) -> Option<Alert> {
    let total: Decimal = positions.iter().map(|p| p.current_value).sum();
    if total <= Decimal::ZERO {
        return None;
    }

    positions.iter().find_map(|position| {
        let concentration = position.current_value / total;
        (concentration >= config.concentrated_bet_threshold).then(|| Alert::ConcentratedBet {
            wallet: address.to_string(),
            amount: position.current_value,
            market: position.market_title.clone(),
            concentration: format_percentage(concentration),
            timestamp: now,
        })
    })
}

/// 0.6 -> "60.0%"
pub fn format_percentage(fraction: Decimal) -> String {
    let pct = (fraction * Decimal::ONE_HUNDRED).round_dp(1);
    format!("{pct:.1}%")
}
