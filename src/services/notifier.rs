use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::json;

use crate::config::TelegramConfig;
use crate::models::Alert;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Destination or credentials missing. A skip signal, not a failure.
    #[error("channel not configured")]
    NotConfigured,

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("non-2xx response: {status}")]
    Rejected { status: u16 },
}

/// An external notification transport with its own configuration.
#[async_trait]
pub trait AlertChannel: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_configured(&self) -> bool;

    async fn send(&self, message: &str, alert: &Alert) -> Result<(), ChannelError>;
}

/// Telegram bot channel.
#[derive(Debug, Clone)]
pub struct TelegramChannel {
    http: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramChannel {
    pub fn new(http: reqwest::Client, config: TelegramConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl AlertChannel for TelegramChannel {
    fn name(&self) -> &'static str {
        "telegram"
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn send(&self, message: &str, _alert: &Alert) -> Result<(), ChannelError> {
        let (Some(bot_token), Some(chat_id)) = (&self.config.bot_token, &self.config.chat_id)
        else {
            return Err(ChannelError::NotConfigured);
        };

        let url = format!("https://api.telegram.org/bot{bot_token}/sendMessage");
        let body = json!({
            "chat_id": chat_id,
            "text": message,
            "parse_mode": "Markdown",
        });

        let resp = self.http.post(&url).json(&body).send().await?;
        if !resp.status().is_success() {
            return Err(ChannelError::Rejected {
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Chat-ready Markdown message for an alert.
pub fn format_alert_message(alert: &Alert) -> String {
    let emoji = alert.kind().emoji();
    let wallet = short_wallet(alert.wallet());
    let market = alert.market().map(escape_markdown).unwrap_or_default();

    match alert {
        Alert::NewWalletLargeBet { amount, side, .. } => format!(
            "{emoji} *NEW WALLET ALERT*\n\nA brand new wallet just placed a large bet!\n\n💰 Amount: {}\n📊 Market: {market}\n↗️ Side: {side}\n🔗 Wallet: `{wallet}`",
            format_usd(*amount),
        ),
        Alert::YoungWalletLargeBet { amount, side, wallet_age_days, .. } => format!(
            "{emoji} *YOUNG WALLET ALERT*\n\nA {wallet_age_days:.1}-day-old wallet placed a large bet!\n\n💰 Amount: {}\n📊 Market: {market}\n↗️ Side: {side}\n🔗 Wallet: `{wallet}`",
            format_usd(*amount),
        ),
        Alert::RapidAccumulation { amount, trade_count, timeframe, .. } => format!(
            "{emoji} *RAPID ACCUMULATION*\n\nWallet accumulated {} in {timeframe}!\n\n📈 Trades: {trade_count}\n🔗 Wallet: `{wallet}`",
            format_usd(*amount),
        ),
        Alert::ConcentratedBet { amount, concentration, .. } => format!(
            "{emoji} *CONCENTRATED POSITION*\n\n{concentration} of portfolio in single market!\n\n💰 Position: {}\n📊 Market: {market}\n🔗 Wallet: `{wallet}`",
            format_usd(*amount),
        ),
    }
}

/// Backslash-escape the characters Telegram's legacy Markdown treats as markup.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// First ten characters of the address followed by an ellipsis.
pub fn short_wallet(wallet: &str) -> String {
    let head: String = wallet.chars().take(10).collect();
    format!("{head}...")
}

/// `$1,234.56` style, at most two decimals, trailing zeros dropped.
pub fn format_usd(amount: Decimal) -> String {
    let rounded = amount.round_dp(2).normalize();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let digits = rounded.abs().to_string();
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}${grouped}.{frac}"),
        None => format!("{sign}${grouped}"),
    }
}
