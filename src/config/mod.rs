use chrono::TimeDelta;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::polymarket::data_client::DATA_API_BASE;

const MILLIS_PER_HOUR: i64 = 3_600_000;
/// Upper bound accepted for the age and window settings.
const MAX_WINDOW_HOURS: i64 = 24 * 365 * 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// When unset the monitor runs against an in-memory store.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub data_api_base: String,

    pub detection: DetectionConfig,
    pub poller: PollerConfig,

    // Notification channels: an unconfigured channel is skipped
    pub telegram: TelegramConfig,
    pub email: EmailConfig,
}

/// Thresholds for the detection rules.
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    pub large_bet_threshold: Decimal,
    /// Fractional days allowed.
    pub new_wallet_age_days: Decimal,
    /// Fractional hours allowed.
    pub rapid_accumulation_hours: Decimal,
    pub rapid_accumulation_threshold: Decimal,
    /// Fraction between 0 and 1.
    pub concentrated_bet_threshold: Decimal,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            large_bet_threshold: Decimal::from(5_000),
            new_wallet_age_days: Decimal::from(7),
            rapid_accumulation_hours: Decimal::from(24),
            rapid_accumulation_threshold: Decimal::from(50_000),
            concentrated_bet_threshold: Decimal::new(5, 1),
        }
    }
}

impl DetectionConfig {
    /// Length of the rapid-accumulation window, `None` if it does not fit a duration.
    pub fn rapid_window(&self) -> Option<TimeDelta> {
        hours_to_delta(self.rapid_accumulation_hours)
    }
}

/// Fractional hours to a millisecond-precision duration. `None` on overflow.
pub fn hours_to_delta(hours: Decimal) -> Option<TimeDelta> {
    let millis = hours.checked_mul(Decimal::from(MILLIS_PER_HOUR))?.round();
    TimeDelta::try_milliseconds(millis.to_i64()?)
}

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub poll_interval: Duration,
    pub fetch_limit: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            fetch_limit: 500,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

impl TelegramConfig {
    pub fn is_configured(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct EmailConfig {
    pub api_key: Option<String>,
    pub to: Option<String>,
    pub from: Option<String>,
}

impl EmailConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.to.is_some()
    }

    /// Sender address; falls back to the recipient.
    pub fn sender(&self) -> Option<&str> {
        self.from.as_deref().or(self.to.as_deref())
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let detection_defaults = DetectionConfig::default();
        let poller_defaults = PollerConfig::default();

        Ok(Self {
            database_url: non_empty_var("DATABASE_URL"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            data_api_base: env::var("POLYMARKET_API_BASE")
                .unwrap_or_else(|_| DATA_API_BASE.into()),

            detection: DetectionConfig {
                large_bet_threshold: parse_or(
                    "LARGE_BET_THRESHOLD",
                    detection_defaults.large_bet_threshold,
                ),
                new_wallet_age_days: parse_positive_or(
                    "NEW_WALLET_AGE_DAYS",
                    detection_defaults.new_wallet_age_days,
                    Decimal::from(MAX_WINDOW_HOURS / 24),
                ),
                rapid_accumulation_hours: parse_positive_or(
                    "RAPID_ACCUMULATION_HOURS",
                    detection_defaults.rapid_accumulation_hours,
                    Decimal::from(MAX_WINDOW_HOURS),
                ),
                rapid_accumulation_threshold: parse_or(
                    "RAPID_ACCUMULATION_THRESHOLD",
                    detection_defaults.rapid_accumulation_threshold,
                ),
                concentrated_bet_threshold: parse_or(
                    "CONCENTRATED_BET_THRESHOLD",
                    detection_defaults.concentrated_bet_threshold,
                ),
            },

            poller: PollerConfig {
                poll_interval: Duration::from_secs(parse_or(
                    "POLL_INTERVAL_SECS",
                    poller_defaults.poll_interval.as_secs(),
                )),
                fetch_limit: parse_or("TRADE_FETCH_LIMIT", poller_defaults.fetch_limit),
            },

            telegram: TelegramConfig {
                bot_token: non_empty_var("TELEGRAM_BOT_TOKEN"),
                chat_id: non_empty_var("TELEGRAM_CHAT_ID"),
            },
            email: EmailConfig {
                api_key: non_empty_var("SENDGRID_API_KEY"),
                to: non_empty_var("ALERT_EMAIL"),
                from: non_empty_var("ALERT_EMAIL_FROM"),
            },
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an env var, falling back to `default` when unset or malformed.
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Invalid config value, using default");
            default
        }),
        Err(_) => default,
    }
}

/// Like [`parse_or`], but values outside `(0, max]` also fall back to `default`.
fn parse_positive_or(key: &str, default: Decimal, max: Decimal) -> Decimal {
    let value = parse_or(key, default);
    if value <= Decimal::ZERO || value > max {
        tracing::warn!(key, %value, %max, "Config value out of range, using default");
        return default;
    }
    value
}
