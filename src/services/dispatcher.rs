use std::sync::Arc;

use futures_util::future::join_all;
use metrics::counter;
use tokio::sync::broadcast;

use super::email::EmailChannel;
use super::notifier::{format_alert_message, AlertChannel, ChannelError, TelegramChannel};
use crate::api::ws_types::WsMessage;
use crate::config::AppConfig;
use crate::models::Alert;

/// Per-alert delivery summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Live subscribers that received the alert.
    pub live_subscribers: usize,
    pub delivered: Vec<&'static str>,
    pub skipped: Vec<&'static str>,
    pub failed: Vec<&'static str>,
}

/// Fans an alert out to live subscribers and every configured channel.
/// Channel failures are isolated from each other and never surface to the caller.
pub struct AlertDispatcher {
    channels: Vec<Arc<dyn AlertChannel>>,
    live_tx: Option<broadcast::Sender<WsMessage>>,
}

impl AlertDispatcher {
    pub fn new(
        channels: Vec<Arc<dyn AlertChannel>>,
        live_tx: Option<broadcast::Sender<WsMessage>>,
    ) -> Self {
        Self { channels, live_tx }
    }

    /// Telegram and email channels built from config, plus the live feed.
    pub fn from_config(
        config: &AppConfig,
        http: reqwest::Client,
        live_tx: broadcast::Sender<WsMessage>,
    ) -> Self {
        let channels: Vec<Arc<dyn AlertChannel>> = vec![
            Arc::new(TelegramChannel::new(http.clone(), config.telegram.clone())),
            Arc::new(EmailChannel::new(http, config.email.clone())),
        ];

        for channel in &channels {
            if channel.is_configured() {
                tracing::info!(channel = channel.name(), "Notification channel enabled");
            } else {
                tracing::warn!(channel = channel.name(), "Notification channel not configured");
            }
        }

        Self::new(channels, Some(live_tx))
    }

    pub async fn send_alert(&self, alert: &Alert) -> DispatchReport {
        let mut report = DispatchReport::default();
        let kind = alert.kind();

        counter!("alerts_total", "kind" => kind.as_str()).increment(1);
        tracing::info!(
            kind = %kind,
            wallet = %alert.wallet(),
            amount = ?alert.amount(),
            market = alert.market().unwrap_or("-"),
            "Alert raised"
        );

        // Live subscribers first, before any slow network channel.
        if let Some(tx) = &self.live_tx {
            if tx.receiver_count() > 0 {
                match tx.send(WsMessage::Alert(alert.clone())) {
                    Ok(n) => report.live_subscribers = n,
                    Err(_) => tracing::debug!("Live subscribers went away before broadcast"),
                }
            }
        }

        let message = format_alert_message(alert);

        let mut pending = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            if !channel.is_configured() {
                tracing::debug!(channel = channel.name(), "Channel not configured, skipping");
                report.skipped.push(channel.name());
                continue;
            }
            let message = message.as_str();
            pending.push(async move { (channel.name(), channel.send(message, alert).await) });
        }

        for (name, result) in join_all(pending).await {
            match result {
                Ok(()) => {
                    counter!("channel_deliveries_total", "channel" => name).increment(1);
                    tracing::info!(channel = name, kind = %kind, "Alert delivered");
                    report.delivered.push(name);
                }
                Err(ChannelError::NotConfigured) => {
                    tracing::debug!(channel = name, "Channel not configured, skipping");
                    report.skipped.push(name);
                }
                Err(e) => {
                    counter!("channel_failures_total", "channel" => name).increment(1);
                    tracing::error!(channel = name, kind = %kind, error = %e, "Alert delivery failed");
                    report.failed.push(name);
                }
            }
        }

        report
    }
}
