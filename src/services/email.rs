use async_trait::async_trait;
use serde_json::json;

use super::notifier::{format_usd, AlertChannel, ChannelError};
use crate::config::EmailConfig;
use crate::models::Alert;

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Email delivery through the SendGrid v3 mail API.
#[derive(Debug, Clone)]
pub struct EmailChannel {
    http: reqwest::Client,
    config: EmailConfig,
}

impl EmailChannel {
    pub fn new(http: reqwest::Client, config: EmailConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl AlertChannel for EmailChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn send(&self, message: &str, alert: &Alert) -> Result<(), ChannelError> {
        let (Some(api_key), Some(to), Some(from)) = (
            self.config.api_key.as_deref(),
            self.config.to.as_deref(),
            self.config.sender(),
        ) else {
            return Err(ChannelError::NotConfigured);
        };

        let body = json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": from },
            "subject": email_subject(alert),
            "content": [
                { "type": "text/plain", "value": message },
                { "type": "text/html", "value": format_email_html(alert) },
            ],
        });

        let resp = self
            .http
            .post(SENDGRID_SEND_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ChannelError::Rejected {
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }
}

pub fn email_subject(alert: &Alert) -> String {
    format!("🚨 Polymarket Alert: {}", alert.kind())
}

pub fn format_email_html(alert: &Alert) -> String {
    let title = alert.kind().as_str().replace('_', " ");
    let amount = alert
        .amount()
        .map(format_usd)
        .unwrap_or_else(|| "N/A".into());
    let market = alert.market().map(escape_html).unwrap_or_else(|| "N/A".into());

    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #ef4444;">🚨 Polymarket Insider Alert</h2>
  <div style="background: #f3f4f6; padding: 20px; border-radius: 8px;">
    <h3>{title}</h3>
    <p><strong>Amount:</strong> {amount}</p>
    <p><strong>Market:</strong> {market}</p>
    <p><strong>Wallet:</strong> <code>{wallet}</code></p>
  </div>
</div>"#,
        wallet = escape_html(alert.wallet()),
    )
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
