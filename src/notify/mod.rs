//! Best-effort customer notifications
//!
//! Notices never participate in the store transaction and never fail a
//! transfer: the executor fires them after commit on a detached task, and
//! delivery failures are logged and swallowed.

use async_trait::async_trait;

pub mod notices;

/// Outbound notification channel. Returns `true` when the message was
/// accepted for delivery.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> bool;
}

/// Posts notices as JSON to an HTTP webhook (mail relay, ops sink, ...).
pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoint: String,
    sender_name: String,
}

impl WebhookNotifier {
    pub fn new(endpoint: String, sender_name: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            sender_name,
        }
    }
}

#[async_trait]
impl NotificationSender for WebhookNotifier {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> bool {
        let payload = serde_json::json!({
            "to": to,
            "from": self.sender_name,
            "subject": subject,
            "html": html_body,
        });

        match self.client.post(&self.endpoint).json(&payload).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                tracing::warn!("Notification webhook rejected message: {}", resp.status());
                false
            }
            Err(e) => {
                tracing::warn!("Failed to deliver notification: {}", e);
                false
            }
        }
    }
}

/// Used when no webhook is configured: logs the notice and reports
/// non-delivery.
pub struct NoopNotifier;

#[async_trait]
impl NotificationSender for NoopNotifier {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> bool {
        tracing::info!("Notification channel not configured; dropping notice to {to}: {subject}");
        false
    }
}
