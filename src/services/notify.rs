// src/services/notify.rs

//! Best-effort operational error notifications.
//!
//! Forwards error context to the alerting webhook. A failure to deliver the
//! notification itself is logged and swallowed; notification delivery must
//! never take down the pipeline.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use crate::services::dispatch::WebhookSender;

/// Embed accent for error notifications (red).
const ERROR_COLOR: u32 = 16_711_680;

/// Delivers operational error messages to the alerting webhook.
pub struct Notifier {
    sender: Arc<dyn WebhookSender>,
    webhook_url: Option<String>,
}

impl Notifier {
    pub fn new(sender: Arc<dyn WebhookSender>, webhook_url: Option<String>) -> Self {
        Self {
            sender,
            webhook_url,
        }
    }

    /// Report an error from a component. Best-effort: if no alerting webhook
    /// is configured or delivery fails, the error is only logged.
    pub async fn notify(&self, component: &str, message: &str, cause: Option<&str>) {
        log::error!("[{}] {}", component, message);

        let Some(url) = &self.webhook_url else {
            log::warn!("Alert webhook not configured; notification dropped");
            return;
        };

        let mut description = format!("**{}**: {}", component, message);
        if let Some(cause) = cause {
            description.push_str(&format!("\n\nCause: {}", cause));
        }

        let payload = json!({
            "embeds": [{
                "title": "Bot Error Notification",
                "description": description,
                "color": ERROR_COLOR,
                "footer": { "text": "birdwatch" },
                "timestamp": Utc::now().to_rfc3339(),
            }]
        });

        if let Err(e) = self.sender.send(url, &payload).await {
            log::warn!("Failed to deliver error notification: {}", e);
        }
    }
}
