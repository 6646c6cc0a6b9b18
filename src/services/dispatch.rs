// src/services/dispatch.rs

//! Webhook dispatch of qualifying posts.
//!
//! The Discord transport sits behind [`WebhookSender`] so the pipeline can be
//! exercised with a stub; the production sender is one shared `reqwest`
//! client injected at construction. Dispatch never retries: retry policy
//! belongs to the poll loop (an undelivered post is re-fetched next cycle).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::models::{DispatchResult, Post};

/// Embed accent for relayed tweets (Discord-style blue).
const TWEET_COLOR: u32 = 5_814_783;

/// Trait for webhook transports.
#[async_trait]
pub trait WebhookSender: Send + Sync {
    /// POST a JSON payload to the webhook URL. Any non-success HTTP outcome
    /// is a failure.
    async fn send(&self, webhook_url: &str, payload: &Value) -> Result<()>;
}

/// Webhook transport backed by a shared HTTP client.
pub struct DiscordWebhook {
    client: Client,
}

impl DiscordWebhook {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WebhookSender for DiscordWebhook {
    async fn send(&self, webhook_url: &str, payload: &Value) -> Result<()> {
        let response = self
            .client
            .post(webhook_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::dispatch(webhook_url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::dispatch(
                webhook_url,
                format!("HTTP {}: {}", status, body),
            ));
        }
        Ok(())
    }
}

/// Formats and delivers qualifying posts to their channel webhook.
pub struct Dispatcher {
    sender: Arc<dyn WebhookSender>,
}

impl Dispatcher {
    pub fn new(sender: Arc<dyn WebhookSender>) -> Self {
        Self { sender }
    }

    /// Deliver one post. Failures are reported in the result, not raised;
    /// the caller decides whether to record the id or alert.
    pub async fn dispatch(&self, post: &Post, webhook_url: &str) -> DispatchResult {
        let payload = json!({ "embeds": [build_post_embed(post)] });

        match self.sender.send(webhook_url, &payload).await {
            Ok(()) => {
                log::info!("Dispatched post {} to webhook", post.id);
                DispatchResult::ok(webhook_url, &post.id)
            }
            Err(e) => DispatchResult::failed(webhook_url, &post.id, e.to_string()),
        }
    }
}

/// Build the Discord embed for a relayed tweet.
///
/// Text body plus a link back to the tweet; the first media URL becomes the
/// embed image and any further media URLs are appended to the description.
/// A post with no media yields a text-only embed.
pub fn build_post_embed(post: &Post) -> Value {
    let mut description = format!("{}\n\n[View on Twitter]({})", post.text, post.url());

    if post.media_urls.len() > 1 {
        description.push_str("\n\n**Additional Media:**\n");
        description.push_str(&post.media_urls[1..].join("\n"));
    }

    let mut embed = json!({
        "title": format!("New Tweet from @{}", post.author.username),
        "description": description,
        "url": post.url(),
        "color": TWEET_COLOR,
        "author": {
            "name": post.author.name,
            "url": format!("https://twitter.com/{}", post.author.username),
        },
        "footer": {
            "text": format!(
                "Likes: {} | Retweets: {}",
                post.like_count, post.retweet_count
            ),
        },
        "timestamp": Utc::now().to_rfc3339(),
    });

    if let Some(first) = post.media_urls.first() {
        embed["image"] = json!({ "url": first });
    }

    embed
}
