// src/services/search.rs

//! Recent-search client for the Twitter API v2.
//!
//! One operation: execute a text query with a result cap, returning candidate
//! posts newest-first with author metadata and resolved media URLs. No local
//! state is mutated; pagination beyond one page per cycle is not performed.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{Author, Post};

const SEARCH_URL: &str = "https://api.twitter.com/2/tweets/search/recent";

// The recent-search endpoint only accepts caps in this window.
const MIN_RESULTS: u32 = 10;
const MAX_RESULTS: u32 = 100;

/// Trait for search backends.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Execute one query, returning at most `max_results` posts newest-first.
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<Post>>;
}

/// Search client backed by the Twitter API v2 recent-search endpoint.
pub struct TwitterSearchClient {
    client: Client,
    bearer_token: String,
}

impl TwitterSearchClient {
    pub fn new(client: Client, bearer_token: impl Into<String>) -> Self {
        Self {
            client,
            bearer_token: bearer_token.into(),
        }
    }
}

#[async_trait]
impl SearchClient for TwitterSearchClient {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<Post>> {
        let capped = max_results.clamp(MIN_RESULTS, MAX_RESULTS);
        let capped_param = capped.to_string();

        let response = self
            .client
            .get(SEARCH_URL)
            .bearer_auth(&self.bearer_token)
            .query(&[
                ("query", query),
                ("max_results", capped_param.as_str()),
                ("expansions", "author_id,attachments.media_keys"),
                (
                    "tweet.fields",
                    "id,text,author_id,created_at,public_metrics,attachments",
                ),
                ("user.fields", "name,username,public_metrics,verified"),
                ("media.fields", "url,preview_image_url,type"),
            ])
            .send()
            .await
            .map_err(AppError::search_unavailable)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, query, &body));
        }

        let payload: SearchResponse = response
            .json()
            .await
            .map_err(AppError::search_unavailable)?;

        let mut posts = build_posts(payload);
        posts.truncate(max_results as usize);
        Ok(posts)
    }
}

/// Map a non-success search response to the error taxonomy.
fn classify_error(status: StatusCode, query: &str, body: &str) -> AppError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            AppError::RateLimited(format!("query '{}': {}", query, body))
        }
        StatusCode::BAD_REQUEST => AppError::invalid_query(query, body),
        _ => AppError::search_unavailable(format!("HTTP {}: {}", status, body)),
    }
}

// --- Wire format ---

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<ApiTweet>,
    #[serde(default)]
    includes: ApiIncludes,
}

#[derive(Debug, Deserialize, Default)]
struct ApiIncludes {
    #[serde(default)]
    users: Vec<ApiUser>,
    #[serde(default)]
    media: Vec<ApiMedia>,
}

#[derive(Debug, Deserialize)]
struct ApiTweet {
    id: String,
    text: String,
    author_id: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    public_metrics: ApiTweetMetrics,
    #[serde(default)]
    attachments: Option<ApiAttachments>,
}

#[derive(Debug, Deserialize, Default)]
struct ApiTweetMetrics {
    #[serde(default)]
    retweet_count: u64,
    #[serde(default)]
    like_count: u64,
}

#[derive(Debug, Deserialize)]
struct ApiAttachments {
    #[serde(default)]
    media_keys: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    id: String,
    name: String,
    username: String,
    #[serde(default)]
    verified: bool,
    #[serde(default)]
    public_metrics: ApiUserMetrics,
}

#[derive(Debug, Deserialize, Default)]
struct ApiUserMetrics {
    #[serde(default)]
    followers_count: u64,
}

#[derive(Debug, Deserialize)]
struct ApiMedia {
    media_key: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    preview_image_url: Option<String>,
}

impl ApiMedia {
    /// Displayable URL: photos and GIFs use the direct URL, videos fall back
    /// to the preview still.
    fn display_url(&self) -> Option<&str> {
        match self.kind.as_str() {
            "photo" | "animated_gif" => self.url.as_deref(),
            "video" => self.preview_image_url.as_deref(),
            _ => None,
        }
    }
}

/// Join tweets with their expanded users and media into candidate posts.
///
/// Tweets whose author is missing from the includes are skipped. API order
/// (newest-first) is preserved.
fn build_posts(payload: SearchResponse) -> Vec<Post> {
    let users: HashMap<&str, &ApiUser> = payload
        .includes
        .users
        .iter()
        .map(|u| (u.id.as_str(), u))
        .collect();

    let media: HashMap<&str, &ApiMedia> = payload
        .includes
        .media
        .iter()
        .map(|m| (m.media_key.as_str(), m))
        .collect();

    let mut posts = Vec::with_capacity(payload.data.len());
    for tweet in &payload.data {
        let Some(user) = users.get(tweet.author_id.as_str()) else {
            log::debug!("Skipping tweet {}: author not in includes", tweet.id);
            continue;
        };

        let media_urls: Vec<String> = tweet
            .attachments
            .as_ref()
            .map(|a| {
                a.media_keys
                    .iter()
                    .filter_map(|key| media.get(key.as_str()))
                    .filter_map(|m| m.display_url())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        posts.push(Post {
            id: tweet.id.clone(),
            text: tweet.text.clone(),
            author: Author {
                id: user.id.clone(),
                name: user.name.clone(),
                username: user.username.clone(),
                followers: user.public_metrics.followers_count,
                verified: user.verified,
            },
            media_urls,
            created_at: tweet.created_at,
            like_count: tweet.public_metrics.like_count,
            retweet_count: tweet.public_metrics.retweet_count,
        });
    }

    posts
}
