// src/config.rs

//! Application configuration structures.
//!
//! Loaded once at startup from a TOML file and treated as immutable for the
//! run. The bearer token may come from the `TWITTER_BEARER_TOKEN` environment
//! variable instead of the file.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Environment variable consulted before the config-file token.
pub const BEARER_TOKEN_ENV_VAR: &str = "TWITTER_BEARER_TOKEN";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Twitter API bearer token (fallback if the env var is unset)
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Webhook receiving operational error notifications
    #[serde(default)]
    pub alert_webhook_url: Option<String>,

    /// Polling cadence and per-cycle limits
    #[serde(default)]
    pub poll: PollConfig,

    /// Author filters applied to every channel unless overridden
    #[serde(default)]
    pub filters: FilterRules,

    /// Keyword channels: one search query per destination webhook
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Resolve the bearer token: environment variable first, then the file.
    pub fn resolve_bearer_token(&self) -> Result<String> {
        if let Ok(token) = std::env::var(BEARER_TOKEN_ENV_VAR) {
            if !token.trim().is_empty() {
                return Ok(token);
            }
        }
        self.bearer_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                AppError::config(format!(
                    "Twitter bearer token not found. Set the '{}' environment variable \
                     or the 'bearer_token' config key.",
                    BEARER_TOKEN_ENV_VAR
                ))
            })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.poll.interval_secs == 0 {
            return Err(AppError::config("poll.interval_secs must be > 0"));
        }
        if self.poll.search_limit == 0 {
            return Err(AppError::config("poll.search_limit must be > 0"));
        }
        if self.poll.max_posts_per_cycle == 0 {
            return Err(AppError::config("poll.max_posts_per_cycle must be > 0"));
        }
        if self.poll.timeout_secs == 0 {
            return Err(AppError::config("poll.timeout_secs must be > 0"));
        }
        if self.channels.is_empty() {
            return Err(AppError::config("No channels defined"));
        }

        let mut seen_queries = HashSet::new();
        for channel in &self.channels {
            if channel.query.trim().is_empty() {
                return Err(AppError::config("Channel query string is empty"));
            }
            if !seen_queries.insert(channel.query.as_str()) {
                return Err(AppError::config(format!(
                    "Duplicate channel query '{}'",
                    channel.query
                )));
            }
            validate_webhook_url(&channel.webhook_url)?;
            if channel.max_results == Some(0) {
                return Err(AppError::config(format!(
                    "Channel '{}': max_results must be > 0",
                    channel.query
                )));
            }
        }

        if let Some(url) = &self.alert_webhook_url {
            validate_webhook_url(url)?;
        }

        Ok(())
    }
}

/// Check that a webhook URL parses and uses an HTTP scheme.
fn validate_webhook_url(raw: &str) -> Result<()> {
    let url = Url::parse(raw)
        .map_err(|e| AppError::config(format!("Invalid webhook URL '{}': {}", raw, e)))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(AppError::config(format!(
            "Webhook URL '{}' must use http(s)",
            raw
        )));
    }
    Ok(())
}

/// Polling cadence and per-cycle limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds between cycle starts
    #[serde(default = "defaults::interval_secs")]
    pub interval_secs: u64,

    /// Default result cap requested from the search API per query
    #[serde(default = "defaults::search_limit")]
    pub search_limit: u32,

    /// Maximum posts dispatched per query per cycle
    #[serde(default = "defaults::max_posts_per_cycle")]
    pub max_posts_per_cycle: usize,

    /// HTTP request timeout in seconds
    #[serde(default = "defaults::timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval_secs(),
            search_limit: defaults::search_limit(),
            max_posts_per_cycle: defaults::max_posts_per_cycle(),
            timeout_secs: defaults::timeout_secs(),
            user_agent: defaults::user_agent(),
        }
    }
}

/// Author filters. Used both as the global default set and, fully resolved,
/// as the effective rules for one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FilterRules {
    /// Minimum author follower count
    #[serde(default)]
    pub min_followers: u64,

    /// Require a verified author
    #[serde(default)]
    pub only_verified: bool,

    /// Usernames always rejected (case-sensitive exact match)
    #[serde(default)]
    pub blacklist_usernames: Vec<String>,

    /// If non-empty, only these usernames are admitted
    #[serde(default)]
    pub whitelist_usernames: Vec<String>,
}

impl FilterRules {
    /// Resolve per-channel overrides field-by-field over these rules.
    pub fn merged(&self, overrides: &FilterOverrides) -> FilterRules {
        FilterRules {
            min_followers: overrides.min_followers.unwrap_or(self.min_followers),
            only_verified: overrides.only_verified.unwrap_or(self.only_verified),
            blacklist_usernames: overrides
                .blacklist_usernames
                .clone()
                .unwrap_or_else(|| self.blacklist_usernames.clone()),
            whitelist_usernames: overrides
                .whitelist_usernames
                .clone()
                .unwrap_or_else(|| self.whitelist_usernames.clone()),
        }
    }
}

/// Per-channel filter overrides. Unset fields inherit the global value.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FilterOverrides {
    #[serde(default)]
    pub min_followers: Option<u64>,

    #[serde(default)]
    pub only_verified: Option<bool>,

    #[serde(default)]
    pub blacklist_usernames: Option<Vec<String>>,

    #[serde(default)]
    pub whitelist_usernames: Option<Vec<String>>,
}

/// One keyword channel: a search query paired with a destination webhook.
///
/// Identity is the query string; queries must be unique within a config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Search query, including any operator syntax (e.g. `"AI lang:en"`)
    pub query: String,

    /// Destination Discord webhook URL
    pub webhook_url: String,

    /// Per-channel result cap (defaults to poll.search_limit)
    #[serde(default)]
    pub max_results: Option<u32>,

    /// Per-channel filter overrides
    #[serde(default)]
    pub filters: FilterOverrides,
}

impl ChannelConfig {
    /// Effective result cap for this channel.
    pub fn result_cap(&self, default_limit: u32) -> u32 {
        self.max_results.unwrap_or(default_limit)
    }
}

mod defaults {
    pub fn interval_secs() -> u64 {
        300
    }
    pub fn search_limit() -> u32 {
        50
    }
    pub fn max_posts_per_cycle() -> usize {
        5
    }
    pub fn timeout_secs() -> u64 {
        30
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; birdwatch/1.0)".into()
    }
}
