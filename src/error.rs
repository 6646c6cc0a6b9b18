// src/error.rs

//! Unified error handling for the relay application.

use std::fmt;

use thiserror::Error;

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Search API unreachable or rejected our credentials
    #[error("Search unavailable: {0}")]
    SearchUnavailable(String),

    /// Search API reported quota exhaustion; caller must not retry this cycle
    #[error("Rate limited by search API: {0}")]
    RateLimited(String),

    /// Query string rejected by the search API
    #[error("Invalid query '{query}': {message}")]
    InvalidQuery { query: String, message: String },

    /// Webhook delivery failed
    #[error("Dispatch to {webhook} failed: {message}")]
    Dispatch { webhook: String, message: String },

    /// Seen-set read/write error
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a search-unavailable error.
    pub fn search_unavailable(message: impl fmt::Display) -> Self {
        Self::SearchUnavailable(message.to_string())
    }

    /// Create an invalid-query error.
    pub fn invalid_query(query: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::InvalidQuery {
            query: query.into(),
            message: message.to_string(),
        }
    }

    /// Create a dispatch error for a webhook.
    pub fn dispatch(webhook: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Dispatch {
            webhook: webhook.into(),
            message: message.to_string(),
        }
    }

    /// Create a persistence error.
    pub fn persistence(message: impl fmt::Display) -> Self {
        Self::Persistence(message.to_string())
    }
}
