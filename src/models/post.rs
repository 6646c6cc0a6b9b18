// src/models/post.rs

//! Candidate post model.
//!
//! Produced by the search client, read-only downstream. Instances live for
//! one cycle iteration; nothing is buffered across cycles except the
//! seen-set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author metadata attached to a candidate post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Author identifier as reported by the API
    pub id: String,

    /// Display name
    pub name: String,

    /// Handle without the leading `@`
    pub username: String,

    /// Follower count at fetch time
    pub followers: u64,

    /// Verified flag
    pub verified: bool,
}

/// A fetched candidate post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Unique post identifier
    pub id: String,

    /// Text body
    pub text: String,

    /// Author metadata
    pub author: Author,

    /// Resolved media URLs (photos, GIF stills, video previews)
    #[serde(default)]
    pub media_urls: Vec<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Like count at fetch time
    #[serde(default)]
    pub like_count: u64,

    /// Retweet count at fetch time
    #[serde(default)]
    pub retweet_count: u64,
}

impl Post {
    /// Canonical link to the post.
    pub fn url(&self) -> String {
        format!(
            "https://twitter.com/{}/status/{}",
            self.author.username, self.id
        )
    }

    /// Whether the post was created on the given UTC day.
    pub fn created_on(&self, day: chrono::NaiveDate) -> bool {
        self.created_at.date_naive() == day
    }
}
