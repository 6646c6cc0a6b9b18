// src/pipeline/cycle.rs

//! One pipeline pass per channel: fetch → window check → filter → dedupe →
//! dispatch → record.
//!
//! Channels are processed strictly sequentially, so the seen-set never sees
//! a racing read-then-write pair. An identifier is recorded only after its
//! post was delivered; a failed dispatch leaves the id unrecorded so a later
//! cycle can retry.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::{ChannelConfig, Config};
use crate::error::Result;
use crate::models::{CycleStats, Post};
use crate::pipeline::filter::{self, FilterDecision};
use crate::services::{Dispatcher, Notifier, SearchClient};
use crate::storage::SeenStore;

/// The wired pipeline: all collaborators for one relay process.
pub struct Relay {
    config: Arc<Config>,
    search: Arc<dyn SearchClient>,
    store: Arc<dyn SeenStore>,
    dispatcher: Dispatcher,
    notifier: Notifier,
}

impl Relay {
    pub fn new(
        config: Arc<Config>,
        search: Arc<dyn SearchClient>,
        store: Arc<dyn SeenStore>,
        dispatcher: Dispatcher,
        notifier: Notifier,
    ) -> Self {
        Self {
            config,
            search,
            store,
            dispatcher,
            notifier,
        }
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Fetch candidates for one channel, honoring its result cap.
    pub(crate) async fn fetch_channel(&self, channel: &ChannelConfig) -> Result<Vec<Post>> {
        let cap = channel.result_cap(self.config.poll.search_limit);
        self.search.search(&channel.query, cap).await
    }

    /// Apply the search window, filter rules, and dedupe check, keeping at
    /// most `max_posts_per_cycle` qualifying posts in fetch order.
    pub(crate) async fn select_qualifying(
        &self,
        channel: &ChannelConfig,
        candidates: Vec<Post>,
        today: NaiveDate,
        stats: &mut CycleStats,
    ) -> Vec<Post> {
        let rules = self.config.filters.merged(&channel.filters);
        let cap = self.config.poll.max_posts_per_cycle;
        let mut qualifying = Vec::new();

        for post in candidates {
            if qualifying.len() >= cap {
                break;
            }

            if !post.created_on(today) {
                stats.outside_window += 1;
                continue;
            }

            match filter::evaluate(&post, &rules) {
                FilterDecision::Accept => {}
                FilterDecision::Reject(reason) => {
                    stats.filtered_out += 1;
                    log::debug!(
                        "Post {} by @{} rejected: {}",
                        post.id,
                        post.author.username,
                        reason.as_str()
                    );
                    continue;
                }
            }

            if self.store.contains(&post.id).await {
                stats.duplicates_skipped += 1;
                continue;
            }

            qualifying.push(post);
        }

        qualifying
    }

    /// Dispatch qualifying posts to the channel webhook, recording each id
    /// after a successful delivery.
    pub(crate) async fn dispatch_all(
        &self,
        channel: &ChannelConfig,
        posts: &[Post],
        stats: &mut CycleStats,
    ) {
        for post in posts {
            let result = self.dispatcher.dispatch(post, &channel.webhook_url).await;

            if let Some(error) = &result.error {
                stats.dispatch_failures += 1;
                self.notifier
                    .notify(
                        "dispatch",
                        &format!("failed to deliver post {} for query '{}'", post.id, channel.query),
                        Some(error),
                    )
                    .await;
                continue;
            }

            stats.dispatched += 1;

            // Delivered but not durably recorded: the post may be redelivered
            // next cycle. Known gap, surfaced rather than hidden.
            if let Err(e) = self.store.record(&post.id).await {
                log::error!("Failed to record dispatched post {}: {}", post.id, e);
                self.notifier
                    .notify(
                        "persistence",
                        &format!("post {} delivered but not recorded; it may be redelivered", post.id),
                        Some(&e.to_string()),
                    )
                    .await;
            }
        }
    }

    /// Report a per-query failure via the notifier.
    pub(crate) async fn report(&self, component: &str, message: &str, cause: Option<&str>) {
        self.notifier.notify(component, message, cause).await;
    }
}
