// src/pipeline/scheduler.rs

//! Poll loop driving the relay pipeline.
//!
//! Explicit state machine `Idle → FetchingQuery → Filtering → Dispatching →
//! Idle`, one full pass per channel per cycle. The loop is driven by a
//! [`Ticker`] rather than an implicit infinite loop so tests can inject a
//! finite number of ticks; the production ticker waits on a fixed interval
//! until the process is terminated externally.
//!
//! A query failure is reported once via the notifier and the loop advances
//! to the next channel; one query never blocks the rest of the cycle.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::models::CycleStats;
use crate::pipeline::cycle::Relay;

/// Poll loop states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    FetchingQuery,
    Filtering,
    Dispatching,
}

/// Clock abstraction for the poll loop.
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next cycle boundary. Returns false to stop the loop.
    async fn tick(&mut self) -> bool;
}

/// Production ticker: fires immediately, then at a fixed interval.
pub struct IntervalTicker {
    interval: tokio::time::Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Test ticker: fires a fixed number of times without sleeping.
pub struct CountedTicker {
    remaining: usize,
}

impl CountedTicker {
    pub fn new(ticks: usize) -> Self {
        Self { remaining: ticks }
    }
}

#[async_trait]
impl Ticker for CountedTicker {
    async fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// The scheduler: iterates channels each tick, one pipeline pass per channel.
pub struct PollLoop {
    relay: Relay,
    state: LoopState,
}

impl PollLoop {
    pub fn new(relay: Relay) -> Self {
        Self {
            relay,
            state: LoopState::Idle,
        }
    }

    /// Current state, for observability.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Run cycles until the ticker stops. Terminal only on external
    /// termination (or ticker exhaustion in tests).
    pub async fn run(&mut self, ticker: &mut dyn Ticker) {
        while ticker.tick().await {
            let stats = self.run_cycle().await;
            log::info!(
                "Cycle complete: {} dispatched, {} duplicates skipped, {} filtered out, {}/{} queries failed",
                stats.dispatched,
                stats.duplicates_skipped,
                stats.filtered_out,
                stats.queries_failed,
                stats.queries_total
            );
        }
        log::info!("Poll loop stopped");
    }

    /// One full cycle over all configured channels.
    pub async fn run_cycle(&mut self) -> CycleStats {
        let today = Utc::now().date_naive();
        let mut stats = CycleStats::default();
        let channels = self.relay.config().channels.clone();

        for channel in &channels {
            stats.queries_total += 1;

            self.state = LoopState::FetchingQuery;
            log::debug!("Fetching candidates for query '{}'", channel.query);
            let candidates = match self.relay.fetch_channel(channel).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    // One report per failed query; the cycle moves on.
                    stats.queries_failed += 1;
                    self.relay
                        .report(
                            "search",
                            &format!("query '{}' failed", channel.query),
                            Some(&e.to_string()),
                        )
                        .await;
                    continue;
                }
            };
            stats.candidates += candidates.len();

            self.state = LoopState::Filtering;
            let qualifying = self
                .relay
                .select_qualifying(channel, candidates, today, &mut stats)
                .await;

            self.state = LoopState::Dispatching;
            self.relay
                .dispatch_all(channel, &qualifying, &mut stats)
                .await;
        }

        self.state = LoopState::Idle;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChannelConfig, Config, FilterOverrides, FilterRules, PollConfig};
    use crate::error::{AppError, Result};
    use crate::models::{Author, Post};
    use crate::services::{Dispatcher, Notifier, SearchClient, WebhookSender};
    use crate::storage::{FileSeenStore, MemorySeenStore, SeenStore};
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    enum Scripted {
        Posts(Vec<Post>),
        RateLimited,
        Unavailable,
    }

    /// Search stub returning a fixed outcome per query.
    struct ScriptedSearch {
        map: HashMap<String, Scripted>,
    }

    #[async_trait]
    impl SearchClient for ScriptedSearch {
        async fn search(&self, query: &str, _max_results: u32) -> Result<Vec<Post>> {
            match self.map.get(query) {
                Some(Scripted::Posts(posts)) => Ok(posts.clone()),
                Some(Scripted::RateLimited) => {
                    Err(AppError::RateLimited("quota exhausted".into()))
                }
                Some(Scripted::Unavailable) | None => {
                    Err(AppError::search_unavailable("no route"))
                }
            }
        }
    }

    /// Sender recording every webhook URL it was asked to hit.
    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl WebhookSender for RecordingSender {
        async fn send(&self, webhook_url: &str, _payload: &Value) -> Result<()> {
            self.sent.lock().unwrap().push(webhook_url.to_string());
            Ok(())
        }
    }

    impl RecordingSender {
        fn count(&self, url_fragment: &str) -> usize {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .filter(|u| u.contains(url_fragment))
                .count()
        }
    }

    fn make_post(id: &str) -> Post {
        Post {
            id: id.to_string(),
            text: format!("post {}", id),
            author: Author {
                id: format!("a{}", id),
                name: "Alice".to_string(),
                username: "alice".to_string(),
                followers: 1000,
                verified: true,
            },
            media_urls: vec![],
            created_at: chrono::Utc::now(),
            like_count: 0,
            retweet_count: 0,
        }
    }

    fn channel(query: &str, hook: &str) -> ChannelConfig {
        ChannelConfig {
            query: query.to_string(),
            webhook_url: format!("https://hooks/{}", hook),
            max_results: None,
            filters: FilterOverrides::default(),
        }
    }

    fn make_loop(
        channels: Vec<ChannelConfig>,
        search: ScriptedSearch,
        store: Arc<dyn SeenStore>,
    ) -> (PollLoop, Arc<RecordingSender>) {
        let config = Arc::new(Config {
            alert_webhook_url: Some("https://hooks/alerts".into()),
            poll: PollConfig::default(),
            filters: FilterRules::default(),
            channels,
            ..Config::default()
        });
        let sender = Arc::new(RecordingSender::default());
        let relay = Relay::new(
            config,
            Arc::new(search),
            store,
            Dispatcher::new(sender.clone()),
            Notifier::new(sender.clone(), Some("https://hooks/alerts".into())),
        );
        (PollLoop::new(relay), sender)
    }

    #[tokio::test]
    async fn state_returns_to_idle_after_cycle() {
        let search = ScriptedSearch {
            map: HashMap::from([("q".to_string(), Scripted::Posts(vec![make_post("1")]))]),
        };
        let (mut poll_loop, _) = make_loop(
            vec![channel("q", "one")],
            search,
            Arc::new(MemorySeenStore::new()),
        );

        assert_eq!(poll_loop.state(), LoopState::Idle);
        poll_loop.run_cycle().await;
        assert_eq!(poll_loop.state(), LoopState::Idle);
    }

    #[tokio::test]
    async fn same_post_across_cycles_dispatched_at_most_once() {
        let search = ScriptedSearch {
            map: HashMap::from([("q".to_string(), Scripted::Posts(vec![make_post("77")]))]),
        };
        let (mut poll_loop, sender) = make_loop(
            vec![channel("q", "one")],
            search,
            Arc::new(MemorySeenStore::new()),
        );

        let mut ticker = CountedTicker::new(2);
        poll_loop.run(&mut ticker).await;

        assert_eq!(sender.count("hooks/one"), 1);
    }

    #[tokio::test]
    async fn preseeded_id_is_never_dispatched() {
        let search = ScriptedSearch {
            map: HashMap::from([("q".to_string(), Scripted::Posts(vec![make_post("77")]))]),
        };
        let (mut poll_loop, sender) = make_loop(
            vec![channel("q", "one")],
            search,
            Arc::new(MemorySeenStore::with_ids(["77".to_string()])),
        );

        poll_loop.run_cycle().await;
        assert_eq!(sender.count("hooks/one"), 0);
    }

    #[tokio::test]
    async fn rate_limited_query_does_not_block_others() {
        let search = ScriptedSearch {
            map: HashMap::from([
                ("limited".to_string(), Scripted::RateLimited),
                (
                    "healthy".to_string(),
                    Scripted::Posts(vec![make_post("5")]),
                ),
            ]),
        };
        let (mut poll_loop, sender) = make_loop(
            vec![channel("limited", "one"), channel("healthy", "two")],
            search,
            Arc::new(MemorySeenStore::new()),
        );

        let stats = poll_loop.run_cycle().await;

        assert_eq!(stats.queries_total, 2);
        assert_eq!(stats.queries_failed, 1);
        assert_eq!(stats.dispatched, 1);
        // Exactly one alert for the rate-limited query
        assert_eq!(sender.count("hooks/alerts"), 1);
        assert_eq!(sender.count("hooks/two"), 1);
    }

    #[tokio::test]
    async fn unavailable_search_alerts_once_per_query() {
        let search = ScriptedSearch {
            map: HashMap::from([("down".to_string(), Scripted::Unavailable)]),
        };
        let (mut poll_loop, sender) = make_loop(
            vec![channel("down", "one")],
            search,
            Arc::new(MemorySeenStore::new()),
        );

        poll_loop.run_cycle().await;
        assert_eq!(sender.count("hooks/alerts"), 1);
    }

    #[tokio::test]
    async fn counted_ticker_drives_finite_cycles() {
        let search = ScriptedSearch {
            map: HashMap::from([("q".to_string(), Scripted::Posts(vec![]))]),
        };
        let (mut poll_loop, _) = make_loop(
            vec![channel("q", "one")],
            search,
            Arc::new(MemorySeenStore::new()),
        );

        let mut ticker = CountedTicker::new(3);
        // Terminates; an exhausted ticker stops the loop.
        poll_loop.run(&mut ticker).await;
        assert_eq!(poll_loop.state(), LoopState::Idle);
    }

    #[tokio::test]
    async fn dedupe_survives_simulated_restart() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("seen.txt");

        {
            let store = Arc::new(FileSeenStore::open(&path).await.unwrap());
            let search = ScriptedSearch {
                map: HashMap::from([("q".to_string(), Scripted::Posts(vec![make_post("9")]))]),
            };
            let (mut poll_loop, sender) = make_loop(vec![channel("q", "one")], search, store);
            poll_loop.run_cycle().await;
            assert_eq!(sender.count("hooks/one"), 1);
        }

        // New process, same seen file: the post must not go out again.
        let store = Arc::new(FileSeenStore::open(&path).await.unwrap());
        assert!(store.contains("9").await);

        let search = ScriptedSearch {
            map: HashMap::from([("q".to_string(), Scripted::Posts(vec![make_post("9")]))]),
        };
        let (mut poll_loop, sender) = make_loop(vec![channel("q", "one")], search, store);
        poll_loop.run_cycle().await;
        assert_eq!(sender.count("hooks/one"), 0);
    }
}
