// src/main.rs

//! birdwatch CLI
//!
//! Polls Twitter recent search for configured keyword queries and relays
//! newly-qualifying posts to Discord webhooks.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use birdwatch::{
    config::Config,
    error::Result,
    pipeline::{IntervalTicker, PollLoop, Relay},
    services::query::{KeywordLogic, build_query},
    services::{DiscordWebhook, Dispatcher, Notifier, TwitterSearchClient},
    storage::{FileSeenStore, SeenStore},
    utils::http,
};

/// birdwatch - Twitter keyword relay
#[derive(Parser, Debug)]
#[command(name = "birdwatch", version, about = "Relays keyword-matched tweets to Discord webhooks")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Path to the seen-post file (dedupe state)
    #[arg(long, default_value = "sent_posts.txt")]
    seen_file: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll continuously until terminated
    Run,

    /// Run a single poll cycle and exit
    Once,

    /// Validate the configuration file
    Validate,

    /// Show configuration and dedupe-state summary
    Info,

    /// Compose a search query string from keywords (for config authoring)
    BuildQuery {
        /// Keywords to combine; phrases are quoted automatically
        keywords: Vec<String>,

        /// Combining logic: AND or OR
        #[arg(long, default_value = "OR")]
        logic: String,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Wire up the full pipeline from a validated config.
async fn build_poll_loop(config: Config, seen_file: &PathBuf) -> Result<PollLoop> {
    let bearer_token = config.resolve_bearer_token()?;
    let client = http::create_client(&config.poll)?;

    // Startup read failure is fatal: without the seen-set there is no
    // duplicate-delivery guarantee.
    let store = FileSeenStore::open(seen_file).await?;
    log::info!(
        "Loaded {} seen post ids from {}",
        store.len().await,
        seen_file.display()
    );

    let config = Arc::new(config);
    let search = Arc::new(TwitterSearchClient::new(client.clone(), bearer_token));
    let sender = Arc::new(DiscordWebhook::new(client));
    let dispatcher = Dispatcher::new(sender.clone());
    let notifier = Notifier::new(sender, config.alert_webhook_url.clone());

    let relay = Relay::new(config, search, Arc::new(store), dispatcher, notifier);
    Ok(PollLoop::new(relay))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::BuildQuery { keywords, logic } = &cli.command {
        let query = build_query(keywords, KeywordLogic::parse(logic));
        println!("{}", query);
        return Ok(());
    }

    log::info!("birdwatch starting...");

    let config = Config::load(&cli.config)?;
    config.validate()?;
    log::info!(
        "Loaded configuration from {} ({} channels)",
        cli.config.display(),
        config.channels.len()
    );

    match cli.command {
        Command::Run => {
            let interval = Duration::from_secs(config.poll.interval_secs);
            let mut poll_loop = build_poll_loop(config, &cli.seen_file).await?;
            let mut ticker = IntervalTicker::new(interval);

            log::info!("Polling every {}s. Ctrl-C to stop.", interval.as_secs());
            poll_loop.run(&mut ticker).await;
        }

        Command::Once => {
            let mut poll_loop = build_poll_loop(config, &cli.seen_file).await?;
            let stats = poll_loop.run_cycle().await;
            log::info!(
                "Single cycle: {} candidates, {} dispatched, {} duplicates skipped, {} filtered out",
                stats.candidates,
                stats.dispatched,
                stats.duplicates_skipped,
                stats.filtered_out
            );
        }

        Command::Validate => {
            // Load + validate already ran above; report what was configured.
            for channel in &config.channels {
                log::info!(
                    "✓ channel '{}' → {}",
                    channel.query,
                    channel.webhook_url
                );
            }
            log::info!("Config OK");
        }

        Command::Info => {
            log::info!("Config file: {}", cli.config.display());
            log::info!("Channels: {}", config.channels.len());
            log::info!(
                "Alert webhook: {}",
                if config.alert_webhook_url.is_some() {
                    "configured"
                } else {
                    "not configured"
                }
            );

            if cli.seen_file.exists() {
                let store = FileSeenStore::open(&cli.seen_file).await?;
                log::info!(
                    "Seen posts: {} ({})",
                    store.len().await,
                    cli.seen_file.display()
                );
            } else {
                log::info!("No seen-post file yet at {}", cli.seen_file.display());
            }
        }

        // Handled before config load
        Command::BuildQuery { .. } => unreachable!(),
    }

    log::info!("Done!");

    Ok(())
}
