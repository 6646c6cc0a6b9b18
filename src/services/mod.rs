//! External collaborators: search API, webhook delivery, alerting.

pub mod dispatch;
pub mod notify;
pub mod query;
pub mod search;

pub use dispatch::{DiscordWebhook, Dispatcher, WebhookSender};
pub use notify::Notifier;
pub use search::{SearchClient, TwitterSearchClient};
