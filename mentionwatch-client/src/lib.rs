//! MentionWatch client library exports.

pub mod api_client;
pub mod app;
pub mod backend;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod feed;
pub mod present;
pub mod telemetry;

pub use app::App;
pub use backend::MentionBackend;
pub use config::{ConfigError, LoggingConfig, MentionWatchConfig};
pub use dispatcher::ActionDispatcher;
pub use error::{ClientError, ClientResult};
pub use feed::{FeedView, MentionFeed};
