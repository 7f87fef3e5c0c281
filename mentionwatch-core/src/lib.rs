//! MentionWatch Core
//!
//! The pure half of the mention feed: the canonical record model, payload
//! normalization, filter composition, pagination and aggregate statistics.
//! Nothing in this crate performs I/O.

pub mod actions;
pub mod error;
pub mod filter;
pub mod mention;
pub mod normalize;
pub mod paginate;
pub mod query;
pub mod stats;

pub use actions::{
    BackendStats, FlagResult, HealthStatus, IngestResult, JournalistMatch, KeywordIngestRequest,
    SentimentDistribution, SourceIngestRequest,
};
pub use error::{ActionError, FetchError};
pub use mention::{DataQuality, Mention, Sentiment, Summary, Timestamp, UNKNOWN_SOURCE};
pub use normalize::{normalize, normalize_batch, NormalizeError, NormalizedBatch};
pub use paginate::{Page, PageRequest, DEFAULT_PAGE_SIZE};
pub use query::{Query, DEFAULT_LIMIT};
pub use stats::{summarize, FeedStats, RiskBucket};
