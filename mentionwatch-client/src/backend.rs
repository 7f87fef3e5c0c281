//! The backend seam.
//!
//! [`MentionFeed`](crate::feed::MentionFeed) and
//! [`ActionDispatcher`](crate::dispatcher::ActionDispatcher) talk to the
//! mention service only through this trait, so tests can swap in an
//! in-memory backend.

use async_trait::async_trait;
use serde_json::Value;

use mentionwatch_core::{
    ActionError, BackendStats, FetchError, FlagResult, HealthStatus, IngestResult,
    JournalistMatch, KeywordIngestRequest, Query, SourceIngestRequest,
};

#[async_trait]
pub trait MentionBackend: Send + Sync {
    /// Raw records for `query`; normalization happens in the cache.
    async fn fetch_mentions(&self, query: Query) -> Result<Vec<Value>, FetchError>;

    async fn flag(&self, article_id: &str, reason: &str) -> Result<FlagResult, ActionError>;

    async fn suggest_journalists(
        &self,
        text: &str,
        top_k: u32,
    ) -> Result<Vec<JournalistMatch>, ActionError>;

    async fn ingest_by_keywords(
        &self,
        request: &KeywordIngestRequest,
    ) -> Result<IngestResult, ActionError>;

    async fn ingest_by_source_config(
        &self,
        request: &SourceIngestRequest,
    ) -> Result<IngestResult, ActionError>;

    async fn health(&self) -> Result<HealthStatus, FetchError>;

    async fn backend_stats(&self) -> Result<BackendStats, FetchError>;
}
