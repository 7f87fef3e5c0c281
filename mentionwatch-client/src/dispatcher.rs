//! Mutating and on-demand backend actions.
//!
//! Successful mutations invalidate the whole feed cache so the next read
//! goes to the backend. Failed actions leave the cache alone and are never
//! retried here.

use std::sync::Arc;

use mentionwatch_cache::FeedCache;
use mentionwatch_core::actions::{FLAG_ACTION, MATCH_ACTION};
use mentionwatch_core::{
    ActionError, BackendStats, FetchError, FlagResult, HealthStatus, IngestResult,
    JournalistMatch, KeywordIngestRequest, SourceIngestRequest,
};

use crate::backend::MentionBackend;

#[derive(Clone)]
pub struct ActionDispatcher {
    cache: Arc<FeedCache>,
    backend: Arc<dyn MentionBackend>,
}

impl ActionDispatcher {
    pub fn new(cache: Arc<FeedCache>, backend: Arc<dyn MentionBackend>) -> Self {
        Self { cache, backend }
    }

    /// Flag an article. Repeated flags are sent as-is; the backend keeps the
    /// last one.
    #[tracing::instrument(skip(self))]
    pub async fn flag(&self, article_id: &str, reason: &str) -> Result<FlagResult, ActionError> {
        if article_id.trim().is_empty() {
            return Err(ActionError::InvalidRequest {
                action: FLAG_ACTION,
                reason: "article_id must not be empty".to_string(),
            });
        }
        let result = self.backend.flag(article_id.trim(), reason).await?;
        self.invalidate_after(FLAG_ACTION);
        Ok(result)
    }

    /// Journalists matching `text`. An empty list means no matches.
    #[tracing::instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn suggest_journalists(
        &self,
        text: &str,
        top_k: u32,
    ) -> Result<Vec<JournalistMatch>, ActionError> {
        if text.trim().is_empty() {
            return Err(ActionError::InvalidRequest {
                action: MATCH_ACTION,
                reason: "text must not be empty".to_string(),
            });
        }
        if top_k == 0 {
            return Err(ActionError::InvalidRequest {
                action: MATCH_ACTION,
                reason: "top_k must be > 0".to_string(),
            });
        }
        self.backend.suggest_journalists(text.trim(), top_k).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn ingest_by_keywords(
        &self,
        request: &KeywordIngestRequest,
    ) -> Result<IngestResult, ActionError> {
        request.validate()?;
        let result = self.backend.ingest_by_keywords(request).await?;
        tracing::info!(inserted = result.inserted_count, "Keyword ingest finished");
        self.invalidate_after("ingest_by_keywords");
        Ok(result)
    }

    /// Source-configured ingest. A dry run changes nothing on the backend,
    /// so the cache is kept.
    #[tracing::instrument(skip(self))]
    pub async fn ingest_by_source_config(
        &self,
        request: &SourceIngestRequest,
    ) -> Result<IngestResult, ActionError> {
        request.validate()?;
        let result = self.backend.ingest_by_source_config(request).await?;
        tracing::info!(
            inserted = result.inserted_count,
            dry_run = request.dry_run,
            "Source ingest finished"
        );
        if !request.dry_run {
            self.invalidate_after("ingest_by_source_config");
        }
        Ok(result)
    }

    pub async fn health(&self) -> Result<HealthStatus, FetchError> {
        self.backend.health().await
    }

    pub async fn backend_stats(&self) -> Result<BackendStats, FetchError> {
        self.backend.backend_stats().await
    }

    fn invalidate_after(&self, action: &'static str) {
        let dropped = self.cache.invalidate_all();
        tracing::debug!(action, dropped, "Invalidated feed cache after mutation");
    }
}
