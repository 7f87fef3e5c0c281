//! Read path: cache, filter, paginate and summarize in one call.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use mentionwatch_cache::{CacheRead, FeedCache, FeedSnapshot, Freshness};
use mentionwatch_core::filter;
use mentionwatch_core::paginate::paginate;
use mentionwatch_core::{
    summarize, DataQuality, FeedStats, FetchError, Mention, Page, PageRequest, Query,
};

use crate::backend::MentionBackend;

/// Everything a caller needs to render one page of the feed.
#[derive(Debug, Clone)]
pub struct FeedView {
    pub query: Query,
    /// Every record passing the query, in backend order.
    pub filtered: Vec<Mention>,
    pub page: Page<Mention>,
    /// Aggregates over `filtered`, not over the page.
    pub stats: FeedStats,
    pub quality: DataQuality,
    pub from_cache: bool,
    /// Served from the last known-good entry after a failed fetch.
    pub stale: bool,
    /// `None` when no data was available at all.
    pub fetched_at: Option<DateTime<Utc>>,
    /// The fetch failure, when one occurred. Data in the view is then either
    /// a stale entry or empty.
    pub error: Option<FetchError>,
}

impl FeedView {
    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }
}

#[derive(Clone)]
pub struct MentionFeed {
    cache: Arc<FeedCache>,
    backend: Arc<dyn MentionBackend>,
}

impl MentionFeed {
    pub fn new(cache: Arc<FeedCache>, backend: Arc<dyn MentionBackend>) -> Self {
        Self { cache, backend }
    }

    pub fn cache(&self) -> &Arc<FeedCache> {
        &self.cache
    }

    /// Read `query`, serving a cached entry when it is within the TTL.
    pub async fn view(&self, query: &Query, page_request: PageRequest) -> FeedView {
        self.read(query, page_request, Freshness::WithinTtl).await
    }

    /// Read `query` straight from the backend, replacing its cache entry.
    pub async fn refresh(&self, query: &Query, page_request: PageRequest) -> FeedView {
        self.read(query, page_request, Freshness::Fresh).await
    }

    async fn read(&self, query: &Query, page_request: PageRequest, freshness: Freshness) -> FeedView {
        let backend = Arc::clone(&self.backend);
        let result = self
            .cache
            .get(query, freshness, move |q| async move {
                backend.fetch_mentions(q).await
            })
            .await;

        match result {
            Ok(read) => build_view(query, page_request, Some(read), None),
            Err(err) => {
                let fallback = self.cache.last_known(query);
                tracing::warn!(
                    error = %err,
                    has_fallback = fallback.is_some(),
                    "Feed fetch failed"
                );
                build_view(query, page_request, fallback, Some(err))
            }
        }
    }
}

fn build_view(
    query: &Query,
    page_request: PageRequest,
    read: Option<CacheRead<FeedSnapshot>>,
    error: Option<FetchError>,
) -> FeedView {
    let (snapshot, from_cache, stale, fetched_at) = match read {
        Some(read) => {
            let from_cache = read.was_cache_hit();
            let stale = read.is_stale_fallback();
            let fetched_at = read.fetched_at();
            (read.into_value(), from_cache, stale, Some(fetched_at))
        }
        None => (FeedSnapshot::default(), false, false, None),
    };

    let filtered = filter::apply(&snapshot.records, query);
    let stats = summarize(&filtered);
    let page = paginate(&filtered, page_request);

    FeedView {
        query: query.clone(),
        filtered,
        page,
        stats,
        quality: snapshot.quality,
        from_cache,
        stale,
        fetched_at,
        error,
    }
}
