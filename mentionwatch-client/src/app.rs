//! Wiring: one shared cache, one backend, and the two services on top.

use std::sync::Arc;

use mentionwatch_cache::FeedCache;
use mentionwatch_core::{PageRequest, Query};

use crate::api_client::RestBackend;
use crate::backend::MentionBackend;
use crate::config::MentionWatchConfig;
use crate::dispatcher::ActionDispatcher;
use crate::error::ClientResult;
use crate::feed::MentionFeed;

pub struct App {
    pub config: MentionWatchConfig,
    pub feed: MentionFeed,
    pub actions: ActionDispatcher,
}

impl App {
    /// Build against the REST backend described by `config`.
    pub fn new(config: MentionWatchConfig) -> ClientResult<Self> {
        let backend = RestBackend::new(&config)?;
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    pub fn with_backend(config: MentionWatchConfig, backend: Arc<dyn MentionBackend>) -> Self {
        let cache = Arc::new(FeedCache::new());
        Self {
            feed: MentionFeed::new(Arc::clone(&cache), Arc::clone(&backend)),
            actions: ActionDispatcher::new(cache, backend),
            config,
        }
    }

    /// Unfiltered query at the configured default limit.
    pub fn default_query(&self) -> Query {
        Query::new(self.config.default_limit)
    }

    pub fn page_request(&self, number: usize) -> PageRequest {
        self.page_request_sized(number, None)
    }

    /// Page `number` at `size`, or at the configured page size when `None`.
    pub fn page_request_sized(&self, number: usize, size: Option<usize>) -> PageRequest {
        PageRequest::new(number, size.unwrap_or(self.config.page_size))
    }
}
