//! Feed query: limit plus filter criteria.
//!
//! A `Query` is also the cache key. Sources live in a `BTreeSet`, so two
//! queries naming the same sources in a different order are equal and hash
//! identically.

use crate::mention::Sentiment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default number of mentions requested from the backend.
pub const DEFAULT_LIMIT: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    /// Maximum number of records requested from the backend. Always > 0.
    pub limit: u32,
    /// Exact source names to keep. Empty means no source filter.
    pub sources: BTreeSet<String>,
    /// `None` is the "all sentiments" selection.
    pub sentiment: Option<Sentiment>,
    pub flagged_only: bool,
    /// Case-insensitive substring over title and summary.
    pub free_text: Option<String>,
    /// Case-insensitive substring over the source name. Client-side only.
    pub source_contains: Option<String>,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            sources: BTreeSet::new(),
            sentiment: None,
            flagged_only: false,
            free_text: None,
            source_contains: None,
        }
    }
}

impl Query {
    pub fn new(limit: u32) -> Self {
        Self::default().with_limit(limit)
    }

    /// Set the limit. Zero is raised to 1.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.sources.insert(source.into());
        self
    }

    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources.extend(sources.into_iter().map(Into::into));
        self
    }

    pub fn with_sentiment(mut self, sentiment: Option<Sentiment>) -> Self {
        self.sentiment = sentiment;
        self
    }

    pub fn flagged_only(mut self, flagged_only: bool) -> Self {
        self.flagged_only = flagged_only;
        self
    }

    /// Set the free-text search. Blank text clears it.
    pub fn with_free_text(mut self, text: impl Into<String>) -> Self {
        self.free_text = non_blank(text.into());
        self
    }

    /// Set the source substring filter. Blank text clears it.
    pub fn with_source_contains(mut self, text: impl Into<String>) -> Self {
        self.source_contains = non_blank(text.into());
        self
    }

    /// True when no criterion would remove a record.
    pub fn is_unfiltered(&self) -> bool {
        self.sources.is_empty()
            && self.sentiment.is_none()
            && !self.flagged_only
            && self.free_text.as_deref().map_or(true, |t| t.trim().is_empty())
            && self
                .source_contains
                .as_deref()
                .map_or(true, |t| t.trim().is_empty())
    }
}

fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
