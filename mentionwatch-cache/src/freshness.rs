//! Freshness contracts for feed reads.
//!
//! Callers say how much staleness they accept, and every read carries its
//! own age so the presentation layer can show it.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Freshness requirement for a feed read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    /// Serve a stored entry younger than the cache TTL, otherwise fetch.
    #[default]
    WithinTtl,

    /// Ignore any stored entry and fetch. The result replaces the entry.
    ///
    /// Used by explicit refresh after the operator asks for current data.
    Fresh,
}

impl Freshness {
    pub fn allows_cached(&self) -> bool {
        matches!(self, Self::WithinTtl)
    }
}

/// Result of a feed read, carrying where it came from and how old it is.
#[derive(Debug, Clone)]
pub struct CacheRead<T> {
    value: T,
    /// When the underlying data was fetched from the backend.
    fetched_at: DateTime<Utc>,
    was_cache_hit: bool,
    /// Served past its TTL because a refetch failed.
    stale_fallback: bool,
}

impl<T> CacheRead<T> {
    /// A read served from a stored entry within its TTL.
    pub fn from_cache(value: T, fetched_at: DateTime<Utc>) -> Self {
        Self {
            value,
            fetched_at,
            was_cache_hit: true,
            stale_fallback: false,
        }
    }

    /// A read that went to the backend.
    pub fn from_fetch(value: T, fetched_at: DateTime<Utc>) -> Self {
        Self {
            value,
            fetched_at,
            was_cache_hit: false,
            stale_fallback: false,
        }
    }

    /// A stored entry served regardless of age.
    pub fn stale(value: T, fetched_at: DateTime<Utc>) -> Self {
        Self {
            value,
            fetched_at,
            was_cache_hit: true,
            stale_fallback: true,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Time since the data was fetched.
    pub fn staleness(&self) -> Duration {
        let now = Utc::now();
        if now > self.fetched_at {
            (now - self.fetched_at).to_std().unwrap_or(Duration::ZERO)
        } else {
            Duration::ZERO
        }
    }

    pub fn was_cache_hit(&self) -> bool {
        self.was_cache_hit
    }

    pub fn was_cache_miss(&self) -> bool {
        !self.was_cache_hit
    }

    pub fn is_stale_fallback(&self) -> bool {
        self.stale_fallback
    }

    pub fn map<U, F>(self, f: F) -> CacheRead<U>
    where
        F: FnOnce(T) -> U,
    {
        CacheRead {
            value: f(self.value),
            fetched_at: self.fetched_at,
            was_cache_hit: self.was_cache_hit,
            stale_fallback: self.stale_fallback,
        }
    }
}

impl<T> AsRef<T> for CacheRead<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_freshness_allows_cached() {
        assert!(Freshness::default().allows_cached());
        assert!(!Freshness::Fresh.allows_cached());
    }

    #[test]
    fn read_origin_flags() {
        let hit = CacheRead::from_cache("feed", Utc::now());
        assert!(hit.was_cache_hit());
        assert!(!hit.is_stale_fallback());

        let miss = CacheRead::from_fetch(3, Utc::now());
        assert!(miss.was_cache_miss());

        let stale = CacheRead::stale((), Utc::now());
        assert!(stale.was_cache_hit());
        assert!(stale.is_stale_fallback());
    }

    #[test]
    fn staleness_grows_with_age() {
        let read = CacheRead::from_cache("x", Utc::now() - chrono::Duration::seconds(5));
        let staleness = read.staleness();
        assert!(staleness >= Duration::from_secs(4));
        assert!(staleness <= Duration::from_secs(10));
    }

    #[test]
    fn map_keeps_metadata() {
        let fetched_at = Utc::now();
        let read = CacheRead::stale(21, fetched_at).map(|v| v * 2);
        assert_eq!(read.fetched_at(), fetched_at);
        assert!(read.is_stale_fallback());
        assert_eq!(read.into_value(), 42);
    }
}
