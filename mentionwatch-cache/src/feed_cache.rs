//! Query-keyed feed cache with a fixed TTL.
//!
//! At most one entry exists per distinct [`Query`]. Entries are replaced
//! wholesale on refetch, never mutated, and dropped by [`FeedCache::invalidate`]
//! after mutations.
//!
//! # Superseded fetches
//!
//! Each fetch takes a ticket from a monotonically increasing counter and
//! records it as the latest ticket for its key before suspending. On
//! completion the result is committed only if that ticket is still the
//! latest for the key. A newer fetch for the same key, or an invalidation
//! that removed the key, makes the older result uncommittable. The caller
//! that started the older fetch still receives its records.
//!
//! The state lock is a `std::sync::Mutex` and is never held across an
//! `.await`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use mentionwatch_core::normalize::normalize_batch;
use mentionwatch_core::{DataQuality, FetchError, Mention, Query};
use serde_json::Value;

use crate::freshness::{CacheRead, Freshness};

/// Lifetime of a cache entry.
pub const FEED_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Entries older than this are refetched.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl: FEED_TTL }
    }
}

impl CacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Normalized records of one fetch, shared between the cache and readers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedSnapshot {
    pub records: Arc<Vec<Mention>>,
    pub quality: DataQuality,
}

impl FeedSnapshot {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A stored fetch result.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub query: Query,
    pub snapshot: FeedSnapshot,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.fetched_at).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Counters describing cache behaviour since construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub fetch_failures: u64,
    /// Fetch results not committed because a newer fetch or an invalidation
    /// superseded them.
    pub discarded: u64,
    /// Entries dropped by invalidation.
    pub invalidated: u64,
    pub entries: usize,
}

#[derive(Debug, Default)]
struct Slot {
    latest_ticket: u64,
    entry: Option<CacheEntry>,
}

#[derive(Debug, Default)]
struct CacheState {
    slots: HashMap<Query, Slot>,
    next_ticket: u64,
    stats: CacheStats,
}

#[derive(Debug, Default)]
pub struct FeedCache {
    config: CacheConfig,
    state: Mutex<CacheState>,
}

impl FeedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            config,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Read the feed for `query`, invoking `fetcher` on a miss.
    ///
    /// Fetch failures are returned as-is and leave any stored entry for the
    /// query untouched.
    pub async fn get<F, Fut>(
        &self,
        query: &Query,
        freshness: Freshness,
        fetcher: F,
    ) -> Result<CacheRead<FeedSnapshot>, FetchError>
    where
        F: FnOnce(Query) -> Fut,
        Fut: Future<Output = Result<Vec<Value>, FetchError>>,
    {
        let ticket = {
            let mut state = self.lock();
            if freshness.allows_cached() {
                if let Some(read) = self.fresh_entry(&state, query) {
                    state.stats.hits += 1;
                    tracing::debug!(limit = query.limit, "Feed cache hit");
                    return Ok(read);
                }
            }
            state.stats.misses += 1;
            state.next_ticket += 1;
            let ticket = state.next_ticket;
            state.slots.entry(query.clone()).or_default().latest_ticket = ticket;
            ticket
        };

        tracing::debug!(limit = query.limit, ticket, ?freshness, "Feed cache miss, fetching");
        let raws = match fetcher(query.clone()).await {
            Ok(raws) => raws,
            Err(err) => {
                let mut state = self.lock();
                state.stats.fetch_failures += 1;
                // A slot opened only for this fetch has nothing to keep.
                let orphaned = state
                    .slots
                    .get(query)
                    .is_some_and(|slot| slot.entry.is_none() && slot.latest_ticket == ticket);
                if orphaned {
                    state.slots.remove(query);
                }
                tracing::warn!(error = %err, "Feed fetch failed; stored entry left intact");
                return Err(err);
            }
        };

        let batch = normalize_batch(&raws);
        let snapshot = FeedSnapshot {
            records: Arc::new(batch.records),
            quality: batch.quality,
        };
        let fetched_at = Utc::now();

        let mut state = self.lock();
        match state.slots.get_mut(query) {
            Some(slot) if slot.latest_ticket == ticket => {
                slot.entry = Some(CacheEntry {
                    query: query.clone(),
                    snapshot: snapshot.clone(),
                    fetched_at,
                });
            }
            _ => {
                state.stats.discarded += 1;
                tracing::debug!(ticket, "Discarding superseded feed fetch");
            }
        }

        Ok(CacheRead::from_fetch(snapshot, fetched_at))
    }

    /// The stored entry for `query`, whatever its age.
    pub fn last_known(&self, query: &Query) -> Option<CacheRead<FeedSnapshot>> {
        let state = self.lock();
        let entry = state.slots.get(query)?.entry.as_ref()?;
        Some(CacheRead::stale(entry.snapshot.clone(), entry.fetched_at))
    }

    /// Drop every entry whose query matches `predicate`, including keys with
    /// a fetch in flight. Returns the number of stored entries dropped.
    pub fn invalidate<P>(&self, predicate: P) -> usize
    where
        P: Fn(&Query) -> bool,
    {
        let mut state = self.lock();
        let before = state.slots.values().filter(|s| s.entry.is_some()).count();
        state.slots.retain(|query, _| !predicate(query));
        let after = state.slots.values().filter(|s| s.entry.is_some()).count();
        let dropped = before - after;
        state.stats.invalidated += dropped as u64;
        tracing::info!(dropped, "Feed cache invalidated");
        dropped
    }

    pub fn invalidate_all(&self) -> usize {
        self.invalidate(|_| true)
    }

    pub fn contains(&self, query: &Query) -> bool {
        self.lock()
            .slots
            .get(query)
            .is_some_and(|slot| slot.entry.is_some())
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            entries: state.slots.values().filter(|s| s.entry.is_some()).count(),
            ..state.stats.clone()
        }
    }

    fn fresh_entry(&self, state: &CacheState, query: &Query) -> Option<CacheRead<FeedSnapshot>> {
        let entry = state.slots.get(query)?.entry.as_ref()?;
        if entry.age(Utc::now()) < self.config.ttl {
            Some(CacheRead::from_cache(entry.snapshot.clone(), entry.fetched_at))
        } else {
            None
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
