//! Feed cache with explicit freshness contracts.
//!
//! Reads state their staleness tolerance through [`Freshness`] and come back
//! wrapped in [`CacheRead`], which says whether the data was served from the
//! cache, fetched, or served stale after a failed refetch.
//!
//! ```ignore
//! let read = cache
//!     .get(&query, Freshness::WithinTtl, |q| backend.fetch_mentions(q))
//!     .await?;
//! if read.was_cache_hit() {
//!     tracing::debug!(age = ?read.staleness(), "served from cache");
//! }
//! ```

pub mod feed_cache;
pub mod freshness;

pub use feed_cache::{CacheConfig, CacheEntry, CacheStats, FeedCache, FeedSnapshot, FEED_TTL};
pub use freshness::{CacheRead, Freshness};
