//! MentionWatch Test Utilities
//!
//! Shared test infrastructure for the MentionWatch workspace:
//! - An in-memory [`MockBackend`] with call counters and injectable failures
//! - Proptest generators for mentions, raw payloads and queries
//! - Fixtures for common feed scenarios

pub use mentionwatch_client::{MentionBackend, MentionWatchConfig};
pub use mentionwatch_core::{
    ActionError, BackendStats, FetchError, FlagResult, HealthStatus, IngestResult,
    JournalistMatch, KeywordIngestRequest, Mention, Query, Sentiment, SourceIngestRequest,
    Summary,
};

use async_trait::async_trait;
use mentionwatch_core::actions::{FLAG_ACTION, INGEST_ACTION};
use mentionwatch_core::filter;
use mentionwatch_core::normalize::normalize;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard, PoisonError};

// ============================================================================
// MOCK BACKEND
// ============================================================================

/// Number of calls made to each backend operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub fetch: usize,
    pub flag: usize,
    pub suggest: usize,
    pub keyword_ingest: usize,
    pub source_ingest: usize,
    pub health: usize,
    pub stats: usize,
}

#[derive(Debug, Default)]
struct MockState {
    records: Vec<Value>,
    calls: CallCounts,
    fetch_failure: Option<FetchError>,
    action_failure: Option<ActionError>,
    inserted_per_ingest: u64,
    matches: Vec<JournalistMatch>,
    health: Option<HealthStatus>,
    stats: BackendStats,
    keyword_requests: Vec<KeywordIngestRequest>,
    source_requests: Vec<SourceIngestRequest>,
}

/// In-memory backend holding raw mention JSON.
///
/// Fetches apply the server-side criteria (sources, sentiment, flagged) and
/// the limit, so client-side filtering is exercised on top. Flags mutate the
/// stored raw records the way the real backend would.
#[derive(Debug, Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new(records: Vec<Value>) -> Self {
        let backend = Self::default();
        backend.set_records(records);
        backend
    }

    pub fn set_records(&self, records: Vec<Value>) {
        self.lock().records = records;
    }

    pub fn push_record(&self, record: Value) {
        self.lock().records.push(record);
    }

    pub fn records(&self) -> Vec<Value> {
        self.lock().records.clone()
    }

    /// Make every fetch (mentions, health, stats) fail with `failure`, or
    /// succeed again with `None`.
    pub fn fail_fetches_with(&self, failure: Option<FetchError>) {
        self.lock().fetch_failure = failure;
    }

    /// Make every action fail with `failure`, or succeed again with `None`.
    pub fn fail_actions_with(&self, failure: Option<ActionError>) {
        self.lock().action_failure = failure;
    }

    /// `inserted_count` reported by successful ingests.
    pub fn set_inserted_per_ingest(&self, inserted: u64) {
        self.lock().inserted_per_ingest = inserted;
    }

    pub fn set_matches(&self, matches: Vec<JournalistMatch>) {
        self.lock().matches = matches;
    }

    pub fn set_health(&self, health: HealthStatus) {
        self.lock().health = Some(health);
    }

    pub fn set_stats(&self, stats: BackendStats) {
        self.lock().stats = stats;
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls.clone()
    }

    pub fn keyword_requests(&self) -> Vec<KeywordIngestRequest> {
        self.lock().keyword_requests.clone()
    }

    pub fn source_requests(&self) -> Vec<SourceIngestRequest> {
        self.lock().source_requests.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The part of `query` the real backend evaluates.
fn server_side(query: &Query) -> Query {
    Query {
        free_text: None,
        source_contains: None,
        ..query.clone()
    }
}

/// Article id of a raw record: top-level `article_id`, else `article.id`.
fn raw_article_id(raw: &Value) -> Option<String> {
    let value = raw
        .get("article_id")
        .or_else(|| raw.get("article").and_then(|a| a.get("id")))?;
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl MentionBackend for MockBackend {
    async fn fetch_mentions(&self, query: Query) -> Result<Vec<Value>, FetchError> {
        let mut state = self.lock();
        state.calls.fetch += 1;
        if let Some(err) = state.fetch_failure.clone() {
            return Err(err);
        }
        let server_query = server_side(&query);
        Ok(state
            .records
            .iter()
            .filter(|raw| match normalize(raw) {
                Ok(mention) => filter::matches(&mention, &server_query),
                // Malformed records reach the client untouched.
                Err(_) => true,
            })
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    async fn flag(&self, article_id: &str, reason: &str) -> Result<FlagResult, ActionError> {
        let mut state = self.lock();
        state.calls.flag += 1;
        if let Some(err) = state.action_failure.clone() {
            return Err(err);
        }
        let mut found = false;
        for raw in state.records.iter_mut() {
            if raw_article_id(raw).as_deref() == Some(article_id) {
                if let Some(obj) = raw.as_object_mut() {
                    obj.insert("flagged".to_string(), Value::Bool(true));
                    obj.insert("flag_reason".to_string(), Value::String(reason.to_string()));
                    found = true;
                }
            }
        }
        if !found {
            return Err(ActionError::Status {
                action: FLAG_ACTION,
                status: 404,
                body: format!("article {} not found", article_id),
            });
        }
        Ok(FlagResult {
            article_id: article_id.to_string(),
            reason: reason.to_string(),
        })
    }

    async fn suggest_journalists(
        &self,
        _text: &str,
        top_k: u32,
    ) -> Result<Vec<JournalistMatch>, ActionError> {
        let mut state = self.lock();
        state.calls.suggest += 1;
        if let Some(err) = state.action_failure.clone() {
            return Err(err);
        }
        Ok(state.matches.iter().take(top_k as usize).cloned().collect())
    }

    async fn ingest_by_keywords(
        &self,
        request: &KeywordIngestRequest,
    ) -> Result<IngestResult, ActionError> {
        let mut state = self.lock();
        state.calls.keyword_ingest += 1;
        state.keyword_requests.push(request.clone());
        if let Some(err) = state.action_failure.clone() {
            return Err(err);
        }
        Ok(IngestResult {
            status: "success".to_string(),
            inserted_count: state.inserted_per_ingest,
            message: None,
        })
    }

    async fn ingest_by_source_config(
        &self,
        request: &SourceIngestRequest,
    ) -> Result<IngestResult, ActionError> {
        let mut state = self.lock();
        state.calls.source_ingest += 1;
        state.source_requests.push(request.clone());
        if let Some(err) = state.action_failure.clone() {
            return Err(err);
        }
        let inserted = if request.dry_run {
            0
        } else {
            state.inserted_per_ingest
        };
        Ok(IngestResult {
            status: "success".to_string(),
            inserted_count: inserted,
            message: request.dry_run.then(|| "dry run".to_string()),
        })
    }

    async fn health(&self) -> Result<HealthStatus, FetchError> {
        let mut state = self.lock();
        state.calls.health += 1;
        if let Some(err) = state.fetch_failure.clone() {
            return Err(err);
        }
        Ok(state.health.clone().unwrap_or(HealthStatus::Healthy))
    }

    async fn backend_stats(&self) -> Result<BackendStats, FetchError> {
        let mut state = self.lock();
        state.calls.stats += 1;
        if let Some(err) = state.fetch_failure.clone() {
            return Err(err);
        }
        Ok(state.stats.clone())
    }
}

/// An action failure of the kind a flaky backend produces.
pub fn ingest_rejection(message: &str) -> ActionError {
    ActionError::Rejected {
        action: INGEST_ACTION,
        message: message.to_string(),
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for mentions, raw payloads and queries.

    use super::*;
    use mentionwatch_core::UNKNOWN_SOURCE;
    use proptest::prelude::*;
    use serde_json::json;

    pub fn arb_sentiment() -> impl Strategy<Value = Sentiment> {
        prop::sample::select(Sentiment::ALL.to_vec())
    }

    pub fn arb_source() -> impl Strategy<Value = String> {
        prop::sample::select(vec![
            "reuters.com".to_string(),
            "bbc.com".to_string(),
            "apnews.com".to_string(),
            UNKNOWN_SOURCE.to_string(),
        ])
    }

    prop_compose! {
        pub fn arb_mention()(
            id in 0u32..10_000,
            source in arb_source(),
            sentiment in arb_sentiment(),
            flagged in any::<bool>(),
            risk in 0.0f64..1.0,
            title in "[a-zA-Z ]{0,24}",
            summary in prop::option::of("[a-zA-Z ]{1,40}"),
        ) -> Mention {
            let mut m = Mention::new(id.to_string(), id.to_string());
            m.source = source;
            m.sentiment = sentiment;
            m.flagged = flagged;
            m.risk_score = risk;
            m.title = title;
            m.summary = summary.map(Summary::Text).unwrap_or(Summary::Unavailable);
            m
        }
    }

    prop_compose! {
        /// A raw backend record in the flat shape, with unique-enough ids.
        pub fn arb_raw_mention()(
            id in 0u32..10_000,
            source in arb_source(),
            sentiment in arb_sentiment(),
            flagged in any::<bool>(),
            risk in 0.0f64..1.0,
            title in "[a-zA-Z ]{1,24}",
        ) -> Value {
            json!({
                "id": id,
                "article_id": format!("a{}", id),
                "title": title,
                "source": source,
                "sentiment": sentiment.as_str(),
                "risk_score": risk,
                "flagged": flagged,
            })
        }
    }

    prop_compose! {
        /// The same record in the nested `article` shape.
        pub fn arb_nested_raw_mention()(
            id in 0u32..10_000,
            sentiment in arb_sentiment(),
            title in "[a-zA-Z ]{1,24}",
            host in prop::sample::select(vec!["www.reuters.com", "bbc.com", "apnews.com"]),
        ) -> Value {
            json!({
                "id": id.to_string(),
                "sentiment": sentiment.as_str(),
                "article": {
                    "id": format!("a{}", id),
                    "title": title,
                    "link": format!("https://{}/story/{}", host, id),
                },
            })
        }
    }

    prop_compose! {
        pub fn arb_query()(
            limit in 1u32..200,
            sources in prop::collection::btree_set(arb_source(), 0..3),
            sentiment in prop::option::of(arb_sentiment()),
            flagged_only in any::<bool>(),
            free_text in prop::option::of("[a-z]{0,3}"),
            source_contains in prop::option::of("[a-z.]{0,3}"),
        ) -> Query {
            let mut query = Query::new(limit)
                .with_sources(sources)
                .with_sentiment(sentiment)
                .flagged_only(flagged_only);
            if let Some(text) = free_text {
                query = query.with_free_text(text);
            }
            if let Some(fragment) = source_contains {
                query = query.with_source_contains(fragment);
            }
            query
        }
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common feed scenarios.

    use super::*;
    use serde_json::json;

    /// A flat raw record.
    pub fn raw_mention(id: u64, article_id: &str, source: &str, sentiment: Sentiment) -> Value {
        json!({
            "id": id,
            "article_id": article_id,
            "title": format!("Story {}", id),
            "source": source,
            "summary": format!("Summary of story {}.", id),
            "sentiment": sentiment.as_str(),
            "sentiment_confidence": 0.9,
            "risk_score": 0.25,
            "created_at": "2024-05-01T12:00:00Z",
            "flagged": false,
        })
    }

    /// Six records across three sources, three of them positive, one of
    /// them for article `"42"`.
    pub fn sample_feed() -> Vec<Value> {
        vec![
            raw_mention(1, "40", "reuters.com", Sentiment::Positive),
            raw_mention(2, "41", "bbc.com", Sentiment::Negative),
            raw_mention(3, "42", "reuters.com", Sentiment::Positive),
            raw_mention(4, "43", "apnews.com", Sentiment::Neutral),
            raw_mention(5, "44", "bbc.com", Sentiment::Positive),
            raw_mention(6, "45", "apnews.com", Sentiment::Negative),
        ]
    }

    /// Defaults with a small page size, for pagination scenarios.
    pub fn test_config() -> MentionWatchConfig {
        MentionWatchConfig {
            page_size: 2,
            ..MentionWatchConfig::default()
        }
    }

    pub fn journalist(name: &str, outlet: &str, score: f64) -> JournalistMatch {
        JournalistMatch {
            name: name.to_string(),
            outlet: outlet.to_string(),
            score,
            topics: vec!["ai".to_string()],
        }
    }

    pub fn timeout() -> FetchError {
        FetchError::Timeout {
            endpoint: "/api/mentions".to_string(),
        }
    }
}
