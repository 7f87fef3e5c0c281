//! Request and result types for backend actions.
//!
//! Wire responses are decoded into the `*Response` structs and then
//! interpreted here, so every backend implementation agrees on what counts
//! as success.

use crate::error::ActionError;
use serde::{Deserialize, Serialize};

pub const FLAG_ACTION: &str = "flag";
pub const MATCH_ACTION: &str = "match";
pub const INGEST_ACTION: &str = "ingest";

// ============================================================================
// FLAG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagResult {
    pub article_id: String,
    pub reason: String,
}

/// Body of `POST /api/flag`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlagResponse {
    #[serde(default)]
    pub reason: Option<String>,
}

impl FlagResponse {
    /// Echoed reason wins; the submitted one is used when the body omits it.
    pub fn into_result(self, article_id: &str, submitted_reason: &str) -> FlagResult {
        FlagResult {
            article_id: article_id.to_string(),
            reason: self
                .reason
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| submitted_reason.to_string()),
        }
    }
}

// ============================================================================
// JOURNALIST MATCH
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalistMatch {
    pub name: String,
    pub outlet: String,
    pub score: f64,
    pub topics: Vec<String>,
}

/// One element of the `GET /api/match` array.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub outlet: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub topics: Option<Topics>,
}

/// Topics arrive either as one comma-separated string or as a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Topics {
    List(Vec<String>),
    Joined(String),
}

impl Topics {
    pub fn into_vec(self) -> Vec<String> {
        let items = match self {
            Topics::List(items) => items,
            Topics::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        };
        items
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

impl From<MatchResponse> for JournalistMatch {
    fn from(raw: MatchResponse) -> Self {
        Self {
            name: raw.name.unwrap_or_default(),
            outlet: raw.outlet.unwrap_or_default(),
            score: raw.score.filter(|s| s.is_finite()).unwrap_or(0.0),
            topics: raw.topics.map(Topics::into_vec).unwrap_or_default(),
        }
    }
}

// ============================================================================
// INGEST
// ============================================================================

/// Keyword-driven ingest (`POST /api/ingest?keywords=...`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordIngestRequest {
    pub keywords: Vec<String>,
    pub per_keyword_limit: u32,
    /// Overall cap; defaults to `keywords.len() * per_keyword_limit`.
    pub limit: Option<u32>,
}

impl KeywordIngestRequest {
    pub fn new<I, S>(keywords: I, per_keyword_limit: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            per_keyword_limit,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Reject empty keyword lists, blank keywords and a zero limit before
    /// anything goes over the wire.
    pub fn validate(&self) -> Result<(), ActionError> {
        if self.keywords.is_empty() {
            return Err(invalid("keywords must not be empty"));
        }
        if self.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(invalid("keywords must not be blank"));
        }
        if self.per_keyword_limit == 0 {
            return Err(invalid("per_keyword_limit must be > 0"));
        }
        if self.limit == Some(0) {
            return Err(invalid("limit must be > 0"));
        }
        Ok(())
    }

    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or_else(|| {
            (self.keywords.len() as u32).saturating_mul(self.per_keyword_limit)
        })
    }
}

/// Source-configured ingest (`POST /api/ingest` with a JSON body).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceIngestRequest {
    pub source: String,
    pub limit: u32,
    pub backfill_days: u32,
    pub dry_run: bool,
}

impl SourceIngestRequest {
    pub fn validate(&self) -> Result<(), ActionError> {
        if self.source.trim().is_empty() {
            return Err(invalid("source must not be empty"));
        }
        if self.limit == 0 {
            return Err(invalid("limit must be > 0"));
        }
        Ok(())
    }
}

impl Default for SourceIngestRequest {
    fn default() -> Self {
        Self {
            source: "demo".to_string(),
            limit: 10,
            backfill_days: 2,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestResult {
    pub status: String,
    pub inserted_count: u64,
    pub message: Option<String>,
}

/// Body of `POST /api/ingest`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub inserted: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl IngestResponse {
    /// A missing status on a 2xx response counts as success; `success` and
    /// `ok` are success in any case. Any other status is a rejection whose
    /// message is passed through untouched.
    pub fn into_result(self) -> Result<IngestResult, ActionError> {
        let status = self.status.unwrap_or_else(|| "success".to_string());
        let normalized = status.trim().to_lowercase();
        if normalized == "success" || normalized == "ok" {
            return Ok(IngestResult {
                status,
                inserted_count: self.inserted.unwrap_or(0),
                message: self.message,
            });
        }
        Err(ActionError::Rejected {
            action: INGEST_ACTION,
            message: self.message.unwrap_or(status),
        })
    }
}

// ============================================================================
// HEALTH & STATS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Backend answered with a status other than `ok`.
    Unhealthy { status: String },
}

impl HealthStatus {
    pub fn from_status(status: &str) -> Self {
        if status.trim().eq_ignore_ascii_case("ok") {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy {
                status: status.to_string(),
            }
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: Option<String>,
}

impl From<HealthResponse> for HealthStatus {
    fn from(raw: HealthResponse) -> Self {
        HealthStatus::from_status(raw.status.as_deref().unwrap_or(""))
    }
}

/// Backend-wide counters from `GET /api/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendStats {
    #[serde(default)]
    pub total_mentions: u64,
    #[serde(default)]
    pub sentiment_distribution: SentimentDistribution,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    #[serde(default)]
    pub positive: u64,
    #[serde(default)]
    pub negative: u64,
    #[serde(default)]
    pub neutral: u64,
}

fn invalid(reason: &str) -> ActionError {
    ActionError::InvalidRequest {
        action: INGEST_ACTION,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flag_reason_falls_back_to_submitted() {
        let result = FlagResponse::default().into_result("42", "urgent");
        assert_eq!(result.reason, "urgent");
        assert_eq!(result.article_id, "42");

        let echoed = FlagResponse {
            reason: Some("urgent (reviewed)".to_string()),
        }
        .into_result("42", "urgent");
        assert_eq!(echoed.reason, "urgent (reviewed)");
    }

    #[test]
    fn match_topics_accept_both_shapes() {
        let joined: MatchResponse = serde_json::from_value(json!({
            "name": "Ada Reporter", "outlet": "The Ledger", "score": 0.8,
            "topics": "ai, climate ,"
        }))
        .unwrap();
        assert_eq!(JournalistMatch::from(joined).topics, vec!["ai", "climate"]);

        let listed: MatchResponse =
            serde_json::from_value(json!({"name": "B", "topics": ["tech"]})).unwrap();
        let listed = JournalistMatch::from(listed);
        assert_eq!(listed.topics, vec!["tech"]);
        assert_eq!(listed.score, 0.0);
        assert_eq!(listed.outlet, "");
    }

    #[test]
    fn keyword_request_validation() {
        assert!(KeywordIngestRequest::new(["AI", "climate"], 5).validate().is_ok());
        assert!(KeywordIngestRequest::new(Vec::<String>::new(), 5).validate().is_err());
        assert!(KeywordIngestRequest::new(["AI"], 0).validate().is_err());
        assert!(KeywordIngestRequest::new(["AI", " "], 5).validate().is_err());
        assert!(KeywordIngestRequest::new(["AI"], 5).with_limit(0).validate().is_err());
    }

    #[test]
    fn keyword_limit_defaults_to_product() {
        let request = KeywordIngestRequest::new(["AI", "journalism", "technology"], 5);
        assert_eq!(request.effective_limit(), 15);
        assert_eq!(request.with_limit(20).effective_limit(), 20);
    }

    #[test]
    fn ingest_success_statuses() {
        let ok = IngestResponse {
            status: Some("success".to_string()),
            inserted: Some(7),
            message: None,
        }
        .into_result()
        .unwrap();
        assert_eq!(ok.inserted_count, 7);

        let implicit = IngestResponse::default().into_result().unwrap();
        assert_eq!(implicit.inserted_count, 0);

        assert!(IngestResponse {
            status: Some("OK".to_string()),
            ..Default::default()
        }
        .into_result()
        .is_ok());
    }

    #[test]
    fn ingest_failure_message_is_verbatim() {
        let err = IngestResponse {
            status: Some("error".to_string()),
            inserted: Some(0),
            message: Some("Feed fetch failed: 429 Too Many Requests".to_string()),
        }
        .into_result()
        .unwrap_err();
        assert_eq!(
            err,
            ActionError::Rejected {
                action: INGEST_ACTION,
                message: "Feed fetch failed: 429 Too Many Requests".to_string(),
            }
        );
    }

    #[test]
    fn health_status_parsing() {
        assert!(HealthStatus::from(HealthResponse {
            status: Some("ok".to_string())
        })
        .is_healthy());
        assert_eq!(
            HealthStatus::from(HealthResponse::default()),
            HealthStatus::Unhealthy {
                status: String::new()
            }
        );
    }

    #[test]
    fn backend_stats_tolerate_missing_fields() {
        let stats: BackendStats = serde_json::from_value(json!({"total_mentions": 12})).unwrap();
        assert_eq!(stats.total_mentions, 12);
        assert_eq!(stats.sentiment_distribution, SentimentDistribution::default());
    }
}
