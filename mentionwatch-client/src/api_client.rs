//! REST implementation of [`MentionBackend`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;

use mentionwatch_core::actions::{
    FlagResponse, HealthResponse, IngestResponse, MatchResponse, FLAG_ACTION, INGEST_ACTION,
    MATCH_ACTION,
};
use mentionwatch_core::filter::server_params;
use mentionwatch_core::normalize::extract_records;
use mentionwatch_core::{
    ActionError, BackendStats, FetchError, FlagResult, HealthStatus, IngestResult,
    JournalistMatch, KeywordIngestRequest, Query, SourceIngestRequest,
};

use crate::backend::MentionBackend;
use crate::config::{ConfigError, MentionWatchConfig};
use crate::error::ClientResult;

pub const MENTIONS_PATH: &str = "/api/mentions";
pub const STATS_PATH: &str = "/api/stats";
pub const HEALTH_PATH: &str = "/api/health";
pub const INGEST_PATH: &str = "/api/ingest";
pub const FLAG_PATH: &str = "/api/flag";
pub const MATCH_PATH: &str = "/api/match";

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// HTTP backend with one client per timeout class.
///
/// Reads, health, stats, flag and match go through `read_client`; the two
/// ingest operations go through `ingest_client`. The admin token is attached
/// to mutating calls only.
#[derive(Clone)]
pub struct RestBackend {
    read_client: reqwest::Client,
    ingest_client: reqwest::Client,
    base_url: String,
    admin_headers: HeaderMap,
}

impl RestBackend {
    pub fn new(config: &MentionWatchConfig) -> ClientResult<Self> {
        let read_client = reqwest::Client::builder()
            .timeout(config.read_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        let ingest_client = reqwest::Client::builder()
            .timeout(config.ingest_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            read_client,
            ingest_client,
            base_url: config.api_base_url.trim().trim_end_matches('/').to_string(),
            admin_headers: build_admin_headers(config.admin_token.as_deref())?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl MentionBackend for RestBackend {
    #[tracing::instrument(skip(self, query), fields(limit = query.limit))]
    async fn fetch_mentions(&self, query: Query) -> Result<Vec<Value>, FetchError> {
        let request = self
            .read_client
            .get(self.url(MENTIONS_PATH))
            .query(&server_params(&query));
        let payload: Value = send(request)
            .await
            .map_err(|f| f.into_fetch(MENTIONS_PATH))?;
        let records = extract_records(payload, MENTIONS_PATH)?;
        tracing::debug!(count = records.len(), "Fetched raw mentions");
        Ok(records)
    }

    #[tracing::instrument(skip(self))]
    async fn flag(&self, article_id: &str, reason: &str) -> Result<FlagResult, ActionError> {
        let request = self
            .read_client
            .post(self.url(FLAG_PATH))
            .headers(self.admin_headers.clone())
            .query(&[("article_id", article_id), ("reason", reason)]);
        let response: FlagResponse = send(request)
            .await
            .map_err(|f| f.into_action(FLAG_ACTION))?;
        Ok(response.into_result(article_id, reason))
    }

    #[tracing::instrument(skip(self, text), fields(text_len = text.len()))]
    async fn suggest_journalists(
        &self,
        text: &str,
        top_k: u32,
    ) -> Result<Vec<JournalistMatch>, ActionError> {
        let request = self
            .read_client
            .get(self.url(MATCH_PATH))
            .query(&[("text", text.to_string()), ("top_k", top_k.to_string())]);
        let matches: Vec<MatchResponse> = send(request)
            .await
            .map_err(|f| f.into_action(MATCH_ACTION))?;
        Ok(matches.into_iter().map(JournalistMatch::from).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn ingest_by_keywords(
        &self,
        request: &KeywordIngestRequest,
    ) -> Result<IngestResult, ActionError> {
        let mut params: Vec<(&str, String)> = request
            .keywords
            .iter()
            .map(|k| ("keywords", k.trim().to_string()))
            .collect();
        params.push(("per_keyword_limit", request.per_keyword_limit.to_string()));
        params.push(("limit", request.effective_limit().to_string()));

        let http = self
            .ingest_client
            .post(self.url(INGEST_PATH))
            .headers(self.admin_headers.clone())
            .query(&params);
        let response: IngestResponse = send(http)
            .await
            .map_err(|f| f.into_action(INGEST_ACTION))?;
        response.into_result()
    }

    #[tracing::instrument(skip(self))]
    async fn ingest_by_source_config(
        &self,
        request: &SourceIngestRequest,
    ) -> Result<IngestResult, ActionError> {
        let http = self
            .ingest_client
            .post(self.url(INGEST_PATH))
            .headers(self.admin_headers.clone())
            .json(request);
        let response: IngestResponse = send(http)
            .await
            .map_err(|f| f.into_action(INGEST_ACTION))?;
        response.into_result()
    }

    #[tracing::instrument(skip(self))]
    async fn health(&self) -> Result<HealthStatus, FetchError> {
        let request = self.read_client.get(self.url(HEALTH_PATH));
        let response: HealthResponse = send(request)
            .await
            .map_err(|f| f.into_fetch(HEALTH_PATH))?;
        Ok(response.into())
    }

    #[tracing::instrument(skip(self))]
    async fn backend_stats(&self) -> Result<BackendStats, FetchError> {
        let request = self.read_client.get(self.url(STATS_PATH));
        send(request).await.map_err(|f| f.into_fetch(STATS_PATH))
    }
}

/// Transport-level outcome before it is attributed to an endpoint or action.
#[derive(Debug, Clone, PartialEq)]
enum Failure {
    Transport(String),
    Timeout,
    Status { status: u16, body: String },
    Malformed(String),
}

impl Failure {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Failure::Timeout
        } else if err.is_decode() {
            Failure::Malformed(err.to_string())
        } else {
            Failure::Transport(err.to_string())
        }
    }

    fn into_fetch(self, endpoint: &str) -> FetchError {
        let endpoint = endpoint.to_string();
        match self {
            Failure::Transport(reason) => FetchError::Transport { endpoint, reason },
            Failure::Timeout => FetchError::Timeout { endpoint },
            Failure::Status { status, body } => FetchError::Status {
                endpoint,
                status,
                body,
            },
            Failure::Malformed(reason) => FetchError::MalformedResponse { endpoint, reason },
        }
    }

    fn into_action(self, action: &'static str) -> ActionError {
        match self {
            Failure::Transport(reason) => ActionError::Transport { action, reason },
            Failure::Timeout => ActionError::Timeout { action },
            Failure::Status { status, body } => ActionError::Status {
                action,
                status,
                body,
            },
            Failure::Malformed(reason) => ActionError::MalformedResponse { action, reason },
        }
    }
}

async fn send<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, Failure> {
    let response = request.send().await.map_err(Failure::from_reqwest)?;
    let status = response.status();
    let text = response.text().await.map_err(Failure::from_reqwest)?;
    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), "Backend returned error status");
        return Err(Failure::Status {
            status: status.as_u16(),
            body: text,
        });
    }
    decode_body(&text)
}

/// An empty 2xx body decodes as `{}`, so responses whose fields are all
/// optional still succeed.
fn decode_body<T: DeserializeOwned>(text: &str) -> Result<T, Failure> {
    if text.trim().is_empty() {
        return serde_json::from_value(Value::Object(serde_json::Map::new()))
            .map_err(|e| Failure::Malformed(format!("empty body: {}", e)));
    }
    serde_json::from_str(text).map_err(|e| Failure::Malformed(e.to_string()))
}

fn build_admin_headers(token: Option<&str>) -> ClientResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) {
        let mut value =
            HeaderValue::from_str(token).map_err(|e| ConfigError::InvalidValue {
                field: "admin_token",
                reason: e.to_string(),
            })?;
        value.set_sensitive(true);
        headers.insert(HeaderName::from_static(ADMIN_TOKEN_HEADER), value);
    }
    Ok(headers)
}
