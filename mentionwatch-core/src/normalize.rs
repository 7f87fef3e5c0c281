//! Record normalization: raw backend JSON into canonical [`Mention`]s.
//!
//! The backend has shipped several payload shapes over time. Article fields
//! may live under a nested `article` object or at the top level, ids may be
//! strings or numbers, and numeric fields may be null or strings. None of
//! that is an error here: every field falls back to its documented default.
//! Only a record that is not a JSON object at all is dropped.

use crate::error::FetchError;
use crate::mention::{DataQuality, Mention, Sentiment, Summary, Timestamp, UNKNOWN_SOURCE};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;
use url::Url;

/// Keys under which a wrapped payload may carry its record array.
const WRAPPER_KEYS: [&str; 4] = ["mentions", "items", "data", "results"];

/// A raw record that cannot be turned into a [`Mention`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Expected a JSON object for a mention record, found {found}")]
    NotAnObject { found: &'static str },
}

/// Normalized records of one fetch plus what was wrong with the raw data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    pub records: Vec<Mention>,
    pub quality: DataQuality,
}

/// Pull the record array out of a `/api/mentions` response body.
pub fn extract_records(payload: Value, endpoint: &str) -> Result<Vec<Value>, FetchError> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => {
            for key in WRAPPER_KEYS {
                if let Some(Value::Array(items)) = obj.remove(key) {
                    return Ok(items);
                }
            }
            Err(FetchError::MalformedResponse {
                endpoint: endpoint.to_string(),
                reason: format!(
                    "expected an array or an object with one of {:?}",
                    WRAPPER_KEYS
                ),
            })
        }
        other => Err(FetchError::MalformedResponse {
            endpoint: endpoint.to_string(),
            reason: format!("expected an array, found {}", json_kind(&other)),
        }),
    }
}

/// Normalize one raw record.
pub fn normalize(raw: &Value) -> Result<Mention, NormalizeError> {
    let obj = raw.as_object().ok_or(NormalizeError::NotAnObject {
        found: json_kind(raw),
    })?;
    let article = obj.get("article").and_then(Value::as_object);

    let url = article
        .and_then(|a| string_at(a, &["link", "url"]))
        .or_else(|| string_at(obj, &["url", "link"]))
        .unwrap_or_default();

    let title = article
        .and_then(|a| string_at(a, &["title"]))
        .or_else(|| string_at(obj, &["title"]))
        .unwrap_or_default();

    let source = article
        .and_then(|a| string_at(a, &["source"]))
        .or_else(|| string_at(obj, &["source"]))
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| source_from_url(&url));

    let article_id = id_at(obj, "article_id")
        .or_else(|| article.and_then(|a| id_at(a, "id")))
        .unwrap_or_default();

    let created_at = obj
        .get("created_at")
        .and_then(parse_timestamp)
        .or_else(|| article.and_then(|a| a.get("published_at")).and_then(parse_timestamp));

    Ok(Mention {
        id: id_at(obj, "id").unwrap_or_default(),
        article_id,
        title: title.trim().to_string(),
        url: url.trim().to_string(),
        source,
        summary: normalize_summary(obj.get("summary")),
        sentiment: obj
            .get("sentiment")
            .and_then(Value::as_str)
            .and_then(|s| Sentiment::from_label(s).ok())
            .unwrap_or_default(),
        sentiment_confidence: number_at(obj, "sentiment_confidence")
            .map(|c| c.clamp(0.0, 1.0))
            .unwrap_or(0.0),
        risk_score: number_at(obj, "risk_score").unwrap_or(0.0),
        created_at,
        flagged: obj.get("flagged").and_then(coerce_bool).unwrap_or(false),
        flag_reason: string_at(obj, &["flag_reason"]).filter(|s| !s.trim().is_empty()),
        named_entities: obj.get("named_entities").and_then(coerce_entities),
    })
}

/// Normalize a whole response, dropping unusable records and resolving
/// duplicate ids (last seen wins, at the first occurrence's position).
pub fn normalize_batch(raws: &[Value]) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(raws.len());

    for raw in raws {
        let mention = match normalize(raw) {
            Ok(mention) => mention,
            Err(err) => {
                tracing::warn!(error = %err, "Skipping unnormalizable mention record");
                batch.quality.skipped += 1;
                continue;
            }
        };

        if mention.id.is_empty() {
            batch.records.push(mention);
            continue;
        }

        match positions.get(&mention.id) {
            Some(&index) => {
                tracing::warn!(id = %mention.id, "Duplicate mention id in one response");
                batch.quality.duplicate_ids.push(mention.id.clone());
                batch.records[index] = mention;
            }
            None => {
                positions.insert(mention.id.clone(), batch.records.len());
                batch.records.push(mention);
            }
        }
    }

    batch
}

/// Source name derived from a URL: the host, lowercased, without a leading
/// `www.` label. `"unknown"` when the URL is empty, unparsable or hostless.
pub fn source_from_url(url: &str) -> String {
    Url::parse(url.trim())
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_lowercase))
        .map(|host| host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
}

/// True for text that is nothing but a well-formed absolute URL with a host.
pub fn is_absolute_url(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return false;
    }
    Url::parse(trimmed).map(|u| u.has_host()).unwrap_or(false)
}

fn normalize_summary(value: Option<&Value>) -> Summary {
    match value.and_then(Value::as_str).map(str::trim) {
        Some(text) if !text.is_empty() && !is_absolute_url(text) => Summary::Text(text.to_string()),
        _ => Summary::Unavailable,
    }
}

fn string_at(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        })
}

fn id_at(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number_at(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    let number = match obj.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_entities(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => {
            let names: Vec<&str> = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            (!names.is_empty()).then(|| names.join(", "))
        }
        _ => None,
    }
}

fn parse_timestamp(value: &Value) -> Option<Timestamp> {
    let text = value.as_str()?.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
