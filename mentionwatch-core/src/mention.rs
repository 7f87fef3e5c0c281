//! Canonical mention record and its enum types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder source used when neither the payload nor the URL names one.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

// ============================================================================
// SENTIMENT
// ============================================================================

/// Classified sentiment of a mention.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    /// Wire representation used by the backend and query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    /// Parse a backend label. Case and surrounding whitespace are ignored.
    pub fn from_label(s: &str) -> Result<Self, SentimentParseError> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            _ => Err(SentimentParseError(s.to_string())),
        }
    }

    /// Parse a filter selection where `"all"` (or blank) means no filter.
    pub fn parse_filter(s: &str) -> Result<Option<Self>, SentimentParseError> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(None);
        }
        Self::from_label(trimmed).map(Some)
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = SentimentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}

/// Error when parsing an invalid sentiment label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentimentParseError(pub String);

impl fmt::Display for SentimentParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid sentiment: {}", self.0)
    }
}

impl std::error::Error for SentimentParseError {}

// ============================================================================
// SUMMARY
// ============================================================================

/// Normalized summary text.
///
/// `Unavailable` is the explicit "no human-readable summary" marker. It is
/// never body text: it does not match free-text searches and presenters must
/// render it as a notice, not as prose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Summary {
    Text(String),
    #[default]
    Unavailable,
}

impl Summary {
    pub fn text(&self) -> Option<&str> {
        match self {
            Summary::Text(text) => Some(text),
            Summary::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Summary::Text(_))
    }
}

// ============================================================================
// MENTION
// ============================================================================

/// A classified news mention after normalization.
///
/// Every field has a defined value; consumers never see nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    /// Opaque identifier, unique within one fetch result.
    pub id: String,
    /// Opaque identifier of the underlying article. Not unique.
    pub article_id: String,
    pub title: String,
    /// Article link; may be empty.
    pub url: String,
    pub source: String,
    pub summary: Summary,
    pub sentiment: Sentiment,
    /// Classifier confidence in `[0, 1]`.
    pub sentiment_confidence: f64,
    /// Conventionally `[0, 1]`, but not bounded.
    pub risk_score: f64,
    pub created_at: Option<Timestamp>,
    pub flagged: bool,
    pub flag_reason: Option<String>,
    pub named_entities: Option<String>,
}

impl Mention {
    /// A mention with every field at its default and the given identity.
    pub fn new(id: impl Into<String>, article_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            article_id: article_id.into(),
            title: String::new(),
            url: String::new(),
            source: UNKNOWN_SOURCE.to_string(),
            summary: Summary::Unavailable,
            sentiment: Sentiment::Neutral,
            sentiment_confidence: 0.0,
            risk_score: 0.0,
            created_at: None,
            flagged: false,
            flag_reason: None,
            named_entities: None,
        }
    }

    pub fn has_known_source(&self) -> bool {
        self.source != UNKNOWN_SOURCE
    }
}

/// Data-quality findings from normalizing one fetch result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQuality {
    /// Raw records dropped because they could not be normalized.
    pub skipped: usize,
    /// Ids seen more than once in the same response (one entry per repeat).
    pub duplicate_ids: Vec<String>,
}

impl DataQuality {
    pub fn is_clean(&self) -> bool {
        self.skipped == 0 && self.duplicate_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_labels_parse_case_insensitively() {
        assert_eq!(Sentiment::from_label(" Positive "), Ok(Sentiment::Positive));
        assert_eq!("NEGATIVE".parse::<Sentiment>(), Ok(Sentiment::Negative));
        assert!(Sentiment::from_label("mixed").is_err());
    }

    #[test]
    fn all_sentinel_means_no_filter() {
        assert_eq!(Sentiment::parse_filter("All"), Ok(None));
        assert_eq!(Sentiment::parse_filter(""), Ok(None));
        assert_eq!(Sentiment::parse_filter("neutral"), Ok(Some(Sentiment::Neutral)));
        assert!(Sentiment::parse_filter("bogus").is_err());
    }

    #[test]
    fn new_mention_uses_defaults() {
        let mention = Mention::new("1", "42");
        assert_eq!(mention.sentiment, Sentiment::Neutral);
        assert_eq!(mention.summary, Summary::Unavailable);
        assert_eq!(mention.source, UNKNOWN_SOURCE);
        assert!(!mention.has_known_source());
        assert!(!mention.flagged);
    }
}
