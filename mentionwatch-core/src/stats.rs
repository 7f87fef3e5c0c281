//! Aggregates over a filtered mention set.
//!
//! Always called with the same filtered collection the paginator slices, so
//! the header numbers describe what the operator is looking at.

use crate::mention::{Mention, Sentiment, UNKNOWN_SOURCE};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedStats {
    pub total: usize,
    /// Distinct sources, not counting the `"unknown"` placeholder.
    pub unique_sources: usize,
    /// Only sentiments that occur are present.
    pub sentiment_counts: BTreeMap<Sentiment, usize>,
    /// Mean risk; 0 for an empty set.
    pub avg_risk: f64,
    /// Per-source counts, `"unknown"` included.
    pub source_counts: BTreeMap<String, usize>,
    pub flagged: usize,
}

impl FeedStats {
    pub fn sentiment_count(&self, sentiment: Sentiment) -> usize {
        self.sentiment_counts.get(&sentiment).copied().unwrap_or(0)
    }

    /// The `n` most frequent sources, ties broken by name.
    pub fn top_sources(&self, n: usize) -> Vec<(String, usize)> {
        let mut sources: Vec<(String, usize)> = self
            .source_counts
            .iter()
            .map(|(source, count)| (source.clone(), *count))
            .collect();
        sources.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        sources.truncate(n);
        sources
    }
}

pub fn summarize(records: &[Mention]) -> FeedStats {
    let mut stats = FeedStats {
        total: records.len(),
        ..FeedStats::default()
    };
    let mut known_sources = BTreeSet::new();
    let mut risk_sum = 0.0;

    for record in records {
        *stats.sentiment_counts.entry(record.sentiment).or_insert(0) += 1;
        *stats.source_counts.entry(record.source.clone()).or_insert(0) += 1;
        if record.source != UNKNOWN_SOURCE {
            known_sources.insert(record.source.as_str());
        }
        if record.flagged {
            stats.flagged += 1;
        }
        risk_sum += record.risk_score;
    }

    stats.unique_sources = known_sources.len();
    if !records.is_empty() {
        stats.avg_risk = risk_sum / records.len() as f64;
    }
    stats
}

/// One bucket of a risk histogram, covering `[lower, upper)` (the last
/// bucket includes `upper`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Histogram of non-zero risk scores over their observed range.
///
/// Zero scores are left out: they are overwhelmingly "not scored" rather
/// than "no risk". Empty when no record carries a non-zero score.
pub fn risk_histogram(records: &[Mention], bins: usize) -> Vec<RiskBucket> {
    let scores: Vec<f64> = records
        .iter()
        .map(|r| r.risk_score)
        .filter(|score| *score != 0.0)
        .collect();
    if scores.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return vec![RiskBucket {
            lower: min,
            upper: max,
            count: scores.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut buckets: Vec<RiskBucket> = (0..bins)
        .map(|i| RiskBucket {
            lower: min + width * i as f64,
            upper: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for score in scores {
        let index = (((score - min) / width) as usize).min(bins - 1);
        buckets[index].count += 1;
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mention(source: &str, sentiment: Sentiment, risk: f64) -> Mention {
        let mut m = Mention::new("", "");
        m.source = source.to_string();
        m.sentiment = sentiment;
        m.risk_score = risk;
        m
    }

    #[test]
    fn empty_input_has_zeroed_stats() {
        let stats = summarize(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.unique_sources, 0);
        assert!(stats.sentiment_counts.is_empty());
        assert_eq!(stats.avg_risk, 0.0);
    }

    #[test]
    fn unknown_source_excluded_from_unique_count() {
        let records = vec![
            mention(UNKNOWN_SOURCE, Sentiment::Neutral, 0.0),
            mention(UNKNOWN_SOURCE, Sentiment::Neutral, 0.0),
        ];
        let stats = summarize(&records);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.unique_sources, 0);
        assert_eq!(stats.source_counts.get(UNKNOWN_SOURCE), Some(&2));
    }

    #[test]
    fn counts_and_average() {
        let records = vec![
            mention("cnn.com", Sentiment::Positive, 0.5),
            mention("cnn.com", Sentiment::Negative, 1.0),
            mention("bbc.com", Sentiment::Positive, 0.0),
        ];
        let stats = summarize(&records);
        assert_eq!(stats.unique_sources, 2);
        assert_eq!(stats.sentiment_count(Sentiment::Positive), 2);
        assert_eq!(stats.sentiment_count(Sentiment::Negative), 1);
        assert_eq!(stats.sentiment_count(Sentiment::Neutral), 0);
        assert!(!stats.sentiment_counts.contains_key(&Sentiment::Neutral));
        assert!((stats.avg_risk - 0.5).abs() < 1e-9);
    }

    #[test]
    fn top_sources_orders_by_count_then_name() {
        let records = vec![
            mention("b.com", Sentiment::Neutral, 0.0),
            mention("a.com", Sentiment::Neutral, 0.0),
            mention("c.com", Sentiment::Neutral, 0.0),
            mention("c.com", Sentiment::Neutral, 0.0),
        ];
        let top = summarize(&records).top_sources(2);
        assert_eq!(
            top,
            vec![("c.com".to_string(), 2), ("a.com".to_string(), 1)]
        );
    }

    #[test]
    fn histogram_ignores_zero_scores() {
        let records = vec![
            mention("a", Sentiment::Neutral, 0.0),
            mention("a", Sentiment::Neutral, 0.1),
            mention("a", Sentiment::Neutral, 0.5),
            mention("a", Sentiment::Neutral, 0.9),
        ];
        let buckets = risk_histogram(&records, 4);
        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 3);
        assert_eq!(buckets[0].count, 1);
        assert_eq!(buckets[3].count, 1);
    }

    #[test]
    fn histogram_of_identical_scores_is_one_bucket() {
        let records = vec![
            mention("a", Sentiment::Neutral, 0.4),
            mention("a", Sentiment::Neutral, 0.4),
        ];
        let buckets = risk_histogram(&records, 20);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].count, 2);
        assert!(risk_histogram(&[], 20).is_empty());
    }
}
