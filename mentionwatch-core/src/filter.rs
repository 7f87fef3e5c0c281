//! Filter composition over mention collections.
//!
//! The same predicate serves two roles: building the query string for the
//! backend and re-checking whatever the backend sent back. A backend that
//! silently ignores a parameter must not leak unfiltered rows into the view,
//! so [`apply`] always runs every criterion client-side.

use crate::mention::Mention;
use crate::query::Query;

/// Keep the records matching every non-empty criterion of `query`, in order.
pub fn apply(records: &[Mention], query: &Query) -> Vec<Mention> {
    records
        .iter()
        .filter(|record| matches(record, query))
        .cloned()
        .collect()
}

/// Single-record form of [`apply`].
pub fn matches(record: &Mention, query: &Query) -> bool {
    if !query.sources.is_empty() && !query.sources.contains(&record.source) {
        return false;
    }
    if let Some(sentiment) = query.sentiment {
        if record.sentiment != sentiment {
            return false;
        }
    }
    if query.flagged_only && !record.flagged {
        return false;
    }
    if let Some(needle) = non_blank(query.source_contains.as_deref()) {
        if !contains_ignore_case(&record.source, &needle) {
            return false;
        }
    }
    if let Some(needle) = non_blank(query.free_text.as_deref()) {
        let in_title = contains_ignore_case(&record.title, &needle);
        let in_summary = record
            .summary
            .text()
            .is_some_and(|text| contains_ignore_case(text, &needle));
        if !in_title && !in_summary {
            return false;
        }
    }
    true
}

/// Query-string pairs for the criteria the backend understands.
///
/// Free text and source substring have no server-side parameter and are left
/// to [`apply`].
pub fn server_params(query: &Query) -> Vec<(&'static str, String)> {
    let mut params = vec![("limit", query.limit.to_string())];
    params.extend(query.sources.iter().map(|s| ("source", s.clone())));
    if let Some(sentiment) = query.sentiment {
        params.push(("sentiment", sentiment.as_str().to_string()));
    }
    if query.flagged_only {
        params.push(("flagged", "true".to_string()));
    }
    params
}

fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

// `needle` is already lowercased.
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
