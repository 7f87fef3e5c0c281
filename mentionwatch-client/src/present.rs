//! Plain-text formatting for the CLI.

use mentionwatch_core::stats::risk_histogram;
use mentionwatch_core::{
    BackendStats, FeedStats, HealthStatus, IngestResult, JournalistMatch, Mention, Sentiment,
    Summary,
};

use crate::feed::FeedView;

pub const SUMMARY_PREVIEW_CHARS: usize = 200;
pub const ENTITIES_PREVIEW_CHARS: usize = 50;
pub const UNTITLED: &str = "(untitled)";
pub const NO_SUMMARY: &str = "(no summary available)";
pub const TOP_SOURCES_SHOWN: usize = 3;
pub const RISK_SPREAD_BINS: usize = 5;

/// Cut `text` to at most `max_chars` characters, marking the cut with `...`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

pub fn format_risk(risk: f64) -> String {
    if risk.is_finite() {
        format!("{:.1}", risk)
    } else {
        "N/A".to_string()
    }
}

pub fn display_title(mention: &Mention) -> &str {
    let title = mention.title.trim();
    if title.is_empty() {
        UNTITLED
    } else {
        title
    }
}

pub fn summary_preview(summary: &Summary) -> String {
    match summary.text() {
        Some(text) => truncate_chars(text, SUMMARY_PREVIEW_CHARS),
        None => NO_SUMMARY.to_string(),
    }
}

/// One block per mention; `position` is 1-based within the whole feed.
pub fn render_mention(position: usize, mention: &Mention) -> String {
    let mut lines = vec![format!("{}. {}", position, display_title(mention))];

    let mut meta = format!("   {}", mention.source);
    if !mention.url.is_empty() {
        meta.push_str(&format!(" <{}>", mention.url));
    }
    lines.push(meta);
    lines.push(format!("   id {} | article {}", mention.id, mention.article_id));

    let mut scores = format!(
        "   {} ({:.0}%) | risk {}",
        mention.sentiment.as_str().to_uppercase(),
        mention.sentiment_confidence * 100.0,
        format_risk(mention.risk_score)
    );
    if let Some(created_at) = mention.created_at {
        scores.push_str(&format!(" | {}", created_at.format("%Y-%m-%d %H:%M")));
    }
    lines.push(scores);

    if mention.flagged {
        let reason = mention.flag_reason.as_deref().unwrap_or("no reason given");
        lines.push(format!("   FLAGGED: {}", reason));
    }
    lines.push(format!("   {}", summary_preview(&mention.summary)));
    if let Some(entities) = mention.named_entities.as_deref().filter(|e| !e.is_empty()) {
        lines.push(format!(
            "   entities: {}",
            truncate_chars(entities, ENTITIES_PREVIEW_CHARS)
        ));
    }
    lines.join("\n")
}

pub fn render_stats(stats: &FeedStats) -> String {
    let sentiments = Sentiment::ALL
        .iter()
        .map(|s| format!("{} {}", s.as_str(), stats.sentiment_count(*s)))
        .collect::<Vec<_>>()
        .join(", ");
    let mut header = format!(
        "{} mentions | {} sources | avg risk {} | flagged {} | {}",
        stats.total,
        stats.unique_sources,
        format_risk(stats.avg_risk),
        stats.flagged,
        sentiments
    );
    let top = stats.top_sources(TOP_SOURCES_SHOWN);
    if !top.is_empty() {
        let top = top
            .iter()
            .map(|(source, count)| format!("{} {}", source, count))
            .collect::<Vec<_>>()
            .join(", ");
        header.push_str(&format!(" | top: {}", top));
    }
    header
}

/// Non-empty risk buckets as `lower-upper count`; `None` when nothing is scored.
pub fn render_risk_spread(records: &[Mention], bins: usize) -> Option<String> {
    let buckets: Vec<String> = risk_histogram(records, bins)
        .iter()
        .filter(|b| b.count > 0)
        .map(|b| format!("{:.2}-{:.2} {}", b.lower, b.upper, b.count))
        .collect();
    if buckets.is_empty() {
        return None;
    }
    Some(format!("risk spread: {}", buckets.join(", ")))
}

/// Stats header, status notices, then the page.
pub fn render_view(view: &FeedView) -> String {
    let mut blocks = vec![render_stats(&view.stats)];
    if let Some(spread) = render_risk_spread(&view.filtered, RISK_SPREAD_BINS) {
        blocks.push(spread);
    }

    if let Some(err) = &view.error {
        if view.stale {
            blocks.push(format!("warning: showing cached data, refresh failed: {}", err));
        } else {
            blocks.push(format!("error: {}", err));
        }
    }
    if !view.quality.is_clean() {
        blocks.push(format!(
            "note: {} malformed record(s) skipped, {} duplicate id(s)",
            view.quality.skipped,
            view.quality.duplicate_ids.len()
        ));
    }

    if view.page.items.is_empty() {
        blocks.push("No mentions match the current filters.".to_string());
    } else {
        for (i, mention) in view.page.items.iter().enumerate() {
            blocks.push(render_mention(view.page.offset + i + 1, mention));
        }
    }

    let source = if view.from_cache { "cache" } else { "backend" };
    blocks.push(format!(
        "page {}/{} ({} total, from {})",
        view.page.number, view.page.max_page, view.page.total, source
    ));
    blocks.join("\n\n")
}

pub fn render_matches(matches: &[JournalistMatch]) -> String {
    if matches.is_empty() {
        return "No matching journalists.".to_string();
    }
    matches
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let outlet = if m.outlet.is_empty() { "independent" } else { m.outlet.as_str() };
            let mut line = format!("{}. {} ({}) score {:.2}", i + 1, m.name, outlet, m.score);
            if !m.topics.is_empty() {
                line.push_str(&format!(" | {}", m.topics.join(", ")));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_ingest(result: &IngestResult) -> String {
    match &result.message {
        Some(message) => format!(
            "{}: inserted {} ({})",
            result.status, result.inserted_count, message
        ),
        None => format!("{}: inserted {}", result.status, result.inserted_count),
    }
}

pub fn render_health(status: &HealthStatus) -> String {
    match status {
        HealthStatus::Healthy => "backend healthy".to_string(),
        HealthStatus::Unhealthy { status } => format!("backend unhealthy (status: {})", status),
    }
}

pub fn render_backend_stats(stats: &BackendStats) -> String {
    let dist = &stats.sentiment_distribution;
    format!(
        "{} mentions stored | positive {}, negative {}, neutral {}",
        stats.total_mentions, dist.positive, dist.negative, dist.neutral
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_chars("short", 200), "short");
        let long = "é".repeat(201);
        let cut = truncate_chars(&long, 200);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }

    #[test]
    fn sentinel_summary_renders_as_notice() {
        assert_eq!(summary_preview(&Summary::Unavailable), NO_SUMMARY);
        assert_eq!(
            summary_preview(&Summary::Text("Markets rallied.".to_string())),
            "Markets rallied."
        );
    }

    #[test]
    fn blank_title_is_untitled() {
        let mut mention = Mention::new("1", "a1");
        assert_eq!(display_title(&mention), UNTITLED);
        mention.title = "Budget passes".to_string();
        assert_eq!(display_title(&mention), "Budget passes");
    }

    #[test]
    fn risk_formatting() {
        assert_eq!(format_risk(0.456), "0.5");
        assert_eq!(format_risk(f64::NAN), "N/A");
    }

    #[test]
    fn flagged_mention_shows_reason() {
        let mut mention = Mention::new("1", "42");
        mention.flagged = true;
        mention.flag_reason = Some("urgent".to_string());
        let block = render_mention(3, &mention);
        assert!(block.starts_with("3. (untitled)"));
        assert!(block.contains("id 1 | article 42"));
        assert!(block.contains("FLAGGED: urgent"));
        assert!(block.contains(NO_SUMMARY));
    }

    fn scored(source: &str, risk: f64) -> Mention {
        let mut mention = Mention::new(source, source);
        mention.source = source.to_string();
        mention.risk_score = risk;
        mention
    }

    #[test]
    fn stats_header_lists_top_sources() {
        let records = vec![
            scored("bbc.com", 0.0),
            scored("cnn.com", 0.0),
            scored("bbc.com", 0.0),
            scored("cnn.com", 0.0),
            scored("cnn.com", 0.0),
            scored("apnews.com", 0.0),
            scored("reuters.com", 0.0),
        ];
        let header = render_stats(&mentionwatch_core::summarize(&records));
        assert!(header.starts_with("7 mentions | 4 sources"));
        assert!(header.ends_with(" | top: cnn.com 3, bbc.com 2, apnews.com 1"));

        let empty = render_stats(&FeedStats::default());
        assert!(!empty.contains("top:"));
    }

    #[test]
    fn risk_spread_skips_empty_buckets() {
        let records = vec![scored("a", 0.25), scored("b", 1.0), scored("c", 0.0), scored("d", 0.5)];
        assert_eq!(
            render_risk_spread(&records, 3).as_deref(),
            Some("risk spread: 0.25-0.50 1, 0.50-0.75 1, 0.75-1.00 1")
        );
        assert_eq!(
            render_risk_spread(&records[..1], 3).as_deref(),
            Some("risk spread: 0.25-0.25 1")
        );
        assert!(render_risk_spread(&[scored("c", 0.0)], 3).is_none());
    }

    #[test]
    fn unhealthy_status_is_shown() {
        let text = render_health(&HealthStatus::from_status("degraded"));
        assert!(text.contains("degraded"));
    }
}
