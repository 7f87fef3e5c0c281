//! Action scenarios: mutations invalidate the cache, failures leave it alone.

use std::sync::Arc;

use mentionwatch_client::App;
use mentionwatch_core::{
    ActionError, HealthStatus, KeywordIngestRequest, Query, SourceIngestRequest,
};
use mentionwatch_test_utils::{fixtures, ingest_rejection, MockBackend};

fn setup() -> (Arc<MockBackend>, App) {
    let backend = Arc::new(MockBackend::new(fixtures::sample_feed()));
    let app = App::with_backend(fixtures::test_config(), backend.clone());
    (backend, app)
}

#[tokio::test]
async fn flag_shows_up_on_next_read() {
    let (backend, app) = setup();
    let query = app.default_query();
    let before = app.feed.view(&query, app.page_request(1)).await;
    assert_eq!(before.stats.flagged, 0);

    let result = app.actions.flag("42", "urgent").await.unwrap();
    assert_eq!(result.article_id, "42");
    assert_eq!(result.reason, "urgent");

    let after = app.feed.view(&query, app.page_request(1)).await;
    assert!(!after.from_cache);
    assert_eq!(backend.calls().fetch, 2);
    let flagged = after
        .filtered
        .iter()
        .find(|m| m.article_id == "42")
        .unwrap();
    assert!(flagged.flagged);
    assert_eq!(flagged.flag_reason.as_deref(), Some("urgent"));
}

#[tokio::test]
async fn flag_invalidates_every_query() {
    let (_backend, app) = setup();
    let all = app.default_query();
    let flagged_only = app.default_query().flagged_only(true);
    app.feed.view(&all, app.page_request(1)).await;
    app.feed.view(&flagged_only, app.page_request(1)).await;
    assert_eq!(app.feed.cache().stats().entries, 2);

    app.actions.flag("42", "urgent").await.unwrap();

    assert_eq!(app.feed.cache().stats().entries, 0);
    let view = app.feed.view(&flagged_only, app.page_request(1)).await;
    assert_eq!(view.filtered.len(), 1);
}

#[tokio::test]
async fn repeated_flags_are_all_sent() {
    let (backend, app) = setup();
    app.actions.flag("42", "urgent").await.unwrap();
    app.actions.flag("42", "legal review").await.unwrap();
    assert_eq!(backend.calls().flag, 2);

    let view = app.feed.view(&app.default_query(), app.page_request(1)).await;
    let record = view.filtered.iter().find(|m| m.article_id == "42").unwrap();
    assert_eq!(record.flag_reason.as_deref(), Some("legal review"));
}

#[tokio::test]
async fn failed_flag_leaves_cache_untouched() {
    let (backend, app) = setup();
    let query = app.default_query();
    app.feed.view(&query, app.page_request(1)).await;

    let err = app.actions.flag("999", "urgent").await.unwrap_err();
    assert!(matches!(err, ActionError::Status { status: 404, .. }));

    assert!(app.feed.cache().contains(&query));
    let view = app.feed.view(&query, app.page_request(1)).await;
    assert!(view.from_cache);
    assert_eq!(backend.calls().fetch, 1);
}

#[tokio::test]
async fn blank_article_id_is_rejected_locally() {
    let (backend, app) = setup();
    let err = app.actions.flag("  ", "urgent").await.unwrap_err();
    assert!(matches!(err, ActionError::InvalidRequest { action: "flag", .. }));
    assert_eq!(backend.calls().flag, 0);
}

#[tokio::test]
async fn keyword_ingest_invalidates_everything() {
    let (backend, app) = setup();
    backend.set_inserted_per_ingest(7);
    let query = app.default_query();
    app.feed.view(&query, app.page_request(1)).await;

    let request = KeywordIngestRequest::new(["AI", "climate"], 5);
    let result = app.actions.ingest_by_keywords(&request).await.unwrap();

    assert_eq!(result.inserted_count, 7);
    assert_eq!(app.feed.cache().stats().entries, 0);
    assert_eq!(backend.keyword_requests()[0].effective_limit(), 10);

    app.feed.view(&query, app.page_request(1)).await;
    assert_eq!(backend.calls().fetch, 2);
}

#[tokio::test]
async fn invalid_keyword_ingest_never_reaches_backend() {
    let (backend, app) = setup();
    let empty = KeywordIngestRequest::new(Vec::<String>::new(), 5);
    let zero = KeywordIngestRequest::new(["AI"], 0);

    for request in [empty, zero] {
        let err = app.actions.ingest_by_keywords(&request).await.unwrap_err();
        assert!(matches!(err, ActionError::InvalidRequest { .. }));
    }
    assert_eq!(backend.calls().keyword_ingest, 0);
}

#[tokio::test]
async fn ingest_rejection_is_surfaced_verbatim() {
    let (backend, app) = setup();
    let query = Query::new(10);
    app.feed.view(&query, app.page_request(1)).await;
    backend.fail_actions_with(Some(ingest_rejection("NewsAPI quota exceeded")));

    let err = app
        .actions
        .ingest_by_keywords(&KeywordIngestRequest::new(["AI"], 5))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "ingest rejected: NewsAPI quota exceeded");
    assert!(app.feed.cache().contains(&query));
    assert_eq!(backend.calls().keyword_ingest, 1);
}

#[tokio::test]
async fn dry_run_source_ingest_keeps_cache() {
    let (backend, app) = setup();
    let query = app.default_query();
    app.feed.view(&query, app.page_request(1)).await;

    let dry = SourceIngestRequest {
        dry_run: true,
        ..SourceIngestRequest::default()
    };
    app.actions.ingest_by_source_config(&dry).await.unwrap();
    assert!(app.feed.cache().contains(&query));

    app.actions
        .ingest_by_source_config(&SourceIngestRequest::default())
        .await
        .unwrap();
    assert!(!app.feed.cache().contains(&query));
    assert_eq!(backend.source_requests().len(), 2);
}

#[tokio::test]
async fn suggest_journalists_is_read_only() {
    let (backend, app) = setup();
    backend.set_matches(vec![
        fixtures::journalist("Ada Reporter", "The Ledger", 0.91),
        fixtures::journalist("Ben Writer", "", 0.72),
    ]);
    let query = app.default_query();
    app.feed.view(&query, app.page_request(1)).await;

    let matches = app.actions.suggest_journalists("AI regulation", 1).await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].name, "Ada Reporter");
    assert!(app.feed.cache().contains(&query));

    let err = app.actions.suggest_journalists(" ", 5).await.unwrap_err();
    assert!(matches!(err, ActionError::InvalidRequest { action: "match", .. }));
}

#[tokio::test]
async fn health_and_stats_pass_through() {
    let (backend, app) = setup();
    assert!(app.actions.health().await.unwrap().is_healthy());

    backend.set_health(HealthStatus::from_status("degraded"));
    assert!(!app.actions.health().await.unwrap().is_healthy());

    let stats = app.actions.backend_stats().await.unwrap();
    assert_eq!(stats.total_mentions, 0);
    assert_eq!(backend.calls().stats, 1);
}
