use opsdeck_gateway::{GatewayError, Method};
use opsdeck_store::{Priority, Store, StoreConfig, StoreError, CONTROLLER_LABELS, REPORT_FILENAME};
use opsdeck_test_utils::{comparison_payload, init_test_logging, FakeGateway};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn setup() -> (Arc<FakeGateway>, Store) {
    init_test_logging();
    let gateway = Arc::new(FakeGateway::new());
    let store = Store::new(gateway.clone());
    (gateway, store)
}

#[tokio::test]
async fn refresh_swaps_the_whole_dataset() {
    let (gateway, store) = setup();
    gateway.respond(Method::Get, "/test-results", comparison_payload());

    store.comparison().refresh().await.unwrap();

    let overview = store.comparison().overview();
    assert_eq!(overview.total_tests, 128);
    assert_eq!(overview.success_rate, 0.92);
    assert_eq!(overview.differences, 2);

    let performance = store.comparison().controller_performance();
    assert_eq!(performance.labels, CONTROLLER_LABELS);
    assert_eq!(performance.success_rates, vec![0.95, 0.88, 0.93]);
    assert_eq!(performance.performance_scores, vec![87.0, 74.0, 81.0]);
    assert_eq!(performance.security_scores, vec![90.0, 70.0, 85.0]);
}

#[tokio::test]
async fn mismatched_series_payload_is_rejected_without_partial_apply() {
    let (gateway, store) = setup();
    gateway.respond(Method::Get, "/test-results", comparison_payload());
    store.comparison().refresh().await.unwrap();
    let before = store.comparison().dataset();

    let mut bad = comparison_payload();
    bad["responseTimes"]["controllerB"] = json!([12.0, 14.0]);
    bad["totalTests"] = json!(999);
    gateway.respond(Method::Get, "/test-results", bad);

    let result = store.comparison().refresh().await;

    assert!(matches!(result, Err(StoreError::Validation { .. })));
    // The previous dataset survives in full; the inconsistency is
    // reported, not truncated-and-accepted.
    assert_eq!(store.comparison().dataset(), before);
    assert_eq!(store.comparison().overview().total_tests, 128);
    assert!(store.comparison().error().is_some());
}

#[tokio::test]
async fn critical_differences_use_an_inclusive_bound() {
    let (gateway, store) = setup();
    let mut payload = comparison_payload();
    payload["differences"] = json!([
        {"description": "a", "impact": 0.9},
        {"description": "b", "impact": 0.5},
        {"description": "c", "impact": 0.8},
        {"description": "d", "impact": 0.79999}
    ]);
    gateway.respond(Method::Get, "/test-results", payload);
    store.comparison().refresh().await.unwrap();

    let critical = store.comparison().critical_differences();

    assert_eq!(critical.len(), 2);
    assert_eq!(critical[0].description, "a");
    assert_eq!(critical[0].impact, 0.9);
    assert_eq!(critical[1].description, "c");
    assert_eq!(critical[1].impact, 0.8);
}

#[tokio::test]
async fn priority_recommendations_filter_high_and_sort_newest_first() {
    let (gateway, store) = setup();
    let mut payload = comparison_payload();
    payload["recommendations"] = json!([
        {"priority": "high", "text": "older high", "timestamp": "2026-01-05T00:00:00Z"},
        {"priority": "low", "text": "newest but low", "timestamp": "2026-01-09T00:00:00Z"},
        {"priority": "high", "text": "newer high", "timestamp": "2026-01-07T00:00:00Z"}
    ]);
    gateway.respond(Method::Get, "/test-results", payload);
    store.comparison().refresh().await.unwrap();

    let picks = store.comparison().priority_recommendations();

    assert_eq!(picks.len(), 2);
    assert_eq!(picks[0].text, "newer high");
    assert_eq!(picks[1].text, "older high");
    assert!(picks.iter().all(|rec| rec.priority == Priority::High));
}

#[tokio::test]
async fn security_assessment_bundles_metrics_and_findings() {
    let (gateway, store) = setup();
    gateway.respond(Method::Get, "/test-results", comparison_payload());
    store.comparison().refresh().await.unwrap();

    let assessment = store.comparison().security_assessment();

    assert_eq!(assessment.metrics.vulnerability, 82.0);
    assert_eq!(assessment.metrics.error_handling, 76.0);
    assert_eq!(assessment.metrics.input_validation, 88.0);
    assert_eq!(assessment.details.vulnerability.len(), 1);
    assert!(assessment.details.error_handling.is_empty());
}

#[tokio::test]
async fn views_track_dataset_commits() {
    let (gateway, store) = setup();
    gateway.respond(Method::Get, "/test-results", comparison_payload());
    store.comparison().refresh().await.unwrap();

    // Repeated reads of an unchanged dataset are identical.
    assert_eq!(store.comparison().overview(), store.comparison().overview());
    assert_eq!(store.comparison().overview().total_tests, 128);

    let mut updated = comparison_payload();
    updated["totalTests"] = json!(256);
    updated["differences"] = json!([]);
    gateway.respond(Method::Get, "/test-results", updated);
    store.comparison().refresh().await.unwrap();

    let overview = store.comparison().overview();
    assert_eq!(overview.total_tests, 256);
    assert_eq!(overview.differences, 0);
}

#[tokio::test]
async fn export_report_writes_the_fetched_bytes() {
    init_test_logging();
    let gateway = Arc::new(FakeGateway::new());
    let dir = tempfile::tempdir().unwrap();
    let store = Store::with_config(
        gateway.clone(),
        StoreConfig {
            export_dir: dir.path().to_path_buf(),
        },
    );

    let report = b"%PDF-1.4 comparison report".to_vec();
    gateway.respond_bytes("/test-results/export", report.clone());

    let path = store.comparison().export_report().await.unwrap();

    assert_eq!(
        path.file_name().and_then(|name| name.to_str()),
        Some(REPORT_FILENAME)
    );
    assert_eq!(std::fs::read(&path).unwrap(), report);
}

#[tokio::test]
async fn export_failure_propagates_without_mutating_state() {
    let (gateway, store) = setup();
    gateway.respond(Method::Get, "/test-results", comparison_payload());
    store.comparison().refresh().await.unwrap();

    gateway.fail_bytes(
        "/test-results/export",
        GatewayError::Status {
            status: 500,
            message: "report generation failed".to_string(),
        },
    );
    let result = store.comparison().export_report().await;

    assert!(matches!(result, Err(StoreError::Transport(_))));
    // Export does not touch module state, not even the error field.
    assert!(store.comparison().error().is_none());
    assert_eq!(store.comparison().overview().total_tests, 128);
}

#[tokio::test(start_paused = true)]
async fn stale_refresh_does_not_overwrite_fresher_dataset() {
    let (gateway, store) = setup();
    let mut old = comparison_payload();
    old["totalTests"] = json!(1);
    gateway.respond_after(
        Method::Get,
        "/test-results",
        Duration::from_millis(100),
        old,
    );
    gateway.respond_after(
        Method::Get,
        "/test-results",
        Duration::from_millis(10),
        comparison_payload(),
    );

    let (first, second) = tokio::join!(
        store.comparison().refresh(),
        store.comparison().refresh()
    );
    first.unwrap();
    second.unwrap();

    assert_eq!(store.comparison().overview().total_tests, 128);
}
