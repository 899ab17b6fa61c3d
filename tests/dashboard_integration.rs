//! Drives the dashboard the way a front end would: bootstrap, switch views,
//! refresh status.
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tradeboard::api::ResourceKind;
use tradeboard::api::testing::{ScriptedTransport, wait_until};
use tradeboard::app::{AppContext, Dashboard, STARTUP_RESOURCES, StatusSummary};
use tradeboard::cache::EntryState;
use tradeboard::config::DashboardConfig;
use tradeboard::view::{ViewContent, ViewSelection, ViewState};

fn backend() -> Arc<ScriptedTransport> {
    let transport = Arc::new(ScriptedTransport::new());
    transport.always_json(
        "/api/status",
        &json!({"total_records": 50, "last_updated": "2024-05-01T10:30:00Z"}),
    );
    transport.always_json("/api/raw", &json!([{"name": "Iron", "category": "Metals"}]));
    transport.always_json("/api/pie", &json!([{"label": "Metals", "count": 1}]));
    transport.always_json("/api/import-names", &json!(["Iron"]));
    transport.always_json("/api/export-names", &json!(["Wheat", "Barley"]));
    transport
}

fn dashboard(transport: &Arc<ScriptedTransport>) -> Dashboard {
    Dashboard::new(AppContext::with_transport(
        DashboardConfig::default(),
        transport.clone(),
    ))
}

#[tokio::test]
async fn test_bootstrap_fills_startup_caches_only() {
    let transport = backend();
    let dashboard = dashboard(&transport);
    assert_eq!(dashboard.status(), StatusSummary::Loading);

    for handle in dashboard.bootstrap() {
        handle.await.unwrap();
    }

    for kind in STARTUP_RESOURCES {
        assert_eq!(dashboard.registry().state(kind), EntryState::Ready, "{kind}");
    }
    assert_eq!(transport.request_count("/api/import-names"), 0);
    assert_eq!(transport.request_count("/api/export-names"), 0);

    let status = dashboard.status();
    assert_eq!(status.badge(), "Loaded");
    assert_eq!(status.total_records(), Some(50));
    assert_eq!(dashboard.content(), ViewContent::Placeholder);
}

#[tokio::test]
async fn test_view_round_trip() {
    let transport = backend();
    let mut dashboard = dashboard(&transport);

    dashboard.select_view(ViewSelection::Export);
    timeout(Duration::from_secs(1), wait_until(|| !dashboard.view_state().loading))
        .await
        .unwrap();

    match dashboard.content() {
        ViewContent::Content { rows, .. } => {
            let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
            assert_eq!(names, vec!["Wheat", "Barley"]);
        }
        other => panic!("expected table content, got {other:?}"),
    }
}

#[tokio::test]
async fn test_refresh_clears_view_and_only_refetches_status() {
    let transport = backend();
    let mut dashboard = dashboard(&transport);

    dashboard.select_view(ViewSelection::Import);
    timeout(Duration::from_secs(1), wait_until(|| !dashboard.view_state().loading))
        .await
        .unwrap();
    let import_requests = transport.request_count("/api/import-names");
    let pie_requests = transport.request_count("/api/pie");

    let refresh = dashboard.refresh_status();

    assert_eq!(dashboard.selection(), ViewSelection::None);
    assert_eq!(dashboard.view_state(), ViewState::default());
    assert_eq!(dashboard.content(), ViewContent::Placeholder);
    assert_eq!(dashboard.registry().subscriber_count(ResourceKind::ImportNames), 0);

    refresh.await.unwrap();
    assert_eq!(transport.request_count("/api/status"), 1);
    assert_eq!(transport.request_count("/api/import-names"), import_requests);
    assert_eq!(transport.request_count("/api/pie"), pie_requests);
    assert_eq!(dashboard.status().total_records(), Some(50));
}

#[tokio::test]
async fn test_status_error_badge() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.always_status("/api/status", 500);
    let mut dashboard = dashboard(&transport);

    dashboard.refresh_status().await.unwrap();

    let status = dashboard.status();
    assert_eq!(status.badge(), "Error");
    assert_eq!(status.error_message(), Some("Failed to fetch status"));
}
