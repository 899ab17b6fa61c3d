use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tradeboard::api::testing::{ScriptedTransport, wait_until};
use tradeboard::api::{Fetched, PieSlice, ResourceKind};
use tradeboard::cache::ResourceRegistry;
use tradeboard::fetch::FetchOrchestrator;
use tradeboard::view::{TableRow, ViewContent, ViewController, ViewSelection, ViewState};

fn setup() -> (Arc<ScriptedTransport>, Arc<ResourceRegistry>, ViewController) {
    let transport = Arc::new(ScriptedTransport::new());
    let registry = Arc::new(ResourceRegistry::new());
    let orchestrator = FetchOrchestrator::new(transport.clone(), Arc::clone(&registry));
    (transport, registry, ViewController::new(orchestrator))
}

fn loading() -> ViewState {
    ViewState {
        loading: true,
        ..ViewState::default()
    }
}

#[tokio::test]
async fn test_each_switch_resets_before_responses_arrive() {
    let (transport, _registry, mut controller) = setup();

    controller.select_view(ViewSelection::Import);
    assert_eq!(controller.state(), loading());

    controller.select_view(ViewSelection::Export);
    assert_eq!(controller.state(), loading());

    controller.select_view(ViewSelection::Import);
    assert_eq!(controller.state(), loading());
    assert_eq!(controller.content(), ViewContent::Loading);

    timeout(Duration::from_secs(1), async {
        transport.wait_pending("/api/import-names", 2).await;
        transport.wait_pending("/api/export-names", 1).await;
        transport.wait_pending("/api/pie", 3).await;
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_stale_response_from_earlier_visit_is_dropped() {
    let (transport, _registry, mut controller) = setup();

    controller.select_view(ViewSelection::Import);
    controller.select_view(ViewSelection::Export);
    controller.select_view(ViewSelection::Import);
    timeout(Duration::from_secs(1), transport.wait_pending("/api/import-names", 2))
        .await
        .unwrap();

    // the response to the first Import visit arrives after the second was issued
    assert!(transport.reply_json("/api/import-names", &json!(["stale"])));
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
    assert_eq!(controller.state(), loading());

    assert!(transport.reply_json("/api/import-names", &json!(["fresh"])));
    timeout(Duration::from_secs(1), wait_until(|| !controller.state().loading))
        .await
        .unwrap();
    assert_eq!(controller.state().table, Some(vec!["fresh".to_string()]));
}

#[tokio::test]
async fn test_transport_failure_is_shown_in_table_area() {
    let (transport, registry, mut controller) = setup();
    transport.always_fail("/api/import-names", "boom");
    transport.always_json("/api/pie", &json!([{"label": "A", "count": 3}]));

    controller.select_view(ViewSelection::Import);
    timeout(Duration::from_secs(1), wait_until(|| !controller.state().loading))
        .await
        .unwrap();

    assert_eq!(registry.import_names.latest(), Some(Fetched::failed("boom")));
    assert_eq!(controller.state().error.as_deref(), Some("boom"));
    assert_eq!(controller.content(), ViewContent::Error("boom".to_string()));
}

#[tokio::test]
async fn test_pie_failure_is_not_surfaced() {
    let (transport, registry, mut controller) = setup();
    transport.always_json("/api/export-names", &json!(["Iron", "Wheat"]));
    transport.always_fail("/api/pie", "pie down");

    controller.select_view(ViewSelection::Export);
    timeout(
        Duration::from_secs(1),
        wait_until(|| !controller.state().loading && registry.pie.version() > 0),
    )
    .await
    .unwrap();

    assert_eq!(
        controller.content(),
        ViewContent::Content {
            rows: vec![
                TableRow {
                    label: "Export",
                    name: "Iron".to_string()
                },
                TableRow {
                    label: "Export",
                    name: "Wheat".to_string()
                },
            ],
            pie: None,
        }
    );
}

#[tokio::test]
async fn test_pie_published_while_viewing_is_shown() {
    let (transport, registry, mut controller) = setup();
    transport.always_json("/api/import-names", &json!([]));

    controller.select_view(ViewSelection::Import);
    timeout(Duration::from_secs(1), wait_until(|| !controller.state().loading))
        .await
        .unwrap();
    assert_eq!(controller.state().pie, None);

    registry.pie.publish(Fetched::Ready(vec![PieSlice::new("A", 3)]));
    assert_eq!(controller.state().pie, Some(vec![PieSlice::new("A", 3)]));
    assert_eq!(
        controller.content(),
        ViewContent::Content {
            rows: Vec::new(),
            pie: Some(vec![PieSlice::new("A", 3)]),
        }
    );
}

#[tokio::test]
async fn test_switching_moves_subscriptions() {
    let (_transport, registry, mut controller) = setup();

    controller.select_view(ViewSelection::Import);
    controller.select_view(ViewSelection::Export);

    assert_eq!(registry.import_names.subscriber_count(), 0);
    assert_eq!(registry.export_names.subscriber_count(), 1);
    assert_eq!(registry.pie.subscriber_count(), 1);
    assert_eq!(controller.active_subscriptions(), 2);
}

#[tokio::test]
async fn test_reselecting_the_same_view_reenters_it() {
    let (transport, registry, mut controller) = setup();

    controller.select_view(ViewSelection::Import);
    let transition = controller.select_view(ViewSelection::Import);

    assert_eq!(transition.from, ViewSelection::Import);
    assert_eq!(transition.to, ViewSelection::Import);
    assert_eq!(
        transition.fetched,
        vec![ResourceKind::ImportNames, ResourceKind::Pie]
    );
    assert_eq!(controller.state(), loading());
    assert_eq!(registry.import_names.subscriber_count(), 1);
    assert_eq!(registry.pie.subscriber_count(), 1);
    assert_eq!(controller.active_subscriptions(), 2);

    timeout(Duration::from_secs(1), async {
        transport.wait_pending("/api/import-names", 2).await;
        transport.wait_pending("/api/pie", 2).await;
    })
    .await
    .unwrap();
    assert_eq!(transport.request_count("/api/import-names"), 2);
}
