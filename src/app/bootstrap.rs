use crate::api::ResourceKind;
use crate::fetch::{FetchOrchestrator, FetchOutcome};
use tokio::task::JoinHandle;
use tracing::info;

/// Fetched once at startup, whatever view is selected
pub const STARTUP_RESOURCES: [ResourceKind; 3] =
    [ResourceKind::Status, ResourceKind::Raw, ResourceKind::Pie];

/// Trigger the startup fetches and hand back their handles
pub fn bootstrap(orchestrator: &FetchOrchestrator) -> Vec<JoinHandle<FetchOutcome>> {
    info!("🚀 Bootstrapping {} resources", STARTUP_RESOURCES.len());
    STARTUP_RESOURCES
        .iter()
        .map(|kind| orchestrator.trigger_fetch(*kind))
        .collect()
}
