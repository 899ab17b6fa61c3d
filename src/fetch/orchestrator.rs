use super::policy::{Generations, StalePolicy};
use crate::api::{Fetched, ResourceKind, Transport};
use crate::cache::{ResourceCache, ResourceRegistry};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What became of a single `trigger_fetch`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Published { generation: u64 },
    /// A newer request for the same resource was issued while this one was
    /// in flight
    Discarded { generation: u64, latest: u64 },
}

#[derive(Debug, Default)]
struct Counters {
    issued: AtomicU64,
    published: AtomicU64,
    failed: AtomicU64,
    discarded: AtomicU64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FetchMetrics {
    pub issued: u64,
    /// Publishes of any kind, error wrappers included
    pub published: u64,
    /// Publishes that carried an error wrapper
    pub failed: u64,
    pub discarded: u64,
}

/// Fetches resources and publishes the result into the matching cache.
///
/// Never retries and never cancels. Each call spawns one task that
/// publishes at most once. Under `LatestRequestWins` the staleness check and
/// the publish are made atomic per resource, so tasks on different worker
/// threads cannot publish out of generation order.
#[derive(Clone)]
pub struct FetchOrchestrator {
    transport: Arc<dyn Transport>,
    registry: Arc<ResourceRegistry>,
    generations: Arc<Generations>,
    counters: Arc<Counters>,
    policy: StalePolicy,
}

impl std::fmt::Debug for FetchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchOrchestrator")
            .field("policy", &self.policy)
            .field("metrics", &self.metrics())
            .finish_non_exhaustive()
    }
}

impl FetchOrchestrator {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, registry: Arc<ResourceRegistry>) -> Self {
        Self::with_policy(transport, registry, StalePolicy::default())
    }

    #[must_use]
    pub fn with_policy(
        transport: Arc<dyn Transport>,
        registry: Arc<ResourceRegistry>,
        policy: StalePolicy,
    ) -> Self {
        Self {
            transport,
            registry,
            generations: Arc::new(Generations::default()),
            counters: Arc::new(Counters::default()),
            policy,
        }
    }

    #[must_use]
    pub const fn policy(&self) -> StalePolicy {
        self.policy
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    /// Latest generation issued for `kind`
    #[must_use]
    pub fn generation(&self, kind: ResourceKind) -> u64 {
        self.generations.latest(kind)
    }

    #[must_use]
    pub fn metrics(&self) -> FetchMetrics {
        FetchMetrics {
            issued: self.counters.issued.load(Ordering::Relaxed),
            published: self.counters.published.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            discarded: self.counters.discarded.load(Ordering::Relaxed),
        }
    }

    /// Start a fetch of `kind` in the background.
    ///
    /// Must be called from within a tokio runtime. The returned handle may be
    /// dropped; the fetch still runs to completion.
    pub fn trigger_fetch(&self, kind: ResourceKind) -> JoinHandle<FetchOutcome> {
        match kind {
            ResourceKind::Status => self.spawn_fetch(kind, self.registry.status.clone()),
            ResourceKind::Raw => self.spawn_fetch(kind, self.registry.raw.clone()),
            ResourceKind::Pie => self.spawn_fetch(kind, self.registry.pie.clone()),
            ResourceKind::ImportNames => self.spawn_fetch(kind, self.registry.import_names.clone()),
            ResourceKind::ExportNames => self.spawn_fetch(kind, self.registry.export_names.clone()),
        }
    }

    fn spawn_fetch<T>(
        &self,
        kind: ResourceKind,
        cache: ResourceCache<Fetched<T>>,
    ) -> JoinHandle<FetchOutcome>
    where
        T: DeserializeOwned + Clone + Send + 'static,
    {
        let generation = self.generations.issue(kind);
        self.counters.issued.fetch_add(1, Ordering::Relaxed);
        info!("🔄 FETCH START: {kind} (generation {generation})");

        let transport = Arc::clone(&self.transport);
        let generations = Arc::clone(&self.generations);
        let counters = Arc::clone(&self.counters);
        let policy = self.policy;

        tokio::spawn(async move {
            let start = Instant::now();
            let value = fetch_resource::<T>(transport.as_ref(), kind).await;
            let elapsed = start.elapsed();

            let publish = || {
                match value.error() {
                    Some(message) => {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        warn!("❌ FETCH FAILED: {kind}: {message} ({:.2}s)", elapsed.as_secs_f64());
                    }
                    None => info!("✅ FETCH SUCCESS: {kind} ({:.2}s)", elapsed.as_secs_f64()),
                }
                counters.published.fetch_add(1, Ordering::Relaxed);
                cache.publish(value);
            };

            match policy {
                StalePolicy::LastResponseWins => publish(),
                StalePolicy::LatestRequestWins => {
                    if let Err(latest) = generations.publish_if_latest(kind, generation, publish) {
                        counters.discarded.fetch_add(1, Ordering::Relaxed);
                        debug!(
                            "🗑️  FETCH STALE: {kind} generation {generation} superseded by {latest} ({:.2}s)",
                            elapsed.as_secs_f64()
                        );
                        return FetchOutcome::Discarded { generation, latest };
                    }
                }
            }
            FetchOutcome::Published { generation }
        })
    }
}

/// GET `kind` and fold every failure into the error-wrapper shape.
///
/// A transport error carries its own message, a non-2xx status gets the
/// resource's fixed failure message, and an undecodable body reports the
/// decode error.
pub async fn fetch_resource<T>(transport: &dyn Transport, kind: ResourceKind) -> Fetched<T>
where
    T: DeserializeOwned,
{
    match transport.get(kind.path()).await {
        Err(e) => Fetched::failed(e.to_string()),
        Ok(reply) if !reply.is_success() => {
            debug!("{kind} answered HTTP {}", reply.status);
            Fetched::failed(kind.failure_message())
        }
        Ok(reply) => decode(kind, &reply.body),
    }
}

/// Decode a 2xx body; a domain error wrapper passes through unchanged
pub fn decode<T>(kind: ResourceKind, body: &str) -> Fetched<T>
where
    T: DeserializeOwned,
{
    serde_json::from_str(body)
        .unwrap_or_else(|e| Fetched::failed(format!("Invalid {kind} payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::ScriptedTransport;
    use crate::api::{NameList, PieSlice};
    use serde_json::json;

    fn setup(policy: StalePolicy) -> (Arc<ScriptedTransport>, FetchOrchestrator) {
        let transport = Arc::new(ScriptedTransport::new());
        let registry = Arc::new(ResourceRegistry::new());
        let orchestrator = FetchOrchestrator::with_policy(transport.clone(), registry, policy);
        (transport, orchestrator)
    }

    #[test]
    fn test_decode_passes_domain_errors_through() {
        let value: Fetched<NameList> = decode(ResourceKind::ImportNames, r#"{"error":"Data not loaded yet"}"#);
        assert_eq!(value, Fetched::failed("Data not loaded yet"));
    }

    #[test]
    fn test_decode_reports_malformed_bodies() {
        let value: Fetched<Vec<PieSlice>> = decode(ResourceKind::Pie, "<html>");
        let message = value.error().unwrap();
        assert!(message.starts_with("Invalid pie data payload:"), "{message}");
    }

    #[tokio::test]
    async fn test_success_publishes_payload() {
        let (transport, orchestrator) = setup(StalePolicy::default());
        transport.always_json("/api/pie", &json!([{"label": "A", "count": 3}]));

        let outcome = orchestrator.trigger_fetch(ResourceKind::Pie).await.unwrap();

        assert_eq!(outcome, FetchOutcome::Published { generation: 1 });
        assert_eq!(
            orchestrator.registry().pie.latest(),
            Some(Fetched::Ready(vec![PieSlice::new("A", 3)]))
        );
    }

    #[tokio::test]
    async fn test_non_success_status_publishes_fixed_message() {
        let (transport, orchestrator) = setup(StalePolicy::default());
        transport.always_status("/api/export-names", 503);

        orchestrator.trigger_fetch(ResourceKind::ExportNames).await.unwrap();

        assert_eq!(
            orchestrator.registry().export_names.latest(),
            Some(Fetched::failed("Failed to fetch export names"))
        );
        assert_eq!(orchestrator.metrics().failed, 1);
    }

    #[tokio::test]
    async fn test_each_trigger_is_a_new_request() {
        let (transport, orchestrator) = setup(StalePolicy::default());
        transport.always_json("/api/status", &json!({"total_records": 1, "last_updated": "2024-01-01T00:00:00Z"}));

        orchestrator.trigger_fetch(ResourceKind::Status).await.unwrap();
        orchestrator.trigger_fetch(ResourceKind::Status).await.unwrap();

        assert_eq!(transport.request_count("/api/status"), 2);
        assert_eq!(orchestrator.registry().status.version(), 2);
        assert_eq!(
            orchestrator.metrics(),
            FetchMetrics {
                issued: 2,
                published: 2,
                failed: 0,
                discarded: 0,
            }
        );
    }
}
