/**
Application context for the dashboard data layer

Owns the resource registry and the fetch orchestrator. It is constructed once
at startup and handed by reference to the view layer, and each test builds its
own to stay isolated from every other.
*/
use crate::api::{HttpTransport, Transport};
use crate::cache::ResourceRegistry;
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::fetch::FetchOrchestrator;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct AppContext {
    config: DashboardConfig,
    registry: Arc<ResourceRegistry>,
    orchestrator: FetchOrchestrator,
}

impl AppContext {
    /// Build a context talking HTTP to `config.base_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(config: DashboardConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        info!(
            "Data layer configured for {} (timeout {}s, {} policy)",
            transport.base_url(),
            config.timeout.as_secs(),
            config.stale_policy
        );
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    #[must_use]
    pub fn with_transport(config: DashboardConfig, transport: Arc<dyn Transport>) -> Self {
        let registry = Arc::new(ResourceRegistry::new());
        let orchestrator =
            FetchOrchestrator::with_policy(transport, Arc::clone(&registry), config.stale_policy);

        Self {
            config,
            registry,
            orchestrator,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &DashboardConfig {
        &self.config
    }

    #[must_use]
    pub const fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    #[must_use]
    pub const fn orchestrator(&self) -> &FetchOrchestrator {
        &self.orchestrator
    }
}
