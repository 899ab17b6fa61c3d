use super::bootstrap::bootstrap;
use super::context::AppContext;
use super::status::StatusSummary;
use crate::api::ResourceKind;
use crate::cache::ResourceRegistry;
use crate::fetch::FetchOutcome;
use crate::view::{Transition, ViewContent, ViewController, ViewSelection, ViewState};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Context plus view controller: everything a front end drives
#[derive(Debug)]
pub struct Dashboard {
    context: AppContext,
    controller: ViewController,
}

impl Dashboard {
    #[must_use]
    pub fn new(context: AppContext) -> Self {
        let controller = ViewController::new(context.orchestrator().clone());
        Self {
            context,
            controller,
        }
    }

    #[must_use]
    pub const fn context(&self) -> &AppContext {
        &self.context
    }

    #[must_use]
    pub const fn registry(&self) -> &Arc<ResourceRegistry> {
        self.context.registry()
    }

    /// Trigger the startup fetches (status, raw data, pie)
    pub fn bootstrap(&self) -> Vec<JoinHandle<FetchOutcome>> {
        bootstrap(self.context.orchestrator())
    }

    pub fn select_view(&mut self, target: ViewSelection) -> Transition {
        self.controller.select_view(target)
    }

    /// Re-fetch status and clear the working view. View resources are not
    /// re-fetched.
    pub fn refresh_status(&mut self) -> JoinHandle<FetchOutcome> {
        info!("Status refresh requested");
        let handle = self.context.orchestrator().trigger_fetch(ResourceKind::Status);
        self.controller.select_view(ViewSelection::None);
        handle
    }

    #[must_use]
    pub const fn selection(&self) -> ViewSelection {
        self.controller.selection()
    }

    #[must_use]
    pub fn view_state(&self) -> ViewState {
        self.controller.state()
    }

    #[must_use]
    pub fn content(&self) -> ViewContent {
        self.controller.content()
    }

    #[must_use]
    pub fn status(&self) -> StatusSummary {
        StatusSummary::from(self.registry().status.latest())
    }
}
