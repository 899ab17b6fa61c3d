/**
 * View state machine
 *
 * States are `None`, `Import` and `Export`. Every transition runs the exit
 * action of the previous state (drop its subscriptions), clears the working
 * view state, then runs the entry action of the target state as declared by
 * its `ViewPlan`.
 *
 * Each entry bumps an epoch. Cache callbacks carry the epoch of the entry
 * that registered them and are ignored once it is over, so a delivery that
 * was already running on another thread cannot write into the next view.
 */
use super::state::{ViewContent, ViewSelection, ViewState};
use crate::api::ResourceKind;
use crate::cache::{ResourceRegistry, Subscription};
use crate::fetch::FetchOrchestrator;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Record of one `select_view` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: ViewSelection,
    pub to: ViewSelection,
    /// Resources fetched by the entry action, in trigger order
    pub fetched: Vec<ResourceKind>,
}

#[derive(Debug)]
pub struct ViewController {
    registry: Arc<ResourceRegistry>,
    orchestrator: FetchOrchestrator,
    selection: ViewSelection,
    shared: Arc<Mutex<Shared>>,
    subscriptions: Vec<Subscription>,
}

#[derive(Debug, Default)]
struct Shared {
    epoch: u64,
    view: ViewState,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Apply `update` only while `epoch` is still the current view entry
fn apply_in(shared: &Mutex<Shared>, epoch: u64, update: impl FnOnce(&mut ViewState)) -> bool {
    let mut shared = lock(shared);
    if shared.epoch != epoch {
        debug!("ignoring delivery for view epoch {epoch} (now {})", shared.epoch);
        return false;
    }
    update(&mut shared.view);
    true
}

impl ViewController {
    #[must_use]
    pub fn new(orchestrator: FetchOrchestrator) -> Self {
        Self {
            registry: Arc::clone(orchestrator.registry()),
            orchestrator,
            selection: ViewSelection::None,
            shared: Arc::new(Mutex::new(Shared::default())),
            subscriptions: Vec::new(),
        }
    }

    #[must_use]
    pub const fn selection(&self) -> ViewSelection {
        self.selection
    }

    /// Snapshot of the working view state
    #[must_use]
    pub fn state(&self) -> ViewState {
        lock(&self.shared).view.clone()
    }

    #[must_use]
    pub fn content(&self) -> ViewContent {
        lock(&self.shared).view.content(self.selection)
    }

    /// Caches this view is currently subscribed to
    #[must_use]
    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions.len()
    }

    /// Move to `target`. Re-selecting the current view re-runs its entry
    /// action, which re-fetches.
    pub fn select_view(&mut self, target: ViewSelection) -> Transition {
        let from = self.selection;

        self.exit();
        let epoch = {
            let mut shared = lock(&self.shared);
            shared.epoch += 1;
            shared.view.clear();
            shared.epoch
        };
        self.selection = target;
        let fetched = self.enter(target, epoch);

        info!("🧭 VIEW {from} -> {target} (fetched {fetched:?})");
        Transition {
            from,
            to: target,
            fetched,
        }
    }

    fn exit(&mut self) {
        if !self.subscriptions.is_empty() {
            debug!(
                "dropping {} subscriptions of {} view",
                self.subscriptions.len(),
                self.selection
            );
        }
        self.subscriptions.clear();
    }

    fn enter(&mut self, target: ViewSelection, epoch: u64) -> Vec<ResourceKind> {
        let (Some(plan), Some(table_cache)) = (target.plan(), self.registry.name_list(target)) else {
            return Vec::new();
        };

        lock(&self.shared).view.loading = true;

        // In-flight fetches are never cancelled; their handles can go
        for kind in plan.fetches() {
            drop(self.orchestrator.trigger_fetch(kind));
        }

        let shared = Arc::clone(&self.shared);
        let table = table_cache.subscribe(move |value| {
            apply_in(&shared, epoch, |view| view.apply_table(value));
        });

        let shared = Arc::clone(&self.shared);
        let pie = self.registry.pie.subscribe(move |value| {
            apply_in(&shared, epoch, |view| view.apply_pie(value));
        });

        self.subscriptions.push(table);
        self.subscriptions.push(pie);

        plan.fetches().to_vec()
    }
}
