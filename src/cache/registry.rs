use super::resource_cache::ResourceCache;
use crate::api::{Fetched, NameList, PieSlice, RawRecords, ResourceKind, StatusRecord};
use crate::view::ViewSelection;

/// What a cache currently holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Empty,
    Ready,
    Failed,
}

fn entry_state<T>(cache: &ResourceCache<Fetched<T>>) -> EntryState
where
    T: Clone + Send + 'static,
{
    match cache.latest() {
        None => EntryState::Empty,
        Some(Fetched::Ready(_)) => EntryState::Ready,
        Some(Fetched::Failed(_)) => EntryState::Failed,
    }
}

/// One typed cache per resource kind.
///
/// Built once inside an [`AppContext`](crate::app::AppContext) and shared by
/// reference, so every test can own an isolated registry.
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    pub status: ResourceCache<Fetched<StatusRecord>>,
    pub raw: ResourceCache<Fetched<RawRecords>>,
    pub pie: ResourceCache<Fetched<Vec<PieSlice>>>,
    pub import_names: ResourceCache<Fetched<NameList>>,
    pub export_names: ResourceCache<Fetched<NameList>>,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: ResourceCache::new(ResourceKind::Status.label()),
            raw: ResourceCache::new(ResourceKind::Raw.label()),
            pie: ResourceCache::new(ResourceKind::Pie.label()),
            import_names: ResourceCache::new(ResourceKind::ImportNames.label()),
            export_names: ResourceCache::new(ResourceKind::ExportNames.label()),
        }
    }

    /// The name-list cache backing a view's table
    #[must_use]
    pub const fn name_list(&self, view: ViewSelection) -> Option<&ResourceCache<Fetched<NameList>>> {
        match view {
            ViewSelection::Import => Some(&self.import_names),
            ViewSelection::Export => Some(&self.export_names),
            ViewSelection::None => None,
        }
    }

    #[must_use]
    pub fn state(&self, kind: ResourceKind) -> EntryState {
        match kind {
            ResourceKind::Status => entry_state(&self.status),
            ResourceKind::Raw => entry_state(&self.raw),
            ResourceKind::Pie => entry_state(&self.pie),
            ResourceKind::ImportNames => entry_state(&self.import_names),
            ResourceKind::ExportNames => entry_state(&self.export_names),
        }
    }

    #[must_use]
    pub fn version(&self, kind: ResourceKind) -> u64 {
        match kind {
            ResourceKind::Status => self.status.version(),
            ResourceKind::Raw => self.raw.version(),
            ResourceKind::Pie => self.pie.version(),
            ResourceKind::ImportNames => self.import_names.version(),
            ResourceKind::ExportNames => self.export_names.version(),
        }
    }

    #[must_use]
    pub fn subscriber_count(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Status => self.status.subscriber_count(),
            ResourceKind::Raw => self.raw.subscriber_count(),
            ResourceKind::Pie => self.pie.subscriber_count(),
            ResourceKind::ImportNames => self.import_names.subscriber_count(),
            ResourceKind::ExportNames => self.export_names.subscriber_count(),
        }
    }

    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        let states = ResourceKind::ALL.map(|kind| self.state(kind));

        RegistryStats {
            total_entries: ResourceKind::ALL.len(),
            filled_entries: states.iter().filter(|s| **s != EntryState::Empty).count(),
            error_entries: states.iter().filter(|s| **s == EntryState::Failed).count(),
            subscribers: ResourceKind::ALL
                .iter()
                .map(|kind| self.subscriber_count(*kind))
                .sum(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    pub total_entries: usize,
    pub filled_entries: usize,
    pub error_entries: usize,
    pub subscribers: usize,
}
