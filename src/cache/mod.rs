pub mod registry;
pub mod resource_cache;
pub mod subscription;

pub use registry::{EntryState, RegistryStats, ResourceRegistry};
pub use resource_cache::ResourceCache;
pub use subscription::Subscription;
