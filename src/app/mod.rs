pub mod bootstrap;
pub mod context;
pub mod dashboard;
pub mod status;

pub use bootstrap::{STARTUP_RESOURCES, bootstrap};
pub use context::AppContext;
pub use dashboard::Dashboard;
pub use status::{StatusSummary, format_timestamp};
