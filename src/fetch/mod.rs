pub mod orchestrator;
pub mod policy;

pub use orchestrator::{FetchMetrics, FetchOrchestrator, FetchOutcome, decode, fetch_resource};
pub use policy::{Generations, StalePolicy};
