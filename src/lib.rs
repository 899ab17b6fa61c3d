//! Reactive data layer for the trade category dashboard.
//!
//! Each backend resource lives in a single-slot [`cache::ResourceCache`] that
//! replays its latest value to new subscribers. The [`fetch::FetchOrchestrator`]
//! fills those caches, and the [`view::ViewController`] subscribes the import
//! or export view to the caches it needs.
pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod view;

/// Default user agent - automatically uses the package version
///
/// Can be overridden via the `TRADEBOARD_USER_AGENT` environment variable.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
