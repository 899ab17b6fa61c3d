//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Logs go to stderr so the dashboard printed on stdout stays clean.
//! An explicit level wins over `RUST_LOG`.

use crate::error::{Error, Result};
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Build the filter: `level` if given, else `RUST_LOG`, else [`DEFAULT_LOG_LEVEL`]
///
/// # Errors
///
/// Returns an error if `level` is not a valid filter directive
pub fn build_filter(level: Option<&str>) -> Result<EnvFilter> {
    if let Some(level) = level {
        return EnvFilter::try_new(level)
            .map_err(|e| Error::Custom(format!("invalid log level: {e}")));
    }
    Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)))
}

/// Install the global subscriber
///
/// # Errors
///
/// Returns an error if the level is invalid or a subscriber is already set
pub fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = build_filter(level)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| Error::Custom(format!("logging already initialized: {e}")))
}
