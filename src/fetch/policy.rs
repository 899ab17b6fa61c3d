use crate::api::ResourceKind;
use crate::config::ConfigError;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// How overlapping fetches of the same resource are reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Only the response to the most recently issued request is published;
    /// older in-flight responses are discarded when they arrive.
    #[default]
    LatestRequestWins,
    /// Every response is published in arrival order, so a slow early request
    /// can overwrite a newer result.
    LastResponseWins,
}

impl FromStr for StalePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest-request" | "latest-request-wins" | "generation" => Ok(Self::LatestRequestWins),
            "last-response" | "last-response-wins" | "arrival" => Ok(Self::LastResponseWins),
            _ => Err(ConfigError::UnknownStalePolicy(s.to_string())),
        }
    }
}

impl fmt::Display for StalePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LatestRequestWins => f.write_str("latest-request"),
            Self::LastResponseWins => f.write_str("last-response"),
        }
    }
}

/// Per-resource, monotonically increasing request generations
#[derive(Debug, Default)]
pub struct Generations {
    counters: [AtomicU64; ResourceKind::ALL.len()],
    publish_gates: [Mutex<()>; ResourceKind::ALL.len()],
}

impl Generations {
    /// Allocate the next generation for `kind`; the first issued is 1
    pub fn issue(&self, kind: ResourceKind) -> u64 {
        self.counters[kind.index()].fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Most recently issued generation for `kind`, 0 if none
    #[must_use]
    pub fn latest(&self, kind: ResourceKind) -> u64 {
        self.counters[kind.index()].load(Ordering::Acquire)
    }

    /// Run `publish` only if `generation` is still the latest for `kind`.
    ///
    /// The check and `publish` run under one per-resource gate, so a newer
    /// generation cannot publish between them. `publish` must not publish
    /// through this gate again for the same resource.
    ///
    /// # Errors
    ///
    /// Returns the latest generation when `generation` has been superseded
    pub fn publish_if_latest(
        &self,
        kind: ResourceKind,
        generation: u64,
        publish: impl FnOnce(),
    ) -> Result<(), u64> {
        let _gate = self.publish_gates[kind.index()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let latest = self.latest(kind);
        if generation != latest {
            return Err(latest);
        }
        publish();
        Ok(())
    }
}
