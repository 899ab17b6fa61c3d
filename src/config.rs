/**
 * Configuration constants and runtime settings for the dashboard data layer
 */
use crate::USER_AGENT;
use crate::fetch::StalePolicy;
use std::time::Duration;
use thiserror::Error;

/// Backend address used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Upper bound accepted for the request timeout
pub const MAX_TIMEOUT_SECS: u64 = 300;

pub const BASE_URL_ENV: &str = "TRADEBOARD_BASE_URL";
pub const TIMEOUT_ENV: &str = "TRADEBOARD_TIMEOUT_SECS";
pub const STALE_POLICY_ENV: &str = "TRADEBOARD_STALE_POLICY";
pub const USER_AGENT_ENV: &str = "TRADEBOARD_USER_AGENT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("base url `{0}` must start with http:// or https://")]
    InvalidBaseUrl(String),

    #[error("timeout `{0}` is not a whole number of seconds between 1 and {MAX_TIMEOUT_SECS}")]
    InvalidTimeout(String),

    #[error("unknown stale policy `{0}` (expected `latest-request` or `last-response`)")]
    UnknownStalePolicy(String),

    #[error("unknown view `{0}` (expected `import`, `export` or `none`)")]
    UnknownView(String),
}

/// Settings shared by the transport and the fetch orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Backend origin, e.g. "http://localhost:3000"; endpoint paths are appended
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    /// How overlapping fetches of one resource are reconciled
    pub stale_policy: StalePolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
            stale_policy: StalePolicy::default(),
        }
    }
}

impl DashboardConfig {
    /// Build a config from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if any `TRADEBOARD_*` variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, starting from the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a looked-up value is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(BASE_URL_ENV) {
            config = config.with_base_url(&url)?;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            config.timeout = parse_timeout(&raw)?;
        }
        if let Some(raw) = lookup(STALE_POLICY_ENV) {
            config.stale_policy = raw.parse()?;
        }
        if let Some(agent) = lookup(USER_AGENT_ENV).filter(|a| !a.trim().is_empty()) {
            config.user_agent = agent;
        }

        Ok(config)
    }

    /// Replace the base url, normalizing away any trailing slash.
    ///
    /// # Errors
    ///
    /// Returns an error if the url is not http(s).
    pub fn with_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        let trimmed = url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(url.to_string()));
        }
        self.base_url = trimmed.to_string();
        Ok(self)
    }

    /// Replace the request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if `secs` is zero or above [`MAX_TIMEOUT_SECS`].
    pub fn with_timeout_secs(mut self, secs: u64) -> Result<Self, ConfigError> {
        if secs == 0 || secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::InvalidTimeout(secs.to_string()));
        }
        self.timeout = Duration::from_secs(secs);
        Ok(self)
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 && secs <= MAX_TIMEOUT_SECS => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}

/// Validate configuration constants at compile time
const _: () = {
    assert!(DEFAULT_TIMEOUT_SECS > 0, "DEFAULT_TIMEOUT_SECS must be greater than 0");
    assert!(
        DEFAULT_TIMEOUT_SECS <= MAX_TIMEOUT_SECS,
        "DEFAULT_TIMEOUT_SECS must not exceed MAX_TIMEOUT_SECS"
    );
};
