//! Wire payloads.
//!
//! Every endpoint answers either with its domain payload or with the literal
//! shape `{"error": "..."}`. [`Fetched`] tells the two apart by shape alone, so
//! transport failures and backend-reported failures look identical to readers
//! of a cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category names for the import or export table
pub type NameList = Vec<String>;

/// Backend records from `/api/raw`; opaque to this crate
pub type RawRecords = Vec<serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorWrapper {
    pub error: String,
}

/// Either a decoded payload or an error wrapper.
///
/// `Failed` is tried first: any object carrying a string `error` field is a
/// failure, whatever else it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fetched<T> {
    Failed(ErrorWrapper),
    Ready(T),
}

impl<T> Fetched<T> {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(ErrorWrapper {
            error: message.into(),
        })
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(wrapper) => Some(&wrapper.error),
            Self::Ready(_) => None,
        }
    }

    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Failed(_) => None,
        }
    }
}

/// Backend ingestion state from `/api/status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    #[serde(alias = "total")]
    pub total_records: u64,
    pub last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub count: u64,
}

impl PieSlice {
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}
