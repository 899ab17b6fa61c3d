use crate::api::{Fetched, StatusRecord};
use chrono::{DateTime, TimeZone};
use std::fmt;

/// Status sidebar contents derived from the status cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSummary {
    /// Nothing published yet
    Loading,
    Loaded(StatusRecord),
    Failed(String),
}

impl From<Option<Fetched<StatusRecord>>> for StatusSummary {
    fn from(value: Option<Fetched<StatusRecord>>) -> Self {
        match value {
            None => Self::Loading,
            Some(Fetched::Ready(record)) => Self::Loaded(record),
            Some(Fetched::Failed(wrapper)) => Self::Failed(wrapper.error),
        }
    }
}

impl StatusSummary {
    #[must_use]
    pub const fn badge(&self) -> &'static str {
        match self {
            Self::Loading => "Loading...",
            Self::Loaded(_) => "Loaded",
            Self::Failed(_) => "Error",
        }
    }

    #[must_use]
    pub const fn total_records(&self) -> Option<u64> {
        match self {
            Self::Loaded(record) => Some(record.total_records),
            _ => None,
        }
    }

    #[must_use]
    pub const fn record(&self) -> Option<&StatusRecord> {
        match self {
            Self::Loaded(record) => Some(record),
            _ => None,
        }
    }

    /// Failure reported by the fetch, or by the backend inside a record
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            Self::Loaded(record) => record.error_message.as_deref(),
            Self::Loading => None,
        }
    }
}

impl fmt::Display for StatusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: {}", self.badge())?;
        match self.total_records() {
            Some(total) => writeln!(f, "Total Records: {total}")?,
            None => writeln!(f, "Total Records: -")?,
        }
        match self.record() {
            Some(record) => writeln!(
                f,
                "Last Updated: {}",
                format_timestamp(&record.last_updated.with_timezone(&chrono::Local))
            )?,
            None => writeln!(f, "Last Updated: -")?,
        }
        if let Some(message) = self.error_message() {
            writeln!(f, "{message}")?;
        }
        Ok(())
    }
}

/// Short form such as "24 May 1, 10:30"
#[must_use]
pub fn format_timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    at.format("%y %b %-d, %H:%M").to_string()
}
