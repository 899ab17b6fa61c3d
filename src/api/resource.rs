use std::fmt;

/// The fixed set of remote resources the dashboard reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Status,
    Raw,
    Pie,
    ImportNames,
    ExportNames,
}

impl ResourceKind {
    pub const ALL: [Self; 5] = [
        Self::Status,
        Self::Raw,
        Self::Pie,
        Self::ImportNames,
        Self::ExportNames,
    ];

    /// Endpoint path, relative to the backend origin
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Status => "/api/status",
            Self::Raw => "/api/raw",
            Self::Pie => "/api/pie",
            Self::ImportNames => "/api/import-names",
            Self::ExportNames => "/api/export-names",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Raw => "raw data",
            Self::Pie => "pie data",
            Self::ImportNames => "import names",
            Self::ExportNames => "export names",
        }
    }

    /// Dense index, used for per-resource counters
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Status => 0,
            Self::Raw => 1,
            Self::Pie => 2,
            Self::ImportNames => 3,
            Self::ExportNames => 4,
        }
    }

    /// Message published when the backend answers with a non-2xx status
    #[must_use]
    pub fn failure_message(self) -> String {
        format!("Failed to fetch {}", self.label())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_dense_and_unique() {
        for (position, kind) in ResourceKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), position);
        }
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(ResourceKind::Status.failure_message(), "Failed to fetch status");
        assert_eq!(
            ResourceKind::ImportNames.failure_message(),
            "Failed to fetch import names"
        );
    }
}
