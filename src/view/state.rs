use crate::api::{Fetched, NameList, PieSlice, ResourceKind};
use crate::config::ConfigError;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Which of the two mutually exclusive views is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewSelection {
    #[default]
    None,
    Import,
    Export,
}

/// Resources a view reads and fetches on entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewPlan {
    pub table: ResourceKind,
    pub pie: ResourceKind,
}

impl ViewPlan {
    /// Fetch order on entry: the table first, then the pie
    #[must_use]
    pub const fn fetches(&self) -> [ResourceKind; 2] {
        [self.table, self.pie]
    }
}

impl ViewSelection {
    #[must_use]
    pub const fn plan(self) -> Option<ViewPlan> {
        match self {
            Self::None => None,
            Self::Import => Some(ViewPlan {
                table: ResourceKind::ImportNames,
                pie: ResourceKind::Pie,
            }),
            Self::Export => Some(ViewPlan {
                table: ResourceKind::ExportNames,
                pie: ResourceKind::Pie,
            }),
        }
    }

    /// Prefix shown in front of every table row
    #[must_use]
    pub const fn row_label(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Import => "Import",
            Self::Export => "Export",
        }
    }
}

impl fmt::Display for ViewSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Import => f.write_str("import"),
            Self::Export => f.write_str("export"),
        }
    }
}

impl FromStr for ViewSelection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "import" => Ok(Self::Import),
            "export" => Ok(Self::Export),
            _ => Err(ConfigError::UnknownView(s.to_string())),
        }
    }
}

/// Working state of the selected view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub table: Option<NameList>,
    pub pie: Option<Vec<PieSlice>>,
    pub error: Option<String>,
    pub loading: bool,
}

impl ViewState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Fold a name-list value into the table; errors are shown in place of data
    pub fn apply_table(&mut self, value: &Fetched<NameList>) {
        match value {
            Fetched::Failed(wrapper) => {
                self.error = Some(wrapper.error.clone());
                self.table = None;
            }
            Fetched::Ready(names) => {
                self.error = None;
                self.table = Some(names.clone());
            }
        }
        self.loading = false;
    }

    /// Fold a pie value in. Anything but a non-empty slice list leaves the pie
    /// empty, and pie errors are never surfaced to the view.
    pub fn apply_pie(&mut self, value: &Fetched<Vec<PieSlice>>) {
        match value {
            Fetched::Ready(slices) if !slices.is_empty() => self.pie = Some(slices.clone()),
            Fetched::Ready(_) => self.pie = None,
            Fetched::Failed(wrapper) => {
                warn!("pie data unavailable: {}", wrapper.error);
                self.pie = None;
            }
        }
    }

    /// What the content area should show for `selection`
    #[must_use]
    pub fn content(&self, selection: ViewSelection) -> ViewContent {
        if selection == ViewSelection::None {
            return ViewContent::Placeholder;
        }
        if self.loading {
            return ViewContent::Loading;
        }
        if let Some(message) = &self.error {
            return ViewContent::Error(message.clone());
        }

        let label = selection.row_label();
        let rows = self
            .table
            .iter()
            .flatten()
            .map(|name| TableRow {
                label,
                name: name.clone(),
            })
            .collect();

        ViewContent::Content {
            rows,
            pie: self.pie.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub label: &'static str,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewContent {
    /// No view selected
    Placeholder,
    Loading,
    Error(String),
    Content {
        rows: Vec<TableRow>,
        pie: Option<Vec<PieSlice>>,
    },
}

/// A slice with its share of the whole pie
#[derive(Debug, Clone, PartialEq)]
pub struct PieShare {
    pub label: String,
    pub count: u64,
    pub percent: f64,
}

/// Percentage share of every slice; all zero when the pie is empty
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn pie_shares(slices: &[PieSlice]) -> Vec<PieShare> {
    let total: u64 = slices.iter().map(|s| s.count).sum();

    slices
        .iter()
        .map(|s| PieShare {
            label: s.label.clone(),
            count: s.count,
            percent: if total == 0 {
                0.0
            } else {
                s.count as f64 * 100.0 / total as f64
            },
        })
        .collect()
}
