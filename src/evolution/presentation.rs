//! Presentation Adapter
//!
//! Shapes a computed diff for display. Classification and counts are passed
//! through untouched; the only transformation is hiding unchanged rows.

use crate::evolution::diff::{ChangeKind, DiffRecord, SchemaComparison};
use crate::evolution::summary::DiffSummary;
use serde::Serialize;

impl ChangeKind {
    /// Badge label
    pub fn label(self) -> &'static str {
        match self {
            ChangeKind::Added => "Added",
            ChangeKind::Removed => "Removed",
            ChangeKind::TypeChanged => "Type changed",
            ChangeKind::ConstraintChanged => "Constraint changed",
            ChangeKind::Unchanged => "Unchanged",
        }
    }
}

/// One rendered row: the record verbatim plus its badge label
#[derive(Debug, Clone, Serialize)]
pub struct DiffRow<'a> {
    #[serde(flatten)]
    pub record: &'a DiffRecord,
    pub label: &'static str,
}

/// A diff ready for rendering
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffView<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_version: Option<u64>,
    pub show_unchanged: bool,
    pub records: Vec<DiffRow<'a>>,
    /// Counts over the full diff, including any hidden unchanged rows
    pub summary: DiffSummary,
    pub has_breaking_changes: bool,
}

/// Records to display; unchanged rows are dropped unless requested.
/// Order is preserved.
pub fn visible_records(records: &[DiffRecord], show_unchanged: bool) -> Vec<&DiffRecord> {
    records
        .iter()
        .filter(|r| show_unchanged || r.change != ChangeKind::Unchanged)
        .collect()
}

impl SchemaComparison {
    /// Borrowing view, so toggling `show_unchanged` never recomputes the diff
    pub fn view(&self, show_unchanged: bool) -> DiffView<'_> {
        DiffView {
            from_version: self.from_version,
            to_version: self.to_version,
            show_unchanged,
            records: visible_records(&self.records, show_unchanged)
                .into_iter()
                .map(|record| DiffRow {
                    record,
                    label: record.change.label(),
                })
                .collect(),
            summary: self.summary,
            has_breaking_changes: self.summary.has_breaking_changes(),
        }
    }
}
