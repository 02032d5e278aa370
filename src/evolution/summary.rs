//! Summary Aggregator
//!
//! Reduces a list of diff records to per-kind counts.

use crate::evolution::diff::{ChangeKind, DiffRecord};
use serde::{Deserialize, Serialize};

/// Summary statistics for a diff
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub type_changed: usize,
    pub constraint_changed: usize,
    pub unchanged: usize,
    /// Records flagged breaking, across every change kind
    pub breaking: usize,
}

impl DiffSummary {
    /// Number of records that are not `unchanged`
    pub fn total_changes(&self) -> usize {
        self.added + self.removed + self.type_changed + self.constraint_changed
    }

    pub fn has_breaking_changes(&self) -> bool {
        self.breaking > 0
    }
}

/// Count each change kind plus breaking records in a single pass
pub fn summarize(records: &[DiffRecord]) -> DiffSummary {
    records.iter().fold(DiffSummary::default(), |mut summary, record| {
        match record.change {
            ChangeKind::Added => summary.added += 1,
            ChangeKind::Removed => summary.removed += 1,
            ChangeKind::TypeChanged => summary.type_changed += 1,
            ChangeKind::ConstraintChanged => summary.constraint_changed += 1,
            ChangeKind::Unchanged => summary.unchanged += 1,
        }
        if record.breaking {
            summary.breaking += 1;
        }
        summary
    })
}
