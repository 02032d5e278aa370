//! Schema Evolution Diff Engine
//!
//! Compares two schema versions column by column and classifies every name
//! that appears on either side. Output order is fixed: change kind first
//! (added, removed, type changed, constraint changed, unchanged), then column
//! name.

use crate::evolution::breaking;
use crate::evolution::summary::{summarize, DiffSummary};
use crate::schema::{ColumnDefinition, SchemaVersion};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// How a single column changed between two versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Present only in the newer version
    Added,
    /// Present only in the older version
    Removed,
    /// Present in both, type string differs
    TypeChanged,
    /// Same type, nullability or constraint set differs
    ConstraintChanged,
    Unchanged,
}

impl ChangeKind {
    /// Sort rank used to order diff records
    pub fn precedence(self) -> u8 {
        match self {
            ChangeKind::Added => 0,
            ChangeKind::Removed => 1,
            ChangeKind::TypeChanged => 2,
            ChangeKind::ConstraintChanged => 3,
            ChangeKind::Unchanged => 4,
        }
    }
}

/// Per-column comparison result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffRecord {
    pub column: String,
    pub change: ChangeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_constraints: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_constraints: Option<Vec<String>>,
    pub breaking: bool,
}

impl DiffRecord {
    fn build(column: &str, change: ChangeKind, old: Option<&ColumnDefinition>, new: Option<&ColumnDefinition>) -> Self {
        let old_nullable = old.and_then(|c| c.nullable);
        let new_nullable = new.and_then(|c| c.nullable);

        Self {
            column: column.to_string(),
            change,
            old_type: old.map(|c| c.data_type.clone()),
            new_type: new.map(|c| c.data_type.clone()),
            old_nullable,
            new_nullable,
            old_constraints: old.and_then(|c| c.constraints.clone()),
            new_constraints: new.and_then(|c| c.constraints.clone()),
            breaking: breaking::is_breaking(change, old_nullable, new_nullable),
        }
    }
}

/// Full comparison of two versions: ordered records plus their summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaComparison {
    /// Older ("from") version number, absent when that side was missing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_version: Option<u64>,
    /// Newer ("to") version number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_version: Option<u64>,
    pub records: Vec<DiffRecord>,
    pub summary: DiffSummary,
}

/// The diff engine. Stateless; every call allocates fresh records.
pub struct DiffEngine;

impl DiffEngine {
    /// Diff two versions and summarize the result
    pub fn compare(left: Option<&SchemaVersion>, right: Option<&SchemaVersion>) -> SchemaComparison {
        let records = compute_diff(left, right);
        let summary = summarize(&records);

        debug!(
            "Compared v{:?} -> v{:?}: {} records, {} breaking",
            left.map(|v| v.version_number),
            right.map(|v| v.version_number),
            records.len(),
            summary.breaking
        );

        SchemaComparison {
            from_version: left.map(|v| v.version_number),
            to_version: right.map(|v| v.version_number),
            records,
            summary,
        }
    }

    /// Diff two flat column lists. `left` is the older side.
    pub fn diff_columns(left: &[ColumnDefinition], right: &[ColumnDefinition]) -> Vec<DiffRecord> {
        let left_cols: HashMap<&str, &ColumnDefinition> =
            left.iter().map(|c| (c.name.as_str(), c)).collect();
        let right_cols: HashMap<&str, &ColumnDefinition> =
            right.iter().map(|c| (c.name.as_str(), c)).collect();

        let names: BTreeSet<&str> = left_cols.keys().chain(right_cols.keys()).copied().collect();

        let mut records: Vec<DiffRecord> = names
            .into_iter()
            .filter_map(|name| {
                let record = match (left_cols.get(name).copied(), right_cols.get(name).copied()) {
                    (None, Some(new)) => DiffRecord::build(name, ChangeKind::Added, None, Some(new)),
                    (Some(old), None) => DiffRecord::build(name, ChangeKind::Removed, Some(old), None),
                    (Some(old), Some(new)) => {
                        DiffRecord::build(name, Self::classify(old, new), Some(old), Some(new))
                    }
                    (None, None) => return None,
                };
                Some(record)
            })
            .collect();

        records.sort_by(|a, b| {
            a.change
                .precedence()
                .cmp(&b.change.precedence())
                .then_with(|| a.column.cmp(&b.column))
        });
        records
    }

    /// Classify a column present on both sides
    fn classify(old: &ColumnDefinition, new: &ColumnDefinition) -> ChangeKind {
        if old.data_type != new.data_type {
            return ChangeKind::TypeChanged;
        }

        if old.nullable != new.nullable || old.sorted_constraints() != new.sorted_constraints() {
            ChangeKind::ConstraintChanged
        } else {
            ChangeKind::Unchanged
        }
    }
}

/// Compute the ordered diff between two optional versions.
///
/// A missing side behaves like a version with no columns, so
/// `compute_diff(None, None)` is empty.
pub fn compute_diff(left: Option<&SchemaVersion>, right: Option<&SchemaVersion>) -> Vec<DiffRecord> {
    DiffEngine::diff_columns(
        left.map(|v| v.columns.as_slice()).unwrap_or_default(),
        right.map(|v| v.columns.as_slice()).unwrap_or_default(),
    )
}
