//! Schema Version Model
//!
//! Column definitions and the immutable, numbered schema versions they are
//! attached to. Versions are produced by whatever observes the data source and
//! are only ever read by the evolution engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use validator::Validate;

/// A single column as observed in one schema version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    /// Case-sensitive, unique within a version
    #[validate(length(min = 1, message = "Column name is required"))]
    pub name: String,

    /// Normalized type name, compared as an exact string
    #[validate(length(min = 1, message = "Column type is required"))]
    #[serde(rename = "type")]
    pub data_type: String,

    /// `None` means nullability was not observed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    /// Opaque constraint tags such as "unique" or "primary_key"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Vec<String>>,

    /// Free-form metadata, ignored when diffing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: None,
            constraints: None,
            description: None,
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn with_constraints<I, S>(mut self, constraints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraints = Some(constraints.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Constraints as a sorted list, so two columns compare equal regardless
    /// of tag order. A missing list is the same as an empty one.
    pub fn sorted_constraints(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self
            .constraints
            .iter()
            .flatten()
            .map(String::as_str)
            .collect();
        tags.sort_unstable();
        tags
    }
}

/// Immutable, numbered snapshot of a data source's columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaVersion {
    pub id: Uuid,
    pub source_id: Uuid,
    pub version_number: u64,
    pub created_at: DateTime<Utc>,
    pub columns: Vec<ColumnDefinition>,
    pub checksum: String,
}

impl SchemaVersion {
    /// Build a version from already-observed columns, computing its checksum
    pub fn new(source_id: Uuid, version_number: u64, columns: Vec<ColumnDefinition>) -> Self {
        let checksum = Self::compute_checksum(&columns);
        Self {
            id: Uuid::new_v4(),
            source_id,
            version_number,
            created_at: Utc::now(),
            columns,
            checksum,
        }
    }

    /// Content checksum over the diff-relevant part of each column.
    ///
    /// Columns are hashed in name order and constraints in sorted order, so
    /// two versions that would diff as all-unchanged share a checksum.
    pub fn compute_checksum(columns: &[ColumnDefinition]) -> String {
        let mut sorted: Vec<&ColumnDefinition> = columns.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));

        let mut hasher = Sha256::new();
        for col in sorted {
            let nullable = match col.nullable {
                Some(true) => "null",
                Some(false) => "not_null",
                None => "unknown",
            };
            hasher.update(
                format!(
                    "{}:{}:{}:[{}];",
                    col.name,
                    col.data_type,
                    nullable,
                    col.sorted_constraints().join(",")
                )
                .as_bytes(),
            );
        }

        format!("{:x}", hasher.finalize())
    }

    /// Name of the first column that appears more than once, if any
    pub fn duplicate_column(columns: &[ColumnDefinition]) -> Option<&str> {
        let mut seen = std::collections::HashSet::new();
        columns
            .iter()
            .map(|c| c.name.as_str())
            .find(|name| !seen.insert(*name))
    }
}

/// Lightweight listing entry for a version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSummary {
    pub id: Uuid,
    pub version_number: u64,
    pub column_count: usize,
    pub created_at: DateTime<Utc>,
    pub checksum: String,
}

impl From<&SchemaVersion> for VersionSummary {
    fn from(version: &SchemaVersion) -> Self {
        Self {
            id: version.id,
            version_number: version.version_number,
            column_count: version.columns.len(),
            created_at: version.created_at,
            checksum: version.checksum.clone(),
        }
    }
}
