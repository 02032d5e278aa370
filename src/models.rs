//! Data models and DTOs (Data Transfer Objects)
//!
//! Contains the request/response structures used by the API.

use crate::evolution::{DiffView, VersionPair};
use crate::schema::{ColumnDefinition, SchemaVersion, VersionSummary};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Generic success response
#[derive(Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

/// Request to record a new schema version for a source
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordVersionRequest {
    /// May be empty: a source with no columns is a valid observation
    #[validate(nested)]
    pub columns: Vec<ColumnDefinition>,
}

/// Query for the stored-version diff endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffQuery {
    /// Older ("from") version id; defaults to the second newest
    pub left: Option<Uuid>,
    /// Newer ("to") version id; defaults to the newest
    pub right: Option<Uuid>,
    /// Exchange the resolved sides before diffing
    #[serde(default)]
    pub swap: bool,
    pub show_unchanged: Option<bool>,
}

/// Ad-hoc comparison of two inline column lists
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    /// Older side; `null` compares as a missing version
    #[validate(nested)]
    pub left: Option<InlineSchema>,
    /// Newer side
    #[validate(nested)]
    pub right: Option<InlineSchema>,
    pub show_unchanged: Option<bool>,
}

/// Column list supplied directly in a request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InlineSchema {
    #[serde(default)]
    pub version_number: u64,
    #[validate(nested)]
    pub columns: Vec<ColumnDefinition>,
}

/// Request to prune a source's history
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PruneRequest {
    #[validate(range(min = 1, message = "Must keep at least one version"))]
    pub keep: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub success: bool,
    pub message: String,
    pub version: SchemaVersion,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionListResponse {
    pub success: bool,
    pub versions: Vec<VersionSummary>,
    /// Default left/right selection for this history
    pub default_pair: VersionPair,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResponse<'a> {
    pub success: bool,
    /// The pair actually compared, after defaults and swap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pair: Option<VersionPair>,
    pub diff: DiffView<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PruneResult {
    pub removed: usize,
    pub remaining: usize,
}
