//! Schema Evolution API Routes
//!
//! Routes for recording schema versions and comparing them.

use crate::error::{not_found_error, validation_error, ApiResult};
use crate::evolution::{DiffEngine, PairingSelector};
use crate::models::{
    CompareRequest, DiffQuery, DiffResponse, InlineSchema, PruneRequest, PruneResult,
    RecordVersionRequest, SuccessResponse, VersionListResponse, VersionResponse,
};
use crate::schema::SchemaVersion;
use crate::state::SharedState;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

/// Record a new schema version for a source
pub async fn record_version(
    State(state): State<SharedState>,
    Path(source_id): Path<Uuid>,
    Json(payload): Json<RecordVersionRequest>,
) -> ApiResult<Json<VersionResponse>> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    let version = state.versions.record(source_id, payload.columns).await?;

    Ok(Json(VersionResponse {
        success: true,
        message: format!("Schema v{} recorded", version.version_number),
        version,
    }))
}

/// List all versions for a source, newest first
pub async fn list_versions(
    State(state): State<SharedState>,
    Path(source_id): Path<Uuid>,
) -> ApiResult<Json<VersionListResponse>> {
    let versions = state.versions.list(source_id).await;
    let default_pair = PairingSelector::new(&versions).default_pair();

    Ok(Json(VersionListResponse {
        success: true,
        versions,
        default_pair,
    }))
}

/// Get a single version by ID
pub async fn get_version(
    State(state): State<SharedState>,
    Path((source_id, version_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<VersionResponse>> {
    let version = state
        .versions
        .get(source_id, version_id)
        .await
        .ok_or_else(|| not_found_error(format!("Version {} not found", version_id)))?;

    Ok(Json(VersionResponse {
        success: true,
        message: format!("Schema v{}", version.version_number),
        version,
    }))
}

/// Get a single version by its number
pub async fn get_version_by_number(
    State(state): State<SharedState>,
    Path((source_id, version_number)): Path<(Uuid, u64)>,
) -> ApiResult<Json<VersionResponse>> {
    let version = state
        .versions
        .get_by_number(source_id, version_number)
        .await
        .ok_or_else(|| not_found_error(format!("Version v{} not found", version_number)))?;

    Ok(Json(VersionResponse {
        success: true,
        message: format!("Schema v{}", version.version_number),
        version,
    }))
}

/// Compare two stored versions of a source.
///
/// Without explicit ids the two most recent versions are compared.
pub async fn diff_versions(
    State(state): State<SharedState>,
    Path(source_id): Path<Uuid>,
    Query(query): Query<DiffQuery>,
) -> ApiResult<Response> {
    let history = state.versions.list(source_id).await;
    let selector = PairingSelector::new(&history);

    let mut pair = selector.select(query.left, query.right)?;
    if query.swap {
        pair = pair.swapped();
    }
    let (left, right) = selector.resolve(pair)?;

    let (left, right) = state.versions.pair(source_id, left.id, right.id).await?;
    let comparison = DiffEngine::compare(Some(&left), Some(&right));

    debug!(
        "Source {}: v{} -> v{} has {} changes",
        source_id,
        left.version_number,
        right.version_number,
        comparison.summary.total_changes()
    );

    let show_unchanged = query.show_unchanged.unwrap_or(state.show_unchanged_default);
    Ok(Json(DiffResponse {
        success: true,
        pair: Some(pair),
        diff: comparison.view(show_unchanged),
    })
    .into_response())
}

/// Compare two column lists supplied in the request body
pub async fn compare_inline(
    State(state): State<SharedState>,
    Json(payload): Json<CompareRequest>,
) -> ApiResult<Response> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    let left = payload.left.map(into_version).transpose()?;
    let right = payload.right.map(into_version).transpose()?;
    let comparison = DiffEngine::compare(left.as_ref(), right.as_ref());

    let show_unchanged = payload.show_unchanged.unwrap_or(state.show_unchanged_default);
    Ok(Json(DiffResponse {
        success: true,
        pair: None,
        diff: comparison.view(show_unchanged),
    })
    .into_response())
}

/// Drop all but the newest `keep` versions of a source
pub async fn prune_versions(
    State(state): State<SharedState>,
    Path(source_id): Path<Uuid>,
    Json(payload): Json<PruneRequest>,
) -> ApiResult<Json<SuccessResponse<PruneResult>>> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    let removed = state.versions.prune(source_id, payload.keep).await;
    let remaining = state.versions.list(source_id).await.len();
    info!("Source {}: pruned to {} versions", source_id, remaining);

    Ok(Json(SuccessResponse::with_data(
        format!("Removed {} versions", removed),
        PruneResult { removed, remaining },
    )))
}

fn into_version(schema: InlineSchema) -> ApiResult<SchemaVersion> {
    if let Some(name) = SchemaVersion::duplicate_column(&schema.columns) {
        return Err(validation_error(format!("Column '{}' appears more than once", name)));
    }
    Ok(SchemaVersion::new(Uuid::nil(), schema.version_number, schema.columns))
}
