//! Schema Version Store
//!
//! In-memory history of schema versions per data source. Versions are
//! numbered per source starting at 1 and never change once recorded.

use crate::error::AppError;
use crate::schema::{ColumnDefinition, SchemaVersion, VersionSummary};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Store for managing schema versions
pub struct VersionStore {
    /// Source ID -> (Version number -> Version)
    versions: Arc<RwLock<HashMap<Uuid, BTreeMap<u64, SchemaVersion>>>>,
    /// Source ID -> Latest version number ever assigned
    latest: Arc<RwLock<HashMap<Uuid, u64>>>,
    /// Keep at most this many versions per source
    retention: Option<usize>,
}

impl VersionStore {
    pub fn new() -> Self {
        Self::with_retention(None)
    }

    pub fn with_retention(retention: Option<usize>) -> Self {
        Self {
            versions: Arc::new(RwLock::new(HashMap::new())),
            latest: Arc::new(RwLock::new(HashMap::new())),
            retention,
        }
    }

    /// Record a new version for a source, assigning the next version number
    pub async fn record(
        &self,
        source_id: Uuid,
        columns: Vec<ColumnDefinition>,
    ) -> Result<SchemaVersion, AppError> {
        if let Some(name) = SchemaVersion::duplicate_column(&columns) {
            return Err(AppError::Validation(format!(
                "Column '{}' appears more than once",
                name
            )));
        }

        // Numbers keep increasing even after pruning
        let mut latest = self.latest.write().await;
        let version_number = latest.get(&source_id).copied().unwrap_or(0) + 1;
        latest.insert(source_id, version_number);

        let version = SchemaVersion::new(source_id, version_number, columns);

        let mut versions = self.versions.write().await;
        let history = versions.entry(source_id).or_default();
        history.insert(version_number, version.clone());

        tracing::info!(
            "Recorded schema v{} for source {}: {} columns",
            version_number,
            source_id,
            version.columns.len()
        );

        if let Some(keep) = self.retention {
            let dropped = Self::prune_history(history, keep);
            if dropped > 0 {
                tracing::info!("Retention dropped {} old versions for source {}", dropped, source_id);
            }
        }

        Ok(version)
    }

    /// List versions for a source, newest first
    pub async fn list(&self, source_id: Uuid) -> Vec<VersionSummary> {
        let versions = self.versions.read().await;
        versions
            .get(&source_id)
            .map(|history| history.values().rev().map(VersionSummary::from).collect())
            .unwrap_or_default()
    }

    /// Get a version by its ID
    pub async fn get(&self, source_id: Uuid, version_id: Uuid) -> Option<SchemaVersion> {
        let versions = self.versions.read().await;
        versions
            .get(&source_id)?
            .values()
            .find(|v| v.id == version_id)
            .cloned()
    }

    /// Get a version by its number
    pub async fn get_by_number(&self, source_id: Uuid, version_number: u64) -> Option<SchemaVersion> {
        let versions = self.versions.read().await;
        versions.get(&source_id)?.get(&version_number).cloned()
    }

    /// Fetch two versions for comparison, in (left, right) order
    pub async fn pair(
        &self,
        source_id: Uuid,
        left_id: Uuid,
        right_id: Uuid,
    ) -> Result<(SchemaVersion, SchemaVersion), AppError> {
        let left = self
            .get(source_id, left_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Version {} not found", left_id)))?;
        let right = self
            .get(source_id, right_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Version {} not found", right_id)))?;

        Ok((left, right))
    }

    /// Delete old versions, keeping the newest `keep`
    pub async fn prune(&self, source_id: Uuid, keep: usize) -> usize {
        let mut versions = self.versions.write().await;
        let Some(history) = versions.get_mut(&source_id) else {
            return 0;
        };

        let removed = Self::prune_history(history, keep);
        tracing::info!("Pruned {} old versions for source {}", removed, source_id);
        removed
    }

    fn prune_history(history: &mut BTreeMap<u64, SchemaVersion>, keep: usize) -> usize {
        let excess = history.len().saturating_sub(keep);
        let stale: Vec<u64> = history.keys().take(excess).copied().collect();
        for number in &stale {
            history.remove(number);
        }
        stale.len()
    }
}

impl Default for VersionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn columns(names: &[&str]) -> Vec<ColumnDefinition> {
        names.iter().map(|n| ColumnDefinition::new(*n, "string")).collect()
    }

    #[tokio::test]
    async fn test_record_assigns_increasing_numbers_per_source() {
        let store = VersionStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert_eq!(store.record(a, columns(&["id"])).await.unwrap().version_number, 1);
        assert_eq!(store.record(a, columns(&["id", "email"])).await.unwrap().version_number, 2);
        assert_eq!(store.record(b, columns(&["id"])).await.unwrap().version_number, 1);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = VersionStore::new();
        let source = Uuid::new_v4();
        for n in 1..=3 {
            let names: Vec<String> = (0..n).map(|i| format!("c{}", i)).collect();
            let cols = names.iter().map(|n| ColumnDefinition::new(n.as_str(), "int")).collect();
            store.record(source, cols).await.unwrap();
        }

        let list = store.list(source).await;
        let numbers: Vec<u64> = list.iter().map(|v| v.version_number).collect();
        assert_eq!(numbers, vec![3, 2, 1]);
        assert_eq!(list[0].column_count, 3);
        assert!(store.list(Uuid::new_v4()).await.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_columns_rejected() {
        let store = VersionStore::new();
        let source = Uuid::new_v4();

        let result = store.record(source, columns(&["id", "id"])).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(store.list(source).await.is_empty());
    }

    #[tokio::test]
    async fn test_get_by_id_and_number() {
        let store = VersionStore::new();
        let source = Uuid::new_v4();
        let recorded = store.record(source, columns(&["id"])).await.unwrap();

        assert_eq!(store.get(source, recorded.id).await, Some(recorded.clone()));
        assert_eq!(store.get_by_number(source, 1).await, Some(recorded.clone()));
        assert_eq!(store.get(Uuid::new_v4(), recorded.id).await, None);
        assert_eq!(store.get_by_number(source, 2).await, None);
    }

    #[tokio::test]
    async fn test_pair_reports_missing_side() {
        let store = VersionStore::new();
        let source = Uuid::new_v4();
        let v1 = store.record(source, columns(&["id"])).await.unwrap();

        let result = store.pair(source, v1.id, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_prune_keeps_newest_and_numbering_continues() {
        let store = VersionStore::new();
        let source = Uuid::new_v4();
        for _ in 0..4 {
            store.record(source, columns(&["id"])).await.unwrap();
        }

        assert_eq!(store.prune(source, 2).await, 2);
        let numbers: Vec<u64> = store.list(source).await.iter().map(|v| v.version_number).collect();
        assert_eq!(numbers, vec![4, 3]);

        let next = store.record(source, columns(&["id"])).await.unwrap();
        assert_eq!(next.version_number, 5);
        assert_eq!(store.prune(Uuid::new_v4(), 1).await, 0);
    }

    #[test]
    fn test_retention_applies_on_record() {
        let store = VersionStore::with_retention(Some(2));
        let source = Uuid::new_v4();

        tokio_test::block_on(async {
            for _ in 0..3 {
                store.record(source, columns(&["id"])).await.unwrap();
            }
            let numbers: Vec<u64> = store.list(source).await.iter().map(|v| v.version_number).collect();
            assert_eq!(numbers, vec![3, 2]);
        });
    }
}
