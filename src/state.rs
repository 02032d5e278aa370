//! Application state management
//!
//! Contains shared state accessible across all handlers.

use crate::config::Settings;
use crate::evolution::VersionStore;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Schema version history per data source (has internal locking)
    pub versions: VersionStore,

    /// Whether diff responses include unchanged rows when the caller doesn't say
    pub show_unchanged_default: bool,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            versions: VersionStore::with_retention(settings.evolution.max_versions_per_source),
            show_unchanged_default: settings.evolution.show_unchanged_default,
        }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
