//! Schema Evolution Module
//!
//! The heart of the service - what changed between two schema versions and
//! whether it is safe to ship.
//! This module provides:
//! - Diff engine (per-column change classification)
//! - Breaking-change policy
//! - Summary aggregation
//! - Version pairing (which two versions to compare)
//! - Presentation shaping and the version store

pub mod breaking;
pub mod diff;
pub mod pairing;
pub mod presentation;
pub mod store;
pub mod summary;

pub use diff::{compute_diff, ChangeKind, DiffEngine, DiffRecord, SchemaComparison};
pub use pairing::{PairingSelector, SelectionError, VersionPair, Versioned};
pub use presentation::{visible_records, DiffRow, DiffView};
pub use store::VersionStore;
pub use summary::{summarize, DiffSummary};
