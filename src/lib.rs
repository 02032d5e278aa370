//! SchemaFlow Evolution - Schema Diff & Compatibility Engine
//!
//! Tracks how a data source's column schema evolves across versions and
//! answers two questions about any pair of versions: what changed, column by
//! column, and does the change break existing consumers.
//!
//! The engine itself ([`evolution::compute_diff`], [`evolution::summarize`])
//! is pure and synchronous. The rest of the crate wraps it in a small HTTP
//! service with an in-memory version history.

pub mod config;
pub mod error;
pub mod evolution;
pub mod models;
pub mod routes;
pub mod schema;
pub mod state;

pub use evolution::{compute_diff, summarize, ChangeKind, DiffRecord, DiffSummary};
pub use schema::{ColumnDefinition, SchemaVersion};
