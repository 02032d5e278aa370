//! Version Pairing Selector
//!
//! Picks which two versions of a source are being compared. By default the
//! two most recent versions are paired (older on the left, newer on the
//! right); callers may override either side or swap them. The selector is the
//! only place that refuses to compare a version with itself.

use crate::schema::{SchemaVersion, VersionSummary};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Anything the selector can pair: an identity and an ordering number
pub trait Versioned {
    fn id(&self) -> Uuid;
    fn version_number(&self) -> u64;
}

impl Versioned for VersionSummary {
    fn id(&self) -> Uuid {
        self.id
    }

    fn version_number(&self) -> u64 {
        self.version_number
    }
}

impl Versioned for SchemaVersion {
    fn id(&self) -> Uuid {
        self.id
    }

    fn version_number(&self) -> u64 {
        self.version_number
    }
}

/// Why the current selection cannot be diffed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("No schema versions recorded yet")]
    NoVersions,

    #[error("Need a second schema version to compare against")]
    NeedSecondVersion,

    #[error("Select a version on both sides to compare")]
    Incomplete,

    #[error("Cannot compare version {0} with itself")]
    SameVersion(Uuid),

    #[error("Version {0} is not part of this source's history")]
    UnknownVersion(Uuid),
}

/// Current left ("from") / right ("to") selection, by version id
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionPair {
    pub left: Option<Uuid>,
    pub right: Option<Uuid>,
}

impl VersionPair {
    pub fn new(left: Option<Uuid>, right: Option<Uuid>) -> Self {
        Self { left, right }
    }

    /// Exchange both sides verbatim, unset sides included
    pub fn swapped(self) -> Self {
        Self {
            left: self.right,
            right: self.left,
        }
    }
}

/// Selector over one source's version history
pub struct PairingSelector<'a, V: Versioned> {
    /// Newest first
    versions: Vec<&'a V>,
}

impl<'a, V: Versioned> PairingSelector<'a, V> {
    /// The input order is not trusted; versions are re-sorted newest first.
    pub fn new(versions: &'a [V]) -> Self {
        let mut sorted: Vec<&V> = versions.iter().collect();
        sorted.sort_by(|a, b| b.version_number().cmp(&a.version_number()));
        Self { versions: sorted }
    }

    /// The two most recent versions, or just the newest when only one exists
    pub fn default_pair(&self) -> VersionPair {
        VersionPair {
            left: self.versions.get(1).map(|v| v.id()),
            right: self.versions.first().map(|v| v.id()),
        }
    }

    /// Apply an explicit selection. A side left unset falls back to its
    /// default; ids outside this history are rejected.
    pub fn select(&self, left: Option<Uuid>, right: Option<Uuid>) -> Result<VersionPair, SelectionError> {
        for id in left.iter().chain(right.iter()) {
            if self.find(*id).is_none() {
                return Err(SelectionError::UnknownVersion(*id));
            }
        }

        let defaults = self.default_pair();
        Ok(VersionPair {
            left: left.or(defaults.left),
            right: right.or(defaults.right),
        })
    }

    /// Check the pair can be handed to the diff engine and return both sides
    /// as (left, right).
    pub fn resolve(&self, pair: VersionPair) -> Result<(&'a V, &'a V), SelectionError> {
        match self.versions.len() {
            0 => return Err(SelectionError::NoVersions),
            1 => return Err(SelectionError::NeedSecondVersion),
            _ => {}
        }

        let (left_id, right_id) = match (pair.left, pair.right) {
            (Some(left), Some(right)) => (left, right),
            _ => return Err(SelectionError::Incomplete),
        };

        if left_id == right_id {
            return Err(SelectionError::SameVersion(left_id));
        }

        let left = self.find(left_id).ok_or(SelectionError::UnknownVersion(left_id))?;
        let right = self.find(right_id).ok_or(SelectionError::UnknownVersion(right_id))?;
        Ok((left, right))
    }

    fn find(&self, id: Uuid) -> Option<&'a V> {
        self.versions.iter().copied().find(|v| v.id() == id)
    }
}
