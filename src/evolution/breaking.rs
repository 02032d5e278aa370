//! Breaking-Change Classifier
//!
//! The compatibility policy applied to every diff record. It deliberately
//! over-flags: a false positive costs a review, a false negative costs a
//! downstream outage.

use crate::evolution::diff::ChangeKind;

/// Decide whether a change of the given kind breaks existing consumers.
///
/// - removed columns always break readers of that column
/// - any type string change breaks, with no widening analysis
///   (`int32 -> int64` is flagged like `int -> string`)
/// - a constraint change breaks only when a nullable column becomes NOT NULL
/// - additions and unchanged columns never break
pub fn is_breaking(kind: ChangeKind, old_nullable: Option<bool>, new_nullable: Option<bool>) -> bool {
    match kind {
        ChangeKind::Removed | ChangeKind::TypeChanged => true,
        ChangeKind::ConstraintChanged => nullability_tightened(old_nullable, new_nullable),
        ChangeKind::Added | ChangeKind::Unchanged => false,
    }
}

/// Existing null rows break when a column that accepted nulls now forbids them.
/// Unknown nullability on either side is never treated as tightening.
pub fn nullability_tightened(old_nullable: Option<bool>, new_nullable: Option<bool>) -> bool {
    old_nullable == Some(true) && new_nullable == Some(false)
}
