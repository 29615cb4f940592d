//! Two-phase reassignment of section indices.
//!
//! `section_index` is guarded by an eagerly checked unique index, so writing
//! the final values directly can collide halfway through (swapping 1 and 2
//! writes a second 1 before the old 1 has moved). Every section is first
//! parked in a staging range above the current maximum, then given its
//! final index.

use std::collections::{BTreeSet, HashSet};

use crate::error::CoreError;
use crate::types::DbId;

/// Distance between the current maximum index and the staging range.
pub const STAGING_OFFSET: i32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan {
    /// Phase one: `(id, current_max + STAGING_OFFSET + position)`.
    pub staging: Vec<(DbId, i32)>,
    /// Phase two: `(id, position + 1)`, so indices run `1..=N`.
    pub final_indices: Vec<(DbId, i32)>,
}

/// Reject an ordering that names the same section twice.
pub fn validate_order(ordered_ids: &[DbId]) -> Result<(), CoreError> {
    let mut seen = HashSet::with_capacity(ordered_ids.len());
    let duplicates: BTreeSet<DbId> = ordered_ids
        .iter()
        .copied()
        .filter(|id| !seen.insert(*id))
        .collect();
    let errors: Vec<String> = duplicates
        .into_iter()
        .map(|id| format!("orderedIds contains section {id} more than once"))
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::InvalidFields(errors))
    }
}

/// Check that `ordered_ids` names every live section exactly once.
pub fn check_complete(ordered_ids: &[DbId], live_ids: &[DbId]) -> Result<(), CoreError> {
    let ordered: HashSet<DbId> = ordered_ids.iter().copied().collect();
    let live: HashSet<DbId> = live_ids.iter().copied().collect();

    let mut errors = Vec::new();
    let mut unknown: Vec<_> = ordered.difference(&live).copied().collect();
    unknown.sort_unstable();
    errors.extend(unknown.into_iter().map(|id| format!("Section {id} does not exist")));

    let mut missing: Vec<_> = live.difference(&ordered).copied().collect();
    missing.sort_unstable();
    errors.extend(
        missing
            .into_iter()
            .map(|id| format!("orderedIds is missing section {id}")),
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::InvalidFields(errors))
    }
}

/// Build the staging and final assignments for `ordered_ids`.
///
/// `current_max` is the largest index in use before the reorder (use `0`
/// for an empty collection).
pub fn plan(current_max: i32, ordered_ids: &[DbId]) -> ReorderPlan {
    let base = current_max.max(0) + STAGING_OFFSET;
    let mut staging = Vec::with_capacity(ordered_ids.len());
    let mut final_indices = Vec::with_capacity(ordered_ids.len());
    for (position, id) in ordered_ids.iter().enumerate() {
        let position = position as i32;
        staging.push((*id, base + position));
        final_indices.push((*id, position + 1));
    }
    ReorderPlan {
        staging,
        final_indices,
    }
}
