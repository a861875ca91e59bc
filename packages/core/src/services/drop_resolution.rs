//! Drop Resolution
//!
//! Pure translation of a drag gesture into a target location. No side
//! effects: the reconciler decides what to persist, this module only decides
//! *where* the dragged group lands.
//!
//! # Gesture semantics
//!
//! The UI reports two kinds of drop:
//!
//! - **Drop into** (`drop_to_gap = false`): the dragged group becomes a
//!   child of the target, appended after its existing children.
//! - **Drop between** (`drop_to_gap = true`): the dragged group becomes a
//!   sibling of the target. `drop_position < 0` means the gap above the
//!   target, anything else the gap below it.
//!
//! Cycle prevention happens here, before any persistence: dropping a group
//! onto itself or into its own subtree aborts the whole gesture.

use crate::models::GroupForest;
use crate::services::GroupServiceError;

/// A drag gesture as reported by the UI tree widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropRequest {
    /// Group being dragged
    pub dragged_id: i64,
    /// Group the drop landed on (or next to, for gap drops)
    pub target_id: i64,
    /// `true` = drop between rows (sibling), `false` = drop onto a row (child)
    pub drop_to_gap: bool,
    /// Position relative to the target row; negative = above, else below.
    /// Only consulted for gap drops.
    pub drop_position: i32,
}

/// Resolved target location for a drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    /// New parent for the dragged group; `None` = root level
    pub new_parent_id: Option<i64>,
    /// Insertion position among the new parent's current children. Computed
    /// against the sibling list *including* the dragged group when it is
    /// already among them; the reconciler splices into the filtered list.
    pub insert_index: usize,
}

/// Resolve a drag gesture against the current forest snapshot.
///
/// # Errors
///
/// - [`GroupServiceError::NodeNotFound`] when the dragged or target group is
///   not in the snapshot
/// - [`GroupServiceError::CycleRejected`] when the drop would make the
///   dragged group its own ancestor (self-drop or descendant-drop)
pub fn resolve_drop(
    forest: &GroupForest,
    request: &DropRequest,
) -> Result<DropTarget, GroupServiceError> {
    let DropRequest {
        dragged_id,
        target_id,
        drop_to_gap,
        drop_position,
    } = *request;

    if !forest.contains(dragged_id) {
        return Err(GroupServiceError::node_not_found(dragged_id));
    }
    if !forest.contains(target_id) {
        return Err(GroupServiceError::node_not_found(target_id));
    }

    // Walk up from the target: if the dragged group appears in its ancestor
    // chain (or is the target itself) the move would create a cycle.
    if dragged_id == target_id || forest.is_descendant(dragged_id, target_id) {
        return Err(GroupServiceError::cycle_rejected(dragged_id, target_id));
    }

    if !drop_to_gap {
        // Becoming a child of the target, appended after existing children.
        let insert_index = forest.child_ids(Some(target_id)).len();
        return Ok(DropTarget {
            new_parent_id: Some(target_id),
            insert_index,
        });
    }

    // Gap drop: sibling of the target. A root-level target resolves to no
    // parent, which is exactly the drop-to-root case.
    let new_parent_id = forest.find_ancestor_parent(target_id);
    let siblings = forest.child_ids(new_parent_id);
    let target_pos = siblings
        .iter()
        .position(|&id| id == target_id)
        .unwrap_or(siblings.len());
    let insert_index = if drop_position < 0 {
        target_pos
    } else {
        target_pos + 1
    };

    Ok(DropTarget {
        new_parent_id,
        insert_index,
    })
}
