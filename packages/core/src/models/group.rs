//! Group Data Structures
//!
//! This module defines the `GroupNode` struct describing one entry in a
//! hierarchical collection (password groups, note groups), together with the
//! wire payload (`GroupUpdate`) the reordering engine sends to the Record
//! Store.
//!
//! # Architecture
//!
//! - **Flat storage**: groups are persisted as a flat list; the parent/child
//!   view is derived (see [`crate::models::GroupForest`]), never stored.
//! - **Per-parent ordering**: `sort_index` is only meaningful among nodes
//!   sharing the same `parent_id`. After a successful reorder the indices
//!   under each parent form a contiguous zero-based sequence.
//! - **Full-replace updates**: the Record Store's update semantics are not
//!   guaranteed to be partial, so `GroupUpdate` always carries `name` (and
//!   the other display fields) even when only `sort_index` changed.
//!
//! # Examples
//!
//! ```rust
//! use passvault_core::models::GroupNode;
//!
//! // A root-level group
//! let work = GroupNode::new("Work".to_string(), None, 0);
//!
//! // A child group, appended after two existing siblings
//! let mail = GroupNode::new("Mail".to_string(), work.id, 2);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for group fields
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Group name must not be empty")]
    EmptyName,

    #[error("Group sort index must be non-negative, got {0}")]
    NegativeSortIndex(i64),
}

/// One entry in a hierarchical group collection.
///
/// # Fields
///
/// - `id`: integer identity assigned by the Record Store; `None` while a
///   creation is still in flight
/// - `name`: display label, non-empty
/// - `parent_id`: reference to another group, `None` for root-level groups
/// - `sort_index`: position among siblings sharing the same `parent_id`
/// - `color` / `icon`: display metadata, opaque to the reordering engine but
///   resent on every update so a full-replace backend cannot clobber them
/// - `created_at` / `updated_at`: maintained by the Record Store
///
/// The derived `children` view is intentionally absent: it is materialized by
/// [`crate::models::GroupForest`] from `parent_id` relationships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupNode {
    /// Persisted identity; `None` until the Record Store confirms creation
    pub id: Option<i64>,

    /// Display label, non-empty
    pub name: String,

    /// Parent group ID; `None` means root-level
    pub parent_id: Option<i64>,

    /// Position among siblings under `parent_id` (zero-based)
    pub sort_index: i64,

    /// Display color, opaque to the engine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Display icon, opaque to the engine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Creation timestamp (store-maintained)
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp (store-maintained)
    pub updated_at: DateTime<Utc>,
}

impl GroupNode {
    /// Create an unpersisted group (no `id` yet).
    ///
    /// `sort_index` should be the current sibling count under `parent_id` so
    /// the new group appends at the end; the caller computes that from the
    /// forest.
    pub fn new(name: String, parent_id: Option<i64>, sort_index: i64) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name,
            parent_id,
            sort_index,
            color: None,
            icon: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the display color (builder style).
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Validate field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] for a blank name and
    /// [`ValidationError::NegativeSortIndex`] for a negative sort index.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        if self.sort_index < 0 {
            return Err(ValidationError::NegativeSortIndex(self.sort_index));
        }
        Ok(())
    }

    /// Build the full-replace update payload carrying this node's current
    /// attributes unchanged.
    ///
    /// Callers adjust `parent_id` / `sort_index` on the result before
    /// sending; `name`, `color` and `icon` ride along so the update cannot
    /// clobber fields the caller did not intend to touch.
    pub fn to_update(&self) -> GroupUpdate {
        GroupUpdate {
            name: self.name.clone(),
            color: self.color.clone(),
            icon: self.icon.clone(),
            parent_id: self.parent_id,
            sort_index: self.sort_index,
        }
    }
}

/// Validate a group display name (non-empty after trimming).
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

/// Wire payload for `create_node` / `update_node`.
///
/// Always carries the complete attribute set. The Record Store's update is
/// treated as a full replace rather than a patch, so every field is resent on
/// every call even when only the ordering changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupUpdate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// `None` places the group at root level
    pub parent_id: Option<i64>,
    pub sort_index: i64,
}

impl GroupUpdate {
    /// JSON form of the payload as sent over the command interface.
    /// `None` display fields are omitted, `parent_id: null` is sent
    /// explicitly (it means "move to root", not "leave unchanged").
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Hierarchical form of a group collection as returned by the Record Store's
/// `get_tree` operation. `children` are ordered by `sort_index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTree {
    pub node: GroupNode,
    #[serde(default)]
    pub children: Vec<GroupTree>,
}

impl GroupTree {
    /// Leaf constructor.
    pub fn leaf(node: GroupNode) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }

    /// Total number of nodes in this subtree (self included).
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(GroupTree::size).sum::<usize>()
    }
}
