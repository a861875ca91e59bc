//! RecordStore Trait - Persistence Abstraction Layer
//!
//! This module defines the `RecordStore` trait that abstracts persistence
//! for one group collection. The password-group and note-group collections
//! are two disjoint instances of the same trait, which is what lets a single
//! reordering engine serve both.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: all methods are async; the backing implementation may
//!    be an embedded map, an IPC bridge, or a remote command interface
//! 2. **Result mapping**: backends that answer with `{ success, error }`
//!    envelopes surface the error string through `anyhow::Error`
//! 3. **Full-replace updates**: `update_node` is not guaranteed to be a
//!    partial patch, so callers always send the complete [`GroupUpdate`]
//!    payload (name included)
//!
//! # Examples
//!
//! ```rust,no_run
//! use passvault_core::db::{MemoryStore, RecordStore};
//! use passvault_core::models::GroupUpdate;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
//!
//!     let id = store
//!         .create_node(GroupUpdate {
//!             name: "Work".to_string(),
//!             color: None,
//!             icon: None,
//!             parent_id: None,
//!             sort_index: 0,
//!         })
//!         .await?;
//!
//!     let nodes = store.list_nodes().await?;
//!     assert_eq!(nodes.len(), 1);
//!     assert_eq!(nodes[0].id, Some(id));
//!     Ok(())
//! }
//! ```

use crate::models::{GroupNode, GroupTree, GroupUpdate};
use anyhow::Result;
use async_trait::async_trait;

/// Abstraction layer for one group collection's persistence.
///
/// Implementations must be `Send + Sync`; the reconciler dispatches sibling
/// updates from spawned tasks holding `Arc<dyn RecordStore>` clones.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// List all groups in the collection as a flat, unordered snapshot.
    async fn list_nodes(&self) -> Result<Vec<GroupNode>>;

    /// Fetch the hierarchical view rooted under `parent_id`
    /// (`None` = the whole collection from the roots down).
    ///
    /// Children at every level are ordered by `sort_index`.
    async fn get_tree(&self, parent_id: Option<i64>) -> Result<Vec<GroupTree>>;

    /// Create a group and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or `parent_id` references a
    /// group that does not exist.
    async fn create_node(&self, payload: GroupUpdate) -> Result<i64>;

    /// Replace a group's attributes with `payload`.
    ///
    /// Treated as a full replace: every field in the payload lands, fields
    /// absent from [`GroupUpdate`] (timestamps) are store-maintained.
    ///
    /// # Errors
    ///
    /// Returns an error if the group does not exist or `parent_id`
    /// references a group that does not exist.
    async fn update_node(&self, id: i64, payload: GroupUpdate) -> Result<()>;

    /// Delete a group.
    ///
    /// Policy for children (cascade, reparent, block) belongs to the
    /// backend; deleting an unknown id succeeds silently.
    async fn delete_node(&self, id: i64) -> Result<()>;
}
