//! GroupService - Reorder Reconciliation and Tree Refresh
//!
//! One service instance manages one group collection (password groups and
//! note groups each get their own, sharing this implementation). It owns the
//! only mutable copy of the tree snapshot and reconciles drag gestures into
//! persisted, contiguous per-parent sort indices.
//!
//! # Reorder flow
//!
//! A gesture moves through these phases:
//!
//! ```text
//! Idle -> Resolving -> Persisting(dragged) -> Persisting(siblings) -> Refreshing -> Idle
//! ```
//!
//! - **Resolving** is pure (see [`crate::services::resolve_drop`]); cycle
//!   rejection short-circuits to Idle with zero persistence calls.
//! - **Persisting(dragged)** is strictly ordered before the sibling writes.
//!   Failure here aborts: siblings untouched, local state left as the last
//!   successful refresh (stale but consistent).
//! - **Persisting(siblings)** writes only the siblings whose position
//!   actually changed, concurrently and unordered. Individual failures are
//!   collected, never rolled back.
//! - **Refreshing** refetches canonical state and replaces the snapshot
//!   wholesale. The reconciler never trusts its own splice as final truth;
//!   whatever partially landed becomes visible here.
//!
//! A second gesture arriving before the previous one finished is rejected
//! with [`GroupServiceError::ReorderInProgress`] rather than queued or
//! interleaved.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinSet;

use crate::db::RecordStore;
use crate::models::{validate_name, GroupForest, GroupNode, GroupTree, GroupUpdate};
use crate::services::{resolve_drop, DropRequest, GroupServiceError};

/// Snapshot of one collection: the flat node list plus the hierarchical
/// listing from the store. Replaced wholesale after every refresh, never
/// patched in place.
#[derive(Debug, Clone, Default)]
pub struct TreeState {
    pub nodes: Vec<GroupNode>,
    pub tree: Vec<GroupTree>,
}

/// One sibling update that failed during reconciliation.
#[derive(Debug, Clone)]
pub struct SiblingFailure {
    pub id: i64,
    pub message: String,
}

/// Result of a completed reorder.
///
/// A non-empty `sibling_failures` means the drop partially landed; the
/// refresh that already ran is the ground truth for what the tree now shows.
#[derive(Debug, Clone)]
pub struct ReorderOutcome {
    pub moved_id: i64,
    pub new_parent_id: Option<i64>,
    pub sort_index: i64,
    pub sibling_failures: Vec<SiblingFailure>,
}

impl ReorderOutcome {
    /// True when every persistence call succeeded.
    pub fn is_clean(&self) -> bool {
        self.sibling_failures.is_empty()
    }
}

/// Reordering engine for one group collection.
pub struct GroupService {
    store: Arc<dyn RecordStore>,
    state: RwLock<TreeState>,
    /// Held for the duration of one reorder gesture; `try_lock` rejects
    /// re-entrant gestures instead of queueing them.
    reorder_gate: Mutex<()>,
}

impl GroupService {
    /// Create a service with an empty snapshot. Call [`Self::refresh`] (or
    /// use [`Self::load`]) before resolving drops.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            state: RwLock::new(TreeState::default()),
            reorder_gate: Mutex::new(()),
        }
    }

    /// Create a service and populate it from the store.
    pub async fn load(store: Arc<dyn RecordStore>) -> Result<Self, GroupServiceError> {
        let service = Self::new(store);
        service.refresh().await?;
        Ok(service)
    }

    /// Cloned flat node list from the current snapshot.
    pub async fn nodes(&self) -> Vec<GroupNode> {
        self.state.read().await.nodes.clone()
    }

    /// Cloned hierarchical listing from the current snapshot.
    pub async fn tree(&self) -> Vec<GroupTree> {
        self.state.read().await.tree.clone()
    }

    /// Forest built from the current snapshot.
    pub async fn forest(&self) -> GroupForest {
        GroupForest::build(&self.state.read().await.nodes)
    }

    /// Look up one group in the current snapshot.
    pub async fn get_group(&self, id: i64) -> Result<GroupNode, GroupServiceError> {
        self.forest()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| GroupServiceError::node_not_found(id))
    }

    /// Re-fetch canonical state from the Record Store and replace the local
    /// snapshot wholesale.
    ///
    /// Idempotent and safe to call after success or partial failure of a
    /// reorder. On error the previous snapshot is left intact.
    pub async fn refresh(&self) -> Result<(), GroupServiceError> {
        let nodes = self
            .store
            .list_nodes()
            .await
            .map_err(|e| GroupServiceError::refresh_failed(e.to_string()))?;
        let tree = self
            .store
            .get_tree(None)
            .await
            .map_err(|e| GroupServiceError::refresh_failed(e.to_string()))?;

        tracing::debug!("refreshed group tree: {} nodes", nodes.len());
        let mut state = self.state.write().await;
        *state = TreeState { nodes, tree };
        Ok(())
    }

    /// Reconcile a drag gesture into persisted sort indices.
    ///
    /// Resolves the drop against the current snapshot, persists the dragged
    /// group first (full payload: name, display fields, new parent and
    /// index), then updates only the siblings whose position shifted, and
    /// finally refreshes from the store.
    ///
    /// # Errors
    ///
    /// - [`GroupServiceError::ReorderInProgress`] - a previous gesture has
    ///   not finished
    /// - [`GroupServiceError::CycleRejected`] - self- or descendant-drop;
    ///   no persistence call was made
    /// - [`GroupServiceError::DraggedPersistFailed`] - the store rejected
    ///   the dragged group; siblings untouched, no refresh
    /// - [`GroupServiceError::RefreshFailed`] - the final refetch failed;
    ///   the snapshot still reflects pre-drop state
    ///
    /// Sibling failures are not errors: they are reported on the returned
    /// [`ReorderOutcome`] and the refresh still runs.
    pub async fn reorder(
        &self,
        request: DropRequest,
    ) -> Result<ReorderOutcome, GroupServiceError> {
        let _gate = self
            .reorder_gate
            .try_lock()
            .map_err(|_| GroupServiceError::ReorderInProgress)?;

        // Resolving
        let forest = self.forest().await;
        let target = resolve_drop(&forest, &request)?;
        let dragged = forest
            .get(request.dragged_id)
            .cloned()
            .ok_or_else(|| GroupServiceError::node_not_found(request.dragged_id))?;

        tracing::debug!(
            "reorder: group {} -> parent {:?} index {}",
            request.dragged_id,
            target.new_parent_id,
            target.insert_index
        );

        // Splice the dragged group into its new sibling list. The resolved
        // index was computed over the unfiltered list, so clamp after
        // filtering the dragged group out.
        let mut ordered: Vec<GroupNode> = forest
            .siblings_of(target.new_parent_id)
            .into_iter()
            .filter(|n| n.id != Some(request.dragged_id))
            .collect();
        let at = target.insert_index.min(ordered.len());
        ordered.insert(at, dragged.clone());

        // Persisting(dragged) - strictly before any sibling write. The full
        // payload rides along so a full-replace backend keeps the display
        // fields intact.
        let mut payload = dragged.to_update();
        payload.parent_id = target.new_parent_id;
        payload.sort_index = at as i64;
        if let Err(e) = self.store.update_node(request.dragged_id, payload).await {
            tracing::warn!("reorder: dragged group {} rejected: {}", request.dragged_id, e);
            return Err(GroupServiceError::dragged_persist_failed(
                request.dragged_id,
                e.to_string(),
            ));
        }

        // Persisting(siblings) - only positions that changed, dispatched
        // concurrently with no ordering between them.
        let mut writes: JoinSet<(i64, anyhow::Result<()>)> = JoinSet::new();
        for (position, node) in ordered.iter().enumerate() {
            let id = match node.id {
                Some(id) if id != request.dragged_id => id,
                _ => continue,
            };
            if node.sort_index == position as i64 {
                continue;
            }
            let mut payload = node.to_update();
            // parent_id is unchanged for siblings but resent defensively.
            payload.parent_id = target.new_parent_id;
            payload.sort_index = position as i64;
            let store = Arc::clone(&self.store);
            writes.spawn(async move { (id, store.update_node(id, payload).await) });
        }

        let mut sibling_failures = Vec::new();
        while let Some(joined) = writes.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((id, Err(e))) => {
                    tracing::warn!("reorder: sibling {} update failed: {}", id, e);
                    sibling_failures.push(SiblingFailure {
                        id,
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!("reorder: sibling update task failed: {}", e);
                }
            }
        }

        // Refreshing - unconditional, after successes and failures alike.
        self.refresh().await?;

        if !sibling_failures.is_empty() {
            tracing::warn!(
                "reorder: {} sibling update(s) failed; tree refreshed to partial state",
                sibling_failures.len()
            );
        }

        Ok(ReorderOutcome {
            moved_id: request.dragged_id,
            new_parent_id: target.new_parent_id,
            sort_index: at as i64,
            sibling_failures,
        })
    }

    /// Create a group appended after the current siblings under `parent_id`.
    pub async fn create_group(
        &self,
        name: String,
        color: Option<String>,
        icon: Option<String>,
        parent_id: Option<i64>,
    ) -> Result<i64, GroupServiceError> {
        validate_name(&name)?;
        let forest = self.forest().await;
        if let Some(pid) = parent_id {
            if !forest.contains(pid) {
                return Err(GroupServiceError::node_not_found(pid));
            }
        }
        let sort_index = forest.child_ids(parent_id).len() as i64;

        let id = self
            .store
            .create_node(GroupUpdate {
                name,
                color,
                icon,
                parent_id,
                sort_index,
            })
            .await
            .map_err(|e| GroupServiceError::store_failed(e.to_string()))?;

        self.refresh().await?;
        Ok(id)
    }

    /// Rename a group, resending its other attributes unchanged.
    pub async fn rename_group(&self, id: i64, name: String) -> Result<(), GroupServiceError> {
        validate_name(&name)?;
        let mut payload = self.get_group(id).await?.to_update();
        payload.name = name;
        self.store
            .update_node(id, payload)
            .await
            .map_err(|e| GroupServiceError::store_failed(e.to_string()))?;
        self.refresh().await
    }

    /// Change a group's color, resending its other attributes unchanged.
    pub async fn recolor_group(
        &self,
        id: i64,
        color: Option<String>,
    ) -> Result<(), GroupServiceError> {
        let mut payload = self.get_group(id).await?.to_update();
        payload.color = color;
        self.store
            .update_node(id, payload)
            .await
            .map_err(|e| GroupServiceError::store_failed(e.to_string()))?;
        self.refresh().await
    }

    /// Delete a group. Policy for children belongs to the store; the next
    /// reorder under the affected parent renumbers whatever survives.
    pub async fn delete_group(&self, id: i64) -> Result<(), GroupServiceError> {
        self.store
            .delete_node(id)
            .await
            .map_err(|e| GroupServiceError::store_failed(e.to_string()))?;
        self.refresh().await
    }
}
