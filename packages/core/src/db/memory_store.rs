//! MemoryStore - Embedded RecordStore Implementation
//!
//! In-memory backend for the [`RecordStore`] trait: a node map behind a
//! tokio `RwLock` with monotonic id allocation. This is the store the
//! integration tests run against and a working default for callers that do
//! not bring their own backend.
//!
//! Delete cascades to descendants, matching the backend the engine was
//! designed against. Sibling indices are stored exactly as sent; contiguity
//! is the reconciler's job, not the store's.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::db::{RecordStore, StoreError};
use crate::models::{validate_name, GroupNode, GroupTree, GroupUpdate};

#[derive(Debug, Default)]
struct MemoryInner {
    next_id: i64,
    nodes: BTreeMap<i64, GroupNode>,
}

/// Embedded in-memory group store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn build_subtree(nodes: &BTreeMap<i64, GroupNode>, parent_id: Option<i64>) -> Vec<GroupTree> {
        let mut children: Vec<&GroupNode> = nodes
            .values()
            .filter(|n| n.parent_id == parent_id)
            .collect();
        children.sort_by_key(|n| (n.sort_index, n.id));

        children
            .into_iter()
            .map(|node| GroupTree {
                node: node.clone(),
                children: node
                    .id
                    .map(|id| Self::build_subtree(nodes, Some(id)))
                    .unwrap_or_default(),
            })
            .collect()
    }

    fn collect_descendants(nodes: &BTreeMap<i64, GroupNode>, root: i64, out: &mut Vec<i64>) {
        for node in nodes.values() {
            if node.parent_id == Some(root) {
                if let Some(id) = node.id {
                    out.push(id);
                    Self::collect_descendants(nodes, id, out);
                }
            }
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_nodes(&self) -> Result<Vec<GroupNode>> {
        let inner = self.inner.read().await;
        Ok(inner.nodes.values().cloned().collect())
    }

    async fn get_tree(&self, parent_id: Option<i64>) -> Result<Vec<GroupTree>> {
        let inner = self.inner.read().await;
        if let Some(pid) = parent_id {
            if !inner.nodes.contains_key(&pid) {
                return Ok(Vec::new());
            }
        }
        Ok(Self::build_subtree(&inner.nodes, parent_id))
    }

    async fn create_node(&self, payload: GroupUpdate) -> Result<i64> {
        validate_name(&payload.name).map_err(|_| StoreError::EmptyName)?;

        let mut inner = self.inner.write().await;
        if let Some(pid) = payload.parent_id {
            if !inner.nodes.contains_key(&pid) {
                return Err(StoreError::invalid_parent(pid).into());
            }
        }

        inner.next_id += 1;
        let id = inner.next_id;
        let now = Utc::now();
        let node = GroupNode {
            id: Some(id),
            name: payload.name,
            parent_id: payload.parent_id,
            sort_index: payload.sort_index,
            color: payload.color,
            icon: payload.icon,
            created_at: now,
            updated_at: now,
        };
        inner.nodes.insert(id, node);
        Ok(id)
    }

    async fn update_node(&self, id: i64, payload: GroupUpdate) -> Result<()> {
        validate_name(&payload.name).map_err(|_| StoreError::EmptyName)?;

        let mut inner = self.inner.write().await;
        if let Some(pid) = payload.parent_id {
            if !inner.nodes.contains_key(&pid) {
                return Err(StoreError::invalid_parent(pid).into());
            }
        }

        let node = inner
            .nodes
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(id))?;
        node.name = payload.name;
        node.color = payload.color;
        node.icon = payload.icon;
        node.parent_id = payload.parent_id;
        node.sort_index = payload.sort_index;
        node.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_node(&self, id: i64) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.nodes.remove(&id).is_none() {
            // Idempotent delete
            return Ok(());
        }
        let mut doomed = Vec::new();
        Self::collect_descendants(&inner.nodes, id, &mut doomed);
        for child_id in doomed {
            inner.nodes.remove(&child_id);
        }
        Ok(())
    }
}
