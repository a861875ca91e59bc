//! Group Forest - Derived Tree View
//!
//! Builds a parent-indexed forest from the flat group list and answers the
//! queries drop resolution needs: ordered sibling enumeration, parent lookup,
//! and ancestor checks.
//!
//! The forest is a read-only snapshot. It is rebuilt from the flat list after
//! every refresh and never patched incrementally.
//!
//! # Permissive lookups
//!
//! Unknown IDs never fail: `find_ancestor_parent` on an unknown node yields
//! `None` and `siblings_of` on an unknown parent yields an empty list. Drop
//! gestures at the root level depend on this (a gap-drop next to a root node
//! resolves its parent to `None`).

use std::collections::HashMap;

use crate::models::GroupNode;

/// Parent-indexed view over a flat group list.
///
/// Nodes whose `parent_id` is `None` or references an ID not present in the
/// list become roots. Nodes without a persisted `id` (creations still in
/// flight) are not indexed and are invisible to lookups.
#[derive(Debug, Clone, Default)]
pub struct GroupForest {
    nodes: HashMap<i64, GroupNode>,
    /// parent id (`None` = root) -> child ids ordered by `sort_index`
    children: HashMap<Option<i64>, Vec<i64>>,
    /// node id -> effective parent id after orphan adoption
    parents: HashMap<i64, Option<i64>>,
}

impl GroupForest {
    /// Build a forest from a flat node list.
    ///
    /// One pass indexes nodes by id, one pass attaches children; each sibling
    /// list is then ordered by `sort_index` (ties broken by id so the order
    /// is deterministic even for the non-contiguous lists a partial failure
    /// can leave behind).
    pub fn build(nodes: &[GroupNode]) -> Self {
        let mut by_id: HashMap<i64, GroupNode> = HashMap::with_capacity(nodes.len());
        for node in nodes {
            if let Some(id) = node.id {
                by_id.insert(id, node.clone());
            }
        }

        let mut children: HashMap<Option<i64>, Vec<i64>> = HashMap::new();
        let mut parents: HashMap<i64, Option<i64>> = HashMap::with_capacity(by_id.len());
        for node in by_id.values() {
            let id = match node.id {
                Some(id) => id,
                None => continue,
            };
            // A parent_id pointing at a missing node makes this node a root.
            let parent = node.parent_id.filter(|pid| by_id.contains_key(pid));
            parents.insert(id, parent);
            children.entry(parent).or_default().push(id);
        }

        for ids in children.values_mut() {
            ids.sort_by_key(|id| {
                let node = &by_id[id];
                (node.sort_index, node.id)
            });
        }

        Self {
            nodes: by_id,
            children,
            parents,
        }
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the forest holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by id.
    pub fn get(&self, id: i64) -> Option<&GroupNode> {
        self.nodes.get(&id)
    }

    /// True when `id` is indexed.
    pub fn contains(&self, id: i64) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Parent of `node_id`, or `None` when the node is a root or unknown.
    ///
    /// The unknown-id case deliberately reads as "no parent found" rather
    /// than an error: gap-drops at the root level resolve through here.
    pub fn find_ancestor_parent(&self, node_id: i64) -> Option<i64> {
        self.parents.get(&node_id).copied().flatten()
    }

    /// Ordered children of `parent_id` (`None` = root-level nodes).
    ///
    /// Returns an empty list, never an error, for an unknown parent.
    pub fn siblings_of(&self, parent_id: Option<i64>) -> Vec<GroupNode> {
        self.children
            .get(&parent_id)
            .map(|ids| ids.iter().map(|id| self.nodes[id].clone()).collect())
            .unwrap_or_default()
    }

    /// Ordered child id list under `parent_id`.
    pub fn child_ids(&self, parent_id: Option<i64>) -> Vec<i64> {
        self.children.get(&parent_id).cloned().unwrap_or_default()
    }

    /// Root-level nodes in sibling order.
    pub fn roots(&self) -> Vec<GroupNode> {
        self.siblings_of(None)
    }

    /// True when `node_id` sits somewhere below `ancestor_id`.
    ///
    /// Walks the parent chain upward from `node_id`; the walk is bounded by
    /// the node count so a malformed (cyclic) list cannot loop forever.
    pub fn is_descendant(&self, ancestor_id: i64, node_id: i64) -> bool {
        let mut current = self.find_ancestor_parent(node_id);
        let mut steps = self.nodes.len();
        while let Some(id) = current {
            if id == ancestor_id {
                return true;
            }
            if steps == 0 {
                break;
            }
            steps -= 1;
            current = self.find_ancestor_parent(id);
        }
        false
    }
}
