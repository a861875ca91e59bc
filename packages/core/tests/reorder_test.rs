//! Integration tests for the reorder reconciler.
//!
//! Runs GroupService against the embedded MemoryStore wrapped in an
//! observing layer that counts persistence calls, injects per-group update
//! failures, and can hold the first write open to exercise the re-entrancy
//! guard.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::sync::Notify;

use passvault_core::db::{MemoryStore, RecordStore};
use passvault_core::models::{GroupNode, GroupTree, GroupUpdate};
use passvault_core::services::{DropRequest, GroupService, GroupServiceError};

/// RecordStore wrapper recording every update call, with optional fault
/// injection and a one-shot gate that parks the first update in flight.
#[derive(Default)]
struct ObservedStore {
    inner: MemoryStore,
    updates: Mutex<Vec<(i64, GroupUpdate)>>,
    fail_update_ids: Mutex<HashSet<i64>>,
    fail_list: AtomicBool,
    block_first_update: AtomicBool,
    update_entered: Arc<Notify>,
    update_release: Arc<Notify>,
}

impl ObservedStore {
    fn new() -> Self {
        Self::default()
    }

    fn fail_updates_for(&self, id: i64) {
        self.fail_update_ids.lock().unwrap().insert(id);
    }

    fn recorded_updates(&self) -> Vec<(i64, GroupUpdate)> {
        self.updates.lock().unwrap().clone()
    }

    fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }
}

#[async_trait]
impl RecordStore for ObservedStore {
    async fn list_nodes(&self) -> Result<Vec<GroupNode>> {
        if self.fail_list.load(Ordering::SeqCst) {
            bail!("simulated list failure");
        }
        self.inner.list_nodes().await
    }

    async fn get_tree(&self, parent_id: Option<i64>) -> Result<Vec<GroupTree>> {
        self.inner.get_tree(parent_id).await
    }

    async fn create_node(&self, payload: GroupUpdate) -> Result<i64> {
        self.inner.create_node(payload).await
    }

    async fn update_node(&self, id: i64, payload: GroupUpdate) -> Result<()> {
        self.updates.lock().unwrap().push((id, payload.clone()));
        if self.fail_update_ids.lock().unwrap().contains(&id) {
            bail!("simulated update failure for group {id}");
        }
        if self.block_first_update.swap(false, Ordering::SeqCst) {
            self.update_entered.notify_one();
            self.update_release.notified().await;
        }
        self.inner.update_node(id, payload).await
    }

    async fn delete_node(&self, id: i64) -> Result<()> {
        self.inner.delete_node(id).await
    }
}

fn payload(name: &str, parent_id: Option<i64>, sort_index: i64) -> GroupUpdate {
    GroupUpdate {
        name: name.to_string(),
        color: None,
        icon: None,
        parent_id,
        sort_index,
    }
}

fn gap_drop(dragged_id: i64, target_id: i64, drop_position: i32) -> DropRequest {
    DropRequest {
        dragged_id,
        target_id,
        drop_to_gap: true,
        drop_position,
    }
}

fn into_drop(dragged_id: i64, target_id: i64) -> DropRequest {
    DropRequest {
        dragged_id,
        target_id,
        drop_to_gap: false,
        drop_position: 0,
    }
}

/// Seed three root groups A, B, C at sort 0, 1, 2.
async fn seed_roots(store: &ObservedStore) -> (i64, i64, i64) {
    let a = store.create_node(payload("A", None, 0)).await.unwrap();
    let b = store.create_node(payload("B", None, 1)).await.unwrap();
    let c = store.create_node(payload("C", None, 2)).await.unwrap();
    (a, b, c)
}

async fn service(store: &Arc<ObservedStore>) -> GroupService {
    let handle: Arc<dyn RecordStore> = store.clone();
    GroupService::load(handle).await.unwrap()
}

/// Ordered (id, sort_index) pairs under one parent, straight from the
/// service's refreshed snapshot.
async fn sibling_order(svc: &GroupService, parent: Option<i64>) -> Vec<(i64, i64)> {
    svc.forest()
        .await
        .siblings_of(parent)
        .iter()
        .map(|n| (n.id.unwrap(), n.sort_index))
        .collect()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[tokio::test]
async fn test_drag_between_siblings_issues_minimal_writes() {
    init_tracing();
    let store = Arc::new(ObservedStore::new());
    let (a, b, c) = seed_roots(&store).await;
    let svc = service(&store).await;

    // Drag C into the gap below A: expected final order A, C, B.
    let outcome = svc.reorder(gap_drop(c, a, 1)).await.unwrap();
    assert!(outcome.is_clean());
    assert_eq!(outcome.new_parent_id, None);
    assert_eq!(outcome.sort_index, 1);

    assert_eq!(
        sibling_order(&svc, None).await,
        vec![(a, 0), (c, 1), (b, 2)]
    );

    // Exactly two writes: C (dragged) and B (shifted). A kept index 0 and
    // must not generate a call.
    let updates = store.recorded_updates();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].0, c, "dragged group persists first");
    assert_eq!(updates[0].1.sort_index, 1);
    assert!(updates.iter().any(|(id, p)| *id == b && p.sort_index == 2));
    assert!(!updates.iter().any(|(id, _)| *id == a));
}

#[tokio::test]
async fn test_drop_into_appends_after_existing_children() {
    let store = Arc::new(ObservedStore::new());
    let (a, b, _c) = seed_roots(&store).await;
    let b1 = store.create_node(payload("B1", Some(b), 0)).await.unwrap();
    let b2 = store.create_node(payload("B2", Some(b), 1)).await.unwrap();
    let svc = service(&store).await;

    let outcome = svc.reorder(into_drop(a, b)).await.unwrap();
    assert!(outcome.is_clean());
    assert_eq!(outcome.new_parent_id, Some(b));
    assert_eq!(outcome.sort_index, 2);

    assert_eq!(
        sibling_order(&svc, Some(b)).await,
        vec![(b1, 0), (b2, 1), (a, 2)]
    );

    // Only the dragged group moved; no sibling shifted.
    assert_eq!(store.update_count(), 1);

    // The refreshed hierarchical listing agrees with the flat snapshot.
    let tree = svc.tree().await;
    let b_subtree = tree.iter().find(|t| t.node.id == Some(b)).unwrap();
    assert_eq!(b_subtree.children.len(), 3);
    assert_eq!(b_subtree.children[2].node.id, Some(a));
    assert_eq!(svc.nodes().await.len(), 5);
}

#[tokio::test]
async fn test_self_drop_rejected_without_persistence() {
    let store = Arc::new(ObservedStore::new());
    let (a, _b, _c) = seed_roots(&store).await;
    let svc = service(&store).await;

    let err = svc.reorder(into_drop(a, a)).await.unwrap_err();
    assert!(matches!(err, GroupServiceError::CycleRejected { .. }));
    assert_eq!(store.update_count(), 0);
}

#[tokio::test]
async fn test_descendant_drop_rejected_without_persistence() {
    let store = Arc::new(ObservedStore::new());
    let (a, _b, _c) = seed_roots(&store).await;
    let child = store.create_node(payload("A1", Some(a), 0)).await.unwrap();
    let grandchild = store
        .create_node(payload("A1a", Some(child), 0))
        .await
        .unwrap();
    let svc = service(&store).await;

    let err = svc.reorder(into_drop(a, grandchild)).await.unwrap_err();
    assert!(matches!(err, GroupServiceError::CycleRejected { .. }));
    assert_eq!(store.update_count(), 0);

    // Gap drop next to a descendant is rejected the same way.
    let err = svc.reorder(gap_drop(a, grandchild, 1)).await.unwrap_err();
    assert!(matches!(err, GroupServiceError::CycleRejected { .. }));
    assert_eq!(store.update_count(), 0);
}

#[tokio::test]
async fn test_sibling_failure_is_partial_not_fatal() {
    init_tracing();
    let store = Arc::new(ObservedStore::new());
    let (a, b, c) = seed_roots(&store).await;
    let d = store.create_node(payload("D", None, 3)).await.unwrap();
    let svc = service(&store).await;

    // Drag D above A: every other root shifts down by one. B's write fails.
    store.fail_updates_for(b);
    let outcome = svc.reorder(gap_drop(d, a, -1)).await.unwrap();

    assert_eq!(outcome.sibling_failures.len(), 1);
    assert_eq!(outcome.sibling_failures[0].id, b);

    // The refresh ran and the successful writes are preserved: D landed at
    // 0, A and C shifted, B kept its stale index.
    let order = sibling_order(&svc, None).await;
    let sort_of = |id: i64| order.iter().find(|(i, _)| *i == id).unwrap().1;
    assert_eq!(sort_of(d), 0);
    assert_eq!(sort_of(a), 1);
    assert_eq!(sort_of(c), 3);
    assert_eq!(sort_of(b), 1, "failed sibling keeps its pre-drop index");
}

#[tokio::test]
async fn test_dragged_failure_aborts_before_siblings() {
    let store = Arc::new(ObservedStore::new());
    let (a, b, c) = seed_roots(&store).await;
    let svc = service(&store).await;

    store.fail_updates_for(c);
    let err = svc.reorder(gap_drop(c, a, 1)).await.unwrap_err();
    assert!(matches!(
        err,
        GroupServiceError::DraggedPersistFailed { id, .. } if id == c
    ));

    // Only the rejected dragged write was attempted; B was never touched
    // and the snapshot still shows the pre-drop order.
    assert_eq!(store.update_count(), 1);
    assert_eq!(
        sibling_order(&svc, None).await,
        vec![(a, 0), (b, 1), (c, 2)]
    );
}

#[tokio::test]
async fn test_sort_indices_stay_contiguous_across_reorders() {
    let store = Arc::new(ObservedStore::new());
    let (a, b, c) = seed_roots(&store).await;
    let b1 = store.create_node(payload("B1", Some(b), 0)).await.unwrap();
    let svc = service(&store).await;

    svc.reorder(into_drop(a, b)).await.unwrap();
    svc.reorder(gap_drop(b1, c, 1)).await.unwrap();
    svc.reorder(gap_drop(a, b1, -1)).await.unwrap();

    let forest = svc.forest().await;
    for parent in [None, Some(a), Some(b), Some(c)] {
        let sorts: Vec<i64> = forest
            .siblings_of(parent)
            .iter()
            .map(|n| n.sort_index)
            .collect();
        let expected: Vec<i64> = (0..sorts.len() as i64).collect();
        assert_eq!(sorts, expected, "non-contiguous indices under {parent:?}");
    }
}

#[tokio::test]
async fn test_refresh_failure_keeps_previous_snapshot() {
    let store = Arc::new(ObservedStore::new());
    let (a, b, c) = seed_roots(&store).await;
    let svc = service(&store).await;

    store.fail_list.store(true, Ordering::SeqCst);
    let err = svc.reorder(gap_drop(c, a, 1)).await.unwrap_err();
    assert!(matches!(err, GroupServiceError::RefreshFailed { .. }));

    // The writes landed in the store, but the local snapshot was not
    // replaced: it still shows the pre-drop order.
    assert_eq!(
        sibling_order(&svc, None).await,
        vec![(a, 0), (b, 1), (c, 2)]
    );

    // A later refresh reconciles.
    store.fail_list.store(false, Ordering::SeqCst);
    svc.refresh().await.unwrap();
    assert_eq!(
        sibling_order(&svc, None).await,
        vec![(a, 0), (c, 1), (b, 2)]
    );
}

#[tokio::test]
async fn test_second_gesture_rejected_while_in_flight() {
    let store = Arc::new(ObservedStore::new());
    let (a, _b, c) = seed_roots(&store).await;
    let svc = Arc::new(service(&store).await);

    // Park the first gesture inside its dragged-group write.
    store.block_first_update.store(true, Ordering::SeqCst);
    let entered = store.update_entered.clone();
    let release = store.update_release.clone();

    let first = {
        let svc = svc.clone();
        tokio::spawn(async move { svc.reorder(gap_drop(c, a, 1)).await })
    };
    entered.notified().await;

    let err = svc.reorder(into_drop(a, c)).await.unwrap_err();
    assert!(matches!(err, GroupServiceError::ReorderInProgress));

    release.notify_one();
    let outcome = first.await.unwrap().unwrap();
    assert!(outcome.is_clean());
}

#[tokio::test]
async fn test_create_group_appends_at_sibling_count() {
    let store = Arc::new(ObservedStore::new());
    let (a, _b, _c) = seed_roots(&store).await;
    let svc = service(&store).await;

    let child = svc
        .create_group("A1".to_string(), Some("blue".to_string()), None, Some(a))
        .await
        .unwrap();
    let root = svc
        .create_group("D".to_string(), None, None, None)
        .await
        .unwrap();

    let forest = svc.forest().await;
    assert_eq!(forest.get(child).unwrap().sort_index, 0);
    assert_eq!(forest.get(root).unwrap().sort_index, 3);
}

#[tokio::test]
async fn test_rename_resends_full_payload() {
    let store = Arc::new(ObservedStore::new());
    let (a, _b, _c) = seed_roots(&store).await;
    let svc = service(&store).await;
    svc.recolor_group(a, Some("red".to_string())).await.unwrap();

    svc.rename_group(a, "Archive".to_string()).await.unwrap();

    let node = svc.get_group(a).await.unwrap();
    assert_eq!(node.name, "Archive");
    assert_eq!(node.color.as_deref(), Some("red"), "rename must not clobber color");

    let last = store.recorded_updates().pop().unwrap();
    assert_eq!(last.1.name, "Archive");
    assert_eq!(last.1.color.as_deref(), Some("red"));
}

#[tokio::test]
async fn test_delete_then_reorder_renumbers_survivors() {
    let store = Arc::new(ObservedStore::new());
    let (a, b, c) = seed_roots(&store).await;
    let d = store.create_node(payload("D", None, 3)).await.unwrap();
    let svc = service(&store).await;

    // Deleting B leaves a gap at index 1; the engine tolerates it.
    svc.delete_group(b).await.unwrap();
    assert_eq!(
        sibling_order(&svc, None).await,
        vec![(a, 0), (c, 2), (d, 3)]
    );

    // The next reorder under the parent renumbers contiguously.
    svc.reorder(gap_drop(d, a, 1)).await.unwrap();
    assert_eq!(
        sibling_order(&svc, None).await,
        vec![(a, 0), (d, 1), (c, 2)]
    );
}
