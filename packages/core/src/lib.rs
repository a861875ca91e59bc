//! PassVault Group Reordering Engine
//!
//! This crate provides the hierarchical group management core for the
//! PassVault record manager: the tree model, drag-and-drop resolution, and
//! reorder reconciliation against an opaque Record Store backend.
//!
//! # Architecture
//!
//! - **Flat truth, derived tree**: groups persist as a flat list with
//!   `(parent_id, sort_index)`; the forest view is derived, never stored
//! - **Reconcile, don't trust**: a drop is computed locally as a pure
//!   splice, persisted with minimal writes, then the canonical tree is
//!   refetched and replaces local state wholesale
//! - **One engine, many collections**: password groups and note groups are
//!   two instances of the same [`services::GroupService`] over different
//!   [`db::RecordStore`] handles
//!
//! # Modules
//!
//! - [`models`] - data structures (GroupNode, GroupForest, wire payloads)
//! - [`services`] - drop resolution and the reorder reconciler
//! - [`db`] - Record Store abstraction and the embedded in-memory backend

pub mod db;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use db::*;
pub use models::*;
pub use services::*;
