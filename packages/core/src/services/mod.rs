//! Business Services
//!
//! This module contains the reordering engine's service layer:
//!
//! - `resolve_drop` - pure translation of a drag gesture into a target
//!   location (new parent + insertion index)
//! - `GroupService` - reorder reconciliation, canonical-state refresh, and
//!   the group lifecycle surface (create/rename/recolor/delete)
//!
//! Services coordinate between the Record Store and the UI-facing snapshot,
//! converting every failure into a single reportable error.

pub mod drop_resolution;
pub mod error;
pub mod group_service;

pub use drop_resolution::{resolve_drop, DropRequest, DropTarget};
pub use error::GroupServiceError;
pub use group_service::{GroupService, ReorderOutcome, SiblingFailure, TreeState};
