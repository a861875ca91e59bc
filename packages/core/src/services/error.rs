//! Service Layer Error Types
//!
//! This module defines error types for the reordering engine, mapping every
//! failure mode of a drag gesture to a single user-reportable variant.
//!
//! Partial sibling failure is deliberately NOT an error variant: the
//! operation still completes with a refresh, so it is surfaced as data on
//! [`crate::services::ReorderOutcome`] instead.

use crate::models::ValidationError;
use thiserror::Error;

/// Reordering engine errors
///
/// All failures are caught at the service boundary and converted to one of
/// these; nothing escapes to the UI event handler uncaught.
#[derive(Error, Debug)]
pub enum GroupServiceError {
    /// Group not found in the current tree snapshot
    #[error("Group not found: {id}")]
    NodeNotFound { id: i64 },

    /// Drop would make a group its own ancestor; detected locally before
    /// any persistence call
    #[error("Move rejected: group {dragged_id} cannot be moved into itself or its descendant {target_id}")]
    CycleRejected { dragged_id: i64, target_id: i64 },

    /// The Record Store rejected the dragged group's reparent/reorder;
    /// siblings were left untouched
    #[error("Failed to move group {id}: {message}")]
    DraggedPersistFailed { id: i64, message: String },

    /// Re-fetching canonical state failed; local state is whatever it was
    /// before the refresh
    #[error("Failed to refresh group tree: {message}")]
    RefreshFailed { message: String },

    /// A reorder gesture arrived while a previous one was still in flight
    #[error("A group reorder is already in progress")]
    ReorderInProgress,

    /// Validation failed for a group field
    #[error("Group validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Store operation failed outside the reorder path (create/delete)
    #[error("Store operation failed: {message}")]
    StoreFailed { message: String },
}

impl GroupServiceError {
    /// Create a node not found error
    pub fn node_not_found(id: i64) -> Self {
        Self::NodeNotFound { id }
    }

    /// Create a cycle rejection error
    pub fn cycle_rejected(dragged_id: i64, target_id: i64) -> Self {
        Self::CycleRejected {
            dragged_id,
            target_id,
        }
    }

    /// Create a dragged-persist failure
    pub fn dragged_persist_failed(id: i64, message: impl Into<String>) -> Self {
        Self::DraggedPersistFailed {
            id,
            message: message.into(),
        }
    }

    /// Create a refresh failure
    pub fn refresh_failed(message: impl Into<String>) -> Self {
        Self::RefreshFailed {
            message: message.into(),
        }
    }

    /// Create a store failure
    pub fn store_failed(message: impl Into<String>) -> Self {
        Self::StoreFailed {
            message: message.into(),
        }
    }
}
