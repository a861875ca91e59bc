//! Record Store Error Types
//!
//! This module defines error types for Record Store operations, providing
//! clear error handling for lookup and referential integrity failures.

use thiserror::Error;

/// Record Store operation errors
///
/// Covers the error cases a store backend can report. Higher-level policy
/// (cycle rejection, partial-failure handling) lives in service-layer error
/// types.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Group does not exist
    #[error("Group not found: {id}")]
    NotFound { id: i64 },

    /// parent_id references a group that does not exist
    #[error("Invalid parent group: {parent_id}")]
    InvalidParent { parent_id: i64 },

    /// Display name failed validation
    #[error("Group name must not be empty")]
    EmptyName,
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    /// Create an invalid parent error
    pub fn invalid_parent(parent_id: i64) -> Self {
        Self::InvalidParent { parent_id }
    }
}
