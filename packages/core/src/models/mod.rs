//! Data Models
//!
//! This module contains the core data structures for the group hierarchy:
//!
//! - `GroupNode` - one collection entry (flat, persisted form)
//! - `GroupUpdate` - the full-replace wire payload sent to the Record Store
//! - `GroupTree` - hierarchical form returned by the store's tree listing
//! - `GroupForest` - derived parent-indexed view used by drop resolution

mod forest;
mod group;

pub use forest::GroupForest;
pub use group::{validate_name, GroupNode, GroupTree, GroupUpdate, ValidationError};
