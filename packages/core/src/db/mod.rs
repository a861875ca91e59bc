//! Persistence Layer
//!
//! This module defines the Record Store abstraction the reordering engine
//! persists through:
//!
//! - [`RecordStore`] - async trait covering list/tree/create/update/delete
//!   for one group collection (password groups and note groups are two
//!   disjoint instances)
//! - [`MemoryStore`] - embedded in-memory implementation
//! - [`StoreError`] - store-layer failures
//!
//! The engine never constructs wire payloads beyond
//! [`crate::models::GroupUpdate`]; everything below that (encryption,
//! storage, querying) is owned by the backend behind the trait.

mod error;
mod memory_store;
mod record_store;

pub use error::StoreError;
pub use memory_store::MemoryStore;
pub use record_store::RecordStore;
