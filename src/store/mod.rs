//! MockDatabase - in-memory CRUD over named collections.
//!
//! Collections are created lazily on first write. Each one keeps its records
//! in insertion order and assigns ids from a per-collection counter that
//! starts at 1 and never moves backwards, so ids are never reused.
//!
//! ## Example
//!
//! ```
//! use procure_mockdb::{into_fields, MockDatabase};
//! use serde_json::json;
//!
//! let db = MockDatabase::new();
//! let a = db.create("employees", into_fields(json!({"name": "A"})).unwrap());
//! assert_eq!(a.id(), 1);
//! assert!(db.delete("employees", 1));
//! assert!(db.get_by_id("employees", "1").is_none());
//! ```

mod collection;
mod in_memory;

pub(crate) use collection::Collection;
pub use in_memory::MockDatabase;

/// What `reset()` leaves behind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResetPolicy {
    /// Reset returns the store to empty.
    Empty,
    /// Reset reapplies the seed the store was built with.
    #[default]
    Reseed,
}
