//! In-memory mock database for the procurement portal.
//!
//! - [`MockDatabase`]: CRUD and filtering over named collections with
//!   per-collection, never-reused ids.
//! - [`ChangeBus`]: synchronous change notification, global or scoped to
//!   one collection.
//! - [`MockDb`]: the application-wide handle (store + bus) whose writes
//!   publish change events.
//! - [`CollectionView`]: a cached view of one collection that stays fresh
//!   whoever writes.
//! - [`SeedSet`]: canned demo data applied at start-up and on reset.
//! - [`Document`]: typed, validated schemas over the loosely-typed records.
//!
//! ```
//! use procure_mockdb::{MockDb, ResetPolicy, SeedSet};
//! use serde_json::json;
//!
//! let db = MockDb::with_seed(SeedSet::procurement(), ResetPolicy::Reseed);
//! let employees = db.view("employees");
//! assert_eq!(employees.len(), 4);
//!
//! db.create_json("employees", json!({"name": "New Hire", "email": "new@procure.example"}))?;
//! assert_eq!(employees.len(), 5);
//!
//! db.reset();
//! assert_eq!(employees.len(), 4);
//! # Ok::<(), procure_mockdb::DbError>(())
//! ```

extern crate self as procure_mockdb;

pub mod bus;
pub mod config;
mod db;
mod document;
mod error;
pub mod models;
mod record;
#[cfg(feature = "emitter")]
pub mod relay;
mod seed;
pub mod snapshot;
mod store;
mod view;

pub use bus::{ChangeBus, ChangeEvent, ChangeKind, Subscription, Topic};
pub use config::{MockDbConfig, SeedPolicy};
pub use db::MockDb;
pub use document::{Document, Documents, DocumentsExt, Stored};
pub use error::DbError;
pub use record::{into_fields, Fields, Record, RecordKey, ID_FIELD, MIRROR_ID_FIELD};
pub use seed::SeedSet;
pub use snapshot::{CollectionSnapshot, StoreSnapshot};
pub use store::{MockDatabase, ResetPolicy};
pub use view::CollectionView;

// Derive macro for `Document`
pub use procure_mockdb_macros::Document;

#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
#[cfg(feature = "emitter")]
pub use relay::EmitterRelay;
