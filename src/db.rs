//! MockDb - the application-wide handle.
//!
//! Bundles one [`MockDatabase`] with one [`ChangeBus`]. Build it once at
//! start-up and pass clones to every consumer; clones share the same store
//! and bus. Writes through the handle publish a [`ChangeEvent`] once the
//! store mutation has completed, and only when something changed.

use serde_json::Value;
use tracing::info;

use crate::bus::{ChangeBus, ChangeEvent, Subscription, Topic};
use crate::config::MockDbConfig;
use crate::error::DbError;
use crate::record::{into_fields, Fields, Record, RecordKey};
use crate::seed::SeedSet;
use crate::snapshot::StoreSnapshot;
use crate::store::{MockDatabase, ResetPolicy};
use crate::view::CollectionView;

#[derive(Clone, Default)]
pub struct MockDb {
    store: MockDatabase,
    bus: ChangeBus,
}

impl MockDb {
    /// Empty store, no seed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store populated with `seed`.
    pub fn with_seed(seed: SeedSet, policy: ResetPolicy) -> Self {
        Self::from_parts(MockDatabase::with_seed(seed, policy), ChangeBus::new())
    }

    /// Build the handle described by `config`.
    pub fn from_config(config: &MockDbConfig) -> Result<Self, DbError> {
        let policy = if config.reseed_on_reset {
            ResetPolicy::Reseed
        } else {
            ResetPolicy::Empty
        };

        let db = match config.seed_set()? {
            Some(seed) => Self::with_seed(seed, policy),
            None => Self::new(),
        };
        info!(
            collections = db.store.collection_names().len(),
            ?policy,
            "mock database ready"
        );
        Ok(db)
    }

    pub fn from_parts(store: MockDatabase, bus: ChangeBus) -> Self {
        Self { store, bus }
    }

    /// The underlying store. Writes made directly on it are not published.
    pub fn store(&self) -> &MockDatabase {
        &self.store
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    /// Listen for changes.
    pub fn subscribe<F>(&self, topic: Topic, listener: F) -> Subscription
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.bus.subscribe(topic, listener)
    }

    /// Live view over a whole collection.
    pub fn view(&self, collection: &str) -> CollectionView {
        CollectionView::activate(self, collection, None)
    }

    /// Live view over the records of `collection` matching `filter`.
    pub fn filtered_view<F>(&self, collection: &str, filter: F) -> CollectionView
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        CollectionView::activate(self, collection, Some(Box::new(filter)))
    }

    // ==================== Reads ====================

    pub fn get_all(&self, collection: &str) -> Vec<Record> {
        self.store.get_all(collection)
    }

    pub fn get_by_id(&self, collection: &str, key: impl Into<RecordKey>) -> Option<Record> {
        self.store.get_by_id(collection, key)
    }

    pub fn query<P>(&self, collection: &str, predicate: P) -> Vec<Record>
    where
        P: Fn(&Record) -> bool,
    {
        self.store.query(collection, predicate)
    }

    pub fn find_one<P>(&self, collection: &str, predicate: P) -> Option<Record>
    where
        P: Fn(&Record) -> bool,
    {
        self.store.find_one(collection, predicate)
    }

    // ==================== Writes ====================

    pub fn create(&self, collection: &str, fields: Fields) -> Record {
        let record = self.store.create(collection, fields);
        self.bus.publish(&ChangeEvent::created(collection, record.id()));
        record
    }

    pub fn create_json(&self, collection: &str, value: Value) -> Result<Record, DbError> {
        Ok(self.create(collection, into_fields(value)?))
    }

    pub fn update(
        &self,
        collection: &str,
        key: impl Into<RecordKey>,
        patch: Fields,
    ) -> Option<Record> {
        let updated = self.store.update(collection, key, patch)?;
        self.bus.publish(&ChangeEvent::updated(collection, updated.id()));
        Some(updated)
    }

    pub fn update_json(
        &self,
        collection: &str,
        key: impl Into<RecordKey>,
        value: Value,
    ) -> Result<Option<Record>, DbError> {
        Ok(self.update(collection, key, into_fields(value)?))
    }

    /// See [`MockDatabase::update_checked`].
    pub fn update_checked<E, F>(
        &self,
        collection: &str,
        key: impl Into<RecordKey>,
        patch: Fields,
        check: F,
    ) -> Result<Option<Record>, E>
    where
        F: FnOnce(&Record) -> Result<(), E>,
    {
        let updated = self.store.update_checked(collection, key, patch, check)?;
        if let Some(record) = &updated {
            self.bus.publish(&ChangeEvent::updated(collection, record.id()));
        }
        Ok(updated)
    }

    pub fn delete(&self, collection: &str, key: impl Into<RecordKey>) -> bool {
        match self.store.remove(collection, key) {
            Some(removed) => {
                self.bus.publish(&ChangeEvent::deleted(collection, removed.id()));
                true
            }
            None => false,
        }
    }

    pub fn reset(&self) {
        self.store.reset();
        self.bus.publish(&ChangeEvent::reset());
    }

    pub fn clear(&self) {
        self.store.clear();
        self.bus.publish(&ChangeEvent::cleared());
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.store.snapshot()
    }

    /// Replace the whole store with `snapshot`.
    pub fn restore(&self, snapshot: StoreSnapshot) -> Result<(), DbError> {
        self.store.restore(snapshot)?;
        self.bus.publish(&ChangeEvent::restored());
        Ok(())
    }
}
