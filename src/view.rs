//! CollectionView - a live, locally cached view of one collection.
//!
//! A view reads its collection once on activation and then re-reads it
//! whenever the bus reports a change affecting that collection, whoever
//! made it. Writes made through the view patch the local cache straight
//! away and then publish, so every other view refreshes too.
//!
//! ## Example
//!
//! ```
//! use procure_mockdb::MockDb;
//! use serde_json::json;
//!
//! let db = MockDb::new();
//! let list = db.view("tenders");
//! let form = db.view("tenders");
//!
//! form.create_json(json!({"title": "Laptops"})).unwrap();
//! assert_eq!(list.records().len(), 1);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde_json::Value;
use tracing::trace;

use crate::bus::{ChangeBus, ChangeEvent, Subscription, Topic};
use crate::db::MockDb;
use crate::error::DbError;
use crate::record::{into_fields, Fields, Record, RecordKey};
use crate::store::MockDatabase;

pub(crate) type BoxedFilter = Box<dyn Fn(&Record) -> bool + Send + Sync>;

struct ViewState {
    collection: String,
    store: MockDatabase,
    filter: Option<Arc<dyn Fn(&Record) -> bool + Send + Sync>>,
    cache: RwLock<Vec<Record>>,
    refreshes: AtomicU64,
}

impl ViewState {
    fn accepts(&self, record: &Record) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(record))
    }

    fn read(&self) -> Vec<Record> {
        match &self.filter {
            Some(filter) => self.store.query(&self.collection, |record| filter(record)),
            None => self.store.get_all(&self.collection),
        }
    }

    fn reload(&self) {
        let records = self.read();
        *self.cache.write() = records;
    }
}

pub struct CollectionView {
    state: Arc<ViewState>,
    bus: ChangeBus,
    subscription: Option<Subscription>,
}

impl CollectionView {
    pub(crate) fn activate(db: &MockDb, collection: &str, filter: Option<BoxedFilter>) -> Self {
        let state = Arc::new(ViewState {
            collection: collection.to_string(),
            store: db.store().clone(),
            filter: filter.map(Arc::from),
            cache: RwLock::new(Vec::new()),
            refreshes: AtomicU64::new(0),
        });
        state.reload();

        let weak: Weak<ViewState> = Arc::downgrade(&state);
        let subscription = db
            .bus()
            .subscribe(Topic::collection(collection), move |event| {
                if let Some(state) = weak.upgrade() {
                    state.reload();
                    state.refreshes.fetch_add(1, Ordering::Relaxed);
                    trace!(collection = %state.collection, %event, "view refreshed");
                }
            });

        Self {
            state,
            bus: db.bus().clone(),
            subscription: Some(subscription),
        }
    }

    pub fn collection(&self) -> &str {
        &self.state.collection
    }

    /// Copy of the cached records.
    pub fn records(&self) -> Vec<Record> {
        self.state.cache.read().clone()
    }

    /// Cached record by numeric or string id.
    pub fn get(&self, key: impl Into<RecordKey>) -> Option<Record> {
        let key = key.into();
        self.state
            .cache
            .read()
            .iter()
            .find(|record| record.matches(&key))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.state.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the view still follows bus notifications.
    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    /// Number of bus-driven re-reads so far.
    pub fn refresh_count(&self) -> u64 {
        self.state.refreshes.load(Ordering::Relaxed)
    }

    /// Re-read the collection now.
    pub fn refresh(&self) {
        self.state.reload();
    }

    /// Stop following notifications. The cache keeps its last contents.
    pub fn deactivate(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            trace!(collection = %self.state.collection, "view deactivated");
        }
    }

    pub fn create(&self, fields: Fields) -> Record {
        let record = self.state.store.create(&self.state.collection, fields);
        if self.state.accepts(&record) {
            self.state.cache.write().push(record.clone());
        }
        self.bus
            .publish(&ChangeEvent::created(&self.state.collection, record.id()));
        record
    }

    pub fn create_json(&self, value: Value) -> Result<Record, DbError> {
        Ok(self.create(into_fields(value)?))
    }

    pub fn update(&self, key: impl Into<RecordKey>, patch: Fields) -> Option<Record> {
        let updated = self
            .state
            .store
            .update(&self.state.collection, key, patch)?;

        let cached = {
            let mut cache = self.state.cache.write();
            let position = cache.iter().position(|r| r.id() == updated.id());
            match (position, self.state.accepts(&updated)) {
                (Some(index), true) => {
                    cache[index] = updated.clone();
                    true
                }
                (Some(index), false) => {
                    cache.remove(index);
                    true
                }
                (None, false) => true,
                (None, true) => false,
            }
        };
        // Newly matching record: its position depends on the whole collection.
        if !cached {
            self.state.reload();
        }

        self.bus
            .publish(&ChangeEvent::updated(&self.state.collection, updated.id()));
        Some(updated)
    }

    pub fn update_json(
        &self,
        key: impl Into<RecordKey>,
        value: Value,
    ) -> Result<Option<Record>, DbError> {
        Ok(self.update(key, into_fields(value)?))
    }

    pub fn delete(&self, key: impl Into<RecordKey>) -> bool {
        let Some(removed) = self.state.store.remove(&self.state.collection, key) else {
            return false;
        };
        self.state
            .cache
            .write()
            .retain(|record| record.id() != removed.id());
        self.bus
            .publish(&ChangeEvent::deleted(&self.state.collection, removed.id()));
        true
    }

    /// Reset the whole store (not only this collection).
    pub fn reset(&self) {
        self.state.store.reset();
        self.state.reload();
        self.bus.publish(&ChangeEvent::reset());
    }

    /// Clear the whole store (not only this collection).
    pub fn clear(&self) {
        self.state.store.clear();
        self.state.reload();
        self.bus.publish(&ChangeEvent::cleared());
    }
}

impl fmt::Debug for CollectionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionView")
            .field("collection", &self.state.collection)
            .field("filtered", &self.state.filter.is_some())
            .field("len", &self.len())
            .field("active", &self.is_active())
            .finish()
    }
}
