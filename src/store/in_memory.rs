use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info};

use super::{Collection, ResetPolicy};
use crate::error::DbError;
use crate::record::{into_fields, Fields, Record, RecordKey};
use crate::seed::SeedSet;

pub(crate) type Collections = HashMap<String, Collection>;

/// In-memory store of named collections.
///
/// Clone-friendly via Arc: clones share the same collections. Every
/// operation takes the lock once, so each call is atomic with respect to
/// other callers.
#[derive(Clone, Default)]
pub struct MockDatabase {
    pub(crate) state: Arc<RwLock<Collections>>,
    reseed: Option<Arc<SeedSet>>,
}

impl MockDatabase {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store populated with `seed`.
    ///
    /// With `ResetPolicy::Reseed` the same seed is reapplied by `reset()`.
    pub fn with_seed(seed: SeedSet, policy: ResetPolicy) -> Self {
        let mut collections = Collections::new();
        apply_seed(&mut collections, &seed);
        info!(records = seed.len(), ?policy, "store seeded");

        Self {
            state: Arc::new(RwLock::new(collections)),
            reseed: match policy {
                ResetPolicy::Reseed => Some(Arc::new(seed)),
                ResetPolicy::Empty => None,
            },
        }
    }

    pub fn reset_policy(&self) -> ResetPolicy {
        if self.reseed.is_some() {
            ResetPolicy::Reseed
        } else {
            ResetPolicy::Empty
        }
    }

    /// Append a record, creating the collection if needed.
    ///
    /// Any `id`/`_id` keys in `fields` are discarded.
    pub fn create(&self, collection: &str, fields: Fields) -> Record {
        let record = self
            .state
            .write()
            .entry(collection.to_string())
            .or_default()
            .insert(fields);

        debug!(collection, id = record.id(), "record created");
        record
    }

    /// `create` for a JSON value, which must be an object.
    pub fn create_json(&self, collection: &str, value: Value) -> Result<Record, DbError> {
        Ok(self.create(collection, into_fields(value)?))
    }

    /// Snapshot of every record in the collection, in insertion order.
    pub fn get_all(&self, collection: &str) -> Vec<Record> {
        self.state
            .read()
            .get(collection)
            .map(|c| c.records.clone())
            .unwrap_or_default()
    }

    /// Get a record by numeric or string id.
    pub fn get_by_id(&self, collection: &str, key: impl Into<RecordKey>) -> Option<Record> {
        let key = key.into();
        self.state
            .read()
            .get(collection)
            .and_then(|c| c.get(&key))
            .cloned()
    }

    /// Records matching `predicate`, in insertion order.
    ///
    /// The predicate runs on a snapshot outside the lock and may call back
    /// into the store.
    pub fn query<P>(&self, collection: &str, predicate: P) -> Vec<Record>
    where
        P: Fn(&Record) -> bool,
    {
        self.get_all(collection)
            .into_iter()
            .filter(|record| predicate(record))
            .collect()
    }

    /// First record matching `predicate`.
    pub fn find_one<P>(&self, collection: &str, predicate: P) -> Option<Record>
    where
        P: Fn(&Record) -> bool,
    {
        self.get_all(collection)
            .into_iter()
            .find(|record| predicate(record))
    }

    /// Shallow-merge `patch` into an existing record.
    ///
    /// Returns `None` and changes nothing if no record matches.
    pub fn update(
        &self,
        collection: &str,
        key: impl Into<RecordKey>,
        patch: Fields,
    ) -> Option<Record> {
        let result: Result<Option<Record>, std::convert::Infallible> =
            self.update_checked(collection, key, patch, |_| Ok(()));
        match result {
            Ok(updated) => updated,
            Err(never) => match never {},
        }
    }

    /// `update` for a JSON value, which must be an object.
    pub fn update_json(
        &self,
        collection: &str,
        key: impl Into<RecordKey>,
        value: Value,
    ) -> Result<Option<Record>, DbError> {
        Ok(self.update(collection, key, into_fields(value)?))
    }

    /// Merge `patch`, then commit only if `check` accepts the merged record.
    ///
    /// `check` runs under the write lock and must not call back into the store.
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
        let key = key.into();
        let mut state = self.state.write();

        let Some(records) = state.get_mut(collection).map(|c| &mut c.records) else {
            debug!(collection, %key, "update missed: unknown collection");
            return Ok(None);
        };
        let Some(existing) = records.iter_mut().find(|r| r.matches(&key)) else {
            debug!(collection, %key, "update missed: no such record");
            return Ok(None);
        };

        let mut merged = existing.clone();
        merged.merge(patch);
        check(&merged)?;
        *existing = merged.clone();

        debug!(collection, id = merged.id(), "record updated");
        Ok(Some(merged))
    }

    /// Remove a record. Returns false if it did not exist.
    pub fn delete(&self, collection: &str, key: impl Into<RecordKey>) -> bool {
        self.remove(collection, key).is_some()
    }

    /// Remove a record and return it.
    pub fn remove(&self, collection: &str, key: impl Into<RecordKey>) -> Option<Record> {
        let key = key.into();
        let mut state = self.state.write();

        let c = state.get_mut(collection)?;
        let index = c.position(&key)?;
        let removed = c.records.remove(index);
        debug!(collection, id = removed.id(), "record deleted");
        Some(removed)
    }

    /// Drop every collection and counter, then reseed if the policy says so.
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.clear();
        if let Some(seed) = &self.reseed {
            apply_seed(&mut state, seed);
        }
        info!(reseeded = self.reseed.is_some(), "store reset");
    }

    /// Drop every collection and counter. Never reseeds.
    pub fn clear(&self) {
        self.state.write().clear();
        info!("store cleared");
    }

    /// Number of records in the collection.
    pub fn len(&self, collection: &str) -> usize {
        self.state
            .read()
            .get(collection)
            .map_or(0, |c| c.records.len())
    }

    pub fn is_empty_collection(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Names of every collection written to since the last reset, sorted.
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// The id the next `create` in this collection will assign.
    pub fn next_id(&self, collection: &str) -> u64 {
        self.state
            .read()
            .get(collection)
            .map_or(1, |c| c.next_id)
    }
}

pub(crate) fn apply_seed(collections: &mut Collections, seed: &SeedSet) {
    for (name, records) in seed.collections() {
        let collection = collections.entry(name.to_string()).or_default();
        for fields in records {
            collection.insert(fields.clone());
        }
    }
}
