//! Store snapshots.
//!
//! A snapshot captures every collection with its records and id counter, so
//! a restored store keeps issuing fresh ids. The store itself never touches
//! disk; `save`/`load` are for embedding applications that want a durable
//! copy.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::DbError;
use crate::record::Record;
use crate::store::{Collection, MockDatabase};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub collections: BTreeMap<String, CollectionSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSnapshot {
    pub next_id: u64,
    pub records: Vec<Record>,
}

impl StoreSnapshot {
    pub fn to_json(&self) -> Result<String, DbError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, DbError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DbError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.collections.values().map(|c| c.records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn validate(&self) -> Result<(), DbError> {
        for (name, collection) in &self.collections {
            if name.is_empty() {
                return Err(DbError::Snapshot("collection name must not be empty".into()));
            }
            // Ids start at 1, and the counter must leave room for one more.
            if collection.next_id == 0 || collection.next_id == u64::MAX {
                return Err(DbError::Snapshot(format!(
                    "next_id {} in {} is out of range",
                    collection.next_id, name
                )));
            }
            let mut seen = HashSet::with_capacity(collection.records.len());
            for record in &collection.records {
                if !seen.insert(record.id()) {
                    return Err(DbError::Snapshot(format!(
                        "duplicate id {} in {}",
                        record.id(),
                        name
                    )));
                }
                if record.id() == 0 || record.id() >= collection.next_id {
                    return Err(DbError::Snapshot(format!(
                        "id {} in {} is outside 1..{}",
                        record.id(),
                        name,
                        collection.next_id
                    )));
                }
            }
        }
        Ok(())
    }
}

impl MockDatabase {
    /// Capture the whole store.
    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.read();
        let collections = state
            .iter()
            .map(|(name, c)| {
                (
                    name.clone(),
                    CollectionSnapshot {
                        next_id: c.next_id,
                        records: c.records.clone(),
                    },
                )
            })
            .collect();
        StoreSnapshot { collections }
    }

    /// Replace the whole store with `snapshot`. The store is untouched if
    /// the snapshot is inconsistent.
    pub fn restore(&self, snapshot: StoreSnapshot) -> Result<(), DbError> {
        if let Err(err) = snapshot.validate() {
            warn!(%err, "snapshot rejected");
            return Err(err);
        }

        let records = snapshot.len();
        let mut state = self.state.write();
        state.clear();
        for (name, c) in snapshot.collections {
            state.insert(
                name,
                Collection {
                    records: c.records,
                    next_id: c.next_id,
                },
            );
        }
        info!(records, "store restored from snapshot");
        Ok(())
    }
}
