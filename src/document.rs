//! Documents - typed schemas over loosely-typed collections.
//!
//! A `Document` is a plain struct bound to one collection. Input is
//! serialized and validated before anything reaches the store, and stored
//! records are decoded back into the struct on the way out.
//!
//! ## Example
//!
//! ```ignore
//! use procure_mockdb::{Document, DocumentsExt, MockDb};
//!
//! #[derive(Clone, Serialize, Deserialize, Document)]
//! #[document(collection = "employees")]
//! struct Employee {
//!     name: String,
//! }
//!
//! let db = MockDb::new();
//! let stored = db.documents::<Employee>().create(&Employee { name: "A".into() })?;
//! let loaded = db.documents::<Employee>().get(stored.id)?;
//! ```

use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::db::MockDb;
use crate::error::DbError;
use crate::record::{into_fields, strip_identity, Fields, Record, RecordKey};

/// A typed record schema bound to one collection.
///
/// The struct holds content only; identity lives in [`Stored`]. Any `id`
/// or `_id` field the struct serializes is discarded on write.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Collection holding this document type.
    const COLLECTION: &'static str;

    /// Reject invalid content. Runs before every typed write.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Validate and convert into record fields.
    fn to_fields(&self) -> Result<Fields, DbError> {
        self.validate()
            .map_err(|message| DbError::schema(Self::COLLECTION, message))?;
        let value = serde_json::to_value(self)
            .map_err(|e| DbError::schema(Self::COLLECTION, e.to_string()))?;
        let mut fields = into_fields(value)?;
        strip_identity(&mut fields);
        Ok(fields)
    }

    /// Decode a stored record.
    fn from_record(record: &Record) -> Result<Self, DbError> {
        serde_json::from_value(Value::Object(record.fields().clone())).map_err(|e| {
            DbError::schema(Self::COLLECTION, format!("record {}: {}", record.id(), e))
        })
    }
}

/// A document together with its store-assigned identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<D> {
    pub id: u64,
    pub data: D,
}

impl<D> Stored<D> {
    pub fn mirror_id(&self) -> String {
        self.id.to_string()
    }
}

impl<D: Document> Stored<D> {
    fn decode(record: &Record) -> Result<Self, DbError> {
        Ok(Stored {
            id: record.id(),
            data: D::from_record(record)?,
        })
    }
}

/// Typed accessor for one document type.
///
/// Writes go through [`MockDb`], so they are published like any other write.
pub struct Documents<'a, D> {
    db: &'a MockDb,
    _marker: PhantomData<D>,
}

impl<'a, D: Document> Documents<'a, D> {
    pub fn new(db: &'a MockDb) -> Self {
        Self {
            db,
            _marker: PhantomData,
        }
    }

    /// Validate and insert.
    pub fn create(&self, document: &D) -> Result<Stored<D>, DbError> {
        let fields = document.to_fields()?;
        let record = self.db.create(D::COLLECTION, fields);
        Ok(Stored {
            id: record.id(),
            data: document.clone(),
        })
    }

    pub fn get(&self, key: impl Into<RecordKey>) -> Result<Option<Stored<D>>, DbError> {
        self.db
            .get_by_id(D::COLLECTION, key)
            .map(|record| Stored::<D>::decode(&record))
            .transpose()
    }

    /// Every document, in insertion order. Fails on the first record that
    /// does not decode.
    pub fn all(&self) -> Result<Vec<Stored<D>>, DbError> {
        self.db
            .get_all(D::COLLECTION)
            .iter()
            .map(Stored::<D>::decode)
            .collect()
    }

    pub fn find(&self, predicate: impl Fn(&D) -> bool) -> Result<Vec<Stored<D>>, DbError> {
        let mut found = Vec::new();
        for stored in self.all()? {
            if predicate(&stored.data) {
                found.push(stored);
            }
        }
        Ok(found)
    }

    pub fn find_one(&self, predicate: impl Fn(&D) -> bool) -> Result<Option<Stored<D>>, DbError> {
        Ok(self.all()?.into_iter().find(|stored| predicate(&stored.data)))
    }

    /// Overwrite every schema field of an existing document.
    pub fn replace(
        &self,
        key: impl Into<RecordKey>,
        document: &D,
    ) -> Result<Option<Stored<D>>, DbError> {
        let fields = document.to_fields()?;
        Ok(self.db.update(D::COLLECTION, key, fields).map(|record| Stored {
            id: record.id(),
            data: document.clone(),
        }))
    }

    /// Merge `patch` and commit only if the merged record still decodes and validates.
    pub fn patch(
        &self,
        key: impl Into<RecordKey>,
        patch: Fields,
    ) -> Result<Option<Stored<D>>, DbError> {
        let updated = self.db.update_checked(D::COLLECTION, key, patch, |merged| {
            let document = D::from_record(merged)?;
            document
                .validate()
                .map_err(|message| DbError::schema(D::COLLECTION, message))
        })?;
        updated.map(|record| Stored::<D>::decode(&record)).transpose()
    }

    /// `patch` for a JSON value, which must be an object.
    pub fn patch_json(
        &self,
        key: impl Into<RecordKey>,
        value: Value,
    ) -> Result<Option<Stored<D>>, DbError> {
        self.patch(key, into_fields(value)?)
    }

    pub fn delete(&self, key: impl Into<RecordKey>) -> bool {
        self.db.delete(D::COLLECTION, key)
    }
}

/// Typed document access on a [`MockDb`].
pub trait DocumentsExt {
    fn documents<D: Document>(&self) -> Documents<'_, D>;
}

impl DocumentsExt for MockDb {
    fn documents<D: Document>(&self) -> Documents<'_, D> {
        Documents::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Supplier {
        name: String,
        rating: u8,
    }

    impl Document for Supplier {
        const COLLECTION: &'static str = "suppliers";

        fn validate(&self) -> Result<(), String> {
            if self.name.trim().is_empty() {
                return Err("name must not be empty".into());
            }
            if self.rating > 5 {
                return Err(format!("rating {} is above 5", self.rating));
            }
            Ok(())
        }
    }

    fn supplier(name: &str, rating: u8) -> Supplier {
        Supplier {
            name: name.into(),
            rating,
        }
    }

    #[test]
    fn create_and_get() {
        let db = MockDb::new();
        let suppliers = db.documents::<Supplier>();

        let stored = suppliers.create(&supplier("Acme", 4)).unwrap();
        assert_eq!(stored.id, 1);
        assert_eq!(stored.mirror_id(), "1");

        let loaded = suppliers.get("1").unwrap().unwrap();
        assert_eq!(loaded, stored);
        assert!(suppliers.get(2).unwrap().is_none());
    }

    #[test]
    fn invalid_input_never_reaches_store() {
        let db = MockDb::new();
        let err = db.documents::<Supplier>().create(&supplier("", 1)).unwrap_err();
        assert!(matches!(err, DbError::Schema { ref collection, .. } if collection == "suppliers"));
        assert!(db.get_all("suppliers").is_empty());
    }

    #[test]
    fn patch_validates_merged_record() {
        let db = MockDb::new();
        let suppliers = db.documents::<Supplier>();
        suppliers.create(&supplier("Acme", 4)).unwrap();

        let err = suppliers.patch_json(1, json!({"rating": 9})).unwrap_err();
        assert!(matches!(err, DbError::Schema { .. }));

        let err = suppliers.patch_json(1, json!({"rating": "high"})).unwrap_err();
        assert!(matches!(err, DbError::Schema { .. }));
        assert_eq!(suppliers.get(1).unwrap().unwrap().data.rating, 4);

        let patched = suppliers.patch_json(1, json!({"rating": 5})).unwrap().unwrap();
        assert_eq!(patched.data, supplier("Acme", 5));
        assert!(suppliers.patch_json(7, json!({"rating": 1})).unwrap().is_none());
    }

    #[test]
    fn replace_overwrites_schema_fields() {
        let db = MockDb::new();
        let suppliers = db.documents::<Supplier>();
        suppliers.create(&supplier("Acme", 4)).unwrap();

        let updated = suppliers.replace(1, &supplier("Acme Ltd", 3)).unwrap().unwrap();
        assert_eq!(updated.id, 1);
        assert_eq!(suppliers.get(1).unwrap().unwrap().data, supplier("Acme Ltd", 3));
        assert!(suppliers.replace(5, &supplier("X", 1)).unwrap().is_none());
    }

    #[test]
    fn find_filters_in_order() {
        let db = MockDb::new();
        let suppliers = db.documents::<Supplier>();
        for (name, rating) in [("A", 5), ("B", 2), ("C", 4)] {
            suppliers.create(&supplier(name, rating)).unwrap();
        }

        let good: Vec<u64> = suppliers
            .find(|s| s.rating >= 4)
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(good, vec![1, 3]);

        let first = suppliers.find_one(|s| s.rating < 3).unwrap().unwrap();
        assert_eq!(first.data.name, "B");
    }

    #[test]
    fn undecodable_record_surfaces_as_schema_error() {
        let db = MockDb::new();
        db.create_json("suppliers", json!({"name": "Loose"})).unwrap();
        let err = db.documents::<Supplier>().all().unwrap_err();
        assert!(matches!(err, DbError::Schema { .. }));
    }

    #[test]
    fn delete_by_key() {
        let db = MockDb::new();
        let suppliers = db.documents::<Supplier>();
        suppliers.create(&supplier("Acme", 4)).unwrap();
        assert!(suppliers.delete("1"));
        assert!(!suppliers.delete("1"));
    }
}
