//! Canned seed data.
//!
//! A `SeedSet` maps collection names to ordered lists of records without
//! identity. Applying it to an empty store assigns ids 1, 2, 3, ... per
//! collection in list order.
//!
//! The JSON form is an object of `collection -> [record, ...]`:
//!
//! ```json
//! { "employees": [ { "name": "A" }, { "name": "B" } ] }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::document::Document;
use crate::error::DbError;
use crate::record::{strip_identity, Fields};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeedSet {
    collections: BTreeMap<String, Vec<Fields>>,
}

impl SeedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append records to a collection.
    pub fn with_records(mut self, collection: impl Into<String>, records: Vec<Fields>) -> Self {
        let target = self.collections.entry(collection.into()).or_default();
        for mut fields in records {
            strip_identity(&mut fields);
            target.push(fields);
        }
        self
    }

    /// Append validated typed documents to their collection.
    pub fn with_documents<D: Document>(mut self, documents: &[D]) -> Result<Self, DbError> {
        let mut records = Vec::with_capacity(documents.len());
        for document in documents {
            records.push(document.to_fields()?);
        }
        self = self.with_records(D::COLLECTION, records);
        Ok(self)
    }

    /// Parse a JSON seed set.
    pub fn from_json_str(json: &str) -> Result<Self, DbError> {
        let seed: SeedSet = serde_json::from_str(json)
            .map_err(|e| DbError::Seed(format!("invalid seed JSON: {}", e)))?;
        seed.validated()
    }

    /// Load a JSON seed set from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DbError::Seed(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_json_str(&content)
    }

    fn validated(mut self) -> Result<Self, DbError> {
        if self.collections.keys().any(|name| name.is_empty()) {
            warn!("seed set rejected: empty collection name");
            return Err(DbError::Seed("collection name must not be empty".into()));
        }
        for records in self.collections.values_mut() {
            records.iter_mut().for_each(strip_identity);
        }
        Ok(self)
    }

    /// Collections in name order, each with its records in seed order.
    pub fn collections(&self) -> impl Iterator<Item = (&str, &[Fields])> {
        self.collections
            .iter()
            .map(|(name, records)| (name.as_str(), records.as_slice()))
    }

    pub fn records(&self, collection: &str) -> &[Fields] {
        self.collections
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of records across collections.
    pub fn len(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The portal's demo data set.
    pub fn procurement() -> Self {
        Self::new()
            .with_records(
                "employees",
                objects(vec![
                    json!({
                        "name": "Amina Yusuf",
                        "email": "amina.yusuf@procure.example",
                        "department": "Procurement",
                        "position": "Head of Procurement",
                        "role": "admin"
                    }),
                    json!({
                        "name": "Daniel Mensah",
                        "email": "daniel.mensah@procure.example",
                        "department": "Procurement",
                        "position": "Procurement Officer",
                        "role": "procurement_officer"
                    }),
                    json!({
                        "name": "Sara Tesfaye",
                        "email": "sara.tesfaye@procure.example",
                        "department": "Finance",
                        "position": "Budget Analyst",
                        "role": "committee_member"
                    }),
                    json!({
                        "name": "Omar Haddad",
                        "email": "omar.haddad@procure.example",
                        "department": "ICT",
                        "position": "Systems Engineer",
                        "role": "committee_member"
                    }),
                ]),
            )
            .with_records(
                "procurement_plans",
                objects(vec![
                    json!({
                        "title": "ICT equipment renewal",
                        "fiscal_year": 2026,
                        "department": "ICT",
                        "estimated_budget": 185000.0,
                        "status": "approved"
                    }),
                    json!({
                        "title": "Office furniture",
                        "fiscal_year": 2026,
                        "department": "Administration",
                        "estimated_budget": 42000.0,
                        "status": "submitted"
                    }),
                    json!({
                        "title": "Fleet maintenance services",
                        "fiscal_year": 2027,
                        "department": "Logistics",
                        "estimated_budget": 96000.0,
                        "status": "draft"
                    }),
                ]),
            )
            .with_records(
                "tenders",
                objects(vec![
                    json!({
                        "reference": "TND-2026-001",
                        "title": "Supply of laptops and docking stations",
                        "plan_id": 1,
                        "procurement_method": "open",
                        "status": "published",
                        "closing_date": "2026-11-30",
                        "estimated_value": 120000.0
                    }),
                    json!({
                        "reference": "TND-2026-002",
                        "title": "Network switches",
                        "plan_id": 1,
                        "procurement_method": "restricted",
                        "status": "draft",
                        "closing_date": "2026-12-15",
                        "estimated_value": 65000.0
                    }),
                    json!({
                        "reference": "TND-2026-003",
                        "title": "Ergonomic office chairs",
                        "plan_id": 2,
                        "procurement_method": "open",
                        "status": "closed",
                        "closing_date": "2026-09-30",
                        "estimated_value": 18000.0
                    }),
                ]),
            )
            .with_records(
                "specifications",
                objects(vec![
                    json!({
                        "tender_id": 1,
                        "title": "Laptop technical specification",
                        "description": "Business laptops with three-year warranty",
                        "items": [
                            { "name": "14-inch laptop, 16 GB RAM", "quantity": 80, "unit": "piece" },
                            { "name": "USB-C docking station", "quantity": 80, "unit": "piece" }
                        ]
                    }),
                    json!({
                        "tender_id": 3,
                        "title": "Chair specification",
                        "description": "Adjustable chairs with lumbar support",
                        "items": [
                            { "name": "Task chair", "quantity": 120, "unit": "piece" }
                        ]
                    }),
                ]),
            )
            .with_records(
                "committees",
                objects(vec![
                    json!({
                        "name": "Laptop tender evaluation committee",
                        "committee_type": "evaluation",
                        "tender_id": 1,
                        "chair_id": 1,
                        "member_ids": [1, 3, 4]
                    }),
                    json!({
                        "name": "Bid opening committee",
                        "committee_type": "opening",
                        "chair_id": 2,
                        "member_ids": [2, 3]
                    }),
                ]),
            )
            .with_records(
                "discussions",
                objects(vec![
                    json!({
                        "agency": "Public Procurement Authority",
                        "subject": "Complaint on TND-2026-003 evaluation criteria",
                        "tender_id": 3,
                        "status": "under_review",
                        "comments": [
                            {
                                "author": "Public Procurement Authority",
                                "body": "Please provide the evaluation report.",
                                "posted_at": "2026-10-02T09:15:00Z"
                            },
                            {
                                "author": "Amina Yusuf",
                                "body": "Report attached to the tender file.",
                                "posted_at": "2026-10-03T14:40:00Z"
                            }
                        ]
                    }),
                    json!({
                        "agency": "Office of the Auditor General",
                        "subject": "Query on fleet maintenance plan",
                        "status": "open",
                        "comments": []
                    }),
                ]),
            )
    }
}

fn objects(values: Vec<Value>) -> Vec<Fields> {
    values
        .into_iter()
        .filter_map(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}
