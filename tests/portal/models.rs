//! Portal-side document types declared outside the crate.

use procure_mockdb::Document;
use serde::{Deserialize, Serialize};

/// A supplier registered for tender invitations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Document)]
#[document(collection = "suppliers", validate = "Supplier::check")]
pub struct Supplier {
    pub name: String,
    pub tax_id: String,
    #[serde(default)]
    pub blacklisted: bool,
}

impl Supplier {
    pub fn new(name: &str, tax_id: &str) -> Self {
        Self {
            name: name.to_string(),
            tax_id: tax_id.to_string(),
            blacklisted: false,
        }
    }

    fn check(&self) -> Result<(), String> {
        if self.tax_id.len() != 9 || !self.tax_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("tax id {:?} must be nine digits", self.tax_id));
        }
        Ok(())
    }
}

/// Uses the default collection name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Document)]
pub struct BidOpening {
    pub tender_id: u64,
    pub opened_at: String,
}
