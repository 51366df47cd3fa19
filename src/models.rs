//! Typed schemas for the procurement portal's collections.
//!
//! Cross-collection references (`plan_id`, `tender_id`, `member_ids`) hold
//! numeric record ids and are not checked against the referenced collection.

use serde::{Deserialize, Serialize};

use crate::Document;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
#[document(collection = "employees", validate = "Employee::check")]
pub struct Employee {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub role: EmployeeRole,
}

impl Employee {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            department: String::new(),
            position: String::new(),
            role: EmployeeRole::default(),
        }
    }

    fn check(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".into());
        }
        match self.email.split_once('@') {
            Some((user, domain)) if !user.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(format!("{:?} is not an email address", self.email)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeRole {
    Admin,
    ProcurementOfficer,
    CommitteeMember,
    #[default]
    Viewer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
#[document(collection = "committees", validate = "Committee::check")]
pub struct Committee {
    pub name: String,
    pub committee_type: CommitteeType,
    #[serde(default)]
    pub tender_id: Option<u64>,
    #[serde(default)]
    pub chair_id: Option<u64>,
    #[serde(default)]
    pub member_ids: Vec<u64>,
}

impl Committee {
    fn check(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".into());
        }
        if let Some(chair) = self.chair_id {
            if !self.member_ids.contains(&chair) {
                return Err(format!("chair {} is not a committee member", chair));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitteeType {
    Evaluation,
    Opening,
    Receiving,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
#[document(collection = "procurement_plans", validate = "ProcurementPlan::check")]
pub struct ProcurementPlan {
    pub title: String,
    pub fiscal_year: u16,
    #[serde(default)]
    pub department: String,
    pub estimated_budget: f64,
    #[serde(default)]
    pub status: PlanStatus,
}

impl ProcurementPlan {
    fn check(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".into());
        }
        if !self.estimated_budget.is_finite() || self.estimated_budget < 0.0 {
            return Err(format!("invalid budget {}", self.estimated_budget));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
#[document(collection = "tenders", validate = "Tender::check")]
pub struct Tender {
    pub reference: String,
    pub title: String,
    #[serde(default)]
    pub plan_id: Option<u64>,
    pub procurement_method: ProcurementMethod,
    #[serde(default)]
    pub status: TenderStatus,
    /// ISO-8601 date, e.g. `2026-11-30`.
    pub closing_date: String,
    pub estimated_value: f64,
}

impl Tender {
    fn check(&self) -> Result<(), String> {
        if self.reference.trim().is_empty() {
            return Err("reference must not be empty".into());
        }
        if self.title.trim().is_empty() {
            return Err("title must not be empty".into());
        }
        if !self.estimated_value.is_finite() || self.estimated_value < 0.0 {
            return Err(format!("invalid estimated value {}", self.estimated_value));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcurementMethod {
    Open,
    Restricted,
    Direct,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenderStatus {
    #[default]
    Draft,
    Published,
    Closed,
    Awarded,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
#[document(collection = "specifications", validate = "Specification::check")]
pub struct Specification {
    #[serde(default)]
    pub tender_id: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub items: Vec<SpecificationItem>,
}

impl Specification {
    fn check(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".into());
        }
        if let Some(item) = self.items.iter().find(|item| item.quantity == 0) {
            return Err(format!("item {:?} has zero quantity", item.name));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecificationItem {
    pub name: String,
    pub quantity: u32,
    pub unit: String,
}

/// Complaint thread raised by an external agency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
#[document(collection = "discussions", validate = "Discussion::check")]
pub struct Discussion {
    pub agency: String,
    pub subject: String,
    #[serde(default)]
    pub tender_id: Option<u64>,
    #[serde(default)]
    pub status: DiscussionStatus,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Discussion {
    fn check(&self) -> Result<(), String> {
        if self.agency.trim().is_empty() {
            return Err("agency must not be empty".into());
        }
        if self.subject.trim().is_empty() {
            return Err("subject must not be empty".into());
        }
        Ok(())
    }

    pub fn add_comment(
        &mut self,
        author: impl Into<String>,
        body: impl Into<String>,
        posted_at: impl Into<String>,
    ) {
        self.comments.push(Comment {
            author: author.into(),
            body: body.into(),
            posted_at: posted_at.into(),
        });
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscussionStatus {
    #[default]
    Open,
    UnderReview,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub body: String,
    /// RFC 3339 timestamp.
    pub posted_at: String,
}
