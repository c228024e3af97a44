use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Document - a policy/document record referencing frameworks and controls
///
/// Documents are read-only to this core: the governance engine joins them for
/// tree views but never writes the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub document_type: String,
    pub document_name: String,

    /// Controls this document covers (stored as a comma-separated id list)
    pub control_ids: Vec<i64>,

    /// Frameworks this document covers (stored as a comma-separated id list)
    pub framework_ids: Vec<i64>,

    /// Parent document id, 0 for top-level documents
    pub parent: i64,

    /// Workflow state of the document itself (draft/in-review/approved)
    pub status: i64,

    pub creation_date: Option<NaiveDate>,
    pub last_review_date: Option<NaiveDate>,

    /// Review cadence in days
    pub review_frequency: i64,

    pub next_review_date: Option<NaiveDate>,
    pub approval_date: Option<NaiveDate>,
    pub document_owner: i64,
}

/// DocumentException - an exception raised against a policy or a control
///
/// Exactly one of `policy_document_id` / `control_framework_id` is non-zero,
/// which decides the branch the exception hangs under in tree views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentException {
    pub id: i64,
    pub name: String,
    pub policy_document_id: i64,
    pub control_framework_id: i64,
    pub owner: i64,
    pub additional_stakeholders: Vec<i64>,
    pub creation_date: Option<NaiveDate>,

    /// Review cadence in days
    pub review_frequency: i64,

    pub next_review_date: Option<NaiveDate>,
    pub approval_date: Option<NaiveDate>,
    pub approver: i64,
    pub approved: bool,
    pub description: String,
    pub justification: String,
}

impl DocumentException {
    /// Check if this exception targets a policy document
    pub fn is_policy_exception(&self) -> bool {
        self.policy_document_id != 0
    }

    /// Check if this exception targets a control
    pub fn is_control_exception(&self) -> bool {
        self.control_framework_id != 0
    }
}

/// Parse a stored comma-separated id list, dropping blanks and zeros.
pub fn parse_id_list(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .filter(|id| *id != 0)
        .collect()
}
