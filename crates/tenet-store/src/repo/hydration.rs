//! Row hydration for governance tables
//!
//! Converts database rows into core models. Display text comes back in its
//! stored (possibly encoded) form; the repository methods decode at the API
//! boundary.

use chrono::NaiveDate;
use rusqlite::Row;
use tenet_core::model::{
    parse_id_list, Document, DocumentException, Framework, FrameworkControl, FrameworkStatus,
};

/// Column list matching `framework_from_row`
pub(crate) const FRAMEWORK_COLUMNS: &str = "value, name, description, parent, status, \"order\"";

/// Column list matching `control_from_row`
pub(crate) const CONTROL_COLUMNS: &str = "id, short_name, long_name, description, supplemental_guidance, control_number, control_owner, control_class, control_phase, control_priority, family, control_maturity, desired_maturity, mitigation_percent, deleted";

/// Column list matching `document_from_row`
pub(crate) const DOCUMENT_COLUMNS: &str = "id, document_type, document_name, control_ids, framework_ids, parent, status, creation_date, last_review_date, review_frequency, next_review_date, approval_date, document_owner";

/// Column list matching `exception_from_row`
pub(crate) const EXCEPTION_COLUMNS: &str = "value, name, policy_document_id, control_framework_id, owner, additional_stakeholders, creation_date, review_frequency, next_review_date, approval_date, approver, approved, description, justification";

/// Map a stored classification id, where 0 means unassigned
pub(crate) fn classification(raw: i64) -> Option<i64> {
    if raw == 0 {
        None
    } else {
        Some(raw)
    }
}

/// Stored form of a classification id
pub(crate) fn classification_raw(value: Option<i64>) -> i64 {
    value.unwrap_or(0)
}

/// Parse a nullable ISO-8601 date column
pub(crate) fn date_from_column(raw: Option<String>) -> Option<NaiveDate> {
    raw.and_then(|text| NaiveDate::parse_from_str(&text, "%Y-%m-%d").ok())
}

pub(crate) fn framework_from_row(row: &Row<'_>) -> rusqlite::Result<Framework> {
    let raw_status: i64 = row.get(4)?;
    let status = FrameworkStatus::from_i64(raw_status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Integer,
            format!("framework status out of range: {raw_status}").into(),
        )
    })?;

    Ok(Framework {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        parent: row.get(3)?,
        status,
        order: row.get(5)?,
    })
}

pub(crate) fn control_from_row(row: &Row<'_>) -> rusqlite::Result<FrameworkControl> {
    let deleted: i64 = row.get(14)?;

    Ok(FrameworkControl {
        id: row.get(0)?,
        short_name: row.get(1)?,
        long_name: row.get(2)?,
        description: row.get(3)?,
        supplemental_guidance: row.get(4)?,
        control_number: row.get(5)?,
        control_owner: classification(row.get(6)?),
        control_class: classification(row.get(7)?),
        control_phase: classification(row.get(8)?),
        control_priority: classification(row.get(9)?),
        family: classification(row.get(10)?),
        control_maturity: row.get(11)?,
        desired_maturity: row.get(12)?,
        mitigation_percent: row.get(13)?,
        deleted: deleted != 0,
    })
}

pub(crate) fn document_from_row(row: &Row<'_>) -> rusqlite::Result<Document> {
    let control_ids: String = row.get(3)?;
    let framework_ids: String = row.get(4)?;

    Ok(Document {
        id: row.get(0)?,
        document_type: row.get(1)?,
        document_name: row.get(2)?,
        control_ids: parse_id_list(&control_ids),
        framework_ids: parse_id_list(&framework_ids),
        parent: row.get(5)?,
        status: row.get(6)?,
        creation_date: date_from_column(row.get(7)?),
        last_review_date: date_from_column(row.get(8)?),
        review_frequency: row.get(9)?,
        next_review_date: date_from_column(row.get(10)?),
        approval_date: date_from_column(row.get(11)?),
        document_owner: row.get(12)?,
    })
}

pub(crate) fn exception_from_row(row: &Row<'_>) -> rusqlite::Result<DocumentException> {
    let stakeholders: String = row.get(5)?;
    let approved: i64 = row.get(11)?;

    Ok(DocumentException {
        id: row.get(0)?,
        name: row.get(1)?,
        policy_document_id: row.get(2)?,
        control_framework_id: row.get(3)?,
        owner: row.get(4)?,
        additional_stakeholders: parse_id_list(&stakeholders),
        creation_date: date_from_column(row.get(6)?),
        review_frequency: row.get(7)?,
        next_review_date: date_from_column(row.get(8)?),
        approval_date: date_from_column(row.get(9)?),
        approver: row.get(10)?,
        approved: approved != 0,
        description: row.get(12)?,
        justification: row.get(13)?,
    })
}
