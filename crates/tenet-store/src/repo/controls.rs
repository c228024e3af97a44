//! Control operations
//!
//! Controls are flat records. Deleting one consults the audit/test probe:
//! a referenced control is tombstoned so historical audits keep resolving,
//! an unreferenced one is removed outright. Both paths drop the control's
//! framework mappings.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use crate::governance::Governance;
use crate::repo::hydration::{classification_raw, control_from_row, CONTROL_COLUMNS};
use rusqlite::{Connection, OptionalExtension};
use tenet_core::collab::AuditCategory;
use tenet_core::errors::GovernanceError;
use tenet_core::model::{Actor, ControlDeletion, ControlRecord, FrameworkControl};
use tracing::info;

impl Governance {
    /// Create a control from a validated record
    pub fn add_control(&mut self, actor: &Actor, record: &ControlRecord) -> Result<i64> {
        record.validate()?;

        self.conn
            .execute(
                "INSERT INTO framework_controls (
                    short_name, long_name, description, supplemental_guidance, control_number,
                    control_owner, control_class, control_phase, control_priority, family,
                    control_maturity, desired_maturity, mitigation_percent, deleted
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, 0)",
                rusqlite::params![
                    record.short_name,
                    record.long_name,
                    record.description,
                    record.supplemental_guidance,
                    record.control_number,
                    classification_raw(record.control_owner),
                    classification_raw(record.control_class),
                    classification_raw(record.control_phase),
                    classification_raw(record.control_priority),
                    classification_raw(record.family),
                    record.control_maturity,
                    record.desired_maturity,
                    record.mitigation_percent,
                ],
            )
            .map_err(from_rusqlite)?;

        let control_id = self.conn.last_insert_rowid();

        info!(control_id, "control created");
        self.collab.audit.record(
            control_id,
            actor.id,
            &format!(
                "A new control named \"{}\" was created by user \"{}\".",
                record.short_name, actor.username
            ),
            AuditCategory::Control,
        );

        Ok(control_id)
    }

    /// Replace every field of a control from a validated record
    ///
    /// The tombstone flag is not touched here.
    pub fn update_control(
        &mut self,
        actor: &Actor,
        control_id: i64,
        record: &ControlRecord,
    ) -> Result<()> {
        record.validate()?;

        if fetch_stored(&self.conn, control_id)?.is_none() {
            return Err(GovernanceError::ControlNotFound { control_id });
        }

        self.conn
            .execute(
                "UPDATE framework_controls SET
                    short_name = ?1, long_name = ?2, description = ?3,
                    supplemental_guidance = ?4, control_number = ?5,
                    control_owner = ?6, control_class = ?7, control_phase = ?8,
                    control_priority = ?9, family = ?10,
                    control_maturity = ?11, desired_maturity = ?12, mitigation_percent = ?13
                 WHERE id = ?14",
                rusqlite::params![
                    record.short_name,
                    record.long_name,
                    record.description,
                    record.supplemental_guidance,
                    record.control_number,
                    classification_raw(record.control_owner),
                    classification_raw(record.control_class),
                    classification_raw(record.control_phase),
                    classification_raw(record.control_priority),
                    classification_raw(record.family),
                    record.control_maturity,
                    record.desired_maturity,
                    record.mitigation_percent,
                    control_id,
                ],
            )
            .map_err(from_rusqlite)?;

        info!(control_id, "control updated");
        self.collab.audit.record(
            control_id,
            actor.id,
            &format!(
                "The control named \"{}\" was updated by user \"{}\".",
                record.short_name, actor.username
            ),
            AuditCategory::Control,
        );

        Ok(())
    }

    /// Delete a control, soft or hard depending on the test probe
    ///
    /// Mappings are dropped either way, inside the same transaction.
    pub fn delete_control(&mut self, actor: &Actor, control_id: i64) -> Result<ControlDeletion> {
        let existing = fetch_stored(&self.conn, control_id)?
            .ok_or(GovernanceError::ControlNotFound { control_id })?;

        let referenced = self.collab.control_tests.is_referenced(control_id);

        let tx = self.conn.transaction().map_err(from_rusqlite)?;

        let outcome = if referenced {
            tx.execute(
                "UPDATE framework_controls SET deleted = 1 WHERE id = ?1",
                [control_id],
            )
            .map_err(from_rusqlite)?;
            ControlDeletion::SoftDeleted
        } else {
            tx.execute("DELETE FROM framework_controls WHERE id = ?1", [control_id])
                .map_err(from_rusqlite)?;
            ControlDeletion::HardDeleted
        };

        tx.execute(
            "DELETE FROM framework_control_mappings WHERE control_id = ?1",
            [control_id],
        )
        .map_err(from_rusqlite)?;

        tx.commit().map_err(from_rusqlite)?;

        info!(control_id, ?outcome, "control deleted");
        self.collab.audit.record(
            control_id,
            actor.id,
            &format!(
                "The control named \"{}\" was deleted by user \"{}\".",
                existing.short_name, actor.username
            ),
            AuditCategory::Control,
        );

        Ok(outcome)
    }

    /// Fetch one control by id
    ///
    /// Tombstoned controls are returned too; callers check `is_deleted`.
    pub fn control(&self, control_id: i64) -> Result<FrameworkControl> {
        fetch_stored(&self.conn, control_id)?
            .ok_or(GovernanceError::ControlNotFound { control_id })
    }

    /// Fetch a batch of controls by id; missing ids are skipped
    ///
    /// Tombstoned controls are included so name resolution for historical
    /// references keeps working.
    pub fn controls_by_ids(&self, ids: &[i64]) -> Result<Vec<FrameworkControl>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT {CONTROL_COLUMNS} FROM framework_controls WHERE id IN ({placeholders}) ORDER BY id ASC"
        );
        let mut stmt = self.conn.prepare(&sql).map_err(from_rusqlite)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(ids.iter()), control_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }

    /// Non-deleted controls ordered by short name, for selection lists
    pub fn controls_dropdown(&self) -> Result<Vec<FrameworkControl>> {
        let sql = format!(
            "SELECT {CONTROL_COLUMNS} FROM framework_controls WHERE deleted = 0 ORDER BY short_name ASC, id ASC"
        );
        let mut stmt = self.conn.prepare(&sql).map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([], control_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }
}

/// Fetch one control row regardless of its tombstone flag
fn fetch_stored(conn: &Connection, control_id: i64) -> Result<Option<FrameworkControl>> {
    let sql = format!("SELECT {CONTROL_COLUMNS} FROM framework_controls WHERE id = ?1");
    conn.query_row(&sql, [control_id], control_from_row)
        .optional()
        .map_err(from_rusqlite)
}

/// Load every non-deleted control ordered by id
pub(crate) fn load_live_controls(conn: &Connection) -> Result<Vec<FrameworkControl>> {
    let sql = format!(
        "SELECT {CONTROL_COLUMNS} FROM framework_controls WHERE deleted = 0 ORDER BY id ASC"
    );
    let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
    let rows = stmt
        .query_map([], control_from_row)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(rows)
}
