//! Control-framework mapping operations
//!
//! One row per (control, framework) pair with a per-framework reference
//! name. The unique index on the pair backs the in-transaction probes here;
//! no operation can leave a duplicate pair behind.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use crate::governance::Governance;
use rusqlite::{Connection, OptionalExtension};
use tenet_core::model::{MappedFramework, MappingEntry};
use tracing::debug;

impl Governance {
    /// Replace every mapping of a control with the given entries
    ///
    /// Entries repeating a framework id collapse to the first occurrence.
    pub fn replace_mappings(&mut self, control_id: i64, entries: &[MappingEntry]) -> Result<()> {
        self.control(control_id)?;

        let tx = self.conn.transaction().map_err(from_rusqlite)?;

        tx.execute(
            "DELETE FROM framework_control_mappings WHERE control_id = ?1",
            [control_id],
        )
        .map_err(from_rusqlite)?;

        for entry in entries {
            if pair_exists(&tx, control_id, entry.framework_id)? {
                continue;
            }
            tx.execute(
                "INSERT INTO framework_control_mappings (control_id, framework, reference_name) VALUES (?1, ?2, ?3)",
                rusqlite::params![control_id, entry.framework_id, entry.reference_name],
            )
            .map_err(from_rusqlite)?;
        }

        tx.commit().map_err(from_rusqlite)?;

        debug!(control_id, count = entries.len(), "control mappings replaced");
        Ok(())
    }

    /// Replace every mapping of a control with bare framework ids
    ///
    /// Each new row takes the control's own control number as its reference
    /// name. Zero ids are skipped.
    pub fn replace_mappings_by_framework_ids(
        &mut self,
        control_id: i64,
        framework_ids: &[i64],
    ) -> Result<()> {
        let control = self.control(control_id)?;

        let tx = self.conn.transaction().map_err(from_rusqlite)?;

        tx.execute(
            "DELETE FROM framework_control_mappings WHERE control_id = ?1",
            [control_id],
        )
        .map_err(from_rusqlite)?;

        for &framework_id in framework_ids {
            if framework_id == 0 || pair_exists(&tx, control_id, framework_id)? {
                continue;
            }
            tx.execute(
                "INSERT INTO framework_control_mappings (control_id, framework, reference_name) VALUES (?1, ?2, ?3)",
                rusqlite::params![control_id, framework_id, control.control_number],
            )
            .map_err(from_rusqlite)?;
        }

        tx.commit().map_err(from_rusqlite)?;

        debug!(
            control_id,
            count = framework_ids.len(),
            "control mappings replaced from framework ids"
        );
        Ok(())
    }

    /// Add one control-framework mapping
    ///
    /// The exact (control, framework, reference) row is re-inserted if the
    /// pair is absent; a pair mapped under a different reference name is left
    /// alone. With no reference given the control's number is used.
    /// Non-positive ids are ignored.
    pub fn map_control_to_framework(
        &mut self,
        control_id: i64,
        framework_id: i64,
        reference_name: Option<&str>,
    ) -> Result<()> {
        if control_id <= 0 || framework_id <= 0 {
            return Ok(());
        }

        let control = self.control(control_id)?;
        let reference = match reference_name {
            Some(name) => name.to_string(),
            None => control.control_number,
        };

        let tx = self.conn.transaction().map_err(from_rusqlite)?;

        tx.execute(
            "DELETE FROM framework_control_mappings WHERE control_id = ?1 AND framework = ?2 AND reference_name = ?3",
            rusqlite::params![control_id, framework_id, reference],
        )
        .map_err(from_rusqlite)?;

        if !pair_exists(&tx, control_id, framework_id)? {
            tx.execute(
                "INSERT INTO framework_control_mappings (control_id, framework, reference_name) VALUES (?1, ?2, ?3)",
                rusqlite::params![control_id, framework_id, reference],
            )
            .map_err(from_rusqlite)?;
        }

        tx.commit().map_err(from_rusqlite)?;

        debug!(control_id, framework_id, "control mapped to framework");
        Ok(())
    }

    /// Drop every mapping onto a framework
    pub fn unmap_framework(&mut self, framework_id: i64) -> Result<()> {
        self.conn
            .execute(
                "DELETE FROM framework_control_mappings WHERE framework = ?1",
                [framework_id],
            )
            .map_err(from_rusqlite)?;

        debug!(framework_id, "framework removed from all control mappings");
        Ok(())
    }

    /// Check whether a (control, framework) pair is mapped
    pub fn mapping_exists(&self, control_id: i64, framework_id: i64) -> Result<bool> {
        pair_exists(&self.conn, control_id, framework_id)
    }

    /// Mappings of a control joined with decoded framework display fields
    pub fn mappings_for_control(&self, control_id: i64) -> Result<Vec<MappedFramework>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT m.control_id, m.framework, m.reference_name, f.name, f.description
                 FROM framework_control_mappings m
                 JOIN frameworks f ON f.value = m.framework
                 WHERE m.control_id = ?1
                 ORDER BY m.framework ASC",
            )
            .map_err(from_rusqlite)?;

        let rows = stmt
            .query_map([control_id], |row| {
                Ok(MappedFramework {
                    control_id: row.get(0)?,
                    framework_id: row.get(1)?,
                    reference_name: row.get(2)?,
                    framework_name: row.get(3)?,
                    framework_description: row.get(4)?,
                })
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        Ok(rows
            .into_iter()
            .map(|mut mapped| {
                mapped.framework_name = self.decode(&mapped.framework_name);
                mapped.framework_description = self.decode(&mapped.framework_description);
                mapped
            })
            .collect())
    }
}

/// Probe for an existing (control, framework) pair
fn pair_exists(conn: &Connection, control_id: i64, framework_id: i64) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM framework_control_mappings WHERE control_id = ?1 AND framework = ?2",
            rusqlite::params![control_id, framework_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;
    Ok(found.is_some())
}
