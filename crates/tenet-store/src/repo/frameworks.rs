//! Framework hierarchy operations
//!
//! Create/update/delete, ordering, and the activate/deactivate cascades.
//! Tree walks are planned by tenet-core over a snapshot of the table and
//! executed here inside the same transaction, so the rows a plan saw are the
//! rows it writes.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use crate::governance::Governance;
use crate::repo::hydration::{framework_from_row, FRAMEWORK_COLUMNS};
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashSet;
use tenet_core::collab::AuditCategory;
use tenet_core::errors::GovernanceError;
use tenet_core::model::{Actor, Framework, FrameworkPatch, FrameworkStatus, NewFramework};
use tenet_core::tree::{
    ancestor_chain, build_framework_tree, flat_forest, plan_activation, plan_deactivation,
    subtree_ids, would_create_cycle, FrameworkTree,
};
use tracing::{debug, info};

impl Governance {
    /// Create a framework, appending it after its siblings
    ///
    /// The display order is one past the highest order among siblings of the
    /// same parent and status. Fails with `DuplicateName` when another
    /// framework already stores the same encoded name.
    pub fn add_framework(&mut self, actor: &Actor, new: &NewFramework) -> Result<i64> {
        let encoded_name = self.encode(&new.name);
        let encoded_description = self.encode(&new.description);

        let tx = self.conn.transaction().map_err(from_rusqlite)?;

        if framework_id_by_name(&tx, &encoded_name, None)?.is_some() {
            self.collab
                .alerts
                .validation_failure("The framework name already exists.");
            return Err(GovernanceError::DuplicateName {
                name: new.name.clone(),
            });
        }

        let next_order: i64 = tx
            .query_row(
                "SELECT COALESCE(MAX(\"order\") + 1, 0) FROM frameworks WHERE parent = ?1 AND status = ?2",
                rusqlite::params![new.parent, new.status.as_i64()],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)?;

        tx.execute(
            "INSERT INTO frameworks (name, description, parent, status, \"order\") VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                encoded_name,
                encoded_description,
                new.parent,
                new.status.as_i64(),
                next_order
            ],
        )
        .map_err(from_rusqlite)?;

        let framework_id = tx.last_insert_rowid();
        tx.commit().map_err(from_rusqlite)?;

        info!(framework_id, parent = new.parent, "framework created");
        self.collab.audit.record(
            framework_id,
            actor.id,
            &format!(
                "A new framework named \"{}\" was created by user \"{}\".",
                new.name, actor.username
            ),
            AuditCategory::Framework,
        );

        Ok(framework_id)
    }

    /// Update a framework's name, and optionally description and parent
    ///
    /// A blank name and a duplicate name are rejected through the alert sink
    /// as well as the error return. A reparent that would make the framework
    /// its own ancestor fails with `CircularParent`; the walk and the write
    /// share one transaction.
    pub fn update_framework(
        &mut self,
        actor: &Actor,
        framework_id: i64,
        patch: &FrameworkPatch,
    ) -> Result<()> {
        if patch.name.trim().is_empty() {
            self.collab
                .alerts
                .validation_failure("The framework name cannot be blank.");
            return Err(GovernanceError::InvalidName {
                reason: "blank".to_string(),
            });
        }

        let encoded_name = self.encode(&patch.name);
        let encoded_description = patch.description.as_deref().map(|text| self.encode(text));

        let tx = self.conn.transaction().map_err(from_rusqlite)?;

        let existing = fetch_stored(&tx, framework_id)?
            .ok_or(GovernanceError::FrameworkNotFound { framework_id })?;

        if framework_id_by_name(&tx, &encoded_name, Some(framework_id))?.is_some() {
            self.collab
                .alerts
                .validation_failure("The framework name already exists.");
            return Err(GovernanceError::DuplicateName {
                name: patch.name.clone(),
            });
        }

        let new_parent = patch.parent.unwrap_or(existing.parent);
        if let Some(proposed) = patch.parent {
            if proposed != 0 {
                let frameworks = load_all_stored(&tx)?;
                if would_create_cycle(&frameworks, framework_id, proposed) {
                    self.collab
                        .alerts
                        .validation_failure("The framework cannot be moved under its own descendant.");
                    return Err(GovernanceError::CircularParent {
                        framework_id,
                        proposed_parent: proposed,
                    });
                }
            }
        }

        let new_description = encoded_description.unwrap_or(existing.description);

        tx.execute(
            "UPDATE frameworks SET name = ?1, description = ?2, parent = ?3 WHERE value = ?4",
            rusqlite::params![encoded_name, new_description, new_parent, framework_id],
        )
        .map_err(from_rusqlite)?;

        tx.commit().map_err(from_rusqlite)?;

        info!(framework_id, "framework updated");
        self.collab.audit.record(
            framework_id,
            actor.id,
            &format!(
                "The framework named \"{}\" was updated by user \"{}\".",
                patch.name, actor.username
            ),
            AuditCategory::Framework,
        );

        Ok(())
    }

    /// Delete a framework, splicing its children onto its own parent
    ///
    /// Every mapping onto the framework is dropped in the same transaction.
    /// Controls themselves are untouched.
    pub fn delete_framework(&mut self, actor: &Actor, framework_id: i64) -> Result<()> {
        let tx = self.conn.transaction().map_err(from_rusqlite)?;

        let existing = fetch_stored(&tx, framework_id)?
            .ok_or(GovernanceError::FrameworkNotFound { framework_id })?;

        tx.execute("DELETE FROM frameworks WHERE value = ?1", [framework_id])
            .map_err(from_rusqlite)?;
        tx.execute(
            "UPDATE frameworks SET parent = ?1 WHERE parent = ?2",
            rusqlite::params![existing.parent, framework_id],
        )
        .map_err(from_rusqlite)?;
        tx.execute(
            "DELETE FROM framework_control_mappings WHERE framework = ?1",
            [framework_id],
        )
        .map_err(from_rusqlite)?;

        tx.commit().map_err(from_rusqlite)?;

        let name = self.decode(&existing.name);
        info!(framework_id, "framework deleted");
        self.collab.audit.record(
            framework_id,
            actor.id,
            &format!(
                "The framework named \"{}\" was deleted by user \"{}\".",
                name, actor.username
            ),
            AuditCategory::Framework,
        );

        Ok(())
    }

    /// Set a framework's status, cascading per the activation rules
    ///
    /// Deactivation takes the whole subtree inactive. Activation also
    /// activates any chain of inactive ancestors; if the chain ends at a
    /// missing or cyclic parent, the topmost activated node is promoted to a
    /// root. Returns every framework id the cascade wrote.
    pub fn set_framework_status(
        &mut self,
        actor: &Actor,
        framework_id: i64,
        status: FrameworkStatus,
    ) -> Result<Vec<i64>> {
        let tx = self.conn.transaction().map_err(from_rusqlite)?;

        let frameworks = load_all_stored(&tx)?;
        let plan = match status {
            FrameworkStatus::Active => plan_activation(&frameworks, framework_id)?,
            FrameworkStatus::Inactive => plan_deactivation(&frameworks, framework_id)?,
        };

        for affected_id in &plan.affected {
            tx.execute(
                "UPDATE frameworks SET status = ?1 WHERE value = ?2",
                rusqlite::params![plan.new_status.as_i64(), affected_id],
            )
            .map_err(from_rusqlite)?;
        }
        if let Some(promoted) = plan.promote_to_root {
            tx.execute("UPDATE frameworks SET parent = 0 WHERE value = ?1", [promoted])
                .map_err(from_rusqlite)?;
        }

        tx.commit().map_err(from_rusqlite)?;

        let name = frameworks
            .iter()
            .find(|fw| fw.id == framework_id)
            .map(|fw| self.decode(&fw.name))
            .unwrap_or_default();
        let verb = match status {
            FrameworkStatus::Active => "activated",
            FrameworkStatus::Inactive => "deactivated",
        };
        info!(
            framework_id,
            affected = plan.affected.len(),
            "framework {verb}"
        );
        self.collab.audit.record(
            framework_id,
            actor.id,
            &format!(
                "The framework named \"{}\" was {} by user \"{}\".",
                name, verb, actor.username
            ),
            AuditCategory::Framework,
        );

        Ok(plan.affected)
    }

    /// Rewrite display order so each framework's order is its index
    ///
    /// Ids not present in the table are ignored.
    pub fn reorder_frameworks(&mut self, ordered_ids: &[i64]) -> Result<()> {
        let tx = self.conn.transaction().map_err(from_rusqlite)?;
        for (position, framework_id) in ordered_ids.iter().enumerate() {
            tx.execute(
                "UPDATE frameworks SET \"order\" = ?1 WHERE value = ?2",
                rusqlite::params![position as i64, framework_id],
            )
            .map_err(from_rusqlite)?;
        }
        tx.commit().map_err(from_rusqlite)?;

        debug!(count = ordered_ids.len(), "framework display order rewritten");
        Ok(())
    }

    /// Low-level parent rewrite used by drag-and-drop tree surfaces
    ///
    /// No cycle check and no audit record; callers wanting validation go
    /// through `update_framework`. A missing id is a no-op.
    pub fn set_framework_parent(&mut self, framework_id: i64, new_parent: i64) -> Result<()> {
        self.conn
            .execute(
                "UPDATE frameworks SET parent = ?1 WHERE value = ?2",
                rusqlite::params![new_parent, framework_id],
            )
            .map_err(from_rusqlite)?;
        Ok(())
    }

    /// Fetch one framework with decoded display fields
    pub fn framework(&self, framework_id: i64) -> Result<Framework> {
        let stored = fetch_stored(&self.conn, framework_id)?
            .ok_or(GovernanceError::FrameworkNotFound { framework_id })?;
        Ok(self.decode_framework(stored))
    }

    /// List frameworks, optionally restricted to one status
    ///
    /// Ordered by display order, then id.
    pub fn list_frameworks(&self, status: Option<FrameworkStatus>) -> Result<Vec<Framework>> {
        let stored = match status {
            Some(wanted) => {
                let sql = format!(
                    "SELECT {FRAMEWORK_COLUMNS} FROM frameworks WHERE status = ?1 ORDER BY \"order\" ASC, value ASC"
                );
                let mut stmt = self.conn.prepare(&sql).map_err(from_rusqlite)?;
                let rows = stmt
                    .query_map([wanted.as_i64()], framework_from_row)
                    .map_err(from_rusqlite)?
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(from_rusqlite)?;
                rows
            }
            None => load_all_stored(&self.conn)?,
        };

        Ok(stored
            .into_iter()
            .map(|framework| self.decode_framework(framework))
            .collect())
    }

    /// Direct children of a parent id, optionally restricted to one status
    pub fn children_of(
        &self,
        parent: i64,
        status: Option<FrameworkStatus>,
    ) -> Result<Vec<Framework>> {
        let stored = match status {
            Some(wanted) => {
                let sql = format!(
                    "SELECT {FRAMEWORK_COLUMNS} FROM frameworks WHERE parent = ?1 AND status = ?2 ORDER BY \"order\" ASC, value ASC"
                );
                let mut stmt = self.conn.prepare(&sql).map_err(from_rusqlite)?;
                let rows = stmt
                    .query_map(
                        rusqlite::params![parent, wanted.as_i64()],
                        framework_from_row,
                    )
                    .map_err(from_rusqlite)?
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(from_rusqlite)?;
                rows
            }
            None => {
                let sql = format!(
                    "SELECT {FRAMEWORK_COLUMNS} FROM frameworks WHERE parent = ?1 ORDER BY \"order\" ASC, value ASC"
                );
                let mut stmt = self.conn.prepare(&sql).map_err(from_rusqlite)?;
                let rows = stmt
                    .query_map([parent], framework_from_row)
                    .map_err(from_rusqlite)?
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(from_rusqlite)?;
                rows
            }
        };

        Ok(stored
            .into_iter()
            .map(|framework| self.decode_framework(framework))
            .collect())
    }

    /// Every framework strictly below the given one
    ///
    /// Results keep the display ordering of `list_frameworks`. The walk is
    /// visited-set bounded, so corrupt parent data cannot loop it.
    pub fn descendants_of(
        &self,
        framework_id: i64,
        status: Option<FrameworkStatus>,
    ) -> Result<Vec<Framework>> {
        let frameworks = load_all_stored(&self.conn)?;
        if !frameworks.iter().any(|fw| fw.id == framework_id) {
            return Err(GovernanceError::FrameworkNotFound { framework_id });
        }

        let members: HashSet<i64> = subtree_ids(&frameworks, framework_id)
            .into_iter()
            .filter(|id| *id != framework_id)
            .collect();

        Ok(frameworks
            .into_iter()
            .filter(|fw| members.contains(&fw.id))
            .filter(|fw| status.map_or(true, |wanted| fw.status == wanted))
            .map(|framework| self.decode_framework(framework))
            .collect())
    }

    /// Ancestor chain from the topmost ancestor down to the framework itself
    pub fn parent_chain(&self, framework_id: i64) -> Result<Vec<Framework>> {
        let frameworks = load_all_stored(&self.conn)?;
        if !frameworks.iter().any(|fw| fw.id == framework_id) {
            return Err(GovernanceError::FrameworkNotFound { framework_id });
        }

        Ok(ancestor_chain(&frameworks, framework_id)
            .into_iter()
            .cloned()
            .map(|framework| self.decode_framework(framework))
            .collect())
    }

    /// Fetch a batch of frameworks by id; missing ids are skipped
    pub fn frameworks_by_ids(&self, ids: &[i64]) -> Result<Vec<Framework>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT {FRAMEWORK_COLUMNS} FROM frameworks WHERE value IN ({placeholders}) ORDER BY \"order\" ASC, value ASC"
        );
        let mut stmt = self.conn.prepare(&sql).map_err(from_rusqlite)?;
        let stored = stmt
            .query_map(rusqlite::params_from_iter(ids.iter()), framework_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        Ok(stored
            .into_iter()
            .map(|framework| self.decode_framework(framework))
            .collect())
    }

    /// Count frameworks, optionally restricted to one status
    pub fn framework_count(&self, status: Option<FrameworkStatus>) -> Result<i64> {
        let count = match status {
            Some(wanted) => self.conn.query_row(
                "SELECT COUNT(*) FROM frameworks WHERE status = ?1",
                [wanted.as_i64()],
                |row| row.get(0),
            ),
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM frameworks", [], |row| row.get(0)),
        };
        count.map_err(from_rusqlite)
    }

    /// Materialize the framework forest for one status
    ///
    /// Active frameworks come back as a nested forest with a total count;
    /// inactive frameworks are presented flat, each row its own root.
    pub fn frameworks_as_tree(&self, status: FrameworkStatus) -> Result<FrameworkTree> {
        let frameworks = self.list_frameworks(Some(status))?;
        Ok(match status {
            FrameworkStatus::Active => build_framework_tree(frameworks, 0),
            FrameworkStatus::Inactive => flat_forest(frameworks),
        })
    }

    pub(crate) fn decode_framework(&self, mut framework: Framework) -> Framework {
        framework.name = self.decode(&framework.name);
        framework.description = self.decode(&framework.description);
        framework
    }
}

/// Fetch one framework in stored (encoded) form
fn fetch_stored(conn: &Connection, framework_id: i64) -> Result<Option<Framework>> {
    let sql = format!("SELECT {FRAMEWORK_COLUMNS} FROM frameworks WHERE value = ?1");
    conn.query_row(&sql, [framework_id], framework_from_row)
        .optional()
        .map_err(from_rusqlite)
}

/// Load every framework in stored form, ordered by display order then id
pub(crate) fn load_all_stored(conn: &Connection) -> Result<Vec<Framework>> {
    let sql =
        format!("SELECT {FRAMEWORK_COLUMNS} FROM frameworks ORDER BY \"order\" ASC, value ASC");
    let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
    let rows = stmt
        .query_map([], framework_from_row)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(rows)
}

/// Find a framework id by its stored name, optionally excluding one id
fn framework_id_by_name(
    conn: &Connection,
    encoded_name: &str,
    exclude: Option<i64>,
) -> Result<Option<i64>> {
    let result = match exclude {
        Some(excluded_id) => conn
            .query_row(
                "SELECT value FROM frameworks WHERE name = ?1 AND value != ?2",
                rusqlite::params![encoded_name, excluded_id],
                |row| row.get(0),
            )
            .optional(),
        None => conn
            .query_row(
                "SELECT value FROM frameworks WHERE name = ?1",
                rusqlite::params![encoded_name],
                |row| row.get(0),
            )
            .optional(),
    };
    result.map_err(from_rusqlite)
}
