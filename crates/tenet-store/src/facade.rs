//! Query facade
//!
//! Read-side surfaces joining controls with their framework memberships:
//! the faceted control filter, gap analysis, facet value lists, and the
//! document/exception tree views. Rows are prefiltered in SQL where the
//! stored form allows it and evaluated against the typed query grammar in
//! process, since encoded display fields cannot be compared by the store.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use crate::governance::Governance;
use crate::repo::controls::load_live_controls;
use crate::repo::frameworks::load_all_stored;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tenet_core::model::{Framework, FrameworkControl, FrameworkStatus};
use tenet_core::queries::{
    sort_control_gaps, ControlFilter, ControlGap, ControlSummary, DocumentSummary,
    ExceptionBranch, ExceptionScope, FacetFilter, GapSort, MaturityFilter,
};
use tenet_core::tree::{ancestor_chain, build_forest, Forest};

impl Governance {
    /// Controls matching a faceted filter, hydrated with their memberships
    ///
    /// Facet matching sees every mapping regardless of framework status;
    /// display names cover only the active frameworks.
    pub fn controls_by_filter(&self, filter: &ControlFilter) -> Result<Vec<ControlSummary>> {
        let mut summaries = self.load_control_summaries()?;
        summaries.retain(|summary| filter.matches(summary));
        Ok(summaries)
    }

    /// Gap-analysis rows for one framework
    ///
    /// One row per non-deleted control mapped to the framework whose
    /// maturity pair passes the filter. An unknown framework yields no rows.
    pub fn control_gaps(
        &self,
        framework_id: i64,
        maturity: MaturityFilter,
        sort: Option<GapSort>,
    ) -> Result<Vec<ControlGap>> {
        let summaries = self.load_control_summaries()?;
        let mut rows: Vec<ControlGap> = summaries
            .into_iter()
            .filter(|summary| summary.framework_ids.contains(&framework_id))
            .filter(|summary| {
                maturity.matches(
                    summary.control.control_maturity,
                    summary.control.desired_maturity,
                )
            })
            .map(|summary| {
                let control = summary.control;
                ControlGap {
                    control_id: control.id,
                    control_number: control.control_number,
                    short_name: control.short_name,
                    control_class: control.control_class,
                    control_phase: control.control_phase,
                    family: control.family,
                    control_maturity: control.control_maturity,
                    desired_maturity: control.desired_maturity,
                    framework_names: summary.framework_names,
                }
            })
            .collect();

        if let Some(sort) = sort {
            sort_control_gaps(&mut rows, sort, self.collab.cipher.is_active());
        }

        Ok(rows)
    }

    /// Distinct control classes in use, restricted by a framework facet
    pub fn available_control_classes(&self, framework: &FacetFilter) -> Result<Vec<i64>> {
        self.facet_values(framework, |control| control.control_class)
    }

    /// Distinct control phases in use, restricted by a framework facet
    pub fn available_control_phases(&self, framework: &FacetFilter) -> Result<Vec<i64>> {
        self.facet_values(framework, |control| control.control_phase)
    }

    /// Distinct control owners in use, restricted by a framework facet
    pub fn available_control_owners(&self, framework: &FacetFilter) -> Result<Vec<i64>> {
        self.facet_values(framework, |control| control.control_owner)
    }

    /// Distinct control families in use, restricted by a framework facet
    pub fn available_control_families(&self, framework: &FacetFilter) -> Result<Vec<i64>> {
        self.facet_values(framework, |control| control.family)
    }

    /// Distinct control priorities in use, restricted by a framework facet
    pub fn available_control_priorities(&self, framework: &FacetFilter) -> Result<Vec<i64>> {
        self.facet_values(framework, |control| control.control_priority)
    }

    /// Active frameworks holding at least one mapped control, with ancestors
    ///
    /// Each qualifying framework pulls in its whole ancestor chain
    /// (topmost first) so a selection list can render the hierarchy; ids are
    /// deduplicated in first-seen order. With `alphabetical` set the result
    /// is name-sorted instead, unless the cipher is active, in which case
    /// encoded names cannot be ordered and the hierarchical order is kept.
    pub fn available_frameworks(&self, alphabetical: bool) -> Result<Vec<Framework>> {
        let summaries = self.load_control_summaries()?;
        let mapped: HashSet<i64> = summaries
            .iter()
            .flat_map(|summary| summary.framework_ids.iter().copied())
            .collect();

        let frameworks = load_all_stored(&self.conn)?;

        let mut seen = HashSet::new();
        let mut selected_ids = Vec::new();
        for framework in &frameworks {
            if framework.is_active() && mapped.contains(&framework.id) {
                for ancestor in ancestor_chain(&frameworks, framework.id) {
                    if seen.insert(ancestor.id) {
                        selected_ids.push(ancestor.id);
                    }
                }
            }
        }

        let by_id: HashMap<i64, Framework> =
            frameworks.into_iter().map(|fw| (fw.id, fw)).collect();
        let mut result: Vec<Framework> = selected_ids
            .into_iter()
            .filter_map(|id| by_id.get(&id).cloned())
            .map(|framework| self.decode_framework(framework))
            .collect();

        if alphabetical && !self.collab.cipher.is_active() {
            result.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        }

        Ok(result)
    }

    /// Documents as a forest, hydrated with referenced display names
    ///
    /// Name resolution covers tombstoned controls and frameworks of any
    /// status; a dangling reference simply contributes no name.
    pub fn documents_as_tree(
        &self,
        document_type: Option<&str>,
    ) -> Result<Forest<DocumentSummary>> {
        let documents = self.list_documents(document_type)?;

        let framework_ids: BTreeSet<i64> = documents
            .iter()
            .flat_map(|document| document.framework_ids.iter().copied())
            .collect();
        let control_ids: BTreeSet<i64> = documents
            .iter()
            .flat_map(|document| document.control_ids.iter().copied())
            .collect();

        let framework_names: HashMap<i64, String> = self
            .frameworks_by_ids(&framework_ids.into_iter().collect::<Vec<_>>())?
            .into_iter()
            .map(|framework| (framework.id, framework.name))
            .collect();
        let control_names: HashMap<i64, String> = self
            .controls_by_ids(&control_ids.into_iter().collect::<Vec<_>>())?
            .into_iter()
            .map(|control| (control.id, control.short_name))
            .collect();

        let summaries: Vec<DocumentSummary> = documents
            .into_iter()
            .map(|document| {
                let framework_names = document
                    .framework_ids
                    .iter()
                    .filter_map(|id| framework_names.get(id).cloned())
                    .collect();
                let control_names = document
                    .control_ids
                    .iter()
                    .filter_map(|id| control_names.get(id).cloned())
                    .collect();
                DocumentSummary {
                    document,
                    framework_names,
                    control_names,
                }
            })
            .collect();

        Ok(build_forest(
            summaries,
            0,
            |summary| summary.document.id,
            |summary| summary.document.parent,
        ))
    }

    /// Exceptions grouped under the policy document or control they target
    ///
    /// Branches are ordered by parent name then parent id; exceptions within
    /// a branch by name then id. A parent that no longer resolves keeps its
    /// branch with an empty name.
    pub fn exceptions_as_tree(&self, scope: ExceptionScope) -> Result<Vec<ExceptionBranch>> {
        let selected: Vec<_> = self
            .list_exceptions()?
            .into_iter()
            .filter(|exception| match scope {
                ExceptionScope::Policy => exception.approved && exception.is_policy_exception(),
                ExceptionScope::Control => exception.approved && exception.is_control_exception(),
                ExceptionScope::Unapproved => !exception.approved,
            })
            .collect();

        let document_names: HashMap<i64, String> = self
            .list_documents(None)?
            .into_iter()
            .map(|document| (document.id, document.document_name))
            .collect();
        let control_parent_ids: Vec<i64> = selected
            .iter()
            .filter(|exception| !exception.is_policy_exception())
            .map(|exception| exception.control_framework_id)
            .collect();
        let control_names: HashMap<i64, String> = self
            .controls_by_ids(&control_parent_ids)?
            .into_iter()
            .map(|control| (control.id, control.short_name))
            .collect();

        let mut branches: BTreeMap<(bool, i64), ExceptionBranch> = BTreeMap::new();
        for exception in selected {
            let (is_policy, parent_id) = if exception.is_policy_exception() {
                (true, exception.policy_document_id)
            } else {
                (false, exception.control_framework_id)
            };
            let parent_name = if is_policy {
                document_names.get(&parent_id).cloned().unwrap_or_default()
            } else {
                control_names.get(&parent_id).cloned().unwrap_or_default()
            };

            branches
                .entry((is_policy, parent_id))
                .or_insert_with(|| ExceptionBranch {
                    parent_id,
                    parent_name,
                    exceptions: Vec::new(),
                })
                .exceptions
                .push(exception);
        }

        let mut result: Vec<ExceptionBranch> = branches.into_values().collect();
        for branch in &mut result {
            branch
                .exceptions
                .sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        }
        result.sort_by(|a, b| {
            a.parent_name
                .cmp(&b.parent_name)
                .then(a.parent_id.cmp(&b.parent_id))
        });

        Ok(result)
    }

    /// Hydrate every non-deleted control with its framework memberships
    fn load_control_summaries(&self) -> Result<Vec<ControlSummary>> {
        let controls = load_live_controls(&self.conn)?;
        let mappings = self.mapping_index()?;
        let active_names = self.active_framework_names()?;

        Ok(controls
            .into_iter()
            .map(|control| {
                let framework_ids = mappings.get(&control.id).cloned().unwrap_or_default();
                let framework_names = framework_ids
                    .iter()
                    .filter_map(|id| active_names.get(id).cloned())
                    .collect();
                ControlSummary {
                    control,
                    framework_ids,
                    framework_names,
                }
            })
            .collect())
    }

    /// Mapped framework ids per control, ascending within each control
    fn mapping_index(&self) -> Result<HashMap<i64, Vec<i64>>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT control_id, framework FROM framework_control_mappings
                 ORDER BY control_id ASC, framework ASC",
            )
            .map_err(from_rusqlite)?;
        let rows: Vec<(i64, i64)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        let mut index: HashMap<i64, Vec<i64>> = HashMap::new();
        for (control_id, framework_id) in rows {
            index.entry(control_id).or_default().push(framework_id);
        }
        Ok(index)
    }

    /// Decoded names of the active frameworks, keyed by id
    fn active_framework_names(&self) -> Result<HashMap<i64, String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value, name FROM frameworks WHERE status = ?1")
            .map_err(from_rusqlite)?;
        let rows: Vec<(i64, String)> = stmt
            .query_map([FrameworkStatus::Active.as_i64()], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| (id, self.decode(&name)))
            .collect())
    }

    /// Restrict summaries by a framework facet, then collect one distinct
    /// classification attribute
    fn facet_values<F>(&self, framework: &FacetFilter, facet_of: F) -> Result<Vec<i64>>
    where
        F: Fn(&FrameworkControl) -> Option<i64>,
    {
        let summaries = self.load_control_summaries()?;
        let values: BTreeSet<i64> = summaries
            .iter()
            .filter(|summary| framework.matches_any(&summary.framework_ids))
            .filter_map(|summary| facet_of(&summary.control))
            .collect();
        Ok(values.into_iter().collect())
    }
}
