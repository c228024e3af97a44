//! Typed query grammar and pure evaluation helpers
//!
//! The store prefilters rows with SQL; the shapes here express the faceted
//! control filter, the maturity gap filter, and the sort policies, and
//! evaluate them deterministically in process (encoded display fields rule
//! out pushing everything down into the data store).

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{Document, DocumentException, FrameworkControl};

/// One facet of the control filter
///
/// `Unassigned` matches rows with no value for the facet; an id set matches
/// membership. No sentinel values exist at this layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacetFilter {
    Unrestricted,
    Unassigned,
    SpecificIds(BTreeSet<i64>),
}

impl FacetFilter {
    /// Convenience constructor for an explicit id set.
    pub fn ids<I: IntoIterator<Item = i64>>(ids: I) -> Self {
        FacetFilter::SpecificIds(ids.into_iter().collect())
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, FacetFilter::Unrestricted)
    }

    /// Match a single-valued facet (classification attribute, own id).
    pub fn matches(&self, value: Option<i64>) -> bool {
        match self {
            FacetFilter::Unrestricted => true,
            FacetFilter::Unassigned => value.is_none(),
            FacetFilter::SpecificIds(ids) => value.is_some_and(|v| ids.contains(&v)),
        }
    }

    /// Match a multi-valued facet (the control's mapped framework ids):
    /// `Unassigned` means no values at all, an id set matches on overlap.
    pub fn matches_any(&self, values: &[i64]) -> bool {
        match self {
            FacetFilter::Unrestricted => true,
            FacetFilter::Unassigned => values.is_empty(),
            FacetFilter::SpecificIds(ids) => values.iter().any(|v| ids.contains(v)),
        }
    }
}

impl Default for FacetFilter {
    fn default() -> Self {
        FacetFilter::Unrestricted
    }
}

/// A control row hydrated with its framework memberships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSummary {
    pub control: FrameworkControl,

    /// Every framework the control is mapped to, any status
    pub framework_ids: Vec<i64>,

    /// Decoded names of the ACTIVE frameworks among those, for display
    pub framework_names: Vec<String>,
}

/// Faceted filter over controls (§ facet grammar), AND-combined across
/// facets, with an optional case-insensitive free-text needle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlFilter {
    pub class: FacetFilter,
    pub phase: FacetFilter,
    pub owner: FacetFilter,
    pub family: FacetFilter,
    pub priority: FacetFilter,

    /// Matched against the control's mapped framework ids
    pub framework: FacetFilter,

    /// Matched against the control's own id
    pub ids: FacetFilter,

    pub text: Option<String>,
}

impl ControlFilter {
    pub fn matches(&self, summary: &ControlSummary) -> bool {
        let control = &summary.control;
        self.class.matches(control.control_class)
            && self.phase.matches(control.control_phase)
            && self.owner.matches(control.control_owner)
            && self.family.matches(control.family)
            && self.priority.matches(control.control_priority)
            && self.framework.matches_any(&summary.framework_ids)
            && self.ids.matches(Some(control.id))
            && self
                .text
                .as_deref()
                .map_or(true, |needle| summary_matches_text(summary, needle))
    }
}

/// Case-insensitive free-text match across the control's text fields and its
/// mapped framework names.
pub fn summary_matches_text(summary: &ControlSummary, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let control = &summary.control;
    let fields = [
        &control.short_name,
        &control.long_name,
        &control.description,
        &control.supplemental_guidance,
        &control.control_number,
    ];
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
        || summary
            .framework_names
            .iter()
            .any(|name| name.to_lowercase().contains(&needle))
}

/// Gap-analysis maturity comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaturityFilter {
    All,
    /// current < desired
    Below,
    /// current == desired
    At,
    /// current > desired
    Above,
}

impl MaturityFilter {
    pub fn matches(&self, current: i64, desired: i64) -> bool {
        match self {
            MaturityFilter::All => true,
            MaturityFilter::Below => current < desired,
            MaturityFilter::At => current == desired,
            MaturityFilter::Above => current > desired,
        }
    }
}

/// Sort key for gap-analysis rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GapSortField {
    ControlNumber,
    /// Honored only while the text cipher is inactive; encoded names cannot
    /// be ordered meaningfully, so rows keep their input order instead.
    AssociatedFrameworks,
    ControlFamily,
    ControlPhase,
    CurrentMaturity,
    DesiredMaturity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapSort {
    pub field: GapSortField,
    pub direction: SortDirection,
}

impl GapSort {
    pub fn ascending(field: GapSortField) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: GapSortField) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }
}

/// One gap-analysis row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlGap {
    pub control_id: i64,
    pub control_number: String,
    pub short_name: String,
    pub control_class: Option<i64>,
    pub control_phase: Option<i64>,
    pub family: Option<i64>,
    pub control_maturity: i64,
    pub desired_maturity: i64,

    /// Decoded names of the frameworks the control is mapped to
    pub framework_names: Vec<String>,
}

/// Stable in-process sort of gap rows
///
/// The framework-name key is skipped while the cipher is active (documented
/// constraint: encoded values cannot be ordered by the store, and this layer
/// keeps the store's row order instead of guessing).
pub fn sort_control_gaps(rows: &mut [ControlGap], sort: GapSort, cipher_active: bool) {
    if sort.field == GapSortField::AssociatedFrameworks && cipher_active {
        return;
    }

    let cmp = |a: &ControlGap, b: &ControlGap| -> Ordering {
        match sort.field {
            GapSortField::ControlNumber => a.control_number.cmp(&b.control_number),
            GapSortField::AssociatedFrameworks => a.framework_names.cmp(&b.framework_names),
            GapSortField::ControlFamily => a.family.cmp(&b.family),
            GapSortField::ControlPhase => a.control_phase.cmp(&b.control_phase),
            GapSortField::CurrentMaturity => a.control_maturity.cmp(&b.control_maturity),
            GapSortField::DesiredMaturity => a.desired_maturity.cmp(&b.desired_maturity),
        }
    };

    match sort.direction {
        SortDirection::Ascending => rows.sort_by(cmp),
        SortDirection::Descending => rows.sort_by(|a, b| cmp(b, a)),
    }
}

/// Which slice of the exception table a tree view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExceptionScope {
    /// Approved exceptions raised against policy documents
    Policy,
    /// Approved exceptions raised against controls
    Control,
    /// Pending exceptions of both kinds
    Unapproved,
}

/// Exceptions grouped under the policy document or control they target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionBranch {
    pub parent_id: i64,
    pub parent_name: String,
    pub exceptions: Vec<DocumentException>,
}

impl ExceptionBranch {
    /// Display label carrying the per-branch count.
    pub fn label(&self) -> String {
        format!("{} ({})", self.parent_name, self.exceptions.len())
    }
}

/// A document hydrated with the display names of what it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub document: Document,
    pub framework_names: Vec<String>,
    pub control_names: Vec<String>,
}
