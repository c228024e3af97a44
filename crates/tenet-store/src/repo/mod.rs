//! Repository layer for the governance tables
//!
//! Each submodule attaches one concern's operations to the `Governance`
//! handle: framework hierarchy, controls, control-framework mappings, and
//! the read-only document/exception registry.

pub(crate) mod hydration;

pub(crate) mod controls;
pub(crate) mod documents;
pub(crate) mod frameworks;
pub(crate) mod mappings;
