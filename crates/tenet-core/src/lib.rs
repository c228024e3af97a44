//! Tenet Core - governance framework & control-mapping domain kernel
//!
//! This crate provides the storage-agnostic half of the governance engine:
//! - Framework, control, mapping, document and exception models
//! - The pure tree engine: forest materialization with counts, ancestor
//!   walks, cycle detection, and activate/deactivate cascade planning
//! - The typed control-filter and gap-analysis query grammar
//! - Collaborator seams for at-rest text encoding, audit logging, alerting,
//!   and the audit/test reference probe
//!
//! Persistence lives in `tenet-store`; everything here operates on plain
//! values and returns plans for a store to execute.

pub mod collab;
pub mod errors;
pub mod logging;
pub mod model;
pub mod queries;
pub mod tree;

// Re-export commonly used types
pub use collab::{
    AlertSink, AuditCategory, AuditLog, ControlTestProbe, MemoryAuditLog, NoControlTests,
    NullAlertSink, NullAuditLog, PlainText, TextCipher,
};
pub use errors::{ErrorKind, GovernanceError, Result};
pub use model::{
    Actor, ControlDeletion, ControlRecord, Document, DocumentException, Framework,
    FrameworkControl, FrameworkPatch, FrameworkStatus, NewFramework,
};
pub use queries::{ControlFilter, ControlGap, ControlSummary, FacetFilter, MaturityFilter};
pub use tree::{CascadePlan, Forest, FrameworkNode, FrameworkTree, TreeNode};
