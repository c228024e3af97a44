//! Tenet Store - SQLite persistence for the governance engine
//!
//! Provides:
//! - SQLite schema with migrations framework
//! - The `Governance` handle over frameworks, controls, and their mappings
//! - Query facades joining controls, frameworks, documents, and exceptions
//! - Collaborator wiring for at-rest text encoding, audit logging, alerts,
//!   and the audit/test reference probe

pub mod db;
pub mod errors;
pub mod facade;
pub mod governance;
pub mod migrations;
pub mod repo;

// Re-export key types
pub use errors::Result;
pub use governance::{Collaborators, Governance};
