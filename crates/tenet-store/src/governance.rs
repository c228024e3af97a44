//! Governance handle
//!
//! Owns the SQLite connection and the collaborator seams consulted by the
//! repository methods: at-rest text encoding, audit logging, validation
//! alerts, and the audit/test reference probe.

#![allow(clippy::result_large_err)]

use crate::db;
use crate::errors::Result;
use crate::migrations::apply_migrations;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tenet_core::collab::{
    AlertSink, AuditLog, ControlTestProbe, NoControlTests, NullAlertSink, NullAuditLog, PlainText,
    TextCipher,
};

/// Pluggable collaborators consulted by governance operations
///
/// Defaults wire up the null implementations: identity text codec, discarded
/// audit records and alerts, and a probe that reports no test references.
pub struct Collaborators {
    pub cipher: Arc<dyn TextCipher>,
    pub audit: Arc<dyn AuditLog>,
    pub alerts: Arc<dyn AlertSink>,
    pub control_tests: Arc<dyn ControlTestProbe>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            cipher: Arc::new(PlainText),
            audit: Arc::new(NullAuditLog),
            alerts: Arc::new(NullAlertSink),
            control_tests: Arc::new(NoControlTests),
        }
    }
}

/// Handle over the governance tables of a SQLite database
///
/// All operations run against the owned connection; mutations wrap their
/// statements in a transaction so a failure rolls back every write.
pub struct Governance {
    pub(crate) conn: Connection,
    pub(crate) collab: Collaborators,
}

impl Governance {
    /// Open (or create) a governance database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = db::open(path)?;
        Self::with_collaborators(conn, Collaborators::default())
    }

    /// Open an in-memory governance database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = db::open_in_memory()?;
        Self::with_collaborators(conn, Collaborators::default())
    }

    /// Wrap a connection with explicit collaborators
    ///
    /// Configures the connection and applies pending migrations.
    pub fn with_collaborators(mut conn: Connection, collab: Collaborators) -> Result<Self> {
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self { conn, collab })
    }

    /// Borrow the underlying connection
    ///
    /// The document and exception tables are read-only from this layer;
    /// embedders seed them through the raw connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn encode(&self, plain: &str) -> String {
        self.collab.cipher.try_encode(plain)
    }

    pub(crate) fn decode(&self, stored: &str) -> String {
        self.collab.cipher.try_decode(stored)
    }
}
