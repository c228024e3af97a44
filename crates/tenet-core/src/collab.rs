//! Consumed capabilities
//!
//! The engine calls out through these seams instead of implementing the
//! concerns itself: at-rest text encoding, audit logging, user-facing
//! validation alerts, and the audit/test reference probe that decides
//! soft-vs-hard control deletion. Null implementations are provided for
//! embedders that wire nothing up.

use std::sync::Mutex;

/// Reversible at-rest encoding for `name`/`description` fields
///
/// The store encodes on every write and decodes on every read; name
/// uniqueness is compared on the encoded form so both sides see the same
/// canonical representation.
pub trait TextCipher: Send + Sync {
    fn try_encode(&self, plain: &str) -> String;
    fn try_decode(&self, stored: &str) -> String;

    /// Whether an at-rest transform is actually in effect. Query surfaces
    /// that cannot sort encoded values check this.
    fn is_active(&self) -> bool;
}

/// Identity codec used when no at-rest protection is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl TextCipher for PlainText {
    fn try_encode(&self, plain: &str) -> String {
        plain.to_owned()
    }

    fn try_decode(&self, stored: &str) -> String {
        stored.to_owned()
    }

    fn is_active(&self) -> bool {
        false
    }
}

/// Stream a governance audit record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditCategory {
    Framework,
    Control,
    Exception,
}

impl AuditCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditCategory::Framework => "framework",
            AuditCategory::Control => "control",
            AuditCategory::Exception => "exception",
        }
    }
}

/// Audit logging seam
///
/// Called once per create/update/delete/cascade with a human-readable
/// message naming the actor and the affected entity. `event_id` is the
/// affected entity's own id.
pub trait AuditLog: Send + Sync {
    fn record(&self, event_id: i64, actor_id: i64, message: &str, category: AuditCategory);
}

/// Discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAuditLog;

impl AuditLog for NullAuditLog {
    fn record(&self, _event_id: i64, _actor_id: i64, _message: &str, _category: AuditCategory) {}
}

/// One captured audit record.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    pub event_id: i64,
    pub actor_id: i64,
    pub message: String,
    pub category: AuditCategory,
}

/// In-memory audit log for tests and embedders without a real sink.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl AuditLog for MemoryAuditLog {
    fn record(&self, event_id: i64, actor_id: i64, message: &str, category: AuditCategory) {
        if let Ok(mut records) = self.records.lock() {
            records.push(AuditRecord {
                event_id,
                actor_id,
                message: message.to_owned(),
                category,
            });
        }
    }
}

/// Side channel for user-facing validation failures
///
/// Distinct from the operation's own error return: the presentation layer
/// shows these, the caller still gets the typed `Err`.
pub trait AlertSink: Send + Sync {
    fn validation_failure(&self, message: &str);
}

/// Swallows every alert.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAlertSink;

impl AlertSink for NullAlertSink {
    fn validation_failure(&self, _message: &str) {}
}

/// Probe for audit/test records referencing a control
///
/// A referenced control is tombstoned on delete rather than removed, so past
/// audit work keeps resolving.
pub trait ControlTestProbe: Send + Sync {
    fn is_referenced(&self, control_id: i64) -> bool;
}

/// Reports no references; every delete is a hard delete.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoControlTests;

impl ControlTestProbe for NoControlTests {
    fn is_referenced(&self, _control_id: i64) -> bool {
        false
    }
}
