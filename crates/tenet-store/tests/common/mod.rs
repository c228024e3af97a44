// Shared helpers for governance integration tests

use std::sync::{Arc, Mutex};
use tenet_core::collab::{AlertSink, ControlTestProbe, TextCipher};
use tenet_core::model::{Actor, ControlRecord, FrameworkStatus, NewFramework};
use tenet_store::{Collaborators, Governance};

/// Open a fresh in-memory governance database
#[allow(dead_code)]
pub fn setup_governance() -> Governance {
    Governance::open_in_memory().expect("Failed to open in-memory database")
}

/// Open a fresh in-memory governance database with explicit collaborators
#[allow(dead_code)]
pub fn setup_governance_with(collab: Collaborators) -> Governance {
    let conn =
        rusqlite::Connection::open_in_memory().expect("Failed to create in-memory database");
    Governance::with_collaborators(conn, collab).expect("Failed to wrap connection")
}

/// Test actor used for mutations
#[allow(dead_code)]
pub fn actor() -> Actor {
    Actor::new(1, "admin")
}

/// Create an active root framework and return its id
#[allow(dead_code)]
pub fn add_framework(gov: &mut Governance, name: &str) -> i64 {
    gov.add_framework(&actor(), &NewFramework::new(name, ""))
        .expect("Failed to add framework")
}

/// Create an active framework under the given parent and return its id
#[allow(dead_code)]
pub fn add_child_framework(gov: &mut Governance, name: &str, parent: i64) -> i64 {
    gov.add_framework(&actor(), &NewFramework::new(name, "").under(parent))
        .expect("Failed to add child framework")
}

/// Create an inactive framework under the given parent and return its id
#[allow(dead_code)]
pub fn add_inactive_framework(gov: &mut Governance, name: &str, parent: i64) -> i64 {
    gov.add_framework(
        &actor(),
        &NewFramework::new(name, "")
            .under(parent)
            .with_status(FrameworkStatus::Inactive),
    )
    .expect("Failed to add inactive framework")
}

/// Minimal control record with a short name and control number
#[allow(dead_code)]
pub fn control_record(short_name: &str, control_number: &str) -> ControlRecord {
    ControlRecord::new(short_name, control_number)
}

/// Character-reversing cipher; visibly scrambles stored text
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, Default)]
pub struct ReversingCipher;

impl TextCipher for ReversingCipher {
    fn try_encode(&self, plain: &str) -> String {
        plain.chars().rev().collect()
    }

    fn try_decode(&self, stored: &str) -> String {
        stored.chars().rev().collect()
    }

    fn is_active(&self) -> bool {
        true
    }
}

/// Alert sink capturing validation messages for assertions
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct RecordingAlerts {
    messages: Mutex<Vec<String>>,
}

impl RecordingAlerts {
    #[allow(dead_code)]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[allow(dead_code)]
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl AlertSink for RecordingAlerts {
    fn validation_failure(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Probe reporting every control as referenced by audit tests
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReferenced;

impl ControlTestProbe for AlwaysReferenced {
    fn is_referenced(&self, _control_id: i64) -> bool {
        true
    }
}
