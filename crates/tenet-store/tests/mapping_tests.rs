// Integration tests for control-framework mapping operations

mod common;

use common::{actor, add_framework, control_record, setup_governance, setup_governance_with, ReversingCipher};
use std::sync::Arc;
use tenet_core::errors::GovernanceError;
use tenet_core::model::MappingEntry;
use tenet_store::Collaborators;

// ===== REPLACE-ALL TESTS =====

#[test]
fn test_replace_mappings_swaps_the_whole_set() {
    let mut gov = setup_governance();
    let nist = add_framework(&mut gov, "NIST");
    let iso = add_framework(&mut gov, "ISO");
    let soc = add_framework(&mut gov, "SOC 2");
    let control = gov
        .add_control(&actor(), &control_record("AC-1", "AC-1"))
        .unwrap();

    gov.replace_mappings(
        control,
        &[
            MappingEntry::new(nist, "AC-1"),
            MappingEntry::new(iso, "A.9.1"),
        ],
    )
    .unwrap();
    assert!(gov.mapping_exists(control, nist).unwrap());
    assert!(gov.mapping_exists(control, iso).unwrap());

    // A second replace drops what it does not mention
    gov.replace_mappings(control, &[MappingEntry::new(soc, "CC6.1")])
        .unwrap();
    assert!(!gov.mapping_exists(control, nist).unwrap());
    assert!(!gov.mapping_exists(control, iso).unwrap());
    assert!(gov.mapping_exists(control, soc).unwrap());
}

#[test]
fn test_replace_mappings_collapses_duplicate_frameworks() {
    let mut gov = setup_governance();
    let nist = add_framework(&mut gov, "NIST");
    let control = gov
        .add_control(&actor(), &control_record("AC-1", "AC-1"))
        .unwrap();

    gov.replace_mappings(
        control,
        &[
            MappingEntry::new(nist, "first"),
            MappingEntry::new(nist, "second"),
        ],
    )
    .unwrap();

    let mapped = gov.mappings_for_control(control).unwrap();
    assert_eq!(mapped.len(), 1);
    assert_eq!(mapped[0].reference_name, "first", "first entry wins");
}

#[test]
fn test_replace_mappings_for_missing_control_fails() {
    let mut gov = setup_governance();
    let result = gov.replace_mappings(31, &[]);
    assert!(matches!(
        result,
        Err(GovernanceError::ControlNotFound { control_id: 31 })
    ));
}

#[test]
fn test_replace_mappings_by_framework_ids_uses_control_number() {
    let mut gov = setup_governance();
    let nist = add_framework(&mut gov, "NIST");
    let iso = add_framework(&mut gov, "ISO");
    let control = gov
        .add_control(&actor(), &control_record("Account Management", "AC-2"))
        .unwrap();

    gov.replace_mappings_by_framework_ids(control, &[nist, 0, iso])
        .unwrap();

    let mapped = gov.mappings_for_control(control).unwrap();
    assert_eq!(mapped.len(), 2, "zero id skipped");
    assert!(mapped
        .iter()
        .all(|mapping| mapping.reference_name == "AC-2"));
}

// ===== SINGLE MAPPING TESTS =====

#[test]
fn test_map_control_defaults_reference_to_control_number() {
    let mut gov = setup_governance();
    let nist = add_framework(&mut gov, "NIST");
    let control = gov
        .add_control(&actor(), &control_record("Account Management", "AC-2"))
        .unwrap();

    gov.map_control_to_framework(control, nist, None).unwrap();

    let mapped = gov.mappings_for_control(control).unwrap();
    assert_eq!(mapped[0].reference_name, "AC-2");
}

#[test]
fn test_map_control_keeps_existing_pair_with_other_reference() {
    let mut gov = setup_governance();
    let nist = add_framework(&mut gov, "NIST");
    let control = gov
        .add_control(&actor(), &control_record("AC-1", "AC-1"))
        .unwrap();

    gov.map_control_to_framework(control, nist, Some("original"))
        .unwrap();
    // Same pair under a different reference: the existing row wins
    gov.map_control_to_framework(control, nist, Some("other"))
        .unwrap();

    let mapped = gov.mappings_for_control(control).unwrap();
    assert_eq!(mapped.len(), 1);
    assert_eq!(mapped[0].reference_name, "original");

    // Re-adding the exact same triple stays a single row
    gov.map_control_to_framework(control, nist, Some("original"))
        .unwrap();
    assert_eq!(gov.mappings_for_control(control).unwrap().len(), 1);
}

#[test]
fn test_map_control_ignores_non_positive_ids() {
    let mut gov = setup_governance();
    let control = gov
        .add_control(&actor(), &control_record("AC-1", "AC-1"))
        .unwrap();

    gov.map_control_to_framework(control, 0, None).unwrap();
    gov.map_control_to_framework(0, 5, None).unwrap();
    gov.map_control_to_framework(-3, -8, None).unwrap();

    assert!(gov.mappings_for_control(control).unwrap().is_empty());
}

// ===== UNMAP AND JOIN TESTS =====

#[test]
fn test_unmap_framework_clears_every_control() {
    let mut gov = setup_governance();
    let nist = add_framework(&mut gov, "NIST");
    let first = gov
        .add_control(&actor(), &control_record("AC-1", "AC-1"))
        .unwrap();
    let second = gov
        .add_control(&actor(), &control_record("AC-2", "AC-2"))
        .unwrap();
    gov.map_control_to_framework(first, nist, None).unwrap();
    gov.map_control_to_framework(second, nist, None).unwrap();

    gov.unmap_framework(nist).unwrap();

    assert!(!gov.mapping_exists(first, nist).unwrap());
    assert!(!gov.mapping_exists(second, nist).unwrap());
}

#[test]
fn test_mappings_for_control_joins_framework_fields() {
    let mut gov = setup_governance();
    let nist = gov
        .add_framework(
            &actor(),
            &tenet_core::model::NewFramework::new("NIST CSF", "Cybersecurity"),
        )
        .unwrap();
    let control = gov
        .add_control(&actor(), &control_record("AC-1", "AC-1"))
        .unwrap();
    gov.map_control_to_framework(control, nist, Some("ID.AM-1"))
        .unwrap();

    let mapped = gov.mappings_for_control(control).unwrap();
    assert_eq!(mapped.len(), 1);
    assert_eq!(mapped[0].control_id, control);
    assert_eq!(mapped[0].framework_id, nist);
    assert_eq!(mapped[0].reference_name, "ID.AM-1");
    assert_eq!(mapped[0].framework_name, "NIST CSF");
    assert_eq!(mapped[0].framework_description, "Cybersecurity");
}

#[test]
fn test_mappings_for_control_decodes_framework_names() {
    let mut gov = setup_governance_with(Collaborators {
        cipher: Arc::new(ReversingCipher),
        ..Collaborators::default()
    });
    let nist = gov
        .add_framework(
            &actor(),
            &tenet_core::model::NewFramework::new("NIST", "Framework"),
        )
        .unwrap();
    let control = gov
        .add_control(&actor(), &control_record("AC-1", "AC-1"))
        .unwrap();
    gov.map_control_to_framework(control, nist, None).unwrap();

    let mapped = gov.mappings_for_control(control).unwrap();
    assert_eq!(mapped[0].framework_name, "NIST", "decoded for display");
}
