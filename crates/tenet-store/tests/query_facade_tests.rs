// Integration tests for the faceted control filter, gap analysis, facet
// value lists, and the framework selection list

mod common;

use common::{actor, add_framework, setup_governance, setup_governance_with, ReversingCipher};
use std::sync::Arc;
use tenet_core::model::{ControlRecord, NewFramework};
use tenet_core::queries::{ControlFilter, FacetFilter, GapSort, GapSortField, MaturityFilter};
use tenet_store::{Collaborators, Governance};

struct Corpus {
    intl: i64,
    nist: i64,
    iso: i64,
    legacy: i64,
    ac1: i64,
    ac2: i64,
    un1: i64,
    lg1: i64,
}

/// Frameworks: Intl (active root, unmapped), NIST (active root),
/// ISO (active, child of Intl), Legacy (inactive root).
/// Controls: AC-1 on NIST+ISO, AC-2 on NIST, UN-1 unmapped, LG-1 on Legacy.
fn seed_corpus(gov: &mut Governance) -> Corpus {
    let intl = add_framework(gov, "Intl");
    let nist = add_framework(gov, "NIST");
    let iso = gov
        .add_framework(&actor(), &NewFramework::new("ISO", "").under(intl))
        .unwrap();
    let legacy = gov
        .add_framework(
            &actor(),
            &NewFramework::new("Legacy", "")
                .with_status(tenet_core::model::FrameworkStatus::Inactive),
        )
        .unwrap();

    let ac1 = gov
        .add_control(
            &actor(),
            &ControlRecord {
                control_class: Some(1),
                control_phase: Some(1),
                control_maturity: 1,
                desired_maturity: 3,
                ..ControlRecord::new("AC-1", "AC-1")
            },
        )
        .unwrap();
    let ac2 = gov
        .add_control(
            &actor(),
            &ControlRecord {
                control_class: Some(2),
                description: "Account management for staff".to_string(),
                control_maturity: 3,
                desired_maturity: 3,
                ..ControlRecord::new("AC-2", "AC-2")
            },
        )
        .unwrap();
    let un1 = gov
        .add_control(
            &actor(),
            &ControlRecord {
                control_maturity: 4,
                desired_maturity: 2,
                ..ControlRecord::new("UN-1", "UN-1")
            },
        )
        .unwrap();
    let lg1 = gov
        .add_control(
            &actor(),
            &ControlRecord {
                control_class: Some(1),
                control_maturity: 0,
                desired_maturity: 5,
                ..ControlRecord::new("LG-1", "LG-1")
            },
        )
        .unwrap();

    gov.map_control_to_framework(ac1, nist, None).unwrap();
    gov.map_control_to_framework(ac1, iso, None).unwrap();
    gov.map_control_to_framework(ac2, nist, None).unwrap();
    gov.map_control_to_framework(lg1, legacy, None).unwrap();

    Corpus {
        intl,
        nist,
        iso,
        legacy,
        ac1,
        ac2,
        un1,
        lg1,
    }
}

fn matched_ids(gov: &Governance, filter: &ControlFilter) -> Vec<i64> {
    gov.controls_by_filter(filter)
        .unwrap()
        .into_iter()
        .map(|summary| summary.control.id)
        .collect()
}

// ===== FACETED FILTER TESTS =====

#[test]
fn test_unrestricted_filter_returns_every_live_control() {
    let mut gov = setup_governance();
    let corpus = seed_corpus(&mut gov);

    let ids = matched_ids(&gov, &ControlFilter::default());
    assert_eq!(ids, vec![corpus.ac1, corpus.ac2, corpus.un1, corpus.lg1]);
}

#[test]
fn test_class_facet_matches_membership_and_unassigned() {
    let mut gov = setup_governance();
    let corpus = seed_corpus(&mut gov);

    let by_class = ControlFilter {
        class: FacetFilter::ids([1]),
        ..ControlFilter::default()
    };
    assert_eq!(matched_ids(&gov, &by_class), vec![corpus.ac1, corpus.lg1]);

    let unassigned = ControlFilter {
        class: FacetFilter::Unassigned,
        ..ControlFilter::default()
    };
    assert_eq!(matched_ids(&gov, &unassigned), vec![corpus.un1]);
}

#[test]
fn test_framework_facet_covers_unassigned_bucket() {
    let mut gov = setup_governance();
    let corpus = seed_corpus(&mut gov);

    let on_nist = ControlFilter {
        framework: FacetFilter::ids([corpus.nist]),
        ..ControlFilter::default()
    };
    assert_eq!(matched_ids(&gov, &on_nist), vec![corpus.ac1, corpus.ac2]);

    let unmapped = ControlFilter {
        framework: FacetFilter::Unassigned,
        ..ControlFilter::default()
    };
    assert_eq!(matched_ids(&gov, &unmapped), vec![corpus.un1]);
}

#[test]
fn test_framework_facet_sees_inactive_memberships() {
    let mut gov = setup_governance();
    let corpus = seed_corpus(&mut gov);

    // Matching still works against the inactive framework's id
    let on_legacy = ControlFilter {
        framework: FacetFilter::ids([corpus.legacy]),
        ..ControlFilter::default()
    };
    assert_eq!(matched_ids(&gov, &on_legacy), vec![corpus.lg1]);

    // But display names cover active frameworks only
    let summaries = gov.controls_by_filter(&on_legacy).unwrap();
    assert_eq!(summaries[0].framework_ids, vec![corpus.legacy]);
    assert!(summaries[0].framework_names.is_empty());
}

#[test]
fn test_summary_names_follow_framework_id_order() {
    let mut gov = setup_governance();
    let corpus = seed_corpus(&mut gov);

    let filter = ControlFilter {
        ids: FacetFilter::ids([corpus.ac1]),
        ..ControlFilter::default()
    };
    let summaries = gov.controls_by_filter(&filter).unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].framework_ids, vec![corpus.nist, corpus.iso]);
    assert_eq!(summaries[0].framework_names, vec!["NIST", "ISO"]);
}

#[test]
fn test_text_search_reaches_framework_names_and_description() {
    let mut gov = setup_governance();
    let corpus = seed_corpus(&mut gov);

    let by_framework_name = ControlFilter {
        text: Some("nist".to_string()),
        ..ControlFilter::default()
    };
    assert_eq!(
        matched_ids(&gov, &by_framework_name),
        vec![corpus.ac1, corpus.ac2]
    );

    let by_description = ControlFilter {
        text: Some("staff".to_string()),
        ..ControlFilter::default()
    };
    assert_eq!(matched_ids(&gov, &by_description), vec![corpus.ac2]);
}

#[test]
fn test_facets_combine_with_and() {
    let mut gov = setup_governance();
    let corpus = seed_corpus(&mut gov);

    let filter = ControlFilter {
        class: FacetFilter::ids([1]),
        framework: FacetFilter::ids([corpus.nist, corpus.iso]),
        ..ControlFilter::default()
    };
    // LG-1 shares the class but not the frameworks
    assert_eq!(matched_ids(&gov, &filter), vec![corpus.ac1]);
}

#[test]
fn test_soft_deleted_controls_leave_every_query_surface() {
    let mut gov = setup_governance_with(Collaborators {
        control_tests: Arc::new(common::AlwaysReferenced),
        ..Collaborators::default()
    });
    let corpus = seed_corpus(&mut gov);

    gov.delete_control(&actor(), corpus.ac1).unwrap();

    let ids = matched_ids(&gov, &ControlFilter::default());
    assert!(!ids.contains(&corpus.ac1), "tombstoned control filtered out");

    let gaps = gov
        .control_gaps(corpus.nist, MaturityFilter::All, None)
        .unwrap();
    assert!(gaps.iter().all(|row| row.control_id != corpus.ac1));
}

// ===== GAP ANALYSIS TESTS =====

#[test]
fn test_control_gaps_filters_by_maturity() {
    let mut gov = setup_governance();
    let corpus = seed_corpus(&mut gov);

    let below = gov
        .control_gaps(corpus.nist, MaturityFilter::Below, None)
        .unwrap();
    assert_eq!(below.len(), 1);
    assert_eq!(below[0].control_id, corpus.ac1);

    let at = gov
        .control_gaps(corpus.nist, MaturityFilter::At, None)
        .unwrap();
    assert_eq!(at.len(), 1);
    assert_eq!(at[0].control_id, corpus.ac2);

    let all = gov
        .control_gaps(corpus.nist, MaturityFilter::All, None)
        .unwrap();
    assert_eq!(all.len(), 2);

    // UN-1 is above target but mapped to nothing
    let above = gov
        .control_gaps(corpus.nist, MaturityFilter::Above, None)
        .unwrap();
    assert!(above.is_empty());
}

#[test]
fn test_control_gaps_for_unknown_framework_is_empty() {
    let mut gov = setup_governance();
    seed_corpus(&mut gov);

    let rows = gov.control_gaps(9999, MaturityFilter::All, None).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_control_gaps_sorting() {
    let mut gov = setup_governance();
    let corpus = seed_corpus(&mut gov);

    let rows = gov
        .control_gaps(
            corpus.nist,
            MaturityFilter::All,
            Some(GapSort::descending(GapSortField::CurrentMaturity)),
        )
        .unwrap();
    assert_eq!(rows[0].control_id, corpus.ac2);
    assert_eq!(rows[1].control_id, corpus.ac1);

    // Framework-name key: AC-2 maps to a strict prefix of AC-1's names
    let rows = gov
        .control_gaps(
            corpus.nist,
            MaturityFilter::All,
            Some(GapSort::ascending(GapSortField::AssociatedFrameworks)),
        )
        .unwrap();
    assert_eq!(rows[0].control_id, corpus.ac2);
}

#[test]
fn test_gap_framework_name_sort_skipped_under_cipher() {
    let mut gov = setup_governance_with(Collaborators {
        cipher: Arc::new(ReversingCipher),
        ..Collaborators::default()
    });
    let corpus = seed_corpus(&mut gov);

    let rows = gov
        .control_gaps(
            corpus.nist,
            MaturityFilter::All,
            Some(GapSort::ascending(GapSortField::AssociatedFrameworks)),
        )
        .unwrap();

    // Encoded names cannot be ordered; rows keep store order (by id)
    assert_eq!(rows[0].control_id, corpus.ac1);
    assert_eq!(rows[1].control_id, corpus.ac2);
}

// ===== FACET VALUE LISTS =====

#[test]
fn test_available_classification_values() {
    let mut gov = setup_governance();
    let corpus = seed_corpus(&mut gov);

    assert_eq!(
        gov.available_control_classes(&FacetFilter::Unrestricted)
            .unwrap(),
        vec![1, 2]
    );
    assert_eq!(
        gov.available_control_phases(&FacetFilter::Unrestricted)
            .unwrap(),
        vec![1]
    );
    assert!(gov
        .available_control_owners(&FacetFilter::Unrestricted)
        .unwrap()
        .is_empty());

    // Restricted to NIST: LG-1's class drops out
    assert_eq!(
        gov.available_control_classes(&FacetFilter::ids([corpus.nist]))
            .unwrap(),
        vec![1, 2]
    );
    assert_eq!(
        gov.available_control_classes(&FacetFilter::ids([corpus.legacy]))
            .unwrap(),
        vec![1]
    );

    // The unmapped bucket has only UN-1, which carries no class
    assert!(gov
        .available_control_classes(&FacetFilter::Unassigned)
        .unwrap()
        .is_empty());
}

// ===== FRAMEWORK SELECTION LIST =====

#[test]
fn test_available_frameworks_pull_in_ancestors() {
    let mut gov = setup_governance();
    let corpus = seed_corpus(&mut gov);

    let ids: Vec<i64> = gov
        .available_frameworks(false)
        .unwrap()
        .into_iter()
        .map(|fw| fw.id)
        .collect();

    // ISO qualifies and drags its unmapped parent in ahead of itself;
    // inactive Legacy never qualifies
    assert_eq!(ids, vec![corpus.intl, corpus.iso, corpus.nist]);
}

#[test]
fn test_available_frameworks_alphabetical() {
    let mut gov = setup_governance();
    seed_corpus(&mut gov);

    let names: Vec<String> = gov
        .available_frameworks(true)
        .unwrap()
        .into_iter()
        .map(|fw| fw.name)
        .collect();
    assert_eq!(names, vec!["ISO", "Intl", "NIST"]);
}

#[test]
fn test_available_frameworks_keep_hierarchy_order_under_cipher() {
    let mut gov = setup_governance_with(Collaborators {
        cipher: Arc::new(ReversingCipher),
        ..Collaborators::default()
    });
    let corpus = seed_corpus(&mut gov);

    let ids: Vec<i64> = gov
        .available_frameworks(true)
        .unwrap()
        .into_iter()
        .map(|fw| fw.id)
        .collect();
    assert_eq!(
        ids,
        vec![corpus.intl, corpus.iso, corpus.nist],
        "name sort unavailable while encoded"
    );
}
