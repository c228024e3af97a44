//! Comprehensive Demo of the Governance Engine
//!
//! This example demonstrates all key features:
//! - Building a framework hierarchy with ordered siblings
//! - Validation guardrails (blank names, duplicates, circular parents)
//! - Control records with classification and maturity attributes
//! - Control-framework mappings carrying reference codes
//! - Activation cascades (subtree down, ancestor chain up)
//! - Faceted control queries and maturity gap analysis
//! - Deletion safety for controls and frameworks

use tenet_core::model::{
    Actor, ControlDeletion, ControlRecord, FrameworkPatch, FrameworkStatus, MappingEntry,
    NewFramework,
};
use tenet_core::queries::{ControlFilter, FacetFilter, GapSort, GapSortField, MaturityFilter};
use tenet_core::tree::FrameworkNode;
use tenet_store::Governance;

fn print_tree(nodes: &[FrameworkNode], depth: usize) {
    for node in nodes {
        println!("  {}- {}", "  ".repeat(depth), node.item.name);
        print_tree(&node.children, depth + 1);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║  Tenet Governance Engine - Comprehensive Feature Demo    ║");
    println!("╚══════════════════════════════════════════════════════════╝\n");

    let mut gov = Governance::open_in_memory()?;
    let actor = Actor::new(1, "alice");

    // ═══════════════════════════════════════════════════════════
    // SECTION 1: Building the Framework Hierarchy
    // ═══════════════════════════════════════════════════════════
    println!("📦 SECTION 1: Building the Framework Hierarchy\n");

    let nist = gov.add_framework(
        &actor,
        &NewFramework::new("NIST CSF", "Cybersecurity framework core"),
    )?;
    let identify = gov.add_framework(
        &actor,
        &NewFramework::new("Identify", "Asset and risk discovery").under(nist),
    )?;
    let protect = gov.add_framework(
        &actor,
        &NewFramework::new("Protect", "Safeguard implementation").under(nist),
    )?;
    let iso = gov.add_framework(
        &actor,
        &NewFramework::new("ISO 27001", "Information security management"),
    )?;

    println!("✓ Created 4 frameworks (2 roots, 2 children)");

    let tree = gov.frameworks_as_tree(FrameworkStatus::Active)?;
    println!("\nActive framework tree ({} entries):", tree.total_count);
    print_tree(&tree.roots, 0);
    println!();

    // ═══════════════════════════════════════════════════════════
    // SECTION 2: Validation Guardrails
    // ═══════════════════════════════════════════════════════════
    println!("🔒 SECTION 2: Validation Guardrails\n");

    println!("❌ Attempting to add a second 'NIST CSF'...");
    match gov.add_framework(&actor, &NewFramework::new("NIST CSF", "")) {
        Err(e) => println!("   ✓ Correctly rejected [{}]: {}\n", e.code(), e),
        Ok(_) => println!("   ✗ ERROR: Should have been rejected!\n"),
    }

    println!("❌ Attempting to rename a framework to blank...");
    match gov.update_framework(&actor, identify, &FrameworkPatch::rename("   ")) {
        Err(e) => println!("   ✓ Correctly rejected [{}]: {}\n", e.code(), e),
        Ok(_) => println!("   ✗ ERROR: Should have been rejected!\n"),
    }

    println!("❌ Attempting to move 'NIST CSF' under its own child 'Protect'...");
    let patch = FrameworkPatch::rename("NIST CSF").with_parent(protect);
    match gov.update_framework(&actor, nist, &patch) {
        Err(e) => println!("   ✓ Correctly rejected [{}]: {}\n", e.code(), e),
        Ok(_) => println!("   ✗ ERROR: Should have been rejected!\n"),
    }

    // ═══════════════════════════════════════════════════════════
    // SECTION 3: Controls and Reference-Code Mappings
    // ═══════════════════════════════════════════════════════════
    println!("🔗 SECTION 3: Controls and Reference-Code Mappings\n");

    let mut record = ControlRecord::new("AC-1", "AC-1");
    record.long_name = "Access Control Policy and Procedures".to_string();
    record.description = "Approve and periodically review the access policy".to_string();
    record.control_class = Some(1);
    record.control_phase = Some(2);
    record.control_maturity = 1;
    record.desired_maturity = 3;
    record.mitigation_percent = 40;
    let ac1 = gov.add_control(&actor, &record)?;

    let mut record = ControlRecord::new("AU-2", "AU-2");
    record.long_name = "Event Logging".to_string();
    record.control_class = Some(2);
    record.control_maturity = 3;
    record.desired_maturity = 3;
    let au2 = gov.add_control(&actor, &record)?;

    println!("✓ Created controls AC-1 and AU-2");

    // AC-1 carries a framework-specific reference code per mapping.
    gov.replace_mappings(
        ac1,
        &[
            MappingEntry::new(nist, "PR.AC-1"),
            MappingEntry::new(iso, "A.9.1.1"),
        ],
    )?;
    // AU-2 falls back to its own control number as the reference.
    gov.map_control_to_framework(au2, nist, None)?;

    println!("\nAC-1 mappings:");
    for mapped in gov.mappings_for_control(ac1)? {
        println!(
            "  {} -> reference code \"{}\"",
            mapped.framework_name, mapped.reference_name
        );
    }
    println!("\nAU-2 mappings:");
    for mapped in gov.mappings_for_control(au2)? {
        println!(
            "  {} -> reference code \"{}\"",
            mapped.framework_name, mapped.reference_name
        );
    }

    assert!(gov.mapping_exists(ac1, iso)?);
    assert!(!gov.mapping_exists(au2, iso)?);
    println!();

    // ═══════════════════════════════════════════════════════════
    // SECTION 4: Activation Cascades
    // ═══════════════════════════════════════════════════════════
    println!("🌳 SECTION 4: Activation Cascades\n");

    let affected = gov.set_framework_status(&actor, nist, FrameworkStatus::Inactive)?;
    println!("Deactivated 'NIST CSF'; cascade wrote ids {:?}", affected);
    assert_eq!(affected.len(), 3, "the whole subtree goes down");

    let inactive = gov.frameworks_as_tree(FrameworkStatus::Inactive)?;
    println!("\nInactive view is a flat list ({} entries):", inactive.total_count);
    print_tree(&inactive.roots, 0);

    let affected = gov.set_framework_status(&actor, protect, FrameworkStatus::Active)?;
    println!("\nActivated 'Protect'; cascade wrote ids {:?}", affected);
    assert!(affected.contains(&nist), "the inactive ancestor comes back first");
    assert!(!affected.contains(&identify), "siblings stay where they were");

    let chain: Vec<String> = gov
        .parent_chain(protect)?
        .into_iter()
        .map(|fw| fw.name)
        .collect();
    println!("Parent chain of 'Protect' (topmost first): {:?}", chain);

    gov.set_framework_status(&actor, identify, FrameworkStatus::Active)?;
    println!("✓ Reactivated 'Identify' on its own; parent was already active\n");

    // ═══════════════════════════════════════════════════════════
    // SECTION 5: Faceted Queries and Gap Analysis
    // ═══════════════════════════════════════════════════════════
    println!("🔍 SECTION 5: Faceted Queries and Gap Analysis\n");

    let filter = ControlFilter {
        class: FacetFilter::ids([1]),
        ..ControlFilter::default()
    };
    let hits = gov.controls_by_filter(&filter)?;
    println!("Controls with class 1:");
    for summary in &hits {
        println!(
            "  {} (mapped to {:?})",
            summary.control.short_name, summary.framework_names
        );
    }
    assert_eq!(hits.len(), 1);

    let filter = ControlFilter {
        text: Some("logging".to_string()),
        ..ControlFilter::default()
    };
    let hits = gov.controls_by_filter(&filter)?;
    println!("\nFree-text search for \"logging\" finds {} control(s)", hits.len());
    assert_eq!(hits[0].control.short_name, "AU-2");

    let gaps = gov.control_gaps(
        nist,
        MaturityFilter::Below,
        Some(GapSort::ascending(GapSortField::ControlNumber)),
    )?;
    println!("\nMaturity gaps in 'NIST CSF' (below desired):");
    for gap in &gaps {
        println!(
            "  {}: maturity {} of {} wanted",
            gap.control_number, gap.control_maturity, gap.desired_maturity
        );
    }
    assert_eq!(gaps.len(), 1, "AU-2 already meets its desired maturity");

    let classes = gov.available_control_classes(&FacetFilter::Unrestricted)?;
    println!("\nControl classes in use: {:?}", classes);

    let frameworks = gov.available_frameworks(true)?;
    let names: Vec<&str> = frameworks.iter().map(|fw| fw.name.as_str()).collect();
    println!("Frameworks with mapped controls (alphabetical): {:?}", names);
    println!();

    // ═══════════════════════════════════════════════════════════
    // SECTION 6: Deletion Safety
    // ═══════════════════════════════════════════════════════════
    println!("🛡️  SECTION 6: Deletion Safety\n");

    match gov.delete_control(&actor, au2)? {
        ControlDeletion::HardDeleted => {
            println!("✓ AU-2 hard-deleted: nothing references it")
        }
        ControlDeletion::SoftDeleted => {
            println!("✓ AU-2 tombstoned: audit records keep resolving")
        }
    }
    let remaining = gov.controls_dropdown()?;
    println!("  Controls remaining: {}", remaining.len());
    assert_eq!(remaining.len(), 1);

    gov.delete_framework(&actor, iso)?;
    println!("✓ Deleted 'ISO 27001'");
    assert!(!gov.mapping_exists(ac1, iso)?, "its mapping rows went with it");
    assert!(gov.mapping_exists(ac1, nist)?, "other mappings survive");

    let tree = gov.frameworks_as_tree(FrameworkStatus::Active)?;
    println!("  Active frameworks remaining: {}\n", tree.total_count);

    // ═══════════════════════════════════════════════════════════
    // FINAL SUMMARY
    // ═══════════════════════════════════════════════════════════
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║                    DEMO COMPLETE                         ║");
    println!("╠══════════════════════════════════════════════════════════╣");
    println!("║  Demonstrated Features:                                  ║");
    println!("║  ✓ Framework hierarchy with ordered siblings             ║");
    println!("║  ✓ Duplicate, blank-name and cycle rejection             ║");
    println!("║  ✓ Reference-code mappings with pair uniqueness          ║");
    println!("║  ✓ Deactivation cascading down the subtree               ║");
    println!("║  ✓ Activation repairing the ancestor chain               ║");
    println!("║  ✓ Faceted filters and maturity gap analysis             ║");
    println!("║  ✓ Hard-vs-soft control deletion                         ║");
    println!("║  ✓ Framework deletion purging its mappings               ║");
    println!("╚══════════════════════════════════════════════════════════╝");

    Ok(())
}
