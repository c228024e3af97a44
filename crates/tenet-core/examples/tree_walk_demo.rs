//! Tree Engine Demonstration
//!
//! This example walks through the pure algorithms behind the framework
//! hierarchy.
//!
//! Key concepts illustrated:
//! 1. Forest materialization with placement counts
//! 2. Ancestor chains and subtree collection
//! 3. Cycle detection ahead of a reparent
//! 4. Cascade planning (plans are data; a store executes them)
//! 5. Promotion to root when no parent can be activated

use tenet_core::model::{Framework, FrameworkStatus};
use tenet_core::tree::{
    ancestor_chain, build_framework_tree, flat_forest, plan_activation, plan_deactivation,
    subtree_ids, would_create_cycle, CascadePlan, FrameworkNode,
};

fn framework(id: i64, name: &str, parent: i64, status: FrameworkStatus) -> Framework {
    let mut fw = Framework::new(id, name);
    fw.parent = parent;
    fw.status = status;
    fw
}

fn print_tree(nodes: &[FrameworkNode], depth: usize) {
    for node in nodes {
        println!("  {}- {}", "  ".repeat(depth), node.item.name);
        print_tree(&node.children, depth + 1);
    }
}

fn apply_plan(frameworks: &mut [Framework], plan: &CascadePlan) {
    for fw in frameworks.iter_mut() {
        if plan.affected.contains(&fw.id) {
            fw.status = plan.new_status;
        }
        if plan.promote_to_root == Some(fw.id) {
            fw.parent = 0;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Tenet Tree Engine Demo ===\n");

    use FrameworkStatus::{Active, Inactive};

    // The flat list a store would hand over, already display-ordered.
    let mut frameworks = vec![
        framework(1, "Security Policies", 0, Active),
        framework(2, "NIST CSF", 0, Active),
        framework(3, "Identify", 2, Active),
        framework(4, "Protect", 2, Active),
        framework(5, "Access Control", 4, Active),
    ];

    // ===== Part 1: Forest Materialization =====
    println!("## Part 1: Forest Materialization\n");

    let tree = build_framework_tree(frameworks.clone(), 0);
    println!("Materialized {} frameworks into {} roots:", tree.total_count, tree.roots.len());
    print_tree(&tree.roots, 0);

    assert_eq!(tree.total_count, 5);
    assert_eq!(tree.roots.len(), 2);
    println!("\n✓ Every node placed exactly once; sibling order follows input order\n");

    // ===== Part 2: Ancestor Chains and Subtrees =====
    println!("## Part 2: Ancestor Chains and Subtrees\n");

    let chain: Vec<&str> = ancestor_chain(&frameworks, 5)
        .iter()
        .map(|fw| fw.name.as_str())
        .collect();
    println!("Chain above 'Access Control' (topmost first): {:?}", chain);
    assert_eq!(chain, vec!["NIST CSF", "Protect", "Access Control"]);

    let subtree = subtree_ids(&frameworks, 4);
    println!("Subtree rooted at 'Protect': {:?}", subtree);
    assert_eq!(subtree, vec![4, 5]);
    println!("✓ Both walks are visited-set bounded\n");

    // ===== Part 3: Cycle Detection =====
    println!("## Part 3: Cycle Detection\n");

    println!("Can 'NIST CSF' move under its own grandchild 'Access Control'?");
    let blocked = would_create_cycle(&frameworks, 2, 5);
    println!("  would_create_cycle(2 under 5) = {}", blocked);
    assert!(blocked, "moving an ancestor under its descendant closes a loop");
    println!("  ✗ Rejected: the walk from 'Access Control' reaches 'NIST CSF'");

    println!("\nCan 'Access Control' move under 'Identify'?");
    let blocked = would_create_cycle(&frameworks, 5, 3);
    println!("  would_create_cycle(5 under 3) = {}", blocked);
    assert!(!blocked);
    println!("  ✓ Allowed: the walk from 'Identify' reaches a root first");

    println!("\nSelf-parenting is the degenerate cycle:");
    assert!(would_create_cycle(&frameworks, 1, 1));
    println!("  ✓ Caught immediately\n");

    // ===== Part 4: Deactivation Cascades =====
    println!("## Part 4: Deactivation Cascades\n");

    let plan = plan_deactivation(&frameworks, 4)?;
    println!("Deactivating 'Protect' affects ids {:?}", plan.affected);
    assert_eq!(plan.affected, vec![4, 5]);
    apply_plan(&mut frameworks, &plan);
    println!("✓ The whole subtree went inactive; parent links are untouched");

    let plan = plan_deactivation(&frameworks, 2)?;
    println!("\nDeactivating 'NIST CSF' affects ids {:?}", plan.affected);
    assert_eq!(plan.affected, vec![2, 3, 4, 5], "already-inactive descendants are included");
    apply_plan(&mut frameworks, &plan);

    let inactive: Vec<Framework> = frameworks
        .iter()
        .filter(|fw| !fw.is_active())
        .cloned()
        .collect();
    let flat_view = flat_forest(inactive);
    println!("\nInactive frameworks are listed flat ({} entries):", flat_view.total_count);
    print_tree(&flat_view.roots, 0);
    assert!(flat_view.roots.iter().all(|node| node.children.is_empty()));
    println!();

    // ===== Part 5: Activation and Promotion =====
    println!("## Part 5: Activation and Promotion\n");

    let plan = plan_activation(&frameworks, 5)?;
    println!("Activating 'Access Control' affects ids {:?}", plan.affected);
    assert_eq!(plan.affected, vec![2, 4, 5], "inactive ancestors come back first");
    assert_eq!(plan.promote_to_root, None, "the chain ends at a true root");
    apply_plan(&mut frameworks, &plan);

    let identify_active = frameworks.iter().any(|fw| fw.id == 3 && fw.is_active());
    println!("✓ 'NIST CSF' and 'Protect' reactivated with it");
    println!("  'Identify' stays inactive: {}", !identify_active);
    assert!(!identify_active, "siblings outside the chain are untouched");

    // A record whose parent id resolves to nothing.
    frameworks.push(framework(6, "Legacy Annex", 99, Inactive));
    let plan = plan_activation(&frameworks, 6)?;
    println!("\nActivating 'Legacy Annex' (parent id 99 does not exist):");
    println!("  affected = {:?}, promote_to_root = {:?}", plan.affected, plan.promote_to_root);
    assert_eq!(plan.promote_to_root, Some(6));
    apply_plan(&mut frameworks, &plan);

    let annex_is_root = frameworks.iter().any(|fw| fw.id == 6 && fw.is_root());
    assert!(annex_is_root);
    println!("✓ Promoted to a root: an active framework never hangs under an inactive parent\n");

    // ===== Summary =====
    println!("## Summary\n");
    println!("Demonstrated:");
    println!("  ✓ Forest materialization with placement counts");
    println!("  ✓ Topmost-first ancestor chains and breadth-first subtrees");
    println!("  ✓ Cycle rejection before any parent write");
    println!("  ✓ Deactivation taking a full subtree down");
    println!("  ✓ Activation repairing the chain upward, promoting when it cannot");

    let tree = build_framework_tree(
        frameworks.iter().filter(|fw| fw.is_active()).cloned().collect(),
        0,
    );
    println!("\nFinal active forest ({} frameworks):", tree.total_count);
    print_tree(&tree.roots, 0);

    Ok(())
}
