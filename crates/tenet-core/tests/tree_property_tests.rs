//! Structural properties of the tree engine under arbitrary forests

use std::collections::HashMap;

use proptest::prelude::*;

use tenet_core::model::{Framework, FrameworkStatus};
use tenet_core::tree::{build_framework_tree, plan_activation, would_create_cycle};

/// Random connected forest: node i+1 parents onto an earlier id or 0.
fn forest(max_nodes: usize) -> impl Strategy<Value = Vec<Framework>> {
    prop::collection::vec((any::<prop::sample::Index>(), any::<bool>()), 1..max_nodes).prop_map(
        |choices| {
            choices
                .iter()
                .enumerate()
                .map(|(i, (parent_choice, active))| {
                    let id = (i + 1) as i64;
                    let mut fw = Framework::new(id, format!("FW-{id}"));
                    fw.parent = parent_choice.index(i + 1) as i64;
                    fw.status = if *active {
                        FrameworkStatus::Active
                    } else {
                        FrameworkStatus::Inactive
                    };
                    fw
                })
                .collect()
        },
    )
}

fn is_acyclic(frameworks: &[Framework]) -> bool {
    let parent_of: HashMap<i64, i64> = frameworks.iter().map(|f| (f.id, f.parent)).collect();
    frameworks.iter().all(|fw| {
        let mut current = fw.id;
        for _ in 0..=frameworks.len() {
            if current == 0 {
                return true;
            }
            match parent_of.get(&current) {
                Some(parent) => current = *parent,
                None => return true,
            }
        }
        false
    })
}

proptest! {
    #[test]
    fn prop_build_tree_places_every_node_of_a_connected_forest(frameworks in forest(40)) {
        let n = frameworks.len();
        let tree = build_framework_tree(frameworks, 0);
        prop_assert_eq!(tree.total_count, n);
    }

    #[test]
    fn prop_accepted_reparent_keeps_forest_acyclic(
        mut frameworks in forest(30),
        node_choice in any::<prop::sample::Index>(),
        parent_choice in any::<prop::sample::Index>(),
    ) {
        let n = frameworks.len();
        let node_id = frameworks[node_choice.index(n)].id;
        let proposed_parent = parent_choice.index(n + 1) as i64;

        prop_assume!(!would_create_cycle(&frameworks, node_id, proposed_parent));
        for fw in frameworks.iter_mut() {
            if fw.id == node_id {
                fw.parent = proposed_parent;
            }
        }
        prop_assert!(is_acyclic(&frameworks));
    }

    #[test]
    fn prop_activation_never_leaves_an_inactive_ancestor(
        frameworks in forest(30),
        target_choice in any::<prop::sample::Index>(),
    ) {
        let target = frameworks[target_choice.index(frameworks.len())].id;
        let plan = plan_activation(&frameworks, target).unwrap();

        let mut by_id: HashMap<i64, Framework> =
            frameworks.into_iter().map(|f| (f.id, f)).collect();
        for id in &plan.affected {
            if let Some(fw) = by_id.get_mut(id) {
                fw.status = FrameworkStatus::Active;
            }
        }
        if let Some(promoted) = plan.promote_to_root {
            if let Some(fw) = by_id.get_mut(&promoted) {
                fw.parent = 0;
            }
        }

        for id in &plan.affected {
            let parent = by_id[id].parent;
            prop_assert!(
                parent == 0 || by_id.get(&parent).is_some_and(|f| f.is_active()),
                "activated framework {} still hangs under inactive parent {}",
                id,
                parent
            );
        }
    }
}
