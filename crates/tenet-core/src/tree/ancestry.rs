use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use crate::model::Framework;

/// Walk the parent chain from `start_id` upward
///
/// Returns the chain in topmost-first order, including the starting framework
/// itself. The walk stops at a root (`parent == 0`), at a missing parent row,
/// or on revisit, so cyclic or dangling data cannot loop it.
pub fn ancestor_chain(frameworks: &[Framework], start_id: i64) -> Vec<&Framework> {
    let by_id: HashMap<i64, &Framework> = frameworks.iter().map(|f| (f.id, f)).collect();

    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    let mut current = start_id;

    while current != 0 && visited.insert(current) {
        let Some(framework) = by_id.get(&current) else {
            break;
        };
        chain.push(*framework);
        current = framework.parent;
    }

    // Collected bottom-up; callers want root-first.
    chain.reverse();
    chain
}

/// Check whether re-parenting `framework_id` under `proposed_parent` would
/// make the framework its own ancestor
///
/// Walks upward from `proposed_parent`; true the moment the walk reaches
/// `framework_id` (so `proposed_parent == framework_id` is caught
/// immediately), false once it reaches a root or leaves known data. Bounded
/// by a visited-set, so a pre-existing cycle elsewhere cannot hang the check.
pub fn would_create_cycle(
    frameworks: &[Framework],
    framework_id: i64,
    proposed_parent: i64,
) -> bool {
    let parent_of: HashMap<i64, i64> = frameworks.iter().map(|f| (f.id, f.parent)).collect();

    let mut visited = HashSet::new();
    let mut current = proposed_parent;

    while current != 0 {
        if current == framework_id {
            return true;
        }
        if !visited.insert(current) {
            return false;
        }
        match parent_of.get(&current) {
            Some(parent) => current = *parent,
            None => return false,
        }
    }
    false
}

/// Ids of the subtree rooted at `root_id`: the framework itself plus every
/// descendant, breadth-first, siblings in input order
///
/// `root_id` is returned even when absent from the slice; callers that need
/// existence guarantees check first.
pub fn subtree_ids(frameworks: &[Framework], root_id: i64) -> Vec<i64> {
    let mut by_parent: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    for framework in frameworks {
        by_parent.entry(framework.parent).or_default().push(framework.id);
    }

    let mut ids = Vec::new();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([root_id]);

    while let Some(id) = queue.pop_front() {
        if !visited.insert(id) {
            continue;
        }
        ids.push(id);
        if let Some(children) = by_parent.get(&id) {
            queue.extend(children.iter().copied());
        }
    }
    ids
}
