use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::Framework;

/// A placed node with its owned children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode<T> {
    pub item: T,
    pub children: Vec<TreeNode<T>>,
}

/// A materialized forest plus the count of nodes actually placed.
///
/// `total_count` lets callers show "N entries" without a second query; nodes
/// whose parent chain never reaches `root_parent` (orphans, cycle members)
/// are not placed and not counted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forest<T> {
    pub roots: Vec<TreeNode<T>>,
    pub total_count: usize,
}

impl<T> Forest<T> {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

pub type FrameworkNode = TreeNode<Framework>;
pub type FrameworkTree = Forest<Framework>;

/// Group a flat list into a forest by parent pointer
///
/// Sibling order follows the input order (callers pass store-sorted lists).
/// Every id is placed at most once; a visited-set keeps malformed data
/// (duplicate ids, a root whose id equals `root_parent`) from looping the
/// walk.
pub fn build_forest<T, I, P>(items: Vec<T>, root_parent: i64, id_of: I, parent_of: P) -> Forest<T>
where
    I: Fn(&T) -> i64,
    P: Fn(&T) -> i64,
{
    let ids: Vec<i64> = items.iter().map(&id_of).collect();

    let mut by_parent: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (idx, item) in items.iter().enumerate() {
        by_parent.entry(parent_of(item)).or_default().push(idx);
    }

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut visited: HashSet<i64> = HashSet::new();
    let mut placed = 0usize;
    let roots = attach(
        root_parent,
        &by_parent,
        &ids,
        &mut slots,
        &mut visited,
        &mut placed,
    );

    Forest {
        roots,
        total_count: placed,
    }
}

fn attach<T>(
    parent: i64,
    by_parent: &BTreeMap<i64, Vec<usize>>,
    ids: &[i64],
    slots: &mut [Option<T>],
    visited: &mut HashSet<i64>,
    placed: &mut usize,
) -> Vec<TreeNode<T>> {
    let Some(indices) = by_parent.get(&parent) else {
        return Vec::new();
    };

    let mut nodes = Vec::with_capacity(indices.len());
    for &idx in indices {
        let id = ids[idx];
        if !visited.insert(id) {
            continue;
        }
        let Some(item) = slots[idx].take() else {
            continue;
        };
        let children = attach(id, by_parent, ids, slots, visited, placed);
        *placed += 1;
        nodes.push(TreeNode { item, children });
    }
    nodes
}

/// Materialize the framework forest rooted at `root_parent` (normally 0).
pub fn build_framework_tree(frameworks: Vec<Framework>, root_parent: i64) -> FrameworkTree {
    build_forest(frameworks, root_parent, |f| f.id, |f| f.parent)
}

/// Single-level view: every record becomes a childless root.
///
/// Used for the inactive-framework listing, which is shown flat even though
/// the records keep their parent links.
pub fn flat_forest<T>(items: Vec<T>) -> Forest<T> {
    let total_count = items.len();
    let roots = items
        .into_iter()
        .map(|item| TreeNode {
            item,
            children: Vec::new(),
        })
        .collect();
    Forest { roots, total_count }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FrameworkStatus;

    fn framework(id: i64, parent: i64, order: i64) -> Framework {
        let mut fw = Framework::new(id, format!("FW-{id}"));
        fw.parent = parent;
        fw.order = order;
        fw
    }

    #[test]
    fn test_build_tree_groups_by_parent() {
        let flat = vec![
            framework(1, 0, 0),
            framework(2, 1, 0),
            framework(3, 1, 1),
            framework(4, 2, 0),
            framework(5, 0, 1),
        ];

        let tree = build_framework_tree(flat, 0);

        assert_eq!(tree.total_count, 5);
        assert_eq!(tree.roots.len(), 2);
        assert_eq!(tree.roots[0].item.id, 1);
        assert_eq!(tree.roots[0].children.len(), 2);
        assert_eq!(tree.roots[0].children[0].item.id, 2);
        assert_eq!(tree.roots[0].children[0].children[0].item.id, 4);
        assert_eq!(tree.roots[1].item.id, 5);
    }

    #[test]
    fn test_sibling_order_follows_input() {
        let flat = vec![framework(9, 0, 1), framework(3, 0, 0), framework(7, 0, 2)];
        let tree = build_framework_tree(flat, 0);
        let root_ids: Vec<i64> = tree.roots.iter().map(|n| n.item.id).collect();
        assert_eq!(root_ids, vec![9, 3, 7], "input order is preserved verbatim");
    }

    #[test]
    fn test_orphans_are_not_placed_or_counted() {
        let flat = vec![framework(1, 0, 0), framework(2, 99, 0)];
        let tree = build_framework_tree(flat, 0);
        assert_eq!(tree.total_count, 1);
        assert_eq!(tree.roots.len(), 1);
    }

    #[test]
    fn test_cycle_members_do_not_loop_the_build() {
        // 2 and 3 point at each other; only 1 is reachable from the root.
        let flat = vec![framework(1, 0, 0), framework(2, 3, 0), framework(3, 2, 0)];
        let tree = build_framework_tree(flat, 0);
        assert_eq!(tree.total_count, 1);
    }

    #[test]
    fn test_subtree_rooted_elsewhere() {
        let flat = vec![framework(2, 1, 0), framework(3, 2, 0), framework(4, 1, 1)];
        let tree = build_framework_tree(flat, 1);
        assert_eq!(tree.total_count, 3);
        assert_eq!(tree.roots.len(), 2);
    }

    #[test]
    fn test_flat_forest_has_no_children() {
        let flat = vec![framework(1, 0, 0), framework(2, 1, 0), framework(3, 2, 0)];
        let view = flat_forest(flat);
        assert_eq!(view.total_count, 3);
        assert_eq!(view.roots.len(), 3);
        assert!(view.roots.iter().all(|n| n.children.is_empty()));
        // Parent links survive in the records themselves.
        assert_eq!(view.roots[1].item.parent, 1);
        assert_eq!(view.roots[1].item.status, FrameworkStatus::Active);
    }
}
