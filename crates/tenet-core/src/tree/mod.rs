//! Pure tree algorithms over the framework forest
//!
//! Nothing in this module touches storage: functions take flat slices and
//! return owned structures or plans for a store to execute. Every walk is
//! bounded by a visited-set so corrupt parent data (cycles, dangling ids,
//! duplicates) can never loop an algorithm.

pub mod ancestry;
pub mod builder;
pub mod cascade;

pub use ancestry::{ancestor_chain, subtree_ids, would_create_cycle};
pub use builder::{
    build_forest, build_framework_tree, flat_forest, Forest, FrameworkNode, FrameworkTree, TreeNode,
};
pub use cascade::{plan_activation, plan_deactivation, CascadePlan};
