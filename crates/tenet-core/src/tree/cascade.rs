use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::errors::{GovernanceError, Result};
use crate::model::{Framework, FrameworkStatus};
use crate::tree::ancestry::subtree_ids;

/// A computed status cascade, ready for a store to execute atomically
///
/// `affected` lists every framework the cascade writes: target-first for a
/// deactivation (then its subtree breadth-first), topmost-ancestor-first with
/// the target last for an activation. `promote_to_root` names the one node
/// whose parent link must additionally be reset to 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadePlan {
    pub target: i64,
    pub new_status: FrameworkStatus,
    pub affected: Vec<i64>,
    pub promote_to_root: Option<i64>,
}

/// Plan a deactivation: the target and its full subtree go inactive
///
/// Parent links are untouched; a deactivated subtree keeps its shape so a
/// later activation can restore it.
pub fn plan_deactivation(frameworks: &[Framework], target: i64) -> Result<CascadePlan> {
    ensure_known(frameworks, target)?;

    Ok(CascadePlan {
        target,
        new_status: FrameworkStatus::Inactive,
        affected: subtree_ids(frameworks, target),
        promote_to_root: None,
    })
}

/// Plan an activation: the target plus its chain of inactive ancestors
///
/// The upward walk collects contiguous inactive, unvisited ancestors and
/// stops at a root, at an already-active ancestor, at a missing parent row,
/// or on revisit. When the walk did not end at a root or a live active
/// ancestor, the topmost activated node still points at something inactive
/// (dangling id or cycle remnant) and is promoted to a root instead; an
/// active framework must never hang under an inactive parent.
pub fn plan_activation(frameworks: &[Framework], target: i64) -> Result<CascadePlan> {
    let by_id: HashMap<i64, &Framework> = frameworks.iter().map(|f| (f.id, f)).collect();
    let start = by_id
        .get(&target)
        .ok_or(GovernanceError::FrameworkNotFound {
            framework_id: target,
        })?;

    let mut chain: Vec<i64> = Vec::new();
    let mut visited: HashSet<i64> = HashSet::from([target]);
    let mut current = start.parent;

    let reached_live_parent = loop {
        if current == 0 {
            break true;
        }
        if !visited.insert(current) {
            // Parent chain loops back into itself.
            break false;
        }
        let Some(ancestor) = by_id.get(&current) else {
            // Dangling parent id.
            break false;
        };
        if ancestor.is_active() {
            break true;
        }
        chain.push(current);
        current = ancestor.parent;
    };

    // Collected bottom-up; execution order is topmost-first.
    chain.reverse();

    let promote_to_root = if reached_live_parent {
        None
    } else {
        Some(chain.first().copied().unwrap_or(target))
    };

    let mut affected = chain;
    affected.push(target);

    Ok(CascadePlan {
        target,
        new_status: FrameworkStatus::Active,
        affected,
        promote_to_root,
    })
}

fn ensure_known(frameworks: &[Framework], framework_id: i64) -> Result<()> {
    if frameworks.iter().any(|f| f.id == framework_id) {
        Ok(())
    } else {
        Err(GovernanceError::FrameworkNotFound { framework_id })
    }
}
