//! Counterfactual value traversal.
//!
//! One full-width pass over the enumerated tree for a designated traverser.
//! Every player acts according to the current `policy` of its information
//! sets. Only the traverser's information sets are written: each receives
//! its instantaneous counterfactual regret (weighted by the reach of chance
//! and the other players) and its own reach.
//!
//! ```text
//! childValue[a] = traverse(child(a), myReach * policy[a], oppReach)
//! v             = sum_a policy[a] * childValue[a]
//! immRegret[a] += oppReach * (childValue[a] - v)
//! reach        += myReach
//! ```

use crate::cfr::game::Action;
use crate::cfr::storage::InfoSetStore;
use crate::cfr::tree::{GameTree, NodeId, TreeNode};

/// Expected utility of `traverser` at `node` under the current policies,
/// accumulating regret and reach into the traverser's information sets.
pub fn traverse<A: Action>(
    tree: &GameTree,
    store: &mut InfoSetStore<A>,
    node: NodeId,
    traverser: usize,
    my_reach: f64,
    opp_reach: f64,
) -> f64 {
    match tree.node(node) {
        TreeNode::Terminal { returns } => returns[traverser],

        TreeNode::Chance { outcomes } => outcomes
            .iter()
            .map(|&(child, p)| p * traverse(tree, store, child, traverser, my_reach, opp_reach * p))
            .sum(),

        TreeNode::Decision {
            player,
            infoset,
            children,
        } => {
            let policy = store.get(*infoset).policy().to_vec();

            if *player != traverser {
                return children
                    .iter()
                    .zip(&policy)
                    .map(|(&child, &p)| {
                        p * traverse(tree, store, child, traverser, my_reach, opp_reach * p)
                    })
                    .sum();
            }

            let child_values: Vec<f64> = children
                .iter()
                .zip(&policy)
                .map(|(&child, &p)| traverse(tree, store, child, traverser, my_reach * p, opp_reach))
                .collect();
            let value: f64 = policy
                .iter()
                .zip(&child_values)
                .map(|(&p, &v)| p * v)
                .sum();

            let s = store.get_mut(*infoset);
            for (r, &v) in s.imm_regret.iter_mut().zip(&child_values) {
                *r += opp_reach * (v - value);
            }
            s.reach += my_reach;
            value
        }
    }
}
