//! Full-tree enumeration.
//!
//! [`build_all`] walks the external game once, depth first, and produces two
//! things: the populated [`InfoSetStore`] and a [`GameTree`] whose decision
//! nodes point at information sets by handle. Every later traversal runs on
//! the `GameTree` only.
//!
//! Recursion depth equals the longest path in the game.

use std::fmt;

use crate::cfr::game::{checked_returns, Game, InfoState};
use crate::cfr::storage::{InfoSetId, InfoSetStore};
use crate::error::{Result, SolverError};

/// Index of a node inside a [`GameTree`].
pub type NodeId = usize;

/// A node of the materialized tree.
#[derive(Debug, Clone)]
pub enum TreeNode {
    /// Game over; payoff per player.
    Terminal {
        /// Payoff vector.
        returns: Vec<f64>,
    },
    /// Nature moves; every outcome with its probability.
    Chance {
        /// `(child, probability)` pairs.
        outcomes: Vec<(NodeId, f64)>,
    },
    /// A player moves.
    Decision {
        /// Acting player.
        player: usize,
        /// Information set of the acting player.
        infoset: InfoSetId,
        /// One child per legal action, in the information set's action order.
        children: Vec<NodeId>,
    },
}

/// Counts gathered during enumeration.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TreeStats {
    /// All nodes.
    pub total_nodes: usize,
    /// Terminal nodes.
    pub terminal_nodes: usize,
    /// Chance nodes.
    pub chance_nodes: usize,
    /// Decision nodes.
    pub decision_nodes: usize,
    /// Longest root-to-leaf path, in edges.
    pub max_depth: usize,
    /// Information sets per player.
    pub infosets_per_player: Vec<usize>,
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes ({} decision, {} chance, {} terminal), depth {}, info sets per player {:?}",
            self.total_nodes,
            self.decision_nodes,
            self.chance_nodes,
            self.terminal_nodes,
            self.max_depth,
            self.infosets_per_player
        )
    }
}

/// The enumerated game tree.
#[derive(Debug, Clone)]
pub struct GameTree {
    nodes: Vec<TreeNode>,
    root: NodeId,
    stats: TreeStats,
}

impl GameTree {
    /// Root node handle.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node by handle.
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes (never true after [`build_all`]).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Enumeration statistics.
    pub fn stats(&self) -> &TreeStats {
        &self.stats
    }
}

/// Walk the whole game from its initial state, creating one information set
/// per distinct (information-string, player) and materializing every node.
///
/// Fails with [`SolverError::TreeTooLarge`] once more than `max_nodes` nodes
/// have been produced.
pub fn build_all<G: Game>(
    game: &G,
    max_nodes: usize,
) -> Result<(GameTree, InfoSetStore<G::Action>)> {
    let mut builder = Builder {
        game,
        max_nodes,
        nodes: Vec::new(),
        stats: TreeStats::default(),
        store: InfoSetStore::new(),
    };
    let root = builder.visit(&game.initial_state(), 0)?;

    let mut stats = builder.stats;
    stats.total_nodes = builder.nodes.len();
    stats.infosets_per_player = (0..game.num_players())
        .map(|p| builder.store.owned_by(p).len())
        .collect();

    log::info!("enumerated game tree: {}", stats);

    Ok((
        GameTree {
            nodes: builder.nodes,
            root,
            stats,
        },
        builder.store,
    ))
}

struct Builder<'g, G: Game> {
    game: &'g G,
    max_nodes: usize,
    nodes: Vec<TreeNode>,
    stats: TreeStats,
    store: InfoSetStore<G::Action>,
}

impl<G: Game> Builder<'_, G> {
    /// Reserve a slot so parents get lower ids than their children.
    fn reserve(&mut self, depth: usize) -> Result<NodeId> {
        if self.nodes.len() >= self.max_nodes {
            return Err(SolverError::TreeTooLarge {
                limit: self.max_nodes,
            });
        }
        self.stats.max_depth = self.stats.max_depth.max(depth);
        self.nodes.push(TreeNode::Terminal {
            returns: Vec::new(),
        });
        Ok(self.nodes.len() - 1)
    }

    fn visit(&mut self, state: &G::State, depth: usize) -> Result<NodeId> {
        let id = self.reserve(depth)?;

        if self.game.is_terminal(state) {
            self.stats.terminal_nodes += 1;
            self.nodes[id] = TreeNode::Terminal {
                returns: checked_returns(self.game, state)?,
            };
            return Ok(id);
        }

        if self.game.is_chance(state) {
            self.stats.chance_nodes += 1;
            let outcomes = self.game.chance_outcomes(state);
            if outcomes.is_empty() {
                return Err(SolverError::InvalidState(format!(
                    "chance node without outcomes: {}",
                    self.game.state_description(state)
                )));
            }
            let mut children = Vec::with_capacity(outcomes.len());
            for (child, prob) in &outcomes {
                children.push((self.visit(child, depth + 1)?, *prob));
            }
            self.nodes[id] = TreeNode::Chance { outcomes: children };
            return Ok(id);
        }

        let player = self.game.current_player(state).ok_or_else(|| {
            SolverError::InvalidState(format!(
                "non-terminal, non-chance state without an acting player: {}",
                self.game.state_description(state)
            ))
        })?;
        self.stats.decision_nodes += 1;

        let actions = self.game.available_actions(state);
        let key = InfoSetStore::<G::Action>::compose_key(
            &self.game.info_state(state, player).key(),
            player,
        );
        let infoset = self.store.lookup_or_create(key, player, actions.clone())?;

        let mut children = Vec::with_capacity(actions.len());
        for action in &actions {
            let next = self.game.apply_action(state, action);
            children.push(self.visit(&next, depth + 1)?);
        }
        self.nodes[id] = TreeNode::Decision {
            player,
            infoset,
            children,
        };
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::game::{Action, GameState};
    use crate::games::kuhn::KuhnPoker;

    #[test]
    fn test_kuhn_enumeration() {
        let (tree, store) = build_all(&KuhnPoker::new(), 1_000).unwrap();
        assert_eq!(store.len(), 12);
        assert_eq!(tree.stats().infosets_per_player, vec![6, 6]);
        assert_eq!(tree.stats().chance_nodes, 1);
        // 6 deals x (4 decision histories, 5 terminal histories)
        assert_eq!(tree.stats().decision_nodes, 24);
        assert_eq!(tree.stats().terminal_nodes, 30);
        assert_eq!(tree.len(), 55);
        assert_eq!(tree.stats().max_depth, 4);
        assert!(matches!(tree.node(tree.root()), TreeNode::Chance { .. }));
    }

    #[test]
    fn test_every_decision_has_one_child_per_action() {
        let (tree, store) = build_all(&KuhnPoker::new(), 1_000).unwrap();
        for id in 0..tree.len() {
            if let TreeNode::Decision {
                infoset, children, ..
            } = tree.node(id)
            {
                assert_eq!(children.len(), store.get(*infoset).num_actions());
                assert!(children.iter().all(|&c| c > id));
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Pick {
        X,
        Y,
        Z,
    }

    impl Action for Pick {
        fn label(&self) -> String {
            format!("{:?}", self)
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Blind;

    impl InfoState for Blind {
        fn key(&self) -> String {
            "same".to_string()
        }
    }

    #[derive(Debug, Clone, Default)]
    struct Step {
        branch: Option<u8>,
        done: bool,
    }

    impl GameState for Step {}

    /// One player, two chance branches that look identical to the player.
    #[derive(Clone)]
    struct Malformed {
        payoffs: usize,
        mismatched: bool,
    }

    impl Game for Malformed {
        type State = Step;
        type Action = Pick;
        type InfoState = Blind;

        fn initial_state(&self) -> Step {
            Step::default()
        }

        fn is_terminal(&self, state: &Step) -> bool {
            state.done
        }

        fn returns(&self, _state: &Step) -> Vec<f64> {
            vec![1.0; self.payoffs]
        }

        fn current_player(&self, state: &Step) -> Option<usize> {
            (state.branch.is_some() && !state.done).then_some(0)
        }

        fn num_players(&self) -> usize {
            1
        }

        fn available_actions(&self, state: &Step) -> Vec<Pick> {
            if self.mismatched && state.branch == Some(1) {
                vec![Pick::Y, Pick::Z]
            } else {
                vec![Pick::X, Pick::Y]
            }
        }

        fn apply_action(&self, state: &Step, _action: &Pick) -> Step {
            Step {
                branch: state.branch,
                done: true,
            }
        }

        fn info_state(&self, _state: &Step, _player: usize) -> Blind {
            Blind
        }

        fn is_chance(&self, state: &Step) -> bool {
            state.branch.is_none()
        }

        fn chance_outcomes(&self, _state: &Step) -> Vec<(Step, f64)> {
            (0..2)
                .map(|b| {
                    (
                        Step {
                            branch: Some(b),
                            done: false,
                        },
                        0.5,
                    )
                })
                .collect()
        }
    }

    #[test]
    fn test_shared_info_string_merges() {
        let game = Malformed {
            payoffs: 1,
            mismatched: false,
        };
        let (tree, store) = build_all(&game, 100).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(tree.stats().decision_nodes, 2);
    }

    #[test]
    fn test_different_actions_under_one_info_string() {
        let game = Malformed {
            payoffs: 1,
            mismatched: true,
        };
        match build_all(&game, 100).unwrap_err() {
            SolverError::InconsistentActions { key, expected, found } => {
                assert_eq!(key, "same/0");
                assert_eq!(expected, vec!["X", "Y"]);
                assert_eq!(found, vec!["Y", "Z"]);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_payoff_vector_must_cover_every_player() {
        let game = Malformed {
            payoffs: 0,
            mismatched: false,
        };
        assert!(matches!(
            build_all(&game, 100),
            Err(SolverError::InvalidState(_))
        ));
    }

    #[test]
    fn test_node_limit() {
        let err = build_all(&KuhnPoker::new(), 20).unwrap_err();
        assert!(matches!(err, SolverError::TreeTooLarge { limit: 20 }));
    }
}
