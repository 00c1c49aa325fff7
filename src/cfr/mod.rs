//! CFR (Counterfactual Regret Minimization) Solver Module.
//!
//! This module provides a generic implementation of the CFR algorithm family
//! for computing Nash equilibrium strategies in extensive-form games.
//!
//! # Overview
//!
//! CFR is an iterative algorithm that converges to Nash equilibrium by:
//! 1. Computing counterfactual regret for each action at each decision point
//! 2. Updating strategies to minimize regret over time
//! 3. Averaging strategies across iterations to converge to equilibrium
//!
//! The game is enumerated once ([`tree::build_all`]); every iteration is a
//! full-width traversal of the resulting tree, one per player, each followed
//! by that player's update.
//!
//! # Supported Variants
//!
//! - **CFR**: Original algorithm, uniform averaging
//! - **CFR+**: Floors accumulated regret at zero, linear averaging
//! - **Linear CFR**: Weights iteration `T`'s regret by `T`
//! - **DCFR**: Discounts positive and negative regret separately
//! - **DCFR+**: Discounted regret floored at zero
//! - **PCFR+**: CFR+ with a one-step optimistic prediction
//! - **PDCFR+**: Discounted, floored and predictive
//!
//! # Usage
//!
//! 1. Implement the `Game` trait for your game
//! 2. Create a `CFRSolver` with your game and a `SolverConfig`
//! 3. Call `learn()` (evaluating) or `train(n)` (not evaluating)
//! 4. Extract strategies using `get_average_strategy()`
//!
//! # Example
//!
//! ```
//! use regret_solver::cfr::{Algorithm, CFRSolver, SolverConfig};
//! use regret_solver::games::kuhn::KuhnPoker;
//!
//! let config = SolverConfig::new(Algorithm::Dcfr)
//!     .with_iterations(100)
//!     .with_eval_interval(50);
//! let mut solver = CFRSolver::new(KuhnPoker::new(), config).unwrap();
//! let stats = solver.learn().unwrap();
//! assert!(stats.exploitability.unwrap() < 0.05);
//!
//! // Keys are "information-string/player".
//! let strategy = solver.get_average_strategy("2:b/1").unwrap();
//! assert!(strategy[1] > 0.9);
//! ```
//!
//! # Theory
//!
//! **Regret**: The difference between the value of an action and the value of the current strategy.
//! ```text
//! Regret(a) = Value(a) - Value(current_strategy)
//! ```
//!
//! **Regret Matching**: Set strategy proportional to positive regrets.
//! ```text
//! Strategy(a) = max(0, Regret(a)) / sum(max(0, Regret(a')))
//! ```
//!
//! # References
//!
//! - Zinkevich, M., et al. "Regret Minimization in Games with Incomplete Information" (2007)
//! - Tammelin, O. "Solving Large Imperfect Information Games Using CFR+" (2014)
//! - Brown, N., Sandholm, T. "Solving Imperfect-Information Games via Discounted Regret Minimization" (2019)
//! - Farina, G., Kroer, C., Sandholm, T. "Faster Game Solving via Predictive Blackwell Approachability" (2021)
//! - Xu, H., et al. "Minimizing Weighted Counterfactual Regret with Optimistic Online Mirror Descent" (2024)

pub mod config;
pub mod exploitability;
pub mod game;
pub mod infoset;
pub mod solver;
pub mod storage;
pub mod traversal;
pub mod tree;
pub mod variant;

// Re-export main types for convenient access
pub use config::{CFRStats, ConfigError, ExploitabilityPoint, SolverConfig};
pub use exploitability::{BestResponse, Exploitability, PolicyFn};
pub use game::{Action, Game, GameState, InfoState};
pub use infoset::InfoSet;
pub use solver::{CFRSolver, DriverPhase, SolverState};
pub use storage::{InfoSetId, InfoSetSnapshot, InfoSetStore, StorageExport};
pub use tree::{build_all, GameTree, TreeNode, TreeStats};
pub use variant::{Algorithm, UpdateRule};
