//! # Regret Solver
//!
//! A generic Counterfactual Regret Minimization (CFR) solver for computing
//! Nash equilibrium strategies in extensive-form games, with seven members
//! of the CFR family sharing one traversal engine.
//!
//! ## Features
//!
//! - **Generic CFR Engine**: Works with any finite game implementing the `Game` trait
//! - **Seven Variants**: CFR, CFR+, Linear CFR, DCFR, DCFR+, PCFR+ and PDCFR+
//! - **Exact Evaluation**: Full-width traversal and an exact best-response oracle
//! - **Checkpointing**: Save and resume solver state as JSON
//! - **Metrics**: Exploitability curves to the log, CSV or memory
//!
//! ## Quick Start
//!
//! ```
//! use regret_solver::cfr::{Algorithm, CFRSolver, SolverConfig};
//! use regret_solver::games::kuhn::KuhnPoker;
//!
//! // 1. Pick a game and an algorithm
//! let config = SolverConfig::new(Algorithm::PdcfrPlus).with_iterations(100);
//!
//! // 2. Create a solver (enumerates the game tree)
//! let mut solver = CFRSolver::new(KuhnPoker::new(), config).unwrap();
//!
//! // 3. Train
//! solver.train(100);
//!
//! // 4. Get strategies
//! let strategy = solver.get_average_strategy("0:b/1").unwrap();
//! assert_eq!(strategy.len(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`cfr`]: Core CFR algorithm and solver
//! - [`games`]: Example game implementations (Kuhn Poker, Leduc, Coin Guess)
//! - [`metrics`]: Metric logger and writers
//! - [`runner`]: Named games, single runs and parallel comparisons
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      CFR Solver (Generic)                       │
//! │  - Tree enumeration       - Alternating full-width traversal    │
//! │  - Seven update rules     - Exploitability evaluation           │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ implements Game trait
//!                               ▼
//!         ┌─────────────────────┼─────────────────────┐
//!         │                     │                     │
//!         ▼                     ▼                     ▼
//!    ┌─────────┐         ┌───────────┐         ┌───────────┐
//!    │  Kuhn   │         │   Leduc   │         │   Coin    │
//!    │  Poker  │         │  Hold'em  │         │   Guess   │
//!    └─────────┘         └───────────┘         └───────────┘
//! ```

#![warn(missing_docs)]

/// CFR (Counterfactual Regret Minimization) solver module.
///
/// This is the core module containing the generic CFR algorithm.
pub mod cfr;

/// Crate-wide error type.
pub mod error;

/// Game implementations module.
///
/// Contains Kuhn Poker, Leduc Hold'em and Coin Guess.
pub mod games;

/// Metric recording.
pub mod metrics;

/// Experiment runner.
pub mod runner;

// Re-export commonly used types at crate root for convenience
pub use cfr::{
    Action, Algorithm, CFRSolver, CFRStats, Game, GameState, InfoState, SolverConfig, UpdateRule,
};
pub use error::{Result, SolverError};
