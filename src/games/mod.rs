//! Game implementations for the CFR solver.
//!
//! These serve as:
//!
//! 1. **Validation**: Games with known Nash equilibria (like Kuhn Poker) or
//!    closed-form solver trajectories (Coin Guess) verify that the CFR
//!    implementation is correct.
//!
//! 2. **Examples**: Demonstrate how to implement the `Game` trait for new games.
//!
//! 3. **Benchmarks**: Provide standardized games for performance testing.
//!
//! ## Available Games
//!
//! - [`kuhn`]: Kuhn Poker, 3 cards, 12 information sets
//! - [`leduc`]: Leduc Hold'em, 6 cards and two rounds, 936 information sets
//! - [`coin_guess`]: single-player guessing game with 3 information sets
//!
//! ## Adding New Games
//!
//! 1. Create a new module under `src/games/`
//! 2. Define state, action, and info state types
//! 3. Implement the `Game` trait, enumerating chance outcomes with their
//!    probabilities
//! 4. Add tests that verify expected behavior
//!
//! See the [`kuhn`] module for a complete example.

pub mod coin_guess;
pub mod kuhn;
pub mod leduc;
