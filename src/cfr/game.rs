//! Game trait definition for the CFR solver.
//!
//! Any finite, loop-free extensive-form game that implements the `Game` trait
//! can be enumerated and solved. The solver never looks inside states; it only
//! asks the questions below.

use std::fmt::Debug;
use std::hash::Hash;

use crate::error::{Result, SolverError};

/// A move available at a decision node.
pub trait Action: Clone + Eq + Hash + Debug + Send + Sync {
    /// Short label used in checkpoints and logs.
    fn label(&self) -> String;
}

/// What one player observes at a decision node.
///
/// Two game states that look identical to a player (same private
/// information, same public history) must produce the same key.
pub trait InfoState: Clone + Eq + Hash + Debug + Send + Sync {
    /// Information string; equal views give equal strings.
    fn key(&self) -> String;
}

/// A full history, hidden cards included.
pub trait GameState: Clone + Debug + Send + Sync {}

/// The environment contract consumed by the solver.
///
/// The solver assumes every method is pure and deterministic, and that the
/// tree rooted at [`Game::initial_state`] is finite. Legal actions must come
/// back in the same order every time a given information set is reached.
///
/// # Example
/// ```ignore
/// struct MyGame;
///
/// impl Game for MyGame {
///     type State = MyGameState;
///     type Action = MyAction;
///     type InfoState = MyInfoState;
///
///     // ... implement required methods
/// }
/// ```
pub trait Game: Clone + Send + Sync {
    /// Full state.
    type State: GameState;

    /// Move type.
    type Action: Action;

    /// Per-player view.
    type InfoState: InfoState;

    /// Root of the tree, before nature or any player has moved.
    fn initial_state(&self) -> Self::State;

    /// Whether play has ended.
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Payoff vector of a terminal state, one entry per player.
    fn returns(&self, state: &Self::State) -> Vec<f64>;

    /// Player to move, or `None` at terminal and chance nodes.
    fn current_player(&self, state: &Self::State) -> Option<usize>;

    /// Number of players.
    fn num_players(&self) -> usize;

    /// Legal moves, in a fixed order per information set.
    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Successor of `state` after `action`.
    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Self::State;

    /// Information state of `player` at `state`.
    fn info_state(&self, state: &Self::State, player: usize) -> Self::InfoState;

    /// Whether nature moves at `state`. Defaults to never.
    fn is_chance(&self, _state: &Self::State) -> bool {
        false
    }

    /// Every outcome of a chance node with its probability.
    ///
    /// Probabilities of one node must sum to 1. Full-width traversal visits
    /// every outcome, so this replaces sampling entirely.
    fn chance_outcomes(&self, _state: &Self::State) -> Vec<(Self::State, f64)> {
        Vec::new()
    }

    /// State rendered for error messages.
    fn state_description(&self, state: &Self::State) -> String {
        format!("{:?}", state)
    }
}

/// Payoff vector of a terminal state, rejecting one whose length is not the
/// number of players.
pub fn checked_returns<G: Game>(game: &G, state: &G::State) -> Result<Vec<f64>> {
    let returns = game.returns(state);
    if returns.len() != game.num_players() {
        return Err(SolverError::InvalidState(format!(
            "terminal state has {} payoffs for {} players: {}",
            returns.len(),
            game.num_players(),
            game.state_description(state)
        )));
    }
    Ok(returns)
}

/// Implement [`GameState`] for a type.
#[macro_export]
macro_rules! impl_game_state {
    ($type:ty) => {
        impl $crate::cfr::game::GameState for $type {}
    };
}
