//! Exploitability evaluation.
//!
//! The solver only needs a scalar from an oracle: how far the average profile
//! is from equilibrium. [`Exploitability`] is that seam. [`BestResponse`] is
//! the exact oracle used by default; it walks the external game and computes
//! an information-set best response for every player.
//!
//! ```text
//! NashConv       = sum_i (BR_i - V_i)
//! exploitability = NashConv / num_players
//! ```
//!
//! `V_i` is player i's value when everybody follows the policy, `BR_i` the
//! value player i gets by best responding while the others keep the policy.

use rustc_hash::FxHashMap;

use crate::cfr::game::{checked_returns, Game, InfoState};
use crate::error::{Result, SolverError};

/// Average-policy lookup handed to an oracle: action probabilities of the
/// acting player at a decision state, in `available_actions` order.
pub type PolicyFn<'a, G> = dyn Fn(&<G as Game>::State) -> Result<Vec<f64>> + 'a;

/// An oracle that scores a policy profile.
pub trait Exploitability<G: Game>: Send + Sync {
    /// Non-negative distance of `policy` from equilibrium (0 at a Nash
    /// equilibrium).
    fn exploitability(&self, game: &G, policy: &PolicyFn<'_, G>) -> Result<f64>;
}

/// Exact best-response oracle for games small enough to walk repeatedly.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestResponse;

impl BestResponse {
    /// Create the oracle.
    pub fn new() -> Self {
        Self
    }

    /// Value of every player when all of them follow `policy`.
    pub fn policy_values<G: Game>(&self, game: &G, policy: &PolicyFn<'_, G>) -> Result<Vec<f64>> {
        on_policy_values(game, policy, &game.initial_state())
    }

    /// Value `player` obtains with a best response against `policy`.
    pub fn best_response_value<G: Game>(
        &self,
        game: &G,
        policy: &PolicyFn<'_, G>,
        player: usize,
    ) -> Result<f64> {
        let mut responder = Responder {
            game,
            policy,
            player,
            histories: FxHashMap::default(),
            best: FxHashMap::default(),
        };
        let root = game.initial_state();
        responder.collect(&root, 1.0)?;
        responder.value(&root)
    }

    /// `sum_i (BR_i - V_i)`.
    pub fn nash_conv<G: Game>(&self, game: &G, policy: &PolicyFn<'_, G>) -> Result<f64> {
        let values = self.policy_values(game, policy)?;
        let mut total = 0.0;
        for (player, on_policy) in values.iter().enumerate() {
            total += self.best_response_value(game, policy, player)? - on_policy;
        }
        Ok(total)
    }
}

impl<G: Game> Exploitability<G> for BestResponse {
    fn exploitability(&self, game: &G, policy: &PolicyFn<'_, G>) -> Result<f64> {
        Ok(self.nash_conv(game, policy)? / game.num_players() as f64)
    }
}

fn checked_policy<G: Game>(
    game: &G,
    policy: &PolicyFn<'_, G>,
    state: &G::State,
    num_actions: usize,
) -> Result<Vec<f64>> {
    let probs = policy(state)?;
    if probs.len() != num_actions {
        return Err(SolverError::InvalidState(format!(
            "policy has {} entries for {} actions at {}",
            probs.len(),
            num_actions,
            game.state_description(state)
        )));
    }
    Ok(probs)
}

fn acting_player<G: Game>(game: &G, state: &G::State) -> Result<usize> {
    game.current_player(state).ok_or_else(|| {
        SolverError::InvalidState(format!(
            "decision state without an acting player: {}",
            game.state_description(state)
        ))
    })
}

fn on_policy_values<G: Game>(
    game: &G,
    policy: &PolicyFn<'_, G>,
    state: &G::State,
) -> Result<Vec<f64>> {
    let n = game.num_players();
    if game.is_terminal(state) {
        return checked_returns(game, state);
    }

    let weighted: Vec<(G::State, f64)> = if game.is_chance(state) {
        game.chance_outcomes(state)
    } else {
        acting_player(game, state)?;
        let actions = game.available_actions(state);
        let probs = checked_policy(game, policy, state, actions.len())?;
        actions
            .iter()
            .zip(probs)
            .map(|(a, p)| (game.apply_action(state, a), p))
            .collect()
    };

    let mut values = vec![0.0; n];
    for (child, p) in &weighted {
        if *p == 0.0 {
            continue;
        }
        for (v, c) in values.iter_mut().zip(on_policy_values(game, policy, child)?) {
            *v += p * c;
        }
    }
    Ok(values)
}

/// Best response of one player against a fixed policy.
struct Responder<'a, G: Game> {
    game: &'a G,
    policy: &'a PolicyFn<'a, G>,
    player: usize,
    /// Info key of the responder -> histories with their counterfactual reach.
    histories: FxHashMap<String, Vec<(G::State, f64)>>,
    /// Chosen action index per info key.
    best: FxHashMap<String, usize>,
}

impl<G: Game> Responder<'_, G> {
    /// Record every history of the responder with the reach of chance and the
    /// other players.
    fn collect(&mut self, state: &G::State, reach: f64) -> Result<()> {
        if self.game.is_terminal(state) {
            return Ok(());
        }
        if self.game.is_chance(state) {
            for (child, p) in self.game.chance_outcomes(state) {
                self.collect(&child, reach * p)?;
            }
            return Ok(());
        }

        let player = acting_player(self.game, state)?;
        let actions = self.game.available_actions(state);
        if player == self.player {
            let key = self.game.info_state(state, player).key();
            self.histories
                .entry(key)
                .or_default()
                .push((state.clone(), reach));
            for action in &actions {
                self.collect(&self.game.apply_action(state, action), reach)?;
            }
        } else {
            let probs = checked_policy(self.game, self.policy, state, actions.len())?;
            for (action, p) in actions.iter().zip(probs) {
                self.collect(&self.game.apply_action(state, action), reach * p)?;
            }
        }
        Ok(())
    }

    /// Responder's value at `state` with best responses below it.
    fn value(&mut self, state: &G::State) -> Result<f64> {
        if self.game.is_terminal(state) {
            return Ok(checked_returns(self.game, state)?[self.player]);
        }
        if self.game.is_chance(state) {
            let mut total = 0.0;
            for (child, p) in self.game.chance_outcomes(state) {
                total += p * self.value(&child)?;
            }
            return Ok(total);
        }

        let player = acting_player(self.game, state)?;
        let actions = self.game.available_actions(state);
        if player == self.player {
            let key = self.game.info_state(state, player).key();
            let choice = self.best_action(&key, actions.len())?;
            let next = self.game.apply_action(state, &actions[choice]);
            return self.value(&next);
        }

        let probs = checked_policy(self.game, self.policy, state, actions.len())?;
        let mut total = 0.0;
        for (action, p) in actions.iter().zip(probs) {
            if p > 0.0 {
                total += p * self.value(&self.game.apply_action(state, action))?;
            }
        }
        Ok(total)
    }

    /// Action maximizing the reach-weighted value over the histories of `key`.
    fn best_action(&mut self, key: &str, num_actions: usize) -> Result<usize> {
        if let Some(&choice) = self.best.get(key) {
            return Ok(choice);
        }
        let histories = self
            .histories
            .remove(key)
            .ok_or_else(|| SolverError::UnknownInfoSet(key.to_string()))?;

        let mut action_values = vec![0.0; num_actions];
        for (state, reach) in &histories {
            if *reach == 0.0 {
                continue;
            }
            let actions = self.game.available_actions(state);
            for (slot, action) in action_values.iter_mut().zip(&actions) {
                *slot += reach * self.value(&self.game.apply_action(state, action))?;
            }
        }

        let mut choice = 0;
        for (i, &v) in action_values.iter().enumerate() {
            if v > action_values[choice] {
                choice = i;
            }
        }
        self.best.insert(key.to_string(), choice);
        Ok(choice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::coin_guess::CoinGuess;
    use crate::games::kuhn::{KuhnPoker, KuhnState};

    fn uniform<G: Game>(game: &G) -> impl Fn(&G::State) -> Result<Vec<f64>> + '_ {
        move |state: &G::State| {
            let n = game.available_actions(state).len();
            Ok(vec![1.0 / n as f64; n])
        }
    }

    /// Equilibrium with the first player never bluffing (alpha = 0).
    /// Probabilities are `[pass, bet]`.
    fn kuhn_nash(state: &KuhnState) -> Result<Vec<f64>> {
        let player = if state.history.len() == 1 { 1 } else { 0 };
        let card = state.cards[player];
        let bet = match (state.history.as_str(), card) {
            ("", _) => 0.0,
            ("p", 0) => 1.0 / 3.0,
            ("p", 1) => 0.0,
            ("p", _) => 1.0,
            ("b", 0) | ("pb", 0) => 0.0,
            ("b", 1) | ("pb", 1) => 1.0 / 3.0,
            _ => 1.0,
        };
        Ok(vec![1.0 - bet, bet])
    }

    #[test]
    fn test_uniform_kuhn_exploitability() {
        let game = KuhnPoker::new();
        let policy = uniform(&game);
        let exp = BestResponse.exploitability(&game, &policy).unwrap();
        assert!((exp - 11.0 / 24.0).abs() < 1e-9, "exploitability = {}", exp);
    }

    #[test]
    fn test_uniform_kuhn_policy_values() {
        let game = KuhnPoker::new();
        let policy = uniform(&game);
        let values = BestResponse.policy_values(&game, &policy).unwrap();
        assert!((values[0] - 0.125).abs() < 1e-12);
        assert!((values[0] + values[1]).abs() < 1e-12);
    }

    #[test]
    fn test_kuhn_equilibrium_is_unexploitable() {
        let game = KuhnPoker::new();
        let exp = BestResponse.exploitability(&game, &kuhn_nash).unwrap();
        assert!(exp.abs() < 1e-9, "exploitability = {}", exp);

        let values = BestResponse.policy_values(&game, &kuhn_nash).unwrap();
        assert!((values[0] + 1.0 / 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_player_best_response() {
        let game = CoinGuess::new();
        let policy = uniform(&game);
        // Best play earns 1/2, 1/2 and 1 at the three tables.
        let br = BestResponse.best_response_value(&game, &policy, 0).unwrap();
        assert!((br - 2.0 / 3.0).abs() < 1e-12);
        let exp = BestResponse.exploitability(&game, &policy).unwrap();
        let on_policy = (0.5 + 5.0 / 12.0 + 0.75) / 3.0;
        assert!((exp - (2.0 / 3.0 - on_policy)).abs() < 1e-12);
    }

    #[test]
    fn test_policy_errors_propagate() {
        let game = KuhnPoker::new();
        let failing = |_: &KuhnState| -> Result<Vec<f64>> {
            Err(SolverError::UnknownInfoSet("nowhere".into()))
        };
        assert!(matches!(
            BestResponse.exploitability(&game, &failing),
            Err(SolverError::UnknownInfoSet(_))
        ));
    }

    #[test]
    fn test_wrong_policy_length_is_rejected() {
        let game = KuhnPoker::new();
        let short = |_: &KuhnState| -> Result<Vec<f64>> { Ok(vec![1.0]) };
        assert!(matches!(
            BestResponse.exploitability(&game, &short),
            Err(SolverError::InvalidState(_))
        ));
    }
}
