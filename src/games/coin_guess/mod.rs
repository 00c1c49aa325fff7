//! Coin guess: a one-player decision problem with three information sets.
//!
//! Nature flips a hidden fair coin and seats the player at one of three
//! tables, uniformly. The player sees the table, not the coin.
//!
//! | Table | Actions | Payoff |
//! |---|---|---|
//! | 0 | Heads, Tails | 1 for a correct guess |
//! | 1 | Heads, Tails, Fold | 1 for a correct guess, Fold pays 1/4 |
//! | 2 | Heads, Tails | 2 for a correct Heads, 1 for a correct Tails |
//!
//! Optimal play mixes freely at table 0, never folds at table 1 and always
//! calls Heads at table 2. Regret matching settles on these after one
//! iteration, which makes the average policy of vanilla CFR computable in
//! closed form.

use std::fmt;

use crate::cfr::game::{Action, Game, InfoState};

/// Number of tables.
pub const NUM_TABLES: u8 = 3;

/// Payoff of folding at table 1.
pub const FOLD_PAYOFF: f64 = 0.25;

/// A guess, or walking away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoinAction {
    /// Guess heads.
    Heads,
    /// Guess tails.
    Tails,
    /// Take the fixed payoff (table 1 only).
    Fold,
}

impl Action for CoinAction {
    fn label(&self) -> String {
        match self {
            CoinAction::Heads => "H",
            CoinAction::Tails => "T",
            CoinAction::Fold => "F",
        }
        .to_string()
    }
}

/// What the player sees: the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoinInfoState {
    /// Table index.
    pub table: u8,
}

impl InfoState for CoinInfoState {
    fn key(&self) -> String {
        format!("table{}", self.table)
    }
}

/// Full state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoinState {
    /// Hidden coin (`0` = heads) and public table, once nature has moved.
    pub deal: Option<(u8, u8)>,
    /// The player's choice, once made.
    pub choice: Option<CoinAction>,
}

crate::impl_game_state!(CoinState);

impl fmt::Display for CoinState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.deal, self.choice) {
            (None, _) => write!(f, "undealt"),
            (Some((coin, table)), choice) => {
                let side = if coin == 0 { "heads" } else { "tails" };
                write!(f, "coin {} at table {}, choice {:?}", side, table, choice)
            }
        }
    }
}

/// The game.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoinGuess;

impl CoinGuess {
    /// Create the game.
    pub fn new() -> Self {
        Self
    }
}

impl Game for CoinGuess {
    type State = CoinState;
    type Action = CoinAction;
    type InfoState = CoinInfoState;

    fn initial_state(&self) -> Self::State {
        CoinState::default()
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        state.choice.is_some()
    }

    fn returns(&self, state: &Self::State) -> Vec<f64> {
        let payoff = match (state.deal, state.choice) {
            (Some(_), Some(CoinAction::Fold)) => FOLD_PAYOFF,
            (Some((0, 2)), Some(CoinAction::Heads)) => 2.0,
            (Some((0, _)), Some(CoinAction::Heads)) | (Some((1, _)), Some(CoinAction::Tails)) => {
                1.0
            }
            _ => 0.0,
        };
        vec![payoff]
    }

    fn current_player(&self, state: &Self::State) -> Option<usize> {
        match (state.deal, state.choice) {
            (Some(_), None) => Some(0),
            _ => None,
        }
    }

    fn num_players(&self) -> usize {
        1
    }

    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        match (state.deal, state.choice) {
            (Some((_, 1)), None) => vec![CoinAction::Heads, CoinAction::Tails, CoinAction::Fold],
            (Some(_), None) => vec![CoinAction::Heads, CoinAction::Tails],
            _ => Vec::new(),
        }
    }

    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Self::State {
        CoinState {
            deal: state.deal,
            choice: Some(*action),
        }
    }

    fn info_state(&self, state: &Self::State, _player: usize) -> Self::InfoState {
        CoinInfoState {
            table: state.deal.map(|(_, table)| table).unwrap_or(0),
        }
    }

    fn is_chance(&self, state: &Self::State) -> bool {
        state.deal.is_none()
    }

    fn chance_outcomes(&self, state: &Self::State) -> Vec<(Self::State, f64)> {
        if state.deal.is_some() {
            return Vec::new();
        }
        let p = 1.0 / (2.0 * NUM_TABLES as f64);
        (0..2u8)
            .flat_map(|coin| (0..NUM_TABLES).map(move |table| (coin, table)))
            .map(|deal| {
                (
                    CoinState {
                        deal: Some(deal),
                        choice: None,
                    },
                    p,
                )
            })
            .collect()
    }

    fn state_description(&self, state: &Self::State) -> String {
        state.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seated(coin: u8, table: u8) -> CoinState {
        CoinState {
            deal: Some((coin, table)),
            choice: None,
        }
    }

    #[test]
    fn test_chance_covers_every_seat() {
        let game = CoinGuess::new();
        let outcomes = game.chance_outcomes(&game.initial_state());
        assert_eq!(outcomes.len(), 6);
        assert!((outcomes.iter().map(|(_, p)| p).sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_payoffs() {
        let game = CoinGuess::new();
        let pay = |coin, table, action| game.returns(&game.apply_action(&seated(coin, table), &action))[0];
        assert_eq!(pay(0, 0, CoinAction::Heads), 1.0);
        assert_eq!(pay(1, 0, CoinAction::Heads), 0.0);
        assert_eq!(pay(1, 1, CoinAction::Tails), 1.0);
        assert_eq!(pay(0, 1, CoinAction::Fold), FOLD_PAYOFF);
        assert_eq!(pay(0, 2, CoinAction::Heads), 2.0);
        assert_eq!(pay(1, 2, CoinAction::Tails), 1.0);
        assert_eq!(pay(1, 2, CoinAction::Heads), 0.0);
    }

    #[test]
    fn test_info_state_hides_coin() {
        let game = CoinGuess::new();
        let heads = game.info_state(&seated(0, 2), 0);
        let tails = game.info_state(&seated(1, 2), 0);
        assert_eq!(heads, tails);
        assert_eq!(heads.key(), "table2");
        assert_eq!(game.available_actions(&seated(0, 1)).len(), 3);
        assert_eq!(game.available_actions(&seated(0, 0)).len(), 2);
    }
}
