//! Kuhn Poker implementation for CFR validation.
//!
//! Kuhn Poker is a simplified poker game used to validate CFR implementations
//! because it has a known, mathematically proven Nash equilibrium.
//!
//! ## Game Rules
//!
//! - 3 cards: Jack (0), Queen (1), King (2)
//! - 2 players, each antes 1 chip
//! - Each player receives 1 card
//! - Player 1 acts first: Pass or Bet (1 chip)
//! - Player 2 responds based on P1's action
//! - Higher card wins at showdown
//!
//! ## Game Tree
//!
//! ```text
//! Deal (6 ordered deals, 1/6 each)
//! └── P1 (first to act)
//!     ├── Pass
//!     │   └── P2
//!     │       ├── Pass → Showdown (pot = 2)
//!     │       └── Bet
//!     │           └── P1
//!     │               ├── Pass → P2 wins (pot = 3)
//!     │               └── Bet → Showdown (pot = 4)
//!     └── Bet
//!         └── P2
//!             ├── Pass → P1 wins (pot = 3)
//!             └── Bet → Showdown (pot = 4)
//! ```
//!
//! ## Known Nash Equilibrium
//!
//! A one-parameter family, α ∈ [0, 1/3]:
//!
//! - **Player 1 with Jack**: Bet with probability α
//! - **Player 1 with Queen**: Always Pass; call a bet with probability α + 1/3
//! - **Player 1 with King**: Bet with probability 3α; always call
//! - **Player 2 facing Bet**: Jack folds, Queen calls 1/3, King calls
//! - **Player 2 after Pass**: Jack bets 1/3, Queen passes, King bets
//!
//! **Expected Value**: Player 1 EV = -1/18 ≈ -0.0556

use std::fmt;

use crate::cfr::game::{Action, Game, GameState, InfoState};

/// Actions in Kuhn Poker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KuhnAction {
    /// Pass (check if no bet, fold if facing bet)
    Pass,
    /// Bet (or call if facing bet)
    Bet,
}

impl KuhnAction {
    fn symbol(self) -> char {
        match self {
            KuhnAction::Pass => 'p',
            KuhnAction::Bet => 'b',
        }
    }
}

impl Action for KuhnAction {
    fn label(&self) -> String {
        self.symbol().to_string()
    }
}

impl fmt::Display for KuhnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KuhnAction::Pass => write!(f, "Pass"),
            KuhnAction::Bet => write!(f, "Bet"),
        }
    }
}

/// Information state in Kuhn Poker.
///
/// What a player knows: their card and the action history.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KuhnInfoState {
    /// Player's card (0=Jack, 1=Queen, 2=King)
    pub card: u8,
    /// Action history as string (e.g., "pb" = pass then bet)
    pub history: String,
}

impl InfoState for KuhnInfoState {
    fn key(&self) -> String {
        format!("{}:{}", self.card, self.history)
    }
}

impl fmt::Display for KuhnInfoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", card_symbol(self.card), self.history)
    }
}

/// Complete game state in Kuhn Poker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KuhnState {
    /// Cards dealt to each player (0=Jack, 1=Queen, 2=King)
    /// cards[0] is Player 1's card, cards[1] is Player 2's card
    pub cards: [u8; 2],
    /// Action history as string
    pub history: String,
    /// Amount each player has invested in the pot
    pub pot: [i32; 2],
    /// Whether cards have been dealt (the undealt state is the chance node)
    pub dealt: bool,
}

impl GameState for KuhnState {}

impl Default for KuhnState {
    fn default() -> Self {
        Self {
            cards: [0, 0],
            history: String::new(),
            pot: [1, 1], // Both ante 1
            dealt: false,
        }
    }
}

impl KuhnState {
    /// A dealt state with the given cards and history; pot follows the history.
    pub fn dealt(cards: [u8; 2], history: &str) -> Self {
        let mut pot = [1, 1];
        for (i, c) in history.chars().enumerate() {
            if c == 'b' {
                pot[i % 2] += 1;
            }
        }
        Self {
            cards,
            history: history.to_string(),
            pot,
            dealt: true,
        }
    }
}

impl fmt::Display for KuhnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P1:{} P2:{} History:{} Pot:{:?}",
            card_symbol(self.cards[0]),
            card_symbol(self.cards[1]),
            self.history,
            self.pot
        )
    }
}

fn card_symbol(card: u8) -> &'static str {
    match card {
        0 => "J",
        1 => "Q",
        2 => "K",
        _ => "?",
    }
}

/// Kuhn Poker game.
#[derive(Debug, Clone, Default)]
pub struct KuhnPoker;

impl KuhnPoker {
    /// Create a new Kuhn Poker game.
    pub fn new() -> Self {
        Self
    }
}

impl Game for KuhnPoker {
    type State = KuhnState;
    type Action = KuhnAction;
    type InfoState = KuhnInfoState;

    fn initial_state(&self) -> Self::State {
        KuhnState::default()
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        matches!(state.history.as_str(), "pp" | "pbp" | "pbb" | "bp" | "bb")
    }

    fn returns(&self, state: &Self::State) -> Vec<f64> {
        debug_assert!(self.is_terminal(state), "returns called on non-terminal state");

        // A trailing pass after a bet is a fold by the player to act.
        let h = state.history.as_str();
        let p0 = if h.ends_with("bp") {
            let folder = (h.len() - 1) % 2;
            let won = state.pot[folder] as f64;
            if folder == 0 {
                -won
            } else {
                won
            }
        } else {
            let stake = state.pot[0] as f64;
            if state.cards[0] > state.cards[1] {
                stake
            } else {
                -stake
            }
        };
        vec![p0, -p0]
    }

    fn current_player(&self, state: &Self::State) -> Option<usize> {
        if !state.dealt || self.is_terminal(state) {
            return None;
        }
        Some(state.history.len() % 2)
    }

    fn num_players(&self) -> usize {
        2
    }

    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if self.is_terminal(state) || self.is_chance(state) {
            return vec![];
        }
        vec![KuhnAction::Pass, KuhnAction::Bet]
    }

    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Self::State {
        let mut new_state = state.clone();
        if *action == KuhnAction::Bet {
            new_state.pot[state.history.len() % 2] += 1;
        }
        new_state.history.push(action.symbol());
        new_state
    }

    fn info_state(&self, state: &Self::State, player: usize) -> Self::InfoState {
        KuhnInfoState {
            card: state.cards[player],
            history: state.history.clone(),
        }
    }

    fn is_chance(&self, state: &Self::State) -> bool {
        !state.dealt
    }

    fn chance_outcomes(&self, state: &Self::State) -> Vec<(Self::State, f64)> {
        if !self.is_chance(state) {
            return Vec::new();
        }
        let mut deals = Vec::with_capacity(6);
        for c0 in 0..3u8 {
            for c1 in (0..3u8).filter(|&c| c != c0) {
                deals.push((KuhnState::dealt([c0, c1], ""), 1.0 / 6.0));
            }
        }
        deals
    }

    fn state_description(&self, state: &Self::State) -> String {
        format!("{}", state)
    }
}
