//! Leduc Hold'em.
//!
//! ## Game Rules
//!
//! - 6 cards: two suits of Jack, Queen, King (card `c` has rank `c / 2`)
//! - 2 players, each antes 1 chip and receives 1 private card
//! - Two betting rounds; a public card is dealt between them
//! - Raise size is 2 in the first round and 4 in the second
//! - At most 2 raises per round; player 1 opens each round
//! - Folding is only legal when facing a bet
//! - A player pairing the public card wins; otherwise the higher rank wins
//!   and equal ranks split the pot
//!
//! The game has 936 information sets.

use std::fmt;

use crate::cfr::game::{Action, Game, InfoState};

/// Number of cards in the deck.
pub const DECK_SIZE: u8 = 6;

/// Raises allowed per betting round.
pub const MAX_RAISES: u8 = 2;

/// Raise size in each round.
pub const RAISE_SIZES: [u32; 2] = [2, 4];

/// Betting actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeducAction {
    /// Give up the pot (only when facing a bet).
    Fold,
    /// Check, or call the outstanding bet.
    Call,
    /// Bet or raise by the round's raise size.
    Raise,
}

impl LeducAction {
    fn symbol(self) -> char {
        match self {
            LeducAction::Fold => 'f',
            LeducAction::Call => 'c',
            LeducAction::Raise => 'r',
        }
    }
}

impl Action for LeducAction {
    fn label(&self) -> String {
        self.symbol().to_string()
    }
}

/// What one player knows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LeducInfoState {
    /// Own private card.
    pub card: u8,
    /// Public card, once dealt.
    pub public: Option<u8>,
    /// Betting of both rounds so far.
    pub history: [String; 2],
}

impl InfoState for LeducInfoState {
    fn key(&self) -> String {
        let public = self
            .public
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{}:{}:{}|{}",
            self.card, public, self.history[0], self.history[1]
        )
    }
}

/// Full game state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeducState {
    /// Private cards, once dealt.
    pub private: Option<[u8; 2]>,
    /// Public card, once dealt.
    pub public: Option<u8>,
    /// Betting round (0 or 1).
    pub round: usize,
    /// Betting per round, one character per action.
    pub history: [String; 2],
    /// Chips each player has put in, antes included.
    pub contributions: [u32; 2],
    /// Raises made in the current round.
    pub raises: u8,
    /// Player who folded, if any.
    pub folded: Option<usize>,
    /// Whether the second round is over.
    pub finished: bool,
}

crate::impl_game_state!(LeducState);

impl LeducState {
    fn to_act(&self) -> usize {
        self.history[self.round].len() % 2
    }

    fn awaiting_public(&self) -> bool {
        self.private.is_some() && self.round == 1 && self.public.is_none()
    }
}

impl fmt::Display for LeducState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cards {:?} public {:?} betting {}|{} pot {:?}",
            self.private, self.public, self.history[0], self.history[1], self.contributions
        )
    }
}

/// Rank of a card: 0 = Jack, 1 = Queen, 2 = King.
pub fn rank(card: u8) -> u8 {
    card / 2
}

/// Leduc Hold'em.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeducPoker;

impl LeducPoker {
    /// Create the game.
    pub fn new() -> Self {
        Self
    }

    /// +1 if player 0 wins the showdown, -1 if player 1 does, 0 on a split.
    fn showdown(cards: [u8; 2], public: u8) -> f64 {
        let pair = |c: u8| rank(c) == rank(public);
        match (pair(cards[0]), pair(cards[1])) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => match rank(cards[0]).cmp(&rank(cards[1])) {
                std::cmp::Ordering::Greater => 1.0,
                std::cmp::Ordering::Less => -1.0,
                std::cmp::Ordering::Equal => 0.0,
            },
        }
    }
}

impl Game for LeducPoker {
    type State = LeducState;
    type Action = LeducAction;
    type InfoState = LeducInfoState;

    fn initial_state(&self) -> Self::State {
        LeducState {
            contributions: [1, 1],
            ..Default::default()
        }
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        state.folded.is_some() || state.finished
    }

    fn returns(&self, state: &Self::State) -> Vec<f64> {
        let p0 = match (state.folded, state.private, state.public) {
            (Some(folder), _, _) => {
                let lost = state.contributions[folder] as f64;
                if folder == 0 {
                    -lost
                } else {
                    lost
                }
            }
            (None, Some(cards), Some(public)) => {
                Self::showdown(cards, public) * state.contributions[0] as f64
            }
            _ => 0.0,
        };
        vec![p0, -p0]
    }

    fn current_player(&self, state: &Self::State) -> Option<usize> {
        if self.is_terminal(state) || self.is_chance(state) {
            return None;
        }
        Some(state.to_act())
    }

    fn num_players(&self) -> usize {
        2
    }

    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if self.current_player(state).is_none() {
            return Vec::new();
        }
        let me = state.to_act();
        let mut actions = Vec::with_capacity(3);
        if state.contributions[1 - me] > state.contributions[me] {
            actions.push(LeducAction::Fold);
        }
        actions.push(LeducAction::Call);
        if state.raises < MAX_RAISES {
            actions.push(LeducAction::Raise);
        }
        actions
    }

    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Self::State {
        let mut next = state.clone();
        let me = state.to_act();
        let round = state.round;
        next.history[round].push(action.symbol());

        match action {
            LeducAction::Fold => next.folded = Some(me),
            LeducAction::Call => {
                next.contributions[me] = state.contributions[1 - me];
                if next.history[round].len() >= 2 {
                    if round == 0 {
                        next.round = 1;
                        next.raises = 0;
                    } else {
                        next.finished = true;
                    }
                }
            }
            LeducAction::Raise => {
                next.contributions[me] = state.contributions[1 - me] + RAISE_SIZES[round];
                next.raises += 1;
            }
        }
        next
    }

    fn info_state(&self, state: &Self::State, player: usize) -> Self::InfoState {
        LeducInfoState {
            card: state.private.map(|cards| cards[player]).unwrap_or(0),
            public: state.public,
            history: state.history.clone(),
        }
    }

    fn is_chance(&self, state: &Self::State) -> bool {
        state.private.is_none() || state.awaiting_public()
    }

    fn chance_outcomes(&self, state: &Self::State) -> Vec<(Self::State, f64)> {
        match state.private {
            None => {
                let p = 1.0 / (DECK_SIZE as f64 * (DECK_SIZE - 1) as f64);
                let mut deals = Vec::with_capacity(30);
                for c0 in 0..DECK_SIZE {
                    for c1 in (0..DECK_SIZE).filter(|&c| c != c0) {
                        let mut next = state.clone();
                        next.private = Some([c0, c1]);
                        deals.push((next, p));
                    }
                }
                deals
            }
            Some(cards) if state.awaiting_public() => {
                let p = 1.0 / (DECK_SIZE - 2) as f64;
                (0..DECK_SIZE)
                    .filter(|c| !cards.contains(c))
                    .map(|c| {
                        let mut next = state.clone();
                        next.public = Some(c);
                        (next, p)
                    })
                    .collect()
            }
            Some(_) => Vec::new(),
        }
    }

    fn state_description(&self, state: &Self::State) -> String {
        state.to_string()
    }
}
