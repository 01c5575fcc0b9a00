//! Module defining players, moves and the rule engine trait used by MCTS.

use serde::{Deserialize, Serialize};

use crate::GameError;

/// One of the two sides of the game.
///
/// `Dark` is player 1 and moves first, `Light` is player 2. Utilities are
/// signed so that positive values favour `Dark`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player{
    /// Player 1.
    Dark,
    /// Player 2.
    Light
}

impl Player{
    /// Returns the player who moves after this one.
    ///
    /// # Examples
    /// ```rust
    /// use othello_mcts::Player;
    /// assert_eq!(Player::Dark.opponent(), Player::Light);
    /// assert_eq!(Player::Light.opponent(), Player::Dark);
    /// ```
    #[inline]
    pub fn opponent(self) -> Self{
        match self {
            Player::Dark => Player::Light,
            Player::Light => Player::Dark
        }
    }

    /// Returns the player number (1 or 2), which is also the cell value
    /// used for this player's stones on an Othello board.
    #[inline]
    pub fn index(self) -> u8{
        match self {
            Player::Dark => 1,
            Player::Light => 2
        }
    }
}

impl TryFrom<u8> for Player{
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Player::Dark),
            2 => Ok(Player::Light),
            other => Err(GameError::InvalidPlayer(other))
        }
    }
}

/// A placement on the board, identified by its column and row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move{
    pub column: usize,
    pub row: usize
}

impl Move{
    #[inline]
    pub fn new(column: usize, row: usize) -> Self{
        Move { column, row }
    }
}

impl std::fmt::Display for Move{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.column, self.row)
    }
}

/// Trait defining the rules of a game that can be searched with MCTS.
///
/// The search never looks inside a state: it only enumerates moves, applies
/// them, scores final positions and compares states for equality.
///
/// Implementations must be pure. Calling `legal_moves` twice with the same
/// arguments must return the same moves in the same order, because ties in
/// the search are broken by that order.
pub trait RuleEngine{
    /// The board position. Two states are the same position exactly when
    /// they compare equal.
    type State: Clone + PartialEq;

    /// Returns every move `player` may play from `state`, in a stable order.
    ///
    /// An empty result means `player` cannot move, which ends the game.
    ///
    /// # Examples
    /// ```rust
    /// use othello_mcts::{Board, Move, Othello, Player, RuleEngine};
    /// let board = Board::initial(4).unwrap();
    /// let moves = Othello.legal_moves(&board, Player::Dark);
    /// assert_eq!(moves.len(), 4);
    /// assert_eq!(moves[0], Move::new(0, 1));
    /// ```
    fn legal_moves(&self, state: &Self::State, player: Player) -> Vec<Move>;

    /// Returns the state reached when `player` plays `mv` from `state`.
    ///
    /// The input state is left untouched. `mv` is assumed to be legal.
    fn apply_move(&self, state: &Self::State, player: Player, mv: Move) -> Self::State;

    /// Scores a position: positive values favour player 1 (`Dark`),
    /// negative values favour player 2 (`Light`).
    fn terminal_utility(&self, state: &Self::State) -> f64;
}
