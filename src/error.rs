//! Error types returned by the search and by the Othello rules.

use thiserror::Error;

use crate::Player;

/// Errors that can occur while configuring or running a search.
#[derive(Error, Debug)]
pub enum MctsError{
    /// The driver was asked to decide for a player who has no legal move.
    /// Callers must check for the end of the game first.
    #[error("no legal moves available for {player:?}")]
    NoLegalMoves{ player: Player },

    /// A move was requested from a tree whose root has no visited child yet.
    #[error("no move has been explored from the root")]
    UnexploredRoot,

    /// A configuration value is out of range.
    #[error("invalid search configuration: {0}")]
    InvalidConfig(String),

    /// A TOML configuration could not be parsed.
    #[error("failed to parse search configuration: {0}")]
    ConfigParse(#[from] toml::de::Error)
}

/// Errors raised by the Othello board and game manager.
#[derive(Error, Debug)]
pub enum GameError{
    #[error("square ({column}, {row}) is outside the board")]
    OutOfBounds{ column: usize, row: usize },

    #[error("square ({column}, {row}) is already occupied")]
    OccupiedSquare{ column: usize, row: usize },

    #[error("playing ({column}, {row}) captures nothing")]
    NoCapture{ column: usize, row: usize },

    #[error("invalid cell value: {0}")]
    InvalidCell(u8),

    #[error("invalid player number: {0}")]
    InvalidPlayer(u8),

    #[error("invalid board dimension: {0}")]
    InvalidDimension(usize),

    #[error("board rows must all have the board's dimension")]
    NotSquare,

    /// A move-choosing callback failed during a managed game.
    #[error(transparent)]
    Search(#[from] MctsError)
}
