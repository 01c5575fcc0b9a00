//! Othello rules on a square board of any size, and a small game manager.
//!
//! Moves are placements: a stone may be put on an empty square when it
//! closes at least one straight line of opponent stones against a stone of
//! the mover, and every closed line is flipped. The game ends as soon as the
//! player to move has no legal placement.

use std::fmt;

use tracing::debug;

use crate::{GameError, MctsError, Move, Player, RuleEngine};

/// The eight line directions as (column step, row step).
const DIRECTIONS: [(isize, isize); 8] = [
    (0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1)
];

/// A square Othello board.
///
/// Cells hold `0` for an empty square, `1` for a `Dark` stone and `2` for a
/// `Light` stone. Boards are values: two boards are equal when every cell
/// matches.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board{
    dimension: usize,
    cells: Vec<u8>
}

impl Board{
    /// Creates an empty board.
    pub fn new(dimension: usize) -> Result<Self, GameError>{
        if dimension < 2 {
            return Err(GameError::InvalidDimension(dimension));
        }
        Ok(Board { dimension, cells: vec![0; dimension * dimension] })
    }

    /// Creates the standard starting position: two stones of each colour
    /// crossed in the centre, `Light` on the main diagonal.
    ///
    /// # Returns
    /// `Err(GameError::InvalidDimension(_))` if `dimension` is smaller than 2.
    ///
    /// # Examples
    /// ```rust
    /// use othello_mcts::Board;
    /// let board = Board::initial(4).unwrap();
    /// assert_eq!(board.to_string(), "0000\n0210\n0120\n0000\n");
    /// assert!(Board::initial(1).is_err());
    /// ```
    pub fn initial(dimension: usize) -> Result<Self, GameError>{
        let mut board = Board::new(dimension)?;
        let i = dimension / 2 - 1;

        board.set(i, i, 2);
        board.set(i + 1, i + 1, 2);
        board.set(i, i + 1, 1);
        board.set(i + 1, i, 1);
        Ok(board)
    }

    /// Builds a board from its rows, top to bottom.
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self, GameError>{
        let dimension = rows.len();
        if dimension < 2 {
            return Err(GameError::InvalidDimension(dimension));
        }
        if rows.iter().any(|row| row.len() != dimension) {
            return Err(GameError::NotSquare);
        }
        if let Some(&cell) = rows.iter().flatten().find(|&&cell| cell > 2) {
            return Err(GameError::InvalidCell(cell));
        }

        Ok(Board { dimension, cells: rows.into_iter().flatten().collect() })
    }

    /// Number of rows (and columns).
    #[inline]
    pub fn dimension(&self) -> usize{
        self.dimension
    }

    /// Returns the cell at (`column`, `row`), or `None` outside the board.
    #[inline]
    pub fn get(&self, column: usize, row: usize) -> Option<u8>{
        if column < self.dimension && row < self.dimension {
            Some(self.cells[row * self.dimension + column])
        }
        else{ None }
    }

    #[inline]
    fn set(&mut self, column: usize, row: usize, value: u8){
        self.cells[row * self.dimension + column] = value;
    }

    /// Counts stones as (`Dark`, `Light`).
    pub fn score(&self) -> (u32, u32){
        self.cells.iter().fold((0, 0), |(dark, light), &cell| match cell {
            1 => (dark + 1, light),
            2 => (dark, light + 1),
            _ => (dark, light)
        })
    }

    /// Finds every line of opponent stones that `player` would capture by
    /// playing (`column`, `row`). Each line lists the squares to flip.
    pub fn find_lines(&self, column: usize, row: usize, player: Player) -> Vec<Vec<(usize, usize)>>{
        let own = player.index();
        let mut lines = Vec::new();

        for (dx, dy) in DIRECTIONS {
            let mut line = Vec::new();
            let mut found = false;
            let mut u = column as isize + dx;
            let mut v = row as isize + dy;

            while let Some(cell) = self.get_signed(u, v) {
                if cell == 0 {
                    break;
                }
                if cell == own {
                    found = true;
                    break;
                }
                line.push((u as usize, v as usize));
                u += dx;
                v += dy;
            }

            if found && !line.is_empty() {
                lines.push(line);
            }
        }

        lines
    }

    #[inline]
    fn get_signed(&self, column: isize, row: isize) -> Option<u8>{
        if column < 0 || row < 0 {
            None
        }
        else{
            self.get(column as usize, row as usize)
        }
    }
}

impl fmt::Display for Board{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.dimension) {
            for cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The Othello rule engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct Othello;

impl RuleEngine for Othello{
    type State = Board;

    /// Moves are listed column by column, top to bottom within a column.
    fn legal_moves(&self, state: &Board, player: Player) -> Vec<Move>{
        let dimension = state.dimension();
        let mut moves = Vec::new();

        for column in 0..dimension {
            for row in 0..dimension {
                if state.get(column, row) == Some(0) && !state.find_lines(column, row, player).is_empty() {
                    moves.push(Move::new(column, row));
                }
            }
        }

        moves
    }

    fn apply_move(&self, state: &Board, player: Player, mv: Move) -> Board{
        let mut board = state.clone();

        for line in state.find_lines(mv.column, mv.row, player) {
            for (u, v) in line {
                board.set(u, v, player.index());
            }
        }
        board.set(mv.column, mv.row, player.index());

        board
    }

    fn terminal_utility(&self, state: &Board) -> f64{
        let (dark, light) = state.score();
        dark as f64 - light as f64
    }
}

/// Keeps the board and the side to move of a game in progress.
#[derive(Clone, Debug)]
pub struct OthelloGame{
    board: Board,
    current_player: Player
}

impl OthelloGame{
    /// Starts a game on the standard starting position, `Dark` to move.
    pub fn new(dimension: usize) -> Result<Self, GameError>{
        Ok(OthelloGame { board: Board::initial(dimension)?, current_player: Player::Dark })
    }

    /// Resumes a game from an arbitrary position.
    pub fn from_board(board: Board, current_player: Player) -> Self{
        OthelloGame { board, current_player }
    }

    #[inline]
    pub fn board(&self) -> &Board{
        &self.board
    }

    #[inline]
    pub fn current_player(&self) -> Player{
        self.current_player
    }

    pub fn legal_moves(&self) -> Vec<Move>{
        Othello.legal_moves(&self.board, self.current_player)
    }

    /// The game is over when the player to move cannot place a stone.
    pub fn is_over(&self) -> bool{
        self.legal_moves().is_empty()
    }

    /// Stone counts as (`Dark`, `Light`).
    pub fn score(&self) -> (u32, u32){
        self.board.score()
    }

    /// Plays `mv` for the current player and hands the turn over.
    ///
    /// # Returns
    /// `Err(GameError::OutOfBounds{..})` outside the board,
    /// `Err(GameError::OccupiedSquare{..})` on a non-empty square,
    /// `Err(GameError::NoCapture{..})` if the placement flips nothing.
    pub fn play(&mut self, mv: Move) -> Result<(), GameError>{
        let Move { column, row } = mv;

        match self.board.get(column, row) {
            None => return Err(GameError::OutOfBounds { column, row }),
            Some(0) => {},
            Some(_) => return Err(GameError::OccupiedSquare { column, row })
        }
        if self.board.find_lines(column, row, self.current_player).is_empty() {
            return Err(GameError::NoCapture { column, row });
        }

        self.board = Othello.apply_move(&self.board, self.current_player, mv);
        self.current_player = self.current_player.opponent();
        Ok(())
    }

    /// Plays the game to the end, asking `dark` and `light` for their moves
    /// in turn.
    ///
    /// # Returns
    /// The final stone counts as (`Dark`, `Light`), or the first error
    /// raised by a callback or by an illegal move.
    pub fn play_out<D, L>(&mut self, mut dark: D, mut light: L) -> Result<(u32, u32), GameError>
    where
        D: FnMut(&Board, Player) -> Result<Move, MctsError>,
        L: FnMut(&Board, Player) -> Result<Move, MctsError>
    {
        while !self.is_over() {
            let player = self.current_player;
            let mv = match player {
                Player::Dark => dark(&self.board, player)?,
                Player::Light => light(&self.board, player)?
            };

            debug!(?player, %mv, "othello move");
            self.play(mv)?;
        }

        let (dark_score, light_score) = self.score();
        debug!(dark = dark_score, light = light_score, "othello game over");
        Ok((dark_score, light_score))
    }
}
