//! A Monte Carlo Tree Search (MCTS) decision engine for two-player,
//! perfect-information board games with Othello-like capture rules.
//!
//! For every decision a fresh search tree is grown from the current position
//! by repeated rollouts (UCT selection, expansion of one untried move,
//! uniformly random simulation to the end of the game and backpropagation of
//! the final score), and the most visited move at the root is returned.
//! Every random choice goes through one injectable [`RandomSource`], so a
//! seeded generator gives reproducible decisions.
//!
//! # Modules
//! - `game`: Players, moves and the `RuleEngine` trait consumed by the search.
//! - `tree`: The arena-backed search tree.
//! - `mcts`: Selection, expansion, simulation, backpropagation and the decision driver.
//! - `config`: Validated search configuration, loadable from TOML.
//! - `othello`: An Othello rule engine for square boards and a game manager.
//! - `error`: Error types.
//! - `utils`: The random source abstraction.
//! - `test_utils`: Fixtures for testing the search.
//!
//! # Examples
//! ```rust
//! use rand::{rngs::StdRng, SeedableRng};
//! use othello_mcts::{Mcts, MctsConfig, MctsError, OthelloGame, Othello, RuleEngine};
//!
//! fn main() -> Result<(), MctsError> {
//!     let game = OthelloGame::new(4).unwrap();
//!     let mcts = Mcts::new(Othello, MctsConfig::new(100, 5.0)?)?;
//!     let mut rng = StdRng::seed_from_u64(42);
//!
//!     // Check for the end of the game before asking for a move
//!     if !game.is_over() {
//!         let mv = mcts.decide(game.board().clone(), game.current_player(), &mut rng)?;
//!         assert!(Othello.legal_moves(game.board(), game.current_player()).contains(&mv));
//!         println!("MCTS plays {}", mv);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod tree;
mod game;
mod mcts;
mod config;
mod error;
mod othello;
pub mod utils;

#[doc(hidden)]
pub mod test_utils;

pub use tree::*;
pub use game::*;
pub use mcts::*;
pub use config::*;
pub use error::*;
pub use othello::*;
pub use utils::RandomSource;
