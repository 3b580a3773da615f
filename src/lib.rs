//! Checkers engine: rules, alpha-beta search and Monte Carlo tree search.
//!
//! The board is `N`x`N` (8 by default, 10 with the `board10x10` feature).
//! Pieces move diagonally on dark squares, captures are mandatory and chain
//! through multi-jumps, and men reaching the far row become kings.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions and engine parameters
//! - [`piece`] - Sides, positions and pieces
//! - [`board`] - Game state, move generation and end-of-game detection
//! - [`evaluate`] - Static evaluation for the alpha-beta searcher
//! - [`alphabeta`] - Minimax with alpha-beta pruning
//! - [`mcts`] - Monte Carlo Tree Search with UCT
//! - [`playout`] - Random game simulation for leaf evaluation
//! - [`agent`] - Move-choosing policies behind the [`Agent`](agent::Agent) trait
//! - [`game`] - Driver running two agents against each other
//!
//! ## Example
//!
//! ```
//! use checkers_engine::board::Board;
//! use checkers_engine::alphabeta::AlphaBeta;
//! use checkers_engine::piece::Side;
//!
//! let mut board = Board::new();
//! let mut searcher = AlphaBeta::with_depth(Side::White, 3);
//!
//! let mv = searcher.select_move(&board).expect("white can move");
//! board.apply(&mv);
//! println!("White plays {mv}\n{board}");
//! ```

pub mod agent;
pub mod alphabeta;
pub mod board;
pub mod constants;
pub mod evaluate;
pub mod game;
pub mod mcts;
pub mod piece;
pub mod playout;

pub use board::{Board, Move, Outcome, Rules};
pub use piece::{Piece, Position, Side};
