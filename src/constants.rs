//! Constants for board dimensions, rule defaults and search parameters.
//!
//! The grid is stored row-major, row 0 at the top. Black starts on the top
//! rows and White on the bottom rows.
//!
//! # Board Size Configuration
//!
//! The board size is controlled by Cargo features:
//! - `board8x8` (default): 8x8 board, three rows of pieces per side
//! - `board10x10`: 10x10 board, four rows of pieces per side
//!
//! ```sh
//! cargo build                                               # 8x8 (default)
//! cargo build --no-default-features --features board10x10   # 10x10
//! ```

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN).
#[cfg(feature = "board8x8")]
pub const N: usize = 8;

#[cfg(feature = "board10x10")]
pub const N: usize = 10;

#[cfg(all(feature = "board8x8", feature = "board10x10"))]
compile_error!("Cannot enable both 'board8x8' and 'board10x10' features at the same time");

#[cfg(not(any(feature = "board8x8", feature = "board10x10")))]
compile_error!("Must enable exactly one board size feature: 'board8x8' or 'board10x10'");

/// Number of cells on the board.
pub const CELLS: usize = N * N;

/// Rows filled with pieces on each side at the start of a game.
#[cfg(feature = "board8x8")]
pub const ROWS_OF_PIECES: usize = 3;

#[cfg(feature = "board10x10")]
pub const ROWS_OF_PIECES: usize = 4;

/// Diagonal directions as (row delta, column delta).
/// Order: up-left, up-right, down-left, down-right.
pub const DIRECTIONS: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Column letters used when printing positions.
pub const FILES: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

// =============================================================================
// Rules
// =============================================================================

/// Moves without a capture after which the game is declared a draw.
pub const MAX_MOVES_WITHOUT_CAPTURE: usize = 50;

/// Length of the move cycle checked by the repetition rule.
pub const REPETITION_CYCLE: usize = 4;

/// Number of times the cycle must appear in a row to draw.
pub const REPETITION_COUNT: usize = 3;

// =============================================================================
// Evaluation
// =============================================================================

/// Score per piece on the board.
pub const PIECE_VALUE: i32 = 10;

/// Extra score per king on top of [`PIECE_VALUE`].
pub const KING_BONUS: i32 = 10;

/// Per-cell weights for men, seen from White (advancing toward row 0).
///
/// The back row is strong, pieces about to promote are valuable and the
/// center is worth controlling. Black reads the table rotated by 180 degrees.
#[cfg(feature = "board8x8")]
pub const POSITIONAL_WEIGHTS: [[i32; N]; N] = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [2, 0, 2, 0, 2, 0, 2, 0],
    [0, 0, 0, 1, 0, 1, 0, 0],
    [0, 0, 1, 0, 1, 0, 0, 0],
    [0, 0, 0, 1, 0, 1, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0],
    [3, 0, 3, 0, 3, 0, 3, 0],
];

#[cfg(feature = "board10x10")]
pub const POSITIONAL_WEIGHTS: [[i32; N]; N] = [
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [2, 0, 2, 0, 2, 0, 2, 0, 2, 0],
    [0, 0, 0, 1, 0, 1, 0, 1, 0, 0],
    [0, 0, 1, 0, 1, 0, 1, 0, 0, 0],
    [0, 0, 0, 1, 0, 1, 0, 1, 0, 0],
    [0, 0, 1, 0, 1, 0, 1, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 0, 3, 0, 3, 0, 3, 0, 3, 0],
];

// =============================================================================
// Alpha-Beta Parameters
// =============================================================================

/// Default search depth in plies.
pub const SEARCH_DEPTH: u32 = 6;

/// Score of a won position before the depth adjustment.
pub const WIN_SCORE: i32 = 1000;

// =============================================================================
// MCTS Parameters
// =============================================================================

/// Default number of rollouts per move.
pub const N_ROLLOUTS: usize = 100;

/// UCT exploration weight.
pub const EXPLORATION_WEIGHT: f64 = 1.0;

/// Wall-clock budget for a single random rollout, in milliseconds.
pub const ROLLOUT_BUDGET_MS: u64 = 2500;

/// Reward returned when a rollout runs out of time.
pub const ABORTED_ROLLOUT_REWARD: f64 = 0.0;

/// Reward for a drawn rollout.
pub const DRAW_REWARD: f64 = 0.5;
