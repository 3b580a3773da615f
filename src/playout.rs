//! Random playouts (game simulation) used by MCTS to value a leaf.
//!
//! A playout plays uniformly random legal moves for both sides until the
//! board reports a result. Random play can shuffle kings for a long time, so
//! every playout carries a [`Deadline`] and gives up once it passes.

use std::time::{Duration, Instant};

use crate::board::{Board, Move, Outcome};
use crate::constants::DRAW_REWARD;
use crate::piece::Side;

/// Wall-clock limit for one playout.
///
/// Each playout gets its own deadline, so playouts on different threads do
/// not interfere with each other.
#[derive(Copy, Clone, Debug)]
pub struct Deadline {
    end: Instant,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            end: Instant::now() + budget,
        }
    }

    #[inline]
    pub fn expired(&self) -> bool {
        Instant::now() >= self.end
    }
}

/// How a playout ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Playout {
    Finished(Outcome),
    /// The deadline passed before the game ended.
    Aborted,
}

/// A uniformly random legal move for `side`.
pub fn random_move(board: &Board, side: Side) -> Option<Move> {
    let mut moves = board.legal_moves(side);
    if moves.is_empty() {
        return None;
    }
    let i = fastrand::usize(..moves.len());
    Some(moves.swap_remove(i))
}

/// Play random moves on `board`, `to_move` first, until the game ends.
pub fn playout(board: &mut Board, mut to_move: Side, deadline: &Deadline) -> Playout {
    loop {
        let outcome = board.winner();
        if outcome.is_over() {
            return Playout::Finished(outcome);
        }
        if deadline.expired() {
            return Playout::Aborted;
        }
        // An ongoing game means both sides can move.
        let Some(mv) = random_move(board, to_move) else {
            return Playout::Finished(Outcome::Win(to_move.opponent()));
        };
        board.apply(&mv);
        to_move = to_move.opponent();
    }
}

/// Reward in `[0, 1]` of a finished game for `side`.
pub fn reward(outcome: Outcome, side: Side) -> f64 {
    match outcome {
        Outcome::Win(winner) if winner == side => 1.0,
        Outcome::Win(_) => 0.0,
        Outcome::Draw | Outcome::Ongoing => DRAW_REWARD,
    }
}
