//! Static evaluation of a board for the alpha-beta searcher.
//!
//! The score combines material, a per-cell table for men, a proximity term
//! for kings and a random point that breaks ties between equal positions.

use crate::board::Board;
use crate::constants::{KING_BONUS, N, PIECE_VALUE, POSITIONAL_WEIGHTS};
use crate::piece::{Piece, Side};

/// Heuristic board evaluator.
#[derive(Clone, Debug)]
pub struct Evaluator {
    weights: [[i32; N]; N],
    noise: bool,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::with_weights(POSITIONAL_WEIGHTS)
    }
}

impl Evaluator {
    /// Evaluator using `weights` for men, laid out from White's point of view.
    pub fn with_weights(weights: [[i32; N]; N]) -> Self {
        Self {
            weights,
            noise: true,
        }
    }

    /// Same evaluator without the random tie-break point.
    pub fn without_noise(mut self) -> Self {
        self.noise = false;
        self
    }

    /// Score `board` for `side`. Positive means `side` is ahead.
    ///
    /// Unless disabled, a random 0 or 1 is added, so two calls on the same
    /// board may differ by one.
    pub fn evaluate(&self, board: &Board, side: Side) -> i32 {
        let mut score = self.material(board, side);
        score += self.positional(board, side);
        score -= self.positional(board, side.opponent());
        if self.noise {
            score += fastrand::i32(0..=1);
        }
        score
    }

    /// 10 per piece and 10 more per king, own minus opponent's.
    pub fn material(&self, board: &Board, side: Side) -> i32 {
        let worth = |s: Side| {
            board.count(s) as i32 * PIECE_VALUE + board.kings(s) as i32 * KING_BONUS
        };
        worth(side) - worth(side.opponent())
    }

    /// Positional score of `side`'s own pieces only.
    pub fn positional(&self, board: &Board, side: Side) -> i32 {
        board
            .pieces(side)
            .map(|piece| {
                if piece.king {
                    king_proximity(board, &piece)
                } else {
                    self.cell_weight(&piece)
                }
            })
            .sum()
    }

    fn cell_weight(&self, piece: &Piece) -> i32 {
        let pos = piece.position;
        match piece.side {
            Side::White => self.weights[pos.row][pos.col],
            Side::Black => self.weights[N - 1 - pos.row][N - 1 - pos.col],
        }
    }
}

/// `(N - 1)` minus the distance to the closest enemy piece.
///
/// Distance is rows plus half the columns, so kings are pulled toward the
/// action in the endgame instead of idling on the back rank.
fn king_proximity(board: &Board, king: &Piece) -> i32 {
    let max = N as i32 - 1;
    let nearest = board
        .pieces(king.side.opponent())
        .map(|other| {
            let dr = king.position.row.abs_diff(other.position.row) as i32;
            let dc = king.position.col.abs_diff(other.position.col) as i32;
            dr + dc / 2
        })
        .min()
        .unwrap_or(max)
        .min(max);
    max - nearest
}
