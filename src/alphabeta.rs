//! Depth-limited minimax search with alpha-beta pruning.
//!
//! Every node clones the board, applies one move and recurses; there is no
//! transposition table, so each subtree is explored from scratch. Leaves are
//! scored with the [`Evaluator`] from the searching side's point of view.
//!
//! Terminal scores prefer quick wins and slow losses:
//! - win: `WIN_SCORE - depth`
//! - loss: `-WIN_SCORE + depth`
//! - draw: `depth`

use log::debug;

use crate::board::{Board, Move, Outcome};
use crate::constants::{SEARCH_DEPTH, WIN_SCORE};
use crate::evaluate::Evaluator;
use crate::piece::Side;

/// A scored candidate produced by the search.
#[derive(Clone, Debug)]
pub struct Choice {
    /// Root move leading to this value, `None` for a position searched as a leaf.
    pub mv: Option<Move>,
    pub value: i32,
    /// Ply at which the value was produced.
    pub depth: u32,
}

/// Alpha-beta searcher playing for one side.
#[derive(Clone, Debug)]
pub struct AlphaBeta {
    pub side: Side,
    /// Plies to look ahead. Depth 0 and 1 both score the replies statically.
    pub depth: u32,
    pub evaluator: Evaluator,
    nodes: u64,
}

impl AlphaBeta {
    pub fn new(side: Side) -> Self {
        Self::with_depth(side, SEARCH_DEPTH)
    }

    pub fn with_depth(side: Side, depth: u32) -> Self {
        Self {
            side,
            depth,
            evaluator: Evaluator::default(),
            nodes: 0,
        }
    }

    pub fn with_evaluator(mut self, evaluator: Evaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Positions visited by the last call to [`AlphaBeta::select_move`].
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Best move for `self.side`, or `None` if it has no legal move.
    pub fn select_move(&mut self, board: &Board) -> Option<Move> {
        self.nodes = 0;
        let choice = self.search(board, true, self.side, 0, -WIN_SCORE, WIN_SCORE);
        debug!(
            "alpha-beta {}: value {} found at depth {} ({} nodes)",
            self.side, choice.value, choice.depth, self.nodes
        );
        choice.mv
    }

    /// Recursive minimax step.
    ///
    /// `maximizing` is true on plies where `self.side` moves. Returns as soon
    /// as `alpha >= beta`.
    pub fn search(
        &mut self,
        board: &Board,
        maximizing: bool,
        to_move: Side,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
    ) -> Choice {
        self.nodes += 1;

        if depth > 0 {
            if let Some(value) = self.terminal_value(board, depth) {
                return Choice {
                    mv: None,
                    value,
                    depth,
                };
            }
        }

        let mut best: Option<Choice> = None;
        for mv in board.legal_moves(to_move) {
            let mut child = board.clone();
            child.apply(&mv);
            let mut result =
                self.search(&child, !maximizing, to_move.opponent(), depth + 1, alpha, beta);
            result.mv = Some(mv);

            if maximizing {
                alpha = alpha.max(result.value);
                if alpha >= beta {
                    return result;
                }
                if best.as_ref().is_none_or(|b| result.value > b.value) {
                    best = Some(result);
                }
            } else {
                beta = beta.min(result.value);
                if alpha >= beta {
                    return result;
                }
                if best.as_ref().is_none_or(|b| result.value < b.value) {
                    best = Some(result);
                }
            }
        }

        // No legal move only happens at a root that is already lost.
        best.unwrap_or_else(|| Choice {
            mv: None,
            value: self.evaluator.evaluate(board, self.side),
            depth,
        })
    }

    fn terminal_value(&self, board: &Board, depth: u32) -> Option<i32> {
        let d = depth as i32;
        match board.winner() {
            Outcome::Win(side) if side == self.side => Some(WIN_SCORE - d),
            Outcome::Win(_) => Some(-WIN_SCORE + d),
            Outcome::Draw => Some(d),
            Outcome::Ongoing if depth >= self.depth.max(1) => {
                Some(self.evaluator.evaluate(board, self.side))
            }
            Outcome::Ongoing => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Rules;
    use crate::constants::N;
    use crate::piece::{Piece, Position};

    fn quiet(side: Side, depth: u32) -> AlphaBeta {
        AlphaBeta::with_depth(side, depth).with_evaluator(Evaluator::default().without_noise())
    }

    #[test]
    fn test_depth_zero_maximizes_static_eval() {
        let board = Board::new();
        let mut searcher = quiet(Side::White, 0);
        let mv = searcher.select_move(&board).unwrap();

        let eval = Evaluator::default().without_noise();
        let score = |m: &Move| {
            let mut b = board.clone();
            b.apply(m);
            eval.evaluate(&b, Side::White)
        };
        let best = board.legal_moves(Side::White).iter().map(score).max().unwrap();
        assert_eq!(score(&mv), best);
    }

    #[test]
    fn test_forced_capture_is_the_only_choice() {
        let board = Board::from_pieces(
            Rules::default(),
            [
                Piece::man(N - 1, 2, Side::White),
                Piece::man(N - 2, 3, Side::Black),
                Piece::man(N - 1, 6, Side::White),
            ],
        );
        for depth in 1..=4 {
            let mv = quiet(Side::White, depth).select_move(&board).unwrap();
            assert_eq!(mv.captured.len(), 1);
            assert_eq!(mv.to, Position::new(N - 3, 4));
        }
    }

    #[test]
    fn test_no_move_returns_none() {
        let board = Board::from_pieces(Rules::default(), [Piece::man(0, 1, Side::Black)]);
        assert!(quiet(Side::White, 3).select_move(&board).is_none());
    }

    #[test]
    fn test_prefers_faster_win() {
        let mut searcher = quiet(Side::White, 4);
        let won = Board::from_pieces(Rules::default(), [Piece::man(0, 1, Side::White)]);
        assert_eq!(searcher.terminal_value(&won, 1), Some(WIN_SCORE - 1));
        assert_eq!(searcher.terminal_value(&won, 3), Some(WIN_SCORE - 3));
        searcher.side = Side::Black;
        assert_eq!(searcher.terminal_value(&won, 2), Some(-WIN_SCORE + 2));
    }
}
