//! Checkers game state: grid, piece counts and move history.
//!
//! The board owns every piece on it and exposes the three operations the
//! agents are built on: move generation ([`Board::legal_moves`]), move
//! application ([`Board::apply`]) and end-of-game detection
//! ([`Board::winner`]).
//!
//! Captures are compulsory. A capture may chain through several jumps in a
//! single move; every landing square of a chain is offered as a move of its
//! own, so a player may also stop part-way through.

use std::fmt;

use thiserror::Error;

use crate::constants::{
    CELLS, MAX_MOVES_WITHOUT_CAPTURE, N, REPETITION_COUNT, REPETITION_CYCLE, ROWS_OF_PIECES,
};
use crate::piece::{Piece, Position, Side};

/// Rule parameters that may vary between games.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rules {
    /// Rows filled with pieces on each side at the start.
    pub rows_of_pieces: usize,
    /// Moves without a capture before the game is drawn. Zero disables the rule.
    pub passive_limit: usize,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            rows_of_pieces: ROWS_OF_PIECES,
            passive_limit: MAX_MOVES_WITHOUT_CAPTURE,
        }
    }
}

/// A move: the piece at `from` ends on `to`, removing `captured` on the way.
///
/// An empty capture list is a simple diagonal step; otherwise its length is
/// the number of jumps in the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub captured: Vec<Piece>,
}

impl Move {
    pub fn step(from: Position, to: Position) -> Self {
        Self {
            from,
            to,
            captured: Vec::new(),
        }
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        !self.captured.is_empty()
    }

    /// Same origin and destination, regardless of what was captured.
    #[inline]
    pub fn same_path(&self, other: &Move) -> bool {
        self.from == other.from && self.to == other.to
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.is_capture() { 'x' } else { '-' };
        write!(f, "{}{sep}{}", self.from, self.to)
    }
}

/// Result of [`Board::winner`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The game goes on.
    Ongoing,
    Win(Side),
    Draw,
}

impl Outcome {
    #[inline]
    pub fn is_over(self) -> bool {
        self != Outcome::Ongoing
    }
}

/// Reasons a move cannot be applied to the current board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("{0} is off the board")]
    OutOfBounds(Position),
    #[error("no piece on {0}")]
    NoPiece(Position),
    #[error("destination {0} is occupied")]
    Occupied(Position),
    #[error("captured piece on {0} does not match the board")]
    CaptureMismatch(Position),
}

/// Errors from [`Board::from_diagram`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagramError {
    #[error("wrong number of rows: {0}")]
    RowCount(usize),
    #[error("row {0} has the wrong number of cells")]
    RowLength(usize),
    #[error("unknown symbol {0:?}")]
    Symbol(char),
}

/// A checkers board, also used as the game state by the agents.
#[derive(Clone, Debug)]
pub struct Board {
    cells: [Option<Piece>; CELLS],
    /// Pieces per side, indexed by [`slot`]. Kings are included.
    pieces: [usize; 2],
    kings: [usize; 2],
    history: Vec<Move>,
    rules: Rules,
}

#[inline]
fn slot(side: Side) -> usize {
    match side {
        Side::White => 0,
        Side::Black => 1,
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Standard starting layout with default rules.
    pub fn new() -> Self {
        Self::with_rules(Rules::default())
    }

    /// Starting layout: `rules.rows_of_pieces` rows per side on the dark cells.
    pub fn with_rules(rules: Rules) -> Self {
        let rows = rules.rows_of_pieces;
        let pieces = (0..N)
            .flat_map(|row| (0..N).map(move |col| (row, col)))
            .filter(|&(row, col)| (row + col) % 2 != 0)
            .filter_map(|(row, col)| {
                if row < rows {
                    Some(Piece::man(row, col, Side::Black))
                } else if row >= N.saturating_sub(rows) {
                    Some(Piece::man(row, col, Side::White))
                } else {
                    None
                }
            });
        Self::from_pieces(rules, pieces)
    }

    /// Board holding exactly `pieces` and an empty history.
    ///
    /// A later piece on an already occupied cell replaces the earlier one.
    /// Pieces off the board are a programming error and are dropped in
    /// release builds.
    pub fn from_pieces(rules: Rules, pieces: impl IntoIterator<Item = Piece>) -> Self {
        let mut board = Board {
            cells: [None; CELLS],
            pieces: [0; 2],
            kings: [0; 2],
            history: Vec::new(),
            rules,
        };
        for piece in pieces {
            let pos = piece.position;
            debug_assert!(pos.row < N && pos.col < N, "piece off the board at {pos:?}");
            if pos.row < N && pos.col < N {
                board.cells[pos.index()] = Some(piece);
            }
        }
        board.recount();
        board
    }

    /// Parse a diagram of `N` rows (top first) of `.`, `w`, `b`, `W`, `B`.
    ///
    /// Rows are separated by whitespace; the format matches the grid part of
    /// this type's `Display` output without the labels.
    pub fn from_diagram(rules: Rules, diagram: &str) -> Result<Self, DiagramError> {
        let rows: Vec<&str> = diagram.split_whitespace().collect();
        if rows.len() != N {
            return Err(DiagramError::RowCount(rows.len()));
        }
        let mut pieces = Vec::new();
        for (row, line) in rows.iter().enumerate() {
            if line.chars().count() != N {
                return Err(DiagramError::RowLength(row));
            }
            for (col, ch) in line.chars().enumerate() {
                let piece = match ch {
                    '.' => continue,
                    'w' => Piece::man(row, col, Side::White),
                    'W' => Piece::king(row, col, Side::White),
                    'b' => Piece::man(row, col, Side::Black),
                    'B' => Piece::king(row, col, Side::Black),
                    other => return Err(DiagramError::Symbol(other)),
                };
                pieces.push(piece);
            }
        }
        Ok(Self::from_pieces(rules, pieces))
    }

    fn recount(&mut self) {
        self.pieces = [0; 2];
        self.kings = [0; 2];
        for piece in self.cells.iter().flatten() {
            self.pieces[slot(piece.side)] += 1;
            if piece.king {
                self.kings[slot(piece.side)] += 1;
            }
        }
    }

    fn counts_match_grid(&self) -> bool {
        Side::ALL.iter().all(|&side| {
            self.pieces(side).count() == self.count(side)
                && self.pieces(side).filter(|p| p.king).count() == self.kings(side)
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn rules(&self) -> Rules {
        self.rules
    }

    #[inline]
    pub fn piece_at(&self, pos: Position) -> Option<&Piece> {
        if pos.row >= N || pos.col >= N {
            return None;
        }
        self.cells[pos.index()].as_ref()
    }

    /// Pieces of `side` in row-major order.
    pub fn pieces(&self, side: Side) -> impl Iterator<Item = Piece> + '_ {
        self.cells
            .iter()
            .flatten()
            .filter(move |p| p.side == side)
            .copied()
    }

    /// Pieces of `side` on the board, kings included.
    #[inline]
    pub fn count(&self, side: Side) -> usize {
        self.pieces[slot(side)]
    }

    #[inline]
    pub fn kings(&self, side: Side) -> usize {
        self.kings[slot(side)]
    }

    pub fn total_pieces(&self) -> usize {
        self.pieces.iter().sum()
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.history.last()
    }

    // -------------------------------------------------------------------------
    // Move generation
    // -------------------------------------------------------------------------

    /// All legal moves for `side`, capturing moves only if any capture exists.
    ///
    /// Pieces are scanned row-major and directions in [`DIRECTIONS`] order, so
    /// the result is deterministic for a given board.
    ///
    /// [`DIRECTIONS`]: crate::constants::DIRECTIONS
    pub fn legal_moves(&self, side: Side) -> Vec<Move> {
        let mut moves = Vec::new();
        for piece in self.pieces(side) {
            self.piece_moves(&piece, &mut moves);
        }
        if moves.iter().any(Move::is_capture) {
            moves.retain(Move::is_capture);
        }
        moves
    }

    /// Whether `side` has at least one legal move.
    pub fn has_legal_move(&self, side: Side) -> bool {
        let mut scratch = Vec::new();
        self.pieces(side).any(|piece| {
            self.piece_moves(&piece, &mut scratch);
            !scratch.is_empty()
        })
    }

    fn piece_moves(&self, piece: &Piece, out: &mut Vec<Move>) {
        let mut chain = Vec::new();
        for dir in piece.directions() {
            let Some(next) = piece.position.offset(dir, 1) else {
                continue;
            };
            if self.cells[next.index()].is_none() {
                out.push(Move::step(piece.position, next));
            } else {
                self.jump(piece, piece.position, dir, &mut chain, out);
            }
        }
    }

    /// Try a jump from `at` along `dir`. On success the move is recorded and
    /// the chain is followed from the landing cell in every direction the
    /// piece may use.
    fn jump(
        &self,
        piece: &Piece,
        at: Position,
        dir: (isize, isize),
        chain: &mut Vec<Piece>,
        out: &mut Vec<Move>,
    ) {
        let (Some(over), Some(landing)) = (at.offset(dir, 1), at.offset(dir, 2)) else {
            return;
        };
        let Some(victim) = self.cells[over.index()] else {
            return;
        };
        if victim.side == piece.side || chain.iter().any(|c| c.position == over) {
            return;
        }
        // The moving piece has left its origin, so that cell counts as empty.
        if landing != piece.position && self.cells[landing.index()].is_some() {
            return;
        }

        chain.push(victim);
        out.push(Move {
            from: piece.position,
            to: landing,
            captured: chain.clone(),
        });
        for next_dir in piece.directions() {
            self.jump(piece, landing, next_dir, chain, out);
        }
        chain.pop();
    }

    // -------------------------------------------------------------------------
    // Move application
    // -------------------------------------------------------------------------

    /// Apply `mv`, panicking if it does not fit the board.
    ///
    /// Applying a move that was not produced for this exact board is a
    /// programming error; use [`Board::try_apply`] to check first.
    pub fn apply(&mut self, mv: &Move) {
        if let Err(err) = self.try_apply(mv) {
            panic!("illegal move {mv}: {err}");
        }
    }

    /// Apply `mv` if it fits the board. The board is unchanged on error.
    pub fn try_apply(&mut self, mv: &Move) -> Result<(), MoveError> {
        self.validate(mv)?;

        let Some(mut piece) = self.cells[mv.from.index()].take() else {
            return Err(MoveError::NoPiece(mv.from));
        };
        for captured in &mv.captured {
            self.remove(captured.position);
        }

        piece.position = mv.to;
        if !piece.king && mv.to.row == piece.side.promotion_row() {
            piece.king = true;
            self.kings[slot(piece.side)] += 1;
        }
        self.cells[mv.to.index()] = Some(piece);
        self.history.push(mv.clone());

        debug_assert!(self.counts_match_grid(), "piece counts out of sync after {mv}");
        Ok(())
    }

    fn validate(&self, mv: &Move) -> Result<(), MoveError> {
        for pos in [mv.from, mv.to] {
            if pos.row >= N || pos.col >= N {
                return Err(MoveError::OutOfBounds(pos));
            }
        }
        let Some(mover) = self.cells[mv.from.index()] else {
            return Err(MoveError::NoPiece(mv.from));
        };
        if mv.to != mv.from && self.cells[mv.to.index()].is_some() {
            return Err(MoveError::Occupied(mv.to));
        }
        for (i, captured) in mv.captured.iter().enumerate() {
            let pos = captured.position;
            let on_board = self.piece_at(pos);
            let duplicate = mv.captured[..i].iter().any(|c| c.position == pos);
            if on_board != Some(captured) || captured.side == mover.side || duplicate {
                return Err(MoveError::CaptureMismatch(pos));
            }
        }
        Ok(())
    }

    fn remove(&mut self, pos: Position) {
        if let Some(piece) = self.cells[pos.index()].take() {
            self.pieces[slot(piece.side)] -= 1;
            if piece.king {
                self.kings[slot(piece.side)] -= 1;
            }
        }
    }

    // -------------------------------------------------------------------------
    // End of game
    // -------------------------------------------------------------------------

    /// The winner, a draw, or [`Outcome::Ongoing`].
    ///
    /// A side without pieces or without legal moves loses. Otherwise the game
    /// is drawn by move repetition or by too many moves without a capture.
    pub fn winner(&self) -> Outcome {
        for side in [Side::Black, Side::White] {
            if self.count(side) == 0 || !self.has_legal_move(side) {
                return Outcome::Win(side.opponent());
            }
        }
        if self.repetition_happened() || self.passive_game() {
            Outcome::Draw
        } else {
            Outcome::Ongoing
        }
    }

    /// The last moves are the same short cycle played several times in a row.
    pub fn repetition_happened(&self) -> bool {
        let window = REPETITION_CYCLE * REPETITION_COUNT;
        if self.history.len() < window {
            return false;
        }
        let recent = &self.history[self.history.len() - window..];
        let cycle = &recent[..REPETITION_CYCLE];
        recent
            .chunks_exact(REPETITION_CYCLE)
            .all(|chunk| chunk.iter().zip(cycle).all(|(a, b)| a.same_path(b)))
    }

    /// No capture in the last `passive_limit` moves.
    pub fn passive_game(&self) -> bool {
        let limit = self.rules.passive_limit;
        if limit == 0 || self.history.len() < limit {
            return false;
        }
        self.history[self.history.len() - limit..]
            .iter()
            .all(|mv| !mv.is_capture())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..N {
            write!(f, "{:>2} |", N - row)?;
            for col in 0..N {
                let ch = self
                    .piece_at(Position::new(row, col))
                    .map_or('.', Piece::symbol);
                write!(f, " {ch}")?;
            }
            writeln!(f)?;
        }
        write!(f, "    ")?;
        for col in 0..N {
            write!(f, " {}", crate::constants::FILES[col] as char)?;
        }
        writeln!(f)
    }
}

// =============================================================================
// Free-function interface
// =============================================================================

/// Standard starting position.
pub fn new_game_state() -> Board {
    Board::new()
}

pub fn legal_moves(board: &Board, side: Side) -> Vec<Move> {
    board.legal_moves(side)
}

/// Apply `mv` to a copy of `board` and return it.
pub fn apply(board: &Board, mv: &Move) -> Board {
    let mut next = board.clone();
    next.apply(mv);
    next
}

pub fn winner(board: &Board) -> Outcome {
    board.winner()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagram(rows: &[&str]) -> Board {
        Board::from_diagram(Rules::default(), &rows.join("\n")).unwrap()
    }

    #[cfg(feature = "board8x8")]
    #[test]
    fn test_starting_layout() {
        let board = Board::new();
        assert_eq!(board.count(Side::White), 12);
        assert_eq!(board.count(Side::Black), 12);
        assert_eq!(board.kings(Side::White), 0);
        assert!(board.history().is_empty());
        assert_eq!(board.piece_at(Position::new(0, 1)).map(|p| p.side), Some(Side::Black));
        assert_eq!(board.piece_at(Position::new(7, 0)).map(|p| p.side), Some(Side::White));
        assert!(board.piece_at(Position::new(0, 0)).is_none());
        assert!(board.piece_at(Position::new(3, 2)).is_none());
    }

    #[cfg(feature = "board8x8")]
    #[test]
    fn test_opening_moves() {
        let board = Board::new();
        // Four front-row men, seven diagonal steps for either side.
        assert_eq!(board.legal_moves(Side::White).len(), 7);
        assert_eq!(board.legal_moves(Side::Black).len(), 7);
        assert!(board.legal_moves(Side::White).iter().all(|m| !m.is_capture()));
    }

    #[cfg(feature = "board8x8")]
    #[test]
    fn test_diagram_roundtrip_with_display() {
        let board = Board::new();
        let text = board.to_string();
        let grid: Vec<String> = text
            .lines()
            .take(N)
            .map(|line| line.split('|').nth(1).unwrap().split_whitespace().collect())
            .collect();
        let parsed = Board::from_diagram(Rules::default(), &grid.join("\n")).unwrap();
        for side in Side::ALL {
            assert!(parsed.pieces(side).eq(board.pieces(side)));
        }
    }

    #[cfg(feature = "board8x8")]
    #[test]
    fn test_diagram_errors() {
        assert_eq!(
            Board::from_diagram(Rules::default(), "........").err(),
            Some(DiagramError::RowCount(1))
        );
        let mut rows = vec!["........"; N];
        rows[2] = "...x....";
        assert_eq!(
            Board::from_diagram(Rules::default(), &rows.join(" ")).err(),
            Some(DiagramError::Symbol('x'))
        );
        rows[2] = "...";
        assert_eq!(
            Board::from_diagram(Rules::default(), &rows.join(" ")).err(),
            Some(DiagramError::RowLength(2))
        );
    }

    #[cfg(feature = "board8x8")]
    #[test]
    fn test_double_jump_is_offered_with_partial_chain() {
        let board = diagram(&[
            "........",
            "........",
            "........",
            "...b....",
            "........",
            ".b......",
            "w.......",
            "........",
        ]);
        let moves = board.legal_moves(Side::White);
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0].to, Position::new(4, 2));
        assert_eq!(moves[0].captured.len(), 1);
        assert_eq!(moves[1].to, Position::new(2, 4));
        assert_eq!(
            moves[1].captured.iter().map(|p| p.position).collect::<Vec<_>>(),
            vec![Position::new(5, 1), Position::new(3, 3)]
        );
    }

    #[cfg(feature = "board8x8")]
    #[test]
    fn test_friendly_piece_blocks_jump() {
        let board = diagram(&[
            "........",
            "........",
            "........",
            "........",
            "..w.....",
            ".b......",
            "w.......",
            "........",
        ]);
        let moves = board.legal_moves(Side::White);
        assert!(moves.iter().all(|m| !m.is_capture()));
    }

    #[cfg(feature = "board8x8")]
    #[test]
    fn test_men_do_not_capture_backwards() {
        let board = diagram(&[
            "........",
            "........",
            "........",
            "...w....",
            "..b.....",
            "........",
            "........",
            "........",
        ]);
        assert!(board.legal_moves(Side::White).iter().all(|m| !m.is_capture()));
        // Black advances downward, away from the white man.
        let black = board.legal_moves(Side::Black);
        assert!(black.iter().all(|m| !m.is_capture()));
    }

    #[cfg(feature = "board8x8")]
    #[test]
    fn test_king_chain_never_recaptures() {
        let board = diagram(&[
            "........",
            "........",
            "..b.b...",
            "........",
            "..b.b...",
            "...W....",
            "........",
            "........",
        ]);
        let moves = board.legal_moves(Side::White);
        assert!(!moves.is_empty());
        for mv in &moves {
            let mut seen: Vec<Position> = mv.captured.iter().map(|p| p.position).collect();
            let len = seen.len();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), len, "{mv} captures a piece twice");
        }
        // Around the ring and back to the origin.
        assert!(moves.iter().any(|m| m.captured.len() == 4 && m.to == m.from));
    }

    #[cfg(feature = "board8x8")]
    #[test]
    fn test_apply_capture_updates_counts() {
        let mut board = diagram(&[
            "........",
            "........",
            "........",
            "........",
            "........",
            ".B......",
            "w.......",
            "........",
        ]);
        let mv = board.legal_moves(Side::White).remove(0);
        board.apply(&mv);
        assert_eq!(board.count(Side::Black), 0);
        assert_eq!(board.kings(Side::Black), 0);
        assert_eq!(board.piece_at(Position::new(4, 2)).map(|p| p.side), Some(Side::White));
        assert!(board.piece_at(Position::new(6, 0)).is_none());
        assert_eq!(board.last_move(), Some(&mv));
        assert_eq!(board.winner(), Outcome::Win(Side::White));
    }

    #[cfg(feature = "board8x8")]
    #[test]
    fn test_try_apply_rejects_without_mutation() {
        let mut board = Board::new();
        let before = board.to_string();

        let empty = Move::step(Position::new(4, 1), Position::new(3, 0));
        assert_eq!(board.try_apply(&empty), Err(MoveError::NoPiece(Position::new(4, 1))));

        let blocked = Move::step(Position::new(7, 0), Position::new(6, 1));
        assert_eq!(board.try_apply(&blocked), Err(MoveError::Occupied(Position::new(6, 1))));

        let bogus = Move {
            from: Position::new(5, 0),
            to: Position::new(3, 2),
            captured: vec![Piece::man(4, 1, Side::Black)],
        };
        assert_eq!(
            board.try_apply(&bogus),
            Err(MoveError::CaptureMismatch(Position::new(4, 1)))
        );

        let off = Move::step(Position::new(5, 0), Position::new(N, 1));
        assert_eq!(board.try_apply(&off), Err(MoveError::OutOfBounds(Position::new(N, 1))));

        assert_eq!(board.to_string(), before);
        assert!(board.history().is_empty());
    }

    #[test]
    #[should_panic(expected = "illegal move")]
    fn test_apply_illegal_move_panics() {
        let mut board = Board::from_pieces(Rules::default(), std::iter::empty());
        board.apply(&Move::step(Position::new(3, 3), Position::new(2, 2)));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "piece off the board")]
    fn test_from_pieces_rejects_off_board_column() {
        Board::from_pieces(Rules::default(), [Piece::man(0, N, Side::Black)]);
    }

    #[test]
    fn test_passive_game_limit() {
        let rules = Rules {
            passive_limit: 4,
            ..Rules::default()
        };
        let mut board = Board::from_pieces(
            rules,
            [Piece::king(2, 1, Side::White), Piece::king(N - 2, N - 1, Side::Black)],
        );
        let shuffle = [
            Move::step(Position::new(2, 1), Position::new(3, 2)),
            Move::step(Position::new(N - 2, N - 1), Position::new(N - 3, N - 2)),
            Move::step(Position::new(3, 2), Position::new(2, 1)),
        ];
        for mv in &shuffle {
            board.apply(mv);
            assert_eq!(board.winner(), Outcome::Ongoing);
        }
        board.apply(&Move::step(Position::new(N - 3, N - 2), Position::new(N - 2, N - 1)));
        assert!(board.passive_game());
        assert_eq!(board.winner(), Outcome::Draw);
    }

    #[test]
    fn test_passive_limit_zero_disables_rule() {
        let rules = Rules {
            passive_limit: 0,
            ..Rules::default()
        };
        let mut board = Board::from_pieces(
            rules,
            [Piece::king(2, 1, Side::White), Piece::king(N - 2, N - 1, Side::Black)],
        );
        board.apply(&Move::step(Position::new(2, 1), Position::new(3, 2)));
        assert!(!board.passive_game());
    }

    #[test]
    fn test_move_display() {
        let step = Move::step(Position::new(N - 1, 0), Position::new(N - 2, 1));
        assert_eq!(step.to_string(), "a1-b2");
        let jump = Move {
            from: Position::new(N - 1, 0),
            to: Position::new(N - 3, 2),
            captured: vec![Piece::man(N - 2, 1, Side::Black)],
        };
        assert_eq!(jump.to_string(), "a1xc3");
    }
}
