//! Board coordinates, sides and pieces.

use std::fmt;

use crate::constants::{FILES, N};

/// One of the two competing colors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Starts on the bottom rows and advances toward row 0.
    White,
    /// Starts on the top rows and advances toward row `N - 1`.
    Black,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::White, Side::Black];

    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Row delta of a forward step.
    #[inline]
    pub fn forward(self) -> isize {
        match self {
            Side::White => -1,
            Side::Black => 1,
        }
    }

    /// Row on which a man of this side is crowned.
    #[inline]
    pub fn promotion_row(self) -> usize {
        match self {
            Side::White => 0,
            Side::Black => N - 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => f.write_str("white"),
            Side::Black => f.write_str("black"),
        }
    }
}

/// A cell on the board, `(row, col)` with row 0 at the top.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Index into a row-major flattened grid.
    #[inline]
    pub fn index(self) -> usize {
        self.row * N + self.col
    }

    /// Move `steps` cells along a diagonal, or `None` when that leaves the board.
    pub fn offset(self, (dr, dc): (isize, isize), steps: isize) -> Option<Position> {
        let row = self.row as isize + dr * steps;
        let col = self.col as isize + dc * steps;
        if (0..N as isize).contains(&row) && (0..N as isize).contains(&col) {
            Some(Position::new(row as usize, col as usize))
        } else {
            None
        }
    }
}

/// Prints as file letter plus rank counted from the bottom, e.g. `a1` for the
/// bottom-left corner.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = FILES.get(self.col).copied().unwrap_or(b'?') as char;
        write!(f, "{file}{}", N as isize - self.row as isize)
    }
}

/// A checkers piece. Moving it changes `position`, never its identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub position: Position,
    pub side: Side,
    pub king: bool,
}

impl Piece {
    pub fn man(row: usize, col: usize, side: Side) -> Self {
        Self {
            position: Position::new(row, col),
            side,
            king: false,
        }
    }

    pub fn king(row: usize, col: usize, side: Side) -> Self {
        Self {
            king: true,
            ..Self::man(row, col, side)
        }
    }

    /// Directions this piece may travel in, in scan order.
    pub fn directions(&self) -> impl Iterator<Item = (isize, isize)> + '_ {
        crate::constants::DIRECTIONS
            .into_iter()
            .filter(move |&(dr, _)| self.king || dr == self.side.forward())
    }

    /// Single-character symbol: `w`/`b` for men, `W`/`B` for kings.
    pub fn symbol(&self) -> char {
        match (self.side, self.king) {
            (Side::White, false) => 'w',
            (Side::White, true) => 'W',
            (Side::Black, false) => 'b',
            (Side::Black, true) => 'B',
        }
    }
}
