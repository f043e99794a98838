pub mod display;
pub mod position;

pub use position::{Position, Threats};

use std::fmt;

use serde::{Deserialize, Serialize};

pub const BOARD_HEIGHT: usize = 15;
pub const BOARD_WIDTH: usize = 15;
pub const WIN_AMT: usize = 5;
pub const MAX_MOVES: usize = BOARD_HEIGHT * BOARD_WIDTH;

/// The eight king-step offsets as (row, col) deltas.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
];

/// One offset per line axis; ray scans pair each with its negation.
pub const AXIS_OFFSETS: [(i32, i32); 4] = [(-1, 0), (-1, 1), (0, 1), (1, 1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

/// Board square contents. `Adjacent` marks an empty square within one king
/// step of a stone; `Highlight` is a transient display marker that never
/// survives outside the candidate visualizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    White,
    Black,
    Adjacent,
    Highlight,
}

impl Cell {
    pub fn is_vacant(self) -> bool {
        matches!(self, Cell::Empty | Cell::Adjacent)
    }

    pub fn stone(self) -> Option<Color> {
        match self {
            Cell::White => Some(Color::White),
            Cell::Black => Some(Color::Black),
            _ => None,
        }
    }
}

impl From<Color> for Cell {
    fn from(color: Color) -> Cell {
        match color {
            Color::White => Cell::White,
            Color::Black => Cell::Black,
        }
    }
}

/// A board coordinate. Always in bounds; "no move" is `Option::None` at the
/// call sites that need it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub row: u8,
    pub col: u8,
}

impl Move {
    pub fn new(row: u8, col: u8) -> Move {
        Move { row, col }
    }

    /// Steps by (dr, dc), returning None when the result leaves the board.
    pub fn offset(self, dr: i32, dc: i32) -> Option<Move> {
        let row = self.row as i32 + dr;
        let col = self.col as i32 + dc;
        if row < 0 || row >= BOARD_HEIGHT as i32 || col < 0 || col >= BOARD_WIDTH as i32 {
            return None;
        }
        Some(Move {
            row: row as u8,
            col: col as u8,
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win(Color),
    Draw,
}
