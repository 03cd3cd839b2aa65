use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChessError;

/// A square on the board. `x` is the file (1 = a), `y` the rank (1..=8).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Cell {
    x: u8,
    y: u8,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Result<Self, ChessError> {
        if !(1..=8).contains(&x) || !(1..=8).contains(&y) {
            return Err(ChessError::InvalidCoordinate { x, y });
        }
        Ok(Cell { x: x as u8, y: y as u8 })
    }

    /// For coordinates already known to be on the board.
    pub(crate) const fn new_unchecked(x: u8, y: u8) -> Self {
        debug_assert!(x >= 1 && x <= 8 && y >= 1 && y <= 8);
        Cell { x, y }
    }

    pub fn x(self) -> i32 {
        self.x as i32
    }

    pub fn y(self) -> i32 {
        self.y as i32
    }

    /// The cell `(dx, dy)` away, or `None` if that falls off the board.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Cell> {
        Cell::new(self.x() + dx, self.y() + dy).ok()
    }

    /// Parse a two-character abbreviation such as `"e4"`.
    pub fn from_abbreviation(abbreviation: &str) -> Result<Self, ChessError> {
        let parse_error = |reason| ChessError::Parse {
            input: abbreviation.to_string(),
            reason,
        };
        let mut chars = abbreviation.chars();
        let (file, rank) = match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => (file, rank),
            _ => return Err(parse_error("abbreviation must be exactly two characters")),
        };
        if !file.is_ascii_lowercase() {
            return Err(parse_error("file must be a letter"));
        }
        let rank = rank
            .to_digit(10)
            .ok_or_else(|| parse_error("rank must be a digit"))?;
        Cell::new(file as i32 - 'a' as i32 + 1, rank as i32)
    }

    /// All 64 cells, rank 1 first, files a..h within each rank.
    pub fn all() -> impl Iterator<Item = Cell> {
        (1..=8u8).flat_map(|y| (1..=8u8).map(move |x| Cell::new_unchecked(x, y)))
    }

    /// `(row, col)` into the board grid: row 0 = rank 1, col 0 = file a.
    pub(crate) fn index(self) -> (usize, usize) {
        (self.y as usize - 1, self.x as usize - 1)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.x - 1) as char;
        write!(f, "{file}{}", self.y)
    }
}

impl FromStr for Cell {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cell::from_abbreviation(s)
    }
}

impl From<Cell> for String {
    fn from(cell: Cell) -> String {
        cell.to_string()
    }
}

impl TryFrom<String> for Cell {
    type Error = ChessError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Cell::from_abbreviation(&s)
    }
}
