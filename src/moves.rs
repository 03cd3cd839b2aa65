use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::error::ChessError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Cell,
    pub to: Cell,
}

impl Move {
    pub fn new(from: Cell, to: Cell) -> Self {
        Move { from, to }
    }

    /// Parse the two-cell form, e.g. "e2 e4"
    pub fn from_abbreviation(text: &str) -> Result<Move, ChessError> {
        let mut cells = text.split_whitespace();
        match (cells.next(), cells.next(), cells.next()) {
            (Some(from), Some(to), None) => Ok(Move {
                from: Cell::from_abbreviation(from)?,
                to: Cell::from_abbreviation(to)?,
            }),
            _ => Err(ChessError::Parse {
                input: text.to_string(),
                reason: "move must be two cells separated by whitespace",
            }),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.from, self.to)
    }
}

impl FromStr for Move {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Move::from_abbreviation(s)
    }
}

/// A move as recorded in history. `ply` is 1-based: the first move of the
/// game has ply 1, so right after a move is played `ply` equals the state's
/// ply count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumeratedMove {
    pub mv: Move,
    pub ply: u32,
}

impl EnumeratedMove {
    /// Number of ranks covered; en passant only applies to two-rank pawn steps.
    pub fn rank_span(&self) -> i32 {
        (self.mv.to.y() - self.mv.from.y()).abs()
    }
}

impl fmt::Display for EnumeratedMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.ply, self.mv)
    }
}
