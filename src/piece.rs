use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::cell::Cell;
use crate::error::ChessError;
use crate::moves::EnumeratedMove;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// +1 for white, -1 for black. Doubles as the pawn's forward direction.
    pub fn sign(self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    pub fn from_sign(sign: i32) -> Result<Self, ChessError> {
        match sign {
            1 => Ok(Color::White),
            -1 => Ok(Color::Black),
            other => Err(ChessError::InvalidColor(other)),
        }
    }

    /// Rank the pawns start on; the double step is only allowed from here.
    pub fn pawn_rank(self) -> i32 {
        match self {
            Color::White => 2,
            Color::Black => 7,
        }
    }

    /// Farthest rank, where pawns promote.
    pub fn promotion_rank(self) -> i32 {
        match self {
            Color::White => 8,
            Color::Black => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FigureKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl FigureKind {
    /// Lowercase board letter. Knights use 'h' so they don't clash with bishops.
    pub fn letter(self) -> char {
        match self {
            FigureKind::King => 'k',
            FigureKind::Queen => 'q',
            FigureKind::Rook => 'r',
            FigureKind::Bishop => 'b',
            FigureKind::Knight => 'h',
            FigureKind::Pawn => 'p',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            'k' => Some(FigureKind::King),
            'q' => Some(FigureKind::Queen),
            'r' => Some(FigureKind::Rook),
            'b' => Some(FigureKind::Bishop),
            'h' => Some(FigureKind::Knight),
            'p' => Some(FigureKind::Pawn),
            _ => None,
        }
    }

    /// Sliding kinds need every square between source and target empty.
    pub fn slides(self) -> bool {
        matches!(self, FigureKind::Queen | FigureKind::Rook | FigureKind::Bishop)
    }

    /// Pure geometry of the attack pattern for a displacement `(dx, dy)`,
    /// ignoring occupancy. `forward` is the pawn direction (+1 or -1).
    pub fn covers(self, dx: i32, dy: i32, forward: i32) -> bool {
        let (ax, ay) = (dx.abs(), dy.abs());
        if ax == 0 && ay == 0 {
            return false;
        }
        match self {
            FigureKind::King => ax <= 1 && ay <= 1,
            FigureKind::Queen => ax == ay || ax == 0 || ay == 0,
            FigureKind::Rook => ax == 0 || ay == 0,
            FigureKind::Bishop => ax == ay,
            FigureKind::Knight => (ax, ay) == (1, 2) || (ax, ay) == (2, 1),
            FigureKind::Pawn => ax == 1 && dy == forward,
        }
    }
}

impl fmt::Display for FigureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FigureKind::King => "king",
            FigureKind::Queen => "queen",
            FigureKind::Rook => "rook",
            FigureKind::Bishop => "bishop",
            FigureKind::Knight => "knight",
            FigureKind::Pawn => "pawn",
        };
        f.write_str(name)
    }
}

/// A piece standing on the board, with the moves it has made so far.
///
/// Figures are never edited in place by the rules: a committed move takes the
/// figure off its cell and puts a relocated copy on the destination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Figure {
    kind: FigureKind,
    color: Color,
    position: Cell,
    history: Vec<EnumeratedMove>,
}

impl Figure {
    pub fn new(kind: FigureKind, color: Color, position: Cell) -> Self {
        Figure {
            kind,
            color,
            position,
            history: Vec::new(),
        }
    }

    /// Uppercase letter is white, lowercase is black.
    pub fn from_letter(letter: char, position: Cell) -> Option<Self> {
        let kind = FigureKind::from_letter(letter)?;
        let color = if letter.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Figure::new(kind, color, position))
    }

    pub fn kind(&self) -> FigureKind {
        self.kind
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn position(&self) -> Cell {
        self.position
    }

    pub fn history(&self) -> &[EnumeratedMove] {
        &self.history
    }

    pub fn move_count(&self) -> usize {
        self.history.len()
    }

    pub fn last_move(&self) -> Option<&EnumeratedMove> {
        self.history.last()
    }

    pub fn is_initial_position(&self) -> bool {
        self.history.is_empty()
    }

    pub fn letter(&self) -> char {
        match self.color {
            Color::White => self.kind.letter().to_ascii_uppercase(),
            Color::Black => self.kind.letter(),
        }
    }

    /// Could this figure reach `target` right now, ignoring whose turn it is?
    /// Sliding figures are blocked by any occupant between here and `target`.
    pub fn attacks(&self, board: &Board, target: Cell) -> bool {
        let dx = target.x() - self.position.x();
        let dy = target.y() - self.position.y();
        if !self.kind.covers(dx, dy, self.color.sign()) {
            return false;
        }
        !self.kind.slides() || board.is_path_clear(self.position, target)
    }

    /// The same figure standing on `to`, with `record` appended to its history.
    pub(crate) fn relocated(mut self, to: Cell, record: EnumeratedMove) -> Figure {
        self.position = to;
        self.history.push(record);
        self
    }

    /// A queen of the same colour on the same cell, inheriting the history.
    pub(crate) fn promoted(self) -> Figure {
        Figure {
            kind: FigureKind::Queen,
            ..self
        }
    }

    /// Moves a figure without recording a move (the rook's half of castling).
    pub(crate) fn shifted(mut self, to: Cell) -> Figure {
        self.position = to;
        self
    }
}
