use std::fmt;

use crate::cell::Cell;
use crate::error::ChessError;
use crate::piece::{Color, Figure, FigureKind};

/// The standard starting position in board text form (rank 8 first).
pub const INITIAL_LAYOUT: &str = "rhbqkbhr\n\
                                  pppppppp\n\
                                  ........\n\
                                  ........\n\
                                  ........\n\
                                  ........\n\
                                  PPPPPPPP\n\
                                  RHBQKBHR";

/// The 8x8 grid. Row 0 is rank 1, column 0 is file a.
///
/// Every occupant's `position()` equals the cell it stands on; `put` places a
/// figure at its own position so the two can't drift apart.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<Figure>; 8]; 8],
}

impl Board {
    /// Create an empty board with no pieces.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard starting position; `to_text()` of it equals [`INITIAL_LAYOUT`].
    pub fn initial() -> Self {
        use FigureKind::*;
        const BACK_RANK: [FigureKind; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

        let mut board = Board::empty();
        for cell in Cell::all() {
            let color = match cell.y() {
                1 | 2 => Color::White,
                7 | 8 => Color::Black,
                _ => continue,
            };
            let kind = match cell.y() {
                2 | 7 => Pawn,
                _ => BACK_RANK[cell.x() as usize - 1],
            };
            board.put(Figure::new(kind, color, cell));
        }
        board
    }

    /// Parse eight lines of eight characters, rank 8 first. '.' is an empty
    /// cell, letters are figures (uppercase white, lowercase black).
    pub fn from_text(text: &str) -> Result<Self, ChessError> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.len() != 8 {
            return Err(ChessError::InvalidLayout(format!(
                "expected 8 ranks, found {}",
                lines.len()
            )));
        }

        let mut board = Board::empty();
        for (i, line) in lines.iter().enumerate() {
            let rank = 8 - i as i32;
            let chars: Vec<char> = line.chars().collect();
            if chars.len() != 8 {
                return Err(ChessError::InvalidLayout(format!(
                    "rank {rank} has {} cells, expected 8",
                    chars.len()
                )));
            }
            for (j, &letter) in chars.iter().enumerate() {
                if letter == '.' {
                    continue;
                }
                let cell = Cell::new(j as i32 + 1, rank)?;
                let figure = Figure::from_letter(letter, cell).ok_or_else(|| {
                    ChessError::InvalidLayout(format!("unknown figure {letter:?} on {cell}"))
                })?;
                board.put(figure);
            }
        }
        Ok(board)
    }

    /// Eight newline-joined lines, rank 8 down to rank 1, files a..h.
    pub fn to_text(&self) -> String {
        self.squares
            .iter()
            .rev()
            .map(|row| {
                row.iter()
                    .map(|sq| sq.as_ref().map_or('.', Figure::letter))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn get(&self, cell: Cell) -> Option<&Figure> {
        let (row, col) = cell.index();
        self.squares[row][col].as_ref()
    }

    pub fn is_empty(&self, cell: Cell) -> bool {
        self.get(cell).is_none()
    }

    pub(crate) fn take(&mut self, cell: Cell) -> Option<Figure> {
        let (row, col) = cell.index();
        self.squares[row][col].take()
    }

    /// Place `figure` on its own position, returning whatever stood there.
    pub(crate) fn put(&mut self, figure: Figure) -> Option<Figure> {
        let (row, col) = figure.position().index();
        self.squares[row][col].replace(figure)
    }

    /// Occupied cells in board order (rank 1 first).
    pub fn figures(&self) -> impl Iterator<Item = &Figure> {
        self.squares.iter().flatten().flatten()
    }

    pub fn find_king(&self, color: Color) -> Option<Cell> {
        self.figures()
            .find(|f| f.kind() == FigureKind::King && f.color() == color)
            .map(Figure::position)
    }

    /// Ray-cast from `from` toward `to` one unit step at a time; true when
    /// every square strictly between them is empty. Cells that don't share a
    /// rank, file or diagonal have no ray and are never clear.
    pub fn is_path_clear(&self, from: Cell, to: Cell) -> bool {
        let (dx, dy) = (to.x() - from.x(), to.y() - from.y());
        if from == to || !(dx == 0 || dy == 0 || dx.abs() == dy.abs()) {
            return false;
        }
        let (sx, sy) = (dx.signum(), dy.signum());
        let mut cur = from;
        loop {
            cur = match cur.offset(sx, sy) {
                Some(next) => next,
                None => return false,
            };
            if cur == to {
                return true;
            }
            if !self.is_empty(cur) {
                return false;
            }
        }
    }

    /// Does any `attacker` figure attack `cell`? Scans all 64 squares and
    /// stops at the first hit.
    pub fn is_cell_under_attack(&self, cell: Cell, attacker: Color) -> bool {
        self.figures()
            .filter(|f| f.color() == attacker)
            .any(|f| f.attacks(self, cell))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
