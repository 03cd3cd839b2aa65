//! Chess rules engine: move legality, board state, check, checkmate and
//! stalemate detection. Presentation and transport are left to callers.

pub mod board;
pub mod cell;
pub mod error;
pub mod moves;
pub mod piece;
pub mod playout;
pub mod rules;
pub mod snapshot;
pub mod state;

pub use board::{Board, INITIAL_LAYOUT};
pub use cell::Cell;
pub use error::{ChessError, IllegalMove};
pub use moves::{EnumeratedMove, Move};
pub use piece::{Color, Figure, FigureKind};
pub use snapshot::GameSnapshot;
pub use state::{Outcome, State};
