use thiserror::Error;

use crate::cell::Cell;
use crate::piece::{Color, FigureKind};

/// Errors returned by every fallible operation in the crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    /// A coordinate outside 1..=8 on either axis.
    #[error("cell ({x}, {y}) must lie within the chess board")]
    InvalidCoordinate { x: i32, y: i32 },

    /// A numeric colour other than 1 (white) or -1 (black).
    #[error("color must be either 1 or -1, got {0}")]
    InvalidColor(i32),

    /// Malformed cell abbreviation or move text.
    #[error("cannot parse {input:?}: {reason}")]
    Parse { input: String, reason: &'static str },

    /// A text layout that does not describe a playable board.
    #[error("invalid board layout: {0}")]
    InvalidLayout(String),

    /// The move was rejected; the state is unchanged.
    #[error("illegal move: {0}")]
    IllegalMove(#[from] IllegalMove),
}

/// Why a move was rejected.
///
/// All reasons surface as the single [`ChessError::IllegalMove`] kind, so
/// callers that only care about "legal or not" match on that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalMove {
    #[error("cell {0} has no figure on it")]
    EmptySource(Cell),

    #[error("the game is already over")]
    GameOver,

    #[error("it's not {0}'s turn")]
    WrongTurn(Color),

    #[error("{0} doesn't move like that")]
    Geometry(FigureKind),

    #[error("the path to {0} is blocked")]
    PathBlocked(Cell),

    #[error("cell {0} is already occupied")]
    DestinationOccupied(Cell),

    #[error("you cannot beat your own figure on {0}")]
    OwnPieceCapture(Cell),

    #[error("kings cannot be captured")]
    KingCapture,

    #[error("your king would be in check")]
    SelfCheck,

    #[error("cannot castle: the king has already moved")]
    CastlingKingMoved,

    #[error("cannot castle: the rook has already moved")]
    CastlingRookMoved,

    #[error("cannot castle while there are figures between rook and king")]
    CastlingPathBlocked,

    #[error("cannot castle while the king is in check")]
    CastlingInCheck,

    #[error("cannot castle: {0} on the king's path is under attack")]
    CastlingThroughAttack(Cell),

    #[error("not an en passant situation")]
    NotEnPassant,
}
