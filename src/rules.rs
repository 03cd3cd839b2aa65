// =============================================================================
// Per-figure move rules
//
// `plan` checks a candidate move against the occupant's geometry, path and
// occupancy preconditions on a read-only board and describes the resulting
// board change as a `Transition`. It never checks king safety: State applies
// the transition to a scratch copy first and only commits if the mover's king
// is safe there.
// =============================================================================

use crate::board::Board;
use crate::cell::Cell;
use crate::error::IllegalMove;
use crate::moves::Move;
use crate::piece::{Figure, FigureKind};

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

/// A validated board change, ready to be simulated or committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Relocate one figure, capturing whatever stands on the destination.
    /// `promote` turns a pawn into a queen on arrival.
    Step { mv: Move, promote: bool },
    /// Pawn moves diagonally onto an empty cell and removes the enemy pawn
    /// standing on `captured`.
    EnPassant { mv: Move, captured: Cell },
    /// King and rook relocate together. Only the king's move is recorded.
    Castling { king: Move, rook: Move },
}

impl Transition {
    /// The move that goes into the histories.
    pub fn recorded_move(&self) -> Move {
        match *self {
            Transition::Step { mv, .. } | Transition::EnPassant { mv, .. } => mv,
            Transition::Castling { king, .. } => king,
        }
    }
}

/// Decide whether `figure` may go to `target` on `board`, ignoring king
/// safety. `ply` is the number of plies played so far.
pub fn plan(board: &Board, ply: u32, figure: &Figure, target: Cell) -> Result<Transition, IllegalMove> {
    match figure.kind() {
        FigureKind::King => plan_king(board, figure, target),
        FigureKind::Pawn => plan_pawn(board, ply, figure, target),
        _ => plan_plain(board, figure, target),
    }
}

/// Destinations worth trying for `figure`. Knights and pawns have a short
/// fixed list; everything else tries the whole board.
pub fn candidate_targets(figure: &Figure) -> Vec<Cell> {
    let from = figure.position();
    match figure.kind() {
        FigureKind::Knight => KNIGHT_OFFSETS
            .iter()
            .filter_map(|&(dx, dy)| from.offset(dx, dy))
            .collect(),
        FigureKind::Pawn => {
            let f = figure.color().sign();
            [(0, f), (0, 2 * f), (-1, f), (1, f)]
                .iter()
                .filter_map(|&(dx, dy)| from.offset(dx, dy))
                .collect()
        }
        _ => Cell::all().collect(),
    }
}

fn displacement(from: Cell, to: Cell) -> (i32, i32) {
    (to.x() - from.x(), to.y() - from.y())
}

/// A figure may land on an empty cell or on an enemy that isn't a king.
fn check_landing(board: &Board, figure: &Figure, target: Cell) -> Result<(), IllegalMove> {
    match board.get(target) {
        Some(other) if other.color() == figure.color() => Err(IllegalMove::OwnPieceCapture(target)),
        Some(other) if other.kind() == FigureKind::King => Err(IllegalMove::KingCapture),
        _ => Ok(()),
    }
}

/// Queen, rook, bishop, knight, and the king's ordinary step.
fn plan_plain(board: &Board, figure: &Figure, target: Cell) -> Result<Transition, IllegalMove> {
    let from = figure.position();
    let (dx, dy) = displacement(from, target);
    if !figure.kind().covers(dx, dy, figure.color().sign()) {
        return Err(IllegalMove::Geometry(figure.kind()));
    }
    if figure.kind().slides() && !board.is_path_clear(from, target) {
        return Err(IllegalMove::PathBlocked(target));
    }
    check_landing(board, figure, target)?;
    Ok(Transition::Step {
        mv: Move::new(from, target),
        promote: false,
    })
}

fn plan_king(board: &Board, king: &Figure, target: Cell) -> Result<Transition, IllegalMove> {
    match board.get(target) {
        Some(rook) if is_castling_attempt(king, rook) => plan_castling(board, king, rook),
        _ => plan_plain(board, king, target),
    }
}

/// Castling is requested by moving the king onto one of its own rooks on the
/// same rank, at least two files away.
fn is_castling_attempt(king: &Figure, rook: &Figure) -> bool {
    let (dx, dy) = displacement(king.position(), rook.position());
    rook.kind() == FigureKind::Rook && rook.color() == king.color() && dy == 0 && dx.abs() >= 2
}

fn plan_castling(board: &Board, king: &Figure, rook: &Figure) -> Result<Transition, IllegalMove> {
    if !king.is_initial_position() {
        return Err(IllegalMove::CastlingKingMoved);
    }
    if !rook.is_initial_position() {
        return Err(IllegalMove::CastlingRookMoved);
    }
    let (from, rook_from) = (king.position(), rook.position());
    if !board.is_path_clear(from, rook_from) {
        return Err(IllegalMove::CastlingPathBlocked);
    }
    let enemy = king.color().opposite();
    if board.is_cell_under_attack(from, enemy) {
        return Err(IllegalMove::CastlingInCheck);
    }

    // The rook lands on the square the king crosses; the king ends two files
    // toward the rook. Both exist since the rook is at least two files away.
    let step = (rook_from.x() - from.x()).signum();
    let rook_to = from
        .offset(step, 0)
        .ok_or(IllegalMove::Geometry(FigureKind::King))?;
    let king_to = from
        .offset(2 * step, 0)
        .ok_or(IllegalMove::Geometry(FigureKind::King))?;
    if board.is_cell_under_attack(rook_to, enemy) {
        return Err(IllegalMove::CastlingThroughAttack(rook_to));
    }

    Ok(Transition::Castling {
        king: Move::new(from, king_to),
        rook: Move::new(rook_from, rook_to),
    })
}

fn plan_pawn(board: &Board, ply: u32, pawn: &Figure, target: Cell) -> Result<Transition, IllegalMove> {
    let color = pawn.color();
    let forward = color.sign();
    let from = pawn.position();
    let (dx, dy) = displacement(from, target);
    let mv = Move::new(from, target);
    let promote = target.y() == color.promotion_rank();

    // Straight ahead: one step, or two from the starting rank.
    let double_step = dy == 2 * forward && from.y() == color.pawn_rank();
    if dx == 0 && (dy == forward || double_step) {
        if !board.is_empty(target) {
            return Err(IllegalMove::DestinationOccupied(target));
        }
        if double_step && !board.is_path_clear(from, target) {
            return Err(IllegalMove::PathBlocked(target));
        }
        return Ok(Transition::Step { mv, promote });
    }

    if dx.abs() == 1 && dy == forward {
        if !board.is_empty(target) {
            check_landing(board, pawn, target)?;
            return Ok(Transition::Step { mv, promote });
        }

        // En passant: the enemy pawn beside us double-stepped on the last ply.
        let captured = target.offset(0, -forward).ok_or(IllegalMove::NotEnPassant)?;
        let victim = board.get(captured).ok_or(IllegalMove::NotEnPassant)?;
        let just_double_stepped = victim.kind() == FigureKind::Pawn
            && victim.color() != color
            && victim.move_count() == 1
            && victim
                .last_move()
                .is_some_and(|last| last.ply == ply && last.rank_span() == 2);
        if !just_double_stepped {
            return Err(IllegalMove::NotEnPassant);
        }
        return Ok(Transition::EnPassant { mv, captured });
    }

    Err(IllegalMove::Geometry(FigureKind::Pawn))
}
