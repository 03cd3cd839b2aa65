use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::board::Board;
use crate::cell::Cell;
use crate::error::{ChessError, IllegalMove};
use crate::moves::{EnumeratedMove, Move};
use crate::piece::{Color, Figure, FigureKind};
use crate::rules::{self, Transition};

/// How a finished game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
}

impl Outcome {
    /// +1 white won, -1 black won, 0 draw.
    pub fn winning_side(self) -> i32 {
        match self {
            Outcome::Checkmate { winner } => winner.sign(),
            Outcome::Stalemate => 0,
        }
    }
}

/// A game in progress: the board plus everything derived from the moves
/// played on it.
///
/// `apply_move` is the only mutator. Every candidate move is first played on
/// a throwaway clone to make sure the mover's king stays safe, then replayed
/// here; a rejected move leaves the state untouched.
#[derive(Clone, Debug)]
pub struct State {
    board: Board,
    moves: Vec<EnumeratedMove>,
    /// Cached king cells, `[white, black]`. Only `commit` moves kings, and it
    /// updates these in the same step.
    kings: [Cell; 2],
    outcome: Option<Outcome>,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

fn king_slot(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}

impl State {
    /// The standard starting position, white to move.
    pub fn new() -> Self {
        State {
            board: Board::initial(),
            moves: Vec::new(),
            kings: [Cell::new_unchecked(5, 1), Cell::new_unchecked(5, 8)],
            outcome: None,
        }
    }

    /// Set up an arbitrary position from board text (same format as
    /// [`State::serialize_board`]). White moves first and no figure has a
    /// history. Each side needs exactly one king.
    pub fn from_layout(text: &str) -> Result<Self, ChessError> {
        let board = Board::from_text(text)?;
        let mut kings = [None, None];
        for figure in board.figures().filter(|f| f.kind() == FigureKind::King) {
            let slot = &mut kings[king_slot(figure.color())];
            if slot.is_some() {
                return Err(ChessError::InvalidLayout(format!(
                    "more than one {} king",
                    figure.color()
                )));
            }
            *slot = Some(figure.position());
        }
        let [Some(white), Some(black)] = kings else {
            return Err(ChessError::InvalidLayout(
                "each side needs exactly one king".to_string(),
            ));
        };
        Ok(State {
            board,
            moves: Vec::new(),
            kings: [white, black],
            outcome: None,
        })
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn figure_at(&self, cell: Cell) -> Option<&Figure> {
        self.board.get(cell)
    }

    /// Plies played so far.
    pub fn ply(&self) -> u32 {
        self.moves.len() as u32
    }

    pub fn moves(&self) -> &[EnumeratedMove] {
        &self.moves
    }

    pub fn last_move(&self) -> Option<&EnumeratedMove> {
        self.moves.last()
    }

    /// White on even ply counts, black on odd ones.
    pub fn whose_move(&self) -> Color {
        if self.ply() % 2 == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    pub fn king_position(&self, color: Color) -> Cell {
        self.kings[king_slot(color)]
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        self.board
            .is_cell_under_attack(self.king_position(color), color.opposite())
    }

    /// Is `cell` attacked by any figure of `attacker`?
    pub fn is_cell_under_attack(&self, cell: Cell, attacker: Color) -> bool {
        self.board.is_cell_under_attack(cell, attacker)
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// +1 / -1 for a white / black win, 0 for a draw or a game still running.
    /// Use [`State::outcome`] to tell those last two apart.
    pub fn winning_side(&self) -> i32 {
        self.outcome.map_or(0, Outcome::winning_side)
    }

    /// Eight lines, rank 8 first. Uppercase white, lowercase black, '.' empty.
    pub fn serialize_board(&self) -> String {
        self.board.to_text()
    }

    // -------------------------------------------------------------------------
    // Moving
    // -------------------------------------------------------------------------

    /// Validate and play `mv`. On error nothing changes.
    pub fn apply_move(&mut self, mv: Move) -> Result<(), ChessError> {
        let validated = if self.is_game_over() {
            Err(IllegalMove::GameOver)
        } else {
            self.validate(mv)
        };
        let transition = match validated {
            Ok(transition) => transition,
            Err(reason) => {
                debug!(%mv, %reason, "move rejected");
                return Err(reason.into());
            }
        };

        let record = self.commit(&transition)?;
        debug!(ply = record.ply, mv = %record.mv, "move played");
        self.refresh_outcome();
        Ok(())
    }

    /// Parse "e2 e4" and play it.
    pub fn apply_move_by_abbreviation(&mut self, text: &str) -> Result<(), ChessError> {
        let mv = Move::from_abbreviation(text)?;
        self.apply_move(mv)
    }

    /// Legal destinations for the figure on `cell`. Empty when the game is
    /// over, the cell is empty, or the figure's side is not to move.
    pub fn possible_moves(&self, cell: Cell) -> Vec<Cell> {
        if self.is_game_over() {
            return Vec::new();
        }
        match self.board.get(cell) {
            Some(figure) => self.legal_targets(figure).collect(),
            None => Vec::new(),
        }
    }

    /// Every legal move for the side to move.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_game_over() {
            return Vec::new();
        }
        let side = self.whose_move();
        self.board
            .figures()
            .filter(|f| f.color() == side)
            .flat_map(|f| {
                let from = f.position();
                self.legal_targets(f).map(move |to| Move::new(from, to))
            })
            .collect()
    }

    fn legal_targets<'a>(&'a self, figure: &Figure) -> impl Iterator<Item = Cell> + 'a {
        let from = figure.position();
        rules::candidate_targets(figure)
            .into_iter()
            .filter(move |&to| self.validate(Move::new(from, to)).is_ok())
    }

    /// Turn order, the figure's own rules, then king safety on a scratch copy.
    /// Never touches `self`.
    fn validate(&self, mv: Move) -> Result<Transition, IllegalMove> {
        let figure = self
            .board
            .get(mv.from)
            .ok_or(IllegalMove::EmptySource(mv.from))?;
        if figure.color() != self.whose_move() {
            return Err(IllegalMove::WrongTurn(figure.color()));
        }
        let transition = rules::plan(&self.board, self.ply(), figure, mv.to)?;
        self.ensure_king_safe(&transition, figure.color())?;
        Ok(transition)
    }

    fn ensure_king_safe(&self, transition: &Transition, color: Color) -> Result<(), IllegalMove> {
        let mut scratch = self.clone();
        scratch.commit(transition)?;
        let exposed = scratch.is_in_check(color);
        trace!(?transition, exposed, "simulated on scratch state");
        if exposed {
            Err(IllegalMove::SelfCheck)
        } else {
            Ok(())
        }
    }

    /// The single place the board changes. Appends exactly one history entry
    /// to the moved figure and to the game, and keeps the king cache in step.
    fn commit(&mut self, transition: &Transition) -> Result<EnumeratedMove, IllegalMove> {
        let mv = transition.recorded_move();
        let record = EnumeratedMove {
            mv,
            ply: self.ply() + 1,
        };
        let rook_from = match *transition {
            Transition::Castling { rook, .. } => Some(rook.from),
            _ => None,
        };
        // Check every source before touching the board so a castle is never
        // half applied.
        if let Some(missing) = std::iter::once(mv.from)
            .chain(rook_from)
            .find(|&cell| self.board.is_empty(cell))
        {
            return Err(IllegalMove::EmptySource(missing));
        }

        let figure = self
            .board
            .take(mv.from)
            .ok_or(IllegalMove::EmptySource(mv.from))?;
        let mut moved = figure.relocated(mv.to, record);

        match *transition {
            Transition::Step { promote: true, .. } => moved = moved.promoted(),
            Transition::Step { .. } => {}
            Transition::EnPassant { captured, .. } => {
                self.board.take(captured);
            }
            Transition::Castling { rook, .. } => {
                let r = self
                    .board
                    .take(rook.from)
                    .ok_or(IllegalMove::EmptySource(rook.from))?;
                self.board.put(r.shifted(rook.to));
            }
        }

        if moved.kind() == FigureKind::King {
            self.kings[king_slot(moved.color())] = mv.to;
        }
        self.board.put(moved);
        self.moves.push(record);
        Ok(record)
    }

    fn has_legal_move(&self, color: Color) -> bool {
        self.board
            .figures()
            .filter(|f| f.color() == color)
            .any(|f| self.legal_targets(f).next().is_some())
    }

    /// After a real move: no legal reply means checkmate (if in check) or
    /// stalemate.
    fn refresh_outcome(&mut self) {
        let side = self.whose_move();
        if self.has_legal_move(side) {
            return;
        }
        let outcome = if self.is_in_check(side) {
            Outcome::Checkmate {
                winner: side.opposite(),
            }
        } else {
            Outcome::Stalemate
        };
        info!(?outcome, ply = self.ply(), "game over");
        self.outcome = Some(outcome);
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.board, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::INITIAL_LAYOUT;

    fn cell(s: &str) -> Cell {
        s.parse().unwrap()
    }

    fn play(state: &mut State, moves: &[&str]) {
        for m in moves {
            state
                .apply_move_by_abbreviation(m)
                .unwrap_or_else(|e| panic!("{m} should be legal: {e}"));
        }
    }

    fn rejection(state: &mut State, text: &str) -> IllegalMove {
        match state.apply_move_by_abbreviation(text) {
            Err(ChessError::IllegalMove(reason)) => reason,
            other => panic!("{text} should be illegal, got {other:?}"),
        }
    }

    #[test]
    fn starts_from_initial_layout() {
        let state = State::new();
        assert_eq!(state.serialize_board(), INITIAL_LAYOUT);
        assert_eq!(state.whose_move(), Color::White);
        assert_eq!(state.ply(), 0);
        assert!(state.last_move().is_none());
        assert!(!state.is_game_over());
        assert_eq!(state.king_position(Color::White), cell("e1"));
        assert_eq!(state.king_position(Color::Black), cell("e8"));
    }

    #[test]
    fn layout_needs_one_king_per_side() {
        let no_black_king = INITIAL_LAYOUT.replacen('k', "q", 1);
        assert!(matches!(
            State::from_layout(&no_black_king),
            Err(ChessError::InvalidLayout(_))
        ));
        let two_white_kings = INITIAL_LAYOUT.replacen('Q', "K", 1);
        assert!(matches!(
            State::from_layout(&two_white_kings),
            Err(ChessError::InvalidLayout(_))
        ));
        let state = State::from_layout(INITIAL_LAYOUT).unwrap();
        assert_eq!(state.king_position(Color::Black), cell("e8"));
    }

    #[test]
    fn turns_alternate() {
        let mut state = State::new();
        assert_eq!(rejection(&mut state, "e7 e5"), IllegalMove::WrongTurn(Color::Black));
        play(&mut state, &["e2 e4"]);
        assert_eq!(state.whose_move(), Color::Black);
        assert_eq!(rejection(&mut state, "d2 d4"), IllegalMove::WrongTurn(Color::White));
        play(&mut state, &["e7 e5"]);
        assert_eq!(state.whose_move(), Color::White);
        assert_eq!(state.ply(), 2);
    }

    #[test]
    fn histories_are_recorded_with_ply_numbers() {
        let mut state = State::new();
        play(&mut state, &["g1 f3", "b8 c6", "f3 g1"]);
        let last = *state.last_move().unwrap();
        assert_eq!(last.ply, 3);
        assert_eq!(last.mv, Move::new(cell("f3"), cell("g1")));
        let knight = state.figure_at(cell("g1")).unwrap();
        assert_eq!(knight.move_count(), 2);
        assert_eq!(knight.history()[0].ply, 1);
        assert_eq!(state.moves().len(), 3);
    }

    #[test]
    fn rejected_move_changes_nothing() {
        let mut state = State::new();
        play(&mut state, &["e2 e4"]);
        let before = state.serialize_board();
        assert_eq!(rejection(&mut state, "e8 e6"), IllegalMove::Geometry(FigureKind::King));
        assert_eq!(rejection(&mut state, "d4 d5"), IllegalMove::EmptySource(cell("d4")));
        assert_eq!(state.serialize_board(), before);
        assert_eq!(state.ply(), 1);
        assert_eq!(state.whose_move(), Color::Black);
    }

    #[test]
    fn pinned_figure_cannot_expose_king() {
        let mut state = State::from_layout(
            "....k...\n\
             ....r...\n\
             ........\n\
             ........\n\
             ........\n\
             ........\n\
             ....B...\n\
             ....K...",
        )
        .unwrap();
        assert_eq!(rejection(&mut state, "e2 d3"), IllegalMove::SelfCheck);
        assert!(state.possible_moves(cell("e2")).is_empty());
        assert_eq!(rejection(&mut state, "e1 e2"), IllegalMove::OwnPieceCapture(cell("e2")));
    }

    #[test]
    fn king_cache_follows_the_king() {
        let mut state = State::new();
        play(&mut state, &["e2 e4", "e7 e5", "e1 e2"]);
        assert_eq!(state.king_position(Color::White), cell("e2"));
        assert_eq!(state.board().find_king(Color::White), Some(cell("e2")));
    }

    #[test]
    fn possible_moves_for_opening_figures() {
        let state = State::new();
        let mut knight = state.possible_moves(cell("g1"));
        knight.sort_by_key(|c| c.x());
        assert_eq!(knight, vec![cell("f3"), cell("h3")]);
        assert_eq!(state.possible_moves(cell("e2")), vec![cell("e3"), cell("e4")]);
        assert!(state.possible_moves(cell("e1")).is_empty());
        assert!(state.possible_moves(cell("e4")).is_empty());
        assert!(state.possible_moves(cell("e7")).is_empty());
        assert_eq!(state.legal_moves().len(), 20);
    }

    #[test]
    fn attack_scan_follows_pawn_direction_and_open_lines() {
        let mut state = State::new();
        assert!(state.is_cell_under_attack(cell("e3"), Color::White));
        assert!(state.is_cell_under_attack(cell("f3"), Color::White));
        assert!(!state.is_cell_under_attack(cell("e4"), Color::White));
        assert!(state.is_cell_under_attack(cell("e6"), Color::Black));
        assert!(!state.is_cell_under_attack(cell("c4"), Color::White));
        play(&mut state, &["e2 e4"]);
        assert!(state.is_cell_under_attack(cell("c4"), Color::White));
        assert!(!state.is_cell_under_attack(cell("e5"), Color::White));
    }

    #[test]
    fn castling_commit_without_rook_changes_nothing() {
        let mut state = State::from_layout(
            "....k...\n\
             ........\n\
             ........\n\
             ........\n\
             ........\n\
             ........\n\
             ........\n\
             ....K...",
        )
        .unwrap();
        let castle = Transition::Castling {
            king: Move::new(cell("e1"), cell("g1")),
            rook: Move::new(cell("h1"), cell("f1")),
        };
        let before = state.serialize_board();
        assert_eq!(state.commit(&castle), Err(IllegalMove::EmptySource(cell("h1"))));
        assert_eq!(state.serialize_board(), before);
        assert_eq!(state.ply(), 0);
        assert_eq!(state.king_position(Color::White), cell("e1"));
        assert_eq!(state.figure_at(cell("e1")).map(|k| k.move_count()), Some(0));
    }

    #[test]
    fn display_prints_the_board() {
        assert_eq!(State::new().to_string(), INITIAL_LAYOUT);
    }
}
