use serde::Serialize;

use crate::moves::EnumeratedMove;
use crate::piece::Color;
use crate::state::{Outcome, State};

/// Read-only view of a game for whatever sits in front of the rules engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub board: String,
    pub whose_move: Color,
    pub ply: u32,
    pub in_check: bool,
    pub is_game_over: bool,
    pub winning_side: i32,
    pub outcome: Option<Outcome>,
    pub last_move: Option<EnumeratedMove>,
}

impl GameSnapshot {
    pub fn of(state: &State) -> Self {
        let whose_move = state.whose_move();
        GameSnapshot {
            board: state.serialize_board(),
            whose_move,
            ply: state.ply(),
            in_check: state.is_in_check(whose_move),
            is_game_over: state.is_game_over(),
            winning_side: state.winning_side(),
            outcome: state.outcome(),
            last_move: state.last_move().copied(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
