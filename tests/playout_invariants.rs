use chess_rules::playout::random_playout;
use chess_rules::{Cell, Color, Move, State};
use rand::rngs::StdRng;
use rand::seq::{IteratorRandom, SliceRandom};
use rand::SeedableRng;

/// Mix random (mostly illegal) attempts with random legal moves and check the
/// bookkeeping after every call.
#[test]
fn random_attempts_keep_state_consistent() {
    for seed in 0..4u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = State::new();

        for _ in 0..60 {
            if state.is_game_over() {
                break;
            }
            let from = Cell::all().choose(&mut rng).unwrap();
            let to = Cell::all().choose(&mut rng).unwrap();
            check_attempt(&mut state, Move::new(from, to));

            if let Some(&mv) = state.legal_moves().choose(&mut rng) {
                check_attempt(&mut state, mv);
            }
        }
    }
}

fn check_attempt(state: &mut State, mv: Move) {
    let board = state.serialize_board();
    let ply = state.ply();
    let turn = state.whose_move();
    let was_legal = state.legal_moves().contains(&mv);

    match state.apply_move(mv) {
        Ok(()) => {
            assert!(was_legal, "{mv} was accepted but not listed as legal");
            assert_eq!(state.ply(), ply + 1);
            assert_eq!(state.whose_move(), turn.opposite());
            assert_eq!(state.last_move().map(|m| (m.ply, m.mv.from)), Some((ply + 1, mv.from)));
        }
        Err(_) => {
            assert!(!was_legal, "{mv} was listed as legal but rejected");
            assert_eq!(state.serialize_board(), board);
            assert_eq!(state.ply(), ply);
            assert_eq!(state.whose_move(), turn);
        }
    }

    for color in [Color::White, Color::Black] {
        assert_eq!(state.board().find_king(color), Some(state.king_position(color)));
    }
    assert_eq!(state.moves().len() as u32, state.ply());
    let figure_moves: usize = state.board().figures().map(|f| f.move_count()).sum();
    assert!(figure_moves <= state.moves().len());
}

#[test]
fn playouts_never_leave_the_mover_in_check() {
    for seed in 10..13u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = State::new();
        let report = random_playout(&mut state, 80, &mut rng).unwrap();
        assert_eq!(report.plies, state.ply());
        assert_eq!(report.final_board, state.serialize_board());

        let just_moved = state.whose_move().opposite();
        assert!(!state.is_in_check(just_moved));
        if let Some(outcome) = report.outcome {
            assert!(state.is_game_over());
            assert_eq!(outcome.winning_side(), state.winning_side());
            assert!(state.legal_moves().is_empty());
        }
    }
}
