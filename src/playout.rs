// =============================================================================
// Random playouts
//
// Plays uniformly random legal moves until the game ends or a ply limit is
// hit. There is no evaluation or search here; playouts drive the rules engine
// end to end for the selfplay binary and the invariant tests.
// =============================================================================

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::ChessError;
use crate::state::{Outcome, State};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read layout {path:?}: {source}")]
    Layout {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Chess(#[from] ChessError),
}

/// Settings for a batch of random playouts.
#[derive(Parser, Clone, Debug)]
#[command(name = "selfplay")]
#[command(about = "Play random legal games and print how they ended")]
pub struct PlayoutConfig {
    /// Number of games to play.
    #[arg(long, default_value_t = 1)]
    pub games: u32,

    /// Stop a game after this many plies even if it isn't over.
    #[arg(long, default_value_t = 200)]
    pub max_plies: u32,

    /// Base RNG seed; game `i` uses `seed + i`. Seeds from entropy when absent.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Text layout file to start from instead of the standard position.
    #[arg(long)]
    pub layout: Option<PathBuf>,
}

impl Default for PlayoutConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayoutConfig {
    /// The settings used when no flags are given.
    pub fn new() -> Self {
        PlayoutConfig::parse_from(["selfplay"])
    }

    /// The position every game starts from.
    pub fn initial_state(&self) -> Result<State, ConfigError> {
        match &self.layout {
            None => Ok(State::new()),
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|source| ConfigError::Layout {
                    path: path.clone(),
                    source,
                })?;
                Ok(State::from_layout(&text)?)
            }
        }
    }
}

/// How a single playout went.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayoutReport {
    /// Plies played during this playout.
    pub plies: u32,
    /// `None` when the ply limit was reached first.
    pub outcome: Option<Outcome>,
    pub final_board: String,
}

/// Play random legal moves on `state` until the game ends, no move is
/// available, or `max_plies` plies have been played.
pub fn random_playout<R: Rng + ?Sized>(
    state: &mut State,
    max_plies: u32,
    rng: &mut R,
) -> Result<PlayoutReport, ChessError> {
    let start = state.ply();
    while !state.is_game_over() && state.ply() - start < max_plies {
        let moves = state.legal_moves();
        let Some(&mv) = moves.choose(rng) else {
            break;
        };
        state.apply_move(mv)?;
    }
    Ok(PlayoutReport {
        plies: state.ply() - start,
        outcome: state.outcome(),
        final_board: state.serialize_board(),
    })
}

/// Run `config.games` playouts, each from a fresh initial state.
pub fn run_playouts(config: &PlayoutConfig) -> Result<Vec<PlayoutReport>, ConfigError> {
    let mut reports = Vec::with_capacity(config.games as usize);
    for game in 0..config.games {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(game as u64)),
            None => StdRng::from_entropy(),
        };
        let mut state = config.initial_state()?;
        debug!(game, "starting playout");
        let report = random_playout(&mut state, config.max_plies, &mut rng)?;
        info!(game, plies = report.plies, outcome = ?report.outcome, "playout finished");
        reports.push(report);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_arguments() {
        let config = PlayoutConfig::try_parse_from(["selfplay"]).unwrap();
        assert_eq!(config.games, 1);
        assert_eq!(config.max_plies, 200);
        assert_eq!(config.seed, None);
        assert!(config.layout.is_none());
        assert_eq!(PlayoutConfig::default().max_plies, 200);
    }

    #[test]
    fn parses_all_flags() {
        let config = PlayoutConfig::try_parse_from([
            "selfplay", "--games", "3", "--max-plies", "40", "--seed=7", "--layout", "start.txt",
        ])
        .unwrap();
        assert_eq!(config.games, 3);
        assert_eq!(config.max_plies, 40);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.layout, Some(PathBuf::from("start.txt")));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(PlayoutConfig::try_parse_from(["selfplay", "--fast"]).is_err());
        assert!(PlayoutConfig::try_parse_from(["selfplay", "--games"]).is_err());
        assert!(PlayoutConfig::try_parse_from(["selfplay", "--seed", "abc"]).is_err());
    }

    #[test]
    fn missing_layout_file_is_reported() {
        let mut config = PlayoutConfig::new();
        config.layout = Some(PathBuf::from("/nonexistent/layout.txt"));
        assert!(matches!(config.initial_state(), Err(ConfigError::Layout { .. })));
    }

    #[test]
    fn playout_respects_ply_limit() {
        let mut state = State::new();
        let mut rng = StdRng::seed_from_u64(1);
        let report = random_playout(&mut state, 6, &mut rng).unwrap();
        assert!(report.plies <= 6);
        assert_eq!(report.plies, state.ply());
        if report.outcome.is_none() {
            assert_eq!(report.plies, 6);
        }
    }

    #[test]
    fn seeded_playouts_are_reproducible() {
        let mut config = PlayoutConfig::new();
        config.games = 2;
        config.max_plies = 20;
        config.seed = Some(42);
        let first = run_playouts(&config).unwrap();
        let second = run_playouts(&config).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
