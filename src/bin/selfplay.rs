use std::process::ExitCode;

use chess_rules::playout::{run_playouts, PlayoutConfig};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chess_rules=info")))
        .init();

    let config = PlayoutConfig::parse();

    match run_playouts(&config) {
        Ok(reports) => {
            for (game, report) in reports.iter().enumerate() {
                let result = match report.outcome {
                    Some(outcome) => match outcome.winning_side() {
                        1 => "White wins",
                        -1 => "Black wins",
                        _ => "Draw",
                    },
                    None => "ongoing",
                };
                println!("Game {game}: {} plies, {result}", report.plies);
                println!("{}\n", report.final_board);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "selfplay failed");
            ExitCode::FAILURE
        }
    }
}
