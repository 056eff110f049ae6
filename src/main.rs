use std::env;
use std::process::ExitCode;

use log::error;

use chess_bridge::board::{decode_position, BoardSnapshot, Color, PositionCodec};
use chess_bridge::engine::{EngineClient, EngineConfig, DEFAULT_SEARCH_BUDGET_MS};

fn usage() -> ExitCode {
    eprintln!("usage: chess_bridge <engine-path> [position] [movetime-ms]");
    ExitCode::from(2)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(engine_path) = args.first() else {
        return usage();
    };

    let position = match args.get(1) {
        Some(text) => match decode_position(text) {
            Ok(_) => text.clone(),
            Err(e) => {
                eprintln!("invalid position: {e}");
                return usage();
            }
        },
        None => PositionCodec::standard().encode(&BoardSnapshot::standard(), Color::White),
    };
    let budget_ms = match args.get(2).map(|s| s.parse::<u64>()) {
        Some(Ok(ms)) if ms > 0 => ms,
        Some(_) => return usage(),
        None => DEFAULT_SEARCH_BUDGET_MS,
    };

    let mut client = EngineClient::new(EngineConfig::new(engine_path).with_stderr_capture(true));
    if let Err(e) = client.initialize() {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    let handle = match client.request_best_move(&position, budget_ms, |_| {}) {
        Ok(handle) => handle,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let result = handle.wait().clone();
    client.shutdown();

    if !result.success {
        let reason = result.failure.map_or_else(String::new, |f| f.to_string());
        eprintln!("no answer from engine: {reason}");
        return ExitCode::FAILURE;
    }

    let best = result.best_move.as_deref().unwrap_or_default();
    println!("bestmove {best}");
    if let Some(mv) = result.uci_move() {
        println!("from {} to {}", mv.from, mv.to);
        if let Some(piece) = mv.promotion {
            println!("promotion {}", piece.name());
        }
    }
    if let Some(n) = result.mate_distance {
        println!("score mate {n}");
    } else if let Some(cp) = result.centipawns {
        println!("score cp {cp}");
    }
    ExitCode::SUCCESS
}
