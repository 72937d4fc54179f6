use amazons_arena::*;
use log::error;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Amazons Arena");
    println!("=============\n");

    // Optional first argument: path to a JSON match config
    let config = match std::env::args().nth(1) {
        Some(path) => match MatchConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("Could not load {}: {}", path, e);
                process::exit(1);
            }
        },
        None => MatchConfig::default(),
    };

    let white = config.build_bot(Player::White);
    let black = config.build_bot(Player::Black);
    let mut game = Match::new(white, black, config);
    let result = game.play();

    println!("\nFinal board:");
    println!("{}", game.board());

    println!("========================================");
    println!("Match Result:");
    match &result {
        MatchResult::Win {
            side,
            winner_name,
            moves,
        } => {
            println!("  {} wins as {:?} in {} moves!", winner_name, side, moves);
        }
        MatchResult::Timeout { violator, winner } => {
            println!("  {} wins by timeout (opponent: {})", winner, violator);
        }
        MatchResult::IllegalMove { violator, winner } => {
            println!("  {} wins by illegal move (opponent: {})", winner, violator);
        }
        MatchResult::NoMove { violator, winner } => {
            println!("  {} wins, {} returned no move", winner, violator);
        }
    }
    println!("========================================");

    let summary = serde_json::json!({
        "result": result,
        "record": game.record(),
    });
    match serde_json::to_string_pretty(&summary) {
        Ok(text) => println!("{}", text),
        Err(e) => error!("Could not serialize summary: {}", e),
    }
}
