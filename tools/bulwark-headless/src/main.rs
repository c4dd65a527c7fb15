//! bulwark-headless: run the BULWARK simulation without a renderer.
//!
//! Usage:
//!   bulwark-headless run --seed 7 --frames 36000
//!   bulwark-headless snapshot --frames 600 --datapack my_pack.json

use std::path::PathBuf;
use std::process;

use bulwark_core::commands::InputFrame;
use bulwark_core::datapack::Datapack;
use bulwark_core::events::GameEvent;
use bulwark_sim::{Game, GameConfig};

/// Fixed frame step (seconds).
const FRAME_DT: f64 = 1.0 / 60.0;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "snapshot" => cmd_snapshot(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "bulwark-headless: BULWARK simulation runner\n\
         \n\
         Commands:\n\
         \n\
         run       Simulate an idle game and print the run summary as JSON\n\
         snapshot  Simulate an idle game and print the last frame as JSON\n\
         \n\
         Options:\n\
         \n\
           --seed <N>         RNG seed (default: 42)\n\
           --frames <N>       Frames to simulate at 60 fps (default: 36000)\n\
           --datapack <path>  Datapack JSON file (default: built-in)\n\
           --preset <key>     Wave preset (default: default)\n\
           --biome <key>      Biome (default: default)\n\
         \n\
         The run stops early when the castle falls.\n"
    );
}

fn parse_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_number<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    match parse_value(args, flag) {
        Some(raw) => match raw.parse() {
            Ok(n) => n,
            Err(_) => {
                eprintln!("Error: {flag} expects a number, got `{raw}`");
                process::exit(1);
            }
        },
        None => default,
    }
}

fn load_datapack(args: &[String]) -> Datapack {
    let result = match parse_value(args, "--datapack") {
        Some(path) => {
            let path = PathBuf::from(path);
            match std::fs::read_to_string(&path) {
                Ok(json) => Datapack::from_json(&json),
                Err(e) => {
                    eprintln!("Error reading {}: {e}", path.display());
                    process::exit(1);
                }
            }
        }
        None => Datapack::builtin(),
    };

    result.unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    })
}

fn start_game(args: &[String]) -> Game {
    let pack = load_datapack(args);
    let config = GameConfig {
        seed: parse_number(args, "--seed", 42),
        wave_preset: parse_value(args, "--preset").unwrap_or("default").to_owned(),
        biome: parse_value(args, "--biome").unwrap_or("default").to_owned(),
        ..Default::default()
    };

    log::info!(
        "Starting seed {} on a {}x{} map (biome `{}`, preset `{}`)",
        config.seed,
        config.map_size.width,
        config.map_size.height,
        config.biome,
        config.wave_preset
    );

    Game::new(config, &pack).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    })
}

/// Step `game` with idle input until `frames` elapse or the run ends.
fn simulate(game: &mut Game, frames: u64) {
    let idle = InputFrame::default();
    for _ in 0..frames {
        let events = game.update(FRAME_DT, &idle);
        for event in &events {
            log::debug!("{event:?}");
        }
        if events
            .iter()
            .any(|e| matches!(e, GameEvent::RunEnded { .. }))
        {
            break;
        }
    }
}

// --- Run command ---

fn cmd_run(args: &[String]) {
    let frames = parse_number(args, "--frames", 36_000u64);
    let mut game = start_game(args);
    simulate(&mut game, frames);

    let summary = game.summary();
    log::info!(
        "Finished after {} frames: wave {}, {} kills",
        game.time().frame,
        summary.wave,
        summary.kills
    );

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

// --- Snapshot command ---

fn cmd_snapshot(args: &[String]) {
    let frames = parse_number(args, "--frames", 600u64);
    let mut game = start_game(args);
    simulate(&mut game, frames);

    match serde_json::to_string_pretty(&game.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
