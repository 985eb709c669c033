//! Nova Strike headless runner
//!
//! Plays one seeded run with the demo pilot and prints the run summary as
//! JSON. Usage: `nova-strike [seed] [seconds] [--config run.json]`

use std::process::ExitCode;

use nova_strike::consts::FRAME_DT_MS;
use nova_strike::sim::{GameEvent, GameState, autopilot, tick};
use nova_strike::{ConfigError, RunConfig};

const DEFAULT_SECONDS: f32 = 180.0;

struct Args {
    seed: Option<u64>,
    seconds: f32,
    config: Option<String>,
}

fn parse_args() -> Args {
    let mut args = Args {
        seed: None,
        seconds: DEFAULT_SECONDS,
        config: None,
    };
    let mut positional = 0;
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            args.config = iter.next();
            continue;
        }
        match positional {
            0 => args.seed = arg.parse().ok(),
            1 => args.seconds = arg.parse().unwrap_or(DEFAULT_SECONDS),
            _ => log::warn!("Ignoring extra argument `{arg}`"),
        }
        positional += 1;
    }
    args
}

fn load_config(args: &Args) -> Result<RunConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => RunConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => RunConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed as f64);
    }
    Ok(config)
}

fn main() -> ExitCode {
    env_logger::init();
    let args = parse_args();

    let mut state = match load_config(&args).and_then(GameState::new) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Cannot start run: {e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("Nova Strike (headless) starting, seed {}", state.seed);

    let max_ticks = (args.seconds.max(0.0) * 1000.0 / FRAME_DT_MS) as u64;
    let mut events = 0usize;
    while state.time_ticks < max_ticks && !state.is_over() {
        let input = autopilot(&state);
        tick(&mut state, &input, FRAME_DT_MS);
        for event in state.drain_events() {
            if let GameEvent::BossDefeated { defeats } = event {
                log::info!("Boss {defeats} down, score {}", state.score);
            }
            events += 1;
        }
    }
    log::info!("{} ticks, {events} events", state.time_ticks);

    match serde_json::to_string_pretty(&state.summary()) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Cannot serialise summary: {e}");
            ExitCode::FAILURE
        }
    }
}
