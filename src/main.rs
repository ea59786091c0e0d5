//! Sky Hop headless runner
//!
//! Plays one run with the reference physics and a seeded synthetic tilt
//! sensor, then prints the run summary as JSON.
//!
//! Usage: `sky-hop [level.json] [--seed N] [--save path] [--settings path]`

use std::path::PathBuf;
use std::process::ExitCode;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use sky_hop::consts::SIM_DT;
use sky_hop::sim::{Entity, HorizontalBias, LevelData, RunSummary, load_level};
use sky_hop::{Hud, JsonFileStore, Presentation, RunLoop, Settings};

/// Give up after two minutes of simulated play
const MAX_FRAMES: u32 = 60 * 120;
/// The tilt sensor fires every 0.2 s
const SENSOR_INTERVAL_FRAMES: u32 = 12;

struct Args {
    level: Option<PathBuf>,
    seed: u64,
    save: PathBuf,
    settings: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        level: None,
        seed: 0x5EED,
        save: PathBuf::from("sky-hop-save.json"),
        settings: None,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--seed" => {
                let value = iter.next().ok_or("--seed needs a value")?;
                args.seed = value
                    .parse()
                    .map_err(|e| format!("invalid seed '{value}': {e}"))?;
            }
            "--save" => args.save = iter.next().ok_or("--save needs a path")?.into(),
            "--settings" => {
                args.settings = Some(iter.next().ok_or("--settings needs a path")?.into())
            }
            flag if flag.starts_with("--") => return Err(format!("unknown flag {flag}")),
            path => args.level = Some(PathBuf::from(path)),
        }
    }
    Ok(args)
}

/// Logs HUD refreshes
struct LogHud;

impl Hud for LogHud {
    fn update_hud(&mut self, score: u64, stars: u32) {
        log::debug!("HUD: score {score}, stars {stars}");
    }
}

/// Prints the final summary
struct PrintSummary;

impl Presentation for PrintSummary {
    fn present_end_screen(&mut self, summary: &RunSummary) {
        match serde_json::to_string_pretty(summary) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Failed to encode summary: {e}"),
        }
    }
}

/// Synthetic accelerometer: tilts toward the nearest entity above the
/// player, with some noise so runs differ per seed
struct TiltSensor {
    rng: Pcg32,
    bias: HorizontalBias,
    weight: f32,
}

impl TiltSensor {
    fn sample(&mut self, player_x: f32, target_x: Option<f32>) {
        let aim = target_x.map_or(0.0, |x| ((x - player_x) / 160.0).clamp(-1.0, 1.0));
        let noise = self.rng.random_range(-0.25..0.25);
        self.bias.sample(aim + noise, self.weight);
    }
}

fn nearest_above(entities: &[Entity], player_y: f32) -> Option<f32> {
    entities
        .iter()
        .filter(|e| e.is_live() && e.pos().y > player_y)
        .min_by(|a, b| a.pos().y.total_cmp(&b.pos().y))
        .map(|e| e.pos().x)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("usage: sky-hop [level.json] [--seed N] [--save path] [--settings path]");
            return ExitCode::from(2);
        }
    };

    let data = match &args.level {
        Some(path) => LevelData::from_path(path),
        None => LevelData::demo(),
    };
    let level = match data.and_then(|d| load_level(&d)) {
        Ok(level) => level,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let settings = args
        .settings
        .as_deref()
        .map(Settings::load)
        .unwrap_or_default();
    let weight = settings.bias_smoothing;

    log::info!("Sky Hop starting with seed {}", args.seed);

    let mut run = RunLoop::new(
        level,
        settings,
        Box::new(LogHud),
        Box::new(JsonFileStore::open(&args.save)),
        Box::new(PrintSummary),
    );
    let mut sensor = TiltSensor {
        rng: Pcg32::seed_from_u64(args.seed),
        bias: run.bias(),
        weight,
    };

    run.tap();
    for frame in 0..MAX_FRAMES {
        if frame % SENSOR_INTERVAL_FRAMES == 0 {
            let state = run.state();
            let target = nearest_above(&state.entities, state.player.pos.y);
            sensor.sample(state.player.pos.x, target);
        }

        if let Err(e) = run.step_reference(SIM_DT) {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
        if run.is_ended() {
            return ExitCode::SUCCESS;
        }
    }

    log::warn!("Run still going after {} frames, stopping", MAX_FRAMES);
    ExitCode::SUCCESS
}
