//! Kilo Shooter headless runner
//!
//! Drives the simulation with a simple autopilot at the nominal frame rate,
//! the way a rendering host would, and records every finished run on the
//! leaderboard.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use kilo_shooter::consts::NOMINAL_DT;
use kilo_shooter::sim::{Bounds, GameEvent, GamePhase, GameState, TickInput, tick};
use kilo_shooter::{HighScores, Tuning};

/// Default number of frames to simulate (10 minutes at 60 Hz)
const DEFAULT_FRAMES: u64 = 36_000;
/// Frames spent on the game-over screen before restarting
const GAME_OVER_PAUSE: u32 = 120;

#[derive(Parser)]
#[command(name = "kilo-shooter")]
#[command(about = "Run the Kilo Shooter simulation headless with an autopilot")]
struct Args {
    /// Tuning JSON file (defaults are used when omitted)
    tuning: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(default_value_t = DEFAULT_FRAMES)]
    frames: u64,

    /// Leaderboard file
    #[arg(long, env = "KILO_SHOOTER_SCORES", default_value = "kilo_highscores.json")]
    scores: PathBuf,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    log::info!("Kilo Shooter (headless) starting...");

    let tuning = match &args.tuning {
        Some(path) => match Tuning::load(path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Bad tuning file {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };
    let frames = args.frames;

    let scores_path = args.scores;
    let mut high_scores = HighScores::load(&scores_path).unwrap_or_else(|e| {
        log::warn!("Could not read {}: {}", scores_path.display(), e);
        HighScores::new()
    });
    if high_scores.is_empty() {
        log::info!("Leaderboard is empty");
    }

    let bounds = Bounds::default();
    let mut state = GameState::new(
        now_ms() as u64,
        high_scores.top_score().unwrap_or(0),
        bounds,
        tuning,
    );

    let mut runs = 0u32;
    let mut game_over_frames = 0u32;
    let mut input = TickInput {
        begin: true,
        ..Default::default()
    };

    for _ in 0..frames {
        let events = tick(&mut state, &input, bounds, NOMINAL_DT);
        for event in &events {
            match event {
                GameEvent::PhaseChanged {
                    to: GamePhase::Playing,
                    ..
                } => runs += 1,
                GameEvent::PersistHighScore { score } => {
                    log::info!("New best score {}", score);
                }
                GameEvent::GameOver { score, .. } => {
                    if let Some(rank) = high_scores.record(event, now_ms()) {
                        log::info!("Score {} ranked #{}", score, rank);
                        if let Err(e) = high_scores.save(&scores_path) {
                            log::warn!("Could not save {}: {}", scores_path.display(), e);
                        }
                    }
                }
                GameEvent::WaveStarted { wave, boss: true, .. } => {
                    log::info!("Boss incoming on wave {}", wave + 1);
                }
                _ => {}
            }
        }

        input = match state.phase {
            GamePhase::Playing => {
                game_over_frames = 0;
                autopilot(&state)
            }
            GamePhase::GameOver => {
                game_over_frames += 1;
                TickInput {
                    restart: game_over_frames >= GAME_OVER_PAUSE,
                    ..Default::default()
                }
            }
            GamePhase::Start => TickInput {
                begin: true,
                ..Default::default()
            },
        };
    }

    let hud = state.hud();
    log::info!(
        "Finished after {} frames: {} runs, current score {}, wave {}, best {}",
        frames,
        runs,
        hud.score,
        hud.wave,
        hud.high_score
    );
}

/// Chase the lowest enemy horizontally and keep firing
fn autopilot(state: &GameState) -> TickInput {
    let player_x = state.player.center().x;
    let target = state
        .enemies
        .iter()
        .filter(|e| e.pos.y > 0.0)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
        .map(|e| e.center().x);

    let mut input = TickInput {
        fire: true,
        ..Default::default()
    };
    if let Some(x) = target {
        input.left = x < player_x - 4.0;
        input.right = x > player_x + 4.0;
    }
    input
}

fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0)
}
