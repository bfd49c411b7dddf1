//! Frame driver
//!
//! Runs one frame of simulation in fixed order and hands back the effect
//! events the frame produced.

use glam::Vec2;

use super::events::GameEvent;
use super::state::{Bounds, GamePhase, GameState};
use super::{collision, movement, spawner};
use crate::consts::MAX_DT;

/// Input snapshot for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Fire intent (held)
    pub fire: bool,
    /// Leave the title screen
    pub begin: bool,
    /// Start over from the game-over screen
    pub restart: bool,
}

impl TickInput {
    /// Unnormalised movement direction, +y is down
    pub fn direction(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// Clamp the host's frame delta to something the simulation can take in one step
pub fn clamp_dt(dt: f32) -> f32 {
    if dt.is_finite() {
        dt.clamp(0.0, MAX_DT)
    } else {
        0.0
    }
}

/// Advance the game by one frame and return what happened
pub fn tick(state: &mut GameState, input: &TickInput, bounds: Bounds, dt: f32) -> Vec<GameEvent> {
    apply_bounds(state, bounds);

    match state.phase {
        GamePhase::Playing => {}
        GamePhase::Start => {
            if input.begin {
                start_run(state);
            }
            return state.drain_events();
        }
        GamePhase::GameOver => {
            if input.restart || input.begin {
                start_run(state);
            }
            return state.drain_events();
        }
    }

    let dt = clamp_dt(dt);
    state.time_ticks += 1;

    movement::update(state, input, dt);
    spawner::tick(state, dt);
    collision::resolve(state);
    if state.phase == GamePhase::Playing {
        spawner::check_wave_complete(state);
    }

    let progress = &mut state.progress;
    progress.high_score = progress.high_score.max(progress.score);

    state.drain_events()
}

/// Reset everything the run owns and enter Playing
pub fn start_run(state: &mut GameState) {
    let from = state.phase;
    state.reset();
    state.phase = GamePhase::Playing;
    log::info!("Run started (seed {}, best {})", state.seed, state.progress.high_score);
    state.emit(GameEvent::PhaseChanged {
        from,
        to: GamePhase::Playing,
    });
}

/// Pick up a resized play field.
///
/// Non-finite or negative sizes are ignored and the previous field is kept.
/// Pickups are pulled back inside horizontally and stars that fell outside
/// are re-scattered; the player and enemies re-clamp on their next move.
fn apply_bounds(state: &mut GameState, bounds: Bounds) {
    if state.bounds == bounds {
        return;
    }
    let usable = |v: f32| v.is_finite() && v >= 0.0;
    if !usable(bounds.width) || !usable(bounds.height) {
        log::debug!(
            "Ignoring play field {}x{}, keeping {}x{}",
            bounds.width,
            bounds.height,
            state.bounds.width,
            state.bounds.height
        );
        return;
    }
    log::debug!(
        "Play field resized: {}x{} -> {}x{}",
        state.bounds.width,
        state.bounds.height,
        bounds.width,
        bounds.height
    );
    state.bounds = bounds;
    for power_up in &mut state.power_ups {
        let max_x = (bounds.width - power_up.size.x).max(0.0);
        power_up.pos.x = power_up.pos.x.clamp(0.0, max_x);
    }
    let outside = state
        .stars
        .iter()
        .any(|s| s.pos.x > bounds.width || s.pos.y > bounds.height);
    if outside {
        state.scatter_stars();
    }
}
