//! Kilo Shooter - a vertical arcade shooter
//!
//! Core modules:
//! - `sim`: Frame simulation (movement, spawning, collisions, wave progression)
//! - `tuning`: Data-driven game balance
//! - `highscores`: Persisted leaderboard
//! - `error`: Errors for the fallible edges (files, config)
//!
//! Rendering, audio and input capture live outside this crate. They read the
//! `GameState`, feed `TickInput` and react to the `GameEvent`s each tick returns.

pub mod error;
pub mod highscores;
pub mod sim;
pub mod tuning;

pub use error::KiloError;
pub use highscores::HighScores;
pub use tuning::Tuning;

/// Game configuration constants
///
/// Time is measured in frames at the nominal 60 Hz rate, so `dt == 1.0` is
/// one nominal frame.
pub mod consts {
    /// Nominal frame step
    pub const NOMINAL_DT: f32 = 1.0;
    /// Largest frame step the simulation accepts (a stalled host catches up at most 3 frames)
    pub const MAX_DT: f32 = 3.0;

    /// Every Nth wave is a boss wave (wave 0 excluded)
    pub const BOSS_WAVE_INTERVAL: u32 = 5;

    /// Player ship defaults
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 44.0;
    pub const PLAYER_HEALTH: u32 = 3;
    /// Hard cap on lives, regardless of tuning
    pub const LIVES_CAP: u8 = 5;
    /// Movement multiplier while speed boost is active
    pub const SPEED_BOOST_MULTIPLIER: f32 = 1.6;
    /// Player may not fly above this fraction of the screen height
    pub const PLAYER_BAND_TOP: f32 = 0.3;
    /// Gap kept between the ship and the bottom edge
    pub const PLAYER_BOTTOM_GAP: f32 = 10.0;
    /// Respawn offset from the bottom edge
    pub const PLAYER_RESPAWN_OFFSET: f32 = 80.0;

    /// Player bullets
    pub const PLAYER_BULLET_SPEED: f32 = 10.0;
    pub const PLAYER_BULLET_WIDTH: f32 = 4.0;
    pub const PLAYER_BULLET_HEIGHT: f32 = 12.0;
    /// Horizontal drift of the outer spread-shot bullets
    pub const SPREAD_SHOT_VX: f32 = 2.0;

    /// Enemy bullets
    pub const ENEMY_BULLET_SIZE: f32 = 6.0;
    pub const ENEMY_BULLET_SPEED: f32 = 4.0;
    /// Random extra downward speed for regular enemy shots
    pub const ENEMY_BULLET_SPEED_JITTER: f32 = 2.0;

    /// Pruning margins
    pub const BULLET_MARGIN: f32 = 20.0;
    pub const ENEMY_EXIT_MARGIN: f32 = 100.0;
    pub const POWERUP_EXIT_MARGIN: f32 = 30.0;

    /// Power-up pickups
    pub const POWERUP_SIZE: f32 = 20.0;
    pub const POWERUP_DRIFT: f32 = 1.5;

    /// Background stars
    pub const STAR_LAYERS: usize = 3;
}
