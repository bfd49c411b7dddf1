//! Data-driven game balance
//!
//! Loaded from JSON; any field left out falls back to the default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::LIVES_CAP;
use crate::error::{KiloError, Result};

/// Balance values the simulation reads every tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Player movement speed (pixels per frame)
    pub player_speed: f32,
    /// Lives at the start of a run
    pub starting_lives: u8,
    /// Most lives a Life pickup can raise the player to
    pub max_lives: u8,
    /// Invincibility granted after a non-fatal hit (frames)
    pub invincibility_frames: f32,
    /// Duration of Spread/Shield/Speed pickups (frames)
    pub powerup_duration: f32,
    /// Probability that a destroyed enemy drops a pickup
    pub powerup_drop_chance: f64,
    /// Frames between player shots
    pub shoot_cooldown: f32,
    /// Interlude between waves (frames)
    pub between_wave_frames: f32,
    /// Lead-in before the first wave of a run (frames)
    pub first_wave_delay: f32,
    /// Number of background stars
    pub star_count: usize,
    /// Particle cap; the oldest particle is dropped when full
    pub max_particles: usize,
    /// Fire every time the cooldown allows, regardless of input
    pub auto_fire: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_speed: 5.0,
            starting_lives: 3,
            max_lives: LIVES_CAP,
            invincibility_frames: 120.0,
            powerup_duration: 600.0, // 10 seconds at 60 Hz
            powerup_drop_chance: 0.25,
            shoot_cooldown: 8.0,
            between_wave_frames: 120.0,
            first_wave_delay: 60.0,
            star_count: 150,
            max_particles: 512,
            auto_fire: false,
        }
    }
}

impl Tuning {
    /// Read tuning from a JSON file and validate it
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::debug!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Parse and validate tuning from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_lives == 0 || self.max_lives > LIVES_CAP {
            return Err(KiloError::InvalidTuning(format!(
                "max_lives must be in 1..={LIVES_CAP}, got {}",
                self.max_lives
            )));
        }
        if self.starting_lives == 0 || self.starting_lives > self.max_lives {
            return Err(KiloError::InvalidTuning(format!(
                "starting_lives must be in 1..={}, got {}",
                self.max_lives, self.starting_lives
            )));
        }
        if !(0.0..=1.0).contains(&self.powerup_drop_chance) {
            return Err(KiloError::InvalidTuning(format!(
                "powerup_drop_chance must be in [0, 1], got {}",
                self.powerup_drop_chance
            )));
        }
        let frame_values = [
            ("player_speed", self.player_speed),
            ("invincibility_frames", self.invincibility_frames),
            ("powerup_duration", self.powerup_duration),
            ("shoot_cooldown", self.shoot_cooldown),
            ("between_wave_frames", self.between_wave_frames),
            ("first_wave_delay", self.first_wave_delay),
        ];
        for (name, value) in frame_values {
            if !value.is_finite() || value < 0.0 {
                return Err(KiloError::InvalidTuning(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}
