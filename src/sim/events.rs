//! Effect events emitted by the simulation
//!
//! Fire-and-forget notifications for the audio, particle and storage
//! collaborators. The core never waits for them to be handled.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{EnemyKind, GamePhase, PowerUpKind};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Player fired
    Laser,
    /// Enemy or player ship destroyed
    Explosion,
    /// Pickup collected
    PowerUp,
    /// Enemy damaged but alive, or shield absorbed a hit
    Hit,
}

/// Everything that happened during one tick, in the order it happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Play a sound
    Sound(SoundEffect),
    /// An enemy's health reached zero
    EnemyDestroyed {
        id: u32,
        kind: EnemyKind,
        /// Enemy center at the moment of destruction
        pos: Vec2,
        points: u64,
    },
    /// A destroyed enemy dropped a pickup
    PowerUpDropped { id: u32, kind: PowerUpKind, pos: Vec2 },
    /// The player lost a life
    PlayerHit { lives_left: u8 },
    /// The shield soaked up a hit instead of the player
    ShieldAbsorbed,
    /// The player touched a pickup
    PowerUpCollected { kind: PowerUpKind },
    /// A wave's spawn queue was built (wave is 0-based)
    WaveStarted { wave: u32, boss: bool, enemies: u32 },
    /// Every enemy of the wave is gone
    WaveCleared { wave: u32 },
    /// Game phase transition
    PhaseChanged { from: GamePhase, to: GamePhase },
    /// The run ended
    GameOver { score: u64, wave: u32 },
    /// Ask the host to store a new best score
    PersistHighScore { score: u64 },
}
