//! Frame simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering,
//! audio and platform code:
//! - One synchronous `tick` per rendered frame
//! - Seeded RNG only
//! - Stable iteration order (insertion order)
//! - Removals deferred until a pass completes

pub mod collision;
pub mod events;
pub mod movement;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod wave;

pub use events::{GameEvent, SoundEffect};
pub use spawner::SpawnQueueEntry;
pub use state::{
    Aabb, Bounds, Bullet, BulletOwner, Enemy, EnemyKind, GamePhase, GameProgress, GameState, Hud,
    MovementPattern, Particle, Player, PowerUp, PowerUpKind, PowerUpTimers, Star,
};
pub use tick::{TickInput, clamp_dt, tick};
pub use wave::{SpawnGroup, WaveManifest, generate_manifest, is_boss_wave};
