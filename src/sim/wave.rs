//! Wave composition
//!
//! Pure functions of the wave index. Deciding when a wave is over belongs to
//! the spawner.

use serde::{Deserialize, Serialize};

use super::state::EnemyKind;
use crate::consts::BOSS_WAVE_INTERVAL;

/// One group of identical enemies, released `delay` frames apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnGroup {
    pub kind: EnemyKind,
    pub count: u32,
    /// Frames between consecutive spawns of this group
    pub delay: u32,
}

impl SpawnGroup {
    pub const fn new(kind: EnemyKind, count: u32, delay: u32) -> Self {
        Self { kind, count, delay }
    }
}

/// Declarative description of one wave
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveManifest {
    /// Groups run one after another, in order
    pub groups: Vec<SpawnGroup>,
    pub boss: bool,
}

impl WaveManifest {
    /// Enemies the wave owes before it can clear
    pub fn total_enemies(&self) -> u32 {
        self.groups.iter().map(|g| g.count).sum()
    }
}

/// Every fifth wave, never the first
pub fn is_boss_wave(wave_index: u32) -> bool {
    wave_index > 0 && wave_index.is_multiple_of(BOSS_WAVE_INTERVAL)
}

/// Difficulty grows by one every two waves, without bound
pub fn difficulty(wave_index: u32) -> u32 {
    wave_index / 2
}

/// Build the manifest for a wave
pub fn generate_manifest(wave_index: u32) -> WaveManifest {
    use EnemyKind::*;

    let d = difficulty(wave_index);

    if is_boss_wave(wave_index) {
        return WaveManifest {
            groups: vec![SpawnGroup::new(Basic, 2 + d, 20), SpawnGroup::new(Boss, 1, 60)],
            boss: true,
        };
    }

    // Templates cycle, each scaled by difficulty
    let groups = match wave_index % 4 {
        0 => vec![SpawnGroup::new(Basic, 4 + d * 2, 30)],
        1 => vec![SpawnGroup::new(Basic, 3 + d, 25), SpawnGroup::new(Zigzag, 2 + d, 30)],
        2 => vec![SpawnGroup::new(Zigzag, 3 + d, 25), SpawnGroup::new(Swooper, 2 + d, 35)],
        _ => vec![
            SpawnGroup::new(Basic, 2 + d, 20),
            SpawnGroup::new(Tank, 1 + d / 2, 50),
            SpawnGroup::new(Zigzag, 2 + d, 25),
        ],
    };

    WaveManifest { groups, boss: false }
}
