//! Game state and core simulation types
//!
//! Everything a run owns lives in `GameState`, which every subsystem takes by
//! `&mut`. Positions are the top-left corner of each entity's box.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::spawner::SpawnQueueEntry;
use crate::consts::*;
use crate::tuning::Tuning;

/// Particle and entity colours (0xRRGGBB)
pub mod palette {
    pub const CYAN: u32 = 0x00ffff;
    pub const ORANGE: u32 = 0xff8800;
    pub const GREEN: u32 = 0x00ff66;
    pub const RED: u32 = 0xff3333;
    pub const WHITE: u32 = 0xffffff;
    pub const ENEMY_BASIC: u32 = 0xff4444;
    pub const ENEMY_ZIGZAG: u32 = 0xff8800;
    pub const ENEMY_SWOOPER: u32 = 0xff00ff;
    pub const ENEMY_TANK: u32 = 0x888888;
    pub const BOSS: u32 = 0xff0044;
}

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for the begin intent
    Start,
    /// Active gameplay
    Playing,
    /// Run ended
    GameOver,
}

/// Play field size in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Strict overlap; touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.min.x + other.size.x
            && self.min.x + self.size.x > other.min.x
            && self.min.y < other.min.y + other.size.y
            && self.min.y + self.size.y > other.min.y
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }
}

/// Remaining frames of each timed power-up (0 = inactive)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerUpTimers {
    pub spread_shot: f32,
    pub shield: f32,
    pub speed_boost: f32,
}

impl PowerUpTimers {
    /// Count every timer down, flooring at zero
    pub fn tick(&mut self, dt: f32) {
        self.spread_shot = (self.spread_shot - dt).max(0.0);
        self.shield = (self.shield - dt).max(0.0);
        self.speed_boost = (self.speed_boost - dt).max(0.0);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// The player's ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub lives: u8,
    /// Advisory only; combat takes lives directly
    pub health: u32,
    pub max_health: u32,
    pub invincible_timer: f32,
    pub power_ups: PowerUpTimers,
    pub shoot_cooldown: f32,
    /// Thruster animation phase (cosmetic)
    pub thruster_phase: f32,
}

impl Player {
    pub fn new(bounds: Bounds, tuning: &Tuning) -> Self {
        let mut player = Self {
            pos: Vec2::ZERO,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            speed: tuning.player_speed,
            lives: tuning.starting_lives.clamp(1, tuning.max_lives.clamp(1, LIVES_CAP)),
            health: PLAYER_HEALTH,
            max_health: PLAYER_HEALTH,
            invincible_timer: 0.0,
            power_ups: PowerUpTimers::default(),
            shoot_cooldown: 0.0,
            thruster_phase: 0.0,
        };
        player.recenter(bounds);
        player
    }

    /// Move to the default spawn point, bottom center
    pub fn recenter(&mut self, bounds: Bounds) {
        self.pos = Vec2::new(
            bounds.width / 2.0 - self.size.x / 2.0,
            bounds.height - PLAYER_RESPAWN_OFFSET,
        );
    }

    /// Keep the ship inside the lower part of the play field
    pub fn clamp_to(&mut self, bounds: Bounds) {
        let max_x = (bounds.width - self.size.x).max(0.0);
        let min_y = bounds.height * PLAYER_BAND_TOP;
        let max_y = (bounds.height - self.size.y - PLAYER_BOTTOM_GAP).max(min_y);
        self.pos.x = self.pos.x.clamp(0.0, max_x);
        self.pos.y = self.pos.y.clamp(min_y, max_y);
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_timer > 0.0
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.aabb().center()
    }
}

/// Who fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Enemy,
}

/// A projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub damage: i32,
    pub owner: BulletOwner,
    /// Consumed by a collision this frame, pruned at the end of the pass
    #[serde(skip)]
    pub spent: bool,
}

impl Bullet {
    pub fn player(pos: Vec2, vx: f32) -> Self {
        Self {
            pos,
            vel: Vec2::new(vx, -PLAYER_BULLET_SPEED),
            size: Vec2::new(PLAYER_BULLET_WIDTH, PLAYER_BULLET_HEIGHT),
            damage: 1,
            owner: BulletOwner::Player,
            spent: false,
        }
    }

    pub fn enemy(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            size: Vec2::splat(ENEMY_BULLET_SIZE),
            damage: 1,
            owner: BulletOwner::Enemy,
            spent: false,
        }
    }

    pub fn is_player(&self) -> bool {
        self.owner == BulletOwner::Player
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// How an enemy moves, fixed by its kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementPattern {
    Straight,
    Zigzag,
    Swoop,
    Boss,
}

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Zigzag,
    Swooper,
    Tank,
    Boss,
}

/// Per-kind stat block
#[derive(Debug, Clone, Copy)]
pub struct EnemyStats {
    pub size: Vec2,
    pub speed: f32,
    pub points: u64,
    pub health: i32,
    pub pattern: MovementPattern,
    /// Shoot interval is `base + random * jitter` frames
    pub shoot_interval: (f32, f32),
    /// Pattern amplitude is `base + random * jitter` pixels
    pub amplitude: (f32, f32),
    pub color: u32,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Basic,
        EnemyKind::Zigzag,
        EnemyKind::Swooper,
        EnemyKind::Tank,
        EnemyKind::Boss,
    ];

    pub fn stats(self) -> EnemyStats {
        match self {
            EnemyKind::Basic => EnemyStats {
                size: Vec2::new(30.0, 30.0),
                speed: 2.0,
                points: 100,
                health: 1,
                pattern: MovementPattern::Straight,
                shoot_interval: (90.0, 60.0),
                amplitude: (0.0, 0.0),
                color: palette::ENEMY_BASIC,
            },
            EnemyKind::Zigzag => EnemyStats {
                size: Vec2::new(28.0, 28.0),
                speed: 2.5,
                points: 200,
                health: 1,
                pattern: MovementPattern::Zigzag,
                shoot_interval: (100.0, 40.0),
                amplitude: (80.0, 60.0),
                color: palette::ENEMY_ZIGZAG,
            },
            EnemyKind::Swooper => EnemyStats {
                size: Vec2::new(32.0, 26.0),
                speed: 3.0,
                points: 300,
                health: 1,
                pattern: MovementPattern::Swoop,
                shoot_interval: (70.0, 50.0),
                amplitude: (120.0, 0.0),
                color: palette::ENEMY_SWOOPER,
            },
            EnemyKind::Tank => EnemyStats {
                size: Vec2::new(40.0, 40.0),
                speed: 1.0,
                points: 500,
                health: 5,
                pattern: MovementPattern::Straight,
                shoot_interval: (50.0, 30.0),
                amplitude: (0.0, 0.0),
                color: palette::ENEMY_TANK,
            },
            EnemyKind::Boss => EnemyStats {
                size: Vec2::new(120.0, 80.0),
                speed: 1.5,
                points: 5000,
                health: 50,
                pattern: MovementPattern::Boss,
                shoot_interval: (20.0, 0.0),
                amplitude: (0.0, 0.0),
                color: palette::BOSS,
            },
        }
    }

    pub fn pattern(self) -> MovementPattern {
        self.stats().pattern
    }

    pub fn is_boss(self) -> bool {
        self == EnemyKind::Boss
    }
}

/// An enemy ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub speed: f32,
    pub points: u64,
    pub shoot_timer: f32,
    pub shoot_interval: f32,
    pub pattern_timer: f32,
    pub pattern_amplitude: f32,
    /// X the oscillating patterns swing around
    pub anchor_x: f32,
}

/// Spawn height above the screen for regular enemies
const ENEMY_SPAWN_Y: f32 = -60.0;
/// Spawn height above the screen for the boss
const BOSS_SPAWN_Y: f32 = -120.0;
/// Horizontal spawn margin for regular enemies
const ENEMY_SPAWN_MARGIN: f32 = 50.0;

impl Enemy {
    /// Build an enemy of the given kind just above the play field
    pub fn spawn(id: u32, kind: EnemyKind, bounds: Bounds, rng: &mut impl Rng) -> Self {
        let stats = kind.stats();
        let (x, y) = if kind.is_boss() {
            (bounds.width / 2.0 - stats.size.x / 2.0, BOSS_SPAWN_Y)
        } else {
            let span = (bounds.width - 2.0 * ENEMY_SPAWN_MARGIN).max(0.0);
            (ENEMY_SPAWN_MARGIN + rng.random::<f32>() * span, ENEMY_SPAWN_Y)
        };
        let (interval_base, interval_jitter) = stats.shoot_interval;
        let (amp_base, amp_jitter) = stats.amplitude;

        Self {
            id,
            kind,
            pos: Vec2::new(x, y),
            size: stats.size,
            health: stats.health,
            max_health: stats.health,
            speed: stats.speed,
            points: stats.points,
            shoot_timer: 0.0,
            shoot_interval: interval_base + rng.random::<f32>() * interval_jitter,
            pattern_timer: 0.0,
            pattern_amplitude: amp_base + rng.random::<f32>() * amp_jitter,
            anchor_x: x,
        }
    }

    pub fn pattern(&self) -> MovementPattern {
        self.kind.pattern()
    }

    pub fn is_boss(&self) -> bool {
        self.kind.is_boss()
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.aabb().center()
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Spread,
    Shield,
    Speed,
    Life,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Spread,
        PowerUpKind::Shield,
        PowerUpKind::Speed,
        PowerUpKind::Life,
    ];

    /// Uniform pick over all kinds
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// A falling pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
}

impl PowerUp {
    /// A pickup centred horizontally on `center` with its top edge at
    /// `center.y`, drifting straight down
    pub fn dropped_at(id: u32, kind: PowerUpKind, center: Vec2) -> Self {
        Self {
            id,
            kind,
            pos: Vec2::new(center.x - POWERUP_SIZE / 2.0, center.y),
            size: Vec2::splat(POWERUP_SIZE),
            vel: Vec2::new(0.0, POWERUP_DRIFT),
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub max_life: f32,
    pub color: u32,
    pub size: f32,
}

/// A background star
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    pub speed: f32,
    pub size: f32,
    pub brightness: f32,
}

/// Score and wave bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameProgress {
    pub score: u64,
    /// Best score shown on the HUD (tracks the live score once beaten)
    pub high_score: u64,
    /// Best score the host is known to have stored
    pub stored_high_score: u64,
    /// Current wave (0-based)
    pub wave_index: u32,
    /// Enemies still owed by the current wave
    pub wave_enemies_remaining: u32,
    /// Pending spawns, sorted by `spawn_at`
    pub spawn_queue: Vec<SpawnQueueEntry>,
    /// Frames since the current wave started
    pub wave_timer: f32,
    pub between_waves: bool,
    pub between_wave_timer: f32,
}

impl GameProgress {
    pub fn new(high_score: u64, lead_in: f32) -> Self {
        Self {
            score: 0,
            high_score,
            stored_high_score: high_score,
            wave_index: 0,
            wave_enemies_remaining: 0,
            spawn_queue: Vec::new(),
            wave_timer: 0.0,
            between_waves: true,
            between_wave_timer: lead_in,
        }
    }

    /// One enemy of the wave is accounted for (destroyed or escaped)
    pub fn settle_enemy(&mut self) {
        self.wave_enemies_remaining = self.wave_enemies_remaining.saturating_sub(1);
    }
}

/// HUD snapshot for the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub phase: GamePhase,
    pub score: u64,
    pub high_score: u64,
    /// 1-based wave number
    pub wave: u32,
    pub lives: u8,
    pub spread_shot: bool,
    pub shield: bool,
    pub speed_boost: bool,
    /// Frames left in the interlude (0 during a wave)
    pub between_wave_countdown: f32,
    /// The upcoming wave is a boss wave
    pub boss_incoming: bool,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed; every reset reseeds from it
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    pub bounds: Bounds,
    pub phase: GamePhase,
    /// Simulated frames this run
    pub time_ticks: u64,
    pub player: Player,
    /// Bullets in firing order
    pub bullets: Vec<Bullet>,
    /// Enemies in spawn order
    pub enemies: Vec<Enemy>,
    /// Pickups in drop order
    pub power_ups: Vec<PowerUp>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub stars: Vec<Star>,
    pub progress: GameProgress,
    /// Events raised during the current tick
    pub(crate) events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a game on the title screen
    pub fn new(seed: u64, high_score: u64, bounds: Bounds, tuning: Tuning) -> Self {
        if let Err(e) = tuning.validate() {
            log::warn!("Running with out-of-range tuning: {}", e);
        }
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: Player::new(bounds, &tuning),
            progress: GameProgress::new(high_score, tuning.first_wave_delay),
            tuning,
            bounds,
            phase: GamePhase::Start,
            time_ticks: 0,
            bullets: Vec::new(),
            enemies: Vec::new(),
            power_ups: Vec::new(),
            particles: Vec::new(),
            stars: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        };
        state.reset();
        state
    }

    /// Throw away the run and build a fresh one.
    ///
    /// Keeps the seed, tuning, bounds, phase and best scores.
    pub fn reset(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.time_ticks = 0;
        self.player = Player::new(self.bounds, &self.tuning);
        self.bullets.clear();
        self.enemies.clear();
        self.power_ups.clear();
        self.particles.clear();
        self.events.clear();
        self.next_id = 1;

        let best = self.progress.high_score.max(self.progress.score);
        let mut progress = GameProgress::new(best, self.tuning.first_wave_delay);
        progress.stored_high_score = self.progress.stored_high_score;
        self.progress = progress;

        self.scatter_stars();
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Queue an event for this tick
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take the events raised so far
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Burst of particles flying outward from `pos`
    pub fn spawn_particles(&mut self, pos: Vec2, count: usize, color: u32, speed: f32) {
        let cap = self.tuning.max_particles;
        if cap == 0 {
            return;
        }
        for i in 0..count {
            if self.particles.len() >= cap {
                // Remove oldest particles to make room
                self.particles.remove(0);
            }
            let angle = std::f32::consts::TAU * i as f32 / count as f32
                + self.rng.random::<f32>() * 0.5;
            let spd = speed * (0.5 + self.rng.random::<f32>());
            self.particles.push(Particle {
                pos,
                vel: Vec2::new(angle.cos(), angle.sin()) * spd,
                life: 30.0 + self.rng.random::<f32>() * 20.0,
                max_life: 50.0,
                color,
                size: 2.0 + self.rng.random::<f32>() * 3.0,
            });
        }
    }

    /// Fill the background with stars spread over the play field
    pub fn scatter_stars(&mut self) {
        let Bounds { width, height } = self.bounds;
        self.stars = (0..self.tuning.star_count)
            .map(|i| {
                let layer = (i % STAR_LAYERS) as f32;
                Star {
                    pos: Vec2::new(
                        self.rng.random::<f32>() * width,
                        self.rng.random::<f32>() * height,
                    ),
                    speed: 0.5 + layer * 1.2,
                    size: 1.0 + layer * 0.5,
                    brightness: 0.3 + layer * 0.25,
                }
            })
            .collect();
    }

    /// Snapshot of everything the HUD shows
    pub fn hud(&self) -> Hud {
        let progress = &self.progress;
        let timers = &self.player.power_ups;
        Hud {
            phase: self.phase,
            score: progress.score,
            high_score: progress.high_score.max(progress.score),
            wave: progress.wave_index + 1,
            lives: self.player.lives,
            spread_shot: timers.spread_shot > 0.0,
            shield: timers.shield > 0.0,
            speed_boost: timers.speed_boost > 0.0,
            between_wave_countdown: if progress.between_waves {
                progress.between_wave_timer
            } else {
                0.0
            },
            boss_incoming: progress.between_waves
                && super::wave::is_boss_wave(progress.wave_index),
        }
    }
}
