//! Per-frame movement, timers and firing
//!
//! Everything here scales with `dt` (frames at 60 Hz). Out-of-bounds pruning
//! runs last so the collision pass only ever sees live, on-field entities.

use glam::Vec2;
use rand::Rng;

use super::events::{GameEvent, SoundEffect};
use super::state::{Bounds, Bullet, Enemy, GameState, MovementPattern, Player};
use super::tick::TickInput;
use crate::consts::*;

/// Pattern frequencies (radians per frame of pattern time)
const ZIGZAG_FREQUENCY: f32 = 0.05;
const SWOOP_FREQUENCY: f32 = 0.03;
const BOSS_FREQUENCY: f32 = 0.02;
/// Swoopers dive between these pattern times
const SWOOP_DIVE_WINDOW: (f32, f32) = (60.0, 120.0);
const SWOOP_DIVE_MULTIPLIER: f32 = 2.0;
/// Altitude the boss settles at
const BOSS_HOLD_Y: f32 = 60.0;
/// Boss sweep amplitude as a fraction of screen width
const BOSS_SWEEP: f32 = 0.3;

/// Advance every entity by one frame, then prune what left the field
pub fn update(state: &mut GameState, input: &TickInput, dt: f32) {
    let bounds = state.bounds;

    move_player(&mut state.player, input, bounds, dt);
    tick_player_timers(&mut state.player, dt);
    if input.fire || state.tuning.auto_fire {
        player_shoot(state);
    }

    for star in &mut state.stars {
        star.pos.y += star.speed * dt;
        if star.pos.y > bounds.height {
            star.pos.y = 0.0;
            star.pos.x = state.rng.random::<f32>() * bounds.width;
        }
    }

    for bullet in &mut state.bullets {
        bullet.pos += bullet.vel * dt;
    }

    for enemy in &mut state.enemies {
        if advance_enemy(enemy, bounds, dt) {
            enemy_shoot(enemy, &mut state.bullets, &mut state.rng);
        }
    }

    for power_up in &mut state.power_ups {
        power_up.pos += power_up.vel * dt;
    }

    for particle in &mut state.particles {
        particle.pos += particle.vel * dt;
        particle.life -= dt;
        particle.size *= 0.98;
    }

    prune_out_of_bounds(state);
}

/// Move by input direction, then clamp into the player's band
pub fn move_player(player: &mut Player, input: &TickInput, bounds: Bounds, dt: f32) {
    let boost = if player.power_ups.speed_boost > 0.0 {
        SPEED_BOOST_MULTIPLIER
    } else {
        1.0
    };
    let step = player.speed * boost * dt;
    player.pos += input.direction() * step;
    player.clamp_to(bounds);
    player.thruster_phase += dt;
}

/// Count down power-ups, invincibility and the gun cooldown
pub fn tick_player_timers(player: &mut Player, dt: f32) {
    player.power_ups.tick(dt);
    player.invincible_timer = (player.invincible_timer - dt).max(0.0);
    player.shoot_cooldown = (player.shoot_cooldown - dt).max(0.0);
}

/// Fire if the gun is ready: one shot, or three while spread shot is active
pub fn player_shoot(state: &mut GameState) {
    let player = &mut state.player;
    if player.shoot_cooldown > 0.0 {
        return;
    }
    player.shoot_cooldown = state.tuning.shoot_cooldown;

    let cx = player.pos.x + player.size.x / 2.0;
    let y = player.pos.y - 10.0;
    let half = PLAYER_BULLET_WIDTH / 2.0;

    state.bullets.push(Bullet::player(Vec2::new(cx - half, y), 0.0));
    if player.power_ups.spread_shot > 0.0 {
        state
            .bullets
            .push(Bullet::player(Vec2::new(cx - half - 10.0, y), -SPREAD_SHOT_VX));
        state
            .bullets
            .push(Bullet::player(Vec2::new(cx - half + 10.0, y), SPREAD_SHOT_VX));
    }
    state.emit(GameEvent::Sound(SoundEffect::Laser));
}

/// Apply the enemy's movement pattern. Returns true when it should fire.
pub fn advance_enemy(enemy: &mut Enemy, bounds: Bounds, dt: f32) -> bool {
    enemy.pattern_timer += dt;
    enemy.shoot_timer += dt;
    let t = enemy.pattern_timer;

    match enemy.pattern() {
        MovementPattern::Straight => {
            enemy.pos.y += enemy.speed * dt;
        }
        MovementPattern::Zigzag => {
            enemy.pos.y += enemy.speed * dt;
            enemy.pos.x = enemy.anchor_x + (t * ZIGZAG_FREQUENCY).sin() * enemy.pattern_amplitude;
        }
        MovementPattern::Swoop => {
            enemy.pos.y += enemy.speed * dt;
            enemy.pos.x = enemy.anchor_x + (t * SWOOP_FREQUENCY).sin() * enemy.pattern_amplitude;
            if t > SWOOP_DIVE_WINDOW.0 && t < SWOOP_DIVE_WINDOW.1 {
                enemy.pos.y += enemy.speed * SWOOP_DIVE_MULTIPLIER * dt;
            }
        }
        MovementPattern::Boss => {
            if enemy.pos.y < BOSS_HOLD_Y {
                enemy.pos.y += enemy.speed * dt;
            } else {
                enemy.pos.x = bounds.width / 2.0 - enemy.size.x / 2.0
                    + (t * BOSS_FREQUENCY).sin() * bounds.width * BOSS_SWEEP;
            }
        }
    }

    let max_x = (bounds.width - enemy.size.x).max(0.0);
    enemy.pos.x = enemy.pos.x.clamp(0.0, max_x);

    if enemy.shoot_timer >= enemy.shoot_interval && enemy.pos.y > 0.0 {
        enemy.shoot_timer = 0.0;
        return true;
    }
    false
}

/// Boss fires a five-way spread; everything else a single downward shot
pub fn enemy_shoot(enemy: &Enemy, bullets: &mut Vec<Bullet>, rng: &mut impl Rng) {
    let cx = enemy.pos.x + enemy.size.x / 2.0;
    let cy = enemy.pos.y + enemy.size.y;
    let half = ENEMY_BULLET_SIZE / 2.0;

    if enemy.is_boss() {
        for i in -2..=2 {
            let i = i as f32;
            bullets.push(Bullet::enemy(
                Vec2::new(cx - half + i * 20.0, cy),
                Vec2::new(i * 1.5, ENEMY_BULLET_SPEED),
            ));
        }
    } else {
        let vy = ENEMY_BULLET_SPEED + rng.random::<f32>() * ENEMY_BULLET_SPEED_JITTER;
        bullets.push(Bullet::enemy(Vec2::new(cx - half, cy), Vec2::new(0.0, vy)));
    }
}

/// Drop bullets, enemies, pickups and particles that left the field or expired.
///
/// Escaped enemies are settled against the wave but score nothing.
pub fn prune_out_of_bounds(state: &mut GameState) {
    let Bounds { width, height } = state.bounds;

    state.bullets.retain(|b| {
        b.pos.y > -BULLET_MARGIN
            && b.pos.y < height + BULLET_MARGIN
            && b.pos.x > -BULLET_MARGIN
            && b.pos.x < width + BULLET_MARGIN
    });

    let before = state.enemies.len();
    state.enemies.retain(|e| e.pos.y <= height + ENEMY_EXIT_MARGIN);
    let escaped = before - state.enemies.len();
    for _ in 0..escaped {
        state.progress.settle_enemy();
    }
    if escaped > 0 {
        log::debug!("{} enemies escaped off the bottom", escaped);
    }

    state
        .power_ups
        .retain(|p| p.pos.y < height + POWERUP_EXIT_MARGIN);
    state.particles.retain(|p| p.life > 0.0);
}
