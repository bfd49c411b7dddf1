//! Collision detection and response
//!
//! One pass per frame, four stages in fixed order:
//! 1. player bullets vs enemies
//! 2. enemy bullets vs player
//! 3. enemy bodies vs player
//! 4. player vs pickups
//!
//! Collections are scanned in insertion order and removals are deferred to
//! the end of a stage, so "first match" is reproducible and an enemy stays
//! hittable by later bullets until its health crosses zero.

use glam::Vec2;
use rand::Rng;

use super::events::{GameEvent, SoundEffect};
use super::state::{EnemyKind, GamePhase, GameState, Player, PowerUp, PowerUpKind, palette};
use crate::consts::LIVES_CAP;
use crate::tuning::Tuning;

/// What a player bullet did to the enemy it struck
enum Strike {
    Damaged {
        at: Vec2,
    },
    Destroyed {
        id: u32,
        kind: EnemyKind,
        center: Vec2,
        points: u64,
    },
}

/// Resolve every interaction for this frame.
///
/// Stops as soon as the run ends; nothing resolves after a fatal hit.
pub fn resolve(state: &mut GameState) {
    let stages: [fn(&mut GameState); 4] = [
        player_bullets_vs_enemies,
        enemy_bullets_vs_player,
        enemies_vs_player,
        player_vs_power_ups,
    ];
    for stage in stages {
        if state.phase == GamePhase::GameOver {
            break;
        }
        stage(state);
    }
    state.bullets.retain(|b| !b.spent);
}

/// Each player bullet damages the first live enemy it overlaps, then is spent
pub fn player_bullets_vs_enemies(state: &mut GameState) {
    let mut strikes = Vec::new();

    for bullet in state.bullets.iter_mut().filter(|b| b.is_player() && !b.spent) {
        let bullet_box = bullet.aabb();
        let Some(enemy) = state
            .enemies
            .iter_mut()
            .find(|e| !e.is_dead() && e.aabb().overlaps(&bullet_box))
        else {
            continue;
        };

        enemy.health -= bullet.damage;
        bullet.spent = true;

        strikes.push(if enemy.is_dead() {
            Strike::Destroyed {
                id: enemy.id,
                kind: enemy.kind,
                center: enemy.center(),
                points: enemy.points,
            }
        } else {
            Strike::Damaged { at: bullet.pos }
        });
    }

    for strike in strikes {
        match strike {
            Strike::Damaged { at } => {
                state.spawn_particles(at, 3, palette::WHITE, 1.0);
                state.emit(GameEvent::Sound(SoundEffect::Hit));
            }
            Strike::Destroyed {
                id,
                kind,
                center,
                points,
            } => {
                state.progress.score += points;
                state.progress.settle_enemy();

                let (count, speed) = if kind.is_boss() { (40, 5.0) } else { (15, 3.0) };
                state.spawn_particles(center, count, kind.stats().color, speed);
                state.emit(GameEvent::Sound(SoundEffect::Explosion));
                state.emit(GameEvent::EnemyDestroyed {
                    id,
                    kind,
                    pos: center,
                    points,
                });
                if kind.is_boss() {
                    log::info!("Boss destroyed (+{} points)", points);
                }
                roll_power_up_drop(state, center);
            }
        }
    }

    state.enemies.retain(|e| !e.is_dead());
}

/// Roll the drop chance and, on success, drop a random pickup at `center`
pub fn roll_power_up_drop(state: &mut GameState, center: Vec2) {
    if state.rng.random::<f64>() >= state.tuning.powerup_drop_chance {
        return;
    }
    let kind = PowerUpKind::random(&mut state.rng);
    let id = state.next_entity_id();
    state.power_ups.push(PowerUp::dropped_at(id, kind, center));
    state.emit(GameEvent::PowerUpDropped { id, kind, pos: center });
}

/// First enemy bullet touching the player is spent and lands one hit
pub fn enemy_bullets_vs_player(state: &mut GameState) {
    if state.player.is_invincible() {
        return;
    }
    let player_box = state.player.aabb();
    let Some(bullet) = state
        .bullets
        .iter_mut()
        .find(|b| !b.is_player() && !b.spent && b.aabb().overlaps(&player_box))
    else {
        return;
    };
    bullet.spent = true;
    absorb_or_hit(state);
}

/// First enemy body touching the player lands one hit; the enemy is unharmed
pub fn enemies_vs_player(state: &mut GameState) {
    if state.player.is_invincible() {
        return;
    }
    let player_box = state.player.aabb();
    if state.enemies.iter().any(|e| e.aabb().overlaps(&player_box)) {
        absorb_or_hit(state);
    }
}

/// Every pickup touching the player is applied and removed
pub fn player_vs_power_ups(state: &mut GameState) {
    let player_box = state.player.aabb();
    let (collected, remaining): (Vec<_>, Vec<_>) = std::mem::take(&mut state.power_ups)
        .into_iter()
        .partition(|p| p.aabb().overlaps(&player_box));
    state.power_ups = remaining;

    for power_up in collected {
        apply_power_up(&mut state.player, power_up.kind, &state.tuning);
        state.emit(GameEvent::PowerUpCollected {
            kind: power_up.kind,
        });
        state.emit(GameEvent::Sound(SoundEffect::PowerUp));
        state.spawn_particles(power_up.aabb().center(), 8, palette::GREEN, 2.0);
    }
}

/// Timed pickups restart at full duration; Life adds one up to the cap
pub fn apply_power_up(player: &mut Player, kind: PowerUpKind, tuning: &Tuning) {
    let duration = tuning.powerup_duration;
    match kind {
        PowerUpKind::Spread => player.power_ups.spread_shot = duration,
        PowerUpKind::Shield => player.power_ups.shield = duration,
        PowerUpKind::Speed => player.power_ups.speed_boost = duration,
        PowerUpKind::Life => {
            let cap = tuning.max_lives.min(LIVES_CAP);
            player.lives = player.lives.saturating_add(1).min(cap);
        }
    }
}

/// An active shield soaks up the hit; otherwise the player is hit
fn absorb_or_hit(state: &mut GameState) {
    if state.player.power_ups.shield > 0.0 {
        state.player.power_ups.shield = 0.0;
        let center = state.player.center();
        state.spawn_particles(center, 10, palette::CYAN, 2.0);
        state.emit(GameEvent::Sound(SoundEffect::Hit));
        state.emit(GameEvent::ShieldAbsorbed);
    } else {
        player_hit(state);
    }
}

/// Lose a life; either end the run or respawn with invincibility
pub fn player_hit(state: &mut GameState) {
    let player = &mut state.player;
    player.lives = player.lives.saturating_sub(1);
    player.power_ups.clear();
    let lives_left = player.lives;
    let center = player.center();

    state.spawn_particles(center, 20, palette::ORANGE, 4.0);
    state.emit(GameEvent::Sound(SoundEffect::Explosion));
    state.emit(GameEvent::PlayerHit { lives_left });

    if lives_left == 0 {
        game_over(state);
    } else {
        state.player.invincible_timer = state.tuning.invincibility_frames;
        state.player.recenter(state.bounds);
    }
}

/// End the run, asking the host to persist a new best score
fn game_over(state: &mut GameState) {
    let score = state.progress.score;
    let wave = state.progress.wave_index;

    if score > state.progress.stored_high_score {
        state.progress.stored_high_score = score;
        state.progress.high_score = state.progress.high_score.max(score);
        log::info!("New high score: {}", score);
        state.emit(GameEvent::PersistHighScore { score });
    }

    log::info!("Game over on wave {} with score {}", wave + 1, score);
    let from = state.phase;
    state.phase = GamePhase::GameOver;
    state.emit(GameEvent::PhaseChanged {
        from,
        to: GamePhase::GameOver,
    });
    state.emit(GameEvent::GameOver { score, wave });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Bounds, Bullet, Enemy};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Player box is (380, 520) .. (420, 564)
    const PLAYER_SPOT: Vec2 = Vec2::new(390.0, 530.0);

    fn state_with(tuning: Tuning) -> GameState {
        let mut state = GameState::new(5, 0, Bounds::new(800.0, 600.0), tuning);
        state.phase = GamePhase::Playing;
        state
    }

    fn playing_state() -> GameState {
        state_with(Tuning {
            powerup_drop_chance: 0.0,
            ..Tuning::default()
        })
    }

    fn place_enemy(state: &mut GameState, kind: EnemyKind, pos: Vec2) -> u32 {
        let id = state.next_entity_id();
        let mut rng = Pcg32::seed_from_u64(id as u64);
        let mut enemy = Enemy::spawn(id, kind, state.bounds, &mut rng);
        enemy.pos = pos;
        state.enemies.push(enemy);
        state.progress.wave_enemies_remaining += 1;
        id
    }

    fn fire_at(state: &mut GameState, pos: Vec2, count: usize) {
        for _ in 0..count {
            state.bullets.push(Bullet::player(pos, 0.0));
        }
    }

    fn lives_lost(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::PlayerHit { .. }))
            .count()
    }

    #[test]
    fn test_health_drops_by_damage_per_hit() {
        let mut state = playing_state();
        let id = place_enemy(&mut state, EnemyKind::Tank, Vec2::new(100.0, 100.0));
        fire_at(&mut state, Vec2::new(110.0, 110.0), 3);

        resolve(&mut state);
        let tank = state.enemies.iter().find(|e| e.id == id).cloned();
        let tank = tank.expect("tank should survive three hits");
        assert_eq!(tank.health, tank.max_health - 3);
        assert!(state.bullets.is_empty());
        assert_eq!(state.progress.score, 0);

        fire_at(&mut state, Vec2::new(110.0, 110.0), 2);
        resolve(&mut state);
        assert!(state.enemies.is_empty());
        assert_eq!(state.progress.score, 500);
        assert_eq!(state.progress.wave_enemies_remaining, 0);
    }

    #[test]
    fn test_surplus_bullets_pass_a_destroyed_enemy() {
        let mut state = playing_state();
        place_enemy(&mut state, EnemyKind::Tank, Vec2::new(100.0, 100.0));
        fire_at(&mut state, Vec2::new(110.0, 110.0), 7);

        resolve(&mut state);
        assert!(state.enemies.is_empty());
        // Five bullets were enough; the other two were never consumed
        assert_eq!(state.bullets.len(), 2);
        assert_eq!(state.progress.score, 500);
        let events = state.drain_events();
        let kills = events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemyDestroyed { .. }))
            .count();
        assert_eq!(kills, 1);
    }

    #[test]
    fn test_bullet_hits_first_enemy_in_order() {
        let mut state = playing_state();
        let first = place_enemy(&mut state, EnemyKind::Tank, Vec2::new(100.0, 100.0));
        let second = place_enemy(&mut state, EnemyKind::Tank, Vec2::new(105.0, 105.0));
        fire_at(&mut state, Vec2::new(112.0, 112.0), 1);

        resolve(&mut state);
        let health = |id: u32| state.enemies.iter().find(|e| e.id == id).map(|e| e.health);
        assert_eq!(health(first), Some(4));
        assert_eq!(health(second), Some(5));
    }

    #[test]
    fn test_kill_emits_effects() {
        let mut state = playing_state();
        let id = place_enemy(&mut state, EnemyKind::Basic, Vec2::new(100.0, 100.0));
        fire_at(&mut state, Vec2::new(110.0, 110.0), 1);

        resolve(&mut state);
        let events = state.drain_events();
        assert_eq!(
            events,
            vec![
                GameEvent::Sound(SoundEffect::Explosion),
                GameEvent::EnemyDestroyed {
                    id,
                    kind: EnemyKind::Basic,
                    pos: Vec2::new(115.0, 115.0),
                    points: 100,
                },
            ]
        );
        assert_eq!(state.particles.len(), 15);
    }

    #[test]
    fn test_guaranteed_drop_lands_at_enemy_center() {
        let mut state = state_with(Tuning {
            powerup_drop_chance: 1.0,
            ..Tuning::default()
        });
        place_enemy(&mut state, EnemyKind::Zigzag, Vec2::new(200.0, 150.0));
        fire_at(&mut state, Vec2::new(210.0, 160.0), 1);

        resolve(&mut state);
        assert_eq!(state.power_ups.len(), 1);
        let drop = &state.power_ups[0];
        assert_eq!(drop.aabb().center(), Vec2::new(214.0, 164.0));
        assert_eq!(drop.vel.x, 0.0);
        assert!(drop.vel.y > 0.0);
    }

    #[test]
    fn test_no_drop_when_chance_is_zero() {
        let mut state = playing_state();
        for i in 0..20 {
            place_enemy(&mut state, EnemyKind::Basic, Vec2::new(i as f32 * 35.0, 100.0));
            fire_at(&mut state, Vec2::new(i as f32 * 35.0 + 5.0, 110.0), 1);
        }
        resolve(&mut state);
        assert!(state.enemies.is_empty());
        assert!(state.power_ups.is_empty());
    }

    #[test]
    fn test_shield_absorbs_one_bullet() {
        let mut state = playing_state();
        state.player.power_ups.shield = 300.0;
        state.bullets.push(Bullet::enemy(PLAYER_SPOT, Vec2::new(0.0, 4.0)));
        state.bullets.push(Bullet::enemy(PLAYER_SPOT, Vec2::new(0.0, 4.0)));

        resolve(&mut state);
        assert_eq!(state.player.power_ups.shield, 0.0);
        assert_eq!(state.player.lives, 3);
        // Only one enemy bullet resolves per frame
        assert_eq!(state.bullets.len(), 1);
        assert!(state.drain_events().contains(&GameEvent::ShieldAbsorbed));
    }

    #[test]
    fn test_body_contact_after_shield_consumed_costs_a_life() {
        let mut state = playing_state();
        state.player.power_ups.shield = 300.0;
        state.bullets.push(Bullet::enemy(PLAYER_SPOT, Vec2::new(0.0, 4.0)));
        place_enemy(&mut state, EnemyKind::Basic, PLAYER_SPOT);

        resolve(&mut state);
        assert_eq!(state.player.power_ups.shield, 0.0);
        assert_eq!(state.player.lives, 2);
        assert!(state.player.is_invincible());
    }

    #[test]
    fn test_bullet_and_body_hit_cost_one_life() {
        let mut state = playing_state();
        state.bullets.push(Bullet::enemy(PLAYER_SPOT, Vec2::new(0.0, 4.0)));
        place_enemy(&mut state, EnemyKind::Basic, PLAYER_SPOT);

        resolve(&mut state);
        assert_eq!(state.player.lives, 2);
        assert_eq!(lives_lost(&state.drain_events()), 1);
    }

    #[test]
    fn test_invincibility_blocks_all_damage() {
        let mut state = playing_state();
        state.player.invincible_timer = 50.0;
        state.bullets.push(Bullet::enemy(PLAYER_SPOT, Vec2::new(0.0, 4.0)));
        place_enemy(&mut state, EnemyKind::Tank, PLAYER_SPOT);

        resolve(&mut state);
        assert_eq!(state.player.lives, 3);
        assert_eq!(state.bullets.len(), 1);
        assert_eq!(lives_lost(&state.drain_events()), 0);
    }

    #[test]
    fn test_hit_strips_power_ups_and_respawns() {
        let mut state = playing_state();
        state.player.pos = Vec2::new(100.0, 400.0);
        state.player.power_ups.spread_shot = 200.0;
        state.player.power_ups.speed_boost = 200.0;
        state.bullets.push(Bullet::enemy(Vec2::new(110.0, 410.0), Vec2::new(0.0, 4.0)));

        resolve(&mut state);
        assert_eq!(state.player.lives, 2);
        assert_eq!(state.player.power_ups, Default::default());
        assert_eq!(state.player.invincible_timer, 120.0);
        assert_eq!(state.player.pos, Vec2::new(380.0, 520.0));
    }

    #[test]
    fn test_lethal_hit_ends_run_and_persists_score() {
        let mut state = playing_state();
        state.player.lives = 1;
        state.progress.score = 900;
        state.progress.stored_high_score = 500;
        state.progress.high_score = 500;
        state.bullets.push(Bullet::enemy(PLAYER_SPOT, Vec2::new(0.0, 4.0)));

        resolve(&mut state);
        assert_eq!(state.player.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.progress.stored_high_score, 900);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::PersistHighScore { score: 900 }));
        assert!(events.contains(&GameEvent::GameOver { score: 900, wave: 0 }));
    }

    #[test]
    fn test_lethal_hit_without_record_does_not_persist() {
        let mut state = playing_state();
        state.player.lives = 1;
        state.progress.score = 100;
        state.progress.stored_high_score = 500;
        place_enemy(&mut state, EnemyKind::Basic, PLAYER_SPOT);

        resolve(&mut state);
        assert_eq!(state.phase, GamePhase::GameOver);
        let events = state.drain_events();
        assert!(!events.iter().any(|e| matches!(e, GameEvent::PersistHighScore { .. })));
    }

    #[test]
    fn test_nothing_resolves_after_game_over() {
        let mut state = playing_state();
        state.player.lives = 1;
        state.bullets.push(Bullet::enemy(PLAYER_SPOT, Vec2::new(0.0, 4.0)));
        place_enemy(&mut state, EnemyKind::Basic, PLAYER_SPOT);
        state
            .power_ups
            .push(PowerUp::dropped_at(99, PowerUpKind::Life, PLAYER_SPOT + Vec2::splat(10.0)));

        resolve(&mut state);
        assert_eq!(state.player.lives, 0);
        assert_eq!(state.power_ups.len(), 1);
        assert_eq!(lives_lost(&state.drain_events()), 1);
    }

    #[test]
    fn test_collects_every_overlapping_power_up() {
        let mut state = playing_state();
        let center = state.player.center();
        for (i, kind) in [PowerUpKind::Spread, PowerUpKind::Shield, PowerUpKind::Speed]
            .into_iter()
            .enumerate()
        {
            state.power_ups.push(PowerUp::dropped_at(i as u32, kind, center));
        }
        state
            .power_ups
            .push(PowerUp::dropped_at(10, PowerUpKind::Life, Vec2::new(50.0, 50.0)));

        resolve(&mut state);
        let timers = state.player.power_ups;
        assert_eq!(timers.spread_shot, 600.0);
        assert_eq!(timers.shield, 600.0);
        assert_eq!(timers.speed_boost, 600.0);
        assert_eq!(state.power_ups.len(), 1);
        let collected = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::PowerUpCollected { .. }))
            .count();
        assert_eq!(collected, 3);
    }

    #[test]
    fn test_reapplying_resets_without_stacking() {
        let tuning = Tuning::default();
        let mut player = Player::new(Bounds::default(), &tuning);
        apply_power_up(&mut player, PowerUpKind::Spread, &tuning);
        player.power_ups.tick(250.0);
        apply_power_up(&mut player, PowerUpKind::Spread, &tuning);
        assert_eq!(player.power_ups.spread_shot, 600.0);
    }

    #[test]
    fn test_extra_life_caps_at_five() {
        let tuning = Tuning::default();
        let mut player = Player::new(Bounds::default(), &tuning);
        for _ in 0..10 {
            apply_power_up(&mut player, PowerUpKind::Life, &tuning);
        }
        assert_eq!(player.lives, 5);
    }

    #[test]
    fn test_extra_life_never_overflows() {
        let tuning = Tuning::default();
        let mut player = Player::new(Bounds::default(), &tuning);
        player.lives = u8::MAX;
        apply_power_up(&mut player, PowerUpKind::Life, &tuning);
        assert_eq!(player.lives, 5);
    }

    #[test]
    fn test_drop_sits_below_kill_center() {
        let mut state = state_with(Tuning {
            powerup_drop_chance: 1.0,
            ..Tuning::default()
        });
        roll_power_up_drop(&mut state, Vec2::new(200.0, 150.0));
        assert_eq!(state.power_ups.len(), 1);
        assert_eq!(state.power_ups[0].pos, Vec2::new(190.0, 150.0));
        assert_eq!(state.power_ups[0].vel, Vec2::new(0.0, 1.5));
    }
}
