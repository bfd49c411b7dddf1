//! Spawn scheduling and wave lifecycle
//!
//! Expands a manifest into a time-sorted queue, releases enemies as their
//! time arrives, runs the interlude countdown and decides when a wave is
//! cleared.

use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::state::{Enemy, EnemyKind, GameState};
use super::wave::{WaveManifest, generate_manifest};

/// A scheduled spawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnQueueEntry {
    pub kind: EnemyKind,
    /// Frames after the wave start
    pub spawn_at: f32,
}

/// Flatten a manifest into spawn times.
///
/// Groups run back to back: entry `i` (1-based) of a group spawns at
/// `group_start + i * delay`, and the next group starts where this one ended.
pub fn build_queue(manifest: &WaveManifest) -> Vec<SpawnQueueEntry> {
    let mut queue = Vec::with_capacity(manifest.total_enemies() as usize);
    let mut group_start = 0u32;
    for group in &manifest.groups {
        for i in 1..=group.count {
            queue.push(SpawnQueueEntry {
                kind: group.kind,
                spawn_at: (group_start + i * group.delay) as f32,
            });
        }
        group_start += group.count * group.delay;
    }
    queue
}

/// Begin a wave: fresh queue, timer at zero, every enemy owed
pub fn start_wave(state: &mut GameState, manifest: &WaveManifest) {
    let progress = &mut state.progress;
    progress.spawn_queue = build_queue(manifest);
    progress.wave_timer = 0.0;
    progress.wave_enemies_remaining = manifest.total_enemies();
    progress.between_waves = false;
    progress.between_wave_timer = 0.0;

    let wave = progress.wave_index;
    let enemies = progress.wave_enemies_remaining;
    log::info!(
        "Wave {} started: {} enemies{}",
        wave + 1,
        enemies,
        if manifest.boss { " (boss)" } else { "" }
    );
    state.emit(GameEvent::WaveStarted {
        wave,
        boss: manifest.boss,
        enemies,
    });
}

/// Advance the interlude or release due enemies
pub fn tick(state: &mut GameState, dt: f32) {
    if state.progress.between_waves {
        state.progress.between_wave_timer = (state.progress.between_wave_timer - dt).max(0.0);
        if state.progress.between_wave_timer <= 0.0 {
            let manifest = generate_manifest(state.progress.wave_index);
            start_wave(state, &manifest);
        }
        return;
    }

    state.progress.wave_timer += dt;
    let timer = state.progress.wave_timer;
    let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut state.progress.spawn_queue)
        .into_iter()
        .partition(|entry| entry.spawn_at <= timer);
    state.progress.spawn_queue = pending;

    for entry in due {
        let id = state.next_entity_id();
        let enemy = Enemy::spawn(id, entry.kind, state.bounds, &mut state.rng);
        if enemy.is_boss() {
            log::debug!("Boss {} entering at x={}", id, enemy.pos.x);
        }
        state.enemies.push(enemy);
    }
}

/// Close the wave once nothing is queued, owed or alive.
///
/// Must run after this frame's collisions so kills and exits are already
/// counted. Returns true when the wave was cleared.
pub fn check_wave_complete(state: &mut GameState) -> bool {
    let progress = &state.progress;
    if progress.between_waves
        || !progress.spawn_queue.is_empty()
        || progress.wave_enemies_remaining > 0
        || !state.enemies.is_empty()
    {
        return false;
    }

    let cleared = progress.wave_index;
    let progress = &mut state.progress;
    progress.wave_index += 1;
    progress.between_waves = true;
    progress.between_wave_timer = state.tuning.between_wave_frames;
    progress.wave_timer = 0.0;

    log::info!("Wave {} cleared (score {})", cleared + 1, progress.score);
    state.emit(GameEvent::WaveCleared { wave: cleared });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Bounds, Bullet, GamePhase};
    use crate::sim::wave::SpawnGroup;
    use crate::sim::{collision, movement};
    use crate::tuning::Tuning;
    use glam::Vec2;
    use proptest::prelude::*;

    fn playing_state() -> GameState {
        let mut state = GameState::new(7, 0, Bounds::default(), Tuning::default());
        state.phase = GamePhase::Playing;
        state
    }

    #[test]
    fn test_groups_run_sequentially() {
        let manifest = WaveManifest {
            groups: vec![
                SpawnGroup::new(EnemyKind::Basic, 3, 10),
                SpawnGroup::new(EnemyKind::Tank, 2, 50),
            ],
            boss: false,
        };
        let times: Vec<_> = build_queue(&manifest).iter().map(|e| e.spawn_at).collect();
        assert_eq!(times, vec![10.0, 20.0, 30.0, 80.0, 130.0]);
    }

    #[test]
    fn test_boss_enters_after_escort() {
        let queue = build_queue(&generate_manifest(5));
        let boss = queue.last().copied();
        assert_eq!(boss.map(|e| e.kind), Some(EnemyKind::Boss));
        // 4 escorts at 20 frames apart, then 60 more
        assert_eq!(boss.map(|e| e.spawn_at), Some(140.0));
    }

    #[test]
    fn test_start_wave_resets_counters() {
        let mut state = playing_state();
        state.progress.wave_timer = 99.0;
        let manifest = generate_manifest(3);
        start_wave(&mut state, &manifest);

        assert_eq!(state.progress.wave_timer, 0.0);
        assert_eq!(state.progress.wave_enemies_remaining, manifest.total_enemies());
        assert_eq!(state.progress.spawn_queue.len(), manifest.total_enemies() as usize);
        assert!(!state.progress.between_waves);
        assert!(matches!(
            state.drain_events().as_slice(),
            [GameEvent::WaveStarted { wave: 0, boss: false, .. }]
        ));
    }

    #[test]
    fn test_interlude_then_wave_start() {
        let mut state = playing_state();
        assert!(state.progress.between_waves);

        for _ in 0..59 {
            tick(&mut state, 1.0);
        }
        assert!(state.progress.between_waves);
        assert!(state.progress.spawn_queue.is_empty());

        tick(&mut state, 1.0);
        assert!(!state.progress.between_waves);
        assert_eq!(state.progress.spawn_queue.len(), 4);
    }

    #[test]
    fn test_release_zero_one_or_many() {
        let mut state = playing_state();
        start_wave(&mut state, &generate_manifest(0)); // 4 basics at 30, 60, 90, 120

        tick(&mut state, 29.0);
        assert!(state.enemies.is_empty());

        tick(&mut state, 1.0);
        assert_eq!(state.enemies.len(), 1);

        // A long frame releases everything that is due at once
        tick(&mut state, 90.0);
        assert_eq!(state.enemies.len(), 4);
        assert!(state.progress.spawn_queue.is_empty());
        // Spawning never settles the owed count
        assert_eq!(state.progress.wave_enemies_remaining, 4);
    }

    #[test]
    fn test_boss_spawns_centered() {
        let mut state = playing_state();
        state.progress.wave_index = 5;
        start_wave(&mut state, &generate_manifest(5));
        tick(&mut state, 1000.0);

        let boss = state.enemies.iter().find(|e| e.is_boss()).cloned();
        let boss = boss.expect("boss should have spawned");
        assert_eq!(boss.pos.x, 400.0 - 60.0);
        assert_eq!(boss.pos.y, -120.0);
    }

    #[test]
    fn test_wave_completion_needs_all_three_conditions() {
        let mut state = playing_state();
        start_wave(&mut state, &generate_manifest(0));

        // Queue pending
        assert!(!check_wave_complete(&mut state));

        tick(&mut state, 200.0);
        // Enemies alive and owed
        assert!(!check_wave_complete(&mut state));

        // Owed count settled but enemies still live
        state.progress.wave_enemies_remaining = 0;
        assert!(!check_wave_complete(&mut state));

        // No live enemies but one still owed
        state.enemies.clear();
        state.progress.wave_enemies_remaining = 1;
        assert!(!check_wave_complete(&mut state));

        state.progress.wave_enemies_remaining = 0;
        assert!(check_wave_complete(&mut state));
        assert_eq!(state.progress.wave_index, 1);
        assert!(state.progress.between_waves);
        assert_eq!(state.progress.between_wave_timer, 120.0);

        // Interlude is not a wave in progress
        assert!(!check_wave_complete(&mut state));
    }

    #[derive(Debug, Clone)]
    enum Step {
        Advance(f32),
        KillOldest,
        EscapeOldest,
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0.5f32..40.0).prop_map(Step::Advance),
            Just(Step::KillOldest),
            Just(Step::EscapeOldest),
        ]
    }

    proptest! {
        #[test]
        fn owed_count_tracks_queue_and_live_enemies(
            steps in prop::collection::vec(step(), 1..300)
        ) {
            let mut state = GameState::new(
                11,
                0,
                Bounds::default(),
                Tuning {
                    powerup_drop_chance: 0.0,
                    ..Tuning::default()
                },
            );
            state.phase = GamePhase::Playing;
            let mut wave_total = 0u32;

            for step in steps {
                state.player.invincible_timer = 1_000.0;
                match step {
                    Step::Advance(dt) => {
                        let was_between = state.progress.between_waves;
                        tick(&mut state, dt);
                        if was_between && !state.progress.between_waves {
                            wave_total = generate_manifest(state.progress.wave_index)
                                .total_enemies();
                        }
                    }
                    Step::KillOldest => {
                        if let Some(enemy) = state.enemies.first_mut() {
                            enemy.health = 1;
                            let at = enemy.center() - Vec2::new(2.0, 6.0);
                            state.bullets.push(Bullet::player(at, 0.0));
                            collision::resolve(&mut state);
                        }
                    }
                    Step::EscapeOldest => {
                        if let Some(enemy) = state.enemies.first_mut() {
                            enemy.pos.y = 900.0;
                            movement::prune_out_of_bounds(&mut state);
                        }
                    }
                }

                let progress = &state.progress;
                prop_assert!(progress.wave_enemies_remaining <= wave_total);
                prop_assert_eq!(
                    progress.wave_enemies_remaining as usize,
                    progress.spawn_queue.len() + state.enemies.len()
                );

                let should_clear = !progress.between_waves
                    && progress.spawn_queue.is_empty()
                    && progress.wave_enemies_remaining == 0
                    && state.enemies.is_empty();
                let wave = progress.wave_index;
                let cleared = check_wave_complete(&mut state);
                prop_assert_eq!(cleared, should_clear);
                if cleared {
                    prop_assert_eq!(state.progress.wave_index, wave + 1);
                }
            }
        }
    }
}
