//! Spawner — wave spawning, boss summoning, chase behavior
//!
//! ```text
//! interval up → count regulars → spawn up to cap, just outside the
//!               camera view, kind drawn from the fixed table
//! boss request → idempotent: an existing boss satisfies it
//! every tick  → enemies steer straight at the player; the boss also
//!               fires an aimed projectile on its attack cooldown
//! ```
//!
//! Difficulty scales with the floor: base health follows a three-piece
//! curve, and each floor advance tightens the spawn interval and raises
//! the base chase speed (see `progression::advance_floor`).

use bevy::prelude::*;
use tracing::{debug, info};

use crate::clock::SimClock;
use crate::components::{Boss, Enemy, Player, Position, Projectile, Velocity, ENEMY_KINDS};
use crate::events::{EventLog, SimEvent};
use crate::physics::{ViewRect, Viewport, WorldBounds};
use crate::progression::{Progression, FINAL_FLOOR};
use crate::rng::SimRng;

// ============================================================================
// Tuning
// ============================================================================

pub const INITIAL_SPAWN_INTERVAL_MS: f64 = 1_000.0;
pub const MIN_SPAWN_INTERVAL_MS: f64 = 200.0;
pub const SPAWN_INTERVAL_STEP_MS: f64 = 50.0;

pub const INITIAL_ENEMY_SPEED: f32 = 85.0;
pub const ENEMY_SPEED_STEP: f32 = 5.0;

/// Regular (non-boss) enemy population cap.
pub const MAX_REGULAR_ENEMIES: usize = 15;
pub const ENEMIES_PER_SPAWN: usize = 2;
/// Distance outside the camera view where enemies appear.
pub const SPAWN_MARGIN: f32 = 100.0;
pub const HEALTH_JITTER: f32 = 0.1;

pub const BOSS_BASE_HEALTH: f32 = 500.0;
pub const FINAL_BOSS_BASE_HEALTH: f32 = 2_000.0;
pub const BOSS_HEALTH_PER_FLOOR: f32 = 50.0;
pub const FINAL_BOSS_HEALTH_MULT: f32 = 1.5;
pub const BOSS_ATTACK_COOLDOWN_MS: f64 = 1_000.0;
pub const FINAL_BOSS_ATTACK_COOLDOWN_MS: f64 = 800.0;
/// Bosses chase at a fraction of the regular base speed.
pub const BOSS_SPEED_FACTOR: f32 = 0.7;
pub const BOSS_SCALE: f32 = 1.5;
pub const FINAL_BOSS_SCALE: f32 = 2.5;
/// Bosses appear within this offset of the player, per axis.
pub const BOSS_SPAWN_OFFSET: f32 = 200.0;
/// Minimum distance a boss spawn keeps from the world edge.
pub const BOSS_SPAWN_EDGE_MARGIN: f32 = 100.0;

pub const BOSS_PROJECTILE_DAMAGE: f32 = 15.0;
pub const BOSS_PROJECTILE_SPEED: f32 = 200.0;
pub const BOSS_PROJECTILE_RADIUS: f32 = 10.0;
pub const BOSS_PROJECTILE_LIFESPAN_MS: f64 = 3_000.0;

/// Mutable spawn pressure, scaled by floor advances.
#[derive(Resource, Debug, Clone)]
pub struct SpawnerState {
    pub spawn_interval_ms: f64,
    pub last_spawn_ms: f64,
    /// Base chase speed before per-kind multipliers.
    pub enemy_speed: f32,
}

impl Default for SpawnerState {
    fn default() -> Self {
        Self {
            spawn_interval_ms: INITIAL_SPAWN_INTERVAL_MS,
            last_spawn_ms: 0.0,
            enemy_speed: INITIAL_ENEMY_SPEED,
        }
    }
}

// ============================================================================
// Difficulty curves
// ============================================================================

/// Base enemy health for a floor, before the kind multiplier and
/// jitter. Out-of-range floors clamp to the curve's ends.
pub fn enemy_base_health(floor: u32) -> f32 {
    let f = floor.clamp(1, FINAL_FLOOR) as f32;
    if f <= 5.0 {
        15.0 + (f - 1.0) * 3.0
    } else if f <= 15.0 {
        15.0 + 12.0 + (f - 5.0) * 5.0
    } else {
        15.0 + 62.0 + (f - 15.0) * 8.0
    }
}

/// Boss health for a floor. The final boss starts from a larger base
/// and gets a further 1.5× on top.
pub fn boss_health(floor: u32) -> f32 {
    let f = floor.min(FINAL_FLOOR);
    let base = if f == FINAL_FLOOR { FINAL_BOSS_BASE_HEALTH } else { BOSS_BASE_HEALTH };
    let health = base + f as f32 * BOSS_HEALTH_PER_FLOOR;
    if f == FINAL_FLOOR {
        health * FINAL_BOSS_HEALTH_MULT
    } else {
        health
    }
}

pub fn boss_attack_cooldown(floor: u32) -> f64 {
    if floor >= FINAL_FLOOR {
        FINAL_BOSS_ATTACK_COOLDOWN_MS
    } else {
        BOSS_ATTACK_COOLDOWN_MS
    }
}

pub fn boss_scale(floor: u32) -> f32 {
    if floor >= FINAL_FLOOR {
        FINAL_BOSS_SCALE
    } else {
        BOSS_SCALE
    }
}

/// Display title for a floor's boss. Floors without bespoke content
/// (and out-of-range floors) fall back to a computed name.
pub fn boss_title(floor: u32) -> String {
    if floor >= FINAL_FLOOR {
        "Gaia".to_string()
    } else {
        format!("Floor {} Overseer", floor.max(1))
    }
}

// ============================================================================
// Systems
// ============================================================================

/// System: interval-driven wave spawning just outside the camera view.
pub fn spawn_waves(
    clock: Res<SimClock>,
    mut spawner: ResMut<SpawnerState>,
    mut rng: ResMut<SimRng>,
    progression: Res<Progression>,
    bounds: Res<WorldBounds>,
    viewport: Res<Viewport>,
    mut commands: Commands,
    players: Query<&Position, With<Player>>,
    regulars: Query<&Enemy, Without<Boss>>,
) {
    let now = clock.now_ms;
    if now <= spawner.last_spawn_ms + spawner.spawn_interval_ms {
        return;
    }
    spawner.last_spawn_ms = now;

    let Ok(player_pos) = players.get_single() else {
        return;
    };
    let alive = regulars.iter().count();
    if alive >= MAX_REGULAR_ENEMIES {
        return;
    }
    let count = ENEMIES_PER_SPAWN.min(MAX_REGULAR_ENEMIES - alive);

    let view = ViewRect::around(player_pos.0, viewport.size, &bounds);
    for _ in 0..count {
        let pos = roll_spawn_position(&mut rng, &view, &bounds);
        let kind = *rng.pick(&ENEMY_KINDS);
        let health =
            ((enemy_base_health(progression.floor) * kind.hp_mult()).round()
                * rng.jitter(HEALTH_JITTER))
            .round();
        debug!(kind = kind.display_name(), health, "enemy spawned");
        commands.spawn((
            Position(pos),
            Velocity::default(),
            Enemy { kind, health, max_health: health, scale: kind.scale() },
        ));
    }
}

/// Roll a point on a uniformly chosen side, `SPAWN_MARGIN` outside the
/// view rect, clamped into the world.
fn roll_spawn_position(rng: &mut SimRng, view: &ViewRect, bounds: &WorldBounds) -> Vec2 {
    match rng.range_u32(4) {
        // Top
        0 => Vec2::new(
            rng.range_f32(view.min.x, view.max.x),
            (view.min.y - SPAWN_MARGIN).max(bounds.min.y),
        ),
        // Right
        1 => Vec2::new(
            (view.max.x + SPAWN_MARGIN).min(bounds.max.x),
            rng.range_f32(view.min.y, view.max.y),
        ),
        // Bottom
        2 => Vec2::new(
            rng.range_f32(view.min.x, view.max.x),
            (view.max.y + SPAWN_MARGIN).min(bounds.max.y),
        ),
        // Left
        _ => Vec2::new(
            (view.min.x - SPAWN_MARGIN).max(bounds.min.x),
            rng.range_f32(view.min.y, view.max.y),
        ),
    }
}

/// System: consume a pending boss request. Idempotent: a live boss
/// satisfies the request without spawning a second one.
pub fn spawn_pending_boss(
    mut progression: ResMut<Progression>,
    mut rng: ResMut<SimRng>,
    mut commands: Commands,
    mut events: ResMut<EventLog>,
    bounds: Res<WorldBounds>,
    players: Query<&Position, With<Player>>,
    bosses: Query<(), With<Boss>>,
) {
    if !progression.boss_pending {
        return;
    }
    progression.boss_pending = false;
    if !bosses.is_empty() {
        return;
    }
    let Ok(player_pos) = players.get_single() else {
        return;
    };

    let floor = progression.floor;
    let health = boss_health(floor);
    let title = boss_title(floor);
    let offset = Vec2::new(
        rng.range_f32(-BOSS_SPAWN_OFFSET, BOSS_SPAWN_OFFSET),
        rng.range_f32(-BOSS_SPAWN_OFFSET, BOSS_SPAWN_OFFSET),
    );
    let pos = bounds.clamp(player_pos.0 + offset, BOSS_SPAWN_EDGE_MARGIN);

    info!(floor, title = %title, health, "boss spawned");
    commands.spawn((
        Position(pos),
        Velocity::default(),
        Enemy {
            kind: crate::components::EnemyKind::Sentinel,
            health,
            max_health: health,
            scale: boss_scale(floor),
        },
        Boss {
            title: title.clone(),
            attack_cooldown_ms: boss_attack_cooldown(floor),
            last_attack_ms: 0.0,
        },
    ));
    events.push(SimEvent::BossSpawned { floor, title });
}

/// System: point every live enemy at the player. Bosses chase at a
/// reduced factor of the base speed; regulars use their kind
/// multiplier.
pub fn steer_enemies(
    spawner: Res<SpawnerState>,
    players: Query<&Position, With<Player>>,
    mut enemies: Query<(&Position, &mut Velocity, &Enemy, Option<&Boss>), Without<Player>>,
) {
    let Ok(player_pos) = players.get_single() else {
        return;
    };
    for (pos, mut vel, enemy, boss) in &mut enemies {
        if !enemy.is_alive() {
            continue;
        }
        let dir = (player_pos.0 - pos.0).normalize_or_zero();
        let speed = if boss.is_some() {
            spawner.enemy_speed * BOSS_SPEED_FACTOR
        } else {
            spawner.enemy_speed * enemy.kind.speed_mult()
        };
        vel.0 = dir * speed;
    }
}

/// System: boss ranged attack, an aimed projectile on every cooldown.
pub fn boss_attack(
    clock: Res<SimClock>,
    mut commands: Commands,
    players: Query<&Position, With<Player>>,
    mut bosses: Query<(&Position, &Enemy, &mut Boss), Without<Player>>,
) {
    let Ok(player_pos) = players.get_single() else {
        return;
    };
    let now = clock.now_ms;
    for (pos, enemy, mut boss) in &mut bosses {
        if !enemy.is_alive() || now <= boss.last_attack_ms + boss.attack_cooldown_ms {
            continue;
        }
        boss.last_attack_ms = now;

        let dir = (player_pos.0 - pos.0).normalize_or_zero();
        let mut projectile = Projectile::new(
            BOSS_PROJECTILE_DAMAGE,
            BOSS_PROJECTILE_RADIUS,
            now + BOSS_PROJECTILE_LIFESPAN_MS,
        );
        projectile.from_boss = true;
        commands.spawn((
            Position(pos.0),
            Velocity(dir * BOSS_PROJECTILE_SPEED),
            projectile,
        ));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Viewport;

    fn test_world() -> (World, Schedule) {
        let mut world = World::new();
        world.insert_resource(SimClock::default());
        world.insert_resource(SpawnerState::default());
        world.insert_resource(SimRng::new(99));
        world.insert_resource(Progression::default());
        world.insert_resource(EventLog::default());
        world.insert_resource(WorldBounds { min: Vec2::ZERO, max: Vec2::new(1620.0, 2880.0) });
        world.insert_resource(Viewport { size: Vec2::new(540.0, 960.0) });
        world.spawn((
            Position(Vec2::new(810.0, 1440.0)),
            Velocity::default(),
            Player::default(),
        ));
        let mut schedule = Schedule::default();
        schedule.add_systems((spawn_waves, spawn_pending_boss).chain());
        (world, schedule)
    }

    fn advance(world: &mut World, schedule: &mut Schedule, ms: f64) {
        world.resource_mut::<SimClock>().advance(ms);
        schedule.run(world);
    }

    fn count_enemies(world: &mut World) -> usize {
        let mut query = world.query::<&Enemy>();
        query.iter(world).count()
    }

    fn count_bosses(world: &mut World) -> usize {
        let mut query = world.query::<&Boss>();
        query.iter(world).count()
    }

    #[test]
    fn test_enemy_base_health_curve() {
        for f in 1..=5 {
            assert_eq!(enemy_base_health(f), 15.0 + (f - 1) as f32 * 3.0);
        }
        for f in 6..=15 {
            assert_eq!(enemy_base_health(f), 27.0 + (f - 5) as f32 * 5.0);
        }
        for f in 16..=33 {
            assert_eq!(enemy_base_health(f), 77.0 + (f - 15) as f32 * 8.0);
        }
    }

    #[test]
    fn test_enemy_base_health_clamps() {
        assert_eq!(enemy_base_health(0), 15.0);
        assert_eq!(enemy_base_health(99), enemy_base_health(33));
    }

    #[test]
    fn test_boss_health_scales_with_floor() {
        assert_eq!(boss_health(1), 550.0);
        assert_eq!(boss_health(10), 1_000.0);
        // Final boss: (2000 + 33*50) * 1.5
        assert_eq!(boss_health(33), 5_475.0);
        assert_eq!(boss_health(99), boss_health(33));
    }

    #[test]
    fn test_boss_title_fallback() {
        assert_eq!(boss_title(7), "Floor 7 Overseer");
        assert_eq!(boss_title(33), "Gaia");
        assert_eq!(boss_title(99), "Gaia");
        assert_eq!(boss_title(0), "Floor 1 Overseer");
    }

    #[test]
    fn test_final_boss_amplified() {
        assert!(boss_scale(33) > boss_scale(5));
        assert!(boss_attack_cooldown(33) < boss_attack_cooldown(5));
    }

    #[test]
    fn test_no_spawn_before_interval() {
        let (mut world, mut schedule) = test_world();
        advance(&mut world, &mut schedule, 500.0);
        assert_eq!(count_enemies(&mut world), 0);
    }

    #[test]
    fn test_spawn_after_interval() {
        let (mut world, mut schedule) = test_world();
        advance(&mut world, &mut schedule, 1_100.0);
        assert_eq!(count_enemies(&mut world), ENEMIES_PER_SPAWN);
    }

    #[test]
    fn test_population_cap_respected() {
        let (mut world, mut schedule) = test_world();
        for _ in 0..30 {
            advance(&mut world, &mut schedule, 1_100.0);
        }
        assert_eq!(count_enemies(&mut world), MAX_REGULAR_ENEMIES);
    }

    #[test]
    fn test_spawn_positions_outside_view_inside_world() {
        let (mut world, mut schedule) = test_world();
        for _ in 0..8 {
            advance(&mut world, &mut schedule, 1_100.0);
        }
        let bounds = *world.resource::<WorldBounds>();
        let view = ViewRect::around(
            Vec2::new(810.0, 1440.0),
            Vec2::new(540.0, 960.0),
            &bounds,
        );
        let mut query = world.query::<(&Position, &Enemy)>();
        for (pos, _) in query.iter(&world) {
            let p = pos.0;
            assert!(p.x >= bounds.min.x && p.x <= bounds.max.x);
            assert!(p.y >= bounds.min.y && p.y <= bounds.max.y);
            let inside_view =
                p.x > view.min.x && p.x < view.max.x && p.y > view.min.y && p.y < view.max.y;
            assert!(!inside_view, "enemy spawned inside the camera view: {p:?}");
        }
    }

    #[test]
    fn test_spawned_health_within_jitter_band() {
        let (mut world, mut schedule) = test_world();
        for _ in 0..10 {
            advance(&mut world, &mut schedule, 1_100.0);
        }
        let mut query = world.query::<&Enemy>();
        for enemy in query.iter(&world) {
            let expected = (enemy_base_health(1) * enemy.kind.hp_mult()).round();
            assert!(
                enemy.health >= (expected * 0.9).floor() && enemy.health <= (expected * 1.1).ceil(),
                "health {} outside jitter band of {}",
                enemy.health,
                expected
            );
        }
    }

    #[test]
    fn test_boss_spawn_idempotent() {
        let (mut world, mut schedule) = test_world();
        world.resource_mut::<Progression>().boss_pending = true;
        advance(&mut world, &mut schedule, 1.0);
        assert_eq!(count_bosses(&mut world), 1);

        // A second request while the boss lives spawns nothing.
        world.resource_mut::<Progression>().boss_pending = true;
        advance(&mut world, &mut schedule, 1.0);
        assert_eq!(count_bosses(&mut world), 1);
        assert!(!world.resource::<Progression>().boss_pending);
    }

    #[test]
    fn test_boss_spawn_emits_event() {
        let (mut world, mut schedule) = test_world();
        world.resource_mut::<Progression>().boss_pending = true;
        advance(&mut world, &mut schedule, 1.0);
        let events = world.resource_mut::<EventLog>().drain();
        assert!(events
            .iter()
            .any(|e| matches!(e, SimEvent::BossSpawned { floor: 1, .. })));
    }

    #[test]
    fn test_boss_spawn_near_player_within_bounds() {
        let (mut world, mut schedule) = test_world();
        world.resource_mut::<Progression>().boss_pending = true;
        advance(&mut world, &mut schedule, 1.0);
        let mut query = world.query::<(&Position, &Boss)>();
        let (pos, _) = query.single(&world);
        let d = pos.0 - Vec2::new(810.0, 1440.0);
        assert!(d.x.abs() <= BOSS_SPAWN_OFFSET && d.y.abs() <= BOSS_SPAWN_OFFSET);
    }
}
