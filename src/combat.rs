//! Combat Resolver — damage, death resolution, player hits, pickups
//!
//! ```text
//! queued damage (novas, wave pulses) ─┐
//! projectile ↔ enemy overlaps ────────┼→ health -= damage
//!                                     │     └→ death: gem + loot roll
//! enemy/boss-shot ↔ player overlaps ──┘        + kill gating / floor
//! gem & item ↔ player overlaps → pickups         advance, then despawn
//! ```
//!
//! All damage funnels through this module so an enemy dies exactly
//! once: sources outside the resolver queue damage instead of mutating
//! health directly, and every pass skips entities whose health already
//! reached zero.

use bevy::prelude::*;
use std::f32::consts::TAU;
use tracing::{debug, info};

use crate::clock::{GamePhase, SimClock};
use crate::components::{Boss, Enemy, ExpGem, ItemDrop, Player, Position, Projectile, Velocity};
use crate::effects::{EffectAction, EffectSchedule, WAVE_INTERVAL_MS};
use crate::events::{EventLog, SimEvent};
use crate::items::{ItemKind, REGULAR_ITEMS, SPECIAL_EFFECTS};
use crate::physics::{
    circles_overlap, enemy_radius, knockback_target, WorldBounds, GEM_RADIUS, ITEM_RADIUS,
    PLAYER_RADIUS,
};
use crate::progression::{advance_floor, Progression, FINAL_FLOOR};
use crate::rng::SimRng;
use crate::spawner::SpawnerState;

// ============================================================================
// Tuning
// ============================================================================

/// Contact damage from a regular enemy (or boss) body.
pub const ENEMY_CONTACT_DAMAGE: f32 = 8.0;
pub const CONTACT_KNOCKBACK: f32 = 30.0;
pub const BOSS_PROJECTILE_KNOCKBACK: f32 = 40.0;
/// Invulnerability window after any player hit.
pub const HIT_INVULN_MS: f64 = 1_000.0;

pub const GEM_EXP_VALUE: u32 = 20;
pub const GEM_LIFESPAN_MS: f64 = 5_000.0;
pub const GEM_DRIFT_SPEED: f32 = 20.0;

/// Boss drops land this far to either side of the corpse.
pub const BOSS_DROP_OFFSET: f32 = 30.0;

pub const SPLIT_CHILD_COUNT: u32 = 3;
pub const SPLIT_DAMAGE_FACTOR: f32 = 0.5;
pub const SPLIT_CHILD_SPEED: f32 = 200.0;
pub const SPLIT_CHILD_RADIUS: f32 = 4.0;
pub const SPLIT_CHILD_LIFESPAN_MS: f64 = 1_000.0;

// ============================================================================
// Damage queue
// ============================================================================

/// Damage requested outside the resolver (area bursts, wave pulses).
/// Applied in one place so death resolves exactly once.
#[derive(Debug, Clone, Copy)]
pub struct QueuedDamage {
    pub target: Entity,
    pub amount: f32,
}

#[derive(Resource, Debug, Default)]
pub struct DamageQueue {
    pub entries: Vec<QueuedDamage>,
}

impl DamageQueue {
    pub fn push(&mut self, damage: QueuedDamage) {
        self.entries.push(damage);
    }

    pub fn drain(&mut self) -> Vec<QueuedDamage> {
        std::mem::take(&mut self.entries)
    }
}

// ============================================================================
// Enemy-side resolution
// ============================================================================

/// System: apply queued damage and projectile hits to enemies, and
/// resolve any deaths.
#[allow(clippy::too_many_arguments)]
pub fn resolve_enemy_hits(
    clock: Res<SimClock>,
    mut commands: Commands,
    mut damage_queue: ResMut<DamageQueue>,
    mut rng: ResMut<SimRng>,
    mut progression: ResMut<Progression>,
    mut spawner: ResMut<SpawnerState>,
    mut events: ResMut<EventLog>,
    mut phase: ResMut<GamePhase>,
    projectiles: Query<(Entity, &Position, &Projectile)>,
    mut enemies: Query<(Entity, &Position, &mut Enemy, Option<&Boss>), Without<Projectile>>,
) {
    let now = clock.now_ms;

    for queued in damage_queue.drain() {
        let Ok((entity, pos, mut enemy, boss)) = enemies.get_mut(queued.target) else {
            // Target despawned since the damage was queued.
            continue;
        };
        if !enemy.is_alive() {
            continue;
        }
        enemy.health -= queued.amount;
        if !enemy.is_alive() {
            resolve_enemy_death(
                &mut commands,
                &mut rng,
                &mut progression,
                &mut spawner,
                &mut events,
                &mut phase,
                now,
                entity,
                pos.0,
                boss.is_some(),
            );
        }
    }

    for (proj_entity, proj_pos, projectile) in &projectiles {
        if projectile.from_boss {
            continue;
        }
        for (enemy_entity, enemy_pos, mut enemy, boss) in enemies.iter_mut() {
            if !enemy.is_alive() {
                continue;
            }
            if !circles_overlap(
                proj_pos.0,
                projectile.radius,
                enemy_pos.0,
                enemy_radius(enemy.scale),
            ) {
                continue;
            }

            enemy.health -= projectile.damage;
            if !enemy.is_alive() {
                resolve_enemy_death(
                    &mut commands,
                    &mut rng,
                    &mut progression,
                    &mut spawner,
                    &mut events,
                    &mut phase,
                    now,
                    enemy_entity,
                    enemy_pos.0,
                    boss.is_some(),
                );
                if projectile.can_split {
                    spawn_split_children(&mut commands, now, proj_pos.0, projectile.damage);
                }
            }

            if !projectile.piercing {
                commands.entity(proj_entity).despawn();
                break;
            }
        }
    }
}

/// Resolve one enemy death: experience gem, loot roll, kill gating (or
/// floor advance for a boss), then despawn. Runs exactly once per
/// enemy; callers only reach this when health crosses zero.
#[allow(clippy::too_many_arguments)]
fn resolve_enemy_death(
    commands: &mut Commands,
    rng: &mut SimRng,
    progression: &mut Progression,
    spawner: &mut SpawnerState,
    events: &mut EventLog,
    phase: &mut GamePhase,
    now: f64,
    entity: Entity,
    pos: Vec2,
    is_boss: bool,
) {
    let drift = Vec2::from_angle(rng.range_f32(0.0, TAU)) * GEM_DRIFT_SPEED;
    commands.spawn((
        Position(pos),
        Velocity(drift),
        ExpGem { value: GEM_EXP_VALUE, expires_at_ms: now + GEM_LIFESPAN_MS },
    ));

    if is_boss {
        info!(floor = progression.floor, "boss defeated");
        events.push(SimEvent::BossDefeated { floor: progression.floor });

        // Bosses always drop a heal plus one random special.
        commands.spawn((
            Position(pos + Vec2::new(-BOSS_DROP_OFFSET, 0.0)),
            ItemDrop { kind: ItemKind::Heal },
        ));
        let effect = *rng.pick(&SPECIAL_EFFECTS);
        commands.spawn((
            Position(pos + Vec2::new(BOSS_DROP_OFFSET, 0.0)),
            ItemDrop { kind: ItemKind::Special(effect) },
        ));

        if progression.floor >= FINAL_FLOOR {
            *phase = GamePhase::Victory;
            events.push(SimEvent::Victory {
                level: progression.level,
                floor: progression.floor,
            });
            info!("final boss defeated, run won");
        } else {
            advance_floor(progression, spawner, events);
        }
    } else {
        // At most one regular item per death: first kind whose
        // independent roll passes.
        for kind in REGULAR_ITEMS {
            if rng.next_f32() < kind.drop_chance() {
                commands.spawn((Position(pos), ItemDrop { kind }));
                break;
            }
        }

        progression.enemies_killed += 1;
        debug!(
            kills = progression.enemies_killed,
            required = progression.enemies_required_for_boss,
            "enemy down"
        );
        if progression.enemies_killed >= progression.enemies_required_for_boss {
            progression.boss_pending = true;
        }
    }

    commands.entity(entity).despawn();
}

/// Spawn the split children of a killing hit: evenly fanned, half
/// damage, short lifespan, no inherited flags.
fn spawn_split_children(commands: &mut Commands, now: f64, pos: Vec2, parent_damage: f32) {
    for i in 0..SPLIT_CHILD_COUNT {
        let angle = TAU / SPLIT_CHILD_COUNT as f32 * i as f32;
        commands.spawn((
            Position(pos),
            Velocity(Vec2::from_angle(angle) * SPLIT_CHILD_SPEED),
            Projectile::new(
                parent_damage * SPLIT_DAMAGE_FACTOR,
                SPLIT_CHILD_RADIUS,
                now + SPLIT_CHILD_LIFESPAN_MS,
            ),
        ));
    }
}

// ============================================================================
// Player-side resolution
// ============================================================================

/// System: enemy contact and boss projectiles against the player.
/// A hit knocks the player back, opens the invulnerability window, and
/// may end the run.
#[allow(clippy::too_many_arguments)]
pub fn resolve_player_hits(
    clock: Res<SimClock>,
    mut commands: Commands,
    bounds: Res<WorldBounds>,
    mut events: ResMut<EventLog>,
    mut phase: ResMut<GamePhase>,
    progression: Res<Progression>,
    mut players: Query<(&mut Position, &mut Player)>,
    enemies: Query<(&Position, &Enemy), Without<Player>>,
    shots: Query<(Entity, &Position, &Projectile), Without<Player>>,
) {
    if phase.is_terminal() {
        return;
    }
    let now = clock.now_ms;
    let Ok((mut pos, mut player)) = players.get_single_mut() else {
        return;
    };
    if player.is_invulnerable(now) {
        return;
    }

    // (source position, damage, knockback distance)
    let mut hit: Option<(Vec2, f32, f32)> = None;

    for (enemy_pos, enemy) in &enemies {
        if enemy.is_alive()
            && circles_overlap(pos.0, PLAYER_RADIUS, enemy_pos.0, enemy_radius(enemy.scale))
        {
            hit = Some((enemy_pos.0, ENEMY_CONTACT_DAMAGE, CONTACT_KNOCKBACK));
            break;
        }
    }
    if hit.is_none() {
        for (shot_entity, shot_pos, shot) in &shots {
            if shot.from_boss && circles_overlap(pos.0, PLAYER_RADIUS, shot_pos.0, shot.radius) {
                hit = Some((shot_pos.0, shot.damage, BOSS_PROJECTILE_KNOCKBACK));
                commands.entity(shot_entity).despawn();
                break;
            }
        }
    }

    let Some((source, damage, knockback)) = hit else {
        return;
    };

    player.health -= damage;
    pos.0 = knockback_target(source, pos.0, knockback, PLAYER_RADIUS, &bounds);
    player.grant_invulnerability(now + HIT_INVULN_MS);
    events.push(SimEvent::PlayerDamaged { amount: damage, health: player.health });

    if player.health <= 0.0 {
        *phase = GamePhase::GameOver;
        events.push(SimEvent::GameOver { level: progression.level, floor: progression.floor });
        info!(level = progression.level, floor = progression.floor, "game over");
    }
}

// ============================================================================
// Pickups
// ============================================================================

/// System: collect overlapping gems and items.
pub fn resolve_pickups(
    clock: Res<SimClock>,
    mut commands: Commands,
    mut progression: ResMut<Progression>,
    mut events: ResMut<EventLog>,
    mut schedule: ResMut<EffectSchedule>,
    mut players: Query<(Entity, &Position, &mut Player)>,
    gems: Query<(Entity, &Position, &ExpGem), Without<Player>>,
    items: Query<(Entity, &Position, &ItemDrop), Without<Player>>,
) {
    let now = clock.now_ms;
    let Ok((player_entity, player_pos, mut player)) = players.get_single_mut() else {
        return;
    };

    for (entity, pos, gem) in &gems {
        if circles_overlap(player_pos.0, PLAYER_RADIUS, pos.0, GEM_RADIUS) {
            progression.exp += gem.value;
            events.push(SimEvent::ExpCollected { amount: gem.value, total: progression.exp });
            commands.entity(entity).despawn();
        }
    }

    for (entity, pos, item) in &items {
        if !circles_overlap(player_pos.0, PLAYER_RADIUS, pos.0, ITEM_RADIUS) {
            continue;
        }
        apply_pickup(item.kind, now, player_entity, &mut player, &mut schedule, &mut events);
        events.push(SimEvent::ItemPickedUp { kind: item.kind });
        commands.entity(entity).despawn();
    }
}

fn apply_pickup(
    kind: ItemKind,
    now: f64,
    player_entity: Entity,
    player: &mut Player,
    schedule: &mut EffectSchedule,
    events: &mut EventLog,
) {
    match kind {
        ItemKind::Heal => {
            let healed = (player.health + kind.value()).min(player.max_health);
            let amount = healed - player.health;
            player.health = healed;
            events.push(SimEvent::PlayerHealed { amount, health: player.health });
        }
        ItemKind::SpeedBoost => {
            player.speed += kind.value();
            let due = now + kind.duration_ms().unwrap_or(0.0);
            schedule.push(due, player_entity, EffectAction::RevertSpeed { amount: kind.value() });
        }
        ItemKind::DamageBoost => {
            player.damage_boost += kind.value();
            let due = now + kind.duration_ms().unwrap_or(0.0);
            schedule.push(due, player_entity, EffectAction::RevertDamage { amount: kind.value() });
        }
        ItemKind::Special(effect) => {
            // Re-acquiring a held effect is a no-op.
            if player.effects.grant(effect) {
                info!(effect = effect.display_name(), "special effect unlocked");
                events.push(SimEvent::SpecialUnlocked { effect });
                if effect == crate::items::SpecialEffect::Wave {
                    schedule.push(now + WAVE_INTERVAL_MS, player_entity, EffectAction::WavePulse);
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::EnemyKind;
    use crate::items::SpecialEffect;

    fn test_world() -> (World, Schedule) {
        let mut world = World::new();
        world.insert_resource(SimClock::default());
        world.insert_resource(DamageQueue::default());
        world.insert_resource(SimRng::new(4));
        world.insert_resource(Progression::default());
        world.insert_resource(SpawnerState::default());
        world.insert_resource(EventLog::default());
        world.insert_resource(GamePhase::Running);
        world.insert_resource(EffectSchedule::default());
        world.insert_resource(WorldBounds { min: Vec2::ZERO, max: Vec2::new(1620.0, 2880.0) });
        let mut schedule = Schedule::default();
        schedule.add_systems(
            (resolve_enemy_hits, resolve_player_hits, resolve_pickups).chain(),
        );
        (world, schedule)
    }

    fn advance(world: &mut World, schedule: &mut Schedule, ms: f64) {
        world.resource_mut::<SimClock>().advance(ms);
        schedule.run(world);
    }

    fn spawn_player(world: &mut World, pos: Vec2) -> Entity {
        world.spawn((Position(pos), Velocity::default(), Player::default())).id()
    }

    fn spawn_enemy(world: &mut World, pos: Vec2, health: f32) -> Entity {
        world
            .spawn((
                Position(pos),
                Velocity::default(),
                Enemy { kind: EnemyKind::Sentinel, health, max_health: health, scale: 1.0 },
            ))
            .id()
    }

    fn spawn_boss(world: &mut World, pos: Vec2, health: f32) -> Entity {
        world
            .spawn((
                Position(pos),
                Velocity::default(),
                Enemy { kind: EnemyKind::Sentinel, health, max_health: health, scale: 1.5 },
                Boss {
                    title: "Floor 1 Overseer".into(),
                    attack_cooldown_ms: 1_000.0,
                    last_attack_ms: 0.0,
                },
            ))
            .id()
    }

    fn spawn_projectile(world: &mut World, pos: Vec2, damage: f32) -> Entity {
        world
            .spawn((
                Position(pos),
                Velocity::default(),
                Projectile::new(damage, 6.0, 100_000.0),
            ))
            .id()
    }

    fn count<C: Component>(world: &mut World) -> usize {
        let mut query = world.query::<&C>();
        query.iter(world).count()
    }

    #[test]
    fn test_projectile_kill_drops_gem_and_counts() {
        let (mut world, mut schedule) = test_world();
        spawn_player(&mut world, Vec2::new(1_000.0, 1_000.0));
        let enemy = spawn_enemy(&mut world, Vec2::new(100.0, 100.0), 10.0);
        let projectile = spawn_projectile(&mut world, Vec2::new(105.0, 100.0), 15.0);

        advance(&mut world, &mut schedule, 16.0);

        assert!(world.get::<Enemy>(enemy).is_none(), "dead enemy despawned");
        assert!(world.get::<Projectile>(projectile).is_none(), "non-piercing projectile consumed");
        assert_eq!(count::<ExpGem>(&mut world), 1);
        assert_eq!(world.resource::<Progression>().enemies_killed, 1);
    }

    #[test]
    fn test_nonlethal_hit_consumes_projectile_only() {
        let (mut world, mut schedule) = test_world();
        spawn_player(&mut world, Vec2::new(1_000.0, 1_000.0));
        let enemy = spawn_enemy(&mut world, Vec2::new(100.0, 100.0), 50.0);
        spawn_projectile(&mut world, Vec2::new(105.0, 100.0), 15.0);

        advance(&mut world, &mut schedule, 16.0);

        assert_eq!(world.get::<Enemy>(enemy).unwrap().health, 35.0);
        assert_eq!(count::<Projectile>(&mut world), 0);
        assert_eq!(count::<ExpGem>(&mut world), 0);
        assert_eq!(world.resource::<Progression>().enemies_killed, 0);
    }

    #[test]
    fn test_piercing_projectile_survives_hits() {
        let (mut world, mut schedule) = test_world();
        spawn_player(&mut world, Vec2::new(1_000.0, 1_000.0));
        spawn_enemy(&mut world, Vec2::new(100.0, 100.0), 10.0);
        spawn_enemy(&mut world, Vec2::new(110.0, 100.0), 10.0);
        let projectile = world
            .spawn((Position(Vec2::new(105.0, 100.0)), Velocity::default(), {
                let mut p = Projectile::new(15.0, 6.0, 100_000.0);
                p.piercing = true;
                p
            }))
            .id();

        advance(&mut world, &mut schedule, 16.0);

        assert!(world.get::<Projectile>(projectile).is_some(), "piercing projectile persists");
        assert_eq!(count::<Enemy>(&mut world), 0, "both overlapped enemies die");
        assert_eq!(world.resource::<Progression>().enemies_killed, 2);
    }

    #[test]
    fn test_split_spawns_three_half_damage_children() {
        let (mut world, mut schedule) = test_world();
        spawn_player(&mut world, Vec2::new(1_000.0, 1_000.0));
        spawn_enemy(&mut world, Vec2::new(100.0, 100.0), 10.0);
        world.spawn((Position(Vec2::new(105.0, 100.0)), Velocity::default(), {
            let mut p = Projectile::new(16.0, 6.0, 100_000.0);
            p.can_split = true;
            p
        }));

        advance(&mut world, &mut schedule, 16.0);

        let mut query = world.query::<(&Projectile, &Velocity)>();
        let children: Vec<(f32, Vec2)> =
            query.iter(&world).map(|(p, v)| (p.damage, v.0)).collect();
        assert_eq!(children.len(), 3);
        for (damage, vel) in &children {
            assert_eq!(*damage, 8.0);
            assert!((vel.length() - SPLIT_CHILD_SPEED).abs() < 0.01);
        }
        // Evenly fanned: 120° apart starting at angle 0.
        let mut angles: Vec<f32> =
            children.iter().map(|(_, v)| v.y.atan2(v.x).rem_euclid(TAU)).collect();
        angles.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((angles[0] - 0.0).abs() < 0.01);
        assert!((angles[1] - TAU / 3.0).abs() < 0.01);
        assert!((angles[2] - 2.0 * TAU / 3.0).abs() < 0.01);
    }

    #[test]
    fn test_nonlethal_hit_does_not_split() {
        let (mut world, mut schedule) = test_world();
        spawn_player(&mut world, Vec2::new(1_000.0, 1_000.0));
        spawn_enemy(&mut world, Vec2::new(100.0, 100.0), 100.0);
        world.spawn((Position(Vec2::new(105.0, 100.0)), Velocity::default(), {
            let mut p = Projectile::new(16.0, 6.0, 100_000.0);
            p.can_split = true;
            p
        }));

        advance(&mut world, &mut schedule, 16.0);

        assert_eq!(count::<Projectile>(&mut world), 0);
    }

    #[test]
    fn test_tenth_kill_requests_boss_exactly_once() {
        let (mut world, mut schedule) = test_world();
        spawn_player(&mut world, Vec2::new(1_500.0, 1_500.0));
        for i in 0..9 {
            let enemy = spawn_enemy(&mut world, Vec2::new(100.0 + i as f32, 100.0), 1.0);
            world.resource_mut::<DamageQueue>().push(QueuedDamage { target: enemy, amount: 5.0 });
        }
        advance(&mut world, &mut schedule, 16.0);
        assert_eq!(world.resource::<Progression>().enemies_killed, 9);
        assert!(!world.resource::<Progression>().boss_pending, "not before the quota");

        let tenth = spawn_enemy(&mut world, Vec2::new(100.0, 100.0), 1.0);
        world.resource_mut::<DamageQueue>().push(QueuedDamage { target: tenth, amount: 5.0 });
        advance(&mut world, &mut schedule, 16.0);
        assert_eq!(world.resource::<Progression>().enemies_killed, 10);
        assert!(world.resource::<Progression>().boss_pending);
    }

    #[test]
    fn test_boss_death_advances_floor_and_drops_two_items() {
        let (mut world, mut schedule) = test_world();
        spawn_player(&mut world, Vec2::new(1_500.0, 1_500.0));
        let boss = spawn_boss(&mut world, Vec2::new(200.0, 200.0), 10.0);
        world.resource_mut::<DamageQueue>().push(QueuedDamage { target: boss, amount: 20.0 });

        advance(&mut world, &mut schedule, 16.0);

        let progression = world.resource::<Progression>();
        assert_eq!(progression.floor, 2);
        assert_eq!(progression.enemies_killed, 0);
        let mut query = world.query::<&ItemDrop>();
        let kinds: Vec<ItemKind> = query.iter(&world).map(|i| i.kind).collect();
        assert_eq!(kinds.len(), 2);
        assert!(kinds.contains(&ItemKind::Heal));
        assert!(kinds.iter().any(|k| matches!(k, ItemKind::Special(_))));
        let events = world.resource_mut::<EventLog>().drain();
        assert!(events.iter().any(|e| matches!(e, SimEvent::BossDefeated { floor: 1 })));
        assert!(events.iter().any(|e| matches!(e, SimEvent::FloorAdvanced { floor: 2, .. })));
    }

    #[test]
    fn test_boss_kill_does_not_increment_kill_counter() {
        let (mut world, mut schedule) = test_world();
        spawn_player(&mut world, Vec2::new(1_500.0, 1_500.0));
        let boss = spawn_boss(&mut world, Vec2::new(200.0, 200.0), 10.0);
        world.resource_mut::<DamageQueue>().push(QueuedDamage { target: boss, amount: 20.0 });

        advance(&mut world, &mut schedule, 16.0);

        assert_eq!(world.resource::<Progression>().enemies_killed, 0);
    }

    #[test]
    fn test_final_boss_death_is_victory_not_floor_34() {
        let (mut world, mut schedule) = test_world();
        spawn_player(&mut world, Vec2::new(1_500.0, 1_500.0));
        {
            let mut progression = world.resource_mut::<Progression>();
            progression.floor = FINAL_FLOOR;
        }
        let boss = spawn_boss(&mut world, Vec2::new(200.0, 200.0), 10.0);
        world.resource_mut::<DamageQueue>().push(QueuedDamage { target: boss, amount: 20.0 });

        advance(&mut world, &mut schedule, 16.0);

        assert_eq!(*world.resource::<GamePhase>(), GamePhase::Victory);
        assert_eq!(world.resource::<Progression>().floor, FINAL_FLOOR);
        let events = world.resource_mut::<EventLog>().drain();
        assert!(events.iter().any(|e| matches!(e, SimEvent::Victory { .. })));
    }

    #[test]
    fn test_contact_damages_and_knocks_back_player() {
        let (mut world, mut schedule) = test_world();
        let player = spawn_player(&mut world, Vec2::new(500.0, 500.0));
        spawn_enemy(&mut world, Vec2::new(510.0, 500.0), 50.0);

        advance(&mut world, &mut schedule, 16.0);

        let hit_player = world.get::<Player>(player).unwrap();
        assert_eq!(hit_player.health, 142.0);
        assert!(hit_player.is_invulnerable(16.0));
        let pos = world.get::<Position>(player).unwrap().0;
        assert!(pos.x < 500.0, "knocked away from the enemy");
    }

    #[test]
    fn test_invulnerable_player_takes_no_damage() {
        let (mut world, mut schedule) = test_world();
        let player = spawn_player(&mut world, Vec2::new(500.0, 500.0));
        world.get_mut::<Player>(player).unwrap().grant_invulnerability(10_000.0);
        spawn_enemy(&mut world, Vec2::new(510.0, 500.0), 50.0);

        advance(&mut world, &mut schedule, 16.0);

        assert_eq!(world.get::<Player>(player).unwrap().health, 150.0);
    }

    #[test]
    fn test_lethal_boss_projectile_triggers_game_over_once() {
        let (mut world, mut schedule) = test_world();
        let player = spawn_player(&mut world, Vec2::new(500.0, 500.0));
        world.get_mut::<Player>(player).unwrap().health = 10.0;
        world.spawn((Position(Vec2::new(505.0, 500.0)), Velocity::default(), {
            let mut p = Projectile::new(15.0, 10.0, 100_000.0);
            p.from_boss = true;
            p
        }));

        advance(&mut world, &mut schedule, 16.0);

        assert_eq!(*world.resource::<GamePhase>(), GamePhase::GameOver);
        let events = world.resource_mut::<EventLog>().drain();
        let game_overs =
            events.iter().filter(|e| matches!(e, SimEvent::GameOver { .. })).count();
        assert_eq!(game_overs, 1);
    }

    #[test]
    fn test_boss_projectile_ignores_enemies() {
        let (mut world, mut schedule) = test_world();
        spawn_player(&mut world, Vec2::new(1_500.0, 1_500.0));
        let enemy = spawn_enemy(&mut world, Vec2::new(100.0, 100.0), 50.0);
        let shot = world
            .spawn((Position(Vec2::new(100.0, 100.0)), Velocity::default(), {
                let mut p = Projectile::new(15.0, 10.0, 100_000.0);
                p.from_boss = true;
                p
            }))
            .id();

        advance(&mut world, &mut schedule, 16.0);

        assert_eq!(world.get::<Enemy>(enemy).unwrap().health, 50.0);
        assert!(world.get::<Projectile>(shot).is_some());
    }

    #[test]
    fn test_gem_pickup_grants_exp() {
        let (mut world, mut schedule) = test_world();
        spawn_player(&mut world, Vec2::new(500.0, 500.0));
        world.spawn((
            Position(Vec2::new(505.0, 500.0)),
            Velocity::default(),
            ExpGem { value: GEM_EXP_VALUE, expires_at_ms: 100_000.0 },
        ));

        advance(&mut world, &mut schedule, 16.0);

        assert_eq!(world.resource::<Progression>().exp, GEM_EXP_VALUE);
        assert_eq!(count::<ExpGem>(&mut world), 0);
    }

    #[test]
    fn test_heal_clamps_to_max_health() {
        let (mut world, mut schedule) = test_world();
        let player = spawn_player(&mut world, Vec2::new(500.0, 500.0));
        world.get_mut::<Player>(player).unwrap().health = 140.0;
        world.spawn((Position(Vec2::new(505.0, 500.0)), ItemDrop { kind: ItemKind::Heal }));

        advance(&mut world, &mut schedule, 16.0);

        assert_eq!(world.get::<Player>(player).unwrap().health, 150.0);
    }

    #[test]
    fn test_speed_boost_applies_and_schedules_revert() {
        let (mut world, mut schedule) = test_world();
        let player = spawn_player(&mut world, Vec2::new(500.0, 500.0));
        world.spawn((Position(Vec2::new(505.0, 500.0)), ItemDrop { kind: ItemKind::SpeedBoost }));

        advance(&mut world, &mut schedule, 16.0);

        assert_eq!(
            world.get::<Player>(player).unwrap().speed,
            crate::components::PLAYER_BASE_SPEED + 20.0
        );
        let sched = world.resource::<EffectSchedule>();
        assert_eq!(sched.len(), 1);
        assert!(matches!(
            sched.entries[0].action,
            EffectAction::RevertSpeed { amount } if amount == 20.0
        ));
    }

    #[test]
    fn test_special_pickup_idempotent_and_wave_registers_emitter() {
        let (mut world, mut schedule) = test_world();
        let player = spawn_player(&mut world, Vec2::new(500.0, 500.0));
        world.spawn((
            Position(Vec2::new(505.0, 500.0)),
            ItemDrop { kind: ItemKind::Special(SpecialEffect::Wave) },
        ));
        advance(&mut world, &mut schedule, 16.0);

        assert!(world.get::<Player>(player).unwrap().effects.wave);
        let emitters = world
            .resource::<EffectSchedule>()
            .entries
            .iter()
            .filter(|e| e.action == EffectAction::WavePulse)
            .count();
        assert_eq!(emitters, 1);

        // A second wave pickup must not register a second emitter.
        world.spawn((
            Position(Vec2::new(505.0, 500.0)),
            ItemDrop { kind: ItemKind::Special(SpecialEffect::Wave) },
        ));
        advance(&mut world, &mut schedule, 16.0);
        let emitters = world
            .resource::<EffectSchedule>()
            .entries
            .iter()
            .filter(|e| e.action == EffectAction::WavePulse)
            .count();
        assert_eq!(emitters, 1);
    }

    #[test]
    fn test_queued_damage_on_despawned_target_is_noop() {
        let (mut world, mut schedule) = test_world();
        spawn_player(&mut world, Vec2::new(1_500.0, 1_500.0));
        let enemy = spawn_enemy(&mut world, Vec2::new(100.0, 100.0), 10.0);
        world.despawn(enemy);
        world.resource_mut::<DamageQueue>().push(QueuedDamage { target: enemy, amount: 5.0 });

        advance(&mut world, &mut schedule, 16.0);

        assert_eq!(world.resource::<Progression>().enemies_killed, 0);
        assert_eq!(count::<ExpGem>(&mut world), 0);
    }
}
