//! Scheduled Effects — deferred, repeating actions with owner liveness
//!
//! Every deferred action is an explicit queue entry
//! `{due_ms, owner, action}` checked once per tick: gravity-projectile
//! pulses, homing-missile steering, the wave emitter, and timed stat
//! reverts. An entry whose owner entity no longer exists is dropped
//! silently; a destroyed entity is never acted on again.

use bevy::prelude::*;

use crate::clock::SimClock;
use crate::combat::{DamageQueue, QueuedDamage};
use crate::components::{Enemy, Player, Position, Projectile, Velocity};
use crate::rng::SimRng;

// ============================================================================
// Tuning
// ============================================================================

pub const GRAVITY_PULSE_INTERVAL_MS: f64 = 100.0;
pub const GRAVITY_PULSE_COUNT: u32 = 20;
pub const GRAVITY_RADIUS: f32 = 150.0;
/// Enemies closer than this are not pulled (already on top of the
/// projectile).
pub const GRAVITY_MIN_DISTANCE: f32 = 10.0;
pub const GRAVITY_IMPULSE: f32 = 50.0;

pub const HOMING_STEER_INTERVAL_MS: f64 = 100.0;
pub const HOMING_STEER_COUNT: u32 = 50;

pub const WAVE_INTERVAL_MS: f64 = 5_000.0;
pub const WAVE_RADIUS: f32 = 200.0;
pub const WAVE_IMPULSE: f32 = 150.0;
pub const WAVE_DAMAGE: f32 = 5.0;

// ============================================================================
// Schedule
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectAction {
    /// Pull nearby enemies toward the owning projectile.
    GravityPulse { remaining: u32 },
    /// Re-aim the owning missile at its (possibly re-picked) target.
    HomingSteer { remaining: u32 },
    /// Damage and repel enemies around the owning player. Repeats
    /// forever.
    WavePulse,
    /// Remove an expired speed boost from the owning player.
    RevertSpeed { amount: f32 },
    /// Remove an expired damage boost from the owning player.
    RevertDamage { amount: f32 },
}

#[derive(Debug, Clone, Copy)]
pub struct ScheduledEffect {
    pub due_ms: f64,
    pub owner: Entity,
    pub action: EffectAction,
}

/// All pending deferred effects, checked once per tick.
#[derive(Resource, Debug, Default)]
pub struct EffectSchedule {
    pub entries: Vec<ScheduledEffect>,
}

impl EffectSchedule {
    pub fn push(&mut self, due_ms: f64, owner: Entity, action: EffectAction) {
        self.entries.push(ScheduledEffect { due_ms, owner, action });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Processing
// ============================================================================

type EnemyQuery<'w, 's> = Query<
    'w,
    's,
    (Entity, &'static Position, &'static mut Velocity, &'static Enemy),
    (Without<Player>, Without<Projectile>),
>;

/// System: run all due effects, rescheduling repeating ones.
pub fn process_effects(
    clock: Res<SimClock>,
    mut schedule: ResMut<EffectSchedule>,
    mut damage_queue: ResMut<DamageQueue>,
    mut rng: ResMut<SimRng>,
    mut players: Query<(&Position, &mut Player)>,
    mut enemies: EnemyQuery,
    mut projectiles: Query<(&Position, &mut Velocity, &mut Projectile), Without<Enemy>>,
) {
    let now = clock.now_ms;
    let entries = std::mem::take(&mut schedule.entries);
    let mut keep = Vec::with_capacity(entries.len());

    for mut entry in entries {
        if now < entry.due_ms {
            keep.push(entry);
            continue;
        }

        match entry.action {
            EffectAction::GravityPulse { remaining } => {
                // Owner despawned (hit or expired): pulses die with it.
                let Ok((pos, _, _)) = projectiles.get(entry.owner) else {
                    continue;
                };
                let center = pos.0;
                for (_, enemy_pos, mut enemy_vel, enemy) in enemies.iter_mut() {
                    if !enemy.is_alive() {
                        continue;
                    }
                    let dist = enemy_pos.0.distance(center);
                    if dist < GRAVITY_RADIUS && dist > GRAVITY_MIN_DISTANCE {
                        let pull = (center - enemy_pos.0).normalize_or_zero();
                        enemy_vel.0 += pull * GRAVITY_IMPULSE;
                    }
                }
                if remaining > 1 {
                    entry.due_ms += GRAVITY_PULSE_INTERVAL_MS;
                    entry.action = EffectAction::GravityPulse { remaining: remaining - 1 };
                    keep.push(entry);
                }
            }

            EffectAction::HomingSteer { remaining } => {
                let Ok((pos, mut vel, mut projectile)) = projectiles.get_mut(entry.owner) else {
                    continue;
                };
                // Revalidate the target; a dead one is re-picked at
                // random from the live set.
                let target_alive = projectile
                    .homing_target
                    .is_some_and(|t| enemies.get(t).is_ok_and(|(_, _, _, e)| e.is_alive()));
                if !target_alive {
                    let live: Vec<Entity> = enemies
                        .iter()
                        .filter(|(_, _, _, e)| e.is_alive())
                        .map(|(e, _, _, _)| e)
                        .collect();
                    projectile.homing_target =
                        if live.is_empty() { None } else { Some(*rng.pick(&live)) };
                }
                if let Some(target) = projectile.homing_target {
                    if let Ok((_, target_pos, _, _)) = enemies.get(target) {
                        let dir = (target_pos.0 - pos.0).normalize_or_zero();
                        vel.0 = dir * crate::skills::HOMING_SPEED;
                    }
                }
                if remaining > 1 {
                    entry.due_ms += HOMING_STEER_INTERVAL_MS;
                    entry.action = EffectAction::HomingSteer { remaining: remaining - 1 };
                    keep.push(entry);
                }
            }

            EffectAction::WavePulse => {
                let Ok((player_pos, _)) = players.get(entry.owner) else {
                    continue;
                };
                let center = player_pos.0;
                for (enemy_entity, enemy_pos, mut enemy_vel, enemy) in enemies.iter_mut() {
                    if !enemy.is_alive() || enemy_pos.0.distance(center) >= WAVE_RADIUS {
                        continue;
                    }
                    let push = (enemy_pos.0 - center).normalize_or_zero();
                    enemy_vel.0 += push * WAVE_IMPULSE;
                    damage_queue.push(QueuedDamage { target: enemy_entity, amount: WAVE_DAMAGE });
                }
                entry.due_ms += WAVE_INTERVAL_MS;
                keep.push(entry);
            }

            EffectAction::RevertSpeed { amount } => {
                if let Ok((_, mut player)) = players.get_mut(entry.owner) {
                    player.speed -= amount;
                }
            }

            EffectAction::RevertDamage { amount } => {
                if let Ok((_, mut player)) = players.get_mut(entry.owner) {
                    player.damage_boost -= amount;
                }
            }
        }
    }

    schedule.entries = keep;
}

// ============================================================================
// Tests
// ============================================================================
