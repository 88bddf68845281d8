//! Skill System — definitions, cooldowns, firing, upgrade draws
//!
//! ```text
//! tick → fire_skills: for each skill with level > 0 and cooldown up
//!     Bolt   → projectile at the nearest enemy (carries player effects)
//!     Nova   → queued damage to everything in radius
//!     Homing → 3 missiles with independent random targets
//!     Shield → extends the player's invulnerability deadline
//! ```
//!
//! Cooldowns reset on fire whether or not a target existed — a bolt
//! fired into an empty floor still waits out its cooldown.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::clock::{GamePhase, SimClock};
use crate::combat::{DamageQueue, QueuedDamage};
use crate::components::{Enemy, Player, Position, Projectile, Velocity};
use crate::effects::{
    EffectAction, EffectSchedule, GRAVITY_PULSE_COUNT, GRAVITY_PULSE_INTERVAL_MS,
    HOMING_STEER_COUNT, HOMING_STEER_INTERVAL_MS,
};
use crate::rng::SimRng;

// ============================================================================
// Definitions
// ============================================================================

/// The fixed set of definable skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillKind {
    /// Single projectile at the nearest enemy.
    Bolt,
    /// Radial burst around the player.
    Nova,
    /// Three self-steering missiles.
    Homing,
    /// Temporary invulnerability.
    Shield,
}

pub const ALL_SKILLS: [SkillKind; 4] =
    [SkillKind::Bolt, SkillKind::Nova, SkillKind::Homing, SkillKind::Shield];

impl SkillKind {
    pub fn cooldown_ms(&self) -> f64 {
        match self {
            SkillKind::Bolt => 400.0,
            SkillKind::Nova => 2_500.0,
            SkillKind::Homing => 1_800.0,
            SkillKind::Shield => 4_000.0,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SkillKind::Bolt => "Pulse Bolt",
            SkillKind::Nova => "Nova Burst",
            SkillKind::Homing => "Seeker Swarm",
            SkillKind::Shield => "Aegis Shield",
        }
    }
}

pub const BOLT_BASE_DAMAGE: f32 = 15.0;
pub const BOLT_BASE_SPEED: f32 = 300.0;
pub const BOLT_SPEED_PER_LEVEL: f32 = 20.0;
pub const BOLT_BASE_RADIUS: f32 = 6.0;
pub const BOLT_RADIUS_PER_LEVEL: f32 = 0.5;
pub const BOLT_LIFESPAN_MS: f64 = 2_000.0;

pub const NOVA_RADIUS: f32 = 100.0;
pub const NOVA_DAMAGE_PER_LEVEL: f32 = 20.0;

pub const HOMING_MISSILE_COUNT: usize = 3;
pub const HOMING_DAMAGE_PER_LEVEL: f32 = 20.0;
pub const HOMING_SPEED: f32 = 200.0;
pub const HOMING_RADIUS: f32 = 5.0;
pub const HOMING_LIFESPAN_MS: f64 = 5_000.0;

pub const SHIELD_DURATION_PER_LEVEL_MS: f64 = 2_000.0;

// ============================================================================
// Skill book
// ============================================================================

/// Per-skill progression state.
#[derive(Debug, Clone)]
pub struct SkillState {
    pub kind: SkillKind,
    /// 0 = locked; firing requires level > 0.
    pub level: u32,
    pub last_fired_ms: f64,
}

/// All skill states for the run. The active list is the subset with
/// level > 0.
#[derive(Resource, Debug, Clone)]
pub struct SkillBook {
    pub skills: Vec<SkillState>,
}

impl Default for SkillBook {
    fn default() -> Self {
        let skills = ALL_SKILLS
            .iter()
            .map(|&kind| SkillState {
                kind,
                // The run starts with the bolt unlocked.
                level: if kind == SkillKind::Bolt { 1 } else { 0 },
                last_fired_ms: 0.0,
            })
            .collect();
        Self { skills }
    }
}

impl SkillBook {
    pub fn level_of(&self, kind: SkillKind) -> u32 {
        self.skills.iter().find(|s| s.kind == kind).map_or(0, |s| s.level)
    }

    /// Increment a skill's level (unlocking it at level 1). Returns the
    /// new level.
    pub fn upgrade(&mut self, kind: SkillKind) -> u32 {
        let skill = self
            .skills
            .iter_mut()
            .find(|s| s.kind == kind)
            .expect("every SkillKind is in the book");
        skill.level += 1;
        skill.level
    }
}

/// Draw `count` distinct skills for a level-up offer.
pub fn draw_skill_choices(rng: &mut SimRng, count: usize) -> Vec<SkillKind> {
    let mut pool = ALL_SKILLS;
    rng.shuffle(&mut pool);
    pool[..count.min(pool.len())].to_vec()
}

// ============================================================================
// Firing
// ============================================================================

/// System: fire every unlocked skill whose cooldown has elapsed.
#[allow(clippy::too_many_arguments)]
pub fn fire_skills(
    clock: Res<SimClock>,
    phase: Res<GamePhase>,
    mut book: ResMut<SkillBook>,
    mut rng: ResMut<SimRng>,
    mut damage_queue: ResMut<DamageQueue>,
    mut schedule: ResMut<EffectSchedule>,
    mut commands: Commands,
    mut players: Query<(&Position, &mut Player)>,
    enemies: Query<(Entity, &Position, &Enemy), Without<Player>>,
) {
    if phase.is_terminal() {
        return;
    }
    let Ok((player_pos, mut player)) = players.get_single_mut() else {
        return;
    };
    let now = clock.now_ms;

    for skill in book.skills.iter_mut() {
        if skill.level == 0 || now < skill.last_fired_ms + skill.kind.cooldown_ms() {
            continue;
        }

        match skill.kind {
            SkillKind::Bolt => fire_bolt(
                now,
                skill.level,
                player_pos.0,
                &player,
                &enemies,
                &mut commands,
                &mut schedule,
            ),
            SkillKind::Nova => fire_nova(skill.level, player_pos.0, &enemies, &mut damage_queue),
            SkillKind::Homing => fire_homing(
                now,
                skill.level,
                player_pos.0,
                &enemies,
                &mut rng,
                &mut commands,
                &mut schedule,
            ),
            SkillKind::Shield => {
                let duration = SHIELD_DURATION_PER_LEVEL_MS * skill.level as f64;
                player.grant_invulnerability(now + duration);
            }
        }

        // Cooldown resets even when targeting found nothing.
        skill.last_fired_ms = now;
    }
}

fn fire_bolt(
    now: f64,
    level: u32,
    origin: Vec2,
    player: &Player,
    enemies: &Query<(Entity, &Position, &Enemy), Without<Player>>,
    commands: &mut Commands,
    schedule: &mut EffectSchedule,
) {
    let Some(target_pos) = nearest_enemy(origin, enemies) else {
        return;
    };

    let dir = (target_pos - origin).normalize_or_zero();
    let speed = BOLT_BASE_SPEED + BOLT_SPEED_PER_LEVEL * level as f32;
    let radius = BOLT_BASE_RADIUS + BOLT_RADIUS_PER_LEVEL * level as f32;
    let damage = (BOLT_BASE_DAMAGE + player.damage_boost) * level as f32;

    let mut projectile = Projectile::new(damage, radius, now + BOLT_LIFESPAN_MS);
    projectile.piercing = player.effects.pierce;
    projectile.can_split = player.effects.split;

    let has_gravity = player.effects.gravity;
    let entity = commands
        .spawn((Position(origin), Velocity(dir * speed), projectile))
        .id();

    if has_gravity {
        schedule.push(
            now + GRAVITY_PULSE_INTERVAL_MS,
            entity,
            EffectAction::GravityPulse { remaining: GRAVITY_PULSE_COUNT },
        );
    }
}

fn fire_nova(
    level: u32,
    origin: Vec2,
    enemies: &Query<(Entity, &Position, &Enemy), Without<Player>>,
    damage_queue: &mut DamageQueue,
) {
    let damage = NOVA_DAMAGE_PER_LEVEL * level as f32;
    for (entity, pos, enemy) in enemies {
        if enemy.is_alive() && pos.0.distance(origin) < NOVA_RADIUS {
            damage_queue.push(QueuedDamage { target: entity, amount: damage });
        }
    }
}

fn fire_homing(
    now: f64,
    level: u32,
    origin: Vec2,
    enemies: &Query<(Entity, &Position, &Enemy), Without<Player>>,
    rng: &mut SimRng,
    commands: &mut Commands,
    schedule: &mut EffectSchedule,
) {
    let live: Vec<Entity> =
        enemies.iter().filter(|(_, _, e)| e.is_alive()).map(|(e, _, _)| e).collect();

    for _ in 0..HOMING_MISSILE_COUNT {
        let damage = HOMING_DAMAGE_PER_LEVEL * level as f32;
        let mut missile = Projectile::new(damage, HOMING_RADIUS, now + HOMING_LIFESPAN_MS);
        if !live.is_empty() {
            missile.homing_target = Some(*rng.pick(&live));
        }

        let entity = commands
            .spawn((Position(origin), Velocity(Vec2::ZERO), missile))
            .id();
        schedule.push(
            now + HOMING_STEER_INTERVAL_MS,
            entity,
            EffectAction::HomingSteer { remaining: HOMING_STEER_COUNT },
        );
    }
}

/// Nearest live enemy by Euclidean distance, if any.
fn nearest_enemy(
    origin: Vec2,
    enemies: &Query<(Entity, &Position, &Enemy), Without<Player>>,
) -> Option<Vec2> {
    let mut best: Option<(f32, Vec2)> = None;
    for (_, pos, enemy) in enemies {
        if !enemy.is_alive() {
            continue;
        }
        let dist = pos.0.distance_squared(origin);
        if best.map_or(true, |(d, _)| dist < d) {
            best = Some((dist, pos.0));
        }
    }
    best.map(|(_, pos)| pos)
}

// ============================================================================
// Tests
// ============================================================================
