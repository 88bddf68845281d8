//! ECS entity components — the canonical game entity types
//!
//! Every live game object is an entity in the simulation `World`:
//! the single player, chasing enemies (one of which may be the boss),
//! projectiles from skills and the boss, experience gems, and item
//! drops. Components here are data only; behavior lives in the system
//! modules.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::items::{ItemKind, SpecialEffect};

/// World-space position in pixels.
#[derive(Component, Debug, Clone, Copy)]
pub struct Position(pub Vec2);

/// Velocity in pixels per second.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Velocity(pub Vec2);

// ============================================================================
// Player
// ============================================================================

/// The single player character. Created once per run and never
/// despawned; game-over ends the simulation instead.
#[derive(Component, Debug, Clone)]
pub struct Player {
    pub health: f32,
    pub max_health: f32,
    /// Movement speed in pixels/s, including temporary boosts.
    pub speed: f32,
    /// Stacking additive damage modifier from temporary boosts.
    pub damage_boost: f32,
    /// Damage and shield invulnerability share one deadline; grants
    /// extend it, never shorten it.
    pub invulnerable_until_ms: f64,
    /// Permanent special effects unlocked by boss items.
    pub effects: EffectSet,
}

pub const PLAYER_MAX_HEALTH: f32 = 150.0;
pub const PLAYER_BASE_SPEED: f32 = 220.0;

impl Default for Player {
    fn default() -> Self {
        Self {
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            speed: PLAYER_BASE_SPEED,
            damage_boost: 0.0,
            invulnerable_until_ms: 0.0,
            effects: EffectSet::default(),
        }
    }
}

impl Player {
    pub fn is_invulnerable(&self, now_ms: f64) -> bool {
        now_ms < self.invulnerable_until_ms
    }

    /// Extend invulnerability to at least `until_ms`.
    pub fn grant_invulnerability(&mut self, until_ms: f64) {
        self.invulnerable_until_ms = self.invulnerable_until_ms.max(until_ms);
    }
}

/// Set of permanently unlocked special effects. Grants are idempotent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSet {
    pub gravity: bool,
    pub pierce: bool,
    pub split: bool,
    pub wave: bool,
}

impl EffectSet {
    pub fn has(&self, effect: SpecialEffect) -> bool {
        match effect {
            SpecialEffect::Gravity => self.gravity,
            SpecialEffect::Pierce => self.pierce,
            SpecialEffect::Split => self.split,
            SpecialEffect::Wave => self.wave,
        }
    }

    /// Add an effect; returns true if it was newly acquired.
    pub fn grant(&mut self, effect: SpecialEffect) -> bool {
        if self.has(effect) {
            return false;
        }
        match effect {
            SpecialEffect::Gravity => self.gravity = true,
            SpecialEffect::Pierce => self.pierce = true,
            SpecialEffect::Split => self.split = true,
            SpecialEffect::Wave => self.wave = true,
        }
        true
    }
}

// ============================================================================
// Enemies
// ============================================================================

/// Enemy kind table. Each kind carries movement/health multipliers and
/// a visual identity used only by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline chaser.
    Sentinel,
    /// Slow, tanky.
    Bruiser,
    /// Fast, fragile.
    Stalker,
}

pub const ENEMY_KINDS: [EnemyKind; 3] =
    [EnemyKind::Sentinel, EnemyKind::Bruiser, EnemyKind::Stalker];

impl EnemyKind {
    pub fn speed_mult(&self) -> f32 {
        match self {
            EnemyKind::Sentinel => 1.0,
            EnemyKind::Bruiser => 0.8,
            EnemyKind::Stalker => 1.2,
        }
    }

    pub fn hp_mult(&self) -> f32 {
        match self {
            EnemyKind::Sentinel => 1.0,
            EnemyKind::Bruiser => 1.5,
            EnemyKind::Stalker => 0.8,
        }
    }

    pub fn scale(&self) -> f32 {
        match self {
            EnemyKind::Sentinel => 1.0,
            EnemyKind::Bruiser => 1.2,
            EnemyKind::Stalker => 0.9,
        }
    }

    /// Presentation tint (0xRRGGBB).
    pub fn tint(&self) -> u32 {
        match self {
            EnemyKind::Sentinel => 0x3333ff,
            EnemyKind::Bruiser => 0xff3333,
            EnemyKind::Stalker => 0x33ff33,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EnemyKind::Sentinel => "Sentinel",
            EnemyKind::Bruiser => "Bruiser",
            EnemyKind::Stalker => "Stalker",
        }
    }
}

/// A chasing enemy. Health above zero while active; death resolves
/// exactly once (gem + loot roll + gating) and despawns the entity.
#[derive(Component, Debug, Clone)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub health: f32,
    pub max_health: f32,
    /// Body scale applied on top of the kind scale (bosses are larger).
    pub scale: f32,
}

impl Enemy {
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

/// Marker + state for the floor boss. At most one entity carries this.
#[derive(Component, Debug, Clone)]
pub struct Boss {
    /// Display title surfaced to the presentation layer on spawn.
    pub title: String,
    pub attack_cooldown_ms: f64,
    pub last_attack_ms: f64,
}

// ============================================================================
// Projectiles and drops
// ============================================================================

/// A projectile in flight, from either the player's skills or the boss.
#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub damage: f32,
    /// Collision radius in pixels.
    pub radius: f32,
    pub expires_at_ms: f64,
    /// Survives enemy contact.
    pub piercing: bool,
    /// Splits into children when its hit kills an enemy.
    pub can_split: bool,
    /// Retargeted by the effect schedule; a dead target triggers a
    /// retarget, never a stale reference.
    pub homing_target: Option<Entity>,
    /// Fired by the boss at the player; ignores enemies.
    pub from_boss: bool,
}

impl Projectile {
    pub fn new(damage: f32, radius: f32, expires_at_ms: f64) -> Self {
        Self {
            damage,
            radius,
            expires_at_ms,
            piercing: false,
            can_split: false,
            homing_target: None,
            from_boss: false,
        }
    }
}

/// Experience gem dropped on enemy death. Picked up on contact or
/// expired after its lifespan.
#[derive(Component, Debug, Clone, Copy)]
pub struct ExpGem {
    pub value: u32,
    pub expires_at_ms: f64,
}

/// Item drop waiting on the ground. No lifespan; persists until
/// picked up.
#[derive(Component, Debug, Clone, Copy)]
pub struct ItemDrop {
    pub kind: ItemKind,
}

// ============================================================================
// Tests
// ============================================================================
