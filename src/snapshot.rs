//! World Snapshot — serializable views for the presentation layer
//!
//! Rebuilt at the end of every tick, readable by the host without
//! touching the ECS world. Rendering consumes entity views; HUD chrome
//! consumes `PlayerStats`. Everything is plain serde data.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::clock::{GamePhase, SimClock};
use crate::components::{
    Boss, EffectSet, Enemy, EnemyKind, ExpGem, ItemDrop, Player, Position, Projectile,
};
use crate::items::ItemKind;
use crate::progression::Progression;

/// HUD-facing player statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub level: u32,
    pub exp: u32,
    pub exp_to_next: u32,
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    pub damage_boost: f32,
    pub floor: u32,
    pub enemies_killed: u32,
    pub enemies_required_for_boss: u32,
}

impl PlayerStats {
    pub fn gather(progression: &Progression, player: &Player) -> Self {
        Self {
            level: progression.level,
            exp: progression.exp,
            exp_to_next: progression.exp_to_next,
            health: player.health,
            max_health: player.max_health,
            speed: player.speed,
            damage_boost: player.damage_boost,
            floor: progression.floor,
            enemies_killed: progression.enemies_killed,
            enemies_required_for_boss: progression.enemies_required_for_boss,
        }
    }
}

// ============================================================================
// Entity views
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub position: [f32; 2],
    pub health: f32,
    pub max_health: f32,
    pub invulnerable: bool,
    pub effects: EffectSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub position: [f32; 2],
    pub health: f32,
    pub max_health: f32,
    pub kind: EnemyKind,
    pub scale: f32,
    pub tint: u32,
    pub is_boss: bool,
    /// Boss display title, for the intro banner and health bar.
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    pub position: [f32; 2],
    pub radius: f32,
    pub from_boss: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GemView {
    pub position: [f32; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemView {
    pub position: [f32; 2],
    pub kind: ItemKind,
}

/// Snapshot of all live entities plus clock and phase.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub now_ms: f64,
    pub phase: GamePhase,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub gems: Vec<GemView>,
    pub items: Vec<ItemView>,
}

impl Default for WorldSnapshot {
    fn default() -> Self {
        Self {
            tick: 0,
            now_ms: 0.0,
            phase: GamePhase::Running,
            player: PlayerView::default(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            gems: Vec::new(),
            items: Vec::new(),
        }
    }
}

// ============================================================================
// System
// ============================================================================

/// System: rebuild the snapshot from live entities. Runs last in the
/// tick so the host always sees post-resolution state.
#[allow(clippy::too_many_arguments)]
pub fn update_snapshot(
    clock: Res<SimClock>,
    phase: Res<GamePhase>,
    mut snapshot: ResMut<WorldSnapshot>,
    players: Query<(&Position, &Player)>,
    enemies: Query<(&Position, &Enemy, Option<&Boss>)>,
    projectiles: Query<(&Position, &Projectile)>,
    gems: Query<(&Position, &ExpGem)>,
    items: Query<(&Position, &ItemDrop)>,
) {
    snapshot.tick = clock.tick;
    snapshot.now_ms = clock.now_ms;
    snapshot.phase = *phase;

    if let Ok((pos, player)) = players.get_single() {
        snapshot.player = PlayerView {
            position: pos.0.into(),
            health: player.health,
            max_health: player.max_health,
            invulnerable: player.is_invulnerable(clock.now_ms),
            effects: player.effects,
        };
    }

    snapshot.enemies.clear();
    for (pos, enemy, boss) in &enemies {
        if !enemy.is_alive() {
            continue;
        }
        snapshot.enemies.push(EnemyView {
            position: pos.0.into(),
            health: enemy.health,
            max_health: enemy.max_health,
            kind: enemy.kind,
            scale: enemy.scale,
            tint: enemy.kind.tint(),
            is_boss: boss.is_some(),
            title: boss.map(|b| b.title.clone()),
        });
    }

    snapshot.projectiles.clear();
    for (pos, projectile) in &projectiles {
        snapshot.projectiles.push(ProjectileView {
            position: pos.0.into(),
            radius: projectile.radius,
            from_boss: projectile.from_boss,
        });
    }

    snapshot.gems.clear();
    for (pos, _) in &gems {
        snapshot.gems.push(GemView { position: pos.0.into() });
    }

    snapshot.items.clear();
    for (pos, item) in &items {
        snapshot.items.push(ItemView { position: pos.0.into(), kind: item.kind });
    }
}

// ============================================================================
// Tests
// ============================================================================
