//! Physics Provider — circle overlap, integration, knockback, view rect
//!
//! The minimal movement/overlap collaborator the combat resolver builds
//! on. The core assumes nothing beyond pairwise circle overlap and
//! velocity-based Euler integration, so a host engine's broad-phase can
//! replace this module without touching the resolver.

use bevy::prelude::*;

use crate::clock::SimClock;
use crate::components::{ExpGem, Player, Position, Projectile, Velocity};

// ============================================================================
// Body sizes
// ============================================================================

pub const PLAYER_RADIUS: f32 = 16.0;
pub const ENEMY_BASE_RADIUS: f32 = 16.0;
pub const GEM_RADIUS: f32 = 8.0;
pub const ITEM_RADIUS: f32 = 14.0;

/// Collision radius of an enemy body at the given scale.
pub fn enemy_radius(scale: f32) -> f32 {
    ENEMY_BASE_RADIUS * scale
}

// ============================================================================
// Geometry
// ============================================================================

/// Pairwise circle overlap test.
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

/// Rectangular world the run takes place in.
#[derive(Resource, Debug, Clone, Copy)]
pub struct WorldBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl WorldBounds {
    pub fn clamp(&self, p: Vec2, margin: f32) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.min.x + margin, self.max.x - margin),
            p.y.clamp(self.min.y + margin, self.max.y - margin),
        )
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

/// Camera view size, provided by the host at startup.
#[derive(Resource, Debug, Clone, Copy)]
pub struct Viewport {
    pub size: Vec2,
}

/// Camera view rectangle: centered on the player, clamped so it never
/// leaves the world (the camera stops scrolling at the edges).
#[derive(Debug, Clone, Copy)]
pub struct ViewRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl ViewRect {
    pub fn around(player_pos: Vec2, view_size: Vec2, bounds: &WorldBounds) -> Self {
        let half = view_size * 0.5;
        let center = Vec2::new(
            player_pos.x.clamp(bounds.min.x + half.x, bounds.max.x - half.x),
            player_pos.y.clamp(bounds.min.y + half.y, bounds.max.y - half.y),
        );
        Self { min: center - half, max: center + half }
    }
}

/// Displacement target for a knockback: pushed `distance` away from
/// `source`, clamped to the world.
pub fn knockback_target(
    source: Vec2,
    hit_pos: Vec2,
    distance: f32,
    margin: f32,
    bounds: &WorldBounds,
) -> Vec2 {
    let dir = (hit_pos - source).normalize_or_zero();
    // Degenerate overlap (exactly on top of the source): push along +x.
    let dir = if dir == Vec2::ZERO { Vec2::X } else { dir };
    bounds.clamp(hit_pos + dir * distance, margin)
}

// ============================================================================
// Systems
// ============================================================================

/// Host-provided normalized movement vector for the current tick.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct MoveInput(pub Vec2);

/// System: translate the movement input into player velocity.
pub fn drive_player(input: Res<MoveInput>, mut players: Query<(&Player, &mut Velocity)>) {
    let Ok((player, mut vel)) = players.get_single_mut() else {
        return;
    };
    vel.0 = input.0.clamp_length_max(1.0) * player.speed;
}

/// System: Euler-integrate every moving entity.
pub fn integrate(clock: Res<SimClock>, mut movers: Query<(&mut Position, &Velocity)>) {
    let dt = clock.delta_secs();
    for (mut pos, vel) in &mut movers {
        pos.0 += vel.0 * dt;
    }
}

/// System: keep the player inside the world.
pub fn clamp_player(bounds: Res<WorldBounds>, mut players: Query<&mut Position, With<Player>>) {
    let Ok(mut pos) = players.get_single_mut() else {
        return;
    };
    pos.0 = bounds.clamp(pos.0, PLAYER_RADIUS);
}

/// System: remove projectiles and gems whose lifespan has run out.
pub fn expire_entities(
    clock: Res<SimClock>,
    mut commands: Commands,
    projectiles: Query<(Entity, &Projectile)>,
    gems: Query<(Entity, &ExpGem)>,
) {
    let now = clock.now_ms;
    for (entity, projectile) in &projectiles {
        if now >= projectile.expires_at_ms {
            commands.entity(entity).despawn();
        }
    }
    for (entity, gem) in &gems {
        if now >= gem.expires_at_ms {
            commands.entity(entity).despawn();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
