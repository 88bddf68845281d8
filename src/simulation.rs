//! Simulation Facade — the host-facing surface that owns the world
//!
//! ```text
//! host frame loop
//!   ├─ set_move_input(vec)       ← input provider
//!   ├─ tick(delta_ms)            → runs the fixed system chain
//!   ├─ drain_events()            → display triggers
//!   ├─ snapshot() / player_stats() → rendering + HUD
//!   └─ select_skill(kind)        → resumes a level-up pause
//! ```
//!
//! Tick order is fixed: movement (input, steering, boss fire, deferred
//! effects, integration, expiry) → spawning → combat resolution →
//! skill firing → progression checks → snapshot. The clock only
//! advances while the phase is `Running`, so level-up selection and
//! host pauses are full stops.

use bevy::prelude::*;
use thiserror::Error;
use tracing::info;

use crate::clock::{GamePhase, SimClock};
use crate::combat::{self, DamageQueue};
use crate::components::{Player, Position, Velocity};
use crate::effects::{self, EffectSchedule};
use crate::events::{EventLog, SimEvent};
use crate::physics::{self, MoveInput, Viewport, WorldBounds};
use crate::progression::{self, PendingChoices, Progression};
use crate::rng::SimRng;
use crate::skills::{self, SkillBook, SkillKind};
use crate::snapshot::{self, PlayerStats, WorldSnapshot};
use crate::spawner::{self, SpawnerState};

/// Run configuration. The world is `world_scale` camera views across.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// Camera view size in pixels.
    pub view_size: Vec2,
    /// World extents as a multiple of the view size.
    pub world_scale: f32,
    /// Seed for the run's deterministic RNG.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { view_size: Vec2::new(540.0, 960.0), world_scale: 3.0, seed: 1 }
    }
}

/// Rejected host calls. The simulation state is untouched on error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("skill selection is not open")]
    SelectionClosed,
    #[error("skill {0:?} was not offered")]
    SkillNotOffered(SkillKind),
    #[error("simulation is not paused")]
    NotPaused,
    #[error("simulation is not running")]
    NotRunning,
}

/// The whole simulation: an ECS world advanced by a fixed schedule.
pub struct Simulation {
    world: World,
    schedule: Schedule,
    player: Entity,
    config: SimConfig,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        let mut world = World::new();

        let bounds = WorldBounds { min: Vec2::ZERO, max: config.view_size * config.world_scale };
        world.insert_resource(SimClock::default());
        world.insert_resource(GamePhase::Running);
        world.insert_resource(SimRng::new(config.seed));
        world.insert_resource(MoveInput::default());
        world.insert_resource(bounds);
        world.insert_resource(Viewport { size: config.view_size });
        world.insert_resource(SpawnerState::default());
        world.insert_resource(Progression::default());
        world.insert_resource(SkillBook::default());
        world.insert_resource(PendingChoices::default());
        world.insert_resource(DamageQueue::default());
        world.insert_resource(EffectSchedule::default());
        world.insert_resource(EventLog::default());
        world.insert_resource(WorldSnapshot::default());

        let player = world
            .spawn((Position(bounds.center()), Velocity::default(), Player::default()))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                // Movement stage
                physics::drive_player,
                spawner::steer_enemies,
                spawner::boss_attack,
                effects::process_effects,
                physics::integrate,
                physics::clamp_player,
                physics::expire_entities,
                // Spawning
                spawner::spawn_waves,
                spawner::spawn_pending_boss,
                // Combat resolution
                combat::resolve_enemy_hits,
                combat::resolve_player_hits,
                combat::resolve_pickups,
                // Skills, progression, host view
                skills::fire_skills,
                progression::check_progression,
                snapshot::update_snapshot,
            )
                .chain(),
        );

        Self { world, schedule, player, config }
    }

    /// Advance the simulation by one frame. A no-op unless the phase is
    /// `Running`; pauses and terminal states are full stops.
    pub fn tick(&mut self, delta_ms: f64) {
        if *self.world.resource::<GamePhase>() != GamePhase::Running {
            return;
        }
        self.world.resource_mut::<SimClock>().advance(delta_ms);
        self.schedule.run(&mut self.world);
    }

    /// Feed the normalized movement vector for subsequent ticks.
    pub fn set_move_input(&mut self, direction: Vec2) {
        self.world.resource_mut::<MoveInput>().0 = direction;
    }

    pub fn phase(&self) -> GamePhase {
        *self.world.resource::<GamePhase>()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// HUD statistics for the current state.
    pub fn player_stats(&self) -> PlayerStats {
        let progression = self.world.resource::<Progression>();
        let player = self
            .world
            .get::<Player>(self.player)
            .expect("the player entity lives for the whole run");
        PlayerStats::gather(progression, player)
    }

    /// Entity views rebuilt at the end of the last tick.
    pub fn snapshot(&self) -> &WorldSnapshot {
        self.world.resource::<WorldSnapshot>()
    }

    /// The skill choices on offer, while stopped in a level-up.
    pub fn skill_choices(&self) -> Option<&[SkillKind]> {
        self.world.resource::<PendingChoices>().0.as_deref()
    }

    /// Resolve a level-up pause by upgrading one of the offered skills.
    /// Returns the skill's new level and resumes the clock.
    pub fn select_skill(&mut self, kind: SkillKind) -> Result<u32, SimError> {
        if *self.world.resource::<GamePhase>() != GamePhase::SkillSelection {
            return Err(SimError::SelectionClosed);
        }
        let offered = self.world.resource::<PendingChoices>().0.as_deref().unwrap_or(&[]);
        if !offered.contains(&kind) {
            return Err(SimError::SkillNotOffered(kind));
        }

        let level = self.world.resource_mut::<SkillBook>().upgrade(kind);
        self.world.resource_mut::<PendingChoices>().0 = None;
        *self.world.resource_mut::<GamePhase>() = GamePhase::Running;
        info!(skill = kind.display_name(), level, "skill selected");
        self.world
            .resource_mut::<EventLog>()
            .push(SimEvent::SkillSelected { skill: kind, level });
        Ok(level)
    }

    /// Host-driven full stop (boss-intro dialogue and similar).
    pub fn pause(&mut self) -> Result<(), SimError> {
        let mut phase = self.world.resource_mut::<GamePhase>();
        if *phase != GamePhase::Running {
            return Err(SimError::NotRunning);
        }
        *phase = GamePhase::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), SimError> {
        let mut phase = self.world.resource_mut::<GamePhase>();
        if *phase != GamePhase::Paused {
            return Err(SimError::NotPaused);
        }
        *phase = GamePhase::Running;
        Ok(())
    }

    /// Drain the state-change notifications accumulated since the last
    /// call.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.world.resource_mut::<EventLog>().drain()
    }

    /// Reset every run state back to its initial value, reusing the
    /// same configuration and seed.
    pub fn restart(&mut self) {
        *self = Simulation::new(self.config);
    }
}

// ============================================================================
// Tests
// ============================================================================
