//! Ascent Simulation Core
//!
//! Headless real-time simulation for a 33-floor survival action game:
//! one player character auto-battles waves of enemies, collects
//! experience and items, levels up, and fights a boss on every floor.
//!
//! The crate owns combat, spawning, skills, and progression. Rendering,
//! input devices, audio, and scene chrome are the host's problem — the
//! host calls [`Simulation::tick`] once per frame, feeds a movement
//! vector, and reads [`Simulation::snapshot`] / drained events back out.

pub mod clock;       // Simulation clock and run phase
pub mod combat;      // Damage application, death resolution, pickups
pub mod components;  // ECS entity components (player, enemies, projectiles, drops)
pub mod effects;     // Scheduled deferred effects (gravity, homing, wave, boosts)
pub mod events;      // State-change notifications drained by the host
pub mod items;       // Item and special-effect definitions
pub mod physics;     // Circle overlap, integration, knockback, view rect
pub mod progression; // Leveling curve, boss gating, floor advancement
pub mod rng;         // Deterministic seedable RNG
pub mod simulation;  // Host-facing facade that owns the ECS world
pub mod skills;      // Skill definitions, cooldowns, and firing systems
pub mod snapshot;    // Serializable world views for the presentation layer
pub mod spawner;     // Enemy/boss spawning, kind tables, chase behavior

// Re-export the host-facing surface
pub use bevy::math::Vec2;
pub use clock::GamePhase;
pub use components::EnemyKind;
pub use events::SimEvent;
pub use items::{ItemKind, SpecialEffect};
pub use simulation::{SimConfig, SimError, Simulation};
pub use skills::SkillKind;
pub use snapshot::{PlayerStats, WorldSnapshot};
