//! Simulation Clock — monotonic time source and run phase
//!
//! Every timer in the simulation (cooldowns, lifespans, deferred
//! effects) is a deadline compared against `SimClock::now_ms`. The
//! clock only advances inside `Simulation::tick`, so pausing the run is
//! simply not advancing it — no entity state can mutate while paused.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Monotonic simulation time, advanced once per tick.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SimClock {
    /// Elapsed simulation time in milliseconds since run start.
    pub now_ms: f64,
    /// Delta of the current tick in milliseconds.
    pub delta_ms: f64,
    /// Number of completed ticks.
    pub tick: u64,
}

impl Default for SimClock {
    fn default() -> Self {
        Self { now_ms: 0.0, delta_ms: 0.0, tick: 0 }
    }
}

impl SimClock {
    pub fn advance(&mut self, delta_ms: f64) {
        self.delta_ms = delta_ms.max(0.0);
        self.now_ms += self.delta_ms;
        self.tick += 1;
    }

    /// Tick delta in seconds, for velocity integration.
    pub fn delta_secs(&self) -> f32 {
        (self.delta_ms / 1000.0) as f32
    }
}

/// Lifecycle phase of the run. The clock only advances in `Running`.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Normal simulation.
    Running,
    /// Stopped for level-up skill selection; resumes on `select_skill`.
    SkillSelection,
    /// Stopped by the host (boss-intro dialogue and similar).
    Paused,
    /// Terminal: player health reached zero.
    GameOver,
    /// Terminal: the floor-33 boss was defeated.
    Victory,
}

impl GamePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Victory)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances_monotonically() {
        let mut clock = SimClock::default();
        clock.advance(16.0);
        clock.advance(17.0);
        assert_eq!(clock.now_ms, 33.0);
        assert_eq!(clock.tick, 2);
        assert_eq!(clock.delta_ms, 17.0);
    }

    #[test]
    fn test_negative_delta_is_clamped() {
        let mut clock = SimClock::default();
        clock.advance(-5.0);
        assert_eq!(clock.now_ms, 0.0);
        assert_eq!(clock.delta_ms, 0.0);
    }

    #[test]
    fn test_delta_secs() {
        let mut clock = SimClock::default();
        clock.advance(250.0);
        assert!((clock.delta_secs() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_terminal_phases() {
        assert!(GamePhase::GameOver.is_terminal());
        assert!(GamePhase::Victory.is_terminal());
        assert!(!GamePhase::Running.is_terminal());
        assert!(!GamePhase::SkillSelection.is_terminal());
    }
}
