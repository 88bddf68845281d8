//! Simulation Events — state-change notifications for the host
//!
//! The core never calls into the presentation layer; it appends events
//! here and the host drains them after each tick. Events are display
//! triggers only — dropping them does not affect simulation
//! correctness.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::items::{ItemKind, SpecialEffect};
use crate::skills::SkillKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Player took damage; `health` is the post-hit value.
    PlayerDamaged { amount: f32, health: f32 },
    PlayerHealed { amount: f32, health: f32 },
    ExpCollected { amount: u32, total: u32 },
    /// Level-up pause engaged; the host must present `choices` and call
    /// `select_skill` to resume.
    LevelUp { level: u32, choices: Vec<SkillKind> },
    SkillSelected { skill: SkillKind, level: u32 },
    FloorAdvanced { floor: u32, required_kills: u32 },
    /// Boss-intro trigger; the host may hold the clock via `pause()`.
    BossSpawned { floor: u32, title: String },
    BossDefeated { floor: u32 },
    ItemPickedUp { kind: ItemKind },
    SpecialUnlocked { effect: SpecialEffect },
    GameOver { level: u32, floor: u32 },
    Victory { level: u32, floor: u32 },
}

/// Per-tick event buffer, drained by the host.
#[derive(Resource, Debug, Default)]
pub struct EventLog(pub Vec<SimEvent>);

impl EventLog {
    pub fn push(&mut self, event: SimEvent) {
        self.0.push(event);
    }

    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
