//! Item Definitions — drop tables, pickup values, boss specials
//!
//! `ItemKind` is the immutable shared definition table: regular drops
//! roll independently per kind on enemy death (at most one per death),
//! boss deaths always drop one heal plus one random special. Values and
//! durations are methods on the kind, not per-instance state.

use serde::{Deserialize, Serialize};

/// Permanent player-wide modifier granted by a boss-exclusive item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialEffect {
    /// Projectiles pull nearby enemies toward themselves.
    Gravity,
    /// Projectiles survive enemy contact.
    Pierce,
    /// Projectiles split into three children on a killing hit.
    Split,
    /// A repeating shockwave damages and repels nearby enemies.
    Wave,
}

pub const SPECIAL_EFFECTS: [SpecialEffect; 4] = [
    SpecialEffect::Gravity,
    SpecialEffect::Pierce,
    SpecialEffect::Split,
    SpecialEffect::Wave,
];

impl SpecialEffect {
    pub fn display_name(&self) -> &'static str {
        match self {
            SpecialEffect::Gravity => "Gravity Core",
            SpecialEffect::Pierce => "Phase Shifter",
            SpecialEffect::Split => "Fission Core",
            SpecialEffect::Wave => "Wave Generator",
        }
    }
}

/// Item definition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Restores health on pickup.
    Heal,
    /// Temporary additive movement-speed boost.
    SpeedBoost,
    /// Temporary additive damage boost.
    DamageBoost,
    /// Boss-exclusive: unlocks a permanent special effect.
    Special(SpecialEffect),
}

/// Regular kinds rolled on enemy death, in roll order.
pub const REGULAR_ITEMS: [ItemKind; 3] =
    [ItemKind::Heal, ItemKind::SpeedBoost, ItemKind::DamageBoost];

impl ItemKind {
    /// Independent drop probability on a regular enemy death.
    /// Specials never drop from regular enemies.
    pub fn drop_chance(&self) -> f32 {
        match self {
            ItemKind::Heal => 0.08,
            ItemKind::SpeedBoost => 0.04,
            ItemKind::DamageBoost => 0.02,
            ItemKind::Special(_) => 0.0,
        }
    }

    /// Heal amount or boost magnitude.
    pub fn value(&self) -> f32 {
        match self {
            ItemKind::Heal => 30.0,
            ItemKind::SpeedBoost => 20.0,
            ItemKind::DamageBoost => 5.0,
            ItemKind::Special(_) => 0.0,
        }
    }

    /// Boost duration; `None` for instant or permanent pickups.
    pub fn duration_ms(&self) -> Option<f64> {
        match self {
            ItemKind::SpeedBoost => Some(5_000.0),
            ItemKind::DamageBoost => Some(10_000.0),
            ItemKind::Heal | ItemKind::Special(_) => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ItemKind::Heal => "Field Ration",
            ItemKind::SpeedBoost => "Energy Drink",
            ItemKind::DamageBoost => "Overclock Chip",
            ItemKind::Special(effect) => effect.display_name(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
