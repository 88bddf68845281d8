//! Progression Controller — leveling curve, boss gating, floor advance
//!
//! State machine over floor [1, 33] and player level [1, ∞). Floors
//! advance only through boss kills; the kill quota, enemy health, and
//! spawn pressure all scale with the floor through the piecewise curves
//! here. Level-ups stop the clock and offer three skill choices.

use bevy::prelude::*;
use tracing::info;

use crate::clock::GamePhase;
use crate::components::Player;
use crate::events::{EventLog, SimEvent};
use crate::rng::SimRng;
use crate::skills::{draw_skill_choices, SkillKind};
use crate::spawner::{SpawnerState, ENEMY_SPEED_STEP, MIN_SPAWN_INTERVAL_MS, SPAWN_INTERVAL_STEP_MS};

pub const FINAL_FLOOR: u32 = 33;
pub const INITIAL_EXP_TO_NEXT: u32 = 80;
/// Experience threshold growth per level.
pub const EXP_GROWTH: f64 = 1.1;
pub const SKILL_CHOICE_COUNT: usize = 3;

// ============================================================================
// Curves
// ============================================================================

/// Regular-enemy kills required before the floor boss appears.
/// Out-of-range floors clamp to the curve's ends.
pub fn enemies_required_for_boss(floor: u32) -> u32 {
    let f = floor.clamp(1, FINAL_FLOOR);
    match f {
        1..=5 => 10 * f,
        6..=15 => 50 + (f - 5) * 15,
        _ => 200 + (f - 15) * 20,
    }
}

// ============================================================================
// Run state
// ============================================================================

/// Player-wide progression state, owned by the simulation context.
#[derive(Resource, Debug, Clone)]
pub struct Progression {
    pub level: u32,
    pub exp: u32,
    pub exp_to_next: u32,
    pub floor: u32,
    /// Regular-enemy kills on the current floor.
    pub enemies_killed: u32,
    pub enemies_required_for_boss: u32,
    /// A boss spawn has been requested; consumed (idempotently) by the
    /// spawner.
    pub boss_pending: bool,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            level: 1,
            exp: 0,
            exp_to_next: INITIAL_EXP_TO_NEXT,
            floor: 1,
            enemies_killed: 0,
            enemies_required_for_boss: enemies_required_for_boss(1),
            boss_pending: false,
        }
    }
}

/// Skill choices currently offered to the player, if the clock is
/// stopped on a level-up.
#[derive(Resource, Debug, Default)]
pub struct PendingChoices(pub Option<Vec<SkillKind>>);

// ============================================================================
// Transitions
// ============================================================================

/// Apply one level-up step: carry surplus exp, grow the threshold,
/// restore health, and draw the skill offer.
pub fn apply_level_up(
    progression: &mut Progression,
    player: &mut Player,
    rng: &mut SimRng,
) -> Vec<SkillKind> {
    let threshold = progression.exp_to_next;
    progression.level += 1;
    progression.exp -= threshold;
    progression.exp_to_next = (threshold as f64 * EXP_GROWTH).floor() as u32;
    player.health = player.max_health;
    draw_skill_choices(rng, SKILL_CHOICE_COUNT)
}

/// Advance to the next floor after a boss kill: reset the kill quota,
/// tighten the spawn interval, and raise enemy speed. Entering the
/// final floor summons its boss immediately, with no kill quota there.
pub fn advance_floor(
    progression: &mut Progression,
    spawner: &mut SpawnerState,
    events: &mut EventLog,
) {
    progression.floor = (progression.floor + 1).min(FINAL_FLOOR);
    progression.enemies_killed = 0;
    progression.enemies_required_for_boss = enemies_required_for_boss(progression.floor);
    progression.boss_pending = progression.floor == FINAL_FLOOR;

    spawner.spawn_interval_ms =
        (spawner.spawn_interval_ms - SPAWN_INTERVAL_STEP_MS).max(MIN_SPAWN_INTERVAL_MS);
    spawner.enemy_speed += ENEMY_SPEED_STEP;

    info!(
        floor = progression.floor,
        required = progression.enemies_required_for_boss,
        "floor advanced"
    );
    events.push(SimEvent::FloorAdvanced {
        floor: progression.floor,
        required_kills: progression.enemies_required_for_boss,
    });
}

/// System: end-of-tick progression checks, the level-up pause and the
/// game-over backstop.
pub fn check_progression(
    mut progression: ResMut<Progression>,
    mut phase: ResMut<GamePhase>,
    mut rng: ResMut<SimRng>,
    mut choices: ResMut<PendingChoices>,
    mut events: ResMut<EventLog>,
    mut players: Query<&mut Player>,
) {
    if phase.is_terminal() {
        return;
    }
    let Ok(mut player) = players.get_single_mut() else {
        return;
    };

    if player.health <= 0.0 {
        *phase = GamePhase::GameOver;
        events.push(SimEvent::GameOver { level: progression.level, floor: progression.floor });
        return;
    }

    // One level per tick; any surplus carries to the next check after
    // the selection pause resolves.
    if progression.exp >= progression.exp_to_next {
        let offered = apply_level_up(&mut progression, &mut player, &mut rng);
        info!(level = progression.level, "level up");
        events.push(SimEvent::LevelUp { level: progression.level, choices: offered.clone() });
        choices.0 = Some(offered);
        *phase = GamePhase::SkillSelection;
    }
}

// ============================================================================
// Tests
// ============================================================================
