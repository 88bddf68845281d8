//! Headless autoplay demo: runs a scripted session of the simulation
//! core and dumps the final run statistics as JSON. Useful for eyeball
//! checks of pacing and as a smoke test of the whole tick chain.

use anyhow::Result;
use ascent_sim::{GamePhase, SimConfig, SimEvent, Simulation, Vec2};
use tracing::info;

/// 16 ms frames ≈ 60 Hz.
const TICK_MS: f64 = 16.0;
/// Stop after 10 simulated minutes if the run hasn't ended on its own.
const MAX_FRAMES: u64 = 10 * 60 * 60;

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).with_level(true).init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(SimConfig::default().seed);
    let mut sim = Simulation::new(SimConfig { seed, ..SimConfig::default() });
    info!(seed, "🚀 starting autoplay run");

    for frame in 0..MAX_FRAMES {
        // Wander in a slow circle so the camera view keeps moving.
        let angle = frame as f32 * 0.005;
        sim.set_move_input(Vec2::from_angle(angle));
        sim.tick(TICK_MS);

        for event in sim.drain_events() {
            match event {
                SimEvent::LevelUp { level, .. } => info!(level, "level up"),
                SimEvent::FloorAdvanced { floor, .. } => info!(floor, "⬆ floor advanced"),
                SimEvent::BossSpawned { floor, title } => {
                    info!(floor, title = %title, "boss spawned")
                }
                SimEvent::BossDefeated { floor } => info!(floor, "boss defeated"),
                SimEvent::SpecialUnlocked { effect } => {
                    info!(effect = effect.display_name(), "special unlocked")
                }
                _ => {}
            }
        }

        // Auto-resolve level-up pauses by taking the first offer.
        if sim.phase() == GamePhase::SkillSelection {
            if let Some(&choice) = sim.skill_choices().and_then(|c| c.first()) {
                sim.select_skill(choice)?;
            }
        }

        if sim.phase().is_terminal() {
            info!(phase = ?sim.phase(), "run ended");
            break;
        }
    }

    println!("{}", serde_json::to_string_pretty(&sim.player_stats())?);
    Ok(())
}
