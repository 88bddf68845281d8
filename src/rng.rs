//! Deterministic RNG — seedable LCG used for every random roll
//!
//! The whole run is reproducible from `SimConfig::seed`: spawn sides,
//! enemy kinds, health jitter, loot rolls, and skill-choice draws all
//! pull from this one stream. No OS entropy in the core.

use bevy::prelude::*;

const MULTIPLIER: u64 = 6364136223846793005;
const INCREMENT: u64 = 1442695040888963407;

/// Linear congruential generator behind all simulation randomness.
#[derive(Resource, Debug, Clone)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        // Scramble the seed so small seeds don't start in a flat region.
        let mut rng = Self { state: seed.wrapping_add(INCREMENT) };
        rng.next_u32();
        rng
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        (self.state >> 33) as u32
    }

    /// Uniform float in [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() as f64 / (u32::MAX as f64 + 1.0)) as f32
    }

    /// Uniform float in [lo, hi).
    pub fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }

    /// Uniform integer in [0, n). `n` must be non-zero.
    pub fn range_u32(&mut self, n: u32) -> u32 {
        self.next_u32() % n
    }

    /// Uniform pick from a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.range_u32(items.len() as u32) as usize]
    }

    /// Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.range_u32(i as u32 + 1) as usize;
            items.swap(i, j);
        }
    }

    /// Multiplier in [1 - spread, 1 + spread], e.g. health jitter.
    pub fn jitter(&mut self, spread: f32) -> f32 {
        1.0 + self.range_f32(-spread, spread)
    }
}

// ============================================================================
// Tests
// ============================================================================
