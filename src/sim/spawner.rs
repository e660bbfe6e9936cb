//! Spacing-constrained spawn placement
//!
//! Spawn anchors are rejection-sampled against every currently tracked
//! position. The search is bounded: after the attempt budget runs out an
//! unconstrained position is accepted rather than failing the spawn.

use rand::Rng;
use rand_pcg::Pcg32;

use crate::tuning::EnemyTuning;

/// Pick a spawn x at least `min_spacing` from every occupied anchor,
/// falling back to an unconstrained draw after the attempt budget.
pub fn pick_spawn_x(rng: &mut Pcg32, occupied: &[f32], t: &EnemyTuning) -> f32 {
    for _ in 0..t.spawn_attempts {
        let x = rng.random_range(t.spawn_x_min..=t.spawn_x_max);
        if occupied.iter().all(|&o| (o - x).abs() >= t.min_spacing) {
            return x;
        }
    }
    rng.random_range(t.spawn_x_min..=t.spawn_x_max)
}
