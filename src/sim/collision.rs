//! Distance-threshold collision predicates
//!
//! Everything in the playfield collides as a point pair against a
//! context-specific threshold; there is no shape geometry. Pure functions,
//! no side effects.

use glam::Vec2;

/// True iff the Euclidean distance between `a` and `b` is strictly below
/// `threshold`.
#[inline]
pub fn collides(a: Vec2, b: Vec2, threshold: f32) -> bool {
    a.distance_squared(b) < threshold * threshold
}

/// True iff an enemy projectile sits strictly inside the near-miss band
/// around the player: close enough to count as a dodge, far enough not to
/// be a hit.
#[inline]
pub fn in_dodge_band(projectile: Vec2, player: Vec2, band_min: f32, band_max: f32) -> bool {
    let d = projectile.distance(player);
    d > band_min && d < band_max
}
