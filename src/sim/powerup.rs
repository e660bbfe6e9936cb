//! Power-up drops, pickups and active effects
//!
//! Kills roll against a weighted drop table, gated by a global minimum
//! spacing between drops. Pickups fall with the background scroll and
//! despawn if uncollected. Active effects are exclusive per type: a fresh
//! pickup of the same type restarts the timer, never stacks. Instant
//! effects (screen clear) are applied by the orchestrator and never enter
//! the active list.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::SCREEN_HEIGHT;
use crate::frame_scale;
use crate::tuning::PowerUpTuning;

/// Time-scale applied to enemies and projectiles while bullet time runs
pub const BULLET_TIME_SCALE: f32 = 0.3;
/// Player speed multiplier while speed boost runs
pub const SPEED_BOOST_FACTOR: f32 = 1.5;
/// Post-combo score multiplier while the score effect runs
pub const SCORE_MULTIPLIER_FACTOR: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpKind {
    RapidFire,
    Shield,
    MultiShot,
    SpeedBoost,
    ScreenClear,
    ScoreMultiplier,
    BulletTime,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 7] = [
        PowerUpKind::RapidFire,
        PowerUpKind::Shield,
        PowerUpKind::MultiShot,
        PowerUpKind::SpeedBoost,
        PowerUpKind::ScreenClear,
        PowerUpKind::ScoreMultiplier,
        PowerUpKind::BulletTime,
    ];

    /// Effect duration in ms; zero marks an instant effect.
    pub fn duration_ms(self) -> f64 {
        match self {
            PowerUpKind::RapidFire => 8000.0,
            PowerUpKind::Shield => 12_000.0,
            PowerUpKind::MultiShot => 10_000.0,
            PowerUpKind::SpeedBoost => 6000.0,
            PowerUpKind::ScreenClear => 0.0,
            PowerUpKind::ScoreMultiplier => 15_000.0,
            PowerUpKind::BulletTime => 5000.0,
        }
    }

    /// Relative drop weight: common boosts down to the very rare clear.
    pub fn drop_weight(self) -> u32 {
        match self {
            PowerUpKind::RapidFire => 20,
            PowerUpKind::SpeedBoost => 20,
            PowerUpKind::MultiShot => 15,
            PowerUpKind::Shield => 12,
            PowerUpKind::ScoreMultiplier => 8,
            PowerUpKind::BulletTime => 6,
            PowerUpKind::ScreenClear => 3,
        }
    }

    pub fn is_instant(self) -> bool {
        self.duration_ms() == 0.0
    }

    pub fn label(self) -> &'static str {
        match self {
            PowerUpKind::RapidFire => "rapid fire",
            PowerUpKind::Shield => "shield",
            PowerUpKind::MultiShot => "multi shot",
            PowerUpKind::SpeedBoost => "speed boost",
            PowerUpKind::ScreenClear => "screen clear",
            PowerUpKind::ScoreMultiplier => "score x2",
            PowerUpKind::BulletTime => "bullet time",
        }
    }
}

/// A dropped pickup falling toward the player.
#[derive(Debug, Clone)]
pub struct Pickup {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub active: bool,
    spawned_ms: f64,
    /// Phase for the cosmetic floating oscillation
    float_phase: f32,
}

impl Pickup {
    fn new(id: u32, kind: PowerUpKind, pos: Vec2, now_ms: f64, rng: &mut Pcg32) -> Self {
        Self {
            id,
            kind,
            pos,
            active: true,
            spawned_ms: now_ms,
            float_phase: rng.random_range(0.0..std::f32::consts::TAU),
        }
    }

    fn update(&mut self, dt_ms: f32, now_ms: f64, scroll_speed: f32, t: &PowerUpTuning) {
        let fall_speed = scroll_speed * t.fall_factor;
        let float = ((now_ms as f32) * 0.003 + self.float_phase).sin() * 0.3;
        self.pos.y += (fall_speed + float) * frame_scale(dt_ms);

        if self.pos.y > SCREEN_HEIGHT + 50.0 || now_ms - self.spawned_ms > t.lifetime_ms {
            self.active = false;
        }
    }

    pub fn age_ms(&self, now_ms: f64) -> f64 {
        now_ms - self.spawned_ms
    }
}

/// A timed effect currently modifying orchestrator behavior.
#[derive(Debug, Clone)]
pub struct ActiveEffect {
    pub kind: PowerUpKind,
    started_ms: f64,
    duration_ms: f64,
}

impl ActiveEffect {
    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        (self.duration_ms - (now_ms - self.started_ms)).max(0.0)
    }

    fn expired(&self, now_ms: f64) -> bool {
        now_ms - self.started_ms > self.duration_ms
    }
}

/// Owns pickups on the field and the active-effect timers.
#[derive(Debug, Clone)]
pub struct PowerUpField {
    pub pickups: Vec<Pickup>,
    pub active: Vec<ActiveEffect>,
    last_drop_ms: f64,
}

impl Default for PowerUpField {
    fn default() -> Self {
        Self {
            pickups: Vec::new(),
            active: Vec::new(),
            last_drop_ms: -10_000.0,
        }
    }
}

impl PowerUpField {
    /// Roll for a drop at a kill site. Gated by the per-kill chance and
    /// the global spacing between drops.
    pub fn try_drop(
        &mut self,
        rng: &mut Pcg32,
        id: u32,
        kill_pos: Vec2,
        now_ms: f64,
        t: &PowerUpTuning,
    ) -> bool {
        if rng.random_range(0.0..1.0) >= t.drop_chance
            || now_ms - self.last_drop_ms <= t.min_drop_gap_ms
        {
            return false;
        }
        let kind = Self::roll_kind(rng);
        // Drop slightly above the kill site
        let pos = kill_pos + Vec2::new(0.0, -20.0);
        log::debug!("{} dropped at {:.0},{:.0}", kind.label(), pos.x, pos.y);
        self.pickups.push(Pickup::new(id, kind, pos, now_ms, rng));
        self.last_drop_ms = now_ms;
        true
    }

    /// Weighted draw over the drop table.
    fn roll_kind(rng: &mut Pcg32) -> PowerUpKind {
        let total: u32 = PowerUpKind::ALL.iter().map(|k| k.drop_weight()).sum();
        let roll = rng.random_range(1..=total);
        let mut cumulative = 0;
        for kind in PowerUpKind::ALL {
            cumulative += kind.drop_weight();
            if roll <= cumulative {
                return kind;
            }
        }
        PowerUpKind::RapidFire
    }

    /// Advance pickup fall/lifetimes and expire finished effects. Runs on
    /// raw (un-bullet-timed) elapsed time.
    pub fn update(&mut self, dt_ms: f32, now_ms: f64, scroll_speed: f32, t: &PowerUpTuning) {
        for pickup in &mut self.pickups {
            pickup.update(dt_ms, now_ms, scroll_speed, t);
        }
        self.pickups.retain(|p| p.active);
        self.active.retain(|e| !e.expired(now_ms));
    }

    /// Collect every pickup within the collection radius, activating each.
    /// Returns the collected kinds so the orchestrator can apply instant
    /// consequences.
    pub fn collect(&mut self, player: Vec2, radius: f32, now_ms: f64) -> Vec<PowerUpKind> {
        let mut collected = Vec::new();
        let mut i = 0;
        while i < self.pickups.len() {
            if self.pickups[i].pos.distance(player) < radius {
                let kind = self.pickups.remove(i).kind;
                self.activate(kind, now_ms);
                collected.push(kind);
            } else {
                i += 1;
            }
        }
        collected
    }

    /// Exclusive per type: replaces any running effect of the same kind.
    /// Instant kinds are never timer-tracked.
    pub fn activate(&mut self, kind: PowerUpKind, now_ms: f64) {
        self.active.retain(|e| e.kind != kind);
        if !kind.is_instant() {
            self.active.push(ActiveEffect {
                kind,
                started_ms: now_ms,
                duration_ms: kind.duration_ms(),
            });
        }
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.active.iter().any(|e| e.kind == kind)
    }

    /// One-shot consumption, used when the shield absorbs a hit.
    pub fn consume(&mut self, kind: PowerUpKind) {
        self.active.retain(|e| e.kind != kind);
    }

    /// Global time-scale for enemy- and projectile-side updates.
    pub fn time_scale(&self) -> f32 {
        if self.is_active(PowerUpKind::BulletTime) {
            BULLET_TIME_SCALE
        } else {
            1.0
        }
    }

    pub fn active_effects(&self, now_ms: f64) -> Vec<(PowerUpKind, f64)> {
        self.active
            .iter()
            .map(|e| (e.kind, e.remaining_ms(now_ms)))
            .collect()
    }

    pub fn clear(&mut self) {
        self.pickups.clear();
        self.active.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(31)
    }

    #[test]
    fn same_type_restarts_instead_of_stacking() {
        let mut field = PowerUpField::default();
        field.activate(PowerUpKind::Shield, 1000.0);
        field.activate(PowerUpKind::Shield, 5000.0);
        assert_eq!(field.active.len(), 1);
        let remaining = field.active[0].remaining_ms(5000.0);
        assert!((remaining - PowerUpKind::Shield.duration_ms()).abs() < 1e-6);
    }

    #[test]
    fn instant_effects_never_enter_the_active_list() {
        let mut field = PowerUpField::default();
        field.activate(PowerUpKind::ScreenClear, 0.0);
        assert!(field.active.is_empty());
        assert!(!field.is_active(PowerUpKind::ScreenClear));
    }

    #[test]
    fn effects_expire_on_update() {
        let mut field = PowerUpField::default();
        let t = PowerUpTuning::default();
        field.activate(PowerUpKind::BulletTime, 0.0);
        assert_eq!(field.time_scale(), BULLET_TIME_SCALE);
        field.update(16.67, 5001.0, 6.0, &t);
        assert!(!field.is_active(PowerUpKind::BulletTime));
        assert_eq!(field.time_scale(), 1.0);
    }

    #[test]
    fn drops_respect_the_global_gap() {
        let mut r = rng();
        let t = PowerUpTuning {
            drop_chance: 1.0,
            ..Default::default()
        };
        let mut field = PowerUpField::default();
        assert!(field.try_drop(&mut r, 1, Vec2::new(400.0, 200.0), 10_000.0, &t));
        // Within the gap: always rejected even with a guaranteed roll
        assert!(!field.try_drop(&mut r, 2, Vec2::new(400.0, 200.0), 12_000.0, &t));
        assert!(field.try_drop(&mut r, 3, Vec2::new(400.0, 200.0), 13_001.0, &t));
        assert_eq!(field.pickups.len(), 2);
    }

    #[test]
    fn uncollected_pickup_expires() {
        let mut r = rng();
        let t = PowerUpTuning {
            drop_chance: 1.0,
            ..Default::default()
        };
        let mut field = PowerUpField::default();
        field.try_drop(&mut r, 1, Vec2::new(400.0, 200.0), 0.0, &t);
        field.update(16.67, t.lifetime_ms + 1.0, 0.0, &t);
        assert!(field.pickups.is_empty());
    }

    #[test]
    fn collection_uses_the_radius() {
        let mut r = rng();
        let t = PowerUpTuning {
            drop_chance: 1.0,
            ..Default::default()
        };
        let mut field = PowerUpField::default();
        field.try_drop(&mut r, 1, Vec2::new(400.0, 420.0), 0.0, &t);
        // Pickup lands at y=400; player 100 px away collects nothing
        assert!(field.collect(Vec2::new(500.0, 400.0), 30.0, 1.0).is_empty());
        let got = field.collect(Vec2::new(405.0, 400.0), 30.0, 1.0);
        assert_eq!(got.len(), 1);
        assert!(field.pickups.is_empty());
    }

    #[test]
    fn roll_kind_covers_the_whole_table() {
        let mut r = rng();
        let mut seen = [false; 7];
        for _ in 0..2000 {
            let kind = PowerUpField::roll_kind(&mut r);
            let idx = PowerUpKind::ALL.iter().position(|&k| k == kind).unwrap();
            seen[idx] = true;
        }
        assert!(seen.iter().all(|&s| s), "every kind should drop eventually");
    }

    #[test]
    fn shield_consumption_removes_only_the_shield() {
        let mut field = PowerUpField::default();
        field.activate(PowerUpKind::Shield, 0.0);
        field.activate(PowerUpKind::RapidFire, 0.0);
        field.consume(PowerUpKind::Shield);
        assert!(!field.is_active(PowerUpKind::Shield));
        assert!(field.is_active(PowerUpKind::RapidFire));
    }
}
