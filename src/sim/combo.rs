//! Kill-streak tracking and the score multiplier curve
//!
//! Kills within the rolling window extend the streak; the multiplier
//! climbs in fixed steps once the streak passes the threshold and decays
//! back to baseline the moment the window lapses, with or without a new
//! kill arriving.

use crate::tuning::ComboTuning;

#[derive(Debug, Clone)]
pub struct ComboMeter {
    pub multiplier: f32,
    pub streak: u32,
    last_kill_ms: f64,
    window_ms: f64,
    threshold: u32,
    increment: f32,
    max_multiplier: f32,
}

impl ComboMeter {
    pub fn new(t: &ComboTuning) -> Self {
        Self {
            multiplier: 1.0,
            streak: 0,
            last_kill_ms: 0.0,
            window_ms: t.window_ms,
            threshold: t.threshold,
            increment: t.increment,
            max_multiplier: t.max_multiplier,
        }
    }

    /// Record a kill at `now_ms`, extending or restarting the streak.
    pub fn register_kill(&mut self, now_ms: f64) {
        let since_last = now_ms - self.last_kill_ms;

        if since_last <= self.window_ms || self.streak == 0 {
            self.streak += 1;
            self.last_kill_ms = now_ms;
            if self.streak >= self.threshold {
                self.multiplier = self
                    .max_multiplier
                    .min(1.0 + (self.streak - self.threshold + 1) as f32 * self.increment);
            }
        } else {
            // Combo broken; this kill starts a fresh streak
            self.reset();
            self.streak = 1;
            self.last_kill_ms = now_ms;
        }
    }

    /// Decay check: combos die on the clock even without new kills.
    pub fn tick(&mut self, now_ms: f64) {
        if self.streak > 0 && now_ms - self.last_kill_ms > self.window_ms {
            self.reset();
        }
    }

    fn reset(&mut self) {
        self.multiplier = 1.0;
        self.streak = 0;
    }

    /// Apply the multiplier to a base score value.
    pub fn apply(&self, base: u32) -> u32 {
        (base as f32 * self.multiplier).round() as u32
    }

    pub fn is_hot(&self) -> bool {
        self.streak >= self.threshold
    }

    /// Window time remaining before the streak decays (for the HUD).
    pub fn window_remaining_ms(&self, now_ms: f64) -> f64 {
        if self.streak == 0 {
            0.0
        } else {
            (self.window_ms - (now_ms - self.last_kill_ms)).max(0.0)
        }
    }
}
