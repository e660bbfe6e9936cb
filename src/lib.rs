//! Nova Strike - a wave-based arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, enemy AI, waves, scoring)
//! - `tuning`: Data-driven game balance
//! - `highscores`: Persistent score records
//! - `hud`: Renderer-facing state snapshot

pub mod highscores;
pub mod hud;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions (pixels, origin top-left, +y down)
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Nominal frame period at 60 Hz, in milliseconds. All speeds in the
    /// tuning tables are pixels per nominal frame.
    pub const FRAME_MS: f32 = 16.67;

    /// Fixed simulation timestep for the driver loop (milliseconds)
    pub const SIM_DT_MS: f32 = FRAME_MS;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
}

/// Scale an elapsed delta to 60 Hz frame units so motion is
/// frame-rate independent: `position += speed * frame_scale(dt)`.
#[inline]
pub fn frame_scale(dt_ms: f32) -> f32 {
    dt_ms / consts::FRAME_MS
}
