//! Data-driven game balance
//!
//! Every gameplay constant lives here so the simulation core treats balance
//! as immutable configuration supplied at startup. Defaults match the
//! shipped balance; a JSON file can override any section.

use serde::{Deserialize, Serialize};

/// Player ship tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Horizontal speed (pixels per frame)
    pub speed: f32,
    pub start_x: f32,
    pub start_y: f32,
    /// Rightmost x the ship origin may reach (accounts for sprite width)
    pub max_x: f32,
    pub lives: u32,
    /// Cooldown between shots (ms)
    pub fire_cooldown_ms: f64,
    /// Cooldown while rapid-fire is active (ms)
    pub rapid_fire_cooldown_ms: f64,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            speed: 8.0,
            start_x: 370.0,
            start_y: 480.0,
            max_x: 745.0,
            lives: 5,
            fire_cooldown_ms: 300.0,
            rapid_fire_cooldown_ms: 100.0,
        }
    }
}

/// Projectile tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    /// Player projectile speed (pixels per frame)
    pub speed: f32,
    /// Enemy shots scale with the current scroll speed
    pub enemy_speed_factor: f32,
    /// Concurrent player projectile cap; fire requests beyond it are rejected
    pub max_player_live: usize,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: 18.0,
            enemy_speed_factor: 1.75,
            max_player_live: 5,
        }
    }
}

/// Distance thresholds for the collision pairs, each context-specific
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionTuning {
    pub projectile_enemy: f32,
    pub ship_ship: f32,
    pub projectile_player: f32,
    /// Near-miss band for the dodge bonus (strictly between min and max)
    pub dodge_min: f32,
    pub dodge_max: f32,
    /// Pickup collection radius around the player
    pub pickup_radius: f32,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            projectile_enemy: 27.0,
            ship_ship: 40.0,
            projectile_player: 30.0,
            dodge_min: 50.0,
            dodge_max: 80.0,
            pickup_radius: 30.0,
        }
    }
}

/// Enemy spawn placement and AI tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub spawn_x_min: f32,
    pub spawn_x_max: f32,
    pub spawn_y_min: f32,
    pub spawn_y_max: f32,
    /// Minimum horizontal spacing between spawn anchors
    pub min_spacing: f32,
    /// Rejection-sampling attempts before accepting any position
    pub spawn_attempts: u32,
    /// Off-screen tolerance for advanced maneuvers (wider than the screen)
    pub x_clamp_min: f32,
    pub x_clamp_max: f32,
    /// Vertical margin past the bottom edge before despawn
    pub despawn_margin: f32,
    pub shot_interval_min_ms: f64,
    pub shot_interval_max_ms: f64,
    /// Within this range shoot probability jumps to 0.8 * aggression
    pub aggressive_range: f32,
    /// Descent speed multiplier range applied to the scroll speed
    pub descent_factor_min: f32,
    pub descent_factor_max: f32,
    pub accuracy_base: f32,
    pub accuracy_per_tier: f32,
    /// Aim jitter per missing tier level (tier 5 aims without jitter)
    pub aim_jitter_per_tier: f32,
    /// Maximum aim offset magnitude
    pub aim_clamp: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            spawn_x_min: 100.0,
            spawn_x_max: 700.0,
            spawn_y_min: -150.0,
            spawn_y_max: -50.0,
            min_spacing: 100.0,
            spawn_attempts: 50,
            x_clamp_min: -50.0,
            x_clamp_max: 850.0,
            despawn_margin: 50.0,
            shot_interval_min_ms: 1500.0,
            shot_interval_max_ms: 3000.0,
            aggressive_range: 200.0,
            descent_factor_min: 1.1,
            descent_factor_max: 1.4,
            accuracy_base: 0.3,
            accuracy_per_tier: 0.1,
            aim_jitter_per_tier: 20.0,
            aim_clamp: 50.0,
        }
    }
}

/// Wave pacing tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    /// Delay between staggered spawns within a wave (ms)
    pub spawn_delay_ms: f64,
    /// Rest period between waves (ms)
    pub transition_ms: f64,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            spawn_delay_ms: 500.0,
            transition_ms: 2000.0,
        }
    }
}

/// Power-up drop and lifecycle tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpTuning {
    /// Uncollected pickups despawn after this long (ms)
    pub lifetime_ms: f64,
    /// Global minimum spacing between any two drops (ms)
    pub min_drop_gap_ms: f64,
    /// Independent drop probability per enemy kill
    pub drop_chance: f64,
    /// Pickups fall slightly faster than the background scroll
    pub fall_factor: f32,
}

impl Default for PowerUpTuning {
    fn default() -> Self {
        Self {
            lifetime_ms: 8000.0,
            min_drop_gap_ms: 3000.0,
            drop_chance: 0.25,
            fall_factor: 1.2,
        }
    }
}

/// Combo streak tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboTuning {
    /// Rolling window to keep a streak alive (ms)
    pub window_ms: f64,
    /// Kills needed before the multiplier starts climbing
    pub threshold: u32,
    pub increment: f32,
    pub max_multiplier: f32,
}

impl Default for ComboTuning {
    fn default() -> Self {
        Self {
            window_ms: 2500.0,
            threshold: 2,
            increment: 0.5,
            max_multiplier: 5.0,
        }
    }
}

/// Score values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreTuning {
    pub enemy_kill: u32,
    pub perfect_shot: u32,
    /// Kills above this height (smaller y) score as perfect shots
    pub perfect_shot_threshold_y: f32,
    pub chain_kill: u32,
    pub dodge_bonus: u32,
    pub screen_clear_per_enemy: u32,
}

impl Default for ScoreTuning {
    fn default() -> Self {
        Self {
            enemy_kill: 100,
            perfect_shot: 150,
            perfect_shot_threshold_y: 300.0,
            chain_kill: 200,
            dodge_bonus: 5,
            screen_clear_per_enemy: 50,
        }
    }
}

/// Session difficulty ramp
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    /// Background scroll speed at session start (pixels per frame)
    pub scroll_initial: f32,
    pub scroll_max: f32,
    /// Elapsed ms divided by this is added to the scroll speed
    pub scroll_ramp_divisor: f64,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            scroll_initial: 6.0,
            scroll_max: 24.0,
            scroll_ramp_divisor: 100_000.0,
        }
    }
}

/// Complete tuning set supplied to the simulation at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub projectile: ProjectileTuning,
    pub collision: CollisionTuning,
    pub enemy: EnemyTuning,
    pub wave: WaveTuning,
    pub powerup: PowerUpTuning,
    pub combo: ComboTuning,
    pub score: ScoreTuning,
    pub difficulty: DifficultyTuning,
}

impl Tuning {
    /// Load tuning from a JSON file, falling back to defaults if the file
    /// is missing or malformed.
    pub fn load_or_default(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {path}");
                    tuning
                }
                Err(err) => {
                    log::warn!("Ignoring malformed tuning file {path}: {err}");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No tuning file at {path}, using defaults");
                Self::default()
            }
        }
    }
}
