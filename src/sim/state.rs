//! Game state and core simulation types
//!
//! Everything the orchestrator owns for the duration of a tick lives here.
//! All randomness flows through the single seeded RNG so a run is fully
//! reproducible from its seed and input sequence.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use std::collections::HashSet;

use crate::frame_scale;
use crate::tuning::{PlayerTuning, Tuning};

use super::combo::ComboMeter;
use super::enemy::Enemy;
use super::powerup::PowerUpField;
use super::projectile::ProjectileField;
use super::wave::WaveDirector;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Frozen; no time-dependent updates run
    Paused,
    /// Lives reached zero
    GameOver,
}

/// The player ship. Mutated only by its own update, once per tick.
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    /// Pixels per frame
    pub speed: f32,
    max_x: f32,
}

impl Player {
    pub fn new(t: &PlayerTuning) -> Self {
        Self {
            pos: Vec2::new(t.start_x, t.start_y),
            speed: t.speed,
            max_x: t.max_x,
        }
    }

    /// Integrate held directional input. The player always receives the
    /// raw tick delta; bullet time never slows the ship.
    pub fn update(&mut self, left: bool, right: bool, dt_ms: f32, speed_multiplier: f32) {
        let mut dx = 0.0;
        if right {
            dx += self.speed * speed_multiplier;
        }
        if left {
            dx -= self.speed * speed_multiplier;
        }
        self.pos.x = (self.pos.x + dx * frame_scale(dt_ms)).clamp(0.0, self.max_x);
    }
}

/// A cosmetic particle. Not gameplay-affecting; excluded from the RNG
/// stream so visual bursts never perturb simulation outcomes.
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 1.0 down to 0.0
    pub life: f32,
    pub decay: f32,
    pub size: f32,
}

/// Maximum particles retained
pub const MAX_PARTICLES: usize = 256;

/// Complete simulation state, owned exclusively by the orchestrator.
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Simulation clock in ms, advanced once per tick
    pub now_ms: f64,
    pub ticks: u64,
    pub lives: u32,
    pub score: u64,
    /// Background scroll speed; the shared difficulty ramp
    pub scroll_speed: f32,
    pub player: Player,
    pub projectiles: ProjectileField,
    pub enemies: Vec<Enemy>,
    pub waves: WaveDirector,
    pub powerups: PowerUpField,
    pub combo: ComboMeter,
    /// Projectile IDs that already paid out a dodge bonus this band-entry
    pub dodge_granted: HashSet<u32>,
    pub last_player_shot_ms: f64,
    /// Invulnerability + direct power-up grants for the test harness
    pub test_mode: bool,
    /// Cosmetic shake intensity, decays every tick
    pub screen_shake: f32,
    pub particles: Vec<Particle>,
    next_id: u32,
}

impl GameState {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            now_ms: 0.0,
            ticks: 0,
            lives: tuning.player.lives,
            score: 0,
            scroll_speed: tuning.difficulty.scroll_initial,
            player: Player::new(&tuning.player),
            projectiles: ProjectileField::default(),
            enemies: Vec::new(),
            waves: WaveDirector::new(tuning.wave.clone()),
            powerups: PowerUpField::default(),
            combo: ComboMeter::new(&tuning.combo),
            dodge_granted: HashSet::new(),
            last_player_shot_ms: -10_000.0,
            test_mode: false,
            screen_shake: 0.0,
            particles: Vec::new(),
            next_id: 1,
            tuning,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Full re-initialization from the same seed, so a restarted run
    /// replays identically for identical input.
    pub fn restart(&mut self) {
        *self = Self::new(self.seed, self.tuning.clone());
    }

    pub fn visible_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.visible).count()
    }

    /// AI tier for out-of-wave spawns, derived from score.
    pub fn score_tier(&self) -> u32 {
        ((self.score / 500) as u32).min(5)
    }

    /// Spawn a cosmetic particle burst. Velocities come from a counter
    /// hash, not the RNG, so visuals never disturb gameplay determinism.
    pub fn spawn_burst(&mut self, pos: Vec2, count: u32) {
        for i in 0..count {
            let hash = (self.ticks as u32)
                .wrapping_mul(2654435761)
                .wrapping_add(i.wrapping_mul(31337));
            let r1 = (hash % 1000) as f32 / 1000.0;
            let r2 = ((hash >> 10) % 1000) as f32 / 1000.0;
            let r3 = ((hash >> 20) % 1000) as f32 / 1000.0;
            self.particles.push(Particle {
                pos,
                vel: Vec2::new(r1 * 6.0 - 3.0, r2 * 6.0 - 3.0),
                life: 1.0,
                decay: 0.02 + r3 * 0.02,
                size: 2.0 + r1 * 2.0,
            });
        }
        if self.particles.len() > MAX_PARTICLES {
            let excess = self.particles.len() - MAX_PARTICLES;
            self.particles.drain(0..excess);
        }
    }

    pub fn add_shake(&mut self, intensity: f32) {
        self.screen_shake = self.screen_shake.max(intensity);
    }
}
