//! Wave composition and spawn choreography
//!
//! A wave is a pure function of its number (given the seeded RNG): enemy
//! count, formation, AI tier and the per-slot spawn coordinates are all
//! decided at construction. The director holds at most one wave plus a
//! transition gate between waves.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::tuning::WaveTuning;

use std::f32::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveState {
    /// Slots remain to be spawned
    Spawning,
    /// Fully spawned, fighting in progress
    Active,
    /// Kill count reached the required count
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formation {
    Line,
    VShape,
    Circle,
    Scattered,
}

impl Formation {
    pub fn label(self) -> &'static str {
        match self {
            Formation::Line => "line",
            Formation::VShape => "v-shape",
            Formation::Circle => "circle",
            Formation::Scattered => "scattered",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Wave {
    pub number: u32,
    pub required: u32,
    pub formation: Formation,
    /// AI tier for every enemy in this wave
    pub tier: u32,
    pub spawned: u32,
    pub killed: u32,
    pub state: WaveState,
    positions: Vec<Vec2>,
    cursor: usize,
    last_spawn_ms: f64,
    spawn_delay_ms: f64,
}

impl Wave {
    pub fn new(number: u32, rng: &mut Pcg32, t: &WaveTuning) -> Self {
        let required = Self::enemy_count(number);
        let formation = Self::select_formation(number, rng);
        let positions = Self::layout(formation, required, rng);
        Self {
            number,
            required,
            formation,
            tier: (number / 2).min(5),
            spawned: 0,
            killed: 0,
            state: WaveState::Spawning,
            positions,
            cursor: 0,
            last_spawn_ms: 0.0,
            spawn_delay_ms: t.spawn_delay_ms,
        }
    }

    /// 3 + n for the first three waves, then slower growth.
    pub fn enemy_count(number: u32) -> u32 {
        if number <= 3 {
            3 + number
        } else {
            6 + (number - 3) / 2
        }
    }

    /// Wave 1 is always a line, wave 2 scattered. After that, V-shape on
    /// multiples of 3 takes precedence over circle on multiples of 4.
    fn select_formation(number: u32, rng: &mut Pcg32) -> Formation {
        if number == 1 {
            Formation::Line
        } else if number == 2 {
            Formation::Scattered
        } else if number % 3 == 0 {
            Formation::VShape
        } else if number % 4 == 0 {
            Formation::Circle
        } else {
            match rng.random_range(0..3u32) {
                0 => Formation::Line,
                1 => Formation::Scattered,
                _ => Formation::VShape,
            }
        }
    }

    /// One target coordinate per enemy slot. All formations stage above
    /// the top edge and descend into view.
    fn layout(formation: Formation, count: u32, rng: &mut Pcg32) -> Vec<Vec2> {
        let mut positions = Vec::with_capacity(count as usize);
        match formation {
            Formation::Line => {
                let spacing = if count > 1 {
                    (600 / (count - 1).max(1)) as f32
                } else {
                    0.0
                };
                for i in 0..count {
                    let x = 100.0 + i as f32 * spacing;
                    // Slight vertical stagger so the line angles in
                    positions.push(Vec2::new(x, -100.0 - i as f32 * 20.0));
                }
            }
            Formation::VShape => {
                let center_x = 400.0;
                for i in 0..count {
                    let x = if i % 2 == 0 {
                        center_x + (i / 2) as f32 * 80.0
                    } else {
                        center_x - ((i + 1) / 2) as f32 * 80.0
                    };
                    let depth = (i as i32 - (count / 2) as i32).unsigned_abs() as f32;
                    positions.push(Vec2::new(x, -100.0 - depth * 30.0));
                }
            }
            Formation::Circle => {
                let center = Vec2::new(400.0, -200.0);
                let radius = 150.0;
                for i in 0..count {
                    let angle = TAU * i as f32 / count as f32;
                    positions.push(center + radius * Vec2::new(angle.cos(), angle.sin()));
                }
            }
            Formation::Scattered => {
                // Minimum spacing is the spawner's problem, not the layout's
                for _ in 0..count {
                    let x = rng.random_range(100.0..=700.0);
                    let y = rng.random_range(-200.0..=-50.0);
                    positions.push(Vec2::new(x, y));
                }
            }
        }
        positions
    }

    pub fn due_spawn(&self, now_ms: f64) -> bool {
        self.state == WaveState::Spawning
            && self.spawned < self.required
            && now_ms - self.last_spawn_ms > self.spawn_delay_ms
    }

    /// Take the next planned slot position; extra requests past the plan
    /// fall back to a random staging position.
    pub fn next_spawn_position(&mut self, rng: &mut Pcg32) -> Vec2 {
        if let Some(pos) = self.positions.get(self.cursor) {
            self.cursor += 1;
            *pos
        } else {
            Vec2::new(
                rng.random_range(100.0..=700.0),
                rng.random_range(-150.0..=-50.0),
            )
        }
    }

    pub fn record_spawn(&mut self, now_ms: f64) {
        self.spawned += 1;
        self.last_spawn_ms = now_ms;
        if self.spawned >= self.required {
            self.state = WaveState::Active;
        }
    }

    pub fn record_kill(&mut self) {
        self.killed += 1;
        if self.killed >= self.required {
            self.state = WaveState::Complete;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == WaveState::Complete
    }

    pub fn progress(&self) -> f32 {
        if self.required == 0 {
            1.0
        } else {
            self.killed as f32 / self.required as f32
        }
    }
}

/// Renderer-facing wave summary
#[derive(Debug, Clone, Default)]
pub struct WaveInfo {
    pub number: u32,
    pub progress: f32,
    pub enemies_left: u32,
    pub formation: Option<Formation>,
    pub in_transition: bool,
}

/// Holds the current wave and the between-wave transition gate.
#[derive(Debug, Clone)]
pub struct WaveDirector {
    pub current: Option<Wave>,
    pub number: u32,
    in_transition: bool,
    transition_started_ms: f64,
    tuning: WaveTuning,
}

impl WaveDirector {
    pub fn new(tuning: WaveTuning) -> Self {
        Self {
            current: None,
            number: 0,
            in_transition: false,
            transition_started_ms: 0.0,
            tuning,
        }
    }

    fn start_next_wave(&mut self, rng: &mut Pcg32) {
        self.number += 1;
        let wave = Wave::new(self.number, rng, &self.tuning);
        log::info!(
            "wave {} starting: {} enemies, {} formation, tier {}",
            wave.number,
            wave.required,
            wave.formation.label(),
            wave.tier
        );
        self.current = Some(wave);
        self.in_transition = false;
    }

    /// Drive the Spawning/Active/Complete/transition machinery.
    pub fn update(&mut self, now_ms: f64, rng: &mut Pcg32) {
        let Some(wave) = &self.current else {
            self.start_next_wave(rng);
            return;
        };

        if wave.is_complete() && !self.in_transition {
            self.in_transition = true;
            self.transition_started_ms = now_ms;
            log::info!("wave {} complete", wave.number);
        }

        if self.in_transition && now_ms - self.transition_started_ms > self.tuning.transition_ms {
            self.start_next_wave(rng);
        }
    }

    pub fn should_spawn(&self, now_ms: f64) -> bool {
        if self.in_transition {
            return false;
        }
        self.current.as_ref().is_some_and(|w| w.due_spawn(now_ms))
    }

    /// Hand out the next spawn slot: position plus the wave's AI tier.
    pub fn spawn(&mut self, now_ms: f64, rng: &mut Pcg32) -> Option<(Vec2, u32)> {
        let wave = self.current.as_mut()?;
        let pos = wave.next_spawn_position(rng);
        wave.record_spawn(now_ms);
        Some((pos, wave.tier))
    }

    pub fn enemy_killed(&mut self) {
        if let Some(wave) = &mut self.current {
            wave.record_kill();
        }
    }

    pub fn info(&self) -> WaveInfo {
        match &self.current {
            None => WaveInfo::default(),
            Some(wave) => WaveInfo {
                number: self.number,
                progress: wave.progress(),
                enemies_left: wave.required.saturating_sub(wave.killed),
                formation: Some(wave.formation),
                in_transition: self.in_transition,
            },
        }
    }
}
