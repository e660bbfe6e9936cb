//! Enemy combatants and their movement strategies
//!
//! Each enemy picks one movement strategy at spawn, weighted by its AI
//! tier. Strategies are a closed set of tagged variants carrying their own
//! parameters, dispatched through a single steering function that outputs a
//! velocity command. Steering never touches destroyed enemies.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::SCREEN_HEIGHT;
use crate::frame_scale;
use crate::tuning::EnemyTuning;

use std::f32::consts::TAU;

/// Movement strategy, selected once at spawn. Payload fields that change
/// at runtime (cooldowns, dive latch, chaos direction) live in the variant
/// so strategy data stays colocated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Movement {
    /// Sinusoidal offset around the spawn anchor
    BasicWave { amplitude: f32, freq: f32, phase: f32 },
    /// Wave whose amplitude grows as the enemy nears the player's column
    AdaptiveWave { amplitude: f32, freq: f32, phase: f32 },
    /// Closes horizontal distance when beyond a trigger range
    Hunting { aggression: f32, range: f32 },
    /// Darts away when the player gets within 80 units laterally
    Evasive { speed: f32, cooldown_until: f64 },
    /// Seeks a fixed lateral offset from the player, one side per spawn
    Flanking { side: f32, distance: f32, speed: f32 },
    /// Periodically re-rolls a chaotic direction with per-frame noise
    Unpredictable { chaos: f32, direction: f32, next_turn: f64 },
    /// Switches irreversibly to a fast dive once within trigger distance
    AggressiveDive { trigger: f32, speed: f32, diving: bool },
    /// Avoids the player's extrapolated position
    MasterEvasion { lead: f32 },
    /// Maintains a target standoff distance for shooting
    TacticalPositioning { standoff: f32, speed: f32 },
    /// Blends sibling repulsion with player attraction
    SwarmCoordination { radius: f32, influence: f32 },
}

impl Movement {
    /// Draw a strategy from the tier's pool. Tier 0 gets the two simplest
    /// wave patterns; higher tiers unlock progressively nastier behavior,
    /// with tier 5 drawing from the three most advanced.
    pub fn roll(rng: &mut Pcg32, tier: u32) -> Self {
        match tier {
            0 => match rng.random_range(0..2u32) {
                0 => Self::basic_wave(rng),
                _ => Self::adaptive_wave(rng),
            },
            1 | 2 => match rng.random_range(0..3u32) {
                0 => Self::adaptive_wave(rng),
                1 => Self::Hunting {
                    aggression: rng.random_range(0.3..=0.8),
                    range: rng.random_range(150.0..=300.0),
                },
                _ => Self::Evasive {
                    speed: rng.random_range(2.0..=4.0),
                    cooldown_until: 0.0,
                },
            },
            3 | 4 => match rng.random_range(0..3u32) {
                0 => Self::Flanking {
                    side: if rng.random_range(0..2u32) == 0 { -1.0 } else { 1.0 },
                    distance: rng.random_range(100.0..=200.0),
                    speed: rng.random_range(1.5..=3.0),
                },
                1 => Self::Unpredictable {
                    chaos: rng.random_range(0.8..=1.5),
                    direction: rng.random_range(-1.0..=1.0),
                    next_turn: 0.0,
                },
                _ => Self::AggressiveDive {
                    trigger: rng.random_range(200.0..=350.0),
                    speed: rng.random_range(3.0..=5.0),
                    diving: false,
                },
            },
            _ => match rng.random_range(0..3u32) {
                0 => Self::MasterEvasion {
                    lead: rng.random_range(0.5..=1.0),
                },
                1 => Self::TacticalPositioning {
                    standoff: rng.random_range(180.0..=280.0),
                    speed: rng.random_range(2.0..=3.5),
                },
                _ => Self::SwarmCoordination {
                    radius: 150.0,
                    influence: rng.random_range(0.3..=0.7),
                },
            },
        }
    }

    fn basic_wave(rng: &mut Pcg32) -> Self {
        Self::BasicWave {
            amplitude: rng.random_range(15.0..=35.0),
            freq: rng.random_range(0.003..=0.006),
            phase: rng.random_range(0.0..TAU),
        }
    }

    fn adaptive_wave(rng: &mut Pcg32) -> Self {
        Self::AdaptiveWave {
            amplitude: rng.random_range(20.0..=50.0),
            freq: rng.random_range(0.002..=0.008),
            phase: rng.random_range(0.0..TAU),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    /// Spawn anchor the wave patterns oscillate around
    pub anchor_x: f32,
    pub pos: Vec2,
    /// Velocity command in pixels per frame
    pub vel: Vec2,
    pub movement: Movement,
    pub tier: u32,
    /// 0.3 at tier 0 up to 0.8 at tier 5; scales aim lead
    pub accuracy: f32,
    /// Per-enemy shoot eagerness, fixed at spawn
    pub aggression: f32,
    /// false = logically destroyed; excluded from every further pass
    pub visible: bool,
    pub last_shot_ms: f64,
    pub shot_interval_ms: f64,
    last_player_x: f32,
    /// Exponentially smoothed player velocity estimate (pixels per frame)
    player_vel: f32,
}

impl Enemy {
    pub fn spawn(rng: &mut Pcg32, id: u32, x: f32, tier: u32, t: &EnemyTuning) -> Self {
        let y = rng.random_range(t.spawn_y_min..=t.spawn_y_max);
        Self {
            id,
            anchor_x: x,
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            movement: Movement::roll(rng, tier),
            tier,
            accuracy: t.accuracy_base + tier as f32 * t.accuracy_per_tier,
            aggression: rng.random_range(0.5..=1.0),
            visible: true,
            last_shot_ms: 0.0,
            shot_interval_ms: rng.random_range(t.shot_interval_min_ms..=t.shot_interval_max_ms),
            last_player_x: 0.0,
            player_vel: 0.0,
        }
    }

    /// Advance one tick. `siblings` carries (id, x) of every live enemy for
    /// swarm coordination; `dt_ms` arrives pre-scaled by bullet time.
    pub fn update(
        &mut self,
        dt_ms: f32,
        now_ms: f64,
        player_x: f32,
        scroll_speed: f32,
        siblings: &[(u32, f32)],
        rng: &mut Pcg32,
        t: &EnemyTuning,
    ) {
        if !self.visible {
            return;
        }
        let scale = frame_scale(dt_ms);

        // Smoothed player velocity estimate, recomputed every update
        let instant = player_x - self.last_player_x;
        self.player_vel = instant * 0.7 + self.player_vel * 0.3;
        self.last_player_x = player_x;

        let descent = scroll_speed * rng.random_range(t.descent_factor_min..=t.descent_factor_max);

        self.steer(now_ms, player_x, siblings, rng);

        self.pos.x += self.vel.x * scale;
        self.pos.y += (descent + self.vel.y) * scale;

        // Generous off-screen tolerance; some strategies overshoot briefly
        self.pos.x = self.pos.x.clamp(t.x_clamp_min, t.x_clamp_max);

        if self.pos.y > SCREEN_HEIGHT + t.despawn_margin {
            self.visible = false;
        }
    }

    /// Evaluate the movement strategy into a velocity command.
    fn steer(&mut self, now_ms: f64, player_x: f32, siblings: &[(u32, f32)], rng: &mut Pcg32) {
        let distance_to_player = (self.pos.x - player_x).abs();

        match &mut self.movement {
            Movement::BasicWave {
                amplitude,
                freq,
                phase,
            } => {
                let offset = *amplitude * (*freq * now_ms as f32 + *phase).sin();
                self.vel.x = (self.anchor_x + offset - self.pos.x) * 0.1;
                self.vel.y = 0.0;
            }

            Movement::AdaptiveWave {
                amplitude,
                freq,
                phase,
            } => {
                // Amplitude swells as the enemy closes on the player's column
                let dynamic = *amplitude * (1.0 + (300.0 - distance_to_player) / 300.0);
                let offset = dynamic * (*freq * now_ms as f32 + *phase).sin();
                self.vel.x = (self.anchor_x + offset - self.pos.x) * 0.15;
                self.vel.y = 0.0;
            }

            Movement::Hunting { aggression, range } => {
                if distance_to_player > *range {
                    let dir = if player_x > self.pos.x { 1.0 } else { -1.0 };
                    self.vel.x = dir * *aggression * 2.0;
                } else {
                    self.vel.x *= 0.8;
                }
                self.vel.y = 0.0;
            }

            Movement::Evasive {
                speed,
                cooldown_until,
            } => {
                if now_ms >= *cooldown_until {
                    if distance_to_player < 80.0 {
                        let dir = if self.pos.x > player_x { 1.0 } else { -1.0 };
                        self.vel.x = dir * *speed;
                        *cooldown_until = now_ms + rng.random_range(1000.0..=2000.0);
                    } else {
                        self.vel.x *= 0.9;
                    }
                }
                self.vel.y = 0.0;
            }

            Movement::Flanking {
                side,
                distance,
                speed,
            } => {
                let target_x = player_x + *side * *distance;
                if (self.pos.x - target_x).abs() > 20.0 {
                    let dir = if target_x > self.pos.x { 1.0 } else { -1.0 };
                    self.vel.x = dir * *speed;
                } else {
                    self.vel.x *= 0.7;
                }
                self.vel.y = 0.0;
            }

            Movement::Unpredictable {
                chaos,
                direction,
                next_turn,
            } => {
                if now_ms >= *next_turn {
                    *direction = rng.random_range(-1.0..=1.0) * *chaos;
                    *next_turn = now_ms + rng.random_range(500.0..=1500.0);
                }
                let noise = rng.random_range(-0.5..=0.5) * *chaos;
                self.vel.x = (*direction + noise) * 2.0;
                self.vel.y = rng.random_range(-0.5..=0.5);
            }

            Movement::AggressiveDive {
                trigger,
                speed,
                diving,
            } => {
                if !*diving && distance_to_player < *trigger {
                    *diving = true;
                }
                if *diving {
                    let dir = if player_x > self.pos.x { 1.0 } else { -1.0 };
                    self.vel.x = dir * *speed;
                    self.vel.y = *speed * 0.5;
                } else {
                    self.vel.x *= 0.95;
                    self.vel.y = 0.0;
                }
            }

            Movement::MasterEvasion { lead } => {
                let predicted = player_x + self.player_vel * *lead;
                if (self.pos.x - predicted).abs() < 100.0 {
                    let dir = if self.pos.x > predicted { 1.0 } else { -1.0 };
                    self.vel.x = dir * 3.0;
                } else {
                    self.vel.x *= 0.85;
                }
                self.vel.y = 0.0;
            }

            Movement::TacticalPositioning { standoff, speed } => {
                if distance_to_player < *standoff - 30.0 {
                    let dir = if self.pos.x > player_x { 1.0 } else { -1.0 };
                    self.vel.x = dir * *speed;
                } else if distance_to_player > *standoff + 30.0 {
                    let dir = if player_x > self.pos.x { 1.0 } else { -1.0 };
                    self.vel.x = dir * *speed;
                } else {
                    self.vel.x *= 0.9;
                }
                self.vel.y = 0.0;
            }

            Movement::SwarmCoordination { radius, influence } => {
                if siblings.is_empty() {
                    self.vel.x *= 0.9;
                } else {
                    let nearby: Vec<f32> = siblings
                        .iter()
                        .filter(|(id, x)| *id != self.id && (x - self.pos.x).abs() < *radius)
                        .map(|(_, x)| *x)
                        .collect();
                    if nearby.is_empty() {
                        let dir = if player_x > self.pos.x { 1.0 } else { -1.0 };
                        self.vel.x = dir * 1.0;
                    } else {
                        let avg_x = nearby.iter().sum::<f32>() / nearby.len() as f32;
                        // Spread away from the swarm center, blend toward player
                        let swarm_dir = if self.pos.x > avg_x { 1.0 } else { -1.0 };
                        let swarm_force = swarm_dir * *influence;
                        let player_dir = if player_x > self.pos.x { 1.0 } else { -1.0 };
                        let player_force = player_dir * (1.0 - *influence);
                        self.vel.x = (swarm_force + player_force) * 1.5;
                    }
                }
                self.vel.y = 0.0;
            }
        }
    }

    /// Rate-limited shoot decision. Probability jumps inside the aggressive
    /// range; tiers above 2 hold fire when the player is pulling away fast.
    pub fn should_shoot(
        &self,
        now_ms: f64,
        player: Vec2,
        rng: &mut Pcg32,
        t: &EnemyTuning,
    ) -> bool {
        if !self.visible || now_ms - self.last_shot_ms < self.shot_interval_ms {
            return false;
        }

        let distance = self.pos.distance(player);
        let mut chance = if distance < t.aggressive_range {
            0.8 * self.aggression
        } else {
            0.3 * self.aggression
        };

        if self.tier > 2
            && self.player_vel.abs() > 5.0
            && self.player_vel * (player.x - self.pos.x) > 0.0
        {
            chance *= 0.5;
        }

        rng.random_range(0.0..1.0) < chance
    }

    /// Lead the player by the estimated projectile travel time, scaled by
    /// this enemy's accuracy, with tier-scaled jitter. Clamped so even bad
    /// rolls stay plausible.
    pub fn aim_offset(
        &self,
        player: Vec2,
        projectile_speed: f32,
        rng: &mut Pcg32,
        t: &EnemyTuning,
    ) -> f32 {
        let distance_y = player.y - self.pos.y;
        let time_to_target = if projectile_speed > 0.0 {
            distance_y / projectile_speed
        } else {
            1.0
        };

        let predicted_x = player.x + self.player_vel * time_to_target * self.accuracy;

        let jitter = (5 - self.tier.min(5)) as f32 * t.aim_jitter_per_tier;
        let aim_x = if jitter > 0.0 {
            predicted_x + rng.random_range(-jitter..=jitter)
        } else {
            predicted_x
        };

        (aim_x - self.pos.x).clamp(-t.aim_clamp, t.aim_clamp)
    }

    pub fn record_shot(&mut self, now_ms: f64) {
        self.last_shot_ms = now_ms;
    }

    pub fn destroy(&mut self) {
        self.visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    fn tuning() -> EnemyTuning {
        EnemyTuning::default()
    }

    fn spawn(rng: &mut Pcg32, tier: u32) -> Enemy {
        Enemy::spawn(rng, 1, 400.0, tier, &tuning())
    }

    #[test]
    fn tier_pools_are_respected() {
        let mut rng = rng();
        for _ in 0..50 {
            let e = spawn(&mut rng, 0);
            assert!(matches!(
                e.movement,
                Movement::BasicWave { .. } | Movement::AdaptiveWave { .. }
            ));
        }
        for _ in 0..50 {
            let e = spawn(&mut rng, 5);
            assert!(matches!(
                e.movement,
                Movement::MasterEvasion { .. }
                    | Movement::TacticalPositioning { .. }
                    | Movement::SwarmCoordination { .. }
            ));
        }
    }

    #[test]
    fn accuracy_scales_with_tier() {
        let mut rng = rng();
        let low = spawn(&mut rng, 0);
        let high = spawn(&mut rng, 5);
        assert!((low.accuracy - 0.3).abs() < 1e-6);
        assert!((high.accuracy - 0.8).abs() < 1e-6);
    }

    #[test]
    fn destroyed_enemy_is_inert() {
        let mut rng = rng();
        let t = tuning();
        let mut e = spawn(&mut rng, 0);
        e.destroy();
        let before = e.pos;
        e.update(16.67, 1000.0, 100.0, 6.0, &[], &mut rng, &t);
        assert_eq!(e.pos, before);
        assert!(!e.should_shoot(1_000_000.0, Vec2::new(100.0, 480.0), &mut rng, &t));
    }

    #[test]
    fn enemy_despawns_past_bottom_margin() {
        let mut rng = rng();
        let t = tuning();
        let mut e = spawn(&mut rng, 0);
        e.pos.y = SCREEN_HEIGHT + t.despawn_margin + 1.0;
        e.update(16.67, 1000.0, 100.0, 6.0, &[], &mut rng, &t);
        assert!(!e.visible);
    }

    #[test]
    fn horizontal_position_clamps_to_tolerance() {
        let mut rng = rng();
        let t = tuning();
        let mut e = spawn(&mut rng, 0);
        e.pos.x = t.x_clamp_max - 1.0;
        e.vel = Vec2::ZERO;
        // Force a strategy that sprints right
        e.movement = Movement::Hunting {
            aggression: 0.8,
            range: 10.0,
        };
        for _ in 0..200 {
            e.update(16.67, 1000.0, 2000.0, 0.0, &[], &mut rng, &t);
        }
        assert!(e.pos.x <= t.x_clamp_max);
    }

    #[test]
    fn dive_latch_is_irreversible() {
        let mut rng = rng();
        let t = tuning();
        let mut e = spawn(&mut rng, 3);
        e.movement = Movement::AggressiveDive {
            trigger: 300.0,
            speed: 4.0,
            diving: false,
        };
        // Close pass trips the latch
        e.update(16.67, 0.0, e.pos.x + 50.0, 6.0, &[], &mut rng, &t);
        assert!(matches!(e.movement, Movement::AggressiveDive { diving: true, .. }));
        // Player retreating far does not reset it
        e.update(16.67, 16.67, e.pos.x + 700.0, 6.0, &[], &mut rng, &t);
        assert!(matches!(e.movement, Movement::AggressiveDive { diving: true, .. }));
        assert!(e.vel.y > 0.0);
    }

    #[test]
    fn shot_rate_is_limited_by_interval() {
        let mut rng = rng();
        let t = tuning();
        let mut e = spawn(&mut rng, 0);
        e.record_shot(10_000.0);
        let player = Vec2::new(e.pos.x, 480.0);
        // Within the interval the enemy never fires regardless of rolls
        for _ in 0..20 {
            assert!(!e.should_shoot(10_000.0 + t.shot_interval_min_ms - 1.0, player, &mut rng, &t));
        }
    }

    #[test]
    fn aim_offset_is_clamped() {
        let mut rng = rng();
        let t = tuning();
        let mut e = spawn(&mut rng, 0);
        e.player_vel = 500.0;
        let offset = e.aim_offset(Vec2::new(e.pos.x + 400.0, 480.0), 10.0, &mut rng, &t);
        assert!(offset.abs() <= t.aim_clamp);
    }

    #[test]
    fn top_tier_aims_without_jitter() {
        let mut rng = rng();
        let t = tuning();
        let mut e = spawn(&mut rng, 5);
        e.player_vel = 0.0;
        let player = Vec2::new(e.pos.x + 10.0, 480.0);
        let a = e.aim_offset(player, 10.0, &mut rng, &t);
        let b = e.aim_offset(player, 10.0, &mut rng, &t);
        assert_eq!(a, b);
    }

    #[test]
    fn swarm_members_repel_nearby_siblings() {
        let mut rng = rng();
        let t = tuning();
        let mut e = spawn(&mut rng, 5);
        e.movement = Movement::SwarmCoordination {
            radius: 150.0,
            influence: 1.0,
        };
        e.pos.x = 400.0;
        // Sibling just left of us; pure swarm influence pushes right
        let siblings = vec![(e.id, 400.0), (2, 350.0)];
        e.update(16.67, 0.0, 400.0, 0.0, &siblings, &mut rng, &t);
        assert!(e.vel.x > 0.0);
    }
}
