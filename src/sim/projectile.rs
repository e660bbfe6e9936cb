//! Player and enemy projectiles
//!
//! Two live pools with lazy compaction: projectiles are deactivated during
//! the tick and swept out at the end of their advance pass. IDs are stable
//! for the lifetime of a projectile so the dodge-bonus ledger can key on
//! them.

use glam::Vec2;

use crate::consts::SCREEN_HEIGHT;
use crate::frame_scale;

/// Travel direction along the vertical axis, fixed at fire time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    /// Player-fired, travels up-screen
    Up,
    /// Enemy-fired, travels down-screen
    Down,
}

impl Heading {
    #[inline]
    fn sign(self) -> f32 {
        match self {
            Heading::Up => 1.0,
            Heading::Down => -1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub heading: Heading,
    /// Pixels per frame
    pub speed: f32,
    pub active: bool,
}

impl Projectile {
    pub fn new(id: u32, pos: Vec2, heading: Heading, speed: f32) -> Self {
        Self {
            id,
            pos,
            heading,
            speed,
            active: true,
        }
    }

    /// Move along the vertical axis and deactivate on leaving the screen.
    pub fn advance(&mut self, dt_ms: f32) {
        if !self.active {
            return;
        }
        self.pos.y -= self.heading.sign() * self.speed * frame_scale(dt_ms);
        if self.pos.y <= 0.0 || self.pos.y >= SCREEN_HEIGHT {
            self.active = false;
        }
    }
}

/// The two live projectile pools.
#[derive(Debug, Clone, Default)]
pub struct ProjectileField {
    pub player: Vec<Projectile>,
    pub enemy: Vec<Projectile>,
}

impl ProjectileField {
    /// Fire a player projectile. Rejected (no side effect) once the
    /// concurrent cap is reached.
    pub fn fire_player(&mut self, id: u32, pos: Vec2, speed: f32, cap: usize) -> bool {
        if self.player.len() >= cap {
            return false;
        }
        self.player.push(Projectile::new(id, pos, Heading::Up, speed));
        true
    }

    /// Enemy fire is uncapped.
    pub fn fire_enemy(&mut self, id: u32, pos: Vec2, speed: f32) {
        self.enemy.push(Projectile::new(id, pos, Heading::Down, speed));
    }

    /// Advance every live projectile, then sweep out the deactivated ones.
    pub fn advance(&mut self, dt_ms: f32) {
        for p in self.player.iter_mut().chain(self.enemy.iter_mut()) {
            p.advance(dt_ms);
        }
        self.player.retain(|p| p.active);
        self.enemy.retain(|p| p.active);
    }

    pub fn live_player_count(&self) -> usize {
        self.player.iter().filter(|p| p.active).count()
    }

    pub fn clear(&mut self) {
        self.player.clear();
        self.enemy.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_MS;

    #[test]
    fn player_fire_cap_rejects_sixth() {
        let mut field = ProjectileField::default();
        for i in 0..5 {
            assert!(field.fire_player(i, Vec2::new(400.0, 480.0), 18.0, 5));
        }
        assert!(!field.fire_player(99, Vec2::new(400.0, 480.0), 18.0, 5));
        assert_eq!(field.player.len(), 5);
    }

    #[test]
    fn cap_frees_up_after_expiry() {
        let mut field = ProjectileField::default();
        for i in 0..5 {
            field.fire_player(i, Vec2::new(400.0, 10.0), 18.0, 5);
        }
        // One frame at speed 18 pushes them past the top edge
        field.advance(FRAME_MS);
        assert!(field.player.is_empty());
        assert!(field.fire_player(5, Vec2::new(400.0, 480.0), 18.0, 5));
    }

    #[test]
    fn headings_move_opposite_ways() {
        let mut field = ProjectileField::default();
        field.fire_player(0, Vec2::new(100.0, 300.0), 18.0, 5);
        field.fire_enemy(1, Vec2::new(100.0, 300.0), 10.0);
        field.advance(FRAME_MS);
        assert!(field.player[0].pos.y < 300.0);
        assert!(field.enemy[0].pos.y > 300.0);
    }

    #[test]
    fn enemy_projectile_expires_at_bottom() {
        let mut field = ProjectileField::default();
        field.fire_enemy(0, Vec2::new(100.0, 595.0), 10.0);
        field.advance(FRAME_MS);
        assert!(field.enemy.is_empty());
    }

    #[test]
    fn advance_is_frame_rate_independent() {
        let mut a = Projectile::new(0, Vec2::new(0.0, 300.0), Heading::Up, 18.0);
        let mut b = a.clone();
        a.advance(FRAME_MS * 2.0);
        b.advance(FRAME_MS);
        b.advance(FRAME_MS);
        assert!((a.pos.y - b.pos.y).abs() < 1e-3);
    }
}
