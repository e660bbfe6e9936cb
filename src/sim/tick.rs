//! The per-tick orchestrator
//!
//! One call advances the whole simulation by one fixed step. Subsystems are
//! updated in a fixed order so identical seeds and input sequences always
//! produce identical runs:
//!
//! 1. meta input (pause, restart, test mode)
//! 2. clock advance and difficulty ramp
//! 3. player movement and fire (raw time)
//! 4. projectile and enemy integration (bullet-timed), effect expiry
//! 5. wave direction and spawning
//! 6. collision resolution and scoring
//! 7. pickup collection
//! 8. sweeps and cosmetics
//!
//! Bullet time scales the elapsed time handed to enemies and projectiles;
//! the player, the combo window, wave pacing and effect timers always run
//! on raw time.

use glam::Vec2;

use std::collections::HashSet;

use crate::frame_scale;

use super::collision::{collides, in_dodge_band};
use super::enemy::Enemy;
use super::powerup::{PowerUpKind, SCORE_MULTIPLIER_FACTOR, SPEED_BOOST_FACTOR};
use super::spawner::pick_spawn_x;
use super::state::{GamePhase, GameState};

/// Player input sampled for one tick. Toggle fields (`pause`,
/// `toggle_test_mode`, `restart`) are edge-triggered: send them for a
/// single tick per press.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    pub pause: bool,
    pub restart: bool,
    pub toggle_test_mode: bool,
    /// Direct effect grant, honored only while test mode is on
    pub grant_powerup: Option<PowerUpKind>,
}

/// Advance the simulation by `dt_ms` of elapsed time.
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    if input.toggle_test_mode {
        state.test_mode = !state.test_mode;
        log::info!(
            "test mode {}",
            if state.test_mode { "on" } else { "off" }
        );
    }

    match state.phase {
        GamePhase::Playing => {
            if input.pause {
                state.phase = GamePhase::Paused;
                return;
            }
        }
        GamePhase::Paused => {
            if input.pause {
                state.phase = GamePhase::Playing;
            }
            return;
        }
        GamePhase::GameOver => {
            if input.restart {
                state.restart();
            }
            return;
        }
    }

    if state.test_mode {
        if let Some(kind) = input.grant_powerup {
            state.powerups.activate(kind, state.now_ms);
            if kind == PowerUpKind::ScreenClear {
                apply_screen_clear(state);
            }
        }
    }

    state.now_ms += dt_ms as f64;
    state.ticks += 1;
    let now = state.now_ms;

    // Bullet time slows the hostile side only
    let scaled_dt = dt_ms * state.powerups.time_scale();

    state.scroll_speed = state
        .tuning
        .difficulty
        .scroll_max
        .min(state.tuning.difficulty.scroll_initial
            + (now / state.tuning.difficulty.scroll_ramp_divisor) as f32);

    let speed_mult = if state.powerups.is_active(PowerUpKind::SpeedBoost) {
        SPEED_BOOST_FACTOR
    } else {
        1.0
    };
    state.player.update(input.left, input.right, dt_ms, speed_mult);

    if input.fire {
        fire_player(state);
    }

    state.projectiles.advance(scaled_dt);
    update_enemies(state, scaled_dt);

    // Expire effects before anything downstream consults them, so a
    // lapsed shield or multiplier cannot influence this tick's collisions
    state
        .powerups
        .update(dt_ms, now, state.scroll_speed, &state.tuning.powerup);

    state.waves.update(now, &mut state.rng);
    if state.waves.should_spawn(now) {
        if let Some((pos, tier)) = state.waves.spawn(now, &mut state.rng) {
            let id = state.next_entity_id();
            let mut enemy = Enemy::spawn(&mut state.rng, id, pos.x, tier, &state.tuning.enemy);
            enemy.pos = pos;
            state.enemies.push(enemy);
        }
    }

    // The field is never allowed to sit empty, wave pacing or not
    if state.visible_enemy_count() == 0 {
        spawn_replacement(state);
    }

    enemy_fire(state);

    resolve_player_shots(state);
    resolve_enemy_shots(state);
    resolve_ship_collisions(state);

    collect_pickups(state);
    state.combo.tick(now);

    sweep(state);
    update_cosmetics(state, dt_ms);
}

/// Fire a player projectile, honoring the cooldown and the live cap.
/// Multi-shot widens a successful trigger into a three-round spread.
fn fire_player(state: &mut GameState) {
    let cooldown = if state.powerups.is_active(PowerUpKind::RapidFire) {
        state.tuning.player.rapid_fire_cooldown_ms
    } else {
        state.tuning.player.fire_cooldown_ms
    };
    if state.now_ms - state.last_player_shot_ms < cooldown {
        return;
    }

    let speed = state.tuning.projectile.speed;
    let cap = state.tuning.projectile.max_player_live;
    let origin = state.player.pos;

    let mut fired = false;
    if state.powerups.is_active(PowerUpKind::MultiShot) {
        for dx in [-10.0, 0.0, 10.0] {
            let id = state.next_entity_id();
            fired |= state
                .projectiles
                .fire_player(id, origin + Vec2::new(dx, 0.0), speed, cap);
        }
    } else {
        let id = state.next_entity_id();
        fired = state.projectiles.fire_player(id, origin, speed, cap);
    }

    // A cap-rejected trigger leaves the cooldown untouched
    if fired {
        state.last_player_shot_ms = state.now_ms;
    }
}

/// Integrate every enemy, then replace the ones that escaped off the
/// bottom with fresh spawns at the score-derived tier.
fn update_enemies(state: &mut GameState, scaled_dt: f32) {
    let siblings: Vec<(u32, f32)> = state
        .enemies
        .iter()
        .filter(|e| e.visible)
        .map(|e| (e.id, e.pos.x))
        .collect();
    let player_x = state.player.pos.x;
    let scroll = state.scroll_speed;

    for i in 0..state.enemies.len() {
        state.enemies[i].update(
            scaled_dt,
            state.now_ms,
            player_x,
            scroll,
            &siblings,
            &mut state.rng,
            &state.tuning.enemy,
        );
    }

    // Everything in the vec was visible at tick entry, so an invisible
    // enemy here escaped rather than died
    let mut escaped = 0;
    state.enemies.retain(|e| {
        if e.visible {
            true
        } else {
            escaped += 1;
            false
        }
    });
    for _ in 0..escaped {
        spawn_replacement(state);
    }
}

fn spawn_replacement(state: &mut GameState) {
    let occupied: Vec<f32> = state.enemies.iter().map(|e| e.anchor_x).collect();
    let x = pick_spawn_x(&mut state.rng, &occupied, &state.tuning.enemy);
    let id = state.next_entity_id();
    let tier = state.score_tier();
    let enemy = Enemy::spawn(&mut state.rng, id, x, tier, &state.tuning.enemy);
    state.enemies.push(enemy);
}

/// Roll shoot decisions and spawn enemy projectiles at the aimed offset.
fn enemy_fire(state: &mut GameState) {
    let player = state.player.pos;
    let speed = state.scroll_speed * state.tuning.projectile.enemy_speed_factor;

    for i in 0..state.enemies.len() {
        if !state.enemies[i].visible {
            continue;
        }
        if state.enemies[i].should_shoot(state.now_ms, player, &mut state.rng, &state.tuning.enemy)
        {
            let offset =
                state.enemies[i].aim_offset(player, speed, &mut state.rng, &state.tuning.enemy);
            let origin = state.enemies[i].pos + Vec2::new(offset, 0.0);
            let id = state.next_entity_id();
            state.projectiles.fire_enemy(id, origin, speed);
            let now = state.now_ms;
            state.enemies[i].record_shot(now);
        }
    }
}

/// Player projectiles against enemies. Each projectile spends itself on
/// the first enemy it overlaps.
fn resolve_player_shots(state: &mut GameState) {
    let threshold = state.tuning.collision.projectile_enemy;
    for pi in 0..state.projectiles.player.len() {
        if !state.projectiles.player[pi].active {
            continue;
        }
        for ei in 0..state.enemies.len() {
            if !state.enemies[ei].visible {
                continue;
            }
            if collides(
                state.projectiles.player[pi].pos,
                state.enemies[ei].pos,
                threshold,
            ) {
                state.projectiles.player[pi].active = false;
                kill_enemy(state, ei);
                break;
            }
        }
    }
}

/// Enemy projectiles against the player, including the near-miss ledger.
fn resolve_enemy_shots(state: &mut GameState) {
    let hit_threshold = state.tuning.collision.projectile_player;
    let dodge_min = state.tuning.collision.dodge_min;
    let dodge_max = state.tuning.collision.dodge_max;
    let dodge_bonus = state.tuning.score.dodge_bonus as u64;
    let player = state.player.pos;

    for pi in 0..state.projectiles.enemy.len() {
        if !state.projectiles.enemy[pi].active {
            continue;
        }
        let pos = state.projectiles.enemy[pi].pos;
        let id = state.projectiles.enemy[pi].id;

        if collides(pos, player, hit_threshold) {
            state.projectiles.enemy[pi].active = false;
            state.dodge_granted.remove(&id);
            player_hit(state);
        } else if in_dodge_band(pos, player, dodge_min, dodge_max) {
            // One bonus per band entry, keyed on the projectile ID
            if state.dodge_granted.insert(id) {
                state.score += dodge_bonus;
            }
        } else if pos.distance(player) >= dodge_max {
            // Leaving the band re-arms the bonus for this projectile
            state.dodge_granted.remove(&id);
        }
    }
}

/// Ship-to-ship contact: enemy-player rams and enemy-enemy chains.
fn resolve_ship_collisions(state: &mut GameState) {
    let threshold = state.tuning.collision.ship_ship;
    let chain_base = state.tuning.score.chain_kill;

    // Enemy rams the player: the enemy dies without wave or score credit,
    // the player takes a hit, and a fresh enemy backfills the slot. One
    // ram resolves per tick.
    let player = state.player.pos;
    for i in 0..state.enemies.len() {
        if !state.enemies[i].visible {
            continue;
        }
        if collides(state.enemies[i].pos, player, threshold) {
            let pos = state.enemies[i].pos;
            state.enemies[i].destroy();
            state.spawn_burst(pos, 8);
            player_hit(state);
            spawn_replacement(state);
            break;
        }
    }
    if state.phase == GamePhase::GameOver {
        return;
    }

    // Two enemies colliding destroy each other for a single chain bonus
    for i in 0..state.enemies.len() {
        for j in (i + 1)..state.enemies.len() {
            if !state.enemies[i].visible || !state.enemies[j].visible {
                continue;
            }
            if collides(state.enemies[i].pos, state.enemies[j].pos, threshold) {
                let pos = state.enemies[i].pos;
                state.enemies[i].destroy();
                state.enemies[j].destroy();
                let points = combo_points(state, chain_base);
                state.score += points;
                state.waves.enemy_killed();
                state.waves.enemy_killed();
                state.spawn_burst(pos, 12);
            }
        }
    }
}

/// Destroy an enemy shot down by the player and pay out the kill.
fn kill_enemy(state: &mut GameState, idx: usize) {
    let pos = state.enemies[idx].pos;
    state.enemies[idx].destroy();

    let base = if pos.y < state.tuning.score.perfect_shot_threshold_y {
        state.tuning.score.perfect_shot
    } else {
        state.tuning.score.enemy_kill
    };
    let mut points = combo_points(state, base);
    // The x2 effect applies to shot-down kills only
    if state.powerups.is_active(PowerUpKind::ScoreMultiplier) {
        points *= SCORE_MULTIPLIER_FACTOR as u64;
    }
    state.score += points;
    state.waves.enemy_killed();

    let id = state.next_entity_id();
    state
        .powerups
        .try_drop(&mut state.rng, id, pos, state.now_ms, &state.tuning.powerup);

    state.spawn_burst(pos, 8);
    state.add_shake(3.0);
}

/// Register a combo kill and return the combo-scaled point value.
fn combo_points(state: &mut GameState, base: u32) -> u64 {
    state.combo.register_kill(state.now_ms);
    state.combo.apply(base) as u64
}

/// The player takes a hit: absorbed in test mode, spent on the shield if
/// one is up, otherwise a life is lost. Nothing else about the field
/// changes on a hit.
fn player_hit(state: &mut GameState) {
    if state.test_mode {
        return;
    }
    if state.powerups.is_active(PowerUpKind::Shield) {
        state.powerups.consume(PowerUpKind::Shield);
        state.add_shake(4.0);
        log::debug!("shield absorbed a hit");
        return;
    }

    state.lives = state.lives.saturating_sub(1);
    state.add_shake(10.0);
    log::info!("hit; {} lives remaining", state.lives);

    if state.lives == 0 {
        state.phase = GamePhase::GameOver;
        log::info!(
            "game over: score {} on wave {}",
            state.score,
            state.waves.number
        );
    }
}

/// Gather pickups around the player and apply instant consequences.
fn collect_pickups(state: &mut GameState) {
    let radius = state.tuning.collision.pickup_radius;
    let player = state.player.pos;
    let now = state.now_ms;
    let collected = state.powerups.collect(player, radius, now);

    for kind in collected {
        log::info!("collected {}", kind.label());
        if kind == PowerUpKind::ScreenClear {
            apply_screen_clear(state);
        }
    }
}

/// Destroy every enemy on the field for a flat per-enemy bounty. Combo
/// and wave accounting are untouched; the wave refills through the
/// normal spawn paths.
fn apply_screen_clear(state: &mut GameState) {
    let per_enemy = state.tuning.score.screen_clear_per_enemy as u64;
    for i in 0..state.enemies.len() {
        if !state.enemies[i].visible {
            continue;
        }
        let pos = state.enemies[i].pos;
        state.enemies[i].destroy();
        state.score += per_enemy;
        state.spawn_burst(pos, 6);
    }
    // Compact right away so the enemy update pass cannot mistake these
    // kills for off-screen escapes
    state.enemies.retain(|e| e.visible);
    state.add_shake(8.0);
}

/// Compact the entity pools and drop dodge-ledger entries whose
/// projectiles are gone.
fn sweep(state: &mut GameState) {
    state.enemies.retain(|e| e.visible);
    state.projectiles.player.retain(|p| p.active);
    state.projectiles.enemy.retain(|p| p.active);

    let live: HashSet<u32> = state.projectiles.enemy.iter().map(|p| p.id).collect();
    state.dodge_granted.retain(|id| live.contains(id));
}

fn update_cosmetics(state: &mut GameState, dt_ms: f32) {
    let scale = frame_scale(dt_ms);
    for p in &mut state.particles {
        p.pos += p.vel * scale;
        p.life -= p.decay * scale;
    }
    state.particles.retain(|p| p.life > 0.0);

    state.screen_shake *= 0.9;
    if state.screen_shake < 0.1 {
        state.screen_shake = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_MS;
    use crate::sim::projectile::{Heading, Projectile};
    use crate::tuning::Tuning;

    fn new_state(seed: u64) -> GameState {
        GameState::new(seed, Tuning::default())
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    /// Drop an enemy at a fixed spot without consuming wave machinery.
    fn place_enemy(state: &mut GameState, pos: Vec2) -> u32 {
        let id = state.next_entity_id();
        let mut e = Enemy::spawn(&mut state.rng, id, pos.x, 0, &state.tuning.enemy);
        e.pos = pos;
        state.enemies.push(e);
        id
    }

    fn place_player_shot(state: &mut GameState, pos: Vec2) {
        let id = state.next_entity_id();
        state
            .projectiles
            .player
            .push(Projectile::new(id, pos, Heading::Up, 18.0));
    }

    fn place_enemy_shot(state: &mut GameState, pos: Vec2, speed: f32) -> u32 {
        let id = state.next_entity_id();
        state
            .projectiles
            .enemy
            .push(Projectile::new(id, pos, Heading::Down, speed));
        id
    }

    #[test]
    fn pause_freezes_the_clock() {
        let mut state = new_state(1);
        tick(&mut state, &idle(), FRAME_MS);
        let frozen = state.now_ms;

        tick(&mut state, &TickInput { pause: true, ..idle() }, FRAME_MS);
        assert_eq!(state.phase, GamePhase::Paused);
        for _ in 0..10 {
            tick(&mut state, &idle(), FRAME_MS);
        }
        assert_eq!(state.now_ms, frozen);

        tick(&mut state, &TickInput { pause: true, ..idle() }, FRAME_MS);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn standard_kill_scores_base_value() {
        let mut state = new_state(2);
        place_enemy(&mut state, Vec2::new(400.0, 400.0));
        place_player_shot(&mut state, Vec2::new(400.0, 425.0));
        tick(&mut state, &idle(), FRAME_MS);
        assert_eq!(state.score, 100);
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn high_kill_scores_as_perfect_shot() {
        let mut state = new_state(3);
        // Well above the perfect-shot line even after one tick of descent
        place_enemy(&mut state, Vec2::new(400.0, 150.0));
        place_player_shot(&mut state, Vec2::new(400.0, 175.0));
        tick(&mut state, &idle(), FRAME_MS);
        assert_eq!(state.score, 150);
    }

    #[test]
    fn three_quick_kills_build_a_double_multiplier() {
        let mut state = new_state(4);
        for x in [100.0, 400.0, 700.0] {
            place_enemy(&mut state, Vec2::new(x, 400.0));
            place_player_shot(&mut state, Vec2::new(x, 425.0));
        }
        tick(&mut state, &idle(), FRAME_MS);
        // 100 * 1.0 + 100 * 1.5 + 100 * 2.0
        assert_eq!(state.score, 450);
        assert_eq!(state.combo.multiplier, 2.0);
    }

    #[test]
    fn shield_absorbs_exactly_one_hit() {
        let mut state = new_state(5);
        state.powerups.activate(PowerUpKind::Shield, 0.0);
        let lives = state.lives;
        let player_pos = state.player.pos;

        place_enemy_shot(&mut state, player_pos, 0.0);
        tick(&mut state, &idle(), FRAME_MS);
        assert_eq!(state.lives, lives);
        assert!(!state.powerups.is_active(PowerUpKind::Shield));

        place_enemy_shot(&mut state, player_pos, 0.0);
        tick(&mut state, &idle(), FRAME_MS);
        assert_eq!(state.lives, lives - 1);
    }

    #[test]
    fn bullet_time_slows_hostiles_but_not_the_player() {
        let mut state = new_state(6);
        state.powerups.activate(PowerUpKind::BulletTime, 0.0);
        place_enemy_shot(&mut state, Vec2::new(100.0, 100.0), 10.0);
        let player_before = state.player.pos.x;

        tick(&mut state, &TickInput { right: true, ..idle() }, FRAME_MS);

        // Hostile projectile covered 30% of a frame's travel
        let moved = state.projectiles.enemy[0].pos.y - 100.0;
        assert!((moved - 3.0).abs() < 0.1, "moved {moved}");
        // The player covered a full frame's travel
        let player_moved = state.player.pos.x - player_before;
        assert!((player_moved - 8.0).abs() < 0.1, "player moved {player_moved}");
    }

    #[test]
    fn fire_cap_rejects_without_spending_the_cooldown() {
        let mut state = new_state(7);
        for i in 0..5 {
            place_player_shot(&mut state, Vec2::new(100.0 + i as f32 * 50.0, 300.0));
        }
        let last_shot = state.last_player_shot_ms;
        tick(&mut state, &TickInput { fire: true, ..idle() }, FRAME_MS);
        assert_eq!(state.projectiles.player.len(), 5);
        assert_eq!(state.last_player_shot_ms, last_shot);
    }

    #[test]
    fn fire_cooldown_limits_the_rate() {
        let mut state = new_state(8);
        let fire = TickInput { fire: true, ..idle() };
        for _ in 0..10 {
            tick(&mut state, &fire, FRAME_MS);
        }
        // 167 ms at a 300 ms cooldown: exactly one shot
        assert_eq!(state.projectiles.player.len(), 1);
    }

    #[test]
    fn rapid_fire_shortens_the_cooldown() {
        let mut state = new_state(9);
        state.powerups.activate(PowerUpKind::RapidFire, 0.0);
        let fire = TickInput { fire: true, ..idle() };
        for _ in 0..10 {
            tick(&mut state, &fire, FRAME_MS);
        }
        // 167 ms at a 100 ms cooldown: two shots fit
        assert_eq!(state.projectiles.player.len(), 2);
    }

    #[test]
    fn multi_shot_fires_a_spread() {
        let mut state = new_state(10);
        state.powerups.activate(PowerUpKind::MultiShot, 0.0);
        tick(&mut state, &TickInput { fire: true, ..idle() }, FRAME_MS);
        assert_eq!(state.projectiles.player.len(), 3);
        let xs: Vec<f32> = state.projectiles.player.iter().map(|p| p.pos.x).collect();
        assert!(xs[0] < xs[1] && xs[1] < xs[2]);
    }

    #[test]
    fn dodge_pays_once_per_band_entry() {
        let mut state = new_state(11);
        // Stationary projectile 60 px out: inside the open (50, 80) band
        let band_pos = state.player.pos + Vec2::new(60.0, 0.0);
        let id = place_enemy_shot(&mut state, band_pos, 0.0);
        tick(&mut state, &idle(), FRAME_MS);
        assert_eq!(state.score, 5);
        tick(&mut state, &idle(), FRAME_MS);
        assert_eq!(state.score, 5, "no second bonus while still in the band");

        // Push it out past the band to re-arm, then bring it back
        state.projectiles.enemy[0].pos = state.player.pos + Vec2::new(100.0, 0.0);
        tick(&mut state, &idle(), FRAME_MS);
        state.projectiles.enemy[0].pos = state.player.pos + Vec2::new(60.0, 0.0);
        tick(&mut state, &idle(), FRAME_MS);
        assert_eq!(state.score, 10);
        assert!(state.dodge_granted.contains(&id));
    }

    #[test]
    fn ramming_enemy_costs_a_life_and_is_replaced() {
        let mut state = new_state(12);
        let lives = state.lives;
        let ram_pos = state.player.pos + Vec2::new(10.0, 0.0);
        place_enemy(&mut state, ram_pos);
        tick(&mut state, &idle(), FRAME_MS);
        assert_eq!(state.lives, lives - 1);
        assert_eq!(state.score, 0, "rams award no points");
        // The rammer dies uncredited and a fresh enemy backfills the slot
        assert_eq!(state.waves.current.as_ref().unwrap().killed, 0);
        assert_eq!(state.enemies.len(), 1);
        assert!(state.enemies[0].pos.y < 0.0, "replacement stages off-screen");
    }

    #[test]
    fn colliding_enemies_chain_for_one_bonus() {
        let mut state = new_state(13);
        place_enemy(&mut state, Vec2::new(400.0, 400.0));
        place_enemy(&mut state, Vec2::new(405.0, 400.0));
        tick(&mut state, &idle(), FRAME_MS);
        assert_eq!(state.score, 200);
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn wave_one_is_four_enemies_in_a_line() {
        use crate::sim::wave::Formation;
        let mut state = new_state(14);
        // Stay out of the field's way while wave 1 spawns in
        for _ in 0..200 {
            tick(&mut state, &idle(), FRAME_MS);
        }
        assert_eq!(state.waves.number, 1);
        let wave = state.waves.current.as_ref().unwrap();
        assert_eq!(wave.required, 4);
        assert_eq!(wave.formation, Formation::Line);
        assert_eq!(wave.spawned, 4);
    }

    #[test]
    fn test_mode_grants_and_invulnerability() {
        let mut state = new_state(15);
        tick(
            &mut state,
            &TickInput {
                toggle_test_mode: true,
                grant_powerup: Some(PowerUpKind::BulletTime),
                ..idle()
            },
            FRAME_MS,
        );
        assert!(state.test_mode);
        assert!(state.powerups.is_active(PowerUpKind::BulletTime));

        let lives = state.lives;
        let player_pos = state.player.pos;
        place_enemy_shot(&mut state, player_pos, 0.0);
        tick(&mut state, &idle(), FRAME_MS);
        assert_eq!(state.lives, lives);
    }

    #[test]
    fn grants_are_ignored_outside_test_mode() {
        let mut state = new_state(16);
        tick(
            &mut state,
            &TickInput {
                grant_powerup: Some(PowerUpKind::Shield),
                ..idle()
            },
            FRAME_MS,
        );
        assert!(!state.powerups.is_active(PowerUpKind::Shield));
    }

    #[test]
    fn screen_clear_pays_a_flat_bounty() {
        let mut state = new_state(17);
        state.test_mode = true;
        for x in [150.0, 400.0, 650.0] {
            place_enemy(&mut state, Vec2::new(x, 350.0));
        }
        tick(
            &mut state,
            &TickInput {
                grant_powerup: Some(PowerUpKind::ScreenClear),
                ..idle()
            },
            FRAME_MS,
        );
        assert_eq!(state.score, 150);
        // Only the staged fallback spawn remains on the field
        assert!(state.enemies.iter().all(|e| e.pos.y < 0.0));
        assert_eq!(state.combo.multiplier, 1.0, "bounty kills skip the combo");
    }

    #[test]
    fn last_life_ends_the_game_and_restart_recovers() {
        let mut state = new_state(18);
        state.lives = 1;
        let player_pos = state.player.pos;
        place_enemy_shot(&mut state, player_pos, 0.0);
        tick(&mut state, &idle(), FRAME_MS);
        assert_eq!(state.phase, GamePhase::GameOver);

        let frozen = state.now_ms;
        tick(&mut state, &idle(), FRAME_MS);
        assert_eq!(state.now_ms, frozen);

        tick(&mut state, &TickInput { restart: true, ..idle() }, FRAME_MS);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.lives, Tuning::default().player.lives);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn escaped_enemy_is_replaced_at_the_top() {
        let mut state = new_state(19);
        place_enemy(&mut state, Vec2::new(400.0, 649.0));
        tick(&mut state, &idle(), FRAME_MS);
        assert_eq!(state.enemies.len(), 1);
        assert!(state.enemies[0].pos.y < 0.0, "replacement stages off-screen");
    }

    #[test]
    fn score_multiplier_doubles_combat_kills_only() {
        let mut state = new_state(20);
        state.powerups.activate(PowerUpKind::ScoreMultiplier, 0.0);
        place_enemy(&mut state, Vec2::new(400.0, 400.0));
        place_player_shot(&mut state, Vec2::new(400.0, 425.0));
        // Plus a stationary near-miss: dodge bonuses stay unmultiplied
        let band_pos = state.player.pos + Vec2::new(60.0, 0.0);
        place_enemy_shot(&mut state, band_pos, 0.0);
        tick(&mut state, &idle(), FRAME_MS);
        assert_eq!(state.score, 200 + 5);
    }

    #[test]
    fn score_multiplier_leaves_chain_kills_alone() {
        let mut state = new_state(23);
        state.powerups.activate(PowerUpKind::ScoreMultiplier, 0.0);
        place_enemy(&mut state, Vec2::new(400.0, 400.0));
        place_enemy(&mut state, Vec2::new(405.0, 400.0));
        tick(&mut state, &idle(), FRAME_MS);
        assert_eq!(state.score, 200, "chain bonus is not doubled");
    }

    #[test]
    fn field_never_sits_empty_during_a_transition() {
        let mut state = new_state(24);
        tick(&mut state, &idle(), FRAME_MS);
        // Credit the whole wave, then strip the field bare
        let required = state.waves.current.as_ref().unwrap().required;
        for _ in 0..required {
            state.waves.enemy_killed();
        }
        state.enemies.clear();
        tick(&mut state, &idle(), FRAME_MS);
        assert!(state.waves.info().in_transition);
        assert!(state.visible_enemy_count() >= 1);
    }

    #[test]
    fn lapsed_shield_does_not_absorb_this_ticks_hit() {
        let mut state = new_state(25);
        // Started long enough ago that it expires on the coming tick
        state
            .powerups
            .activate(PowerUpKind::Shield, -PowerUpKind::Shield.duration_ms() - 1.0);
        let lives = state.lives;
        let player_pos = state.player.pos;
        place_enemy_shot(&mut state, player_pos, 0.0);
        tick(&mut state, &idle(), FRAME_MS);
        assert!(!state.powerups.is_active(PowerUpKind::Shield));
        assert_eq!(state.lives, lives - 1);
    }

    #[test]
    fn taking_a_hit_leaves_the_rest_of_the_field_alone() {
        let mut state = new_state(26);
        let start_pos = state.player.pos;
        let band_pos = start_pos + Vec2::new(60.0, 0.0);
        let band_id = place_enemy_shot(&mut state, band_pos, 0.0);
        tick(&mut state, &idle(), FRAME_MS);
        assert_eq!(state.score, 5);

        let lives = state.lives;
        place_enemy_shot(&mut state, start_pos, 0.0);
        tick(&mut state, &idle(), FRAME_MS);
        assert_eq!(state.lives, lives - 1);
        // The near-miss projectile and its granted mark both survive
        assert_eq!(state.projectiles.enemy.len(), 1);
        assert!(state.dodge_granted.contains(&band_id));
        assert_eq!(state.player.pos, start_pos);
    }

    #[test]
    fn identical_seeds_and_inputs_replay_identically() {
        let mut a = new_state(99);
        let mut b = new_state(99);
        for i in 0..600u32 {
            let input = TickInput {
                left: i % 7 < 3,
                right: i % 7 >= 3,
                fire: i % 3 == 0,
                ..idle()
            };
            tick(&mut a, &input, FRAME_MS);
            tick(&mut b, &input, FRAME_MS);
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.lives, b.lives);
        assert_eq!(a.now_ms, b.now_ms);
        assert_eq!(a.enemies.len(), b.enemies.len());
        for (ea, eb) in a.enemies.iter().zip(&b.enemies) {
            assert_eq!(ea.pos, eb.pos);
            assert_eq!(ea.id, eb.id);
        }
        assert_eq!(a.waves.number, b.waves.number);
    }
}
