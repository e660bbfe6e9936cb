//! Nova Strike headless driver
//!
//! Runs the simulation at a fixed timestep with a simple autopilot, then
//! reports the run and records it on the leaderboard. Useful for balance
//! checks and soak-testing the simulation without a renderer:
//!
//! ```text
//! novastrike [seed] [ticks]
//! NOVA_TUNING=tuning.json NOVA_SCORES=highscores.json novastrike 42 36000
//! ```

use std::path::Path;

use novastrike::consts::SIM_DT_MS;
use novastrike::hud::Hud;
use novastrike::sim::{tick, GamePhase, GameState, TickInput};
use novastrike::{HighScores, Tuning};

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x4E56);
    let ticks: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(18_000);

    let tuning_path = std::env::var("NOVA_TUNING").unwrap_or_else(|_| "tuning.json".into());
    let scores_path = std::env::var("NOVA_SCORES").unwrap_or_else(|_| "highscores.json".into());

    let tuning = Tuning::load_or_default(&tuning_path);
    let mut state = GameState::new(seed, tuning);
    log::info!("Nova Strike: seed {seed}, {ticks} ticks");

    for _ in 0..ticks {
        let input = autopilot(&state);
        tick(&mut state, &input, SIM_DT_MS);
        if state.phase == GamePhase::GameOver {
            break;
        }
    }

    let hud = Hud::snapshot(&state);
    println!(
        "run over after {:.1}s: score {}, wave {}, lives {}",
        state.now_ms / 1000.0,
        hud.score,
        hud.wave.number,
        hud.lives
    );

    let mut board = HighScores::load(Path::new(&scores_path));
    if board.check_and_update(state.score, state.waves.number) {
        println!("new top score!");
    }
    board.save(Path::new(&scores_path));
}

/// Demo pilot: dodge the nearest incoming shot, otherwise chase pickups,
/// otherwise line up under the nearest enemy. Fires continuously.
fn autopilot(state: &GameState) -> TickInput {
    let player = state.player.pos;

    // The most dangerous shot is the closest one above us in our lane
    let threat = state
        .projectiles
        .enemy
        .iter()
        .filter(|p| p.pos.y < player.y && (p.pos.x - player.x).abs() < 60.0)
        .min_by(|a, b| {
            (player.y - a.pos.y)
                .partial_cmp(&(player.y - b.pos.y))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let target_x = if let Some(shot) = threat {
        // Step out of the lane, toward the wider side
        if shot.pos.x > player.x {
            player.x - 120.0
        } else {
            player.x + 120.0
        }
    } else if let Some(pickup) = state.powerups.pickups.iter().min_by(|a, b| {
        a.pos
            .distance(player)
            .partial_cmp(&b.pos.distance(player))
            .unwrap_or(std::cmp::Ordering::Equal)
    }) {
        pickup.pos.x
    } else if let Some(enemy) = state
        .enemies
        .iter()
        .filter(|e| e.visible && e.pos.y < player.y)
        .min_by(|a, b| {
            (a.pos.x - player.x)
                .abs()
                .partial_cmp(&(b.pos.x - player.x).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    {
        enemy.pos.x
    } else {
        player.x
    };

    let deadzone = 6.0;
    TickInput {
        left: target_x < player.x - deadzone,
        right: target_x > player.x + deadzone,
        fire: true,
        ..TickInput::default()
    }
}
