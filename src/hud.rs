//! Renderer-facing state snapshot
//!
//! A renderer never reaches into the simulation directly; it asks for a
//! [`Hud`] once per frame and draws from that. The snapshot is plain data
//! with no references back into [`GameState`].

use crate::sim::powerup::PowerUpKind;
use crate::sim::wave::WaveInfo;
use crate::sim::{GamePhase, GameState};

/// Combo meter readout
#[derive(Debug, Clone)]
pub struct ComboReadout {
    pub multiplier: f32,
    pub streak: u32,
    /// True once the multiplier is climbing
    pub hot: bool,
    /// Window time left before the streak decays
    pub window_remaining_ms: f64,
}

/// One active power-up effect and its remaining time
#[derive(Debug, Clone)]
pub struct EffectReadout {
    pub kind: PowerUpKind,
    pub label: &'static str,
    pub remaining_ms: f64,
}

/// Everything the HUD layer draws for one frame.
#[derive(Debug, Clone)]
pub struct Hud {
    pub score: u64,
    pub lives: u32,
    pub phase: GamePhase,
    pub wave: WaveInfo,
    pub combo: ComboReadout,
    pub effects: Vec<EffectReadout>,
    pub test_mode: bool,
}

impl Hud {
    pub fn snapshot(state: &GameState) -> Self {
        Self {
            score: state.score,
            lives: state.lives,
            phase: state.phase,
            wave: state.waves.info(),
            combo: ComboReadout {
                multiplier: state.combo.multiplier,
                streak: state.combo.streak,
                hot: state.combo.is_hot(),
                window_remaining_ms: state.combo.window_remaining_ms(state.now_ms),
            },
            effects: state
                .powerups
                .active_effects(state.now_ms)
                .into_iter()
                .map(|(kind, remaining_ms)| EffectReadout {
                    kind,
                    label: kind.label(),
                    remaining_ms,
                })
                .collect(),
            test_mode: state.test_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    #[test]
    fn snapshot_reflects_core_counters() {
        let mut state = GameState::new(1, Tuning::default());
        state.score = 1234;
        state.lives = 2;
        let hud = Hud::snapshot(&state);
        assert_eq!(hud.score, 1234);
        assert_eq!(hud.lives, 2);
        assert_eq!(hud.phase, GamePhase::Playing);
        assert!(hud.effects.is_empty());
    }

    #[test]
    fn active_effects_carry_labels_and_timers() {
        let mut state = GameState::new(2, Tuning::default());
        state.powerups.activate(PowerUpKind::Shield, 0.0);
        state.now_ms = 2000.0;
        let hud = Hud::snapshot(&state);
        assert_eq!(hud.effects.len(), 1);
        assert_eq!(hud.effects[0].label, "shield");
        assert!((hud.effects[0].remaining_ms - 10_000.0).abs() < 1e-6);
    }
}
