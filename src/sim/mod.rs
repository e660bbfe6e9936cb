//! Deterministic fixed-tick simulation core
//!
//! The whole playfield advances through [`tick`]: one call, one fixed
//! timestep, no wall-clock reads anywhere inside. Every random decision
//! draws from the single seeded RNG in [`GameState`], so a run is a pure
//! function of `(seed, tuning, input sequence)` and can be replayed
//! bit-for-bit. Rendering and input capture live entirely outside this
//! module; the contract is `&mut GameState` in, mutated state out.

pub mod collision;
pub mod combo;
pub mod enemy;
pub mod powerup;
pub mod projectile;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod wave;

pub use powerup::PowerUpKind;
pub use state::{GamePhase, GameState, Player};
pub use tick::{tick, TickInput};
pub use wave::{Formation, WaveInfo};
