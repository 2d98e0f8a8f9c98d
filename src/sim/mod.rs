//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Driven only by `advance(dt)` with caller-supplied time steps
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod geometry;
pub mod powerup;
pub mod state;
pub mod tick;

pub use geometry::{Rect, Road};
pub use powerup::{PowerUpKind, classify};
pub use state::{ActiveEffects, Collectible, Obstacle, RunEvent, RunPhase, RunState};
pub use tick::advance;
