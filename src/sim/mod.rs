//! Deterministic game logic
//!
//! Everything above the physics engine lives here:
//! - Fixed timestep only, advanced by the caller
//! - Seeded RNG only
//! - Stable iteration order (by body ID)
//! - No rendering or platform dependencies

pub mod controller;
pub mod settle;
pub mod state;

#[cfg(test)]
mod proptests;

pub use controller::{Controller, TickInput};
pub use settle::{SettleDetector, SettleOutcome, SettleState};
pub use state::{BodyView, Disc, GameEvent, GamePhase, Session};
