//! Session state and core simulation types
//!
//! Everything that survives a save lives in [`Session`]; disc positions
//! belong to the physics world.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::physics::BodyId;
use crate::theme::Tier;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// A held disc follows the aim; earlier discs may still be moving
    Aiming,
    /// Held disc released, waiting for the pile to settle
    Dropping,
    /// Simulation and timers suspended
    Paused,
    /// Run ended
    GameOver,
}

/// Game-layer tag attached to a physics body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disc {
    /// Tier level within the active theme
    pub level: u8,
    /// Set once a merge has claimed this disc; it must not merge again
    pub consumed: bool,
}

impl Disc {
    pub fn new(level: u8) -> Self {
        Self {
            level,
            consumed: false,
        }
    }
}

/// Mutable per-run state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub score: u64,
    /// Tier the next spawn will use (shown as a preview)
    pub next_tier: Option<Tier>,
    pub phase: GamePhase,
    /// Phase to return to when unpausing
    pub resume_phase: Option<GamePhase>,
    /// Merges performed this run
    pub merges: u32,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            score: 0,
            next_tier: None,
            phase: GamePhase::Aiming,
            resume_phase: None,
            merges: 0,
        }
    }
}

impl Session {
    pub fn is_dropping(&self) -> bool {
        self.phase == GamePhase::Dropping
            || (self.phase == GamePhase::Paused && self.resume_phase == Some(GamePhase::Dropping))
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}

/// Notable things that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Spawned { id: BodyId, level: u8 },
    Dropped { id: BodyId },
    Merged {
        consumed: [BodyId; 2],
        created: BodyId,
        level: u8,
        points: u64,
        pos: Vec2,
    },
    /// Drop cycle finished; `timed_out` when the hard timeout forced it
    Settled { timed_out: bool },
    /// A resting disc was cleared out of the spawn band
    OrphanRemoved { id: BodyId },
    GameOver { score: u64 },
}

/// A disc as the renderer sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub radius: f32,
    pub tier: Tier,
    pub held: bool,
}
