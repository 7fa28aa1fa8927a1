//! Emoji Drop - a merge-and-drop puzzle game
//!
//! Core modules:
//! - `sim`: Drop/merge state machine (spawn, aim, drop, settle, merge, game over)
//! - `physics`: Rigid-body world seam and its rapier2d implementation
//! - `theme`: Theme catalog (tier ladders)
//! - `persistence`: Snapshot, high score and theme storage with expiry
//! - `platform`: Browser/native platform abstraction (time, seeds, storage)
//! - `game`: Fixed-timestep shell tying the above together

pub mod config;
pub mod error;
pub mod game;
pub mod persistence;
pub mod physics;
pub mod platform;
pub mod sim;
pub mod theme;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{GameConfig, PhysicsConfig, SettleConfig};
pub use error::GameError;
pub use game::Game;
pub use theme::{ThemeCatalog, Tier};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matches the physics clock)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta accepted by the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Play field in logical pixels (y grows downward)
    pub const CANVAS_WIDTH: f32 = 400.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;
    pub const WALL_THICKNESS: f32 = 20.0;
    /// Height of the drop zone; the drop line sits at this y
    pub const DROP_ZONE_HEIGHT: f32 = 150.0;

    /// Downward acceleration (pixels/s²)
    pub const GRAVITY: f32 = 500.0;
    /// Extra gap allowed between two equal discs for them to merge
    pub const MERGE_THRESHOLD: f32 = 5.0;
    /// Cap on bodies restored from a snapshot
    pub const MAX_BODIES: usize = 50;

    /// Vertical speed below which a disc counts as resting (pixels/s)
    pub const REST_SPEED_EPSILON: f32 = 6.0;
    /// Delay after a drop before settle polling starts (seconds)
    pub const SETTLE_GRACE: f32 = 0.5;
    /// Interval between settle polls (seconds)
    pub const SETTLE_POLL_INTERVAL: f32 = 0.1;
    /// Consecutive stable polls required to call the scene settled
    pub const SETTLE_REQUIRED_POLLS: u32 = 3;
    /// Forced settle after this long in polling (seconds)
    pub const SETTLE_TIMEOUT: f32 = 3.0;

    /// Auto-save period (seconds)
    pub const AUTO_SAVE_INTERVAL: f32 = 30.0;
    /// Saved games older than this are discarded (milliseconds)
    pub const SNAPSHOT_TTL_MS: f64 = 24.0 * 60.0 * 60.0 * 1000.0;
}

/// Zero-padded score for HUD display
pub fn format_score(score: u64) -> String {
    format!("{:06}", score)
}
