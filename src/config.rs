//! Game configuration
//!
//! Defaults come from [`crate::consts`]; a JSON override can be supplied at
//! startup. Missing fields fall back to their defaults.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::GameError;

/// Settle detector tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    /// Wait before the first poll so the engine can accelerate the dropped disc
    pub grace: f32,
    /// Seconds between polls
    pub poll_interval: f32,
    /// Consecutive stable polls needed
    pub required_polls: u32,
    /// Seconds of polling before settlement is forced
    pub timeout: f32,
    /// Vertical speed counted as "at rest" (pixels/s)
    pub speed_epsilon: f32,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            grace: SETTLE_GRACE,
            poll_interval: SETTLE_POLL_INTERVAL,
            required_polls: SETTLE_REQUIRED_POLLS,
            timeout: SETTLE_TIMEOUT,
            speed_epsilon: REST_SPEED_EPSILON,
        }
    }
}

/// Material properties handed to the physics engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub friction: f32,
    pub restitution: f32,
    pub wall_friction: f32,
    pub wall_restitution: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            friction: 0.3,
            restitution: 0.2,
            wall_friction: 0.2,
            wall_restitution: 0.5,
            linear_damping: 0.06,
            angular_damping: 0.1,
        }
    }
}

/// Full runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Play field ===
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub wall_thickness: f32,
    /// y of the drop line (discs spawn here)
    pub drop_zone_height: f32,

    // === Rules ===
    pub merge_threshold: f32,
    pub max_bodies: usize,
    /// Auto-save period in seconds
    pub auto_save_interval: f32,

    pub settle: SettleConfig,
    pub physics: PhysicsConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            wall_thickness: WALL_THICKNESS,
            drop_zone_height: DROP_ZONE_HEIGHT,

            merge_threshold: MERGE_THRESHOLD,
            max_bodies: MAX_BODIES,
            auto_save_interval: AUTO_SAVE_INTERVAL,

            settle: SettleConfig::default(),
            physics: PhysicsConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON override
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        serde_json::from_str(json).map_err(|e| GameError::LoadFailed(e.to_string()))
    }

    /// Horizontal centre of the play field
    pub fn center_x(&self) -> f32 {
        self.canvas_width / 2.0
    }

    /// Clamp an aim x so a disc of `radius` stays inside the side walls
    pub fn clamp_drop_x(&self, x: f32, radius: f32) -> f32 {
        let min_x = self.wall_thickness + radius;
        let max_x = self.canvas_width - self.wall_thickness - radius;
        if min_x > max_x {
            return self.center_x();
        }
        x.clamp(min_x, max_x)
    }
}
