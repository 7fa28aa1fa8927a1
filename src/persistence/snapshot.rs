//! Saved-game snapshot format

use serde::{Deserialize, Serialize};

use crate::theme::{DEFAULT_THEME, Tier};

/// A resting disc as stored in a save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedBody {
    pub x: f32,
    pub y: f32,
    pub tier: Tier,
}

/// Everything needed to resume a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub score: u64,
    pub next_tier: Option<Tier>,
    /// Tier of the disc that was in hand when saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub held_tier: Option<Tier>,
    pub bodies: Vec<SavedBody>,
    /// Unix timestamp (ms) stamped on save
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

impl Snapshot {
    /// Age relative to `now_ms`
    pub fn age_ms(&self, now_ms: f64) -> f64 {
        now_ms - self.timestamp
    }
}
