//! Save/load persistence
//!
//! Features:
//! - JSON snapshot of the running session with a 24 hour expiry
//! - High score tracking
//! - Theme preference
//!
//! Store failures come back as [`GameError`]; callers decide whether to
//! log and carry on.

pub mod snapshot;

pub use snapshot::{SavedBody, Snapshot};

use crate::consts::SNAPSHOT_TTL_MS;
use crate::error::GameError;
use crate::platform::{self, KeyValueStore};
use crate::theme::DEFAULT_THEME;

/// Storage keys
pub mod keys {
    pub const GAME_STATE: &str = "emojiDrop_gameState";
    pub const HIGH_SCORE: &str = "emojiDrop_highScore";
    pub const CURRENT_THEME: &str = "emojiDrop_theme";
    pub(super) const TEST_KEY: &str = "__storage_test__";

    pub const ALL: [&str; 3] = [GAME_STATE, HIGH_SCORE, CURRENT_THEME];
}

/// Persistence adapter over any key-value store
pub struct Persistence<S: KeyValueStore> {
    store: S,
    clock: fn() -> f64,
}

impl<S: KeyValueStore> Persistence<S> {
    /// Wrap a store after checking it accepts writes
    pub fn open(mut store: S) -> Result<Self, GameError> {
        let check = store
            .set(keys::TEST_KEY, keys::TEST_KEY)
            .and_then(|_| store.remove(keys::TEST_KEY));
        if let Err(e) = check {
            log::error!("Storage check failed: {}", e);
            return Err(GameError::StorageUnavailable);
        }
        Ok(Self {
            store,
            clock: platform::now_ms,
        })
    }

    /// Replace the wall clock (ms since epoch)
    pub fn with_clock(mut self, clock: fn() -> f64) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Store a snapshot, stamping it with the current time
    pub fn save(&mut self, snapshot: &Snapshot) -> Result<(), GameError> {
        let mut stamped = snapshot.clone();
        stamped.timestamp = (self.clock)();
        let json =
            serde_json::to_string(&stamped).map_err(|e| GameError::SaveFailed(e.to_string()))?;
        self.store
            .set(keys::GAME_STATE, &json)
            .map_err(|e| GameError::SaveFailed(e.to_string()))?;
        log::debug!("Snapshot saved ({} bodies)", stamped.bodies.len());
        Ok(())
    }

    /// Load the saved snapshot
    ///
    /// Absent, unreadable and expired snapshots all come back as `None`;
    /// the latter two are deleted.
    pub fn load(&mut self) -> Result<Option<Snapshot>, GameError> {
        let json = self
            .store
            .get(keys::GAME_STATE)
            .map_err(|e| GameError::LoadFailed(e.to_string()))?;
        let Some(json) = json else {
            return Ok(None);
        };

        let snapshot: Snapshot = match serde_json::from_str(&json) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Discarding corrupt snapshot: {}", e);
                self.discard();
                return Ok(None);
            }
        };

        if snapshot.age_ms((self.clock)()) > SNAPSHOT_TTL_MS {
            log::info!("Saved game expired, discarding");
            self.discard();
            return Ok(None);
        }

        Ok(Some(snapshot))
    }

    fn discard(&mut self) {
        if let Err(e) = self.clear() {
            log::warn!("{}", e);
        }
    }

    /// Delete the saved snapshot
    pub fn clear(&mut self) -> Result<(), GameError> {
        self.store
            .remove(keys::GAME_STATE)
            .map_err(|e| GameError::SaveFailed(e.to_string()))
    }

    /// Record `score` if it beats the stored best; true when it did
    pub fn save_high_score(&mut self, score: u64) -> Result<bool, GameError> {
        if score <= self.high_score()? {
            return Ok(false);
        }
        self.store
            .set(keys::HIGH_SCORE, &score.to_string())
            .map_err(|e| GameError::SaveFailed(e.to_string()))?;
        Ok(true)
    }

    pub fn high_score(&self) -> Result<u64, GameError> {
        let value = self
            .store
            .get(keys::HIGH_SCORE)
            .map_err(|e| GameError::LoadFailed(e.to_string()))?;
        Ok(value.and_then(|v| v.trim().parse().ok()).unwrap_or(0))
    }

    /// Chosen theme, the default theme when unset
    pub fn current_theme(&self) -> Result<String, GameError> {
        let value = self
            .store
            .get(keys::CURRENT_THEME)
            .map_err(|e| GameError::LoadFailed(e.to_string()))?;
        Ok(value
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_THEME.to_string()))
    }

    pub fn set_current_theme(&mut self, theme: &str) -> Result<(), GameError> {
        self.store
            .set(keys::CURRENT_THEME, theme)
            .map_err(|e| GameError::SaveFailed(e.to_string()))
    }

    /// Remove every key this adapter owns
    pub fn clear_all(&mut self) -> Result<(), GameError> {
        for key in keys::ALL {
            self.store
                .remove(key)
                .map_err(|e| GameError::SaveFailed(e.to_string()))?;
        }
        Ok(())
    }
}
