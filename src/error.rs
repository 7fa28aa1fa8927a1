//! Error kinds surfaced by the game core

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The key-value store could not be opened
    #[error("local storage is not available")]
    StorageUnavailable,
    /// Theme name not present in the catalog
    #[error("invalid theme selected: {0}")]
    InvalidTheme(String),
    #[error("failed to load game state: {0}")]
    LoadFailed(String),
    #[error("failed to save game state: {0}")]
    SaveFailed(String),
    /// Engine-level fault (unknown body, rejected operation)
    #[error("physics engine error: {0}")]
    Physics(String),
}
