//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time
//! - RNG seeds
//! - Storage (LocalStorage on web, in-memory natively)

pub mod storage;

pub use storage::{KeyValueStore, MemoryStore, StoreError};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStore;

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Seed for a new run
pub fn random_seed() -> u64 {
    now_ms() as u64
}
