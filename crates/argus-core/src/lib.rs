//! Argus Core - shared types for the ground-station decision pipeline

pub mod config;
pub mod error;
pub mod types;

pub use config::{AdvisorBackend, StationConfig};
pub use error::{Error, Result};
pub use types::*;

/// Seconds since the Unix epoch, as the fractional timestamp used on all
/// ledger and command records.
pub fn now_secs() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Short unique id for suggestions, commands, and change-log entries.
pub fn short_id() -> String {
    uuid::Uuid::new_v4().to_string()[..8].to_string()
}
