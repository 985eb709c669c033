//! Configuration errors
//!
//! Anything in here means a table or config file is wrong. The run must not
//! start; runtime numeric edge cases are absorbed inside `sim` instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown enemy archetype tag `{0}`")]
    UnknownEnemyKind(String),
    #[error("unknown power-up tag `{0}`")]
    UnknownPowerUpKind(String),
    #[error("spawn schedule entry {index}: {reason}")]
    InvalidSchedule { index: usize, reason: &'static str },
    #[error("malformed config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
}
