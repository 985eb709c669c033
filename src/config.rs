//! Run configuration
//!
//! Built once before a run and handed to `GameState::new`. Nothing in the
//! simulation reads ambient/global state; everything tunable per run is here.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_SEED, MAX_SEED};
use crate::error::ConfigError;
use crate::sim::spawn::{RawScheduleEntry, SpawnSchedule};

/// Per-run configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Requested seed. Kept raw so that negative, fractional or oversized
    /// values coming from a host can be rejected at this boundary.
    #[serde(default)]
    pub seed: Option<f64>,
    /// Player ignores all damage (debug/attract mode)
    #[serde(default)]
    pub god_mode: bool,
    /// Custom spawn table; `None` uses the built-in schedule
    #[serde(default)]
    pub schedule: Option<Vec<RawScheduleEntry>>,
}

impl RunConfig {
    /// Config with an explicit seed and everything else default
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed as f64),
            ..Self::default()
        }
    }

    /// Parse a config from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = serde_json::from_str(json)?;
        // Surface table mistakes now rather than mid-run
        config.spawn_schedule()?;
        Ok(config)
    }

    /// The seed this run will actually use
    pub fn resolved_seed(&self) -> u64 {
        sanitize_seed(self.seed)
    }

    /// Build the spawn schedule for this run
    pub fn spawn_schedule(&self) -> Result<SpawnSchedule, ConfigError> {
        match &self.schedule {
            Some(raw) => SpawnSchedule::from_raw(raw),
            None => Ok(SpawnSchedule::standard()),
        }
    }
}

/// Validate a host-supplied seed, falling back to [`DEFAULT_SEED`].
pub fn sanitize_seed(raw: Option<f64>) -> u64 {
    let Some(value) = raw else {
        return DEFAULT_SEED;
    };
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > MAX_SEED {
        log::warn!("Rejected seed {value}, using default {DEFAULT_SEED}");
        return DEFAULT_SEED;
    }
    value as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_seed_uses_default() {
        assert_eq!(sanitize_seed(None), DEFAULT_SEED);
        assert_eq!(RunConfig::default().resolved_seed(), DEFAULT_SEED);
    }

    #[test]
    fn invalid_seeds_fall_back() {
        assert_eq!(sanitize_seed(Some(-1.0)), DEFAULT_SEED);
        assert_eq!(sanitize_seed(Some(3.5)), DEFAULT_SEED);
        assert_eq!(sanitize_seed(Some(f64::NAN)), DEFAULT_SEED);
        assert_eq!(sanitize_seed(Some(f64::INFINITY)), DEFAULT_SEED);
        assert_eq!(sanitize_seed(Some(1e300)), DEFAULT_SEED);
    }

    #[test]
    fn valid_seed_passes_through() {
        assert_eq!(sanitize_seed(Some(0.0)), 0);
        assert_eq!(sanitize_seed(Some(777.0)), 777);
        assert_eq!(RunConfig::with_seed(42).resolved_seed(), 42);
    }

    #[test]
    fn from_json_reads_fields() {
        let config = RunConfig::from_json(r#"{ "seed": 99, "god_mode": true }"#).unwrap();
        assert_eq!(config.resolved_seed(), 99);
        assert!(config.god_mode);
        assert!(config.schedule.is_none());
    }

    #[test]
    fn from_json_rejects_unknown_archetype() {
        let json = r#"{ "schedule": [ { "time": 1.0, "kind": "dragon", "x": 1300.0 } ] }"#;
        let err = RunConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownEnemyKind(ref tag) if tag == "dragon"));
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(matches!(
            RunConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
