//! Nova Strike - side-scrolling arcade shooter core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, adversary AI, collisions, game state)
//! - `config`: Run configuration (seed, god mode, custom spawn tables)
//! - `error`: Configuration error taxonomy
//!
//! Rendering, audio and menus live outside this crate and observe the
//! simulation only through [`sim::GameEvent`]s.

pub mod config;
pub mod error;
pub mod sim;

pub use config::RunConfig;
pub use error::ConfigError;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal frame delta (60 Hz host loop), milliseconds
    pub const FRAME_DT_MS: f32 = 1000.0 / 60.0;
    /// Smallest delta a tick will accept (ms)
    pub const MIN_DT_MS: f32 = 1.0;
    /// Largest delta a tick will accept; the first frame is often huge (ms)
    pub const MAX_DT_MS: f32 = 100.0;

    /// Playfield dimensions
    pub const SCREEN_WIDTH: f32 = 1280.0;
    pub const SCREEN_HEIGHT: f32 = 720.0;
    /// Distance from the screen edge the player and spawns keep
    pub const PLAYFIELD_MARGIN: f32 = 50.0;
    /// How far outside the screen an entity may travel before being culled
    pub const OFFSCREEN_MARGIN: f32 = 150.0;

    /// Seed used when none (or an invalid one) is supplied
    pub const DEFAULT_SEED: u64 = 12345;
    /// Largest accepted seed (integers above this lose precision as f64)
    pub const MAX_SEED: f64 = 9_007_199_254_740_991.0;
}

/// Unit heading from `from` toward `to`, or `None` when the points coincide.
#[inline]
pub fn heading(from: Vec2, to: Vec2) -> Option<Vec2> {
    (to - from).try_normalize()
}

/// Unit vector for an angle given in degrees (0° = +x, screen space)
#[inline]
pub fn dir_from_degrees(deg: f32) -> Vec2 {
    Vec2::from_angle(deg.to_radians())
}

/// Angle of a direction vector in degrees
#[inline]
pub fn degrees_of(dir: Vec2) -> f32 {
    dir.y.atan2(dir.x).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_is_none_for_coincident_points() {
        let p = Vec2::new(10.0, 10.0);
        assert!(heading(p, p).is_none());
        let h = heading(Vec2::ZERO, Vec2::new(3.0, 4.0)).unwrap();
        assert!((h.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn degrees_round_trip() {
        let d = dir_from_degrees(90.0);
        assert!(d.x.abs() < 1e-5);
        assert!((d.y - 1.0).abs() < 1e-5);
        assert!((degrees_of(dir_from_degrees(-30.0)) + 30.0).abs() < 1e-3);
    }
}
