//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied frame delta, clamped
//! - Seeded RNG only
//! - Stable iteration order (arena slot order)
//! - No rendering, audio or platform dependencies

pub mod arena;
pub mod balance;
pub mod boss;
pub mod collision;
pub mod enemy;
pub mod event;
pub mod rng;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod weapon;

pub use arena::{Arena, Handle};
pub use boss::{Boss, BossPhase};
pub use collision::Rect;
pub use enemy::{ChaserPhase, Enemy, EnemyKind};
pub use event::{DestroyCause, EntityKind, GameEvent};
pub use rng::RandomSource;
pub use spawn::{SpawnSchedule, SpawnScheduler};
pub use state::{
    Bullet, BulletOwner, GamePhase, GameState, Player, PowerUp, PowerUpKind, RunStats, RunSummary,
};
pub use tick::{TickInput, autopilot, clamp_dt, tick};
pub use weapon::{WeaponStats, stats_for_tier};
