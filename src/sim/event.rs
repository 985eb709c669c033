//! Simulation output events
//!
//! The only channel presentation layers (renderer, audio, HUD) get. Events
//! are appended during a tick in the order things happened and drained by
//! the host with `GameState::drain_events`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arena::Handle;
use super::enemy::EnemyKind;
use super::state::{BulletOwner, PowerUpKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Enemy(EnemyKind),
    Boss,
    PowerUp(PowerUpKind),
    Bullet(BulletOwner),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestroyCause {
    Killed,
    OffScreen,
    SelfDestruct,
    Collected,
    /// Bullet struck its target
    Hit,
    /// Bullet stopped by the shield
    Absorbed,
    /// Bullet wiped by a bomb or a chaser blast
    Cleared,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EntitySpawned {
        kind: EntityKind,
        /// `None` for the boss, which lives outside the arenas
        handle: Option<Handle>,
        pos: Vec2,
    },
    EntityDestroyed {
        kind: EntityKind,
        handle: Option<Handle>,
        cause: DestroyCause,
        pos: Vec2,
    },
    /// One volley. Every bullet in it starts at `origin`.
    BulletFired {
        owner: BulletOwner,
        origin: Vec2,
        handles: Vec<Handle>,
        charged: bool,
    },
    ScoreChanged {
        score: u64,
        delta: u64,
    },
    /// `stat` is the player's resulting value (tier, bombs, lives or shields)
    PowerUpCollected {
        kind: PowerUpKind,
        stat: u8,
    },
    BossPhaseChanged {
        phase: u8,
    },
    BossDefeated {
        defeats: u8,
    },
    PlayerDamaged {
        lives: u8,
    },
    ShieldAbsorbedHit,
    ShieldActivated {
        shields_left: u8,
    },
    ShieldExpired,
    BombDetonated {
        enemies_hit: u32,
        bullets_cleared: u32,
    },
    PauseToggled {
        paused: bool,
    },
    GameOver {
        score: u64,
        elapsed_ms: f64,
    },
    Victory {
        score: u64,
        elapsed_ms: f64,
    },
}
