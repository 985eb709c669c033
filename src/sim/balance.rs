//! Balance table
//!
//! Static tuning numbers. Pure data: the only code here is lookups.

use super::state::PowerUpKind;
use crate::consts::SCREEN_WIDTH;

// === Player ===

/// Player movement speed (px/s)
pub const PLAYER_SPEED: f32 = 420.0;
/// Player hitbox half extents (axis-aligned rectangle)
pub const PLAYER_HALF_WIDTH: f32 = 24.0;
pub const PLAYER_HALF_HEIGHT: f32 = 14.0;
pub const PLAYER_START_X: f32 = 150.0;
pub const PLAYER_START_Y: f32 = 360.0;
pub const START_LIVES: u8 = 3;
pub const MAX_LIVES: u8 = 5;
pub const START_BOMBS: u8 = 2;
pub const MAX_BOMBS: u8 = 9;
pub const START_SHIELDS: u8 = 1;
pub const MAX_SHIELDS: u8 = 5;
pub const MAX_WEAPON_TIER: u8 = 6;
/// i-frames after taking a hit (ms)
pub const INVULNERABLE_MS: f32 = 2000.0;
/// Active shield lifetime (ms)
pub const SHIELD_DURATION_MS: f32 = 5000.0;
/// Shield bubble radius around the player centre
pub const SHIELD_RADIUS: f32 = 56.0;
/// Fire held this long discharges a charge shot (ms)
pub const CHARGE_THRESHOLD_MS: f32 = 1200.0;
pub const CHARGE_DAMAGE_MULTIPLIER: f32 = 3.0;

// === Bullets ===

pub const PLAYER_BULLET_RADIUS: f32 = 5.0;
pub const ENEMY_BULLET_RADIUS: f32 = 6.0;
pub const ENEMY_BULLET_SPEED: f32 = 300.0;
pub const ENEMY_BULLET_DAMAGE: f32 = 1.0;

// === Weapon ===

/// Tabulated weapon tier (fire interval, damage, bullet speed)
#[derive(Debug, Clone, Copy)]
pub struct WeaponSpec {
    pub fire_rate_ms: f32,
    pub damage: f32,
    pub bullet_speed: f32,
}

pub const WEAPON_SPECS: [WeaponSpec; 4] = [
    WeaponSpec {
        fire_rate_ms: 250.0,
        damage: 1.0,
        bullet_speed: 600.0,
    },
    WeaponSpec {
        fire_rate_ms: 220.0,
        damage: 1.0,
        bullet_speed: 650.0,
    },
    WeaponSpec {
        fire_rate_ms: 200.0,
        damage: 1.5,
        bullet_speed: 700.0,
    },
    WeaponSpec {
        fire_rate_ms: 180.0,
        damage: 2.0,
        bullet_speed: 750.0,
    },
];
/// Per-tier change past the last tabulated tier
pub const WEAPON_FIRE_RATE_STEP_MS: f32 = -15.0;
pub const WEAPON_DAMAGE_STEP: f32 = 0.5;
pub const WEAPON_SPEED_STEP: f32 = 50.0;
/// Fire interval never drops below this (ms)
pub const WEAPON_MIN_FIRE_RATE_MS: f32 = 60.0;

// === Enemies ===

pub const ENEMY_BASE_SPEED: f32 = 150.0;
/// Background scroll speed that carries chasers during approach (px/s)
pub const SCROLL_SPEED: f32 = 120.0;
pub const ENEMY_RADIUS: f32 = 22.0;

pub const CHASER_HEALTH: f32 = 3.0;
pub const TURRET_HEALTH: f32 = 6.0;
pub const SINE_HEALTH: f32 = 2.0;

pub const CHASER_SCORE: u64 = 100;
pub const TURRET_SCORE: u64 = 150;
pub const SINE_SCORE: u64 = 120;

/// x at which a chaser turns around / detonates
pub const CHASER_EDGE_X: f32 = 50.0;
/// Furthest a chaser backtracks from its recorded edge point
pub const CHASER_BACKTRACK_MAX: f32 = SCREEN_WIDTH / 4.0;
pub const CHASER_RETURN_SPEED_MULT: f32 = 1.5;
pub const DETONATION_RADIUS: f32 = 90.0;

pub const TURRET_FIRE_MS: f32 = 1800.0;
pub const SINE_FIRE_MS: f32 = 2500.0;
pub const SINE_AMPLITUDE: f32 = 80.0;
pub const SINE_FREQUENCY_HZ: f32 = 0.5;

// === Boss ===

pub const BASE_BOSS_HEALTH: f32 = 100.0;
/// maxHealth multiplier by boss-defeat count at spawn time
pub const BOSS_HEALTH_MULTIPLIERS: [f32; 2] = [6.0, 18.0];
/// Phase-timer threshold (s) by boss-defeat count
pub const BOSS_SPAWN_TIMES: [f32; 2] = [50.0, 60.0];
/// Boss spawns this far in from the right edge
pub const BOSS_SPAWN_OFFSET_X: f32 = 200.0;
pub const BOSS_RADIUS: f32 = 80.0;
pub const BOSS_SPEED: f32 = 140.0;
/// (phase, HP ratio at or below which it is entered), highest phase first
pub const BOSS_PHASE_THRESHOLDS: [(u8, f32); 2] = [(2, 1.0 / 3.0), (1, 2.0 / 3.0)];
/// Fire interval by phase (ms)
pub const BOSS_FIRE_MS: [f32; 3] = [1500.0, 1200.0, 900.0];
pub const BOSS_BULLET_SPEED: f32 = 320.0;
/// Fan siblings in phase 1 travel a bit slower than the aimed shot
pub const BOSS_SIBLING_SPEED_MULT: f32 = 0.85;
pub const BOSS_BOB_AMPLITUDE: f32 = 120.0;
/// Bob angular frequency (rad/s)
pub const BOSS_BOB_FREQUENCY: f32 = 1.2;
pub const BOSS_SCORE: u64 = 5000;
pub const BOSSES_TO_WIN: u8 = 2;

// === Spawning ===

pub const SPAWN_RATE_ESCALATION: f32 = 1.5;
pub const SPAWN_COUNT_ESCALATION: f32 = 1.5;
/// Phase time between spawn-count escalations (s)
pub const SPAWN_COUNT_INTERVAL_S: f32 = 15.0;
/// Horizontal gap between enemies spawned by one schedule entry
pub const SPAWN_GROUP_SPACING_X: f32 = 60.0;

// === Power-ups and bombs ===

pub const POWERUP_RADIUS: f32 = 16.0;
pub const BOMB_RADIUS: f32 = 400.0;
pub const BOMB_ENEMY_DAMAGE: f32 = 10.0;
pub const BOMB_BOSS_DAMAGE: f32 = 25.0;

/// Cumulative drop thresholds, checked in order weapon, bomb, health, shield
#[derive(Debug, Clone, Copy)]
pub struct DropTable {
    pub weapon: f32,
    pub bomb: f32,
    pub health: f32,
    pub shield: f32,
}

impl DropTable {
    /// Map a `[0, 1)` roll onto a drop; rolls above every band drop nothing
    pub fn pick(&self, roll: f32) -> Option<PowerUpKind> {
        self.bands()
            .into_iter()
            .find(|&(_, threshold)| roll < threshold)
            .map(|(kind, _)| kind)
    }

    pub fn bands(&self) -> [(PowerUpKind, f32); 4] {
        [
            (PowerUpKind::Weapon, self.weapon),
            (PowerUpKind::Bomb, self.bomb),
            (PowerUpKind::Health, self.health),
            (PowerUpKind::Shield, self.shield),
        ]
    }
}

pub const ENEMY_DROPS: DropTable = DropTable {
    weapon: 0.08,
    bomb: 0.12,
    health: 0.15,
    shield: 0.20,
};

pub const BOSS_DROPS: DropTable = DropTable {
    weapon: 0.40,
    bomb: 0.65,
    health: 0.85,
    shield: 1.0,
};
