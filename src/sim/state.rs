//! Game state and core simulation types
//!
//! Everything a run needs lives in `GameState`; entities are plain records
//! stored in arenas owned by it. No record refers to another record.

use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arena::Arena;
use super::balance::*;
use super::boss::Boss;
use super::collision::Rect;
use super::enemy::Enemy;
use super::event::GameEvent;
use super::rng::RandomSource;
use super::spawn::{SpawnSchedule, SpawnScheduler};
use super::weapon::{WeaponStats, stats_for_tier};
use crate::config::RunConfig;
use crate::consts::{OFFSCREEN_MARGIN, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::error::ConfigError;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Full freeze: no timers, no spawns, no collisions
    Paused,
    GameOver,
    Victory,
}

/// The player ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub lives: u8,
    pub weapon_tier: u8,
    pub bombs: u8,
    pub shields: u8,
    /// Remaining i-frames (ms)
    pub invulnerable_ms: f32,
    /// Remaining active-shield time (ms)
    pub shield_ms: f32,
    /// Time fire has been held since the last release or discharge (ms)
    pub charge_ms: f32,
    /// Time until the next regular volley may fire (ms)
    pub fire_cooldown_ms: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(PLAYER_START_X, PLAYER_START_Y),
            lives: START_LIVES,
            weapon_tier: 0,
            bombs: START_BOMBS,
            shields: START_SHIELDS,
            invulnerable_ms: 0.0,
            shield_ms: 0.0,
            charge_ms: 0.0,
            fire_cooldown_ms: 0.0,
        }
    }
}

impl Player {
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_ms > 0.0
    }

    pub fn is_shielded(&self) -> bool {
        self.shield_ms > 0.0
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.pos, Vec2::new(PLAYER_HALF_WIDTH, PLAYER_HALF_HEIGHT))
    }

    pub fn weapon_stats(&self) -> WeaponStats {
        stats_for_tier(self.weapon_tier as u32)
    }

    /// Count down i-frames, shield and fire cooldown.
    /// Returns true when the shield ran out during this call.
    pub fn tick_timers(&mut self, dt_ms: f32) -> bool {
        self.invulnerable_ms = (self.invulnerable_ms - dt_ms).max(0.0);
        self.fire_cooldown_ms = (self.fire_cooldown_ms - dt_ms).max(0.0);
        let was_shielded = self.is_shielded();
        self.shield_ms = (self.shield_ms - dt_ms).max(0.0);
        was_shielded && !self.is_shielded()
    }

    /// Lose a life and start i-frames. No-op while invulnerable.
    pub fn take_hit(&mut self) -> bool {
        if self.is_invulnerable() {
            return false;
        }
        self.lives = self.lives.saturating_sub(1);
        self.invulnerable_ms = INVULNERABLE_MS;
        true
    }

    /// Start the shield if one is in stock and none is running
    pub fn activate_shield(&mut self) -> bool {
        if self.shields == 0 || self.is_shielded() {
            return false;
        }
        self.shields -= 1;
        self.shield_ms = SHIELD_DURATION_MS;
        true
    }

    /// Apply a power-up, returning the resulting stat value
    pub fn collect(&mut self, kind: PowerUpKind, value: u8) -> u8 {
        match kind {
            PowerUpKind::Weapon => {
                self.weapon_tier = self.weapon_tier.saturating_add(value).min(MAX_WEAPON_TIER);
                self.weapon_tier
            }
            PowerUpKind::Bomb => {
                self.bombs = self.bombs.saturating_add(value).min(MAX_BOMBS);
                self.bombs
            }
            PowerUpKind::Health => {
                self.lives = self.lives.saturating_add(value).min(MAX_LIVES);
                self.lives
            }
            PowerUpKind::Shield => {
                self.shields = self.shields.saturating_add(value).min(MAX_SHIELDS);
                self.shields
            }
        }
    }
}

/// Which side fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Enemy,
}

/// A bullet about to be created (from an enemy or boss fire pattern)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub pos: Vec2,
    pub vel: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub radius: f32,
    pub owner: BulletOwner,
}

impl Bullet {
    pub fn player(pos: Vec2, vel: Vec2, damage: f32) -> Self {
        Self {
            pos,
            vel,
            damage,
            radius: PLAYER_BULLET_RADIUS,
            owner: BulletOwner::Player,
        }
    }

    pub fn enemy(shot: Shot) -> Self {
        Self {
            pos: shot.pos,
            vel: shot.vel,
            damage: ENEMY_BULLET_DAMAGE,
            radius: ENEMY_BULLET_RADIUS,
            owner: BulletOwner::Enemy,
        }
    }

    pub fn is_offscreen(&self) -> bool {
        is_outside_playfield(self.pos, self.radius)
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerUpKind {
    Weapon,
    Bomb,
    Health,
    Shield,
}

impl PowerUpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::Weapon => "weapon",
            PowerUpKind::Bomb => "bomb",
            PowerUpKind::Health => "health",
            PowerUpKind::Shield => "shield",
        }
    }
}

impl FromStr for PowerUpKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weapon" => Ok(PowerUpKind::Weapon),
            "bomb" => Ok(PowerUpKind::Bomb),
            "health" => Ok(PowerUpKind::Health),
            "shield" => Ok(PowerUpKind::Shield),
            _ => Err(ConfigError::UnknownPowerUpKind(s.to_string())),
        }
    }
}

/// A collectible drifting left with the scroll
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub value: u8,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind, pos: Vec2) -> Self {
        Self { kind, pos, value: 1 }
    }

    pub fn drift(&mut self, dt_ms: f32) {
        self.pos.x -= SCROLL_SPEED * dt_ms / 1000.0;
    }

    pub fn is_offscreen(&self) -> bool {
        is_outside_playfield(self.pos, POWERUP_RADIUS)
    }
}

/// Whether a round thing at `pos` has left the playfield (with slack)
pub fn is_outside_playfield(pos: Vec2, radius: f32) -> bool {
    pos.x + radius < -OFFSCREEN_MARGIN
        || pos.x - radius > SCREEN_WIDTH + OFFSCREEN_MARGIN
        || pos.y + radius < -OFFSCREEN_MARGIN
        || pos.y - radius > SCREEN_HEIGHT + OFFSCREEN_MARGIN
}

/// Tallies reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub kills: u32,
    pub self_destructs: u32,
    pub shots_fired: u32,
    pub hits_absorbed: u32,
    pub bombs_used: u32,
}

/// End-of-run (or snapshot) summary for hosts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub phase: GamePhase,
    pub score: u64,
    pub elapsed_ms: f64,
    pub boss_defeats: u8,
    pub lives: u8,
    pub weapon_tier: u8,
    pub stats: RunStats,
}

/// Pre-sized arena slots
const ENEMY_SLOTS: usize = 64;
const BULLET_SLOTS: usize = 512;
const POWERUP_SLOTS: usize = 32;

/// Complete game state for one run
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: RunConfig,
    /// Sanitised run seed
    pub seed: u64,
    pub rng: RandomSource,
    pub phase: GamePhase,
    pub player: Player,
    pub enemies: Arena<Enemy>,
    /// At most one boss is live at a time
    pub boss: Option<Boss>,
    pub bullets: Arena<Bullet>,
    pub powerups: Arena<PowerUp>,
    pub scheduler: SpawnScheduler,
    pub score: u64,
    /// Total simulated run time (ms)
    pub stage_time_ms: f64,
    /// Length of the current boss fight (ms), 0 when no boss is live
    pub boss_fight_ms: f32,
    pub boss_defeats: u8,
    pub time_ticks: u64,
    pub stats: RunStats,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a run from a config. Fails only on a bad spawn table.
    pub fn new(config: RunConfig) -> Result<Self, ConfigError> {
        let schedule = config.spawn_schedule()?;
        Ok(Self::build(config, schedule))
    }

    /// Default run with the given seed and the built-in schedule
    pub fn with_seed(seed: u64) -> Self {
        Self::build(RunConfig::with_seed(seed), SpawnSchedule::standard())
    }

    fn build(config: RunConfig, schedule: SpawnSchedule) -> Self {
        let seed = config.resolved_seed();
        log::info!("New run: seed={seed}, god_mode={}", config.god_mode);

        Self {
            seed,
            rng: RandomSource::new(seed),
            phase: GamePhase::Playing,
            player: Player::default(),
            enemies: Arena::with_capacity(ENEMY_SLOTS),
            boss: None,
            bullets: Arena::with_capacity(BULLET_SLOTS),
            powerups: Arena::with_capacity(POWERUP_SLOTS),
            scheduler: SpawnScheduler::new(schedule),
            score: 0,
            stage_time_ms: 0.0,
            boss_fight_ms: 0.0,
            boss_defeats: 0,
            time_ticks: 0,
            stats: RunStats::default(),
            events: Vec::new(),
            config,
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver | GamePhase::Victory)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events not yet drained
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn add_score(&mut self, delta: u64) {
        if delta == 0 {
            return;
        }
        self.score = self.score.saturating_add(delta);
        self.emit(GameEvent::ScoreChanged {
            score: self.score,
            delta,
        });
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            seed: self.seed,
            phase: self.phase,
            score: self.score,
            elapsed_ms: self.stage_time_ms,
            boss_defeats: self.boss_defeats,
            lives: self.player.lives,
            weapon_tier: self.player.weapon_tier,
            stats: self.stats.clone(),
        }
    }
}
