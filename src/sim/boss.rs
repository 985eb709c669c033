//! Boss behaviour
//!
//! Three HP-gated phases, each with its own movement law and fire pattern.
//! The phase only ever moves forward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::balance::*;
use super::state::Shot;
use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::{degrees_of, dir_from_degrees, heading};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BossPhase {
    /// Sinusoidal bob around the spawn height, 3-shot burst
    Bob,
    /// Slow homing, aimed shot plus a 5-way fan
    Pursuit,
    /// Full-speed homing, dense 12-shot pattern
    Frenzy,
}

impl BossPhase {
    pub fn index(&self) -> u8 {
        match self {
            Self::Bob => 0,
            Self::Pursuit => 1,
            Self::Frenzy => 2,
        }
    }

    pub fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Bob,
            1 => Self::Pursuit,
            _ => Self::Frenzy,
        }
    }

    pub fn fire_interval_ms(&self) -> f32 {
        BOSS_FIRE_MS[self.index() as usize]
    }

    /// Phase for a health ratio, never lower than `current`.
    /// Thresholds are checked highest phase first.
    pub fn for_health_ratio(ratio: f32, current: BossPhase) -> BossPhase {
        BOSS_PHASE_THRESHOLDS
            .iter()
            .find(|&&(phase, threshold)| phase > current.index() && ratio <= threshold)
            .map(|&(phase, _)| BossPhase::from_index(phase))
            .unwrap_or(current)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub pos: Vec2,
    /// Centre line of the phase-0 bob
    pub spawn_y: f32,
    pub health: f32,
    pub max_health: f32,
    pub phase: BossPhase,
    pub fire_timer_ms: f32,
    /// Seconds since spawn
    pub elapsed_s: f32,
}

impl Boss {
    pub fn spawn(pos: Vec2, max_health: f32) -> Self {
        Self {
            pos,
            spawn_y: pos.y,
            health: max_health,
            max_health,
            phase: BossPhase::Bob,
            fire_timer_ms: 0.0,
            elapsed_s: 0.0,
        }
    }

    pub fn health_ratio(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        self.health / self.max_health
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0.0
    }

    /// Subtract health (clamped at zero) and re-evaluate the phase.
    /// Returns the new phase if it changed.
    pub fn apply_damage(&mut self, amount: f32) -> Option<BossPhase> {
        if !amount.is_finite() || amount <= 0.0 {
            return None;
        }
        self.health = (self.health - amount).max(0.0);
        let next = BossPhase::for_health_ratio(self.health_ratio(), self.phase);
        if next > self.phase {
            log::debug!("boss phase {} -> {}", self.phase.index(), next.index());
            self.phase = next;
            self.fire_timer_ms = 0.0;
            return Some(next);
        }
        None
    }

    /// Move and run the fire timer. Returns the shots fired this tick.
    pub fn update(&mut self, dt_ms: f32, target: Vec2) -> Vec<Shot> {
        let dt = dt_ms / 1000.0;
        self.elapsed_s += dt;

        match self.phase {
            BossPhase::Bob => {
                self.pos.y =
                    self.spawn_y + (self.elapsed_s * BOSS_BOB_FREQUENCY).sin() * BOSS_BOB_AMPLITUDE;
            }
            BossPhase::Pursuit => self.home(target, BOSS_SPEED * 0.5 * dt),
            BossPhase::Frenzy => self.home(target, BOSS_SPEED * dt),
        }
        self.pos.x = self.pos.x.clamp(SCREEN_WIDTH * 0.5, SCREEN_WIDTH - BOSS_RADIUS);
        self.pos.y = self.pos.y.clamp(BOSS_RADIUS, SCREEN_HEIGHT - BOSS_RADIUS);

        self.fire_timer_ms += dt_ms;
        let interval = self.phase.fire_interval_ms();
        if self.fire_timer_ms < interval {
            return Vec::new();
        }
        self.fire_timer_ms -= interval;
        fire_pattern(self.phase, self.pos, target)
    }

    fn home(&mut self, target: Vec2, step: f32) {
        // Coincident points: hold position this tick
        if let Some(dir) = heading(self.pos, target) {
            self.pos += dir * step.min(self.pos.distance(target));
        }
    }
}

/// Bullets for one volley of `phase`, fired from `origin` toward `target`
pub fn fire_pattern(phase: BossPhase, origin: Vec2, target: Vec2) -> Vec<Shot> {
    let aim = degrees_of(heading(origin, target).unwrap_or(Vec2::NEG_X));
    let shot = |offset: f32, speed: f32| Shot {
        pos: origin,
        vel: dir_from_degrees(aim + offset) * speed,
    };
    let sibling_speed = BOSS_BULLET_SPEED * BOSS_SIBLING_SPEED_MULT;

    match phase {
        BossPhase::Bob => [0.0, 30.0, -30.0]
            .into_iter()
            .map(|o| shot(o, BOSS_BULLET_SPEED))
            .collect(),
        BossPhase::Pursuit => std::iter::once(shot(0.0, BOSS_BULLET_SPEED))
            .chain(
                [-60.0, -30.0, 0.0, 30.0, 60.0]
                    .into_iter()
                    .map(|o| shot(o, sibling_speed)),
            )
            .collect(),
        BossPhase::Frenzy => [-6.0, 0.0, 6.0]
            .into_iter()
            .map(|o| shot(o, BOSS_BULLET_SPEED))
            .chain(
                [-54.0, -36.0, -18.0, 0.0, 18.0, 36.0, 54.0]
                    .into_iter()
                    .map(|o| shot(o, sibling_speed)),
            )
            .chain([60.0, -60.0].into_iter().map(|o| shot(o, BOSS_BULLET_SPEED)))
            .collect(),
    }
}
