//! Enemy archetypes and their behaviour
//!
//! Each archetype is a variant of `EnemyBehavior` carrying only the state it
//! needs. `Enemy::update` advances movement and fire timers and reports what
//! the orchestrator should do; it never touches other entities.

use std::f32::consts::TAU;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::balance::*;
use super::collision::Rect;
use super::state::{Shot, is_outside_playfield};
use crate::consts::{PLAYFIELD_MARGIN, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::error::ConfigError;
use crate::heading;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    Chaser,
    Turret,
    Sine,
}

impl EnemyKind {
    pub fn max_health(&self) -> f32 {
        match self {
            Self::Chaser => CHASER_HEALTH,
            Self::Turret => TURRET_HEALTH,
            Self::Sine => SINE_HEALTH,
        }
    }

    pub fn score(&self) -> u64 {
        match self {
            Self::Chaser => CHASER_SCORE,
            Self::Turret => TURRET_SCORE,
            Self::Sine => SINE_SCORE,
        }
    }

    /// Fire interval (ms); chasers never shoot
    pub fn fire_interval_ms(&self) -> Option<f32> {
        match self {
            Self::Chaser => None,
            Self::Turret => Some(TURRET_FIRE_MS),
            Self::Sine => Some(SINE_FIRE_MS),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chaser => "chaser",
            Self::Turret => "turret",
            Self::Sine => "sine",
        }
    }
}

impl FromStr for EnemyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chaser" => Ok(Self::Chaser),
            "turret" => Ok(Self::Turret),
            "sine" | "sine-flyer" => Ok(Self::Sine),
            _ => Err(ConfigError::UnknownEnemyKind(s.to_string())),
        }
    }
}

/// Chaser sub-phases, entered in order and never reversed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ChaserPhase {
    /// Carried left by the scroll, tracking the player vertically
    Approach,
    /// Free to move right toward the player, at most a quarter screen
    /// from `edge_x`
    Backtrack { edge_x: f32 },
    /// Running back to the edge to detonate
    Return,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemyBehavior {
    Chaser { phase: ChaserPhase },
    Turret,
    Sine { base_y: f32, elapsed_s: f32 },
}

/// What an enemy wants done after its update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyAction {
    Idle,
    Fire(Shot),
    /// Chaser reached the edge on its return run
    Detonate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub behavior: EnemyBehavior,
    pub pos: Vec2,
    pub health: f32,
    pub max_health: f32,
    /// Accumulates while on screen; fires when it reaches the interval
    pub fire_timer_ms: f32,
}

impl Enemy {
    pub fn spawn(kind: EnemyKind, pos: Vec2) -> Self {
        let behavior = match kind {
            EnemyKind::Chaser => EnemyBehavior::Chaser {
                phase: ChaserPhase::Approach,
            },
            EnemyKind::Turret => EnemyBehavior::Turret,
            EnemyKind::Sine => EnemyBehavior::Sine {
                // Keep the whole oscillation inside the playfield
                base_y: pos.y.clamp(
                    PLAYFIELD_MARGIN + SINE_AMPLITUDE,
                    SCREEN_HEIGHT - PLAYFIELD_MARGIN - SINE_AMPLITUDE,
                ),
                elapsed_s: 0.0,
            },
        };
        let pos = match behavior {
            EnemyBehavior::Sine { base_y, .. } => Vec2::new(pos.x, base_y),
            _ => pos,
        };
        Self {
            behavior,
            pos,
            health: kind.max_health(),
            max_health: kind.max_health(),
            fire_timer_ms: 0.0,
        }
    }

    pub fn kind(&self) -> EnemyKind {
        match self.behavior {
            EnemyBehavior::Chaser { .. } => EnemyKind::Chaser,
            EnemyBehavior::Turret => EnemyKind::Turret,
            EnemyBehavior::Sine { .. } => EnemyKind::Sine,
        }
    }

    pub fn chaser_phase(&self) -> Option<ChaserPhase> {
        match self.behavior {
            EnemyBehavior::Chaser { phase } => Some(phase),
            _ => None,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Subtract health, clamped at zero. Returns true if this killed it.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        if self.is_dead() || !amount.is_finite() || amount <= 0.0 {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        self.is_dead()
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.pos, Vec2::splat(ENEMY_RADIUS))
    }

    pub fn is_on_screen(&self) -> bool {
        self.bounds().intersects(&Rect::screen())
    }

    /// Left the playfield. Spawns wait off the right edge, so that side
    /// never culls.
    pub fn is_offscreen(&self) -> bool {
        self.pos.x <= SCREEN_WIDTH && is_outside_playfield(self.pos, ENEMY_RADIUS)
    }

    /// Advance one tick. `target` is the player's position, if trackable.
    pub fn update(&mut self, dt_ms: f32, target: Option<Vec2>) -> EnemyAction {
        let dt = dt_ms / 1000.0;

        match &mut self.behavior {
            EnemyBehavior::Chaser { phase } => {
                if let Some(t) = target {
                    self.pos.y = step_toward(self.pos.y, t.y, ENEMY_BASE_SPEED * dt);
                }
                match *phase {
                    ChaserPhase::Approach => {
                        self.pos.x -= SCROLL_SPEED * dt;
                        if self.pos.x <= CHASER_EDGE_X {
                            self.pos.x = CHASER_EDGE_X;
                            *phase = ChaserPhase::Backtrack { edge_x: self.pos.x };
                            log::debug!("chaser reached edge at y={:.0}", self.pos.y);
                        }
                    }
                    ChaserPhase::Backtrack { edge_x } => {
                        let limit = edge_x + CHASER_BACKTRACK_MAX;
                        // Needs a target to its right to have room to backtrack
                        match target.filter(|t| t.x > self.pos.x + 1.0) {
                            Some(t) => {
                                let goal = t.x.min(limit);
                                self.pos.x = (self.pos.x + ENEMY_BASE_SPEED * dt).min(goal);
                                if self.pos.x >= limit {
                                    *phase = ChaserPhase::Return;
                                }
                            }
                            None => *phase = ChaserPhase::Return,
                        }
                    }
                    ChaserPhase::Return => {
                        self.pos.x -= ENEMY_BASE_SPEED * CHASER_RETURN_SPEED_MULT * dt;
                        if self.pos.x <= CHASER_EDGE_X {
                            self.pos.x = CHASER_EDGE_X;
                            return EnemyAction::Detonate;
                        }
                    }
                }
                EnemyAction::Idle
            }
            EnemyBehavior::Turret => {
                self.pos.x -= ENEMY_BASE_SPEED * 0.5 * dt;
                self.tick_fire(dt_ms, target)
            }
            EnemyBehavior::Sine { base_y, elapsed_s } => {
                *elapsed_s += dt;
                let wave = (TAU * SINE_FREQUENCY_HZ * *elapsed_s).sin();
                self.pos.x -= ENEMY_BASE_SPEED * dt;
                self.pos.y = *base_y + SINE_AMPLITUDE * wave;
                self.tick_fire(dt_ms, None)
            }
        }
    }

    /// Fire-interval accumulator. `aim_at` = None shoots straight left.
    fn tick_fire(&mut self, dt_ms: f32, aim_at: Option<Vec2>) -> EnemyAction {
        let Some(interval) = self.kind().fire_interval_ms() else {
            return EnemyAction::Idle;
        };
        if !self.is_on_screen() {
            return EnemyAction::Idle;
        }
        self.fire_timer_ms += dt_ms;
        if self.fire_timer_ms < interval {
            return EnemyAction::Idle;
        }
        self.fire_timer_ms -= interval;

        let dir = aim_at
            .and_then(|t| heading(self.pos, t))
            .unwrap_or(Vec2::NEG_X);
        EnemyAction::Fire(Shot {
            pos: self.pos,
            vel: dir * ENEMY_BULLET_SPEED,
        })
    }
}

/// Move `from` toward `to` by at most `max_step`
fn step_toward(from: f32, to: f32, max_step: f32) -> f32 {
    let delta = to - from;
    if delta.abs() <= max_step {
        to
    } else {
        from + max_step * delta.signum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_DT_MS;

    fn run_until_action(
        enemy: &mut Enemy,
        target: Option<Vec2>,
        max_ticks: usize,
    ) -> Option<usize> {
        (0..max_ticks).find(|_| enemy.update(FRAME_DT_MS, target) == EnemyAction::Detonate)
    }

    #[test]
    fn tags_parse() {
        assert_eq!("chaser".parse::<EnemyKind>().unwrap(), EnemyKind::Chaser);
        assert_eq!("Turret".parse::<EnemyKind>().unwrap(), EnemyKind::Turret);
        assert_eq!("sine".parse::<EnemyKind>().unwrap(), EnemyKind::Sine);
        assert!(matches!(
            "blob".parse::<EnemyKind>(),
            Err(ConfigError::UnknownEnemyKind(_))
        ));
    }

    #[test]
    fn chaser_without_target_detonates_at_edge() {
        let mut chaser = Enemy::spawn(EnemyKind::Chaser, Vec2::new(1400.0, 300.0));

        // Approach: carried by the scroll until the edge
        let mut ticks = 0;
        while chaser.chaser_phase() == Some(ChaserPhase::Approach) {
            assert_eq!(chaser.update(FRAME_DT_MS, None), EnemyAction::Idle);
            ticks += 1;
            assert!(ticks < 10_000);
        }
        assert!((chaser.pos.x - CHASER_EDGE_X).abs() < 1e-3);
        assert!(matches!(chaser.chaser_phase(), Some(ChaserPhase::Backtrack { .. })));

        // No room to backtrack -> return -> detonate right at the edge
        assert_eq!(chaser.update(FRAME_DT_MS, None), EnemyAction::Idle);
        assert_eq!(chaser.chaser_phase(), Some(ChaserPhase::Return));
        assert_eq!(chaser.update(FRAME_DT_MS, None), EnemyAction::Detonate);
        assert_eq!(chaser.pos.x, CHASER_EDGE_X);
    }

    #[test]
    fn chaser_with_player_at_edge_cannot_backtrack() {
        let mut chaser = Enemy::spawn(EnemyKind::Chaser, Vec2::new(1400.0, 300.0));
        let player = Vec2::new(CHASER_EDGE_X, 300.0);
        let hit = run_until_action(&mut chaser, Some(player), 10_000);
        assert!(hit.is_some());
        assert!(chaser.pos.x <= CHASER_EDGE_X + 1e-3);
    }

    #[test]
    fn chaser_backtrack_is_bounded() {
        let mut chaser = Enemy::spawn(EnemyKind::Chaser, Vec2::new(60.0, 300.0));
        // Player far to the right: chaser backtracks but never past a quarter screen
        let player = Vec2::new(1000.0, 300.0);
        let mut max_x: f32 = 0.0;
        let mut saw_return = false;
        for _ in 0..2_000 {
            let action = chaser.update(FRAME_DT_MS, Some(player));
            max_x = max_x.max(chaser.pos.x);
            if chaser.chaser_phase() == Some(ChaserPhase::Return) {
                saw_return = true;
            }
            if action == EnemyAction::Detonate {
                break;
            }
        }
        assert!(saw_return);
        assert!(max_x <= CHASER_EDGE_X + CHASER_BACKTRACK_MAX + 1e-3);
        assert!(max_x >= CHASER_EDGE_X + CHASER_BACKTRACK_MAX - 1e-3);
    }

    #[test]
    fn chaser_tracks_player_vertically() {
        let mut chaser = Enemy::spawn(EnemyKind::Chaser, Vec2::new(800.0, 100.0));
        for _ in 0..120 {
            chaser.update(FRAME_DT_MS, Some(Vec2::new(150.0, 500.0)));
        }
        assert!(chaser.pos.y > 100.0);
        assert!(chaser.pos.y <= 500.0);
    }

    #[test]
    fn turret_fires_on_interval_when_visible() {
        let mut turret = Enemy::spawn(EnemyKind::Turret, Vec2::new(900.0, 300.0));
        let target = Some(Vec2::new(150.0, 300.0));
        let mut shots = Vec::new();
        let mut elapsed = 0.0;
        while elapsed < TURRET_FIRE_MS * 2.0 + 1.0 {
            if let EnemyAction::Fire(shot) = turret.update(10.0, target) {
                shots.push(shot);
            }
            elapsed += 10.0;
        }
        assert_eq!(shots.len(), 2);
        // Aimed at the player, i.e. leftwards
        assert!(shots[0].vel.x < 0.0);
        assert!((shots[0].vel.length() - ENEMY_BULLET_SPEED).abs() < 1e-2);
    }

    #[test]
    fn turret_holds_fire_offscreen() {
        let mut turret = Enemy::spawn(EnemyKind::Turret, Vec2::new(2000.0, 300.0));
        for _ in 0..500 {
            assert_eq!(turret.update(10.0, Some(Vec2::ZERO)), EnemyAction::Idle);
        }
    }

    #[test]
    fn sine_oscillates_around_base() {
        let mut sine = Enemy::spawn(EnemyKind::Sine, Vec2::new(1000.0, 360.0));
        let (mut lo, mut hi) = (f32::MAX, f32::MIN);
        for _ in 0..240 {
            sine.update(FRAME_DT_MS, None);
            lo = lo.min(sine.pos.y);
            hi = hi.max(sine.pos.y);
        }
        assert!(hi - lo > SINE_AMPLITUDE);
        assert!(hi <= 360.0 + SINE_AMPLITUDE + 1e-3);
        assert!(lo >= 360.0 - SINE_AMPLITUDE - 1e-3);
        assert!(sine.pos.x < 1000.0);
    }

    #[test]
    fn damage_clamps_at_zero() {
        let mut e = Enemy::spawn(EnemyKind::Sine, Vec2::new(500.0, 300.0));
        assert!(!e.apply_damage(1.0));
        assert!(e.apply_damage(100.0));
        assert_eq!(e.health, 0.0);
        assert!(!e.apply_damage(1.0));
        assert_eq!(e.health, 0.0);
    }
}
