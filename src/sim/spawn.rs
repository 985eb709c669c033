//! Spawn scheduling
//!
//! A time-indexed table of enemy entries, replayed against a phase clock that
//! restarts after the first boss and speeds up after every boss. The
//! scheduler only decides *what* to spawn; `tick` instantiates it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::balance::*;
use super::enemy::EnemyKind;
use super::rng::RandomSource;
use crate::consts::{PLAYFIELD_MARGIN, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::error::ConfigError;

/// Seconds of silence appended after the last entry before the table wraps
const SCHEDULE_TAIL_S: f32 = 2.0;

/// Schedule entry as written in a config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawScheduleEntry {
    pub time: f32,
    pub kind: String,
    pub x: f32,
    #[serde(default)]
    pub y: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleEntry {
    /// Offset into the phase, seconds
    pub time: f32,
    pub kind: EnemyKind,
    pub x: f32,
    /// Fixed height, or `None` for a random one inside the playfield
    pub y: Option<f32>,
}

impl ScheduleEntry {
    pub fn new(time: f32, kind: EnemyKind, y: Option<f32>) -> Self {
        Self {
            time,
            kind,
            x: default_spawn_x(kind),
            y,
        }
    }
}

/// Entry x for the built-in table, just past the right edge
fn default_spawn_x(kind: EnemyKind) -> f32 {
    match kind {
        EnemyKind::Chaser => SCREEN_WIDTH + 120.0,
        EnemyKind::Turret => SCREEN_WIDTH + 40.0,
        EnemyKind::Sine => SCREEN_WIDTH + 70.0,
    }
}

const STANDARD_TABLE: [(f32, EnemyKind, Option<f32>); 26] = [
    (1.0, EnemyKind::Sine, None),
    (2.5, EnemyKind::Sine, None),
    (4.0, EnemyKind::Chaser, None),
    (5.5, EnemyKind::Turret, Some(180.0)),
    (7.0, EnemyKind::Sine, None),
    (8.5, EnemyKind::Chaser, None),
    (10.0, EnemyKind::Turret, Some(540.0)),
    (11.5, EnemyKind::Sine, None),
    (13.0, EnemyKind::Chaser, None),
    (14.5, EnemyKind::Sine, Some(360.0)),
    (16.0, EnemyKind::Turret, None),
    (17.5, EnemyKind::Chaser, None),
    (19.0, EnemyKind::Sine, None),
    (21.0, EnemyKind::Turret, Some(200.0)),
    (22.0, EnemyKind::Turret, Some(520.0)),
    (24.0, EnemyKind::Chaser, None),
    (25.5, EnemyKind::Sine, None),
    (27.0, EnemyKind::Chaser, None),
    (29.0, EnemyKind::Turret, None),
    (31.0, EnemyKind::Sine, Some(250.0)),
    (32.5, EnemyKind::Sine, Some(470.0)),
    (34.0, EnemyKind::Chaser, None),
    (36.5, EnemyKind::Turret, None),
    (39.0, EnemyKind::Chaser, None),
    (42.0, EnemyKind::Sine, None),
    (45.0, EnemyKind::Turret, Some(360.0)),
];

/// Validated, time-sorted spawn table
#[derive(Debug, Clone)]
pub struct SpawnSchedule {
    entries: Vec<ScheduleEntry>,
    span: f32,
}

impl SpawnSchedule {
    pub fn new(mut entries: Vec<ScheduleEntry>) -> Result<Self, ConfigError> {
        for (index, e) in entries.iter().enumerate() {
            if !e.time.is_finite() || e.time < 0.0 {
                return Err(ConfigError::InvalidSchedule {
                    index,
                    reason: "time must be finite and non-negative",
                });
            }
            if !e.x.is_finite() {
                return Err(ConfigError::InvalidSchedule {
                    index,
                    reason: "x must be finite",
                });
            }
            if e.y.is_some_and(|y| !y.is_finite()) {
                return Err(ConfigError::InvalidSchedule {
                    index,
                    reason: "y must be finite",
                });
            }
        }
        entries.sort_by(|a, b| a.time.total_cmp(&b.time));
        let span = entries
            .last()
            .map_or(0.0, |last| last.time + SCHEDULE_TAIL_S);
        Ok(Self { entries, span })
    }

    /// The built-in table
    pub fn standard() -> Self {
        // Already sorted and finite
        let entries: Vec<ScheduleEntry> = STANDARD_TABLE
            .iter()
            .map(|&(time, kind, y)| ScheduleEntry::new(time, kind, y))
            .collect();
        let span = entries
            .last()
            .map_or(0.0, |last| last.time + SCHEDULE_TAIL_S);
        Self { entries, span }
    }

    pub fn from_raw(raw: &[RawScheduleEntry]) -> Result<Self, ConfigError> {
        let entries = raw
            .iter()
            .map(|r| {
                Ok(ScheduleEntry {
                    time: r.time,
                    kind: r.kind.parse()?,
                    x: r.x,
                    y: r.y,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Self::new(entries)
    }

    /// Load a table from a JSON array of entries
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: Vec<RawScheduleEntry> = serde_json::from_str(json)?;
        Self::from_raw(&raw)
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// Wrap length in seconds: last entry plus a short tail
    pub fn span(&self) -> f32 {
        self.span
    }
}

/// Something the scheduler wants instantiated this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnOrder {
    Enemy { kind: EnemyKind, pos: Vec2 },
    Boss { pos: Vec2, max_health: f32 },
}

/// World facts the scheduler reads but does not own
#[derive(Debug, Clone, Copy, Default)]
pub struct SpawnContext {
    pub boss_live: bool,
    pub boss_defeats: u8,
}

#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    schedule: SpawnSchedule,
    /// Seconds since run start or the first boss defeat
    phase_time_s: f32,
    /// Schedule clock at the previous evaluation
    last_checked: f32,
    rate_multiplier: f32,
    count_multiplier: f32,
    last_count_increase_s: f32,
    /// Set by the first boss defeat; the next evaluation catches up from zero
    reset_pending: bool,
    /// A boss has been ordered and not yet defeated
    boss_gated: bool,
}

impl SpawnScheduler {
    pub fn new(schedule: SpawnSchedule) -> Self {
        Self {
            schedule,
            phase_time_s: 0.0,
            last_checked: 0.0,
            rate_multiplier: 1.0,
            count_multiplier: 1.0,
            last_count_increase_s: 0.0,
            reset_pending: false,
            boss_gated: false,
        }
    }

    /// Move the phase clock. Frozen while a boss is live.
    pub fn advance(&mut self, dt_s: f32, boss_live: bool) {
        if boss_live || self.boss_gated {
            return;
        }
        self.phase_time_s += dt_s;
    }

    /// Orders due at the current phase time. Calling again without
    /// advancing returns nothing.
    pub fn update(&mut self, ctx: SpawnContext, rng: &mut RandomSource) -> Vec<SpawnOrder> {
        let defeats = ctx.boss_defeats as usize;
        if defeats >= BOSSES_TO_WIN as usize || ctx.boss_live || self.boss_gated {
            return Vec::new();
        }

        if self.phase_time_s >= BOSS_SPAWN_TIMES[defeats] {
            self.boss_gated = true;
            let pos = Vec2::new(SCREEN_WIDTH - BOSS_SPAWN_OFFSET_X, SCREEN_HEIGHT * 0.5);
            let max_health = BASE_BOSS_HEALTH * BOSS_HEALTH_MULTIPLIERS[defeats];
            log::info!(
                "Boss {} due at phase {:.2}s (hp {max_health})",
                defeats + 1,
                self.phase_time_s
            );
            return vec![SpawnOrder::Boss { pos, max_health }];
        }

        while self.phase_time_s - self.last_count_increase_s >= SPAWN_COUNT_INTERVAL_S {
            self.count_multiplier *= SPAWN_COUNT_ESCALATION;
            self.last_count_increase_s += SPAWN_COUNT_INTERVAL_S;
            log::debug!("spawn count multiplier -> {}", self.count_multiplier);
        }

        let clock = self.phase_time_s * self.rate_multiplier;
        if !clock.is_finite() {
            log::warn!("Non-finite schedule clock, skipping spawns");
            return Vec::new();
        }

        let due = self.due_entries(clock, defeats >= 1);
        self.last_checked = clock;

        let mut orders = Vec::new();
        for entry in due {
            self.expand(entry, rng, &mut orders);
        }
        orders
    }

    fn due_entries(&mut self, clock: f32, may_wrap: bool) -> Vec<ScheduleEntry> {
        let entries = self.schedule.entries();
        let span = self.schedule.span();

        if self.reset_pending {
            self.reset_pending = false;
            return entries.iter().filter(|e| e.time <= clock).copied().collect();
        }

        if may_wrap && span > 0.0 && clock > span {
            let now = clock % span;
            let last = self.last_checked % span;
            let same_cycle = (self.last_checked / span).floor() == (clock / span).floor();
            return entries
                .iter()
                .filter(|e| {
                    if same_cycle {
                        e.time > last && e.time <= now
                    } else {
                        e.time > last || e.time <= now
                    }
                })
                .copied()
                .collect();
        }

        let last = self.last_checked;
        entries
            .iter()
            .filter(|e| e.time > last && e.time <= clock)
            .copied()
            .collect()
    }

    fn expand(&self, entry: ScheduleEntry, rng: &mut RandomSource, out: &mut Vec<SpawnOrder>) {
        let scaled = self.count_multiplier.round();
        if !scaled.is_finite() {
            log::warn!("Non-finite spawn count for {:?} entry, skipped", entry.kind);
            return;
        }
        let count = (scaled as u32).max(1);
        for i in 0..count {
            let x = entry.x + SPAWN_GROUP_SPACING_X * i as f32;
            let y = entry.y.unwrap_or_else(|| {
                rng.range(PLAYFIELD_MARGIN, SCREEN_HEIGHT - PLAYFIELD_MARGIN)
            });
            if !x.is_finite() || !y.is_finite() {
                log::warn!("Non-finite spawn position for {:?} entry, skipped", entry.kind);
                continue;
            }
            out.push(SpawnOrder::Enemy {
                kind: entry.kind,
                pos: Vec2::new(x, y),
            });
        }
    }

    /// Called once per boss defeat with the updated defeat count
    pub fn on_boss_defeated(&mut self, defeats: u8) {
        self.rate_multiplier *= SPAWN_RATE_ESCALATION;
        if defeats == 1 {
            self.phase_time_s = 0.0;
            self.last_checked = 0.0;
            self.last_count_increase_s = 0.0;
            self.reset_pending = true;
        }
        self.boss_gated = false;
        log::debug!("spawn rate multiplier -> {}", self.rate_multiplier);
    }

    pub fn phase_time_s(&self) -> f32 {
        self.phase_time_s
    }

    pub fn rate_multiplier(&self) -> f32 {
        self.rate_multiplier
    }

    pub fn count_multiplier(&self) -> f32 {
        self.count_multiplier
    }

    pub fn is_boss_gated(&self) -> bool {
        self.boss_gated
    }
}
