//! Per-tick simulation driver
//!
//! The only code that mutates entity collections. Step order is fixed:
//! timers, movement, firing, spawns, entity updates, collisions, win/loss.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arena::Handle;
use super::balance::*;
use super::boss::Boss;
use super::collision::{
    bullets_hitting_boss, circle_rect, entities_in_radius, first_bullet_enemy_hit,
    player_boss_contact, player_enemy_contact, player_hit_by_bullet, powerups_touching_player,
    shield_absorbs,
};
use super::enemy::{Enemy, EnemyAction};
use super::event::{DestroyCause, EntityKind, GameEvent};
use super::spawn::{SpawnContext, SpawnOrder};
use super::state::{Bullet, BulletOwner, GamePhase, GameState, PowerUp};
use super::weapon::{charged, spread_offsets};
use crate::consts::*;
use crate::dir_from_degrees;

/// Input snapshot for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Held
    pub fire: bool,
    /// Just pressed
    pub bomb: bool,
    /// Just pressed
    pub shield: bool,
    /// Just pressed
    pub pause: bool,
}

/// Clamp a host frame delta into the range the simulation accepts
pub fn clamp_dt(dt_ms: f32) -> f32 {
    if !dt_ms.is_finite() {
        return MIN_DT_MS;
    }
    dt_ms.clamp(MIN_DT_MS, MAX_DT_MS)
}

/// Advance the game state by one tick of `dt_ms` milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                state.emit(GameEvent::PauseToggled { paused: true });
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                state.emit(GameEvent::PauseToggled { paused: false });
            }
            _ => {}
        }
    }

    // Don't tick if paused or finished
    if state.phase != GamePhase::Playing {
        return;
    }

    let dt_ms = clamp_dt(dt_ms);
    let dt_s = dt_ms / 1000.0;
    state.time_ticks += 1;

    advance_timers(state, dt_ms);
    move_player(state, input, dt_s);
    resolve_actions(state, input, dt_ms);
    run_spawner(state);
    update_entities(state, dt_ms);
    resolve_collisions(state);
    check_end(state);
}

fn advance_timers(state: &mut GameState, dt_ms: f32) {
    state.stage_time_ms += dt_ms as f64;
    let boss_live = state.boss.is_some();
    if boss_live {
        state.boss_fight_ms += dt_ms;
    }
    state.scheduler.advance(dt_ms / 1000.0, boss_live);
    if state.player.tick_timers(dt_ms) {
        state.emit(GameEvent::ShieldExpired);
    }
}

fn move_player(state: &mut GameState, input: &TickInput, dt_s: f32) {
    let axis = |neg: bool, pos: bool| (pos as i32 - neg as i32) as f32;
    let dir = Vec2::new(axis(input.left, input.right), axis(input.up, input.down));
    let player = &mut state.player;
    player.pos += dir.normalize_or_zero() * PLAYER_SPEED * dt_s;

    let min = Vec2::splat(PLAYFIELD_MARGIN);
    let mut max = Vec2::new(
        SCREEN_WIDTH - PLAYFIELD_MARGIN,
        SCREEN_HEIGHT - PLAYFIELD_MARGIN,
    );
    // Stay clear of the boss body
    if let Some(boss) = &state.boss {
        max.x = (boss.pos.x - BOSS_RADIUS - PLAYER_HALF_WIDTH).clamp(min.x, max.x);
    }
    player.pos = player.pos.clamp(min, max);
}

/// Shield and bomb presses, then the fire button
fn resolve_actions(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    if input.shield && state.player.activate_shield() {
        let shields_left = state.player.shields;
        state.emit(GameEvent::ShieldActivated { shields_left });
    }
    if input.bomb && state.player.bombs > 0 {
        detonate_bomb(state);
    }
    fire_weapon(state, input.fire, dt_ms);
}

/// Regular volleys on cooldown while held; a charged volley discharges
/// once the hold reaches the charge threshold.
fn fire_weapon(state: &mut GameState, held: bool, dt_ms: f32) {
    let player = &mut state.player;
    if !held {
        player.charge_ms = 0.0;
        return;
    }
    player.charge_ms += dt_ms;

    let base = player.weapon_stats();
    let (stats, is_charged) = if player.charge_ms >= CHARGE_THRESHOLD_MS {
        player.charge_ms = 0.0;
        (charged(base, CHARGE_DAMAGE_MULTIPLIER), true)
    } else if player.fire_cooldown_ms <= 0.0 {
        (base, false)
    } else {
        return;
    };
    player.fire_cooldown_ms = base.fire_rate_ms;

    let origin = player.pos + Vec2::new(PLAYER_HALF_WIDTH, 0.0);
    let volley = spread_offsets(stats.bullet_count, stats.spread_deg)
        .into_iter()
        .map(|offset| {
            let vel = dir_from_degrees(offset) * stats.bullet_speed;
            Bullet::player(origin, vel, stats.damage)
        });
    state.stats.shots_fired += stats.bullet_count;
    fire_volley(state, BulletOwner::Player, origin, is_charged, volley);
}

/// Insert a volley and report it with the new handles
fn fire_volley(
    state: &mut GameState,
    owner: BulletOwner,
    origin: Vec2,
    charged: bool,
    bullets: impl IntoIterator<Item = Bullet>,
) {
    let handles: Vec<Handle> = bullets
        .into_iter()
        .map(|b| state.bullets.insert(b))
        .collect();
    if handles.is_empty() {
        return;
    }
    state.emit(GameEvent::BulletFired {
        owner,
        origin,
        handles,
        charged,
    });
}

fn remove_bullet(state: &mut GameState, handle: Handle, cause: DestroyCause) -> Option<Bullet> {
    let bullet = state.bullets.remove(handle)?;
    state.emit(GameEvent::EntityDestroyed {
        kind: EntityKind::Bullet(bullet.owner),
        handle: Some(handle),
        cause,
        pos: bullet.pos,
    });
    Some(bullet)
}

fn detonate_bomb(state: &mut GameState) {
    state.player.bombs -= 1;
    state.stats.bombs_used += 1;
    let center = state.player.pos;

    let cleared = entities_in_radius(&state.bullets, center, BOMB_RADIUS, |b| {
        b.owner == BulletOwner::Enemy
    });
    for h in &cleared {
        remove_bullet(state, *h, DestroyCause::Cleared);
    }

    let hit = entities_in_radius(&state.enemies, center, BOMB_RADIUS, |_| true);
    for h in &hit {
        let killed = state
            .enemies
            .get_mut(*h)
            .is_some_and(|e| e.apply_damage(BOMB_ENEMY_DAMAGE));
        if killed {
            kill_enemy(state, *h);
        }
    }

    if state
        .boss
        .as_ref()
        .is_some_and(|b| b.pos.distance(center) <= BOMB_RADIUS)
    {
        damage_boss(state, BOMB_BOSS_DAMAGE);
    }

    log::debug!("bomb: {} enemies hit, {} bullets cleared", hit.len(), cleared.len());
    state.emit(GameEvent::BombDetonated {
        enemies_hit: hit.len() as u32,
        bullets_cleared: cleared.len() as u32,
    });
}

fn run_spawner(state: &mut GameState) {
    let ctx = SpawnContext {
        boss_live: state.boss.is_some(),
        boss_defeats: state.boss_defeats,
    };
    for order in state.scheduler.update(ctx, &mut state.rng) {
        match order {
            SpawnOrder::Enemy { kind, pos } => {
                let enemy = Enemy::spawn(kind, pos);
                let pos = enemy.pos;
                let handle = state.enemies.insert(enemy);
                log::debug!("spawn {} at ({:.0}, {:.0})", kind.as_str(), pos.x, pos.y);
                state.emit(GameEvent::EntitySpawned {
                    kind: EntityKind::Enemy(kind),
                    handle: Some(handle),
                    pos,
                });
            }
            SpawnOrder::Boss { pos, max_health } => {
                state.boss = Some(Boss::spawn(pos, max_health));
                state.boss_fight_ms = 0.0;
                log::info!(
                    "Boss {} spawned at {:.1}s (hp {max_health})",
                    state.boss_defeats + 1,
                    state.stage_time_ms / 1000.0
                );
                state.emit(GameEvent::EntitySpawned {
                    kind: EntityKind::Boss,
                    handle: None,
                    pos,
                });
            }
        }
    }
}

fn update_entities(state: &mut GameState, dt_ms: f32) {
    let dt_s = dt_ms / 1000.0;
    let target = state.player.pos;

    // Bullets
    for (_, bullet) in state.bullets.iter_mut() {
        bullet.pos += bullet.vel * dt_s;
    }
    let gone: Vec<Handle> = state
        .bullets
        .iter()
        .filter(|(_, b)| b.is_offscreen())
        .map(|(h, _)| h)
        .collect();
    for h in gone {
        remove_bullet(state, h, DestroyCause::OffScreen);
    }

    // Enemies
    let mut detonations = Vec::new();
    for h in state.enemies.handles() {
        let Some(enemy) = state.enemies.get_mut(h) else {
            continue;
        };
        match enemy.update(dt_ms, Some(target)) {
            EnemyAction::Idle => {}
            EnemyAction::Fire(shot) => {
                fire_volley(state, BulletOwner::Enemy, shot.pos, false, [Bullet::enemy(shot)]);
            }
            EnemyAction::Detonate => detonations.push(h),
        }
    }
    for h in detonations {
        detonate_chaser(state, h);
    }
    let gone: Vec<Handle> = state
        .enemies
        .iter()
        .filter(|(_, e)| e.is_offscreen())
        .map(|(h, _)| h)
        .collect();
    for h in gone {
        let Some(enemy) = state.enemies.remove(h) else {
            continue;
        };
        state.emit(GameEvent::EntityDestroyed {
            kind: EntityKind::Enemy(enemy.kind()),
            handle: Some(h),
            cause: DestroyCause::OffScreen,
            pos: enemy.pos,
        });
    }

    // Boss
    if let Some(boss) = state.boss.as_mut() {
        let origin = boss.pos;
        let shots = boss.update(dt_ms, target);
        fire_volley(
            state,
            BulletOwner::Enemy,
            origin,
            false,
            shots.into_iter().map(Bullet::enemy),
        );
    }

    // Power-ups
    for (_, powerup) in state.powerups.iter_mut() {
        powerup.drift(dt_ms);
    }
    let gone: Vec<Handle> = state
        .powerups
        .iter()
        .filter(|(_, p)| p.is_offscreen())
        .map(|(h, _)| h)
        .collect();
    for h in gone {
        if let Some(p) = state.powerups.remove(h) {
            state.emit(GameEvent::EntityDestroyed {
                kind: EntityKind::PowerUp(p.kind),
                handle: Some(h),
                cause: DestroyCause::OffScreen,
                pos: p.pos,
            });
        }
    }
}

/// Chaser self-destruct at the edge: area check against the player and
/// nearby enemy bullets. Not a kill, so no score and no drop.
fn detonate_chaser(state: &mut GameState, handle: Handle) {
    let Some(enemy) = state.enemies.remove(handle) else {
        return;
    };
    let pos = enemy.pos;
    state.stats.self_destructs += 1;
    state.emit(GameEvent::EntityDestroyed {
        kind: EntityKind::Enemy(enemy.kind()),
        handle: Some(handle),
        cause: DestroyCause::SelfDestruct,
        pos,
    });

    for h in entities_in_radius(&state.bullets, pos, DETONATION_RADIUS, |b| {
        b.owner == BulletOwner::Enemy
    }) {
        remove_bullet(state, h, DestroyCause::Cleared);
    }

    if !state.player.is_shielded()
        && circle_rect(pos, DETONATION_RADIUS, &state.player.bounds())
    {
        damage_player(state);
    }
}

fn resolve_collisions(state: &mut GameState) {
    // Shield first: absorbed bullets never reach the player check
    for h in shield_absorbs(&state.player, &state.bullets) {
        remove_bullet(state, h, DestroyCause::Absorbed);
        state.stats.hits_absorbed += 1;
        state.emit(GameEvent::ShieldAbsorbedHit);
    }

    if let Some(h) = player_hit_by_bullet(&state.player, &state.bullets) {
        remove_bullet(state, h, DestroyCause::Hit);
        damage_player(state);
    }

    // One bullet, one enemy; repeat until nothing overlaps
    while let Some((bh, eh)) = first_bullet_enemy_hit(&state.bullets, &state.enemies) {
        let damage = remove_bullet(state, bh, DestroyCause::Hit).map_or(0.0, |b| b.damage);
        let killed = state
            .enemies
            .get_mut(eh)
            .is_some_and(|e| e.apply_damage(damage));
        if killed {
            kill_enemy(state, eh);
        }
    }

    let boss_hits = state
        .boss
        .as_ref()
        .map(|b| bullets_hitting_boss(&state.bullets, b))
        .unwrap_or_default();
    for h in boss_hits {
        if let Some(bullet) = remove_bullet(state, h, DestroyCause::Hit) {
            damage_boss(state, bullet.damage);
        }
        if state.boss.is_none() {
            break;
        }
    }

    if let Some(eh) = player_enemy_contact(&state.player, &state.enemies) {
        damage_player(state);
        kill_enemy(state, eh);
    }

    if state
        .boss
        .as_ref()
        .is_some_and(|b| player_boss_contact(&state.player, b))
    {
        damage_player(state);
    }

    for h in powerups_touching_player(&state.player, &state.powerups) {
        let Some(powerup) = state.powerups.remove(h) else {
            continue;
        };
        let stat = state.player.collect(powerup.kind, powerup.value);
        log::debug!("collected {} -> {stat}", powerup.kind.as_str());
        state.emit(GameEvent::PowerUpCollected {
            kind: powerup.kind,
            stat,
        });
        state.emit(GameEvent::EntityDestroyed {
            kind: EntityKind::PowerUp(powerup.kind),
            handle: Some(h),
            cause: DestroyCause::Collected,
            pos: powerup.pos,
        });
    }
}

fn damage_player(state: &mut GameState) {
    if state.config.god_mode {
        return;
    }
    if state.player.take_hit() {
        let lives = state.player.lives;
        log::debug!("player hit, {lives} lives left");
        state.emit(GameEvent::PlayerDamaged { lives });
    }
}

/// Remove a dead enemy: score, event, then one drop roll
fn kill_enemy(state: &mut GameState, handle: Handle) {
    let Some(enemy) = state.enemies.remove(handle) else {
        return;
    };
    let kind = enemy.kind();
    state.stats.kills += 1;
    state.emit(GameEvent::EntityDestroyed {
        kind: EntityKind::Enemy(kind),
        handle: Some(handle),
        cause: DestroyCause::Killed,
        pos: enemy.pos,
    });
    state.add_score(kind.score());

    let roll = state.rng.next_float();
    if let Some(drop) = ENEMY_DROPS.pick(roll) {
        spawn_powerup(state, PowerUp::new(drop, enemy.pos));
    }
}

fn damage_boss(state: &mut GameState, amount: f32) {
    let Some(boss) = state.boss.as_mut() else {
        return;
    };
    let changed = boss.apply_damage(amount);
    let defeated = boss.is_defeated();
    if let Some(phase) = changed {
        state.emit(GameEvent::BossPhaseChanged {
            phase: phase.index(),
        });
    }
    if defeated {
        defeat_boss(state);
    }
}

fn defeat_boss(state: &mut GameState) {
    let Some(boss) = state.boss.take() else {
        return;
    };
    state.boss_defeats += 1;
    let defeats = state.boss_defeats;
    log::info!(
        "Boss {defeats} defeated after {:.1}s",
        state.boss_fight_ms / 1000.0
    );
    state.boss_fight_ms = 0.0;
    state.emit(GameEvent::EntityDestroyed {
        kind: EntityKind::Boss,
        handle: None,
        cause: DestroyCause::Killed,
        pos: boss.pos,
    });
    state.emit(GameEvent::BossDefeated { defeats });
    state.add_score(BOSS_SCORE * defeats as u64);
    state.scheduler.on_boss_defeated(defeats);

    let roll = state.rng.next_float();
    if let Some(drop) = BOSS_DROPS.pick(roll) {
        spawn_powerup(state, PowerUp::new(drop, boss.pos));
    }
}

fn spawn_powerup(state: &mut GameState, powerup: PowerUp) {
    let kind = powerup.kind;
    let pos = powerup.pos;
    let handle = state.powerups.insert(powerup);
    state.emit(GameEvent::EntitySpawned {
        kind: EntityKind::PowerUp(kind),
        handle: Some(handle),
        pos,
    });
}

fn check_end(state: &mut GameState) {
    let score = state.score;
    let elapsed_ms = state.stage_time_ms;
    if state.player.lives == 0 {
        state.phase = GamePhase::GameOver;
        log::info!("Game over: score {score} at {:.1}s", elapsed_ms / 1000.0);
        state.emit(GameEvent::GameOver { score, elapsed_ms });
    } else if state.boss_defeats >= BOSSES_TO_WIN {
        state.phase = GamePhase::Victory;
        log::info!("Victory: score {score} at {:.1}s", elapsed_ms / 1000.0);
        state.emit(GameEvent::Victory { score, elapsed_ms });
    }
}

/// Demo pilot: holds fire, lines up with the nearest threat, sidesteps
/// incoming bullets and spends shields and bombs when crowded.
pub fn autopilot(state: &GameState) -> TickInput {
    let player = &state.player;
    let mut input = TickInput {
        fire: true,
        ..Default::default()
    };

    // Nearest enemy bullet closing in from the front
    let threat = state
        .bullets
        .iter()
        .filter(|(_, b)| b.owner == BulletOwner::Enemy)
        .map(|(_, b)| b.pos)
        .filter(|p| p.x > player.pos.x - PLAYER_HALF_WIDTH)
        .min_by(|a, b| a.distance(player.pos).total_cmp(&b.distance(player.pos)));

    // Line up with the boss, else the leftmost on-screen enemy
    let aim_y = state.boss.as_ref().map(|b| b.pos.y).or_else(|| {
        state
            .enemies
            .iter()
            .filter(|(_, e)| e.is_on_screen())
            .min_by(|(_, a), (_, b)| a.pos.x.total_cmp(&b.pos.x))
            .map(|(_, e)| e.pos.y)
    });

    match threat {
        Some(p) if p.distance(player.pos) < 90.0 => {
            if p.y >= player.pos.y {
                input.up = true;
            } else {
                input.down = true;
            }
            input.shield = p.distance(player.pos) < 50.0 && !player.is_shielded();
        }
        _ => {
            if let Some(y) = aim_y {
                input.up = y < player.pos.y - 8.0;
                input.down = y > player.pos.y + 8.0;
            }
        }
    }

    let home_x = PLAYER_START_X + 50.0;
    input.left = player.pos.x > home_x + 8.0;
    input.right = player.pos.x < home_x - 8.0;

    let crowd = state.enemies.iter().filter(|(_, e)| e.is_on_screen()).count();
    input.bomb = crowd >= 6 && player.bombs > 0 && state.time_ticks % 30 == 0;
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::sim::enemy::{ChaserPhase, EnemyBehavior, EnemyKind};
    use crate::sim::state::Shot;

    const DT: f32 = 10.0;

    fn god_mode_state(seed: u64) -> GameState {
        GameState::new(RunConfig {
            god_mode: true,
            ..RunConfig::with_seed(seed)
        })
        .unwrap()
    }

    #[test]
    fn test_dt_clamp() {
        assert_eq!(clamp_dt(f32::NAN), MIN_DT_MS);
        assert_eq!(clamp_dt(-5.0), MIN_DT_MS);
        assert_eq!(clamp_dt(5000.0), MAX_DT_MS);
        assert_eq!(clamp_dt(16.0), 16.0);
    }

    #[test]
    fn test_tick_pause() {
        let mut state = GameState::with_seed(12345);
        let idle = TickInput::default();
        for _ in 0..200 {
            tick(&mut state, &idle, DT);
        }

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, DT);
        assert_eq!(state.phase, GamePhase::Paused);

        let stage = state.stage_time_ms;
        let phase_time = state.scheduler.phase_time_s();
        let draws = state.rng.draws();
        let enemies: Vec<Vec2> = state.enemies.iter().map(|(_, e)| e.pos).collect();
        for _ in 0..500 {
            tick(&mut state, &idle, DT);
        }
        assert_eq!(state.stage_time_ms, stage);
        assert_eq!(state.scheduler.phase_time_s(), phase_time);
        assert_eq!(state.rng.draws(), draws);
        let after: Vec<Vec2> = state.enemies.iter().map(|(_, e)| e.pos).collect();
        assert_eq!(enemies, after);

        // Unpause and carry on from the same clock
        tick(&mut state, &pause, DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.stage_time_ms, stage + DT as f64);
        assert!(state
            .drain_events()
            .iter()
            .any(|e| *e == GameEvent::PauseToggled { paused: false }));
    }

    #[test]
    fn test_first_boss_spawn() {
        let mut state = god_mode_state(12345);
        let idle = TickInput::default();
        let mut spawned = false;
        for _ in 0..6000 {
            tick(&mut state, &idle, DT);
            if state.drain_events().iter().any(|e| {
                matches!(
                    e,
                    GameEvent::EntitySpawned {
                        kind: EntityKind::Boss,
                        ..
                    }
                )
            }) {
                spawned = true;
                break;
            }
        }
        assert!(spawned);
        assert!(state.scheduler.phase_time_s() >= 50.0);
        assert!(state.scheduler.phase_time_s() < 50.05);
        let boss = state.boss.as_ref().unwrap();
        assert_eq!(boss.max_health, BASE_BOSS_HEALTH * 6.0);
        assert_eq!(state.boss_defeats, 0);
    }

    #[test]
    fn test_shield_lasts_five_seconds() {
        let mut state = god_mode_state(1);
        assert_eq!(state.player.shields, 1);
        let press = TickInput {
            shield: true,
            ..Default::default()
        };
        tick(&mut state, &press, DT);
        assert_eq!(state.player.shields, 0);
        assert!(state.player.is_shielded());

        let mut shielded_ms = DT;
        let idle = TickInput::default();
        for _ in 0..600 {
            tick(&mut state, &idle, DT);
            if state.player.is_shielded() {
                shielded_ms += DT;
            }
        }
        assert_eq!(shielded_ms, SHIELD_DURATION_MS);
        assert!(state
            .events()
            .iter()
            .any(|e| *e == GameEvent::ShieldExpired));

        // No stock left: pressing again does nothing
        tick(&mut state, &press, DT);
        assert!(!state.player.is_shielded());
    }

    #[test]
    fn test_drop_rolls_are_consecutive() {
        let mut state = GameState::with_seed(777);
        for pos in [Vec2::new(800.0, 200.0), Vec2::new(800.0, 500.0)] {
            state.enemies.insert(Enemy::spawn(EnemyKind::Turret, pos));
            state.bullets.insert(Bullet::player(pos, Vec2::ZERO, 10.0));
        }
        let mut expected_rng = state.rng.clone();
        let draws = state.rng.draws();

        tick(&mut state, &TickInput::default(), DT);

        assert_eq!(state.stats.kills, 2);
        assert_eq!(state.rng.draws(), draws + 2);
        let first = expected_rng.next_float();
        let second = expected_rng.next_float();
        assert_ne!(first, second);
        let expected: Vec<_> = [ENEMY_DROPS.pick(first), ENEMY_DROPS.pick(second)]
            .into_iter()
            .flatten()
            .collect();
        let dropped: Vec<_> = state.powerups.iter().map(|(_, p)| p.kind).collect();
        assert_eq!(dropped, expected);
        assert_eq!(state.score, 2 * EnemyKind::Turret.score());
    }

    #[test]
    fn test_bomb_clears_area() {
        let mut state = GameState::with_seed(5);
        let near = state.player.pos + Vec2::new(200.0, 0.0);
        state.enemies.insert(Enemy::spawn(EnemyKind::Sine, near));
        state.enemies.insert(Enemy::spawn(EnemyKind::Sine, Vec2::new(1200.0, 100.0)));
        state.bullets.insert(Bullet::enemy(Shot {
            pos: near,
            vel: Vec2::ZERO,
        }));
        let bombs = state.player.bombs;

        let press = TickInput {
            bomb: true,
            ..Default::default()
        };
        tick(&mut state, &press, DT);

        assert_eq!(state.player.bombs, bombs - 1);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.stats.kills, 1);
        assert!(state.bullets.is_empty());
        assert!(state.events().iter().any(|e| matches!(
            e,
            GameEvent::BombDetonated {
                enemies_hit: 1,
                bullets_cleared: 1
            }
        )));
    }

    #[test]
    fn test_player_bullet_damage_and_iframes() {
        let mut state = GameState::with_seed(9);
        let at = state.player.pos;
        for _ in 0..2 {
            state.bullets.insert(Bullet::enemy(Shot {
                pos: at,
                vel: Vec2::ZERO,
            }));
        }
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.player.lives, START_LIVES - 1);
        assert!(state.player.is_invulnerable());
        // Second bullet is ignored during i-frames
        assert_eq!(state.bullets.len(), 1);
    }

    #[test]
    fn test_game_over() {
        let mut state = GameState::with_seed(3);
        state.player.lives = 1;
        let at = state.player.pos;
        state.bullets.insert(Bullet::enemy(Shot {
            pos: at,
            vel: Vec2::ZERO,
        }));
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state
            .events()
            .iter()
            .any(|e| matches!(e, GameEvent::GameOver { .. })));

        // Finished runs no longer advance
        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_victory_after_second_boss() {
        let mut state = god_mode_state(4);
        state.boss_defeats = 1;
        state.scheduler.on_boss_defeated(1);
        state.boss = Some(Boss::spawn(Vec2::new(1000.0, 360.0), 10.0));
        let pos = state.boss.as_ref().unwrap().pos;
        state.bullets.insert(Bullet::player(pos, Vec2::ZERO, 50.0));

        tick(&mut state, &TickInput::default(), DT);

        assert!(state.boss.is_none());
        assert_eq!(state.boss_defeats, 2);
        assert_eq!(state.phase, GamePhase::Victory);
        assert_eq!(state.score, BOSS_SCORE * 2);
        // Boss drop table always yields something
        assert_eq!(state.powerups.len(), 1);
    }

    #[test]
    fn test_charged_volley() {
        let mut state = god_mode_state(8);
        let hold = TickInput {
            fire: true,
            ..Default::default()
        };
        let ticks = (CHARGE_THRESHOLD_MS / DT) as usize;
        for _ in 0..ticks {
            tick(&mut state, &hold, DT);
        }
        assert!(state.events().iter().any(|e| matches!(
            e,
            GameEvent::BulletFired {
                owner: BulletOwner::Player,
                handles,
                charged: true,
                ..
            } if handles.len() == 2
        )));
        assert_eq!(state.player.charge_ms, 0.0);
    }

    #[test]
    fn test_bullet_lifecycle_events() {
        let mut state = god_mode_state(11);
        let hold = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &hold, DT);
        let fired: Vec<Handle> = state
            .drain_events()
            .into_iter()
            .find_map(|e| match e {
                GameEvent::BulletFired {
                    owner: BulletOwner::Player,
                    origin,
                    handles,
                    ..
                } => {
                    assert_eq!(origin.y, state.player.pos.y);
                    Some(handles)
                }
                _ => None,
            })
            .unwrap();
        assert!(!fired.is_empty());
        assert!(fired.iter().all(|h| state.bullets.get(*h).is_some()));

        // Every bullet in the volley is reported gone, by a hit or the edge
        let idle = TickInput::default();
        let mut destroyed = Vec::new();
        for _ in 0..300 {
            tick(&mut state, &idle, DT);
            for event in state.drain_events() {
                if let GameEvent::EntityDestroyed {
                    kind: EntityKind::Bullet(BulletOwner::Player),
                    handle: Some(h),
                    ..
                } = event
                {
                    destroyed.push(h);
                }
            }
        }
        for h in &fired {
            assert!(destroyed.contains(h));
        }
    }

    #[test]
    fn test_chaser_detonation_is_not_a_kill() {
        let mut state = GameState::with_seed(21);
        state.player.pos = Vec2::new(60.0, 300.0);
        let mut chaser = Enemy::spawn(EnemyKind::Chaser, Vec2::new(52.0, 300.0));
        chaser.behavior = EnemyBehavior::Chaser {
            phase: ChaserPhase::Return,
        };
        state.enemies.insert(chaser);
        let nearby = state.bullets.insert(Bullet::enemy(Shot {
            pos: Vec2::new(120.0, 330.0),
            vel: Vec2::ZERO,
        }));
        let draws = state.rng.draws();

        tick(&mut state, &TickInput::default(), DT);

        assert!(state.enemies.is_empty());
        assert_eq!(state.stats.self_destructs, 1);
        assert_eq!(state.stats.kills, 0);
        assert_eq!(state.score, 0);
        // No drop roll
        assert_eq!(state.rng.draws(), draws);
        assert!(state.bullets.is_empty());
        assert!(state.events().iter().any(|e| *e
            == GameEvent::EntityDestroyed {
                kind: EntityKind::Bullet(BulletOwner::Enemy),
                handle: Some(nearby),
                cause: DestroyCause::Cleared,
                pos: Vec2::new(120.0, 330.0),
            }));
        assert_eq!(state.player.lives, START_LIVES - 1);
    }

    #[test]
    fn test_shield_blocks_chaser_detonation() {
        let mut state = GameState::with_seed(21);
        state.player.pos = Vec2::new(60.0, 300.0);
        state.player.shield_ms = SHIELD_DURATION_MS;
        let mut chaser = Enemy::spawn(EnemyKind::Chaser, Vec2::new(52.0, 300.0));
        chaser.behavior = EnemyBehavior::Chaser {
            phase: ChaserPhase::Return,
        };
        state.enemies.insert(chaser);

        tick(&mut state, &TickInput::default(), DT);

        assert_eq!(state.stats.self_destructs, 1);
        assert_eq!(state.player.lives, START_LIVES);
        assert!(!state.player.is_invulnerable());
    }

    #[test]
    fn test_shield_checked_before_player_hit() {
        let mut state = GameState::with_seed(13);
        let at = state.player.pos;
        state.bullets.insert(Bullet::enemy(Shot {
            pos: at,
            vel: Vec2::ZERO,
        }));
        assert!(!state.player.is_invulnerable());
        let press = TickInput {
            shield: true,
            ..Default::default()
        };

        tick(&mut state, &press, DT);

        assert_eq!(state.player.lives, START_LIVES);
        assert_eq!(state.stats.hits_absorbed, 1);
        assert!(state.bullets.is_empty());
        let events = state.events();
        assert!(events.iter().any(|e| *e == GameEvent::ShieldAbsorbedHit));
        assert!(!events
            .iter()
            .any(|e| matches!(e, GameEvent::PlayerDamaged { .. })));
    }

    #[test]
    fn test_boss_blocks_player_advance() {
        let mut state = god_mode_state(2);
        state.boss = Some(Boss::spawn(Vec2::new(700.0, 360.0), 1000.0));
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        for _ in 0..300 {
            tick(&mut state, &right, DT);
        }
        let boss_x = state.boss.as_ref().unwrap().pos.x;
        assert!(state.player.pos.x <= boss_x - BOSS_RADIUS - PLAYER_HALF_WIDTH + 1e-3);
    }

    #[test]
    fn test_determinism() {
        let run = |seed: u64| {
            let mut state = GameState::with_seed(seed);
            let mut trace = Vec::new();
            for _ in 0..3000 {
                let input = autopilot(&state);
                tick(&mut state, &input, FRAME_DT_MS);
                for event in state.drain_events() {
                    trace.push(serde_json::to_string(&event).unwrap());
                }
            }
            (trace, state.summary())
        };

        let (trace_a, summary_a) = run(99999);
        let (trace_b, summary_b) = run(99999);
        assert!(!trace_a.is_empty());
        assert_eq!(trace_a, trace_b);
        assert_eq!(summary_a, summary_b);

        let (trace_c, _) = run(4242);
        assert_ne!(trace_a, trace_c);
    }
}
