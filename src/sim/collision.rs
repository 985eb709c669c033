//! Collision detection between live entity sets
//!
//! Every function here is pure: it reads snapshots and returns handles of
//! matching records. Applying damage, removal, score and drops is the
//! orchestrator's job (`tick.rs`), which also fixes the relation order.
//!
//! Shape rules:
//! - the player is an axis-aligned rectangle, everything tested against it
//!   is a circle
//! - bullet vs enemy / boss and shield vs bullet are circle vs circle

use glam::Vec2;

use super::arena::{Arena, Handle};
use super::balance::{BOSS_RADIUS, ENEMY_RADIUS, POWERUP_RADIUS, SHIELD_RADIUS};
use super::boss::Boss;
use super::enemy::Enemy;
use super::state::{Bullet, BulletOwner, Player, PowerUp};
use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// The visible screen
    pub fn screen() -> Self {
        Self::new(Vec2::ZERO, Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT))
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Closest point of the rectangle to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }
}

/// Anything with a centre point that area queries can test
pub trait Positioned {
    fn position(&self) -> Vec2;
}

impl Positioned for Enemy {
    fn position(&self) -> Vec2 {
        self.pos
    }
}

impl Positioned for Bullet {
    fn position(&self) -> Vec2 {
        self.pos
    }
}

#[inline]
pub fn circle_circle(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

#[inline]
pub fn circle_rect(center: Vec2, radius: f32, rect: &Rect) -> bool {
    center.distance_squared(rect.closest_point(center)) < radius * radius
}

/// Enemy bullets caught by an active shield (all of them, in slot order)
pub fn shield_absorbs(player: &Player, bullets: &Arena<Bullet>) -> Vec<Handle> {
    if !player.is_shielded() {
        return Vec::new();
    }
    bullets
        .iter()
        .filter(|(_, b)| b.owner == BulletOwner::Enemy)
        .filter(|(_, b)| circle_circle(player.pos, SHIELD_RADIUS, b.pos, b.radius))
        .map(|(h, _)| h)
        .collect()
}

/// First enemy bullet touching the player. Never matches during i-frames.
pub fn player_hit_by_bullet(player: &Player, bullets: &Arena<Bullet>) -> Option<Handle> {
    if player.is_invulnerable() {
        return None;
    }
    let bounds = player.bounds();
    bullets
        .iter()
        .filter(|(_, b)| b.owner == BulletOwner::Enemy)
        .find(|(_, b)| circle_rect(b.pos, b.radius, &bounds))
        .map(|(h, _)| h)
}

/// First (player bullet, enemy) pair in contact.
///
/// Only enemies whose bounds overlap the screen are considered, so
/// off-screen spawns cannot soak up shots.
pub fn first_bullet_enemy_hit(
    bullets: &Arena<Bullet>,
    enemies: &Arena<Enemy>,
) -> Option<(Handle, Handle)> {
    let screen = Rect::screen();
    let visible: Vec<(Handle, Vec2)> = enemies
        .iter()
        .filter(|(_, e)| e.bounds().intersects(&screen))
        .map(|(h, e)| (h, e.pos))
        .collect();
    if visible.is_empty() {
        return None;
    }

    bullets
        .iter()
        .filter(|(_, b)| b.owner == BulletOwner::Player)
        .find_map(|(bh, b)| {
            visible
                .iter()
                .find(|(_, pos)| circle_circle(b.pos, b.radius, *pos, ENEMY_RADIUS))
                .map(|(eh, _)| (bh, *eh))
        })
}

/// Every player bullet touching the boss
pub fn bullets_hitting_boss(bullets: &Arena<Bullet>, boss: &Boss) -> Vec<Handle> {
    bullets
        .iter()
        .filter(|(_, b)| b.owner == BulletOwner::Player)
        .filter(|(_, b)| circle_circle(b.pos, b.radius, boss.pos, BOSS_RADIUS))
        .map(|(h, _)| h)
        .collect()
}

/// First enemy body touching the player. Never matches during i-frames.
pub fn player_enemy_contact(player: &Player, enemies: &Arena<Enemy>) -> Option<Handle> {
    if player.is_invulnerable() {
        return None;
    }
    let bounds = player.bounds();
    enemies
        .iter()
        .find(|(_, e)| circle_rect(e.pos, ENEMY_RADIUS, &bounds))
        .map(|(h, _)| h)
}

/// Whether the boss body touches the player. Never during i-frames.
pub fn player_boss_contact(player: &Player, boss: &Boss) -> bool {
    !player.is_invulnerable() && circle_rect(boss.pos, BOSS_RADIUS, &player.bounds())
}

/// Power-ups the player is touching
pub fn powerups_touching_player(player: &Player, powerups: &Arena<PowerUp>) -> Vec<Handle> {
    let bounds = player.bounds();
    powerups
        .iter()
        .filter(|(_, p)| circle_rect(p.pos, POWERUP_RADIUS, &bounds))
        .map(|(h, _)| h)
        .collect()
}

/// Live records within `radius` (Euclidean, inclusive) of `center` that
/// pass `filter`. Used by bombs and chaser detonations.
pub fn entities_in_radius<T, F>(
    arena: &Arena<T>,
    center: Vec2,
    radius: f32,
    filter: F,
) -> Vec<Handle>
where
    T: Positioned,
    F: Fn(&T) -> bool,
{
    let r2 = radius * radius;
    arena
        .iter()
        .filter(|(_, item)| item.position().distance_squared(center) <= r2 && filter(item))
        .map(|(h, _)| h)
        .collect()
}
