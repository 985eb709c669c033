//! Weapon progression
//!
//! Tier -> volley stats. Tiers past the tabulated specs keep scaling, so the
//! functions here accept any tier; the player record is what caps it.

use super::balance::{
    WEAPON_DAMAGE_STEP, WEAPON_FIRE_RATE_STEP_MS, WEAPON_MIN_FIRE_RATE_MS, WEAPON_SPECS,
    WEAPON_SPEED_STEP,
};

/// Stats for one volley
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponStats {
    /// Minimum time between volleys (ms)
    pub fire_rate_ms: f32,
    pub damage: f32,
    pub bullet_speed: f32,
    pub bullet_count: u32,
    /// Total spread of the volley (degrees)
    pub spread_deg: f32,
}

/// Bullets per volley: 1,1,2,2 then one more per tier from tier 4
pub fn bullet_count_for_tier(tier: u32) -> u32 {
    match tier {
        0 | 1 => 1,
        2 | 3 => 2,
        t => 2 + (t - 3),
    }
}

/// Spread is driven by bullet count, not tier
pub fn spread_for_count(count: u32) -> f32 {
    match count {
        0 | 1 => 0.0,
        2 => 12.0,
        3 => 15.0,
        n => (n as f32 * 4.0).min(25.0),
    }
}

pub fn stats_for_tier(tier: u32) -> WeaponStats {
    let last = WEAPON_SPECS.len() - 1;
    let (spec, extra) = if (tier as usize) <= last {
        (WEAPON_SPECS[tier as usize], 0.0)
    } else {
        (WEAPON_SPECS[last], (tier as usize - last) as f32)
    };

    let bullet_count = bullet_count_for_tier(tier);
    WeaponStats {
        fire_rate_ms: (spec.fire_rate_ms + WEAPON_FIRE_RATE_STEP_MS * extra)
            .max(WEAPON_MIN_FIRE_RATE_MS),
        damage: spec.damage + WEAPON_DAMAGE_STEP * extra,
        bullet_speed: spec.bullet_speed + WEAPON_SPEED_STEP * extra,
        bullet_count,
        spread_deg: spread_for_count(bullet_count),
    }
}

/// Charge-shot variant of a volley
pub fn charged(stats: WeaponStats, damage_multiplier: f32) -> WeaponStats {
    WeaponStats {
        bullet_count: stats.bullet_count * 2,
        spread_deg: stats.spread_deg * 1.5,
        damage: stats.damage * damage_multiplier,
        ..stats
    }
}

/// Angular offset (degrees) of each bullet in a volley.
///
/// Index 0 always flies straight. The rest alternate +/- in widening steps
/// across the half-spread; with an odd remainder the extra bullet lands on
/// the + side.
pub fn spread_offsets(count: u32, spread_deg: f32) -> Vec<f32> {
    if count == 0 {
        return Vec::new();
    }
    let others = count - 1;
    let steps = others.div_ceil(2).max(1) as f32;
    let half = spread_deg / 2.0;

    (0..count)
        .map(|i| {
            if i == 0 {
                return 0.0;
            }
            let step = i.div_ceil(2) as f32;
            let side = if i % 2 == 1 { 1.0 } else { -1.0 };
            side * half * step / steps
        })
        .collect()
}
