//! Tank Souls - tile-grid tank combat with scripted bosses
//!
//! Core modules:
//! - `sim`: Per-tick simulation (grid, projectiles, actors, boss AI, effects)
//! - `settings`: Persisted meta-progress flags consumed by the simulation

pub mod settings;
pub mod sim;

pub use settings::{ConfigError, Settings};

use glam::Vec2;

/// Game configuration constants
///
/// All durations are in ticks (the host calls `tick` at ~60 Hz), all distances in pixels.
pub mod consts {
    /// Nominal tick rate the constants are tuned for
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Grid dimensions
    pub const TILE_SIZE: f32 = 32.0;
    pub const GRID_WIDTH: usize = 26;
    pub const GRID_HEIGHT: usize = 20;
    pub const CANVAS_WIDTH: f32 = GRID_WIDTH as f32 * TILE_SIZE;
    pub const CANVAS_HEIGHT: f32 = GRID_HEIGHT as f32 * TILE_SIZE;

    /// Tanks and bullets
    pub const TANK_SIZE: f32 = 28.0;
    pub const BULLET_SIZE: f32 = 4.0;
    pub const PLAYER_SPEED: f32 = 2.0;
    pub const ENEMY_SPEED: f32 = 0.375;
    pub const PLAYER_BULLET_SPEED: f32 = 3.75;
    pub const ENEMY_BULLET_SPEED: f32 = 3.25;
    pub const SHOOT_COOLDOWN: u32 = 30;
    pub const ENEMY_SHOOT_COOLDOWN: u32 = 60;

    /// Player
    pub const PLAYER_MAX_HP: f32 = 3.0;
    /// Ticks of immunity after a non-lethal hit
    pub const INVULNERABILITY_TICKS: u32 = 30;
    /// Perpendicular snap distance on direction change
    pub const SNAP_DISTANCE: f32 = 10.0;
    /// Heal charges granted at session start when healing is unlocked
    pub const HEAL_CHARGES: u32 = 3;

    /// Standard enemy spawning (level 1)
    pub const ENEMY_SPAWN_INTERVAL: u32 = 180;
    pub const MAX_LIVE_ENEMIES: usize = 4;
    pub const LEVEL_ONE_ENEMY_BUDGET: u32 = 20;
    pub const ENEMY_TURN_CHANCE: f32 = 0.02;
    pub const ENEMY_FIRE_CHANCE: f32 = 0.03;

    /// Scores
    pub const ENEMY_SCORE: u64 = 100;
    pub const BOSS_SCORE: u64 = 1000;
    pub const BOSS_WIRE_KILL_SCORE: u64 = 2000;

    /// Boss intro (Juggernaut)
    pub const BOSS_APPEAR_DURATION: u32 = 120;
    pub const BOSS_AWAKEN_DURATION: u32 = 240;

    /// Juggernaut (level 2)
    pub const BOSS_SIZE: f32 = 48.0;
    pub const BOSS_HP: f32 = 30.0;
    pub const BOSS_SPEED: f32 = 0.45;
    pub const BOSS_SHOOT_COOLDOWN: u32 = 80;
    pub const BOSS_BULLET_SPEED: f32 = PLAYER_SPEED;
    pub const BOSS_DEFENSE_BUFF_DURATION: u32 = 600;
    pub const GLASSCANNON_COOLDOWN: u32 = 12 * 60;
    pub const GLASSCANNON_SIZE: f32 = BULLET_SIZE * 3.0;
    pub const GLASSCANNON_SPEED_FACTOR: f32 = 0.5;
    pub const BOSS_RAGE_SPEED_MULT: f32 = 3.0;

    /// Medusa (level 3)
    pub const MEDUSA_SIZE: f32 = TANK_SIZE * 3.5;
    pub const MEDUSA_HP: f32 = 30.0;
    pub const MEDUSA_SPEED: f32 = 0.5;
    pub const MEDUSA_BULLET_SPEED: f32 = BOSS_BULLET_SPEED * 0.85;
    pub const MEDUSA_SNAKE_BULLET_SPEED: f32 = MEDUSA_BULLET_SPEED * 0.5;
    pub const MEDUSA_PHASE_4_BASE_SPEED: f32 = 4.0;
    pub const MEDUSA_PHASE_4_ACCEL: f32 = 1.05;
    pub const MEDUSA_PHASE_4_STEER: f32 = 0.15;
    pub const MEDUSA_BACKSTAB_DURATION: u32 = 300;
    pub const MEDUSA_BACKSTAB_COOLDOWN: u32 = 600;
    pub const MEDUSA_ATTACK_COOLDOWN: u32 = 180;
    pub const MEDUSA_PRE_CHARGE: u32 = 6;
    pub const MEDUSA_CHARGE: u32 = 78;
    pub const MEDUSA_LASER_DURATION: u32 = 30;
    pub const MEDUSA_LASER_WIDTH: f32 = 16.0;
    pub const MEDUSA_LASER_LENGTH: f32 = 1000.0;
    pub const MEDUSA_LASER_TICK_INTERVAL: u32 = 10;
    pub const MEDUSA_LASER_TRACE_DURATION: u32 = 120;
    pub const MEDUSA_SHOTGUN_BURSTS: u32 = 3;
    pub const MEDUSA_SHOTGUN_BURST_DELAY: u32 = 12;
    pub const MEDUSA_SHOTGUN_BULLET_COUNT: u32 = 15;
    pub const MEDUSA_SNAKE_INTERVAL: u32 = 60;
    pub const MEDUSA_SNAKE_HEADS: u32 = 12;
    pub const MEDUSA_SNAKE_CHANCE: f32 = 0.01;
    pub const SALLY_MOON_DISC_SPEED: f32 = 2.1;
    pub const SALLY_MOON_DISC_COOLDOWN: u32 = 90;
    pub const SALLY_MOON_DISC_SIZE: f32 = 8.0;
    pub const SALLY_MOON_DISC_BOUNCES: i32 = 2;

    /// Bloodseeker (level 4)
    pub const BLOODSEEKER_HP: f32 = 40.0;
    pub const BLOODSEEKER_SIZE: f32 = 40.0;
    pub const BLOODSEEKER_BASE_SPEED: f32 = 1.0;
    pub const BLOODSEEKER_MAX_SPEED: f32 = 3.5;
    pub const BLOOD_POOL_DURATION: u32 = 150;
    pub const BLOOD_POOL_DROP_RATE: u32 = 40;
    pub const BLOOD_POOL_DROP_CHANCE: f32 = 0.2;
    pub const BLOOD_POOL_RADIUS: f32 = 24.0;
    pub const BLOOD_POOL_MISSILES: u32 = 6;
    pub const BLOODSEEKER_BITE_RANGE: f32 = 180.0;
    pub const BLOODSEEKER_PRE_BITE_DURATION: u32 = 72;
    pub const BLOODSEEKER_BITE_DURATION: u32 = 20;
    pub const BLOODSEEKER_BITE_SPEED: f32 = 9.0;
    pub const BLOODSEEKER_RECOVERY_DURATION: u32 = 15;
    pub const BLOODSEEKER_RECOVERY_FRICTION: f32 = 0.85;
    pub const BLOODSEEKER_RETREAT_DURATION: u32 = 20;
    pub const BLOODSEEKER_RETREAT_SPEED: f32 = 2.5;
    pub const BLOODSEEKER_BITE_COOLDOWN: u32 = 90;
    pub const BLOODSEEKER_DRIFT_DURATION: u32 = 90;
    pub const BLOODSEEKER_CAUTION_RADIUS: f32 = 120.0;
    pub const BLOODSEEKER_WIRE_HIT_INTERVAL: u32 = 30;
    pub const BLOODSEEKER_WIRE_TOLERANCE: u32 = 120;
    pub const BLOODSEEKER_RAGE_DURATION: u32 = 240;
    pub const BLOODSEEKER_RAGE_RING: u32 = 12;
    pub const BLOODSEEKER_MISSILE_SPEED: f32 = PLAYER_BULLET_SPEED / 1.5;
    pub const BLOODSEEKER_BIG_POOL_DURATION: u32 = 300;
    pub const BLOODSEEKER_BIG_POOL_COOLDOWN: u32 = 480;
    pub const BLOODSEEKER_BIG_POOL_RADIUS: f32 = 240.0;
    pub const BIG_POOL_SLOW_FACTOR: f32 = 0.75;
    pub const BLOODSEEKER_TENTACLE_COUNT: usize = 5;
    pub const BLOODSEEKER_TENTACLE_MAX_LENGTH: f32 = 100.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector pointing along `theta`
#[inline]
pub fn unit_from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Angle of the vector from `from` to `to`
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}
