//! Actor model shared by the player, standard enemies, and bosses

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::consts::INVULNERABILITY_TICKS;

/// Four-way facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Unit step (y grows downward)
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Right => Vec2::new(1.0, 0.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// Facing along the dominant axis of `delta` (ties go vertical)
    pub fn dominant(delta: Vec2) -> Direction {
        if delta.x.abs() > delta.y.abs() {
            if delta.x > 0.0 { Direction::Right } else { Direction::Left }
        } else if delta.y > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        }
    }

    /// Angle of the facing in radians
    pub fn angle(self) -> f32 {
        let u = self.unit();
        u.y.atan2(u.x)
    }
}

/// Result of an attempt to damage the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Blocked by god mode, invulnerability, or the player already being dead
    Ignored,
    Hurt,
    Killed,
}

impl HitOutcome {
    /// Damage actually applied
    pub fn landed(self) -> bool {
        self != HitOutcome::Ignored
    }
}

/// A tank-like entity: position is the top-left corner of its box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub pos: Vec2,
    pub size: Vec2,
    pub dir: Direction,
    pub speed: f32,
    /// Ticks until the next shot
    pub cooldown: u32,
    pub hp: f32,
    pub max_hp: f32,
    pub dead: bool,
    /// Ticks of damage immunity left (player only)
    pub invulnerable: u32,
}

impl Actor {
    pub fn new(pos: Vec2, side: f32, dir: Direction, speed: f32, hp: f32) -> Self {
        Self {
            pos,
            size: Vec2::splat(side),
            dir,
            speed,
            cooldown: 0,
            hp,
            max_hp: hp,
            dead: false,
            invulnerable: 0,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp <= 0.0 { 0.0 } else { self.hp / self.max_hp }
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    /// Standard guarded hit on the player: one damage, then a short immunity window
    pub fn hurt(&mut self, amount: f32, god_mode: bool) -> HitOutcome {
        if god_mode || self.dead || self.invulnerable > 0 {
            return HitOutcome::Ignored;
        }
        self.hp -= amount;
        self.invulnerable = INVULNERABILITY_TICKS;
        if self.hp <= 0.0 {
            self.hp = 0.0;
            self.dead = true;
            HitOutcome::Killed
        } else {
            HitOutcome::Hurt
        }
    }

    /// Lethal hit that still respects god mode and the immunity window
    pub fn kill_unless_protected(&mut self, god_mode: bool) -> HitOutcome {
        if god_mode || self.dead || self.invulnerable > 0 {
            return HitOutcome::Ignored;
        }
        self.force_kill()
    }

    /// Lethal hit that only god mode prevents (wire)
    pub fn kill_unless_god(&mut self, god_mode: bool) -> HitOutcome {
        if god_mode || self.dead {
            return HitOutcome::Ignored;
        }
        self.force_kill()
    }

    fn force_kill(&mut self) -> HitOutcome {
        self.hp = 0.0;
        self.dead = true;
        HitOutcome::Killed
    }

    /// Unguarded damage for enemies and bosses. Returns true on the killing blow.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.dead {
            return false;
        }
        self.hp -= amount;
        if self.hp <= 0.0 {
            self.hp = 0.0;
            self.dead = true;
            return true;
        }
        false
    }
}
