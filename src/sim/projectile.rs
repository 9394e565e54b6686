//! Projectile subsystem
//!
//! Bullets, glass spears, red orbs, homing missiles and bouncing moon discs. Each projectile
//! has exactly one motion model. Retirement just clears `active`; inactive projectiles are
//! compacted away by the orchestrator after collision resolution.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, Direction};
use super::boss::Boss;
use super::collision::Rect;
use super::effects::EffectStream;
use super::grid::{Grid, Mover, TileHit};
use super::rng::RandomSource;
use super::state::{GameEvent, report_player_hit};
use crate::consts::*;
use crate::{angle_between, unit_from_angle};

/// Who fired it; same-owner projectiles never interact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
    Boss,
}

/// Shape/behavior tag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Variant {
    Standard,
    GlassSpear,
    RedOrb,
    /// Reflects off walls until the counter goes negative
    MoonDisc { bounces_left: i32 },
}

/// Mutually exclusive motion models
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    /// Four-way movement at a fixed speed
    Axis { dir: Direction, speed: f32 },
    /// Explicit velocity vector
    Free { vel: Vec2 },
    /// Re-aimed at the player's center every tick
    Homing { speed: f32, vel: Vec2 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub size: Vec2,
    pub motion: Motion,
    pub owner: Owner,
    pub variant: Variant,
    pub active: bool,
}

impl Projectile {
    fn spawn(center: Vec2, size: Vec2, motion: Motion, owner: Owner, variant: Variant) -> Self {
        Self {
            pos: center - size / 2.0,
            size,
            motion,
            owner,
            variant,
            active: true,
        }
    }

    /// Standard four-way bullet centered on `center`
    pub fn axis(center: Vec2, dir: Direction, speed: f32, owner: Owner) -> Self {
        Self::spawn(
            center,
            Vec2::splat(BULLET_SIZE),
            Motion::Axis { dir, speed },
            owner,
            Variant::Standard,
        )
    }

    /// Free-angle projectile
    pub fn aimed(
        center: Vec2,
        angle: f32,
        speed: f32,
        size: Vec2,
        owner: Owner,
        variant: Variant,
    ) -> Self {
        let vel = unit_from_angle(angle) * speed;
        Self::spawn(center, size, Motion::Free { vel }, owner, variant)
    }

    /// Boss-owned red missile that tracks the player
    pub fn homing_orb(center: Vec2, angle: f32, speed: f32, side: f32) -> Self {
        let vel = unit_from_angle(angle) * speed;
        Self::spawn(
            center,
            Vec2::splat(side),
            Motion::Homing { speed, vel },
            Owner::Boss,
            Variant::RedOrb,
        )
    }

    /// Medusa's bouncing disc
    pub fn moon_disc(center: Vec2, angle: f32) -> Self {
        Self::aimed(
            center,
            angle,
            SALLY_MOON_DISC_SPEED,
            Vec2::splat(SALLY_MOON_DISC_SIZE),
            Owner::Boss,
            Variant::MoonDisc {
                bounces_left: SALLY_MOON_DISC_BOUNCES,
            },
        )
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

    /// Current per-tick displacement
    pub fn velocity(&self) -> Vec2 {
        match self.motion {
            Motion::Axis { dir, speed } => dir.unit() * speed,
            Motion::Free { vel } | Motion::Homing { vel, .. } => vel,
        }
    }

    fn set_velocity(&mut self, new_vel: Vec2) {
        match &mut self.motion {
            Motion::Free { vel } | Motion::Homing { vel, .. } => *vel = new_vel,
            Motion::Axis { .. } => {}
        }
    }

    /// Point a homing projectile straight at `target` at its fixed speed
    pub fn steer_towards(&mut self, target: Vec2) {
        if let Motion::Homing { speed, vel } = &mut self.motion {
            *vel = unit_from_angle(angle_between(self.pos + self.size / 2.0, target)) * *speed;
        }
    }

    fn out_of_bounds(&self) -> bool {
        self.pos.x < 0.0 || self.pos.x > CANVAS_WIDTH || self.pos.y < 0.0 || self.pos.y > CANVAS_HEIGHT
    }
}

/// Everything the projectile stage reads or mutates
pub struct ProjectileStage<'a> {
    pub grid: &'a mut Grid,
    pub player: &'a mut Actor,
    pub enemies: &'a mut [Actor],
    pub boss: Option<&'a mut Boss>,
    pub effects: &'a mut EffectStream,
    pub rng: &'a mut dyn RandomSource,
    pub events: &'a mut Vec<GameEvent>,
    pub score: &'a mut u64,
    pub god_mode: bool,
}

impl ProjectileStage<'_> {
    fn award(&mut self, amount: u64) {
        *self.score += amount;
        self.events.push(GameEvent::ScoreAwarded {
            amount,
            total: *self.score,
        });
    }

    fn hit_player(&mut self, at: Vec2) {
        self.effects.impact(at, 5);
        let outcome = self.player.hurt(1.0, self.god_mode);
        report_player_hit(outcome, self.player, self.effects, self.events);
    }
}

/// Advance every active projectile one tick and resolve map/actor hits
pub fn update_projectiles(projectiles: &mut [Projectile], stage: &mut ProjectileStage<'_>) {
    for p in projectiles.iter_mut() {
        if !p.active {
            continue;
        }

        if stage.player.is_alive() {
            p.steer_towards(stage.player.center());
        }

        if let Variant::MoonDisc { .. } = p.variant {
            advance_moon_disc(p, stage);
            continue;
        }

        p.pos += p.velocity();

        if p.out_of_bounds() {
            p.active = false;
            continue;
        }

        match stage.grid.bullet_hits_tile(&p.rect()) {
            TileHit::Clear => {}
            hit => {
                p.active = false;
                stage.effects.impact(p.center(), 5);
                match hit {
                    TileHit::Tile { cx, cy } => {
                        stage.grid.damage_tile(cx, cy);
                    }
                    TileHit::Base { .. } => {
                        stage.events.push(GameEvent::BaseDestroyed);
                    }
                    _ => {}
                }
                continue;
            }
        }

        match p.owner {
            Owner::Player => hit_hostiles(p, stage),
            Owner::Enemy | Owner::Boss => {
                if stage.player.is_alive() && p.rect().overlaps(&stage.player.rect()) {
                    p.active = false;
                    stage.hit_player(p.pos);
                }
            }
        }
    }
}

/// Axis-separated reflection against bounds and solid tiles
fn advance_moon_disc(p: &mut Projectile, stage: &mut ProjectileStage<'_>) {
    let mut vel = p.velocity();
    let mut bounces = match p.variant {
        Variant::MoonDisc { bounces_left } => bounces_left,
        _ => return,
    };

    let next_x = p.pos.x + vel.x;
    let ahead = p.rect().at(Vec2::new(next_x, p.pos.y));
    if next_x < 0.0 || next_x > CANVAS_WIDTH || stage.grid.box_overlaps_solid(&ahead, Mover::Projectile) {
        vel.x = -vel.x;
        bounces -= 1;
    } else {
        p.pos.x = next_x;
    }

    let next_y = p.pos.y + vel.y;
    let ahead = p.rect().at(Vec2::new(p.pos.x, next_y));
    if next_y < 0.0 || next_y > CANVAS_HEIGHT || stage.grid.box_overlaps_solid(&ahead, Mover::Projectile) {
        vel.y = -vel.y;
        bounces -= 1;
    } else {
        p.pos.y = next_y;
    }

    p.set_velocity(vel);
    p.variant = Variant::MoonDisc {
        bounces_left: bounces,
    };

    if p.owner == Owner::Boss && stage.player.is_alive() && p.rect().overlaps(&stage.player.rect()) {
        p.active = false;
        stage.hit_player(p.pos);
        return;
    }

    if bounces < 0 {
        p.active = false;
        stage.effects.impact(p.pos, 5);
    }
}

/// Player bullet vs the first overlapping enemy, then the boss
fn hit_hostiles(p: &mut Projectile, stage: &mut ProjectileStage<'_>) {
    let rect = p.rect();

    if let Some(enemy) = stage.enemies.iter_mut().find(|e| e.is_alive() && rect.overlaps(&e.rect())) {
        p.active = false;
        let center = enemy.center();
        stage.effects.fire_burst(center, &mut *stage.rng);
        if enemy.take_damage(1.0) {
            stage.effects.explosion(center);
            stage.events.push(GameEvent::EnemyDestroyed);
            stage.award(ENEMY_SCORE);
        }
        return;
    }

    let Some(boss) = stage.boss.as_deref_mut() else {
        return;
    };
    if !boss.actor.is_alive() || !rect.overlaps(&boss.actor.rect()) {
        return;
    }

    p.active = false;
    let center = boss.actor.center();
    stage.effects.fire_burst(center, &mut *stage.rng);
    if !boss.in_fight() {
        return;
    }

    let damage = boss.incoming_damage(1.0);
    if boss.actor.take_damage(damage) {
        let kind = boss.kind();
        log::info!("{:?} destroyed by gunfire", kind);
        stage.effects.explosion(center);
        stage.events.push(GameEvent::BossDefeated { kind });
        stage.award(BOSS_SCORE);
    }
}

/// Cross-owner pairs that overlap annihilate each other. Returns the number of pairs.
pub fn annihilate_pairs(
    projectiles: &mut [Projectile],
    effects: &mut EffectStream,
    rng: &mut dyn RandomSource,
) -> usize {
    let mut doomed = Vec::new();
    for i in 0..projectiles.len() {
        for j in (i + 1)..projectiles.len() {
            let (a, b) = (&projectiles[i], &projectiles[j]);
            if a.active && b.active && a.owner != b.owner && a.rect().overlaps(&b.rect()) {
                doomed.push(i);
                doomed.push(j);
                effects.fire_burst((a.center() + b.center()) / 2.0, rng);
            }
        }
    }
    for &i in &doomed {
        projectiles[i].active = false;
    }
    doomed.len() / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::Tile;
    use crate::sim::rng::FixedRng;
    use proptest::prelude::*;

    struct Fixture {
        grid: Grid,
        player: Actor,
        enemies: Vec<Actor>,
        effects: EffectStream,
        rng: FixedRng,
        events: Vec<GameEvent>,
        score: u64,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                grid: Grid::filled(GRID_WIDTH, GRID_HEIGHT, Tile::Empty),
                player: Actor::new(Vec2::new(600.0, 600.0), TANK_SIZE, Direction::Up, PLAYER_SPEED, PLAYER_MAX_HP),
                enemies: Vec::new(),
                effects: EffectStream::default(),
                rng: FixedRng(0.5),
                events: Vec::new(),
                score: 0,
            }
        }

        fn run(&mut self, projectiles: &mut [Projectile]) {
            let mut stage = ProjectileStage {
                grid: &mut self.grid,
                player: &mut self.player,
                enemies: &mut self.enemies,
                boss: None,
                effects: &mut self.effects,
                rng: &mut self.rng,
                events: &mut self.events,
                score: &mut self.score,
                god_mode: false,
            };
            update_projectiles(projectiles, &mut stage);
        }
    }

    #[test]
    fn test_axis_bullet_leaves_canvas() {
        let mut fx = Fixture::new();
        let mut shots = [Projectile::axis(Vec2::new(2.0, 100.0), Direction::Left, 3.75, Owner::Player)];
        fx.run(&mut shots);
        assert!(!shots[0].active);
    }

    #[test]
    fn test_bullet_degrades_brick() {
        let mut fx = Fixture::new();
        fx.grid.set_tile(3, 3, Tile::Brick);
        let mut shots = [Projectile::axis(Vec2::new(3.0 * 32.0 - 2.0, 3.0 * 32.0 + 16.0), Direction::Right, 3.75, Owner::Enemy)];
        fx.run(&mut shots);
        assert!(!shots[0].active);
        assert_eq!(fx.grid.tile_at(3, 3), Some(Tile::BrickDamaged));
    }

    #[test]
    fn test_player_bullet_kills_enemy_and_scores() {
        let mut fx = Fixture::new();
        fx.enemies.push(Actor::new(Vec2::new(100.0, 100.0), TANK_SIZE, Direction::Down, ENEMY_SPEED, 1.0));
        let mut shots = [Projectile::axis(Vec2::new(114.0, 140.0), Direction::Up, 3.75, Owner::Player)];
        for _ in 0..5 {
            fx.run(&mut shots);
        }
        assert!(!shots[0].active);
        assert!(fx.enemies[0].dead);
        assert_eq!(fx.score, ENEMY_SCORE);
        assert!(fx.events.contains(&GameEvent::EnemyDestroyed));
    }

    #[test]
    fn test_enemy_bullet_hurts_player_once() {
        let mut fx = Fixture::new();
        let center = fx.player.center();
        let mut shots = [
            Projectile::axis(center, Direction::Up, 0.0, Owner::Enemy),
            Projectile::axis(center, Direction::Up, 0.0, Owner::Boss),
        ];
        fx.run(&mut shots);
        // Both retire; the second lands inside the invulnerability window
        assert!(shots.iter().all(|s| !s.active));
        assert_eq!(fx.player.hp, PLAYER_MAX_HP - 1.0);
    }

    #[test]
    fn test_homing_reaims_at_player() {
        let mut fx = Fixture::new();
        let mut shots = [Projectile::homing_orb(Vec2::new(100.0, 614.0), std::f32::consts::PI, 2.5, 2.0)];
        fx.run(&mut shots);
        let vel = shots[0].velocity();
        assert!(vel.x > 2.4, "should turn towards the player on the right, got {vel:?}");
    }

    #[test]
    fn test_moon_disc_bounces_twice_then_retires() {
        let mut fx = Fixture::new();
        // Shoot straight left from near the left wall; every contact flips x only
        let mut shots = [Projectile::moon_disc(Vec2::new(10.0, 300.0), std::f32::consts::PI)];
        let mut flips = 0;
        let mut last_vx = shots[0].velocity().x;
        for _ in 0..2000 {
            fx.run(&mut shots);
            let vx = shots[0].velocity().x;
            if vx.signum() != last_vx.signum() {
                flips += 1;
                last_vx = vx;
            }
            assert!(shots[0].velocity().y.abs() < 1e-4);
            if !shots[0].active {
                break;
            }
        }
        assert!(!shots[0].active);
        // Two bounces survive, the third contact retires it
        assert_eq!(flips, SALLY_MOON_DISC_BOUNCES + 1);
    }

    #[test]
    fn test_same_owner_never_annihilates() {
        let mut effects = EffectStream::default();
        let mut rng = FixedRng(0.1);
        let c = Vec2::new(50.0, 50.0);
        let mut shots = vec![
            Projectile::axis(c, Direction::Up, 1.0, Owner::Boss),
            Projectile::axis(c, Direction::Down, 1.0, Owner::Boss),
        ];
        assert_eq!(annihilate_pairs(&mut shots, &mut effects, &mut rng), 0);
        assert!(shots.iter().all(|s| s.active));

        shots.push(Projectile::axis(c, Direction::Left, 1.0, Owner::Player));
        assert_eq!(annihilate_pairs(&mut shots, &mut effects, &mut rng), 2);
        assert!(shots.iter().all(|s| !s.active));
    }

    fn owner_strategy() -> impl Strategy<Value = Owner> {
        prop_oneof![Just(Owner::Player), Just(Owner::Enemy), Just(Owner::Boss)]
    }

    proptest! {
        #[test]
        fn prop_overlapping_pairs_retire_iff_owners_differ(
            a in owner_strategy(),
            b in owner_strategy(),
            dx in -3.0f32..3.0,
            dy in -3.0f32..3.0,
        ) {
            let mut effects = EffectStream::default();
            let mut rng = FixedRng(0.3);
            let c = Vec2::new(200.0, 200.0);
            let mut shots = vec![
                Projectile::axis(c, Direction::Up, 1.0, a),
                Projectile::axis(c + Vec2::new(dx, dy), Direction::Up, 1.0, b),
            ];
            annihilate_pairs(&mut shots, &mut effects, &mut rng);
            prop_assert_eq!(shots[0].active, a == b);
            prop_assert_eq!(shots[1].active, a == b);
        }
    }
}
