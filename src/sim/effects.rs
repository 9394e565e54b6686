//! Effect stream
//!
//! Two lists sharing one lifetime primitive:
//! - `Particle`: cosmetic only, the renderer draws these and nothing in the simulation reads
//!   them back
//! - `HazardField`: blood pools that hurt, slow, and spawn missiles
//!
//! Every entry counts down one stage per tick. A hazard's expiry obligation runs on the tick
//! its stage reaches 1, so it fires at most once; the entry is dropped once the stage hits 0.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, HitOutcome};
use super::projectile::Projectile;
use super::rng::RandomSource;
use crate::consts::*;
use crate::unit_from_angle;

/// Countdown shared by particles and hazard fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifetime {
    stage: u32,
}

impl Lifetime {
    pub fn new(stage: u32) -> Self {
        Self { stage }
    }

    pub fn remaining(&self) -> u32 {
        self.stage
    }

    /// Count down one tick. Returns true exactly once, on the tick the stage reaches 1.
    pub fn step(&mut self) -> bool {
        self.stage = self.stage.saturating_sub(1);
        self.stage == 1
    }

    pub fn is_done(&self) -> bool {
        self.stage == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Explosion,
    Impact,
    Smoke,
    Fire,
    Heal,
    BossAura,
    Glitch,
    Saliva,
    LaserTrace,
}

/// Purely visual effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ParticleKind,
    pub life: Lifetime,
    /// Beam angle for laser traces
    pub angle: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardKind {
    /// Small pool: contact damage, missile ring on expiry
    BloodPool,
    /// Large pool: slows the player, area hit on expiry
    BigBloodPool,
}

/// Effect with gameplay obligations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardField {
    /// Center of the field
    pub pos: Vec2,
    pub kind: HazardKind,
    pub radius: f32,
    pub life: Lifetime,
}

impl HazardField {
    pub fn blood_pool(pos: Vec2) -> Self {
        Self {
            pos,
            kind: HazardKind::BloodPool,
            radius: BLOOD_POOL_RADIUS,
            life: Lifetime::new(BLOOD_POOL_DURATION),
        }
    }

    pub fn big_blood_pool(pos: Vec2) -> Self {
        Self {
            pos,
            kind: HazardKind::BigBloodPool,
            radius: BLOODSEEKER_BIG_POOL_RADIUS,
            life: Lifetime::new(BLOODSEEKER_BIG_POOL_DURATION),
        }
    }

    fn contains(&self, point: Vec2, margin: f32) -> bool {
        self.pos.distance(point) < self.radius + margin
    }
}

/// Read-only view of one effect for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectView {
    pub pos: Vec2,
    pub kind: EffectKind,
    pub remaining: u32,
    pub angle: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Particle(ParticleKind),
    Hazard(HazardKind),
}

/// All live effects for a session
#[derive(Debug, Clone, Default)]
pub struct EffectStream {
    particles: Vec<Particle>,
    hazards: Vec<HazardField>,
}

impl EffectStream {
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn hazards(&self) -> &[HazardField] {
        &self.hazards
    }

    /// Everything the renderer needs, hazards first so particles draw on top
    pub fn views(&self) -> impl Iterator<Item = EffectView> + '_ {
        let hazards = self.hazards.iter().map(|h| EffectView {
            pos: h.pos,
            kind: EffectKind::Hazard(h.kind),
            remaining: h.life.remaining(),
            angle: 0.0,
        });
        let particles = self.particles.iter().map(|p| EffectView {
            pos: p.pos,
            kind: EffectKind::Particle(p.kind),
            remaining: p.life.remaining(),
            angle: p.angle,
        });
        hazards.chain(particles)
    }

    pub fn len(&self) -> usize {
        self.particles.len() + self.hazards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count(&self, kind: ParticleKind) -> usize {
        self.particles.iter().filter(|p| p.kind == kind).count()
    }

    pub fn push_particle(&mut self, pos: Vec2, vel: Vec2, kind: ParticleKind, stage: u32) {
        self.particles.push(Particle {
            pos,
            vel,
            kind,
            life: Lifetime::new(stage),
            angle: 0.0,
        });
    }

    pub fn add_hazard(&mut self, field: HazardField) {
        self.hazards.push(field);
    }

    pub fn explosion(&mut self, pos: Vec2) {
        self.push_particle(pos, Vec2::ZERO, ParticleKind::Explosion, 20);
    }

    pub fn impact(&mut self, pos: Vec2, stage: u32) {
        self.push_particle(pos, Vec2::ZERO, ParticleKind::Impact, stage);
    }

    pub fn smoke(&mut self, pos: Vec2, stage: u32) {
        self.push_particle(pos, Vec2::ZERO, ParticleKind::Smoke, stage);
    }

    pub fn heal(&mut self, pos: Vec2) {
        self.push_particle(pos, Vec2::ZERO, ParticleKind::Heal, 30);
    }

    pub fn laser_trace(&mut self, origin: Vec2, angle: f32) {
        self.particles.push(Particle {
            pos: origin,
            vel: Vec2::ZERO,
            kind: ParticleKind::LaserTrace,
            life: Lifetime::new(MEDUSA_LASER_TRACE_DURATION),
            angle,
        });
    }

    /// Fire flash plus six scattered sparks
    pub fn fire_burst(&mut self, center: Vec2, rng: &mut dyn RandomSource) {
        self.push_particle(center, Vec2::ZERO, ParticleKind::Fire, 15);
        for k in 0..6 {
            let angle = k as f32 / 6.0 * std::f32::consts::TAU + rng.range(0.0, 0.4);
            let dist = rng.range(6.0, 20.0);
            let stage = 5 + rng.index(4) as u32;
            self.impact(center + unit_from_angle(angle) * dist, stage);
        }
    }

    /// Speed multiplier for the player at `center`
    pub fn player_speed_factor(&self, center: Vec2) -> f32 {
        let slowed = self
            .hazards
            .iter()
            .any(|h| h.kind == HazardKind::BigBloodPool && h.contains(center, 0.0));
        if slowed { BIG_POOL_SLOW_FACTOR } else { 1.0 }
    }

    /// Decay everything one tick and run hazard obligations.
    ///
    /// Missiles from expiring pools are appended to `projectiles`. Returns the outcome of
    /// every attempted hit on the player so the caller can report it.
    pub fn update(
        &mut self,
        player: &mut Actor,
        god_mode: bool,
        projectiles: &mut Vec<Projectile>,
    ) -> Vec<HitOutcome> {
        let mut outcomes = Vec::new();
        let mut pops = Vec::new();

        for p in &mut self.particles {
            p.life.step();
            p.pos += p.vel;
        }

        for h in &mut self.hazards {
            let expiring = h.life.step();
            match h.kind {
                HazardKind::BloodPool => {
                    if expiring {
                        for i in 0..BLOOD_POOL_MISSILES {
                            let angle = i as f32 * std::f32::consts::TAU / BLOOD_POOL_MISSILES as f32;
                            projectiles.push(Projectile::homing_orb(
                                h.pos,
                                angle,
                                BLOODSEEKER_MISSILE_SPEED,
                                BULLET_SIZE / 2.0,
                            ));
                        }
                        pops.push((h.pos, 20));
                    }
                    if player.is_alive() && h.contains(player.center(), player.size.x / 2.0) {
                        outcomes.push(player.hurt(1.0, god_mode));
                    }
                }
                HazardKind::BigBloodPool => {
                    if expiring {
                        pops.push((h.pos, 30));
                        if player.is_alive() && h.contains(player.center(), 0.0) {
                            outcomes.push(player.hurt(1.0, god_mode));
                        }
                    }
                }
            }
        }

        for (pos, stage) in pops {
            self.impact(pos, stage);
        }
        self.particles.retain(|p| !p.life.is_done());
        self.hazards.retain(|h| !h.life.is_done());
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::actor::Direction;

    fn player_at(center: Vec2) -> Actor {
        Actor::new(center - Vec2::splat(TANK_SIZE / 2.0), TANK_SIZE, Direction::Up, PLAYER_SPEED, PLAYER_MAX_HP)
    }

    #[test]
    fn test_lifetime_expiry_fires_once() {
        let mut life = Lifetime::new(3);
        assert!(!life.step());
        assert!(life.step());
        assert!(!life.step());
        assert!(life.is_done());
        assert!(!life.step());
    }

    #[test]
    fn test_blood_pool_spawns_missile_ring_once() {
        let mut fx = EffectStream::default();
        let mut player = player_at(Vec2::new(600.0, 600.0));
        let mut shots = Vec::new();
        fx.add_hazard(HazardField::blood_pool(Vec2::new(100.0, 100.0)));

        for _ in 0..BLOOD_POOL_DURATION + 5 {
            fx.update(&mut player, false, &mut shots);
        }
        assert_eq!(shots.len(), BLOOD_POOL_MISSILES as usize);
        assert!(fx.hazards().is_empty());
        assert_eq!(player.hp, PLAYER_MAX_HP);
    }

    #[test]
    fn test_blood_pool_contact_hurts() {
        let mut fx = EffectStream::default();
        let mut player = player_at(Vec2::new(130.0, 100.0));
        let mut shots = Vec::new();
        // 30px away, inside 24 + 14
        fx.add_hazard(HazardField::blood_pool(Vec2::new(100.0, 100.0)));
        let outcomes = fx.update(&mut player, false, &mut shots);
        assert_eq!(outcomes, vec![HitOutcome::Hurt]);
        assert_eq!(player.hp, PLAYER_MAX_HP - 1.0);
    }

    #[test]
    fn test_big_pool_slows_and_detonates() {
        let mut fx = EffectStream::default();
        let center = Vec2::new(300.0, 300.0);
        let mut player = player_at(center + Vec2::new(100.0, 0.0));
        let mut shots = Vec::new();
        fx.add_hazard(HazardField::big_blood_pool(center));

        assert_eq!(fx.player_speed_factor(player.center()), BIG_POOL_SLOW_FACTOR);
        assert_eq!(fx.player_speed_factor(center + Vec2::new(300.0, 0.0)), 1.0);

        let mut hits = Vec::new();
        for _ in 0..BLOODSEEKER_BIG_POOL_DURATION {
            hits.extend(fx.update(&mut player, false, &mut shots));
        }
        assert_eq!(hits, vec![HitOutcome::Hurt]);
        assert!(shots.is_empty());
        assert_eq!(fx.player_speed_factor(player.center()), 1.0);
    }

    #[test]
    fn test_particles_decay_and_move() {
        let mut fx = EffectStream::default();
        let mut player = player_at(Vec2::new(600.0, 600.0));
        let mut shots = Vec::new();
        fx.push_particle(Vec2::ZERO, Vec2::new(1.0, 0.0), ParticleKind::BossAura, 2);
        fx.update(&mut player, false, &mut shots);
        assert_eq!(fx.particles()[0].pos, Vec2::new(1.0, 0.0));
        fx.update(&mut player, false, &mut shots);
        assert!(fx.is_empty());
    }

    #[test]
    fn test_views_cover_both_lists() {
        let mut fx = EffectStream::default();
        fx.add_hazard(HazardField::blood_pool(Vec2::ZERO));
        fx.laser_trace(Vec2::ZERO, 1.0);
        let views: Vec<_> = fx.views().collect();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].kind, EffectKind::Hazard(HazardKind::BloodPool));
        assert_eq!(views[1].angle, 1.0);
    }
}
