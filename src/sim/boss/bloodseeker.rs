//! Bloodseeker: pursuit and bite boss that seeds blood pools
//!
//! Gets faster as it loses health. Wire costs it 1 HP per 30 ticks and lingering in wire
//! sends it into a rage. Below half health it adds tentacles, a big pool under the player,
//! and keeps away from wire while hunting.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{BossCtx, slide, try_move};
use crate::consts::*;
use crate::sim::actor::{Actor, Direction};
use crate::sim::effects::{HazardField, ParticleKind};
use crate::sim::grid::{Mover, Tile, tile_center, tile_coord};
use crate::sim::levels::BossKind;
use crate::sim::projectile::{Owner, Projectile, Variant};
use crate::sim::state::GameEvent;
use crate::{angle_between, normalize_angle, unit_from_angle};

/// Melee cycle. Every state but `Idle` runs for a fixed number of ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BiteState {
    #[default]
    Idle,
    PreBite,
    Biting,
    Recovery,
    Retreat,
    Cooldown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tentacle {
    pub angle: f32,
    pub length: f32,
    pub wiggle: f32,
}

impl Tentacle {
    /// Tip position for a body centered at `center`
    pub fn tip(&self, center: Vec2) -> Vec2 {
        center + unit_from_angle(self.angle + self.wiggle.sin() * 0.5) * self.length
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BloodseekerState {
    pub bite: BiteState,
    /// Ticks left in the current bite state
    pub bite_timer: u32,
    /// Residual motion left over from lunges and retreats
    pub drift: Vec2,
    pub drift_timer: u32,
    /// Ticks until the hunting heading is re-rolled
    pub chaos_timer: u32,
    pub hunt_angle: f32,
    pub pool_timer: u32,
    pub big_pool_timer: u32,
    pub wire_hit_timer: u32,
    /// Consecutive ticks spent touching wire
    pub wire_stay: u32,
    pub rage: u32,
    /// Empty until the low-health phase
    pub tentacles: Vec<Tentacle>,
    age: u32,
}

pub(super) fn update(actor: &mut Actor, state: &mut BloodseekerState, ctx: &mut BossCtx<'_>) {
    if !ctx.player.is_alive() {
        return;
    }
    state.age = state.age.wrapping_add(1);

    drop_pool(actor, state, ctx);

    let low = actor.hp_ratio() < 0.5;
    if low {
        big_pool(actor, state, ctx);
        update_tentacles(actor, state, ctx);
    }

    if wire_contact(actor, state, ctx) {
        return;
    }

    let speed = current_speed(actor, state, ctx);
    step_bite(actor, state, ctx, speed, low);

    if !matches!(state.bite, BiteState::PreBite | BiteState::Biting | BiteState::Recovery) {
        apply_drift(actor, state, ctx);
    }
}

fn drop_pool(actor: &Actor, state: &mut BloodseekerState, ctx: &mut BossCtx<'_>) {
    state.pool_timer += 1;
    if state.pool_timer <= BLOOD_POOL_DROP_RATE {
        return;
    }
    state.pool_timer = 0;
    if ctx.rng.chance(BLOOD_POOL_DROP_CHANCE) {
        ctx.effects.add_hazard(HazardField::blood_pool(actor.center()));
    }
}

fn big_pool(actor: &Actor, state: &mut BloodseekerState, ctx: &mut BossCtx<'_>) {
    if state.big_pool_timer > 0 {
        state.big_pool_timer -= 1;
        return;
    }
    state.big_pool_timer = BLOODSEEKER_BIG_POOL_COOLDOWN;
    ctx.effects
        .add_hazard(HazardField::big_blood_pool(ctx.player_center()));
    ctx.effects
        .push_particle(actor.center(), Vec2::ZERO, ParticleKind::BossAura, 20);
    log::debug!("Bloodseeker dropped a big pool");
}

fn update_tentacles(actor: &Actor, state: &mut BloodseekerState, ctx: &mut BossCtx<'_>) {
    if state.tentacles.is_empty() {
        let step = TAU / BLOODSEEKER_TENTACLE_COUNT as f32;
        state.tentacles = (0..BLOODSEEKER_TENTACLE_COUNT)
            .map(|i| Tentacle {
                angle: step * i as f32,
                length: 0.0,
                wiggle: ctx.rng.range(0.0, TAU),
            })
            .collect();
    }

    let center = actor.center();
    let target = angle_between(center, ctx.player_center());
    let reach = ctx.player.size.x;
    for t in &mut state.tentacles {
        t.angle += normalize_angle(target - t.angle) * 0.05;
        t.wiggle += 0.1;
        let wanted = BLOODSEEKER_TENTACLE_MAX_LENGTH * (0.8 + (t.wiggle * 0.5).sin() * 0.2);
        t.length += (wanted - t.length) * 0.1;

        if t.tip(center).distance(ctx.player.center()) < reach {
            let at = ctx.player.center();
            if ctx.hurt_player().landed() {
                ctx.effects.impact(at, 10);
            }
        }
    }
}

/// Wire damage and rage. Returns true if the wire killed the boss.
fn wire_contact(actor: &mut Actor, state: &mut BloodseekerState, ctx: &mut BossCtx<'_>) -> bool {
    state.wire_hit_timer = state.wire_hit_timer.saturating_sub(1);

    if !ctx.grid.box_touches(&actor.rect(), Tile::Wire) {
        state.wire_stay = 0;
        return false;
    }

    if state.wire_hit_timer == 0 {
        state.wire_hit_timer = BLOODSEEKER_WIRE_HIT_INTERVAL;
        ctx.effects.impact(actor.center(), 5);
        if actor.take_damage(1.0) {
            ctx.effects.explosion(actor.center());
            ctx.award(BOSS_WIRE_KILL_SCORE);
            ctx.events.push(GameEvent::BossDefeated {
                kind: BossKind::Bloodseeker,
            });
            log::info!("Bloodseeker died on the wire");
            return true;
        }
    }

    state.wire_stay += 1;
    if state.wire_stay > BLOODSEEKER_WIRE_TOLERANCE {
        state.wire_stay = 0;
        state.rage = BLOODSEEKER_RAGE_DURATION;
        let center = actor.center();
        ctx.effects
            .push_particle(center, Vec2::ZERO, ParticleKind::BossAura, 30);
        for i in 0..BLOODSEEKER_RAGE_RING {
            ctx.projectiles.push(Projectile::aimed(
                center,
                TAU / BLOODSEEKER_RAGE_RING as f32 * i as f32,
                PLAYER_BULLET_SPEED,
                Vec2::splat(BULLET_SIZE),
                Owner::Boss,
                Variant::RedOrb,
            ));
        }
        ctx.events.push(GameEvent::BloodseekerEnraged);
        log::debug!("Bloodseeker enraged");
    }
    false
}

/// Faster as health drops, doubled while enraged
fn current_speed(actor: &Actor, state: &mut BloodseekerState, ctx: &mut BossCtx<'_>) -> f32 {
    let base = (BLOODSEEKER_BASE_SPEED + 2.5 * (1.0 - actor.hp_ratio())).min(BLOODSEEKER_MAX_SPEED);
    if state.rage == 0 {
        return base * 0.8;
    }
    state.rage -= 1;
    if state.age % 5 == 0 {
        ctx.effects
            .push_particle(actor.center(), Vec2::ZERO, ParticleKind::Saliva, 10);
    }
    base * 2.0
}

fn apply_drift(actor: &mut Actor, state: &mut BloodseekerState, ctx: &BossCtx<'_>) {
    if state.drift_timer == 0 {
        return;
    }
    state.drift_timer -= 1;
    let fade = state.drift_timer as f32 / BLOODSEEKER_DRIFT_DURATION as f32;
    try_move(actor, state.drift * fade, ctx.grid, Mover::Boss);
}

/// Next bite state and its duration, or `None` to stay put
type Transition = Option<(BiteState, u32)>;

fn step_bite(actor: &mut Actor, state: &mut BloodseekerState, ctx: &mut BossCtx<'_>, speed: f32, low: bool) {
    // An expiring cooldown hands over to hunting within the same tick
    if state.bite == BiteState::Cooldown && expire(&mut state.bite_timer) {
        log::debug!("Bloodseeker bite Cooldown -> Idle");
        state.bite = BiteState::Idle;
    }
    let transition = match state.bite {
        BiteState::Idle => bite_idle(actor, state, ctx, speed, low),
        BiteState::PreBite => bite_pre(actor, state, ctx),
        BiteState::Biting => bite_lunge(actor, state, ctx),
        BiteState::Recovery => bite_recover(actor, state, ctx),
        BiteState::Retreat => bite_retreat(actor, state, ctx),
        BiteState::Cooldown => None,
    };
    if let Some((next, timer)) = transition {
        log::debug!("Bloodseeker bite {:?} -> {:?}", state.bite, next);
        state.bite = next;
        state.bite_timer = timer;
    }
}

/// Count down one tick; true when the state's time is up
fn expire(timer: &mut u32) -> bool {
    *timer = timer.saturating_sub(1);
    *timer == 0
}

fn bite_idle(
    actor: &mut Actor,
    state: &mut BloodseekerState,
    ctx: &mut BossCtx<'_>,
    speed: f32,
    low: bool,
) -> Transition {
    let center = actor.center();
    if center.distance(ctx.player_center()) < BLOODSEEKER_BITE_RANGE {
        state.drift_timer = 0;
        return Some((BiteState::PreBite, BLOODSEEKER_PRE_BITE_DURATION));
    }

    state.chaos_timer = state.chaos_timer.saturating_sub(1);
    if state.chaos_timer == 0 {
        state.chaos_timer = 10 + (ctx.rng.next_f32() * 20.0) as u32;
        let noise = ctx.rng.range(-0.5, 0.5) * (PI / 1.5);
        state.hunt_angle = angle_between(center, ctx.player_center()) + noise;
    }

    let mut vel = unit_from_angle(state.hunt_angle) * speed;
    if low {
        vel += caution(actor, ctx);
        if vel.length() > speed {
            vel = vel.normalize_or_zero() * speed;
        }
    }

    let (moved_x, moved_y) = slide(actor, vel, ctx.grid, Mover::Enemy);
    if moved_x || moved_y {
        actor.dir = Direction::dominant(vel);
    }
    None
}

/// Push away from nearby wire, and from the player when too close
fn caution(actor: &Actor, ctx: &BossCtx<'_>) -> Vec2 {
    let center = actor.center();
    let mut push = Vec2::ZERO;
    for (tx, ty) in ctx
        .grid
        .tiles_near(tile_coord(center.x), tile_coord(center.y), 2, Tile::Wire)
    {
        let away = center - tile_center(tx, ty);
        let dist_sq = away.length_squared();
        if dist_sq > 0.0 && dist_sq < 10_000.0 {
            push += away * (2000.0 / dist_sq);
        }
    }
    let from_player = center - ctx.player_center();
    if from_player.length() < BLOODSEEKER_CAUTION_RADIUS {
        push += from_player * 0.05;
    }
    push
}

/// Face the player and line up on the perpendicular axis
fn bite_pre(actor: &mut Actor, state: &mut BloodseekerState, ctx: &BossCtx<'_>) -> Transition {
    let gap = ctx.player_center() - actor.center();
    let face = Direction::dominant(gap);
    actor.dir = face;

    let align = if face.is_vertical() {
        Vec2::new(gap.x, 0.0)
    } else {
        Vec2::new(0.0, gap.y)
    };
    if align.x.abs() > 2.0 || align.y.abs() > 2.0 {
        try_move(actor, align.signum() * align.abs().min(Vec2::ONE), ctx.grid, Mover::Boss);
    }

    if !expire(&mut state.bite_timer) {
        return None;
    }
    state.drift = face.unit() * BLOODSEEKER_BITE_SPEED;
    Some((BiteState::Biting, BLOODSEEKER_BITE_DURATION))
}

/// Straight lunge that crosses wire. A solid tile ends it early.
fn bite_lunge(actor: &mut Actor, state: &mut BloodseekerState, ctx: &mut BossCtx<'_>) -> Transition {
    let recovery = Some((BiteState::Recovery, BLOODSEEKER_RECOVERY_DURATION));
    if !try_move(actor, state.drift, ctx.grid, Mover::Boss) {
        return recovery;
    }

    if state.bite_timer % 4 == 0 {
        let spray = Vec2::new(ctx.rng.range(-0.5, 0.5), ctx.rng.range(-0.5, 0.5));
        ctx.effects
            .push_particle(actor.center(), spray, ParticleKind::Saliva, 15);
    }
    if actor.rect().overlaps(&ctx.player.rect()) {
        let at = ctx.player.center();
        if ctx.hurt_player().landed() {
            ctx.effects.impact(at, 10);
        }
    }

    if expire(&mut state.bite_timer) { recovery } else { None }
}

fn bite_recover(actor: &mut Actor, state: &mut BloodseekerState, ctx: &BossCtx<'_>) -> Transition {
    state.drift *= BLOODSEEKER_RECOVERY_FRICTION;
    let mut step = state.drift;
    if step.x.abs() <= 0.5 {
        step.x = 0.0;
    }
    if step.y.abs() <= 0.5 {
        step.y = 0.0;
    }
    if step != Vec2::ZERO {
        try_move(actor, step, ctx.grid, Mover::Boss);
    }

    expire(&mut state.bite_timer).then_some((BiteState::Retreat, BLOODSEEKER_RETREAT_DURATION))
}

/// Back off from the player; the last retreat step becomes the residual drift
fn bite_retreat(actor: &mut Actor, state: &mut BloodseekerState, ctx: &BossCtx<'_>) -> Transition {
    let step = (actor.center() - ctx.player_center()).normalize_or_zero() * BLOODSEEKER_RETREAT_SPEED;

    let (moved_x, moved_y) = slide(actor, step, ctx.grid, Mover::Boss);
    if moved_x || moved_y {
        state.drift = if step.x.abs() > step.y.abs() {
            Vec2::new(step.x, 0.0)
        } else {
            Vec2::new(0.0, step.y)
        };
        state.drift_timer = BLOODSEEKER_DRIFT_DURATION;
    }

    expire(&mut state.bite_timer).then_some((BiteState::Cooldown, BLOODSEEKER_BITE_COOLDOWN))
}
