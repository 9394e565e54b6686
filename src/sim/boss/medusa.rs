//! Medusa: phase-driven ranged boss
//!
//! Phase comes from the HP ratio and only ever goes up:
//! 1. tracking with jitter, shotgun bursts
//! 2. petrified: slow, heavily armored, bouncing moon discs, no snake hair
//! 3. mirrors the player's input, charges and fires a laser
//! 4. bouncing madness, lethal on contact
//!
//! Independent of phase, getting behind her stuns her (double damage taken), and the snake
//! hair occasionally spits slow red orbs.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{BossCtx, try_move};
use crate::consts::*;
use crate::sim::actor::{Actor, Direction};
use crate::sim::collision::segment_hits_circle;
use crate::sim::effects::ParticleKind;
use crate::sim::grid::Mover;
use crate::sim::projectile::{Owner, Projectile, Variant};
use crate::sim::state::GameEvent;
use crate::{angle_between, unit_from_angle};

/// Ranged attack cycle used in phases 1 and 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttackState {
    #[default]
    Idle,
    PreCharge,
    Charging,
    Firing,
    Shotgun,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedusaState {
    /// 1-4, never decreases
    pub phase: u8,
    pub attack: AttackState,
    pub attack_timer: u32,
    /// Shotgun bursts fired in the current volley
    pub burst: u32,
    /// Laser direction locked when charging starts
    pub aim_angle: f32,
    /// Ticks of backstab stun left
    pub stun: u32,
    pub backstab_cooldown: u32,
    pub snake_timer: u32,
    pub moon_disc_timer: u32,
    /// Phase 4 free velocity
    pub vel: Vec2,
}

impl Default for MedusaState {
    fn default() -> Self {
        Self {
            phase: 1,
            attack: AttackState::Idle,
            attack_timer: MEDUSA_ATTACK_COOLDOWN,
            burst: 0,
            aim_angle: 0.0,
            stun: 0,
            backstab_cooldown: 0,
            snake_timer: 0,
            moon_disc_timer: 0,
            vel: Vec2::ZERO,
        }
    }
}

pub(super) fn update(actor: &mut Actor, state: &mut MedusaState, ctx: &mut BossCtx<'_>) {
    state.backstab_cooldown = state.backstab_cooldown.saturating_sub(1);
    check_backstab(actor, state, ctx);

    if state.stun > 0 {
        state.stun -= 1;
        return;
    }

    if state.phase != 2 {
        snake_hair(actor, state, ctx);
    }

    update_phase(actor, state, ctx);

    if state.phase != 2 && ctx.rng.chance(0.7) {
        aura_particle(actor, state.phase, ctx);
    }

    if state.phase == 4 {
        madness(actor, state, ctx);
        return;
    }

    if state.phase == 2 && state.attack != AttackState::Idle {
        state.attack = AttackState::Idle;
        state.attack_timer = 0;
    }

    if ctx.player.is_alive() {
        if state.phase == 3 {
            mirror_player(actor, ctx);
        } else {
            track(actor, state.phase, ctx);
        }
    }

    if state.phase == 2 {
        moon_disc(actor, state, ctx);
    } else {
        step_attack(actor, state, ctx);
    }
}

/// Player is behind the current facing, close enough to strike
fn player_behind(actor: &Actor, player_center: Vec2) -> bool {
    let b = actor.center();
    let p = player_center;
    let behind = match actor.dir {
        Direction::Down => p.y < b.y - 10.0 && (p.x - b.x).abs() < actor.size.x,
        Direction::Up => p.y > b.y + 10.0 && (p.x - b.x).abs() < actor.size.x,
        Direction::Left => p.x > b.x + 10.0 && (p.y - b.y).abs() < actor.size.y,
        Direction::Right => p.x < b.x - 10.0 && (p.y - b.y).abs() < actor.size.y,
    };
    behind && b.distance(p) < actor.size.x * 1.5
}

fn check_backstab(actor: &Actor, state: &mut MedusaState, ctx: &mut BossCtx<'_>) {
    if !ctx.player.is_alive()
        || state.phase == 4
        || state.stun > 0
        || state.backstab_cooldown > 0
        || !player_behind(actor, ctx.player_center())
    {
        return;
    }
    state.stun = MEDUSA_BACKSTAB_DURATION;
    state.backstab_cooldown = MEDUSA_BACKSTAB_COOLDOWN;
    ctx.effects.smoke(actor.center(), 20);
    log::debug!("Medusa backstabbed, stunned for {} ticks", MEDUSA_BACKSTAB_DURATION);
}

/// Current head rotation, used to place the snakes
fn head_rotation(actor: &Actor, state: &MedusaState) -> f32 {
    if state.attack != AttackState::Idle {
        state.aim_angle
    } else if state.phase == 4 && state.vel != Vec2::ZERO {
        state.vel.y.atan2(state.vel.x)
    } else {
        actor.dir.angle()
    }
}

fn snake_hair(actor: &Actor, state: &mut MedusaState, ctx: &mut BossCtx<'_>) {
    state.snake_timer += 1;
    if state.snake_timer < MEDUSA_SNAKE_INTERVAL {
        return;
    }
    state.snake_timer = 0;

    let rotation = head_rotation(actor, state);
    let radius = actor.size.x / 2.0 * 1.2;
    let spacing = PI / (MEDUSA_SNAKE_HEADS - 1) as f32;
    for i in 0..MEDUSA_SNAKE_HEADS {
        if !ctx.rng.chance(MEDUSA_SNAKE_CHANCE) {
            continue;
        }
        let head = actor.center() + unit_from_angle(rotation + FRAC_PI_2 + spacing * i as f32) * radius;
        ctx.projectiles.push(Projectile::aimed(
            head,
            angle_between(head, ctx.player_center()),
            MEDUSA_SNAKE_BULLET_SPEED,
            Vec2::splat(BULLET_SIZE * 1.5),
            Owner::Boss,
            Variant::RedOrb,
        ));
    }
}

/// Raise the phase if the HP ratio crossed a threshold. Never lowers it.
fn update_phase(actor: &Actor, state: &mut MedusaState, ctx: &mut BossCtx<'_>) {
    let ratio = actor.hp_ratio();
    let next = if ratio <= 0.25 && state.phase < 4 {
        4
    } else if ratio <= 0.5 && state.phase < 3 {
        3
    } else if ratio <= 0.75 && state.phase < 2 {
        2
    } else {
        return;
    };

    let center = actor.center();
    match next {
        4 => {
            let angle = ctx.rng.range(0.0, TAU);
            state.vel = unit_from_angle(angle) * MEDUSA_PHASE_4_BASE_SPEED;
            state.attack = AttackState::Idle;
            ctx.effects.impact(center, 30);
        }
        3 => ctx.effects.push_particle(center, Vec2::ZERO, ParticleKind::Glitch, 20),
        _ => ctx.effects.smoke(center, 30),
    }

    log::info!("Medusa phase {} -> {}", state.phase, next);
    state.phase = next;
    ctx.events.push(GameEvent::MedusaPhaseChanged { phase: next });
}

fn aura_particle(actor: &Actor, phase: u8, ctx: &mut BossCtx<'_>) {
    let angle = ctx.rng.range(0.0, TAU);
    let at = actor.center() + unit_from_angle(angle) * (actor.size.x / 1.5);
    let vel = Vec2::new(ctx.rng.range(-0.25, 0.25), -1.0 - ctx.rng.next_f32());
    let kind = if phase == 4 { ParticleKind::Glitch } else { ParticleKind::Fire };
    let stage = 20 + ctx.rng.index(10) as u32;
    ctx.effects.push_particle(at, vel, kind, stage);
}

/// Phase 4: free bouncing with steering towards the player
fn madness(actor: &mut Actor, state: &mut MedusaState, ctx: &mut BossCtx<'_>) {
    let max_speed = MEDUSA_PHASE_4_BASE_SPEED * 2.5;
    let reflect = |v: f32| (-v * MEDUSA_PHASE_4_ACCEL).clamp(-max_speed, max_speed);
    let mut bounced = false;

    let next_x = actor.pos.x + state.vel.x;
    let ahead = actor.rect().at(Vec2::new(next_x, actor.pos.y));
    if next_x < 0.0 || next_x + actor.size.x > CANVAS_WIDTH || ctx.grid.box_overlaps_solid(&ahead, Mover::Enemy) {
        state.vel.x = reflect(state.vel.x);
        bounced = true;
    } else {
        actor.pos.x = next_x;
    }

    let next_y = actor.pos.y + state.vel.y;
    let ahead = actor.rect().at(Vec2::new(actor.pos.x, next_y));
    if next_y < 0.0 || next_y + actor.size.y > CANVAS_HEIGHT || ctx.grid.box_overlaps_solid(&ahead, Mover::Enemy) {
        state.vel.y = reflect(state.vel.y);
        bounced = true;
    } else {
        actor.pos.y = next_y;
    }

    if bounced {
        ctx.effects.impact(actor.center(), 10);
    }

    if !ctx.player.is_alive() {
        return;
    }
    let toward = angle_between(actor.center(), ctx.player_center());
    state.vel += unit_from_angle(toward) * MEDUSA_PHASE_4_STEER;

    if actor.rect().overlaps(&ctx.player.rect()) {
        ctx.crush_player();
    }
}

/// Phase 3: move opposite to the player's input, faster than usual
fn mirror_player(actor: &mut Actor, ctx: &mut BossCtx<'_>) {
    let Some(intent) = ctx.move_intent else {
        return;
    };
    let dir = intent.opposite();
    actor.dir = dir;
    let step = dir.unit() * actor.speed * 1.6;
    if step.x != 0.0 {
        try_move(actor, Vec2::new(step.x, 0.0), ctx.grid, Mover::Enemy);
    }
    if step.y != 0.0 {
        try_move(actor, Vec2::new(0.0, step.y), ctx.grid, Mover::Enemy);
    }
}

/// Phases 1-2: close the gap per axis; phase 1 twitches sideways, phase 2 is slowed
fn track(actor: &mut Actor, phase: u8, ctx: &mut BossCtx<'_>) {
    let speed = if phase == 2 { actor.speed * 0.75 } else { actor.speed };

    let mut jitter = Vec2::ZERO;
    if phase == 1 && ctx.rng.chance(0.2) {
        let amount = ctx.rng.range(-2.0, 2.0);
        if actor.dir.is_vertical() {
            jitter.x = amount;
        } else {
            jitter.y = amount;
        }
    }

    let gap = ctx.player_center() - actor.center();
    if gap.x.abs() > 10.0 {
        let dx = speed * gap.x.signum();
        if try_move(actor, Vec2::new(dx, 0.0) + jitter, ctx.grid, Mover::Enemy) {
            actor.dir = if dx > 0.0 { Direction::Right } else { Direction::Left };
        }
    }
    if gap.y.abs() > 10.0 {
        let dy = speed * gap.y.signum();
        if try_move(actor, Vec2::new(0.0, dy) + jitter, ctx.grid, Mover::Enemy) {
            actor.dir = if dy > 0.0 { Direction::Down } else { Direction::Up };
        }
    }
}

fn moon_disc(actor: &Actor, state: &mut MedusaState, ctx: &mut BossCtx<'_>) {
    state.moon_disc_timer = state.moon_disc_timer.saturating_sub(1);
    if state.moon_disc_timer > 0 {
        return;
    }
    state.moon_disc_timer = SALLY_MOON_DISC_COOLDOWN;
    let angle = angle_between(actor.center(), ctx.player_center());
    ctx.projectiles.push(Projectile::moon_disc(actor.center(), angle));
}

/// Next attack state and its timer, or `None` to stay put
type Transition = Option<(AttackState, u32)>;

fn step_attack(actor: &Actor, state: &mut MedusaState, ctx: &mut BossCtx<'_>) {
    let transition = match state.attack {
        AttackState::Idle => attack_idle(state),
        AttackState::PreCharge => attack_pre_charge(actor, state, ctx),
        AttackState::Charging => attack_charging(state),
        AttackState::Firing => attack_firing(actor, state, ctx),
        AttackState::Shotgun => attack_shotgun(actor, state, ctx),
    };
    if let Some((next, timer)) = transition {
        log::debug!("Medusa attack {:?} -> {:?}", state.attack, next);
        state.attack = next;
        state.attack_timer = timer;
    }
}

/// Count the timer down; true once it is already at zero
fn countdown(timer: &mut u32) -> bool {
    if *timer > 0 {
        *timer -= 1;
        false
    } else {
        true
    }
}

fn attack_idle(state: &mut MedusaState) -> Transition {
    if !countdown(&mut state.attack_timer) {
        return None;
    }
    if state.phase >= 3 {
        Some((AttackState::PreCharge, MEDUSA_PRE_CHARGE))
    } else {
        state.burst = 0;
        Some((AttackState::Shotgun, 0))
    }
}

fn attack_pre_charge(actor: &Actor, state: &mut MedusaState, ctx: &BossCtx<'_>) -> Transition {
    if !countdown(&mut state.attack_timer) {
        return None;
    }
    if ctx.player.is_alive() {
        state.aim_angle = angle_between(actor.center(), ctx.player_center());
    }
    Some((AttackState::Charging, MEDUSA_CHARGE))
}

fn attack_charging(state: &mut MedusaState) -> Transition {
    if !countdown(&mut state.attack_timer) {
        return None;
    }
    Some((AttackState::Firing, MEDUSA_LASER_DURATION))
}

fn attack_firing(actor: &Actor, state: &mut MedusaState, ctx: &mut BossCtx<'_>) -> Transition {
    let timer = state.attack_timer;
    if ctx.player.is_alive() && timer > 0 && timer % MEDUSA_LASER_TICK_INTERVAL == 0 {
        let hit = segment_hits_circle(
            actor.center(),
            state.aim_angle,
            MEDUSA_LASER_LENGTH,
            ctx.player_center(),
            ctx.player.size.x / 2.0,
            MEDUSA_LASER_WIDTH,
        );
        if hit {
            ctx.hurt_player();
        }
    }

    if !countdown(&mut state.attack_timer) {
        return None;
    }
    ctx.effects.laser_trace(actor.center(), state.aim_angle);
    Some((AttackState::Idle, MEDUSA_ATTACK_COOLDOWN))
}

fn attack_shotgun(actor: &Actor, state: &mut MedusaState, ctx: &mut BossCtx<'_>) -> Transition {
    if !countdown(&mut state.attack_timer) {
        return None;
    }
    if state.burst >= MEDUSA_SHOTGUN_BURSTS {
        return Some((AttackState::Idle, MEDUSA_ATTACK_COOLDOWN));
    }

    let center = actor.center();
    let base = angle_between(center, ctx.player_center());
    for _ in 0..MEDUSA_SHOTGUN_BULLET_COUNT {
        let spread = ctx.rng.range(-0.5, 0.5) * (PI / 2.5 * 0.85);
        ctx.projectiles.push(Projectile::aimed(
            center,
            base + spread,
            MEDUSA_BULLET_SPEED,
            Vec2::splat(BULLET_SIZE),
            Owner::Boss,
            Variant::Standard,
        ));
    }
    ctx.effects.impact(center, 10);
    state.burst += 1;
    state.attack_timer = MEDUSA_SHOTGUN_BURST_DELAY;
    None
}
