//! Juggernaut: slow melee tank that turns into a chaotic dasher below half health

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{BossCtx, slide, try_move};
use crate::consts::*;
use crate::sim::actor::{Actor, Direction, HitOutcome};
use crate::sim::effects::ParticleKind;
use crate::sim::grid::Mover;
use crate::sim::projectile::{Owner, Projectile, Variant};
use crate::{angle_between, unit_from_angle};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JuggernautState {
    /// Ticks of halved incoming damage left (granted by ramming the player)
    pub defense_buff: u32,
    /// Counts up to the next glass spear while enraged
    pub special_timer: u32,
    /// Ticks until the next dash re-roll
    pub dash_timer: u32,
    pub dash: Vec2,
}

impl JuggernautState {
    pub fn is_enraged(actor: &Actor) -> bool {
        actor.hp <= actor.max_hp / 2.0
    }
}

/// Aura spiral and glitch squares while waking up
pub(super) fn awakening_particles(actor: &Actor, timer: u32, ctx: &mut BossCtx<'_>) {
    let center = actor.center();
    if timer % 3 == 0 {
        let angle = timer as f32 / 5.0;
        let at = center + unit_from_angle(angle) * 40.0;
        ctx.effects
            .push_particle(at, (center - at) * 0.05, ParticleKind::BossAura, 30);
    }
    if ctx.rng.chance(0.5) {
        let jitter = Vec2::new(ctx.rng.range(-25.0, 25.0), ctx.rng.range(-25.0, 25.0));
        let stage = 5 + ctx.rng.index(5) as u32;
        ctx.effects
            .push_particle(center + jitter, Vec2::ZERO, ParticleKind::Glitch, stage);
    }
}

pub(super) fn update(actor: &mut Actor, state: &mut JuggernautState, ctx: &mut BossCtx<'_>) {
    state.defense_buff = state.defense_buff.saturating_sub(1);

    if ctx.player.is_alive() && actor.rect().overlaps(&ctx.player.rect()) {
        if ctx.hurt_player() == HitOutcome::Hurt {
            ctx.effects.impact(ctx.player.center(), 5);
        }
        state.defense_buff = BOSS_DEFENSE_BUFF_DURATION;
    }

    if JuggernautState::is_enraged(actor) {
        rampage(actor, state, ctx);
    } else if ctx.player.is_alive() {
        track(actor, ctx);
    }

    fire_fan(actor, ctx);
}

/// Glass spear on a long cooldown plus random dashes towards the player
fn rampage(actor: &mut Actor, state: &mut JuggernautState, ctx: &mut BossCtx<'_>) {
    state.special_timer += 1;
    if state.special_timer >= GLASSCANNON_COOLDOWN {
        state.special_timer = 0;
        let angle = angle_between(actor.center(), ctx.player_center());
        ctx.projectiles.push(Projectile::aimed(
            actor.center(),
            angle,
            BOSS_BULLET_SPEED * GLASSCANNON_SPEED_FACTOR,
            Vec2::new(GLASSCANNON_SIZE, GLASSCANNON_SIZE / 3.0),
            Owner::Boss,
            Variant::GlassSpear,
        ));
        log::debug!("Juggernaut fired glass spear");
    }

    state.dash_timer = state.dash_timer.saturating_sub(1);
    if state.dash_timer == 0 {
        state.dash_timer = 20 + (ctx.rng.next_f32() * 30.0) as u32;
        if ctx.player.is_alive() {
            let noise = ctx.rng.range(-0.5, 0.5) * (PI / 1.5);
            let angle = angle_between(actor.center(), ctx.player_center()) + noise;
            state.dash = unit_from_angle(angle) * actor.speed * BOSS_RAGE_SPEED_MULT;
            actor.dir = Direction::dominant(state.dash);
        }
    }

    slide(actor, state.dash, ctx.grid, Mover::Enemy);
}

/// Close the gap on any axis that is more than 10px off
fn track(actor: &mut Actor, ctx: &mut BossCtx<'_>) {
    let gap = ctx.player_center() - actor.center();

    if gap.x.abs() > 10.0 {
        let dx = actor.speed * gap.x.signum();
        if try_move(actor, Vec2::new(dx, 0.0), ctx.grid, Mover::Enemy) {
            actor.dir = if dx > 0.0 { Direction::Right } else { Direction::Left };
        }
    }
    if gap.y.abs() > 10.0 {
        let dy = actor.speed * gap.y.signum();
        if try_move(actor, Vec2::new(0.0, dy), ctx.grid, Mover::Enemy) {
            actor.dir = if dy > 0.0 { Direction::Down } else { Direction::Up };
        }
    }
}

/// Three bullets (center, +-45 degrees) along the dominant axis towards the player
fn fire_fan(actor: &mut Actor, ctx: &mut BossCtx<'_>) {
    if actor.cooldown > 0 {
        actor.cooldown -= 1;
        return;
    }

    let toward = Direction::dominant(ctx.player_center() - actor.center());
    let base = match toward {
        Direction::Right => 0.0,
        Direction::Down => FRAC_PI_2,
        Direction::Left => PI,
        Direction::Up => -FRAC_PI_2,
    };
    for angle in [base, base - FRAC_PI_4, base + FRAC_PI_4] {
        ctx.projectiles.push(Projectile::aimed(
            actor.center(),
            angle,
            BOSS_BULLET_SPEED,
            Vec2::splat(BULLET_SIZE),
            Owner::Boss,
            Variant::Standard,
        ));
    }
    actor.cooldown = BOSS_SHOOT_COOLDOWN;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::boss::test_support::Arena;
    use crate::sim::boss::{Boss, BossBrain, IntroState};
    use crate::sim::grid::Tile;
    use crate::sim::rng::SequenceRng;

    fn fighting_boss(pos: Vec2) -> Boss {
        let mut boss = Boss::juggernaut(pos);
        boss.intro = IntroState::Fight;
        boss
    }

    fn state(boss: &Boss) -> &JuggernautState {
        match &boss.brain {
            BossBrain::Juggernaut(s) => s,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_fires_fan_towards_player() {
        let mut arena = Arena::open();
        let mut boss = fighting_boss(Vec2::new(400.0, 100.0));
        arena.place_player(Vec2::new(424.0, 500.0));
        arena.step(&mut boss);

        assert_eq!(arena.projectiles.len(), 3);
        // Centre shot goes straight down
        let v = arena.projectiles[0].velocity();
        assert!(v.x.abs() < 1e-4 && (v.y - BOSS_BULLET_SPEED).abs() < 1e-4);
        assert_eq!(boss.actor.cooldown, BOSS_SHOOT_COOLDOWN);

        arena.step(&mut boss);
        assert_eq!(arena.projectiles.len(), 3);
    }

    #[test]
    fn test_tracks_on_both_axes() {
        let mut arena = Arena::open();
        let mut boss = fighting_boss(Vec2::new(400.0, 100.0));
        arena.place_player(Vec2::new(200.0, 400.0));
        let before = boss.actor.pos;
        arena.step(&mut boss);
        assert!(boss.actor.pos.x < before.x);
        assert!(boss.actor.pos.y > before.y);
        assert_eq!(boss.actor.dir, Direction::Down);
    }

    #[test]
    fn test_ram_hurts_player_and_grants_defense() {
        let mut arena = Arena::open();
        let mut boss = fighting_boss(Vec2::new(400.0, 100.0));
        arena.place_player(boss.actor.center());
        arena.step(&mut boss);
        assert_eq!(arena.player.hp, PLAYER_MAX_HP - 1.0);
        assert_eq!(state(&boss).defense_buff, BOSS_DEFENSE_BUFF_DURATION);
        assert_eq!(boss.incoming_damage(1.0), 0.5);

        // Still overlapping during invulnerability: no damage, buff refreshed
        arena.step(&mut boss);
        assert_eq!(arena.player.hp, PLAYER_MAX_HP - 1.0);
        assert_eq!(state(&boss).defense_buff, BOSS_DEFENSE_BUFF_DURATION);
    }

    #[test]
    fn test_enraged_dash_and_glass_spear() {
        let mut arena = Arena::open();
        arena.rng = Box::new(SequenceRng::new(vec![0.5]));
        let mut boss = fighting_boss(Vec2::new(400.0, 300.0));
        boss.actor.hp = BOSS_HP / 2.0;
        boss.actor.cooldown = u32::MAX;
        // Player straight to the right; noise is zero at 0.5
        arena.place_player(Vec2::new(700.0, 324.0));

        let before = boss.actor.pos;
        arena.step(&mut boss);
        let dash = state(&boss).dash;
        assert!((dash.x - BOSS_SPEED * BOSS_RAGE_SPEED_MULT).abs() < 1e-4);
        assert!((boss.actor.pos.x - before.x - dash.x).abs() < 1e-4);
        assert_eq!(state(&boss).dash_timer, 35);

        for _ in 1..GLASSCANNON_COOLDOWN {
            arena.step(&mut boss);
        }
        assert!(arena.projectiles.iter().any(|p| p.variant == Variant::GlassSpear));
    }

    #[test]
    fn test_dash_rejects_blocked_axis_only() {
        let mut arena = Arena::open();
        let mut boss = fighting_boss(Vec2::new(400.0, 300.0));
        boss.actor.hp = 1.0;
        boss.actor.cooldown = u32::MAX;
        // Wall directly below the boss
        for x in 12..=14 {
            arena.grid.set_tile(x, 11, Tile::Steel);
        }
        boss.actor.pos.y = 11.0 * TILE_SIZE - BOSS_SIZE;
        if let BossBrain::Juggernaut(s) = &mut boss.brain {
            s.dash = Vec2::new(1.0, 1.0);
            s.dash_timer = 100;
        }
        let before = boss.actor.pos;
        arena.step(&mut boss);
        assert_eq!(boss.actor.pos, before + Vec2::new(1.0, 0.0));
    }
}
