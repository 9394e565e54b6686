//! Player controller: movement, snapping, wire and fog, shooting, healing

use glam::Vec2;

use super::actor::{Actor, Direction};
use super::grid::{Mover, Tile, tile_center, tile_coord};
use super::projectile::{Owner, Projectile};
use super::state::{GameEvent, GameState, report_player_hit};
use super::tick::TickInput;
use crate::consts::*;

/// One tick of player control
pub fn update_player(state: &mut GameState, input: &TickInput) {
    if state.player.dead {
        return;
    }
    state.player.invulnerable = state.player.invulnerable.saturating_sub(1);

    if let Some(dir) = input.move_dir {
        move_player(state, dir);
    }
    if state.player.dead {
        return;
    }
    shoot(state, input.fire);
    if input.heal {
        heal(state);
    }
}

/// Align the perpendicular axis with the tile center when close enough.
/// The snapped box stays inside the tile under the tank's center.
fn snap_to_lane(player: &mut Actor, dir: Direction) {
    let center = player.center();
    let lane = tile_center(tile_coord(center.x), tile_coord(center.y));
    if dir.is_vertical() {
        if (center.x - lane.x).abs() < SNAP_DISTANCE {
            player.pos.x = lane.x - player.size.x / 2.0;
        }
    } else if (center.y - lane.y).abs() < SNAP_DISTANCE {
        player.pos.y = lane.y - player.size.y / 2.0;
    }
}

fn move_player(state: &mut GameState, dir: Direction) {
    if state.player.dir != dir {
        snap_to_lane(&mut state.player, dir);
    }
    state.player.dir = dir;

    let speed = state.player.speed * state.effects.player_speed_factor(state.player.center());
    let dest = state.player.rect().translated(dir.unit() * speed);

    if !state.god_mode && state.grid.box_touches(&dest, Tile::Wire) {
        let outcome = state.player.kill_unless_god(state.god_mode);
        state.effects.impact(state.player.center(), 20);
        report_player_hit(outcome, &state.player, &mut state.effects, &mut state.events);
        log::info!("Player ran into wire");
        return;
    }
    if state.grid.box_overlaps_solid(&dest, Mover::Player) {
        return;
    }
    state.player.pos = dest.pos;

    if state.grid.box_touches(&state.player.rect(), Tile::Fog) {
        lift_fog(state);
    }
}

/// Clear every fog tile on the map and wake a dormant boss
fn lift_fog(state: &mut GameState) {
    let cleared = state.grid.clear_fog();
    for &(cx, cy) in &cleared {
        if state.rng.chance(0.3) {
            state.effects.smoke(tile_center(cx, cy), 23);
        }
    }
    log::info!("Fog lifted ({} tiles)", cleared.len());
    state.events.push(GameEvent::FogCleared {
        tiles: cleared.len(),
    });
    if let Some(boss) = state.boss.as_mut() {
        boss.on_fog_cleared(&mut state.effects, &mut state.events);
    }
}

fn shoot(state: &mut GameState, fire: bool) {
    let player = &mut state.player;
    if player.cooldown > 0 {
        player.cooldown -= 1;
    }
    if !fire || player.cooldown > 0 {
        return;
    }
    state.projectiles.push(Projectile::axis(
        player.center(),
        player.dir,
        PLAYER_BULLET_SPEED,
        Owner::Player,
    ));
    player.cooldown = SHOOT_COOLDOWN;
}

fn heal(state: &mut GameState) {
    if !state.settings.heal_unlocked || state.player.hp >= state.player.max_hp {
        return;
    }
    if !state.settings.infinite_heal() {
        if state.heal_charges == 0 {
            return;
        }
        state.heal_charges -= 1;
    }
    state.player.hp += 1.0;
    state.effects.heal(state.player.center());
    state.events.push(GameEvent::PlayerHealed {
        hp: state.player.hp,
    });
    log::debug!("Player healed to {}, {} charges left", state.player.hp, state.heal_charges);
}
