//! Fixed timestep simulation tick
//!
//! Runs every stage in a fixed order once per frame. Player input resolves first so all AI
//! sees the current player position; projectiles resolve after every shooter has fired;
//! compaction happens before effects decay so expiring pools append to a clean list.

use super::actor::Direction;
use super::boss::BossCtx;
use super::enemy::update_enemies;
use super::levels::LevelError;
use super::player::update_player;
use super::projectile::{ProjectileStage, annihilate_pairs, update_projectiles};
use super::state::{GameEvent, GamePhase, GameState, report_player_hit};

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Held movement direction (most recently pressed wins)
    pub move_dir: Option<Direction>,
    pub fire: bool,
    /// Heal pulse
    pub heal: bool,
    /// Pause toggle
    pub pause: bool,
    /// Reload the current level
    pub restart: bool,
    /// Debug immunity toggle
    pub toggle_god_mode: bool,
}

/// Held movement keys. The most recently pressed one still held wins.
#[derive(Debug, Clone, Default)]
pub struct DirectionStack {
    held: Vec<Direction>,
}

impl DirectionStack {
    pub fn press(&mut self, dir: Direction) {
        self.held.retain(|d| *d != dir);
        self.held.push(dir);
    }

    pub fn release(&mut self, dir: Direction) {
        self.held.retain(|d| *d != dir);
    }

    pub fn current(&self) -> Option<Direction> {
        self.held.last().copied()
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }
}

/// Advance the session by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) -> Result<(), LevelError> {
    if input.restart {
        return state.restart();
    }

    if input.pause {
        state.phase = match state.phase {
            GamePhase::Playing => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Playing,
            other => other,
        };
        log::debug!("Phase now {:?}", state.phase);
    }

    if input.toggle_god_mode {
        state.god_mode = !state.god_mode;
        state.effects.impact(state.player.center(), 20);
        state.events.push(GameEvent::GodModeToggled {
            enabled: state.god_mode,
        });
        log::info!("God mode {}", if state.god_mode { "on" } else { "off" });
    }

    if state.phase != GamePhase::Playing {
        return Ok(());
    }

    // Player first: everything below sees this tick's position
    update_player(state, input);

    state.spawner.update(
        &mut state.enemies,
        &state.player,
        state.rng.as_mut(),
        &mut state.events,
    );

    update_enemies(
        &mut state.enemies,
        &state.grid,
        &state.player,
        state.boss.as_ref().map(|b| &b.actor),
        &mut state.projectiles,
        state.rng.as_mut(),
    );

    if let Some(boss) = state.boss.as_mut() {
        let mut ctx = BossCtx {
            grid: &state.grid,
            player: &mut state.player,
            projectiles: &mut state.projectiles,
            effects: &mut state.effects,
            rng: state.rng.as_mut(),
            events: &mut state.events,
            score: &mut state.score,
            god_mode: state.god_mode,
            move_intent: input.move_dir,
        };
        boss.update(&mut ctx);
    }

    {
        let mut stage = ProjectileStage {
            grid: &mut state.grid,
            player: &mut state.player,
            enemies: &mut state.enemies,
            boss: state.boss.as_mut(),
            effects: &mut state.effects,
            rng: state.rng.as_mut(),
            events: &mut state.events,
            score: &mut state.score,
            god_mode: state.god_mode,
        };
        update_projectiles(&mut state.projectiles, &mut stage);
    }
    annihilate_pairs(&mut state.projectiles, &mut state.effects, state.rng.as_mut());

    // Compaction
    state.projectiles.retain(|p| p.active);
    state.enemies.retain(|e| e.is_alive());
    if state.boss.as_ref().is_some_and(|b| b.actor.dead) {
        state.boss = None;
    }

    let outcomes = state
        .effects
        .update(&mut state.player, state.god_mode, &mut state.projectiles);
    for outcome in outcomes {
        report_player_hit(outcome, &state.player, &mut state.effects, &mut state.events);
    }

    check_level_end(state);
    state.time_ticks += 1;
    Ok(())
}

fn check_level_end(state: &mut GameState) {
    if state.player.dead || !state.grid.base_intact() {
        state.phase = GamePhase::Defeat;
        state.events.push(GameEvent::Defeat);
        log::info!("Level {} lost after {} ticks", state.level, state.time_ticks);
    } else if state.spawner.budget == 0 && state.enemies.is_empty() && state.boss.is_none() {
        state.phase = GamePhase::Victory;
        state.events.push(GameEvent::Victory);
        state.settings.record_victory(state.level);
        log::info!(
            "Level {} cleared after {} ticks, score {}",
            state.level,
            state.time_ticks,
            state.score
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::settings::Settings;
    use crate::sim::actor::Actor;
    use crate::sim::grid::{Grid, Tile, tile_coord};
    use crate::sim::levels::BossKind;
    use crate::sim::projectile::{Owner, Projectile};
    use crate::sim::rng::FixedRng;
    use crate::sim::state::LevelOutcome;
    use glam::Vec2;

    fn session(level: u32) -> GameState {
        GameState::with_rng(level, Settings::default(), Box::new(FixedRng(0.5))).unwrap()
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    #[test]
    fn test_direction_stack_last_pressed_wins() {
        let mut keys = DirectionStack::default();
        keys.press(Direction::Up);
        keys.press(Direction::Left);
        assert_eq!(keys.current(), Some(Direction::Left));
        keys.release(Direction::Left);
        assert_eq!(keys.current(), Some(Direction::Up));
        keys.press(Direction::Up);
        keys.release(Direction::Up);
        assert_eq!(keys.current(), None);
    }

    #[test]
    fn test_first_shot_degrades_one_brick() {
        let mut state = session(1);
        let before = state.grid.clone();
        let fire = TickInput {
            fire: true,
            ..idle()
        };
        tick(&mut state, &fire).unwrap();
        assert_eq!(state.projectiles.len(), 1);
        let bullet = state.projectiles[0].clone();
        let cx = tile_coord(bullet.center().x);
        let start_y = bullet.center().y;

        // Nearest solid tile straight up the column
        let cy = (0..tile_coord(start_y))
            .rev()
            .find(|&cy| before.tile_at(cx, cy).is_some_and(|t| t.is_solid()))
            .unwrap();
        let wall_bottom = (cy + 1) as f32 * TILE_SIZE;
        let ticks = ((start_y - wall_bottom) / PLAYER_BULLET_SPEED).ceil() as u32 + 1;

        for _ in 0..ticks {
            tick(&mut state, &idle()).unwrap();
        }
        assert!(state.projectiles.iter().all(|p| p.owner != Owner::Player));
        let hit = before.tile_at(cx, cy).unwrap();
        assert_eq!(state.grid.tile_at(cx, cy), hit.degraded());
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut state = session(1);
        let pause = TickInput {
            pause: true,
            ..idle()
        };
        tick(&mut state, &pause).unwrap();
        assert_eq!(state.phase, GamePhase::Paused);
        let ticks = state.time_ticks;
        tick(&mut state, &idle()).unwrap();
        assert_eq!(state.time_ticks, ticks);
        tick(&mut state, &pause).unwrap();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.time_ticks, ticks + 1);
    }

    #[test]
    fn test_god_mode_toggle_emits_event() {
        let mut state = session(1);
        let toggle = TickInput {
            toggle_god_mode: true,
            ..idle()
        };
        tick(&mut state, &toggle).unwrap();
        assert!(state.god_mode);
        assert!(state
            .drain_events()
            .contains(&GameEvent::GodModeToggled { enabled: true }));
    }

    #[test]
    fn test_restart_resets_session() {
        let mut state = session(1);
        state.score = 300;
        state.player.hp = 1.0;
        tick(
            &mut state,
            &TickInput {
                restart: true,
                ..idle()
            },
        )
        .unwrap();
        assert_eq!(state.score, 0);
        assert_eq!(state.player_hp(), PLAYER_MAX_HP);
        assert_eq!(state.outcome(), LevelOutcome::Playing);
    }

    #[test]
    fn test_enemy_bullet_kills_player_and_ends_level() {
        let mut state = session(1);
        state.player.hp = 1.0;
        let target = state.player.center();
        state.projectiles.push(Projectile::axis(
            target,
            Direction::Down,
            ENEMY_BULLET_SPEED,
            Owner::Enemy,
        ));
        tick(&mut state, &idle()).unwrap();
        assert!(state.player.dead);
        assert_eq!(state.outcome(), LevelOutcome::Defeat);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::PlayerKilled));
        assert!(events.contains(&GameEvent::Defeat));

        // Frozen afterwards
        let ticks = state.time_ticks;
        tick(&mut state, &idle()).unwrap();
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_shooting_base_loses_level() {
        let mut state = session(1);
        state.grid = Grid::filled(GRID_WIDTH, GRID_HEIGHT, Tile::Empty);
        state.grid.set_tile(3, 3, Tile::Base);
        state.projectiles.push(Projectile::axis(
            Vec2::new(3.5 * TILE_SIZE, 4.0 * TILE_SIZE + 2.0),
            Direction::Up,
            ENEMY_BULLET_SPEED,
            Owner::Enemy,
        ));
        tick(&mut state, &idle()).unwrap();
        assert!(!state.grid.base_intact());
        assert_eq!(state.outcome(), LevelOutcome::Defeat);
        assert!(state.drain_events().contains(&GameEvent::BaseDestroyed));
    }

    #[test]
    fn test_boss_kill_wins_and_unlocks_next_level() {
        let mut state = session(2);
        state.settings.unlocked_level = 2;
        state.boss.as_mut().unwrap().actor.dead = true;
        tick(&mut state, &idle()).unwrap();
        assert!(state.boss.is_none());
        assert_eq!(state.outcome(), LevelOutcome::Victory);
        assert_eq!(state.settings.unlocked_level, 3);
        assert_eq!(state.enemies_remaining(), 0);
    }

    #[test]
    fn test_player_bullet_finishes_boss() {
        let mut state = session(4);
        let boss = state.boss.as_mut().unwrap();
        boss.actor.hp = 1.0;
        let at = boss.actor.center();
        state
            .projectiles
            .push(Projectile::axis(at, Direction::Up, 0.1, Owner::Player));
        tick(&mut state, &idle()).unwrap();
        assert!(state.boss.is_none());
        assert_eq!(state.score, BOSS_SCORE);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::BossDefeated {
            kind: BossKind::Bloodseeker
        }));
        assert!(events.contains(&GameEvent::Victory));
    }

    #[test]
    fn test_level_one_spawns_enemies_over_time() {
        let mut state = session(1);
        state.god_mode = true;
        for _ in 0..=ENEMY_SPAWN_INTERVAL {
            tick(&mut state, &idle()).unwrap();
        }
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.spawner.budget, LEVEL_ONE_ENEMY_BUDGET - 1);
        assert_eq!(state.enemies_remaining(), LEVEL_ONE_ENEMY_BUDGET);
    }

    #[test]
    fn test_big_pool_expiry_hurts_player() {
        let mut state = session(4);
        state.boss = None;
        state.spawner.budget = 1;
        let center = state.player.center();
        state
            .effects
            .add_hazard(crate::sim::effects::HazardField::big_blood_pool(center));
        for _ in 0..BLOODSEEKER_BIG_POOL_DURATION {
            tick(&mut state, &idle()).unwrap();
        }
        assert_eq!(state.player.hp, PLAYER_MAX_HP - 1.0);
        assert!(state.effects.hazards().is_empty());
    }

    #[test]
    fn test_standard_enemies_block_on_player() {
        let mut state = session(1);
        state.god_mode = true;
        state.grid = Grid::filled(GRID_WIDTH, GRID_HEIGHT, Tile::Empty);
        let above = state.player.pos - Vec2::new(0.0, TANK_SIZE);
        state.enemies.push(Actor::new(above, TANK_SIZE, Direction::Down, ENEMY_SPEED, 1.0));
        tick(&mut state, &idle()).unwrap();
        assert_eq!(state.enemies[0].pos, above);
    }
}
