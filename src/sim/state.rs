//! Session aggregate and observable state
//!
//! One `GameState` owns every collection for a level session. Restarting replaces all of
//! them at once; nothing lives in module-level state.

use glam::Vec2;

use super::actor::{Actor, Direction, HitOutcome};
use super::boss::{Boss, IntroState};
use super::effects::{EffectStream, EffectView};
use super::enemy::Spawner;
use super::grid::Grid;
use super::levels::{self, BossKind, LevelDef, LevelError};
use super::projectile::Projectile;
use super::rng::{self, RandomSource};
use crate::consts::*;
use crate::settings::Settings;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Playing,
    Paused,
    Victory,
    Defeat,
}

/// Level outcome as seen by the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelOutcome {
    Playing,
    Victory,
    Defeat,
}

/// Things that happened during a tick, drained by the host
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ScoreAwarded { amount: u64, total: u64 },
    PlayerHurt { hp: f32 },
    PlayerKilled,
    PlayerHealed { hp: f32 },
    EnemySpawned,
    EnemyDestroyed,
    FogCleared { tiles: usize },
    BossIntroAdvanced { stage: IntroState },
    MedusaPhaseChanged { phase: u8 },
    BloodseekerEnraged,
    BossDefeated { kind: BossKind },
    BaseDestroyed,
    GodModeToggled { enabled: bool },
    Restarted,
    Victory,
    Defeat,
}

/// Turn a damage attempt on the player into events (and a death explosion)
pub(crate) fn report_player_hit(
    outcome: HitOutcome,
    player: &Actor,
    effects: &mut EffectStream,
    events: &mut Vec<GameEvent>,
) {
    match outcome {
        HitOutcome::Ignored => {}
        HitOutcome::Hurt => events.push(GameEvent::PlayerHurt { hp: player.hp }),
        HitOutcome::Killed => {
            effects.explosion(player.center());
            events.push(GameEvent::PlayerKilled);
        }
    }
}

/// Complete level session
pub struct GameState {
    /// Level index (1-4)
    pub level: u32,
    /// Meta-progress flags read at session start
    pub settings: Settings,
    pub grid: Grid,
    pub player: Actor,
    /// Standard enemies (level 1 only)
    pub enemies: Vec<Actor>,
    /// At most one boss per level
    pub boss: Option<Boss>,
    pub projectiles: Vec<Projectile>,
    pub effects: EffectStream,
    pub phase: GamePhase,
    pub score: u64,
    pub spawner: Spawner,
    /// Debug immunity to every damage source
    pub god_mode: bool,
    pub heal_charges: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) rng: Box<dyn RandomSource>,
}

impl GameState {
    /// Start a session on `level` with an entropy-seeded random source
    pub fn new(level: u32, settings: Settings) -> Result<Self, LevelError> {
        Self::with_rng(level, settings, rng::from_entropy())
    }

    /// Start a session with an injected random source
    pub fn with_rng(
        level: u32,
        settings: Settings,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, LevelError> {
        let def = levels::load(level)?;
        log::info!("Starting level {}", level);
        Ok(Self::from_def(def, settings, rng))
    }

    fn from_def(def: LevelDef, settings: Settings, rng: Box<dyn RandomSource>) -> Self {
        let boss = def.boss.map(|kind| match kind {
            BossKind::Juggernaut => Boss::juggernaut(Vec2::new(
                GRID_WIDTH as f32 / 2.0 * TILE_SIZE - BOSS_SIZE / 2.0,
                TILE_SIZE * 2.0,
            )),
            BossKind::Medusa => Boss::medusa(arena_center() - Vec2::splat(MEDUSA_SIZE / 2.0)),
            BossKind::Bloodseeker => {
                Boss::bloodseeker(arena_center() - Vec2::splat(BLOODSEEKER_SIZE / 2.0))
            }
        });

        Self {
            level: def.index,
            heal_charges: settings.starting_heal_charges(),
            settings,
            grid: def.grid,
            player: Actor::new(
                levels::player_spawn(),
                TANK_SIZE,
                Direction::Up,
                PLAYER_SPEED,
                PLAYER_MAX_HP,
            ),
            enemies: Vec::new(),
            boss,
            projectiles: Vec::new(),
            effects: EffectStream::default(),
            phase: GamePhase::Playing,
            score: 0,
            spawner: Spawner::new(def.enemy_budget),
            god_mode: false,
            time_ticks: 0,
            events: Vec::new(),
            rng,
        }
    }

    /// Replace every collection with a fresh copy of the same level.
    ///
    /// Settings, god mode and the random source carry over.
    pub fn restart(&mut self) -> Result<(), LevelError> {
        let def = levels::load(self.level)?;
        let rng = std::mem::replace(&mut self.rng, Box::new(rng::FixedRng(0.0)));
        let mut fresh = Self::from_def(def, self.settings.clone(), rng);
        fresh.god_mode = self.god_mode;
        fresh.events.push(GameEvent::Restarted);
        log::info!("Restarted level {}", self.level);
        *self = fresh;
        Ok(())
    }

    pub fn player_hp(&self) -> f32 {
        self.player.hp
    }

    /// Spawn budget plus everything still alive
    pub fn enemies_remaining(&self) -> u32 {
        let live = self.enemies.iter().filter(|e| e.is_alive()).count() as u32;
        let boss = self.boss.as_ref().is_some_and(|b| b.actor.is_alive()) as u32;
        self.spawner.budget + live + boss
    }

    pub fn outcome(&self) -> LevelOutcome {
        match self.phase {
            GamePhase::Playing | GamePhase::Paused => LevelOutcome::Playing,
            GamePhase::Victory => LevelOutcome::Victory,
            GamePhase::Defeat => LevelOutcome::Defeat,
        }
    }

    /// Read-only effect stream for the renderer
    pub fn effects(&self) -> impl Iterator<Item = EffectView> + '_ {
        self.effects.views()
    }

    /// Take everything reported since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Swap the random source (tests, replays)
    pub fn set_rng(&mut self, rng: Box<dyn RandomSource>) {
        self.rng = rng;
    }
}

fn arena_center() -> Vec2 {
    Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0)
}
