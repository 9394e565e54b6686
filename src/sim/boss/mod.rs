//! Boss actors
//!
//! A boss is an `Actor` plus an intro gate plus a brain. The brain is a tagged union with one
//! fully-typed state record per boss kind; only that boss's AI module touches its record.
//! No AI, attack, or contact damage runs until the intro reaches `Fight`.

pub mod bloodseeker;
pub mod juggernaut;
pub mod medusa;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, Direction, HitOutcome};
use super::effects::EffectStream;
use super::grid::{Grid, Mover};
use super::levels::BossKind;
use super::projectile::Projectile;
use super::rng::RandomSource;
use super::state::{GameEvent, report_player_hit};
use crate::consts::*;

pub use bloodseeker::{BiteState, BloodseekerState, Tentacle};
pub use juggernaut::JuggernautState;
pub use medusa::{AttackState, MedusaState};

/// Intro gate. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntroState {
    /// Hidden in the fog
    Dormant,
    Appearing { timer: u32 },
    Awakening { timer: u32 },
    Fight,
}

impl IntroState {
    /// Position in the forward-only sequence
    pub fn rank(self) -> u8 {
        match self {
            IntroState::Dormant => 0,
            IntroState::Appearing { .. } => 1,
            IntroState::Awakening { .. } => 2,
            IntroState::Fight => 3,
        }
    }
}

/// Per-kind private state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BossBrain {
    Juggernaut(JuggernautState),
    Medusa(MedusaState),
    Bloodseeker(BloodseekerState),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    pub actor: Actor,
    pub intro: IntroState,
    pub brain: BossBrain,
}

/// Shared world access for one boss update
pub struct BossCtx<'a> {
    pub grid: &'a Grid,
    pub player: &'a mut Actor,
    pub projectiles: &'a mut Vec<Projectile>,
    pub effects: &'a mut EffectStream,
    pub rng: &'a mut dyn RandomSource,
    pub events: &'a mut Vec<GameEvent>,
    pub score: &'a mut u64,
    pub god_mode: bool,
    /// Player's movement intent this tick
    pub move_intent: Option<Direction>,
}

impl BossCtx<'_> {
    pub fn player_center(&self) -> Vec2 {
        self.player.center()
    }

    /// Guarded one-point hit on the player
    pub fn hurt_player(&mut self) -> HitOutcome {
        let outcome = self.player.hurt(1.0, self.god_mode);
        report_player_hit(outcome, self.player, self.effects, self.events);
        outcome
    }

    /// Lethal contact that still respects god mode and invulnerability
    pub fn crush_player(&mut self) -> HitOutcome {
        let outcome = self.player.kill_unless_protected(self.god_mode);
        report_player_hit(outcome, self.player, self.effects, self.events);
        outcome
    }

    pub fn award(&mut self, amount: u64) {
        *self.score += amount;
        self.events.push(GameEvent::ScoreAwarded {
            amount,
            total: *self.score,
        });
    }
}

/// Move by `delta` if the destination is free for `mover`
pub(crate) fn try_move(actor: &mut Actor, delta: Vec2, grid: &Grid, mover: Mover) -> bool {
    let dest = actor.rect().translated(delta);
    if grid.box_overlaps_solid(&dest, mover) {
        return false;
    }
    actor.pos += delta;
    true
}

/// Per-axis slide: X and Y are tried and rejected independently
pub(crate) fn slide(actor: &mut Actor, delta: Vec2, grid: &Grid, mover: Mover) -> (bool, bool) {
    let moved_x = delta.x != 0.0 && try_move(actor, Vec2::new(delta.x, 0.0), grid, mover);
    let moved_y = delta.y != 0.0 && try_move(actor, Vec2::new(0.0, delta.y), grid, mover);
    (moved_x, moved_y)
}

impl Boss {
    pub fn juggernaut(pos: Vec2) -> Self {
        Self {
            actor: Actor::new(pos, BOSS_SIZE, Direction::Down, BOSS_SPEED, BOSS_HP),
            intro: IntroState::Dormant,
            brain: BossBrain::Juggernaut(JuggernautState::default()),
        }
    }

    pub fn medusa(pos: Vec2) -> Self {
        Self {
            actor: Actor::new(pos, MEDUSA_SIZE, Direction::Down, MEDUSA_SPEED, MEDUSA_HP),
            intro: IntroState::Dormant,
            brain: BossBrain::Medusa(MedusaState::default()),
        }
    }

    /// Starts in `Fight`: no intro animation
    pub fn bloodseeker(pos: Vec2) -> Self {
        Self {
            actor: Actor::new(
                pos,
                BLOODSEEKER_SIZE,
                Direction::Down,
                BLOODSEEKER_BASE_SPEED,
                BLOODSEEKER_HP,
            ),
            intro: IntroState::Fight,
            brain: BossBrain::Bloodseeker(BloodseekerState::default()),
        }
    }

    pub fn kind(&self) -> BossKind {
        match self.brain {
            BossBrain::Juggernaut(_) => BossKind::Juggernaut,
            BossBrain::Medusa(_) => BossKind::Medusa,
            BossBrain::Bloodseeker(_) => BossKind::Bloodseeker,
        }
    }

    pub fn in_fight(&self) -> bool {
        self.intro == IntroState::Fight
    }

    /// Bullet damage after defense buff, petrification and stun
    pub fn incoming_damage(&self, base: f32) -> f32 {
        match &self.brain {
            BossBrain::Juggernaut(j) => {
                if j.defense_buff > 0 { base * 0.5 } else { base }
            }
            BossBrain::Medusa(m) => {
                let damage = if m.phase == 2 { base * 0.25 } else { base };
                if m.stun > 0 { damage * 2.0 } else { damage }
            }
            BossBrain::Bloodseeker(_) => base,
        }
    }

    /// The fog lifted. Dormant bosses start their entrance.
    pub fn on_fog_cleared(&mut self, effects: &mut EffectStream, events: &mut Vec<GameEvent>) {
        if self.intro != IntroState::Dormant {
            return;
        }
        self.intro = match self.brain {
            // Medusa skips the animated entrance
            BossBrain::Medusa(_) => {
                effects.smoke(self.actor.center(), 20);
                IntroState::Fight
            }
            _ => IntroState::Appearing {
                timer: BOSS_APPEAR_DURATION,
            },
        };
        log::info!("{:?} intro -> {:?}", self.kind(), self.intro);
        events.push(GameEvent::BossIntroAdvanced { stage: self.intro });
    }

    /// Step the Appearing/Awakening countdowns
    fn advance_intro(&mut self, ctx: &mut BossCtx<'_>) {
        let next = match &mut self.intro {
            IntroState::Dormant | IntroState::Fight => return,
            IntroState::Appearing { timer } => {
                if *timer > 0 {
                    *timer -= 1;
                    return;
                }
                IntroState::Awakening {
                    timer: BOSS_AWAKEN_DURATION,
                }
            }
            IntroState::Awakening { timer } => {
                if *timer > 0 {
                    *timer -= 1;
                    let t = *timer;
                    if let BossBrain::Juggernaut(_) = self.brain {
                        juggernaut::awakening_particles(&self.actor, t, ctx);
                    }
                    return;
                }
                ctx.effects.impact(self.actor.center(), 20);
                IntroState::Fight
            }
        };
        self.intro = next;
        log::info!("{:?} intro -> {:?}", self.kind(), self.intro);
        ctx.events.push(GameEvent::BossIntroAdvanced { stage: next });
    }

    /// One tick of boss behavior
    pub fn update(&mut self, ctx: &mut BossCtx<'_>) {
        if self.actor.dead {
            return;
        }
        if !self.in_fight() {
            self.advance_intro(ctx);
            return;
        }

        match &mut self.brain {
            BossBrain::Juggernaut(state) => juggernaut::update(&mut self.actor, state, ctx),
            BossBrain::Medusa(state) => medusa::update(&mut self.actor, state, ctx),
            BossBrain::Bloodseeker(state) => bloodseeker::update(&mut self.actor, state, ctx),
        }
    }
}
