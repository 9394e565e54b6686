//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Fixed timestep only, constants are in ticks
//! - Randomness only through the injected `RandomSource`
//! - Stable iteration order (insertion order of every collection)
//! - No rendering or platform dependencies

pub mod actor;
pub mod boss;
pub mod collision;
pub mod effects;
pub mod enemy;
pub mod grid;
pub mod levels;
pub mod player;
pub mod projectile;
pub mod rng;
pub mod state;
pub mod tick;

pub use actor::{Actor, Direction, HitOutcome};
pub use boss::{Boss, BossBrain, BossCtx, IntroState};
pub use collision::{Rect, segment_hits_circle};
pub use effects::{EffectKind, EffectStream, EffectView, HazardField, HazardKind, ParticleKind};
pub use enemy::Spawner;
pub use grid::{Grid, Mover, Tile, TileHit};
pub use levels::{BossKind, LevelDef, LevelError};
pub use projectile::{Motion, Owner, Projectile, Variant};
pub use rng::{FixedRng, RandomSource, SequenceRng};
pub use state::{GameEvent, GamePhase, GameState, LevelOutcome};
pub use tick::{DirectionStack, TickInput, tick};
