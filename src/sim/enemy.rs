//! Standard enemy tanks and the level 1 spawner

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, Direction};
use super::collision::Rect;
use super::grid::{Grid, Mover};
use super::projectile::{Owner, Projectile};
use super::rng::RandomSource;
use super::state::GameEvent;
use crate::consts::*;

/// Spawn points along the top edge: left corner, middle, right corner
const SPAWN_POINTS: [Vec2; 3] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(13.0 * TILE_SIZE, 0.0),
    Vec2::new(25.0 * TILE_SIZE, 0.0),
];

/// Releases a finite budget of enemies, a few at a time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawner {
    pub timer: u32,
    /// Enemies not yet spawned
    pub budget: u32,
}

impl Spawner {
    pub fn new(budget: u32) -> Self {
        Self { timer: 0, budget }
    }

    /// Try to release one enemy. A blocked spawn point wastes the attempt.
    pub fn update(
        &mut self,
        enemies: &mut Vec<Actor>,
        player: &Actor,
        rng: &mut dyn RandomSource,
        events: &mut Vec<GameEvent>,
    ) {
        self.timer += 1;
        let live = enemies.iter().filter(|e| e.is_alive()).count();
        if self.timer <= ENEMY_SPAWN_INTERVAL || live >= MAX_LIVE_ENEMIES || self.budget == 0 {
            return;
        }
        self.timer = 0;

        let point = SPAWN_POINTS[rng.index(SPAWN_POINTS.len())];
        let slot = Rect::new(point.x, point.y, TANK_SIZE, TANK_SIZE);
        let blocked = enemies.iter().any(|e| e.rect().overlaps(&slot)) || player.rect().overlaps(&slot);
        if blocked {
            log::debug!("Spawn point {:?} blocked", point);
            return;
        }

        enemies.push(Actor::new(
            point + Vec2::splat(2.0),
            TANK_SIZE,
            Direction::Down,
            ENEMY_SPEED,
            1.0,
        ));
        self.budget -= 1;
        events.push(GameEvent::EnemySpawned);
        log::debug!("Enemy spawned at {:?}, {} left in budget", point, self.budget);
    }
}

/// Wander, turn on collision, fire at random
pub fn update_enemies(
    enemies: &mut [Actor],
    grid: &Grid,
    player: &Actor,
    boss: Option<&Actor>,
    projectiles: &mut Vec<Projectile>,
    rng: &mut dyn RandomSource,
) {
    for i in 0..enemies.len() {
        if enemies[i].dead {
            continue;
        }

        let next = enemies[i]
            .rect()
            .translated(enemies[i].dir.unit() * enemies[i].speed);
        let blocked = grid.box_overlaps_solid(&next, Mover::Enemy)
            || enemies
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && !other.dead && other.rect().overlaps(&next))
            || (player.is_alive() && player.rect().overlaps(&next))
            || boss.is_some_and(|b| b.is_alive() && b.rect().overlaps(&next));

        let enemy = &mut enemies[i];
        if blocked || rng.chance(ENEMY_TURN_CHANCE) {
            enemy.dir = Direction::ALL[rng.index(Direction::ALL.len())];
        } else {
            enemy.pos = next.pos;
        }

        if enemy.cooldown > 0 {
            enemy.cooldown -= 1;
        } else if rng.chance(ENEMY_FIRE_CHANCE) {
            projectiles.push(Projectile::axis(
                enemy.center(),
                enemy.dir,
                ENEMY_BULLET_SPEED,
                Owner::Enemy,
            ));
            enemy.cooldown = ENEMY_SHOOT_COOLDOWN;
        }
    }
}
