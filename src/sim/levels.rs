//! Static level layouts
//!
//! Layouts are glyph rows (one char per tile). Level 1 is a hand-drawn brick maze guarding
//! the base; levels 2-4 are boss arenas built procedurally from a few rules.

use glam::Vec2;
use thiserror::Error;

use super::grid::{Grid, Tile};
use crate::consts::{GRID_HEIGHT, GRID_WIDTH, LEVEL_ONE_ENEMY_BUDGET, TANK_SIZE, TILE_SIZE};

/// Errors raised while loading a level
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("unknown level {0} (expected 1..=4)")]
    UnknownLevel(u32),
    #[error("layout has {found} rows, expected {expected}")]
    RowCount { expected: usize, found: usize },
    #[error("layout row {row} is {found} tiles wide, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown tile glyph {glyph:?} at ({col}, {row})")]
    UnknownGlyph { glyph: char, col: usize, row: usize },
}

/// Which boss a level seeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossKind {
    Juggernaut,
    Medusa,
    Bloodseeker,
}

/// Everything needed to start a level session
#[derive(Debug, Clone)]
pub struct LevelDef {
    pub index: u32,
    pub grid: Grid,
    pub enemy_budget: u32,
    pub boss: Option<BossKind>,
}

impl Grid {
    /// Parse glyph rows into a grid of the given dimensions
    pub fn parse(rows: &[&str], width: usize, height: usize) -> Result<Grid, LevelError> {
        if rows.len() != height {
            return Err(LevelError::RowCount {
                expected: height,
                found: rows.len(),
            });
        }

        let mut tiles = Vec::with_capacity(width * height);
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(LevelError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            for (col, glyph) in line.chars().enumerate() {
                let tile =
                    Tile::from_glyph(glyph).ok_or(LevelError::UnknownGlyph { glyph, col, row })?;
                tiles.push(tile);
            }
        }

        Ok(Grid::from_tiles(width, height, tiles))
    }
}

const LEVEL_ONE: [&str; GRID_HEIGHT] = [
    "..........................",
    "..........................",
    ".#.#.#.#.#.#..#.#.#.#.#.#.",
    ".#.#.#.#.S.#..#.S.#.#.#.#.",
    ".#.#.#.#.#.#..#.#.#.#.#.#.",
    "..........................",
    "..........................",
    "..........................",
    ".#.#.#.#.#.#..#.#.#.#.#.#.",
    ".#.#.#.#.#.#..#.#.#.#.#.#.",
    ".#.#.#S#.#.#..#.#.#S#.#.#.",
    ".#.#.#.#.#.#..#.#.#.#.#.#.",
    ".#.#.....#.#..#.#.....#.#.",
    ".....~~~.........~~~......",
    ".#.#.....#.#..#.#.....#.#.",
    ".#.#.#S#.#.#..#.#.#S#.#.#.",
    ".#.#.#.#.#.#..#.#.#.#.#.#.",
    ".#.#.#.#.#.#..#.#.#.#.#.#.",
    "............SSS...........",
    "............SBS...........",
];

/// Level 2: fogged arena with four steel pillars, clear strip at the bottom
fn juggernaut_arena() -> Grid {
    let mut grid = Grid::filled(GRID_WIDTH, GRID_HEIGHT, Tile::Fog);
    for y in [2, 3, 16, 17] {
        for x in [4, 5, 20, 21] {
            grid.set_tile(x, y, Tile::Steel);
        }
    }
    clear_rows(&mut grid, GRID_HEIGHT - 2..GRID_HEIGHT, 0..GRID_WIDTH);
    grid
}

/// Level 3: open fog
fn medusa_arena() -> Grid {
    let mut grid = Grid::filled(GRID_WIDTH, GRID_HEIGHT, Tile::Fog);
    clear_rows(&mut grid, GRID_HEIGHT - 2..GRID_HEIGHT, 0..GRID_WIDTH);
    grid
}

/// Level 4: wire-fenced fog arena with steel cover and wire traps
fn bloodseeker_arena() -> Grid {
    let mut grid = Grid::filled(GRID_WIDTH, GRID_HEIGHT, Tile::Fog);
    let last = GRID_WIDTH as i32 - 1;
    for y in 0..GRID_HEIGHT as i32 {
        grid.set_tile(0, y, Tile::Wire);
        grid.set_tile(last, y, Tile::Wire);
    }
    clear_rows(&mut grid, GRID_HEIGHT - 2..GRID_HEIGHT, 1..GRID_WIDTH - 1);
    for y in [7, 8, 12, 13] {
        for x in [10, 11, 14, 15] {
            grid.set_tile(x, y, Tile::Steel);
        }
        grid.set_tile(7, y, Tile::Wire);
        grid.set_tile(18, y, Tile::Wire);
    }
    grid.set_tile(8, 15, Tile::Steel);
    grid.set_tile(17, 15, Tile::Steel);
    grid
}

fn clear_rows(grid: &mut Grid, rows: std::ops::Range<usize>, cols: std::ops::Range<usize>) {
    for y in rows {
        for x in cols.clone() {
            grid.set_tile(x as i32, y as i32, Tile::Empty);
        }
    }
}

/// Build the static definition for a level index (1-4)
pub fn load(index: u32) -> Result<LevelDef, LevelError> {
    let (grid, enemy_budget, boss) = match index {
        1 => (
            Grid::parse(&LEVEL_ONE, GRID_WIDTH, GRID_HEIGHT)?,
            LEVEL_ONE_ENEMY_BUDGET,
            None,
        ),
        2 => (juggernaut_arena(), 0, Some(BossKind::Juggernaut)),
        3 => (medusa_arena(), 0, Some(BossKind::Medusa)),
        4 => (bloodseeker_arena(), 0, Some(BossKind::Bloodseeker)),
        other => return Err(LevelError::UnknownLevel(other)),
    };

    log::debug!(
        "Loaded level {}: {} fog, {} wire, budget {}",
        index,
        grid.count(Tile::Fog),
        grid.count(Tile::Wire),
        enemy_budget
    );

    Ok(LevelDef {
        index,
        grid,
        enemy_budget,
        boss,
    })
}

/// Player start: bottom row, two tiles left of center, centered in its tile
pub fn player_spawn() -> Vec2 {
    let inset = (TILE_SIZE - TANK_SIZE) / 2.0;
    Vec2::new(
        (GRID_WIDTH as f32 / 2.0 - 2.0).floor() * TILE_SIZE + inset,
        (GRID_HEIGHT as f32 - 1.0) * TILE_SIZE + inset,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::Rect;
    use crate::sim::grid::Mover;

    #[test]
    fn test_all_levels_load() {
        for index in 1..=4 {
            let def = load(index).unwrap();
            assert_eq!(def.grid.width(), GRID_WIDTH);
            assert_eq!(def.grid.height(), GRID_HEIGHT);
        }
        assert_eq!(load(0).unwrap_err(), LevelError::UnknownLevel(0));
        assert_eq!(load(5).unwrap_err(), LevelError::UnknownLevel(5));
    }

    #[test]
    fn test_level_one_has_base_and_budget() {
        let def = load(1).unwrap();
        assert_eq!(def.grid.count(Tile::Base), 1);
        assert_eq!(def.grid.tile_at(13, 19), Some(Tile::Base));
        assert_eq!(def.enemy_budget, LEVEL_ONE_ENEMY_BUDGET);
        assert!(def.boss.is_none());
    }

    #[test]
    fn test_player_spawn_is_free_everywhere() {
        let spawn = Rect::new(player_spawn().x, player_spawn().y, TANK_SIZE, TANK_SIZE);
        for index in 1..=4 {
            let def = load(index).unwrap();
            assert!(!def.grid.box_overlaps_solid(&spawn, Mover::Player));
            assert!(!def.grid.box_touches(&spawn, Tile::Fog));
        }
    }

    #[test]
    fn test_boss_levels_are_fogged() {
        assert!(load(2).unwrap().grid.count(Tile::Fog) > 0);
        assert!(load(3).unwrap().grid.count(Tile::Fog) > 0);
        let arena = load(4).unwrap().grid;
        assert_eq!(arena.tile_at(0, 5), Some(Tile::Wire));
        assert_eq!(arena.tile_at(7, 12), Some(Tile::Wire));
        assert_eq!(arena.tile_at(0, 19), Some(Tile::Wire));
        assert_eq!(arena.tile_at(1, 19), Some(Tile::Empty));
    }

    #[test]
    fn test_parse_rejects_bad_layouts() {
        assert_eq!(
            Grid::parse(&["..", "."], 2, 2).unwrap_err(),
            LevelError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            }
        );
        assert_eq!(
            Grid::parse(&[".."], 2, 2).unwrap_err(),
            LevelError::RowCount {
                expected: 2,
                found: 1
            }
        );
        assert_eq!(
            Grid::parse(&[".?", ".."], 2, 2).unwrap_err(),
            LevelError::UnknownGlyph {
                glyph: '?',
                col: 1,
                row: 0
            }
        );
        let grid = Grid::parse(&["#S", "~x"], 2, 2).unwrap();
        assert_eq!(grid.tile_at(1, 1), Some(Tile::Wire));
    }
}
