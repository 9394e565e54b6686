//! World grid: tile map plus per-tile durability
//!
//! Durability is encoded in the tile variant itself (bricks step down a ladder). Dimensions
//! are fixed when the grid is built and never change afterwards. Any lookup outside the grid
//! is treated as solid.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH, TILE_SIZE};

/// Tile kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Empty,
    Brick,
    BrickDamaged,
    BrickBroken,
    Steel,
    SteelDamaged1,
    SteelDamaged2,
    SteelDamaged3,
    Water,
    Grass,
    Base,
    Fog,
    Wire,
}

impl Tile {
    /// Blocks movement for anything that is not allowed through wire
    pub fn is_solid(self) -> bool {
        matches!(
            self,
            Tile::Brick
                | Tile::BrickDamaged
                | Tile::BrickBroken
                | Tile::Steel
                | Tile::SteelDamaged1
                | Tile::SteelDamaged2
                | Tile::SteelDamaged3
                | Tile::Water
                | Tile::Base
                | Tile::Wire
        )
    }

    /// Next step of the brick ladder, `None` for tiles that do not degrade
    pub fn degraded(self) -> Option<Tile> {
        match self {
            Tile::Brick => Some(Tile::BrickDamaged),
            Tile::BrickDamaged => Some(Tile::BrickBroken),
            Tile::BrickBroken => Some(Tile::Empty),
            _ => None,
        }
    }

    /// Layout glyph
    pub fn from_glyph(c: char) -> Option<Tile> {
        let tile = match c {
            '.' => Tile::Empty,
            '#' => Tile::Brick,
            'd' => Tile::BrickDamaged,
            'b' => Tile::BrickBroken,
            'S' => Tile::Steel,
            '1' => Tile::SteelDamaged1,
            '2' => Tile::SteelDamaged2,
            '3' => Tile::SteelDamaged3,
            '~' => Tile::Water,
            '"' => Tile::Grass,
            'B' => Tile::Base,
            'f' => Tile::Fog,
            'x' => Tile::Wire,
            _ => return None,
        };
        Some(tile)
    }
}

/// Who is asking about solidity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mover {
    Player,
    Enemy,
    /// Bosses may step onto wire (and get hurt by it)
    Boss,
    Projectile,
}

/// What a bullet's center landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileHit {
    Clear,
    /// Stopped by a solid or absorbing tile
    Tile { cx: i32, cy: i32 },
    /// Struck the base; the base is now permanently down
    Base { cx: i32, cy: i32 },
    /// Left the playfield
    OutOfBounds,
}

impl TileHit {
    pub fn is_hit(&self) -> bool {
        !matches!(self, TileHit::Clear)
    }
}

/// Tile coordinate of a pixel coordinate
#[inline]
pub fn tile_coord(px: f32) -> i32 {
    (px / TILE_SIZE).floor() as i32
}

/// Pixel center of a tile
#[inline]
pub fn tile_center(cx: i32, cy: i32) -> Vec2 {
    Vec2::new(
        cx as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        cy as f32 * TILE_SIZE + TILE_SIZE / 2.0,
    )
}

/// Tile coordinates covered by a box (inclusive ranges)
pub fn footprint(rect: &Rect) -> (std::ops::RangeInclusive<i32>, std::ops::RangeInclusive<i32>) {
    let start_x = tile_coord(rect.pos.x);
    let end_x = tile_coord(rect.right() - 0.1);
    let start_y = tile_coord(rect.pos.y);
    let end_y = tile_coord(rect.bottom() - 0.1);
    (start_x..=end_x, start_y..=end_y)
}

/// The level's tile map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    /// Cleared by the first bullet that reaches a base tile
    base_intact: bool,
}

impl Grid {
    /// Grid filled with one tile kind
    pub fn filled(width: usize, height: usize, tile: Tile) -> Self {
        Self {
            width,
            height,
            tiles: vec![tile; width * height],
            base_intact: true,
        }
    }

    pub(super) fn from_tiles(width: usize, height: usize, tiles: Vec<Tile>) -> Self {
        debug_assert_eq!(tiles.len(), width * height);
        Self {
            width,
            height,
            tiles,
            base_intact: true,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn base_intact(&self) -> bool {
        self.base_intact
    }

    fn index(&self, cx: i32, cy: i32) -> Option<usize> {
        if cx < 0 || cy < 0 || cx as usize >= self.width || cy as usize >= self.height {
            return None;
        }
        Some(cy as usize * self.width + cx as usize)
    }

    /// Tile at a grid coordinate, `None` off-grid
    pub fn tile_at(&self, cx: i32, cy: i32) -> Option<Tile> {
        self.index(cx, cy).map(|i| self.tiles[i])
    }

    pub fn set_tile(&mut self, cx: i32, cy: i32, tile: Tile) {
        if let Some(i) = self.index(cx, cy) {
            self.tiles[i] = tile;
        }
    }

    /// Advance the brick ladder one step. Returns true if the tile changed.
    pub fn damage_tile(&mut self, cx: i32, cy: i32) -> bool {
        let Some(i) = self.index(cx, cy) else {
            return false;
        };
        match self.tiles[i].degraded() {
            Some(next) => {
                self.tiles[i] = next;
                true
            }
            None => false,
        }
    }

    /// Does the box overlap anything that blocks `mover`? Off-grid is always solid.
    pub fn box_overlaps_solid(&self, rect: &Rect, mover: Mover) -> bool {
        let (xs, ys) = footprint(rect);
        for cy in ys {
            for cx in xs.clone() {
                let Some(tile) = self.tile_at(cx, cy) else {
                    return true;
                };
                if mover == Mover::Boss && tile == Tile::Wire {
                    continue;
                }
                if tile.is_solid() {
                    return true;
                }
            }
        }
        false
    }

    /// Does the box cover at least one on-grid tile of `kind`?
    pub fn box_touches(&self, rect: &Rect, kind: Tile) -> bool {
        let (xs, ys) = footprint(rect);
        ys.into_iter()
            .any(|cy| xs.clone().any(|cx| self.tile_at(cx, cy) == Some(kind)))
    }

    /// Replace every fog tile with empty ground. Returns the cleared coordinates.
    pub fn clear_fog(&mut self) -> Vec<(i32, i32)> {
        let mut cleared = Vec::new();
        for (i, tile) in self.tiles.iter_mut().enumerate() {
            if *tile == Tile::Fog {
                *tile = Tile::Empty;
                cleared.push(((i % self.width) as i32, (i / self.width) as i32));
            }
        }
        cleared
    }

    pub fn count(&self, kind: Tile) -> usize {
        self.tiles.iter().filter(|t| **t == kind).count()
    }

    /// On-grid tiles of `kind` within `radius` tiles (Chebyshev) of a grid coordinate
    pub fn tiles_near(&self, cx: i32, cy: i32, radius: i32, kind: Tile) -> Vec<(i32, i32)> {
        let mut found = Vec::new();
        for ty in cy - radius..=cy + radius {
            for tx in cx - radius..=cx + radius {
                if self.tile_at(tx, ty) == Some(kind) {
                    found.push((tx, ty));
                }
            }
        }
        found
    }

    /// Bullet-vs-map test. Samples only the tile under the bullet's center.
    ///
    /// Solid tiles stop the bullet (wire absorbs it). A base hit also brings the base down
    /// for the rest of the session.
    pub fn bullet_hits_tile(&mut self, bullet: &Rect) -> TileHit {
        let center = bullet.center();
        let cx = tile_coord(center.x);
        let cy = tile_coord(center.y);

        match self.tile_at(cx, cy) {
            Some(Tile::Base) => {
                if self.base_intact {
                    log::info!("Base destroyed at ({}, {})", cx, cy);
                }
                self.base_intact = false;
                TileHit::Base { cx, cy }
            }
            Some(tile) if tile.is_solid() => TileHit::Tile { cx, cy },
            Some(_) => TileHit::Clear,
            None => {
                if center.x < 0.0
                    || center.x > CANVAS_WIDTH
                    || center.y < 0.0
                    || center.y > CANVAS_HEIGHT
                {
                    TileHit::OutOfBounds
                } else {
                    TileHit::Clear
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid_with(cx: i32, cy: i32, tile: Tile) -> Grid {
        let mut grid = Grid::filled(4, 4, Tile::Empty);
        grid.set_tile(cx, cy, tile);
        grid
    }

    #[test]
    fn test_brick_ladder_three_hits() {
        let mut grid = grid_with(1, 1, Tile::Brick);
        assert!(grid.damage_tile(1, 1));
        assert_eq!(grid.tile_at(1, 1), Some(Tile::BrickDamaged));
        assert!(grid.damage_tile(1, 1));
        assert_eq!(grid.tile_at(1, 1), Some(Tile::BrickBroken));
        assert!(grid.damage_tile(1, 1));
        assert_eq!(grid.tile_at(1, 1), Some(Tile::Empty));
        // Fourth hit does nothing
        assert!(!grid.damage_tile(1, 1));
        assert_eq!(grid.tile_at(1, 1), Some(Tile::Empty));
    }

    #[test]
    fn test_steel_is_indestructible() {
        let mut grid = grid_with(0, 0, Tile::Steel);
        assert!(!grid.damage_tile(0, 0));
        assert_eq!(grid.tile_at(0, 0), Some(Tile::Steel));
    }

    #[test]
    fn test_off_grid_is_solid() {
        let grid = Grid::filled(4, 4, Tile::Empty);
        assert!(grid.box_overlaps_solid(&Rect::new(-1.0, 0.0, 10.0, 10.0), Mover::Player));
        assert!(!grid.box_overlaps_solid(&Rect::new(0.0, 0.0, 10.0, 10.0), Mover::Player));
    }

    #[test]
    fn test_boss_walks_through_wire() {
        let grid = grid_with(1, 1, Tile::Wire);
        let rect = Rect::new(32.0, 32.0, 28.0, 28.0);
        assert!(grid.box_overlaps_solid(&rect, Mover::Player));
        assert!(grid.box_overlaps_solid(&rect, Mover::Enemy));
        assert!(!grid.box_overlaps_solid(&rect, Mover::Boss));
        assert!(grid.box_touches(&rect, Tile::Wire));
    }

    #[test]
    fn test_footprint_excludes_exact_edge() {
        // A 32px box at the tile origin covers only that tile
        let (xs, ys) = footprint(&Rect::new(32.0, 32.0, 32.0, 32.0));
        assert_eq!(xs, 1..=1);
        assert_eq!(ys, 1..=1);
    }

    #[test]
    fn test_bullet_samples_center_only() {
        let mut grid = grid_with(1, 0, Tile::Brick);
        // Footprint straddles into the brick but the center is still in tile 0
        let bullet = Rect::new(29.0, 10.0, 4.0, 4.0);
        assert_eq!(grid.bullet_hits_tile(&bullet), TileHit::Clear);
        let bullet = Rect::new(31.0, 10.0, 4.0, 4.0);
        assert_eq!(grid.bullet_hits_tile(&bullet), TileHit::Tile { cx: 1, cy: 0 });
    }

    #[test]
    fn test_base_hit_is_permanent() {
        let mut grid = grid_with(2, 2, Tile::Base);
        assert!(grid.base_intact());
        let bullet = Rect::centered(tile_center(2, 2), 4.0);
        assert_eq!(grid.bullet_hits_tile(&bullet), TileHit::Base { cx: 2, cy: 2 });
        assert!(!grid.base_intact());
        // Base tile stays; flag never comes back
        grid.set_tile(2, 2, Tile::Empty);
        assert!(!grid.base_intact());
    }

    #[test]
    fn test_wire_absorbs_bullets() {
        let mut grid = grid_with(0, 0, Tile::Wire);
        let bullet = Rect::centered(tile_center(0, 0), 4.0);
        assert!(grid.bullet_hits_tile(&bullet).is_hit());
    }

    #[test]
    fn test_clear_fog_clears_everything() {
        let mut grid = Grid::filled(3, 3, Tile::Fog);
        grid.set_tile(1, 1, Tile::Steel);
        assert_eq!(grid.clear_fog().len(), 8);
        assert_eq!(grid.count(Tile::Fog), 0);
        assert_eq!(grid.tile_at(1, 1), Some(Tile::Steel));
        assert!(grid.clear_fog().is_empty());
    }

    proptest! {
        #[test]
        fn prop_damage_never_revives(hits in 0usize..8) {
            let mut grid = grid_with(0, 0, Tile::Brick);
            for _ in 0..hits {
                grid.damage_tile(0, 0);
            }
            let expected = match hits {
                0 => Tile::Brick,
                1 => Tile::BrickDamaged,
                2 => Tile::BrickBroken,
                _ => Tile::Empty,
            };
            prop_assert_eq!(grid.tile_at(0, 0), Some(expected));
        }

        #[test]
        fn prop_fog_clear_is_idempotent(fog in proptest::collection::vec(any::<bool>(), 20)) {
            let mut grid = Grid::filled(5, 4, Tile::Brick);
            for (i, &is_fog) in fog.iter().enumerate() {
                if is_fog {
                    grid.set_tile((i % 5) as i32, (i / 5) as i32, Tile::Fog);
                }
            }
            let fogged = fog.iter().filter(|f| **f).count();
            prop_assert_eq!(grid.clear_fog().len(), fogged);
            let after_first = grid.clone();
            prop_assert!(grid.clear_fog().is_empty());
            prop_assert!(grid == after_first);
            prop_assert_eq!(grid.count(Tile::Brick), 20 - fogged);
        }

        #[test]
        fn prop_tile_lookup_off_grid_is_none(cx in -10i32..20, cy in -10i32..20) {
            let grid = Grid::filled(4, 4, Tile::Empty);
            let inside = (0..4).contains(&cx) && (0..4).contains(&cy);
            prop_assert_eq!(grid.tile_at(cx, cy).is_some(), inside);
        }
    }
}
