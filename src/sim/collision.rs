//! Geometry primitives for collision detection
//!
//! Everything in the world is an axis-aligned box anchored at its top-left corner. The only
//! non-box test is the laser: a ray checked against a circle around the target's center.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::unit_from_angle;

/// Axis-aligned box (top-left anchored, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Square box centered on `center`
    pub fn centered(center: Vec2, side: f32) -> Self {
        Self {
            pos: center - Vec2::splat(side / 2.0),
            size: Vec2::splat(side),
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Same box moved by `delta`
    #[inline]
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            pos: self.pos + delta,
            size: self.size,
        }
    }

    /// Same box with its corner at `pos`
    #[inline]
    pub fn at(&self, pos: Vec2) -> Self {
        Self {
            pos,
            size: self.size,
        }
    }

    /// Strict overlap: touching edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.pos.x < other.right()
            && self.right() > other.pos.x
            && self.pos.y < other.bottom()
            && self.bottom() > other.pos.y
    }
}

/// Closest point to `point` on the segment `a..b`
pub fn closest_point_on_segment(a: Vec2, b: Vec2, point: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-6 {
        return a; // Degenerate segment
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Laser test: does a beam of `line_width` cast from `origin` along `angle` for `length`
/// pixels touch a circle of `radius` around `target`?
///
/// The target is projected onto the beam, the projection parameter clamped to [0, 1], and
/// the hit registered when the remaining distance is below half the width plus the radius.
pub fn segment_hits_circle(
    origin: Vec2,
    angle: f32,
    length: f32,
    target: Vec2,
    radius: f32,
    line_width: f32,
) -> bool {
    let end = origin + unit_from_angle(angle) * length;
    let closest = closest_point_on_segment(origin, end, target);
    let min_dist = radius + line_width / 2.0;
    (target - closest).length_squared() < min_dist * min_dist
}

/// Is `point` strictly inside the circle?
#[inline]
pub fn circle_contains(center: Vec2, radius: f32, point: Vec2) -> bool {
    center.distance(point) < radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_rect_overlap_is_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let touching = Rect::new(10.0, 0.0, 10.0, 10.0);
        let inside = Rect::new(9.9, 9.9, 10.0, 10.0);
        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&inside));
        assert!(inside.overlaps(&a));
    }

    #[test]
    fn test_rect_centered() {
        let r = Rect::centered(Vec2::new(50.0, 50.0), 4.0);
        assert_eq!(r.pos, Vec2::new(48.0, 48.0));
        assert_eq!(r.center(), Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_laser_hits_target_on_beam() {
        let origin = Vec2::new(100.0, 100.0);
        // Beam pointing right, target 200px away, slightly off axis
        assert!(segment_hits_circle(origin, 0.0, 1000.0, Vec2::new(300.0, 110.0), 14.0, 16.0));
        // Too far off axis: 14 + 8 = 22 < 30
        assert!(!segment_hits_circle(origin, 0.0, 1000.0, Vec2::new(300.0, 130.0), 14.0, 16.0));
    }

    #[test]
    fn test_laser_does_not_fire_backwards() {
        let origin = Vec2::new(100.0, 100.0);
        // Target behind the origin: clamped to t = 0, distance is 100
        assert!(!segment_hits_circle(origin, 0.0, 1000.0, Vec2::new(0.0, 100.0), 14.0, 16.0));
        // Pointing left reaches it
        assert!(segment_hits_circle(origin, PI, 1000.0, Vec2::new(0.0, 100.0), 14.0, 16.0));
    }

    #[test]
    fn test_closest_point_degenerate() {
        let a = Vec2::new(3.0, 4.0);
        assert_eq!(closest_point_on_segment(a, a, Vec2::ZERO), a);
    }
}
