//! Axis-aligned rectangles used by physics, graphics and the view boundary.
//!
//! [`Bounds`] is a rectangle expressed relative to an entity (offset + size);
//! [`Aabb`] is the same rectangle resolved into world space.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub offset: Vec2,
    pub size: Vec2,
}

impl Bounds {
    /// Create bounds with given size and no offset
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            offset: Vec2::ZERO,
            size: Vec2::new(width, height),
        }
    }

    /// Modify bounds with given offset
    pub fn with_offset(mut self, x: f32, y: f32) -> Self {
        self.offset = Vec2::new(x, y);
        self
    }

    /// Returns the world-space AABB for a given entity world position.
    /// Handles negative size by normalizing to proper min/max.
    pub fn aabb(&self, position: Vec2) -> Aabb {
        let p0 = position + self.offset;
        let p1 = p0 + self.size;
        Aabb {
            min: p0.min(p1),
            max: p0.max(p1),
        }
    }

    /// Overlap test against another set of bounds at a different entity position.
    pub fn overlaps(&self, position: Vec2, other: &Self, other_position: Vec2) -> bool {
        self.aabb(position).intersects(&other.aabb(other_position))
    }

    pub fn offset_to(&mut self, x: f32, y: f32) {
        self.offset = Vec2::new(x, y);
    }

    pub fn offset_by(&mut self, dx: f32, dy: f32) {
        self.offset += Vec2::new(dx, dy);
    }

    pub fn resize_to(&mut self, w: f32, h: f32) {
        self.size = Vec2::new(w, h);
    }

    pub fn resize_by(&mut self, dw: f32, dh: f32) {
        self.size += Vec2::new(dw, dh);
    }
}

/// World-space axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_size(size: Vec2) -> Self {
        Self {
            min: Vec2::ZERO,
            max: size,
        }
    }

    /// Strict overlap: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Point containment, edges included.
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Penetration depth of `self` into `other` along each axis.
    ///
    /// Only meaningful when the boxes intersect; both components are then
    /// strictly positive.
    pub fn penetration(&self, other: &Aabb) -> Vec2 {
        Vec2::new(
            (self.max.x - other.min.x).min(other.max.x - self.min.x),
            (self.max.y - other.min.y).min(other.max.y - self.min.y),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_applies_offset() {
        let bounds = Bounds::new(2.0, 12.0).with_offset(7.0, 4.0);
        let aabb = bounds.aabb(Vec2::new(100.0, 50.0));
        assert_eq!(aabb.min, Vec2::new(107.0, 54.0));
        assert_eq!(aabb.max, Vec2::new(109.0, 66.0));
    }

    #[test]
    fn negative_size_is_normalized() {
        let bounds = Bounds::new(-4.0, -4.0);
        let aabb = bounds.aabb(Vec2::new(10.0, 10.0));
        assert_eq!(aabb.min, Vec2::new(6.0, 6.0));
        assert_eq!(aabb.max, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Aabb {
            min: Vec2::ZERO,
            max: Vec2::new(10.0, 10.0),
        };
        let b = Aabb {
            min: Vec2::new(10.0, 0.0),
            max: Vec2::new(20.0, 10.0),
        };
        assert!(!a.intersects(&b));
        assert!(a.contains_point(Vec2::new(10.0, 5.0)));
    }

    #[test]
    fn overlaps_uses_both_positions() {
        let a = Bounds::new(10.0, 10.0);
        let b = Bounds::new(10.0, 10.0);
        assert!(a.overlaps(Vec2::ZERO, &b, Vec2::new(5.0, 5.0)));
        assert!(!a.overlaps(Vec2::ZERO, &b, Vec2::new(15.0, 0.0)));
    }

    #[test]
    fn penetration_reports_smallest_overlap_per_axis() {
        let a = Aabb {
            min: Vec2::new(0.0, 0.0),
            max: Vec2::new(10.0, 10.0),
        };
        let b = Aabb {
            min: Vec2::new(8.0, 3.0),
            max: Vec2::new(30.0, 30.0),
        };
        let p = a.penetration(&b);
        assert_eq!(p, Vec2::new(2.0, 7.0));
    }

    #[test]
    fn resize_and_offset_helpers() {
        let mut b = Bounds::default();
        b.resize_to(16.0, 16.0);
        b.resize_by(-2.0, 4.0);
        b.offset_to(1.0, 1.0);
        b.offset_by(2.0, -1.0);
        assert_eq!(b.size, Vec2::new(14.0, 20.0));
        assert_eq!(b.offset, Vec2::new(3.0, 0.0));
    }
}
