//! Axis-aligned rectangle geometry
//!
//! Every body and every placement candidate is an AABB in arena-local pixels:
//! - pos: top-left corner
//! - size: width/height (always positive)

use glam::Vec2;

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Top-left corner
    pub pos: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// Bottom-right corner
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.size.x * self.size.y
    }

    /// Strict intersection test: rectangles sharing only an edge do not overlap
    pub fn overlaps(&self, other: &Rect) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        self.pos.x < b_max.x && a_max.x > other.pos.x && self.pos.y < b_max.y && a_max.y > other.pos.y
    }

    /// Penetration depth along each axis (`min(far edges) - max(near edges)`)
    ///
    /// Only meaningful when the rectangles overlap; otherwise at least one
    /// component is zero or negative.
    pub fn overlap_extent(&self, other: &Rect) -> Vec2 {
        self.max().min(other.max()) - self.pos.max(other.pos)
    }
}
