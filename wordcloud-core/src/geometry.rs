//! Integer pixel geometry shared by masks, the spatial index and results.
//!
//! Boxes are **half-open**: `[min_x, max_x) × [min_y, max_y)`.  Two boxes
//! that merely touch along an edge do not intersect, which matches the way
//! glyph bitmaps occupy whole cells.

use serde::{Deserialize, Serialize};

// ───────────────────────────────────────────────────────────────────
// Aabb — Axis-Aligned Bounding Box
// ───────────────────────────────────────────────────────────────────

/// Compact AABB stored as min/max corners (16 bytes total).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(C)]
pub struct Aabb {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Aabb {
    #[inline(always)]
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Create from origin + size.
    #[inline(always)]
    pub const fn from_rect(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + width,
            max_y: y + height,
        }
    }

    /// Cell-in-box test.
    #[inline(always)]
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.min_x && px < self.max_x && py >= self.min_y && py < self.max_y
    }

    /// `other` lies entirely inside `self`.
    #[inline(always)]
    pub fn contains_box(&self, other: &Aabb) -> bool {
        other.min_x >= self.min_x
            && other.min_y >= self.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }

    /// AABB overlap test.  Shared edges do not count.
    #[inline(always)]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Overlapping region, or `None` when the boxes are disjoint.
    #[inline]
    pub fn intersection(&self, other: &Aabb) -> Option<Aabb> {
        if !self.intersects(other) {
            return None;
        }
        Some(Aabb {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        })
    }

    /// The same box shifted by `(dx, dy)`.
    #[inline(always)]
    pub fn translated(&self, dx: i32, dy: i32) -> Aabb {
        Aabb {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    #[inline(always)]
    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    #[inline(always)]
    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    #[inline(always)]
    pub fn area(&self) -> i64 {
        i64::from(self.width()) * i64::from(self.height())
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Center in continuous coordinates.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (
            (self.min_x + self.max_x) as f32 * 0.5,
            (self.min_y + self.max_y) as f32 * 0.5,
        )
    }
}

// ===================================================================
// Tests
// ===================================================================
