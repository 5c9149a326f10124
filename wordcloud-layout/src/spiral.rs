//! Spiral search for the first collision-free position outward from the center.
//!
//! The walk follows an Archimedean spiral stretched to the canvas aspect
//! ratio.  Candidate positions are tried strictly in spiral order, so the
//! first hit is also the tie-break: nothing closer along the path fits.
//!
//! Each candidate goes through three filters, cheapest first:
//!
//! 1. the translated footprint box must lie inside the canvas,
//! 2. the spatial index returns labels whose boxes intersect it,
//! 3. the masks of those labels are compared cell by cell.

use std::sync::Arc;

use thiserror::Error;
use wordcloud_core::{Aabb, LabelId, SpiralConfig};

use crate::mask::GlyphMask;
use crate::spatial::SpatialIndex;

/// The spiral ran past its radius bound without finding room.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("no free position within radius {max_radius:.1} after {steps} steps")]
pub struct PlacementExhausted {
    pub steps: usize,
    pub max_radius: f32,
}

/// Integer offsets from the canvas center along the spiral.
///
/// Starts at `(0, 0)`, skips consecutive duplicates, and ends once the
/// radius exceeds the bound.
#[derive(Clone, Debug)]
pub struct Spiral {
    angle_step: f32,
    spacing: f32,
    aspect: f32,
    max_radius: f32,
    step: u64,
    last: Option<(i32, i32)>,
}

impl Spiral {
    pub fn new(config: &SpiralConfig, width: i32, height: i32) -> Self {
        let diagonal = (width as f32).hypot(height as f32);
        Self {
            angle_step: config.angle_step,
            spacing: config.spacing,
            aspect: width as f32 / height.max(1) as f32,
            max_radius: config.radius_factor * diagonal * 0.5,
            step: 0,
            last: None,
        }
    }

    pub fn max_radius(&self) -> f32 {
        self.max_radius
    }
}

impl Iterator for Spiral {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<(i32, i32)> {
        loop {
            let theta = (self.step as f64 * f64::from(self.angle_step)) as f32;
            let radius = self.spacing * theta;
            if radius > self.max_radius {
                return None;
            }
            self.step += 1;

            let (sin, cos) = theta.sin_cos();
            let offset = (
                (self.aspect * radius * cos).round() as i32,
                (radius * sin).round() as i32,
            );
            if self.last == Some(offset) {
                continue;
            }
            self.last = Some(offset);
            return Some(offset);
        }
    }
}

// ---------------------------------------------------------------
// Committed footprints
// ---------------------------------------------------------------

/// A committed mask and where its label center sits.
#[derive(Clone, Debug)]
pub struct Footprint {
    pub mask: Arc<GlyphMask>,
    pub center: (i32, i32),
}

/// Masks of committed labels, indexed by [`LabelId`].
#[derive(Clone, Debug, Default)]
pub struct Footprints {
    entries: Vec<Footprint>,
}

impl Footprints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append and return the id of the new entry.
    pub fn push(&mut self, mask: Arc<GlyphMask>, center: (i32, i32)) -> LabelId {
        let id = LabelId(self.entries.len() as u32);
        self.entries.push(Footprint { mask, center });
        id
    }

    pub fn get(&self, id: LabelId) -> Option<&Footprint> {
        self.entries.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Footprint> {
        self.entries.iter()
    }
}

/// An accepted position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Label center in canvas pixels.
    pub x: i32,
    pub y: i32,
    pub bounds: Aabb,
    /// Spiral positions tried, including the accepted one.
    pub steps: usize,
}

/// Walk the spiral until `mask` fits inside `canvas` without touching any
/// committed footprint.
pub fn search(
    mask: &GlyphMask,
    canvas: &Aabb,
    index: &dyn SpatialIndex,
    footprints: &Footprints,
    config: &SpiralConfig,
) -> Result<Placement, PlacementExhausted> {
    let origin_x = canvas.min_x + canvas.width() / 2;
    let origin_y = canvas.min_y + canvas.height() / 2;
    let spiral = Spiral::new(config, canvas.width(), canvas.height());
    let max_radius = spiral.max_radius();

    let mut nearby = Vec::new();
    let mut steps = 0;
    for (dx, dy) in spiral {
        steps += 1;
        let (x, y) = (origin_x + dx, origin_y + dy);
        let bounds = mask.bounds_at(x, y);
        if !canvas.contains_box(&bounds) {
            continue;
        }

        nearby.clear();
        index.query(&bounds, &mut nearby);
        let collides = nearby.iter().any(|&id| {
            footprints
                .get(id)
                .is_some_and(|fp| mask.overlaps((x, y), &fp.mask, fp.center))
        });
        if !collides {
            return Ok(Placement {
                x,
                y,
                bounds,
                steps,
            });
        }
    }

    Err(PlacementExhausted { steps, max_radius })
}

// ===================================================================
// Tests
// ===================================================================
