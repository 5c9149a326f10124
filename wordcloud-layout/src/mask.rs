//! Glyph masks, the occupancy footprint of a rendered label.
//!
//! A [`GlyphMask`] is a dense row-major bitmap plus an `anchor`: the offset
//! from the label's logical center to the bitmap's top-left cell.  Placing a
//! label at center `(cx, cy)` puts the bitmap origin at
//! `(cx + anchor.0, cy + anchor.1)`.
//!
//! Producing a mask from text is the host's business; the engine only talks
//! to the [`GlyphRasterizer`] capability.

use std::sync::Arc;

use thiserror::Error;
use wordcloud_core::{Aabb, LayoutConfig, SizedWord};

/// Angles closer than this to a right angle take the exact path.
const RIGHT_ANGLE_EPSILON: f32 = 1e-3;

/// Cells a sampled rotation may shave off the continuous extent.
const EXTENT_SLACK: f32 = 2.0;

// ---------------------------------------------------------------
// Error types
// ---------------------------------------------------------------

/// The rasterizer could not produce a footprint.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RasterError {
    #[error("text '{0}' has no visible glyphs")]
    EmptyGlyph(String),

    #[error("font size must be positive and finite, got {0}")]
    InvalidFontSize(f32),

    #[error("glyph needs at least {width}x{height} cells, more than the canvas allows")]
    ExceedsExtent { width: u32, height: u32 },

    #[error("rasterizer backend failed: {0}")]
    Backend(String),
}

/// Footprint larger than the canvas; the word can never be placed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("glyph footprint {mask_width}x{mask_height} exceeds canvas {canvas_width}x{canvas_height}")]
pub struct MaskTooLarge {
    pub mask_width: u32,
    pub mask_height: u32,
    pub canvas_width: i32,
    pub canvas_height: i32,
}

/// Either way the word is dropped before any search.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MaskError {
    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    TooLarge(#[from] MaskTooLarge),
}

// ---------------------------------------------------------------
// Rasterizer capability
// ---------------------------------------------------------------

/// Everything a rasterizer needs to know about one label.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphRequest<'a> {
    pub text: &'a str,
    pub font_family: &'a str,
    pub font_size: f32,
    /// Clockwise on screen, about the label center.
    pub rotation_deg: f32,
    pub font_weight: u16,
    pub letter_spacing: f32,
    /// Largest rotated glyph box that can still be placed, `None` for no
    /// limit.  Rasterizers bail out with [`RasterError::ExceedsExtent`]
    /// before allocating anything bigger.
    pub max_extent: Option<(u32, u32)>,
}

impl<'a> GlyphRequest<'a> {
    pub fn for_word(word: &'a SizedWord, config: &'a LayoutConfig) -> Self {
        let reach = config.padding.saturating_mul(2);
        let room = |side: i32| u32::try_from(side).unwrap_or(0).saturating_sub(reach);
        Self {
            text: &word.word.text,
            font_family: &config.font_family,
            font_size: word.font_size,
            rotation_deg: word.rotation_deg,
            font_weight: config.font_weight,
            letter_spacing: config.letter_spacing,
            max_extent: Some((room(config.width), room(config.height))),
        }
    }

    /// Reject ink spanning at least `width × height` upright when even its
    /// smallest rotated box overflows `max_extent`.
    ///
    /// The ink touches all four sides of its upright box, so once rotated it
    /// spans at least `|w·cos − h·sin|` across and `|w·sin − h·cos|` down.
    pub fn check_extent(&self, width: f32, height: f32) -> Result<(), RasterError> {
        let Some((max_w, max_h)) = self.max_extent else {
            return Ok(());
        };
        let (sin, cos) = self.rotation_deg.to_radians().sin_cos();
        let (sin, cos) = (sin.abs(), cos.abs());
        let across = (width * cos - height * sin).abs();
        let down = (width * sin - height * cos).abs();

        // Written negated so NaN extents are rejected too.
        if !(across <= max_w as f32 + EXTENT_SLACK && down <= max_h as f32 + EXTENT_SLACK) {
            return Err(RasterError::ExceedsExtent {
                width: across.ceil() as u32,
                height: down.ceil() as u32,
            });
        }
        Ok(())
    }
}

/// Host-provided text measurement and rasterization.
///
/// Implementations return the rotated footprint with its anchor relative to
/// the label center.  They are shared across the mask-building pool, hence
/// `Send + Sync`.
pub trait GlyphRasterizer: Send + Sync {
    fn rasterize(&self, request: &GlyphRequest<'_>) -> Result<GlyphMask, RasterError>;
}

impl<T: GlyphRasterizer + ?Sized> GlyphRasterizer for &T {
    fn rasterize(&self, request: &GlyphRequest<'_>) -> Result<GlyphMask, RasterError> {
        (**self).rasterize(request)
    }
}

impl<T: GlyphRasterizer + ?Sized> GlyphRasterizer for Box<T> {
    fn rasterize(&self, request: &GlyphRequest<'_>) -> Result<GlyphMask, RasterError> {
        (**self).rasterize(request)
    }
}

impl<T: GlyphRasterizer + ?Sized> GlyphRasterizer for Arc<T> {
    fn rasterize(&self, request: &GlyphRequest<'_>) -> Result<GlyphMask, RasterError> {
        (**self).rasterize(request)
    }
}

// ---------------------------------------------------------------
// GlyphMask
// ---------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphMask {
    width: u32,
    height: u32,
    cells: Vec<bool>,
    anchor: (i32, i32),
}

impl GlyphMask {
    /// An empty bitmap.
    pub fn new(width: u32, height: u32, anchor: (i32, i32)) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width as usize * height as usize],
            anchor,
        }
    }

    /// An empty bitmap whose logical center is its middle cell.
    pub fn centered(width: u32, height: u32) -> Self {
        Self::new(width, height, (-(width as i32) / 2, -(height as i32) / 2))
    }

    /// A fully occupied, centered rectangle.
    pub fn filled(width: u32, height: u32) -> Self {
        let mut mask = Self::centered(width, height);
        mask.cells.fill(true);
        mask
    }

    /// Wrap existing row-major cells.  `None` if the length does not match.
    pub fn from_cells(
        width: u32,
        height: u32,
        cells: Vec<bool>,
        anchor: (i32, i32),
    ) -> Option<Self> {
        (cells.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            cells,
            anchor,
        })
    }

    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline(always)]
    pub fn anchor(&self) -> (i32, i32) {
        self.anchor
    }

    #[inline(always)]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Occupancy of cell `(x, y)`; out of range reads as empty.
    #[inline(always)]
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.cells[self.offset(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        if x < self.width && y < self.height {
            let i = self.offset(x, y);
            self.cells[i] = value;
        }
    }

    /// Mark the half-open rectangle `[x0, x1) × [y0, y1)`, clipped.
    pub fn fill_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32) {
        for y in y0..y1.min(self.height) {
            for x in x0..x1.min(self.width) {
                let i = self.offset(x, y);
                self.cells[i] = true;
            }
        }
    }

    fn row(&self, y: u32) -> &[bool] {
        let start = self.offset(0, y);
        &self.cells[start..start + self.width as usize]
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    pub fn is_blank(&self) -> bool {
        !self.cells.iter().any(|&c| c)
    }

    /// Bitmap box when the label center sits at `(cx, cy)`.
    #[inline]
    pub fn bounds_at(&self, cx: i32, cy: i32) -> Aabb {
        Aabb::from_rect(
            cx + self.anchor.0,
            cy + self.anchor.1,
            self.width as i32,
            self.height as i32,
        )
    }

    /// Pixel-level test of two masks at their canvas placements.
    pub fn overlaps(&self, at: (i32, i32), other: &GlyphMask, other_at: (i32, i32)) -> bool {
        let a = self.bounds_at(at.0, at.1);
        let b = other.bounds_at(other_at.0, other_at.1);
        let Some(overlap) = a.intersection(&b) else {
            return false;
        };

        let span = (overlap.max_x - overlap.min_x) as usize;
        for y in overlap.min_y..overlap.max_y {
            let ra = self.row((y - a.min_y) as u32);
            let rb = other.row((y - b.min_y) as u32);
            let sa = (overlap.min_x - a.min_x) as usize;
            let sb = (overlap.min_x - b.min_x) as usize;
            if ra[sa..sa + span]
                .iter()
                .zip(&rb[sb..sb + span])
                .any(|(&p, &q)| p && q)
            {
                return true;
            }
        }
        false
    }

    // ---------------------------------------------------------------
    // Transforms
    // ---------------------------------------------------------------

    /// Rotate about the label center, clockwise on screen.
    ///
    /// Right angles map cells exactly; other angles resample with nearest
    /// neighbour on the inverse transform.
    pub fn rotated(&self, degrees: f32) -> GlyphMask {
        let d = degrees.rem_euclid(360.0);
        let near = |target: f32| (d - target).abs() < RIGHT_ANGLE_EPSILON;

        if near(0.0) || near(360.0) {
            return self.clone();
        }
        let (w, h) = (self.width, self.height);
        let (ax, ay) = self.anchor;
        if near(90.0) {
            let mut out = GlyphMask::new(h, w, (-(ay + h as i32), ax));
            self.for_each_occupied(|x, y| out.set(h - 1 - y, x, true));
            return out;
        }
        if near(180.0) {
            let mut out = GlyphMask::new(w, h, (-(ax + w as i32), -(ay + h as i32)));
            self.for_each_occupied(|x, y| out.set(w - 1 - x, h - 1 - y, true));
            return out;
        }
        if near(270.0) {
            let mut out = GlyphMask::new(h, w, (ay, -(ax + w as i32)));
            self.for_each_occupied(|x, y| out.set(y, w - 1 - x, true));
            return out;
        }
        self.rotated_resampled(d.to_radians())
    }

    fn rotated_resampled(&self, theta: f32) -> GlyphMask {
        let (sin, cos) = theta.sin_cos();
        let (ax, ay) = (self.anchor.0 as f32, self.anchor.1 as f32);
        let (w, h) = (self.width as f32, self.height as f32);

        let corners = [(ax, ay), (ax + w, ay), (ax, ay + h), (ax + w, ay + h)];
        let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
        let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for (px, py) in corners {
            let rx = cos * px - sin * py;
            let ry = sin * px + cos * py;
            min_x = min_x.min(rx);
            min_y = min_y.min(ry);
            max_x = max_x.max(rx);
            max_y = max_y.max(ry);
        }

        let nx0 = min_x.floor() as i32;
        let ny0 = min_y.floor() as i32;
        let nw = (max_x.ceil() as i32 - nx0).max(1) as u32;
        let nh = (max_y.ceil() as i32 - ny0).max(1) as u32;
        let mut out = GlyphMask::new(nw, nh, (nx0, ny0));

        for qy in 0..nh {
            for qx in 0..nw {
                let cx = (nx0 + qx as i32) as f32 + 0.5;
                let cy = (ny0 + qy as i32) as f32 + 0.5;
                // Inverse rotation back into source space.
                let px = cos * cx + sin * cy - ax;
                let py = -sin * cx + cos * cy - ay;
                if px < 0.0 || py < 0.0 {
                    continue;
                }
                if self.get(px as u32, py as u32) {
                    out.set(qx, qy, true);
                }
            }
        }
        out
    }

    /// Grow the footprint by `padding` cells in every direction.
    pub fn padded(&self, padding: u32) -> GlyphMask {
        if padding == 0 {
            return self.clone();
        }
        let p = i32::try_from(padding).unwrap_or(i32::MAX);
        let reach = padding.saturating_mul(2);
        let span = reach.saturating_add(1);
        let (w, h) = (self.width, self.height);
        let nw = w.saturating_add(reach);
        let nh = h.saturating_add(reach);

        // Horizontal pass: w × h → nw × h.
        let mut wide = GlyphMask::new(nw, h, (0, 0));
        self.for_each_occupied(|x, y| wide.fill_rect(x, y, x.saturating_add(span), y + 1));

        // Vertical pass: nw × h → nw × nh.
        let anchor = (
            self.anchor.0.saturating_sub(p),
            self.anchor.1.saturating_sub(p),
        );
        let mut out = GlyphMask::new(nw, nh, anchor);
        wide.for_each_occupied(|x, y| out.fill_rect(x, y, x + 1, y.saturating_add(span)));
        out
    }

    /// Shrink to the occupied cells.  `None` when nothing is occupied.
    pub fn trimmed(&self) -> Option<GlyphMask> {
        let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
        let (mut max_x, mut max_y) = (0u32, 0u32);
        let mut any = false;
        self.for_each_occupied(|x, y| {
            any = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        });
        if !any {
            return None;
        }

        let nw = max_x - min_x + 1;
        let nh = max_y - min_y + 1;
        if nw == self.width && nh == self.height {
            return Some(self.clone());
        }
        let mut out = GlyphMask::new(
            nw,
            nh,
            (self.anchor.0 + min_x as i32, self.anchor.1 + min_y as i32),
        );
        for y in 0..nh {
            for x in 0..nw {
                if self.get(min_x + x, min_y + y) {
                    out.set(x, y, true);
                }
            }
        }
        Some(out)
    }

    fn for_each_occupied(&self, mut f: impl FnMut(u32, u32)) {
        for y in 0..self.height {
            for (x, &cell) in self.row(y).iter().enumerate() {
                if cell {
                    f(x as u32, y);
                }
            }
        }
    }
}

/// Reject footprints wider or taller than the canvas.
pub fn check_fits(mask: &GlyphMask, width: i32, height: i32) -> Result<(), MaskTooLarge> {
    check_size(mask.width(), mask.height(), width, height)
}

fn check_size(
    mask_width: u32,
    mask_height: u32,
    width: i32,
    height: i32,
) -> Result<(), MaskTooLarge> {
    if i64::from(mask_width) > i64::from(width) || i64::from(mask_height) > i64::from(height) {
        return Err(MaskTooLarge {
            mask_width,
            mask_height,
            canvas_width: width,
            canvas_height: height,
        });
    }
    Ok(())
}

/// Rasterize, pad and size-check one word: the collision footprint.
pub fn build_footprint<R: GlyphRasterizer + ?Sized>(
    rasterizer: &R,
    word: &SizedWord,
    config: &LayoutConfig,
) -> Result<GlyphMask, MaskError> {
    let reach = config.padding.saturating_mul(2);
    let glyph = match rasterizer.rasterize(&GlyphRequest::for_word(word, config)) {
        Ok(glyph) => glyph,
        Err(RasterError::ExceedsExtent { width, height }) => {
            return Err(MaskTooLarge {
                mask_width: width.saturating_add(reach),
                mask_height: height.saturating_add(reach),
                canvas_width: config.width,
                canvas_height: config.height,
            }
            .into());
        }
        Err(e) => return Err(e.into()),
    };
    if glyph.is_blank() {
        return Err(RasterError::EmptyGlyph(word.word.text.clone()).into());
    }
    // Checked before dilating.
    check_size(
        glyph.width().saturating_add(reach),
        glyph.height().saturating_add(reach),
        config.width,
        config.height,
    )?;
    Ok(glyph.padded(config.padding))
}

// ===================================================================
// Tests
// ===================================================================
