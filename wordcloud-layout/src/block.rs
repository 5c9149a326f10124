//! Font-free rasterizer with synthetic glyph metrics.
//!
//! Each character becomes a block inside a fixed advance: x-height for
//! plain lowercase, cap height for capitals, digits and ascender letters,
//! and an extra drop below the baseline for descender letters.  Footprints
//! are therefore irregular enough to exercise pixel-level collision while
//! staying identical on every machine.

use crate::mask::{GlyphMask, GlyphRasterizer, GlyphRequest, RasterError};

const ASCENDERS: &str = "bdfhklt";
const DESCENDERS: &str = "gjpqy";

/// Metric ratios, all relative to the font size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockRasterizer {
    /// Horizontal advance per character.
    pub advance: f32,
    /// Fraction of the advance the glyph body covers.
    pub ink: f32,
    /// Baseline distance from the top of the line box.
    pub ascent: f32,
    pub cap_height: f32,
    pub x_height: f32,
    pub descent: f32,
}

impl Default for BlockRasterizer {
    fn default() -> Self {
        Self {
            advance: 0.6,
            ink: 0.8,
            ascent: 0.8,
            cap_height: 0.72,
            x_height: 0.5,
            descent: 0.2,
        }
    }
}

impl BlockRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upright mask, centered on the line box.
    ///
    /// Character blocks are laid out first so the ink box can be checked
    /// against the request's extent before the bitmap exists.
    fn upright(&self, request: &GlyphRequest<'_>) -> Result<GlyphMask, RasterError> {
        let size = request.font_size;
        let advance = (size * self.advance + request.letter_spacing).max(1.0);
        let baseline = size * self.ascent;
        let gutter = advance * (1.0 - self.ink) * 0.5;

        let mut blocks = Vec::new();
        let mut count = 0usize;
        for (i, ch) in request.text.chars().enumerate() {
            count = i + 1;
            if ch.is_whitespace() {
                continue;
            }
            let left = i as f32 * advance + gutter;
            let right = (i + 1) as f32 * advance - gutter;
            let top = if ch.is_lowercase() && !ASCENDERS.contains(ch) {
                baseline - size * self.x_height
            } else {
                baseline - size * self.cap_height
            };
            let bottom = if DESCENDERS.contains(ch) {
                baseline + size * self.descent
            } else {
                baseline
            };
            blocks.push((left, top.max(0.0), right, bottom));
        }

        let Some(ink) = blocks.iter().copied().reduce(|a, b| {
            (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3))
        }) else {
            return Err(RasterError::EmptyGlyph(request.text.to_string()));
        };
        request.check_extent(ink.2 - ink.0, ink.3 - ink.1)?;

        let width = (advance * count as f32).ceil().max(1.0) as u32;
        let height = (size * (self.ascent + self.descent)).ceil().max(1.0) as u32;
        let mut mask = GlyphMask::centered(width, height);
        for (left, top, right, bottom) in blocks {
            let x0 = left.floor() as u32;
            let x1 = (right.ceil() as u32).max(x0 + 1);
            let y0 = top.floor() as u32;
            let y1 = (bottom.ceil() as u32).max(y0 + 1);
            mask.fill_rect(x0, y0, x1, y1);
        }
        Ok(mask)
    }
}

impl GlyphRasterizer for BlockRasterizer {
    fn rasterize(&self, request: &GlyphRequest<'_>) -> Result<GlyphMask, RasterError> {
        if !(request.font_size.is_finite() && request.font_size > 0.0) {
            return Err(RasterError::InvalidFontSize(request.font_size));
        }
        self.upright(request)?
            .rotated(request.rotation_deg)
            .trimmed()
            .ok_or_else(|| RasterError::EmptyGlyph(request.text.to_string()))
    }
}
