//! Glyph rasterizer backed by `cosmic-text`.
//!
//! Text is shaped as a single line, every glyph is rendered through the
//! `SwashCache`, and coverage at or above the alpha threshold becomes an
//! occupied cell.  The label center is the middle of the line box (advance
//! width × line height), the same point the renderer anchors text at with
//! `text-anchor: middle` and a central baseline.
//!
//! `FontSystem` needs `&mut` for shaping, while the layout engine calls the
//! rasterizer from its rayon pool through `&self`.  The rasterizer therefore
//! keeps one shaper per worker, each behind its own mutex, and picks one by
//! `rayon::current_thread_index()`.

use std::sync::{Mutex, PoisonError};

use cosmic_text::{
    Attrs, Buffer, FontSystem, Metrics, Shaping, SwashCache, SwashContent, SwashImage, Weight,
};
use rustc_hash::FxHashMap;
use wordcloud_core::LayoutConfig;
use wordcloud_layout::{GlyphMask, GlyphRasterizer, GlyphRequest, RasterError};

use crate::cache::{MaskCache, MaskKey};
use crate::family::{self, ResolvedFamily};

/// Line height as a multiple of the font size.
const LINE_HEIGHT: f32 = 1.2;

/// Default coverage cut-off, out of 255.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 64;

/// One shaping context: font system, glyph cache and resolved families.
struct Shaper {
    font_system: FontSystem,
    swash_cache: SwashCache,
    families: FxHashMap<String, ResolvedFamily>,
}

impl Shaper {
    fn new(font_system: FontSystem) -> Self {
        Self {
            font_system,
            swash_cache: SwashCache::new(),
            families: FxHashMap::default(),
        }
    }

    fn resolve_family(&mut self, chain: &str) -> ResolvedFamily {
        if let Some(found) = self.families.get(chain) {
            return found.clone();
        }
        let resolved = family::resolve(chain, self.font_system.db());
        log::debug!("Font family {chain:?} resolved to {resolved:?}");
        self.families.insert(chain.to_owned(), resolved.clone());
        resolved
    }

    /// Upright mask of one line of text, anchored on the line-box center.
    ///
    /// The extent is checked twice: on the shaped advance before any glyph
    /// is rendered, then on the exact ink box before the mask is allocated.
    fn upright(
        &mut self,
        request: &GlyphRequest<'_>,
        threshold: u8,
    ) -> Result<GlyphMask, RasterError> {
        let line_height = request.font_size * LINE_HEIGHT;
        let metrics = Metrics::new(request.font_size, line_height);
        let resolved = self.resolve_family(request.font_family);
        let attrs = Attrs::new()
            .family(resolved.as_family())
            .weight(Weight(request.font_weight));

        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        buffer.set_size(&mut self.font_system, None, None);
        buffer.set_text(&mut self.font_system, request.text, attrs, Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);

        let advance = buffer
            .layout_runs()
            .map(|run| {
                let gaps = run.glyphs.len().saturating_sub(1) as f32;
                run.line_w + request.letter_spacing * gaps
            })
            .fold(0.0, f32::max);
        // Side bearings of the outer glyphs take less than one em off the ink.
        request.check_extent((advance - request.font_size).max(0.0), 0.0)?;

        let mut stamps: Vec<(i32, i32, SwashImage)> = Vec::new();
        for run in buffer.layout_runs() {
            for (glyph_idx, glyph) in run.glyphs.iter().enumerate() {
                let spacing_offset = request.letter_spacing * glyph_idx as f32;
                let physical = glyph.physical((spacing_offset, run.line_y), 1.0);

                let Some(image) = self
                    .swash_cache
                    .get_image(&mut self.font_system, physical.cache_key)
                else {
                    continue; // whitespace or missing glyph
                };
                if image.placement.width == 0 || image.placement.height == 0 {
                    continue;
                }
                stamps.push((
                    physical.x + image.placement.left,
                    physical.y - image.placement.top,
                    image.clone(),
                ));
            }
        }

        let Some((min_x, min_y, max_x, max_y)) = stamps
            .iter()
            .map(|(x, y, image)| {
                let right = x + image.placement.width as i32;
                let bottom = y + image.placement.height as i32;
                (*x, *y, right, bottom)
            })
            .reduce(|a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)))
        else {
            return Err(RasterError::EmptyGlyph(request.text.to_owned()));
        };
        // Antialiased rims may fall under the threshold: one cell per side.
        let ink_w = (max_x - min_x - 2).max(0) as f32;
        let ink_h = (max_y - min_y - 2).max(0) as f32;
        request.check_extent(ink_w, ink_h)?;

        // The anchor stays relative to the line box [0, advance) × [0, line_height).
        let box_w = advance.ceil().max(1.0) as i32;
        let box_h = line_height.ceil().max(1.0) as i32;
        let anchor = (min_x - box_w / 2, min_y - box_h / 2);
        let mut mask = GlyphMask::new((max_x - min_x) as u32, (max_y - min_y) as u32, anchor);
        for (x, y, image) in &stamps {
            stamp(&mut mask, image, x - min_x, y - min_y, threshold);
        }
        Ok(mask)
    }
}

/// Copy covered pixels of one glyph image into `mask` at `(ox, oy)`.
fn stamp(mask: &mut GlyphMask, image: &SwashImage, ox: i32, oy: i32, threshold: u8) {
    let w = image.placement.width as usize;
    let h = image.placement.height as usize;
    let stride = match image.content {
        SwashContent::Mask => 1,
        SwashContent::Color | SwashContent::SubpixelMask => 4,
    };
    if image.data.len() < w * h * stride {
        log::warn!("Glyph image shorter than its placement, skipped");
        return;
    }

    for row in 0..h {
        for col in 0..w {
            let i = (row * w + col) * stride;
            let coverage = match image.content {
                SwashContent::Mask => image.data[i],
                SwashContent::Color => image.data[i + 3],
                SwashContent::SubpixelMask => {
                    image.data[i..i + 3].iter().copied().max().unwrap_or(0)
                }
            };
            if coverage >= threshold {
                mask.set((ox + col as i32) as u32, (oy + row as i32) as u32, true);
            }
        }
    }
}

/// [`GlyphRasterizer`] over system fonts.
pub struct CosmicRasterizer {
    shapers: Vec<Mutex<Shaper>>,
    alpha_threshold: u8,
    cache: MaskCache,
}

impl CosmicRasterizer {
    /// Discover system fonts and build one shaper per rayon worker.
    pub fn new() -> Self {
        Self::with_shapers(rayon::current_num_threads(), DEFAULT_ALPHA_THRESHOLD)
    }

    /// Threshold and worker count taken from a layout configuration.
    pub fn from_config(config: &LayoutConfig) -> Self {
        let shapers = config.threads.unwrap_or_else(rayon::current_num_threads);
        Self::with_shapers(shapers, config.alpha_threshold)
    }

    pub fn with_shapers(count: usize, alpha_threshold: u8) -> Self {
        let first = FontSystem::new();
        log::info!(
            "Discovered {} font faces, {} shapers",
            first.db().faces().count(),
            count.max(1)
        );

        let locale = first.locale().to_owned();
        let db = first.db().clone();
        let mut shapers = vec![Mutex::new(Shaper::new(first))];
        for _ in 1..count.max(1) {
            let system = FontSystem::new_with_locale_and_db(locale.clone(), db.clone());
            shapers.push(Mutex::new(Shaper::new(system)));
        }

        Self {
            shapers,
            alpha_threshold,
            cache: MaskCache::default(),
        }
    }

    /// Replace the mask cache, e.g. to change its capacity.
    pub fn with_cache(mut self, cache: MaskCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &MaskCache {
        &self.cache
    }

    pub fn alpha_threshold(&self) -> u8 {
        self.alpha_threshold
    }

    pub fn face_count(&self) -> usize {
        self.shapers
            .first()
            .map(|s| {
                s.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .font_system
                    .db()
                    .faces()
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn has_fonts(&self) -> bool {
        self.face_count() > 0
    }

    fn shaper(&self) -> &Mutex<Shaper> {
        let slot = rayon::current_thread_index().unwrap_or(0) % self.shapers.len();
        &self.shapers[slot]
    }
}

impl Default for CosmicRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphRasterizer for CosmicRasterizer {
    fn rasterize(&self, request: &GlyphRequest<'_>) -> Result<GlyphMask, RasterError> {
        if !(request.font_size.is_finite() && request.font_size > 0.0) {
            return Err(RasterError::InvalidFontSize(request.font_size));
        }

        let key = MaskKey::of(request);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let upright = {
            let mut shaper = self.shaper().lock().unwrap_or_else(PoisonError::into_inner);
            if shaper.font_system.db().faces().next().is_none() {
                return Err(RasterError::Backend("no font faces available".into()));
            }
            shaper.upright(request, self.alpha_threshold)?
        };

        let mask = upright
            .rotated(request.rotation_deg)
            .trimmed()
            .ok_or_else(|| RasterError::EmptyGlyph(request.text.to_owned()))?;
        self.cache.put(key, mask.clone());
        Ok(mask)
    }
}

// ===================================================================
// Tests
// ===================================================================
