use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use wordcloud_core::{
    Aabb, ConfigError, DropReason, LayoutConfig, LayoutResult, PlacedLabel, RandomSource,
    SeededRng, SizedWord, Word,
};

use crate::mask::{self, GlyphMask, GlyphRasterizer, MaskError};
use crate::sizer;
use crate::spatial::{self, SpatialIndex};
use crate::spiral::{self, Footprints};

type MaskResult = Result<Arc<GlyphMask>, MaskError>;

/// Cooperative interrupt, checked between words.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-word lifecycle.  Transitions only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordState {
    Sized,
    MaskBuilt,
    Placed,
    Dropped,
}

/// Identical requests share one mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct MaskKey<'a> {
    text: &'a str,
    font_size: u32,
    rotation: u32,
}

impl<'a> MaskKey<'a> {
    fn of(word: &'a SizedWord) -> Self {
        Self {
            text: &word.word.text,
            font_size: word.font_size.to_bits(),
            rotation: word.rotation_deg.to_bits(),
        }
    }
}

/// Word-cloud layout engine.
///
/// Owns the validated configuration and the host's rasterizer.  Each call
/// to [`run`](Self::run) starts from an empty spatial index, so runs are
/// independent and repeatable.
pub struct CloudLayout<R> {
    config: LayoutConfig,
    rasterizer: R,
    /// Dedicated mask-building pool when `threads` is set.
    pool: Option<rayon::ThreadPool>,
}

impl<R: GlyphRasterizer> CloudLayout<R> {
    pub fn new(config: LayoutConfig, rasterizer: R) -> Result<Self, ConfigError> {
        config.validate()?;

        let pool = match config.threads.filter(|_| config.parallel_masks) {
            Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => Some(pool),
                Err(e) => {
                    log::warn!("Mask pool unavailable ({e}); using the global pool");
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            config,
            rasterizer,
            pool,
        })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Rebuild the committed footprint of a placed label, for hit testing
    /// and verification.
    pub fn footprint_of(&self, label: &PlacedLabel) -> Result<GlyphMask, MaskError> {
        let sized = SizedWord {
            word: Word::new(label.text.clone(), label.weight),
            font_size: label.font_size,
            rotation_deg: label.rotation_deg,
            input_index: 0,
        };
        mask::build_footprint(&self.rasterizer, &sized, &self.config)
    }

    /// Lay out `words` with the configured seed and no cancellation.
    pub fn run(&self, words: &[Word]) -> LayoutResult {
        let mut rng = SeededRng::new(self.config.seed);
        self.run_with(words, &mut rng, &CancelToken::new())
    }

    /// Lay out `words`, drawing rotations from `rng`.
    ///
    /// When `cancel` fires, words not yet reached are dropped as
    /// [`DropReason::Interrupted`] and the partial result is returned.
    pub fn run_with(
        &self,
        words: &[Word],
        rng: &mut dyn RandomSource,
        cancel: &CancelToken,
    ) -> LayoutResult {
        let config = &self.config;
        log::info!(
            "Laying out {} words on a {}x{} canvas",
            words.len(),
            config.width,
            config.height
        );

        let mut result = LayoutResult::default();
        for word in words.iter().filter(|w| !w.is_valid()) {
            log::warn!("Skipping invalid word {:?} (weight {})", word.text, word.weight);
            result.record_drop(word, DropReason::InvalidWord);
        }

        let mut sized = sizer::size_words(words, config, rng);
        sizer::sort_by_weight(&mut sized);

        if let Some(limit) = config.word_limit {
            if sized.len() > limit {
                log::debug!("Word limit {limit}: dropping {} words", sized.len() - limit);
                for extra in sized.split_off(limit) {
                    result.record_drop(&extra.word, DropReason::OverLimit);
                }
            }
        }

        let masks = self.build_masks(&sized);

        let canvas = Aabb::from_rect(0, 0, config.width, config.height);
        let mut index = spatial::build_index(config);
        let mut footprints = Footprints::new();

        for (i, (word, mask)) in sized.iter().zip(masks).enumerate() {
            if cancel.is_cancelled() {
                log::info!("Layout cancelled after {i} of {} words", sized.len());
                for rest in &sized[i..] {
                    result.record_drop(&rest.word, DropReason::Interrupted);
                }
                result.interrupted = true;
                break;
            }
            let state = self.place_one(
                word,
                mask,
                &canvas,
                index.as_mut(),
                &mut footprints,
                &mut result,
            );
            log::trace!("{:?} -> {state:?}", word.word.text);
        }

        log::info!(
            "Placed {} words, dropped {}",
            result.placements.len(),
            result.dropped_count
        );
        result
    }

    /// `MaskBuilt → Placed | Dropped` for one word.
    fn place_one(
        &self,
        word: &SizedWord,
        mask: MaskResult,
        canvas: &Aabb,
        index: &mut dyn SpatialIndex,
        footprints: &mut Footprints,
        result: &mut LayoutResult,
    ) -> WordState {
        let mask = match mask {
            Ok(mask) => mask,
            Err(e) => {
                let reason = match e {
                    MaskError::TooLarge(_) => DropReason::MaskTooLarge,
                    MaskError::Raster(_) => DropReason::Raster,
                };
                log::debug!("Dropping {:?}: {e}", word.word.text);
                result.record_drop(&word.word, reason);
                return WordState::Dropped;
            }
        };

        match spiral::search(&mask, canvas, index, footprints, &self.config.spiral) {
            Ok(placement) => {
                let id = footprints.push(mask, (placement.x, placement.y));
                index.insert(placement.bounds, id);
                debug_assert_eq!(id.index(), result.placements.len());
                result.placements.push(PlacedLabel {
                    text: word.word.text.clone(),
                    weight: word.word.weight,
                    font_size: word.font_size,
                    rotation_deg: word.rotation_deg,
                    x: placement.x,
                    y: placement.y,
                    bounds: placement.bounds,
                });
                WordState::Placed
            }
            Err(e) => {
                log::debug!("Dropping {:?}: {e}", word.word.text);
                result.record_drop(&word.word, DropReason::Exhausted);
                WordState::Dropped
            }
        }
    }

    /// `Sized → MaskBuilt` for every word, in one batch.
    ///
    /// Distinct requests are built once; the batch finishes before placement
    /// starts, and output order follows `words` regardless of completion
    /// order.
    fn build_masks(&self, words: &[SizedWord]) -> Vec<MaskResult> {
        let mut slots: FxHashMap<MaskKey<'_>, usize> = FxHashMap::default();
        let mut unique: Vec<&SizedWord> = Vec::new();
        let slot_of: Vec<usize> = words
            .iter()
            .map(|w| {
                *slots.entry(MaskKey::of(w)).or_insert_with(|| {
                    unique.push(w);
                    unique.len() - 1
                })
            })
            .collect();

        let build = |w: &&SizedWord| -> MaskResult {
            mask::build_footprint(&self.rasterizer, w, &self.config).map(Arc::new)
        };

        let built: Vec<MaskResult> = if self.config.parallel_masks && unique.len() > 1 {
            match &self.pool {
                Some(pool) => pool.install(|| unique.par_iter().map(&build).collect()),
                None => unique.par_iter().map(&build).collect(),
            }
        } else {
            unique.iter().map(&build).collect()
        };
        log::debug!("Built {} masks for {} words", built.len(), words.len());

        slot_of.into_iter().map(|i| built[i].clone()).collect()
    }
}

/// One-shot layout with a fresh engine.
pub fn layout<R: GlyphRasterizer>(
    words: &[Word],
    config: LayoutConfig,
    rasterizer: R,
) -> Result<LayoutResult, ConfigError> {
    Ok(CloudLayout::new(config, rasterizer)?.run(words))
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockRasterizer;
    use crate::mask::{GlyphRequest, RasterError};
    use std::sync::atomic::AtomicUsize;
    use wordcloud_core::{IndexBackend, RotationOption, SequenceSource};

    fn upright(width: i32, height: i32) -> LayoutConfig {
        LayoutConfig {
            width,
            height,
            padding: 1,
            font_scale: 10.0,
            rotation_options: vec![RotationOption::new(0.0, 1.0)],
            ..Default::default()
        }
    }

    fn engine(config: LayoutConfig) -> CloudLayout<BlockRasterizer> {
        CloudLayout::new(config, BlockRasterizer::new()).expect("valid config")
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let result = CloudLayout::new(LayoutConfig::with_canvas(0, 10), BlockRasterizer::new());
        assert!(matches!(result, Err(ConfigError::InvalidDimension { .. })));
    }

    #[test]
    fn test_empty_input() {
        let result = engine(upright(100, 100)).run(&[]);
        assert!(result.is_empty());
        assert_eq!(result.dropped_count, 0);
        assert!(!result.interrupted);
    }

    #[test]
    fn test_single_word_at_center() {
        let result = engine(upright(200, 100)).run(&[Word::new("solo", 1.0)]);
        assert_eq!(result.len(), 1);
        let p = &result.placements[0];
        assert_eq!((p.x, p.y), (100, 50));
        assert_eq!(p.font_size, 10.0);
    }

    #[test]
    fn test_processing_order_is_weight_descending() {
        let words = vec![
            Word::new("low", 1.0),
            Word::new("high", 4.0),
            Word::new("mid", 2.0),
        ];
        let result = engine(upright(400, 300)).run(&words);
        let order: Vec<&str> = result.placements.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(order, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_invalid_words_are_dropped() {
        let words = vec![
            Word::new("ok", 1.0),
            Word::new("", 3.0),
            Word::new("neg", -1.0),
        ];
        let result = engine(upright(200, 200)).run(&words);
        assert_eq!(result.len(), 1);
        assert_eq!(result.dropped_for(DropReason::InvalidWord), 2);
        assert_eq!(result.total(), 3);
    }

    #[test]
    fn test_word_limit() {
        let words: Vec<Word> = (0..10)
            .map(|i| Word::new(format!("w{i}"), 1.0 + i as f64))
            .collect();
        let config = LayoutConfig {
            word_limit: Some(4),
            ..upright(600, 600)
        };
        let result = engine(config).run(&words);
        assert_eq!(result.len(), 4);
        assert_eq!(result.dropped_for(DropReason::OverLimit), 6);
        // The heaviest four survive.
        assert!(result.find("w9").is_some());
        assert!(result.find("w0").is_none());
    }

    #[test]
    fn test_too_large_word_is_dropped() {
        let words = vec![Word::new("enormous", 1.0)];
        let config = LayoutConfig {
            font_scale: 80.0,
            ..upright(100, 100)
        };
        let result = engine(config).run(&words);
        assert!(result.is_empty());
        assert_eq!(result.dropped_count, 1);
        assert_eq!(result.dropped[0].reason, DropReason::MaskTooLarge);
    }

    #[test]
    fn test_cancel_before_start_interrupts_everything() {
        let words = vec![Word::new("a", 1.0), Word::new("b", 2.0)];
        let cancel = CancelToken::new();
        cancel.cancel();
        let layout = engine(upright(100, 100));
        let result = layout.run_with(&words, &mut SeededRng::new(1), &cancel);
        assert!(result.interrupted);
        assert!(result.is_empty());
        assert_eq!(result.dropped_for(DropReason::Interrupted), 2);
    }

    /// Cancels once a fixed number of glyphs has been requested.
    struct CancelAfter {
        inner: BlockRasterizer,
        calls: AtomicUsize,
        after: usize,
        token: CancelToken,
    }

    impl GlyphRasterizer for CancelAfter {
        fn rasterize(&self, request: &GlyphRequest<'_>) -> Result<GlyphMask, RasterError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) + 1 >= self.after {
                self.token.cancel();
            }
            self.inner.rasterize(request)
        }
    }

    #[test]
    fn test_cancel_during_run_returns_partial_result() {
        let token = CancelToken::new();
        let rasterizer = CancelAfter {
            inner: BlockRasterizer::new(),
            calls: AtomicUsize::new(0),
            after: 3,
            token: token.clone(),
        };
        let config = LayoutConfig {
            parallel_masks: false,
            ..upright(300, 300)
        };
        let layout = CloudLayout::new(config, rasterizer).unwrap();
        let words: Vec<Word> = (0..5).map(|i| Word::new(format!("w{i}"), 5.0 - i as f64)).collect();
        // Masks are all built before placement, so the token has fired by the
        // time the first word is checked.
        let result = layout.run_with(&words, &mut SeededRng::new(1), &token);
        assert!(result.interrupted);
        assert_eq!(result.total(), 5);
    }

    #[test]
    fn test_duplicate_words_share_a_mask_and_place_apart() {
        let words = vec![Word::new("echo", 1.0), Word::new("echo", 1.0)];
        let counting = CountingRasterizer::default();
        let config = LayoutConfig {
            parallel_masks: false,
            ..upright(300, 300)
        };
        let layout = CloudLayout::new(config, &counting).unwrap();
        let result = layout.run(&words);
        assert_eq!(result.len(), 2);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
        let (a, b) = (&result.placements[0], &result.placements[1]);
        assert_ne!((a.x, a.y), (b.x, b.y));
    }

    #[derive(Default)]
    struct CountingRasterizer {
        calls: AtomicUsize,
    }

    impl GlyphRasterizer for CountingRasterizer {
        fn rasterize(&self, request: &GlyphRequest<'_>) -> Result<GlyphMask, RasterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            BlockRasterizer::new().rasterize(request)
        }
    }

    #[test]
    fn test_rng_drives_rotation() {
        let config = LayoutConfig {
            rotation_options: vec![
                RotationOption::new(0.0, 0.5),
                RotationOption::new(-90.0, 0.5),
            ],
            ..upright(400, 400)
        };
        let layout = engine(config);
        let words = vec![Word::new("up", 2.0), Word::new("flat", 1.0)];
        let mut src = SequenceSource::new(vec![0.9, 0.1]);
        let result = layout.run_with(&words, &mut src, &CancelToken::new());
        assert_eq!(result.find("up").unwrap().rotation_deg, -90.0);
        assert_eq!(result.find("flat").unwrap().rotation_deg, 0.0);
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let words: Vec<Word> = (0..40)
            .map(|i| Word::new(format!("word{i}"), 1.0 + (i % 7) as f64))
            .collect();
        let base = LayoutConfig {
            rotation_options: vec![
                RotationOption::new(0.0, 0.75),
                RotationOption::new(-90.0, 0.25),
            ],
            ..upright(400, 300)
        };
        let seq = engine(LayoutConfig {
            parallel_masks: false,
            ..base.clone()
        })
        .run(&words);
        let par = engine(LayoutConfig {
            parallel_masks: true,
            threads: Some(2),
            ..base
        })
        .run(&words);
        assert_eq!(seq, par);
    }

    #[test]
    fn test_backends_agree() {
        let words: Vec<Word> = (0..30)
            .map(|i| Word::new(format!("t{i}"), 1.0 + (i % 5) as f64))
            .collect();
        let quad = engine(upright(300, 200)).run(&words);
        let flat = engine(LayoutConfig {
            index: IndexBackend::Flat,
            ..upright(300, 200)
        })
        .run(&words);
        assert_eq!(quad, flat);
    }

    #[test]
    fn test_layout_helper() {
        let result =
            layout(&[Word::new("x", 1.0)], upright(50, 50), BlockRasterizer::new()).unwrap();
        assert_eq!(result.len(), 1);
        assert!(layout(&[], LayoutConfig::with_canvas(-1, 5), BlockRasterizer::new()).is_err());
    }
}
