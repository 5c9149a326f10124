//! LRU memo of rasterized masks.
//!
//! Duplicate words in one run and repeated runs over the same vocabulary
//! request identical glyphs; shaping dominates the cost of a mask, so hits
//! skip cosmic-text entirely.

use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

use lru::LruCache;
use wordcloud_layout::{GlyphMask, GlyphRequest};

pub const DEFAULT_CAPACITY: usize = 1024;

/// Everything that changes the pixels of a mask.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MaskKey {
    pub text: String,
    pub font_family: String,
    pub font_size: u32,
    pub rotation: u32,
    pub font_weight: u16,
    pub letter_spacing: u32,
}

impl MaskKey {
    pub fn of(request: &GlyphRequest<'_>) -> Self {
        Self {
            text: request.text.to_owned(),
            font_family: request.font_family.to_owned(),
            font_size: request.font_size.to_bits(),
            rotation: request.rotation_deg.to_bits(),
            font_weight: request.font_weight,
            letter_spacing: request.letter_spacing.to_bits(),
        }
    }
}

/// Thread-safe LRU keyed by [`MaskKey`].
pub struct MaskCache {
    inner: Mutex<LruCache<MaskKey, GlyphMask>>,
}

impl MaskCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, key: &MaskKey) -> Option<GlyphMask> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn put(&self, key: MaskKey, mask: GlyphMask) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(key, mask);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Default for MaskCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
