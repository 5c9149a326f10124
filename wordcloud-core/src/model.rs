//! Words in, placements out.

use serde::{Deserialize, Serialize};

use crate::geometry::Aabb;

/// A weighted label supplied by the text-analytics stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub weight: f64,
}

impl Word {
    pub fn new(text: impl Into<String>, weight: f64) -> Self {
        Self {
            text: text.into(),
            weight,
        }
    }

    /// Non-blank text and a positive finite weight.
    pub fn is_valid(&self) -> bool {
        !self.text.trim().is_empty() && self.weight.is_finite() && self.weight > 0.0
    }
}

/// A word after sizing: font size and rotation are fixed from here on.
#[derive(Clone, Debug, PartialEq)]
pub struct SizedWord {
    pub word: Word,
    pub font_size: f32,
    pub rotation_deg: f32,
    /// Position in the caller's list.
    pub input_index: usize,
}

/// Identity of a placed label: its index in [`LayoutResult::placements`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(pub u32);

impl LabelId {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A label committed to the canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedLabel {
    pub text: String,
    pub weight: f64,
    pub font_size: f32,
    pub rotation_deg: f32,
    /// Label center in canvas pixels.
    pub x: i32,
    pub y: i32,
    /// Padded footprint box as stored in the spatial index.
    pub bounds: Aabb,
}

/// Why a word did not make it onto the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DropReason {
    /// Empty text or a non-positive weight.
    InvalidWord,
    /// The rasterizer could not produce a footprint.
    Raster,
    /// Footprint larger than the canvas.
    MaskTooLarge,
    /// Spiral ran past its radius bound without finding room.
    Exhausted,
    /// The run was cancelled before this word was reached.
    Interrupted,
    /// Beyond the configured word limit.
    OverLimit,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedWord {
    pub text: String,
    pub weight: f64,
    pub reason: DropReason,
}

/// Outcome of one layout run.
///
/// `placements` is in processing order (heaviest first) and
/// `placements.len() + dropped_count` always equals the input length.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    pub placements: Vec<PlacedLabel>,
    pub dropped_count: usize,
    pub dropped: Vec<DroppedWord>,
    /// Set when a cancellation cut the run short.
    pub interrupted: bool,
}

impl LayoutResult {
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Words accounted for, placed or dropped.
    pub fn total(&self) -> usize {
        self.placements.len() + self.dropped_count
    }

    pub fn find(&self, text: &str) -> Option<&PlacedLabel> {
        self.placements.iter().find(|p| p.text == text)
    }

    pub fn record_drop(&mut self, word: &Word, reason: DropReason) {
        self.dropped_count += 1;
        self.dropped.push(DroppedWord {
            text: word.text.clone(),
            weight: word.weight,
            reason,
        });
    }

    /// Number of drops with the given reason.
    pub fn dropped_for(&self, reason: DropReason) -> usize {
        self.dropped.iter().filter(|d| d.reason == reason).count()
    }
}
