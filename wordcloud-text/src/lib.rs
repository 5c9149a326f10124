//! # wordcloud-text
//!
//! Real-font glyph masks for the word-cloud layout engine, via `cosmic-text`.
//!
//! ## Architecture
//!
//! ```text
//! GlyphRequest ──► MaskCache (lru) ──hit──► GlyphMask
//!       │ miss
//!       ▼
//! Shaper[rayon worker] (FontSystem + SwashCache)
//!       │ shape one line, render glyphs, threshold alpha
//!       ▼
//! upright mask ──► rotate ──► trim ──► GlyphMask
//! ```
//!
//! - **`engine`** — `CosmicRasterizer`, the `GlyphRasterizer` implementation.
//! - **`family`** — CSS family chain resolution against the font database.
//! - **`cache`** — `MaskCache`, an LRU of finished masks.

pub mod cache;
pub mod engine;
pub mod family;

// Re-exports for ergonomic use.
pub use cache::{MaskCache, MaskKey};
pub use engine::{CosmicRasterizer, DEFAULT_ALPHA_THRESHOLD};
pub use family::{GenericFamily, ResolvedFamily};
