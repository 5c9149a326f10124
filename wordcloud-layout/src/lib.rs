//! # wordcloud-layout
//!
//! Collision-free word-cloud placement.  Weighted words go in; each comes
//! out with a font size, a rotation and an integer canvas position, or is
//! counted as dropped.
//!
//! ## Pipeline
//!
//! ```text
//! Word[] ──► sizer ──► stable weight sort ──► mask prepass (rayon)
//!                                                   │
//!                      ┌────────────────────────────┘
//!                      ▼
//!            spiral search ◄──► SpatialIndex (quadtree) + footprints
//!                      │
//!                      ▼
//!                LayoutResult ──► bridge ──► CloudPayload JSON
//! ```
//!
//! - **`sizer`** — weight → font size, rotation draw.
//! - **`mask`** — `GlyphMask`, the `GlyphRasterizer` capability, padding.
//! - **`block`** — font-free `BlockRasterizer` for tests and headless runs.
//! - **`spatial`** — `SpatialIndex` trait, arena `Quadtree`, `FlatIndex`.
//! - **`spiral`** — Archimedean candidate walk and the fit test.
//! - **`engine`** — `CloudLayout`, the placement orchestrator.
//! - **`bridge`** — analytics JSON in, renderer payload out.

pub mod block;
pub mod bridge;
pub mod engine;
pub mod mask;
pub mod sizer;
pub mod spatial;
pub mod spiral;

pub use block::BlockRasterizer;
pub use bridge::{dropped_notice, parse_words, render_payload, BridgeError};
pub use engine::{layout, CancelToken, CloudLayout, WordState};
pub use mask::{GlyphMask, GlyphRasterizer, GlyphRequest, MaskError, MaskTooLarge, RasterError};
pub use spatial::{build_index, FlatIndex, NodeId, Quadtree, SpatialIndex};
pub use spiral::{Footprints, Placement, PlacementExhausted, Spiral};
