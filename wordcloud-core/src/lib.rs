//! # wordcloud-core
//!
//! Shared vocabulary for the word-cloud workspace: the word and placement
//! model, the layout configuration with its validation, integer pixel
//! geometry, seeded randomness, and the JSON wire shapes used at the
//! analytics and renderer boundaries.
//!
//! - **`model`** — `Word`, `SizedWord`, `PlacedLabel`, `LayoutResult`.
//! - **`config`** — `LayoutConfig` and `ConfigError`.
//! - **`geometry`** — half-open integer `Aabb`.
//! - **`random`** — `RandomSource` and the seeded `SeededRng`.
//! - **`wire`** — upstream and renderer JSON records.

pub mod config;
pub mod geometry;
pub mod model;
pub mod random;
pub mod wire;

pub use config::{
    ConfigError, IndexBackend, LayoutConfig, QuadtreeConfig, RotationOption, SpiralConfig,
    MIN_ANGLE_STEP,
};
pub use geometry::Aabb;
pub use model::{DropReason, DroppedWord, LabelId, LayoutResult, PlacedLabel, SizedWord, Word};
pub use random::{RandomSource, SeededRng, SequenceSource};
pub use wire::{CloudPayload, LabelRecord, UpstreamWord};
