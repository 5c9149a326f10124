//! Layout configuration and its validation.
//!
//! Every field has a default so a partial JSON document is a valid config:
//!
//! ```json
//! { "width": 800, "height": 600, "padding": 2 }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance for the rotation distribution summing to one.
const PROBABILITY_EPSILON: f64 = 1e-6;

/// Smallest accepted spiral angle increment, in radians.
pub const MIN_ANGLE_STEP: f32 = 1e-4;

/// Fatal configuration problems.  Raised before any word is processed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("canvas dimensions must be positive, got {width}x{height}")]
    InvalidDimension { width: i32, height: i32 },

    #[error("font scale must be a positive finite number, got {0}")]
    InvalidFontScale(f32),

    #[error("padding {padding} leaves no room on a {width}x{height} canvas")]
    PaddingTooLarge { padding: u32, width: i32, height: i32 },

    #[error("font family must not be empty")]
    EmptyFontFamily,

    #[error("rotation distribution is empty")]
    EmptyRotations,

    #[error("rotation angle must be finite, got {0}")]
    InvalidRotation(f32),

    #[error("rotation probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),

    #[error("rotation probabilities must sum to 1, got {0}")]
    ProbabilitySum(f64),

    #[error("invalid spiral parameter '{field}': {value}")]
    InvalidSpiral { field: &'static str, value: f32 },

    #[error("quadtree node capacity must be at least 1")]
    InvalidQuadtree,

    #[error("malformed config document: {0}")]
    Parse(String),
}

/// One entry of the discrete rotation distribution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationOption {
    /// Rotation in degrees, clockwise on screen.
    pub angle_deg: f32,
    pub probability: f64,
}

impl RotationOption {
    pub const fn new(angle_deg: f32, probability: f64) -> Self {
        Self {
            angle_deg,
            probability,
        }
    }
}

/// Archimedean spiral tuning.
///
/// At step `k` the walk is at angle `θ = k · angle_step` and radius
/// `r = spacing · θ`; it stops once `r` exceeds
/// `radius_factor · diagonal / 2`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpiralConfig {
    /// Angle increment per step, in radians.
    pub angle_step: f32,
    /// Radius growth in pixels per radian.
    pub spacing: f32,
    /// Multiplier on half the canvas diagonal.
    pub radius_factor: f32,
}

impl Default for SpiralConfig {
    fn default() -> Self {
        Self {
            angle_step: 0.1,
            spacing: 1.0,
            radius_factor: 1.0,
        }
    }
}

/// Which spatial index the orchestrator builds for a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    #[default]
    Quadtree,
    /// Linear scan.  Only sensible for a few dozen words.
    Flat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuadtreeConfig {
    pub max_depth: u8,
    /// Items a node holds before it splits.
    pub node_capacity: usize,
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            node_capacity: 8,
        }
    }
}

/// Full configuration for one layout run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub width: i32,
    pub height: i32,
    pub font_family: String,
    pub font_scale: f32,
    /// Cells added around every footprint before collision testing.
    pub padding: u32,
    pub rotation_options: Vec<RotationOption>,
    /// CSS-style weight (100–900) requested from the rasterizer.
    pub font_weight: u16,
    /// Extra advance between glyphs in pixels.
    pub letter_spacing: f32,
    /// Keep only the heaviest N words; the rest are dropped.
    pub word_limit: Option<usize>,
    /// Alpha (0–255) at or above which a rasterized cell counts as occupied.
    pub alpha_threshold: u8,
    pub spiral: SpiralConfig,
    pub index: IndexBackend,
    pub quadtree: QuadtreeConfig,
    /// Build masks on a rayon pool before placement.
    pub parallel_masks: bool,
    /// Worker count for mask building, `None` = rayon default.
    pub threads: Option<usize>,
    /// Seed for the rotation sampler.
    pub seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 720,
            font_family: String::from("Montserrat"),
            font_scale: 20.0,
            padding: 5,
            rotation_options: vec![
                RotationOption::new(0.0, 0.75),
                RotationOption::new(-90.0, 0.25),
            ],
            font_weight: 600,
            letter_spacing: 1.0,
            word_limit: Some(300),
            alpha_threshold: 64,
            spiral: SpiralConfig::default(),
            index: IndexBackend::default(),
            quadtree: QuadtreeConfig::default(),
            parallel_masks: true,
            threads: None,
            seed: 0x5EED_C10D,
        }
    }
}

impl LayoutConfig {
    /// Config for a `width × height` canvas, everything else default.
    pub fn with_canvas(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Parse a (possibly partial) JSON document and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        log::debug!(
            "Loaded layout config: {}x{} canvas, family '{}'",
            config.width,
            config.height,
            config.font_family
        );
        Ok(config)
    }

    /// Length of the canvas diagonal in pixels.
    pub fn diagonal(&self) -> f32 {
        (self.width as f32).hypot(self.height as f32)
    }

    /// Check every constraint.  The first violation wins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ConfigError::InvalidDimension {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.font_scale.is_finite() && self.font_scale > 0.0) {
            return Err(ConfigError::InvalidFontScale(self.font_scale));
        }
        if u64::from(self.padding) * 2 >= self.width.min(self.height) as u64 {
            return Err(ConfigError::PaddingTooLarge {
                padding: self.padding,
                width: self.width,
                height: self.height,
            });
        }
        if self.font_family.trim().is_empty() {
            return Err(ConfigError::EmptyFontFamily);
        }

        if self.rotation_options.is_empty() {
            return Err(ConfigError::EmptyRotations);
        }
        let mut sum = 0.0;
        for option in &self.rotation_options {
            if !option.angle_deg.is_finite() {
                return Err(ConfigError::InvalidRotation(option.angle_deg));
            }
            if !(0.0..=1.0).contains(&option.probability) {
                return Err(ConfigError::InvalidProbability(option.probability));
            }
            sum += option.probability;
        }
        if (sum - 1.0).abs() > PROBABILITY_EPSILON {
            return Err(ConfigError::ProbabilitySum(sum));
        }

        let spiral = &self.spiral;
        for (field, value) in [
            ("angleStep", spiral.angle_step),
            ("spacing", spiral.spacing),
            ("radiusFactor", spiral.radius_factor),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidSpiral { field, value });
            }
        }
        if spiral.angle_step < MIN_ANGLE_STEP {
            return Err(ConfigError::InvalidSpiral {
                field: "angleStep",
                value: spiral.angle_step,
            });
        }

        if self.quadtree.node_capacity == 0 {
            return Err(ConfigError::InvalidQuadtree);
        }
        Ok(())
    }
}

// ===================================================================
// Tests
// ===================================================================
