//! Shared types for the midare pixel-sorting pipeline.

use serde::{Deserialize, Serialize};

use crate::compare::ComparatorKind;
use crate::pattern::PatternKind;
use crate::reorder::AlgorithmKind;

/// Re-export `GrayImage` so downstream crates can reference mask
/// grids without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbaImage` so downstream crates can reference the
/// decoded image without depending on `image` directly.
pub use image::RgbaImage;

/// Mask value that excludes a pixel from reordering.
pub const MASKED: u8 = 255;

/// One image pixel bundled with the mask value sampled at the same
/// coordinate.
///
/// Pixels are plain values with no identity beyond their position in a
/// seam: extraction copies them out of the image buffer, reordering
/// moves them around, and write-back copies them back in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pixel {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
    /// Mask value sampled at the pixel's source coordinate.
    /// [`MASKED`] excludes the pixel from reordering.
    pub mask: u8,
}

impl Pixel {
    /// Create a pixel from explicit channel values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8, mask: u8) -> Self {
        Self { r, g, b, a, mask }
    }

    /// Create a pixel from an RGBA channel array plus a mask value.
    #[must_use]
    pub const fn from_rgba(rgba: [u8; 4], mask: u8) -> Self {
        Self::new(rgba[0], rgba[1], rgba[2], rgba[3], mask)
    }

    /// The pixel's RGBA channels as an array, dropping the mask.
    #[must_use]
    pub const fn rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Whether the pixel is excluded from reordering.
    ///
    /// A pixel is masked when its mask value is [`MASKED`] or when all
    /// four channels are zero. The all-zero rule is what lets the
    /// seam-carving traversal pad clipped seams with zero pixels and
    /// have the segmenter skip them for free.
    #[must_use]
    pub const fn is_masked(self) -> bool {
        self.mask == MASKED || (self.r == 0 && self.g == 0 && self.b == 0 && self.a == 0)
    }

    /// Perceptual luminance in `[0.0, 1.0]`.
    ///
    /// Uses the standard Rec. 601 weights
    /// (`0.299*R + 0.587*G + 0.114*B`), matching the grayscale
    /// conversion used for the energy field.
    #[must_use]
    pub fn luminance(self) -> f32 {
        (0.299 * f32::from(self.r) + 0.587 * f32::from(self.g) + 0.114 * f32::from(self.b)) / 255.0
    }
}

/// One linear traversal of image pixels produced by an extraction
/// strategy.
pub type Seam = Vec<Pixel>;

/// A half-open index range `[start, end)` into one seam.
///
/// Stretches are plain index ranges over the owned seam buffer, never
/// independent pixel copies, so reordering a stretch mutates the seam
/// in place and write-back sees the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stretch {
    /// First index covered by the stretch.
    pub start: usize,
    /// One past the last index covered by the stretch.
    pub end: usize,
}

impl Stretch {
    /// Create a stretch covering `[start, end)`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of pixels covered.
    #[must_use]
    pub const fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the stretch covers no pixels.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.end <= self.start
    }
}

/// Luminance bounds outside which pixels are not sorted.
///
/// Consumed at the comparator boundary: a pair with either pixel
/// outside `[lower, upper]` is reported as unorderable, which both
/// excludes it from sorting and gates Shuffle's swaps. This composes
/// with mask-based segmentation without counting any exclusion twice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Pixels with luminance below this are not sorted.
    pub lower: f32,
    /// Pixels with luminance above this are not sorted.
    pub upper: f32,
}

impl Thresholds {
    /// Create a threshold pair.
    #[must_use]
    pub const fn new(lower: f32, upper: f32) -> Self {
        Self { lower, upper }
    }

    /// Whether a luminance value falls inside the sortable band.
    #[must_use]
    pub fn contains(self, value: f32) -> bool {
        value >= self.lower && value <= self.upper
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::new(SortConfig::DEFAULT_LOWER_THRESHOLD, SortConfig::DEFAULT_UPPER_THRESHOLD)
    }
}

/// Configuration for one sorting run.
///
/// Constructed once, validated with [`SortConfig::validate`] before any
/// image is touched, and passed by shared reference into every
/// extractor/segmenter/reorder call. Never mutated after construction;
/// parallel per-image workers share it as an immutable snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortConfig {
    /// Traversal strategy used to linearize the image into seams.
    pub pattern: PatternKind,

    /// Reordering algorithm applied to each sortable stretch.
    pub algorithm: AlgorithmKind,

    /// Pixel comparison function, selected by name.
    pub comparator: ComparatorKind,

    /// Base chunk length for the Wave algorithm.
    pub section_length: usize,

    /// Chunk-selection probability for Random and wave-edge jitter for
    /// Wave, in `[0.0, 1.0]`.
    pub randomness: f32,

    /// Flip each sorted stretch end-to-end after sorting.
    pub reverse: bool,

    /// Luminance band outside which pixels are not sorted.
    pub thresholds: Thresholds,

    /// Rotation applied to the image before sorting, in degrees.
    /// Handled entirely by the caller; carried here so one value
    /// describes the whole run.
    pub angle: f64,
}

impl SortConfig {
    /// Default Wave base chunk length.
    pub const DEFAULT_SECTION_LENGTH: usize = 69;
    /// Default randomness.
    pub const DEFAULT_RANDOMNESS: f32 = 1.0;
    /// Default lower luminance threshold.
    pub const DEFAULT_LOWER_THRESHOLD: f32 = 0.0;
    /// Default upper luminance threshold.
    pub const DEFAULT_UPPER_THRESHOLD: f32 = 1.0;
    /// Default rotation angle in degrees.
    pub const DEFAULT_ANGLE: f64 = 0.0;

    /// Check every field against its documented range.
    ///
    /// Runs before any image is touched so that a bad configuration
    /// fails fast instead of mid-pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] naming the offending
    /// field when `section_length` is zero, `randomness` or either
    /// threshold falls outside `[0.0, 1.0]`, or the thresholds are
    /// inverted.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.section_length == 0 {
            return Err(PipelineError::InvalidConfig(
                "section_length must be positive".to_owned(),
            ));
        }
        if !(0.0..=1.0).contains(&self.randomness) {
            return Err(PipelineError::InvalidConfig(format!(
                "randomness {} is outside of range [0.0-1.0]",
                self.randomness,
            )));
        }
        if !(0.0..=1.0).contains(&self.thresholds.lower) {
            return Err(PipelineError::InvalidConfig(format!(
                "lower threshold {} is outside of range [0.0-1.0]",
                self.thresholds.lower,
            )));
        }
        if !(0.0..=1.0).contains(&self.thresholds.upper) {
            return Err(PipelineError::InvalidConfig(format!(
                "upper threshold {} is outside of range [0.0-1.0]",
                self.thresholds.upper,
            )));
        }
        if self.thresholds.lower > self.thresholds.upper {
            return Err(PipelineError::InvalidConfig(format!(
                "lower threshold {} exceeds upper threshold {}",
                self.thresholds.lower, self.thresholds.upper,
            )));
        }
        Ok(())
    }
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            pattern: PatternKind::default(),
            algorithm: AlgorithmKind::default(),
            comparator: ComparatorKind::default(),
            section_length: Self::DEFAULT_SECTION_LENGTH,
            randomness: Self::DEFAULT_RANDOMNESS,
            reverse: false,
            thresholds: Thresholds::default(),
            angle: Self::DEFAULT_ANGLE,
        }
    }
}

/// Errors that can occur during pipeline processing.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The input image has a zero dimension.
    #[error("image has zero width or height")]
    EmptyImage,

    /// The mask grid does not match the image dimensions.
    #[error("mask is {mask_width}x{mask_height} but image is {width}x{height}")]
    MaskDimensionMismatch {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
        /// Mask width in pixels.
        mask_width: u32,
        /// Mask height in pixels.
        mask_height: u32,
    },

    /// Sort configuration is invalid.
    #[error("invalid sort configuration: {0}")]
    InvalidConfig(String),
}
