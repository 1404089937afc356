//! midare-pipeline: Pure pixel-sorting pipeline (sans-IO).
//!
//! Reorders the pixels of a raster image along configurable traversals:
//! extract seams -> segment each seam into sortable stretches ->
//! reorder each stretch -> write the seams back into place.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! image buffers and returns a new buffer. Decoding, encoding, masks on
//! disk, rotation for angled sorts, and multi-image fan-out live in the
//! `midare` CLI crate.

pub mod carve;
pub mod compare;
pub mod energy;
pub mod pattern;
pub mod reorder;
pub mod segment;
pub mod types;

use rand::Rng;

pub use compare::{Comparator, ComparatorKind, PixelComparator};
pub use pattern::{PatternKind, SeamPattern, SeamSet, TraversalData};
pub use reorder::{AlgorithmKind, ReorderOptions};
pub use types::{
    GrayImage, Pixel, PipelineError, RgbaImage, Seam, SortConfig, Stretch, Thresholds,
};

/// Run the full pixel-sorting pipeline with a caller-supplied
/// randomness source.
///
/// The generator drives every random decision (Random's chunk lengths
/// and coin flips, Wave's jitter, Shuffle's swap targets), so a seeded
/// generator reproduces a run exactly.
///
/// # Pipeline steps
///
/// 1. Validate the configuration and buffer dimensions
/// 2. Extract seams with the configured traversal pattern
/// 3. Per seam: partition into unmasked stretches
/// 4. Per stretch: apply the configured reordering algorithm
/// 5. Write the seams back through the pattern's inverse geometry
///
/// The input image is not modified; the result starts as a copy, so
/// pixels the traversal never touches keep their original values.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if any configuration field
/// is out of range, [`PipelineError::EmptyImage`] if the image has a
/// zero dimension, and [`PipelineError::MaskDimensionMismatch`] if a
/// mask is present with different dimensions than the image.
pub fn sort_image_with<R>(
    image: &RgbaImage,
    mask: Option<&GrayImage>,
    config: &SortConfig,
    rng: &mut R,
) -> Result<RgbaImage, PipelineError>
where
    R: Rng + ?Sized,
{
    config.validate()?;
    if image.width() == 0 || image.height() == 0 {
        return Err(PipelineError::EmptyImage);
    }
    if let Some(mask) = mask
        && mask.dimensions() != image.dimensions()
    {
        return Err(PipelineError::MaskDimensionMismatch {
            width: image.width(),
            height: image.height(),
            mask_width: mask.width(),
            mask_height: mask.height(),
        });
    }

    let comparator = Comparator::from_config(config);
    let options = ReorderOptions::from_config(config);

    let mut seam_set = config.pattern.extract(image, mask);
    for seam in &mut seam_set.seams {
        for stretch in segment::unmasked_stretches(seam) {
            config.algorithm.apply(
                &mut seam[stretch.start..stretch.end],
                &options,
                &comparator,
                rng,
            );
        }
    }

    let mut output = image.clone();
    config.pattern.write_back(&mut output, &seam_set);
    Ok(output)
}

/// Run the full pixel-sorting pipeline with thread-local randomness.
///
/// Convenience wrapper over [`sort_image_with`] for callers that do not
/// need reproducible runs.
///
/// # Errors
///
/// Same conditions as [`sort_image_with`].
pub fn sort_image(
    image: &RgbaImage,
    mask: Option<&GrayImage>,
    config: &SortConfig,
) -> Result<RgbaImage, PipelineError> {
    sort_image_with(image, mask, config, &mut rand::rng())
}
