//! Seam traversal strategies: linearize a 2-D image into seams and back.
//!
//! This module defines the [`PatternKind`] enum for selecting a
//! traversal strategy by name and the [`SeamPattern`] trait pairing
//! each extractor with its geometric inverse writer.
//!
//! # Strategy pattern
//!
//! An extractor copies pixels out of the image into ordered seams; the
//! matched writer replays the identical geometry to copy them back.
//! Whatever side data an extractor produces (the carve path) rides
//! along in the [`SeamSet`] and reaches the writer unmodified, so the
//! pipeline between the two never needs to understand it.

use std::fmt;
use std::str::FromStr;

use image::{GrayImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::carve;
use crate::types::{Pixel, PipelineError, Seam};

/// Selects which traversal strategy linearizes the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// One seam per image row, left to right.
    #[default]
    Row,
    /// One seam per concentric ring, traversed clockwise from the
    /// top-left corner inward.
    Spiral,
    /// Seams following a minimum-energy vertical path, offset across
    /// the image width.
    #[serde(rename = "seam")]
    SeamCarve,
}

impl PatternKind {
    /// Every selectable pattern, in listing order.
    pub const ALL: [Self; 3] = [Self::Row, Self::Spiral, Self::SeamCarve];

    /// The registry name for this pattern.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::Spiral => "spiral",
            Self::SeamCarve => "seam",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PatternKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                PipelineError::InvalidConfig(format!(
                    "unknown pattern \"{s}\" [row, spiral, seam]",
                ))
            })
    }
}

/// Side data an extractor hands to its matched writer.
///
/// Opaque to everything between extraction and write-back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraversalData {
    /// The geometry is fully determined by the image dimensions.
    None,
    /// The seam-carving column path, one entry per row.
    CarvePath(Vec<usize>),
}

/// The seams of one image plus the extractor's side data.
#[derive(Debug, Clone)]
pub struct SeamSet {
    /// One entry per seam, in the strategy's fixed order.
    pub seams: Vec<Seam>,
    /// Whatever the extractor needs its writer to know.
    pub data: TraversalData,
}

/// Trait for matched extractor/writer pairs.
///
/// For every strategy, extracting with no mask and writing straight
/// back must reproduce the input image exactly.
pub trait SeamPattern {
    /// Copy the image's pixels into ordered seams.
    ///
    /// An absent mask means nothing is masked.
    fn extract(&self, image: &RgbaImage, mask: Option<&GrayImage>) -> SeamSet;

    /// Write a (possibly reordered) seam set back into the image.
    fn write_back(&self, image: &mut RgbaImage, seam_set: &SeamSet);
}

impl SeamPattern for PatternKind {
    fn extract(&self, image: &RgbaImage, mask: Option<&GrayImage>) -> SeamSet {
        match *self {
            Self::Row => extract_rows(image, mask),
            Self::Spiral => extract_spiral(image, mask),
            Self::SeamCarve => carve::extract(image, mask),
        }
    }

    fn write_back(&self, image: &mut RgbaImage, seam_set: &SeamSet) {
        match *self {
            Self::Row => write_rows(image, seam_set),
            Self::Spiral => write_spiral(image, seam_set),
            Self::SeamCarve => carve::write_back(image, seam_set),
        }
    }
}

/// Sample the mask at a coordinate; an absent mask masks nothing.
pub(crate) fn mask_value(mask: Option<&GrayImage>, x: u32, y: u32) -> u8 {
    mask.map_or(0, |m| m.get_pixel(x, y).0[0])
}

/// Seam *i* is row *i*, left to right.
fn extract_rows(image: &RgbaImage, mask: Option<&GrayImage>) -> SeamSet {
    let seams = (0..image.height())
        .map(|y| {
            (0..image.width())
                .map(|x| Pixel::from_rgba(image.get_pixel(x, y).0, mask_value(mask, x, y)))
                .collect()
        })
        .collect();
    SeamSet {
        seams,
        data: TraversalData::None,
    }
}

/// Position *j* of seam *i* lands at pixel `(j, i)`.
fn write_rows(image: &mut RgbaImage, seam_set: &SeamSet) {
    for (y, seam) in (0..).zip(&seam_set.seams) {
        for (x, pixel) in (0..).zip(seam) {
            image.put_pixel(x, y, Rgba(pixel.rgba()));
        }
    }
}

/// The pixel coordinates of one concentric ring, in traversal order:
/// top edge left to right (both corners), right edge downward, bottom
/// edge right to left (no corners), left edge upward (stopping short of
/// the corner the ring opened with).
///
/// Sharing this between extraction and write-back is what makes the
/// writer the exact inverse of the extractor.
fn ring_coordinates(width: i64, height: i64, offset: i64) -> Vec<(u32, u32)> {
    let top = offset;
    let bottom = height - offset - 1;
    let left = offset;
    let right = width - offset - 1;

    // An inset past the opposite edge has no pixels of its own.
    if right < left || bottom < top {
        return Vec::new();
    }

    let mut coords = Vec::new();
    let mut push = |x: i64, y: i64| {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        coords.push((x as u32, y as u32));
    };

    for x in left..=right {
        push(x, top);
    }
    for y in (top + 1)..=bottom {
        push(right, y);
    }
    // Degenerate one-row and one-column rings are fully covered by the
    // first two edges; revisiting them would break the one-seam-per-pixel
    // mapping.
    if bottom > top {
        let mut x = right - 1;
        while x > left {
            push(x, bottom);
            x -= 1;
        }
    }
    if right > left {
        let mut y = bottom;
        while y > top {
            push(left, y);
            y -= 1;
        }
    }
    coords
}

/// One seam per inset ring, offsets `0..=min(width, height) / 2`.
///
/// The innermost ring degenerates to a single pixel or a single
/// row/column for odd dimensions, and to an empty seam for even ones.
fn extract_spiral(image: &RgbaImage, mask: Option<&GrayImage>) -> SeamSet {
    let width = i64::from(image.width());
    let height = i64::from(image.height());

    let seams = (0..=width.min(height) / 2)
        .map(|offset| {
            ring_coordinates(width, height, offset)
                .into_iter()
                .map(|(x, y)| Pixel::from_rgba(image.get_pixel(x, y).0, mask_value(mask, x, y)))
                .collect::<Seam>()
        })
        .collect();

    SeamSet {
        seams,
        data: TraversalData::None,
    }
}

/// Replay each ring's geometry, consuming seam positions in order.
fn write_spiral(image: &mut RgbaImage, seam_set: &SeamSet) {
    let width = i64::from(image.width());
    let height = i64::from(image.height());

    for (offset, seam) in (0..).zip(&seam_set.seams) {
        for ((x, y), pixel) in ring_coordinates(width, height, offset).into_iter().zip(seam) {
            image.put_pixel(x, y, Rgba(pixel.rgba()));
        }
    }
}
