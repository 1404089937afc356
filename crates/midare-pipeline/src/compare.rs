//! Pixel comparators: injectable three-way ordering over pixel pairs.
//!
//! This module defines the [`PixelComparator`] trait for pluggable
//! comparison functions and the [`ComparatorKind`] enum for selecting
//! one by name at configuration time.
//!
//! # Strategy pattern
//!
//! The reordering engine only needs *some* total or partial order over
//! pixels; which metric supplies it (lightness, hue, a single channel)
//! is a user choice. The trait/enum design keeps every metric in the
//! core layer while letting tests inject mock functions, including
//! a comparator that orders nothing, which is how Shuffle's swap gating
//! is exercised in isolation.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{Pixel, PipelineError, SortConfig, Thresholds};

/// Trait for pairwise pixel ordering.
///
/// `Ordering::Equal` means "not orderable": stable sorts leave such
/// pairs in their relative order and Shuffle refuses to swap them.
pub trait PixelComparator {
    /// Compare two pixels, returning a three-way order.
    fn compare(&self, a: Pixel, b: Pixel) -> Ordering;
}

impl PixelComparator for fn(Pixel, Pixel) -> Ordering {
    fn compare(&self, a: Pixel, b: Pixel) -> Ordering {
        self(a, b)
    }
}

/// Selects which pixel metric drives the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparatorKind {
    /// HSL lightness, brightest last.
    #[default]
    Lightness,
    /// HSL lightness, brightest first.
    Darkness,
    /// HSL hue angle.
    Hue,
    /// HSL saturation.
    Saturation,
    /// Red channel only.
    Red,
    /// Green channel only.
    Green,
    /// Blue channel only.
    Blue,
}

impl ComparatorKind {
    /// Every selectable comparator, in listing order.
    pub const ALL: [Self; 7] = [
        Self::Lightness,
        Self::Darkness,
        Self::Hue,
        Self::Saturation,
        Self::Red,
        Self::Green,
        Self::Blue,
    ];

    /// The registry name for this comparator.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Lightness => "lightness",
            Self::Darkness => "darkness",
            Self::Hue => "hue",
            Self::Saturation => "saturation",
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
        }
    }

    /// The scalar metric this comparator orders by.
    fn metric(self, p: Pixel) -> f32 {
        match self {
            Self::Lightness => lightness(p),
            Self::Darkness => -lightness(p),
            Self::Hue => hue(p),
            Self::Saturation => saturation(p),
            Self::Red => f32::from(p.r),
            Self::Green => f32::from(p.g),
            Self::Blue => f32::from(p.b),
        }
    }
}

impl fmt::Display for ComparatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ComparatorKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                PipelineError::InvalidConfig(format!(
                    "unknown comparator \"{s}\" [lightness, darkness, hue, saturation, red, green, blue]",
                ))
            })
    }
}

/// A named comparator with threshold gating, as configured for one run.
///
/// Pairs where either pixel's luminance falls outside the configured
/// band are reported `Equal` (not orderable). That single rule keeps
/// out-of-band pixels in place for sorting *and* blocks Shuffle swaps
/// involving them, without the segmenter needing to know about
/// thresholds at all.
#[derive(Debug, Clone, Copy)]
pub struct Comparator {
    kind: ComparatorKind,
    thresholds: Thresholds,
}

impl Comparator {
    /// Create a comparator from a kind and threshold band.
    #[must_use]
    pub const fn new(kind: ComparatorKind, thresholds: Thresholds) -> Self {
        Self { kind, thresholds }
    }

    /// Build the comparator a config selects.
    #[must_use]
    pub const fn from_config(config: &SortConfig) -> Self {
        Self::new(config.comparator, config.thresholds)
    }
}

impl PixelComparator for Comparator {
    fn compare(&self, a: Pixel, b: Pixel) -> Ordering {
        if !self.thresholds.contains(a.luminance()) || !self.thresholds.contains(b.luminance()) {
            return Ordering::Equal;
        }
        self.kind
            .metric(a)
            .partial_cmp(&self.kind.metric(b))
            .unwrap_or(Ordering::Equal)
    }
}

/// HSL lightness in `[0.0, 1.0]`: midpoint of the extreme channels.
fn lightness(p: Pixel) -> f32 {
    let (max, min) = channel_extremes(p);
    (max + min) / 2.0
}

/// HSL saturation in `[0.0, 1.0]`.
fn saturation(p: Pixel) -> f32 {
    let (max, min) = channel_extremes(p);
    let delta = max - min;
    if delta == 0.0 {
        return 0.0;
    }
    let l = (max + min) / 2.0;
    delta / (1.0 - (2.0 * l - 1.0).abs())
}

/// HSL hue angle in degrees, `[0.0, 360.0)`. Gray pixels get 0.
fn hue(p: Pixel) -> f32 {
    let r = f32::from(p.r) / 255.0;
    let g = f32::from(p.g) / 255.0;
    let b = f32::from(p.b) / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    if delta == 0.0 {
        return 0.0;
    }
    let h = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    h * 60.0
}

fn channel_extremes(p: Pixel) -> (f32, f32) {
    let r = f32::from(p.r) / 255.0;
    let g = f32::from(p.g) / 255.0;
    let b = f32::from(p.b) / 255.0;
    (r.max(g).max(b), r.min(g).min(b))
}
