//! Reordering algorithms applied to the pixels of one stretch.
//!
//! This module defines the [`AlgorithmKind`] enum for selecting a
//! reordering algorithm by name and the dispatch that applies it to a
//! mutable pixel slice. Every algorithm except Smear is a permutation:
//! it moves pixels around but never invents or drops one.
//!
//! The slice handed to [`AlgorithmKind::apply`] is one unmasked stretch
//! of a seam. Random and Wave carve that slice into their own chunks
//! before sorting; Shuffle and Smear act on the whole slice at once.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::compare::PixelComparator;
use crate::types::{Pixel, PipelineError, SortConfig, Stretch};

/// Selects which reordering algorithm runs over each stretch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmKind {
    /// Sort the whole stretch with the configured comparator.
    #[default]
    None,
    /// Sort randomly selected chunks, skipping the rest.
    Random,
    /// Comparator-gated Fisher-Yates shuffle of the whole stretch.
    Shuffle,
    /// Replace every pixel with a copy of the stretch's first pixel.
    Smear,
    /// Sort consecutive chunks of roughly `section_length` pixels.
    Wave,
}

impl AlgorithmKind {
    /// Every selectable algorithm, in listing order.
    pub const ALL: [Self; 5] = [
        Self::None,
        Self::Random,
        Self::Shuffle,
        Self::Smear,
        Self::Wave,
    ];

    /// The registry name for this algorithm.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Random => "random",
            Self::Shuffle => "shuffle",
            Self::Smear => "smear",
            Self::Wave => "wave",
        }
    }

    /// Reorder `stretch` in place.
    ///
    /// `comparator` supplies the pairwise order; `rng` supplies every
    /// random decision. Each decision point draws fresh randomness, so
    /// injecting a seeded generator reproduces a run exactly.
    ///
    /// Empty slices are a no-op for every algorithm.
    pub fn apply<C, R>(
        self,
        stretch: &mut [Pixel],
        options: &ReorderOptions,
        comparator: &C,
        rng: &mut R,
    ) where
        C: PixelComparator,
        R: Rng + ?Sized,
    {
        match self {
            Self::None => {
                let all = [Stretch::new(0, stretch.len())];
                sort_stretches(&all, stretch, comparator, options.reverse);
            }
            Self::Random => random(stretch, options, comparator, rng),
            Self::Shuffle => shuffle(stretch, comparator, rng),
            Self::Smear => smear(stretch),
            Self::Wave => wave(stretch, options, comparator, rng),
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                PipelineError::InvalidConfig(format!(
                    "unknown interval algorithm \"{s}\" [none, random, shuffle, smear, wave]",
                ))
            })
    }
}

/// The slice of a [`SortConfig`] the reordering algorithms consume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReorderOptions {
    /// Base chunk length for Wave.
    pub section_length: usize,
    /// Chunk-selection probability for Random, wave-edge jitter for Wave.
    pub randomness: f32,
    /// Flip each sorted chunk end-to-end after sorting.
    pub reverse: bool,
}

impl ReorderOptions {
    /// Extract the reordering options from a full config.
    #[must_use]
    pub const fn from_config(config: &SortConfig) -> Self {
        Self {
            section_length: config.section_length,
            randomness: config.randomness,
            reverse: config.reverse,
        }
    }
}

/// Walk the stretch in randomly sized chunks, sorting each chunk with
/// probability `randomness` and leaving it untouched otherwise.
///
/// The chunk length is drawn uniformly from `[1, remaining]` and the
/// cursor advances by it whether or not the chunk was selected, so one
/// pass covers the stretch exactly once.
fn random<C, R>(stretch: &mut [Pixel], options: &ReorderOptions, comparator: &C, rng: &mut R)
where
    C: PixelComparator,
    R: Rng + ?Sized,
{
    let len = stretch.len();
    let mut chunks = Vec::new();

    let mut j = 0;
    while j < len {
        let chunk_len = rng.random_range(1..=len - j);
        if rng.random::<f32>() < options.randomness {
            chunks.push(Stretch::new(j, (j + chunk_len).min(len)));
        }
        j += chunk_len;
    }

    sort_stretches(&chunks, stretch, comparator, options.reverse);
}

/// Walk the stretch in chunks of `section_length` give or take a jitter
/// of up to `floor(section_length * randomness)`, sorting every chunk.
///
/// A zero-length draw appends an empty chunk and redraws; the jitter
/// never exceeds the base length, so lengths are never negative.
fn wave<C, R>(stretch: &mut [Pixel], options: &ReorderOptions, comparator: &C, rng: &mut R)
where
    C: PixelComparator,
    R: Rng + ?Sized,
{
    let len = stretch.len();
    let base = options.section_length;
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let jitter = (base as f32 * options.randomness).floor() as i64;
    let mut chunks = Vec::new();

    let mut j = 0;
    while j < len {
        let delta = rng.random_range(-jitter..=jitter);
        #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
        let wave_len = (base as i64 + delta) as usize;

        chunks.push(Stretch::new(j, (j + wave_len).min(len)));
        j += wave_len;
    }

    sort_stretches(&chunks, stretch, comparator, options.reverse);
}

/// Fisher-Yates over the whole stretch, with each candidate swap
/// executed only when the comparator can order the pair.
///
/// Pairs the comparator reports `Equal` stay put for that attempt, so a
/// comparator that orders nothing leaves the stretch untouched. This is
/// how thresholds and mock comparators gate the shuffle.
fn shuffle<C, R>(stretch: &mut [Pixel], comparator: &C, rng: &mut R)
where
    C: PixelComparator,
    R: Rng + ?Sized,
{
    for i in (1..stretch.len()).rev() {
        let j = rng.random_range(0..=i);
        if comparator.compare(stretch[i], stretch[j]) != Ordering::Equal {
            stretch.swap(i, j);
        }
    }
}

/// Replace every pixel with a copy of the first.
///
/// The one algorithm that is deliberately not a permutation.
fn smear(stretch: &mut [Pixel]) {
    let Some(&first) = stretch.first() else {
        return;
    };
    stretch.fill(first);
}

/// Stable-sort each chunk with the comparator, then flip it when
/// reverse is set. The flip is per chunk, not per stretch.
fn sort_stretches<C>(chunks: &[Stretch], stretch: &mut [Pixel], comparator: &C, reverse: bool)
where
    C: PixelComparator,
{
    for chunk in chunks {
        let pixels = &mut stretch[chunk.start..chunk.end];
        pixels.sort_by(|&a, &b| comparator.compare(a, b));
        if reverse {
            pixels.reverse();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Comparator ordering by red channel; injectable mock for the
    /// engine, independent of the real registry.
    const BY_RED: fn(Pixel, Pixel) -> Ordering = |a, b| a.r.cmp(&b.r);

    /// Comparator that orders nothing.
    const UNORDERED: fn(Pixel, Pixel) -> Ordering = |_, _| Ordering::Equal;

    fn red(value: u8) -> Pixel {
        Pixel::new(value, 0, 0, 255, 0)
    }

    fn reds(values: &[u8]) -> Vec<Pixel> {
        values.iter().map(|&v| red(v)).collect()
    }

    fn red_values(pixels: &[Pixel]) -> Vec<u8> {
        pixels.iter().map(|p| p.r).collect()
    }

    fn options(section_length: usize, randomness: f32, reverse: bool) -> ReorderOptions {
        ReorderOptions {
            section_length,
            randomness,
            reverse,
        }
    }

    /// Multiset equality over pixels, ignoring order.
    fn assert_same_pixels(before: &[Pixel], after: &[Pixel]) {
        let mut a: Vec<_> = before.iter().map(|p| (p.r, p.g, p.b, p.a, p.mask)).collect();
        let mut b: Vec<_> = after.iter().map(|p| (p.r, p.g, p.b, p.a, p.mask)).collect();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b, "pixel multiset changed");
    }

    #[test]
    fn every_kind_parses_by_name() {
        for kind in AlgorithmKind::ALL {
            assert_eq!(kind.name().parse::<AlgorithmKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!(matches!(
            "sideways".parse::<AlgorithmKind>(),
            Err(PipelineError::InvalidConfig(_)),
        ));
    }

    #[test]
    fn none_sorts_the_whole_stretch() {
        let mut stretch = reds(&[5, 1, 4, 2, 3]);
        let mut rng = StdRng::seed_from_u64(0);
        AlgorithmKind::None.apply(&mut stretch, &options(69, 1.0, false), &BY_RED, &mut rng);
        assert_eq!(red_values(&stretch), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn none_with_reverse_sorts_descending() {
        let mut stretch = reds(&[5, 1, 4, 2, 3]);
        let mut rng = StdRng::seed_from_u64(0);
        AlgorithmKind::None.apply(&mut stretch, &options(69, 1.0, true), &BY_RED, &mut rng);
        assert_eq!(red_values(&stretch), vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn none_sort_is_stable() {
        // Equal reds with distinct greens keep their relative order.
        let mut stretch = vec![
            Pixel::new(1, 0, 0, 255, 0),
            Pixel::new(0, 1, 0, 255, 0),
            Pixel::new(0, 2, 0, 255, 0),
            Pixel::new(0, 3, 0, 255, 0),
        ];
        let mut rng = StdRng::seed_from_u64(0);
        AlgorithmKind::None.apply(&mut stretch, &options(69, 1.0, false), &BY_RED, &mut rng);
        let greens: Vec<u8> = stretch.iter().map(|p| p.g).collect();
        assert_eq!(greens, vec![1, 2, 3, 0]);
    }

    #[test]
    fn random_preserves_the_pixel_multiset() {
        let before = reds(&[9, 3, 7, 1, 8, 2, 6, 4, 5, 0]);
        let mut stretch = before.clone();
        let mut rng = StdRng::seed_from_u64(7);
        AlgorithmKind::Random.apply(&mut stretch, &options(69, 0.7, false), &BY_RED, &mut rng);
        assert_same_pixels(&before, &stretch);
    }

    #[test]
    fn random_with_zero_randomness_changes_nothing() {
        // Every chunk fails the coin flip, so the cursor walks the
        // stretch without sorting anything.
        let before = reds(&[9, 3, 7, 1, 8, 2, 6, 4, 5, 0]);
        let mut stretch = before.clone();
        let mut rng = StdRng::seed_from_u64(7);
        AlgorithmKind::Random.apply(&mut stretch, &options(69, 0.0, false), &BY_RED, &mut rng);
        assert_eq!(stretch, before);
    }

    #[test]
    fn random_with_full_randomness_sorts_every_chunk() {
        // Every chunk passes the coin flip and is sorted in place, so
        // each value can only move within its own chunk and the
        // multiset is untouched.
        let before = reds(&[9, 3, 7, 1, 8, 2, 6, 4, 5, 0]);
        let mut stretch = before.clone();
        let mut rng = StdRng::seed_from_u64(3);
        AlgorithmKind::Random.apply(&mut stretch, &options(69, 1.0, false), &BY_RED, &mut rng);
        assert_same_pixels(&before, &stretch);
    }

    #[test]
    fn wave_with_zero_randomness_chunks_exactly() {
        // Base length 4 over 10 pixels: chunks [0,4), [4,8), [8,10).
        // Reverse with an unordered comparator flips each chunk verbatim,
        // exposing the boundaries.
        let mut stretch = reds(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        let mut rng = StdRng::seed_from_u64(0);
        AlgorithmKind::Wave.apply(&mut stretch, &options(4, 0.0, true), &UNORDERED, &mut rng);
        assert_eq!(red_values(&stretch), vec![3, 2, 1, 0, 7, 6, 5, 4, 9, 8]);
    }

    #[test]
    fn wave_sorts_each_chunk() {
        let mut stretch = reds(&[9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
        let mut rng = StdRng::seed_from_u64(0);
        AlgorithmKind::Wave.apply(&mut stretch, &options(4, 0.0, false), &BY_RED, &mut rng);
        assert_eq!(red_values(&stretch), vec![6, 7, 8, 9, 2, 3, 4, 5, 0, 1]);
    }

    #[test]
    fn wave_preserves_the_pixel_multiset_with_jitter() {
        let before = reds(&[9, 3, 7, 1, 8, 2, 6, 4, 5, 0, 11, 13, 12, 10]);
        let mut stretch = before.clone();
        let mut rng = StdRng::seed_from_u64(99);
        AlgorithmKind::Wave.apply(&mut stretch, &options(3, 1.0, false), &BY_RED, &mut rng);
        assert_same_pixels(&before, &stretch);
    }

    #[test]
    fn shuffle_with_unordered_comparator_changes_nothing() {
        let before = reds(&[4, 1, 3, 0, 2]);
        let mut stretch = before.clone();
        let mut rng = StdRng::seed_from_u64(42);
        AlgorithmKind::Shuffle.apply(&mut stretch, &options(69, 1.0, false), &UNORDERED, &mut rng);
        assert_eq!(stretch, before, "no swap may execute when nothing is orderable");
    }

    #[test]
    fn shuffle_preserves_the_pixel_multiset() {
        let before = reds(&[4, 1, 3, 0, 2, 9, 8, 7, 6, 5]);
        let mut stretch = before.clone();
        let mut rng = StdRng::seed_from_u64(42);
        AlgorithmKind::Shuffle.apply(&mut stretch, &options(69, 1.0, false), &BY_RED, &mut rng);
        assert_same_pixels(&before, &stretch);
    }

    #[test]
    fn shuffle_is_deterministic_under_a_seed() {
        let mut a = reds(&[4, 1, 3, 0, 2, 9, 8, 7, 6, 5]);
        let mut b = a.clone();
        let mut rng_a = StdRng::seed_from_u64(13);
        let mut rng_b = StdRng::seed_from_u64(13);
        AlgorithmKind::Shuffle.apply(&mut a, &options(69, 1.0, false), &BY_RED, &mut rng_a);
        AlgorithmKind::Shuffle.apply(&mut b, &options(69, 1.0, false), &BY_RED, &mut rng_b);
        assert_eq!(a, b);
    }

    #[test]
    fn smear_copies_the_first_pixel_across() {
        let mut stretch = reds(&[7, 1, 2, 3]);
        let mut rng = StdRng::seed_from_u64(0);
        AlgorithmKind::Smear.apply(&mut stretch, &options(69, 1.0, false), &BY_RED, &mut rng);
        assert_eq!(red_values(&stretch), vec![7, 7, 7, 7]);
    }

    #[test]
    fn every_algorithm_noops_on_an_empty_stretch() {
        for kind in AlgorithmKind::ALL {
            let mut stretch: Vec<Pixel> = Vec::new();
            let mut rng = StdRng::seed_from_u64(0);
            kind.apply(&mut stretch, &options(4, 0.5, true), &BY_RED, &mut rng);
            assert!(stretch.is_empty());
        }
    }

    #[test]
    fn every_permutation_algorithm_preserves_the_multiset() {
        let before = reds(&[5, 3, 9, 1, 4, 8, 0, 7, 2, 6]);
        for kind in [
            AlgorithmKind::None,
            AlgorithmKind::Random,
            AlgorithmKind::Shuffle,
            AlgorithmKind::Wave,
        ] {
            let mut stretch = before.clone();
            let mut rng = StdRng::seed_from_u64(21);
            kind.apply(&mut stretch, &options(3, 0.5, false), &BY_RED, &mut rng);
            assert_same_pixels(&before, &stretch);
        }
    }
}
