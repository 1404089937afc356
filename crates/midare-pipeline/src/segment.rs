//! Interval segmentation: split one seam into sortable stretches.
//!
//! A seam is scanned left to right and cut at every masked run. The
//! result is an ordered list of [`Stretch`]es covering exactly the
//! unmasked positions; masked runs are never represented and never
//! reach the reordering engine.

use crate::types::{Pixel, Stretch};

/// Partition a seam into its unmasked stretches.
///
/// On hitting a masked pixel the scan looks ahead to the end of the
/// masked run, emits the stretch accumulated since the last break
/// (which is empty when the seam opens with a masked run), and resumes
/// after the run. A trailing unmasked run is emitted as a final
/// stretch.
///
/// The output is ordered by start index and pairwise disjoint; together
/// with the skipped masked runs it covers the full seam with no gaps
/// and no overlaps.
#[must_use]
pub fn unmasked_stretches(seam: &[Pixel]) -> Vec<Stretch> {
    let mut stretches = Vec::new();
    let len = seam.len();
    let mut base = 0;

    let mut j = 0;
    while j < len {
        if seam[j].is_masked() {
            // Look ahead for the first pixel past the masked run.
            let mut end_mask = j;
            loop {
                end_mask += 1;
                if end_mask == len || !seam[end_mask].is_masked() {
                    break;
                }
            }

            stretches.push(Stretch::new(base, j));

            // Jump past the run; the pixel at `base` is known unmasked.
            base = end_mask;
            j = end_mask;
        }
        j += 1;
    }

    if base < len {
        stretches.push(Stretch::new(base, len));
    }
    stretches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit() -> Pixel {
        Pixel::new(100, 100, 100, 255, 0)
    }

    fn masked() -> Pixel {
        Pixel::new(100, 100, 100, 255, crate::types::MASKED)
    }

    fn zero() -> Pixel {
        Pixel::default()
    }

    /// Check the partition property: stretches are ordered, disjoint,
    /// and together with masked runs cover the whole seam.
    fn assert_partition(seam: &[Pixel], stretches: &[Stretch]) {
        let mut covered = vec![false; seam.len()];
        let mut last_end = 0;
        for stretch in stretches {
            assert!(stretch.start >= last_end, "stretches out of order");
            assert!(stretch.end <= seam.len(), "stretch past end of seam");
            for slot in &mut covered[stretch.start..stretch.end] {
                assert!(!*slot, "position covered twice");
                *slot = true;
            }
            last_end = stretch.end;
        }
        for (idx, (pixel, covered)) in seam.iter().zip(&covered).enumerate() {
            assert_eq!(
                !pixel.is_masked(),
                *covered,
                "position {idx} coverage does not match mask state",
            );
        }
    }

    #[test]
    fn unmasked_seam_is_one_stretch() {
        let seam = vec![lit(); 8];
        let stretches = unmasked_stretches(&seam);
        assert_eq!(stretches, vec![Stretch::new(0, 8)]);
        assert_partition(&seam, &stretches);
    }

    #[test]
    fn empty_seam_has_no_stretches() {
        assert!(unmasked_stretches(&[]).is_empty());
    }

    #[test]
    fn masked_run_splits_the_seam() {
        let seam = vec![lit(), lit(), masked(), masked(), lit(), lit(), lit()];
        let stretches = unmasked_stretches(&seam);
        assert_eq!(stretches, vec![Stretch::new(0, 2), Stretch::new(4, 7)]);
        assert_partition(&seam, &stretches);
    }

    #[test]
    fn leading_masked_run_emits_empty_stretch() {
        let seam = vec![masked(), lit(), lit()];
        let stretches = unmasked_stretches(&seam);
        assert_eq!(stretches, vec![Stretch::new(0, 0), Stretch::new(1, 3)]);
        assert_partition(&seam, &stretches);
    }

    #[test]
    fn trailing_masked_run_emits_no_trailing_stretch() {
        let seam = vec![lit(), lit(), masked(), masked()];
        let stretches = unmasked_stretches(&seam);
        assert_eq!(stretches, vec![Stretch::new(0, 2)]);
        assert_partition(&seam, &stretches);
    }

    #[test]
    fn fully_masked_seam_yields_only_an_empty_stretch() {
        let seam = vec![masked(); 5];
        let stretches = unmasked_stretches(&seam);
        assert_eq!(stretches, vec![Stretch::new(0, 0)]);
        assert_partition(&seam, &stretches);
    }

    #[test]
    fn zero_pixels_count_as_masked() {
        let seam = vec![lit(), zero(), zero(), lit()];
        let stretches = unmasked_stretches(&seam);
        assert_eq!(stretches, vec![Stretch::new(0, 1), Stretch::new(3, 4)]);
        assert_partition(&seam, &stretches);
    }

    #[test]
    fn single_masked_pixel_between_runs() {
        let seam = vec![lit(), masked(), lit()];
        let stretches = unmasked_stretches(&seam);
        assert_eq!(stretches, vec![Stretch::new(0, 1), Stretch::new(2, 3)]);
        assert_partition(&seam, &stretches);
    }

    #[test]
    fn alternating_mask_produces_single_pixel_stretches() {
        let seam = vec![masked(), lit(), masked(), lit(), masked()];
        let stretches = unmasked_stretches(&seam);
        assert_eq!(
            stretches,
            vec![Stretch::new(0, 0), Stretch::new(1, 2), Stretch::new(3, 4)],
        );
        assert_partition(&seam, &stretches);
    }
}
