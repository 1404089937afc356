//! Seam-carving traversal: sort along a minimum-energy vertical path.
//!
//! Borrows the first half of the classic seam-carving algorithm (edge
//! energy, cumulative cost, path backtracking) and repurposes the path
//! as a sorting direction instead of a removal target. The single
//! carved path is swept across the image by a per-seam column offset,
//! so the whole image is covered by `width + 1` copies of the same
//! crooked line.
//!
//! Seams near the right edge run past the pixel buffer; the clipped
//! entries stay zero pixels on extraction (which the segmenter treats
//! as masked) and are skipped on write-back. This is documented
//! tolerance, not an error.

use image::{GrayImage, Rgba, RgbaImage, imageops};

use crate::energy::{self, EnergyField};
use crate::pattern::{SeamSet, TraversalData, mask_value};
use crate::types::{Pixel, Seam};

/// Extract `width + 1` seams of length `height` along the carved path.
///
/// Seam `b` reads, for row `i`, the pixel at flattened index
/// `i * width + path[i] + b`; indices past the buffer are left as zero
/// pixels.
pub(crate) fn extract(image: &RgbaImage, mask: Option<&GrayImage>) -> SeamSet {
    let width = image.width() as usize;
    let height = image.height() as usize;

    let gray = imageops::grayscale(image);
    let field = EnergyField::from_grayscale(&gray);
    let costs = energy::cost_grid(&field);
    let path = energy::find_path(&costs, width, height, width / 2);

    let pixel_count = width * height;
    let mut seams = Vec::with_capacity(width + 1);
    for b in 0..=width {
        let mut seam: Seam = vec![Pixel::default(); height];
        for (slot, (i, &column)) in seam.iter_mut().zip(path.iter().enumerate()) {
            let index = i * width + column + b;
            if index >= pixel_count {
                // Clipped by the right edge; the zero pixel reads as
                // masked downstream.
                continue;
            }
            let (x, y) = flat_to_xy(index, width);
            *slot = Pixel::from_rgba(image.get_pixel(x, y).0, mask_value(mask, x, y));
        }
        seams.push(seam);
    }

    SeamSet {
        seams,
        data: TraversalData::CarvePath(path),
    }
}

/// Write the seams back through the same indexing, stopping each seam
/// at the first index past the pixel buffer.
pub(crate) fn write_back(image: &mut RgbaImage, seam_set: &SeamSet) {
    let TraversalData::CarvePath(path) = &seam_set.data else {
        return;
    };
    let width = image.width() as usize;
    let pixel_count = width * image.height() as usize;

    for (b, seam) in seam_set.seams.iter().enumerate() {
        for ((i, &column), pixel) in path.iter().enumerate().zip(seam) {
            let index = i * width + column + b;
            if index >= pixel_count {
                break;
            }
            let (x, y) = flat_to_xy(index, width);
            image.put_pixel(x, y, Rgba(pixel.rgba()));
        }
    }
}

/// Split a flattened pixel index back into coordinates. The carve
/// indexing is deliberately flat: an offset past the row end spills
/// into the next row rather than clamping.
#[allow(clippy::cast_possible_truncation)]
const fn flat_to_xy(index: usize, width: usize) -> (u32, u32) {
    ((index % width) as u32, (index / width) as u32)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::pattern::{PatternKind, SeamPattern};
    use image::Luma;

    /// Image with distinct red values so positions are traceable.
    fn varied_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            let value = (y * width + x + 1) as u8;
            Rgba([value, 50, 90, 255])
        })
    }

    #[test]
    fn extraction_produces_width_plus_one_seams_of_height_length() {
        let img = varied_image(6, 4);
        let set = PatternKind::SeamCarve.extract(&img, None);
        assert_eq!(set.seams.len(), 7);
        for seam in &set.seams {
            assert_eq!(seam.len(), 4);
        }
    }

    #[test]
    fn extraction_carries_the_path_as_side_data() {
        let img = varied_image(5, 3);
        let set = PatternKind::SeamCarve.extract(&img, None);
        let TraversalData::CarvePath(path) = &set.data else {
            panic!("expected a carve path");
        };
        assert_eq!(path.len(), 3);
        assert_eq!(path[0], 0, "row zero of the path is never visited");
    }

    #[test]
    fn clipped_seam_entries_are_zero_pixels() {
        // The image has no zero pixels, so any zero entry in the last
        // seam must come from right-edge clipping.
        let img = varied_image(4, 4);
        let set = PatternKind::SeamCarve.extract(&img, None);
        let last = set.seams.last().unwrap();
        let clipped = last.iter().filter(|p| **p == Pixel::default()).count();
        assert!(clipped > 0, "offset width must clip at least one entry");
        for pixel in last.iter().filter(|p| **p == Pixel::default()) {
            assert!(pixel.is_masked(), "clipped entries must read as masked");
        }
    }

    #[test]
    fn round_trip_is_identity() {
        for (width, height) in [(4, 4), (6, 3), (3, 7), (1, 5)] {
            let img = varied_image(width, height);
            let set = PatternKind::SeamCarve.extract(&img, None);
            let mut out = img.clone();
            PatternKind::SeamCarve.write_back(&mut out, &set);
            assert_eq!(out, img, "round trip for {width}x{height}");
        }
    }

    #[test]
    fn extraction_carries_mask_values() {
        let img = varied_image(4, 3);
        let mut mask = GrayImage::new(4, 3);
        for y in 0..3 {
            for x in 0..4 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let set = PatternKind::SeamCarve.extract(&img, Some(&mask));
        // Every in-range entry sampled the fully masked grid.
        for seam in &set.seams {
            for pixel in seam {
                assert!(pixel == &Pixel::default() || pixel.mask == 255);
            }
        }
    }

    #[test]
    fn write_back_without_a_path_is_a_no_op() {
        let img = varied_image(4, 3);
        let set = SeamSet {
            seams: vec![vec![Pixel::new(9, 9, 9, 255, 0); 3]],
            data: TraversalData::None,
        };
        let mut out = img.clone();
        write_back(&mut out, &set);
        assert_eq!(out, img);
    }
}
