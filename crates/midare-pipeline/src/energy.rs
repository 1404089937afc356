//! Edge-energy field, cumulative cost grid, and minimum-cost path.
//!
//! The seam-carving traversal needs a vertical path of least visual
//! resistance through the image. This module supplies it in three
//! steps: convolve a grayscale copy with two fixed 3x3 edge kernels
//! into an [`EnergyField`], accumulate a [`cost_grid`] by dynamic
//! programming, and backtrack one column-per-row [`find_path`] from a
//! seed column.
//!
//! The arithmetic has deliberate quirks that downstream code depends
//! on: kernel sums are truncated back into 8-bit cells (wrapping),
//! row 0 and column 0 keep their raw grayscale values, and the path
//! clamps to the value `width` (not `width - 1`) at the right edge.

use image::GrayImage;

/// Kernel responding to horizontal edges (vertical gradient).
const HORIZONTAL_KERNEL: [[i32; 3]; 3] = [[1, 1, 1], [0, 0, 0], [-1, -1, -1]];

/// Kernel responding to vertical edges (horizontal gradient).
const VERTICAL_KERNEL: [[i32; 3]; 3] = [[-1, 0, 1], [-1, 0, 1], [-1, 0, 1]];

/// Scalar edge-energy grid, one 8-bit cell per pixel of the grayscale
/// source.
///
/// Interior cells hold the wrapped sum of the two kernel responses;
/// row 0 and column 0 are left as the raw grayscale values.
#[derive(Debug, Clone)]
pub struct EnergyField {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl EnergyField {
    /// Convolve a grayscale image into an energy field.
    ///
    /// Both kernels read the unmodified source; their responses are
    /// summed per cell afterwards. Reads that fall off the end of the
    /// flattened buffer clamp to the last flattened index rather than
    /// skipping the pixel.
    #[must_use]
    pub fn from_grayscale(gray: &GrayImage) -> Self {
        let width = gray.width() as usize;
        let height = gray.height() as usize;
        let source = gray.as_raw();
        let total = width * height;

        let mut horiz = source.clone();
        let mut vert = source.clone();
        for y in 1..height {
            for x in 1..width {
                let idx = y * width + x;
                horiz[idx] = kernel_response(source, &HORIZONTAL_KERNEL, x, y, width, total);
                vert[idx] = kernel_response(source, &VERTICAL_KERNEL, x, y, width, total);
            }
        }

        let mut cells = source.clone();
        for y in 1..height {
            for x in 1..width {
                let idx = y * width + x;
                cells[idx] = horiz[idx].wrapping_add(vert[idx]);
            }
        }

        Self {
            width,
            height,
            cells,
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// The energy value at `(x, y)`.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.cells[y * self.width + x]
    }
}

/// Apply one 3x3 kernel centered on `(x, y)`, truncating the sum to
/// eight bits. Callers guarantee `x >= 1` and `y >= 1`; reads past the
/// end of the buffer clamp to the last flattened index.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn kernel_response(
    source: &[u8],
    kernel: &[[i32; 3]; 3],
    x: usize,
    y: usize,
    width: usize,
    total: usize,
) -> u8 {
    let mut sum = 0i32;
    for (ky, row) in kernel.iter().enumerate() {
        for (kx, &weight) in row.iter().enumerate() {
            let pos = ((y + ky - 1) * width + (x + kx - 1)).min(total - 1);
            sum += weight * i32::from(source[pos]);
        }
    }
    sum as u8
}

/// Accumulate the cumulative-cost grid for a field, row-major.
///
/// Row 0 copies the energy row verbatim. Each interior cell adds its
/// own energy to the least of the three cells above it, ties broken
/// left, then center, then right. Boundary columns are left at zero; a
/// zero boundary is never the minimum of a valid interior triple.
#[must_use]
pub fn cost_grid(energy: &EnergyField) -> Vec<f32> {
    let (width, height) = (energy.width, energy.height);
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let mut costs = vec![0.0f32; width * height];
    for x in 0..width {
        costs[x] = f32::from(energy.cells[x]);
    }

    for y in 1..height {
        for x in 1..width - 1 {
            let current = f32::from(energy.cells[y * width + x]);
            let above = (y - 1) * width;
            let left = costs[above + x - 1] + current;
            let center = costs[above + x] + current;
            let right = costs[above + x + 1] + current;

            costs[y * width + x] = if left < center && left < right {
                left
            } else if center < left && center < right {
                center
            } else {
                right
            };
        }
    }
    costs
}

/// Backtrack one minimum-cost vertical path through a cost grid.
///
/// Starting at `seed_column` on the bottom row, each step up moves the
/// cursor at most one column toward the cheapest of the three cells
/// above: left when strictly least, else right when strictly least,
/// else straight up. Near the left edge the entry pins to column 0;
/// near the right edge it pins to the value `width`. Row 0 is never
/// visited and stays 0.
#[must_use]
pub fn find_path(costs: &[f32], width: usize, height: usize, seed_column: usize) -> Vec<usize> {
    let mut path = vec![0usize; height];
    let mut column = seed_column;

    for i in (1..height).rev() {
        if column <= 1 {
            path[i] = 0;
        } else if column + 1 >= width {
            path[i] = width;
        } else {
            let above = (i - 1) * width;
            let up_left = costs[above + column - 1];
            let up_center = costs[above + column];
            let up_right = costs[above + column + 1];

            if up_left < up_center && up_left < up_right {
                column -= 1;
            } else if up_right < up_center && up_right < up_left {
                column += 1;
            }
            path[i] = column;
        }
    }
    path
}
