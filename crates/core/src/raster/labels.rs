//! Binary masks and label maps
//!
//! A [`Mask`] is a `u8` raster where any non-zero cell is foreground.
//! Producers in this workspace always write 0 or 1.
//!
//! A [`LabelMap`] is an `i32` raster shared by the marker builder and the
//! region separator. Label values:
//!
//! | value  | meaning                                 |
//! |--------|-----------------------------------------|
//! | `-1`   | boundary between two regions            |
//! | `0`    | unknown (markers only, before growth)   |
//! | `1`    | background                              |
//! | `2..`  | one distinct region / seed each         |

use super::Raster;

/// Binary foreground mask
pub type Mask = Raster<u8>;

/// Marker map (before region growing) or label map (after)
pub type LabelMap = Raster<i32>;

/// Boundary sentinel written where two region fronts meet
pub const BOUNDARY: i32 = -1;
/// Unlabeled marker cell, to be claimed by region growing
pub const UNKNOWN: i32 = 0;
/// Background label; never propagates
pub const BACKGROUND: i32 = 1;
/// Smallest label assigned to a seed
pub const FIRST_REGION: i32 = 2;

/// Whether `label` denotes a region (not background, unknown or boundary)
#[inline]
pub fn is_region(label: i32) -> bool {
    label >= FIRST_REGION
}

impl Raster<u8> {
    /// Whether the cell at (row, col) is foreground. Out-of-bounds is background.
    #[inline]
    pub fn is_foreground(&self, row: usize, col: usize) -> bool {
        self.data().get((row, col)).is_some_and(|&v| v != 0)
    }

    /// Number of foreground cells
    pub fn foreground_count(&self) -> usize {
        self.data().iter().filter(|&&v| v != 0).count()
    }
}

impl Raster<i32> {
    /// Distinct region labels present, ascending
    pub fn region_labels(&self) -> Vec<i32> {
        let mut labels: Vec<i32> = self.data().iter().copied().filter(|&l| is_region(l)).collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }

    /// Mask of every cell that belongs to some region
    pub fn region_mask(&self) -> Mask {
        self.map(|l| u8::from(is_region(l)))
    }

    /// Mask of boundary cells
    pub fn boundary_mask(&self) -> Mask {
        self.map(|l| u8::from(l == BOUNDARY))
    }
}
