//! Neighborhood definitions for raster analysis

/// 4-connected neighbor offsets (N, W, E, S)
pub const D4_OFFSETS: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

/// 8-connected neighbor offsets in raster order
pub const D8_OFFSETS: [(isize, isize); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

/// Defines a neighborhood pattern around a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighborhood {
    /// 3x3 neighborhood (8 neighbors + center)
    Queen3x3,
    /// 3x3 without corners (4 neighbors + center)
    Rook3x3,
    /// Square neighborhood of given radius
    Square(usize),
    /// Circular neighborhood of given radius (in cells)
    Circle(usize),
}

impl Neighborhood {
    /// Get the radius of the neighborhood
    pub fn radius(&self) -> usize {
        match self {
            Neighborhood::Queen3x3 | Neighborhood::Rook3x3 => 1,
            Neighborhood::Square(r) | Neighborhood::Circle(r) => *r,
        }
    }

    /// Get the size of the neighborhood (width and height)
    pub fn size(&self) -> usize {
        self.radius() * 2 + 1
    }

    /// Check if a relative position is within this neighborhood
    pub fn contains(&self, dr: isize, dc: isize) -> bool {
        match self {
            Neighborhood::Queen3x3 => dr.abs() <= 1 && dc.abs() <= 1,
            Neighborhood::Rook3x3 => dr.abs() + dc.abs() <= 1,
            Neighborhood::Square(r) => {
                let r = *r as isize;
                dr.abs() <= r && dc.abs() <= r
            }
            Neighborhood::Circle(r) => {
                let r = *r as f64;
                ((dr * dr + dc * dc) as f64).sqrt() <= r
            }
        }
    }

    /// Relative positions in this neighborhood, row-major
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        let r = self.radius() as isize;
        let mut offsets = Vec::new();

        for dr in -r..=r {
            for dc in -r..=r {
                if self.contains(dr, dc) {
                    offsets.push((dr, dc));
                }
            }
        }

        offsets
    }
}

/// Offset `(row, col)` by `(dr, dc)`, returning `None` outside a `rows x cols` grid
#[inline]
pub fn offset_within(
    row: usize,
    col: usize,
    (dr, dc): (isize, isize),
    rows: usize,
    cols: usize,
) -> Option<(usize, usize)> {
    let nr = row as isize + dr;
    let nc = col as isize + dc;
    if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
        None
    } else {
        Some((nr as usize, nc as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighborhood_offsets() {
        assert_eq!(Neighborhood::Queen3x3.offsets().len(), 9);
        assert_eq!(Neighborhood::Rook3x3.offsets().len(), 5);
        assert_eq!(Neighborhood::Square(2).offsets().len(), 25);
        // Circle(2): 5x5 minus the 4 corners and the 8 cells at distance sqrt(5)
        assert_eq!(Neighborhood::Circle(2).offsets().len(), 13);
    }

    #[test]
    fn test_offset_within_clips_edges() {
        assert_eq!(offset_within(0, 0, (-1, 0), 3, 3), None);
        assert_eq!(offset_within(2, 2, (0, 1), 3, 3), None);
        assert_eq!(offset_within(1, 1, (1, -1), 3, 3), Some((2, 0)));
    }
}
