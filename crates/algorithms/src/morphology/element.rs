//! Structuring element definitions for morphological operations
//!
//! A structuring element defines the neighborhood shape used in
//! erosion, dilation, and derived transforms.

use fieldseg_core::raster::Neighborhood;
use fieldseg_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Shape of a structuring element for morphological operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuringElement {
    /// Square element of given radius (side = 2*radius + 1)
    Square(usize),
    /// Cross (plus-shaped) element of given radius
    Cross(usize),
    /// Disk element of given radius (Euclidean distance <= radius)
    Disk(usize),
    /// Ellipse inscribed in a (2*radius + 1) square, rasterized row by row
    /// with half-width `round(sqrt(r^2 - dy^2))`
    Ellipse(usize),
    /// User-provided boolean mask (must be odd-sized and square)
    Custom(Vec<Vec<bool>>),
}

impl Default for StructuringElement {
    fn default() -> Self {
        StructuringElement::Square(1)
    }
}

impl StructuringElement {
    /// Validate the structuring element, returning an error for invalid configurations
    pub fn validate(&self) -> Result<()> {
        match self {
            StructuringElement::Square(r)
            | StructuringElement::Cross(r)
            | StructuringElement::Disk(r)
            | StructuringElement::Ellipse(r) => {
                if *r == 0 {
                    return Err(Error::InvalidParameter {
                        name: "radius",
                        value: "0".to_string(),
                        reason: "structuring element radius must be at least 1".to_string(),
                    });
                }
                Ok(())
            }
            StructuringElement::Custom(mask) => {
                if mask.is_empty() {
                    return Err(Error::InvalidParameter {
                        name: "custom_mask",
                        value: "empty".to_string(),
                        reason: "custom mask must not be empty".to_string(),
                    });
                }
                let size = mask.len();
                if size % 2 == 0 {
                    return Err(Error::InvalidParameter {
                        name: "custom_mask",
                        value: format!("{}x{}", size, size),
                        reason: "custom mask size must be odd".to_string(),
                    });
                }
                if let Some(row) = mask.iter().find(|row| row.len() != size) {
                    return Err(Error::InvalidParameter {
                        name: "custom_mask",
                        value: format!("row length {}", row.len()),
                        reason: format!("custom mask must be square (expected {})", size),
                    });
                }
                Ok(())
            }
        }
    }

    /// Get the radius of the structuring element
    pub fn radius(&self) -> usize {
        match self {
            StructuringElement::Square(r)
            | StructuringElement::Cross(r)
            | StructuringElement::Disk(r)
            | StructuringElement::Ellipse(r) => *r,
            StructuringElement::Custom(mask) => mask.len() / 2,
        }
    }

    /// Compute (dr, dc) offsets relative to center for all active cells
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        match self {
            StructuringElement::Square(r) => Neighborhood::Square(*r).offsets(),
            StructuringElement::Disk(r) => Neighborhood::Circle(*r).offsets(),
            StructuringElement::Cross(r) => {
                let r = *r as isize;
                let mut offsets = Vec::new();
                for d in -r..=r {
                    offsets.push((d, 0));
                    if d != 0 {
                        offsets.push((0, d));
                    }
                }
                offsets
            }
            StructuringElement::Ellipse(r) => {
                let r = *r as isize;
                let r2 = (r * r) as f64;
                let mut offsets = Vec::new();
                for dy in -r..=r {
                    let half = (r2 - (dy * dy) as f64).sqrt().round() as isize;
                    for dx in -half..=half {
                        offsets.push((dy, dx));
                    }
                }
                offsets
            }
            StructuringElement::Custom(mask) => {
                let center = mask.len() as isize / 2;
                let mut offsets = Vec::new();
                for (r, row) in mask.iter().enumerate() {
                    for (c, &active) in row.iter().enumerate() {
                        if active {
                            offsets.push((r as isize - center, c as isize - center));
                        }
                    }
                }
                offsets
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_offsets() {
        let offsets = StructuringElement::Square(1).offsets();
        assert_eq!(offsets.len(), 9);
        assert!(offsets.contains(&(0, 0)));
        assert!(offsets.contains(&(-1, -1)));
        assert!(offsets.contains(&(1, 1)));
    }

    #[test]
    fn test_cross_offsets() {
        let offsets = StructuringElement::Cross(1).offsets();
        assert_eq!(offsets.len(), 5);
        assert!(offsets.contains(&(0, 0)));
        assert!(offsets.contains(&(0, -1)));
        assert!(!offsets.contains(&(-1, -1)));
        assert!(!offsets.contains(&(1, 1)));
    }

    #[test]
    fn test_ellipse_radius_one_is_a_cross() {
        let mut ellipse = StructuringElement::Ellipse(1).offsets();
        let mut cross = StructuringElement::Cross(1).offsets();
        ellipse.sort_unstable();
        cross.sort_unstable();
        assert_eq!(ellipse, cross);
    }

    #[test]
    fn test_ellipse_row_widths() {
        // Radius 2: rows of width 1, 5, 5, 5, 1
        let offsets = StructuringElement::Ellipse(2).offsets();
        assert_eq!(offsets.len(), 17);
        assert!(offsets.contains(&(-2, 0)));
        assert!(!offsets.contains(&(-2, 1)));
        assert!(offsets.contains(&(-1, -2)));

        // Radius 3: rows of width 1, 5, 7, 7, 7, 5, 1
        assert_eq!(StructuringElement::Ellipse(3).offsets().len(), 33);
    }

    #[test]
    fn test_custom_offsets() {
        let mask = vec![
            vec![true, false, false],
            vec![true, false, false],
            vec![true, true, true],
        ];
        let offsets = StructuringElement::Custom(mask).offsets();
        assert_eq!(offsets.len(), 5);
        assert!(offsets.contains(&(-1, -1)));
        assert!(offsets.contains(&(1, 1)));
    }

    #[test]
    fn test_validate_zero_radius() {
        assert!(StructuringElement::Square(0).validate().is_err());
        assert!(StructuringElement::Cross(0).validate().is_err());
        assert!(StructuringElement::Disk(0).validate().is_err());
        assert!(StructuringElement::Ellipse(0).validate().is_err());
    }

    #[test]
    fn test_validate_even_custom() {
        let mask = vec![vec![true, false], vec![false, true]];
        assert!(StructuringElement::Custom(mask).validate().is_err());
    }

    #[test]
    fn test_default() {
        let se = StructuringElement::default();
        assert_eq!(se, StructuringElement::Square(1));
        assert_eq!(se.radius(), 1);
    }
}
