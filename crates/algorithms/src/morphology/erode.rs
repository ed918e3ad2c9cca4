//! Morphological erosion (minimum filter)
//!
//! Replaces each pixel with the minimum value in its structuring element
//! neighborhood. Shrinks foreground regions of a mask and bright regions
//! of an intensity raster.

use fieldseg_core::raster::{Mask, Raster, RasterElement};
use fieldseg_core::{Algorithm, Error, Result};
use serde::{Deserialize, Serialize};

use super::element::StructuringElement;
use super::kernel::{extremum_filter, Extremum};

/// Parameters for morphological erosion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErodeParams {
    /// Structuring element shape
    pub element: StructuringElement,
    /// Number of successive passes
    pub iterations: usize,
}

impl Default for ErodeParams {
    fn default() -> Self {
        Self {
            element: StructuringElement::default(),
            iterations: 1,
        }
    }
}

/// Erosion algorithm
#[derive(Debug, Clone, Default)]
pub struct Erode;

impl Algorithm for Erode {
    type Input = Mask;
    type Output = Mask;
    type Params = ErodeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Erode"
    }

    fn description(&self) -> &'static str {
        "Morphological erosion (minimum filter over structuring element)"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        erode_n(&input, &params.element, params.iterations)
    }
}

/// Perform one pass of morphological erosion on a raster
///
/// Each output pixel is the minimum value within the structuring element
/// neighborhood. Neighbors outside the raster are ignored, so a foreground
/// region touching the image edge is not eaten from that side.
///
/// # Arguments
/// * `raster` - Input raster (mask or intensity)
/// * `element` - Structuring element defining the neighborhood shape
pub fn erode<T: RasterElement>(
    raster: &Raster<T>,
    element: &StructuringElement,
) -> Result<Raster<T>> {
    erode_n(raster, element, 1)
}

/// Erode `iterations` times in a row. Zero iterations returns a copy.
pub fn erode_n<T: RasterElement>(
    raster: &Raster<T>,
    element: &StructuringElement,
    iterations: usize,
) -> Result<Raster<T>> {
    element.validate()?;
    let offsets = element.offsets();

    let mut current = raster.clone();
    for _ in 0..iterations {
        current = extremum_filter(&current, &offsets, Extremum::Min)?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldseg_core::GeoTransform;

    fn make_raster(rows: usize, cols: usize, value: f64) -> Raster<f64> {
        let mut r = Raster::filled(rows, cols, value);
        r.set_transform(GeoTransform::new(0.0, rows as f64, 1.0, -1.0));
        r
    }

    fn make_mask(rows: usize, cols: usize, cells: &[(usize, usize)]) -> Mask {
        let mut m = Mask::new(rows, cols);
        for &(r, c) in cells {
            m.set(r, c, 1).unwrap();
        }
        m
    }

    #[test]
    fn test_erode_uniform_keeps_borders() {
        let raster = make_raster(7, 7, 5.0);
        let result = erode(&raster, &StructuringElement::Square(1)).unwrap();
        for row in 0..7 {
            for col in 0..7 {
                assert_eq!(result.get(row, col).unwrap(), 5.0);
            }
        }
        assert_eq!(result.transform(), raster.transform());
    }

    #[test]
    fn test_erode_picks_minimum() {
        let mut raster = make_raster(7, 7, 10.0);
        raster.set(3, 4, 2.0).unwrap();

        let result = erode(&raster, &StructuringElement::Square(1)).unwrap();
        assert_eq!(result.get(3, 3).unwrap(), 2.0);
        assert_eq!(result.get(3, 1).unwrap(), 10.0);
    }

    #[test]
    fn test_erode_cross_element() {
        let mut raster = make_raster(7, 7, 10.0);
        raster.set(2, 2, 1.0).unwrap();

        let result = erode(&raster, &StructuringElement::Cross(1)).unwrap();
        // Cross doesn't include diagonals, so (3,3) should not see (2,2)
        assert_eq!(result.get(3, 3).unwrap(), 10.0);
    }

    #[test]
    fn test_erode_skips_nodata_neighbors() {
        let mut raster = make_raster(5, 5, 5.0);
        raster.set_nodata(Some(-9999.0));
        raster.set(2, 2, -9999.0).unwrap();

        let result = erode(&raster, &StructuringElement::Square(1)).unwrap();
        assert_eq!(result.get(2, 2).unwrap(), -9999.0);
        assert_eq!(result.get(2, 1).unwrap(), 5.0);
    }

    #[test]
    fn test_erode_mask_shrinks_block() {
        let cells: Vec<(usize, usize)> = (1..6).flat_map(|r| (1..6).map(move |c| (r, c))).collect();
        let mask = make_mask(7, 7, &cells);

        let once = erode(&mask, &StructuringElement::Square(1)).unwrap();
        assert_eq!(once.foreground_count(), 9);

        let twice = erode_n(&mask, &StructuringElement::Square(1), 2).unwrap();
        assert_eq!(twice.foreground_count(), 1);
        assert!(twice.is_foreground(3, 3));
    }

    #[test]
    fn test_erode_zero_iterations_is_identity() {
        let mask = make_mask(3, 3, &[(1, 1)]);
        let result = erode_n(&mask, &StructuringElement::Square(1), 0).unwrap();
        assert_eq!(result, mask);
    }

    #[test]
    fn test_erode_rejects_zero_radius() {
        let mask = make_mask(3, 3, &[(1, 1)]);
        assert!(erode(&mask, &StructuringElement::Square(0)).is_err());
    }

    #[test]
    fn test_erode_algorithm_trait() {
        let mask = make_mask(3, 3, &[(0, 0), (0, 1), (1, 0), (1, 1)]);
        let out = Erode.execute_default(mask).unwrap();
        assert_eq!(out.foreground_count(), 1);
        assert!(out.is_foreground(0, 0));
    }
}
