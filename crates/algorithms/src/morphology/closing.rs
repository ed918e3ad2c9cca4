//! Morphological closing (dilation followed by erosion)
//!
//! Fills small gaps and holes in foreground regions and smooths their
//! outline without growing regions overall.

use fieldseg_core::raster::{Mask, Raster, RasterElement};
use fieldseg_core::{Algorithm, Error, Result};
use serde::{Deserialize, Serialize};

use super::dilate::dilate_n;
use super::element::StructuringElement;
use super::erode::erode_n;

/// Parameters for morphological closing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosingParams {
    /// Structuring element shape
    pub element: StructuringElement,
    /// Dilation passes, followed by the same number of erosion passes
    pub iterations: usize,
}

impl Default for ClosingParams {
    fn default() -> Self {
        Self {
            element: StructuringElement::default(),
            iterations: 1,
        }
    }
}

/// Closing algorithm
#[derive(Debug, Clone, Default)]
pub struct Closing;

impl Algorithm for Closing {
    type Input = Mask;
    type Output = Mask;
    type Params = ClosingParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Closing"
    }

    fn description(&self) -> &'static str {
        "Morphological closing (dilation then erosion) to fill small gaps"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        closing_n(&input, &params.element, params.iterations)
    }
}

/// Perform morphological closing on a raster (one dilation, one erosion)
pub fn closing<T: RasterElement>(
    raster: &Raster<T>,
    element: &StructuringElement,
) -> Result<Raster<T>> {
    closing_n(raster, element, 1)
}

/// Dilate `iterations` times, then erode `iterations` times
pub fn closing_n<T: RasterElement>(
    raster: &Raster<T>,
    element: &StructuringElement,
    iterations: usize,
) -> Result<Raster<T>> {
    let dilated = dilate_n(raster, element, iterations)?;
    erode_n(&dilated, element, iterations)
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

    #[test]
    fn test_closing_fills_dark_pit() {
        let mut raster = make_raster(11, 11, 50.0);
        raster.set(5, 5, 1.0).unwrap();

        let result = closing(&raster, &StructuringElement::Square(1)).unwrap();
        assert_eq!(result.get(5, 5).unwrap(), 50.0);
    }

    #[test]
    fn test_closing_fills_hole_in_mask() {
        let mut mask = Mask::filled(9, 9, 1);
        mask.set(4, 4, 0).unwrap();

        let result = closing(&mask, &StructuringElement::Ellipse(1)).unwrap();
        assert_eq!(result.foreground_count(), 81);
    }

    #[test]
    fn test_closing_bridges_one_pixel_gap() {
        let mut mask = Mask::new(7, 9);
        for r in 2..5 {
            for c in 1..4 {
                mask.set(r, c, 1).unwrap();
            }
            for c in 5..8 {
                mask.set(r, c, 1).unwrap();
            }
        }

        let result = closing(&mask, &StructuringElement::Square(1)).unwrap();
        assert!(result.is_foreground(3, 4));
        assert!(!result.is_foreground(0, 4));
    }

    #[test]
    fn test_closing_keeps_isolated_pixel_at_edge() {
        let mut mask = Mask::new(5, 5);
        mask.set(0, 0, 1).unwrap();

        let result = closing(&mask, &StructuringElement::Square(1)).unwrap();
        assert_eq!(result, mask);
    }
}
