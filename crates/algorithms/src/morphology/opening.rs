//! Morphological opening (erosion followed by dilation)
//!
//! Removes specks and thin protrusions smaller than the structuring element
//! while preserving the overall shape of larger foreground regions.

use fieldseg_core::raster::{Mask, Raster, RasterElement};
use fieldseg_core::{Algorithm, Error, Result};
use serde::{Deserialize, Serialize};

use super::dilate::dilate_n;
use super::element::StructuringElement;
use super::erode::erode_n;

/// Parameters for morphological opening
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpeningParams {
    /// Structuring element shape
    pub element: StructuringElement,
    /// Erosion passes, followed by the same number of dilation passes
    pub iterations: usize,
}

impl Default for OpeningParams {
    fn default() -> Self {
        Self {
            element: StructuringElement::default(),
            iterations: 1,
        }
    }
}

/// Opening algorithm
#[derive(Debug, Clone, Default)]
pub struct Opening;

impl Algorithm for Opening {
    type Input = Mask;
    type Output = Mask;
    type Params = OpeningParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Opening"
    }

    fn description(&self) -> &'static str {
        "Morphological opening (erosion then dilation) to remove small foreground specks"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        opening_n(&input, &params.element, params.iterations)
    }
}

/// Perform morphological opening on a raster (one erosion, one dilation)
pub fn opening<T: RasterElement>(
    raster: &Raster<T>,
    element: &StructuringElement,
) -> Result<Raster<T>> {
    opening_n(raster, element, 1)
}

/// Erode `iterations` times, then dilate `iterations` times
pub fn opening_n<T: RasterElement>(
    raster: &Raster<T>,
    element: &StructuringElement,
    iterations: usize,
) -> Result<Raster<T>> {
    let eroded = erode_n(raster, element, iterations)?;
    dilate_n(&eroded, element, iterations)
}
