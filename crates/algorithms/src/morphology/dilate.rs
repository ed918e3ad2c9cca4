//! Morphological dilation (maximum filter)
//!
//! Replaces each pixel with the maximum value in its structuring element
//! neighborhood. Grows foreground regions of a mask and bright regions of
//! an intensity raster.

use fieldseg_core::raster::{Mask, Raster, RasterElement};
use fieldseg_core::{Algorithm, Error, Result};
use serde::{Deserialize, Serialize};

use super::element::StructuringElement;
use super::kernel::{extremum_filter, Extremum};

/// Parameters for morphological dilation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DilateParams {
    /// Structuring element shape
    pub element: StructuringElement,
    /// Number of successive passes
    pub iterations: usize,
}

impl Default for DilateParams {
    fn default() -> Self {
        Self {
            element: StructuringElement::default(),
            iterations: 1,
        }
    }
}

/// Dilation algorithm
#[derive(Debug, Clone, Default)]
pub struct Dilate;

impl Algorithm for Dilate {
    type Input = Mask;
    type Output = Mask;
    type Params = DilateParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Dilate"
    }

    fn description(&self) -> &'static str {
        "Morphological dilation (maximum filter over structuring element)"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        dilate_n(&input, &params.element, params.iterations)
    }
}

/// Perform one pass of morphological dilation on a raster
///
/// Each output pixel is the maximum value within the structuring element
/// neighborhood. Neighbors outside the raster are ignored.
///
/// # Arguments
/// * `raster` - Input raster (mask or intensity)
/// * `element` - Structuring element defining the neighborhood shape
pub fn dilate<T: RasterElement>(
    raster: &Raster<T>,
    element: &StructuringElement,
) -> Result<Raster<T>> {
    dilate_n(raster, element, 1)
}

/// Dilate `iterations` times in a row. Zero iterations returns a copy.
pub fn dilate_n<T: RasterElement>(
    raster: &Raster<T>,
    element: &StructuringElement,
    iterations: usize,
) -> Result<Raster<T>> {
    element.validate()?;
    let offsets = element.offsets();

    let mut current = raster.clone();
    for _ in 0..iterations {
        current = extremum_filter(&current, &offsets, Extremum::Max)?;
    }
    Ok(current)
}
