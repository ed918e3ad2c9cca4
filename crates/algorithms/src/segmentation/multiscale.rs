//! Multi-scale morphological refinement
//!
//! Closes an image or mask with elliptical structuring elements of growing
//! size. Each scale is computed from the original input, never from the
//! previous scale's output.

use fieldseg_core::raster::{Mask, Raster, RasterElement};
use fieldseg_core::{Algorithm, Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::morphology::{closing, StructuringElement};

/// Parameters for multi-scale refinement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinerParams {
    /// Ellipse radii; scale `s` uses a `(2s+1) x (2s+1)` element
    pub scales: Vec<usize>,
}

impl Default for RefinerParams {
    fn default() -> Self {
        Self {
            scales: vec![1, 2, 3],
        }
    }
}

/// One refined image and the scale that produced it
#[derive(Debug, Clone)]
pub struct RefinedScale<T: RasterElement> {
    pub scale: usize,
    pub raster: Raster<T>,
}

/// Lazy iterator over refined images, one per scale in input order.
///
/// A clone is an independent iterator positioned at the same scale, so a
/// clone taken before iteration replays every scale.
#[derive(Debug, Clone)]
pub struct MultiScale<'a, T: RasterElement> {
    raster: &'a Raster<T>,
    scales: std::slice::Iter<'a, usize>,
}

impl<T: RasterElement> Iterator for MultiScale<'_, T> {
    type Item = Result<RefinedScale<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        let &scale = self.scales.next()?;
        debug!(scale, "closing with ellipse");
        Some(
            closing(self.raster, &StructuringElement::Ellipse(scale))
                .map(|raster| RefinedScale { scale, raster }),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.scales.size_hint()
    }
}

impl<T: RasterElement> ExactSizeIterator for MultiScale<'_, T> {}

/// Refine `raster` at each of `scales`.
///
/// Every scale is validated up front, so a zero anywhere fails before any
/// work is done.
///
/// # Errors
/// [`Error::InvalidParameter`] when a scale is 0.
pub fn refine_multiscale<'a, T: RasterElement>(
    raster: &'a Raster<T>,
    scales: &'a [usize],
) -> Result<MultiScale<'a, T>> {
    if let Some(pos) = scales.iter().position(|&s| s == 0) {
        return Err(Error::InvalidParameter {
            name: "scales",
            value: format!("{:?}", scales),
            reason: format!("scale at position {} must be at least 1", pos),
        });
    }
    Ok(MultiScale {
        raster,
        scales: scales.iter(),
    })
}

/// Multi-scale refiner stage, collecting every scale
#[derive(Debug, Clone, Default)]
pub struct MultiScaleRefiner;

impl Algorithm for MultiScaleRefiner {
    type Input = Mask;
    type Output = Vec<Mask>;
    type Params = RefinerParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Multi-Scale Refiner"
    }

    fn description(&self) -> &'static str {
        "Elliptical closing at a sweep of scales"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        refine_multiscale(&input, &params.scales)?
            .map(|refined| refined.map(|r| r.raster))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_mask_with_notch() -> Mask {
        let mut m = Mask::new(15, 15);
        for r in 3..12 {
            for c in 3..12 {
                m.set(r, c, 1).unwrap();
            }
        }
        // One-pixel hole and a two-pixel slit
        m.set(7, 7, 0).unwrap();
        m.set(5, 9, 0).unwrap();
        m.set(5, 10, 0).unwrap();
        m
    }

    #[test]
    fn test_one_output_per_scale_in_order() {
        let mask = make_mask_with_notch();
        let scales = [3, 1, 2];
        let outputs: Vec<RefinedScale<u8>> = refine_multiscale(&mask, &scales)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(outputs.len(), 3);
        assert_eq!(outputs.iter().map(|o| o.scale).collect::<Vec<_>>(), vec![3, 1, 2]);
    }

    #[test]
    fn test_closing_fills_hole() {
        let mask = make_mask_with_notch();
        let scales = [1];
        let refined = refine_multiscale(&mask, &scales).unwrap().next().unwrap().unwrap();
        assert!(refined.raster.is_foreground(7, 7));
        assert!(refined.raster.is_foreground(5, 9));
        assert!(!mask.is_foreground(7, 7));
    }

    #[test]
    fn test_scales_are_independent_and_restartable() {
        let mask = make_mask_with_notch();
        let scales = [2, 2];
        let iter = refine_multiscale(&mask, &scales).unwrap();
        assert_eq!(iter.len(), 2);

        let replay = iter.clone();
        let first: Vec<Mask> = iter.map(|r| r.unwrap().raster).collect();
        let second: Vec<Mask> = replay.map(|r| r.unwrap().raster).collect();
        assert_eq!(first[0], first[1]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_scale_rejected() {
        let mask = make_mask_with_notch();
        let scales = [1, 0, 2];
        assert!(matches!(
            refine_multiscale(&mask, &scales),
            Err(Error::InvalidParameter { name: "scales", .. })
        ));
    }

    #[test]
    fn test_empty_scales_yield_nothing() {
        let mask = make_mask_with_notch();
        assert_eq!(refine_multiscale(&mask, &[]).unwrap().count(), 0);
    }

    #[test]
    fn test_algorithm_trait_uses_default_scales() {
        let out = MultiScaleRefiner.execute_default(make_mask_with_notch()).unwrap();
        assert_eq!(out.len(), 3);
    }
}
