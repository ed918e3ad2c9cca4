//! End-to-end field segmentation
//!
//! bands → intensity → foreground mask → markers → labeled regions →
//! multi-scale refinement → contours → region geometries.
//!
//! Contours and geometries are traced from the label map, not from the
//! refined masks. Closing the region mask fills the one-pixel boundary
//! lines, so a refined mask no longer tells touching fields apart; the
//! refined scales are returned alongside for rendering and export.

use fieldseg_core::raster::{LabelMap, Mask, Raster};
use fieldseg_core::{Algorithm, Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::{find_region_contours, region_geometries, Contour, GeometryParams, RegionGeometry};
use crate::segmentation::{
    build_markers, grayscale, refine_multiscale, separate_regions, threshold_mask, MarkerParams,
    MarkerSet, RefinedScale, RefinerParams, SeparatorParams, ThresholdMethod,
};

/// Parameters of every pipeline stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    pub threshold: ThresholdMethod,
    pub markers: MarkerParams,
    pub separator: SeparatorParams,
    pub refiner: RefinerParams,
    pub geometry: GeometryParams,
}

/// Everything one pipeline run produces
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Single-band intensity the mask and cost surface derive from
    pub intensity: Raster<f64>,
    /// Threshold used to binarize `intensity`
    pub threshold: f64,
    /// Foreground mask before marker construction
    pub mask: Mask,
    pub markers: MarkerSet,
    /// Region labels with boundaries
    pub labels: LabelMap,
    /// `labels` closed at each refinement scale (region mask, 0/1)
    pub refined: Vec<RefinedScale<u8>>,
    /// Outer border of every region piece, in scan order
    pub contours: Vec<Contour>,
    /// Geometries of the contours meeting the minimum area
    pub geometries: Vec<RegionGeometry>,
}

impl Segmentation {
    /// Number of distinct region labels in the label map
    pub fn region_count(&self) -> usize {
        self.labels.region_labels().len()
    }
}

/// Run the full pipeline on one image given as one or more bands
pub fn segment_fields(bands: &[Raster<f64>], params: &PipelineParams) -> Result<Segmentation> {
    let intensity = grayscale(bands)?;
    let (mask, threshold) = threshold_mask(&intensity, params.threshold);
    debug!(threshold, foreground = mask.foreground_count(), "foreground mask");

    let markers = build_markers(&mask, &params.markers)?;
    let labels = separate_regions(&intensity, &markers.markers, &params.separator)?;

    let region_mask = labels.region_mask();
    let refined = refine_multiscale(&region_mask, &params.refiner.scales)?
        .collect::<Result<Vec<_>>>()?;

    let contours = find_region_contours(&labels)?;
    let geometries: Vec<RegionGeometry> = region_geometries(&contours, &params.geometry).collect();
    debug!(
        seeds = markers.seed_count,
        contours = contours.len(),
        geometries = geometries.len(),
        "segmentation finished"
    );

    Ok(Segmentation {
        intensity,
        threshold,
        mask,
        markers,
        labels,
        refined,
        contours,
        geometries,
    })
}

/// Full pipeline stage over a set of bands
#[derive(Debug, Clone, Default)]
pub struct FieldSegmentation;

impl Algorithm for FieldSegmentation {
    type Input = Vec<Raster<f64>>;
    type Output = Segmentation;
    type Params = PipelineParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Field Segmentation"
    }

    fn description(&self) -> &'static str {
        "Threshold, watershed separation, multi-scale refinement and region geometry"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        segment_fields(&input, &params)
    }
}
