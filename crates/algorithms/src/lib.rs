//! # FieldSeg Algorithms
//!
//! Field segmentation stages for FieldSeg.
//!
//! ## Available Stages
//!
//! - **morphology**: Erosion, dilation, opening, closing over masks and images
//! - **segmentation**: Thresholding, distance-transform markers, watershed
//!   region separation, multi-scale refinement
//! - **geometry**: Contour tracing and region shape descriptors
//! - **validation**: IoU and classification scores against a reference
//! - **pipeline**: All of the above wired end to end

pub(crate) mod maybe_rayon;

pub mod geometry;
pub mod morphology;
pub mod pipeline;
pub mod segmentation;
pub mod validation;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::geometry::{
        find_contours, find_region_contours, region_geometries, Contour, GeometryExtractor,
        GeometryParams, GeometrySource, RegionGeometry,
    };
    pub use crate::morphology::{
        closing, closing_n, dilate, dilate_n, erode, erode_n, opening, opening_n,
        StructuringElement,
    };
    pub use crate::pipeline::{segment_fields, FieldSegmentation, PipelineParams, Segmentation};
    pub use crate::segmentation::{
        build_markers, grayscale, otsu_threshold, overlay_boundaries, refine_multiscale,
        separate_regions, threshold_mask, MarkerBuilder, MarkerParams, MarkerSet,
        MultiScaleRefiner, RefinerParams, RegionSeparator, SeparatorParams, ThresholdMethod,
    };
    pub use crate::validation::{iou, ConfusionCounts, ValidationReport, Validator};
    pub use fieldseg_core::prelude::*;
}
