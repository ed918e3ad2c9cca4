//! Foreground extraction and marker-controlled region separation
//!
//! Stages, in pipeline order:
//! - **threshold**: grayscale reduction, Otsu or fixed binarization
//! - **markers**: opening, sure background, distance-transform seeds
//! - **separator**: priority-flood watershed over a Sobel cost surface
//! - **multiscale**: elliptical closing at a sweep of scales

mod components;
mod distance;
mod markers;
mod multiscale;
mod separator;
mod threshold;

pub use components::{connected_components, region_components, Components, Connectivity};
pub use distance::distance_transform;
pub use markers::{build_markers, MarkerBuilder, MarkerParams, MarkerSet};
pub use multiscale::{refine_multiscale, MultiScale, MultiScaleRefiner, RefinedScale, RefinerParams};
pub use separator::{
    overlay_boundaries, separate_regions, sobel_gradient, CostSurface, RegionSeparator,
    SeparatorParams,
};
pub use threshold::{binarize, grayscale, otsu_threshold, threshold_mask, ThresholdMethod};
