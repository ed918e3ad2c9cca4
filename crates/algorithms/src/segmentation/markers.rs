//! Seed markers for marker-controlled region growing
//!
//! From a binary foreground mask this stage derives:
//! - **opened**: the mask with specks removed
//! - **sure background complement**: the opened mask dilated; anything
//!   outside it is certainly background
//! - **sure foreground**: cores whose distance to the background exceeds a
//!   fraction of the largest such distance
//! - **unknown**: the band in between, to be claimed by region growing
//!
//! Sure-foreground cores are labeled as seeds `2..`, the certain background
//! as `1` and the unknown band as `0`.

use fieldseg_core::raster::labels::{BACKGROUND, FIRST_REGION, UNKNOWN};
use fieldseg_core::raster::{LabelMap, Mask, Raster};
use fieldseg_core::{Algorithm, Error, Result};
use ndarray::Zip;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::components::{connected_components, Connectivity};
use super::distance::distance_transform;
use crate::morphology::{dilate_n, opening_n, StructuringElement};

/// Parameters for marker construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerParams {
    /// Element used for opening and dilation
    pub element: StructuringElement,
    /// Erosion (then dilation) passes of the denoising opening
    pub open_iterations: usize,
    /// Dilation passes producing the sure-background complement
    pub dilate_iterations: usize,
    /// Fraction of the maximum distance a pixel must exceed to be a seed
    pub foreground_ratio: f64,
    /// Adjacency used to group sure-foreground pixels into seeds
    pub connectivity: Connectivity,
}

impl Default for MarkerParams {
    fn default() -> Self {
        Self {
            element: StructuringElement::Square(1),
            open_iterations: 2,
            dilate_iterations: 3,
            foreground_ratio: 0.7,
            connectivity: Connectivity::Eight,
        }
    }
}

impl MarkerParams {
    pub fn validate(&self) -> Result<()> {
        self.element.validate()?;
        if !(0.0..=1.0).contains(&self.foreground_ratio) {
            return Err(Error::InvalidParameter {
                name: "foreground_ratio",
                value: self.foreground_ratio.to_string(),
                reason: "must lie in [0, 1]".to_string(),
            });
        }
        Ok(())
    }
}

/// Every intermediate of marker construction, all shaped like the input
#[derive(Debug, Clone)]
pub struct MarkerSet {
    /// Input mask after opening
    pub opened: Mask,
    /// Opened mask dilated; pixels outside it are certain background
    pub sure_background: Mask,
    /// Seed cores
    pub sure_foreground: Mask,
    /// `sure_background AND NOT sure_foreground`
    pub unknown: Mask,
    /// Euclidean distance of each opened-foreground pixel to the background
    pub distance: Raster<f64>,
    /// 0 unknown, 1 background, 2.. seeds
    pub markers: LabelMap,
    /// Number of distinct seeds
    pub seed_count: usize,
}

/// Marker builder stage
#[derive(Debug, Clone, Default)]
pub struct MarkerBuilder;

impl Algorithm for MarkerBuilder {
    type Input = Mask;
    type Output = MarkerSet;
    type Params = MarkerParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Marker Builder"
    }

    fn description(&self) -> &'static str {
        "Distance-transform seeds, sure background and unknown band from a foreground mask"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        build_markers(&input, &params)
    }
}

/// Build seed markers from a foreground mask.
///
/// An empty mask (or one emptied by the opening) yields empty masks, zero
/// seeds and a marker map that is background everywhere.
pub fn build_markers(mask: &Mask, params: &MarkerParams) -> Result<MarkerSet> {
    params.validate()?;

    let binary = mask.map(|v| u8::from(v != 0));
    let opened = opening_n(&binary, &params.element, params.open_iterations)?;
    let sure_background = dilate_n(&opened, &params.element, params.dilate_iterations)?;
    let distance = distance_transform(&opened)?;

    let max_distance = distance.data().iter().copied().fold(0.0f64, f64::max);
    let sure_foreground = if max_distance.is_infinite() {
        // No background anywhere: the whole opened mask is one core
        opened.clone()
    } else {
        let cutoff = params.foreground_ratio * max_distance;
        distance.map(|d| u8::from(d > cutoff))
    };

    let unknown = Zip::from(sure_background.data())
        .and(sure_foreground.data())
        .map_collect(|&bg, &fg| u8::from(bg != 0 && fg == 0));
    let unknown = mask.with_data(unknown)?;

    let seeds = connected_components(&sure_foreground, params.connectivity)?;
    let markers = Zip::from(seeds.labels.data())
        .and(unknown.data())
        .map_collect(|&seed, &unk| {
            if unk != 0 {
                UNKNOWN
            } else if seed > 0 {
                seed + FIRST_REGION - 1
            } else {
                BACKGROUND
            }
        });
    let markers = mask.with_data(markers)?;

    debug!(
        seeds = seeds.count,
        max_distance,
        opened = opened.foreground_count(),
        unknown = unknown.foreground_count(),
        "markers built"
    );

    Ok(MarkerSet {
        opened,
        sure_background,
        sure_foreground,
        unknown,
        distance,
        markers,
        seed_count: seeds.count,
    })
}
