//! # FieldSeg Core
//!
//! Core types, traits and I/O for the FieldSeg segmentation library.
//!
//! This crate provides:
//! - `Raster<T>`: Generic raster grid type
//! - `Mask` and `LabelMap`: binary and labeled rasters used by the pipeline
//! - `GeoTransform`: Affine transformation for georeferencing
//! - Algorithm trait for a consistent stage API
//! - GeoTIFF I/O

pub mod error;
pub mod io;
pub mod raster;

pub use error::{Error, Result};
pub use raster::{GeoTransform, LabelMap, Mask, Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{labels, GeoTransform, LabelMap, Mask, Raster, RasterElement};
    pub use crate::Algorithm;
}

/// Core trait for all pipeline stages in FieldSeg.
///
/// Stages are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the stage
    type Input;
    /// Output type for the stage
    type Output;
    /// Parameters controlling stage behavior
    type Params: Default;
    /// Error type for stage execution
    type Error: std::error::Error;

    /// Returns the stage name
    fn name(&self) -> &'static str;

    /// Returns a description of what the stage does
    fn description(&self) -> &'static str;

    /// Execute the stage
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
