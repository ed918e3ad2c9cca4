//! Raster data structures and operations

mod element;
mod geotransform;
mod grid;
pub mod labels;
mod neighborhood;

pub use element::RasterElement;
pub use geotransform::GeoTransform;
pub use grid::{Raster, RasterStatistics};
pub use labels::{LabelMap, Mask};
pub use neighborhood::{offset_within, Neighborhood, D4_OFFSETS, D8_OFFSETS};
