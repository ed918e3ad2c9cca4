//! Contour tracing and region geometry
//!
//! - **contour**: Moore-neighbor outer borders of mask components or label
//!   map regions, with enclosed area and map-coordinate polygons
//! - **descriptors**: area, perimeter, circularity and aspect ratio, as a
//!   lazy iterator filtered by minimum area

mod contour;
mod descriptors;

pub use contour::{find_contours, find_region_contours, BoundingBox, Contour};
pub use descriptors::{
    region_geometries, GeometryExtractor, GeometryParams, GeometrySource, Geometries,
    RegionGeometry,
};
