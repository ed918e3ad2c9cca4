//! I/O for reading and writing rasters as GeoTIFF
//!
//! Multi-sample images (RGB, RGBA, ...) are exposed band by band; reducing
//! them to one intensity band is a pipeline concern, not an I/O one.

mod native;

pub use native::{
    read_geotiff, read_geotiff_bands, read_geotiff_bands_from_buffer, write_geotiff,
    write_geotiff_to_buffer, GeoTiffOptions,
};
