//! Native GeoTIFF reading/writing using the `tiff` crate
//!
//! Georeferencing is limited to the ModelPixelScale + ModelTiepoint pair,
//! which is what field imagery exported from common GIS tools carries.

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;
use tiff::ColorType;

/// Options for writing GeoTIFF files
#[derive(Debug, Clone)]
pub struct GeoTiffOptions {
    /// Write ModelPixelScale / ModelTiepoint / GeoKeyDirectory tags
    pub georeference: bool,
}

impl Default for GeoTiffOptions {
    fn default() -> Self {
        Self { georeference: true }
    }
}

/// Read one band of a GeoTIFF file into a Raster
///
/// `band` selects a sample of a multi-sample image (default 0).
pub fn read_geotiff<T, P>(path: P, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let bands = read_geotiff_bands(path)?;
    let index = band.unwrap_or(0);
    let count = bands.len();
    let selected = bands.into_iter().nth(index).ok_or(Error::InvalidParameter {
        name: "band",
        value: index.to_string(),
        reason: format!("image has {} band(s)", count),
    })?;

    Ok(selected.map(T::from_f64_saturating))
}

/// Read every sample of a GeoTIFF file as a separate `f64` band
pub fn read_geotiff_bands<P: AsRef<Path>>(path: P) -> Result<Vec<Raster<f64>>> {
    let file = File::open(path.as_ref())?;
    decode_bands(file)
}

/// Read every sample of an in-memory GeoTIFF as a separate `f64` band
pub fn read_geotiff_bands_from_buffer(data: &[u8]) -> Result<Vec<Raster<f64>>> {
    decode_bands(Cursor::new(data))
}

fn samples_per_pixel(color: ColorType) -> Result<usize> {
    match color {
        ColorType::Gray(_) => Ok(1),
        ColorType::GrayA(_) => Ok(2),
        ColorType::RGB(_) => Ok(3),
        ColorType::RGBA(_) | ColorType::CMYK(_) => Ok(4),
        other => Err(Error::UnsupportedDataType(format!(
            "Unsupported TIFF color type: {:?}",
            other
        ))),
    }
}

fn to_f64_samples(result: DecodingResult) -> Result<Vec<f64>> {
    let samples: Vec<f64> = match result {
        DecodingResult::U8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::F32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::F64(buf) => buf,
        _ => {
            return Err(Error::UnsupportedDataType(
                "Unsupported TIFF pixel format".to_string(),
            ))
        }
    };
    Ok(samples)
}

fn decode_bands<R: Read + Seek>(reader: R) -> Result<Vec<Raster<f64>>> {
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;
    let rows = height as usize;
    let cols = width as usize;

    let color = decoder
        .colortype()
        .map_err(|e| Error::Other(format!("Cannot read color type: {}", e)))?;
    let spp = samples_per_pixel(color)?;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;
    let samples = to_f64_samples(result)?;

    if samples.len() != rows * cols * spp {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let transform = read_geotransform(&mut decoder).ok();

    (0..spp)
        .map(|band| {
            let data: Vec<f64> = samples.iter().skip(band).step_by(spp).copied().collect();
            let mut raster = Raster::from_vec(data, rows, cols)?;
            if let Some(gt) = transform {
                raster.set_transform(gt);
            }
            Ok(raster)
        })
        .collect()
}

/// Attempt to read GeoTransform from TIFF tags
fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<GeoTransform> {
    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|_| Error::Other("No pixel scale tag".into()))?;

    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|_| Error::Other("No tiepoint tag".into()))?;

    if scale.len() >= 2 && tiepoint.len() >= 6 {
        // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
        let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
        return Ok(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]));
    }

    Err(Error::Other("Cannot determine geotransform".into()))
}

/// Write a Raster to a single-band 32-bit float GeoTIFF file
///
/// Label maps round-trip exactly as long as labels stay below 2^24.
pub fn write_geotiff<T, P>(raster: &Raster<T>, path: P, options: Option<GeoTiffOptions>) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    encode_geotiff(raster, file, &options.unwrap_or_default())
}

/// Write a Raster to an in-memory GeoTIFF buffer
pub fn write_geotiff_to_buffer<T>(raster: &Raster<T>, options: Option<GeoTiffOptions>) -> Result<Vec<u8>>
where
    T: RasterElement,
{
    let mut buf = Vec::new();
    encode_geotiff(raster, Cursor::new(&mut buf), &options.unwrap_or_default())?;
    Ok(buf)
}

fn encode_geotiff<T, W>(raster: &Raster<T>, writer: W, options: &GeoTiffOptions) -> Result<()>
where
    T: RasterElement,
    W: Write + Seek,
{
    let mut encoder =
        TiffEncoder::new(writer).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = raster.shape();
    let data: Vec<f32> = raster.data().iter().map(|&v| v.as_f64() as f32).collect();

    let mut image = encoder
        .new_image::<Gray32Float>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;

    if options.georeference {
        let gt = raster.transform();

        let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
        image
            .encoder()
            .write_tag(Tag::ModelPixelScaleTag, &scale[..])
            .map_err(|e| Error::Other(format!("Cannot write scale tag: {}", e)))?;

        let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
        image
            .encoder()
            .write_tag(Tag::ModelTiepointTag, &tiepoint[..])
            .map_err(|e| Error::Other(format!("Cannot write tiepoint tag: {}", e)))?;

        // Version 1.1.0 with two keys: model type projected, raster pixel-is-area
        let geokeys: [u16; 12] = [1, 1, 0, 2, 1024, 0, 1, 1, 1025, 0, 1, 1];
        image
            .encoder()
            .write_tag(Tag::GeoKeyDirectoryTag, &geokeys[..])
            .map_err(|e| Error::Other(format!("Cannot write geokey tag: {}", e)))?;
    }

    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}
