//! Shape descriptors of traced regions
//!
//! Reduces each contour to area, perimeter, circularity and aspect ratio,
//! dropping regions smaller than a minimum area.

use fieldseg_core::raster::{LabelMap, Mask};
use fieldseg_core::{Algorithm, Error, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::trace;

use super::contour::{find_contours, find_region_contours, BoundingBox, Contour};

/// Parameters for geometry extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryParams {
    /// Regions whose enclosed area is below this many pixels are dropped
    pub min_area: f64,
}

impl Default for GeometryParams {
    fn default() -> Self {
        Self { min_area: 100.0 }
    }
}

/// Geometric summary of one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionGeometry {
    pub label: i32,
    /// Enclosed pixel count
    pub area: f64,
    /// Closed border length in pixels
    pub perimeter: f64,
    /// `4π·area / perimeter²`, 0 for a zero perimeter
    pub circularity: f64,
    /// Bounding box width over height, 0 for a zero height
    pub aspect_ratio: f64,
    pub bbox: BoundingBox,
}

impl RegionGeometry {
    pub fn from_contour(contour: &Contour) -> Self {
        let area = contour.enclosed_area() as f64;
        let perimeter = contour.perimeter();
        let bbox = contour.bounding_box();

        let circularity = if perimeter > 0.0 {
            4.0 * PI * area / (perimeter * perimeter)
        } else {
            trace!(label = contour.label(), "zero perimeter, circularity set to 0");
            0.0
        };

        let aspect_ratio = if bbox.height() > 0 {
            bbox.width() as f64 / bbox.height() as f64
        } else {
            trace!(label = contour.label(), "zero height, aspect ratio set to 0");
            0.0
        };

        Self {
            label: contour.label(),
            area,
            perimeter,
            circularity,
            aspect_ratio,
            bbox,
        }
    }

    /// `[area, perimeter, circularity, aspect_ratio]`, the input a
    /// downstream classifier consumes
    pub fn feature_vector(&self) -> [f64; 4] {
        [self.area, self.perimeter, self.circularity, self.aspect_ratio]
    }
}

/// Lazy iterator of geometries for contours meeting the minimum area
#[derive(Debug, Clone)]
pub struct Geometries<'a> {
    contours: std::slice::Iter<'a, Contour>,
    min_area: f64,
}

impl Iterator for Geometries<'_> {
    type Item = RegionGeometry;

    fn next(&mut self) -> Option<Self::Item> {
        let min_area = self.min_area;
        self.contours
            .by_ref()
            .find(|c| c.enclosed_area() as f64 >= min_area)
            .map(RegionGeometry::from_contour)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.contours.size_hint().1)
    }
}

/// Geometries of `contours` in order, skipping those below `params.min_area`
pub fn region_geometries<'a>(contours: &'a [Contour], params: &GeometryParams) -> Geometries<'a> {
    Geometries {
        contours: contours.iter(),
        min_area: params.min_area,
    }
}

/// Input accepted by [`GeometryExtractor`]
#[derive(Debug, Clone)]
pub enum GeometrySource {
    /// Foreground components of a binary mask
    Mask(Mask),
    /// Connected pieces of each region of a label map
    Labels(LabelMap),
}

/// Contour and geometry extraction stage
#[derive(Debug, Clone, Default)]
pub struct GeometryExtractor;

impl Algorithm for GeometryExtractor {
    type Input = GeometrySource;
    type Output = Vec<RegionGeometry>;
    type Params = GeometryParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Geometry Extractor"
    }

    fn description(&self) -> &'static str {
        "Contour tracing and area, perimeter, circularity and aspect descriptors"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let contours = match &input {
            GeometrySource::Mask(mask) => find_contours(mask)?,
            GeometrySource::Labels(labels) => find_region_contours(labels)?,
        };
        Ok(region_geometries(&contours, &params).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_block_mask(rows: usize, cols: usize, blocks: &[(usize, usize, usize, usize)]) -> Mask {
        let mut m = Mask::new(rows, cols);
        for &(r0, r1, c0, c1) in blocks {
            for r in r0..r1 {
                for c in c0..c1 {
                    m.set(r, c, 1).unwrap();
                }
            }
        }
        m
    }

    #[test]
    fn test_small_blob_is_dropped() {
        let mask = make_block_mask(20, 20, &[(5, 10, 5, 10)]);
        let contours = find_contours(&mask).unwrap();
        assert_eq!(region_geometries(&contours, &GeometryParams::default()).count(), 0);
    }

    #[test]
    fn test_exact_minimum_area_is_kept() {
        let mask = make_block_mask(20, 20, &[(5, 15, 5, 15)]);
        let contours = find_contours(&mask).unwrap();
        let geoms: Vec<_> = region_geometries(&contours, &GeometryParams::default()).collect();
        assert_eq!(geoms.len(), 1);
        assert_relative_eq!(geoms[0].area, 100.0);
        assert_relative_eq!(geoms[0].perimeter, 36.0, epsilon = 1e-12);
        assert_relative_eq!(geoms[0].aspect_ratio, 1.0);
        assert_relative_eq!(
            geoms[0].circularity,
            4.0 * PI * 100.0 / (36.0 * 36.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_single_pixel_has_zero_circularity() {
        let mask = make_block_mask(3, 3, &[(1, 2, 1, 2)]);
        let contours = find_contours(&mask).unwrap();
        let params = GeometryParams { min_area: 0.0 };
        let geom = region_geometries(&contours, &params).next().unwrap();
        assert_eq!(geom.perimeter, 0.0);
        assert_eq!(geom.circularity, 0.0);
        assert_eq!(geom.aspect_ratio, 1.0);
    }

    #[test]
    fn test_aspect_ratio_is_width_over_height() {
        let mask = make_block_mask(30, 40, &[(2, 12, 2, 32)]);
        let contours = find_contours(&mask).unwrap();
        let geom = region_geometries(&contours, &GeometryParams::default()).next().unwrap();
        assert_relative_eq!(geom.aspect_ratio, 3.0);
        assert_eq!(geom.feature_vector()[0], 300.0);
    }

    #[test]
    fn test_iterator_is_restartable() {
        let mask = make_block_mask(40, 40, &[(1, 12, 1, 12), (20, 22, 20, 22), (25, 38, 25, 38)]);
        let contours = find_contours(&mask).unwrap();
        let geoms = region_geometries(&contours, &GeometryParams::default());
        let again = geoms.clone();
        let first: Vec<_> = geoms.collect();
        assert_eq!(first.len(), 2);
        assert_eq!(first, again.collect::<Vec<_>>());
    }

    #[test]
    fn test_extractor_on_label_map() {
        let mut labels = LabelMap::filled(20, 30, 1);
        for r in 2..14 {
            for c in 2..13 {
                labels.set(r, c, 2).unwrap();
            }
            labels.set(r, 13, -1).unwrap();
            for c in 14..28 {
                labels.set(r, c, 3).unwrap();
            }
        }
        let geoms = GeometryExtractor
            .execute_default(GeometrySource::Labels(labels))
            .unwrap();
        assert_eq!(geoms.iter().map(|g| g.label).collect::<Vec<_>>(), vec![2, 3]);
    }
}
