//! Closed outer contours of connected components
//!
//! Each component is traced with Moore-neighbor border following, starting
//! at its first pixel in scan order and walking clockwise until the first
//! step repeats. Components are reported in scan order of that pixel.

use fieldseg_core::raster::{GeoTransform, LabelMap, Mask};
use fieldseg_core::Result;
use geo::{Coord, Euclidean, Length, LineString, Polygon};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::trace;

use crate::segmentation::{connected_components, region_components, Components, Connectivity};

/// Moore neighborhood in clockwise order starting east, as (dr, dc)
const CLOCKWISE: [(isize, isize); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Inclusive pixel bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_row: usize,
    pub min_col: usize,
    pub max_row: usize,
    pub max_col: usize,
}

impl BoundingBox {
    fn at(row: usize, col: usize) -> Self {
        Self {
            min_row: row,
            min_col: col,
            max_row: row,
            max_col: col,
        }
    }

    fn include(&mut self, row: usize, col: usize) {
        self.min_row = self.min_row.min(row);
        self.min_col = self.min_col.min(col);
        self.max_row = self.max_row.max(row);
        self.max_col = self.max_col.max(col);
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.max_col - self.min_col + 1
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.max_row - self.min_row + 1
    }
}

/// Outer border of one connected component
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    label: i32,
    points: Vec<(usize, usize)>,
    pixel_count: usize,
    enclosed_area: usize,
    bbox: BoundingBox,
}

impl Contour {
    /// Region label for label-map input, component number (from 1) for masks
    pub fn label(&self) -> i32 {
        self.label
    }

    /// Border pixels as (row, col) in clockwise tracing order. The chain is
    /// closed: the last point connects back to the first.
    pub fn points(&self) -> &[(usize, usize)] {
        &self.points
    }

    /// Number of pixels in the component
    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    /// Component pixels plus every hole they fully enclose
    pub fn enclosed_area(&self) -> usize {
        self.enclosed_area
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    /// Length of the closed chain through the border pixel centers:
    /// 1 per axial step, √2 per diagonal step. A single pixel has length 0.
    pub fn perimeter(&self) -> f64 {
        self.ring(|row, col| Coord {
            x: col as f64,
            y: row as f64,
        })
        .length::<Euclidean>()
    }

    /// Polygon through the border pixel centers in map coordinates
    pub fn to_polygon(&self, transform: &GeoTransform) -> Polygon<f64> {
        let ring = self.ring(|row, col| {
            let (x, y) = transform.pixel_to_geo(col, row);
            Coord { x, y }
        });
        Polygon::new(ring, vec![])
    }

    fn ring<F: Fn(usize, usize) -> Coord<f64>>(&self, to_coord: F) -> LineString<f64> {
        let mut coords: Vec<Coord<f64>> =
            self.points.iter().map(|&(r, c)| to_coord(r, c)).collect();
        if let Some(&first) = coords.first() {
            coords.push(first);
        }
        LineString::new(coords)
    }
}

/// Contours of the 8-connected foreground components of a mask
pub fn find_contours(mask: &Mask) -> Result<Vec<Contour>> {
    let comps = connected_components(mask, Connectivity::Eight)?;
    Ok(trace_components(&comps, |id, _| id))
}

/// Contours of the 8-connected pieces of every region label (`>= 2`).
///
/// A region split into several pieces yields one contour per piece, all
/// carrying the region's label.
pub fn find_region_contours(labels: &LabelMap) -> Result<Vec<Contour>> {
    let comps = region_components(labels, Connectivity::Eight)?;
    let source = labels.data();
    Ok(trace_components(&comps, |_, first| source[first]))
}

/// Per-component scan statistics
struct ComponentStats {
    first: (usize, usize),
    bbox: BoundingBox,
    pixel_count: usize,
}

fn trace_components<F>(comps: &Components, label_of: F) -> Vec<Contour>
where
    F: Fn(i32, (usize, usize)) -> i32,
{
    let ids = comps.labels.data();
    let mut stats: Vec<Option<ComponentStats>> = (0..comps.count).map(|_| None).collect();

    for ((row, col), &id) in ids.indexed_iter() {
        if id <= 0 {
            continue;
        }
        let index = (id - 1) as usize;
        if let Some(s) = stats[index].as_mut() {
            s.bbox.include(row, col);
            s.pixel_count += 1;
        } else {
            stats[index] = Some(ComponentStats {
                first: (row, col),
                bbox: BoundingBox::at(row, col),
                pixel_count: 1,
            });
        }
    }

    stats
        .into_iter()
        .enumerate()
        .filter_map(|(index, s)| {
            let s = s?;
            let id = index as i32 + 1;
            let points = follow_border(ids, id, s.first);
            let enclosed_area = enclosed_area(ids, id, &s.bbox);
            Some(Contour {
                label: label_of(id, s.first),
                points,
                pixel_count: s.pixel_count,
                enclosed_area,
                bbox: s.bbox,
            })
        })
        .collect()
}

/// Moore-neighbor tracing of the component `id` from its first scan pixel.
///
/// Stops when the walk is back at `start` and about to repeat its first
/// step, which handles one-pixel-wide components that revisit pixels.
fn follow_border(ids: &Array2<i32>, id: i32, start: (usize, usize)) -> Vec<(usize, usize)> {
    let (rows, cols) = ids.dim();
    let member = |r: isize, c: isize| {
        r >= 0
            && c >= 0
            && (r as usize) < rows
            && (c as usize) < cols
            && ids[(r as usize, c as usize)] == id
    };

    // Next border pixel clockwise from the backtrack direction `back`
    let step = |p: (usize, usize), back: usize| -> Option<((usize, usize), usize)> {
        for s in 1..=8 {
            let d = (back + s) % 8;
            let (dr, dc) = CLOCKWISE[d];
            let nr = p.0 as isize + dr;
            let nc = p.1 as isize + dc;
            if member(nr, nc) {
                // Backtrack for the new pixel: the last non-member checked,
                // expressed as a direction from the new pixel
                let (br, bc) = CLOCKWISE[(d + 7) % 8];
                let rel = (br - dr, bc - dc);
                let back = CLOCKWISE.iter().position(|&o| o == rel).unwrap_or(4);
                return Some(((nr as usize, nc as usize), back));
            }
        }
        None
    };

    let mut chain = vec![start];
    // The first scan pixel has no member to its west
    let Some((first, mut back)) = step(start, 4) else {
        return chain;
    };

    let mut current = first;
    let limit = 4 * rows * cols + 8;
    while chain.len() <= limit {
        let Some((next, next_back)) = step(current, back) else {
            break;
        };
        if current == start && next == first {
            return chain;
        }
        chain.push(current);
        current = next;
        back = next_back;
    }

    trace!(id, len = chain.len(), "border walk stopped at the step limit");
    chain
}

/// Pixels of component `id` plus all non-member pixels it fully encloses.
///
/// Flood-fills the non-member pixels reachable from outside the padded
/// bounding box with 4-connectivity; everything else is enclosed.
fn enclosed_area(ids: &Array2<i32>, id: i32, bbox: &BoundingBox) -> usize {
    let h = bbox.height() + 2;
    let w = bbox.width() + 2;
    let member = |r: usize, c: usize| {
        r >= 1
            && c >= 1
            && r <= bbox.height()
            && c <= bbox.width()
            && ids[(bbox.min_row + r - 1, bbox.min_col + c - 1)] == id
    };

    let mut outside = Array2::<bool>::from_elem((h, w), false);
    let mut queue = VecDeque::from([(0usize, 0usize)]);
    outside[(0, 0)] = true;
    let mut outside_count = 1usize;

    while let Some((r, c)) = queue.pop_front() {
        let neighbors = [
            (r.wrapping_sub(1), c),
            (r + 1, c),
            (r, c.wrapping_sub(1)),
            (r, c + 1),
        ];
        for (nr, nc) in neighbors {
            if nr >= h || nc >= w || outside[(nr, nc)] || member(nr, nc) {
                continue;
            }
            outside[(nr, nc)] = true;
            outside_count += 1;
            queue.push_back((nr, nc));
        }
    }

    h * w - outside_count
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_mask(rows: usize, cols: usize, cells: &[(usize, usize)]) -> Mask {
        let mut m = Mask::new(rows, cols);
        for &(r, c) in cells {
            m.set(r, c, 1).unwrap();
        }
        m
    }

    fn block(r0: usize, r1: usize, c0: usize, c1: usize) -> Vec<(usize, usize)> {
        (r0..r1).flat_map(|r| (c0..c1).map(move |c| (r, c))).collect()
    }

    #[test]
    fn test_single_pixel() {
        let contours = find_contours(&make_mask(5, 5, &[(2, 3)])).unwrap();
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].points(), &[(2, 3)]);
        assert_eq!(contours[0].perimeter(), 0.0);
        assert_eq!(contours[0].enclosed_area(), 1);
    }

    #[test]
    fn test_square_border_is_traced_clockwise() {
        let contours = find_contours(&make_mask(5, 5, &block(1, 4, 1, 4))).unwrap();
        let c = &contours[0];
        assert_eq!(
            c.points(),
            &[(1, 1), (1, 2), (1, 3), (2, 3), (3, 3), (3, 2), (3, 1), (2, 1)]
        );
        assert_relative_eq!(c.perimeter(), 8.0, epsilon = 1e-12);
        assert_eq!(c.enclosed_area(), 9);
        assert_eq!(c.bounding_box().width(), 3);
    }

    #[test]
    fn test_two_pixel_line_is_closed_once() {
        let contours = find_contours(&make_mask(3, 4, &[(1, 1), (1, 2)])).unwrap();
        assert_eq!(contours[0].points(), &[(1, 1), (1, 2)]);
        assert_relative_eq!(contours[0].perimeter(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_diagonal_steps_count_sqrt2() {
        // Plus shape: border walks four diagonals
        let mask = make_mask(5, 5, &[(1, 2), (2, 1), (2, 2), (2, 3), (3, 2)]);
        let contours = find_contours(&mask).unwrap();
        assert_eq!(contours[0].points().len(), 4);
        assert_relative_eq!(contours[0].perimeter(), 4.0 * 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_ring_encloses_its_hole() {
        let mut cells = block(1, 6, 1, 6);
        cells.retain(|&(r, c)| !(2..5).contains(&r) || !(2..5).contains(&c));
        let contours = find_contours(&make_mask(7, 7, &cells)).unwrap();
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].pixel_count(), 16);
        assert_eq!(contours[0].enclosed_area(), 25);
    }

    #[test]
    fn test_components_in_scan_order() {
        let mut cells = block(4, 6, 0, 2);
        cells.extend(block(0, 2, 3, 5));
        let contours = find_contours(&make_mask(6, 6, &cells)).unwrap();
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[0].points()[0], (0, 3));
        assert_eq!(contours[1].points()[0], (4, 0));
    }

    #[test]
    fn test_region_contours_keep_region_label() {
        #[rustfmt::skip]
        let labels = LabelMap::from_vec(vec![
            1, 5, 5, -1, 7,
            1, 5, 5, -1, 7,
        ], 2, 5).unwrap();
        let contours = find_region_contours(&labels).unwrap();
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[0].label(), 5);
        assert_eq!(contours[0].pixel_count(), 4);
        assert_eq!(contours[1].label(), 7);
    }

    #[test]
    fn test_polygon_in_map_coordinates() {
        let contours = find_contours(&make_mask(4, 4, &block(0, 2, 0, 2))).unwrap();
        let transform = GeoTransform::new(100.0, 50.0, 10.0, -10.0);
        let polygon = contours[0].to_polygon(&transform);
        let first = polygon.exterior().0[0];
        assert_relative_eq!(first.x, 105.0, epsilon = 1e-12);
        assert_relative_eq!(first.y, 45.0, epsilon = 1e-12);
        assert_eq!(polygon.exterior().0.len(), 5);
    }
}
