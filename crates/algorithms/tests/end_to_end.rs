//! End-to-end segmentation scenarios on synthetic imagery.
//!
//! The two-disc scene is the canonical touching-fields case: two bright
//! discs of radius 20 separated by a 2-pixel dark gap, close enough that
//! the sure-background dilation merges them.

use fieldseg_algorithms::geometry::{find_contours, region_geometries, GeometryParams};
use fieldseg_algorithms::pipeline::{segment_fields, PipelineParams};
use fieldseg_algorithms::segmentation::{
    connected_components, refine_multiscale, Connectivity, RefinedScale,
};
use fieldseg_algorithms::validation::iou;
use fieldseg_core::raster::labels::{is_region, BOUNDARY};
use fieldseg_core::raster::{Mask, Raster, D4_OFFSETS, D8_OFFSETS};

const ROWS: usize = 60;
const COLS: usize = 100;
const RADIUS: f64 = 20.0;
// Disc A spans columns 5..=45, disc B 48..=88; columns 46 and 47 are the gap
const CENTER_A: (f64, f64) = (30.0, 25.0);
const CENTER_B: (f64, f64) = (30.0, 68.0);

fn disc_scene() -> Raster<f64> {
    let mut img = Raster::filled(ROWS, COLS, 0.0);
    for r in 0..ROWS {
        for c in 0..COLS {
            let inside = [CENTER_A, CENTER_B].iter().any(|&(cr, cc)| {
                let (dr, dc) = (r as f64 - cr, c as f64 - cc);
                dr * dr + dc * dc <= RADIUS * RADIUS
            });
            if inside {
                img.set(r, c, 255.0).unwrap();
            }
        }
    }
    img
}

fn block_mask(size: usize, r0: usize, r1: usize, c0: usize, c1: usize) -> Mask {
    let mut m = Mask::new(size, size);
    for r in r0..r1 {
        for c in c0..c1 {
            m.set(r, c, 1).unwrap();
        }
    }
    m
}

#[test]
fn two_touching_discs_become_two_fields() {
    let seg = segment_fields(&[disc_scene()], &PipelineParams::default()).unwrap();

    assert_eq!(seg.markers.seed_count, 2);
    assert_eq!(seg.region_count(), 2);

    let labels = seg.labels.data();
    let (a, b) = (labels[(30, 25)], labels[(30, 68)]);
    assert!(is_region(a) && is_region(b) && a != b);

    // Walking the center row from one seed to the other changes region,
    // which can only happen across a boundary pixel
    assert!((26..68).any(|c| labels[(30, c)] == BOUNDARY));

    // No pixel of one region touches the other across an edge
    for ((r, c), &l) in labels.indexed_iter() {
        if !is_region(l) {
            continue;
        }
        for &(dr, dc) in &D4_OFFSETS {
            let (nr, nc) = (r as isize + dr, c as isize + dc);
            if nr < 0 || nc < 0 || nr >= ROWS as isize || nc >= COLS as isize {
                continue;
            }
            let n = labels[(nr as usize, nc as usize)];
            assert!(!is_region(n) || n == l, "regions {} and {} touch at ({}, {})", l, n, r, c);
        }
    }

    // Every boundary pixel sits between the two regions: it has an
    // 8-neighbor in at least one of them
    for ((r, c), &l) in labels.indexed_iter() {
        if l != BOUNDARY {
            continue;
        }
        let touches_region = D8_OFFSETS.iter().any(|&(dr, dc)| {
            let (nr, nc) = (r as isize + dr, c as isize + dc);
            nr >= 0
                && nc >= 0
                && nr < ROWS as isize
                && nc < COLS as isize
                && is_region(labels[(nr as usize, nc as usize)])
        });
        assert!(touches_region, "stray boundary pixel at ({}, {})", r, c);
    }

    // The boundary is one 8-connected line between the discs
    let boundary = connected_components(&seg.labels.boundary_mask(), Connectivity::Eight).unwrap();
    assert_eq!(boundary.count, 1, "boundary split into {} pieces", boundary.count);

    assert_eq!(seg.geometries.len(), 2);
    // Sure background is the mask dilated 3 times, so each region stays
    // within its disc plus a few pixels and never wraps around the other
    let max_extent = 2 * (RADIUS as usize + 4);
    for geom in &seg.geometries {
        assert!(geom.circularity > 0.7, "circularity {}", geom.circularity);
        assert!(geom.area >= 100.0);
        assert!(geom.bbox.width() <= max_extent, "region {} width {}", geom.label, geom.bbox.width());
        assert!(geom.bbox.height() <= max_extent, "region {} height {}", geom.label, geom.bbox.height());
    }
    let geom_a = seg.geometries.iter().find(|g| g.label == a).unwrap();
    let geom_b = seg.geometries.iter().find(|g| g.label == b).unwrap();
    assert!(geom_a.bbox.max_col < CENTER_B.1 as usize);
    assert!(geom_b.bbox.min_col > CENTER_A.1 as usize);
}

#[test]
fn geometry_comes_from_labels_not_refined_masks() {
    let seg = segment_fields(&[disc_scene()], &PipelineParams::default()).unwrap();
    assert_eq!(seg.refined.len(), 3);
    assert_eq!(seg.refined[0].scale, 1);

    // Closing bridges the boundary line, merging the two fields
    let merged = find_contours(&seg.refined[0].raster).unwrap();
    assert_eq!(merged.len(), 1);
    assert_eq!(seg.contours.len(), 2);
    assert_eq!(seg.geometries.len(), 2);
}

#[test]
fn segmentation_is_deterministic() {
    let first = segment_fields(&[disc_scene()], &PipelineParams::default()).unwrap();
    let second = segment_fields(&[disc_scene()], &PipelineParams::default()).unwrap();
    assert_eq!(first.labels, second.labels);
    assert_eq!(first.geometries, second.geometries);
}

#[test]
fn region_mask_matches_foreground_reference() {
    let scene = disc_scene();
    let seg = segment_fields(&[scene.clone()], &PipelineParams::default()).unwrap();
    let reference = scene.map(|v| u8::from(v > 0.0));

    // Regions grow into the dilated band, so overlap is high but not exact
    let score = iou(&seg.labels.region_mask(), &reference).unwrap();
    assert!(score > 0.6 && score < 1.0, "iou {}", score);
    assert_eq!(iou(&reference, &reference).unwrap(), 1.0);
}

#[test]
fn minimum_area_filter() {
    let small = block_mask(30, 10, 15, 10, 15);
    let contours = find_contours(&small).unwrap();
    assert_eq!(region_geometries(&contours, &GeometryParams::default()).count(), 0);

    let large = block_mask(30, 5, 17, 5, 17);
    let contours = find_contours(&large).unwrap();
    assert_eq!(region_geometries(&contours, &GeometryParams::default()).count(), 1);
}

#[test]
fn refinement_is_bit_identical_across_runs() {
    let mask = disc_scene().map(|v| u8::from(v > 0.0));
    let scales = [1, 2, 3];
    let run = || -> Vec<RefinedScale<u8>> {
        refine_multiscale(&mask, &scales)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    };
    let (a, b) = (run(), run());
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.scale, y.scale);
        assert_eq!(x.raster, y.raster);
    }
}
