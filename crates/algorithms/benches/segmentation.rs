//! Benchmarks for the segmentation stages and the full pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fieldseg_algorithms::geometry::find_region_contours;
use fieldseg_algorithms::pipeline::{segment_fields, PipelineParams};
use fieldseg_algorithms::segmentation::{
    build_markers, distance_transform, separate_regions, MarkerParams, SeparatorParams,
};
use fieldseg_core::{GeoTransform, Mask, Raster};

/// Grid of touching discs, like a patchwork of round fields
fn create_field_scene(size: usize) -> Raster<f64> {
    let mut r = Raster::filled(size, size, 20.0);
    r.set_transform(GeoTransform::new(0.0, size as f64, 1.0, -1.0));
    let spacing = 40.0;
    let radius = 19.0;
    for row in 0..size {
        for col in 0..size {
            let (y, x) = (row as f64, col as f64);
            let cy = (y / spacing).floor() * spacing + spacing / 2.0;
            let cx = (x / spacing).floor() * spacing + spacing / 2.0;
            if (y - cy).powi(2) + (x - cx).powi(2) <= radius * radius {
                r.set(row, col, 220.0).unwrap();
            }
        }
    }
    r
}

fn scene_mask(scene: &Raster<f64>) -> Mask {
    scene.map(|v| u8::from(v > 100.0))
}

fn bench_distance_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmentation/distance_transform");
    for size in [256, 512, 1024] {
        let mask = scene_mask(&create_field_scene(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| distance_transform(black_box(&mask)).unwrap())
        });
    }
    group.finish();
}

fn bench_separator(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmentation/separate_regions");
    group.sample_size(20);
    for size in [256, 512] {
        let scene = create_field_scene(size);
        let markers = build_markers(&scene_mask(&scene), &MarkerParams::default()).unwrap();
        let params = SeparatorParams::default();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| separate_regions(black_box(&scene), &markers.markers, &params).unwrap())
        });
    }
    group.finish();
}

fn bench_contours(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmentation/region_contours");
    for size in [256, 512] {
        let scene = create_field_scene(size);
        let seg = segment_fields(&[scene], &PipelineParams::default()).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| find_region_contours(black_box(&seg.labels)).unwrap())
        });
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmentation/pipeline");
    group.sample_size(10);
    for size in [256, 512] {
        let bands = vec![create_field_scene(size)];
        let params = PipelineParams::default();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| segment_fields(black_box(&bands), &params).unwrap())
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_distance_transform,
    bench_separator,
    bench_contours,
    bench_pipeline
);
criterion_main!(benches);
