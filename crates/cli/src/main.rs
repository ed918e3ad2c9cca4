//! FieldSeg CLI - agricultural field segmentation from imagery

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use fieldseg_algorithms::geometry::{region_geometries, Contour, RegionGeometry};
use fieldseg_algorithms::pipeline::{segment_fields, PipelineParams, Segmentation};
use fieldseg_algorithms::segmentation::{overlay_boundaries, refine_multiscale, ThresholdMethod};
use fieldseg_algorithms::validation::{ConfusionCounts, ValidationReport};
use fieldseg_core::io::{read_geotiff, read_geotiff_bands, write_geotiff, GeoTiffOptions};
use fieldseg_core::raster::labels::is_region;
use fieldseg_core::{GeoTransform, Mask, Raster, RasterElement};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "fieldseg")]
#[command(author, version, about = "Agricultural field segmentation", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Segment an image into field regions
    Segment {
        /// Input image (single band or RGB)
        input: PathBuf,
        /// Output label map (-1 boundary, 1 background, 2.. regions)
        labels_out: PathBuf,
        #[command(flatten)]
        options: SegmentOptions,
    },
    /// Close a mask at several elliptical scales
    Refine {
        /// Input mask (non-zero is foreground)
        input: PathBuf,
        /// Output prefix; one `<prefix>_s<scale>.tif` per scale
        output_prefix: PathBuf,
        /// Comma-separated ellipse radii
        #[arg(short, long, default_value = "1,2,3")]
        scales: String,
    },
    /// Compare a predicted mask against a reference mask
    Validate {
        /// Predicted mask (non-zero is foreground)
        prediction: PathBuf,
        /// Reference mask (non-zero is foreground)
        reference: PathBuf,
        /// The prediction is a label map; only region labels (>= 2) count
        /// as foreground
        #[arg(short, long)]
        labels: bool,
    },
    /// Segment several images in parallel
    Batch {
        /// Input images
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Directory receiving `<stem>_labels.tif` and `<stem>_fields.json`
        #[arg(short, long)]
        out_dir: PathBuf,
        /// Global foreground threshold (default: Otsu)
        #[arg(short, long)]
        threshold: Option<f64>,
        /// Minimum region area in pixels
        #[arg(long)]
        min_area: Option<f64>,
        /// JSON file with pipeline parameters
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct SegmentOptions {
    /// Write region geometries and outlines as JSON
    #[arg(short, long)]
    geometry: Option<PathBuf>,
    /// Write the intensity image with boundaries burned in
    #[arg(long)]
    overlay: Option<PathBuf>,
    /// Value written on boundary pixels of the overlay
    #[arg(long, default_value = "255")]
    overlay_value: f64,
    /// Reference mask; prints IoU of the region mask against it
    #[arg(short, long)]
    reference: Option<PathBuf>,
    /// Global foreground threshold (default: Otsu)
    #[arg(short, long)]
    threshold: Option<f64>,
    /// Minimum region area in pixels
    #[arg(long)]
    min_area: Option<f64>,
    /// JSON file with pipeline parameters
    #[arg(short, long)]
    config: Option<PathBuf>,
}

// ─── Reports ────────────────────────────────────────────────────────────

/// One region in the JSON geometry report
#[derive(Serialize)]
struct FieldRecord {
    #[serde(flatten)]
    geometry: RegionGeometry,
    /// Exterior ring in map coordinates, closed
    outline: Vec<[f64; 2]>,
}

#[derive(Serialize)]
struct FieldReport {
    source: String,
    threshold: f64,
    seeds: usize,
    regions: usize,
    fields: Vec<FieldRecord>,
}

fn field_records(
    contours: &[Contour],
    params: &PipelineParams,
    transform: &GeoTransform,
) -> Vec<FieldRecord> {
    contours
        .iter()
        .filter_map(|contour| {
            let geometry = region_geometries(std::slice::from_ref(contour), &params.geometry).next()?;
            let outline = contour
                .to_polygon(transform)
                .exterior()
                .coords()
                .map(|c| [c.x, c.y])
                .collect();
            Some(FieldRecord { geometry, outline })
        })
        .collect()
}

fn build_report(input: &Path, seg: &Segmentation, params: &PipelineParams) -> FieldReport {
    FieldReport {
        source: input.display().to_string(),
        threshold: seg.threshold,
        seeds: seg.markers.seed_count,
        regions: seg.region_count(),
        fields: field_records(&seg.contours, params, seg.labels.transform()),
    }
}

fn write_report(report: &FieldReport, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), report)
        .context("Failed to write geometry report")?;
    Ok(())
}

fn print_validation(report: &ValidationReport) {
    let c = report.counts;
    println!("IoU:       {:.4}", report.iou);
    println!("Accuracy:  {:.4}", report.accuracy);
    println!("Precision: {:.4}", report.precision);
    println!("Recall:    {:.4}", report.recall);
    println!("F1:        {:.4}", report.f1);
    println!(
        "  TP {}  FP {}  TN {}  FN {}",
        c.true_positive, c.false_positive, c.true_negative, c.false_negative
    );
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Setting default subscriber failed")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_image(path: &Path) -> Result<Vec<Raster<f64>>> {
    let pb = spinner("Reading image...");
    let bands = read_geotiff_bands(path)
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    pb.finish_and_clear();
    if let Some(first) = bands.first() {
        info!("Input: {} x {}, {} band(s)", first.cols(), first.rows(), bands.len());
    }
    Ok(bands)
}

/// How a raster read from disk becomes a foreground mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MaskSource {
    /// Any non-zero value is foreground
    Mask,
    /// Label map: region labels are foreground, background and boundary are not
    Labels,
}

fn to_mask(raster: &Raster<f64>, source: MaskSource) -> Mask {
    match source {
        MaskSource::Mask => raster.map(|v| u8::from(v != 0.0 && !v.is_nan())),
        MaskSource::Labels => raster.map(|v| u8::from(is_region(i32::from_f64_saturating(v)))),
    }
}

fn read_mask(path: &Path, source: MaskSource) -> Result<Mask> {
    let pb = spinner("Reading mask...");
    let raster: Raster<f64> = read_geotiff(path, None)
        .with_context(|| format!("Failed to read mask {}", path.display()))?;
    pb.finish_and_clear();
    Ok(to_mask(&raster, source))
}

fn write_result<T: RasterElement>(raster: &Raster<T>, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    write_geotiff(raster, path, Some(GeoTiffOptions::default()))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn parse_scales(s: &str) -> Result<Vec<usize>> {
    s.split(',')
        .map(|part| {
            part.trim()
                .parse::<usize>()
                .with_context(|| format!("Invalid scale: {}", part))
        })
        .collect()
}

/// Pipeline parameters: config file first, flags on top
fn load_params(
    config: Option<&Path>,
    threshold: Option<f64>,
    min_area: Option<f64>,
) -> Result<PipelineParams> {
    let mut params = match config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&text).context("Invalid pipeline configuration")?
        }
        None => PipelineParams::default(),
    };
    if let Some(t) = threshold {
        params.threshold = ThresholdMethod::Fixed(t);
    }
    if let Some(a) = min_area {
        params.geometry.min_area = a;
    }
    Ok(params)
}

fn run_segment(input: &Path, labels_out: &Path, options: &SegmentOptions) -> Result<()> {
    let params = load_params(options.config.as_deref(), options.threshold, options.min_area)?;
    let bands = read_image(input)?;

    let start = Instant::now();
    let pb = spinner("Segmenting fields...");
    let seg = segment_fields(&bands, &params).context("Segmentation failed")?;
    pb.finish_and_clear();
    let elapsed = start.elapsed();

    info!(
        "Threshold {:.3}, {} seed(s), {} region(s), {} field(s) above {} px",
        seg.threshold,
        seg.markers.seed_count,
        seg.region_count(),
        seg.geometries.len(),
        params.geometry.min_area
    );

    write_result(&seg.labels, labels_out)?;
    done("Label map", labels_out, elapsed);

    if let Some(path) = &options.geometry {
        write_report(&build_report(input, &seg, &params), path)?;
        println!("Geometry report saved to: {}", path.display());
    }

    if let Some(path) = &options.overlay {
        let overlay = overlay_boundaries(&seg.intensity, &seg.labels, options.overlay_value)
            .context("Failed to build overlay")?;
        write_result(&overlay, path)?;
        println!("Overlay saved to: {}", path.display());
    }

    if let Some(path) = &options.reference {
        let reference = read_mask(path, MaskSource::Mask)?;
        let counts = ConfusionCounts::from_masks(&seg.labels.region_mask(), &reference)
            .context("Reference does not match the input image")?;
        print_validation(&counts.report());
    }

    Ok(())
}

fn run_batch(inputs: &[PathBuf], out_dir: &Path, params: &PipelineParams) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let bar = ProgressBar::new(inputs.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.green} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let failures: Vec<(PathBuf, anyhow::Error)> = inputs
        .par_iter()
        .filter_map(|input| {
            let result = segment_one(input, out_dir, params);
            bar.inc(1);
            result.err().map(|e| (input.clone(), e))
        })
        .collect();
    bar.finish_and_clear();

    for (input, err) in &failures {
        warn!("{}: {:#}", input.display(), err);
    }
    println!(
        "Segmented {} of {} image(s) into {}",
        inputs.len() - failures.len(),
        inputs.len(),
        out_dir.display()
    );
    if !failures.is_empty() {
        anyhow::bail!("{} image(s) failed", failures.len());
    }
    Ok(())
}

fn segment_one(input: &Path, out_dir: &Path, params: &PipelineParams) -> Result<()> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .context("Input has no file name")?;
    let bands = read_geotiff_bands(input).context("Failed to read image")?;
    let seg = segment_fields(&bands, params).context("Segmentation failed")?;

    let labels_path = out_dir.join(format!("{}_labels.tif", stem));
    write_geotiff(&seg.labels, &labels_path, Some(GeoTiffOptions::default()))
        .context("Failed to write label map")?;
    write_report(
        &build_report(input, &seg, params),
        &out_dir.join(format!("{}_fields.json", stem)),
    )?;
    info!("{}: {} region(s)", stem, seg.region_count());
    Ok(())
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input } => {
            let bands = read_image(&input)?;
            let raster = bands.first().context("Image has no bands")?;
            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Bands: {}", bands.len());
            println!("Cell size: {}", raster.cell_size());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            for (i, band) in bands.iter().enumerate() {
                let stats = band.statistics();
                println!("\nBand {} statistics:", i + 1);
                if let Some(min) = stats.min {
                    println!("  Min: {:.4}", min);
                }
                if let Some(max) = stats.max {
                    println!("  Max: {:.4}", max);
                }
                if let Some(mean) = stats.mean {
                    println!("  Mean: {:.4}", mean);
                }
                println!(
                    "  Valid cells: {} ({:.1}%)",
                    stats.valid_count,
                    100.0 * stats.valid_count as f64 / band.len() as f64
                );
            }
        }

        // ── Segment ──────────────────────────────────────────────────
        Commands::Segment {
            input,
            labels_out,
            options,
        } => run_segment(&input, &labels_out, &options)?,

        // ── Refine ───────────────────────────────────────────────────
        Commands::Refine {
            input,
            output_prefix,
            scales,
        } => {
            let scales = parse_scales(&scales)?;
            let mask = read_mask(&input, MaskSource::Mask)?;
            let start = Instant::now();
            let pb = spinner("Refining...");
            let refined = refine_multiscale(&mask, &scales)
                .context("Invalid scales")?
                .collect::<fieldseg_core::Result<Vec<_>>>()
                .context("Refinement failed")?;
            pb.finish_and_clear();
            let elapsed = start.elapsed();

            let prefix = output_prefix.display().to_string();
            for step in &refined {
                let path = PathBuf::from(format!("{}_s{}.tif", prefix, step.scale));
                write_result(&step.raster, &path)?;
                info!(
                    "Scale {}: {} foreground cell(s)",
                    step.scale,
                    step.raster.foreground_count()
                );
                done(&format!("Scale {}", step.scale), &path, elapsed);
            }
        }

        // ── Validate ─────────────────────────────────────────────────
        Commands::Validate {
            prediction,
            reference,
            labels,
        } => {
            let source = if labels { MaskSource::Labels } else { MaskSource::Mask };
            let prediction = read_mask(&prediction, source)?;
            let reference = read_mask(&reference, MaskSource::Mask)?;
            let counts = ConfusionCounts::from_masks(&prediction, &reference)
                .context("Prediction and reference differ in shape")?;
            print_validation(&counts.report());
        }

        // ── Batch ────────────────────────────────────────────────────
        Commands::Batch {
            inputs,
            out_dir,
            threshold,
            min_area,
            config,
        } => {
            let params = load_params(config.as_deref(), threshold, min_area)?;
            let start = Instant::now();
            run_batch(&inputs, &out_dir, &params)?;
            println!("  Processing time: {:.2?}", start.elapsed());
        }
    }

    Ok(())
}
