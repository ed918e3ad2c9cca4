//! Intensity reduction and binarization
//!
//! Multi-band imagery is reduced to one intensity band, then split into
//! foreground and background either at a caller threshold or at the
//! Otsu threshold of its histogram.

use fieldseg_core::raster::{Mask, Raster, RasterElement};
use fieldseg_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// ITU-R BT.601 luma weights for R, G, B
const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

/// Number of histogram bins used by Otsu's method
const OTSU_BINS: usize = 256;

/// How a foreground mask is derived from an intensity raster
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMethod {
    /// Threshold chosen by Otsu's method
    #[default]
    Otsu,
    /// Fixed threshold; foreground is `value > threshold`
    Fixed(f64),
}

/// Reduce a set of same-shaped bands to one intensity band.
///
/// Three bands are treated as R, G, B and combined with BT.601 luma
/// weights; four bands are R, G, B, A and the alpha band is ignored. Any
/// other count is averaged per pixel. A single band is returned as-is.
pub fn grayscale(bands: &[Raster<f64>]) -> Result<Raster<f64>> {
    let first = bands.first().ok_or(Error::InvalidParameter {
        name: "bands",
        value: "0".to_string(),
        reason: "at least one band is required".to_string(),
    })?;
    for band in &bands[1..] {
        first.ensure_same_shape(band, "grayscale")?;
    }

    if bands.len() == 1 {
        return Ok(first.clone());
    }

    let mut out = first.map(|_| 0.0f64);
    if bands.len() == 3 || bands.len() == 4 {
        for (band, &w) in bands.iter().zip(LUMA_WEIGHTS.iter()) {
            out.data_mut().zip_mut_with(band.data(), |acc, &v| *acc += w * v);
        }
    } else {
        let n = bands.len() as f64;
        for band in bands {
            out.data_mut().zip_mut_with(band.data(), |acc, &v| *acc += v / n);
        }
    }
    Ok(out)
}

/// Otsu threshold of a raster's valid values.
///
/// Values are binned into 256 bins centered on `min + k * step` across the
/// raster's min..max range. The returned threshold is the upper edge of the
/// last bin of the darker class, so `value > threshold` selects exactly
/// the bins of the brighter class. A raster with
/// no valid cells or a single distinct value returns its maximum, which
/// yields an empty mask.
pub fn otsu_threshold(raster: &Raster<f64>) -> f64 {
    let stats = raster.statistics();
    let (Some(min), Some(max)) = (stats.min, stats.max) else {
        debug!("otsu: raster has no valid cells");
        return 0.0;
    };
    if max <= min {
        debug!(value = max, "otsu: constant raster");
        return max;
    }

    let step = (max - min) / (OTSU_BINS - 1) as f64;
    let mut histogram = [0u64; OTSU_BINS];
    for &v in raster.data().iter() {
        if raster.is_nodata(v) {
            continue;
        }
        // Bin k holds (k - 0.5, k + 0.5] in step units
        let bin = ((v - min) / step - 0.5).ceil().max(0.0) as usize;
        histogram[bin.min(OTSU_BINS - 1)] += 1;
    }

    let total: f64 = histogram.iter().sum::<u64>() as f64;
    let weighted_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &h)| i as f64 * h as f64)
        .sum();

    let mut w0 = 0.0;
    let mut sum0 = 0.0;
    let mut best_var = -1.0;
    let mut best_bin = 0usize;

    for (k, &h) in histogram.iter().enumerate() {
        w0 += h as f64;
        sum0 += k as f64 * h as f64;
        let w1 = total - w0;
        if w0 == 0.0 {
            continue;
        }
        if w1 == 0.0 {
            break;
        }
        let m0 = sum0 / w0;
        let m1 = (weighted_total - sum0) / w1;
        let between = w0 * w1 * (m0 - m1) * (m0 - m1);
        if between > best_var {
            best_var = between;
            best_bin = k;
        }
    }

    let threshold = min + (best_bin as f64 + 0.5) * step;
    debug!(threshold, bin = best_bin, "otsu threshold");
    threshold
}

/// Foreground mask of cells with `value > threshold`. Nodata is background.
pub fn binarize<T: RasterElement>(raster: &Raster<T>, threshold: f64) -> Mask {
    let nodata = raster.nodata();
    raster.map(|v| u8::from(!v.is_nodata(nodata) && v.as_f64() > threshold))
}

/// Binarize with the given method, returning the mask and the threshold used
pub fn threshold_mask(raster: &Raster<f64>, method: ThresholdMethod) -> (Mask, f64) {
    let threshold = match method {
        ThresholdMethod::Otsu => otsu_threshold(raster),
        ThresholdMethod::Fixed(t) => t,
    };
    (binarize(raster, threshold), threshold)
}
