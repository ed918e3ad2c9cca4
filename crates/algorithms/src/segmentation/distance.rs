//! Exact Euclidean distance transform
//!
//! Separable lower-envelope algorithm of Felzenszwalb & Huttenlocher:
//! a 1D squared-distance pass down every column followed by one along
//! every row, then a square root.
//!
//! Reference:
//! Felzenszwalb, P. F., & Huttenlocher, D. P. (2012). Distance transforms
//! of sampled functions. *Theory of Computing*, 8, 415–428.

use fieldseg_core::raster::{Mask, Raster};
use fieldseg_core::Result;
use ndarray::{Array2, Axis};

/// Distance from every foreground pixel to the nearest background pixel.
///
/// Background pixels are 0. Pixels outside the raster do not count as
/// background, so a mask without any background pixel yields
/// `f64::INFINITY` everywhere.
pub fn distance_transform(mask: &Mask) -> Result<Raster<f64>> {
    let mut grid: Array2<f64> = mask
        .data()
        .mapv(|v| if v == 0 { 0.0 } else { f64::INFINITY });

    let mut scratch = Vec::new();
    for axis in [Axis(0), Axis(1)] {
        for mut lane in grid.lanes_mut(axis) {
            let f: Vec<f64> = lane.iter().copied().collect();
            scratch.resize(f.len(), 0.0);
            squared_distance_1d(&f, &mut scratch);
            for (dst, &src) in lane.iter_mut().zip(scratch.iter()) {
                *dst = src;
            }
        }
    }

    grid.mapv_inplace(f64::sqrt);
    mask.with_data(grid)
}

/// 1D squared distance transform of a sampled function `f` into `out`.
///
/// Infinite samples never enter the lower envelope.
fn squared_distance_1d(f: &[f64], out: &mut [f64]) {
    // (apex position, left end of the interval where it is lowest)
    let mut hull: Vec<(usize, f64)> = Vec::with_capacity(f.len());

    for (q, &fq) in f.iter().enumerate() {
        if !fq.is_finite() {
            continue;
        }
        let qf = q as f64;
        let mut start = f64::NEG_INFINITY;
        while let Some(&(p, p_start)) = hull.last() {
            let pf = p as f64;
            let s = ((fq + qf * qf) - (f[p] + pf * pf)) / (2.0 * (qf - pf));
            if s <= p_start {
                hull.pop();
            } else {
                start = s;
                break;
            }
        }
        hull.push((q, start));
    }

    if hull.is_empty() {
        out.fill(f64::INFINITY);
        return;
    }

    let mut k = 0;
    for (q, slot) in out.iter_mut().enumerate() {
        let qf = q as f64;
        while k + 1 < hull.len() && hull[k + 1].1 < qf {
            k += 1;
        }
        let p = hull[k].0;
        let d = qf - p as f64;
        *slot = d * d + f[p];
    }
}
