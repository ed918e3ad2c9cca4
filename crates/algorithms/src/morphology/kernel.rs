//! Shared min/max neighborhood filter behind erosion and dilation

use crate::maybe_rayon::*;
use fieldseg_core::raster::{offset_within, Raster, RasterElement};
use fieldseg_core::{Error, Result};
use ndarray::Array2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Extremum {
    Min,
    Max,
}

/// One pass of a min or max filter over `offsets`.
///
/// Offsets falling outside the raster and nodata neighbors are skipped, so
/// the border is never padded. Nodata centers are copied through.
pub(crate) fn extremum_filter<T: RasterElement>(
    raster: &Raster<T>,
    offsets: &[(isize, isize)],
    extremum: Extremum,
) -> Result<Raster<T>> {
    let (rows, cols) = raster.shape();
    let nodata = raster.nodata();
    let identity = match extremum {
        Extremum::Min => T::highest(),
        Extremum::Max => T::lowest(),
    };

    let data: Vec<T> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = Vec::with_capacity(cols);

            for col in 0..cols {
                let center = unsafe { raster.get_unchecked(row, col) };
                if center.is_nodata(nodata) {
                    row_data.push(center);
                    continue;
                }

                let mut best = identity;
                let mut seen = false;
                for &offset in offsets {
                    let Some((nr, nc)) = offset_within(row, col, offset, rows, cols) else {
                        continue;
                    };
                    let v = unsafe { raster.get_unchecked(nr, nc) };
                    if v.is_nodata(nodata) {
                        continue;
                    }
                    let better = match extremum {
                        Extremum::Min => v < best,
                        Extremum::Max => v > best,
                    };
                    if better {
                        best = v;
                    }
                    seen = true;
                }

                row_data.push(if seen { best } else { center });
            }

            row_data
        })
        .collect();

    let array =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    let mut output = raster.with_data(array)?;
    output.set_nodata(nodata);
    Ok(output)
}
