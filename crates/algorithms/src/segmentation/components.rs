//! Connected-component labeling for masks and label maps

use fieldseg_core::raster::labels::is_region;
use fieldseg_core::raster::{offset_within, LabelMap, Mask, D4_OFFSETS, D8_OFFSETS};
use fieldseg_core::Result;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Pixel adjacency used when grouping pixels into components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    /// Edge-sharing neighbors only
    Four,
    /// Edge- and corner-sharing neighbors
    #[default]
    Eight,
}

impl Connectivity {
    pub fn offsets(&self) -> &'static [(isize, isize)] {
        match self {
            Connectivity::Four => &D4_OFFSETS,
            Connectivity::Eight => &D8_OFFSETS,
        }
    }
}

/// Result of component labeling: `labels` holds `1..=count` for member
/// pixels and `0` elsewhere
#[derive(Debug, Clone)]
pub struct Components {
    pub labels: LabelMap,
    pub count: usize,
}

/// Label connected foreground components of a mask.
///
/// Components are numbered from 1 in raster scan order of their first pixel.
pub fn connected_components(mask: &Mask, connectivity: Connectivity) -> Result<Components> {
    let data = mask.data();
    let (labels, count) = label_by_key(mask.shape(), connectivity, |r, c| {
        (data[(r, c)] != 0).then_some(0)
    });
    Ok(Components {
        labels: mask.with_data(labels)?,
        count,
    })
}

/// Label connected pieces of every region label (`>= 2`) of a label map.
///
/// Two pixels belong to the same piece only when they carry the same region
/// label. Background, unknown and boundary pixels get `0`.
pub fn region_components(labels: &LabelMap, connectivity: Connectivity) -> Result<Components> {
    let data = labels.data();
    let (pieces, count) = label_by_key(labels.shape(), connectivity, |r, c| {
        let l = data[(r, c)];
        is_region(l).then_some(l)
    });
    Ok(Components {
        labels: labels.with_data(pieces)?,
        count,
    })
}

/// Flood-fill labeling where `key` returns `None` for non-member pixels and
/// equal keys join across adjacent pixels
fn label_by_key<F>(shape: (usize, usize), connectivity: Connectivity, key: F) -> (Array2<i32>, usize)
where
    F: Fn(usize, usize) -> Option<i32>,
{
    let (rows, cols) = shape;
    let offsets = connectivity.offsets();
    let mut out = Array2::<i32>::zeros(shape);
    let mut count = 0usize;
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for row in 0..rows {
        for col in 0..cols {
            if out[(row, col)] != 0 {
                continue;
            }
            let Some(k) = key(row, col) else {
                continue;
            };

            count += 1;
            let id = count as i32;
            out[(row, col)] = id;
            stack.push((row, col));

            while let Some((r, c)) = stack.pop() {
                for &offset in offsets {
                    let Some((nr, nc)) = offset_within(r, c, offset, rows, cols) else {
                        continue;
                    };
                    if out[(nr, nc)] == 0 && key(nr, nc) == Some(k) {
                        out[(nr, nc)] = id;
                        stack.push((nr, nc));
                    }
                }
            }
        }
    }

    (out, count)
}
