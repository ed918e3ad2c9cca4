//! Mathematical morphology for masks and intensity rasters
//!
//! All operations are generic over [`RasterElement`](fieldseg_core::RasterElement)
//! and take an iteration count:
//! - **Erosion**: minimum filter (shrinks foreground)
//! - **Dilation**: maximum filter (grows foreground)
//! - **Opening**: erosion then dilation (removes specks)
//! - **Closing**: dilation then erosion (fills small gaps)
//!
//! Neighbors outside the raster never take part in a filter, so results
//! at the border depend only on in-bounds pixels.

mod closing;
mod dilate;
mod element;
mod erode;
mod kernel;
mod opening;

pub use closing::{closing, closing_n, Closing, ClosingParams};
pub use dilate::{dilate, dilate_n, Dilate, DilateParams};
pub use element::StructuringElement;
pub use erode::{erode, erode_n, Erode, ErodeParams};
pub use opening::{opening, opening_n, Opening, OpeningParams};
