//! Raster element trait for generic cell values

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// Trait for types that can be stored in a raster cell.
///
/// Masks use `u8`, marker and label maps use `i32`, intensity rasters
/// use `f64`. Morphology is generic over this trait so the same kernels
/// serve binary masks and grayscale images.
pub trait RasterElement:
    Copy + Clone + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// Minimum value representable by this type (identity for dilation)
    fn lowest() -> Self;

    /// Maximum value representable by this type (identity for erosion)
    fn highest() -> Self;

    /// Value substituted when a decoded sample cannot be represented
    fn default_nodata() -> Self;

    /// Check if this value represents no-data
    fn is_nodata(&self, nodata: Option<Self>) -> bool;

    /// Convert self to f64 (NaN when not representable)
    fn as_f64(self) -> f64 {
        <f64 as NumCast>::from(self).unwrap_or(f64::NAN)
    }

    /// Convert from f64, saturating to the type's range
    fn from_f64_saturating(value: f64) -> Self {
        if value.is_nan() {
            return Self::default_nodata();
        }
        NumCast::from(value).unwrap_or_else(|| {
            if value > 0.0 {
                Self::highest()
            } else {
                Self::lowest()
            }
        })
    }
}

macro_rules! impl_raster_element_int {
    ($t:ty) => {
        impl RasterElement for $t {
            fn lowest() -> Self {
                <$t>::MIN
            }

            fn highest() -> Self {
                <$t>::MAX
            }

            fn default_nodata() -> Self {
                0
            }

            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                match nodata {
                    Some(nd) => *self == nd,
                    None => false,
                }
            }

            fn from_f64_saturating(value: f64) -> Self {
                if value.is_nan() {
                    return 0;
                }
                value.round().clamp(<$t>::MIN as f64, <$t>::MAX as f64) as $t
            }
        }
    };
}

macro_rules! impl_raster_element_float {
    ($t:ty) => {
        impl RasterElement for $t {
            fn lowest() -> Self {
                <$t>::NEG_INFINITY
            }

            fn highest() -> Self {
                <$t>::INFINITY
            }

            fn default_nodata() -> Self {
                <$t>::NAN
            }

            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                if self.is_nan() {
                    return true;
                }
                match nodata {
                    Some(nd) => (self - nd).abs() < <$t>::EPSILON * 100.0,
                    None => false,
                }
            }
        }
    };
}

impl_raster_element_int!(u8);
impl_raster_element_int!(u16);
impl_raster_element_int!(i32);
impl_raster_element_int!(u32);
impl_raster_element_float!(f32);
impl_raster_element_float!(f64);
