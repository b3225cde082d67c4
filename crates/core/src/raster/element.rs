//! Raster element trait for generic cell values

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// Trait for types that can be stored in a raster cell.
///
/// Masks and class grids use integer types, elevations and derived
/// travel-time fields use `f64` with `NaN` as the implicit no-data.
pub trait RasterElement:
    Copy + Clone + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// Default no-data value for this type
    fn default_nodata() -> Self;

    /// Check if this value represents no-data
    fn is_nodata(&self, nodata: Option<Self>) -> bool;

    /// Convert self to f64
    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }
}

macro_rules! impl_raster_element_int {
    ($($t:ty),*) => {
        $(
            impl RasterElement for $t {
                fn default_nodata() -> Self {
                    <$t>::MIN
                }

                fn is_nodata(&self, nodata: Option<Self>) -> bool {
                    nodata.is_some_and(|nd| *self == nd)
                }
            }
        )*
    };
}

macro_rules! impl_raster_element_float {
    ($($t:ty),*) => {
        $(
            impl RasterElement for $t {
                fn default_nodata() -> Self {
                    <$t>::NAN
                }

                fn is_nodata(&self, nodata: Option<Self>) -> bool {
                    if self.is_nan() {
                        return true;
                    }
                    nodata.is_some_and(|nd| (self - nd).abs() < <$t>::EPSILON * 100.0)
                }
            }
        )*
    };
}

impl_raster_element_int!(i8, i16, i32, i64, u8, u16, u32, u64);
impl_raster_element_float!(f32, f64);
