mod fft;
pub mod ncc;
pub mod shift;
pub mod subpixel;

use ndarray::Array2;

use crate::error::Result;

pub use ncc::{find_peak, normalized_cross_correlation, register, standardize, Registration};
pub use shift::{bilinear_sample, shift_array};

/// Register `fad` onto `nadh` and return the shifted FAD grid with the registration.
pub fn align_fad(
    fad: &Array2<f32>,
    nadh: &Array2<f32>,
    subpixel: bool,
) -> Result<(Array2<f32>, Registration)> {
    let registration = register(fad, nadh, subpixel)?;
    Ok((shift_array(fad, &registration.shift), registration))
}
