//! Normalized cross-correlation registration.
//!
//! The NADH grid is the search image and the FAD grid the template. Both are
//! standardized to zero mean and unit variance, correlated with zero fill
//! outside the grid, and cropped to a window the size of the input centred on
//! zero lag. The window coordinate of the best score, minus half the grid
//! size, is the translation that moves FAD onto NADH.

use ndarray::Array2;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};

use crate::error::{RedoxError, Result};
use crate::frame::Shift;

use super::fft::{fft2d, ifft2d_real, zero_pad};
use super::subpixel::refine_peak_paraboloid;

/// Outcome of registering FAD onto NADH.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub shift: Shift,
    /// Correlation score at the peak; 1.0 for a perfect full-overlap match.
    pub score: f64,
    /// Peak position in the correlation window, (row, col).
    pub peak: (usize, usize),
}

/// Subtract the mean and divide by the (population) standard deviation.
pub fn standardize(data: &Array2<f32>) -> Result<Array2<f64>> {
    let n = data.len();
    if n == 0 {
        return Err(RedoxError::degenerate("registration", "empty image"));
    }
    let mean = data.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
    let var = data
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n as f64;
    let std = var.sqrt();
    if std == 0.0 || !std.is_finite() {
        return Err(RedoxError::degenerate(
            "registration",
            "standard deviation is zero",
        ));
    }
    Ok(data.mapv(|v| (v as f64 - mean) / std))
}

/// Normalized cross-correlation of `search` against `template`, same-size output.
///
/// Entry `[r, c]` holds the mean product of the standardized grids when the
/// template is displaced by `(r - h/2, c - w/2)`.
pub fn normalized_cross_correlation(
    search: &Array2<f32>,
    template: &Array2<f32>,
) -> Result<Array2<f64>> {
    check_shapes(template, search)?;
    let (h, w) = search.dim();

    let a = standardize(search)?;
    let v = standardize(template)?;

    // Padding to twice the size keeps every lag in the window free of wrap-around.
    let (ph, pw) = (2 * h, 2 * w);
    let mut planner = FftPlanner::<f64>::new();
    let mut a_fft = zero_pad(&a, ph, pw);
    let mut v_fft = zero_pad(&v, ph, pw);
    fft2d(&mut planner, &mut a_fft);
    fft2d(&mut planner, &mut v_fft);

    let cross = ndarray::Zip::from(&a_fft)
        .and(&v_fft)
        .map_collect(|a, v| *a * v.conj());
    let circular = ifft2d_real(&mut planner, cross);

    let norm = 1.0 / (h * w) as f64;
    let (half_h, half_w) = ((h / 2) as isize, (w / 2) as isize);
    Ok(Array2::from_shape_fn((h, w), |(row, col)| {
        let lag_y = row as isize - half_h;
        let lag_x = col as isize - half_w;
        let py = lag_y.rem_euclid(ph as isize) as usize;
        let px = lag_x.rem_euclid(pw as isize) as usize;
        circular[[py, px]] * norm
    }))
}

/// Position and value of the maximum; ties go to the first in row-major order.
pub fn find_peak(data: &Array2<f64>) -> (usize, usize, f64) {
    let mut best = (0, 0, f64::NEG_INFINITY);
    for ((row, col), &v) in data.indexed_iter() {
        if v > best.2 {
            best = (row, col, v);
        }
    }
    best
}

/// Find the translation that best aligns `fad` onto `nadh`.
pub fn register(fad: &Array2<f32>, nadh: &Array2<f32>, subpixel: bool) -> Result<Registration> {
    let correlation = normalized_cross_correlation(nadh, fad)?;
    let (h, w) = correlation.dim();
    let (peak_row, peak_col, score) = find_peak(&correlation);

    let mut dy = peak_row as f64 - (h / 2) as f64;
    let mut dx = peak_col as f64 - (w / 2) as f64;
    if subpixel {
        let (sub_dy, sub_dx) = refine_peak_paraboloid(&correlation, peak_row, peak_col);
        dy += sub_dy;
        dx += sub_dx;
    }

    Ok(Registration {
        shift: Shift::new(dy, dx),
        score,
        peak: (peak_row, peak_col),
    })
}

pub(crate) fn check_shapes(fad: &Array2<f32>, nadh: &Array2<f32>) -> Result<()> {
    let (fh, fw) = fad.dim();
    let (nh, nw) = nadh.dim();
    if fh != nh || fw != nw {
        return Err(RedoxError::ShapeMismatch {
            fad_width: fw,
            fad_height: fh,
            nadh_width: nw,
            nadh_height: nh,
        });
    }
    Ok(())
}
