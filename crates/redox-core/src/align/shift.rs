use ndarray::Array2;

use crate::frame::Shift;

/// Translate a grid by `shift`, filling uncovered positions with 0.
///
/// Output pixel `(y, x)` samples the input at `(y - dy, x - dx)` with bilinear
/// interpolation, so integer shifts copy values exactly.
pub fn shift_array(data: &Array2<f32>, shift: &Shift) -> Array2<f32> {
    if shift.is_zero() {
        return data.clone();
    }
    Array2::from_shape_fn(data.dim(), |(row, col)| {
        bilinear_sample(data, row as f64 - shift.dy, col as f64 - shift.dx)
    })
}

/// Sample `data` at a fractional position; outside the grid reads as 0.
pub fn bilinear_sample(data: &Array2<f32>, y: f64, x: f64) -> f32 {
    let (h, w) = data.dim();

    let y0 = y.floor() as i64;
    let x0 = x.floor() as i64;
    let fy = (y - y0 as f64) as f32;
    let fx = (x - x0 as f64) as f32;

    let at = |r: i64, c: i64| -> f32 {
        if r >= 0 && r < h as i64 && c >= 0 && c < w as i64 {
            data[[r as usize, c as usize]]
        } else {
            0.0
        }
    };

    let top = weighted(at(y0, x0), at(y0, x0 + 1), fx);
    let bottom = weighted(at(y0 + 1, x0), at(y0 + 1, x0 + 1), fx);
    weighted(top, bottom, fy)
}

#[inline]
fn weighted(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}
