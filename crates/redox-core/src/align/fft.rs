use ndarray::Array2;
use num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Copy a real array into the top-left corner of a zero-filled complex
/// array of shape `(ph, pw)`.
pub(super) fn zero_pad(data: &Array2<f64>, ph: usize, pw: usize) -> Array2<Complex<f64>> {
    let (h, w) = data.dim();
    let mut padded = Array2::<Complex<f64>>::zeros((ph, pw));
    for row in 0..h {
        for col in 0..w {
            padded[[row, col]] = Complex::new(data[[row, col]], 0.0);
        }
    }
    padded
}

/// In-place forward 2D FFT: row-wise, then column-wise.
pub(super) fn fft2d(planner: &mut FftPlanner<f64>, data: &mut Array2<Complex<f64>>) {
    let (h, w) = data.dim();
    let fft_row = planner.plan_fft_forward(w);
    let fft_col = planner.plan_fft_forward(h);
    process_rows(data, fft_row.as_ref());
    process_cols(data, fft_col.as_ref());
}

/// Inverse 2D FFT, returning the normalized real part.
pub(super) fn ifft2d_real(
    planner: &mut FftPlanner<f64>,
    mut data: Array2<Complex<f64>>,
) -> Array2<f64> {
    let (h, w) = data.dim();
    let ifft_row = planner.plan_fft_inverse(w);
    let ifft_col = planner.plan_fft_inverse(h);
    process_cols(&mut data, ifft_col.as_ref());
    process_rows(&mut data, ifft_row.as_ref());

    let scale = 1.0 / (h * w) as f64;
    data.mapv(|c| c.re * scale)
}

fn process_rows(data: &mut Array2<Complex<f64>>, fft: &dyn Fft<f64>) {
    let (h, w) = data.dim();
    let mut buf = vec![Complex::new(0.0, 0.0); w];
    for row in 0..h {
        for col in 0..w {
            buf[col] = data[[row, col]];
        }
        fft.process(&mut buf);
        for col in 0..w {
            data[[row, col]] = buf[col];
        }
    }
}

fn process_cols(data: &mut Array2<Complex<f64>>, fft: &dyn Fft<f64>) {
    let (h, w) = data.dim();
    let mut buf = vec![Complex::new(0.0, 0.0); h];
    for col in 0..w {
        for row in 0..h {
            buf[row] = data[[row, col]];
        }
        fft.process(&mut buf);
        for row in 0..h {
            data[[row, col]] = buf[row];
        }
    }
}
