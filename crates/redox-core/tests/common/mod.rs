use std::path::Path;

use image::{ImageBuffer, Luma};
use ndarray::Array2;

/// Write an 8-bit grayscale image; the format follows the extension.
pub fn write_gray8(path: &Path, data: &Array2<u8>) {
    let (h, w) = data.dim();
    let img = ImageBuffer::<Luma<u8>, Vec<u8>>::from_fn(w as u32, h as u32, |x, y| {
        Luma([data[[y as usize, x as usize]]])
    });
    img.save(path).expect("write 8-bit image");
}

/// Write a 16-bit grayscale image; the format follows the extension.
pub fn write_gray16(path: &Path, data: &Array2<u16>) {
    let (h, w) = data.dim();
    let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_fn(w as u32, h as u32, |x, y| {
        Luma([data[[y as usize, x as usize]]])
    });
    img.save(path).expect("write 16-bit image");
}

/// Sum of Gaussian blobs at asymmetric positions, peak value ~1.
pub fn blob_pattern(h: usize, w: usize, centres: &[(f32, f32)]) -> Array2<f32> {
    let sigma2 = 2.0 * 2.0f32 * 2.0;
    Array2::from_shape_fn((h, w), |(r, c)| {
        centres
            .iter()
            .map(|&(cy, cx)| {
                let dy = r as f32 - cy;
                let dx = c as f32 - cx;
                (-(dy * dy + dx * dx) / sigma2).exp()
            })
            .sum()
    })
}

/// Translate `data` by whole pixels, filling with 0.
pub fn translate(data: &Array2<f32>, dy: isize, dx: isize) -> Array2<f32> {
    let (h, w) = data.dim();
    Array2::from_shape_fn((h, w), |(r, c)| {
        let sr = r as isize - dy;
        let sc = c as isize - dx;
        if sr >= 0 && sr < h as isize && sc >= 0 && sc < w as isize {
            data[[sr as usize, sc as usize]]
        } else {
            0.0
        }
    })
}

/// Scale a `[0, 1]` pattern into 16-bit detector counts with an offset.
pub fn to_counts(data: &Array2<f32>, offset: u16, scale: f32) -> Array2<u16> {
    data.mapv(|v| offset.saturating_add((v.clamp(0.0, 1.0) * scale) as u16))
}
