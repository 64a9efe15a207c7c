use ndarray::{Array2, Array3};
use tracing::debug;

use crate::align::ncc::check_shapes;
use crate::consts::{EPSILON, INTENSITY_HIGH_PERCENTILE, INTENSITY_LOW_PERCENTILE};
use crate::error::{RedoxError, Result};
use crate::stats::{percentile, sorted_nonzero};

use super::colormap::ColorTable;

/// False-color rendering of a redox map.
#[derive(Clone, Debug)]
pub struct PrettyRender {
    /// RGBA values in `[0, 1]`, shape `(h, w, 4)`.
    pub rgba: Array3<f32>,
    /// Color table index chosen for each pixel.
    pub indices: Array2<usize>,
    /// Percentile-stretched total intensity. Computed alongside the colors
    /// but not blended into them.
    pub intensity: Array2<f32>,
}

/// Contrast stretch of the total-intensity grid from its non-zero percentiles.
///
/// The 1st percentile is used as the "max" floor and the 99th as the "min"
/// floor, giving `(total - p99) / (p1 - p99)` saturated to `[0, 1]`. Grids
/// with no non-zero pixels or an empty percentile range yield zeros.
pub fn intensity_stretch(total: &Array2<f32>) -> Array2<f32> {
    let values = sorted_nonzero(total);
    let (Some(max_floor), Some(min_floor)) = (
        percentile(&values, INTENSITY_LOW_PERCENTILE),
        percentile(&values, INTENSITY_HIGH_PERCENTILE),
    ) else {
        return Array2::zeros(total.dim());
    };

    let range = max_floor - min_floor;
    if range.abs() < EPSILON {
        return Array2::zeros(total.dim());
    }
    total.mapv(|v| (((v as f64 - min_floor) / range) as f32).clamp(0.0, 1.0))
}

/// Quantize ratio values into color table indices.
///
/// Values are rescaled from `[botlim, uplim]` to `[0, 1]`, clipped, inverted,
/// then mapped to `round(bit_scale * x) + 1` and clipped to `bit_scale`.
/// `uplim` lands on index 1 and `botlim` on `bit_scale`.
pub fn color_indices(
    redox: &Array2<f32>,
    bit_scale: usize,
    botlim: f32,
    uplim: f32,
) -> Result<Array2<usize>> {
    let span = uplim - botlim;
    if !span.is_finite() || span == 0.0 {
        return Err(RedoxError::InvalidRenderBounds { botlim, uplim });
    }

    let scale = bit_scale as f32;
    Ok(redox.mapv(|v| {
        let x = (v - botlim) / span;
        let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
        let inverted = 1.0 - x;
        ((scale * inverted).round() as usize + 1).min(bit_scale)
    }))
}

/// Render a redox map through `table`.
pub fn pretty_redox(
    redox: &Array2<f32>,
    total_intensity: &Array2<f32>,
    table: &ColorTable,
    botlim: f32,
    uplim: f32,
) -> Result<PrettyRender> {
    check_shapes(redox, total_intensity)?;

    let intensity = intensity_stretch(total_intensity);
    let indices = color_indices(redox, table.bit_scale(), botlim, uplim)?;

    let (h, w) = redox.dim();
    let entries = table.entries();
    let rgba = Array3::from_shape_fn((h, w, 4), |(row, col, c)| entries[indices[[row, col]]][c]);
    debug!(width = w, height = h, lut = table.len(), "Rendered false-color redox map");

    Ok(PrettyRender {
        rgba,
        indices,
        intensity,
    })
}
