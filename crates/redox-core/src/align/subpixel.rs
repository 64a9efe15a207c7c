use ndarray::Array2;

use crate::consts::EPSILON;

/// Fractional offset of a correlation peak from a 3x3 paraboloid fit.
///
/// Returns `(delta_row, delta_col)`, each within ±0.5. Peaks on the border of
/// the correlation window are not refined.
pub fn refine_peak_paraboloid(correlation: &Array2<f64>, row: usize, col: usize) -> (f64, f64) {
    let (h, w) = correlation.dim();
    if row == 0 || col == 0 || row + 1 >= h || col + 1 >= w {
        return (0.0, 0.0);
    }

    let centre = correlation[[row, col]];
    let delta_row = parabola_vertex(
        correlation[[row - 1, col]],
        centre,
        correlation[[row + 1, col]],
    );
    let delta_col = parabola_vertex(
        correlation[[row, col - 1]],
        centre,
        correlation[[row, col + 1]],
    );
    (delta_row, delta_col)
}

fn parabola_vertex(prev: f64, centre: f64, next: f64) -> f64 {
    let curvature = prev - 2.0 * centre + next;
    if curvature.abs() <= EPSILON {
        return 0.0;
    }
    ((prev - next) / (2.0 * curvature)).clamp(-0.5, 0.5)
}
