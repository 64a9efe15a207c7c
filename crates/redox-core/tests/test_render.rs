use approx::assert_abs_diff_eq;
use ndarray::{array, Array2};

use redox_core::error::RedoxError;
use redox_core::render::{color_indices, intensity_stretch, pretty_redox, ColorTable};

fn grey_table() -> ColorTable {
    ColorTable::new(vec![
        [0.0, 0.0, 0.0, 1.0],
        [0.25, 0.25, 0.25, 1.0],
        [0.5, 0.5, 0.5, 1.0],
        [0.75, 0.75, 0.75, 1.0],
        [1.0, 1.0, 1.0, 1.0],
    ])
    .unwrap()
}

#[test]
fn test_jet_table() {
    let jet = ColorTable::jet(64).unwrap();
    assert_eq!(jet.len(), 64);
    assert_eq!(jet.bit_scale(), 63);

    let first = jet.get(0).unwrap();
    assert_abs_diff_eq!(first[2], 0.5);
    assert_abs_diff_eq!(first[0], 0.0);
    let last = jet.get(63).unwrap();
    assert_abs_diff_eq!(last[0], 0.5);
    assert_abs_diff_eq!(last[2], 0.0);
    assert!(jet.entries().iter().all(|c| c[3] == 1.0));
}

#[test]
fn test_table_needs_two_entries() {
    assert!(matches!(
        ColorTable::new(vec![[0.0; 4]]),
        Err(RedoxError::InvalidColorTable(_))
    ));
    assert!(ColorTable::jet(1).is_err());
}

#[test]
fn test_bounds_map_to_table_ends() {
    let redox = array![[1.0f32, 0.0, 2.5, -1.0]];
    let indices = color_indices(&redox, 63, 0.0, 1.0).unwrap();
    // uplim and above use entry 1, botlim and below the last entry.
    assert_eq!(indices[[0, 0]], 1);
    assert_eq!(indices[[0, 1]], 63);
    assert_eq!(indices[[0, 2]], 1);
    assert_eq!(indices[[0, 3]], 63);
}

#[test]
fn test_indices_are_inverted() {
    let redox = array![[0.25f32, 0.5, 0.75]];
    let indices = color_indices(&redox, 4, 0.0, 1.0).unwrap();
    assert_eq!(indices, array![[4usize, 3, 2]]);
}

#[test]
fn test_invalid_bounds() {
    let redox = Array2::<f32>::zeros((2, 2));
    let err = color_indices(&redox, 63, 0.5, 0.5).unwrap_err();
    assert!(matches!(err, RedoxError::InvalidRenderBounds { .. }));
}

#[test]
fn test_pretty_shape_and_colors() {
    let table = grey_table();
    let redox = array![[1.0f32, 0.0], [0.5, 0.25]];
    let total = array![[1.0f32, 2.0], [3.0, 4.0]];

    let render = pretty_redox(&redox, &total, &table, 0.0, 1.0).unwrap();
    assert_eq!(render.rgba.dim(), (2, 2, 4));
    assert_eq!(render.indices.dim(), (2, 2));
    assert!(render.indices.iter().all(|&i| i < table.len()));

    // uplim -> entry 1, botlim -> entry 4, 0.5 -> round(2) + 1.
    assert_eq!(render.rgba[[0, 0, 0]], 0.25);
    assert_eq!(render.rgba[[0, 1, 0]], 1.0);
    assert_eq!(render.rgba[[1, 0, 0]], 0.75);
    assert!(render.rgba.iter().all(|&v| (0.0..=1.0).contains(&v)));
}

#[test]
fn test_pretty_shape_mismatch() {
    let err = pretty_redox(
        &Array2::zeros((2, 2)),
        &Array2::zeros((2, 3)),
        &grey_table(),
        0.0,
        1.0,
    )
    .unwrap_err();
    assert!(matches!(err, RedoxError::ShapeMismatch { .. }));
}

#[test]
fn test_intensity_stretch_is_inverted_and_clipped() {
    let total = Array2::from_shape_fn((10, 10), |(r, c)| (r * 10 + c + 1) as f32);
    let stretched = intensity_stretch(&total);

    assert_eq!(stretched.dim(), (10, 10));
    assert!(stretched.iter().all(|&v| (0.0..=1.0).contains(&v)));
    // Brightest pixel sits above p99 and saturates at 0; dimmest at 1.
    assert_eq!(stretched[[9, 9]], 0.0);
    assert_eq!(stretched[[0, 0]], 1.0);
    assert!(stretched[[2, 0]] > stretched[[7, 0]]);
}

#[test]
fn test_intensity_stretch_degenerate_is_zero() {
    assert!(intensity_stretch(&Array2::zeros((3, 3))).iter().all(|&v| v == 0.0));
    assert!(intensity_stretch(&Array2::from_elem((3, 3), 7.0))
        .iter()
        .all(|&v| v == 0.0));
}
