use approx::assert_abs_diff_eq;
use ndarray::{array, Array2};

use redox_core::ratio::{RatioFormula, RedoxMap};
use redox_core::stats::{
    append_summary, nonzero_mean_iqr, percentile, read_summary, summarize, SummaryRecord,
};

fn record(index: usize, mean: f64, iqr: f64) -> SummaryRecord {
    SummaryRecord {
        image_index: index,
        label: format!("redox_image_{index}"),
        formula: RatioFormula::NadhOverSum,
        mean,
        iqr,
        pixel_count: 4,
    }
}

#[test]
fn test_zeros_are_excluded() {
    let data = array![[0.0f32, 0.0, 2.0, 4.0, 6.0]];
    let (mean, iqr, count) = nonzero_mean_iqr(&data);
    assert_abs_diff_eq!(mean, 4.0);
    assert_abs_diff_eq!(iqr, 2.0);
    assert_eq!(count, 3);
}

#[test]
fn test_all_zero_grid() {
    assert_eq!(nonzero_mean_iqr(&Array2::zeros((3, 3))), (0.0, 0.0, 0));
}

#[test]
fn test_percentile_interpolates() {
    let sorted = [1.0f64, 2.0, 3.0, 4.0];
    assert_abs_diff_eq!(percentile(&sorted, 25.0).unwrap(), 1.75);
    assert_abs_diff_eq!(percentile(&sorted, 50.0).unwrap(), 2.5);
    assert_abs_diff_eq!(percentile(&sorted, 100.0).unwrap(), 4.0);
    assert_eq!(percentile::<f64>(&[], 50.0), None);
}

#[test]
fn test_summarize_map() {
    let map = RedoxMap {
        data: array![[0.0f32, 1.0], [3.0, 0.0]],
        formula: RatioFormula::FadOverNadh,
    };
    let summary = summarize(&map, 2, "redox_image_2");
    assert_eq!(summary.image_index, 2);
    assert_eq!(summary.label, "redox_image_2");
    assert_eq!(summary.formula, RatioFormula::FadOverNadh);
    assert_abs_diff_eq!(summary.mean, 2.0);
    assert_abs_diff_eq!(summary.iqr, 1.0);
    assert_eq!(summary.pixel_count, 2);
}

#[test]
fn test_append_writes_header_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("redox_summary.csv");

    append_summary(&path, &record(0, 0.5, 0.125)).unwrap();
    append_summary(&path, &record(1, 0.75, 0.0)).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "label,formula,mean,iqr");
    assert_eq!(lines[1], "redox_image_0,NADH/(FAD+NADH),0.5,0.125");
    assert_eq!(text.matches("label,formula").count(), 1);
}

#[test]
fn test_read_back_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("redox_summary.csv");
    append_summary(&path, &record(0, 1.25, 0.5)).unwrap();
    append_summary(&path, &record(1, 2.5, 0.0)).unwrap();

    let rows = read_summary(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].label, "redox_image_1");
    assert_eq!(rows[1].formula, "NADH/(FAD+NADH)");
    assert_abs_diff_eq!(rows[0].mean, 1.25);
    assert_abs_diff_eq!(rows[0].iqr, 0.5);
}

#[test]
fn test_malformed_row_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    std::fs::write(&path, "label,formula,mean,iqr\nonly,three,fields\n").unwrap();
    assert!(read_summary(&path).is_err());
}
