//! Summary statistics of a redox map and the per-session summary table.
//!
//! Zero entries mean "no signal" (background, pixels shifted in from outside
//! the field of view, sanitized singularities) and are excluded from every
//! statistic here.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use ndarray::Array2;
use num_traits::Float;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{RedoxError, Result};
use crate::ratio::{RatioFormula, RedoxMap};

const SUMMARY_HEADER: &str = "label,formula,mean,iqr";

/// Statistics of one processed image pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub image_index: usize,
    pub label: String,
    pub formula: RatioFormula,
    pub mean: f64,
    pub iqr: f64,
    /// Number of non-zero pixels the statistics were computed over.
    pub pixel_count: usize,
}

/// One row read back from a summary table.
#[derive(Clone, Debug, PartialEq)]
pub struct SummaryRow {
    pub label: String,
    pub formula: String,
    pub mean: f64,
    pub iqr: f64,
}

/// Percentile of sorted data with linear interpolation between closest ranks.
///
/// `q` is in `[0, 100]`. Returns `None` for empty input.
pub fn percentile<T: Float>(sorted: &[T], q: f64) -> Option<T> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let rank = (q.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac: T = num_traits::cast(rank - lo as f64)?;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Non-zero, finite entries of `data`, sorted ascending.
pub fn sorted_nonzero(data: &Array2<f32>) -> Vec<f64> {
    let mut values: Vec<f64> = data
        .iter()
        .filter(|v| **v != 0.0 && v.is_finite())
        .map(|&v| v as f64)
        .collect();
    values.sort_by(f64::total_cmp);
    values
}

/// Mean and interquartile range over the non-zero entries of `data`.
///
/// Returns `(mean, iqr, count)`; an all-zero grid yields `(0, 0, 0)`.
pub fn nonzero_mean_iqr(data: &Array2<f32>) -> (f64, f64, usize) {
    let values = sorted_nonzero(data);
    if values.is_empty() {
        return (0.0, 0.0, 0);
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let q1 = percentile(&values, 25.0).unwrap_or(0.0);
    let q3 = percentile(&values, 75.0).unwrap_or(0.0);
    (mean, q3 - q1, values.len())
}

/// Summarize one redox map.
pub fn summarize(map: &RedoxMap, image_index: usize, label: impl Into<String>) -> SummaryRecord {
    let label = label.into();
    let (mean, iqr, pixel_count) = nonzero_mean_iqr(&map.data);
    if pixel_count == 0 {
        warn!(label = %label, "Redox map has no non-zero pixels");
    }
    SummaryRecord {
        image_index,
        label,
        formula: map.formula,
        mean,
        iqr,
        pixel_count,
    }
}

/// Append one row to a summary table, writing the header if the file is new.
pub fn append_summary(path: &Path, record: &SummaryRecord) -> Result<()> {
    let is_new = !path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| RedoxError::fs(path, e))?;
    let mut writer = BufWriter::new(file);

    let write = |writer: &mut BufWriter<File>| -> std::io::Result<()> {
        if is_new {
            writeln!(writer, "{SUMMARY_HEADER}")?;
        }
        writeln!(
            writer,
            "{},{},{},{}",
            record.label,
            record.formula.name(),
            record.mean,
            record.iqr
        )?;
        writer.flush()
    };
    write(&mut writer).map_err(|e| RedoxError::fs(path, e))
}

/// Read every row of a summary table.
pub fn read_summary(path: &Path) -> Result<Vec<SummaryRow>> {
    let file = File::open(path).map_err(|e| RedoxError::fs(path, e))?;
    let mut rows = Vec::new();

    for line in BufReader::new(file).lines().skip(1) {
        let line = line.map_err(|e| RedoxError::fs(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        let [label, formula, mean, iqr] = fields[..] else {
            return Err(malformed(path, &line));
        };
        rows.push(SummaryRow {
            label: label.to_string(),
            formula: formula.to_string(),
            mean: mean.parse().map_err(|_| malformed(path, &line))?,
            iqr: iqr.parse().map_err(|_| malformed(path, &line))?,
        });
    }

    Ok(rows)
}

fn malformed(path: &Path, line: &str) -> RedoxError {
    RedoxError::fs(
        path,
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("malformed summary row: {line}"),
        ),
    )
}
