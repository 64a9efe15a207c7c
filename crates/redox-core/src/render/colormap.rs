use serde::{Deserialize, Serialize};

use crate::error::{RedoxError, Result};

/// RGBA color with components in `[0, 1]`.
pub type Rgba = [f32; 4];

/// Ordered lookup table used for false-color rendering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Rgba>", into = "Vec<Rgba>")]
pub struct ColorTable {
    entries: Vec<Rgba>,
}

/// Piecewise-linear control points `(x, value)` of the jet colormap.
const JET_RED: &[(f32, f32)] = &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)];
const JET_GREEN: &[(f32, f32)] = &[
    (0.0, 0.0),
    (0.125, 0.0),
    (0.375, 1.0),
    (0.64, 1.0),
    (0.91, 0.0),
    (1.0, 0.0),
];
const JET_BLUE: &[(f32, f32)] = &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)];

impl ColorTable {
    /// Build a table from explicit entries; at least two are required.
    pub fn new(entries: Vec<Rgba>) -> Result<Self> {
        if entries.len() < 2 {
            return Err(RedoxError::InvalidColorTable(format!(
                "need at least 2 entries, got {}",
                entries.len()
            )));
        }
        if entries.iter().flatten().any(|c| !c.is_finite()) {
            return Err(RedoxError::InvalidColorTable(
                "entries must be finite".into(),
            ));
        }
        Ok(Self { entries })
    }

    /// `n` evenly spaced samples of the blue-cyan-yellow-red jet colormap.
    pub fn jet(n: usize) -> Result<Self> {
        if n < 2 {
            return Self::new(Vec::new());
        }
        let entries = (0..n)
            .map(|i| {
                let x = i as f32 / (n - 1) as f32;
                [
                    interpolate(JET_RED, x),
                    interpolate(JET_GREEN, x),
                    interpolate(JET_BLUE, x),
                    1.0,
                ]
            })
            .collect();
        Self::new(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Largest valid index.
    pub fn bit_scale(&self) -> usize {
        self.entries.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Rgba> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[Rgba] {
        &self.entries
    }
}

impl TryFrom<Vec<Rgba>> for ColorTable {
    type Error = RedoxError;

    fn try_from(entries: Vec<Rgba>) -> Result<Self> {
        Self::new(entries)
    }
}

impl From<ColorTable> for Vec<Rgba> {
    fn from(table: ColorTable) -> Self {
        table.entries
    }
}

fn interpolate(points: &[(f32, f32)], x: f32) -> f32 {
    for pair in points.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if x <= x1 {
            let t = if x1 > x0 { (x - x0) / (x1 - x0) } else { 0.0 };
            return y0 + (y1 - y0) * t.clamp(0.0, 1.0);
        }
    }
    points.last().map_or(0.0, |p| p.1)
}
