use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

use crate::align::ncc::check_shapes;
use crate::calibrate::sanitize;
use crate::error::{RedoxError, Result};

/// Pixel-wise combination of the two calibrated channels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RatioFormula {
    #[default]
    #[serde(rename = "NADH/FAD", alias = "NADH_div_FAD")]
    NadhOverFad,
    #[serde(rename = "NADH/(FAD+NADH)", alias = "NADH_div_FAD_NADH")]
    NadhOverSum,
    #[serde(rename = "FAD/NADH", alias = "FAD_div_NADH")]
    FadOverNadh,
    #[serde(rename = "FAD/(NADH+FAD)", alias = "FAD_div_NADH_FAD")]
    FadOverSum,
}

impl RatioFormula {
    pub const ALL: [RatioFormula; 4] = [
        RatioFormula::NadhOverFad,
        RatioFormula::NadhOverSum,
        RatioFormula::FadOverNadh,
        RatioFormula::FadOverSum,
    ];

    /// Human-readable form, e.g. `NADH/(FAD+NADH)`.
    pub fn name(self) -> &'static str {
        match self {
            Self::NadhOverFad => "NADH/FAD",
            Self::NadhOverSum => "NADH/(FAD+NADH)",
            Self::FadOverNadh => "FAD/NADH",
            Self::FadOverSum => "FAD/(NADH+FAD)",
        }
    }

    /// File-name safe form, e.g. `NADH_div_FAD_NADH`.
    pub fn slug(self) -> &'static str {
        match self {
            Self::NadhOverFad => "NADH_div_FAD",
            Self::NadhOverSum => "NADH_div_FAD_NADH",
            Self::FadOverNadh => "FAD_div_NADH",
            Self::FadOverSum => "FAD_div_NADH_FAD",
        }
    }

    /// Evaluate the formula for one pixel. May return NaN or ±Inf.
    #[inline]
    pub fn eval(self, fad: f32, nadh: f32) -> f32 {
        match self {
            Self::NadhOverFad => nadh / fad,
            Self::NadhOverSum => nadh / (fad + nadh),
            Self::FadOverNadh => fad / nadh,
            Self::FadOverSum => fad / (nadh + fad),
        }
    }
}

impl fmt::Display for RatioFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RatioFormula {
    type Err = RedoxError;

    /// Accepts either the display name or the slug, ignoring case and spaces.
    fn from_str(s: &str) -> Result<Self> {
        let wanted: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        Self::ALL
            .into_iter()
            .find(|f| {
                f.name().eq_ignore_ascii_case(&wanted) || f.slug().eq_ignore_ascii_case(&wanted)
            })
            .ok_or_else(|| RedoxError::UnknownFormula(s.to_string()))
    }
}

/// Output of the ratio engine. Every entry is finite.
#[derive(Clone, Debug)]
pub struct RedoxMap {
    pub data: Array2<f32>,
    pub formula: RatioFormula,
}

/// Apply `formula` element-wise; NaN and ±Inf results become 0.
pub fn compute_ratio(
    fad: &Array2<f32>,
    nadh: &Array2<f32>,
    formula: RatioFormula,
) -> Result<RedoxMap> {
    check_shapes(fad, nadh)?;
    let data = Zip::from(fad)
        .and(nadh)
        .map_collect(|&f, &n| sanitize(formula.eval(f, n)));
    Ok(RedoxMap { data, formula })
}

/// Pixel sum of the aligned FAD and NADH calibrated grids.
pub fn total_intensity(fad: &Array2<f32>, nadh: &Array2<f32>) -> Result<Array2<f32>> {
    check_shapes(fad, nadh)?;
    Ok(fad + nadh)
}
