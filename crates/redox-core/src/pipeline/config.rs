use std::fmt;

use serde::{Deserialize, Serialize};

use crate::calibrate::CalibrationParams;
use crate::consts::{DEFAULT_BOTLIM, DEFAULT_LUT_SIZE, DEFAULT_UPLIM};
use crate::error::{RedoxError, Result};
use crate::ratio::RatioFormula;
use crate::render::ColorTable;

pub use crate::session::PairingPolicy;

/// Everything the driver needs to process one session.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub calibration: CalibrationParams,
    #[serde(default)]
    pub formula: RatioFormula,
    /// Also write a false-color rendering of each ratio map.
    #[serde(default)]
    pub pretty: bool,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub registration: RegistrationConfig,
    #[serde(default)]
    pub degenerate: DegeneratePolicy,
    #[serde(default)]
    pub pairing: PairingPolicy,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Ratio value drawn at the top end of the color table.
    pub botlim: f32,
    /// Ratio value drawn at the bottom end of the color table.
    pub uplim: f32,
    /// Number of jet samples when no explicit table is given.
    pub lut_size: usize,
    /// Explicit RGBA lookup table, overriding `lut_size`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lut: Option<ColorTable>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            botlim: DEFAULT_BOTLIM,
            uplim: DEFAULT_UPLIM,
            lut_size: DEFAULT_LUT_SIZE,
            lut: None,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<()> {
        let span = self.uplim - self.botlim;
        if !span.is_finite() || span == 0.0 {
            return Err(RedoxError::InvalidRenderBounds {
                botlim: self.botlim,
                uplim: self.uplim,
            });
        }
        Ok(())
    }

    pub fn color_table(&self) -> Result<ColorTable> {
        match &self.lut {
            Some(table) => Ok(table.clone()),
            None => ColorTable::jet(self.lut_size),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegistrationConfig {
    /// Register FAD onto NADH before computing the ratio.
    pub enabled: bool,
    /// Refine the correlation peak to fractional pixels.
    pub subpixel: bool,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            subpixel: false,
        }
    }
}

/// Handling of constant / zero-variance grids during normalization and registration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DegeneratePolicy {
    /// Skip the step: keep values unnormalized, or use a zero shift.
    ///
    /// Normalization is skipped for both channels together, so a pair with
    /// one constant channel yields the ratio of the gain/power corrected
    /// counts rather than mixing scales.
    #[default]
    Passthrough,
    /// Abort the run.
    Reject,
}

impl fmt::Display for DegeneratePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passthrough => write!(f, "Passthrough"),
            Self::Reject => write!(f, "Reject"),
        }
    }
}
