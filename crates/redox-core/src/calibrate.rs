use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{RedoxError, Result};
use crate::frame::{Channel, ChannelImage};

/// Detector calibration scalars, one gain/power pair per channel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationParams {
    pub fad_gain: f32,
    pub nadh_gain: f32,
    pub fad_power: f32,
    pub nadh_power: f32,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            fad_gain: 1.0,
            nadh_gain: 1.0,
            fad_power: 0.0,
            nadh_power: 0.0,
        }
    }
}

impl CalibrationParams {
    /// Check `gain != 0` and `power >= 0` for both channels.
    pub fn validate(&self) -> Result<()> {
        for channel in Channel::ALL {
            let (gain, power) = self.for_channel(channel);
            if !gain.is_finite() || gain == 0.0 {
                return Err(RedoxError::InvalidCalibration(format!(
                    "{channel} gain must be finite and non-zero, got {gain}"
                )));
            }
            if !power.is_finite() || power < 0.0 {
                return Err(RedoxError::InvalidCalibration(format!(
                    "{channel} power must be finite and >= 0, got {power}"
                )));
            }
        }
        Ok(())
    }

    /// (gain, power) for one channel.
    pub fn for_channel(&self, channel: Channel) -> (f32, f32) {
        match channel {
            Channel::Fad => (self.fad_gain, self.fad_power),
            Channel::Nadh => (self.nadh_gain, self.nadh_power),
        }
    }
}

/// Convert raw intensities into gain/power normalized units.
///
/// `A / gain` when `power == 0`, otherwise `(A / power²) / gain`.
/// Non-finite results are rewritten to 0.
pub fn apply_gain_power(data: &Array2<f32>, gain: f32, power: f32) -> Result<Array2<f32>> {
    if gain == 0.0 {
        return Err(RedoxError::InvalidCalibration("gain must be non-zero".into()));
    }
    let divisor = if power == 0.0 {
        gain
    } else {
        power * power * gain
    };
    Ok(data.mapv(|v| sanitize(v / divisor)))
}

/// Calibrate a raw array and min-max normalize it to `[-1, 1]`.
///
/// A constant array has no range to normalize over and is reported as
/// [`RedoxError::DegenerateImage`].
pub fn calibrate_array(data: &Array2<f32>, gain: f32, power: f32) -> Result<Array2<f32>> {
    let calibrated = apply_gain_power(data, gain, power)?;
    normalize_signed(&calibrated)
}

/// Calibrate a loaded channel image with the channel's own parameters.
pub fn calibrate(image: &ChannelImage, params: &CalibrationParams) -> Result<Array2<f32>> {
    let (gain, power) = params.for_channel(image.channel);
    calibrate_array(&image.to_f32(), gain, power)
}

/// Min-max normalize to `[-1, 1]`.
pub fn normalize_signed(data: &Array2<f32>) -> Result<Array2<f32>> {
    min_max_normalize(data, -1.0, 1.0, "calibration")
}

/// Min-max normalize to `[0, 1]`.
pub fn normalize_unit(data: &Array2<f32>) -> Result<Array2<f32>> {
    min_max_normalize(data, 0.0, 1.0, "ratio normalization")
}

fn min_max_normalize(
    data: &Array2<f32>,
    lo: f32,
    hi: f32,
    stage: &'static str,
) -> Result<Array2<f32>> {
    let (min, max) = min_max(data)
        .ok_or_else(|| RedoxError::degenerate(stage, "image has no finite pixels"))?;
    let range = max - min;
    if range <= 0.0 {
        return Err(RedoxError::degenerate(
            stage,
            format!("constant image (value {min}), range is zero"),
        ));
    }
    let span = hi - lo;
    Ok(data.mapv(|v| (lo + span * (v - min) / range).clamp(lo, hi)))
}

/// Smallest and largest finite values, or `None` for an empty/all-NaN array.
pub fn min_max(data: &Array2<f32>) -> Option<(f32, f32)> {
    data.iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[inline]
pub(crate) fn sanitize(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}
