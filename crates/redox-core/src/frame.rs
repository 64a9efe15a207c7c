use std::fmt;
use std::path::PathBuf;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Fluorescence channel of a micrograph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Fad,
    Nadh,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Fad, Channel::Nadh];

    /// Name of the channel's sub-folder inside a session.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Fad => "FAD",
            Self::Nadh => "NADH",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Storage bit depth of a source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitDepth {
    Eight,
    Sixteen,
}

impl BitDepth {
    pub fn bits(self) -> u8 {
        match self {
            Self::Eight => 8,
            Self::Sixteen => 16,
        }
    }
}

/// A single-channel micrograph as loaded from a session.
///
/// Intensities are kept as raw detector counts in the 16-bit range; 8-bit
/// sources have already been expanded by the depth normalizer.
#[derive(Clone, Debug)]
pub struct ChannelImage {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<u16>,
    pub channel: Channel,
    /// Position of this image in the channel's sorted sequence
    pub index: usize,
    /// Bit depth of the acquired file, before any depth normalization
    pub bit_depth: BitDepth,
    pub source: PathBuf,
}

impl ChannelImage {
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Raw intensities as floating point, ready for calibration.
    pub fn to_f32(&self) -> Array2<f32> {
        self.data.mapv(f32::from)
    }
}

/// Translation that moves the FAD channel onto the NADH channel.
///
/// Positive `dy` moves content down, positive `dx` moves it right.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub dy: f64,
    pub dx: f64,
}

impl Shift {
    pub fn new(dy: f64, dx: f64) -> Self {
        Self { dy, dx }
    }

    pub fn is_zero(&self) -> bool {
        self.dy == 0.0 && self.dx == 0.0
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(dy={}, dx={})", self.dy, self.dx)
    }
}
