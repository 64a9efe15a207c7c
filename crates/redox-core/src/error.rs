use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RedoxError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Filesystem error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Image format error: {0}")]
    Image(#[from] image::ImageError),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("Unsupported sample type in {path}: {color}")]
    UnsupportedBitDepth { path: PathBuf, color: String },

    #[error("Channel shape mismatch: FAD is {fad_width}x{fad_height}, NADH is {nadh_width}x{nadh_height}")]
    ShapeMismatch {
        fad_width: usize,
        fad_height: usize,
        nadh_width: usize,
        nadh_height: usize,
    },

    #[error("Degenerate image during {stage}: {reason}")]
    DegenerateImage { stage: &'static str, reason: String },

    #[error("Unknown ratio formula: {0}")]
    UnknownFormula(String),

    #[error("Invalid calibration: {0}")]
    InvalidCalibration(String),

    #[error("Invalid render bounds: botlim={botlim}, uplim={uplim}")]
    InvalidRenderBounds { botlim: f32, uplim: f32 },

    #[error("Invalid color table: {0}")]
    InvalidColorTable(String),

    #[error("Channel file count mismatch: {fad} FAD vs {nadh} NADH")]
    ChannelCountMismatch { fad: usize, nadh: usize },

    #[error("Session has no image pairs: {0}")]
    EmptySession(PathBuf),

    #[error("No sequence index in file name: {0}")]
    MissingSequenceIndex(PathBuf),

    #[error("Pair {index} failed: {source}")]
    PairFailed {
        index: usize,
        #[source]
        source: Box<RedoxError>,
    },
}

impl RedoxError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn degenerate(stage: &'static str, reason: impl Into<String>) -> Self {
        Self::DegenerateImage {
            stage,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RedoxError>;
