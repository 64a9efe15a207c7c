/// Factor that maps 8-bit samples onto the 16-bit range exactly (255 * 257 = 65535).
pub const EIGHT_TO_SIXTEEN_BIT: u16 = 257;

/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f64 = 1e-12;

/// Number of entries in the default false-color lookup table.
pub const DEFAULT_LUT_SIZE: usize = 64;

/// Percentile used as the "max" floor of the intensity stretch.
pub const INTENSITY_LOW_PERCENTILE: f64 = 1.0;

/// Percentile used as the "min" floor of the intensity stretch.
pub const INTENSITY_HIGH_PERCENTILE: f64 = 99.0;

/// Lower bound of the displayed ratio range.
pub const DEFAULT_BOTLIM: f32 = 0.0;

/// Upper bound of the displayed ratio range.
pub const DEFAULT_UPLIM: f32 = 1.0;

/// Directory holding the per-pair outputs of a session.
pub const RESULTS_DIR: &str = "results";

/// Per-session summary table, appended to after each pair.
pub const SUMMARY_FILE: &str = "redox_summary.csv";

/// Session folder naming, e.g. `2024-03-01_14-05-59`.
pub const SESSION_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Default parent folder for new sessions.
pub const DEFAULT_SESSIONS_ROOT: &str = "ImageAnalyzerASTJO";
