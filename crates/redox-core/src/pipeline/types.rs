use std::path::PathBuf;

use crate::align::Registration;
use crate::frame::BitDepth;
use crate::stats::SummaryRecord;

/// Per-pair processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Loading,
    Calibrating,
    Registering,
    Computing,
    Rendering,
    Writing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading images"),
            Self::Calibrating => write!(f, "Calibrating"),
            Self::Registering => write!(f, "Registering"),
            Self::Computing => write!(f, "Computing ratio"),
            Self::Rendering => write!(f, "Rendering"),
            Self::Writing => write!(f, "Writing output"),
        }
    }
}

/// Where the driver is in a run. Staging files into a session happens
/// before the driver is involved, so a run starts at `Ready`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Ready,
    Processing { index: usize, total: usize },
    Done,
}

/// Outputs of one processed pair.
#[derive(Clone, Debug)]
pub struct PairOutcome {
    pub index: usize,
    pub registration: Option<Registration>,
    /// Source bit depths before normalization.
    pub fad_depth: BitDepth,
    pub nadh_depth: BitDepth,
    pub ratio_path: PathBuf,
    pub pretty_path: Option<PathBuf>,
    pub summary: SummaryRecord,
}

/// Outputs of a completed session run.
#[derive(Clone, Debug)]
pub struct RunOutput {
    /// Absolute path of the session's results folder.
    pub results_dir: PathBuf,
    pub summary_path: PathBuf,
    pub pairs: Vec<PairOutcome>,
}

/// Progress reporting for the driver.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter {
    /// The driver moved to a new lifecycle state.
    fn state_changed(&self, _state: DriverState) {}

    /// A stage of the current pair has started.
    fn begin_stage(&self, _stage: PipelineStage) {}

    /// One pair has been fully processed; `pairs_done` counts completed pairs.
    fn advance(&self, _pairs_done: usize) {}
}

/// No-op progress reporter, used when `run_session` delegates.
pub(super) struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
