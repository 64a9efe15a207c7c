pub mod config;
mod helpers;
mod orchestrator;
mod types;

pub use helpers::{output_path, pair_label};
pub use orchestrator::{run_session, run_session_reported};
pub use types::{DriverState, PairOutcome, PipelineStage, ProgressReporter, RunOutput};
