use tracing::info;

use crate::error::{RedoxError, Result};
use crate::session::SessionPlan;

use super::config::RunConfig;
use super::helpers::process_pair;
use super::types::{DriverState, NoOpReporter, ProgressReporter, RunOutput};

/// Process every pair of a submitted session, in order.
///
/// The first failing pair aborts the run with [`RedoxError::PairFailed`];
/// outputs of earlier pairs are left on disk.
pub fn run_session_reported(
    plan: SessionPlan,
    config: &RunConfig,
    reporter: &dyn ProgressReporter,
) -> Result<RunOutput> {
    config.calibration.validate()?;
    let table = if config.pretty {
        config.render.validate()?;
        Some(config.render.color_table()?)
    } else {
        None
    };

    let SessionPlan { session, pairs } = plan;
    let total = pairs.len();
    reporter.state_changed(DriverState::Ready);
    info!(
        session = %session.root().display(),
        pairs = total,
        formula = %config.formula,
        pretty = config.pretty,
        "Processing session"
    );

    let mut outcomes = Vec::with_capacity(total);
    for pair in &pairs {
        reporter.state_changed(DriverState::Processing {
            index: pair.index,
            total,
        });
        let outcome = process_pair(pair, &session, config, table.as_ref(), reporter).map_err(
            |source| RedoxError::PairFailed {
                index: pair.index,
                source: Box::new(source),
            },
        )?;
        info!(
            index = pair.index,
            mean = outcome.summary.mean,
            iqr = outcome.summary.iqr,
            output = %outcome.ratio_path.display(),
            "Processed pair"
        );
        outcomes.push(outcome);
        reporter.advance(outcomes.len());
    }

    let results_dir = session.results_dir();
    let results_dir =
        std::fs::canonicalize(&results_dir).map_err(|e| RedoxError::fs(&results_dir, e))?;
    reporter.state_changed(DriverState::Done);
    info!(results = %results_dir.display(), "Session complete");

    Ok(RunOutput {
        results_dir,
        summary_path: session.summary_path(),
        pairs: outcomes,
    })
}

/// Process a submitted session without progress reporting.
pub fn run_session(plan: SessionPlan, config: &RunConfig) -> Result<RunOutput> {
    run_session_reported(plan, config, &NoOpReporter)
}
