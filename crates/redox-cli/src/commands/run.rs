use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use redox_core::consts::DEFAULT_SESSIONS_ROOT;
use redox_core::pipeline::config::{DegeneratePolicy, PairingPolicy, RunConfig};
use redox_core::pipeline::{run_session_reported, DriverState, PipelineStage, ProgressReporter};
use redox_core::ratio::RatioFormula;
use redox_core::session::Session;
use tracing::debug;

use crate::summary::{print_run_results, print_run_summary};

#[derive(Clone, Copy, ValueEnum)]
pub enum DegenerateArg {
    Passthrough,
    Reject,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PairingArg {
    Strict,
    Truncate,
}

#[derive(Args)]
pub struct RunArgs {
    /// Session directory
    #[arg(required_unless_present = "latest")]
    pub session: Option<PathBuf>,

    /// Use the most recent session under --root
    #[arg(long, conflicts_with = "session")]
    pub latest: bool,

    /// Directory holding all sessions (with --latest)
    #[arg(long, default_value = DEFAULT_SESSIONS_ROOT)]
    pub root: PathBuf,

    /// Run config file (TOML); flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// FAD detector gain
    #[arg(long)]
    pub fad_gain: Option<f32>,

    /// NADH detector gain
    #[arg(long)]
    pub nadh_gain: Option<f32>,

    /// FAD laser power (0 = no power correction)
    #[arg(long)]
    pub fad_power: Option<f32>,

    /// NADH laser power (0 = no power correction)
    #[arg(long)]
    pub nadh_power: Option<f32>,

    /// Ratio formula, e.g. "NADH/FAD" or "FAD_div_NADH_FAD"
    #[arg(long)]
    pub formula: Option<String>,

    /// Also write a false-color rendering of each ratio map
    #[arg(long)]
    pub pretty: bool,

    /// Skip FAD-onto-NADH registration
    #[arg(long)]
    pub no_register: bool,

    /// Refine the registration shift to fractional pixels
    #[arg(long)]
    pub subpixel: bool,

    /// Handling of constant images
    #[arg(long, value_enum)]
    pub degenerate: Option<DegenerateArg>,

    /// Handling of unequal FAD/NADH image counts
    #[arg(long, value_enum)]
    pub pairing: Option<PairingArg>,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let config = build_config(args)?;

    let session = match (&args.session, args.latest) {
        (Some(path), _) => Session::open(path)?,
        (None, true) => Session::latest(&args.root)?
            .with_context(|| format!("No sessions found under {}", args.root.display()))?,
        (None, false) => bail!("Specify a session directory or --latest"),
    };

    let plan = session
        .submit(config.pairing)
        .with_context(|| format!("Failed to collect images from {}", session.root().display()))?;

    print_run_summary(&config, &plan);

    let reporter = BarReporter::new(plan.pairs.len() as u64)?;
    let output = run_session_reported(plan, &config, &reporter)?;
    reporter.bar.finish_with_message("Done");

    print_run_results(&output);
    Ok(())
}

fn build_config(args: &RunArgs) -> Result<RunConfig> {
    let mut config: RunConfig = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid run config")?
    } else {
        RunConfig::default()
    };

    let calibration = &mut config.calibration;
    if let Some(v) = args.fad_gain {
        calibration.fad_gain = v;
    }
    if let Some(v) = args.nadh_gain {
        calibration.nadh_gain = v;
    }
    if let Some(v) = args.fad_power {
        calibration.fad_power = v;
    }
    if let Some(v) = args.nadh_power {
        calibration.nadh_power = v;
    }

    if let Some(ref formula) = args.formula {
        config.formula = formula.parse::<RatioFormula>()?;
    }
    if args.pretty {
        config.pretty = true;
    }
    if args.no_register {
        config.registration.enabled = false;
    }
    if args.subpixel {
        config.registration.subpixel = true;
    }
    if let Some(degenerate) = args.degenerate {
        config.degenerate = match degenerate {
            DegenerateArg::Passthrough => DegeneratePolicy::Passthrough,
            DegenerateArg::Reject => DegeneratePolicy::Reject,
        };
    }
    if let Some(pairing) = args.pairing {
        config.pairing = match pairing {
            PairingArg::Strict => PairingPolicy::Strict,
            PairingArg::Truncate => PairingPolicy::Truncate,
        };
    }

    config.calibration.validate()?;
    debug!(config = ?config, "Effective run config");
    Ok(config)
}

/// Drives an indicatif bar from driver progress callbacks.
struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    fn new(total: u64) -> Result<Self> {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:8} {msg:16} [{bar:40}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        Ok(Self { bar })
    }
}

impl ProgressReporter for BarReporter {
    fn state_changed(&self, state: DriverState) {
        if let DriverState::Processing { index, .. } = state {
            self.bar.set_prefix(format!("pair {index}"));
        }
    }

    fn begin_stage(&self, stage: PipelineStage) {
        self.bar.set_message(stage.to_string());
    }

    fn advance(&self, pairs_done: usize) {
        self.bar.set_position(pairs_done as u64);
    }
}
