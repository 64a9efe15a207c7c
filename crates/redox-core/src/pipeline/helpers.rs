use std::path::{Path, PathBuf};

use ndarray::Array2;
use tracing::{debug, warn};

use crate::align::{register, shift_array, Registration};
use crate::calibrate::{apply_gain_power, normalize_signed, normalize_unit, CalibrationParams};
use crate::error::{RedoxError, Result};
use crate::frame::{Channel, ChannelImage};
use crate::io::image_io::{load_channel, save_ratio_tiff, save_rgba_image};
use crate::io::normalize_depth;
use crate::ratio::{compute_ratio, total_intensity, RatioFormula};
use crate::render::{pretty_redox, ColorTable};
use crate::session::{ImagePair, Session};
use crate::stats::{append_summary, summarize};

use super::config::{DegeneratePolicy, RunConfig};
use super::types::{PairOutcome, PipelineStage, ProgressReporter};

/// Base name shared by a pair's outputs and its summary row.
pub fn pair_label(index: usize) -> String {
    format!("redox_image_{index}")
}

/// Output file for a pair's ratio map, and for its pretty render.
pub fn output_path(results_dir: &Path, index: usize, formula: RatioFormula, pretty: bool) -> PathBuf {
    let suffix = if pretty { "_pretty" } else { "" };
    results_dir.join(format!(
        "{}_{}{suffix}.tif",
        pair_label(index),
        formula.slug()
    ))
}

/// Run `step`; under `Passthrough`, a degenerate-image error yields `fallback()` instead.
pub(super) fn tolerate_degenerate<T>(
    policy: DegeneratePolicy,
    step: Result<T>,
    fallback: impl FnOnce() -> T,
) -> Result<T> {
    match step {
        Err(RedoxError::DegenerateImage { stage, reason })
            if policy == DegeneratePolicy::Passthrough =>
        {
            warn!(stage, reason = %reason, "Degenerate image, skipping step");
            Ok(fallback())
        }
        other => other,
    }
}

/// Min-max normalize both channels with `normalize`.
///
/// Under `Passthrough`, if either channel is degenerate both are returned
/// unchanged, so the ratio never mixes a normalized channel with a raw one.
pub(super) fn normalize_pair(
    policy: DegeneratePolicy,
    fad: Array2<f32>,
    nadh: Array2<f32>,
    normalize: fn(&Array2<f32>) -> Result<Array2<f32>>,
) -> Result<(Array2<f32>, Array2<f32>)> {
    let both = normalize(&fad).and_then(|f| Ok((f, normalize(&nadh)?)));
    tolerate_degenerate(policy, both, || (fad, nadh))
}

/// Apply a channel's gain and power.
fn scale_channel(image: &ChannelImage, params: &CalibrationParams) -> Result<Array2<f32>> {
    let (gain, power) = params.for_channel(image.channel);
    apply_gain_power(&image.to_f32(), gain, power)
}

fn load_pair_channel(path: &Path, channel: Channel, index: usize) -> Result<ChannelImage> {
    let depth = normalize_depth(path)?;
    debug!(path = %path.display(), bits = depth.bits(), "Source bit depth");
    let mut image = load_channel(path, channel, index)?;
    image.bit_depth = depth;
    Ok(image)
}

/// Run the whole per-pair pipeline and persist its outputs.
pub(super) fn process_pair(
    pair: &ImagePair,
    session: &Session,
    config: &RunConfig,
    table: Option<&ColorTable>,
    reporter: &dyn ProgressReporter,
) -> Result<PairOutcome> {
    let policy = config.degenerate;

    reporter.begin_stage(PipelineStage::Loading);
    let fad_image = load_pair_channel(&pair.fad, Channel::Fad, pair.index)?;
    let nadh_image = load_pair_channel(&pair.nadh, Channel::Nadh, pair.index)?;
    if fad_image.data.dim() != nadh_image.data.dim() {
        return Err(RedoxError::ShapeMismatch {
            fad_width: fad_image.width(),
            fad_height: fad_image.height(),
            nadh_width: nadh_image.width(),
            nadh_height: nadh_image.height(),
        });
    }

    reporter.begin_stage(PipelineStage::Calibrating);
    let (fad, nadh) = normalize_pair(
        policy,
        scale_channel(&fad_image, &config.calibration)?,
        scale_channel(&nadh_image, &config.calibration)?,
        normalize_signed,
    )?;

    reporter.begin_stage(PipelineStage::Registering);
    let registration: Option<Registration> = if config.registration.enabled {
        tolerate_degenerate(
            policy,
            register(&fad, &nadh, config.registration.subpixel).map(Some),
            || None,
        )?
    } else {
        None
    };
    let aligned_fad = match &registration {
        Some(reg) => {
            debug!(index = pair.index, shift = %reg.shift, score = reg.score, "Registered FAD onto NADH");
            shift_array(&fad, &reg.shift)
        }
        None => fad,
    };

    reporter.begin_stage(PipelineStage::Computing);
    let total = total_intensity(&aligned_fad, &nadh)?;
    let (fad_unit, nadh_unit) = normalize_pair(policy, aligned_fad, nadh, normalize_unit)?;
    let redox = compute_ratio(&fad_unit, &nadh_unit, config.formula)?;

    let render = match table {
        Some(table) => {
            reporter.begin_stage(PipelineStage::Rendering);
            Some(pretty_redox(
                &redox.data,
                &total,
                table,
                config.render.botlim,
                config.render.uplim,
            )?)
        }
        None => None,
    };

    reporter.begin_stage(PipelineStage::Writing);
    let results_dir = session.results_dir();
    std::fs::create_dir_all(&results_dir).map_err(|e| RedoxError::fs(&results_dir, e))?;

    let ratio_path = output_path(&results_dir, pair.index, config.formula, false);
    save_ratio_tiff(&redox.data, &ratio_path)?;

    let pretty_path = match render {
        Some(render) => {
            let path = output_path(&results_dir, pair.index, config.formula, true);
            save_rgba_image(&render.rgba, &path)?;
            Some(path)
        }
        None => None,
    };

    let summary = summarize(&redox, pair.index, pair_label(pair.index));
    append_summary(&session.summary_path(), &summary)?;
    debug!(
        index = pair.index,
        mean = summary.mean,
        iqr = summary.iqr,
        pixels = summary.pixel_count,
        "Pair statistics"
    );

    Ok(PairOutcome {
        index: pair.index,
        registration,
        fad_depth: fad_image.bit_depth,
        nadh_depth: nadh_image.bit_depth,
        ratio_path,
        pretty_path,
        summary,
    })
}
