#[allow(dead_code)]
mod common;

use std::cell::RefCell;

use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use ndarray::Array2;

use redox_core::calibrate::CalibrationParams;
use redox_core::error::RedoxError;
use redox_core::frame::{BitDepth, Channel};
use redox_core::io::load_ratio_tiff;
use redox_core::pipeline::config::{DegeneratePolicy, RunConfig};
use redox_core::pipeline::{run_session, run_session_reported, DriverState, ProgressReporter};
use redox_core::ratio::RatioFormula;
use redox_core::session::{PairingPolicy, Session};
use redox_core::stats::read_summary;

fn new_session(root: &std::path::Path) -> Session {
    let stamp = NaiveDate::from_ymd_opt(2024, 5, 17)
        .unwrap()
        .and_hms_opt(10, 20, 30)
        .unwrap();
    Session::create(root, stamp).unwrap()
}

/// Write a source image next to the session and stage it.
fn stage16(session: &Session, scratch: &std::path::Path, channel: Channel, name: &str, data: &Array2<u16>) {
    let path = scratch.join(name);
    common::write_gray16(&path, data);
    session.stage_file(channel, &path).unwrap();
}

#[test]
fn test_constant_pair_gives_plain_ratio() {
    let root = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let session = new_session(root.path());

    stage16(&session, scratch.path(), Channel::Fad, "fad.tif", &Array2::from_elem((4, 4), 1000));
    stage16(&session, scratch.path(), Channel::Nadh, "nadh.tif", &Array2::from_elem((4, 4), 3000));

    let plan = session.submit(PairingPolicy::Strict).unwrap();
    let output = run_session(plan, &RunConfig::default()).unwrap();

    assert_eq!(output.pairs.len(), 1);
    assert!(output.results_dir.is_absolute());
    let outcome = &output.pairs[0];
    assert!(outcome.registration.is_none());
    assert!(outcome.pretty_path.is_none());
    assert_eq!(
        outcome.ratio_path.file_name().unwrap(),
        "redox_image_0_NADH_div_FAD.tif"
    );

    let ratio = load_ratio_tiff(&outcome.ratio_path).unwrap();
    assert_eq!(ratio.dim(), (4, 4));
    for &v in ratio.iter() {
        assert_abs_diff_eq!(v, 3.0, epsilon = 1e-5);
    }

    let rows = read_summary(&output.summary_path).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].label, "redox_image_0");
    assert_eq!(rows[0].formula, "NADH/FAD");
    assert_abs_diff_eq!(rows[0].mean, 3.0, epsilon = 1e-5);
    assert_abs_diff_eq!(rows[0].iqr, 0.0, epsilon = 1e-5);

    let results: Vec<_> = std::fs::read_dir(session.results_dir()).unwrap().collect();
    assert_eq!(results.len(), 1);
}

#[test]
fn test_constant_pair_rejected_when_strict() {
    let root = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let session = new_session(root.path());
    stage16(&session, scratch.path(), Channel::Fad, "fad.tif", &Array2::from_elem((4, 4), 1000));
    stage16(&session, scratch.path(), Channel::Nadh, "nadh.tif", &Array2::from_elem((4, 4), 3000));

    let config = RunConfig {
        degenerate: DegeneratePolicy::Reject,
        ..RunConfig::default()
    };
    let err = run_session(session.submit(PairingPolicy::Strict).unwrap(), &config).unwrap_err();
    let RedoxError::PairFailed { index, source } = err else {
        panic!("expected PairFailed, got {err}");
    };
    assert_eq!(index, 0);
    assert!(matches!(*source, RedoxError::DegenerateImage { .. }));
}

#[test]
fn test_misaligned_pair_with_pretty_output() {
    let root = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let session = new_session(root.path());

    let centres = [(10.0, 12.0), (22.0, 8.0), (16.0, 24.0)];
    let pattern = common::blob_pattern(32, 32, &centres);
    let shifted = common::translate(&pattern, 2, -3);
    for i in 1..=2 {
        stage16(&session, scratch.path(), Channel::Fad, &format!("fad_{i}.tif"), &common::to_counts(&pattern, 200, 20000.0));
        stage16(&session, scratch.path(), Channel::Nadh, &format!("nadh_{i}.tif"), &common::to_counts(&shifted, 400, 30000.0));
    }

    let config = RunConfig {
        formula: RatioFormula::NadhOverSum,
        pretty: true,
        calibration: CalibrationParams {
            fad_gain: 2.0,
            nadh_gain: 1.5,
            fad_power: 5.0,
            nadh_power: 5.0,
        },
        ..RunConfig::default()
    };
    let output = run_session(session.submit(PairingPolicy::Strict).unwrap(), &config).unwrap();
    assert_eq!(output.pairs.len(), 2);

    for (i, outcome) in output.pairs.iter().enumerate() {
        let reg = outcome.registration.expect("textured images register");
        assert_abs_diff_eq!(reg.shift.dy, 2.0);
        assert_abs_diff_eq!(reg.shift.dx, -3.0);

        let pretty = outcome.pretty_path.as_ref().unwrap();
        assert_eq!(
            pretty.file_name().unwrap().to_string_lossy(),
            format!("redox_image_{i}_NADH_div_FAD_NADH_pretty.tif")
        );
        let img = image::open(pretty).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (32, 32));

        let ratio = load_ratio_tiff(&outcome.ratio_path).unwrap();
        assert!(ratio.iter().all(|v| v.is_finite()));
    }

    let rows = read_summary(&output.summary_path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].label, "redox_image_1");
}

#[test]
fn test_eight_bit_sources_are_promoted() {
    let root = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let session = new_session(root.path());

    let fad = scratch.path().join("fad.png");
    let nadh = scratch.path().join("nadh.png");
    common::write_gray8(&fad, &Array2::from_elem((3, 5), 50));
    common::write_gray8(&nadh, &Array2::from_elem((3, 5), 100));
    let staged = session.stage_file(Channel::Fad, &fad).unwrap();
    session.stage_file(Channel::Nadh, &nadh).unwrap();

    let config = RunConfig {
        formula: RatioFormula::FadOverNadh,
        ..RunConfig::default()
    };
    let output = run_session(session.submit(PairingPolicy::Strict).unwrap(), &config).unwrap();

    let promoted = image::open(&staged).unwrap();
    assert_eq!(promoted.color(), image::ColorType::L16);
    assert_eq!(output.pairs[0].fad_depth, BitDepth::Eight);
    assert_eq!(output.pairs[0].nadh_depth, BitDepth::Eight);
    let ratio = load_ratio_tiff(&output.pairs[0].ratio_path).unwrap();
    for &v in ratio.iter() {
        assert_abs_diff_eq!(v, 0.5, epsilon = 1e-5);
    }
}

#[test]
fn test_jpeg_and_bmp_sources_run() {
    let root = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let session = new_session(root.path());

    let fad = scratch.path().join("fad.jpg");
    let nadh = scratch.path().join("nadh.bmp");
    common::write_gray8(&fad, &Array2::from_elem((8, 8), 60));
    common::write_gray8(&nadh, &Array2::from_elem((8, 8), 120));
    session.stage_file(Channel::Fad, &fad).unwrap();
    session.stage_file(Channel::Nadh, &nadh).unwrap();

    let output = run_session(session.submit(PairingPolicy::Strict).unwrap(), &RunConfig::default())
        .unwrap();
    let outcome = &output.pairs[0];
    assert_eq!(outcome.fad_depth, BitDepth::Eight);
    assert_eq!(outcome.nadh_depth, BitDepth::Eight);

    // JPEG may shift a flat block by a level or two.
    let ratio = load_ratio_tiff(&outcome.ratio_path).unwrap();
    for &v in ratio.iter() {
        assert_abs_diff_eq!(v, 2.0, epsilon = 0.1);
    }
}

#[test]
fn test_one_constant_channel_keeps_common_scale() {
    let root = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let session = new_session(root.path());

    let nadh = Array2::from_shape_fn((4, 4), |(r, c)| 1000 + 100 * (r * 4 + c) as u16);
    stage16(&session, scratch.path(), Channel::Fad, "fad.tif", &Array2::from_elem((4, 4), 1000));
    stage16(&session, scratch.path(), Channel::Nadh, "nadh.tif", &nadh);

    let output = run_session(session.submit(PairingPolicy::Strict).unwrap(), &RunConfig::default())
        .unwrap();
    assert!(output.pairs[0].registration.is_none());

    let ratio = load_ratio_tiff(&output.pairs[0].ratio_path).unwrap();
    for (&v, &n) in ratio.iter().zip(nadh.iter()) {
        assert_abs_diff_eq!(v, n as f32 / 1000.0, epsilon = 1e-5);
    }
}

#[test]
fn test_shape_mismatch_fails_pair() {
    let root = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let session = new_session(root.path());
    stage16(&session, scratch.path(), Channel::Fad, "fad.tif", &Array2::from_elem((4, 4), 10));
    stage16(&session, scratch.path(), Channel::Nadh, "nadh.tif", &Array2::from_elem((4, 5), 10));

    let err = run_session(session.submit(PairingPolicy::Strict).unwrap(), &RunConfig::default())
        .unwrap_err();
    assert!(matches!(
        err,
        RedoxError::PairFailed { index: 0, ref source } if matches!(**source, RedoxError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_summary_accumulates_across_runs() {
    let root = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let session = new_session(root.path());
    stage16(&session, scratch.path(), Channel::Fad, "fad.tif", &Array2::from_elem((2, 2), 100));
    stage16(&session, scratch.path(), Channel::Nadh, "nadh.tif", &Array2::from_elem((2, 2), 200));

    let config = RunConfig::default();
    run_session(session.submit(PairingPolicy::Strict).unwrap(), &config).unwrap();
    run_session(session.submit(PairingPolicy::Strict).unwrap(), &config).unwrap();

    let rows = read_summary(&session.summary_path()).unwrap();
    assert_eq!(rows.len(), 2);
}

#[derive(Default)]
struct RecordingReporter {
    states: RefCell<Vec<DriverState>>,
    advanced: RefCell<Vec<usize>>,
}

impl ProgressReporter for RecordingReporter {
    fn state_changed(&self, state: DriverState) {
        self.states.borrow_mut().push(state);
    }

    fn advance(&self, pairs_done: usize) {
        self.advanced.borrow_mut().push(pairs_done);
    }
}

#[test]
fn test_reporter_sees_lifecycle() {
    let root = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let session = new_session(root.path());
    for i in 1..=2 {
        stage16(&session, scratch.path(), Channel::Fad, &format!("f_{i}.tif"), &Array2::from_elem((2, 2), 10));
        stage16(&session, scratch.path(), Channel::Nadh, &format!("n_{i}.tif"), &Array2::from_elem((2, 2), 20));
    }

    let reporter = RecordingReporter::default();
    run_session_reported(
        session.submit(PairingPolicy::Strict).unwrap(),
        &RunConfig::default(),
        &reporter,
    )
    .unwrap();

    assert_eq!(
        *reporter.states.borrow(),
        [
            DriverState::Ready,
            DriverState::Processing { index: 0, total: 2 },
            DriverState::Processing { index: 1, total: 2 },
            DriverState::Done,
        ]
    );
    assert_eq!(*reporter.advanced.borrow(), [1, 2]);
}
