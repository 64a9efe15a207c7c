use redox_core::pipeline::config::{DegeneratePolicy, PairingPolicy, RenderConfig, RunConfig};
use redox_core::ratio::RatioFormula;
use redox_core::render::ColorTable;

#[test]
fn test_defaults() {
    let config = RunConfig::default();
    assert_eq!(config.calibration.fad_gain, 1.0);
    assert_eq!(config.calibration.nadh_power, 0.0);
    assert_eq!(config.formula, RatioFormula::NadhOverFad);
    assert!(!config.pretty);
    assert_eq!(config.render.botlim, 0.0);
    assert_eq!(config.render.uplim, 1.0);
    assert_eq!(config.render.lut_size, 64);
    assert!(config.registration.enabled);
    assert!(!config.registration.subpixel);
    assert_eq!(config.degenerate, DegeneratePolicy::Passthrough);
    assert_eq!(config.pairing, PairingPolicy::Strict);
}

#[test]
fn test_partial_toml_fills_defaults() {
    let text = r#"
        formula = "NADH/(FAD+NADH)"
        pretty = true
        degenerate = "Reject"

        [calibration]
        fad_gain = 2.5
        nadh_gain = 1.5
        fad_power = 5.0
        nadh_power = 5.0
    "#;
    let config: RunConfig = toml::from_str(text).unwrap();
    assert_eq!(config.formula, RatioFormula::NadhOverSum);
    assert!(config.pretty);
    assert_eq!(config.degenerate, DegeneratePolicy::Reject);
    assert_eq!(config.calibration.fad_gain, 2.5);
    assert_eq!(config.render.lut_size, 64);
    assert!(config.registration.enabled);
}

#[test]
fn test_formula_slug_alias() {
    let config: RunConfig = toml::from_str(r#"formula = "FAD_div_NADH_FAD""#).unwrap();
    assert_eq!(config.formula, RatioFormula::FadOverSum);
}

#[test]
fn test_toml_roundtrip() {
    let mut config = RunConfig::default();
    config.formula = RatioFormula::FadOverNadh;
    config.pairing = PairingPolicy::Truncate;
    config.render.uplim = 2.0;

    let text = toml::to_string_pretty(&config).unwrap();
    let back: RunConfig = toml::from_str(&text).unwrap();
    assert_eq!(back.formula, RatioFormula::FadOverNadh);
    assert_eq!(back.pairing, PairingPolicy::Truncate);
    assert_eq!(back.render.uplim, 2.0);
    assert!(back.render.lut.is_none());
}

#[test]
fn test_explicit_lut_from_json() {
    let json = r#"{
        "render": {
            "botlim": 0.2,
            "uplim": 0.8,
            "lut_size": 64,
            "lut": [[0.0, 0.0, 0.0, 1.0], [1.0, 1.0, 1.0, 1.0]]
        }
    }"#;
    let config: RunConfig = serde_json::from_str(json).unwrap();
    let table = config.render.color_table().unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.get(1), Some(&[1.0, 1.0, 1.0, 1.0]));
}

#[test]
fn test_short_lut_rejected() {
    let json = r#"{"render": {"botlim": 0.0, "uplim": 1.0, "lut_size": 64, "lut": [[0.0, 0.0, 0.0, 1.0]]}}"#;
    assert!(serde_json::from_str::<RunConfig>(json).is_err());
}

#[test]
fn test_render_validation() {
    let render = RenderConfig {
        botlim: 1.0,
        uplim: 1.0,
        ..RenderConfig::default()
    };
    assert!(render.validate().is_err());
    assert!(RenderConfig::default().validate().is_ok());
    assert_eq!(
        RenderConfig::default().color_table().unwrap(),
        ColorTable::jet(64).unwrap()
    );
}
