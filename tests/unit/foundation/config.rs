use serde_json::json;

use super::*;

#[test]
fn defaults_match_current_policy() {
    let cfg = AvatarConfig::default();
    assert_eq!(cfg.derivation, DerivationConfig::current());
    assert_eq!(cfg.derivation.precision, 1000);
    assert_eq!(cfg.derivation.min_hair_brightness, 60.0);
    assert_eq!(cfg.derivation.hair_hue, HairHuePolicy::MatchBody);
    assert_eq!(cfg.compose.canvas_size, 1080);
    assert_eq!(cfg.compose.light_dark_switch, 30);
    assert_eq!(cfg.compose.dark_white_fallback.to_html(true), "#9CA2AF");
    assert_eq!(cfg.raster.min_size, 100);
    assert_eq!(cfg.raster.max_size, 1000);
    cfg.validate().unwrap();
}

#[test]
fn legacy_profile_differs_only_where_expected() {
    let legacy = DerivationConfig::legacy();
    assert_eq!(legacy.precision, 10_000);
    assert_eq!(legacy.min_hair_brightness, 40.0);
    assert_eq!(legacy.blue_solve_weight, BlueSolveWeight::Green);
    assert_eq!(
        legacy.hair_hue,
        HairHuePolicy::Complementary { half_width: 90.0 }
    );
    assert_eq!(legacy.min_total_saturation, 60.0);
    legacy.validate().unwrap();
}

#[test]
fn partial_json_fills_defaults() {
    let cfg = AvatarConfig::from_json_str(
        &json!({
            "derivation": { "hair_hue": { "policy": "complementary", "half_width": 45.0 } },
            "compose": {
                "canvas_size": 512,
                "dark_white_fallback": "#101010",
                "minify": { "keep_comments": true }
            },
            "raster": { "max_in_flight": 2 }
        })
        .to_string(),
    )
    .unwrap();

    assert_eq!(
        cfg.derivation.hair_hue,
        HairHuePolicy::Complementary { half_width: 45.0 }
    );
    assert_eq!(cfg.derivation.precision, 1000);
    assert_eq!(cfg.compose.canvas_size, 512);
    assert_eq!(cfg.compose.dark_white_fallback, Rgb::new(16.0, 16.0, 16.0));
    assert!(cfg.compose.minify.keep_comments);
    assert!(cfg.compose.minify.shorten_numbers);
    assert_eq!(cfg.raster.max_in_flight, Some(2));
    assert_eq!(cfg.raster.default_size, 128);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = AvatarConfig::from_json_str(r#"{"compose": {"canvas": 10}}"#).unwrap_err();
    assert!(matches!(err, NatriconError::Serde(_)));
}

#[test]
fn invalid_ranges_are_rejected() {
    let mut cfg = AvatarConfig::default();
    cfg.derivation.min_perceived_brightness = 96.0;
    assert!(matches!(
        cfg.validate().unwrap_err(),
        NatriconError::Validation(_)
    ));

    let mut cfg = AvatarConfig::default();
    cfg.derivation.precision = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = AvatarConfig::default();
    cfg.compose.min_shadow_opacity = 0.9;
    assert!(cfg.validate().is_err());

    let mut cfg = AvatarConfig::default();
    cfg.raster.max_in_flight = Some(0);
    assert!(cfg.validate().is_err());

    let mut cfg = AvatarConfig::default();
    cfg.raster.default_size = 50;
    assert!(cfg.validate().is_err());
}

#[test]
fn total_thresholds_are_range_checked() {
    let current = DerivationConfig::current();
    for cfg in [
        DerivationConfig {
            min_total_saturation: 180.0,
            ..current
        },
        DerivationConfig {
            min_total_saturation: -1.0,
            ..current
        },
        DerivationConfig {
            hair_saturation_threshold: 101.0,
            ..current
        },
        DerivationConfig {
            min_total_brightness: 201.0,
            ..current
        },
    ] {
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, NatriconError::Validation(_)), "{cfg:?}");
    }

    let edges = DerivationConfig {
        min_total_saturation: 100.0,
        hair_saturation_threshold: 0.0,
        min_total_brightness: 200.0,
        ..current
    };
    assert!(edges.validate().is_ok());
}

#[test]
fn check_size_enforces_range() {
    let raster = RasterConfig::default();
    assert_eq!(raster.check_size(100).unwrap(), 100);
    assert_eq!(raster.check_size(1000).unwrap(), 1000);
    assert!(raster.check_size(99).is_err());
    assert!(raster.check_size(1001).is_err());
}

#[test]
fn missing_config_file_reports_path() {
    let err = AvatarConfig::from_json_path("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.json"));
}
