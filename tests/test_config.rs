use std::fs;

use side_scroller::config::*;
use side_scroller::error::ConfigError;
use side_scroller::level::LevelLayout;

#[test]
fn presets_are_valid() {
    assert!(Rules::classic().validate().is_ok());
    assert!(Rules::checkpoint().validate().is_ok());
}

#[test]
fn presets_differ_in_policy() {
    let classic = Rules::classic();
    let checkpoint = Rules::checkpoint();
    assert_eq!(classic.physics.horizontal, HorizontalControl::Friction { factor: 0.9 });
    assert_eq!(checkpoint.physics.horizontal, HorizontalControl::Instant);
    assert_eq!(classic.camera, CameraFollow::Snap);
    assert_eq!(checkpoint.camera, CameraFollow::Smooth { factor: 0.12 });
    assert_eq!(classic.damage, DamagePolicy::Lives);
    assert_eq!(checkpoint.damage, DamagePolicy::Checkpoint);
    assert!(classic.distance_score.is_none());
    assert!(checkpoint.distance_score.is_some());
}

#[test]
fn variant_presets_match() {
    assert_eq!(Variant::Classic.rules(), Rules::classic());
    assert_eq!(Variant::Checkpoint.layout(), LevelLayout::checkpoint());
    assert_eq!(Variant::Checkpoint.label(), "Checkpoint");
}

#[test]
fn out_of_range_rules_are_rejected() {
    let mut r = Rules::classic();
    r.physics.gravity = 0.0;
    assert!(matches!(r.validate(), Err(ConfigError::InvalidRules(_))));

    let mut r = Rules::classic();
    r.physics.horizontal = HorizontalControl::Friction { factor: 1.0 };
    assert!(r.validate().is_err());

    let mut r = Rules::checkpoint();
    r.camera = CameraFollow::Smooth { factor: 0.0 };
    assert!(r.validate().is_err());

    let mut r = Rules::classic();
    r.follow_fraction = 1.5;
    assert!(r.validate().is_err());

    let mut r = Rules::classic();
    r.starting_lives = 0;
    assert!(r.validate().is_err());

    let mut r = Rules::classic();
    r.max_frame_ms = f32::NAN;
    assert!(r.validate().is_err());
}

// ── Settings ──────────────────────────────────────────────────────────────────

#[test]
fn empty_settings_use_presets() {
    let s = Settings::from_json("{}").expect("empty settings");
    assert_eq!(s, Settings::default());
    assert_eq!(s.rules_for(Variant::Classic), Rules::classic());
    assert_eq!(s.layout_for(Variant::Classic).expect("built-in"), LevelLayout::classic());
}

#[test]
fn custom_rules_replace_a_preset() {
    let mut rules = Rules::classic();
    rules.starting_lives = 5;
    rules.camera = CameraFollow::Smooth { factor: 0.5 };
    let text = format!(
        r#"{{ "classic_rules": {} }}"#,
        serde_json::to_string(&rules).expect("serialise")
    );

    let s = Settings::from_json(&text).expect("settings");
    assert_eq!(s.rules_for(Variant::Classic), rules);
    assert_eq!(s.rules_for(Variant::Checkpoint), Rules::checkpoint());
}

#[test]
fn invalid_custom_rules_are_rejected() {
    let mut rules = Rules::checkpoint();
    rules.physics.gravity = -1.0;
    let text = format!(
        r#"{{ "checkpoint_rules": {} }}"#,
        serde_json::to_string(&rules).expect("serialise")
    );
    assert!(matches!(
        Settings::from_json(&text),
        Err(ConfigError::InvalidRules(_))
    ));
}

#[test]
fn policy_tags_are_snake_case() {
    let text = serde_json::to_string(&HorizontalControl::Friction { factor: 0.5 }).expect("json");
    assert_eq!(text, r#"{"mode":"friction","factor":0.5}"#);
    let follow: CameraFollow = serde_json::from_str(r#"{"mode":"snap"}"#).expect("json");
    assert_eq!(follow, CameraFollow::Snap);
    let damage: DamagePolicy = serde_json::from_str(r#""checkpoint""#).expect("json");
    assert_eq!(damage, DamagePolicy::Checkpoint);
}

#[test]
fn settings_file_names_a_level_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let level_path = dir.path().join("level.json");
    let mut level = LevelLayout::classic();
    level.width = 2400.0;
    fs::write(&level_path, serde_json::to_string(&level).expect("json")).expect("write level");

    let settings_path = dir.path().join("settings.json");
    let text = format!(
        r#"{{ "classic_level": {} }}"#,
        serde_json::to_string(&level_path).expect("json path")
    );
    fs::write(&settings_path, text).expect("write settings");

    let s = Settings::load(&settings_path).expect("settings");
    assert_eq!(s.layout_for(Variant::Classic).expect("level"), level);
    assert_eq!(s.layout_for(Variant::Checkpoint).expect("level"), LevelLayout::checkpoint());
}

#[test]
fn missing_files_report_their_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("nope.json");
    match Settings::load(&missing) {
        Err(ConfigError::Read { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected a read error, got {other:?}"),
    }

    let s = Settings {
        checkpoint_level: Some(missing.clone()),
        ..Settings::default()
    };
    assert!(matches!(
        s.layout_for(Variant::Checkpoint),
        Err(ConfigError::Read { .. })
    ));
}
