//! Tests for convars loading.

use super::*;

#[test]
fn test_defaults_are_valid() {
    let convars = CombatConVars::default();
    assert!(convars.validate().is_ok());
    assert_eq!(convars.deflect_dodge_cost, 0.1);
    assert_eq!(convars.enemy_melee_distance, DistanceBand::new(250.0, 700.0));
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let convars = CombatConVars::from_toml_str(
        r#"
        panic_multiplier = 0.3
        [enemy_gun_distance]
        min = 800.0
        max = 1500.0
        "#,
    )
    .expect("valid toml");

    assert_eq!(convars.panic_multiplier, 0.3);
    assert_eq!(convars.enemy_gun_distance, DistanceBand::new(800.0, 1500.0));
    // Остальное из Default
    assert_eq!(convars.point_blank_distance, 250.0);
}

#[test]
fn test_inverted_band_rejected() {
    let result = CombatConVars::from_toml_str(
        r#"
        [enemy_melee_distance]
        min = 900.0
        max = 100.0
        "#,
    );

    assert!(matches!(
        result,
        Err(ConfigError::Invalid { field: "enemy_melee_distance", .. })
    ));
}

#[test]
fn test_garbage_is_parse_error() {
    let result = CombatConVars::from_toml_str("panic_multiplier = \"lots\"");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_missing_file_falls_back() {
    let convars = CombatConVars::load_or_default("/definitely/not/here/convars.toml");
    assert_eq!(convars, CombatConVars::default());
}

#[test]
fn test_level_settings_reject_zero_attackers() {
    let result = LevelSettings::from_toml_str("max_simultaneous_attackers = 0");
    assert!(result.is_err());

    let settings = LevelSettings::from_toml_str("max_simultaneous_attackers = 3").expect("valid");
    assert_eq!(settings.max_simultaneous_attackers, 3);
    assert_eq!(settings.level_width, 6000.0);
}

#[test]
fn test_edge_detection() {
    let settings = LevelSettings::default();
    assert!(settings.is_close_to_edge(-2500.0));
    assert!(settings.is_close_to_edge(2500.0));
    assert!(!settings.is_close_to_edge(0.0));
}
