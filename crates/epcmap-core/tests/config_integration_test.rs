//! Integration tests for layered configuration
//!
//! These tests verify that configuration loading follows the correct precedence:
//! CLI arguments > Environment variables > Config file > Defaults

use epcmap_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig};
use epcmap_core::models::LngLat;
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

fn clear_env() {
    for var in [
        "EPCMAP_STYLE",
        "EPCMAP_CENTER",
        "EPCMAP_ZOOM",
        "EPCMAP_PITCH",
        "EPCMAP_BEARING",
        "EPCMAP_COLOUR_BLIND",
        "EPCMAP_MIN_BUILDING_ZOOM",
    ] {
        env::remove_var(var);
    }
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", contents).unwrap();
    file
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let file = config_file(
        r#"
zoom = 16.0
colour_blind = false
"#,
    );

    env::set_var("EPCMAP_ZOOM", "18");
    env::set_var("EPCMAP_COLOUR_BLIND", "true");

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();

    assert_eq!(config.zoom.value, 18.0);
    assert_eq!(config.zoom.source, ConfigSource::Environment);
    assert!(config.colour_blind.value);
    assert_eq!(config.colour_blind.source, ConfigSource::Environment);

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var("EPCMAP_CENTER", "-1.1,50.6");

    let mut config = LayeredConfig::with_defaults().load_from_env();
    assert_eq!(config.center.value, LngLat::new(-1.1, 50.6));

    config.update_from_cli(CliConfigOverrides {
        center: Some(LngLat::new(-1.2, 50.65)),
        ..Default::default()
    });

    assert_eq!(config.center.value, LngLat::new(-1.2, 50.65));
    assert_eq!(config.center.source, ConfigSource::Cli);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_values_are_ignored() {
    clear_env();
    env::set_var("EPCMAP_ZOOM", "very close");
    env::set_var("EPCMAP_CENTER", "somewhere");
    env::set_var("EPCMAP_COLOUR_BLIND", "perhaps");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.zoom.source, ConfigSource::Default);
    assert_eq!(config.center.source, ConfigSource::Default);
    assert_eq!(config.colour_blind.source, ConfigSource::Default);

    clear_env();
}

#[test]
#[serial]
fn test_map_config_reflects_layers() {
    clear_env();
    let file = config_file(
        r#"
style = "https://tiles.example/style.json"
pitch = 60.0
bearing = -17.6
min_building_zoom = 15.5
"#,
    );

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();
    let map_config = config.map_config();

    assert_eq!(map_config.style.as_deref(), Some("https://tiles.example/style.json"));
    assert_eq!(map_config.camera.pitch, 60.0);
    assert_eq!(map_config.camera.bearing, -17.6);
    assert_eq!(map_config.min_building_zoom, 15.5);
}

#[test]
fn test_missing_file_is_config_error() {
    let result = LayeredConfig::with_defaults().load_from_file("/nonexistent/epcmap.toml");
    assert!(result.is_err());
}

#[test]
fn test_malformed_file_is_config_error() {
    let file = config_file("zoom = \"high\"");
    let result = LayeredConfig::with_defaults().load_from_file(file.path());
    assert!(result.is_err());
}
