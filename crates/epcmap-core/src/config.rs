use crate::error::{EpcMapError, Result};
use crate::models::{CameraOptions, LngLat, MapConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Default base style
pub const DEFAULT_STYLE: &str = "https://api.os.uk/maps/vector/v1/vts/resources/styles?key=";

/// Where a configuration value came from. Variants are declared in
/// ascending precedence, so a later source wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfigSource {
    Default,
    /// TOML file passed with `--config`
    File,
    /// `EPCMAP_*` variables
    Environment,
    Cli,
}

/// A value tagged with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Replace the value unless the current source outranks `source`.
    /// Equal sources do not replace each other.
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source > self.source {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for the map viewer
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub style: ConfigValue<String>,
    pub center: ConfigValue<LngLat>,
    pub zoom: ConfigValue<f64>,
    pub pitch: ConfigValue<f64>,
    pub bearing: ConfigValue<f64>,
    pub colour_blind: ConfigValue<bool>,
    pub min_building_zoom: ConfigValue<f64>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        let camera = CameraOptions::default();
        Self {
            style: ConfigValue::new(DEFAULT_STYLE.to_string(), ConfigSource::Default),
            center: ConfigValue::new(camera.center, ConfigSource::Default),
            zoom: ConfigValue::new(camera.zoom, ConfigSource::Default),
            pitch: ConfigValue::new(camera.pitch, ConfigSource::Default),
            bearing: ConfigValue::new(camera.bearing, ConfigSource::Default),
            colour_blind: ConfigValue::new(false, ConfigSource::Default),
            min_building_zoom: ConfigValue::new(14.0, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| EpcMapError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| EpcMapError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(style) = file_config.style {
            self.style.update(style, ConfigSource::File);
        }

        if let Some([lng, lat]) = file_config.center {
            self.center.update(LngLat::new(lng, lat), ConfigSource::File);
        }

        if let Some(zoom) = file_config.zoom {
            self.zoom.update(zoom, ConfigSource::File);
        }

        if let Some(pitch) = file_config.pitch {
            self.pitch.update(pitch, ConfigSource::File);
        }

        if let Some(bearing) = file_config.bearing {
            self.bearing.update(bearing, ConfigSource::File);
        }

        if let Some(colour_blind) = file_config.colour_blind {
            self.colour_blind.update(colour_blind, ConfigSource::File);
        }

        if let Some(min_building_zoom) = file_config.min_building_zoom {
            self.min_building_zoom.update(min_building_zoom, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // EPCMAP_STYLE
        if let Ok(style) = env::var("EPCMAP_STYLE") {
            self.style.update(style, ConfigSource::Environment);
        }

        // EPCMAP_CENTER
        if let Ok(center_str) = env::var("EPCMAP_CENTER") {
            match parse_center(&center_str) {
                Ok(center) => self.center.update(center, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid EPCMAP_CENTER value '{}': expected 'lng,lat'",
                    center_str
                ),
            }
        }

        // EPCMAP_ZOOM, EPCMAP_PITCH, EPCMAP_BEARING, EPCMAP_MIN_BUILDING_ZOOM
        for (var, target) in [
            ("EPCMAP_ZOOM", &mut self.zoom),
            ("EPCMAP_PITCH", &mut self.pitch),
            ("EPCMAP_BEARING", &mut self.bearing),
            ("EPCMAP_MIN_BUILDING_ZOOM", &mut self.min_building_zoom),
        ] {
            if let Ok(value_str) = env::var(var) {
                match value_str.trim().parse::<f64>() {
                    Ok(value) if value.is_finite() => {
                        target.update(value, ConfigSource::Environment)
                    }
                    _ => tracing::warn!("Invalid {} value '{}': expected a number", var, value_str),
                }
            }
        }

        // EPCMAP_COLOUR_BLIND
        if let Ok(flag_str) = env::var("EPCMAP_COLOUR_BLIND") {
            match parse_bool(&flag_str) {
                Ok(flag) => self.colour_blind.update(flag, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid EPCMAP_COLOUR_BLIND value '{}': expected true or false",
                    flag_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(style) = overrides.style {
            self.style.update(style, ConfigSource::Cli);
        }

        if let Some(center) = overrides.center {
            self.center.update(center, ConfigSource::Cli);
        }

        if let Some(zoom) = overrides.zoom {
            self.zoom.update(zoom, ConfigSource::Cli);
        }

        if let Some(colour_blind) = overrides.colour_blind {
            self.colour_blind.update(colour_blind, ConfigSource::Cli);
        }
    }

    /// Map creation parameters derived from the resolved values
    pub fn map_config(&self) -> MapConfig {
        let style = self.style.value.trim();
        MapConfig {
            camera: CameraOptions {
                center: self.center.value,
                zoom: self.zoom.value,
                pitch: self.pitch.value,
                bearing: self.bearing.value,
            },
            style: if style.is_empty() { None } else { Some(style.to_string()) },
            min_building_zoom: self.min_building_zoom.value,
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert("style".to_string(), (self.style.value.clone(), self.style.source));

        map.insert(
            "center".to_string(),
            (
                format!("{},{}", self.center.value.lng, self.center.value.lat),
                self.center.source,
            ),
        );

        map.insert("zoom".to_string(), (self.zoom.value.to_string(), self.zoom.source));

        map.insert("pitch".to_string(), (self.pitch.value.to_string(), self.pitch.source));

        map.insert("bearing".to_string(), (self.bearing.value.to_string(), self.bearing.source));

        map.insert(
            "colour_blind".to_string(),
            (self.colour_blind.value.to_string(), self.colour_blind.source),
        );

        map.insert(
            "min_building_zoom".to_string(),
            (self.min_building_zoom.value.to_string(), self.min_building_zoom.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    style: Option<String>,
    center: Option<[f64; 2]>,
    zoom: Option<f64>,
    pitch: Option<f64>,
    bearing: Option<f64>,
    colour_blind: Option<bool>,
    min_building_zoom: Option<f64>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub style: Option<String>,
    pub center: Option<LngLat>,
    pub zoom: Option<f64>,
    pub colour_blind: Option<bool>,
}

/// Parse a `lng,lat` pair
pub fn parse_center(s: &str) -> Result<LngLat> {
    let invalid = || EpcMapError::ConfigInvalid {
        key: "center".to_string(),
        reason: format!("Invalid center: {}. Use 'lng,lat'", s),
    };
    let (lng, lat) = s.split_once(',').ok_or_else(invalid)?;
    let lng: f64 = lng.trim().parse().map_err(|_| invalid())?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
        return Err(invalid());
    }
    Ok(LngLat::new(lng, lat))
}

/// Parse a boolean flag
pub fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(EpcMapError::ConfigInvalid {
            key: "colour_blind".to_string(),
            reason: format!("Invalid flag: {}. Use true or false", s),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.style.value, DEFAULT_STYLE);
        assert_eq!(config.style.source, ConfigSource::Default);
        assert_eq!(config.zoom.value, 15.0);
        assert!(!config.colour_blind.value);
    }

    #[test]
    fn test_zoom_precedence() {
        let mut zoom = ConfigValue::new(15.0, ConfigSource::Default);

        zoom.update(16.5, ConfigSource::Environment);
        assert_eq!((zoom.value, zoom.source), (16.5, ConfigSource::Environment));

        // A file loaded later still ranks below the environment
        zoom.update(14.0, ConfigSource::File);
        assert_eq!(zoom.value, 16.5);

        zoom.update(18.0, ConfigSource::Cli);
        zoom.update(12.0, ConfigSource::Cli);
        assert_eq!((zoom.value, zoom.source), (18.0, ConfigSource::Cli));
        assert!(ConfigSource::Default < ConfigSource::File);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
style = "mapbox://styles/light"
center = [-1.5, 50.7]
zoom = 17.5
pitch = 45.0
colour_blind = true
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.style.value, "mapbox://styles/light");
        assert_eq!(config.style.source, ConfigSource::File);
        assert_eq!(config.center.value, LngLat::new(-1.5, 50.7));
        assert_eq!(config.zoom.value, 17.5);
        assert_eq!(config.pitch.value, 45.0);
        assert!(config.colour_blind.value);
        assert_eq!(config.bearing.source, ConfigSource::Default);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        config.update_from_cli(CliConfigOverrides {
            zoom: Some(12.0),
            colour_blind: Some(true),
            ..Default::default()
        });

        assert_eq!(config.zoom.value, 12.0);
        assert_eq!(config.zoom.source, ConfigSource::Cli);
        assert!(config.colour_blind.value);
        assert_eq!(config.style.source, ConfigSource::Default);
    }

    #[test]
    fn test_map_config_blank_style_is_none() {
        let mut config = LayeredConfig::with_defaults();
        config.update_from_cli(CliConfigOverrides {
            style: Some("  ".to_string()),
            ..Default::default()
        });
        assert_eq!(config.map_config().style, None);
    }

    #[test]
    fn test_parse_center() {
        assert_eq!(parse_center("-1.3, 50.7").unwrap(), LngLat::new(-1.3, 50.7));
        assert!(parse_center("-1.3").is_err());
        assert!(parse_center("200,0").is_err());
        assert!(parse_center("a,b").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(!parse_bool("off").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert_eq!(map.len(), 7);
        let (zoom, source) = &map["zoom"];
        assert_eq!(zoom, "15");
        assert_eq!(*source, ConfigSource::Default);
    }
}
