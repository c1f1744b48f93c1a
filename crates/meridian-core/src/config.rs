use crate::error::{MeridianError, Result};
use crate::models::{Crs, CrsLookup, GeomOptions, ValidityMode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for Meridian
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub crs: ConfigValue<Crs>,
    pub geometry_validity: ConfigValue<ValidityMode>,
    pub fix_antimeridian: ConfigValue<bool>,
    pub crs_lookup: ConfigValue<CrsLookup>,
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            crs: ConfigValue::new(Crs::wgs84(), ConfigSource::Default),
            geometry_validity: ConfigValue::new(ValidityMode::Strict, ConfigSource::Default),
            fix_antimeridian: ConfigValue::new(true, ConfigSource::Default),
            crs_lookup: ConfigValue::new(CrsLookup::Registry, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| MeridianError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| MeridianError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(crs) = file_config.crs {
            self.crs.update(crs, ConfigSource::File);
        }

        if let Some(geometry_validity) = file_config.geometry_validity {
            self.geometry_validity.update(geometry_validity, ConfigSource::File);
        }

        if let Some(fix_antimeridian) = file_config.fix_antimeridian {
            self.fix_antimeridian.update(fix_antimeridian, ConfigSource::File);
        }

        if let Some(crs_lookup) = file_config.crs_lookup {
            self.crs_lookup.update(crs_lookup, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // MERIDIAN_CRS
        if let Ok(crs_str) = env::var("MERIDIAN_CRS") {
            match crs_str.parse::<Crs>() {
                Ok(crs) => self.crs.update(crs, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid MERIDIAN_CRS value '{}': expected EPSG code or PROJ string",
                    crs_str
                ),
            }
        }

        // MERIDIAN_GEOMETRY_VALIDITY
        if let Ok(validity_str) = env::var("MERIDIAN_GEOMETRY_VALIDITY") {
            match parse_validity_mode(&validity_str) {
                Ok(validity) => self.geometry_validity.update(validity, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid MERIDIAN_GEOMETRY_VALIDITY value '{}': expected strict or disabled",
                    validity_str
                ),
            }
        }

        // MERIDIAN_FIX_ANTIMERIDIAN
        if let Ok(fix_str) = env::var("MERIDIAN_FIX_ANTIMERIDIAN") {
            match parse_bool(&fix_str) {
                Ok(fix) => self.fix_antimeridian.update(fix, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid MERIDIAN_FIX_ANTIMERIDIAN value '{}': expected true or false",
                    fix_str
                ),
            }
        }

        // MERIDIAN_CRS_LOOKUP
        if let Ok(lookup_str) = env::var("MERIDIAN_CRS_LOOKUP") {
            match parse_crs_lookup(&lookup_str) {
                Ok(lookup) => self.crs_lookup.update(lookup, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid MERIDIAN_CRS_LOOKUP value '{}': expected registry or builtin",
                    lookup_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(crs) = overrides.crs {
            self.crs.update(crs, ConfigSource::Cli);
        }

        if let Some(geometry_validity) = overrides.geometry_validity {
            self.geometry_validity.update(geometry_validity, ConfigSource::Cli);
        }

        if let Some(fix_antimeridian) = overrides.fix_antimeridian {
            self.fix_antimeridian.update(fix_antimeridian, ConfigSource::Cli);
        }

        if let Some(crs_lookup) = overrides.crs_lookup {
            self.crs_lookup.update(crs_lookup, ConfigSource::Cli);
        }
    }

    /// Geometry construction options derived from this configuration
    pub fn geom_options(&self) -> GeomOptions {
        GeomOptions {
            crs: self.crs.value.clone(),
            validity: self.geometry_validity.value,
            fix_antimeridian: self.fix_antimeridian.value,
            lookup: self.crs_lookup.value,
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert("crs".to_string(), (self.crs.value.to_string(), self.crs.source));

        map.insert(
            "geometry_validity".to_string(),
            (format!("{:?}", self.geometry_validity.value), self.geometry_validity.source),
        );

        map.insert(
            "fix_antimeridian".to_string(),
            (self.fix_antimeridian.value.to_string(), self.fix_antimeridian.source),
        );

        map.insert(
            "crs_lookup".to_string(),
            (format!("{:?}", self.crs_lookup.value), self.crs_lookup.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    crs: Option<Crs>,
    geometry_validity: Option<ValidityMode>,
    fix_antimeridian: Option<bool>,
    crs_lookup: Option<CrsLookup>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub crs: Option<Crs>,
    pub geometry_validity: Option<ValidityMode>,
    pub fix_antimeridian: Option<bool>,
    pub crs_lookup: Option<CrsLookup>,
}

/// Parse validity mode from string
pub fn parse_validity_mode(s: &str) -> Result<ValidityMode> {
    match s.to_lowercase().as_str() {
        "strict" => Ok(ValidityMode::Strict),
        "disabled" | "off" | "none" => Ok(ValidityMode::Disabled),
        _ => Err(MeridianError::ConfigInvalid {
            key: "geometry_validity".to_string(),
            reason: format!("Invalid validity mode: {}. Use strict or disabled", s),
        }),
    }
}

/// Parse CRS lookup strategy from string
pub fn parse_crs_lookup(s: &str) -> Result<CrsLookup> {
    match s.to_lowercase().as_str() {
        "registry" => Ok(CrsLookup::Registry),
        "builtin" | "built-in" => Ok(CrsLookup::Builtin),
        _ => Err(MeridianError::ConfigInvalid {
            key: "crs_lookup".to_string(),
            reason: format!("Invalid CRS lookup: {}. Use registry or builtin", s),
        }),
    }
}

fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(MeridianError::ConfigInvalid {
            key: "fix_antimeridian".to_string(),
            reason: format!("Invalid boolean: {}", s),
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
        assert_eq!(config.crs.value, Crs::wgs84());
        assert_eq!(config.crs.source, ConfigSource::Default);
        assert_eq!(config.geometry_validity.value, ValidityMode::Strict);
        assert!(config.fix_antimeridian.value);
        assert_eq!(config.crs_lookup.value, CrsLookup::Registry);
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        // File should override default
        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        // Environment should override file
        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        // CLI should override environment
        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
crs = 3857
geometry_validity = "Disabled"
fix_antimeridian = false
crs_lookup = "Builtin"
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.crs.value, Crs::web_mercator());
        assert_eq!(config.crs.source, ConfigSource::File);
        assert_eq!(config.geometry_validity.value, ValidityMode::Disabled);
        assert!(!config.fix_antimeridian.value);
        assert_eq!(config.crs_lookup.value, CrsLookup::Builtin);
    }

    #[test]
    fn test_load_proj_string_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"crs = "+proj=utm +zone=33 +datum=WGS84""#).unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert!(matches!(config.crs.value, Crs::Proj(_)));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = LayeredConfig::with_defaults().load_from_file("/nonexistent/meridian.toml");
        assert!(matches!(result, Err(MeridianError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        let overrides = CliConfigOverrides {
            crs: Some(Crs::Epsg(32748)),
            geometry_validity: Some(ValidityMode::Disabled),
            fix_antimeridian: None,
            crs_lookup: None,
        };

        config.update_from_cli(overrides);

        assert_eq!(config.crs.value, Crs::Epsg(32748));
        assert_eq!(config.crs.source, ConfigSource::Cli);
        assert_eq!(config.geometry_validity.value, ValidityMode::Disabled);
        // These should still be defaults
        assert_eq!(config.fix_antimeridian.source, ConfigSource::Default);
        assert_eq!(config.crs_lookup.source, ConfigSource::Default);
    }

    #[test]
    fn test_geom_options_from_config() {
        let mut config = LayeredConfig::with_defaults();
        config.update_from_cli(CliConfigOverrides {
            fix_antimeridian: Some(false),
            ..Default::default()
        });

        let options = config.geom_options();
        assert_eq!(options.crs, Crs::wgs84());
        assert!(!options.fix_antimeridian);
        assert_eq!(options.validity, ValidityMode::Strict);
    }

    #[test]
    fn test_parse_validity_mode() {
        assert_eq!(parse_validity_mode("strict").unwrap(), ValidityMode::Strict);
        assert_eq!(parse_validity_mode("DISABLED").unwrap(), ValidityMode::Disabled);
        assert!(parse_validity_mode("lenient").is_err());
    }

    #[test]
    fn test_parse_crs_lookup() {
        assert_eq!(parse_crs_lookup("registry").unwrap(), CrsLookup::Registry);
        assert_eq!(parse_crs_lookup("Builtin").unwrap(), CrsLookup::Builtin);
        assert!(parse_crs_lookup("cache").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert!(map.contains_key("crs"));
        assert!(map.contains_key("geometry_validity"));
        assert!(map.contains_key("fix_antimeridian"));
        assert!(map.contains_key("crs_lookup"));

        let (crs_value, crs_source) = &map["crs"];
        assert_eq!(crs_value, "EPSG:4326");
        assert_eq!(*crs_source, ConfigSource::Default);
    }
}
