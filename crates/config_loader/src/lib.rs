//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Generate `MonitorBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("monitor.toml")).unwrap();
//! println!("Producer: {}", blueprint.producer.name);
//! ```

mod parser;
mod validator;

pub use contracts::MonitorBlueprint;
pub use parser::ConfigFormat;

use contracts::MonitorError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<MonitorBlueprint, MonitorError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<MonitorBlueprint, MonitorError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Serialize MonitorBlueprint to TOML string
    pub fn to_toml(blueprint: &MonitorBlueprint) -> Result<String, MonitorError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| MonitorError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize MonitorBlueprint to JSON string
    pub fn to_json(blueprint: &MonitorBlueprint) -> Result<String, MonitorError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| MonitorError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, MonitorError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            MonitorError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            MonitorError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, MonitorError> {
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
[producer]
name = "camerad"

[[channels]]
id = "road_camera"
frequency_hz = 20.0

[[channels]]
id = "driver_camera"
frequency_hz = 20.0

[[sinks]]
name = "log"
sink_type = "log"
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.producer.name, "camerad");
        assert_eq!(bp.channels.len(), 2);
        assert_eq!(bp.capture.window_secs, 30.0);
    }

    #[test]
    fn test_round_trip_toml() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.producer.name, bp2.producer.name);
        assert_eq!(bp.channels.len(), bp2.channels.len());
        assert_eq!(bp.channels[0].id, bp2.channels[0].id);
    }

    #[test]
    fn test_round_trip_json() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(bp.producer.name, bp2.producer.name);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        // Duplicate channel id should fail validation
        let content = r#"
[producer]
name = "camerad"

[[channels]]
id = "road_camera"
frequency_hz = 20.0

[[channels]]
id = "road_camera"
frequency_hz = 10.0
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }
}
