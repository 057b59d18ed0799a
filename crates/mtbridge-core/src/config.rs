//! Bridge configuration
//!
//! Configuration is resolved from, in order of precedence:
//! - Environment variables (`MTBRIDGE_*`)
//! - A JSON file or string
//! - Default values

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::object_model::{HYPOTHESIS_CLASS, TRANSLATION_CLASS};

pub const ENV_HYPOTHESIS_CLASS: &str = "MTBRIDGE_HYPOTHESIS_CLASS";
pub const ENV_TRANSLATION_CLASS: &str = "MTBRIDGE_TRANSLATION_CLASS";
pub const ENV_INCLUDE_SOURCE: &str = "MTBRIDGE_INCLUDE_SOURCE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Runtime name of the hypothesis type
    pub hypothesis_class: String,

    /// Runtime name of the translation type
    pub translation_class: String,

    /// Use the source-carrying constructor when the decoder output has a
    /// source sentence
    pub include_source: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            hypothesis_class: HYPOTHESIS_CLASS.to_string(),
            translation_class: TRANSLATION_CLASS.to_string(),
            include_source: true,
        }
    }
}

impl BridgeConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Configuration {
            message: format!("Invalid bridge configuration: {}", e),
            source: Some(Box::new(e)),
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Io {
            message: format!("Failed to read config file {}", path.display()),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    /// Apply `MTBRIDGE_*` environment overrides
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(class) = std::env::var(ENV_HYPOTHESIS_CLASS) {
            self.hypothesis_class = class;
        }
        if let Ok(class) = std::env::var(ENV_TRANSLATION_CLASS) {
            self.translation_class = class;
        }
        if let Ok(flag) = std::env::var(ENV_INCLUDE_SOURCE) {
            self.include_source = parse_flag(&flag).ok_or_else(|| Error::Configuration {
                message: format!("{} must be a boolean, got '{}'", ENV_INCLUDE_SOURCE, flag),
                source: None,
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.hypothesis_class.trim().is_empty() {
            return Err(Error::Configuration {
                message: "hypothesis_class must not be empty".to_string(),
                source: None,
            });
        }
        if self.translation_class.trim().is_empty() {
            return Err(Error::Configuration {
                message: "translation_class must not be empty".to_string(),
                source: None,
            });
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        std::env::remove_var(ENV_HYPOTHESIS_CLASS);
        std::env::remove_var(ENV_TRANSLATION_CLASS);
        std::env::remove_var(ENV_INCLUDE_SOURCE);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = BridgeConfig::from_json(r#"{"include_source": false}"#).unwrap();
        assert_eq!(config.hypothesis_class, HYPOTHESIS_CLASS);
        assert_eq!(config.translation_class, TRANSLATION_CLASS);
        assert!(!config.include_source);
    }

    #[test]
    fn test_invalid_json_is_configuration_error() {
        let err = BridgeConfig::from_json("{").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"hypothesis_class": "custom/Hypothesis"}}"#).unwrap();

        let config = BridgeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.hypothesis_class, "custom/Hypothesis");
        assert!(config.include_source);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = BridgeConfig::from_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var(ENV_TRANSLATION_CLASS, "custom/Translation");
        std::env::set_var(ENV_INCLUDE_SOURCE, "off");

        let config = BridgeConfig::default().with_env_overrides().unwrap();
        assert_eq!(config.hypothesis_class, HYPOTHESIS_CLASS);
        assert_eq!(config.translation_class, "custom/Translation");
        assert!(!config.include_source);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_bad_env_flag() {
        clear_env();
        std::env::set_var(ENV_INCLUDE_SOURCE, "maybe");
        let err = BridgeConfig::default().with_env_overrides().unwrap_err();
        assert!(err.to_string().contains("maybe"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_empty_class_rejected() {
        clear_env();
        std::env::set_var(ENV_HYPOTHESIS_CLASS, "  ");
        assert!(BridgeConfig::default().with_env_overrides().is_err());
        clear_env();
    }
}
