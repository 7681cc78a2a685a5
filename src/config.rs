//! Synthesis configuration management via TOML files.
//!
//! This module provides configuration parsing from TOML format with sensible
//! defaults, plus fail-fast validation of the ascent hyperparameters.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::{fmt, fs};

use serde::Serialize;
use toml::Value;

/// Hyperparameters of the multi-octave gradient ascent.
///
/// # Examples
///
/// ```
/// use octave_dream::DreamConfig;
///
/// let config = DreamConfig::load_from_file("config/dream.toml")
///     .unwrap_or_else(|_| DreamConfig::default());
///
/// println!("{} iterations over {} octaves", config.iterations, config.num_octaves);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct DreamConfig {
    /// Ascent steps per octave
    pub iterations: usize,
    /// Base step size, re-normalized per iteration by mean gradient magnitude
    pub learning_rate: f32,
    /// Downsampling factor between adjacent octaves (> 1)
    pub octave_scale: f32,
    /// Number of pyramid levels, including full resolution
    pub num_octaves: usize,
}

impl DreamConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(&path)?;
        Self::from_str(&contents)
    }

    pub fn from_str(toml_str: &str) -> Result<Self, ConfigError> {
        let mut section = String::new();
        let mut values: HashMap<String, String> = HashMap::new();

        for line in toml_str.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                section = trimmed.trim_matches(&['[', ']'][..]).to_string();
                continue;
            }

            let (key, value) = trimmed
                .split_once('=')
                .ok_or_else(|| ConfigError::Parse(format!("Invalid line: {}", trimmed)))?;
            let key = key.trim().to_string();
            let value = value.trim().trim_matches('"').to_string();
            values.insert(format!("{}::{}", section, key), value);
        }

        let iterations = values
            .remove("dream::iterations")
            .map(|v| v.parse())
            .transpose()
            .map_err(|_| ConfigError::Parse("iterations must be an integer".into()))?
            .unwrap_or(20);
        let learning_rate = values
            .remove("dream::learning_rate")
            .map(|v| v.parse())
            .transpose()
            .map_err(|_| ConfigError::Parse("learning_rate must be a float".into()))?
            .unwrap_or(0.01);
        let octave_scale = values
            .remove("dream::octave_scale")
            .map(|v| v.parse())
            .transpose()
            .map_err(|_| ConfigError::Parse("octave_scale must be a float".into()))?
            .unwrap_or(1.4);
        let num_octaves = values
            .remove("dream::num_octaves")
            .map(|v| v.parse())
            .transpose()
            .map_err(|_| ConfigError::Parse("num_octaves must be an integer".into()))?
            .unwrap_or(10);

        let config = Self {
            iterations,
            learning_rate,
            octave_scale,
            num_octaves,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects hyperparameters the ascent cannot run with. Called before any
    /// computation so a bad configuration never reaches the pyramid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::Invalid("iterations must be at least 1".into()));
        }
        if !(self.learning_rate > 0.0) || !self.learning_rate.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "learning_rate must be a positive finite float, got {}",
                self.learning_rate
            )));
        }
        if !(self.octave_scale > 1.0) || !self.octave_scale.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "octave_scale must be greater than 1, got {}",
                self.octave_scale
            )));
        }
        if self.num_octaves == 0 {
            return Err(ConfigError::Invalid("num_octaves must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for DreamConfig {
    fn default() -> Self {
        Self {
            iterations: 20,
            learning_rate: 0.01,
            octave_scale: 1.4,
            num_octaves: 10,
        }
    }
}

/// Directory-driver settings for batch amplification.
#[derive(Debug, Clone, Serialize)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Optional filename prefix, e.g. the model name, applied to every output
    pub prefix: Option<String>,
}

impl BatchConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(&path)?;
        Self::from_str(&contents)
    }

    pub fn from_str(toml_str: &str) -> Result<Self, ConfigError> {
        let value: Value =
            toml::from_str(toml_str).map_err(|err| ConfigError::Parse(err.to_string()))?;
        let table = value
            .get("batch")
            .and_then(|v| v.as_table())
            .cloned()
            .unwrap_or_default();

        let input_dir = table
            .get("input_dir")
            .and_then(|v| v.as_str())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./inputs"));

        let output_dir = table
            .get("output_dir")
            .and_then(|v| v.as_str())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./outputs"));

        let prefix = table
            .get("prefix")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            input_dir,
            output_dir,
            prefix,
        })
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./inputs"),
            output_dir: PathBuf::from("./outputs"),
            prefix: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "IO error: {}", err),
            ConfigError::Parse(err) => write!(f, "Parse error: {}", err),
            ConfigError::Invalid(err) => write!(f, "Invalid configuration: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dream_config_defaults_when_section_missing() {
        let config = DreamConfig::from_str("").unwrap();
        assert_eq!(config.iterations, 20);
        assert_eq!(config.num_octaves, 10);
        assert!((config.learning_rate - 0.01).abs() < 1e-9);
        assert!((config.octave_scale - 1.4).abs() < 1e-6);
    }

    #[test]
    fn test_dream_config_parses_custom_values() {
        let toml =
            "[dream]\niterations = 5\nlearning_rate = 0.02\noctave_scale = 2.0\nnum_octaves = 3";
        let config = DreamConfig::from_str(toml).unwrap();
        assert_eq!(config.iterations, 5);
        assert!((config.learning_rate - 0.02).abs() < 1e-9);
        assert!((config.octave_scale - 2.0).abs() < 1e-6);
        assert_eq!(config.num_octaves, 3);
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let toml = "[dream]\niterations = 0";
        assert!(matches!(
            DreamConfig::from_str(toml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_negative_learning_rate_rejected() {
        let config = DreamConfig {
            learning_rate: -0.5,
            ..DreamConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_octave_scale_of_one_rejected() {
        let config = DreamConfig {
            octave_scale: 1.0,
            ..DreamConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_octaves_rejected() {
        let config = DreamConfig {
            num_octaves: 0,
            ..DreamConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_batch_config_defaults_when_section_missing() {
        let config = BatchConfig::from_str("[dream]\niterations = 5").unwrap();
        assert_eq!(config.input_dir, PathBuf::from("./inputs"));
        assert_eq!(config.output_dir, PathBuf::from("./outputs"));
        assert!(config.prefix.is_none());
    }

    #[test]
    fn test_batch_config_parses_custom_values() {
        let toml = "[batch]\ninput_dir = \"in\"\noutput_dir = \"out\"\nprefix = \"vgg19\"";
        let config = BatchConfig::from_str(toml).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("in"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.prefix.as_deref(), Some("vgg19"));
    }
}
