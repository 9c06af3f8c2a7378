//! Layered configuration
//!
//! Values come from three layers, lowest to highest precedence: built-in
//! defaults, a TOML config file (`./bleedmakr.toml`, then the user config
//! directory), and explicit CLI flags.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::ProcessOptions;

/// Config file name looked up in the working directory
const LOCAL_CONFIG: &str = "bleedmakr.toml";

/// Config file path under the user config directory
const USER_CONFIG: &str = "bleedmakr/config.toml";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tool configuration, as stored in TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bleed margin in millimeters
    pub bleed_mm: f64,
    /// Border scan tolerance knob
    pub tolerance: u8,
    /// Extra pixels cropped from each side of the detected box
    pub extra_crop_px: i32,
    /// Working resolution
    pub dpi: u32,
    /// JPEG quality for PDF output
    pub jpeg_quality: u8,
    /// Worker threads for batch processing; None means all CPUs
    pub threads: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bleed_mm: 3.0,
            tolerance: 10,
            extra_crop_px: 2,
            dpi: 300,
            jpeg_quality: 90,
            threads: None,
        }
    }
}

impl Config {
    /// Load from the standard locations: `./bleedmakr.toml` first, then the
    /// user config directory. Missing files fall through to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        for path in Self::standard_paths() {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load from an explicit path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// The standard lookup locations, in precedence order
    pub fn standard_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(USER_CONFIG));
        }
        paths
    }

    /// Apply CLI overrides; only explicitly-set values take precedence.
    pub fn merge_with_cli(&self, overrides: &CliOverrides) -> Config {
        Config {
            bleed_mm: overrides.bleed_mm.unwrap_or(self.bleed_mm),
            tolerance: overrides.tolerance.unwrap_or(self.tolerance),
            extra_crop_px: overrides.extra_crop.unwrap_or(self.extra_crop_px),
            dpi: overrides.dpi.unwrap_or(self.dpi),
            jpeg_quality: overrides.jpeg_quality.unwrap_or(self.jpeg_quality),
            threads: overrides.threads.or(self.threads),
        }
    }

    /// Serialized form used for the cache digest
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Pipeline options for this configuration
    pub fn to_process_options(&self) -> ProcessOptions {
        ProcessOptions::builder()
            .bleed_mm(self.bleed_mm)
            .tolerance(self.tolerance)
            .extra_crop(self.extra_crop_px)
            .dpi(self.dpi)
            .jpeg_quality(self.jpeg_quality)
            .build()
    }
}

/// CLI values that were explicitly set; None leaves the config value alone.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bleed_mm: Option<f64>,
    pub tolerance: Option<u8>,
    pub extra_crop: Option<i32>,
    pub dpi: Option<u32>,
    pub jpeg_quality: Option<u8>,
    pub threads: Option<usize>,
}

impl CliOverrides {
    /// Empty overrides
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.bleed_mm, 3.0);
        assert_eq!(config.tolerance, 10);
        assert_eq!(config.extra_crop_px, 2);
        assert_eq!(config.dpi, 300);
        assert_eq!(config.jpeg_quality, 90);
        assert!(config.threads.is_none());
    }

    #[test]
    fn test_load_from_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("bleedmakr.toml");
        fs::write(&path, "bleed_mm = 5.0\ndpi = 150\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();

        assert_eq!(config.bleed_mm, 5.0);
        assert_eq!(config.dpi, 150);
        // Unset keys keep their defaults.
        assert_eq!(config.jpeg_quality, 90);
    }

    #[test]
    fn test_load_from_path_rejects_bad_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "bleed_mm = [not toml").unwrap();

        assert!(matches!(
            Config::load_from_path(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_merge_with_cli() {
        let config = Config {
            bleed_mm: 5.0,
            threads: Some(2),
            ..Default::default()
        };
        let overrides = CliOverrides {
            bleed_mm: Some(2.0),
            dpi: Some(600),
            ..Default::default()
        };

        let merged = config.merge_with_cli(&overrides);

        assert_eq!(merged.bleed_mm, 2.0);
        assert_eq!(merged.dpi, 600);
        // Unset overrides leave the file values.
        assert_eq!(merged.threads, Some(2));
        assert_eq!(merged.tolerance, 10);
    }

    #[test]
    fn test_empty_overrides_are_identity() {
        let config = Config {
            bleed_mm: 4.5,
            jpeg_quality: 75,
            ..Default::default()
        };

        let merged = config.merge_with_cli(&CliOverrides::new());

        assert_eq!(merged.bleed_mm, 4.5);
        assert_eq!(merged.jpeg_quality, 75);
    }

    #[test]
    fn test_to_json_round_trips() {
        let config = Config::default();
        let json = config.to_json();

        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.bleed_mm, config.bleed_mm);
    }

    #[test]
    fn test_to_process_options() {
        let config = Config {
            bleed_mm: 2.0,
            extra_crop_px: 0,
            ..Default::default()
        };

        let options = config.to_process_options();

        assert_eq!(options.bleed_mm, 2.0);
        assert_eq!(options.extra_crop, 0);
        assert_eq!(options.dpi, 300);
    }
}
