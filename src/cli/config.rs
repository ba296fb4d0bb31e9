//! TOML configuration file support.
//!
//! Detector settings and LED calibrations live in a config file rather than on
//! the command line:
//!
//! ```toml
//! # dissonance.toml
//! [conversion]
//! key_scheme = "timestamp"
//!
//! [spikes]
//! threshold = 20.0
//! refractory_samples = 20
//!
//! [[calibration]]
//! led = "Green_570nm"
//! effective = "2020-01-01"
//! rstarr_per_su = 1250.0
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use dissonance::converter::{ConversionConfig, EpochKeyScheme};
use dissonance::rstarr::{Calibration, CalibrationTable};
use dissonance::spikes::ThresholdDetector;

/// Root configuration structure for dissonance.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Conversion settings.
    #[serde(default)]
    pub conversion: ConversionSection,

    /// Spike detector settings.
    #[serde(default)]
    pub spikes: ThresholdDetector,

    /// LED calibrations.
    #[serde(default)]
    pub calibration: Vec<Calibration>,
}

/// The `[conversion]` table.
#[derive(Debug, Default, Deserialize)]
pub struct ConversionSection {
    /// Epoch group naming.
    pub key_scheme: Option<EpochKeyScheme>,
}

impl Config {
    /// Load configuration from a TOML file, or defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Library settings, with `key_scheme` from the command line taking precedence.
    pub fn into_conversion_config(self, key_scheme: Option<EpochKeyScheme>) -> ConversionConfig {
        ConversionConfig::default()
            .with_key_scheme(key_scheme.or(self.conversion.key_scheme).unwrap_or_default())
            .with_detector(self.spikes)
            .with_calibration(CalibrationTable::new(self.calibration))
    }
}
