//! Detector and converter settings, loadable from TOML.
//!
//! ```toml
//! [detector]
//! max_sample_len = 65536
//! strip_markup = true
//! enabled_charsets = ["UTF-8", "ISO-8859-1", "Shift_JIS"]
//!
//! [converter]
//! error_mode = "lenient"
//! substitution = "?"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::codec::ErrorMode;
use crate::{Error, Result};

/// Smallest accepted `chunk_len`
pub const MIN_CHUNK_LEN: usize = 16;

/// Top-level configuration file layout
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Settings for [`crate::CharsetDetector`]
    pub detector: DetectorConfig,
    /// Settings for [`crate::CharsetConverter`]
    pub converter: ConverterConfig,
}

impl Config {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(text).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::InvalidConfig(format!("cannot read {}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "loading configuration");
        Self::from_toml_str(&text)
    }

    /// Check every section
    pub fn validate(&self) -> Result<()> {
        self.detector.validate()?;
        self.converter.validate()
    }
}

/// How a [`crate::CharsetDetector`] prepares and filters its input
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectorConfig {
    /// Bytes examined from the start of the input
    pub max_sample_len: usize,
    /// Drop `<...>` markup before analysis when the input looks like HTML or XML
    pub strip_markup: bool,
    /// Reject inputs longer than this
    pub max_input_len: Option<usize>,
    /// Guesses below this confidence are not reported
    pub min_confidence: u8,
    /// Restrict detection to these charset names
    pub enabled_charsets: Option<Vec<String>>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_sample_len: 64 * 1024,
            strip_markup: false,
            max_input_len: None,
            min_confidence: 1,
            enabled_charsets: None,
        }
    }
}

impl DetectorConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.max_sample_len == 0 {
            return Err(Error::InvalidConfig(
                "detector.max_sample_len must be positive".into(),
            ));
        }
        if self.min_confidence > 100 {
            return Err(Error::InvalidConfig(format!(
                "detector.min_confidence must be at most 100, got {}",
                self.min_confidence
            )));
        }
        Ok(())
    }
}

/// How a [`crate::CharsetConverter`] treats bad input
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterConfig {
    /// Fail or substitute on malformed and unmappable input
    pub error_mode: ErrorMode,
    /// Character written for unmappable input in lenient mode
    pub substitution: char,
    /// Input chunk length fed to the transcoders
    pub chunk_len: usize,
    /// Reject inputs longer than this (bytes or code units)
    pub max_input_len: Option<usize>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            substitution: '?',
            chunk_len: 4096,
            max_input_len: None,
        }
    }
}

impl ConverterConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.chunk_len < MIN_CHUNK_LEN {
            return Err(Error::InvalidConfig(format!(
                "converter.chunk_len must be at least {MIN_CHUNK_LEN}, got {}",
                self.chunk_len
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.detector.max_sample_len, 65536);
        assert!(!config.detector.strip_markup);
        assert_eq!(config.detector.min_confidence, 1);
        assert_eq!(config.converter.error_mode, ErrorMode::Strict);
        assert_eq!(config.converter.substitution, '?');
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_document() {
        let config = Config::from_toml_str(
            r#"
            [detector]
            strip_markup = true
            enabled_charsets = ["UTF-8", "KOI8-R"]

            [converter]
            error_mode = "lenient"
            substitution = "*"
            "#,
        )
        .unwrap();
        assert!(config.detector.strip_markup);
        assert_eq!(config.detector.max_sample_len, 65536);
        assert_eq!(
            config.detector.enabled_charsets,
            Some(vec!["UTF-8".to_string(), "KOI8-R".to_string()])
        );
        assert_eq!(config.converter.error_mode, ErrorMode::Lenient);
        assert_eq!(config.converter.substitution, '*');
        assert_eq!(config.converter.chunk_len, 4096);
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let err = Config::from_toml_str("[detector]\nsample = 10\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        assert!(matches!(
            Config::from_toml_str("[converter]\nchunk_len = 4\n"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[detector]\nmin_confidence = 101\n"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[detector]\nmax_sample_len = 0\n"),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/charsniff.toml").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(msg) if msg.contains("cannot read")));
    }
}
