//! TOML configuration.
//!
//! Every key is optional; missing sections and keys fall back to the
//! built-in defaults.
//!
//! ```toml
//! [scan]
//! max_pages = 4
//! min_fields = 7
//!
//! [batch]
//! progress_stride = 10
//!
//! [export]
//! path = "conva_results.csv"
//! ```

use std::path::{Path, PathBuf};

use conva_extract_models::{
    DEFAULT_MAX_PAGES, DEFAULT_MIN_FIELDS, DEFAULT_PROGRESS_STRIDE, ScanConfig,
};
use serde::Deserialize;

use crate::batch::BatchOptions;
use crate::export::default_export_path;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has the wrong shape.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Page scanning section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    pub max_pages: usize,
    pub min_fields: usize,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            min_fields: DEFAULT_MIN_FIELDS,
        }
    }
}

/// Batch runner section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BatchSection {
    pub progress_stride: usize,
}

impl Default for BatchSection {
    fn default() -> Self {
        Self {
            progress_stride: DEFAULT_PROGRESS_STRIDE,
        }
    }
}

/// Export section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// Where the CSV is written. Defaults to beside the executable.
    pub path: Option<PathBuf>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanSection,
    pub batch: BatchSection,
    pub export: ExportSection,
}

impl Config {
    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the TOML is invalid.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// Loads configuration from the TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;

        log::debug!("Loaded config from {}: {config:?}", path.display());

        Ok(config)
    }

    /// Scan bounds, clamped to valid ranges.
    #[must_use]
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::new(self.scan.max_pages, self.scan.min_fields)
    }

    /// Batch runner options.
    #[must_use]
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions::new(self.batch.progress_stride)
    }

    /// Export destination.
    #[must_use]
    pub fn export_path(&self) -> PathBuf {
        self.export.path.clone().unwrap_or_else(default_export_path)
    }
}
