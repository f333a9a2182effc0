//! TOML run configuration.
//!
//! ```toml
//! [pipeline]
//! top_n = 10
//! chunk_size = 4096
//! crime_range_delimiter = " - "
//!
//! [fields]
//! category = "offense"
//! report_timestamp = "reported_at"
//! ```
//!
//! Every key is optional and falls back to its default.

use std::path::Path;

use crime_stats_analytics_models::PipelineConfig;
use crime_stats_source_models::FieldMapping;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Config file path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or has mistyped keys.
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        /// Config file path.
        path: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
}

/// Everything a run can be configured with from file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Pipeline tuning.
    pub pipeline: PipelineConfig,
    /// Input column names.
    pub fields: FieldMapping,
}

impl CliConfig {
    /// Reads the config at `path`, or the defaults when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        log::debug!("Loaded config from {}: {config:?}", path.display());
        Ok(config)
    }

    /// Parses config text.
    ///
    /// # Errors
    ///
    /// Returns the TOML error if `text` is malformed.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::de::from_str(text)
    }

    /// Applies command line overrides on top of file values.
    #[must_use]
    pub fn with_top_n(mut self, top_n: Option<usize>) -> Self {
        if let Some(top_n) = top_n {
            self.pipeline.top_n = top_n;
        }
        self
    }
}

/// Parses a `--delimiter` value: one ASCII character, or `tab` / `\t`.
///
/// # Errors
///
/// Returns a message for clap if the value is not a single ASCII
/// character.
pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\\t" => Ok(b'\t'),
        _ => match value.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(format!("delimiter must be a single ASCII character, got {value:?}")),
        },
    }
}
