#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Crime incident record source.
//!
//! Reads a tabular incident export into typed [`Record`]s, resolving
//! columns by name through a [`FieldMapping`]. Any failure here (missing
//! file, malformed CSV, absent column) is fatal and surfaces before the
//! analytics pipeline runs.
//!
//! [`Record`]: crime_stats_source_models::Record
//! [`FieldMapping`]: crime_stats_source_models::FieldMapping

pub mod csv_source;
pub mod progress;

/// Errors that can occur while reading incident records.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The input could not be opened or read.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// CSV parsing failed.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// A mapped column is not present in the header row.
    #[error("Column '{column}' (for field {field}) not found in header row")]
    MissingColumn {
        /// Record field the column was mapped to.
        field: &'static str,
        /// Column name that was looked up.
        column: String,
    },

    /// The input has no header row.
    #[error("Input contains no header row")]
    NoHeader,
}
