#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw crime incident records and the column mapping used to read them.
//!
//! A [`Record`] is the typed boundary between a record source (CSV file,
//! in-memory fixture, etc.) and the aggregation pipeline. Every field is
//! kept as text exactly as the source supplied it; blank values are
//! normalized to `None` at ingestion so downstream code never has to
//! distinguish "empty" from "missing".

use serde::{Deserialize, Serialize};

/// One crime incident as read from the source.
///
/// Immutable once read. Timestamps are left unparsed here; the analytics
/// pipeline owns date normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Free-text crime category (e.g. `"Larceny from MV"`).
    pub category: Option<String>,
    /// Neighborhood identifier.
    pub neighborhood: Option<String>,
    /// Reporting-area identifier. Kept as text even when numeric.
    pub reporting_area: Option<String>,
    /// Raw report timestamp, e.g. `"02/22/2021 09:28:00 AM"`.
    pub report_timestamp: Option<String>,
    /// Raw crime date-time range, e.g. `"02/21/2021 20:00 - 02/22/2021 08:00"`.
    pub crime_date_time: Option<String>,
}

impl Record {
    /// Builds a record from optional borrowed fields, treating blank text
    /// as absent.
    #[must_use]
    pub fn from_fields(
        category: Option<&str>,
        neighborhood: Option<&str>,
        reporting_area: Option<&str>,
        report_timestamp: Option<&str>,
        crime_date_time: Option<&str>,
    ) -> Self {
        Self {
            category: non_blank(category),
            neighborhood: non_blank(neighborhood),
            reporting_area: non_blank(reporting_area),
            report_timestamp: non_blank(report_timestamp),
            crime_date_time: non_blank(crime_date_time),
        }
    }
}

/// Trims a raw field and maps blank text to `None`.
#[must_use]
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Source column names for each [`Record`] field.
///
/// Defaults match the published incident export (`crime`,
/// `neighborhood`, `reporting_area`, `date_of_report`, `crime_date_time`).
/// Any subset may be overridden from a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    /// Column holding the crime category.
    pub category: String,
    /// Column holding the neighborhood.
    pub neighborhood: String,
    /// Column holding the reporting area.
    pub reporting_area: String,
    /// Column holding the report timestamp.
    pub report_timestamp: String,
    /// Column holding the crime date-time range.
    pub crime_date_time: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            category: "crime".to_owned(),
            neighborhood: "neighborhood".to_owned(),
            reporting_area: "reporting_area".to_owned(),
            report_timestamp: "date_of_report".to_owned(),
            crime_date_time: "crime_date_time".to_owned(),
        }
    }
}

impl FieldMapping {
    /// Returns `(field, column)` pairs in [`Record`] field order.
    #[must_use]
    pub fn columns(&self) -> [(&'static str, &str); 5] {
        [
            ("category", self.category.as_str()),
            ("neighborhood", self.neighborhood.as_str()),
            ("reporting_area", self.reporting_area.as_str()),
            ("report_timestamp", self.report_timestamp.as_str()),
            ("crime_date_time", self.crime_date_time.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_become_none() {
        let record = Record::from_fields(Some("  "), Some(""), None, Some(" x "), Some("y"));
        assert_eq!(record.category, None);
        assert_eq!(record.neighborhood, None);
        assert_eq!(record.reporting_area, None);
        assert_eq!(record.report_timestamp.as_deref(), Some("x"));
        assert_eq!(record.crime_date_time.as_deref(), Some("y"));
    }

    #[test]
    fn partial_mapping_keeps_defaults() {
        let mapping: FieldMapping =
            serde_json::from_str(r#"{"category":"offense"}"#).unwrap();
        assert_eq!(mapping.category, "offense");
        assert_eq!(mapping.report_timestamp, "date_of_report");
    }
}
