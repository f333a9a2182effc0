#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation result types for the crime statistics pipeline.
//!
//! Defines the intermediate record shapes (normalized dates, derived
//! calendar features), the frequency and cross tables produced by each
//! query, and the [`ResultBundle`] handed to a rendering layer.

pub mod table;

use chrono::NaiveDate;
use crime_stats_source_models::Record;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use table::{CrossTable, FrequencyEntry, FrequencyTable, HourCategory, TableOrder};

/// Number of hour columns in the crime-type × hour matrix.
pub const HOURS_PER_DAY: u32 = 24;

/// Weekday labels indexed by `weekday - 1` (1 = Sunday .. 7 = Saturday).
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Returns the display label for a Sunday-first weekday number.
#[must_use]
pub fn weekday_label(weekday: u32) -> Option<&'static str> {
    let index = usize::try_from(weekday.checked_sub(1)?).ok()?;
    WEEKDAY_LABELS.get(index).copied()
}

/// A [`Record`] with its two timestamps reduced to calendar dates.
///
/// Either date is `None` when the raw text is missing or does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord<'a> {
    /// The source record.
    pub record: &'a Record,
    /// Date part of the report timestamp.
    pub report_date: Option<NaiveDate>,
    /// Date part of the crime range start.
    pub crime_date: Option<NaiveDate>,
}

/// A [`NormalizedRecord`] with derived calendar features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRecord<'a> {
    /// Normalized dates and the source record.
    #[serde(flatten)]
    pub normalized: NormalizedRecord<'a>,
    /// Month of `report_date` (1-12).
    pub report_month: Option<u32>,
    /// Year of `report_date`.
    pub report_year: Option<i32>,
    /// Weekday of `report_date`, 1 = Sunday .. 7 = Saturday.
    pub weekday: Option<u32>,
    /// Hour of the raw report timestamp (0-23).
    pub report_hour: Option<u32>,
    /// ISO 8601 week of `report_date` (1-53).
    pub iso_week: Option<u32>,
}

impl<'a> FeatureRecord<'a> {
    /// The source record.
    #[must_use]
    pub const fn record(&self) -> &'a Record {
        self.normalized.record
    }
}

/// Tunables for a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of entries kept by ranked queries and cross-table rows.
    pub top_n: usize,
    /// Records per parallel work unit; cancellation is checked per chunk.
    pub chunk_size: usize,
    /// Separator between start and end in the crime date-time range.
    pub crime_range_delimiter: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_n: 15,
            chunk_size: 8192,
            crime_range_delimiter: " - ".to_owned(),
        }
    }
}

/// The fixed battery of aggregation queries.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QueryKind {
    /// Top crime categories.
    CrimesByType,
    /// Top neighborhoods.
    CrimesByNeighborhood,
    /// Counts per report month.
    CrimesByMonth,
    /// Counts per weekday.
    CrimesByWeekday,
    /// Counts per report hour (absent hours excluded).
    CrimesByHour,
    /// Counts per ISO week.
    CrimesByWeek,
    /// Top reporting areas.
    TopReportingAreas,
    /// Counts per report year.
    CrimesByYear,
    /// Counts per (hour, category) pair (absent hours excluded).
    CrimeTypeByHour,
}

impl QueryKind {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::CrimesByType,
            Self::CrimesByNeighborhood,
            Self::CrimesByMonth,
            Self::CrimesByWeekday,
            Self::CrimesByHour,
            Self::CrimesByWeek,
            Self::TopReportingAreas,
            Self::CrimesByYear,
            Self::CrimeTypeByHour,
        ]
    }

    /// Human-readable chart title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::CrimesByType => "Top crime types",
            Self::CrimesByNeighborhood => "Top neighborhoods by crime count",
            Self::CrimesByMonth => "Crimes by month",
            Self::CrimesByWeekday => "Crimes by day of week",
            Self::CrimesByHour => "Crimes by hour",
            Self::CrimesByWeek => "Crimes by week of year",
            Self::TopReportingAreas => "Top reporting areas",
            Self::CrimesByYear => "Crimes by year",
            Self::CrimeTypeByHour => "Crime types by hour",
        }
    }

    /// Whether the result is ordered by descending count.
    #[must_use]
    pub const fn order(self) -> TableOrder {
        match self {
            Self::CrimesByType
            | Self::CrimesByNeighborhood
            | Self::TopReportingAreas
            | Self::CrimeTypeByHour => TableOrder::CountDescending,
            Self::CrimesByMonth
            | Self::CrimesByWeekday
            | Self::CrimesByHour
            | Self::CrimesByWeek
            | Self::CrimesByYear => TableOrder::KeyAscending,
        }
    }

    /// Whether records without a report hour are dropped before counting.
    #[must_use]
    pub const fn excludes_missing_hour(self) -> bool {
        matches!(self, Self::CrimesByHour | Self::CrimeTypeByHour)
    }
}

/// One neighborhood's slice of the top-N neighborhood total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareEntry {
    /// Neighborhood, `None` for the unknown bucket.
    pub key: Option<String>,
    /// Incident count.
    pub count: u64,
    /// Percentage of the top-N total (0-100, unrounded).
    pub percent: f64,
}

/// Record and parse-failure counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSummary {
    /// Records fed to the pipeline.
    pub total_records: u64,
    /// Records whose report timestamp did not yield a date.
    pub missing_report_date: u64,
    /// Records whose crime range did not yield a start date.
    pub missing_crime_date: u64,
    /// Records whose report timestamp did not yield an hour.
    pub missing_report_hour: u64,
}

/// Every output table of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultBundle {
    /// Record and parse-failure counts.
    pub summary: PipelineSummary,
    /// Truncation size used by ranked queries.
    pub top_n: usize,
    /// Top crime categories.
    pub crimes_by_type: FrequencyTable<String>,
    /// Top neighborhoods.
    pub crimes_by_neighborhood: FrequencyTable<String>,
    /// Counts per report month.
    pub crimes_by_month: FrequencyTable<u32>,
    /// Counts per weekday (1 = Sunday).
    pub crimes_by_weekday: FrequencyTable<u32>,
    /// Counts per report hour.
    pub crimes_by_hour: FrequencyTable<u32>,
    /// Counts per ISO week.
    pub crimes_by_week: FrequencyTable<u32>,
    /// Top reporting areas.
    pub top_reporting_areas: FrequencyTable<String>,
    /// Counts per report year.
    pub crimes_by_year: FrequencyTable<i32>,
    /// Counts per (hour, category), ranked.
    pub crime_type_by_hour: FrequencyTable<HourCategory>,
    /// Dense top-category × hour matrix.
    pub crime_hour_matrix: CrossTable,
    /// Top neighborhood share of the top-N total.
    pub neighborhood_share: Vec<ShareEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_labels_are_sunday_first() {
        assert_eq!(weekday_label(1), Some("Sun"));
        assert_eq!(weekday_label(7), Some("Sat"));
        assert_eq!(weekday_label(0), None);
        assert_eq!(weekday_label(8), None);
    }

    #[test]
    fn query_kind_round_trips_through_strum() {
        for kind in QueryKind::all() {
            let parsed: QueryKind = kind.as_ref().parse().unwrap();
            assert_eq!(parsed, *kind);
        }
        assert_eq!(QueryKind::CrimeTypeByHour.to_string(), "crime_type_by_hour");
    }

    #[test]
    fn hour_queries_are_the_only_filtered_ones() {
        let filtered: Vec<_> = QueryKind::all()
            .iter()
            .filter(|k| k.excludes_missing_hour())
            .collect();
        assert_eq!(
            filtered,
            [&QueryKind::CrimesByHour, &QueryKind::CrimeTypeByHour]
        );
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{"top_n":10}"#).unwrap();
        assert_eq!(config.top_n, 10);
        assert_eq!(config.chunk_size, 8192);
        assert_eq!(config.crime_range_delimiter, " - ");
    }
}
