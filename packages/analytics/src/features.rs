//! Calendar feature derivation.
//!
//! Month, year, weekday and ISO week come from the normalized report
//! date. The report hour is read from the raw report timestamp text so it
//! survives a report date that fails to normalize.

use chrono::{Datelike as _, NaiveDate, Timelike as _};
use crime_stats_analytics_models::{FeatureRecord, NormalizedRecord, PipelineSummary};
use crime_stats_source_models::Record;
use rayon::prelude::*;

use crate::AnalyticsError;
use crate::dates::{parse_crime_date, parse_report_date, parse_time_of_day};
use crate::pipeline::PipelineContext;

/// Normalizes both timestamps of a record.
#[must_use]
pub fn normalize<'a>(record: &'a Record, crime_range_delimiter: &str) -> NormalizedRecord<'a> {
    let report_date = parse_report_date(record.report_timestamp.as_deref());
    let crime_date = parse_crime_date(record.crime_date_time.as_deref(), crime_range_delimiter);

    if report_date.is_none()
        && let Some(raw) = &record.report_timestamp
    {
        log::trace!("Unparseable report timestamp: {raw:?}");
    }
    if crime_date.is_none()
        && let Some(raw) = &record.crime_date_time
    {
        log::trace!("Unparseable crime date-time: {raw:?}");
    }

    NormalizedRecord {
        record,
        report_date,
        crime_date,
    }
}

/// Derives the calendar features of a normalized record.
#[must_use]
pub fn derive(normalized: NormalizedRecord<'_>) -> FeatureRecord<'_> {
    let report_date = normalized.report_date;

    FeatureRecord {
        report_month: report_date.map(|d| d.month()),
        report_year: report_date.map(|d| d.year()),
        weekday: report_date.map(sunday_first_weekday),
        report_hour: report_hour(normalized.record),
        iso_week: report_date.map(|d| d.iso_week().week()),
        normalized,
    }
}

/// Hour (0-23) of the raw report timestamp.
#[must_use]
pub fn report_hour(record: &Record) -> Option<u32> {
    parse_time_of_day(record.report_timestamp.as_deref()).map(|t| t.hour())
}

/// Weekday number with 1 = Sunday .. 7 = Saturday.
#[must_use]
pub fn sunday_first_weekday(date: NaiveDate) -> u32 {
    date.weekday().number_from_sunday()
}

/// Normalizes and derives features for every record, in input order.
///
/// # Errors
///
/// Returns [`AnalyticsError::Cancelled`] if the context is cancelled
/// before all chunks are processed.
pub fn derive_all<'a>(
    ctx: &PipelineContext,
    records: &'a [Record],
) -> Result<Vec<FeatureRecord<'a>>, AnalyticsError> {
    let delimiter = ctx.config().crime_range_delimiter.as_str();

    let chunks = records
        .par_chunks(ctx.config().chunk_size)
        .map(|chunk| -> Result<Vec<FeatureRecord<'a>>, AnalyticsError> {
            ctx.check_cancelled()?;
            Ok(chunk
                .iter()
                .map(|record| derive(normalize(record, delimiter)))
                .collect())
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(chunks.into_iter().flatten().collect())
}

/// Counts records and absent derived values.
#[must_use]
pub fn summarize(features: &[FeatureRecord<'_>]) -> PipelineSummary {
    let mut summary = PipelineSummary {
        total_records: features.len() as u64,
        ..PipelineSummary::default()
    };

    for feature in features {
        if feature.normalized.report_date.is_none() {
            summary.missing_report_date += 1;
        }
        if feature.normalized.crime_date.is_none() {
            summary.missing_crime_date += 1;
        }
        if feature.report_hour.is_none() {
            summary.missing_report_hour += 1;
        }
    }

    summary
}
