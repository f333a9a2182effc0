//! The fixed battery of aggregation queries.
//!
//! Each function is one parameterization of the [`aggregate`] engine; its
//! [`QueryKind`] decides row order and whether hourless records count. Text
//! keys are counted as borrowed `&str` and only the surviving rows are
//! copied into owned strings.
//!
//! [`aggregate`]: crate::aggregate

use crime_stats_analytics_models::{FeatureRecord, FrequencyTable, HourCategory, QueryKind};

use crate::AnalyticsError;
use crate::aggregate::{self, Grouping};
use crate::pipeline::PipelineContext;
use crate::top_n::top_n;

/// Top crime categories by count.
///
/// # Errors
///
/// Returns [`AnalyticsError::Cancelled`] if the run is cancelled.
pub fn crimes_by_type(
    ctx: &PipelineContext,
    features: &[FeatureRecord<'_>],
) -> Result<FrequencyTable<String>, AnalyticsError> {
    top_text(ctx, QueryKind::CrimesByType, features, |f| {
        f.record().category.as_deref()
    })
}

/// Top neighborhoods by count.
///
/// # Errors
///
/// Returns [`AnalyticsError::Cancelled`] if the run is cancelled.
pub fn crimes_by_neighborhood(
    ctx: &PipelineContext,
    features: &[FeatureRecord<'_>],
) -> Result<FrequencyTable<String>, AnalyticsError> {
    top_text(ctx, QueryKind::CrimesByNeighborhood, features, |f| {
        f.record().neighborhood.as_deref()
    })
}

/// Top reporting areas by count.
///
/// # Errors
///
/// Returns [`AnalyticsError::Cancelled`] if the run is cancelled.
pub fn top_reporting_areas(
    ctx: &PipelineContext,
    features: &[FeatureRecord<'_>],
) -> Result<FrequencyTable<String>, AnalyticsError> {
    top_text(ctx, QueryKind::TopReportingAreas, features, |f| {
        f.record().reporting_area.as_deref()
    })
}

/// Counts per report month, ascending.
///
/// # Errors
///
/// Returns [`AnalyticsError::Cancelled`] if the run is cancelled.
pub fn crimes_by_month(
    ctx: &PipelineContext,
    features: &[FeatureRecord<'_>],
) -> Result<FrequencyTable<u32>, AnalyticsError> {
    aggregate::query(ctx, QueryKind::CrimesByMonth, features, |f| {
        Grouping::or_unknown(f.report_month)
    })
}

/// Counts per Sunday-first weekday, ascending.
///
/// # Errors
///
/// Returns [`AnalyticsError::Cancelled`] if the run is cancelled.
pub fn crimes_by_weekday(
    ctx: &PipelineContext,
    features: &[FeatureRecord<'_>],
) -> Result<FrequencyTable<u32>, AnalyticsError> {
    aggregate::query(ctx, QueryKind::CrimesByWeekday, features, |f| {
        Grouping::or_unknown(f.weekday)
    })
}

/// Counts per report hour, ascending. Records without an hour are not
/// counted.
///
/// # Errors
///
/// Returns [`AnalyticsError::Cancelled`] if the run is cancelled.
pub fn crimes_by_hour(
    ctx: &PipelineContext,
    features: &[FeatureRecord<'_>],
) -> Result<FrequencyTable<u32>, AnalyticsError> {
    aggregate::query(ctx, QueryKind::CrimesByHour, features, |f| {
        Grouping::or_unknown(f.report_hour)
    })
}

/// Counts per ISO week, ascending.
///
/// # Errors
///
/// Returns [`AnalyticsError::Cancelled`] if the run is cancelled.
pub fn crimes_by_week(
    ctx: &PipelineContext,
    features: &[FeatureRecord<'_>],
) -> Result<FrequencyTable<u32>, AnalyticsError> {
    aggregate::query(ctx, QueryKind::CrimesByWeek, features, |f| {
        Grouping::or_unknown(f.iso_week)
    })
}

/// Counts per report year, ascending.
///
/// # Errors
///
/// Returns [`AnalyticsError::Cancelled`] if the run is cancelled.
pub fn crimes_by_year(
    ctx: &PipelineContext,
    features: &[FeatureRecord<'_>],
) -> Result<FrequencyTable<i32>, AnalyticsError> {
    aggregate::query(ctx, QueryKind::CrimesByYear, features, |f| {
        Grouping::or_unknown(f.report_year)
    })
}

/// Counts per `(report hour, category)`, ranked, untruncated. Records
/// without an hour are not counted.
///
/// # Errors
///
/// Returns [`AnalyticsError::Cancelled`] if the run is cancelled.
pub fn crime_type_by_hour(
    ctx: &PipelineContext,
    features: &[FeatureRecord<'_>],
) -> Result<FrequencyTable<HourCategory>, AnalyticsError> {
    let table = aggregate::query(ctx, QueryKind::CrimeTypeByHour, features, |f| {
        Grouping::or_excluded(f.report_hour.map(|hour| HourCategory {
            hour,
            category: f.record().category.as_deref(),
        }))
    })?;

    Ok(table.map_keys(|key| HourCategory {
        hour: key.hour,
        category: key.category.map(str::to_owned),
    }))
}

/// Ranks a text field (absent values under unknown) and keeps the
/// configured top N.
fn top_text<'a>(
    ctx: &PipelineContext,
    kind: QueryKind,
    features: &[FeatureRecord<'a>],
    field: impl Fn(&FeatureRecord<'a>) -> Option<&'a str> + Sync,
) -> Result<FrequencyTable<String>, AnalyticsError> {
    let table = aggregate::query(ctx, kind, features, |f| Grouping::or_unknown(field(f)))?;
    Ok(top_n(table, ctx.config().top_n)?.map_keys(str::to_owned))
}

#[cfg(test)]
mod tests {
    use crime_stats_analytics_models::PipelineConfig;
    use crime_stats_source_models::Record;

    use super::*;
    use crate::features::derive_all;

    fn ctx() -> PipelineContext {
        PipelineContext::new(PipelineConfig {
            chunk_size: 2,
            ..PipelineConfig::default()
        })
        .unwrap()
    }

    fn incident(category: Option<&str>, neighborhood: Option<&str>, report: &str) -> Record {
        Record::from_fields(category, neighborhood, Some("101"), Some(report), None)
    }

    fn sample() -> Vec<Record> {
        vec![
            incident(Some("Theft"), Some("North"), "03/01/2021 02:00:00 PM"),
            incident(Some("Theft"), Some("North"), "03/01/2021 02:30:00 PM"),
            incident(Some("Assault"), None, "03/07/2021 09:00:00 AM"),
            incident(None, Some("South"), ""),
        ]
    }

    #[test]
    fn text_queries_keep_unknown_bucket() {
        let records = sample();
        let features = derive_all(&ctx(), &records).unwrap();

        let by_type = crimes_by_type(&ctx(), &features).unwrap();
        assert_eq!(by_type.count_of(Some("Theft")), 2);
        assert_eq!(by_type.count_of::<str>(None), 1);
        assert_eq!(by_type.total(), 4);

        let by_hood = crimes_by_neighborhood(&ctx(), &features).unwrap();
        assert_eq!(by_hood.count_of::<str>(None), 1);
        assert_eq!(by_hood.total(), 4);

        let areas = top_reporting_areas(&ctx(), &features).unwrap();
        assert_eq!(areas.count_of(Some("101")), 4);
    }

    #[test]
    fn hour_queries_exclude_missing_hours() {
        let records = sample();
        let features = derive_all(&ctx(), &records).unwrap();

        let by_hour = crimes_by_hour(&ctx(), &features).unwrap();
        let pairs: Vec<_> = by_hour.entries().iter().map(|e| (e.key, e.count)).collect();
        assert_eq!(pairs, [(Some(9), 1), (Some(14), 2)]);

        let composite = crime_type_by_hour(&ctx(), &features).unwrap();
        assert_eq!(composite.total(), 3);
        assert_eq!(
            composite.entries()[0].key,
            Some(HourCategory {
                hour: 14,
                category: Some("Theft".to_owned())
            })
        );
    }

    #[test]
    fn calendar_queries_bucket_missing_dates_as_unknown() {
        let records = sample();
        let features = derive_all(&ctx(), &records).unwrap();

        let by_month = crimes_by_month(&ctx(), &features).unwrap();
        let pairs: Vec<_> = by_month.entries().iter().map(|e| (e.key, e.count)).collect();
        assert_eq!(pairs, [(None, 1), (Some(3), 3)]);

        // 2021-03-01 is a Monday, 2021-03-07 a Sunday.
        let by_weekday = crimes_by_weekday(&ctx(), &features).unwrap();
        let pairs: Vec<_> = by_weekday.entries().iter().map(|e| (e.key, e.count)).collect();
        assert_eq!(pairs, [(None, 1), (Some(1), 1), (Some(2), 2)]);

        let by_week = crimes_by_week(&ctx(), &features).unwrap();
        assert_eq!(by_week.count_of(Some(&9_u32)), 3);
        assert_eq!(by_week.total(), 4);

        let by_year = crimes_by_year(&ctx(), &features).unwrap();
        assert_eq!(by_year.count_of(Some(&2021_i32)), 3);
        assert_eq!(by_year.count_of::<i32>(None), 1);
    }

    #[test]
    fn ranked_text_queries_truncate_to_top_n() {
        let records: Vec<Record> = (0..20)
            .flat_map(|i| {
                let name = format!("Category {i:02}");
                (0..=i).map(move |_| incident(Some(name.as_str()), None, ""))
            })
            .collect();
        let features = derive_all(&ctx(), &records).unwrap();

        let by_type = crimes_by_type(&ctx(), &features).unwrap();
        assert_eq!(by_type.len(), 15);
        assert_eq!(by_type.entries()[0].key.as_deref(), Some("Category 19"));
        assert_eq!(by_type.entries()[14].key.as_deref(), Some("Category 05"));
    }
}
