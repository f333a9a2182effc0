//! Pipeline context and end-to-end run.
//!
//! [`run`] normalizes and derives features once, runs every query
//! concurrently on the rayon pool over the shared immutable feature set,
//! then builds the cross-tabulation and neighborhood shares from the
//! finished tables.

use std::sync::Arc;
use std::time::Instant;

use crime_stats_analytics_models::{
    FeatureRecord, FrequencyTable, HourCategory, PipelineConfig, PipelineSummary, QueryKind,
    ResultBundle,
};
use crime_stats_source::progress::{ProgressCallback, null_progress};
use crime_stats_source_models::Record;
use tokio_util::sync::CancellationToken;

use crate::crosstab::cross_tabulate;
use crate::share::shares;
use crate::{AnalyticsError, features, queries};

/// Share of records with an unparseable report date above which a warning
/// is logged.
const MISSING_DATE_WARN_RATIO: f64 = 0.5;

/// Explicit state for one pipeline run, built by the caller.
pub struct PipelineContext {
    config: PipelineConfig,
    cancel: CancellationToken,
    progress: Arc<dyn ProgressCallback>,
}

impl PipelineContext {
    /// Creates a context with a fresh cancellation token and no progress
    /// reporting.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidConfig`] if `top_n` or
    /// `chunk_size` is zero, or the crime range delimiter is empty.
    pub fn new(config: PipelineConfig) -> Result<Self, AnalyticsError> {
        validate(&config)?;
        Ok(Self {
            config,
            cancel: CancellationToken::new(),
            progress: null_progress(),
        })
    }

    /// Reports query progress through `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Uses an externally owned cancellation token.
    #[must_use]
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Token that aborts the run when cancelled.
    #[must_use]
    pub const fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Progress reporter.
    #[must_use]
    pub fn progress(&self) -> &Arc<dyn ProgressCallback> {
        &self.progress
    }

    /// Fails if the run has been cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Cancelled`] once the token is cancelled.
    pub fn check_cancelled(&self) -> Result<(), AnalyticsError> {
        if self.cancel.is_cancelled() {
            Err(AnalyticsError::Cancelled)
        } else {
            Ok(())
        }
    }
}

fn validate(config: &PipelineConfig) -> Result<(), AnalyticsError> {
    let problem = if config.top_n == 0 {
        "top_n must be at least 1"
    } else if config.chunk_size == 0 {
        "chunk_size must be at least 1"
    } else if config.crime_range_delimiter.is_empty() {
        "crime_range_delimiter must not be empty"
    } else {
        return Ok(());
    };

    Err(AnalyticsError::InvalidConfig {
        message: problem.to_string(),
    })
}

/// Output of every group-by query of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTables {
    /// Top crime categories.
    pub crimes_by_type: FrequencyTable<String>,
    /// Top neighborhoods.
    pub crimes_by_neighborhood: FrequencyTable<String>,
    /// Counts per report month.
    pub crimes_by_month: FrequencyTable<u32>,
    /// Counts per weekday.
    pub crimes_by_weekday: FrequencyTable<u32>,
    /// Counts per report hour.
    pub crimes_by_hour: FrequencyTable<u32>,
    /// Counts per ISO week.
    pub crimes_by_week: FrequencyTable<u32>,
    /// Top reporting areas.
    pub top_reporting_areas: FrequencyTable<String>,
    /// Counts per report year.
    pub crimes_by_year: FrequencyTable<i32>,
    /// Counts per (hour, category).
    pub crime_type_by_hour: FrequencyTable<HourCategory>,
}

/// Runs every query concurrently over `features`.
///
/// Queries share no mutable state; each reads the same slice and produces
/// its own table.
///
/// # Errors
///
/// Returns [`AnalyticsError::Cancelled`] if the run is cancelled before
/// every query completes.
pub fn run_queries(
    ctx: &PipelineContext,
    features: &[FeatureRecord<'_>],
) -> Result<QueryTables, AnalyticsError> {
    ctx.progress().set_total(QueryKind::all().len() as u64);
    ctx.progress().set_message("Running queries".to_string());

    let mut by_type = Err(AnalyticsError::Cancelled);
    let mut by_neighborhood = Err(AnalyticsError::Cancelled);
    let mut by_month = Err(AnalyticsError::Cancelled);
    let mut by_weekday = Err(AnalyticsError::Cancelled);
    let mut by_hour = Err(AnalyticsError::Cancelled);
    let mut by_week = Err(AnalyticsError::Cancelled);
    let mut reporting_areas = Err(AnalyticsError::Cancelled);
    let mut by_year = Err(AnalyticsError::Cancelled);
    let mut type_by_hour = Err(AnalyticsError::Cancelled);

    rayon::scope(|s| {
        s.spawn(|_| {
            by_type = timed(ctx, QueryKind::CrimesByType, || {
                queries::crimes_by_type(ctx, features)
            });
        });
        s.spawn(|_| {
            by_neighborhood = timed(ctx, QueryKind::CrimesByNeighborhood, || {
                queries::crimes_by_neighborhood(ctx, features)
            });
        });
        s.spawn(|_| {
            by_month = timed(ctx, QueryKind::CrimesByMonth, || {
                queries::crimes_by_month(ctx, features)
            });
        });
        s.spawn(|_| {
            by_weekday = timed(ctx, QueryKind::CrimesByWeekday, || {
                queries::crimes_by_weekday(ctx, features)
            });
        });
        s.spawn(|_| {
            by_hour = timed(ctx, QueryKind::CrimesByHour, || {
                queries::crimes_by_hour(ctx, features)
            });
        });
        s.spawn(|_| {
            by_week = timed(ctx, QueryKind::CrimesByWeek, || {
                queries::crimes_by_week(ctx, features)
            });
        });
        s.spawn(|_| {
            reporting_areas = timed(ctx, QueryKind::TopReportingAreas, || {
                queries::top_reporting_areas(ctx, features)
            });
        });
        s.spawn(|_| {
            by_year = timed(ctx, QueryKind::CrimesByYear, || {
                queries::crimes_by_year(ctx, features)
            });
        });
        s.spawn(|_| {
            type_by_hour = timed(ctx, QueryKind::CrimeTypeByHour, || {
                queries::crime_type_by_hour(ctx, features)
            });
        });
    });

    ctx.progress().finish("queries complete".to_string());

    Ok(QueryTables {
        crimes_by_type: by_type?,
        crimes_by_neighborhood: by_neighborhood?,
        crimes_by_month: by_month?,
        crimes_by_weekday: by_weekday?,
        crimes_by_hour: by_hour?,
        crimes_by_week: by_week?,
        top_reporting_areas: reporting_areas?,
        crimes_by_year: by_year?,
        crime_type_by_hour: type_by_hour?,
    })
}

fn timed<K>(
    ctx: &PipelineContext,
    kind: QueryKind,
    query: impl FnOnce() -> Result<FrequencyTable<K>, AnalyticsError>,
) -> Result<FrequencyTable<K>, AnalyticsError> {
    let start = Instant::now();
    let result = query();

    match &result {
        Ok(table) => log::debug!(
            "[{kind}] {} row(s) covering {} record(s) in {:.1}ms",
            table.len(),
            table.total(),
            start.elapsed().as_secs_f64() * 1000.0
        ),
        Err(e) => log::warn!("[{kind}] {e}"),
    }
    ctx.progress().inc(1);

    result
}

/// Runs the full pipeline over an in-memory batch.
///
/// An empty batch is valid and yields empty tables and an empty matrix.
///
/// # Errors
///
/// Returns [`AnalyticsError::Cancelled`] if the context is cancelled at
/// any point during the run.
pub fn run(ctx: &PipelineContext, records: &[Record]) -> Result<ResultBundle, AnalyticsError> {
    let start = Instant::now();
    ctx.check_cancelled()?;

    log::info!("Deriving features for {} record(s)", records.len());
    let features = features::derive_all(ctx, records)?;
    let summary = features::summarize(&features);
    log_summary(&summary);

    ctx.check_cancelled()?;
    let tables = run_queries(ctx, &features)?;

    ctx.check_cancelled()?;
    let crime_hour_matrix = cross_tabulate(&tables.crime_type_by_hour, &tables.crimes_by_type);
    let neighborhood_share = shares(&tables.crimes_by_neighborhood);

    log::info!(
        "Pipeline finished in {:.2}s",
        start.elapsed().as_secs_f64()
    );

    Ok(ResultBundle {
        summary,
        top_n: ctx.config().top_n,
        crimes_by_type: tables.crimes_by_type,
        crimes_by_neighborhood: tables.crimes_by_neighborhood,
        crimes_by_month: tables.crimes_by_month,
        crimes_by_weekday: tables.crimes_by_weekday,
        crimes_by_hour: tables.crimes_by_hour,
        crimes_by_week: tables.crimes_by_week,
        top_reporting_areas: tables.top_reporting_areas,
        crimes_by_year: tables.crimes_by_year,
        crime_type_by_hour: tables.crime_type_by_hour,
        crime_hour_matrix,
        neighborhood_share,
    })
}

fn log_summary(summary: &PipelineSummary) {
    log::info!(
        "{} record(s): {} without report date, {} without crime date, {} without report hour",
        summary.total_records,
        summary.missing_report_date,
        summary.missing_crime_date,
        summary.missing_report_hour
    );

    #[allow(clippy::cast_precision_loss)]
    let missing_ratio = if summary.total_records == 0 {
        0.0
    } else {
        summary.missing_report_date as f64 / summary.total_records as f64
    };
    if missing_ratio > MISSING_DATE_WARN_RATIO {
        log::warn!(
            "{:.0}% of report timestamps did not parse; check the report timestamp column mapping",
            missing_ratio * 100.0
        );
    }
}
