//! Generic group-by-count engine.
//!
//! A query is a key extractor over [`FeatureRecord`]s. The extractor decides
//! per record whether it lands in a keyed bucket, the "unknown" bucket, or
//! is excluded from the query entirely. Counting is a parallel fold over
//! record chunks followed by a reduce that adds per-chunk counts, so the
//! result does not depend on the order records are visited.

use std::collections::HashMap;
use std::hash::Hash;

use crime_stats_analytics_models::{FeatureRecord, FrequencyTable, QueryKind};
use rayon::prelude::*;

use crate::AnalyticsError;
use crate::pipeline::PipelineContext;

/// Where a single record lands for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping<K> {
    /// Counted under `K`.
    Key(K),
    /// Counted under the unknown bucket.
    Unknown,
    /// Not counted by this query.
    Excluded,
}

impl<K> Grouping<K> {
    /// Absent values go to the unknown bucket.
    #[must_use]
    pub fn or_unknown(value: Option<K>) -> Self {
        value.map_or(Self::Unknown, Self::Key)
    }

    /// Absent values are excluded from the query.
    #[must_use]
    pub fn or_excluded(value: Option<K>) -> Self {
        value.map_or(Self::Excluded, Self::Key)
    }
}

/// Per-key counts, `None` being the unknown bucket.
pub type Counts<K> = HashMap<Option<K>, u64>;

/// Counts records per key.
///
/// # Errors
///
/// Returns [`AnalyticsError::Cancelled`] if the context is cancelled
/// while chunks remain.
pub fn count_by<'a, K, F>(
    ctx: &PipelineContext,
    records: &[FeatureRecord<'a>],
    key: F,
) -> Result<Counts<K>, AnalyticsError>
where
    K: Eq + Hash + Send,
    F: Fn(&FeatureRecord<'a>) -> Grouping<K> + Sync,
{
    records
        .par_chunks(ctx.config().chunk_size)
        .map(|chunk| -> Result<Counts<K>, AnalyticsError> {
            ctx.check_cancelled()?;
            let mut counts = Counts::new();
            for record in chunk {
                match key(record) {
                    Grouping::Key(k) => *counts.entry(Some(k)).or_insert(0) += 1,
                    Grouping::Unknown => *counts.entry(None).or_insert(0) += 1,
                    Grouping::Excluded => {}
                }
            }
            Ok(counts)
        })
        .try_reduce(Counts::new, |mut acc, counts| {
            for (k, n) in counts {
                *acc.entry(k).or_insert(0) += n;
            }
            Ok(acc)
        })
}

/// Runs one query: counts records per key and orders the table the way
/// `kind` is reported.
///
/// Records without a report hour never reach `key` when `kind` excludes
/// them.
///
/// # Errors
///
/// Returns [`AnalyticsError::Cancelled`] if the run is cancelled.
pub fn query<'a, K, F>(
    ctx: &PipelineContext,
    kind: QueryKind,
    records: &[FeatureRecord<'a>],
    key: F,
) -> Result<FrequencyTable<K>, AnalyticsError>
where
    K: Eq + Hash + Ord + Send,
    F: Fn(&FeatureRecord<'a>) -> Grouping<K> + Sync,
{
    let drop_missing_hour = kind.excludes_missing_hour();
    let counts = count_by(ctx, records, |f| {
        if drop_missing_hour && f.report_hour.is_none() {
            Grouping::Excluded
        } else {
            key(f)
        }
    })?;

    Ok(FrequencyTable::sorted(kind.order(), counts))
}
