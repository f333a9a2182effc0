#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Crime statistics aggregation pipeline.
//!
//! Turns a batch of raw [`Record`]s into a [`ResultBundle`]: timestamps are
//! normalized to calendar dates ([`dates`]), calendar features are derived
//! ([`features`]), and a fixed battery of group-by-count queries
//! ([`queries`]) plus one crime-type × hour cross-tabulation ([`crosstab`])
//! are computed over the same immutable feature set.
//!
//! Every query is a pure, single-pass function of its input and runs on the
//! rayon pool. A [`PipelineContext`] built by the caller carries the
//! configuration, cancellation token and progress reporter.
//!
//! [`Record`]: crime_stats_source_models::Record
//! [`ResultBundle`]: crime_stats_analytics_models::ResultBundle
//! [`PipelineContext`]: pipeline::PipelineContext

pub mod aggregate;
pub mod crosstab;
pub mod dates;
pub mod features;
pub mod pipeline;
pub mod queries;
pub mod share;
pub mod top_n;

use thiserror::Error;

/// Errors that can occur during a pipeline run.
///
/// Unparseable timestamps and missing fields are not errors: they become
/// absent values and "unknown" buckets.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The run was cancelled through its token.
    #[error("Pipeline run cancelled")]
    Cancelled,

    /// The pipeline configuration is unusable.
    #[error("Invalid pipeline configuration: {message}")]
    InvalidConfig {
        /// Description of what went wrong.
        message: String,
    },

    /// Top-N selection was applied to a table not ordered by count.
    #[error("Top-N selection requires a count-ranked table, got {order} order")]
    UnrankedTable {
        /// Order of the offending table.
        order: crime_stats_analytics_models::TableOrder,
    },
}
