#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command line front end for the crime statistics pipeline.
//!
//! [`config`] loads the optional TOML run configuration and [`output`]
//! renders a finished [`ResultBundle`] as JSON or a plain-text summary.
//! The `crime_stats` binary wires these to the CSV source and the
//! analytics pipeline.
//!
//! [`ResultBundle`]: crime_stats_analytics_models::ResultBundle

pub mod config;
pub mod output;
