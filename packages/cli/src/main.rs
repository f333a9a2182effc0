#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the crime statistics pipeline.
//!
//! Uses `indicatif-log-bridge` (via [`crime_stats_cli_utils::init_logger`])
//! so `log` output and progress bars share the terminal.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use crime_stats_analytics::pipeline::{self, PipelineContext};
use crime_stats_analytics_models::ResultBundle;
use crime_stats_cli::config::{CliConfig, parse_delimiter};
use crime_stats_cli::output::{render_fields, render_summary, write_json};
use crime_stats_cli_utils::{IndicatifProgress, MultiProgress};
use crime_stats_source::csv_source::CsvRecordSource;
use crime_stats_source_models::FieldMapping;

#[derive(Parser)]
#[command(name = "crime_stats", about = "Crime incident statistics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every query and write the result bundle as JSON
    Analyze {
        /// Incident CSV file
        input: PathBuf,
        /// TOML config with `[pipeline]` and `[fields]` sections
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output file (defaults to stdout)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Number of rows kept by ranked queries (overrides config)
        #[arg(long)]
        top_n: Option<usize>,
        /// Input field delimiter: one ASCII character, or `tab`
        #[arg(long, default_value = ",", value_parser = parse_delimiter)]
        delimiter: u8,
        /// Maximum number of rows to read (for testing)
        #[arg(long)]
        limit: Option<u64>,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Print record counts, parse failures and the top crime types
    Summary {
        /// Incident CSV file
        input: PathBuf,
        /// TOML config with `[pipeline]` and `[fields]` sections
        #[arg(long)]
        config: Option<PathBuf>,
        /// Input field delimiter: one ASCII character, or `tab`
        #[arg(long, default_value = ",", value_parser = parse_delimiter)]
        delimiter: u8,
        /// Maximum number of rows to read (for testing)
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Print the default input column mapping
    Fields,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crime_stats_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            config,
            output,
            top_n,
            delimiter,
            limit,
            pretty,
        } => {
            let config = CliConfig::load(config.as_deref())?.with_top_n(top_n);
            let bundle = analyze(&multi, &input, config, delimiter, limit)?;

            if let Some(path) = output {
                write_json(&bundle, BufWriter::new(File::create(&path)?), pretty)?;
                log::info!("Wrote results to {}", path.display());
            } else {
                write_json(&bundle, std::io::stdout().lock(), pretty)?;
            }
        }
        Commands::Summary {
            input,
            config,
            delimiter,
            limit,
        } => {
            let config = CliConfig::load(config.as_deref())?;
            let bundle = analyze(&multi, &input, config, delimiter, limit)?;
            print!("{}", render_summary(&bundle));
        }
        Commands::Fields => {
            print!("{}", render_fields(&FieldMapping::default()));
        }
    }

    Ok(())
}

fn analyze(
    multi: &MultiProgress,
    input: &Path,
    config: CliConfig,
    delimiter: u8,
    limit: Option<u64>,
) -> Result<ResultBundle, Box<dyn std::error::Error>> {
    let start = Instant::now();

    let ctx = PipelineContext::new(config.pipeline)?
        .with_progress(IndicatifProgress::steps_bar(multi, "Queries"));

    let records = CsvRecordSource::new(input)
        .with_fields(config.fields)
        .with_delimiter(delimiter)
        .with_limit(limit)
        .load(&IndicatifProgress::records_bar(multi, "Reading"))?;

    let bundle = pipeline::run(&ctx, &records)?;

    log::info!(
        "Analyzed {} record(s) in {:.2}s",
        records.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(bundle)
}
