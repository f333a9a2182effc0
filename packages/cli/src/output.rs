//! Rendering of a finished run.

use std::fmt::Write as _;
use std::io::Write;

use crime_stats_analytics_models::{FrequencyTable, QueryKind, ResultBundle, weekday_label};
use crime_stats_source_models::FieldMapping;

/// Label used for the unknown bucket in text output.
const UNKNOWN_LABEL: &str = "(unknown)";

/// Writes the bundle as JSON followed by a newline.
///
/// # Errors
///
/// Returns the serializer error if writing fails.
pub fn write_json(
    bundle: &ResultBundle,
    mut writer: impl Write,
    pretty: bool,
) -> Result<(), serde_json::Error> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, bundle)?;
    } else {
        serde_json::to_writer(&mut writer, bundle)?;
    }
    writer.write_all(b"\n").map_err(serde_json::Error::io)
}

/// Plain-text run summary: record counts, parse failures and the top
/// categories.
#[must_use]
pub fn render_summary(bundle: &ResultBundle) -> String {
    let summary = &bundle.summary;
    let mut out = String::new();

    let _ = writeln!(out, "{:<24} {:>10}", "Records", summary.total_records);
    let _ = writeln!(
        out,
        "{:<24} {:>10}",
        "Missing report date", summary.missing_report_date
    );
    let _ = writeln!(
        out,
        "{:<24} {:>10}",
        "Missing crime date", summary.missing_crime_date
    );
    let _ = writeln!(
        out,
        "{:<24} {:>10}",
        "Missing report hour", summary.missing_report_hour
    );
    out.push('\n');

    let _ = writeln!(
        out,
        "{} (top {})",
        QueryKind::CrimesByType.title(),
        bundle.top_n
    );
    render_ranked(&mut out, &bundle.crimes_by_type, summary.total_records);
    out.push('\n');

    let _ = writeln!(out, "{}", QueryKind::CrimesByWeekday.title());
    for entry in bundle.crimes_by_weekday.entries() {
        let label = entry
            .key
            .and_then(weekday_label)
            .unwrap_or(UNKNOWN_LABEL);
        let _ = writeln!(out, "  {label:<40} {:>10}", entry.count);
    }

    out
}

fn render_ranked(out: &mut String, table: &FrequencyTable<String>, total: u64) {
    let _ = writeln!(out, "  {:<40} {:>10} {:>7}", "NAME", "COUNT", "SHARE");
    let _ = writeln!(out, "  {}", "-".repeat(59));
    for entry in table.entries() {
        #[allow(clippy::cast_precision_loss)]
        let percent = if total == 0 {
            0.0
        } else {
            entry.count as f64 / total as f64 * 100.0
        };
        let _ = writeln!(
            out,
            "  {:<40} {:>10} {:>6.1}%",
            entry.key.as_deref().unwrap_or(UNKNOWN_LABEL),
            entry.count,
            percent
        );
    }
}

/// Column mapping as a two-column table.
#[must_use]
pub fn render_fields(fields: &FieldMapping) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<20} COLUMN", "FIELD");
    let _ = writeln!(out, "{}", "-".repeat(40));
    for (field, column) in fields.columns() {
        let _ = writeln!(out, "{field:<20} {column}");
    }
    out
}

#[cfg(test)]
mod tests {
    use crime_stats_analytics::pipeline::{PipelineContext, run};
    use crime_stats_analytics_models::PipelineConfig;
    use crime_stats_source_models::Record;

    use super::*;

    fn bundle() -> ResultBundle {
        let records = vec![
            Record::from_fields(
                Some("Theft"),
                Some("North"),
                Some("7"),
                Some("03/01/2021 02:00:00 PM"),
                None,
            ),
            Record::from_fields(Some("Theft"), None, None, Some("03/07/2021 09:00:00 AM"), None),
            Record::from_fields(None, None, None, None, None),
        ];
        let ctx = PipelineContext::new(PipelineConfig::default()).unwrap();
        run(&ctx, &records).unwrap()
    }

    #[test]
    fn json_uses_camel_case_and_null_keys() {
        let mut buf = Vec::new();
        write_json(&bundle(), &mut buf, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with('\n'));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["summary"]["totalRecords"], 3);
        assert_eq!(value["topN"], 15);
        assert!(value["crimeHourMatrix"].is_object());
        let by_type = value["crimesByType"]["entries"].as_array().unwrap();
        assert_eq!(by_type[0]["key"], "Theft");
        assert_eq!(by_type[0]["count"], 2);
        assert!(by_type[1]["key"].is_null());
    }

    #[test]
    fn pretty_json_parses_back_into_tables() {
        let bundle = bundle();
        let mut buf = Vec::new();
        write_json(&bundle, &mut buf, true).unwrap();
        assert!(buf.iter().filter(|b| **b == b'\n').count() > 1);

        let parsed: ResultBundle = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed.summary, bundle.summary);
        assert_eq!(parsed.crimes_by_type, bundle.crimes_by_type);
        assert_eq!(parsed.crime_type_by_hour, bundle.crime_type_by_hour);
        assert_eq!(parsed.crime_hour_matrix, bundle.crime_hour_matrix);
    }

    #[test]
    fn summary_lists_counts_and_labels() {
        let text = render_summary(&bundle());
        assert!(text.contains("Records"));
        assert!(text.contains("Top crime types (top 15)"));
        assert!(text.contains(QueryKind::CrimesByWeekday.title()));
        assert!(text.contains("Theft"));
        assert!(text.contains(UNKNOWN_LABEL));
        assert!(text.contains("Sun"));
        assert!(text.contains("Mon"));
        assert!(text.contains("66.7%"));
    }

    #[test]
    fn fields_table_lists_every_column() {
        let text = render_fields(&FieldMapping::default());
        for (field, column) in FieldMapping::default().columns() {
            assert!(text.contains(field));
            assert!(text.contains(column));
        }
    }
}
