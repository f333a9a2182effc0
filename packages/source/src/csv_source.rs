//! CSV incident file reader.
//!
//! Parses a header-bearing CSV export and returns every row as a typed
//! [`Record`]. Columns are located by name through a [`FieldMapping`], so
//! column order and extra columns in the file do not matter.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use crime_stats_source_models::{FieldMapping, Record};

use crate::SourceError;
use crate::progress::ProgressCallback;

/// Rows read between progress updates.
const PROGRESS_BATCH: u64 = 10_000;

/// Reader for a CSV incident export on disk.
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    /// Path of the CSV file.
    path: PathBuf,
    /// Column names for each record field.
    fields: FieldMapping,
    /// Field delimiter byte (defaults to `,`).
    delimiter: u8,
    /// Optional cap on the number of rows to read.
    limit: Option<u64>,
}

impl CsvRecordSource {
    /// Creates a source for the given path with default settings
    /// (comma-delimited, default column names, no row limit).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fields: FieldMapping::default(),
            delimiter: b',',
            limit: None,
        }
    }

    /// Overrides the column mapping.
    #[must_use]
    pub fn with_fields(mut self, fields: FieldMapping) -> Self {
        self.fields = fields;
        self
    }

    /// Sets the field delimiter (e.g. `b'\t'` for TSV files).
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Limits the number of rows that will be read.
    #[must_use]
    pub const fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    /// Opens the file and reads all records.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the file cannot be opened, the CSV is
    /// malformed, or a mapped column is missing from the header row.
    pub fn load(&self, progress: &Arc<dyn ProgressCallback>) -> Result<Vec<Record>, SourceError> {
        log::info!("Reading incidents from {}", self.path.display());

        let file = File::open(&self.path).map_err(|source| SourceError::Io {
            path: self.path.display().to_string(),
            source,
        })?;

        let records = read_records(file, &self.fields, self.delimiter, self.limit, progress)?;

        log::info!(
            "Read {} incident(s) from {}",
            records.len(),
            self.path.display()
        );

        Ok(records)
    }
}

/// Column index of each [`Record`] field in the header row.
struct ColumnIndex {
    category: usize,
    neighborhood: usize,
    reporting_area: usize,
    report_timestamp: usize,
    crime_date_time: usize,
}

impl ColumnIndex {
    fn resolve(headers: &[String], fields: &FieldMapping) -> Result<Self, SourceError> {
        let find = |field: &'static str, column: &str| {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| SourceError::MissingColumn {
                    field,
                    column: column.to_owned(),
                })
        };

        let [category, neighborhood, reporting_area, report_timestamp, crime_date_time] =
            fields.columns();

        Ok(Self {
            category: find(category.0, category.1)?,
            neighborhood: find(neighborhood.0, neighborhood.1)?,
            reporting_area: find(reporting_area.0, reporting_area.1)?,
            report_timestamp: find(report_timestamp.0, report_timestamp.1)?,
            crime_date_time: find(crime_date_time.0, crime_date_time.1)?,
        })
    }
}

/// Reads records from any CSV byte stream.
///
/// Rows shorter than the header are accepted; their missing cells are
/// absent fields. A known `limit` is reported as the progress total.
///
/// # Errors
///
/// Returns [`SourceError`] if the CSV is malformed, has no header row, or
/// lacks a mapped column.
pub fn read_records<R: Read>(
    reader: R,
    fields: &FieldMapping,
    delimiter: u8,
    limit: Option<u64>,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<Record>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_owned())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(SourceError::NoHeader);
    }

    let columns = ColumnIndex::resolve(&headers, fields)?;
    log::debug!("Resolved {} header column(s)", headers.len());

    if let Some(limit) = limit {
        progress.set_total(limit);
    }

    let mut records = Vec::new();
    let mut pending: u64 = 0;

    for row in reader.records() {
        if limit.is_some_and(|l| records.len() as u64 >= l) {
            log::info!("Reached limit of {} records", records.len());
            break;
        }

        let row = row?;
        records.push(Record::from_fields(
            row.get(columns.category),
            row.get(columns.neighborhood),
            row.get(columns.reporting_area),
            row.get(columns.report_timestamp),
            row.get(columns.crime_date_time),
        ));

        pending += 1;
        if pending == PROGRESS_BATCH {
            progress.inc(pending);
            pending = 0;
        }
    }

    progress.inc(pending);
    progress.finish(format!("read {} records", records.len()));

    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;
    use crate::progress::null_progress;

    const SAMPLE: &str = "\
file_number,date_of_report,crime_date_time,crime,reporting_area,neighborhood,location
2021-01,02/22/2021 09:28:00 AM,02/21/2021 20:00 - 02/22/2021 08:00,Larceny from MV,605,Cambridgeport,x
2021-02,02/22/2021 01:15:00 PM,02/22/2021 12:30,Hit and Run,,Riverside,y
";

    fn read(input: &str) -> Result<Vec<Record>, SourceError> {
        read_records(
            input.as_bytes(),
            &FieldMapping::default(),
            b',',
            None,
            &null_progress(),
        )
    }

    #[test]
    fn reads_mapped_columns_in_any_order() {
        let records = read(SAMPLE).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category.as_deref(), Some("Larceny from MV"));
        assert_eq!(records[0].neighborhood.as_deref(), Some("Cambridgeport"));
        assert_eq!(records[0].reporting_area.as_deref(), Some("605"));
        assert_eq!(
            records[0].report_timestamp.as_deref(),
            Some("02/22/2021 09:28:00 AM")
        );
        assert_eq!(
            records[1].crime_date_time.as_deref(),
            Some("02/22/2021 12:30")
        );
    }

    #[test]
    fn empty_cells_are_absent() {
        let records = read(SAMPLE).unwrap();
        assert_eq!(records[1].reporting_area, None);
    }

    #[test]
    fn short_rows_are_accepted() {
        let input = "crime,neighborhood,reporting_area,date_of_report,crime_date_time\nTheft,North\n";
        let records = read(input).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category.as_deref(), Some("Theft"));
        assert_eq!(records[0].reporting_area, None);
        assert_eq!(records[0].crime_date_time, None);
    }

    #[test]
    fn missing_column_is_fatal() {
        let input = "crime,neighborhood\nTheft,North\n";
        let err = read(input).unwrap_err();
        assert!(matches!(
            err,
            SourceError::MissingColumn { field: "reporting_area", .. }
        ));
    }

    #[test]
    fn header_only_input_yields_no_records() {
        let input = "crime,neighborhood,reporting_area,date_of_report,crime_date_time\n";
        assert!(read(input).unwrap().is_empty());
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(matches!(read(""), Err(SourceError::NoHeader)));
    }

    #[test]
    fn limit_caps_rows() {
        let records = read_records(
            SAMPLE.as_bytes(),
            &FieldMapping::default(),
            b',',
            Some(1),
            &null_progress(),
        )
        .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn custom_delimiter_and_mapping() {
        let input = "offense\tarea\thood\treported\trange\nAssault\t1\tEast\t\t\n";
        let fields = FieldMapping {
            category: "offense".to_owned(),
            neighborhood: "hood".to_owned(),
            reporting_area: "area".to_owned(),
            report_timestamp: "reported".to_owned(),
            crime_date_time: "range".to_owned(),
        };
        let records =
            read_records(input.as_bytes(), &fields, b'\t', None, &null_progress()).unwrap();
        assert_eq!(records[0].category.as_deref(), Some("Assault"));
        assert_eq!(records[0].neighborhood.as_deref(), Some("East"));
        assert_eq!(records[0].report_timestamp, None);
    }

    #[derive(Default)]
    struct RecordingProgress {
        total: Mutex<Option<u64>>,
        position: AtomicU64,
    }

    impl ProgressCallback for RecordingProgress {
        fn set_total(&self, total: u64) {
            *self.total.lock().unwrap() = Some(total);
        }
        fn inc(&self, delta: u64) {
            self.position.fetch_add(delta, Ordering::Relaxed);
        }
        fn set_message(&self, _msg: String) {}
        fn finish(&self, _msg: String) {}
    }

    #[test]
    fn limit_becomes_progress_total() {
        let recording = Arc::new(RecordingProgress::default());
        let progress: Arc<dyn ProgressCallback> = recording.clone();
        let records =
            read_records(SAMPLE.as_bytes(), &FieldMapping::default(), b',', Some(5), &progress)
                .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(*recording.total.lock().unwrap(), Some(5));
        assert_eq!(recording.position.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn unlimited_read_leaves_total_unset() {
        let recording = Arc::new(RecordingProgress::default());
        let progress: Arc<dyn ProgressCallback> = recording.clone();
        read_records(SAMPLE.as_bytes(), &FieldMapping::default(), b',', None, &progress).unwrap();

        assert_eq!(*recording.total.lock().unwrap(), None);
        assert_eq!(recording.position.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn unreadable_path_is_fatal() {
        let source = CsvRecordSource::new("/nonexistent/crime.csv");
        let err = source.load(&null_progress()).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/crime.csv"));
    }
}
