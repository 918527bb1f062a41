//! CSV adapter: Implementation of DatasetStore.
//!
//! Reads the cardiovascular dataset in either its semicolon-separated
//! source form or a comma-separated export. When no delimiter is
//! configured, the one that occurs more often in the header line wins.
//! Raw exports are written comma-separated, booleanized ones with `;`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;

use crate::config::DatasetConfig;
use crate::domain::{BooleanizedRecord, CardioRecord};
use crate::ports::DatasetStore;

/// Column order shared by the raw and booleanized layouts.
pub const COLUMNS: [&str; 13] = [
    "id",
    "age",
    "gender",
    "height",
    "weight",
    "ap_hi",
    "ap_lo",
    "cholesterol",
    "gluc",
    "smoke",
    "alco",
    "active",
    "cardio",
];

/// Error type for dataset operations.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed row at line {line}: {message}")]
    Row { line: u64, message: String },

    #[error("Missing columns: {0}")]
    MissingColumns(String),
}

/// CSV-backed dataset store.
#[derive(Debug, Clone, Default)]
pub struct CsvDatasetStore {
    config: DatasetConfig,
}

impl CsvDatasetStore {
    #[must_use]
    pub fn new(config: DatasetConfig) -> Self {
        Self { config }
    }

    /// Delimiter used to read `path`.
    ///
    /// # Errors
    /// Returns error if the file cannot be opened.
    pub fn delimiter_for(&self, path: &Path) -> Result<u8, DatasetError> {
        if let Some(delimiter) = self.config.delimiter {
            return Ok(delimiter);
        }
        let mut header = String::new();
        BufReader::new(File::open(path)?).read_line(&mut header)?;
        Ok(sniff_delimiter(&header))
    }

    fn write_rows<T: Serialize>(
        &self,
        path: &Path,
        rows: &[T],
        default_delimiter: u8,
    ) -> Result<(), DatasetError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.config.delimiter.unwrap_or(default_delimiter))
            .has_headers(false)
            .from_path(path)?;
        writer.write_record(COLUMNS)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        tracing::debug!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(())
    }
}

/// `;` when the header has more semicolons than commas, `,` otherwise.
#[must_use]
pub fn sniff_delimiter(header: &str) -> u8 {
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

impl DatasetStore for CsvDatasetStore {
    type Error = DatasetError;

    fn load_records(&self, path: &Path) -> Result<Vec<CardioRecord>, Self::Error> {
        let delimiter = self.delimiter_for(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        let missing: Vec<&str> = COLUMNS
            .iter()
            .copied()
            .filter(|column| !headers.iter().any(|h| h == *column))
            .collect();
        if !missing.is_empty() {
            return Err(DatasetError::MissingColumns(missing.join(", ")));
        }

        let mut records = Vec::new();
        for row in reader.deserialize::<CardioRecord>() {
            let record = row.map_err(|e| match e.position() {
                Some(pos) => DatasetError::Row {
                    line: pos.line(),
                    message: e.to_string(),
                },
                None => DatasetError::Csv(e),
            })?;
            records.push(record);
        }

        tracing::info!(
            "Loaded {} rows from {} (delimiter {:?})",
            records.len(),
            path.display(),
            char::from(delimiter)
        );
        Ok(records)
    }

    fn save_records(&self, path: &Path, records: &[CardioRecord]) -> Result<(), Self::Error> {
        self.write_rows(path, records, b',')
    }

    fn save_booleanized(
        &self,
        path: &Path,
        records: &[BooleanizedRecord],
    ) -> Result<(), Self::Error> {
        self.write_rows(path, records, b';')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::domain::test_record;

    const SOURCE: &str = "\
id;age;gender;height;weight;ap_hi;ap_lo;cholesterol;gluc;smoke;alco;active;cardio
0;18393;2;168;62.0;110;80;1;1;0;0;1;0
1;20228;1;156;85.0;140;90;3;1;0;0;1;1
";

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("Temp file");
        file.write_all(content.as_bytes()).expect("Write");
        file
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("id;age;gender"), b';');
        assert_eq!(sniff_delimiter("id,age,gender"), b',');
        assert_eq!(sniff_delimiter("id"), b',');
    }

    #[test]
    fn test_load_semicolon_source() {
        let file = write_temp(SOURCE);
        let store = CsvDatasetStore::default();
        let records = store.load_records(file.path()).expect("Should load");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].gender, 2);
        assert!((records[1].weight - 85.0).abs() < f64::EPSILON);
        assert!(records[1].cardio);
        assert!(!records[0].smoke);
    }

    #[test]
    fn test_booleanized_export_reads_back() {
        let source = write_temp(SOURCE);
        let store = CsvDatasetStore::default();
        let records = store.load_records(source.path()).expect("Should load");

        let dir = tempfile::tempdir().expect("Temp dir");
        let out = dir.path().join("bool.csv");
        let booleanized: Vec<_> = records.iter().map(CardioRecord::booleanized).collect();
        store.save_booleanized(&out, &booleanized).expect("Should save");

        let text = std::fs::read_to_string(&out).expect("Readable");
        assert!(text.starts_with("id;age;gender;"));
        assert!(text.contains(";true;"));

        let reread = store.load_records(&out).expect("Should reload");
        assert_eq!(reread, records);
    }

    #[test]
    fn test_save_records_roundtrip() {
        let dir = tempfile::tempdir().expect("Temp dir");
        let path = dir.path().join("filtered.csv");
        let store = CsvDatasetStore::default();
        let rows = vec![test_record(1, 120.0, 70.0, true), test_record(2, 110.0, 60.0, false)];

        store.save_records(&path, &rows).expect("Should save");
        assert_eq!(store.load_records(&path).expect("Should load"), rows);
    }

    #[test]
    fn test_malformed_row_reports_line() {
        let file = write_temp(
            "id;age;gender;height;weight;ap_hi;ap_lo;cholesterol;gluc;smoke;alco;active;cardio\n\
             0;18393;7;168;62;110;80;1;1;0;0;1;0\n",
        );
        let err = CsvDatasetStore::default()
            .load_records(file.path())
            .expect_err("Gender 7 is invalid");
        assert!(matches!(err, DatasetError::Row { .. }));
    }

    #[test]
    fn test_missing_columns() {
        let file = write_temp("id;age\n1;2\n");
        let err = CsvDatasetStore::default()
            .load_records(file.path())
            .expect_err("Columns missing");
        assert!(matches!(err, DatasetError::MissingColumns(_)));
    }

    #[test]
    fn test_configured_delimiter_wins() {
        let file = write_temp(SOURCE);
        let store = CsvDatasetStore::new(DatasetConfig {
            delimiter: Some(b','),
        });
        assert_eq!(store.delimiter_for(file.path()).expect("Open"), b',');
        assert!(store.load_records(file.path()).is_err());
    }
}
