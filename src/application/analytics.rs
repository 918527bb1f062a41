//! Analytics service: Filtering and aggregate counts over the dataset.
//!
//! This service loads rows through a [`DatasetStore`], classifies them and
//! produces per-category counts, status distributions and filtered or
//! booleanized exports.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::{status_counts, CountKey, CountRow, Dataset, Patient, PatientCheck, StatusCounts};
use crate::ports::{ChartGroup, DatasetStore};
use crate::CardioError;

/// Headline numbers for a dataset.
///
/// `healthy`, `hypertensive`, `overweight` and `underweight` are counted
/// among valid patients only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub valid: usize,
    pub invalid: usize,
    pub healthy: usize,
    pub hypertensive: usize,
    pub overweight: usize,
    pub underweight: usize,
    pub cardio: usize,
}

/// Outcome of a filtered export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterReport {
    pub kept: usize,
    pub dropped: usize,
}

/// Service for dataset analytics.
pub struct AnalyticsService<S>
where
    S: DatasetStore,
{
    store: Arc<S>,
}

impl<S> AnalyticsService<S>
where
    S: DatasetStore,
    S::Error: Into<crate::adapters::DatasetError>,
{
    /// Create a new analytics service.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Load the dataset at `path`.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load(&self, path: &Path) -> Result<Dataset, CardioError> {
        let records = self
            .store
            .load_records(path)
            .map_err(|e| CardioError::Dataset(e.into()))?;
        Ok(Dataset::new(records))
    }

    /// Row counts for every predicate.
    ///
    /// # Errors
    /// Returns error on unknown lab-level codes.
    pub fn summary(&self, dataset: &Dataset) -> Result<DatasetSummary, CardioError> {
        let patients = dataset.patients()?;
        let valid = keep_valid(patients.clone());

        let count = |check: PatientCheck| -> Result<usize, CardioError> {
            Ok(status_counts(&valid, check)?.matching)
        };

        let summary = DatasetSummary {
            rows: patients.len(),
            valid: valid.len(),
            invalid: patients.len() - valid.len(),
            healthy: count(PatientCheck::Healthy)?,
            hypertensive: count(PatientCheck::Hypertensive)?,
            overweight: count(PatientCheck::Overweight)?,
            underweight: count(PatientCheck::Underweight)?,
            cardio: patients.iter().filter(|p| p.cardio).count(),
        };

        tracing::info!(
            "Summarized {} rows: {} valid, {} cardio",
            summary.rows,
            summary.valid,
            summary.cardio
        );
        Ok(summary)
    }

    /// Dataset without the rows matching `check`.
    ///
    /// # Errors
    /// Propagates classification failures of the check.
    pub fn filter(&self, dataset: &Dataset, check: PatientCheck) -> Result<Dataset, CardioError> {
        let kept = dataset.drop_matching(check)?;
        tracing::info!(
            "Dropped {} of {} rows matching {}",
            dataset.len() - kept.len(),
            dataset.len(),
            check
        );
        Ok(kept)
    }

    /// Load `input`, drop rows matching `check`, write the rest to `output`.
    ///
    /// # Errors
    /// Returns error on I/O or classification failure.
    pub fn export_filtered(
        &self,
        input: &Path,
        check: PatientCheck,
        output: &Path,
    ) -> Result<FilterReport, CardioError> {
        let dataset = self.load(input)?;
        let kept = self.filter(&dataset, check)?;
        self.store
            .save_records(output, kept.records())
            .map_err(|e| CardioError::Dataset(e.into()))?;
        Ok(FilterReport {
            kept: kept.len(),
            dropped: dataset.len() - kept.len(),
        })
    }

    /// Totals and positive diagnoses per category of `key`.
    ///
    /// # Errors
    /// Propagates classification failures; pass `valid_only` to count only
    /// rows that classify cleanly.
    pub fn counts(
        &self,
        dataset: &Dataset,
        key: CountKey,
        valid_only: bool,
    ) -> Result<Vec<CountRow>, CardioError> {
        let patients = self.patients(dataset, valid_only)?;
        let rows = key.count(&patients)?;
        tracing::info!("Counted {} patients by {}", patients.len(), key.name());
        Ok(rows)
    }

    /// How many patients match `check`.
    ///
    /// # Errors
    /// Propagates classification failures of the check.
    pub fn status(
        &self,
        dataset: &Dataset,
        check: PatientCheck,
        valid_only: bool,
    ) -> Result<StatusCounts, CardioError> {
        let patients = self.patients(dataset, valid_only)?;
        Ok(status_counts(&patients, check)?)
    }

    /// Write the booleanized form of `input` to `output`.
    ///
    /// # Errors
    /// Returns error on I/O failure.
    pub fn export_booleanized(&self, input: &Path, output: &Path) -> Result<usize, CardioError> {
        let dataset = self.load(input)?;
        let rows = dataset.booleanized();
        self.store
            .save_booleanized(output, &rows)
            .map_err(|e| CardioError::Dataset(e.into()))?;
        tracing::info!("Wrote {} booleanized rows to {}", rows.len(), output.display());
        Ok(rows.len())
    }

    fn patients(&self, dataset: &Dataset, valid_only: bool) -> Result<Vec<Patient>, CardioError> {
        let patients = dataset.patients()?;
        if !valid_only {
            return Ok(patients);
        }
        let valid = keep_valid(patients);
        tracing::debug!("Kept {} valid of {} rows", valid.len(), dataset.len());
        Ok(valid)
    }
}

fn keep_valid(patients: Vec<Patient>) -> Vec<Patient> {
    patients.into_iter().filter(Patient::is_valid).collect()
}

/// One chart group per category: total bar, then cardio bar.
#[must_use]
pub fn count_chart_groups(rows: &[CountRow]) -> Vec<ChartGroup> {
    rows.iter()
        .map(|row| {
            ChartGroup::new(
                row.category.clone(),
                vec![
                    ("total".to_string(), row.total as u64),
                    ("cardio".to_string(), row.cardio as u64),
                ],
            )
        })
        .collect()
}

/// A single group with one bar per status.
#[must_use]
pub fn status_chart_group(status: &StatusCounts) -> ChartGroup {
    ChartGroup::new(
        status.check.clone(),
        status
            .labelled()
            .into_iter()
            .map(|(label, count)| (label, count as u64))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::CsvDatasetStore;
    use crate::domain::{test_record, CardioRecord};

    fn create_test_service() -> AnalyticsService<CsvDatasetStore> {
        AnalyticsService::new(Arc::new(CsvDatasetStore::default()))
    }

    fn sample_dataset() -> Dataset {
        Dataset::new(vec![
            test_record(1, 120.0, 70.0, false),
            test_record(2, 133.0, 70.0, true),
            test_record(3, 120.0, 95.0, true),
            // Systolic out of range: invalid
            test_record(4, 160.0, 70.0, true),
        ])
    }

    #[test]
    fn test_summary() {
        let service = create_test_service();
        let summary = service.summary(&sample_dataset()).expect("Should summarize");

        assert_eq!(summary.rows, 4);
        assert_eq!(summary.valid, 3);
        assert_eq!(summary.invalid, 1);
        assert_eq!(summary.hypertensive, 1);
        assert_eq!(summary.overweight, 1);
        assert_eq!(summary.healthy, 1);
        assert_eq!(summary.underweight, 0);
        assert_eq!(summary.cardio, 3);
    }

    #[test]
    fn test_filter_drops_matching() {
        let service = create_test_service();
        let dataset = sample_dataset();

        let without_hypertensive = service
            .filter(&dataset, PatientCheck::Hypertensive)
            .expect("Should filter");
        assert_eq!(without_hypertensive.len(), 3);
        assert!(without_hypertensive.records().iter().all(|r| r.id != 2));
    }

    #[test]
    fn test_counts_valid_only() {
        let service = create_test_service();
        let rows = service
            .counts(&sample_dataset(), CountKey::Systolic, true)
            .expect("Should count");

        let normal = rows
            .iter()
            .find(|r| r.category == "NORMAL")
            .expect("Normal row");
        assert_eq!(normal.total, 2);
        assert_eq!(normal.cardio, 1);
        assert!(rows.iter().all(|r| r.category != "INVALID" || r.total == 0));
    }

    #[test]
    fn test_status() {
        let service = create_test_service();
        let status = service
            .status(&sample_dataset(), PatientCheck::Cardio, false)
            .expect("Total");
        assert_eq!(status.matching, 3);
        assert_eq!(status.not_matching, 1);

        let group = status_chart_group(&status);
        assert_eq!(group.values[1], ("not cardio".to_string(), 1));
    }

    #[test]
    fn test_export_filtered_and_booleanized() {
        let dir = tempfile::tempdir().expect("Temp dir");
        let input = dir.path().join("input.csv");
        let filtered = dir.path().join("filtered.csv");
        let booleanized = dir.path().join("bool.csv");

        let store = CsvDatasetStore::default();
        store
            .save_records(&input, sample_dataset().records())
            .expect("Should save");

        let service = AnalyticsService::new(Arc::new(store));
        let report = service
            .export_filtered(&input, PatientCheck::Cardio, &filtered)
            .expect("Should export");
        assert_eq!(report, FilterReport { kept: 1, dropped: 3 });

        let reloaded = service.load(&filtered).expect("Should reload");
        assert_eq!(reloaded.records(), &[test_record(1, 120.0, 70.0, false)]);

        let written = service
            .export_booleanized(&input, &booleanized)
            .expect("Should export");
        assert_eq!(written, 4);
        let reread: Vec<CardioRecord> = service.load(&booleanized).expect("Reload").into_records();
        assert_eq!(reread, sample_dataset().into_records());
    }

    #[test]
    fn test_count_chart_groups() {
        let rows = vec![CountRow {
            category: "ADULT".to_string(),
            total: 10,
            cardio: 4,
            prevalence: Some(0.4),
        }];
        let groups = count_chart_groups(&rows);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, "ADULT");
        assert_eq!(groups[0].values[1], ("cardio".to_string(), 4));
    }
}
