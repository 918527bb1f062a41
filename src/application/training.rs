//! Training service: Fits and applies the cardio risk classifier.
//!
//! Valid patients are turned into an eleven-column feature matrix with the
//! diagnosis flag as target. Fitted models are persisted as JSON.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::config::TrainingConfig;
use crate::domain::regression::matrix;
use crate::domain::{
    accuracy, Dataset, FitSummary, FittedModel, LogisticRegression, Patient, TrainingError,
};
use crate::CardioError;

/// Feature columns, in matrix order.
pub const FEATURE_NAMES: [&str; 11] = [
    "age_years",
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
];

/// Numeric features of one patient, in [`FEATURE_NAMES`] order.
#[must_use]
pub fn feature_row(patient: &Patient) -> [f64; 11] {
    let flag = |b: bool| if b { 1.0 } else { 0.0 };
    [
        patient.years() as f64,
        flag(patient.sex),
        patient.height,
        patient.weight,
        patient.ap_hi,
        patient.ap_lo,
        f64::from(patient.cholesterol.code()),
        f64::from(patient.gluc.code()),
        flag(patient.smoke),
        flag(patient.alco),
        flag(patient.active),
    ]
}

/// Feature matrix and 0/1 cardio targets for `patients`.
///
/// # Errors
/// Returns [`TrainingError::Shape`] if the matrix cannot be built.
pub fn feature_matrix(patients: &[Patient]) -> Result<(Array2<f64>, Array1<f64>), TrainingError> {
    let values: Vec<f64> = patients.iter().flat_map(feature_row).collect();
    let features = matrix(patients.len(), FEATURE_NAMES.len(), values)?;
    let targets = patients
        .iter()
        .map(|p| if p.cardio { 1.0 } else { 0.0 })
        .collect();
    Ok((features, targets))
}

/// Result of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    /// Rows used for fitting
    pub rows: usize,
    /// Invalid rows left out
    pub skipped: usize,
    pub summary: FitSummary,
    /// Accuracy on the training rows
    pub accuracy: f64,
}

/// One predicted row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub id: i64,
    pub probability: f64,
    pub label: u8,
}

/// Service for fitting and applying the classifier.
pub struct TrainingService {
    config: TrainingConfig,
}

impl TrainingService {
    /// Create a new training service.
    ///
    /// # Errors
    /// Returns error if the configuration cannot train.
    pub fn new(config: TrainingConfig) -> Result<Self, CardioError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Fit on an arbitrary matrix and report training accuracy.
    ///
    /// # Errors
    /// Propagates [`TrainingError`].
    pub fn fit(
        &self,
        features: &Array2<f64>,
        targets: &Array1<f64>,
    ) -> Result<(LogisticRegression, FitSummary, f64), CardioError> {
        let mut model = LogisticRegression::new(self.config.threshold)
            .with_normalization(self.config.normalization);
        let summary = model.fit(features, targets, &self.config.fit_params())?;
        let predicted = model.predict(features)?;
        let score = accuracy(targets.view(), &predicted);
        Ok((model, summary, score))
    }

    /// Fit the cardio predictor on the valid patients of `dataset`.
    ///
    /// # Errors
    /// Returns error on unknown lab-level codes or when no valid row remains.
    pub fn train(
        &self,
        dataset: &Dataset,
    ) -> Result<(LogisticRegression, TrainingReport), CardioError> {
        let patients = dataset.patients()?;
        let total = patients.len();
        let valid: Vec<Patient> = patients.into_iter().filter(Patient::is_valid).collect();
        let skipped = total - valid.len();
        if skipped > 0 {
            tracing::warn!("Skipping {} invalid rows out of {}", skipped, total);
        }

        let (features, targets) = feature_matrix(&valid)?;
        let (model, summary, score) = self.fit(&features, &targets)?;

        tracing::info!(
            "Trained on {} rows: accuracy={:.4}, final loss={:?}",
            valid.len(),
            score,
            summary.final_loss
        );

        Ok((
            model,
            TrainingReport {
                rows: valid.len(),
                skipped,
                summary,
                accuracy: score,
            },
        ))
    }

    /// Probabilities and labels for the valid patients of `dataset`.
    ///
    /// Invalid rows are skipped like in [`TrainingService::train`], so they
    /// never enter the normalization statistics.
    ///
    /// # Errors
    /// Returns error on unknown lab-level codes, when no valid row remains or
    /// when the model has a different feature count.
    pub fn predict(
        model: &LogisticRegression,
        dataset: &Dataset,
    ) -> Result<Vec<Prediction>, CardioError> {
        let patients = dataset.patients()?;
        let total = patients.len();
        let patients: Vec<Patient> = patients.into_iter().filter(Patient::is_valid).collect();
        if patients.len() < total {
            tracing::warn!(
                "Skipping {} invalid rows out of {}",
                total - patients.len(),
                total
            );
        }
        if patients.is_empty() {
            return Err(TrainingError::EmptyDataset.into());
        }
        let (features, _) = feature_matrix(&patients)?;
        let probabilities = model.predict_proba(&features)?;
        let threshold = model.threshold();

        Ok(patients
            .iter()
            .zip(probabilities.iter())
            .map(|(patient, p)| Prediction {
                id: patient.id,
                probability: *p,
                label: u8::from(*p > threshold),
            })
            .collect())
    }

    /// Write `model` as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns error if the model is unfitted or the file cannot be written.
    pub fn save_model(model: &LogisticRegression, path: &Path) -> Result<(), CardioError> {
        if !model.is_fitted() {
            return Err(TrainingError::NotFitted.into());
        }
        let fitted = model.to_fitted(&FEATURE_NAMES);
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &fitted)?;
        tracing::info!("Saved model to {}", path.display());
        Ok(())
    }

    /// Read a model written by [`TrainingService::save_model`].
    ///
    /// # Errors
    /// Returns error if the file is unreadable or its feature columns differ
    /// from [`FEATURE_NAMES`].
    pub fn load_model(path: &Path) -> Result<LogisticRegression, CardioError> {
        let fitted: FittedModel = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        if fitted.weights.len() != FEATURE_NAMES.len() {
            return Err(TrainingError::FeatureMismatch {
                expected: FEATURE_NAMES.len(),
                actual: fitted.weights.len(),
            }
            .into());
        }
        if fitted.feature_names != FEATURE_NAMES {
            return Err(CardioError::Config(format!(
                "model features {:?} do not match {:?}",
                fitted.feature_names, FEATURE_NAMES
            )));
        }
        tracing::info!(
            "Loaded model trained at {} from {}",
            fitted.trained_at,
            path.display()
        );
        Ok(LogisticRegression::from_fitted(&fitted))
    }
}
