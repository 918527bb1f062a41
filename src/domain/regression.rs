//! Logistic regression trained by mini-batch gradient descent.
//!
//! The model squashes a linear combination of normalized features through
//! a sigmoid and minimizes binary cross-entropy. Training walks the rows in
//! contiguous batches; weights and bias are updated once per batch and the
//! full-dataset loss is recorded once per epoch.

use std::ops::Range;
use std::str::FromStr;

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Probabilities are clamped this far away from 0 and 1 inside the loss.
const LOSS_EPSILON: f64 = 1e-12;

/// Errors raised by training and prediction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrainingError {
    #[error("Cannot train on an empty dataset")]
    EmptyDataset,

    #[error("Batch size must be at least 1")]
    InvalidBatchSize,

    #[error("Learning rate must be finite and positive, got {0}")]
    InvalidLearningRate(f64),

    #[error("Threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("Feature matrix has {rows} rows but {targets} targets were given")]
    TargetLengthMismatch { rows: usize, targets: usize },

    #[error("Targets must be 0 or 1, got {0}")]
    NonBinaryTarget(f64),

    #[error("Model expects {expected} features, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("Model has not been fitted")]
    NotFitted,

    #[error("Noise must be finite and non-negative, got {0}")]
    InvalidNoise(f64),

    #[error("Invalid feature matrix shape: {0}")]
    Shape(String),
}

/// Feature scaling applied before training and prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// One pass of `(x - mean) / std` per column.
    #[default]
    ZScore,
    /// `x - mean / std`, repeated once per feature with fresh statistics.
    Legacy,
}

impl Normalization {
    /// Scale every column of `features` using that matrix's own statistics.
    ///
    /// Zero-variance columns are only centered (`ZScore`) or left as they
    /// are (`Legacy`).
    #[must_use]
    pub fn apply(&self, features: &Array2<f64>) -> Array2<f64> {
        match self {
            Self::ZScore => zscore(features),
            Self::Legacy => legacy(features),
        }
    }
}

impl FromStr for Normalization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zscore" | "z-score" | "z_score" => Ok(Self::ZScore),
            "legacy" => Ok(Self::Legacy),
            other => Err(format!("unknown normalization `{other}`")),
        }
    }
}

impl std::fmt::Display for Normalization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZScore => write!(f, "zscore"),
            Self::Legacy => write!(f, "legacy"),
        }
    }
}

fn zscore(features: &Array2<f64>) -> Array2<f64> {
    let mut out = features.clone();
    for mut column in out.axis_iter_mut(Axis(1)) {
        let Some(mean) = column.mean() else {
            continue;
        };
        let std = column.std(0.0);
        if std > 0.0 {
            column.mapv_inplace(|v| (v - mean) / std);
        } else {
            column.mapv_inplace(|v| v - mean);
        }
    }
    out
}

fn legacy(features: &Array2<f64>) -> Array2<f64> {
    let mut out = features.clone();
    for _ in 0..out.ncols() {
        let Some(means) = out.mean_axis(Axis(0)) else {
            break;
        };
        let stds = out.std_axis(Axis(0), 0.0);
        for ((mut column, mean), std) in out
            .axis_iter_mut(Axis(1))
            .zip(means.iter())
            .zip(stds.iter())
        {
            if *std > 0.0 {
                let shift = mean / std;
                column.mapv_inplace(|v| v - shift);
            }
        }
    }
    out
}

/// `1 / (1 + e^-z)`
#[must_use]
pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// `sigmoid(X · w + b)` for every row.
#[must_use]
pub fn hypothesis(features: ArrayView2<'_, f64>, weights: &Array1<f64>, bias: f64) -> Array1<f64> {
    (features.dot(weights) + bias).mapv(sigmoid)
}

/// Mean binary cross-entropy between 0/1 targets and probabilities.
#[must_use]
pub fn binary_cross_entropy(targets: ArrayView1<'_, f64>, probabilities: ArrayView1<'_, f64>) -> f64 {
    if targets.is_empty() {
        return 0.0;
    }
    let total: f64 = targets
        .iter()
        .zip(probabilities.iter())
        .map(|(y, p)| {
            let p = p.clamp(LOSS_EPSILON, 1.0 - LOSS_EPSILON);
            y * p.ln() + (1.0 - y) * (1.0 - p).ln()
        })
        .sum();
    -total / targets.len() as f64
}

/// `dw = Xᵀ(ŷ - y) / m` and `db = Σ(ŷ - y) / m`.
#[must_use]
pub fn gradients(
    features: ArrayView2<'_, f64>,
    targets: ArrayView1<'_, f64>,
    probabilities: &Array1<f64>,
) -> (Array1<f64>, f64) {
    let m = features.nrows() as f64;
    let error = probabilities - &targets;
    let dw = features.t().dot(&error) / m;
    let db = error.sum() / m;
    (dw, db)
}

/// Contiguous batch ranges over `rows`; the last one may be short.
#[must_use]
pub fn batch_ranges(rows: usize, batch_size: usize) -> Vec<Range<usize>> {
    if batch_size == 0 {
        return Vec::new();
    }
    (0..rows)
        .step_by(batch_size)
        .map(|start| start..(start + batch_size).min(rows))
        .collect()
}

/// Fraction of matching labels.
#[must_use]
pub fn accuracy(expected: ArrayView1<'_, f64>, predicted: &Array1<u8>) -> f64 {
    if expected.is_empty() {
        return 0.0;
    }
    let hits = expected
        .iter()
        .zip(predicted.iter())
        .filter(|(y, p)| (**y - f64::from(**p)).abs() < f64::EPSILON)
        .count();
    hits as f64 / expected.len() as f64
}

/// Gradient-descent hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitParams {
    pub batch_size: usize,
    pub epochs: usize,
    pub learning_rate: f64,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            batch_size: 100,
            epochs: 1000,
            learning_rate: 0.01,
        }
    }
}

/// What a call to [`LogisticRegression::fit`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct FitSummary {
    pub epochs: usize,
    pub batches_per_epoch: usize,
    /// Parameter updates performed (one per batch)
    pub steps: usize,
    pub final_loss: Option<f64>,
}

/// Binary logistic regression classifier.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    threshold: f64,
    normalization: Normalization,
    weights: Array1<f64>,
    bias: f64,
    losses: Vec<f64>,
    fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl LogisticRegression {
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            normalization: Normalization::default(),
            weights: Array1::zeros(0),
            bias: 0.0,
            losses: Vec::new(),
            fitted: false,
        }
    }

    #[must_use]
    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[must_use]
    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    #[must_use]
    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    #[must_use]
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Full-dataset loss after each epoch of the last fit.
    #[must_use]
    pub fn losses(&self) -> &[f64] {
        &self.losses
    }

    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Fit weights and bias from zero.
    ///
    /// # Errors
    /// Returns error on an empty matrix, a row/target count mismatch,
    /// non-binary targets, a zero batch size or a non-positive learning rate.
    pub fn fit(
        &mut self,
        features: &Array2<f64>,
        targets: &Array1<f64>,
        params: &FitParams,
    ) -> Result<FitSummary, TrainingError> {
        let (rows, cols) = features.dim();
        if rows == 0 {
            return Err(TrainingError::EmptyDataset);
        }
        if targets.len() != rows {
            return Err(TrainingError::TargetLengthMismatch {
                rows,
                targets: targets.len(),
            });
        }
        if let Some(bad) = targets.iter().find(|y| **y != 0.0 && **y != 1.0) {
            return Err(TrainingError::NonBinaryTarget(*bad));
        }
        if params.batch_size == 0 {
            return Err(TrainingError::InvalidBatchSize);
        }
        if !params.learning_rate.is_finite() || params.learning_rate <= 0.0 {
            return Err(TrainingError::InvalidLearningRate(params.learning_rate));
        }

        self.weights = Array1::zeros(cols);
        self.bias = 0.0;
        self.losses = Vec::with_capacity(params.epochs);

        let normalized = self.normalization.apply(features);
        let batches = batch_ranges(rows, params.batch_size);
        let lr = params.learning_rate;
        let mut steps = 0;

        for epoch in 0..params.epochs {
            for range in &batches {
                let x = normalized.slice(s![range.clone(), ..]);
                let y = targets.slice(s![range.clone()]);
                let h = hypothesis(x, &self.weights, self.bias);
                let (dw, db) = gradients(x, y, &h);

                self.weights.scaled_add(-lr, &dw);
                self.bias -= lr * db;
                steps += 1;
            }

            let h = hypothesis(normalized.view(), &self.weights, self.bias);
            let loss = binary_cross_entropy(targets.view(), h.view());
            tracing::debug!(epoch, loss, "epoch complete");
            self.losses.push(loss);
        }

        self.fitted = true;

        let summary = FitSummary {
            epochs: params.epochs,
            batches_per_epoch: batches.len(),
            steps,
            final_loss: self.losses.last().copied(),
        };
        tracing::info!(
            "Fitted logistic regression: {} rows, {} features, {} epochs x {} batches, loss={:?}",
            rows,
            cols,
            summary.epochs,
            summary.batches_per_epoch,
            summary.final_loss
        );
        Ok(summary)
    }

    /// Probability of the positive class for every row.
    ///
    /// The input is normalized with its own column statistics.
    ///
    /// # Errors
    /// Returns error if the model is unfitted or the feature count differs.
    pub fn predict_proba(&self, features: &Array2<f64>) -> Result<Array1<f64>, TrainingError> {
        if !self.fitted {
            return Err(TrainingError::NotFitted);
        }
        if features.ncols() != self.weights.len() {
            return Err(TrainingError::FeatureMismatch {
                expected: self.weights.len(),
                actual: features.ncols(),
            });
        }
        let normalized = self.normalization.apply(features);
        Ok(hypothesis(normalized.view(), &self.weights, self.bias))
    }

    /// Labels: 1 when the probability is strictly above the threshold.
    ///
    /// # Errors
    /// See [`LogisticRegression::predict_proba`].
    pub fn predict(&self, features: &Array2<f64>) -> Result<Array1<u8>, TrainingError> {
        let threshold = self.threshold;
        Ok(self
            .predict_proba(features)?
            .mapv(|p| u8::from(p > threshold)))
    }

    /// Snapshot of the fitted parameters for persistence.
    #[must_use]
    pub fn to_fitted(&self, feature_names: &[&str]) -> FittedModel {
        FittedModel {
            feature_names: feature_names.iter().map(|n| (*n).to_string()).collect(),
            weights: self.weights.to_vec(),
            bias: self.bias,
            threshold: self.threshold,
            normalization: self.normalization,
            losses: self.losses.clone(),
            trained_at: chrono::Utc::now(),
        }
    }

    /// Rebuild a classifier from persisted parameters.
    #[must_use]
    pub fn from_fitted(model: &FittedModel) -> Self {
        Self {
            threshold: model.threshold,
            normalization: model.normalization,
            weights: Array1::from(model.weights.clone()),
            bias: model.bias,
            losses: model.losses.clone(),
            fitted: true,
        }
    }
}

/// Persisted regression parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub feature_names: Vec<String>,
    pub weights: Vec<f64>,
    pub bias: f64,
    pub threshold: f64,
    pub normalization: Normalization,
    #[serde(default)]
    pub losses: Vec<f64>,
    pub trained_at: chrono::DateTime<chrono::Utc>,
}

/// Build a row-major matrix, mapping shape errors into [`TrainingError`].
///
/// # Errors
/// Returns [`TrainingError::Shape`] when `values.len() != rows * cols`.
pub fn matrix(rows: usize, cols: usize, values: Vec<f64>) -> Result<Array2<f64>, TrainingError> {
    Array2::from_shape_vec((rows, cols), values).map_err(|e| TrainingError::Shape(e.to_string()))
}
