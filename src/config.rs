//! Runtime configuration.
//!
//! Every value has a default; environment variables override them on a
//! best-effort basis (unparseable or out-of-range values are ignored).

use crate::domain::{FitParams, Normalization};
use crate::CardioError;

/// Logistic regression training settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Rows per gradient step
    pub batch_size: usize,

    /// Passes over the whole dataset
    pub epochs: usize,

    pub learning_rate: f64,

    /// Probability above which a row is labelled positive
    pub threshold: f64,

    pub normalization: Normalization,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            epochs: 1000,
            learning_rate: 0.01,
            threshold: 0.5,
            normalization: Normalization::ZScore,
        }
    }
}

impl TrainingConfig {
    /// Load config overrides from environment (best-effort).
    ///
    /// Supported:
    /// - CARDIOLENS_TRAIN_BATCH_SIZE
    /// - CARDIOLENS_TRAIN_EPOCHS
    /// - CARDIOLENS_TRAIN_LEARNING_RATE
    /// - CARDIOLENS_TRAIN_THRESHOLD
    /// - CARDIOLENS_TRAIN_NORMALIZATION="zscore|legacy"
    #[must_use]
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(v) = lookup("CARDIOLENS_TRAIN_BATCH_SIZE") {
            if let Ok(x) = v.trim().parse::<usize>() {
                if x > 0 {
                    cfg.batch_size = x;
                }
            }
        }

        if let Some(v) = lookup("CARDIOLENS_TRAIN_EPOCHS") {
            if let Ok(x) = v.trim().parse::<usize>() {
                cfg.epochs = x;
            }
        }

        if let Some(v) = lookup("CARDIOLENS_TRAIN_LEARNING_RATE") {
            if let Ok(x) = v.trim().parse::<f64>() {
                if x.is_finite() && x > 0.0 {
                    cfg.learning_rate = x;
                }
            }
        }

        if let Some(v) = lookup("CARDIOLENS_TRAIN_THRESHOLD") {
            if let Ok(x) = v.trim().parse::<f64>() {
                if (0.0..=1.0).contains(&x) {
                    cfg.threshold = x;
                }
            }
        }

        if let Some(v) = lookup("CARDIOLENS_TRAIN_NORMALIZATION") {
            if let Ok(mode) = v.parse::<Normalization>() {
                cfg.normalization = mode;
            }
        }

        cfg
    }

    /// Reject settings that cannot train.
    ///
    /// # Errors
    /// Returns [`CardioError::Config`] naming the offending field.
    pub fn validate(&self) -> Result<(), CardioError> {
        if self.batch_size == 0 {
            return Err(CardioError::Config("batch_size must be at least 1".into()));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(CardioError::Config(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(CardioError::Config(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn fit_params(&self) -> FitParams {
        FitParams {
            batch_size: self.batch_size,
            epochs: self.epochs,
            learning_rate: self.learning_rate,
        }
    }
}

/// CSV reading settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetConfig {
    /// Field delimiter; sniffed from the header line when unset
    pub delimiter: Option<u8>,
}

impl DatasetConfig {
    /// Load config overrides from environment (best-effort).
    ///
    /// Supported:
    /// - CARDIOLENS_CSV_DELIMITER (a single ASCII character, or "tab")
    #[must_use]
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(v) = lookup("CARDIOLENS_CSV_DELIMITER") {
            cfg.delimiter = parse_delimiter(&v);
        }
        cfg
    }
}

/// Parse a delimiter given as a single ASCII character or `tab`.
#[must_use]
pub fn parse_delimiter(raw: &str) -> Option<u8> {
    if raw.eq_ignore_ascii_case("tab") || raw == "\\t" {
        return Some(b'\t');
    }
    match raw.as_bytes() {
        [b] if b.is_ascii() => Some(*b),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = TrainingConfig::default();
        assert_eq!(cfg.batch_size, 100);
        assert_eq!(cfg.epochs, 1000);
        assert!((cfg.learning_rate - 0.01).abs() < f64::EPSILON);
        assert!((cfg.threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(cfg.normalization, Normalization::ZScore);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let cfg = TrainingConfig::from_lookup(lookup(&[
            ("CARDIOLENS_TRAIN_BATCH_SIZE", "32"),
            ("CARDIOLENS_TRAIN_EPOCHS", " 10 "),
            ("CARDIOLENS_TRAIN_LEARNING_RATE", "0.2"),
            ("CARDIOLENS_TRAIN_THRESHOLD", "0.7"),
            ("CARDIOLENS_TRAIN_NORMALIZATION", "legacy"),
        ]));
        assert_eq!(cfg.batch_size, 32);
        assert_eq!(cfg.epochs, 10);
        assert!((cfg.learning_rate - 0.2).abs() < f64::EPSILON);
        assert!((cfg.threshold - 0.7).abs() < f64::EPSILON);
        assert_eq!(cfg.normalization, Normalization::Legacy);
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let cfg = TrainingConfig::from_lookup(lookup(&[
            ("CARDIOLENS_TRAIN_BATCH_SIZE", "0"),
            ("CARDIOLENS_TRAIN_LEARNING_RATE", "-1"),
            ("CARDIOLENS_TRAIN_THRESHOLD", "1.5"),
            ("CARDIOLENS_TRAIN_NORMALIZATION", "minmax"),
        ]));
        assert_eq!(cfg, TrainingConfig::default());
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let cfg = TrainingConfig {
            batch_size: 0,
            ..TrainingConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(CardioError::Config(_))));
    }

    #[test]
    fn test_delimiter_parsing() {
        assert_eq!(parse_delimiter(";"), Some(b';'));
        assert_eq!(parse_delimiter("tab"), Some(b'\t'));
        assert_eq!(parse_delimiter(";;"), None);
        assert_eq!(
            DatasetConfig::from_lookup(lookup(&[("CARDIOLENS_CSV_DELIMITER", ",")])).delimiter,
            Some(b',')
        );
        assert_eq!(DatasetConfig::from_lookup(lookup(&[])).delimiter, None);
    }
}
