//! Dataset port: Trait for reading and writing tabular patient data.
//!
//! This trait abstracts the file format (CSV) from the application logic.

use std::path::Path;

use crate::domain::{BooleanizedRecord, CardioRecord};

/// Trait for dataset persistence.
pub trait DatasetStore: Send + Sync {
    /// Error type for dataset operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read every row of the dataset at `path`.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or a row does not parse.
    fn load_records(&self, path: &Path) -> Result<Vec<CardioRecord>, Self::Error>;

    /// Write rows in the raw layout, replacing any existing file.
    ///
    /// # Errors
    /// Returns error if the file cannot be written.
    fn save_records(&self, path: &Path, records: &[CardioRecord]) -> Result<(), Self::Error>;

    /// Write rows with categorical flags as booleans.
    ///
    /// # Errors
    /// Returns error if the file cannot be written.
    fn save_booleanized(
        &self,
        path: &Path,
        records: &[BooleanizedRecord],
    ) -> Result<(), Self::Error>;
}
