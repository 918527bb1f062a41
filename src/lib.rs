//! # Cardiolens
//!
//! Exploratory analysis and risk modelling for the cardiovascular disease
//! dataset.
//!
//! This crate provides:
//! - Table-driven classification of patients (age group, BMI category,
//!   blood-pressure stage) and validity/health predicates
//! - Per-category total and positive-diagnosis counts
//! - A mini-batch logistic regression classifier
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (Patient, classification tables, regression)
//! - `ports`: Trait definitions for dataset storage and chart rendering
//! - `adapters`: Concrete implementations (CSV files, terminal bar charts)
//! - `application`: Use cases orchestrating domain and ports
//! - `config`: Environment-driven configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use domain::{Patient, PatientCheck};

/// Result type for Cardiolens operations
pub type Result<T> = std::result::Result<T, CardioError>;

/// Main error type for Cardiolens
#[derive(Debug, thiserror::Error)]
pub enum CardioError {
    #[error("Classification failed: {0}")]
    Classification(#[from] domain::ClassificationError),

    #[error("Dataset operation failed: {0}")]
    Dataset(#[from] adapters::DatasetError),

    #[error("Training failed: {0}")]
    Training(#[from] domain::TrainingError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
