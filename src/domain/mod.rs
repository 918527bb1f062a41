//! Domain layer: Core business types and logic.
//!
//! Pure types with no I/O. Classification tables, patient predicates,
//! per-category aggregation and the logistic regression trainer all live
//! here; adapters only move data in and out.

mod classify;
mod dataset;
mod levels;
mod patient;
pub mod regression;
pub mod tables;

pub use classify::{
    age_group, age_in_years, bmi, bmi_category, bmi_within_allowed, broader_age_group,
    diastolic_stage, systolic_stage, ClassificationError,
};
pub use dataset::{
    count_by, status_counts, BooleanizedRecord, CardioRecord, CategoryCounts, CountKey, CountRow,
    Dataset, StatusCounts,
};
pub use levels::{
    AgeGroup, BmiCategory, BroaderAgeGroup, Category, Gender, LabLevel, PressureStage,
};
pub use patient::{Patient, PatientCheck};
pub use regression::{
    accuracy, FitParams, FitSummary, FittedModel, LogisticRegression, Normalization, TrainingError,
};

#[cfg(test)]
pub(crate) use dataset::tests::record as test_record;
#[cfg(test)]
pub(crate) use patient::tests::sample_patient;
