//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application.

mod analytics;
pub mod synthetic;
mod training;

pub use analytics::{
    count_chart_groups, status_chart_group, AnalyticsService, DatasetSummary, FilterReport,
};
pub use training::{
    feature_matrix, feature_row, Prediction, TrainingReport, TrainingService, FEATURE_NAMES,
};
