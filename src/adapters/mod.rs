//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the actual integration with external libraries:
//! - `csv`: csv + serde for dataset files
//! - `chart`: ratatui bar charts rendered to text

pub mod chart;
pub mod csv;

// Re-export dataset error for lib.rs
pub use self::csv::{CsvDatasetStore, DatasetError};
pub use chart::TerminalBarChart;
