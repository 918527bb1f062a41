//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (dataset files, chart
//! output).

mod chart;
mod dataset;

pub use chart::{ChartGroup, ChartRenderer};
pub use dataset::DatasetStore;
