//! Chart port: Trait for rendering grouped counts.

/// One labelled group of bars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartGroup {
    pub label: String,
    /// (bar label, value) pairs in display order
    pub values: Vec<(String, u64)>,
}

impl ChartGroup {
    #[must_use]
    pub fn new(label: impl Into<String>, values: Vec<(String, u64)>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }
}

/// Renders grouped bar charts to text.
pub trait ChartRenderer: Send + Sync {
    /// Render `groups` under `title`.
    fn render(&self, title: &str, groups: &[ChartGroup]) -> String;
}
