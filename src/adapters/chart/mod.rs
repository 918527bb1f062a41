//! Terminal chart adapter: Implementation of ChartRenderer.
//!
//! Draws grouped bar charts with ratatui into an off-screen buffer and
//! returns the buffer as plain text, so charts can be printed to any
//! stream without taking over the terminal.

mod theme;

pub use theme::ChartTheme;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Widget},
};

use crate::ports::{ChartGroup, ChartRenderer};

const MIN_BAR_WIDTH: u16 = 3;
const MAX_BAR_WIDTH: u16 = 14;
const BAR_GAP: u16 = 1;
const GROUP_GAP: u16 = 3;

/// Bar chart renderer backed by ratatui widgets.
#[derive(Debug, Clone, Copy)]
pub struct TerminalBarChart {
    height: u16,
}

impl Default for TerminalBarChart {
    fn default() -> Self {
        Self { height: 16 }
    }
}

impl TerminalBarChart {
    /// Renderer producing charts `height` rows tall (borders included).
    #[must_use]
    pub fn new(height: u16) -> Self {
        Self {
            height: height.max(6),
        }
    }

    fn bar_width(groups: &[ChartGroup]) -> u16 {
        let widest = groups
            .iter()
            .flat_map(|g| g.values.iter())
            .map(|(label, value)| label.chars().count().max(value.to_string().len()))
            .max()
            .unwrap_or(0);
        u16::try_from(widest)
            .unwrap_or(MAX_BAR_WIDTH)
            .clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH)
    }

    fn chart_width(groups: &[ChartGroup], bar_width: u16, title: &str) -> u16 {
        let bars: usize = groups.iter().map(|g| g.values.len()).sum();
        let inner = bars * usize::from(bar_width + BAR_GAP)
            + groups.len() * usize::from(GROUP_GAP);
        let width = inner.max(title.chars().count() + 2) + 2;
        u16::try_from(width).unwrap_or(u16::MAX)
    }
}

impl ChartRenderer for TerminalBarChart {
    fn render(&self, title: &str, groups: &[ChartGroup]) -> String {
        let bar_width = Self::bar_width(groups);
        let area = Rect::new(0, 0, Self::chart_width(groups, bar_width, title), self.height);
        let mut buf = Buffer::empty(area);

        let mut chart = BarChart::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(ChartTheme::border())
                    .title(Span::styled(format!(" {title} "), ChartTheme::title())),
            )
            .bar_width(bar_width)
            .bar_gap(BAR_GAP)
            .group_gap(GROUP_GAP);

        for group in groups {
            let bars: Vec<Bar> = group
                .values
                .iter()
                .enumerate()
                .map(|(i, (label, value))| {
                    Bar::default()
                        .value(*value)
                        .label(Line::from(label.clone()))
                        .style(ChartTheme::bar(i))
                })
                .collect();
            chart = chart.data(
                BarGroup::default()
                    .label(Line::styled(group.label.clone(), ChartTheme::group_label()))
                    .bars(&bars),
            );
        }

        chart.render(area, &mut buf);
        buffer_to_text(&buf)
    }
}

/// Cell symbols row by row, trailing blanks trimmed.
fn buffer_to_text(buf: &Buffer) -> String {
    let area = buf.area;
    let mut lines = Vec::with_capacity(usize::from(area.height));
    for y in area.top()..area.bottom() {
        let line: String = (area.left()..area.right())
            .map(|x| buf.cell((x, y)).map_or(" ", |c| c.symbol()))
            .collect();
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}
