//! Medical-themed color palette for charts.

use ratatui::style::{Color, Modifier, Style};

/// Chart color palette.
pub struct ChartTheme;

impl ChartTheme {
    /// Deep teal - Primary color
    pub const PRIMARY: Color = Color::Rgb(13, 148, 136); // #0D9488

    /// Lighter teal for highlights
    pub const PRIMARY_LIGHT: Color = Color::Rgb(45, 212, 191); // #2DD4BF

    /// Rose - positive diagnoses
    pub const DANGER: Color = Color::Rgb(244, 63, 94); // #F43F5E

    /// Amber
    pub const WARNING: Color = Color::Rgb(251, 191, 36); // #FBBF24

    /// Light slate for borders
    pub const SECONDARY_LIGHT: Color = Color::Rgb(148, 163, 184); // #94A3B8

    pub const TEXT_PRIMARY: Color = Color::Rgb(248, 250, 252); // #F8FAFC

    /// Bar colors, cycled by position inside a group.
    const BARS: [Color; 3] = [Self::PRIMARY, Self::DANGER, Self::WARNING];

    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::SECONDARY_LIGHT)
    }

    /// Style for group labels
    #[must_use]
    pub fn group_label() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for the `index`-th bar of a group.
    #[must_use]
    pub fn bar(index: usize) -> Style {
        Style::default().fg(Self::BARS[index % Self::BARS.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_colors_cycle() {
        assert_eq!(ChartTheme::bar(0), ChartTheme::bar(3));
        assert_ne!(ChartTheme::bar(0), ChartTheme::bar(1));
    }
}
