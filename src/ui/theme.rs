//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::timeline::PALETTE_SIZE;
use crate::data::vibration::MachineTint;
use crate::data::FaultType;

/// Series colors, indexed by position in the timeline selection.
const SERIES_PALETTE: [(u8, u8, u8); PALETTE_SIZE] = [
    (52, 211, 153),
    (59, 130, 246),
    (251, 191, 36),
    (251, 146, 60),
    (244, 114, 182),
];

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for error messages.
    pub error: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Style for a filter chip that is switched on.
    pub chip_on: Style,
    /// Style for a filter chip that is switched off.
    pub chip_off: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
    /// Whether the terminal background is light.
    pub light: bool,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            error: Color::Red,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            chip_on: Style::default().fg(Color::Black).bg(Color::Cyan),
            chip_off: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
            light: false,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            error: Color::Red,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            chip_on: Style::default().fg(Color::White).bg(Color::Blue),
            chip_off: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
            light: true,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Color for a fault type.
    pub fn fault_color(&self, fault: FaultType) -> Color {
        match fault {
            FaultType::Normal => Color::Green,
            FaultType::MassImbalance => Color::Yellow,
            FaultType::SupportFault => Color::LightRed,
            FaultType::CombinedFault => Color::Red,
        }
    }

    /// Row style for a fault type.
    pub fn fault_style(&self, fault: FaultType) -> Style {
        let style = Style::default().fg(self.fault_color(fault));
        if fault == FaultType::CombinedFault {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    /// Series color for a palette slot. `strong` is used for change points.
    pub fn series_color(&self, palette_index: usize, strong: bool) -> Color {
        let (r, g, b) = SERIES_PALETTE[palette_index % PALETTE_SIZE];
        if strong {
            return Color::Rgb(r, g, b);
        }
        // Blend 60/40 toward the background.
        let bg: u16 = if self.light { 255 } else { 0 };
        let mix = |c: u8| ((c as u16 * 6 + bg * 4) / 10) as u8;
        Color::Rgb(mix(r), mix(g), mix(b))
    }

    /// Row style for a vibration record's machine tint.
    pub fn tint_style(&self, tint: Option<MachineTint>) -> Style {
        match tint {
            Some(MachineTint::G1) => Style::default().fg(Color::Green),
            Some(MachineTint::G2) => Style::default().fg(Color::Blue),
            Some(MachineTint::G3) => Style::default().fg(Color::Yellow),
            None => Style::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_color_strong_is_palette() {
        let theme = Theme::dark();
        assert_eq!(theme.series_color(0, true), Color::Rgb(52, 211, 153));
        assert_eq!(theme.series_color(5, true), Color::Rgb(52, 211, 153));
    }

    #[test]
    fn test_series_color_faded_blends_toward_background() {
        assert_eq!(Theme::dark().series_color(1, false), Color::Rgb(35, 78, 147));
        assert_eq!(Theme::light().series_color(1, false), Color::Rgb(137, 180, 249));
    }
}
