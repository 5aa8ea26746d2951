//! Color handling for terminal output

use colored::{Color, Colorize};

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            muted: Color::BrightBlack,
        }
    }
}

/// How a whole line is highlighted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Normal,
    Header,
    Success,
    Warning,
    Error,
}

/// Applies a [`ColorScheme`] when colors are enabled, passes text through otherwise
#[derive(Debug, Clone)]
pub struct Painter {
    enabled: bool,
    scheme: ColorScheme,
}

impl Painter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, scheme: ColorScheme::default() }
    }

    pub fn paint(&self, text: &str, style: LineStyle) -> String {
        if !self.enabled {
            return text.to_string();
        }

        match style {
            LineStyle::Normal => text.to_string(),
            LineStyle::Header => text.color(self.scheme.header).bold().to_string(),
            LineStyle::Success => text.color(self.scheme.success).to_string(),
            LineStyle::Warning => text.color(self.scheme.warning).to_string(),
            LineStyle::Error => text.color(self.scheme.error).bold().to_string(),
        }
    }

    pub fn muted(&self, text: &str) -> String {
        if self.enabled {
            text.color(self.scheme.muted).to_string()
        } else {
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_painter_is_identity() {
        let painter = Painter::new(false);
        for style in [LineStyle::Header, LineStyle::Warning, LineStyle::Error] {
            assert_eq!(painter.paint("row", style), "row");
        }
        assert_eq!(painter.muted("note"), "note");
    }

    #[test]
    fn test_enabled_painter_emits_escape_codes() {
        colored::control::set_override(true);
        let painter = Painter::new(true);
        let painted = painter.paint("row", LineStyle::Error);
        assert!(painted.contains("\u{1b}["));
        assert!(painted.contains("row"));
        assert_eq!(painter.paint("row", LineStyle::Normal), "row");
    }
}
