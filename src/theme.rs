use ratatui::style::{Color, Modifier, Style};

/// Theme configuration for entity decorations
#[derive(Clone, Debug)]
pub struct Theme {
    /// Foreground color for undecorated text
    pub text_fg: Color,

    /// Color for link text
    pub link_color: Color,

    /// Modifiers added to link text
    pub link_modifier: Modifier,

    /// Foreground color for the URL hint printed after a link
    pub link_hint_fg: Color,

    /// Whether links are followed by a `<url>` hint
    pub show_link_hints: bool,

    /// Marker appended to links that open in a new window (`target="_blank"`)
    pub new_window_marker: &'static str,

    /// Color used when a color entity carries no parsable color
    pub fallback_color: Color,

    /// Background color marking the current selection
    pub selection_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text_fg: Color::Reset,
            link_color: Color::Blue,
            link_modifier: Modifier::UNDERLINED,
            link_hint_fg: Color::DarkGray,
            show_link_hints: true,
            new_window_marker: "↗",
            fallback_color: Color::Reset,
            selection_bg: Color::LightBlue,
        }
    }
}

impl Theme {
    /// Create a new theme with default colors
    pub fn new() -> Self {
        Self::default()
    }

    /// Theme without colors or hints, for plain output
    pub fn plain() -> Self {
        Self {
            link_color: Color::Reset,
            link_hint_fg: Color::Reset,
            show_link_hints: false,
            selection_bg: Color::Reset,
            ..Self::default()
        }
    }

    /// Get the style for undecorated text
    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text_fg)
    }

    /// Get the style for links
    pub fn link_style(&self) -> Style {
        Style::default()
            .fg(self.link_color)
            .add_modifier(self.link_modifier)
    }

    /// Get the style for URL hints
    pub fn link_hint_style(&self) -> Style {
        Style::default()
            .fg(self.link_hint_fg)
            .add_modifier(Modifier::DIM)
    }

    /// Get the style for selected text
    pub fn selection_style(&self) -> Style {
        Style::default().bg(self.selection_bg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_theme_drops_colors_and_hints() {
        let styled = Theme::new();
        assert!(styled.show_link_hints);
        assert_eq!(styled.link_style().fg, Some(Color::Blue));
        assert!(styled.link_style().add_modifier.contains(Modifier::UNDERLINED));

        let plain = Theme::plain();
        assert!(!plain.show_link_hints);
        assert_eq!(plain.link_style().fg, Some(Color::Reset));
        assert_eq!(plain.selection_style().bg, Some(Color::Reset));
        assert_eq!(plain.new_window_marker, styled.new_window_marker);
    }
}
