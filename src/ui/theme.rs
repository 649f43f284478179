//! Visual theme and styling.

use console::Style;

/// Styles for progress lines.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Style for "done" and the final success line (green).
    pub success: Style,
    /// Style for warnings (yellow).
    pub warning: Style,
    /// Style for "error" (red bold).
    pub error: Style,
    /// Style for "skip" and secondary detail (dim).
    pub dim: Style,
    /// Style for step labels and the header (bold).
    pub highlight: Style,
    /// Style for echoed commands (dim italic).
    pub command: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new()
    }
}

impl Theme {
    /// Create the colored theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            command: Style::new().dim().italic(),
        }
    }

    /// Create a theme without colors (for non-TTY or `NO_COLOR`).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            command: Style::new(),
        }
    }

    /// Pick the theme for the current terminal.
    pub fn detect() -> Self {
        if should_use_colors() {
            Self::new()
        } else {
            Self::plain()
        }
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // Check NO_COLOR env var (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_theme_leaves_text_untouched() {
        let theme = Theme::plain();
        assert_eq!(theme.success.apply_to("done").to_string(), "done");
        assert_eq!(theme.error.apply_to("error").to_string(), "error");
    }

    #[test]
    fn default_theme_creates_without_panic() {
        let theme = Theme::default();
        let _ = theme.command.apply_to("gclient sync").to_string();
    }
}
