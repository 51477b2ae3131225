use ratatui::style::Style;

/// Styles shared by every widget in the workspace.
///
/// Widget options that are left at `Style::default()` fall back to these.
#[derive(Clone, Debug)]
pub struct Theme {
    pub text_primary: Style,
    pub text_muted: Style,
    pub accent: Style,
    pub selected: Style,
    pub disabled: Style,
}

impl Default for Theme {
    fn default() -> Self {
        use ratatui::style::Stylize;

        Self {
            text_primary: Style::default(),
            text_muted: Style::default().dark_gray(),
            accent: Style::default().cyan(),
            selected: Style::default().green().bold(),
            disabled: Style::default().dark_gray().italic(),
        }
    }
}
