use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;

use crate::input::KeyCode;
use crate::keymap;
use crate::keymap::Binding;
use crate::render;
use crate::selection::SelectionBindings;
use crate::theme::Theme;

#[derive(Clone, Debug)]
pub struct HintBarOptions {
    pub style: Style,
    pub key_style: Style,
    pub separator: String,
}

impl Default for HintBarOptions {
    fn default() -> Self {
        Self {
            style: Style::default(),
            key_style: Style::default(),
            separator: " · ".to_string(),
        }
    }
}

/// One line of `key description` hints.
#[derive(Clone, Debug, Default)]
pub struct HintBar {
    bindings: Vec<Binding>,
    options: HintBarOptions,
}

impl HintBar {
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self {
            bindings,
            options: HintBarOptions::default(),
        }
    }

    pub fn with_options(bindings: Vec<Binding>, options: HintBarOptions) -> Self {
        Self { bindings, options }
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let style = if self.options.style == Style::default() {
            theme.text_muted
        } else {
            self.options.style
        };
        let key_style = self.options.key_style.patch(theme.accent);
        buf.set_style(area, style);
        render::render_line_clipped(
            area.x,
            area.y,
            0,
            area.width,
            buf,
            &self.to_line(style, key_style),
            style,
        );
    }

    fn to_line(&self, style: Style, key_style: Style) -> Line<'static> {
        let mut spans = Vec::with_capacity(self.bindings.len() * 4);
        for (i, b) in self.bindings.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(self.options.separator.clone(), style));
            }
            spans.push(Span::styled(b.hint_key.clone(), key_style));
            spans.push(Span::styled(" ", style));
            spans.push(Span::styled(b.hint_desc.clone(), style));
        }
        Line::from(spans)
    }
}

/// Hints for the keys a [`crate::table::TableView`] handles with `selection` bindings.
pub fn table_hints(selection: &SelectionBindings) -> Vec<Binding> {
    vec![
        Binding::new(
            "↑/↓",
            "move",
            vec![keymap::key(KeyCode::Up), keymap::key(KeyCode::Down)],
        ),
        Binding::new("space", "toggle", selection.toggle.clone()),
        Binding::new("a", "toggle page", selection.toggle_all.clone()),
        Binding::new("esc", "clear", selection.clear.clone()),
        Binding::new("enter", "open", vec![keymap::key(KeyCode::Enter)]),
    ]
}
