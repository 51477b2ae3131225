//! Low-level buffer helpers shared by the widgets.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use crate::viewport::ViewportState;

const TAB_COLS: usize = 4;

pub fn render_scrollbar(area: Rect, buf: &mut Buffer, state: &ViewportState, style: Style) {
    buf.set_style(area, style);
    if area.height == 0 {
        return;
    }

    let (thumb_top, thumb_h) = match scrollbar_thumb(area.height, state) {
        Some(thumb) => thumb,
        None => (0, 0),
    };
    for dy in 0..area.height {
        let ch = if dy >= thumb_top && dy < thumb_top + thumb_h {
            "█"
        } else {
            " "
        };
        buf.set_stringn(area.x, area.y + dy, ch, 1, style);
    }
}

/// Returns `(top, height)` of the thumb inside a track of `track_h` rows, or `None` when the
/// content fits in the viewport.
fn scrollbar_thumb(track_h: u16, state: &ViewportState) -> Option<(u16, u16)> {
    if state.content_h == 0 || state.content_h <= state.viewport_h as u32 {
        return None;
    }
    let track = track_h as f64;
    let thumb_h = ((state.viewport_h as f64 / state.content_h as f64) * track)
        .round()
        .clamp(1.0, track) as u16;
    let max_y = state
        .content_h
        .saturating_sub(state.viewport_h as u32)
        .max(1) as f64;
    let free = (track - thumb_h as f64).max(0.0);
    let thumb_top = ((state.y as f64 / max_y) * free).round().clamp(0.0, free) as u16;
    Some((thumb_top, thumb_h))
}

/// Draws `line` starting at display column `start_col` of the line, into at most `max_cols` cells.
///
/// Spans without a style of their own use `fallback_style`. Wide characters that straddle either
/// clip edge are dropped rather than split.
pub fn render_line_clipped(
    x: u16,
    y: u16,
    start_col: u32,
    max_cols: u16,
    buf: &mut Buffer,
    line: &Line<'_>,
    fallback_style: Style,
) {
    if max_cols == 0 {
        return;
    }
    let start_col = start_col as usize;
    let max_cols = max_cols as usize;
    let mut col = 0usize;
    let mut out_cols = 0usize;
    let mut tmp = [0u8; 4];

    for span in &line.spans {
        let style = if span.style == Style::default() {
            fallback_style.patch(line.style)
        } else {
            span.style
        };
        for ch in span.content.chars() {
            let (symbol, w) = if ch == '\t' {
                (" ", TAB_COLS)
            } else {
                let w = UnicodeWidthChar::width(ch).unwrap_or(0);
                if w == 0 {
                    continue;
                }
                (&*ch.encode_utf8(&mut tmp), w)
            };

            if col < start_col {
                col += w;
                if ch == '\t' && col > start_col {
                    // Partially visible tab: emit its remaining columns as spaces.
                    let visible = (col - start_col).min(max_cols - out_cols);
                    put_blank(buf, x, y, out_cols, visible, style);
                    out_cols += visible;
                }
                continue;
            }
            if out_cols + w > max_cols {
                if ch == '\t' {
                    put_blank(buf, x, y, out_cols, max_cols - out_cols, style);
                }
                return;
            }

            if ch == '\t' {
                put_blank(buf, x, y, out_cols, TAB_COLS, style);
            } else if let Some(cell) = buf.cell_mut((x + out_cols as u16, y)) {
                cell.set_style(style);
                cell.set_symbol(symbol);
            }
            if w == 2 {
                if let Some(cont) = buf.cell_mut((x + out_cols as u16 + 1, y)) {
                    cont.set_style(style);
                    cont.set_symbol("");
                }
            }
            out_cols += w;
            col += w;
        }
    }
}

fn put_blank(buf: &mut Buffer, x: u16, y: u16, from: usize, n: usize, style: Style) {
    for i in 0..n {
        if let Some(cell) = buf.cell_mut((x + (from + i) as u16, y)) {
            cell.set_style(style);
            cell.set_symbol(" ");
        }
    }
}

pub fn render_str_clipped(
    x: u16,
    y: u16,
    start_col: u32,
    max_cols: u16,
    buf: &mut Buffer,
    input: &str,
    style: Style,
) {
    let line = Line::from(Span::raw(input));
    render_line_clipped(x, y, start_col, max_cols, buf, &line, style);
}

pub fn slice_by_cols(input: &str, start_col: u32, max_cols: u16) -> String {
    let start_col = start_col as usize;
    let max_cols = max_cols as usize;
    let mut col = 0usize;
    let mut out_cols = 0usize;
    let mut out = String::new();

    for ch in input.chars() {
        let w = if ch == '\t' {
            TAB_COLS
        } else {
            UnicodeWidthChar::width(ch).unwrap_or(0)
        };
        if w == 0 {
            continue;
        }
        let straddles = col < start_col && col + w > start_col;
        col += w;
        if col <= start_col || straddles {
            continue;
        }
        if out_cols + w > max_cols {
            break;
        }
        if ch == '\t' {
            out.push_str("    ");
        } else {
            out.push(ch);
        }
        out_cols += w;
    }
    out
}

/// Truncates `input` to `max_cols`, replacing the tail with `…` when it does not fit.
pub fn truncate_with_ellipsis(input: &str, max_cols: u16) -> String {
    if input.width() <= max_cols as usize {
        return input.to_string();
    }
    if max_cols == 0 {
        return String::new();
    }
    let mut out = slice_by_cols(input, 0, max_cols - 1);
    out.push('…');
    out
}

/// Display width of a line, tabs counted as four columns.
pub fn line_width(line: &Line<'_>) -> usize {
    line.spans
        .iter()
        .flat_map(|s| s.content.chars())
        .map(|ch| {
            if ch == '\t' {
                TAB_COLS
            } else {
                UnicodeWidthChar::width(ch).unwrap_or(0)
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn slice_by_cols_expands_tabs_and_clips() {
        assert_eq!(slice_by_cols("\t1", 0, 4), "    ");
        assert_eq!(slice_by_cols("abcdef", 2, 3), "cde");
    }

    #[test]
    fn slice_by_cols_drops_straddling_wide_chars() {
        assert_eq!(slice_by_cols("你好", 0, 2), "你");
        assert_eq!(slice_by_cols("你好", 1, 2), "好");
    }

    #[test]
    fn truncate_adds_ellipsis_only_when_needed() {
        assert_eq!(truncate_with_ellipsis("name", 4), "name");
        assert_eq!(truncate_with_ellipsis("address", 4), "add…");
        assert_eq!(truncate_with_ellipsis("address", 0), "");
    }

    #[test]
    fn render_line_clips_from_the_left() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 1));
        render_str_clipped(0, 0, 2, 4, &mut buf, "abcdefg", Style::default());
        assert_eq!(row_text(&buf, 0), "cdef");
    }

    #[test]
    fn scrollbar_thumb_tracks_scroll_position() {
        let mut state = ViewportState::default();
        state.set_viewport(1, 10);
        state.set_content(1, 100);
        assert_eq!(scrollbar_thumb(10, &state), Some((0, 1)));
        state.to_bottom();
        assert_eq!(scrollbar_thumb(10, &state), Some((9, 1)));
        state.set_content(1, 5);
        assert_eq!(scrollbar_thumb(10, &state), None);
    }
}
