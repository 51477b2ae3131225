use std::hash::Hash;
use std::sync::Arc;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui_tablekit_core::columns::ColumnKind;
use ratatui_tablekit_core::columns::ColumnNode;
use ratatui_tablekit_core::columns::DEFAULT_SLOT;
use ratatui_tablekit_core::columns::SlotScope;
use ratatui_tablekit_core::config::TableConfig;
use ratatui_tablekit_core::input::InputEvent;
use ratatui_tablekit_core::input::KeyCode;
use ratatui_tablekit_core::input::KeyEvent;
use ratatui_tablekit_core::input::MouseEventKind;
use ratatui_tablekit_core::pagination::Pagination;
use ratatui_tablekit_core::render;
use ratatui_tablekit_core::selection::Selection;
use ratatui_tablekit_core::selection::SelectionBindings;
use ratatui_tablekit_core::selection::SelectionCommand;
use ratatui_tablekit_core::theme::Theme;
use ratatui_tablekit_core::viewport::ViewportState;
use serde::Serialize;
use virtualizer::Align;
use virtualizer::VirtualItem;
use virtualizer::Virtualizer;
use virtualizer::VirtualizerOptions;

use super::layout::ColumnLayout;
use super::layout::LeafColumn;
use super::layout::value_text;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableAction {
    None,
    Redraw,
    /// Enter on the cursor row; the index is into the `rows` slice passed to `handle_event`.
    Activated(usize),
    SelectionChanged,
}

/// Options for [`TableView`].
#[derive(Clone, Debug)]
pub struct TableViewOptions {
    pub show_header: bool,
    pub show_footer: bool,
    pub show_scrollbar: bool,
    pub overscan_rows: usize,
    pub overscan_cols: usize,
    pub col_gap: u32,
    pub default_col_width: u16,
    pub horiz_step: i32,
    pub wheel_step: i32,
    pub style: Style,
    pub header_style: Style,
    pub grid_line_style: Style,
    pub scrollbar_style: Style,
    pub cursor_style: Style,
    pub selected_style: Style,
    pub disabled_style: Style,
    pub footer_style: Style,
    pub bindings: SelectionBindings,
}

impl Default for TableViewOptions {
    fn default() -> Self {
        Self {
            show_header: true,
            show_footer: true,
            show_scrollbar: true,
            overscan_rows: 2,
            overscan_cols: 2,
            col_gap: 1,
            default_col_width: 12,
            horiz_step: 4,
            wheel_step: 3,
            style: Style::default(),
            header_style: Style::default().add_modifier(Modifier::BOLD),
            grid_line_style: Style::default(),
            scrollbar_style: Style::default(),
            cursor_style: Style::default().add_modifier(Modifier::REVERSED),
            selected_style: Style::default(),
            disabled_style: Style::default(),
            footer_style: Style::default(),
            bindings: SelectionBindings::default(),
        }
    }
}

impl TableViewOptions {
    /// Built-in defaults with every field set in `config` applied.
    pub fn from_config(config: &TableConfig) -> Self {
        let defaults = Self::default();
        Self {
            show_header: config.show_header.unwrap_or(defaults.show_header),
            show_footer: config.show_footer.unwrap_or(defaults.show_footer),
            col_gap: config.col_gap.map_or(defaults.col_gap, u32::from),
            default_col_width: config
                .default_col_width
                .unwrap_or(defaults.default_col_width),
            ..defaults
        }
    }
}

/// What [`TableView::render`] draws: the rows of the current page and the state they are shown
/// against.
pub struct TableData<'a, R, K> {
    pub rows: &'a [R],
    pub selection: &'a Selection<R, K>,
    /// When set, slot indices are absolute (page offset + row) and the footer shows a pager.
    pub pagination: Option<&'a Pagination>,
}

/// A table whose columns come from a rendered column schema.
///
/// Leaf columns become body columns; column groups become extra header rows spanning their
/// leaves. Cells are drawn by the leaf's `default` slot, or by the row field named by its
/// `prop`/`field` property. Rows are virtualised on both axes so large pages stay cheap.
///
/// The view owns only layout and cursor state. Rows, the [`Selection`] and the [`Pagination`]
/// belong to the app and are passed in on every call.
pub struct TableView<R> {
    pub state: ViewportState,
    options: TableViewOptions,
    layout: ColumnLayout<R>,
    leaf_starts: Vec<u64>,
    rows: usize,
    cursor: Option<usize>,
    row_v: Virtualizer,
    col_v: Virtualizer,
    row_items: Vec<VirtualItem>,
    col_items: Vec<VirtualItem>,
}

impl<R> Default for TableView<R> {
    fn default() -> Self {
        Self::with_options(TableViewOptions::default())
    }
}

#[derive(Clone, Copy)]
struct TableStyles {
    base: Style,
    header: Style,
    grid_line: Style,
    cursor: Style,
    selected: Style,
    disabled: Style,
    footer: Style,
}

struct SeparatorContext<'a> {
    area: Rect,
    scroll_x: u64,
    buf: &'a mut Buffer,
    style: Style,
}

impl<R> TableView<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TableViewOptions) -> Self {
        let mut row_opts = VirtualizerOptions::new(0, |_| 1);
        row_opts.overscan = options.overscan_rows;
        let mut col_opts = VirtualizerOptions::new(0, |_| 1);
        col_opts.gap = options.col_gap;
        col_opts.overscan = options.overscan_cols;
        Self {
            state: ViewportState::default(),
            options,
            layout: ColumnLayout::default(),
            leaf_starts: Vec::new(),
            rows: 0,
            cursor: None,
            row_v: Virtualizer::new(row_opts),
            col_v: Virtualizer::new(col_opts),
            row_items: Vec::new(),
            col_items: Vec::new(),
        }
    }

    pub fn options(&self) -> &TableViewOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: TableViewOptions) {
        self.options = options;
        self.layout.set_default_width(self.options.default_col_width);
        self.rebuild_row_virtualizer();
        self.rebuild_col_virtualizer();
        self.state.clamp();
    }

    /// Replaces the columns with a freshly rendered column tree.
    pub fn set_columns(&mut self, nodes: Vec<ColumnNode<R>>) {
        self.layout = ColumnLayout::build(nodes, self.options.default_col_width);
        tracing::debug!(
            leaves = self.layout.leaves.len(),
            header_rows = self.layout.depth,
            "table columns laid out"
        );
        self.rebuild_col_virtualizer();
        self.state.clamp();
    }

    pub fn layout(&self) -> &ColumnLayout<R> {
        &self.layout
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: Option<usize>) {
        self.cursor = clamp_cursor(cursor, self.rows);
        self.ensure_cursor_visible();
    }

    /// Number of header rows the current columns need.
    pub fn header_rows(&self) -> u16 {
        if self.options.show_header {
            self.layout.depth.min(u16::MAX as usize) as u16
        } else {
            0
        }
    }

    pub fn handle_event<K>(
        &mut self,
        event: InputEvent,
        rows: &[R],
        selection: &mut Selection<R, K>,
    ) -> TableAction
    where
        R: Clone,
        K: Hash + Eq,
    {
        self.set_row_count(rows.len());
        match event {
            InputEvent::Key(key) => self.handle_key(key, rows, selection),
            InputEvent::Mouse(mouse) => {
                let step = self.options.wheel_step;
                match mouse.kind {
                    MouseEventKind::ScrollUp => self.scroll_y_by(-step),
                    MouseEventKind::ScrollDown => self.scroll_y_by(step),
                }
                TableAction::Redraw
            }
        }
    }

    pub fn scroll_y_by(&mut self, delta: i32) {
        self.sync_virtualizers_from_state();
        self.state.scroll_y_by(delta);
        self.row_v.set_scroll_offset(self.state.y as u64);
        self.state.y = clamp_u32(self.row_v.scroll_offset());
    }

    pub fn scroll_x_by(&mut self, delta: i32) {
        self.sync_virtualizers_from_state();
        self.state.scroll_x_by(delta);
        self.col_v.set_scroll_offset(self.state.x as u64);
        self.state.x = clamp_u32(self.col_v.scroll_offset());
    }

    pub fn ensure_cursor_visible(&mut self) {
        self.sync_virtualizers_from_state();
        let Some(row) = self.cursor else {
            return;
        };
        self.row_v.scroll_to_index(row, Align::Auto);
        self.state.y = clamp_u32(self.row_v.scroll_offset());
        self.state.clamp();
    }

    pub fn render<K>(
        &mut self,
        area: Rect,
        buf: &mut Buffer,
        theme: &Theme,
        data: &TableData<'_, R, K>,
    ) where
        R: Serialize + Clone,
        K: Hash + Eq,
    {
        if area.width == 0 || area.height == 0 {
            return;
        }
        self.set_row_count(data.rows.len());

        let footer_h = u16::from(self.options.show_footer).min(area.height);
        let (content_area, scrollbar_x) = if self.options.show_scrollbar && area.width >= 2 {
            (
                Rect::new(area.x, area.y, area.width - 1, area.height - footer_h),
                Some(area.x + area.width - 1),
            )
        } else {
            (Rect::new(area.x, area.y, area.width, area.height - footer_h), None)
        };
        let header_h = self.header_rows().min(content_area.height);
        let header_area = Rect::new(content_area.x, content_area.y, content_area.width, header_h);
        let body_area = Rect::new(
            content_area.x,
            content_area.y + header_h,
            content_area.width,
            content_area.height - header_h,
        );
        let footer_area = Rect::new(area.x, area.y + area.height - footer_h, area.width, footer_h);

        let styles = self.resolve_styles(theme);
        buf.set_style(content_area, styles.base);

        self.sync_virtualizers(body_area);
        self.row_v.collect_virtual_items(&mut self.row_items);
        self.col_v.collect_virtual_items(&mut self.col_items);

        if header_area.height > 0 {
            self.render_header(header_area, buf, &styles);
        }
        self.render_body(body_area, buf, &styles, data);
        if footer_area.height > 0 {
            self.render_footer(footer_area, buf, &styles, data);
        }

        if let Some(sb_x) = scrollbar_x {
            render::render_scrollbar(
                Rect::new(sb_x, body_area.y, 1, body_area.height),
                buf,
                &ViewportState {
                    x: 0,
                    y: self.state.y,
                    viewport_w: 1,
                    viewport_h: body_area.height,
                    content_w: 1,
                    content_h: self.state.content_h,
                },
                self.options.scrollbar_style,
            );
        }
    }

    fn resolve_styles(&self, theme: &Theme) -> TableStyles {
        let or_theme = |style: Style, fallback: Style| {
            if style == Style::default() {
                fallback
            } else {
                style
            }
        };
        TableStyles {
            base: or_theme(self.options.style, theme.text_primary),
            header: self.options.header_style.patch(theme.accent),
            grid_line: or_theme(self.options.grid_line_style, theme.text_muted),
            cursor: self.options.cursor_style.patch(theme.accent),
            selected: or_theme(self.options.selected_style, theme.selected),
            disabled: or_theme(self.options.disabled_style, theme.disabled),
            footer: or_theme(self.options.footer_style, theme.text_muted),
        }
    }

    fn set_row_count(&mut self, rows: usize) {
        if rows == self.rows {
            return;
        }
        self.rows = rows;
        self.rebuild_row_virtualizer();
        self.cursor = clamp_cursor(self.cursor, rows).or(if rows > 0 { Some(0) } else { None });
        self.state.clamp();
    }

    fn handle_key<K>(
        &mut self,
        key: KeyEvent,
        rows: &[R],
        selection: &mut Selection<R, K>,
    ) -> TableAction
    where
        R: Clone,
        K: Hash + Eq,
    {
        if let Some(command) = self.options.bindings.command_for(&key) {
            return self.apply_selection(command, rows, selection);
        }

        if self.rows == 0 {
            self.cursor = None;
            self.state.to_top();
            self.state.to_left();
            return TableAction::None;
        }

        if key.modifiers.ctrl && !key.modifiers.alt {
            return match key.code {
                KeyCode::Char('d') => self.move_cursor_by(self.state.page_rows()),
                KeyCode::Char('u') => self.move_cursor_by(-self.state.page_rows()),
                _ => TableAction::None,
            };
        }

        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor_by(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor_by(-1),
            KeyCode::PageDown => self.move_cursor_by(self.state.page_rows()),
            KeyCode::PageUp => self.move_cursor_by(-self.state.page_rows()),
            KeyCode::Home | KeyCode::Char('g') => self.move_cursor_to(0),
            KeyCode::End | KeyCode::Char('G') => self.move_cursor_to(self.rows - 1),
            KeyCode::Right | KeyCode::Char('l') => {
                self.scroll_x_by(self.options.horiz_step);
                TableAction::Redraw
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.scroll_x_by(-self.options.horiz_step);
                TableAction::Redraw
            }
            KeyCode::Enter => self
                .cursor
                .map(TableAction::Activated)
                .unwrap_or(TableAction::None),
            _ => TableAction::None,
        }
    }

    fn apply_selection<K>(
        &mut self,
        command: SelectionCommand,
        rows: &[R],
        selection: &mut Selection<R, K>,
    ) -> TableAction
    where
        R: Clone,
        K: Hash + Eq,
    {
        match command {
            SelectionCommand::Toggle => {
                let Some(row) = self.cursor.and_then(|i| rows.get(i)) else {
                    return TableAction::None;
                };
                let before = selection.is_selected(row);
                selection.toggle_selection(row, None, false);
                if selection.is_selected(row) == before {
                    TableAction::None
                } else {
                    TableAction::SelectionChanged
                }
            }
            SelectionCommand::ToggleAll => {
                let snapshot = |s: &Selection<R, K>| {
                    (s.len(), rows.iter().map(|r| s.is_selected(r)).collect::<Vec<_>>())
                };
                let before = snapshot(&*selection);
                selection.toggle_all(rows);
                if snapshot(&*selection) == before {
                    TableAction::None
                } else {
                    TableAction::SelectionChanged
                }
            }
            SelectionCommand::Clear => {
                if selection.is_empty() {
                    return TableAction::None;
                }
                selection.clear_selection();
                TableAction::SelectionChanged
            }
        }
    }

    fn move_cursor_by(&mut self, delta: i32) -> TableAction {
        let cur = self.cursor.unwrap_or(0) as i64;
        let next = (cur + delta as i64).clamp(0, self.rows.saturating_sub(1) as i64) as usize;
        self.move_cursor_to(next)
    }

    fn move_cursor_to(&mut self, row: usize) -> TableAction {
        if self.cursor == Some(row) {
            return TableAction::None;
        }
        self.set_cursor(Some(row));
        TableAction::Redraw
    }

    fn sync_virtualizers(&mut self, body_area: Rect) {
        self.state.set_viewport(body_area.width, body_area.height);
        self.sync_virtualizers_from_state();
    }

    fn sync_virtualizers_from_state(&mut self) {
        self.row_v.set_count(self.rows);
        self.col_v.set_count(self.layout.leaves.len());
        self.row_v.set_viewport_size(self.state.viewport_h as u32);
        self.col_v.set_viewport_size(self.state.viewport_w as u32);
        self.row_v.set_overscan(self.options.overscan_rows);
        self.col_v.set_overscan(self.options.overscan_cols);

        self.state.set_content(
            clamp_u32(self.col_v.total_size()),
            clamp_u32(self.row_v.total_size()),
        );
        self.row_v.set_scroll_offset(self.state.y as u64);
        self.col_v.set_scroll_offset(self.state.x as u64);
        self.state.y = clamp_u32(self.row_v.scroll_offset());
        self.state.x = clamp_u32(self.col_v.scroll_offset());
    }

    fn rebuild_row_virtualizer(&mut self) {
        let mut opts = VirtualizerOptions::new(self.rows, |_| 1);
        opts.overscan = self.options.overscan_rows;
        self.row_v = Virtualizer::new(opts);
        self.row_v.set_viewport_size(self.state.viewport_h as u32);
        self.row_v.set_scroll_offset(self.state.y as u64);
        self.state.y = clamp_u32(self.row_v.scroll_offset());
    }

    fn rebuild_col_virtualizer(&mut self) {
        let widths: Arc<Vec<u32>> = Arc::new(self.layout.widths().map(u32::from).collect());
        let gap = self.options.col_gap as u64;
        self.leaf_starts = widths
            .iter()
            .scan(0u64, |start, w| {
                let this = *start;
                *start += *w as u64 + gap;
                Some(this)
            })
            .collect();

        let sizes = Arc::clone(&widths);
        let mut opts = VirtualizerOptions::new(widths.len(), move |i| {
            sizes.get(i).copied().unwrap_or(1).max(1)
        });
        opts.gap = self.options.col_gap;
        opts.overscan = self.options.overscan_cols;
        self.col_v = Virtualizer::new(opts);
        self.col_v.set_viewport_size(self.state.viewport_w as u32);
        self.col_v.set_scroll_offset(self.state.x as u64);
        self.state.x = clamp_u32(self.col_v.scroll_offset());
    }

    /// Start offset and width of leaves `first..=last`, gaps between them included.
    fn span_of(&self, first: usize, last: usize) -> (u64, u32) {
        let start = self.leaf_starts[first];
        let end = self.leaf_starts[last] + self.layout.leaves[last].width as u64;
        (start, (end - start).min(u32::MAX as u64) as u32)
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer, styles: &TableStyles) {
        buf.set_style(area, styles.header);
        let scroll_x = self.col_v.scroll_offset();
        let last_leaf = self.layout.leaves.len().saturating_sub(1);

        for header in &self.layout.headers {
            let top = header.level as u16;
            if top >= area.height {
                continue;
            }
            let rows = (header.rows as u16).min(area.height - top);
            let band = Rect::new(area.x, area.y + top, area.width, rows);
            let (start, size) = self.span_of(header.first, header.last);
            let (rect, clip_left) = clipped_rect_x(band, scroll_x, start, size);
            if rect.width == 0 {
                continue;
            }

            let label = match header.kind {
                ColumnKind::Group => centered(&header.label, size),
                ColumnKind::Leaf => header.label.clone(),
            };
            render::render_line_clipped(
                rect.x,
                rect.y,
                clip_left,
                rect.width,
                buf,
                &label,
                styles.header,
            );
            if self.options.col_gap > 0 && header.last < last_leaf {
                draw_separator(
                    &mut SeparatorContext {
                        area: band,
                        scroll_x,
                        buf: &mut *buf,
                        style: styles.grid_line,
                    },
                    start + size as u64,
                );
            }
        }
    }

    fn render_body<K>(
        &self,
        area: Rect,
        buf: &mut Buffer,
        styles: &TableStyles,
        data: &TableData<'_, R, K>,
    ) where
        R: Serialize + Clone,
        K: Hash + Eq,
    {
        if area.width == 0 || area.height == 0 || self.layout.leaves.is_empty() {
            return;
        }
        let scroll_x = self.col_v.scroll_offset();
        let scroll_y = self.row_v.scroll_offset();
        let index_base = data.pagination.map_or(0, Pagination::offset);
        let last_leaf = self.layout.leaves.len() - 1;

        for row_item in self.row_items.iter().copied() {
            let Some(row) = data.rows.get(row_item.index) else {
                continue;
            };
            let (row_rect, _) = clipped_rect_y(area, scroll_y, row_item.start, row_item.size);
            if row_rect.height == 0 {
                continue;
            }

            let style = if self.cursor == Some(row_item.index) {
                styles.cursor
            } else if data.selection.is_selected(row) {
                styles.selected
            } else if !data.selection.is_selectable(row) {
                styles.disabled
            } else {
                styles.base
            };
            buf.set_style(row_rect, style);

            // Serialised lazily, only when some visible leaf needs a field value.
            let mut fields: Option<serde_json::Value> = None;
            for col_item in self.col_items.iter().copied() {
                let leaf = &self.layout.leaves[col_item.index];
                let (cell_rect, clip_left) =
                    clipped_rect_x(row_rect, scroll_x, col_item.start, col_item.size);
                if cell_rect.width == 0 {
                    continue;
                }
                let line = cell_line(leaf, row, index_base + row_item.index, &mut fields);
                render::render_line_clipped(
                    cell_rect.x,
                    cell_rect.y,
                    clip_left,
                    cell_rect.width,
                    buf,
                    &line,
                    style,
                );
                if self.options.col_gap > 0 && col_item.index < last_leaf {
                    draw_separator(
                        &mut SeparatorContext {
                            area: row_rect,
                            scroll_x,
                            buf: &mut *buf,
                            style: styles.grid_line.patch(style),
                        },
                        col_item.start + col_item.size as u64,
                    );
                }
            }
        }
    }

    fn render_footer<K>(
        &self,
        area: Rect,
        buf: &mut Buffer,
        styles: &TableStyles,
        data: &TableData<'_, R, K>,
    ) where
        R: Clone,
        K: Hash + Eq,
    {
        buf.set_style(area, styles.footer);
        let mut status = format!("{} rows", data.rows.len());
        if !data.selection.is_empty() {
            status.push_str(&format!(" · {} selected", data.selection.len()));
        }
        if let Some(p) = self.state.percent_y() {
            status.push_str(&format!(" · {p}%"));
        }
        render::render_str_clipped(area.x, area.y, 0, area.width, buf, &status, styles.footer);

        let Some(pagination) = data.pagination else {
            return;
        };
        let pager = pager_line(pagination, styles);
        let pager_w = render::line_width(&pager).min(area.width as usize) as u16;
        let status_w = render::line_width(&Line::from(status.as_str())) as u16;
        if status_w + 1 + pager_w > area.width {
            return;
        }
        render::render_line_clipped(
            area.x + area.width - pager_w,
            area.y,
            0,
            pager_w,
            buf,
            &pager,
            styles.footer,
        );
    }
}

fn cell_line<R: Serialize>(
    leaf: &LeafColumn<R>,
    row: &R,
    index: usize,
    fields: &mut Option<serde_json::Value>,
) -> Line<'static> {
    if leaf.node.slot(DEFAULT_SLOT).is_some() {
        let scope = SlotScope::cell(leaf.node.props(), row, index);
        return leaf
            .node
            .render_slot(DEFAULT_SLOT, &scope)
            .into_text()
            .unwrap_or_default();
    }
    let Some(field) = leaf.field() else {
        return Line::default();
    };
    let value = fields.get_or_insert_with(|| {
        serde_json::to_value(row).unwrap_or_else(|err| {
            tracing::debug!(%err, "row could not be serialised for display");
            serde_json::Value::Null
        })
    });
    Line::from(value_text(value.get(field)))
}

/// `‹ 1 2 [3] 4 5 › 3/12`, with the current page highlighted.
fn pager_line(pagination: &Pagination, styles: &TableStyles) -> Line<'static> {
    let mut spans = Vec::new();
    let muted = |enabled: bool| if enabled { styles.footer } else { styles.grid_line };
    spans.push(Span::styled("‹ ", muted(!pagination.is_first_page())));
    for page in pagination.visible_pages() {
        if page == pagination.page() {
            spans.push(Span::styled(format!("[{page}]"), styles.header));
        } else {
            spans.push(Span::styled(page.to_string(), styles.footer));
        }
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled("›", muted(!pagination.is_last_page())));
    spans.push(Span::styled(
        format!(" {}/{}", pagination.page(), pagination.page_count()),
        styles.footer,
    ));
    Line::from(spans)
}

fn centered(label: &Line<'static>, width: u32) -> Line<'static> {
    let text_w = render::line_width(label) as u32;
    if text_w >= width {
        return label.clone();
    }
    let pad = ((width - text_w) / 2) as usize;
    let mut spans = Vec::with_capacity(label.spans.len() + 1);
    spans.push(Span::raw(" ".repeat(pad)));
    spans.extend(label.spans.iter().cloned());
    Line::from(spans).style(label.style)
}

fn clamp_u32(v: u64) -> u32 {
    v.min(u32::MAX as u64) as u32
}

fn clamp_cursor(cursor: Option<usize>, rows: usize) -> Option<usize> {
    if rows == 0 {
        return None;
    }
    cursor.map(|c| c.min(rows - 1))
}

fn clipped_rect_x(area: Rect, scroll_x: u64, start: u64, size: u32) -> (Rect, u32) {
    let rel = start as i64 - scroll_x as i64;
    let clip_left = (-rel).max(0) as u32;
    let x = rel.clamp(0, area.width as i64) as u16;
    let max_w = area.width - x;
    let visible_w = size.saturating_sub(clip_left).min(max_w as u32) as u16;
    (
        Rect::new(area.x + x, area.y, visible_w, area.height),
        clip_left,
    )
}

fn clipped_rect_y(area: Rect, scroll_y: u64, start: u64, size: u32) -> (Rect, u32) {
    let rel = start as i64 - scroll_y as i64;
    let clip_top = (-rel).max(0) as u32;
    let y = rel.clamp(0, area.height as i64) as u16;
    let max_h = area.height - y;
    let visible_h = size.saturating_sub(clip_top).min(max_h as u32) as u16;
    (
        Rect::new(area.x, area.y + y, area.width, visible_h),
        clip_top,
    )
}

/// Draws a `│` in the gap column that starts at content offset `gap_start`.
fn draw_separator(ctx: &mut SeparatorContext<'_>, gap_start: u64) {
    let rel = gap_start as i64 - ctx.scroll_x as i64;
    if rel < 0 || rel >= ctx.area.width as i64 {
        return;
    }
    let x = ctx.area.x + rel as u16;
    for dy in 0..ctx.area.height {
        ctx.buf
            .set_span(x, ctx.area.y + dy, &Span::styled("│", ctx.style), 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui_tablekit_core::columns::ObjectColumn;
    use ratatui_tablekit_core::columns::SlotTable;
    use ratatui_tablekit_core::columns::render_columns;
    use ratatui_tablekit_core::input::KeyModifiers;
    use ratatui_tablekit_core::keymap;
    use serde_json::Value;
    use serde_json::json;

    fn rows(n: usize) -> Vec<Value> {
        (0..n)
            .map(|i| json!({ "id": i, "name": format!("row{i}"), "active": i % 3 != 0 }))
            .collect()
    }

    fn table() -> TableView<Value> {
        let schema = vec![
            ObjectColumn::new().prop("prop", "id").prop("width", 4).into(),
            ObjectColumn::new().prop("prop", "name").prop("width", 8).into(),
        ];
        let mut t = TableView::new();
        t.set_columns(render_columns(&schema, &SlotTable::new()));
        t.state.set_viewport(20, 5);
        t
    }

    fn selection() -> Selection<Value, u64> {
        Selection::new(|r: &Value| r["id"].as_u64().unwrap_or(u64::MAX))
    }

    fn press(
        t: &mut TableView<Value>,
        data: &[Value],
        s: &mut Selection<Value, u64>,
        code: KeyCode,
    ) -> TableAction {
        t.handle_event(InputEvent::Key(keymap::key(code)), data, s)
    }

    #[test]
    fn cursor_moves_and_scrolls() {
        let data = rows(100);
        let mut s = selection();
        let mut t = table();
        for _ in 0..10 {
            press(&mut t, &data, &mut s, KeyCode::Down);
        }
        assert_eq!(t.cursor(), Some(10));
        assert!(t.state.y > 0);
        assert_eq!(press(&mut t, &data, &mut s, KeyCode::Home), TableAction::Redraw);
        assert_eq!(t.cursor(), Some(0));
        assert_eq!(press(&mut t, &data, &mut s, KeyCode::Up), TableAction::None);
    }

    #[test]
    fn space_toggles_cursor_row() {
        let data = rows(5);
        let mut s = selection();
        let mut t = table();
        press(&mut t, &data, &mut s, KeyCode::Down);
        let action = press(&mut t, &data, &mut s, KeyCode::Char(' '));
        assert_eq!(action, TableAction::SelectionChanged);
        assert_eq!(s.selected_keys().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn unselectable_row_reports_no_change() {
        let data = rows(5);
        let mut s = selection().selectable(|r: &Value| r["active"].as_bool().unwrap_or(false));
        let mut t = table();
        let action = press(&mut t, &data, &mut s, KeyCode::Char(' '));
        assert_eq!(action, TableAction::None);
        assert!(s.is_empty());
    }

    #[test]
    fn toggle_all_and_clear() {
        let data = rows(4);
        let mut s = selection();
        let mut t = table();
        press(&mut t, &data, &mut s, KeyCode::Char('a'));
        assert_eq!(s.len(), 4);
        assert_eq!(press(&mut t, &data, &mut s, KeyCode::Esc), TableAction::SelectionChanged);
        assert!(s.is_empty());
        assert_eq!(press(&mut t, &data, &mut s, KeyCode::Esc), TableAction::None);
    }

    #[test]
    fn toggle_all_without_selectable_rows_reports_no_change() {
        let data = rows(3);
        let mut s = selection().selectable(|_: &Value| false);
        let mut t = table();
        assert_eq!(press(&mut t, &data, &mut s, KeyCode::Char('a')), TableAction::None);
        assert!(s.is_empty());
    }

    #[test]
    fn toggle_all_in_single_select_toggles_one_row() {
        let data = rows(4);
        let mut s = selection().single_select(true);
        let mut t = table();
        assert_eq!(
            press(&mut t, &data, &mut s, KeyCode::Char('a')),
            TableAction::SelectionChanged
        );
        assert_eq!(s.selected_keys().copied().collect::<Vec<_>>(), vec![0]);
        assert_eq!(
            press(&mut t, &data, &mut s, KeyCode::Char('a')),
            TableAction::SelectionChanged
        );
        assert!(s.is_empty());
    }

    #[test]
    fn set_options_reapplies_default_width() {
        let schema = vec![
            ObjectColumn::new().prop("prop", "id").into(),
            ObjectColumn::new().prop("prop", "name").prop("width", 8).into(),
        ];
        let mut t: TableView<Value> = TableView::new();
        t.set_columns(render_columns(&schema, &SlotTable::new()));
        assert_eq!(t.layout().widths().collect::<Vec<_>>(), vec![12, 8]);

        t.set_options(TableViewOptions {
            default_col_width: 3,
            ..Default::default()
        });
        assert_eq!(t.layout().widths().collect::<Vec<_>>(), vec![3, 8]);
    }

    #[test]
    fn enter_activates_cursor_row() {
        let data = rows(3);
        let mut s = selection();
        let mut t = table();
        press(&mut t, &data, &mut s, KeyCode::End);
        assert_eq!(press(&mut t, &data, &mut s, KeyCode::Enter), TableAction::Activated(2));
    }

    #[test]
    fn ctrl_d_pages_down() {
        let data = rows(50);
        let mut s = selection();
        let mut t = table();
        let key = keymap::key_char('d').with_modifiers(KeyModifiers::ctrl());
        t.handle_event(InputEvent::Key(key), &data, &mut s);
        assert_eq!(t.cursor(), Some(4));
    }

    #[test]
    fn cursor_is_clamped_when_rows_shrink() {
        let mut s = selection();
        let mut t = table();
        press(&mut t, &rows(10), &mut s, KeyCode::End);
        assert_eq!(t.cursor(), Some(9));
        press(&mut t, &rows(3), &mut s, KeyCode::Char('x'));
        assert_eq!(t.cursor(), Some(2));
    }

    #[test]
    fn options_follow_config() {
        let config = TableConfig {
            show_footer: Some(false),
            col_gap: Some(3),
            ..Default::default()
        };
        let options = TableViewOptions::from_config(&config);
        assert!(!options.show_footer);
        assert!(options.show_header);
        assert_eq!(options.col_gap, 3);
        assert_eq!(options.default_col_width, 12);
    }

    #[test]
    fn centered_pads_left() {
        let line = centered(&Line::from("ab"), 6);
        assert_eq!(line.to_string(), "  ab");
    }
}
