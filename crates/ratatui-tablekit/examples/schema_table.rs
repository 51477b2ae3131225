use std::cell::Cell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::Event;
use crossterm::event::KeyCode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui_tablekit::columns::ColumnNode;
use ratatui_tablekit::columns::ColumnSchema;
use ratatui_tablekit::columns::Props;
use ratatui_tablekit::columns::SlotOutput;
use ratatui_tablekit::columns::SlotScope;
use ratatui_tablekit::columns::SlotTable;
use ratatui_tablekit::columns::columns_from_json_str;
use ratatui_tablekit::columns::render_columns;
use ratatui_tablekit::columns::slot_fn;
use ratatui_tablekit::config::TableKitConfig;
use ratatui_tablekit::crossterm_input::input_event_from_crossterm;
use ratatui_tablekit::help::HintBar;
use ratatui_tablekit::help::table_hints;
use ratatui_tablekit::pagination::Pagination;
use ratatui_tablekit::selection::Selection;
use ratatui_tablekit::selection::SingleSelect;
use ratatui_tablekit::table::TableAction;
use ratatui_tablekit::table::TableData;
use ratatui_tablekit::table::TableView;
use ratatui_tablekit::table::TableViewOptions;
use ratatui_tablekit::theme::Theme;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"{
  "pagination": { "page_size": 25, "visible_pages": 7 },
  "table": { "default_col_width": 10 }
}"#;

const SCHEMA: &str = r#"[
  { "prop": "id", "label": "#", "width": 5 },
  { "prop": "name", "label": "Name", "width": 14, "slots": { "header": "upper" } },
  { "label": "Contact", "children": [
    { "prop": "email", "label": "Email", "width": 24 },
    { "label": "Location", "children": [
      { "prop": "city", "label": "City", "width": 12 },
      { "prop": "country", "label": "Country", "width": 9 }
    ]}
  ]},
  { "label": "Status", "width": 9, "slots": { "default": "status" } }
]"#;

#[derive(Clone, Debug, Serialize)]
struct User {
    id: u32,
    name: String,
    email: String,
    city: &'static str,
    country: &'static str,
    active: bool,
}

fn users(n: u32) -> Vec<User> {
    const CITIES: [(&str, &str); 5] = [
        ("Lisbon", "PT"),
        ("Osaka", "JP"),
        ("Toronto", "CA"),
        ("Nairobi", "KE"),
        ("Tallinn", "EE"),
    ];
    (1..=n)
        .map(|id| {
            let (city, country) = CITIES[id as usize % CITIES.len()];
            User {
                id,
                name: format!("user {id:04}"),
                email: format!("user{id}@example.com"),
                city,
                country,
                active: id % 7 != 0,
            }
        })
        .collect()
}

fn slots() -> SlotTable<User> {
    SlotTable::new()
        .with("header", "upper", |scope: &SlotScope<'_, User>| {
            let label = scope
                .column
                .get("label")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            SlotOutput::text(label.to_uppercase())
        })
        .with("default", "status", |scope: &SlotScope<'_, User>| {
            match scope.row {
                Some(user) if user.active => SlotOutput::text(Span::from("active").green()),
                Some(_) => SlotOutput::text(Span::from("disabled").dark_gray()),
                None => SlotOutput::Empty,
            }
        })
}

fn init_tracing() {
    // The terminal is owned by the TUI, so logs go to a file only when asked for.
    let Ok(path) = std::env::var("TABLEKIT_LOG") else {
        tracing_subscriber::fmt().with_writer(io::sink).init();
        return;
    };
    let Ok(file) = std::fs::File::create(path) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn main() -> io::Result<()> {
    init_tracing();

    let config = TableKitConfig::from_json_str(CONFIG).map_err(io::Error::other)?;
    let mut schema: Vec<ColumnSchema<User>> =
        columns_from_json_str(SCHEMA).map_err(io::Error::other)?;

    // A row-number column built in code, shown only in multi-select mode.
    let single = Rc::new(Cell::new(false));
    let single_flag = Rc::clone(&single);
    schema.insert(
        0,
        ColumnSchema::function(move || {
            if single_flag.get() {
                return None;
            }
            let mut props = Props::new();
            props.insert("label".into(), "no.".into());
            props.insert("width".into(), 5.into());
            let number = slot_fn(|scope: &SlotScope<'_, User>| {
                SlotOutput::text(scope.index.map(|i| (i + 1).to_string()).unwrap_or_default())
            });
            Some(ColumnNode::leaf(props).with_slot("default", number))
        }),
    );

    let rows = users(523);
    let pagination = Pagination::from_config(rows.len(), &config.pagination)
        .on_change(|change| tracing::info!(?change, "page changed"));

    let single_mode = Rc::clone(&single);
    let selection = Selection::new(|u: &User| u.id)
        .single_select(SingleSelect::dynamic(move || single_mode.get()))
        .selectable(|u: &User| u.active);

    let slots = slots();
    let mut table = TableView::with_options(TableViewOptions::from_config(&config.table));
    table.set_columns(render_columns(&schema, &slots));

    let theme = Theme::default();

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App {
        rows,
        schema,
        slots,
        single,
        table,
        selection,
        pagination,
    };
    let res = app.run(&mut terminal, &theme);

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        crossterm::event::DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    res
}

struct App {
    rows: Vec<User>,
    schema: Vec<ColumnSchema<User>>,
    slots: SlotTable<User>,
    single: Rc<Cell<bool>>,
    table: TableView<User>,
    selection: Selection<User, u32>,
    pagination: Pagination,
}

impl App {
    fn run<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        theme: &Theme,
    ) -> io::Result<()> {
        let hints = HintBar::new(table_hints(&self.table.options().bindings));
        loop {
            terminal.draw(|f| {
                let area = f.area();
                let mode = if self.single.get() { "single" } else { "multi" };
                let block = Block::default()
                    .title(format!(
                        "Schema table ({mode}-select; [/] page, s mode, q quit)"
                    ))
                    .borders(Borders::ALL);
                let inner = block.inner(area);
                f.render_widget(block, area);

                let buf = f.buffer_mut();
                let table_area = Rect::new(
                    inner.x,
                    inner.y,
                    inner.width,
                    inner.height.saturating_sub(1),
                );
                let hint_area = Rect::new(inner.x, inner.y + table_area.height, inner.width, 1);

                let page = self.pagination.page_slice(&self.rows);
                self.table.render(
                    table_area,
                    buf,
                    theme,
                    &TableData {
                        rows: page,
                        selection: &self.selection,
                        pagination: Some(&self.pagination),
                    },
                );
                hints.render(hint_area, buf, theme);
            })?;

            if !crossterm::event::poll(Duration::from_millis(50))? {
                continue;
            }
            let event = crossterm::event::read()?;
            if let Event::Key(key) = &event {
                match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Char('[') => {
                        self.pagination.prev();
                        self.table.set_cursor(Some(0));
                        continue;
                    }
                    KeyCode::Char(']') => {
                        self.pagination.next();
                        self.table.set_cursor(Some(0));
                        continue;
                    }
                    KeyCode::Char('s') => {
                        self.single.set(!self.single.get());
                        // Function columns read the flag, so the tree is rendered again.
                        self.table
                            .set_columns(render_columns(&self.schema, &self.slots));
                        continue;
                    }
                    _ => {}
                }
            }

            let Some(ev) = input_event_from_crossterm(event) else {
                continue;
            };
            let page = self.pagination.page_slice(&self.rows);
            match self.table.handle_event(ev, page, &mut self.selection) {
                TableAction::Activated(i) => {
                    if let Some(row) = page.get(i) {
                        tracing::info!(id = row.id, name = %row.name, "row activated");
                    }
                }
                TableAction::SelectionChanged => {
                    let ids: Vec<u32> = self.selection.selected_keys().copied().collect();
                    tracing::debug!(?ids, "selection changed");
                }
                TableAction::Redraw | TableAction::None => {}
            }
        }
    }
}
