//! Schema-driven tables for `ratatui`.
//!
//! The data side (column schemas, selection, pagination, configuration) lives in
//! `ratatui-tablekit-core` and is re-exported here unchanged. This crate adds [`table::TableView`],
//! which lays out rendered columns with grouped headers and draws rows through column slots.
//!
//! A typical app:
//!
//! 1. builds a `Vec<ColumnSchema<Row>>` in code or loads one with
//!    [`columns::columns_from_json_str`],
//! 2. registers named cell renderers in a [`columns::SlotTable`],
//! 3. calls [`columns::render_columns`] and hands the result to [`table::TableView::set_columns`],
//! 4. each frame, renders the current page and forwards input to
//!    [`table::TableView::handle_event`] together with its [`selection::Selection`].
pub use ratatui_tablekit_core::columns;
pub use ratatui_tablekit_core::config;
pub use ratatui_tablekit_core::error;
pub use ratatui_tablekit_core::input;
#[cfg(feature = "crossterm")]
pub use ratatui_tablekit_core::crossterm_input;
pub use ratatui_tablekit_core::keymap;
pub use ratatui_tablekit_core::pagination;
pub use ratatui_tablekit_core::render;
pub use ratatui_tablekit_core::selection;
pub use ratatui_tablekit_core::theme;
pub use ratatui_tablekit_core::viewport;

pub use ratatui_tablekit_core::Error;
pub use ratatui_tablekit_core::Result;

pub mod help;
pub mod table;
