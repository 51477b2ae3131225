//! `ratatui-tablekit-core` provides the data-side building blocks of schema-driven tables.
//!
//! Nothing in this crate draws a table. It describes columns, tracks what is selected and which
//! page is shown, and leaves layout to a widget such as `ratatui-tablekit`'s `TableView`.
//!
//! ## Design goals
//!
//! - Event-loop agnostic: you drive input + rendering from your app.
//! - Single-threaded and synchronous: every operation completes before it returns.
//! - No global state: defaults come from a [`config::TableKitConfig`] the app passes around.
//!
//! ## Entry points
//!
//! - [`columns::render_columns`]: turns a declarative column schema into column nodes, resolving
//!   slot names against a [`columns::SlotTable`].
//! - [`selection::Selection`]: keyed, order-preserving selection with single-select mode and a
//!   selectability predicate.
//! - [`pagination::Pagination`]: 1-based offset pagination with change notification.
pub mod config;
pub mod error;
pub mod theme;

pub mod input;
#[cfg(feature = "crossterm")]
pub mod crossterm_input;
pub mod keymap;
pub mod render;
pub mod viewport;

pub mod columns;
pub mod pagination;
pub mod selection;

pub use error::Error;
pub use error::Result;
