use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use ratatui::text::Line;

use super::ColumnNode;
use super::Props;

/// What a slot is rendered against.
///
/// Header and group slots see only the column; cell slots also see the row and its index.
pub struct SlotScope<'a, R> {
    pub column: &'a Props,
    pub row: Option<&'a R>,
    pub index: Option<usize>,
}

impl<'a, R> SlotScope<'a, R> {
    pub fn column(column: &'a Props) -> Self {
        Self {
            column,
            row: None,
            index: None,
        }
    }

    pub fn cell(column: &'a Props, row: &'a R, index: usize) -> Self {
        Self {
            column,
            row: Some(row),
            index: Some(index),
        }
    }
}

impl<R> Clone for SlotScope<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for SlotScope<'_, R> {}

/// The result of invoking a slot.
pub enum SlotOutput<R> {
    Empty,
    Text(Line<'static>),
    /// Nested columns, produced by a group's `default` slot.
    Columns(Vec<ColumnNode<R>>),
}

impl<R> SlotOutput<R> {
    pub fn text(line: impl Into<Line<'static>>) -> Self {
        Self::Text(line.into())
    }

    pub fn into_text(self) -> Option<Line<'static>> {
        match self {
            Self::Text(line) => Some(line),
            _ => None,
        }
    }

    pub fn into_columns(self) -> Option<Vec<ColumnNode<R>>> {
        match self {
            Self::Columns(columns) => Some(columns),
            _ => None,
        }
    }
}

impl<R> fmt::Debug for SlotOutput<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Text(line) => f.debug_tuple("Text").field(line).finish(),
            Self::Columns(columns) => f.debug_tuple("Columns").field(columns).finish(),
        }
    }
}

/// A render function bound to a slot.
pub type SlotFn<R> = Rc<dyn Fn(&SlotScope<'_, R>) -> SlotOutput<R>>;

/// Wraps a closure as a [`SlotFn`]. Using this instead of `Rc::new` lets the closure's argument
/// type be inferred.
pub fn slot_fn<R, F>(f: F) -> SlotFn<R>
where
    F: Fn(&SlotScope<'_, R>) -> SlotOutput<R> + 'static,
{
    Rc::new(f)
}

/// How a schema node fills one of its slots.
pub enum SlotRef<R> {
    /// Looked up in the [`SlotTable`] under `"<slot kind>:<name>"`.
    Named(String),
    Render(SlotFn<R>),
}

impl<R> Clone for SlotRef<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Named(name) => Self::Named(name.clone()),
            Self::Render(f) => Self::Render(Rc::clone(f)),
        }
    }
}

impl<R> fmt::Debug for SlotRef<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Render(_) => f.write_str("Render(..)"),
        }
    }
}

impl<R> From<&str> for SlotRef<R> {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl<R> From<String> for SlotRef<R> {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl<R> From<SlotFn<R>> for SlotRef<R> {
    fn from(f: SlotFn<R>) -> Self {
        Self::Render(f)
    }
}

/// Render functions registered by the embedding view, addressed as `"<slot kind>:<name>"`.
///
/// Cloning is cheap; clones share storage until one of them is modified.
pub struct SlotTable<R> {
    entries: Rc<HashMap<String, SlotFn<R>>>,
}

impl<R> SlotTable<R> {
    pub fn new() -> Self {
        Self {
            entries: Rc::new(HashMap::new()),
        }
    }

    pub fn key(kind: &str, name: &str) -> String {
        format!("{kind}:{name}")
    }

    /// Registers `f` for `kind:name`, returning the function it replaced.
    pub fn insert(&mut self, kind: &str, name: &str, f: SlotFn<R>) -> Option<SlotFn<R>> {
        Rc::make_mut(&mut self.entries).insert(Self::key(kind, name), f)
    }

    pub fn with<F>(mut self, kind: &str, name: &str, f: F) -> Self
    where
        F: Fn(&SlotScope<'_, R>) -> SlotOutput<R> + 'static,
    {
        self.insert(kind, name, slot_fn(f));
        self
    }

    pub fn get(&self, kind: &str, name: &str) -> Option<SlotFn<R>> {
        self.get_key(&Self::key(kind, name))
    }

    pub fn get_key(&self, key: &str) -> Option<SlotFn<R>> {
        self.entries.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R> Default for SlotTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for SlotTable<R> {
    fn clone(&self) -> Self {
        Self {
            entries: Rc::clone(&self.entries),
        }
    }
}

impl<R> fmt::Debug for SlotTable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("SlotTable").field("keys", &keys).finish()
    }
}
