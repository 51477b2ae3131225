//! Table columns described as data.
//!
//! A column schema is a list of [`ColumnSchema`] entries. [`render_columns`] turns it into a list
//! of [`ColumnNode`]s that a table widget can lay out:
//!
//! - [`ColumnSchema::Omitted`] entries produce nothing, so schemas can be built with conditionals
//!   (see [`ColumnSchema::when`]).
//! - [`ColumnSchema::Function`] entries are called and contribute the node they return, if any.
//! - [`ColumnSchema::Object`] entries carry arbitrary properties, which are passed through
//!   untouched, plus two reserved keys: `slots` and `children`.
//!
//! ## Slots
//!
//! Each slot is either a render function or the *name* of a function registered in a
//! [`SlotTable`] by the embedding view. A slot named `"name"` of kind `header` resolves to the
//! table entry `"header:name"`. Names that are not registered resolve to nothing and the slot is
//! left out; the column itself still renders.
//!
//! ## Children
//!
//! A node with `children` becomes a [`ColumnKind::Group`]. Unless the node fills its `default` slot
//! itself, the group's `default` slot renders the children with the same slot table, on every call.
//!
//! ```
//! use ratatui_tablekit_core::columns::{ColumnSchema, ObjectColumn, SlotOutput, SlotScope, SlotTable, render_columns};
//!
//! let slots: SlotTable<String> = SlotTable::new()
//!     .with("default", "upper", |scope: &SlotScope<'_, String>| {
//!         SlotOutput::text(scope.row.map(|r| r.to_uppercase()).unwrap_or_default())
//!     });
//! let schema = vec![
//!     ObjectColumn::new().prop("label", "Name").slot("default", "upper").into(),
//!     ColumnSchema::when(false, ObjectColumn::new().prop("label", "Hidden")),
//! ];
//! let nodes = render_columns(&schema, &slots);
//! assert_eq!(nodes.len(), 1);
//! assert!(nodes[0].slot("default").is_some());
//! ```
//!
//! The schema must not contain cycles; nothing checks for them.

mod json;
mod slots;

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

pub use json::columns_from_json;
pub use json::columns_from_json_str;
pub use slots::SlotFn;
pub use slots::SlotOutput;
pub use slots::SlotRef;
pub use slots::SlotScope;
pub use slots::SlotTable;
pub use slots::slot_fn;

/// Pass-through column properties.
pub type Props = serde_json::Map<String, Value>;

pub const DEFAULT_SLOT: &str = "default";
pub const HEADER_SLOT: &str = "header";

/// One entry of a column schema.
pub enum ColumnSchema<R> {
    Omitted,
    /// Produces a single column node. `None` means "nothing to render".
    Function(Rc<dyn Fn() -> Option<ColumnNode<R>>>),
    Object(ObjectColumn<R>),
}

impl<R> ColumnSchema<R> {
    pub fn function<F>(f: F) -> Self
    where
        F: Fn() -> Option<ColumnNode<R>> + 'static,
    {
        Self::Function(Rc::new(f))
    }

    /// `column` when `cond` holds, [`ColumnSchema::Omitted`] otherwise.
    pub fn when(cond: bool, column: impl Into<ColumnSchema<R>>) -> Self {
        if cond { column.into() } else { Self::Omitted }
    }
}

impl<R> Clone for ColumnSchema<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Omitted => Self::Omitted,
            Self::Function(f) => Self::Function(Rc::clone(f)),
            Self::Object(object) => Self::Object(object.clone()),
        }
    }
}

impl<R> fmt::Debug for ColumnSchema<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Omitted => f.write_str("Omitted"),
            Self::Function(_) => f.write_str("Function(..)"),
            Self::Object(object) => f.debug_tuple("Object").field(object).finish(),
        }
    }
}

impl<R> From<ObjectColumn<R>> for ColumnSchema<R> {
    fn from(object: ObjectColumn<R>) -> Self {
        Self::Object(object)
    }
}

impl<R> From<Option<ObjectColumn<R>>> for ColumnSchema<R> {
    fn from(object: Option<ObjectColumn<R>>) -> Self {
        object.map_or(Self::Omitted, Self::Object)
    }
}

/// The object form of a schema entry.
pub struct ObjectColumn<R> {
    pub props: Props,
    pub slots: BTreeMap<String, SlotRef<R>>,
    pub children: Option<Vec<ColumnSchema<R>>>,
}

impl<R> ObjectColumn<R> {
    pub fn new() -> Self {
        Self {
            props: Props::new(),
            slots: BTreeMap::new(),
            children: None,
        }
    }

    pub fn prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn slot(mut self, kind: impl Into<String>, slot: impl Into<SlotRef<R>>) -> Self {
        self.slots.insert(kind.into(), slot.into());
        self
    }

    pub fn render_slot<F>(self, kind: impl Into<String>, f: F) -> Self
    where
        F: Fn(&SlotScope<'_, R>) -> SlotOutput<R> + 'static,
    {
        self.slot(kind, SlotRef::Render(slot_fn(f)))
    }

    pub fn children(mut self, children: impl IntoIterator<Item = ColumnSchema<R>>) -> Self {
        self.children = Some(children.into_iter().collect());
        self
    }
}

impl<R> Default for ObjectColumn<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for ObjectColumn<R> {
    fn clone(&self) -> Self {
        Self {
            props: self.props.clone(),
            slots: self.slots.clone(),
            children: self.children.clone(),
        }
    }
}

impl<R> fmt::Debug for ObjectColumn<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectColumn")
            .field("props", &self.props)
            .field("slots", &self.slots)
            .field("children", &self.children)
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    /// A body column.
    Leaf,
    /// A header-only column spanning the columns its `default` slot renders.
    Group,
}

/// A rendered column: its kind, pass-through properties and resolved slots.
pub struct ColumnNode<R> {
    kind: ColumnKind,
    props: Props,
    slots: BTreeMap<String, SlotFn<R>>,
}

impl<R> ColumnNode<R> {
    pub fn leaf(props: Props) -> Self {
        Self {
            kind: ColumnKind::Leaf,
            props,
            slots: BTreeMap::new(),
        }
    }

    pub fn group(props: Props) -> Self {
        Self {
            kind: ColumnKind::Group,
            props,
            slots: BTreeMap::new(),
        }
    }

    pub fn with_slot(mut self, kind: impl Into<String>, f: SlotFn<R>) -> Self {
        self.slots.insert(kind.into(), f);
        self
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    pub fn str_prop(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }

    pub fn slot(&self, kind: &str) -> Option<&SlotFn<R>> {
        self.slots.get(kind)
    }

    pub fn slot_kinds(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Invokes the `kind` slot, or returns [`SlotOutput::Empty`] when it is not set.
    pub fn render_slot(&self, kind: &str, scope: &SlotScope<'_, R>) -> SlotOutput<R> {
        match self.slots.get(kind) {
            Some(f) => f(scope),
            None => SlotOutput::Empty,
        }
    }

    /// Columns nested under a group. Leaves, and groups whose `default` slot does not produce
    /// columns, have none.
    pub fn child_columns(&self) -> Vec<ColumnNode<R>> {
        if self.kind != ColumnKind::Group {
            return Vec::new();
        }
        self.render_slot(DEFAULT_SLOT, &SlotScope::column(&self.props))
            .into_columns()
            .unwrap_or_default()
    }
}

impl<R> fmt::Debug for ColumnNode<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnNode")
            .field("kind", &self.kind)
            .field("props", &self.props)
            .field("slots", &self.slots.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Renders a column schema into column nodes, in schema order.
///
/// This is a pure function of its inputs and may be called on every frame.
pub fn render_columns<R: 'static>(
    columns: &[ColumnSchema<R>],
    slots: &SlotTable<R>,
) -> Vec<ColumnNode<R>> {
    let mut nodes = Vec::with_capacity(columns.len());
    for (index, column) in columns.iter().enumerate() {
        match column {
            ColumnSchema::Omitted => {}
            ColumnSchema::Function(produce) => match produce() {
                Some(node) => nodes.push(node),
                None => tracing::trace!(index, "function column produced no node, skipped"),
            },
            ColumnSchema::Object(object) => nodes.push(render_object(object, slots)),
        }
    }
    nodes
}

fn render_object<R: 'static>(object: &ObjectColumn<R>, table: &SlotTable<R>) -> ColumnNode<R> {
    let mut resolved = BTreeMap::new();
    for (kind, slot) in &object.slots {
        let f = match slot {
            SlotRef::Render(f) => Some(Rc::clone(f)),
            SlotRef::Named(name) => {
                let found = table.get(kind, name);
                if found.is_none() {
                    tracing::debug!(slot = %SlotTable::<R>::key(kind, name), "unresolved slot name");
                }
                found
            }
        };
        if let Some(f) = f {
            resolved.insert(kind.clone(), f);
        }
    }

    // An explicit default slot wins; otherwise the children become the default content.
    if !resolved.contains_key(DEFAULT_SLOT) {
        if let Some(children) = object.children.as_ref().filter(|c| !c.is_empty()) {
            let children: Rc<[ColumnSchema<R>]> = children.clone().into();
            let table = table.clone();
            resolved.insert(
                DEFAULT_SLOT.to_string(),
                slot_fn(move |_| SlotOutput::Columns(render_columns(&children, &table))),
            );
        }
    }

    let kind = if object.children.is_some() {
        ColumnKind::Group
    } else {
        ColumnKind::Leaf
    };
    ColumnNode {
        kind,
        props: object.props.clone(),
        slots: resolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    type Row = serde_json::Value;

    fn labeled(label: &str) -> ObjectColumn<Row> {
        ObjectColumn::new().prop("label", label)
    }

    fn labels(nodes: &[ColumnNode<Row>]) -> Vec<&str> {
        nodes.iter().filter_map(|n| n.str_prop("label")).collect()
    }

    fn text(output: SlotOutput<Row>) -> String {
        output
            .into_text()
            .map(|line| line.to_string())
            .unwrap_or_default()
    }

    #[test]
    fn preserves_schema_order() {
        let schema = vec![
            labeled("c").into(),
            ColumnSchema::Omitted,
            labeled("a").into(),
            labeled("b").into(),
        ];
        let nodes = render_columns(&schema, &SlotTable::new());
        assert_eq!(labels(&nodes), vec!["c", "a", "b"]);
    }

    #[test]
    fn omitted_entries_render_nothing() {
        let schema: Vec<ColumnSchema<Row>> = vec![
            ColumnSchema::Omitted,
            ColumnSchema::when(false, labeled("x")),
            Option::<ObjectColumn<Row>>::None.into(),
        ];
        assert!(render_columns(&schema, &SlotTable::new()).is_empty());
    }

    #[test]
    fn function_entries_contribute_only_real_nodes() {
        let schema = vec![
            ColumnSchema::function(|| None),
            ColumnSchema::function(|| {
                let mut props = Props::new();
                props.insert("label".into(), json!("fn"));
                Some(ColumnNode::leaf(props))
            }),
        ];
        let nodes = render_columns(&schema, &SlotTable::new());
        assert_eq!(labels(&nodes), vec!["fn"]);
    }

    #[test]
    fn reserved_keys_are_not_passed_through() {
        let schema = vec![
            labeled("group")
                .prop("width", 12)
                .slot("header", "missing")
                .children([labeled("leaf").into()])
                .into(),
        ];
        let nodes = render_columns(&schema, &SlotTable::new());
        let props = nodes[0].props();
        assert_eq!(props.len(), 2);
        assert_eq!(props.get("width"), Some(&json!(12)));
        assert!(!props.contains_key("slots") && !props.contains_key("children"));
    }

    #[test]
    fn named_slot_resolves_to_registered_function() {
        let registered = slot_fn(|_: &SlotScope<'_, Row>| SlotOutput::text("F"));
        let mut table = SlotTable::new();
        table.insert("default", "foo", Rc::clone(&registered));

        let schema = vec![labeled("a").slot("default", "foo").into()];
        let nodes = render_columns(&schema, &table);
        let resolved = nodes[0].slot(DEFAULT_SLOT).expect("default slot");
        assert!(Rc::ptr_eq(resolved, &registered));
    }

    #[test]
    fn unresolved_slot_name_is_left_out() {
        let table = SlotTable::new().with("header", "foo", |_| SlotOutput::text("H"));
        let schema = vec![
            labeled("a")
                .slot("default", "missing")
                .slot("header", "foo")
                .into(),
        ];
        let nodes = render_columns(&schema, &table);
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].slot(DEFAULT_SLOT).is_none());
        assert_eq!(nodes[0].slot_kinds().collect::<Vec<_>>(), vec!["header"]);
    }

    #[test]
    fn slot_kind_is_part_of_the_lookup_key() {
        let table = SlotTable::new().with("header", "foo", |_| SlotOutput::text("H"));
        let schema = vec![labeled("a").slot("default", "foo").into()];
        let nodes = render_columns(&schema, &table);
        assert!(nodes[0].slot(DEFAULT_SLOT).is_none());
    }

    #[test]
    fn children_become_default_slot() {
        let schema = vec![
            labeled("group")
                .children([labeled("a").into(), ColumnSchema::Omitted, labeled("b").into()])
                .into(),
        ];
        let nodes = render_columns(&schema, &SlotTable::new());
        assert_eq!(nodes[0].kind(), ColumnKind::Group);
        let children = nodes[0].child_columns();
        assert_eq!(labels(&children), vec!["a", "b"]);
        assert!(children.iter().all(|c| c.kind() == ColumnKind::Leaf));
    }

    #[test]
    fn children_are_rendered_on_every_call() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let schema = vec![
            labeled("group")
                .children([ColumnSchema::function(move || {
                    counter.set(counter.get() + 1);
                    None
                })])
                .into(),
        ];
        let nodes = render_columns(&schema, &SlotTable::new());
        assert_eq!(calls.get(), 0);
        nodes[0].child_columns();
        nodes[0].child_columns();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn explicit_default_slot_wins_over_children() {
        let schema = vec![
            labeled("group")
                .render_slot("default", |_| SlotOutput::text("explicit"))
                .children([labeled("a").into()])
                .into(),
        ];
        let nodes = render_columns(&schema, &SlotTable::new());
        let scope = SlotScope::column(nodes[0].props());
        assert_eq!(text(nodes[0].render_slot(DEFAULT_SLOT, &scope)), "explicit");
        assert!(nodes[0].child_columns().is_empty());
    }

    #[test]
    fn unresolved_default_name_falls_back_to_children() {
        let schema = vec![
            labeled("group")
                .slot("default", "missing")
                .children([labeled("a").into()])
                .into(),
        ];
        let nodes = render_columns(&schema, &SlotTable::new());
        assert_eq!(labels(&nodes[0].child_columns()), vec!["a"]);
    }

    #[test]
    fn empty_children_make_a_group_without_default() {
        let schema = vec![labeled("group").children([]).into()];
        let nodes = render_columns(&schema, &SlotTable::new());
        assert_eq!(nodes[0].kind(), ColumnKind::Group);
        assert!(nodes[0].slot(DEFAULT_SLOT).is_none());
    }

    #[test]
    fn nested_groups_share_the_slot_table() {
        let table = SlotTable::new().with("header", "deep", |_| SlotOutput::text("deep"));
        let schema = vec![
            labeled("outer")
                .children([labeled("inner")
                    .children([labeled("leaf").slot("header", "deep").into()])
                    .into()])
                .into(),
        ];
        let nodes = render_columns(&schema, &table);
        let inner = nodes[0].child_columns();
        let leaves = inner[0].child_columns();
        let scope = SlotScope::column(leaves[0].props());
        assert_eq!(text(leaves[0].render_slot(HEADER_SLOT, &scope)), "deep");
    }

    #[test]
    fn cell_slots_see_the_row() {
        let schema = vec![
            labeled("name")
                .render_slot("default", |scope: &SlotScope<'_, Row>| {
                    let name = scope
                        .row
                        .and_then(|r| r.get("name"))
                        .and_then(Value::as_str)
                        .unwrap_or("?");
                    SlotOutput::text(format!("{}:{name}", scope.index.unwrap_or(0)))
                })
                .into(),
        ];
        let nodes = render_columns(&schema, &SlotTable::new());
        let row = json!({ "name": "ada" });
        let scope = SlotScope::cell(nodes[0].props(), &row, 3);
        assert_eq!(text(nodes[0].render_slot(DEFAULT_SLOT, &scope)), "3:ada");
    }
}
