//! Flattening a rendered column tree into body columns and header rows.

use ratatui::text::Line;
use ratatui_tablekit_core::columns::ColumnKind;
use ratatui_tablekit_core::columns::ColumnNode;
use ratatui_tablekit_core::columns::HEADER_SLOT;
use ratatui_tablekit_core::columns::SlotScope;
use serde_json::Value;

/// Props read when a leaf has no `default` slot: the row field to show.
pub const FIELD_PROPS: [&str; 2] = ["prop", "field"];
/// Props read, in order, for a header label when there is no `header` slot.
pub const LABEL_PROPS: [&str; 4] = ["label", "title", "prop", "field"];

/// A body column.
pub struct LeafColumn<R> {
    pub node: ColumnNode<R>,
    pub width: u16,
    /// The node's own `width` prop; `None` when `width` is the layout's default.
    pub explicit_width: Option<u16>,
}

impl<R> LeafColumn<R> {
    pub fn field(&self) -> Option<&str> {
        FIELD_PROPS.iter().find_map(|key| self.node.str_prop(key))
    }
}

/// One header label, covering leaves `first..=last` on header rows `level..level + rows`.
#[derive(Clone, Debug, PartialEq)]
pub struct HeaderCell {
    pub label: Line<'static>,
    pub level: usize,
    pub rows: usize,
    pub first: usize,
    pub last: usize,
    pub kind: ColumnKind,
}

pub struct ColumnLayout<R> {
    pub leaves: Vec<LeafColumn<R>>,
    pub headers: Vec<HeaderCell>,
    /// Number of header rows.
    pub depth: usize,
}

impl<R> Default for ColumnLayout<R> {
    fn default() -> Self {
        Self {
            leaves: Vec::new(),
            headers: Vec::new(),
            depth: 0,
        }
    }
}

impl<R> ColumnLayout<R> {
    /// Lays out `nodes` depth-first. Groups that end up without leaves are dropped.
    pub fn build(nodes: Vec<ColumnNode<R>>, default_width: u16) -> Self {
        let mut layout = Self::default();
        layout.walk(nodes, 0, default_width.max(1));
        layout.depth = layout
            .headers
            .iter()
            .map(|h| h.level + 1)
            .max()
            .unwrap_or(0);
        let depth = layout.depth;
        for header in &mut layout.headers {
            if header.kind == ColumnKind::Leaf {
                header.rows = depth - header.level;
            }
        }
        layout
    }

    fn walk(&mut self, nodes: Vec<ColumnNode<R>>, level: usize, default_width: u16) {
        for node in nodes {
            let label = header_label(&node);
            match node.kind() {
                ColumnKind::Leaf => {
                    let index = self.leaves.len();
                    let explicit_width = node
                        .prop("width")
                        .and_then(Value::as_u64)
                        .map(|w| w.clamp(1, u16::MAX as u64) as u16);
                    self.leaves.push(LeafColumn {
                        node,
                        width: explicit_width.unwrap_or(default_width),
                        explicit_width,
                    });
                    self.headers.push(HeaderCell {
                        label,
                        level,
                        rows: 1,
                        first: index,
                        last: index,
                        kind: ColumnKind::Leaf,
                    });
                }
                ColumnKind::Group => {
                    let first = self.leaves.len();
                    let slot = self.headers.len();
                    self.walk(node.child_columns(), level + 1, default_width);
                    if self.leaves.len() == first {
                        tracing::trace!(level, "column group without leaves dropped");
                        continue;
                    }
                    self.headers.insert(
                        slot,
                        HeaderCell {
                            label,
                            level,
                            rows: 1,
                            first,
                            last: self.leaves.len() - 1,
                            kind: ColumnKind::Group,
                        },
                    );
                }
            }
        }
    }

    /// Re-applies `default_width` to leaves without a `width` prop.
    pub fn set_default_width(&mut self, default_width: u16) {
        let default_width = default_width.max(1);
        for leaf in &mut self.leaves {
            leaf.width = leaf.explicit_width.unwrap_or(default_width);
        }
    }

    pub fn widths(&self) -> impl Iterator<Item = u16> + '_ {
        self.leaves.iter().map(|l| l.width)
    }
}

fn header_label<R>(node: &ColumnNode<R>) -> Line<'static> {
    if let Some(line) = node
        .render_slot(HEADER_SLOT, &SlotScope::column(node.props()))
        .into_text()
    {
        return line;
    }
    LABEL_PROPS
        .iter()
        .find_map(|key| node.str_prop(key))
        .map(|s| Line::from(s.to_string()))
        .unwrap_or_default()
}

/// Text shown for a JSON field value: strings unquoted, `null` and missing as empty.
pub fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
