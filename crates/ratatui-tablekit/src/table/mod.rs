//! A table widget whose columns come from [`crate::columns::render_columns`].

mod layout;
mod view;

pub use layout::ColumnLayout;
pub use layout::FIELD_PROPS;
pub use layout::HeaderCell;
pub use layout::LABEL_PROPS;
pub use layout::LeafColumn;
pub use layout::value_text;
pub use view::TableAction;
pub use view::TableData;
pub use view::TableView;
pub use view::TableViewOptions;
