//! Keyed selection state over a list of items that may change underneath it.
//!
//! [`Selection`] remembers selected items by a caller-derived key, so it survives the list being
//! re-fetched, re-sorted or paged. Keys must be stable and unique per logical item: two items with
//! the same key are the same selection entry, and the last one written wins.
//!
//! ```
//! use ratatui_tablekit_core::selection::Selection;
//!
//! #[derive(Clone)]
//! struct User { id: u32, active: bool }
//!
//! let users = [User { id: 1, active: true }, User { id: 2, active: false }];
//! let mut selection = Selection::new(|u: &User| u.id).selectable(|u: &User| u.active);
//!
//! selection.toggle_selection(&users[0], None, false);
//! selection.toggle_selection(&users[1], None, false); // refused: not selectable
//! assert_eq!(selection.selected_keys().copied().collect::<Vec<_>>(), vec![1]);
//! ```

use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::keymap;

/// Whether selecting an item first clears every other selection.
///
/// `Dynamic` is re-evaluated on every toggle, so the mode can follow app state.
#[derive(Clone)]
pub enum SingleSelect {
    Fixed(bool),
    Dynamic(Rc<dyn Fn() -> bool>),
}

impl SingleSelect {
    pub fn dynamic(f: impl Fn() -> bool + 'static) -> Self {
        Self::Dynamic(Rc::new(f))
    }

    pub fn get(&self) -> bool {
        match self {
            Self::Fixed(on) => *on,
            Self::Dynamic(f) => f(),
        }
    }
}

impl Default for SingleSelect {
    fn default() -> Self {
        Self::Fixed(false)
    }
}

impl From<bool> for SingleSelect {
    fn from(on: bool) -> Self {
        Self::Fixed(on)
    }
}

impl fmt::Debug for SingleSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(on) => f.debug_tuple("Fixed").field(on).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Whether [`Selection::batch_toggle_selection`] bypasses the selectable predicate.
pub enum IgnoreSelectable<'a, T> {
    All(bool),
    /// Evaluated once per item.
    PerItem(&'a dyn Fn(&T) -> bool),
}

impl<T> IgnoreSelectable<'_, T> {
    fn for_item(&self, item: &T) -> bool {
        match self {
            Self::All(ignore) => *ignore,
            Self::PerItem(f) => f(item),
        }
    }
}

impl<T> From<bool> for IgnoreSelectable<'_, T> {
    fn from(ignore: bool) -> Self {
        Self::All(ignore)
    }
}

/// Selected items keyed by `to_key`, in the order they were first selected.
pub struct Selection<T, K> {
    entries: IndexMap<K, T>,
    single_select: SingleSelect,
    to_key: Rc<dyn Fn(&T) -> K>,
    selectable: Option<Rc<dyn Fn(&T) -> bool>>,
}

impl<T, K> Selection<T, K>
where
    T: Clone,
    K: Hash + Eq,
{
    pub fn new(to_key: impl Fn(&T) -> K + 'static) -> Self {
        Self {
            entries: IndexMap::new(),
            single_select: SingleSelect::default(),
            to_key: Rc::new(to_key),
            selectable: None,
        }
    }

    pub fn single_select(mut self, mode: impl Into<SingleSelect>) -> Self {
        self.single_select = mode.into();
        self
    }

    /// Items for which `f` returns `false` cannot be toggled unless the caller asks to ignore it.
    pub fn selectable(mut self, f: impl Fn(&T) -> bool + 'static) -> Self {
        self.selectable = Some(Rc::new(f));
        self
    }

    pub fn set_single_select(&mut self, mode: impl Into<SingleSelect>) {
        self.single_select = mode.into();
    }

    pub fn is_single_select(&self) -> bool {
        self.single_select.get()
    }

    pub fn to_key(&self, item: &T) -> K {
        (self.to_key)(item)
    }

    pub fn is_selected(&self, item: &T) -> bool {
        self.entries.contains_key(&self.to_key(item))
    }

    pub fn is_selectable(&self, item: &T) -> bool {
        self.selectable.as_ref().is_none_or(|f| f(item))
    }

    /// Selects or deselects `item`; `selected` defaults to the opposite of its current state.
    ///
    /// Unless `ignore_selectable` is set, an item the predicate rejects is left alone in both
    /// directions: it can be neither selected nor deselected. In single-select mode every toggle
    /// clears the existing selection first, deselects included.
    pub fn toggle_selection(&mut self, item: &T, selected: Option<bool>, ignore_selectable: bool) {
        let selected = selected.unwrap_or_else(|| !self.is_selected(item));

        if !ignore_selectable && !self.is_selectable(item) {
            tracing::trace!(selected, "toggle refused: item is not selectable");
            return;
        }

        if self.is_single_select() {
            self.clear_selection();
        }

        let key = self.to_key(item);
        if selected {
            self.entries.insert(key, item.clone());
        } else {
            self.entries.shift_remove(&key);
        }
    }

    /// Applies [`Selection::toggle_selection`] to each item in order.
    pub fn batch_toggle_selection<'a, I>(
        &mut self,
        items: I,
        selected: Option<bool>,
        ignore_selectable: IgnoreSelectable<'_, T>,
    ) where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        for item in items {
            let ignore = ignore_selectable.for_item(item);
            self.toggle_selection(item, selected, ignore);
        }
    }

    /// Selects every selectable item of `items`, or deselects them all when they already are.
    ///
    /// In single-select mode only the first selectable item is toggled.
    pub fn toggle_all<'a, I>(&mut self, items: I)
    where
        I: IntoIterator<Item = &'a T>,
        I::IntoIter: Clone,
        T: 'a,
    {
        let mut items = items.into_iter();
        if self.is_single_select() {
            if let Some(first) = items.find(|item| self.is_selectable(item)) {
                self.toggle_selection(first, None, false);
            }
            return;
        }
        let select = !self.all_selected(items.clone());
        self.batch_toggle_selection(items, Some(select), IgnoreSelectable::All(false));
    }

    /// `true` when `items` has at least one selectable item and every selectable item is selected.
    pub fn all_selected<'a, I>(&self, items: I) -> bool
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let mut any = false;
        for item in items.into_iter().filter(|item| self.is_selectable(item)) {
            if !self.is_selected(item) {
                return false;
            }
            any = true;
        }
        any
    }

    pub fn clear_selection(&mut self) {
        self.entries.clear();
    }

    /// Selected items in selection order.
    pub fn selection(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    /// Keys of the selected items in selection order.
    pub fn selected_keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T, K: fmt::Debug> fmt::Debug for Selection<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .field("single_select", &self.single_select)
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionCommand {
    Toggle,
    ToggleAll,
    Clear,
}

/// Key bindings for selection interactions.
///
/// Defaults: `Space` toggles the item under the cursor, `a` toggles every visible item and `Esc`
/// clears the selection.
#[derive(Clone, Debug)]
pub struct SelectionBindings {
    pub toggle: Vec<KeyEvent>,
    pub toggle_all: Vec<KeyEvent>,
    pub clear: Vec<KeyEvent>,
}

impl Default for SelectionBindings {
    fn default() -> Self {
        Self {
            toggle: vec![keymap::key_char(' ')],
            toggle_all: vec![keymap::key_char('a')],
            clear: vec![keymap::key(KeyCode::Esc)],
        }
    }
}

impl SelectionBindings {
    pub fn command_for(&self, key: &KeyEvent) -> Option<SelectionCommand> {
        if keymap::any_matches(&self.toggle, key) {
            return Some(SelectionCommand::Toggle);
        }
        if keymap::any_matches(&self.toggle_all, key) {
            return Some(SelectionCommand::ToggleAll);
        }
        if keymap::any_matches(&self.clear, key) {
            return Some(SelectionCommand::Clear);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Clone, Debug, PartialEq)]
    struct Item {
        id: u32,
        name: &'static str,
        active: bool,
    }

    fn item(id: u32, active: bool) -> Item {
        Item {
            id,
            name: "item",
            active,
        }
    }

    fn by_id() -> Selection<Item, u32> {
        Selection::new(|i: &Item| i.id)
    }

    fn keys(s: &Selection<Item, u32>) -> Vec<u32> {
        s.selected_keys().copied().collect()
    }

    #[test]
    fn toggle_defaults_to_flipping() {
        let mut s = by_id();
        let a = item(1, true);
        s.toggle_selection(&a, None, false);
        assert!(s.is_selected(&a));
        s.toggle_selection(&a, None, false);
        assert!(!s.is_selected(&a));
        assert!(s.is_empty());
    }

    #[test]
    fn views_keep_selection_order() {
        let mut s = by_id();
        for id in [3, 1, 2] {
            s.toggle_selection(&item(id, true), Some(true), false);
        }
        assert_eq!(keys(&s), vec![3, 1, 2]);
        s.toggle_selection(&item(1, true), Some(false), false);
        assert_eq!(keys(&s), vec![3, 2]);
        assert_eq!(s.selection().map(|i| i.id).collect::<Vec<_>>(), vec![3, 2]);
    }

    #[test]
    fn single_select_keeps_only_latest() {
        let mut s = by_id().single_select(true);
        s.toggle_selection(&item(1, true), Some(true), false);
        s.toggle_selection(&item(2, true), Some(true), false);
        assert_eq!(s.len(), 1);
        assert_eq!(keys(&s), vec![2]);
    }

    #[test]
    fn single_select_clears_even_on_deselect() {
        let mut s = by_id();
        s.toggle_selection(&item(1, true), Some(true), false);
        s.toggle_selection(&item(2, true), Some(true), false);
        s.set_single_select(true);
        s.toggle_selection(&item(3, true), Some(false), false);
        assert!(s.is_empty());
    }

    #[test]
    fn single_select_toggle_of_selected_item_deselects_it() {
        let mut s = by_id().single_select(true);
        let a = item(1, true);
        s.toggle_selection(&a, None, false);
        s.toggle_selection(&a, None, false);
        assert!(s.is_empty());
    }

    #[test]
    fn dynamic_single_select_is_read_on_each_toggle() {
        let flag = Rc::new(Cell::new(false));
        let read = Rc::clone(&flag);
        let mut s = by_id().single_select(SingleSelect::dynamic(move || read.get()));
        s.toggle_selection(&item(1, true), Some(true), false);
        s.toggle_selection(&item(2, true), Some(true), false);
        assert_eq!(s.len(), 2);
        flag.set(true);
        assert!(s.is_single_select());
        s.toggle_selection(&item(3, true), Some(true), false);
        assert_eq!(keys(&s), vec![3]);
    }

    #[test]
    fn unselectable_items_are_refused_unless_ignored() {
        let mut s = by_id().selectable(|i: &Item| i.active);
        let inactive = item(7, false);
        assert!(!s.is_selectable(&inactive));

        s.toggle_selection(&inactive, Some(true), false);
        assert!(s.is_empty());

        s.toggle_selection(&inactive, Some(true), true);
        assert!(s.is_selected(&inactive));
    }

    #[test]
    fn unselectable_items_cannot_be_deselected_either() {
        let mut s = by_id().selectable(|i: &Item| i.active);
        let inactive = item(7, false);
        s.toggle_selection(&inactive, Some(true), true);

        s.toggle_selection(&inactive, Some(false), false);
        assert!(s.is_selected(&inactive));

        s.toggle_selection(&inactive, Some(false), true);
        assert!(!s.is_selected(&inactive));
    }

    #[test]
    fn batch_select_is_idempotent() {
        let items = vec![item(1, true), item(2, true), item(3, true)];
        let mut s = by_id();
        s.batch_toggle_selection(&items, Some(true), false.into());
        let once = keys(&s);
        s.batch_toggle_selection(&items, Some(true), false.into());
        assert_eq!(keys(&s), once);
        assert_eq!(once, vec![1, 2, 3]);
    }

    #[test]
    fn batch_without_selected_flips_each_item() {
        let items = vec![item(1, true), item(2, true)];
        let mut s = by_id();
        s.toggle_selection(&items[0], Some(true), false);
        s.batch_toggle_selection(&items, None, false.into());
        assert_eq!(keys(&s), vec![2]);
    }

    #[test]
    fn batch_per_item_ignore_is_evaluated_per_item() {
        let items = vec![item(1, false), item(2, false), item(3, true)];
        let mut s = by_id().selectable(|i: &Item| i.active);
        let calls = Cell::new(0);
        let ignore_even = |i: &Item| {
            calls.set(calls.get() + 1);
            i.id % 2 == 0
        };
        s.batch_toggle_selection(&items, Some(true), IgnoreSelectable::PerItem(&ignore_even));
        assert_eq!(keys(&s), vec![2, 3]);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn same_key_collapses_to_last_written_item() {
        let mut s = by_id();
        let first = Item {
            id: 1,
            name: "first",
            active: true,
        };
        let second = Item {
            id: 1,
            name: "second",
            active: true,
        };
        s.toggle_selection(&first, Some(true), false);
        s.toggle_selection(&second, Some(true), false);
        assert_eq!(s.len(), 1);
        assert_eq!(s.selection().next().map(|i| i.name), Some("second"));
    }

    #[test]
    fn toggle_all_selects_then_deselects_selectable_items() {
        let items = vec![item(1, true), item(2, false), item(3, true)];
        let mut s = by_id().selectable(|i: &Item| i.active);
        assert!(!s.all_selected(&items));

        s.toggle_all(&items);
        assert_eq!(keys(&s), vec![1, 3]);
        assert!(s.all_selected(&items));

        s.toggle_all(&items);
        assert!(s.is_empty());
    }

    #[test]
    fn toggle_all_in_single_select_flips_first_selectable_item() {
        let items = vec![item(1, false), item(2, true), item(3, true)];
        let mut s = by_id()
            .single_select(true)
            .selectable(|i: &Item| i.active);
        s.toggle_selection(&items[2], Some(true), false);

        s.toggle_all(&items);
        assert_eq!(keys(&s), vec![2]);

        s.toggle_all(&items);
        assert!(s.is_empty());
    }

    #[test]
    fn toggle_all_in_single_select_without_selectable_items_is_a_no_op() {
        let items = vec![item(1, false)];
        let mut s = by_id()
            .single_select(true)
            .selectable(|i: &Item| i.active);
        s.toggle_selection(&item(9, true), Some(true), false);
        s.toggle_all(&items);
        assert_eq!(keys(&s), vec![9]);
    }

    #[test]
    fn all_selected_is_false_without_selectable_items() {
        let items = vec![item(1, false)];
        let s = by_id().selectable(|i: &Item| i.active);
        assert!(!s.all_selected(&items));
        assert!(!s.all_selected(&[]));
    }

    #[test]
    fn clear_empties_unconditionally() {
        let mut s = by_id().selectable(|i: &Item| i.active);
        s.toggle_selection(&item(1, false), Some(true), true);
        s.toggle_selection(&item(2, true), Some(true), false);
        s.clear_selection();
        assert!(s.is_empty());
        assert_eq!(s.selection().count(), 0);
    }

    #[test]
    fn bindings_map_keys_to_commands() {
        let b = SelectionBindings::default();
        assert_eq!(
            b.command_for(&keymap::key_char(' ')),
            Some(SelectionCommand::Toggle)
        );
        assert_eq!(
            b.command_for(&keymap::key_char('a')),
            Some(SelectionCommand::ToggleAll)
        );
        assert_eq!(
            b.command_for(&keymap::key(KeyCode::Esc)),
            Some(SelectionCommand::Clear)
        );
        assert_eq!(b.command_for(&keymap::key_ctrl('a')), None);
    }
}
