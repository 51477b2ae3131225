//! Offset pagination over a list of known length.
//!
//! Pages are 1-based. The current page is always within `1..=page_count()`, and `page_count()` is
//! at least 1 even for an empty list, so "page 1 of 1" is the empty state.

use std::fmt;
use std::ops::Range;
use std::ops::RangeInclusive;

use crate::config::PaginationConfig;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_VISIBLE_PAGES: usize = 5;

/// Passed to the change callback after the page or the page size changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageChange {
    pub page: usize,
    pub page_size: usize,
}

pub struct Pagination {
    total: usize,
    page: usize,
    page_size: usize,
    visible_pages: usize,
    on_change: Option<Box<dyn FnMut(PageChange)>>,
}

impl Pagination {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            visible_pages: DEFAULT_VISIBLE_PAGES,
            on_change: None,
        }
    }

    pub fn from_config(total: usize, config: &PaginationConfig) -> Self {
        let mut p = Self::new(total);
        p.page_size = config.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
        p.visible_pages = config.visible_pages.unwrap_or(DEFAULT_VISIBLE_PAGES).max(1);
        p
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self.page = self.page.min(self.page_count());
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page.clamp(1, self.page_count());
        self
    }

    /// Called after every operation that changes the page or the page size.
    pub fn on_change(mut self, f: impl FnMut(PageChange) + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size).max(1)
    }

    pub fn is_first_page(&self) -> bool {
        self.page == 1
    }

    pub fn is_last_page(&self) -> bool {
        self.page == self.page_count()
    }

    /// Index of the first item on the current page.
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.page_size
    }

    /// Item indices on the current page.
    pub fn range(&self) -> Range<usize> {
        let start = self.offset().min(self.total);
        start..(start + self.page_size).min(self.total)
    }

    /// The current page of `items`, tolerating `items` being shorter than `total`.
    pub fn page_slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let Range { start, end } = self.range();
        let end = end.min(items.len());
        &items[start.min(end)..end]
    }

    /// Page numbers a pager should show: a window of at most `visible_pages` around the current
    /// page, pinned to either end.
    pub fn visible_pages(&self) -> RangeInclusive<usize> {
        let count = self.page_count();
        let visible = self.visible_pages;
        if count <= visible {
            return 1..=count;
        }
        let half = visible / 2;
        let start = if self.page <= half + 1 {
            1
        } else if self.page >= count - half {
            count - visible + 1
        } else {
            self.page - half
        };
        start..=(start + visible - 1).min(count)
    }

    pub fn prev(&mut self) -> bool {
        self.jump_to(self.page.saturating_sub(1))
    }

    pub fn next(&mut self) -> bool {
        self.jump_to(self.page + 1)
    }

    /// Moves to `page`, clamped into range. Returns whether the page changed.
    pub fn jump_to(&mut self, page: usize) -> bool {
        self.update(page, self.page_size)
    }

    pub fn set_page_size(&mut self, page_size: usize) -> bool {
        self.update(self.page, page_size)
    }

    /// Updates the item count; the current page is pulled back if it no longer exists.
    pub fn set_total(&mut self, total: usize) -> bool {
        self.total = total;
        self.update(self.page, self.page_size)
    }

    fn update(&mut self, page: usize, page_size: usize) -> bool {
        let before = (self.page, self.page_size);
        self.page_size = page_size.max(1);
        self.page = page.clamp(1, self.page_count());
        if before == (self.page, self.page_size) {
            return false;
        }
        tracing::trace!(page = self.page, page_size = self.page_size, "page changed");
        let change = PageChange {
            page: self.page,
            page_size: self.page_size,
        };
        if let Some(f) = self.on_change.as_mut() {
            f(change);
        }
        true
    }
}

impl fmt::Debug for Pagination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pagination")
            .field("total", &self.total)
            .field("page", &self.page)
            .field("page_size", &self.page_size)
            .field("visible_pages", &self.visible_pages)
            .finish()
    }
}
