//! Page-number arithmetic shared by the client, the coordinators and the
//! renderers.

use serde::{Deserialize, Serialize};

/// One page of a listing plus the totals needed to render a pager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    /// Number of matching items across all pages.
    pub total: u64,
    pub total_pages: u64,
}

impl<T> PagedResult<T> {
    /// Builds a page whose `total_pages` is derived from `total` and `per_page`.
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, per_page: u32) -> Self {
        Self {
            items,
            total,
            total_pages: total_pages(total, per_page),
        }
    }

    /// The result committed when a listing request fails.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            total_pages: 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maps every item, keeping the totals.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> PagedResult<U>
    where
        F: FnMut(T) -> U,
    {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

impl<T> Default for PagedResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// `ceil(total / per_page)`, or `0` when `per_page` is `0`.
#[must_use]
pub fn total_pages(total: u64, per_page: u32) -> u64 {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(u64::from(per_page))
}

/// Page numbers to show in a pager: at most `width` consecutive pages
/// centred on `current`, clamped to `1..=total_pages`.
///
/// Returns an empty list when there are no pages.
#[must_use]
pub fn page_window(current: u64, total_pages: u64, width: u64) -> Vec<u64> {
    if total_pages == 0 || width == 0 {
        return Vec::new();
    }
    let width = width.min(total_pages);
    let current = current.clamp(1, total_pages);
    let mut start = current.saturating_sub(width / 2).max(1);
    if start + width - 1 > total_pages {
        start = total_pages - width + 1;
    }
    (start..start + width).collect()
}
