//! Pagination primitives.
//!
//! Pages are zero-based windows over an ordered listing. The store fetches
//! one window plus the total row count; `Page` derives the rest of the
//! metadata from those two facts.

use serde::Serialize;

/// A zero-based page window request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
}

impl PageRequest {
    pub fn of(page: u64, size: u64) -> Self {
        Self { page, size }
    }

    /// Number of rows preceding this window.
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }
}

/// One page of results plus the metadata needed to walk the listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
    pub last: bool,
}

impl<T> Page<T> {
    /// Assemble a page from a fetched window and the listing's total count.
    ///
    /// A request beyond the end of the listing yields an empty page marked
    /// `last`, not an error.
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        let total_pages = if request.size == 0 {
            0
        } else {
            total_elements.div_ceil(request.size)
        };
        let last = request.page.saturating_add(1) >= total_pages;

        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages,
            last,
        }
    }

    pub fn has_next(&self) -> bool {
        !self.last
    }

    /// Convert page content, keeping the window metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            last: self.last,
        }
    }
}
