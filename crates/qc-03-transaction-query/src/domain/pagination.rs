//! # Pagination
//!
//! Offset/limit windows over an ordered result.

/// One window of an ordered result plus the size of the whole result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Matches before pagination.
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            offset: self.offset,
            limit: self.limit,
        }
    }
}

/// Skip `offset` items, then take `limit`.
///
/// An offset past the end yields an empty page.
pub fn paginate<T>(items: Vec<T>, offset: usize, limit: usize) -> Page<T> {
    let total = items.len();
    let items = items.into_iter().skip(offset).take(limit).collect();
    Page {
        items,
        total,
        offset,
        limit,
    }
}
