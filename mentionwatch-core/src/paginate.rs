//! Deterministic page slicing.

use serde::{Deserialize, Serialize};

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Requested page: 1-indexed number and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub number: usize,
    pub size: usize,
}

impl PageRequest {
    pub fn new(number: usize, size: usize) -> Self {
        Self { number, size }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            number: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of a collection, after clamping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Page actually served, in `[1, max_page]`.
    pub number: usize,
    pub max_page: usize,
    /// Length of the whole collection.
    pub total: usize,
    /// 0-based index of the first item within the collection.
    pub offset: usize,
}

/// Number of pages for `len` items; never less than 1.
pub fn max_page(len: usize, page_size: usize) -> usize {
    let size = page_size.max(1);
    len.div_ceil(size).max(1)
}

/// Slice page `page_number` (1-indexed) out of `records`.
///
/// Out-of-range numbers are clamped into `[1, max_page]`; a zero page size is
/// treated as 1.
pub fn page<T: Clone>(records: &[T], page_size: usize, page_number: usize) -> Vec<T> {
    paginate(records, PageRequest::new(page_number, page_size)).items
}

pub fn paginate<T: Clone>(records: &[T], request: PageRequest) -> Page<T> {
    let size = request.size.max(1);
    let last = max_page(records.len(), size);
    let number = request.number.clamp(1, last);
    let offset = (number - 1) * size;
    let end = (offset + size).min(records.len());
    let items = records.get(offset..end).map(<[T]>::to_vec).unwrap_or_default();

    Page {
        items,
        number,
        max_page: last,
        total: records.len(),
        offset,
    }
}
