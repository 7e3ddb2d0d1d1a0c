/// Number of pages needed for `len` items, `ceil(len / page_size)`.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Slice for the 1-indexed `page`, clamped to the list bounds. Page 0 and
/// pages past the end yield an empty slice rather than an error.
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}
