//! Business logic services for deduplication and merging.
//!
//! Services orchestrate repositories and enforce the invariants of the
//! duplicate-detection and merge subsystem, using the `FromContext`
//! derive macro for dependency injection.

mod dedup;
mod merge;

use serde::Serialize;

use crate::error::AppError;

pub use dedup::DedupService;
pub use merge::{MergeInput, MergeService};

/// Limit/offset window over a sorted result set.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
        }
    }
}

impl PageRequest {
    /// Validate the window. A zero limit is a caller mistake, not an
    /// empty page.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.limit == 0 {
            return Err(AppError::Validation("limit must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// One page of results plus the total count across all pages.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
}

impl<T> Page<T> {
    /// Slice a fully-sorted result set down to the requested window.
    pub(crate) fn slice(items: Vec<T>, page: PageRequest) -> Self {
        let total = items.len();
        let data = items
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect();
        Self { data, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_slice_windows() {
        let items: Vec<i32> = (0..10).collect();

        let page = Page::slice(items.clone(), PageRequest { limit: 3, offset: 0 });
        assert_eq!(page.data, vec![0, 1, 2]);
        assert_eq!(page.total, 10);

        let page = Page::slice(items.clone(), PageRequest { limit: 3, offset: 9 });
        assert_eq!(page.data, vec![9]);
        assert_eq!(page.total, 10);

        let page = Page::slice(items, PageRequest { limit: 3, offset: 50 });
        assert!(page.data.is_empty());
        assert_eq!(page.total, 10);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let err = PageRequest { limit: 0, offset: 0 }.validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
