//! `from`/`size` paging shared by every listing endpoint.

use crate::errors::AppError;
use serde::Deserialize;
use utoipa::IntoParams;

pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Raw paging query parameters; convert with [`PageParams::page`].
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Zero-based offset of the first element (default 0)
    pub from: Option<u64>,
    /// Page length (default 10, must be positive)
    pub size: Option<u64>,
}

impl PageParams {
    pub fn page(&self) -> Result<Page, AppError> {
        Page::new(self.from, self.size)
    }
}

/// A validated page.
///
/// `from` is rounded down to a multiple of `size`: the page index is `from / size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub index: u64,
    pub size: u64,
}

impl Page {
    pub fn new(from: Option<u64>, size: Option<u64>) -> Result<Self, AppError> {
        let from = from.unwrap_or(0);
        let size = size.unwrap_or(DEFAULT_PAGE_SIZE);
        if size == 0 {
            return Err(AppError::BadRequest(
                "Page size must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            index: from / size,
            size,
        })
    }

    pub fn offset(&self) -> u64 {
        self.index * self.size
    }

    pub fn limit(&self) -> u64 {
        self.size
    }

    /// Slice an in-memory result set.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.size as usize)
            .collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            index: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page = PageParams::default().page().unwrap();
        assert_eq!(page, Page::default());
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn test_from_is_rounded_down_to_page_start() {
        let page = Page::new(Some(7), Some(5)).unwrap();
        assert_eq!(page.index, 1);
        assert_eq!(page.offset(), 5);
    }

    #[test]
    fn test_zero_size_is_rejected() {
        assert!(matches!(
            Page::new(Some(0), Some(0)),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_apply_slices_items() {
        let page = Page::new(Some(2), Some(2)).unwrap();
        assert_eq!(page.apply(vec![1, 2, 3, 4, 5]), vec![3, 4]);
        assert!(Page::new(Some(10), Some(2)).unwrap().apply(vec![1, 2]).is_empty());
    }
}
