// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page-number pagination shared by the list endpoints.

use serde::{Deserialize, Serialize};

pub const RESTAURANTS_PAGE_SIZE: u32 = 12;
pub const ORDERS_PAGE_SIZE: u32 = 20;
pub const REVIEWS_PAGE_SIZE: u32 = 10;

/// `?page=` query parameter.
///
/// Kept as a raw string: anything that is not a positive integer means page 1.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> u32 {
        parse_page(self.page.as_deref())
    }
}

/// Parse a 1-indexed page number, defaulting to 1.
pub fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|p| p.trim().parse::<u32>().ok())
        .filter(|p| *p > 0)
        .unwrap_or(1)
}

/// Number of documents to skip for `page`, or `None` if it does not fit
/// in a store offset (such a page is necessarily past the end).
pub fn offset_for(page: u32, page_size: u32) -> Option<u32> {
    page.checked_sub(1)?.checked_mul(page_size)
}

/// `ceil(total / page_size)`
pub fn page_count(total: u64, page_size: u32) -> u32 {
    let pages = total.div_ceil(u64::from(page_size.max(1)));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// One page of results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub pages: u32,
}

impl<T> Page<T> {
    /// Wrap an already-windowed result set.
    pub fn new(items: Vec<T>, page: u32, total: u64, page_size: u32) -> Self {
        Self {
            items,
            page,
            pages: page_count(total, page_size),
        }
    }

    /// Cut `page` out of a complete, already-sorted result set.
    pub fn from_all(all: Vec<T>, page: u32, page_size: u32) -> Self {
        let total = all.len() as u64;
        let items = match offset_for(page, page_size) {
            Some(offset) => all
                .into_iter()
                .skip(offset as usize)
                .take(page_size as usize)
                .collect(),
            None => Vec::new(),
        };
        Self::new(items, page, total, page_size)
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            pages: self.pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_defaults_to_one() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("")), 1);
        assert_eq!(parse_page(Some("0")), 1);
        assert_eq!(parse_page(Some("-3")), 1);
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(Some("4")), 4);
    }

    #[test]
    fn test_page_count_is_ceiling() {
        assert_eq!(page_count(0, 12), 0);
        assert_eq!(page_count(1, 12), 1);
        assert_eq!(page_count(12, 12), 1);
        assert_eq!(page_count(13, 12), 2);
        assert_eq!(page_count(41, 20), 3);
    }

    #[test]
    fn test_offset_overflow_is_none() {
        assert_eq!(offset_for(1, 20), Some(0));
        assert_eq!(offset_for(3, 10), Some(20));
        assert_eq!(offset_for(u32::MAX, 20), None);
    }

    #[test]
    fn test_from_all_past_end_is_empty() {
        let page = Page::from_all((0..25).collect::<Vec<_>>(), 3, 12);
        assert_eq!(page.items, vec![24]);
        assert_eq!(page.pages, 3);

        let page = Page::from_all((0..25).collect::<Vec<_>>(), 9, 12);
        assert!(page.items.is_empty());
        assert_eq!(page.page, 9);
        assert_eq!(page.pages, 3);
    }
}
