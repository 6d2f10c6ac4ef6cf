//! Pagination parameters and the `{data, total, pages}` list envelope.

use serde::Serialize;

use crate::{Error, Result};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/// A validated page request; `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub page:  u32,
  pub limit: u32,
}

impl Default for PageRequest {
  fn default() -> Self { Self { page: DEFAULT_PAGE, limit: DEFAULT_LIMIT } }
}

impl PageRequest {
  /// Build from optional query values, applying defaults.
  pub fn new(page: Option<u32>, limit: Option<u32>) -> Result<Self> {
    let page = page.unwrap_or(DEFAULT_PAGE);
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    if page < 1 {
      return Err(Error::validation("page must be at least 1"));
    }
    if !(1..=MAX_LIMIT).contains(&limit) {
      return Err(Error::validation(format!(
        "limit must be between 1 and {MAX_LIMIT}"
      )));
    }
    Ok(Self { page, limit })
  }

  pub fn offset(&self) -> u64 { u64::from(self.page - 1) * u64::from(self.limit) }
}

/// Number of pages needed to show `total` rows at `limit` per page.
pub fn page_count(total: u64, limit: u32) -> u64 {
  let limit = u64::from(limit.max(1));
  total.div_ceil(limit)
}

/// One page of a filtered listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
  pub data:  Vec<T>,
  /// Size of the whole filtered set, not of `data`.
  pub total: u64,
  pub page:  u32,
  pub limit: u32,
  pub pages: u64,
}

impl<T> Page<T> {
  pub fn new(data: Vec<T>, total: u64, request: PageRequest) -> Self {
    Self {
      data,
      total,
      page: request.page,
      limit: request.limit,
      pages: page_count(total, request.limit),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pages_is_ceiling_of_total_over_limit() {
    for limit in 1..=25u32 {
      for total in 0..=200u64 {
        let expected = (total as f64 / f64::from(limit)).ceil() as u64;
        assert_eq!(page_count(total, limit), expected, "total={total} limit={limit}");
      }
    }
  }

  #[test]
  fn empty_set_has_zero_pages() {
    assert_eq!(page_count(0, 20), 0);
  }

  #[test]
  fn defaults_apply() {
    let req = PageRequest::new(None, None).unwrap();
    assert_eq!(req, PageRequest { page: 1, limit: 20 });
    assert_eq!(req.offset(), 0);
  }

  #[test]
  fn offset_skips_previous_pages() {
    let req = PageRequest::new(Some(3), Some(20)).unwrap();
    assert_eq!(req.offset(), 40);
  }

  #[test]
  fn zero_page_or_limit_is_rejected() {
    assert!(matches!(PageRequest::new(Some(0), None), Err(Error::Validation(_))));
    assert!(matches!(PageRequest::new(None, Some(0)), Err(Error::Validation(_))));
    assert!(matches!(PageRequest::new(None, Some(MAX_LIMIT + 1)), Err(Error::Validation(_))));
  }

  #[test]
  fn envelope_counts_filtered_total() {
    let page = Page::new(vec![1, 2, 3], 45, PageRequest::default());
    assert_eq!(page.total, 45);
    assert_eq!(page.pages, 3);
    assert_eq!(page.data.len(), 3);
  }
}
