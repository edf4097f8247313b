//! Pagination helper.
//!
//! Turns the raw `page`/`size`/`orderBy` query strings into a normalized
//! [`PaginationQuery`] and derives the offset and the one-page-ahead limit used
//! by stores to detect whether another page exists.
use serde::{Deserialize, Serialize};

use crate::errors::PaginationError;
use crate::types::Page;

/// Page size used when the caller omits `size` or passes `0`.
pub const DEFAULT_PAGE_SIZE: i64 = 2;

/// Normalized pagination parameters.
///
/// The serialized form doubles as the cache key of a page lookup, so field
/// order and names are part of the cache contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationQuery {
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub page: i64,
    #[serde(default, rename = "orderBy")]
    pub order_by: String,
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            size: DEFAULT_PAGE_SIZE,
            page: 0,
            order_by: String::new(),
        }
    }
}

impl PaginationQuery {
    /// Builds a query from raw request parameters.
    ///
    /// An empty `page` means page 0. An empty or `"0"` `size` falls back to
    /// [`DEFAULT_PAGE_SIZE`]. Non-numeric input fails with
    /// [`PaginationError::Parse`].
    pub fn from_params(page: &str, size: &str, order_by: &str) -> Result<Self, PaginationError> {
        let mut query = Self {
            size: 0,
            page: 0,
            order_by: String::new(),
        };
        query.set_page(page)?;
        query.set_size(size)?;
        query.set_order_by(order_by);
        Ok(query)
    }

    pub fn set_page(&mut self, page: &str) -> Result<(), PaginationError> {
        if page.is_empty() {
            self.page = 0;
            return Ok(());
        }
        self.page = parse_number("page", page)?;
        Ok(())
    }

    pub fn set_size(&mut self, size: &str) -> Result<(), PaginationError> {
        if size.is_empty() || size == "0" {
            self.size = DEFAULT_PAGE_SIZE;
            return Ok(());
        }
        self.size = parse_number("size", size)?;
        Ok(())
    }

    pub fn set_order_by(&mut self, order_by: &str) {
        self.order_by = order_by.to_string();
    }

    /// Rows to skip. Pages 0 and 1 both start at the first row. Never
    /// negative, and saturates instead of overflowing.
    pub fn offset(&self) -> i64 {
        if self.page <= 1 {
            return 0;
        }
        (self.page - 1).saturating_mul(self.size).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    /// Limit to request from the store: one row past the page, so the extra
    /// row reveals whether a next page exists.
    pub fn probe_limit(&self) -> i64 {
        self.size.saturating_add(1)
    }

    /// Wraps the rows fetched with [`probe_limit`](Self::probe_limit) into a
    /// page, trimming the probe row and setting `has_more` when it is present.
    pub fn paginate<T>(&self, mut rows: Vec<T>) -> Page<T> {
        let size = usize::try_from(self.size).unwrap_or(0);
        let has_more = rows.len() > size;
        rows.truncate(size);
        Page {
            page: self.page,
            has_more,
            items: rows,
        }
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<i64, PaginationError> {
    value
        .parse::<i64>()
        .map_err(|source| PaginationError::Parse {
            field,
            value: value.to_string(),
            source,
        })
}

/// Number of pages needed to hold `total_count` rows.
pub fn total_pages(total_count: i64, page_size: i64) -> i64 {
    if page_size <= 0 {
        return 0;
    }
    (total_count + page_size - 1) / page_size
}

/// Whether rows remain after `current_page` given a known total.
pub fn has_more(current_page: i64, total_count: i64, page_size: i64) -> bool {
    if page_size == 0 {
        return false;
    }
    current_page < total_count / page_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_params_use_defaults() {
        let query = PaginationQuery::from_params("", "", "").unwrap();
        assert_eq!(query.size, DEFAULT_PAGE_SIZE);
        assert_eq!(query.page, 0);
        assert_eq!(query.order_by, "");
    }

    #[test]
    fn zero_size_falls_back_to_default() {
        let query = PaginationQuery::from_params("2", "0", "").unwrap();
        assert_eq!(query.page, 2);
        assert_eq!(query.size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn explicit_values_are_kept() {
        let query = PaginationQuery::from_params("3", "10", "nickname").unwrap();
        assert_eq!(query.page, 3);
        assert_eq!(query.size, 10);
        assert_eq!(query.order_by, "nickname");
    }

    #[test]
    fn negative_numbers_parse() {
        let query = PaginationQuery::from_params("-1", "-1", "").unwrap();
        assert_eq!(query.page, -1);
        assert_eq!(query.size, -1);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn non_numeric_page_fails() {
        let err = PaginationQuery::from_params("wevw", "", "").unwrap_err();
        assert!(matches!(err, PaginationError::Parse { field: "page", .. }));
    }

    #[test]
    fn non_numeric_size_fails() {
        let err = PaginationQuery::from_params("1", "--1", "").unwrap_err();
        assert!(matches!(err, PaginationError::Parse { field: "size", .. }));
    }

    #[test]
    fn first_two_pages_share_offset_zero() {
        let mut query = PaginationQuery::from_params("0", "5", "").unwrap();
        assert_eq!(query.offset(), 0);
        query.page = 1;
        assert_eq!(query.offset(), 0);
        query.page = 3;
        assert_eq!(query.offset(), 10);
    }

    #[test]
    fn huge_values_saturate() {
        let query = PaginationQuery::from_params("1", "9223372036854775807", "").unwrap();
        assert_eq!(query.probe_limit(), i64::MAX);
        assert_eq!(query.offset(), 0);

        let query = PaginationQuery::from_params("9223372036854775807", "10", "").unwrap();
        assert_eq!(query.offset(), i64::MAX);
    }

    #[test]
    fn negative_size_never_yields_negative_offset() {
        let query = PaginationQuery::from_params("3", "-5", "").unwrap();
        assert_eq!(query.offset(), 0);

        let query = PaginationQuery::from_params("9223372036854775807", "-10", "").unwrap();
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn probe_limit_is_one_past_size() {
        let query = PaginationQuery::from_params("1", "4", "").unwrap();
        assert_eq!(query.limit(), 4);
        assert_eq!(query.probe_limit(), 5);
    }

    #[test]
    fn paginate_trims_probe_row() {
        let query = PaginationQuery::from_params("1", "2", "").unwrap();

        let page = query.paginate(vec![1, 2, 3]);
        assert!(page.has_more);
        assert_eq!(page.items, vec![1, 2]);
        assert_eq!(page.page, 1);

        let page = query.paginate(vec![1, 2]);
        assert!(!page.has_more);
        assert_eq!(page.items, vec![1, 2]);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 1), 0);
        assert_eq!(total_pages(1, 2), 1);
        assert_eq!(total_pages(10, 3), 4);
        assert_eq!(total_pages(10, 0), 0);
    }

    #[test]
    fn has_more_from_totals() {
        assert!(!has_more(0, 0, 0));
        assert!(!has_more(1, 1, 2));
        assert!(has_more(1, 10, 3));
        assert!(!has_more(9, 10, 3));
    }

    #[test]
    fn cache_key_form_is_stable() {
        let query = PaginationQuery::from_params("2", "3", "").unwrap();
        let json = serde_json::to_string(&query).unwrap();
        assert_eq!(json, r#"{"size":3,"page":2,"orderBy":""}"#);
    }
}
