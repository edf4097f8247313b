use serde::{Deserialize, Serialize};

use crate::types::{User, Vote};

/// One page of a paginated listing.
///
/// `has_more` is derived from a one-row-ahead probe, see
/// [`PaginationQuery::paginate`](crate::PaginationQuery::paginate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub page: i64,
    pub has_more: bool,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn empty(page: i64) -> Self {
        Self {
            page,
            has_more: false,
            items: Vec::new(),
        }
    }

    /// Replaces the items while keeping the page metadata.
    pub fn with_items<U>(self, items: Vec<U>) -> Page<U> {
        Page {
            page: self.page,
            has_more: self.has_more,
            items,
        }
    }
}

pub type Users = Page<User>;
pub type Votes = Page<Vote>;
