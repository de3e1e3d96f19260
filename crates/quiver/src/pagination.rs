//! Offset pagination over the accumulated query.
//!
//! `paginate` runs two statements: a `count(*)` over a clone of the builder
//! to size the result, then the data fetch with `limit offset, per_page`.
//! All page numbers are 1-based and clamped, never negative.

use serde::Serialize;

use crate::builder::QueryBuilder;
use crate::connection::Connection;
use crate::error::{QueryError, QueryResult};
use crate::row::Row;

/// One page of results plus cursor metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagination {
    /// The rows of this page.
    pub items: Vec<Row>,
    /// The 1-based page that was fetched.
    pub current: u64,
    /// The next page, when one exists.
    pub next: Option<u64>,
    /// The previous page, clamped to 1 on the first page.
    pub previous: u64,
    /// Total number of pages.
    pub total: u64,
    /// Page size the query was run with.
    pub per_page: u64,
}

impl Pagination {
    /// Split the page's rows into chunks of at most `size` rows.
    pub fn chunks(&self, size: usize) -> impl Iterator<Item = &[Row]> {
        self.items.chunks(size.max(1))
    }
}

impl QueryBuilder {
    /// Fetch page `page` with `per_page` rows per page.
    ///
    /// Page numbers below 1 are clamped to 1. A page past the end returns an
    /// empty item list with consistent metadata rather than an error.
    pub async fn paginate<C: Connection>(
        &mut self,
        conn: &C,
        per_page: u64,
        page: u64,
    ) -> QueryResult<Pagination> {
        if per_page == 0 {
            return Err(QueryError::builder("paginate requires per_page >= 1"));
        }
        let current = page.max(1);
        let total_rows = self.clone().count(conn).await?;

        // An empty result still counts as one (empty) page.
        let total_pages = total_rows.div_ceil(per_page).max(1);
        let remaining = total_pages.saturating_sub(current);

        self.jump(per_page * (current - 1)).take(per_page);
        let items = self.get(conn).await?;

        Ok(Pagination {
            items,
            current,
            next: if remaining > 0 { Some(current + 1) } else { None },
            previous: current.saturating_sub(1).max(1),
            total: total_pages,
            per_page,
        })
    }
}
