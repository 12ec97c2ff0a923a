//! Paged reads over a `Session`.
//!
//! The store only offers forward iteration: a page plus an opaque paging
//! state for the next one. Random access is emulated by replaying pages
//! from the start, which costs one round trip per skipped page.

mod cursor;

pub use cursor::{Cursor, CursorState, Page};

use crate::error::{RangeError, Result};
use crate::store::{Row, Select, Session, StoreError};
use log::debug;
use rand::Rng;

pub struct QueryWalker<S: Session> {
    session: S,
}

impl<S: Session> QueryWalker<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }

    /// Prepares a cursor over `query`. Nothing is fetched yet.
    pub fn open(&self, query: Select, page_size: usize) -> Result<Cursor> {
        if page_size == 0 {
            return Err(StoreError::InvalidQuery("page size must be positive".to_string()).into());
        }
        Ok(Cursor::new(query, page_size))
    }

    /// Fetches the page after `cursor`.
    ///
    /// An exhausted cursor yields an empty page without contacting the
    /// store.
    pub fn next_page(&self, cursor: Cursor) -> Result<Page> {
        if cursor.is_exhausted() {
            return Ok(Page {
                rows: Vec::new(),
                cursor,
                has_more: false,
            });
        }
        let paging_state = match cursor.state() {
            CursorState::Paging(state) => Some(state),
            _ => None,
        };

        let result = self
            .session
            .select_page(cursor.select(), cursor.page_size(), paging_state)?;
        let has_more = result.rows.len() == cursor.page_size() && result.paging_state.is_some();
        let state = match result.paging_state {
            Some(state) if has_more => CursorState::Paging(state),
            _ => CursorState::Exhausted,
        };
        debug!(
            "Fetched {} rows from {} (has_more={})",
            result.rows.len(),
            cursor.select().table(),
            has_more
        );
        Ok(Page {
            rows: result.rows,
            cursor: cursor.advance(state),
            has_more,
        })
    }

    /// Reads every row of `query`, page by page.
    pub fn collect(&self, query: Select, page_size: usize) -> Result<Vec<Row>> {
        let mut cursor = self.open(query, page_size)?;
        let mut rows = Vec::new();
        loop {
            let page = self.next_page(cursor)?;
            rows.extend(page.rows);
            if !page.has_more {
                return Ok(rows);
            }
            cursor = page.cursor;
        }
    }

    /// Returns the row at zero-based `offset` of the result of `query`.
    ///
    /// Discards `offset / page_size` pages, then picks index
    /// `offset % page_size` of the next one.
    ///
    /// # Returns
    ///
    /// * `Ok(Row)` at that position.
    /// * `Err(TradebookError::Range)` if the result has `offset` rows or fewer.
    pub fn seek_to_offset(&self, query: Select, page_size: usize, offset: usize) -> Result<Row> {
        let mut cursor = self.open(query, page_size)?;
        let mut seen = 0;

        for _ in 0..offset / page_size {
            let page = self.next_page(cursor)?;
            seen += page.rows.len();
            if !page.has_more {
                return Err(RangeError {
                    offset,
                    available: seen,
                }
                .into());
            }
            cursor = page.cursor;
        }

        let page = self.next_page(cursor)?;
        let available = seen + page.rows.len();
        page.rows
            .into_iter()
            .nth(offset % page_size)
            .ok_or_else(|| RangeError { offset, available }.into())
    }

    /// Seeks to a uniformly chosen offset in `0..total`.
    pub fn random_row<R: Rng + ?Sized>(
        &self,
        query: Select,
        page_size: usize,
        total: usize,
        rng: &mut R,
    ) -> Result<Row> {
        if total == 0 {
            return Err(RangeError {
                offset: 0,
                available: 0,
            }
            .into());
        }
        let offset = rng.gen_range(0..total);
        self.seek_to_offset(query, page_size, offset)
    }
}
