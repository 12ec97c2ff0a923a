use crate::store::{PagingState, Row, Select};

/// Where a cursor stands in its result stream.
#[derive(Debug, Clone, PartialEq)]
pub enum CursorState {
    /// No page fetched yet.
    Initial,
    /// The last page was full; resume from this paging state.
    Paging(PagingState),
    /// The stream has ended. A new cursor is needed to read it again.
    Exhausted,
}

/// A query together with its position in the result stream.
#[derive(Debug, Clone)]
pub struct Cursor {
    select: Select,
    page_size: usize,
    state: CursorState,
}

impl Cursor {
    pub(crate) fn new(select: Select, page_size: usize) -> Self {
        Self {
            select,
            page_size,
            state: CursorState::Initial,
        }
    }

    pub(crate) fn advance(self, state: CursorState) -> Self {
        Self { state, ..self }
    }

    pub fn select(&self) -> &Select {
        &self.select
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn state(&self) -> &CursorState {
        &self.state
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == CursorState::Exhausted
    }
}

/// Rows of one fetch and the cursor to continue from.
#[derive(Debug, Clone)]
pub struct Page {
    pub rows: Vec<Row>,
    pub cursor: Cursor,
    /// True when the page was full, so another fetch may return rows.
    pub has_more: bool,
}
