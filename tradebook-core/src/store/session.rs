//! The `Session` trait: the only way the rest of the crate talks to a store.
//!
//! Every call blocks until the store answers or fails. A session is opened
//! once at startup and handed by reference to the components that need it.

use super::error::StoreResult;
use super::schema::{KeyspaceSchema, TableSchema};
use super::statement::{ConditionalUpdate, Insert, Select};
use super::value::Row;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque resume position returned with a full page.
///
/// Callers hand it back unchanged to fetch the following page. Only the
/// session that produced it knows how to read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingState(String);

impl PagingState {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PagingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One page of a SELECT.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultPage {
    pub rows: Vec<Row>,
    /// Present when the page was filled, so more rows may follow.
    pub paging_state: Option<PagingState>,
}

/// A connection to a wide-column store, bound to one keyspace.
pub trait Session: Send + Sync {
    /// Name of the keyspace statements run against.
    fn keyspace(&self) -> &str;

    /// Creates the keyspace unless it already exists.
    fn create_keyspace(&self, keyspace: &KeyspaceSchema) -> StoreResult<()>;

    /// Creates a table in the session keyspace unless it already exists.
    fn create_table(&self, table: &TableSchema) -> StoreResult<()>;

    /// Runs an INSERT. Returns whether it was applied, which is always true
    /// for unconditional inserts.
    fn insert(&self, insert: &Insert) -> StoreResult<bool>;

    /// Runs a compare-and-set UPDATE. Returns whether it was applied.
    fn update_if(&self, update: &ConditionalUpdate) -> StoreResult<bool>;

    /// Fetches at most `page_size` rows of `select`, resuming after
    /// `paging_state` when given.
    fn select_page(
        &self,
        select: &Select,
        page_size: usize,
        paging_state: Option<&PagingState>,
    ) -> StoreResult<ResultPage>;

    /// Counts every row of a table.
    fn count(&self, table: &str) -> StoreResult<u64>;
}

impl<S: Session + ?Sized> Session for &S {
    fn keyspace(&self) -> &str {
        (**self).keyspace()
    }

    fn create_keyspace(&self, keyspace: &KeyspaceSchema) -> StoreResult<()> {
        (**self).create_keyspace(keyspace)
    }

    fn create_table(&self, table: &TableSchema) -> StoreResult<()> {
        (**self).create_table(table)
    }

    fn insert(&self, insert: &Insert) -> StoreResult<bool> {
        (**self).insert(insert)
    }

    fn update_if(&self, update: &ConditionalUpdate) -> StoreResult<bool> {
        (**self).update_if(update)
    }

    fn select_page(
        &self,
        select: &Select,
        page_size: usize,
        paging_state: Option<&PagingState>,
    ) -> StoreResult<ResultPage> {
        (**self).select_page(select, page_size, paging_state)
    }

    fn count(&self, table: &str) -> StoreResult<u64> {
        (**self).count(table)
    }
}
