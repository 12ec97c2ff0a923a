//! A `Session` wrapper that injects failures and counts round trips.

use super::error::{StoreError, StoreResult};
use super::memory::MemorySession;
use super::schema::{KeyspaceSchema, TableSchema};
use super::session::{PagingState, ResultPage, Session};
use super::statement::{ConditionalUpdate, Insert, Select};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Wraps a [`MemorySession`] and fails selected calls.
///
/// Failures are reported as `StoreError::Timeout`, which callers classify
/// as a connection problem.
pub struct FaultySession {
    inner: MemorySession,
    failing_table: Mutex<Option<String>>,
    fail_reads: AtomicBool,
    writes_before_failure: Mutex<Option<usize>>,
    writes: AtomicUsize,
    pages: AtomicUsize,
    stale_update: AtomicBool,
}

impl FaultySession {
    pub fn new(inner: MemorySession) -> Self {
        Self {
            inner,
            failing_table: Mutex::new(None),
            fail_reads: AtomicBool::new(false),
            writes_before_failure: Mutex::new(None),
            writes: AtomicUsize::new(0),
            pages: AtomicUsize::new(0),
            stale_update: AtomicBool::new(false),
        }
    }

    /// Every write to `table` fails from now on.
    pub fn fail_writes_to(&self, table: &str) {
        *self.failing_table.lock().unwrap() = Some(table.to_string());
    }

    /// Every write after the next `n` fails.
    pub fn fail_after_writes(&self, n: usize) {
        self.writes.store(0, Ordering::SeqCst);
        *self.writes_before_failure.lock().unwrap() = Some(n);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// The next conditional update reports "not applied" as if another
    /// writer got there first.
    pub fn lose_next_update(&self) {
        self.stale_update.store(true, Ordering::SeqCst);
    }

    /// Number of `select_page` calls that reached the store.
    pub fn page_requests(&self) -> usize {
        self.pages.load(Ordering::SeqCst)
    }

    pub fn reset_counters(&self) {
        self.pages.store(0, Ordering::SeqCst);
        self.writes.store(0, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &MemorySession {
        &self.inner
    }

    fn check_write(&self, table: &str) -> StoreResult<()> {
        let timeout = || StoreError::Timeout {
            operation: format!("write to {}", table),
        };
        if self.failing_table.lock().unwrap().as_deref() == Some(table) {
            return Err(timeout());
        }
        let done = self.writes.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = *self.writes_before_failure.lock().unwrap() {
            if done >= limit {
                return Err(timeout());
            }
        }
        Ok(())
    }
}

impl Session for FaultySession {
    fn keyspace(&self) -> &str {
        self.inner.keyspace()
    }

    fn create_keyspace(&self, keyspace: &KeyspaceSchema) -> StoreResult<()> {
        self.inner.create_keyspace(keyspace)
    }

    fn create_table(&self, table: &TableSchema) -> StoreResult<()> {
        self.inner.create_table(table)
    }

    fn insert(&self, insert: &Insert) -> StoreResult<bool> {
        self.check_write(insert.table())?;
        self.inner.insert(insert)
    }

    fn update_if(&self, update: &ConditionalUpdate) -> StoreResult<bool> {
        self.check_write(update.table())?;
        if self.stale_update.swap(false, Ordering::SeqCst) {
            return Ok(false);
        }
        self.inner.update_if(update)
    }

    fn select_page(
        &self,
        select: &Select,
        page_size: usize,
        paging_state: Option<&PagingState>,
    ) -> StoreResult<ResultPage> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                hosts: "127.0.0.1".to_string(),
            });
        }
        self.pages.fetch_add(1, Ordering::SeqCst);
        self.inner.select_page(select, page_size, paging_state)
    }

    fn count(&self, table: &str) -> StoreResult<u64> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                hosts: "127.0.0.1".to_string(),
            });
        }
        self.inner.count(table)
    }
}
