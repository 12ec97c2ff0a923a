use crate::config::ConfigError;
use crate::store::StoreError;
use thiserror::Error;

/// Failure of a fan-out write. Rows written before the failure stay written.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WriteError {
    /// A write to `table` was rejected or did not reach the store.
    #[error("Write to {table} failed: {source}")]
    Store { table: String, source: StoreError },

    /// Reading the current position before updating it failed.
    #[error("Position lookup in {table} failed: {source}")]
    Lookup { table: String, source: StoreError },

    /// A conditional position write did not apply because another writer
    /// changed the row first.
    #[error("Concurrent update of position {symbol} on account {account}")]
    Conflict { account: String, symbol: String },
}

impl WriteError {
    /// Table the failed statement targeted.
    pub fn table(&self) -> &str {
        match self {
            WriteError::Store { table, .. } | WriteError::Lookup { table, .. } => table,
            WriteError::Conflict { .. } => crate::catalog::POSITIONS_BY_ACCOUNT,
        }
    }
}

/// A seek past the end of a result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Offset {offset} is out of range ({available} rows available)")]
pub struct RangeError {
    pub offset: usize,
    /// Rows known to exist when the seek stopped.
    pub available: usize,
}

/// Error type of every tradebook operation.
#[derive(Error, Debug)]
pub enum TradebookError {
    /// The store could not be reached. Aborts the operation only.
    #[error("Store unreachable: {0}")]
    Connection(StoreError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Range(#[from] RangeError),

    /// The store rejected a read or schema statement.
    #[error("Query failed: {0}")]
    Query(StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<StoreError> for TradebookError {
    fn from(err: StoreError) -> Self {
        if err.is_connection() {
            TradebookError::Connection(err)
        } else {
            TradebookError::Query(err)
        }
    }
}

/// A specialized Result type for tradebook operations.
pub type Result<T> = std::result::Result<T, TradebookError>;
