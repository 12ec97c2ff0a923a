use thiserror::Error;

/// Failures reported by a `Session`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No contact point could be reached.
    #[error("No host available (tried: {hosts})")]
    Unavailable { hosts: String },

    /// The store did not answer in time.
    #[error("Operation timed out: {operation}")]
    Timeout { operation: String },

    #[error("Unsupported protocol version {0}")]
    UnsupportedProtocol(u8),

    #[error("Keyspace '{0}' does not exist")]
    KeyspaceNotFound(String),

    #[error("Table '{0}' does not exist")]
    TableNotFound(String),

    /// The statement was rejected by the store.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The paging state does not belong to the statement it was sent with.
    #[error("Invalid paging state: {0}")]
    InvalidPagingState(String),

    /// Loading or saving a store snapshot failed.
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl StoreError {
    /// Whether the failure means the store could not be reached at all.
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable { .. } | StoreError::Timeout { .. }
        )
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
