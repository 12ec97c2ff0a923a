use thiserror::Error;
use tradebook_core::config::ConfigError;
use tradebook_core::store::StoreError;
use tradebook_core::TradebookError;

/// Error type of the `tradebook` binary.
#[derive(Error, Debug)]
pub enum CliError {
    /// The configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The store could not be opened, bootstrapped or saved.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A tradebook operation failed.
    #[error(transparent)]
    Operation(#[from] TradebookError),

    /// Something typed at a prompt could not be understood.
    #[error("Invalid input: {0}")]
    Input(String),

    /// Reading from or writing to the terminal failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
