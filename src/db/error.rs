use thiserror::Error;

/// Failures of the backing store. These are never "not found": missing rows
/// come back as empty or `None` results.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A thread panicked while holding the connection.
    #[error("database connection mutex poisoned")]
    Poisoned,

    /// The blocking task running a query was cancelled or panicked.
    #[error("blocking database task failed: {0}")]
    Join(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
