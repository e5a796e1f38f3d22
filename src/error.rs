//! Error types for the rollcall bot.

/// Top-level error type for the availability pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RollcallError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// A time clause could not be turned into a future timestamp.
    #[error("invalid time: {0}")]
    InvalidTime(String),

    /// A user id that cannot be used as a storage key.
    #[error("invalid user id: {0:?}")]
    InvalidUserId(String),

    /// Reading a per-user availability file failed.
    #[error("storage read error: {0}")]
    StorageRead(String),

    /// Writing a per-user availability file failed.
    #[error("storage write error: {0}")]
    StorageWrite(String),

    /// Confirmation workflow error (unknown prompt, wrong user, expired).
    #[error("workflow error: {0}")]
    Workflow(String),

    /// Chat channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, RollcallError>;
