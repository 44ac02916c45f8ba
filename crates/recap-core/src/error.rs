use thiserror::Error;

/// Top-level error type for Recap.
#[derive(Debug, Error)]
pub enum RecapError {
    /// Missing or malformed configuration. Fatal at startup.
    #[error("config error: {0}")]
    Config(String),

    /// A guild, channel, or role id could not be resolved.
    #[error("lookup failed: {0}")]
    Lookup(String),

    /// Error from the chat platform (send, edit, delete, history).
    #[error("platform error: {0}")]
    Platform(String),

    /// Collection exceeded its deadline.
    #[error("collection timed out after {0}s")]
    Timeout(u64),

    /// Scheduler error (bad time of day, unknown zone, cron failure).
    #[error("scheduler error: {0}")]
    Schedule(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
