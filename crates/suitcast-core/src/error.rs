use thiserror::Error;

/// Top-level error type for suitcast.
#[derive(Debug, Error)]
pub enum SuitcastError {
    /// Error from a messaging transport (send, edit, poll).
    #[error("channel error: {0}")]
    Channel(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Prediction engine misuse (e.g. storing a prediction twice).
    #[error("engine error: {0}")]
    Engine(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
