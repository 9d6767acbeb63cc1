use thiserror::Error;

/// Top-level error type for voxgate.
///
/// Each variant corresponds to a subsystem that can produce errors.
#[derive(Debug, Error)]
pub enum VoxgateError {
    /// An error from the language model adapter.
    #[error("Agent error: {0}")]
    Agent(String),

    /// An error from an outbound HTTP request (language model or speech provider).
    #[error("HTTP error: {0}")]
    Http(String),

    /// An error related to call session lookup or mutation.
    #[error("Session error: {0}")]
    Session(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// An error from the speech synthesis adapter.
    #[error("Speech error: {0}")]
    Speech(String),

    /// An error from the audio artifact store.
    #[error("Store error: {0}")]
    Store(String),

    /// An error raised while handling a telephony webhook.
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// A provider call exceeded its time bound.
    #[error("Timed out after {0}s")]
    Timeout(u64),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`VoxgateError`].
pub type VoxgateResult<T> = Result<T, VoxgateError>;
