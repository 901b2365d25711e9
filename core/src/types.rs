use std::io;
use thiserror::Error;

use crate::compression::CodecError;

/// Unified stream error covering construction, validation, engine and state failures.
/// - Construction and validation errors are raised at the call that produced them.
/// - Engine errors are forwarded verbatim to the readable side.
/// - `Clone` so a single recorded error can be reported to writer and reader alike.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// Missing or unsupported constructor argument.
    #[error("{0}")]
    Construction(String),

    /// Chunk of the wrong shape handed to `write`.
    #[error("{0}")]
    Validation(String),

    /// Failure reported by the codec engine while processing.
    #[error("{0}")]
    Engine(#[from] CodecError),

    /// Operation not permitted in the current stream state.
    #[error("invalid state: {0}")]
    State(&'static str),

    /// The writable side was aborted or dropped before closing.
    #[error("stream aborted")]
    Aborted,

    /// The readable side was cancelled by its consumer.
    #[error("stream cancelled")]
    Cancelled,

    /// I/O failure in the blocking pipeline driver.
    #[error("I/O error: {0}")]
    Io(String),

    /// Invalid configuration value.
    #[error("config error: {0}")]
    Config(String),
}

impl From<io::Error> for StreamError {
    fn from(e: io::Error) -> Self {
        StreamError::Io(e.to_string())
    }
}
