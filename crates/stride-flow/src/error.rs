//! Error types for stride-flow

use thiserror::Error;

/// Result type for flow operations
pub type FlowResult<T> = std::result::Result<T, FlowError>;

/// Flow recording and export errors
#[derive(Error, Debug)]
pub enum FlowError {
    /// Event (de)serialization failed
    #[error("Flow serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A JSONL line could not be parsed
    #[error("Invalid flow event on line {line}: {message}")]
    InvalidLine { line: usize, message: String },

    /// The global tracing subscriber could not be installed
    #[error("Failed to install tracing subscriber: {message}")]
    Subscriber { message: String },
}

impl FlowError {
    /// Create an invalid line error
    pub fn invalid_line<S: Into<String>>(line: usize, message: S) -> Self {
        Self::InvalidLine {
            line,
            message: message.into(),
        }
    }

    /// Create a subscriber installation error
    pub fn subscriber<S: Into<String>>(message: S) -> Self {
        Self::Subscriber {
            message: message.into(),
        }
    }
}
