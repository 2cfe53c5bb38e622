//! Error taxonomy shared by every engine operation.
//!
//! Every fallible call returns [`EngineError`]. Errors are raised before any
//! output is produced or any caller-owned buffer is mutated, and nothing is
//! retried internally. [`ExecutionContext::init`](crate::exec::ExecutionContext::init)
//! never fails: accelerator problems are reported through
//! [`AcceleratorStatus`](crate::exec::AcceleratorStatus) and never abort work.

use thiserror::Error;

/// Coarse classification of an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong shape, wrong length or out-of-range parameter.
    InvalidInput,
    /// Pixel or cell access outside the valid extent.
    OutOfBounds,
    /// Supplied data is shorter than the declared geometry requires.
    Truncated,
    /// Unknown format tag, codec variant or device option.
    Unsupported,
}

/// Error returned by engine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("position ({x}, {y}) is outside the {width}x{height} extent")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("data too short: {needed} bytes required, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("unsupported {option}: {value}")]
    Unsupported { option: &'static str, value: String },
}

impl EngineError {
    /// Shorthand for [`EngineError::InvalidInput`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        EngineError::InvalidInput(msg.into())
    }

    /// Shorthand for [`EngineError::Unsupported`].
    pub fn unsupported(option: &'static str, value: impl Into<String>) -> Self {
        EngineError::Unsupported {
            option,
            value: value.into(),
        }
    }

    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::InvalidInput(_) => ErrorKind::InvalidInput,
            EngineError::OutOfBounds { .. } => ErrorKind::OutOfBounds,
            EngineError::Truncated { .. } => ErrorKind::Truncated,
            EngineError::Unsupported { .. } => ErrorKind::Unsupported,
        }
    }
}

/// Result alias used across the engine.
pub type Result<T> = std::result::Result<T, EngineError>;
