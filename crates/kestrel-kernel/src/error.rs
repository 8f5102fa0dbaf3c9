//! Error types for the kernel crate.

use thiserror::Error;

/// Result type for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;

#[derive(Debug, Error)]
pub enum KernelError {
    /// Project package failure.
    #[error(transparent)]
    Core(#[from] kestrel_core::Error),

    /// The value has no representation for the requested MIME type.
    #[error("Value cannot be rendered as {0}")]
    UnsupportedMimeType(String),
}

impl KernelError {
    /// Human-readable message with a recovery hint where one applies.
    pub fn with_hint(&self) -> String {
        match self {
            KernelError::Core(e) => e.with_hint(),
            other => other.to_string(),
        }
    }
}
