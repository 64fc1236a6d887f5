//! Core error type for engine operations.

use dynoquery_model::StoreError;

/// Errors surfaced by builders and the pagination engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A builder argument was rejected before any request was issued.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// A permanent error returned by the store.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A retryable store error kept recurring past the configured budget.
    #[error("Retries exhausted after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Number of attempts made, including the first.
        attempts: u32,
        /// The last error returned by the store.
        source: StoreError,
    },
}

impl Error {
    /// Shorthand for [`Error::InvalidArgument`].
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// The underlying store error, if this error came from the store.
    #[must_use]
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Self::Store(e) | Self::RetriesExhausted { source: e, .. } => Some(e),
            Self::InvalidArgument(_) => None,
        }
    }
}

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, Error>;
