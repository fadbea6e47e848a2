//! Structured error handling for store operations.

use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Categories of store errors, used for logging and classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum StoreErrorKind {
    /// Transport-level failure reaching the backend.
    NetworkError,
    /// The request did not complete within the configured timeout.
    Timeout,
    /// The backend answered with a non-success status.
    BadStatus,
    /// The response body could not be decoded into a valid document.
    Serialization,
}

impl StoreErrorKind {
    /// Whether errors of this kind are worth retrying.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkError | Self::Timeout)
    }
}

/// Errors raised by graph store operations.
///
/// Always recoverable from the editor's point of view: the in-memory
/// document is never mutated by a failed load or save.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request could not be delivered.
    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The backend answered with a non-success status.
    #[error("backend answered with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The response body was not a valid graph document.
    #[error("malformed response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl StoreError {
    /// Returns the error's classification.
    #[must_use]
    pub const fn kind(&self) -> StoreErrorKind {
        match self {
            Self::Transport(_) => StoreErrorKind::NetworkError,
            Self::Timeout => StoreErrorKind::Timeout,
            Self::Status { .. } => StoreErrorKind::BadStatus,
            Self::Decode(_) => StoreErrorKind::Serialization,
        }
    }

    /// Whether a retry has a chance of succeeding. Server-side 5xx
    /// answers count as retryable; client errors and decode failures
    /// do not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status } => *status >= 500,
            _ => self.kind().is_retryable(),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::Decode(error)
        } else if let Some(status) = error.status() {
            Self::Status {
                status: status.as_u16(),
            }
        } else {
            Self::Transport(error)
        }
    }
}
