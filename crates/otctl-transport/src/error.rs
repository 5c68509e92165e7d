//! Transport error types.

use thiserror::Error;

/// Errors that can occur on a serial endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The endpoint does not exist or is already held by someone else.
    #[error("{path}: port unavailable: {reason}")]
    Unavailable {
        /// Device path.
        path: String,
        /// Reason reported by the OS.
        reason: String,
    },

    /// The endpoint did not accept the bytes within the write timeout.
    #[error("{path}: write timed out")]
    WriteTimeout {
        /// Device path.
        path: String,
    },

    /// Nothing at all arrived within the read timeout where a line was expected.
    #[error("{path}: read timed out")]
    ReadTimeout {
        /// Device path.
        path: String,
    },

    /// Any other I/O failure on an open endpoint.
    #[error("{path}: I/O error: {source}")]
    Io {
        /// Device path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The OS port list could not be read.
    #[error("failed to enumerate serial ports: {0}")]
    Enumeration(String),
}

impl TransportError {
    /// Check if this is a read or write timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            TransportError::WriteTimeout { .. } | TransportError::ReadTimeout { .. }
        )
    }

    /// Short name of the error kind, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Unavailable { .. } => "unavailable",
            TransportError::WriteTimeout { .. } => "write_timeout",
            TransportError::ReadTimeout { .. } => "read_timeout",
            TransportError::Io { .. } => "io",
            TransportError::Enumeration(_) => "enumeration",
        }
    }
}

/// Result type alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
