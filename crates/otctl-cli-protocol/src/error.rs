//! Error types for the CLI protocol.

use thiserror::Error;

/// Errors that can occur when building CLI commands from user-supplied values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CliError {
    /// Channel outside the 2.4 GHz 802.15.4 range.
    #[error("invalid channel {0} (must be 11-26)")]
    InvalidChannel(u8),

    /// PAN ID is not a 16-bit hex or decimal value.
    #[error("invalid PAN ID: {0}")]
    InvalidPanId(String),

    /// Network key is not 16 bytes of hex.
    #[error("invalid network key: {0}")]
    InvalidNetworkKey(String),

    /// Transmit power could not be parsed.
    #[error("invalid tx power: {0}")]
    InvalidTxPower(String),

    /// Command text is too long for the firmware line buffer.
    #[error("buffer overflow: max {max} bytes, got {actual}")]
    BufferOverflow { max: usize, actual: usize },
}

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
