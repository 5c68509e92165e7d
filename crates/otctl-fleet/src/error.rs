//! Error types for fleet operations.

use otctl_cli_protocol::CliError;
use otctl_transport::TransportError;
use thiserror::Error;

/// Errors that can occur while discovering or driving devices.
#[derive(Debug, Error)]
pub enum FleetError {
    /// Serial transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A network parameter could not be turned into a command.
    #[error("invalid network parameter: {0}")]
    InvalidParameter(#[from] CliError),

    /// An operation needs at least one discovered device.
    #[error("no thread devices discovered")]
    NoDevices,

    /// A distinguished-device probe found no match.
    #[error("no device matching '{marker}' found")]
    DeviceNotFound {
        /// Marker that was searched for.
        marker: String,
    },

    /// A checked step was not acknowledged with `Done`.
    #[error("{device}: '{command}' failed: {response}")]
    CommandFailed {
        /// Device path.
        device: String,
        /// Command line that was sent.
        command: String,
        /// Normalized reply text.
        response: String,
    },

    /// Transmit power outside the allowed set.
    #[error("tx power {0} dBm not allowed (use 0, -20 or -40)")]
    InvalidTxPower(i8),

    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        /// Config file path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for [`crate::FleetConfig`].
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
}

impl FleetError {
    /// Short, single-line description of the failed step for operator output.
    pub fn diagnosis(&self) -> String {
        match self {
            FleetError::Transport(e) if e.is_timeout() => format!("timed out ({})", e.kind()),
            FleetError::Transport(TransportError::Unavailable { reason, .. }) => {
                format!("port unavailable: {}", reason)
            }
            FleetError::CommandFailed { command, .. } => format!("'{}' not acknowledged", command),
            other => other.to_string(),
        }
    }
}

/// Result type alias for fleet operations.
pub type FleetResult<T> = Result<T, FleetError>;
