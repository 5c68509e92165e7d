//! Error types for the console.

use otctl_cli_protocol::CliError;
use otctl_fleet::FleetError;
use thiserror::Error;

/// Errors that can occur while running the console.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Fleet setup or operation failure.
    #[error(transparent)]
    Fleet(#[from] FleetError),

    /// Reading input or writing output failed.
    #[error("console I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input line names no known verb.
    #[error("unknown command!")]
    UnknownVerb(String),

    /// A verb was given without its required argument.
    #[error("'{verb}' needs an argument: {usage}")]
    MissingArgument {
        /// Verb name.
        verb: &'static str,
        /// Usage line.
        usage: &'static str,
    },

    /// A verb argument could not be parsed.
    #[error(transparent)]
    InvalidArgument(#[from] CliError),
}

/// Result type alias for console operations.
pub type RunnerResult<T> = Result<T, RunnerError>;
