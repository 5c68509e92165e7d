//! Interactive console for provisioning OpenThread CLI device fleets.
//!
//! The console reads one verb per line (`config`, `find`, `start`, `state`, ...),
//! dispatches it onto an [`otctl_fleet::Fleet`] and prints the result through the
//! pure formatting functions in [`report`]. The `otctl` binary wires it to the
//! real serial ports; tests wire it to simulated ones.

mod args;
mod dispatch;
mod error;
pub mod report;

pub use args::Args;
pub use dispatch::{Console, Flow, Verb, PROMPT};
pub use error::{RunnerError, RunnerResult};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` applies to the otctl crates only.
pub fn init_tracing(level: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "otctl_fleet={level},otctl_transport={level},\
             otctl_cli_protocol={level},otctl_runner={level}",
            level = level
        ))
    });

    // stdout carries console output; logs go to stderr.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
