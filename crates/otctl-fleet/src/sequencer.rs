//! Ordered command sequences against one device.
//!
//! Serial CLIs are not flow controlled, so every command is followed by a fixed
//! settle delay before the next one is written. A transport failure ends the
//! sequence; commands already applied are not rolled back.

use std::time::{Duration, Instant};

use otctl_cli_protocol::{classify_command_result, normalize_response, CliDialect, Command};
use otctl_metrics::{metric_defs, DeviceLabels};
use otctl_transport::{PortFactory, PortSettings, Session, TransportError, TransportResult};
use tracing::{debug, trace, warn};

use crate::config::{pause, NetworkParams};
use crate::device::{DeviceHandle, RoleProfile};
use crate::error::{FleetError, FleetResult};
use crate::outcome::CommandOutcome;

/// Steps that bring a configured device onto the network.
const START_STEPS: [Command; 2] = [Command::IfconfigUp, Command::ThreadStart];

/// Steps that take a device off the network.
const STOP_STEPS: [Command; 2] = [Command::ThreadStop, Command::IfconfigDown];

/// The commands that provision a device for `profile`.
///
/// Every role runs the same sequence; only the mode flags and transmit power differ.
pub fn role_sequence(profile: &RoleProfile, network: &NetworkParams) -> Vec<Command> {
    vec![
        Command::Wake,
        Command::TxPower { dbm: profile.tx_power },
        Command::Mode { flags: profile.mode.clone() },
        Command::DatasetInitNew,
        Command::DatasetChannel { channel: network.channel },
        Command::DatasetNetworkKey { key: network.network_key.clone() },
        Command::DatasetPanId { pan_id: network.pan_id },
        Command::DatasetCommitActive,
    ]
}

/// Commands that stop the stack without checking each step.
pub fn soft_reset_sequence() -> Vec<Command> {
    vec![Command::Wake, Command::ThreadStop, Command::IfconfigDown]
}

/// Result of one [`Sequencer::run_sequence`] call.
#[derive(Debug)]
pub struct SequenceReport {
    /// Device path.
    pub device: String,
    /// One outcome per command that got a reply, in order.
    pub outcomes: Vec<CommandOutcome>,
    /// Transport failure that ended the sequence early.
    pub error: Option<TransportError>,
}

impl SequenceReport {
    /// Check if every command was delivered.
    pub fn completed(&self) -> bool {
        self.error.is_none()
    }

    /// Replies that were not acknowledged with `Done`, ignoring wake-up lines.
    pub fn unacknowledged(&self) -> impl Iterator<Item = &CommandOutcome> {
        self.outcomes
            .iter()
            .filter(|o| !o.command.is_empty() && !o.status.is_done())
    }
}

/// Sends commands to single devices through short-lived sessions.
pub struct Sequencer<'a> {
    factory: &'a dyn PortFactory,
    settings: PortSettings,
    settle: Duration,
}

impl<'a> Sequencer<'a> {
    /// Create a sequencer pausing `settle` after every command.
    pub fn new(factory: &'a dyn PortFactory, settings: PortSettings, settle: Duration) -> Self {
        Sequencer {
            factory,
            settings,
            settle,
        }
    }

    /// Open a session on `path` and drop anything the device already sent.
    pub fn open(&self, path: &str) -> TransportResult<Session> {
        let mut session = Session::open(self.factory, path, &self.settings)?;
        if let Err(e) = session.flush_input() {
            trace!("{}: flush failed ({})", path, e);
        }
        Ok(session)
    }

    /// Send `commands` in order through a fresh session.
    ///
    /// Replies are classified but never end the sequence; only transport errors do.
    pub fn run_sequence(&self, device: &DeviceHandle, commands: &[Command]) -> SequenceReport {
        let started = Instant::now();
        let labels = DeviceLabels::new(device.path.as_str(), device.platform.as_str()).to_labels();
        let mut report = SequenceReport {
            device: device.path.clone(),
            outcomes: Vec::with_capacity(commands.len()),
            error: None,
        };

        let mut session = match self.open(&device.path) {
            Ok(session) => session,
            Err(e) => {
                self.record_transport_error(&device.path, &e);
                report.error = Some(e);
                return report;
            }
        };

        let dialect = device.dialect();
        for command in commands {
            let line = command.to_command_string(dialect);
            match session.exchange(command, dialect) {
                Ok(raw) => {
                    metrics::counter!(metric_defs::COMMANDS_SENT.name, &labels).increment(1);
                    let outcome = CommandOutcome::new(device.path.as_str(), line, raw);
                    if !outcome.status.is_done() && !matches!(command, Command::Wake) {
                        metrics::counter!(metric_defs::COMMANDS_FAILED.name, &labels).increment(1);
                        debug!("{}: '{}' -> {}", device.path, outcome.command, outcome.status);
                    }
                    report.outcomes.push(outcome);
                }
                Err(e) => {
                    warn!("{}: sequence aborted at '{}': {}", device.path, line, e);
                    self.record_transport_error(&device.path, &e);
                    report.error = Some(e);
                    break;
                }
            }
            pause(self.settle);
        }

        metrics::histogram!(metric_defs::SEQUENCE_DURATION.name, &labels)
            .record(started.elapsed().as_secs_f64() * 1000.0);
        report
    }

    /// Write `commands` without waiting for replies.
    ///
    /// Used for commands after which the device may not answer at all, like `reset`.
    pub fn send_only(&self, device: &DeviceHandle, commands: &[Command]) -> TransportResult<()> {
        let mut session = self.open(&device.path)?;
        let dialect = device.dialect();
        for command in commands {
            session
                .write_line(&command.to_command_string(dialect))
                .map_err(|e| {
                    self.record_transport_error(&device.path, &e);
                    e
                })?;
        }
        Ok(())
    }

    /// Send a bare line and discard whatever it produces.
    pub fn wake(&self, session: &mut Session) -> TransportResult<()> {
        session.write_line("")?;
        pause(self.settle);
        session.flush_input()
    }

    /// Bring the interface up, then start the Thread stack.
    pub fn start_stack(&self, session: &mut Session, dialect: CliDialect) -> FleetResult<()> {
        self.run_checked(session, &START_STEPS, dialect)
    }

    /// Stop the Thread stack, then bring the interface down.
    pub fn stop_stack(&self, session: &mut Session, dialect: CliDialect) -> FleetResult<()> {
        self.run_checked(session, &STOP_STEPS, dialect)
    }

    /// Run steps in order, stopping at the first one not acknowledged with `Done`.
    fn run_checked(
        &self,
        session: &mut Session,
        steps: &[Command],
        dialect: CliDialect,
    ) -> FleetResult<()> {
        for step in steps {
            let line = step.to_command_string(dialect);
            let raw = session.exchange(step, dialect).map_err(|e| {
                self.record_transport_error(session.path(), &e);
                e
            })?;
            let device = session.path().to_string();
            metrics::counter!(metric_defs::COMMANDS_SENT.name, "device" => device.clone())
                .increment(1);

            if !classify_command_result(&raw).is_done() {
                metrics::counter!(metric_defs::COMMANDS_FAILED.name, "device" => device)
                    .increment(1);
                return Err(FleetError::CommandFailed {
                    device: session.path().to_string(),
                    command: line.clone(),
                    response: normalize_response(&raw, &line),
                });
            }
            pause(self.settle);
        }
        Ok(())
    }

    fn record_transport_error(&self, path: &str, error: &TransportError) {
        metrics::counter!(
            metric_defs::TRANSPORT_ERRORS.name,
            "device" => path.to_string(),
            "kind" => error.kind()
        )
        .increment(1);
    }
}
