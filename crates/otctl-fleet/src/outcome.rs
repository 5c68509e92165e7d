//! Structured results of fleet operations.
//!
//! These carry device ids, raw reply text and classified status; formatting for
//! the operator is left to the caller.

use std::collections::BTreeMap;

use otctl_cli_protocol::{classify_outcome, normalize_response, CommandStatus, ThreadRole};

use crate::error::FleetError;

/// The result of one command sent to one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Device path.
    pub device: String,
    /// Command line as sent.
    pub command: String,
    /// Reply text after the echo line.
    pub raw: String,
    /// Classified status.
    pub status: CommandStatus,
}

impl CommandOutcome {
    /// Classify a reply.
    pub fn new(
        device: impl Into<String>,
        command: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        let raw = raw.into();
        CommandOutcome {
            device: device.into(),
            command: command.into(),
            status: classify_outcome(&raw),
            raw,
        }
    }

    /// The reply folded to one line without echo or prompts.
    pub fn normalized(&self) -> String {
        normalize_response(&self.raw, &self.command)
    }
}

/// A device an operation could not be completed on.
#[derive(Debug)]
pub struct DeviceFailure {
    /// Device path.
    pub device: String,
    /// What went wrong.
    pub error: FleetError,
}

/// Per-device results of one fleet-wide operation.
#[derive(Debug, Default)]
pub struct FleetReport {
    /// Devices the operation completed on.
    pub succeeded: Vec<String>,
    /// Devices it failed on.
    pub failed: Vec<DeviceFailure>,
    /// Replies not acknowledged with `Done` on devices that otherwise completed.
    pub unacknowledged: Vec<CommandOutcome>,
}

impl FleetReport {
    /// Record a per-device result.
    pub fn record(&mut self, device: &str, result: Result<(), FleetError>) {
        match result {
            Ok(()) => self.succeeded.push(device.to_string()),
            Err(error) => self.failed.push(DeviceFailure {
                device: device.to_string(),
                error,
            }),
        }
    }

    /// Check if every device succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of devices the operation was attempted on.
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// The classified Thread role of one device.
#[derive(Debug)]
pub struct DeviceStatus {
    /// Device path.
    pub device: String,
    /// Classified role; `Unknown` when the query failed.
    pub role: ThreadRole,
    /// Query failure, if any.
    pub error: Option<FleetError>,
}

/// Results of sending one raw command to every device.
#[derive(Debug, Default)]
pub struct BroadcastReport {
    /// Replies from devices that answered.
    pub outcomes: Vec<CommandOutcome>,
    /// Devices the command could not be delivered to.
    pub failed: Vec<DeviceFailure>,
}

/// Group device ids by identical normalized reply.
pub fn group_by_response(outcomes: &[CommandOutcome]) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for outcome in outcomes {
        groups
            .entry(outcome.normalized())
            .or_default()
            .push(outcome.device.clone());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_classification() {
        let ok = CommandOutcome::new("/dev/ttyACM1", "ot ifconfig up", "Done\r\n> ");
        assert_eq!(ok.status, CommandStatus::Done);

        let err = CommandOutcome::new("/dev/ttyACM1", "ot bogus", "Error 35: InvalidCommand\r\n> ");
        assert_eq!(err.status, CommandStatus::Unrecognized);
        assert_eq!(err.normalized(), "Error 35: InvalidCommand");
    }

    #[test]
    fn test_group_by_response() {
        let outcomes = vec![
            CommandOutcome::new("/dev/ttyACM1", "ot state", "leader\r\nDone\r\n> "),
            CommandOutcome::new("/dev/ttyACM2", "ot state", "child\r\nDone\r\n> "),
            CommandOutcome::new("/dev/ttyACM3", "ot state", "child\r\nDone\r\n> "),
        ];

        let groups = group_by_response(&outcomes);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["leader Done"], vec!["/dev/ttyACM1".to_string()]);
        assert_eq!(
            groups["child Done"],
            vec!["/dev/ttyACM2".to_string(), "/dev/ttyACM3".to_string()]
        );
    }

    #[test]
    fn test_fleet_report_record() {
        let mut report = FleetReport::default();
        report.record("/dev/ttyACM1", Ok(()));
        report.record("/dev/ttyACM2", Err(FleetError::NoDevices));

        assert_eq!(report.attempted(), 2);
        assert!(!report.all_succeeded());
        assert_eq!(report.failed[0].device, "/dev/ttyACM2");
    }
}
