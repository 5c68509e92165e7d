//! Operator-facing text for fleet results.
//!
//! Every function here is pure: it turns a structured result into the lines
//! printed at the prompt.

use otctl_fleet::{
    group_by_response, BroadcastReport, CommandOutcome, DeviceHandle, DeviceStatus, FleetReport,
};

/// Verb list shown by `help`.
const HELP: &[(&str, &str)] = &[
    ("config", "configure thread devices"),
    ("find", "find number of thread devices"),
    ("find ttm", "find the TTM thread device and report its tty allocation"),
    ("list", "list found thread devices"),
    ("reset", "stop the thread stack on all devices"),
    ("reboot", "reboot all thread devices"),
    ("restart", "restart all thread devices"),
    ("start", "start the thread devices"),
    ("stop", "stop the thread devices"),
    ("state", "show status of all thread devices"),
    ("ttmpower <dBm>", "set TTM device tx power (0, -20 or -40)"),
    ("send <command>", "send a raw command to all devices"),
    ("ports", "list serial ports"),
    ("quit", "quit"),
];

/// The `help` menu.
pub fn help_text() -> String {
    let mut text = String::from("help menu:\n");
    for (verb, description) in HELP {
        text.push_str(&format!("{:<16}{}\n", verb, description));
    }
    text
}

/// Result of a discovery pass.
pub fn discovery_summary(count: usize) -> String {
    if count == 0 {
        "no thread devices found!".to_string()
    } else {
        format!("found {} thread devices", count)
    }
}

/// One line per known device.
pub fn device_list(devices: &[DeviceHandle]) -> String {
    devices
        .iter()
        .map(|d| format!("{} ({})\n", d.path, d.platform))
        .collect()
}

/// One line per device with its role assignment after `config`.
pub fn topology_summary(devices: &[DeviceHandle]) -> String {
    devices
        .iter()
        .map(|d| format!("[{}] configured as {}\n", d.path, d.topology.as_str()))
        .collect()
}

/// One line per device with its classified Thread role.
pub fn state_lines(statuses: &[DeviceStatus]) -> String {
    statuses
        .iter()
        .map(|s| match &s.error {
            None => format!("[{}] thread state = {}\n", s.device, s.role),
            Some(e) => format!("[{}] thread state = {} ({})\n", s.device, s.role, e.diagnosis()),
        })
        .collect()
}

/// Failures and unacknowledged replies of a fleet operation, then `done`.
pub fn fleet_summary(action: &str, report: &FleetReport) -> String {
    let mut text = String::new();
    for failure in &report.failed {
        text.push_str(&format!(
            "failed to {} {}: {}\n",
            action,
            failure.device,
            failure.error.diagnosis()
        ));
    }
    for outcome in &report.unacknowledged {
        text.push_str(&outcome_line(outcome));
    }
    text.push_str("done\n");
    text
}

/// A single command result.
pub fn outcome_line(outcome: &CommandOutcome) -> String {
    format!(
        "[{}] '{}' -> {}: {}\n",
        outcome.device,
        outcome.command,
        outcome.status,
        outcome.normalized()
    )
}

/// Result of the TTM search.
pub fn ttm_location(path: Option<&str>) -> String {
    match path {
        Some(path) => format!("TTM on port {}", path),
        None => "unable to find TTM".to_string(),
    }
}

/// Broadcast replies grouped by identical normalized text.
pub fn broadcast_groups(report: &BroadcastReport) -> String {
    let mut text = String::new();
    for (response, devices) in group_by_response(&report.outcomes) {
        let response = if response.is_empty() { "(no reply)" } else { response.as_str() };
        text.push_str(&format!("{}: {}\n", response, devices.join(", ")));
    }
    for failure in &report.failed {
        text.push_str(&format!("[{}] {}\n", failure.device, failure.error.diagnosis()));
    }
    text
}

/// Serial ports reported by the operating system.
pub fn port_list(ports: &[String]) -> String {
    let mut text = format!("{} serial devices found:\n", ports.len());
    for port in ports {
        text.push_str(port);
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use otctl_cli_protocol::{PlatformFamily, ThreadRole};
    use otctl_fleet::{DeviceFailure, FleetError};

    #[test]
    fn test_discovery_summary() {
        assert_eq!(discovery_summary(0), "no thread devices found!");
        assert_eq!(discovery_summary(3), "found 3 thread devices");
    }

    #[test]
    fn test_state_lines() {
        let statuses = vec![
            DeviceStatus {
                device: "/dev/ttyACM1".to_string(),
                role: ThreadRole::Leader,
                error: None,
            },
            DeviceStatus {
                device: "/dev/ttyACM2".to_string(),
                role: ThreadRole::Unknown,
                error: Some(FleetError::NoDevices),
            },
        ];
        let text = state_lines(&statuses);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "[/dev/ttyACM1] thread state = leader");
        assert!(lines[1].starts_with("[/dev/ttyACM2] thread state = unknown ("));
    }

    #[test]
    fn test_broadcast_groups() {
        let report = BroadcastReport {
            outcomes: vec![
                CommandOutcome::new("/dev/ttyACM1", "ot channel", "15\r\nDone\r\n> "),
                CommandOutcome::new("/dev/ttyACM2", "ot channel", "15\r\nDone\r\n> "),
                CommandOutcome::new("/dev/ttyACM3", "ot channel", "\r\n"),
            ],
            failed: vec![DeviceFailure {
                device: "/dev/ttyACM4".to_string(),
                error: FleetError::NoDevices,
            }],
        };

        let text = broadcast_groups(&report);
        assert!(text.contains("15 Done: /dev/ttyACM1, /dev/ttyACM2\n"));
        assert!(text.contains("(no reply): /dev/ttyACM3\n"));
        assert!(text.contains("[/dev/ttyACM4] "));
    }

    #[test]
    fn test_fleet_summary() {
        let mut report = FleetReport::default();
        report.record("/dev/ttyACM1", Ok(()));
        report.record(
            "/dev/ttyACM2",
            Err(FleetError::CommandFailed {
                device: "/dev/ttyACM2".to_string(),
                command: "ot ifconfig up".to_string(),
                response: "Error 13: InvalidState".to_string(),
            }),
        );

        assert_eq!(
            fleet_summary("start", &report),
            "failed to start /dev/ttyACM2: 'ot ifconfig up' not acknowledged\ndone\n"
        );
    }

    #[test]
    fn test_device_list() {
        let devices = vec![
            DeviceHandle::new("/dev/ttyACM1", PlatformFamily::ZephyrNRF),
            DeviceHandle::new("/dev/ttyACM2", PlatformFamily::EFR32),
        ];
        assert_eq!(
            device_list(&devices),
            "/dev/ttyACM1 (zephyr-nrf)\n/dev/ttyACM2 (efr32)\n"
        );
    }

    #[test]
    fn test_help_lists_every_verb() {
        let help = help_text();
        for verb in ["config", "find ttm", "ttmpower", "send", "ports", "quit"] {
            assert!(help.contains(verb), "help is missing {}", verb);
        }
    }
}
