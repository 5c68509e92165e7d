//! Simulated OpenThread boards shared by the fleet integration tests.

#![allow(dead_code)]

use otctl_fleet::{Fleet, FleetConfig, TimingConfig};
use otctl_transport::mock::{MockDevice, MockPortFactory};

/// Which shell the simulated board runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Board {
    /// Zephyr shell; OpenThread commands need the `ot ` prefix.
    Zephyr,
    /// Native OpenThread CLI; commands are sent bare.
    Efr32,
}

/// A board with a small OpenThread CLI model: interface and stack state,
/// mode flags and the resulting role.
pub fn board(kind: Board) -> MockDevice {
    board_with_version(kind, "OPENTHREAD/1.3.0; Zephyr")
}

/// The TTM reference unit.
pub fn ttm() -> MockDevice {
    board_with_version(Board::Zephyr, "OPENTHREAD/NRF52840; Zephyr")
}

pub fn board_with_version(kind: Board, version: &str) -> MockDevice {
    let version = version.to_string();
    let mut interface_up = false;
    let mut role = "disabled";
    let mut mode = String::from("rdn");

    MockDevice::new(move |line| {
        let prompt = match kind {
            Board::Zephyr => "uart:~$ ",
            Board::Efr32 => "> ",
        };
        if line.is_empty() {
            return Some(prompt.to_string());
        }

        let body = match kind {
            // `version` is also a top-level Zephyr shell command.
            Board::Zephyr => line
                .strip_prefix("ot ")
                .or_else(|| (line == "version").then_some(line)),
            Board::Efr32 if line.starts_with("ot ") => None,
            Board::Efr32 => Some(line),
        };
        let Some(body) = body else {
            return Some(match kind {
                Board::Zephyr => format!("{}: command not found\r\n{}", line, prompt),
                Board::Efr32 => format!("Error 35: InvalidCommand\r\n{}", prompt),
            });
        };

        let reply: String = match body {
            "platform" => match kind {
                Board::Zephyr => "Zephyr\r\nDone".to_string(),
                Board::Efr32 => "EFR32\r\nDone".to_string(),
            },
            "version" => format!("{}\r\nDone", version),
            "state" => format!("{}\r\nDone", role),
            "ifconfig up" => {
                interface_up = true;
                "Done".to_string()
            }
            "ifconfig down" => {
                interface_up = false;
                role = "disabled";
                "Done".to_string()
            }
            "thread start" if interface_up => {
                role = if mode == "rdn" { "leader" } else { "child" };
                "Done".to_string()
            }
            "thread start" => "Error 13: InvalidState".to_string(),
            "thread stop" => {
                role = "disabled";
                "Done".to_string()
            }
            "reset" => return None,
            _ if body.starts_with("mode ") => {
                mode = body["mode ".len()..].to_string();
                "Done".to_string()
            }
            _ if body.starts_with("txpower ") || body.starts_with("dataset ") => "Done".to_string(),
            _ => "Error 35: InvalidCommand".to_string(),
        };
        Some(format!("{}\r\n{}", reply, prompt))
    })
}

pub fn path(index: u32) -> String {
    format!("/dev/ttyACM{}", index)
}

/// Default configuration without any delays.
pub fn test_config() -> FleetConfig {
    FleetConfig {
        timing: TimingConfig::immediate(),
        ..FleetConfig::default()
    }
}

pub fn fleet_with(factory: &MockPortFactory) -> Fleet {
    Fleet::new(Box::new(factory.clone()), test_config()).unwrap()
}

/// A factory with one board of `kind` at each of the given indices.
pub fn factory_with(boards: &[(u32, Board)]) -> MockPortFactory {
    let factory = MockPortFactory::new();
    for &(index, kind) in boards {
        factory.add_device(&path(index), board(kind));
    }
    factory
}
