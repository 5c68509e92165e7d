//! Commands that can be sent to the OpenThread CLI.
//!
//! The same command vocabulary is rendered differently depending on the
//! [`CliDialect`] of the board: the Zephyr shell needs an `ot ` prefix, the
//! native OpenThread CLI does not.

use crate::codec::{LineCodec, MAX_LINE_LENGTH};
use crate::error::{CliError, CliResult};

/// Mode flags for a router-capable Full Thread Device (rx-on, FTD, full network data).
pub const MODE_ROUTER: &str = "rdn";

/// Mode flags for a Minimal Thread Device that stays a child.
pub const MODE_CHILD: &str = "rn";

/// How OpenThread commands are addressed on a given shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CliDialect {
    /// Zephyr shell: `ot <command>`.
    #[default]
    Zephyr,
    /// Native OpenThread CLI: `<command>`.
    Native,
}

impl CliDialect {
    /// Prefix placed in front of every OpenThread command.
    pub fn prefix(&self) -> &'static str {
        match self {
            CliDialect::Zephyr => "ot ",
            CliDialect::Native => "",
        }
    }
}

/// Commands that can be sent to an OpenThread device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A bare line terminator; wakes the shell and clears any partial input.
    Wake,

    // ========== Identification ==========
    /// Report the platform name.
    Platform,

    /// Report the OpenThread version string.
    Version,

    /// Report the current Thread role.
    State,

    // ========== Radio / Mode ==========
    /// Set the transmit power in dBm.
    TxPower {
        /// Transmit power in dBm.
        dbm: i8,
    },

    /// Set the device operating mode flags (e.g. `rdn`, `rn`).
    Mode {
        /// Mode flag string.
        flags: String,
    },

    // ========== Dataset ==========
    /// Initialise a new pending dataset buffer.
    DatasetInitNew,

    /// Set the dataset channel.
    DatasetChannel {
        /// IEEE 802.15.4 channel (11-26).
        channel: u8,
    },

    /// Set the dataset network key.
    DatasetNetworkKey {
        /// 32 hex characters, passed through unchanged.
        key: String,
    },

    /// Set the dataset PAN ID.
    DatasetPanId {
        /// 16-bit PAN ID.
        pan_id: u16,
    },

    /// Commit the dataset buffer as the active dataset.
    DatasetCommitActive,

    // ========== Interface / Stack ==========
    /// Bring the IPv6 interface up.
    IfconfigUp,

    /// Bring the IPv6 interface down.
    IfconfigDown,

    /// Start the Thread protocol.
    ThreadStart,

    /// Stop the Thread protocol.
    ThreadStop,

    /// Reboot the device.
    Reset,

    // ========== Raw Command ==========
    /// A raw command line, sent exactly as given (no dialect prefix).
    Raw {
        /// The raw command text.
        command: String,
    },
}

impl Command {
    /// Build a raw command, rejecting lines the firmware would truncate.
    pub fn raw(command: impl Into<String>) -> CliResult<Command> {
        let command = command.into();
        if command.len() > MAX_LINE_LENGTH {
            return Err(CliError::BufferOverflow {
                max: MAX_LINE_LENGTH,
                actual: command.len(),
            });
        }
        Ok(Command::Raw { command })
    }

    /// Encode the command as a line to send to the firmware.
    /// Returns the bytes to send (including the `\r\n` terminator).
    pub fn encode(&self, dialect: CliDialect) -> Vec<u8> {
        LineCodec::encode_command(&self.to_command_string(dialect))
    }

    /// Get the command string without the terminator.
    pub fn to_command_string(&self, dialect: CliDialect) -> String {
        let body = match self {
            Command::Wake => return String::new(),
            Command::Raw { command } => return command.clone(),

            Command::Platform => "platform".to_string(),
            Command::Version => "version".to_string(),
            Command::State => "state".to_string(),

            Command::TxPower { dbm } => format!("txpower {}", dbm),
            Command::Mode { flags } => format!("mode {}", flags),

            Command::DatasetInitNew => "dataset init new".to_string(),
            Command::DatasetChannel { channel } => format!("dataset channel {}", channel),
            Command::DatasetNetworkKey { key } => format!("dataset networkkey {}", key),
            Command::DatasetPanId { pan_id } => format!("dataset panid 0x{:04x}", pan_id),
            Command::DatasetCommitActive => "dataset commit active".to_string(),

            Command::IfconfigUp => "ifconfig up".to_string(),
            Command::IfconfigDown => "ifconfig down".to_string(),
            Command::ThreadStart => "thread start".to_string(),
            Command::ThreadStop => "thread stop".to_string(),
            Command::Reset => "reset".to_string(),
        };
        format!("{}{}", dialect.prefix(), body)
    }
}

/// Validate an IEEE 802.15.4 2.4 GHz channel number.
pub fn validate_channel(channel: u8) -> CliResult<u8> {
    if (11..=26).contains(&channel) {
        Ok(channel)
    } else {
        Err(CliError::InvalidChannel(channel))
    }
}

/// Parse a PAN ID given either as `0x`-prefixed hex or as decimal.
pub fn parse_pan_id(text: &str) -> CliResult<u16> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex_digits) => u16::from_str_radix(hex_digits, 16),
        None => text.parse::<u16>(),
    };
    parsed.map_err(|_| CliError::InvalidPanId(text.to_string()))
}

/// Check that a network key is exactly 16 bytes of hex.
///
/// The key itself is passed to the firmware unchanged.
pub fn validate_network_key(key: &str) -> CliResult<()> {
    match hex::decode(key) {
        Ok(bytes) if bytes.len() == 16 => Ok(()),
        Ok(bytes) => Err(CliError::InvalidNetworkKey(format!(
            "expected 16 bytes, got {}",
            bytes.len()
        ))),
        Err(e) => Err(CliError::InvalidNetworkKey(e.to_string())),
    }
}

/// Parse a transmit power in dBm.
pub fn parse_tx_power(text: &str) -> CliResult<i8> {
    text.trim()
        .parse::<i8>()
        .map_err(|_| CliError::InvalidTxPower(text.trim().to_string()))
}
