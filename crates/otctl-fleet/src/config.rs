//! Fleet configuration.
//!
//! Loaded from YAML; every field has a default so a partial (or missing) file is
//! fine. Network parameters are validated once, when the fleet is built, and are
//! immutable afterwards.

use std::path::Path;
use std::time::Duration;

use otctl_cli_protocol::{parse_pan_id, validate_channel, validate_network_key};
use otctl_transport::PortSettings;
use serde::{Deserialize, Serialize};

use crate::error::{FleetError, FleetResult};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Thread network parameters shared by every device.
    pub network: NetworkConfig,
    /// Where to look for devices.
    pub discovery: DiscoveryConfig,
    /// Serial line parameters.
    pub serial: SerialConfig,
    /// Delays between commands and operations.
    pub timing: TimingConfig,
}

impl FleetConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> FleetResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> FleetResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| FleetError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }
}

/// Thread network parameters, as written in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// IEEE 802.15.4 channel (11-26).
    pub channel: u8,
    /// PAN ID, hex (`0xabcd`) or decimal.
    pub pan_id: String,
    /// Network key as 32 hex characters.
    pub network_key: String,
    /// Transmit power of the router device in dBm.
    pub router_tx_power: i8,
    /// Transmit power of child devices in dBm.
    pub child_tx_power: i8,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            channel: 15,
            pan_id: "0xabcd".to_string(),
            network_key: "00112233445566778899aabbccddeeff".to_string(),
            router_tx_power: 0,
            child_tx_power: -40,
        }
    }
}

impl NetworkConfig {
    /// Check every parameter and produce the values commands are built from.
    pub fn validate(&self) -> FleetResult<NetworkParams> {
        let channel = validate_channel(self.channel)?;
        let pan_id = parse_pan_id(&self.pan_id)?;
        validate_network_key(&self.network_key)?;

        Ok(NetworkParams {
            channel,
            pan_id,
            network_key: self.network_key.clone(),
            router_tx_power: self.router_tx_power,
            child_tx_power: self.child_tx_power,
        })
    }
}

/// Validated network parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkParams {
    /// Channel.
    pub channel: u8,
    /// PAN ID.
    pub pan_id: u16,
    /// Network key, passed through unchanged.
    pub network_key: String,
    /// Router transmit power in dBm.
    pub router_tx_power: i8,
    /// Child transmit power in dBm.
    pub child_tx_power: i8,
}

/// Candidate device paths and distinguished-device markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Path prefix; the index is appended (`/dev/ttyACM` + `1`).
    pub device_prefix: String,
    /// First index tried.
    pub first_index: u32,
    /// Last index tried (inclusive).
    pub last_index: u32,
    /// Version-string marker identifying the TTM reference unit.
    pub ttm_marker: String,
    /// Command line sent to read the version string.
    pub ttm_query: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        DiscoveryConfig {
            device_prefix: "/dev/ttyACM".to_string(),
            first_index: 1,
            last_index: 19,
            ttm_marker: "NRF52840".to_string(),
            ttm_query: "version".to_string(),
        }
    }
}

impl DiscoveryConfig {
    /// Every candidate path, in probing order.
    pub fn candidate_paths(&self) -> Vec<String> {
        (self.first_index..=self.last_index)
            .map(|i| format!("{}{}", self.device_prefix, i))
            .collect()
    }
}

/// Serial line profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerialProfile {
    /// 115200 baud, no parity.
    #[default]
    Standard,
    /// 38400 baud, even parity.
    Legacy,
}

/// Serial line parameters.
///
/// Only the profile is selectable. Timeouts are fixed at 0.1 s for reads and
/// 1.0 s for writes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Baud rate / parity profile.
    pub profile: SerialProfile,
}

impl SerialConfig {
    /// Settings every configuration and control session is opened with.
    pub fn port_settings(&self) -> PortSettings {
        match self.profile {
            SerialProfile::Standard => PortSettings::standard(),
            SerialProfile::Legacy => PortSettings::legacy(),
        }
    }
}

/// Fixed delays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Pause after each command of a sequence.
    pub settle_ms: u64,
    /// Pause between `reset` and the wake-up line; must exceed the device reboot time.
    pub reboot_settle_ms: u64,
    /// Pause between stop and start during a soft restart.
    pub restart_pause_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            settle_ms: 100,
            reboot_settle_ms: 5000,
            restart_pause_ms: 2000,
        }
    }
}

impl TimingConfig {
    /// No delays at all; for simulated devices.
    pub fn immediate() -> Self {
        TimingConfig {
            settle_ms: 0,
            reboot_settle_ms: 0,
            restart_pause_ms: 0,
        }
    }

    /// Settle delay as a duration.
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// Reboot settle window as a duration.
    pub fn reboot_settle(&self) -> Duration {
        Duration::from_millis(self.reboot_settle_ms)
    }

    /// Restart pause as a duration.
    pub fn restart_pause(&self) -> Duration {
        Duration::from_millis(self.restart_pause_ms)
    }
}

/// Sleep for `duration`, skipping zero-length pauses.
pub(crate) fn pause(duration: Duration) {
    if !duration.is_zero() {
        std::thread::sleep(duration);
    }
}
