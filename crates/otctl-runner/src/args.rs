//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use otctl_fleet::{FleetConfig, FleetResult, SerialProfile};

/// Discover, provision and query OpenThread devices attached over serial.
#[derive(Debug, Parser)]
#[command(name = "otctl")]
#[command(version)]
pub struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Thread channel (11-26)
    #[arg(long)]
    pub channel: Option<u8>,

    /// PAN ID, hex (0xabcd) or decimal
    #[arg(long)]
    pub pan_id: Option<String>,

    /// Network key as 32 hex characters
    #[arg(long)]
    pub network_key: Option<String>,

    /// Device path prefix the probe index is appended to
    #[arg(long)]
    pub device_prefix: Option<String>,

    /// Use the legacy serial profile (38400 baud, even parity)
    #[arg(long)]
    pub legacy: bool,

    /// Run a single console command and exit
    #[arg(short, long, value_name = "COMMAND")]
    pub exec: Option<String>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Args {
    /// Load the configuration file, if any, and apply command-line overrides.
    pub fn load_config(&self) -> FleetResult<FleetConfig> {
        let mut config = match &self.config {
            Some(path) => FleetConfig::from_file(path)?,
            None => FleetConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    /// Apply command-line overrides on top of `config`.
    pub fn apply_overrides(&self, config: &mut FleetConfig) {
        if let Some(channel) = self.channel {
            config.network.channel = channel;
        }
        if let Some(pan_id) = &self.pan_id {
            config.network.pan_id = pan_id.clone();
        }
        if let Some(key) = &self.network_key {
            config.network.network_key = key.clone();
        }
        if let Some(prefix) = &self.device_prefix {
            config.discovery.device_prefix = prefix.clone();
        }
        if self.legacy {
            config.serial.profile = SerialProfile::Legacy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["otctl"]).unwrap();
        assert!(args.config.is_none());
        assert!(args.exec.is_none());
        assert_eq!(args.log_level, "warn");

        let config = args.load_config().unwrap();
        assert_eq!(config, FleetConfig::default());
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "otctl",
            "--channel",
            "20",
            "--pan-id",
            "0x1234",
            "--device-prefix",
            "/dev/ttyUSB",
            "--legacy",
            "--exec",
            "find",
        ])
        .unwrap();

        let config = args.load_config().unwrap();
        assert_eq!(config.network.channel, 20);
        assert_eq!(config.network.pan_id, "0x1234");
        assert_eq!(config.discovery.device_prefix, "/dev/ttyUSB");
        assert_eq!(config.serial.profile, SerialProfile::Legacy);
        assert_eq!(args.exec.as_deref(), Some("find"));
    }

    #[test]
    fn test_missing_config_file() {
        let args = Args::try_parse_from(["otctl", "--config", "/nonexistent/otctl.yaml"]).unwrap();
        assert!(args.load_config().is_err());
    }
}
