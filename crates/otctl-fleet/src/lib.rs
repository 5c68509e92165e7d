//! Discovery, command sequencing and fleet orchestration for OpenThread CLI
//! devices.
//!
//! This crate provides:
//! - **Device Prober** ([`Prober`]): finds CLI-speaking boards among candidate
//!   serial paths and classifies their platform family
//! - **Command Sequencer** ([`Sequencer`]): runs ordered command lists against one
//!   device with a settle delay after each command
//! - **Fleet Orchestrator** ([`Fleet`]): owns the [`DeviceRegistry`] and provisions,
//!   starts, stops, resets and queries every registered device
//! - **Configuration** ([`FleetConfig`]): YAML-backed network, discovery, serial
//!   and timing parameters
//!
//! Everything runs on the calling thread, one device at a time. Operations return
//! structured reports (device path, raw reply, classified status); formatting is
//! left to the caller.
//!
//! # Example
//!
//! ```rust
//! use otctl_fleet::{Fleet, FleetConfig, TimingConfig};
//! use otctl_transport::mock::{MockDevice, MockPortFactory};
//!
//! let factory = MockPortFactory::new();
//! factory.add_device(
//!     "/dev/ttyACM1",
//!     MockDevice::with_replies([("ot platform", "Zephyr\r\nDone\r\n")], "Done\r\n"),
//! );
//!
//! let config = FleetConfig {
//!     timing: TimingConfig::immediate(),
//!     ..FleetConfig::default()
//! };
//! let mut fleet = Fleet::new(Box::new(factory), config).unwrap();
//! assert_eq!(fleet.discover(), 1);
//! assert_eq!(fleet.device_paths(), vec!["/dev/ttyACM1".to_string()]);
//! ```

mod config;
mod device;
mod error;
mod orchestrator;
mod outcome;
mod prober;
mod sequencer;

pub use config::{
    DiscoveryConfig, FleetConfig, NetworkConfig, NetworkParams, SerialConfig, SerialProfile,
    TimingConfig,
};
pub use device::{DeviceHandle, DeviceLifecycle, DeviceRegistry, RoleProfile, TopologyRole};
pub use error::{FleetError, FleetResult};
pub use orchestrator::{Fleet, TTM_TX_POWERS};
pub use outcome::{
    group_by_response, BroadcastReport, CommandOutcome, DeviceFailure, DeviceStatus, FleetReport,
};
pub use prober::Prober;
pub use sequencer::{role_sequence, soft_reset_sequence, SequenceReport, Sequencer};
