//! Fleet-wide operations over the device registry.
//!
//! Every operation walks the registry serially in discovery order. Per-device
//! failures are logged and collected into the returned report; they never stop
//! the remaining devices from being processed.

use otctl_cli_protocol::{classify_state, CliDialect, Command, ThreadRole};
use otctl_transport::{PortFactory, PortSettings, Session, TransportResult};
use tracing::{debug, info, warn};

use crate::config::{pause, FleetConfig, NetworkParams, TimingConfig};
use crate::device::{DeviceHandle, DeviceLifecycle, DeviceRegistry, RoleProfile, TopologyRole};
use crate::error::{FleetError, FleetResult};
use crate::outcome::{BroadcastReport, CommandOutcome, DeviceFailure, DeviceStatus, FleetReport};
use crate::prober::Prober;
use crate::sequencer::{role_sequence, soft_reset_sequence, Sequencer};

/// Transmit powers the TTM unit accepts, in dBm.
pub const TTM_TX_POWERS: [i8; 3] = [0, -20, -40];

/// Owns the device registry and drives every device in it.
pub struct Fleet {
    factory: Box<dyn PortFactory>,
    config: FleetConfig,
    network: NetworkParams,
    settings: PortSettings,
    registry: DeviceRegistry,
}

impl std::fmt::Debug for Fleet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fleet")
            .field("network", &self.network)
            .field("settings", &self.settings)
            .field("registry", &self.registry)
            .finish()
    }
}

impl Fleet {
    /// Create a fleet with an empty registry.
    ///
    /// Fails if the network parameters in `config` are invalid.
    pub fn new(factory: Box<dyn PortFactory>, config: FleetConfig) -> FleetResult<Self> {
        let network = config.network.validate()?;
        let settings = config.serial.port_settings();
        Ok(Fleet {
            factory,
            config,
            network,
            settings,
            registry: DeviceRegistry::new(),
        })
    }

    /// The configuration the fleet was built from.
    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    /// Validated network parameters.
    pub fn network(&self) -> &NetworkParams {
        &self.network
    }

    /// Number of devices found by the last discovery pass.
    pub fn device_count(&self) -> usize {
        self.registry.len()
    }

    /// Paths of the known devices, in discovery order.
    pub fn device_paths(&self) -> Vec<String> {
        self.registry.paths()
    }

    /// Known devices, in discovery order.
    pub fn devices(&self) -> &[DeviceHandle] {
        self.registry.devices()
    }

    /// Probe every candidate path and replace the registry with what answered.
    ///
    /// Probing always runs at the standard line settings; the configured serial
    /// profile applies to the sessions that follow.
    pub fn discover(&mut self) -> usize {
        let candidates = self.config.discovery.candidate_paths();
        let found = Prober::new(self.factory.as_ref()).probe_all(&candidates);
        info!("discovery found {} device(s)", found.len());
        self.registry.replace(found);
        self.registry.len()
    }

    /// Provision the first device as router and every other device as child.
    pub fn configure_network(&mut self) -> FleetResult<FleetReport> {
        if self.registry.is_empty() {
            return Err(FleetError::NoDevices);
        }

        let sequencer = sequencer_for(self.factory.as_ref(), self.settings, &self.config.timing);
        let router = RoleProfile::router(&self.network);
        let child = RoleProfile::child(&self.network);
        let mut report = FleetReport::default();

        for (index, device) in self.registry.devices_mut().iter_mut().enumerate() {
            let profile = if index == 0 { &router } else { &child };
            info!("{}: configuring as {}", device.path, profile.role.as_str());

            let sequence = sequencer.run_sequence(device, &role_sequence(profile, &self.network));
            report.unacknowledged.extend(sequence.unacknowledged().cloned());
            match sequence.error {
                None => {
                    device.topology = profile.role;
                    device.lifecycle = DeviceLifecycle::Configured;
                    report.record(&device.path, Ok(()));
                }
                Some(e) => {
                    warn!("{}: configuration incomplete: {}", device.path, e);
                    report.record(&device.path, Err(e.into()));
                }
            }
        }
        Ok(report)
    }

    /// Bring every device's interface up and start its Thread stack.
    pub fn start_all(&mut self) -> FleetReport {
        let sequencer = sequencer_for(self.factory.as_ref(), self.settings, &self.config.timing);
        let mut report = FleetReport::default();

        for device in self.registry.devices_mut() {
            let result = with_session(&sequencer, &device.path, |session| {
                sequencer.start_stack(session, device.platform.dialect())
            });
            match &result {
                Ok(()) => device.lifecycle = DeviceLifecycle::Started,
                Err(e) => warn!("{}: failed to start: {}", device.path, e.diagnosis()),
            }
            report.record(&device.path, result);
            pause(self.config.timing.settle());
        }
        report
    }

    /// Stop every device's Thread stack and bring its interface down.
    pub fn stop_all(&mut self) -> FleetReport {
        let sequencer = sequencer_for(self.factory.as_ref(), self.settings, &self.config.timing);
        let mut report = FleetReport::default();

        for device in self.registry.devices_mut() {
            let result = with_session(&sequencer, &device.path, |session| {
                sequencer.stop_stack(session, device.platform.dialect())
            });
            match &result {
                Ok(()) => stopped(device),
                Err(e) => warn!("{}: failed to stop: {}", device.path, e.diagnosis()),
            }
            report.record(&device.path, result);
            pause(self.config.timing.settle());
        }
        report
    }

    /// Stop the stack on every device without checking each step.
    pub fn soft_reset_all_devices(&mut self) -> FleetReport {
        let sequencer = sequencer_for(self.factory.as_ref(), self.settings, &self.config.timing);
        let commands = soft_reset_sequence();
        let mut report = FleetReport::default();

        for device in self.registry.devices_mut() {
            let sequence = sequencer.run_sequence(device, &commands);
            report.unacknowledged.extend(sequence.unacknowledged().cloned());
            match sequence.error {
                None => {
                    device.lifecycle = DeviceLifecycle::Unconfigured;
                    device.topology = TopologyRole::Unassigned;
                    report.record(&device.path, Ok(()));
                }
                Some(e) => {
                    warn!("{}: soft reset incomplete: {}", device.path, e);
                    report.record(&device.path, Err(e.into()));
                }
            }
        }
        report
    }

    /// Stop, pause, then start every device.
    pub fn soft_restart_all_devices(&mut self) -> FleetReport {
        let sequencer = sequencer_for(self.factory.as_ref(), self.settings, &self.config.timing);
        let restart_pause = self.config.timing.restart_pause();
        let mut report = FleetReport::default();

        for device in self.registry.devices_mut() {
            let dialect = device.platform.dialect();
            let result = with_session(&sequencer, &device.path, |session| {
                sequencer.stop_stack(session, dialect)?;
                pause(restart_pause);
                sequencer.start_stack(session, dialect)
            });
            match &result {
                Ok(()) => device.lifecycle = DeviceLifecycle::Started,
                Err(e) => warn!("{}: failed to restart: {}", device.path, e.diagnosis()),
            }
            report.record(&device.path, result);
        }
        report
    }

    /// Reboot every device, wait for the boot to finish, then wake each one.
    ///
    /// The settle window must exceed the slowest device's boot time, or the
    /// wake-up line races the bootloader.
    pub fn reset_all_devices(&mut self) -> FleetReport {
        let sequencer = sequencer_for(self.factory.as_ref(), self.settings, &self.config.timing);
        let mut reset_results: Vec<TransportResult<()>> =
            Vec::with_capacity(self.registry.len());

        info!("resetting {} device(s)", self.registry.len());
        for device in self.registry.devices_mut() {
            let result = sequencer.send_only(device, &[Command::Wake, Command::Reset]);
            if result.is_ok() && device.lifecycle == DeviceLifecycle::Started {
                device.lifecycle = DeviceLifecycle::Configured;
            }
            reset_results.push(result);
        }

        pause(self.config.timing.reboot_settle());

        let mut report = FleetReport::default();
        for (device, reset) in self.registry.devices().iter().zip(reset_results) {
            let result = reset.and_then(|()| sequencer.send_only(device, &[Command::Wake]));
            if let Err(e) = &result {
                warn!("{}: reset failed: {}", device.path, e);
            }
            report.record(&device.path, result.map_err(FleetError::from));
        }
        report
    }

    /// Query and classify the Thread role of every device.
    ///
    /// Caches each classified role on its handle.
    pub fn show_device_state(&mut self) -> Vec<DeviceStatus> {
        let sequencer = sequencer_for(self.factory.as_ref(), self.settings, &self.config.timing);
        let mut statuses = Vec::with_capacity(self.registry.len());

        for device in self.registry.devices_mut() {
            let dialect = device.platform.dialect();
            let query = sequencer
                .open(&device.path)
                .and_then(|mut session| session.exchange(&Command::State, dialect));

            let status = match query {
                Ok(raw) => {
                    let role = classify_state(&raw);
                    debug!("{}: state {}", device.path, role);
                    DeviceStatus {
                        device: device.path.clone(),
                        role,
                        error: None,
                    }
                }
                Err(e) => {
                    warn!("{}: state query failed: {}", device.path, e);
                    DeviceStatus {
                        device: device.path.clone(),
                        role: ThreadRole::Unknown,
                        error: Some(e.into()),
                    }
                }
            };
            device.last_role = status.role;
            statuses.push(status);
        }
        statuses
    }

    /// Locate the TTM reference unit by its version marker.
    ///
    /// Leaves the registry untouched.
    pub fn find_ttm(&self) -> Option<String> {
        let discovery = &self.config.discovery;
        Prober::new(self.factory.as_ref()).probe_for_family(
            &discovery.candidate_paths(),
            &discovery.ttm_marker,
            &discovery.ttm_query,
        )
    }

    /// Set the transmit power of the TTM reference unit.
    pub fn set_ttm_tx_power(&self, dbm: i8) -> FleetResult<CommandOutcome> {
        if !TTM_TX_POWERS.contains(&dbm) {
            return Err(FleetError::InvalidTxPower(dbm));
        }

        let path = self.find_ttm().ok_or_else(|| FleetError::DeviceNotFound {
            marker: self.config.discovery.ttm_marker.clone(),
        })?;

        // Found with the probing settings, so driven with them too.
        let sequencer = sequencer_for(
            self.factory.as_ref(),
            PortSettings::standard(),
            &self.config.timing,
        );
        let command = Command::TxPower { dbm };
        let mut session = sequencer.open(&path)?;
        sequencer.wake(&mut session)?;
        let raw = session.exchange(&command, CliDialect::Zephyr)?;
        let line = command.to_command_string(CliDialect::Zephyr);
        Ok(CommandOutcome::new(path.as_str(), line, raw))
    }

    /// Send one raw line, unchanged, to every known device.
    pub fn broadcast(&self, line: &str) -> FleetResult<BroadcastReport> {
        if self.registry.is_empty() {
            return Err(FleetError::NoDevices);
        }

        let command = Command::raw(line)?;
        let sequencer = sequencer_for(self.factory.as_ref(), self.settings, &self.config.timing);
        let mut report = BroadcastReport::default();

        for device in self.registry.devices() {
            let sequence = sequencer.run_sequence(device, std::slice::from_ref(&command));
            match sequence.error {
                None => report.outcomes.extend(sequence.outcomes),
                Some(e) => report.failed.push(DeviceFailure {
                    device: device.path.clone(),
                    error: e.into(),
                }),
            }
        }
        Ok(report)
    }

    /// Serial ports the operating system reports.
    pub fn list_ports(&self) -> FleetResult<Vec<String>> {
        Ok(self.factory.list_ports()?)
    }
}

fn sequencer_for<'a>(
    factory: &'a dyn PortFactory,
    settings: PortSettings,
    timing: &TimingConfig,
) -> Sequencer<'a> {
    Sequencer::new(factory, settings, timing.settle())
}

/// Open a session on `path`, wake the shell, then run `f` on it.
fn with_session<F>(sequencer: &Sequencer<'_>, path: &str, f: F) -> FleetResult<()>
where
    F: FnOnce(&mut Session) -> FleetResult<()>,
{
    let mut session = sequencer.open(path)?;
    sequencer.wake(&mut session)?;
    f(&mut session)
}

fn stopped(device: &mut DeviceHandle) {
    if device.lifecycle == DeviceLifecycle::Started {
        device.lifecycle = DeviceLifecycle::Configured;
    }
}
