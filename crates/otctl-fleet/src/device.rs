//! Device handles and the registry that owns them.

use otctl_cli_protocol::{CliDialect, PlatformFamily, ThreadRole, MODE_CHILD, MODE_ROUTER};

use crate::config::NetworkParams;

/// Position a device was assigned in the mesh topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopologyRole {
    /// Router-capable full Thread device.
    Router,
    /// Minimal Thread device.
    Child,
    /// Not configured by this fleet yet.
    #[default]
    Unassigned,
}

impl TopologyRole {
    /// Lowercase name for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            TopologyRole::Router => "router",
            TopologyRole::Child => "child",
            TopologyRole::Unassigned => "unassigned",
        }
    }
}

/// Provisioning state of a device, as driven by fleet operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceLifecycle {
    /// No dataset applied by this fleet.
    #[default]
    Unconfigured,
    /// Dataset committed, stack not started.
    Configured,
    /// Interface up and Thread stack started.
    Started,
}

/// Mode flags and transmit power for one topology role.
///
/// Every role is configured by the same command sequence; only this pair differs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleProfile {
    /// Role this profile provisions.
    pub role: TopologyRole,
    /// `mode` flags.
    pub mode: String,
    /// Transmit power in dBm.
    pub tx_power: i8,
}

impl RoleProfile {
    /// Router-capable device at the network's router power.
    pub fn router(network: &NetworkParams) -> Self {
        RoleProfile {
            role: TopologyRole::Router,
            mode: MODE_ROUTER.to_string(),
            tx_power: network.router_tx_power,
        }
    }

    /// Child-only device at the network's child power.
    pub fn child(network: &NetworkParams) -> Self {
        RoleProfile {
            role: TopologyRole::Child,
            mode: MODE_CHILD.to_string(),
            tx_power: network.child_tx_power,
        }
    }
}

/// One recognized serial endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle {
    /// Device path.
    pub path: String,
    /// Board family found during discovery.
    pub platform: PlatformFamily,
    /// Role reported by the last state query.
    pub last_role: ThreadRole,
    /// Role assigned by the last network configuration.
    pub topology: TopologyRole,
    /// Provisioning state.
    pub lifecycle: DeviceLifecycle,
}

impl DeviceHandle {
    /// Create a handle for a device that answered a platform probe.
    pub fn new(path: impl Into<String>, platform: PlatformFamily) -> Self {
        DeviceHandle {
            path: path.into(),
            platform,
            last_role: ThreadRole::Unknown,
            topology: TopologyRole::Unassigned,
            lifecycle: DeviceLifecycle::Unconfigured,
        }
    }

    /// Dialect commands must be rendered in for this device.
    pub fn dialect(&self) -> CliDialect {
        self.platform.dialect()
    }
}

/// The ordered set of currently known devices.
///
/// Discovery replaces the contents wholesale; results of two passes are never merged.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: Vec<DeviceHandle>,
}

impl DeviceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every known device.
    pub fn replace(&mut self, devices: Vec<DeviceHandle>) {
        self.devices = devices;
    }

    /// Number of known devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Check if no devices are known.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Known devices in discovery order.
    pub fn devices(&self) -> &[DeviceHandle] {
        &self.devices
    }

    /// Mutable access to the known devices.
    pub fn devices_mut(&mut self) -> &mut [DeviceHandle] {
        &mut self.devices
    }

    /// Device paths in discovery order.
    pub fn paths(&self) -> Vec<String> {
        self.devices.iter().map(|d| d.path.clone()).collect()
    }

    /// Look up a device by path.
    pub fn get(&self, path: &str) -> Option<&DeviceHandle> {
        self.devices.iter().find(|d| d.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> NetworkParams {
        NetworkParams {
            channel: 15,
            pan_id: 0xabcd,
            network_key: "00112233445566778899aabbccddeeff".to_string(),
            router_tx_power: 0,
            child_tx_power: -40,
        }
    }

    #[test]
    fn test_role_profiles_differ_only_in_mode_and_power() {
        let router = RoleProfile::router(&params());
        let child = RoleProfile::child(&params());
        assert_eq!((router.mode.as_str(), router.tx_power), ("rdn", 0));
        assert_eq!((child.mode.as_str(), child.tx_power), ("rn", -40));
    }

    #[test]
    fn test_new_handle_is_unconfigured() {
        let device = DeviceHandle::new("/dev/ttyACM1", PlatformFamily::EFR32);
        assert_eq!(device.lifecycle, DeviceLifecycle::Unconfigured);
        assert_eq!(device.topology, TopologyRole::Unassigned);
        assert_eq!(device.last_role, ThreadRole::Unknown);
        assert_eq!(device.dialect(), CliDialect::Native);
    }

    #[test]
    fn test_registry_replace_is_not_merge() {
        let mut registry = DeviceRegistry::new();
        registry.replace(vec![
            DeviceHandle::new("/dev/ttyACM1", PlatformFamily::ZephyrNRF),
            DeviceHandle::new("/dev/ttyACM2", PlatformFamily::ZephyrNRF),
        ]);
        registry.replace(vec![DeviceHandle::new("/dev/ttyACM3", PlatformFamily::EFR32)]);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.paths(), vec!["/dev/ttyACM3".to_string()]);
        assert!(registry.get("/dev/ttyACM1").is_none());
    }
}
