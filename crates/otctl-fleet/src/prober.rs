//! Device discovery over a bounded range of candidate paths.
//!
//! Probing is best-effort per endpoint: a path that is missing, busy, not a
//! serial device or silent is skipped and never fails the pass.

use otctl_cli_protocol::{Command, PlatformFamily, PLATFORM_PROBES};
use otctl_metrics::metric_defs;
use otctl_transport::{PortFactory, PortSettings, Session, TransportResult};
use tracing::{debug, info, trace};

use crate::device::DeviceHandle;

/// Probes candidate paths for OpenThread CLI devices.
///
/// Probe sessions always use the standard line settings (115200 baud, 0.1 s
/// read and 1.0 s write timeouts), whatever profile later sessions run with.
pub struct Prober<'a> {
    factory: &'a dyn PortFactory,
    settings: PortSettings,
}

impl<'a> Prober<'a> {
    /// Create a prober over the endpoints of `factory`.
    pub fn new(factory: &'a dyn PortFactory) -> Self {
        Prober {
            factory,
            settings: PortSettings::standard(),
        }
    }

    /// Probe every candidate and return a handle for each recognized device,
    /// in candidate order.
    pub fn probe_all(&self, candidates: &[String]) -> Vec<DeviceHandle> {
        let mut found = Vec::new();

        for path in candidates {
            if !self.factory.exists(path) {
                continue;
            }
            metrics::counter!(metric_defs::PROBE_ATTEMPTS.name, "device" => path.clone())
                .increment(1);

            match self.identify(path) {
                Ok(Some(family)) => {
                    info!("{}: found {} board", path, family);
                    found.push(DeviceHandle::new(path.as_str(), family));
                }
                Ok(None) => debug!("{}: no platform marker in probe replies", path),
                Err(e) => debug!("{}: skipped ({})", path, e),
            }
        }

        metrics::gauge!(metric_defs::DEVICES_FOUND.name).set(found.len() as f64);
        found
    }

    /// Find the first candidate whose reply to `query` contains `marker`.
    pub fn probe_for_family(
        &self,
        candidates: &[String],
        marker: &str,
        query: &str,
    ) -> Option<String> {
        for path in candidates {
            if !self.factory.exists(path) {
                continue;
            }

            match self.query_marker(path, marker, query) {
                Ok(true) => {
                    info!("{}: matched '{}'", path, marker);
                    return Some(path.clone());
                }
                Ok(false) => trace!("{}: no '{}' in reply", path, marker),
                Err(e) => debug!("{}: skipped ({})", path, e),
            }
        }
        None
    }

    /// Send the platform probes in order; the first marker found classifies the path.
    fn identify(&self, path: &str) -> TransportResult<Option<PlatformFamily>> {
        let mut session = Session::open(self.factory, path, &self.settings)?;
        session.flush_input()?;

        for probe in PLATFORM_PROBES {
            let reply = session.exchange(&Command::Platform, probe.dialect)?;
            if probe.matches(&reply) {
                return Ok(Some(probe.family));
            }
        }
        Ok(None)
    }

    fn query_marker(&self, path: &str, marker: &str, query: &str) -> TransportResult<bool> {
        let mut session = Session::open(self.factory, path, &self.settings)?;
        session.flush_input()?;

        // Two bare lines clear any partial input and the prompts they produce.
        for _ in 0..2 {
            session.write_line("")?;
            session.flush_input()?;
        }

        let reply = session.write_then_read(query)?;
        Ok(reply.contains(marker))
    }
}
