//! Raw byte links and the factory that opens them.

use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Duration;

use serialport::{DataBits, SerialPort, StopBits};

use crate::error::{TransportError, TransportResult};
use crate::settings::PortSettings;

/// A raw, exclusively owned byte channel to one device.
///
/// The endpoint is released when the link is dropped.
pub trait SerialLink: Send {
    /// Write every byte, failing with [`io::ErrorKind::TimedOut`] if the channel
    /// does not accept them within the write timeout.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Read whatever is available, blocking at most the read timeout.
    ///
    /// Returns `Ok(0)` when the timeout expires with nothing received.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Opens serial endpoints by path.
pub trait PortFactory {
    /// Check whether the path names an existing endpoint.
    fn exists(&self, path: &str) -> bool;

    /// Acquire exclusive access to an endpoint.
    fn open(&self, path: &str, settings: &PortSettings) -> TransportResult<Box<dyn SerialLink>>;

    /// List the serial ports the system knows about.
    fn list_ports(&self) -> TransportResult<Vec<String>>;
}

/// Factory for real serial ports.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPortFactory;

impl PortFactory for SystemPortFactory {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }

    fn open(&self, path: &str, settings: &PortSettings) -> TransportResult<Box<dyn SerialLink>> {
        let port = serialport::new(path, settings.baud_rate)
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::One)
            .parity(settings.parity.into())
            .timeout(settings.read_timeout)
            .open()
            .map_err(|e| TransportError::Unavailable {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        log::debug!("opened {} at {} baud", path, settings.baud_rate);

        Ok(Box::new(SystemLink {
            port,
            read_timeout: settings.read_timeout,
            write_timeout: settings.write_timeout,
        }))
    }

    fn list_ports(&self) -> TransportResult<Vec<String>> {
        let ports = serialport::available_ports()
            .map_err(|e| TransportError::Enumeration(e.to_string()))?;
        Ok(ports.into_iter().map(|p| p.port_name).collect())
    }
}

/// A link backed by a `serialport` handle.
///
/// `serialport` has a single timeout for both directions, so writes swap in the
/// write timeout and restore the read timeout afterwards.
struct SystemLink {
    port: Box<dyn SerialPort>,
    read_timeout: Duration,
    write_timeout: Duration,
}

impl SerialLink for SystemLink {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.set_timeout(self.write_timeout)?;
        let result = self.port.write_all(data).and_then(|_| self.port.flush());
        self.port.set_timeout(self.read_timeout)?;
        result
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e),
        }
    }
}
