//! In-memory serial endpoints for tests and dry runs.
//!
//! A [`MockDevice`] behaves like a line-oriented CLI: every complete line written
//! to it is logged, echoed back, and answered by its responder. The
//! [`MockPortFactory`] hands out exclusive links to these devices the same way
//! the OS hands out character devices: opening a held path fails until the
//! holder drops its link.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io;
use std::sync::Arc;

use otctl_cli_protocol::LineCodec;
use parking_lot::Mutex;

use crate::error::{TransportError, TransportResult};
use crate::link::{PortFactory, SerialLink};
use crate::settings::PortSettings;

/// Produces the reply text for one received command line.
pub type Responder = Box<dyn FnMut(&str) -> Option<String> + Send>;

/// A scripted device.
pub struct MockDevice {
    responder: Responder,
    echo: bool,
    fail_on_write: Option<usize>,
    silent_after: Option<usize>,
    pending_output: String,
}

impl MockDevice {
    /// Create a device answering every line through `responder`.
    pub fn new(responder: impl FnMut(&str) -> Option<String> + Send + 'static) -> Self {
        MockDevice {
            responder: Box::new(responder),
            echo: true,
            fail_on_write: None,
            silent_after: None,
            pending_output: String::new(),
        }
    }

    /// Create a device with a fixed reply per command line and `fallback` for
    /// every other line.
    pub fn with_replies<I, C, R>(replies: I, fallback: &str) -> Self
    where
        I: IntoIterator<Item = (C, R)>,
        C: Into<String>,
        R: Into<String>,
    {
        let table: BTreeMap<String, String> = replies
            .into_iter()
            .map(|(c, r)| (c.into(), r.into()))
            .collect();
        let fallback = fallback.to_string();
        Self::new(move |line| Some(table.get(line).cloned().unwrap_or_else(|| fallback.clone())))
    }

    /// A device that never answers (but still echoes).
    pub fn silent() -> Self {
        Self::new(|_| None)
    }

    /// Disable the echo of received lines.
    pub fn without_echo(mut self) -> Self {
        self.echo = false;
        self
    }

    /// Make the `n`th write (1-based, counted over the device's lifetime) time out.
    pub fn fail_on_write(mut self, n: usize) -> Self {
        self.fail_on_write = Some(n);
        self
    }

    /// Stop echoing and answering once `n` lines have been received, as if the
    /// device hung. Later lines are still logged.
    pub fn silent_after(mut self, n: usize) -> Self {
        self.silent_after = Some(n);
        self
    }

    /// Queue unsolicited output, readable as soon as the device is opened.
    pub fn with_pending_output(mut self, text: &str) -> Self {
        self.pending_output.push_str(text);
        self
    }
}

impl std::fmt::Debug for MockDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDevice")
            .field("echo", &self.echo)
            .field("fail_on_write", &self.fail_on_write)
            .field("silent_after", &self.silent_after)
            .finish()
    }
}

#[derive(Debug)]
struct DeviceState {
    device: MockDevice,
    output: VecDeque<u8>,
    input: LineCodec,
    received: Vec<String>,
    opened_with: Vec<PortSettings>,
    writes: usize,
    opens: usize,
    held: bool,
}

impl DeviceState {
    fn new(device: MockDevice) -> Self {
        let output = device.pending_output.bytes().collect();
        DeviceState {
            device,
            output,
            input: LineCodec::new(),
            received: Vec::new(),
            opened_with: Vec::new(),
            writes: 0,
            opens: 0,
            held: false,
        }
    }

    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.writes += 1;
        if self.device.fail_on_write == Some(self.writes) {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "mock write timeout"));
        }

        self.input.push(data);
        while let Some(line) = self.input.next_line() {
            let hung = self
                .device
                .silent_after
                .is_some_and(|n| self.received.len() >= n);
            if hung {
                self.received.push(line);
                continue;
            }
            if self.device.echo {
                self.output.extend(line.bytes());
                self.output.extend(b"\r\n");
            }
            if let Some(reply) = (self.device.responder)(&line) {
                self.output.extend(reply.bytes());
            }
            self.received.push(line);
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.output.len());
        for (slot, byte) in buf.iter_mut().zip(self.output.drain(..n)) {
            *slot = byte;
        }
        n
    }
}

type SharedDevice = Arc<Mutex<DeviceState>>;

/// A link to a [`MockDevice`]; releases the device when dropped.
struct MockLink {
    state: SharedDevice,
}

impl SerialLink for MockLink {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.state.lock().write(data)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.state.lock().read(buf))
    }
}

impl Drop for MockLink {
    fn drop(&mut self) {
        self.state.lock().held = false;
    }
}

/// A set of scripted endpoints addressed by path.
#[derive(Clone, Default)]
pub struct MockPortFactory {
    devices: Arc<Mutex<BTreeMap<String, SharedDevice>>>,
    unopenable: Arc<Mutex<BTreeSet<String>>>,
}

impl MockPortFactory {
    /// Create an empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a device at `path`, replacing any previous one.
    pub fn add_device(&self, path: &str, device: MockDevice) {
        self.devices
            .lock()
            .insert(path.to_string(), Arc::new(Mutex::new(DeviceState::new(device))));
    }

    /// Make `path` exist without being openable (e.g. a non-serial file).
    pub fn add_unopenable(&self, path: &str) {
        self.unopenable.lock().insert(path.to_string());
    }

    /// Remove a device, as if it were unplugged.
    pub fn remove_device(&self, path: &str) {
        self.devices.lock().remove(path);
    }

    /// Mark a device as held by another process.
    pub fn set_held(&self, path: &str, held: bool) {
        if let Some(state) = self.device(path) {
            state.lock().held = held;
        }
    }

    /// Check whether a device is currently held.
    pub fn is_held(&self, path: &str) -> bool {
        self.device(path).map(|s| s.lock().held).unwrap_or(false)
    }

    /// Every line the device at `path` has received, in order.
    pub fn received(&self, path: &str) -> Vec<String> {
        self.device(path)
            .map(|s| s.lock().received.clone())
            .unwrap_or_default()
    }

    /// Forget the received-line log of the device at `path`.
    pub fn clear_received(&self, path: &str) {
        if let Some(state) = self.device(path) {
            state.lock().received.clear();
        }
    }

    /// Settings of every successful open of the device at `path`, in order.
    pub fn opened_with(&self, path: &str) -> Vec<PortSettings> {
        self.device(path)
            .map(|s| s.lock().opened_with.clone())
            .unwrap_or_default()
    }

    /// Number of times the device at `path` has been opened.
    pub fn open_count(&self, path: &str) -> usize {
        self.device(path).map(|s| s.lock().opens).unwrap_or(0)
    }

    fn device(&self, path: &str) -> Option<SharedDevice> {
        self.devices.lock().get(path).cloned()
    }
}

impl std::fmt::Debug for MockPortFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockPortFactory")
            .field("devices", &self.devices.lock().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PortFactory for MockPortFactory {
    fn exists(&self, path: &str) -> bool {
        self.devices.lock().contains_key(path) || self.unopenable.lock().contains(path)
    }

    fn open(&self, path: &str, settings: &PortSettings) -> TransportResult<Box<dyn SerialLink>> {
        let unavailable = |reason: &str| TransportError::Unavailable {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        if self.unopenable.lock().contains(path) {
            return Err(unavailable("not a serial device"));
        }
        let state = self.device(path).ok_or_else(|| unavailable("no such device"))?;

        {
            let mut guard = state.lock();
            if guard.held {
                return Err(unavailable("device busy"));
            }
            guard.held = true;
            guard.opens += 1;
            guard.opened_with.push(*settings);
        }

        Ok(Box::new(MockLink { state }))
    }

    fn list_ports(&self) -> TransportResult<Vec<String>> {
        Ok(self.devices.lock().keys().cloned().collect())
    }
}
