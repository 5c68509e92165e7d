//! Scoped serial sessions.

use std::io;

use otctl_cli_protocol::{CliDialect, Command, LineCodec};

use crate::error::{TransportError, TransportResult};
use crate::link::{PortFactory, SerialLink};
use crate::settings::PortSettings;

/// Default upper bound for one [`Session::read_available`] call.
pub const DEFAULT_READ_MAX: usize = 200;

/// Size of a single read from the link.
const READ_CHUNK: usize = 64;

/// One exclusively held serial endpoint.
///
/// The endpoint is released when the session is dropped, so a session that goes
/// out of scope through `?` or an early return frees the path for the next user.
pub struct Session {
    path: String,
    link: Box<dyn SerialLink>,
    codec: LineCodec,
    settings: PortSettings,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("path", &self.path)
            .field("settings", &self.settings)
            .field("buffered", &self.codec.buffered_len())
            .finish()
    }
}

impl Session {
    /// Acquire exclusive access to `path`.
    pub fn open(
        factory: &dyn PortFactory,
        path: &str,
        settings: &PortSettings,
    ) -> TransportResult<Session> {
        let link = factory.open(path, settings)?;
        Ok(Session {
            path: path.to_string(),
            link,
            codec: LineCodec::new(),
            settings: *settings,
        })
    }

    /// The device path this session holds.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The settings the session was opened with.
    pub fn settings(&self) -> &PortSettings {
        &self.settings
    }

    /// Write `text` followed by `\r\n`.
    pub fn write_line(&mut self, text: &str) -> TransportResult<()> {
        let data = LineCodec::encode_command(text);
        log::trace!("{} <- {:?}", self.path, text);
        self.link.write_all(&data).map_err(|e| self.map_write_error(e))
    }

    /// Read whatever is buffered, up to `max_bytes`, as raw bytes.
    ///
    /// Never blocks longer than one read timeout past the last byte received and
    /// may return an empty vector.
    pub fn read_available(&mut self, max_bytes: usize) -> TransportResult<Vec<u8>> {
        let mut out = self.codec.take(max_bytes);
        let mut chunk = [0u8; READ_CHUNK];

        while out.len() < max_bytes {
            let want = (max_bytes - out.len()).min(READ_CHUNK);
            let n = self.read_chunk(&mut chunk[..want])?;
            if n == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n]);
        }

        Ok(out)
    }

    /// Read one line, without its terminator.
    ///
    /// Returns a partial line if the read timeout expires after some bytes were
    /// received, and [`TransportError::ReadTimeout`] if nothing arrived at all.
    pub fn read_line(&mut self) -> TransportResult<String> {
        let mut received_any = self.codec.buffered_len() > 0;
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            if let Some(line) = self.codec.next_line() {
                return Ok(line);
            }

            let n = self.read_chunk(&mut chunk)?;
            if n == 0 {
                if !received_any {
                    return Err(TransportError::ReadTimeout { path: self.path.clone() });
                }
                let rest = self.codec.take(usize::MAX);
                return Ok(String::from_utf8_lossy(&rest).to_string());
            }

            received_any = true;
            self.codec.push(&chunk[..n]);
        }
    }

    /// Write a line, discard the echoed first line, then return what follows.
    pub fn write_then_read(&mut self, text: &str) -> TransportResult<String> {
        self.write_line(text)?;
        let echo = self.read_line()?;
        log::trace!("{} echo {:?}", self.path, echo);

        let reply = self.read_available(DEFAULT_READ_MAX)?;
        let reply = String::from_utf8_lossy(&reply).to_string();
        log::trace!("{} -> {:?}", self.path, reply);
        Ok(reply)
    }

    /// Send a command in the given dialect and return the reply text.
    pub fn exchange(&mut self, command: &Command, dialect: CliDialect) -> TransportResult<String> {
        self.write_then_read(&command.to_command_string(dialect))
    }

    /// Throw away any unsolicited output (boot banners, stale echo).
    pub fn flush_input(&mut self) -> TransportResult<()> {
        let discarded = self.read_available(DEFAULT_READ_MAX)?;
        if !discarded.is_empty() {
            log::trace!("{} flushed {} bytes", self.path, discarded.len());
        }
        Ok(())
    }

    /// Release the endpoint.
    pub fn close(self) {
        log::trace!("closing {}", self.path);
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> TransportResult<usize> {
        self.link.read(buf).map_err(|e| TransportError::Io {
            path: self.path.clone(),
            source: e,
        })
    }

    fn map_write_error(&self, e: io::Error) -> TransportError {
        if e.kind() == io::ErrorKind::TimedOut {
            TransportError::WriteTimeout { path: self.path.clone() }
        } else {
            TransportError::Io { path: self.path.clone(), source: e }
        }
    }
}
