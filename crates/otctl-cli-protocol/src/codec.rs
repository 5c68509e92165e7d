//! Line-based codec for CLI communication.
//!
//! Commands are terminated with `\r\n`. Replies arrive as arbitrary chunks of
//! bytes, so the codec accumulates them and hands out complete lines, keeping
//! whatever follows the last line terminator for the next read.

use bytes::BytesMut;

/// Maximum command line length accepted by the OpenThread CLI.
pub const MAX_LINE_LENGTH: usize = 384;

/// Line terminator appended to every command.
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// A codec for reading and writing CLI lines.
#[derive(Debug, Default)]
pub struct LineCodec {
    /// Buffer for accumulating incoming data.
    buffer: BytesMut,
}

impl LineCodec {
    /// Create a new line codec.
    pub fn new() -> Self {
        LineCodec {
            buffer: BytesMut::with_capacity(MAX_LINE_LENGTH * 2),
        }
    }

    /// Add received data to the buffer.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Take the next `\n`-terminated line from the buffer.
    ///
    /// Empty lines are returned as-is. This is what echo discarding needs: the
    /// echo of a blank wake-up line is itself blank.
    /// The returned text has its trailing `\r\n` removed.
    pub fn next_line(&mut self) -> Option<String> {
        let end = self.buffer.iter().position(|&b| b == b'\n')?;
        let line_data = self.buffer.split_to(end + 1);
        let line = String::from_utf8_lossy(&line_data);
        Some(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Drain up to `max` buffered bytes.
    pub fn take(&mut self, max: usize) -> Vec<u8> {
        let n = max.min(self.buffer.len());
        self.buffer.split_to(n).to_vec()
    }

    /// Encode a command for transmission.
    ///
    /// Appends the `\r\n` terminator.
    pub fn encode_command(cmd: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(cmd.len() + LINE_TERMINATOR.len());
        buf.extend_from_slice(cmd.as_bytes());
        buf.extend_from_slice(LINE_TERMINATOR);
        buf
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}
