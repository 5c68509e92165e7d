//! Serial line parameters.

use std::time::Duration;

/// Baud rate used for discovery and configuration sessions.
pub const STANDARD_BAUD_RATE: u32 = 115_200;

/// Baud rate of the legacy device family.
pub const LEGACY_BAUD_RATE: u32 = 38_400;

/// Default read timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Default write timeout.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Parity setting. Data bits are always eight, stop bits always one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parity {
    /// No parity bit.
    #[default]
    None,
    /// Even parity.
    Even,
    /// Odd parity.
    Odd,
}

impl From<Parity> for serialport::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => serialport::Parity::None,
            Parity::Even => serialport::Parity::Even,
            Parity::Odd => serialport::Parity::Odd,
        }
    }
}

/// Parameters used when opening a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSettings {
    /// Baud rate.
    pub baud_rate: u32,
    /// Parity.
    pub parity: Parity,
    /// Upper bound on how long a single read blocks.
    pub read_timeout: Duration,
    /// Upper bound on how long a single write blocks.
    pub write_timeout: Duration,
}

impl PortSettings {
    /// 115200 baud, no parity: the probing and configuration profile.
    pub fn standard() -> Self {
        PortSettings {
            baud_rate: STANDARD_BAUD_RATE,
            parity: Parity::None,
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// 38400 baud, even parity.
    pub fn legacy() -> Self {
        PortSettings {
            baud_rate: LEGACY_BAUD_RATE,
            parity: Parity::Even,
            ..Self::standard()
        }
    }
}

impl Default for PortSettings {
    fn default() -> Self {
        Self::standard()
    }
}
