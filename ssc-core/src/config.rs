//! Device configuration
//!
//! Identity reported to the host plus link settings. Can be persisted with
//! any serde format when the `serde` feature is enabled.

use heapless::String;
use ssc_protocol::DEFAULT_BAUD_RATE;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum device name length in bytes
pub const MAX_NAME_LEN: usize = 32;

/// Device identity and link configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfig {
    /// Name returned by the device-name built-in
    pub name: String<MAX_NAME_LEN>,
    /// Device identifier returned by the device-info built-in
    pub device_id: u8,
    /// Firmware version returned by the device-info built-in
    pub device_version: u8,
    /// Baud rate passed to the transport on start
    pub baud_rate: u32,
    /// Realign on the terminator after a corrupted frame
    ///
    /// Off by default: the wire contract has no resynchronization and an
    /// invalid frame simply consumes six bytes.
    pub resync: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            device_id: 0,
            device_version: 0,
            baud_rate: DEFAULT_BAUD_RATE,
            resync: false,
        }
    }
}

impl DeviceConfig {
    /// Create a configuration with the given identity
    ///
    /// Names longer than [`MAX_NAME_LEN`] bytes are truncated on a
    /// character boundary.
    pub fn new(name: &str, device_id: u8, device_version: u8) -> Self {
        let mut truncated = String::new();
        for ch in name.chars() {
            if truncated.push(ch).is_err() {
                break;
            }
        }
        Self {
            name: truncated,
            device_id,
            device_version,
            ..Self::default()
        }
    }

    /// Override the baud rate
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Enable or disable terminator resynchronization
    pub fn with_resync(mut self, resync: bool) -> Self {
        self.resync = resync;
        self
    }
}
