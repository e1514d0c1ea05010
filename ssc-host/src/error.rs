//! Error types for host-side operations

use ssc_protocol::FrameError;
use thiserror::Error;

/// Host client errors
#[derive(Debug, Error)]
pub enum HostError {
    /// I/O error on the link
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port error
    #[cfg(feature = "serial")]
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Frame failed validation
    #[error("Invalid frame: {0:?}")]
    InvalidFrame(FrameError),

    /// Device raised an exception
    #[error("Device exception 0x{code:02X}: {message}")]
    DeviceException { code: u8, message: String },

    /// No buffer held at this address
    #[error("No buffer at address 0x{0:04X}")]
    BufferNotFound(u16),

    /// Payload does not fit the 16-bit length field
    #[error("Payload of {0} bytes exceeds 65535")]
    PayloadTooLarge(usize),

    /// Every 16-bit address has been deposited to since the last reset
    #[error("Buffer address space exhausted")]
    AddressSpaceExhausted,

    /// Device has not announced its name yet
    #[error("Device not connected")]
    NotConnected,
}

/// Result type for host operations
pub type Result<T> = core::result::Result<T, HostError>;
