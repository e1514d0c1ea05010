//! Message types for the SSC protocol
//!
//! The same command id can mean different things depending on direction:
//! - Host → Device: `0x04` resets the device's buffer space
//! - Device → Host: `0x04` announces a log message
//!
//! Ids `0x00`–`0x0F` are reserved for built-ins; device programs register
//! their own handlers from [`BUILTIN_COMMAND_COUNT`] upward.

use crate::frame::{join_u16, split_u16, DepositHeader, Frame};

/// Protocol revision reported by the device-info reply
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Link speed both ends use unless configured otherwise
pub const DEFAULT_BAUD_RATE: u32 = 9600;

// Command IDs shared by both directions
pub const CMD_NOOP: u8 = 0x00;
pub const CMD_DEVICE_INFO: u8 = 0x01;
pub const CMD_DEVICE_NAME: u8 = 0x02;
pub const CMD_DEPOSIT: u8 = 0x03;

// Command IDs: Host → Device
pub const CMD_RESET: u8 = 0x04;

// Command IDs: Device → Host
pub const CMD_LOG: u8 = 0x04;
pub const CMD_EXCEPTION: u8 = 0x07;

/// Number of handler slots reserved for built-in commands
pub const BUILTIN_COMMAND_COUNT: u8 = 0x10;

/// Line terminator that ends the text following an exception frame
pub const EXCEPTION_TEXT_END: u8 = b'\n';

/// Messages sent from the device to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceMessage {
    /// Reply to a device-info query
    DeviceInfo {
        device_id: u8,
        protocol_version: u8,
        device_version: u8,
    },
    /// Device name has been deposited at `address`
    DeviceName { address: u16 },
    /// Log text has been deposited at `address`
    Log { level: u8, address: u16 },
    /// Device raised an exception; text follows up to a newline
    Exception { code: u8 },
    /// Raw payload follows
    Deposit(DepositHeader),
    /// Any other command
    Command { command: u8, a: u8, b: u8, c: u8 },
}

impl DeviceMessage {
    /// Encode this message into a frame
    pub fn to_frame(&self) -> Frame {
        match *self {
            DeviceMessage::DeviceInfo {
                device_id,
                protocol_version,
                device_version,
            } => Frame::new(CMD_DEVICE_INFO, device_id, protocol_version, device_version),
            DeviceMessage::DeviceName { address } => {
                let (hi, lo) = split_u16(address);
                Frame::new(CMD_DEVICE_NAME, hi, lo, 0)
            }
            DeviceMessage::Log { level, address } => {
                let (hi, lo) = split_u16(address);
                Frame::new(CMD_LOG, level, hi, lo)
            }
            DeviceMessage::Exception { code } => Frame::new(CMD_EXCEPTION, code, 0, 0),
            DeviceMessage::Deposit(header) => header.to_frame(),
            DeviceMessage::Command { command, a, b, c } => Frame::new(command, a, b, c),
        }
    }

    /// Interpret a frame received from the device
    pub fn from_frame(frame: &Frame) -> Self {
        let [a, b, c] = frame.params;
        match frame.command {
            CMD_DEVICE_INFO => DeviceMessage::DeviceInfo {
                device_id: a,
                protocol_version: b,
                device_version: c,
            },
            CMD_DEVICE_NAME => DeviceMessage::DeviceName {
                address: join_u16(a, b),
            },
            CMD_DEPOSIT => DeviceMessage::Deposit(DepositHeader {
                address: join_u16(a, b),
                length: join_u16(c, frame.reserved),
            }),
            CMD_LOG => DeviceMessage::Log {
                level: a,
                address: join_u16(b, c),
            },
            CMD_EXCEPTION => DeviceMessage::Exception { code: a },
            command => DeviceMessage::Command { command, a, b, c },
        }
    }
}

/// Requests sent from the host to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostRequest {
    /// Ask for id and versions
    QueryInfo,
    /// Ask for the device name
    QueryName,
    /// Drop every managed buffer and restart address allocation
    Reset,
    /// Raw payload follows
    Deposit(DepositHeader),
    /// Invoke a device handler
    Command { command: u8, a: u8, b: u8, c: u8 },
}

impl HostRequest {
    /// Encode this request into a frame
    pub fn to_frame(&self) -> Frame {
        match *self {
            HostRequest::QueryInfo => Frame::new(CMD_DEVICE_INFO, 0, 0, 0),
            HostRequest::QueryName => Frame::new(CMD_DEVICE_NAME, 0, 0, 0),
            HostRequest::Reset => Frame::new(CMD_RESET, 0, 0, 0),
            HostRequest::Deposit(header) => header.to_frame(),
            HostRequest::Command { command, a, b, c } => Frame::new(command, a, b, c),
        }
    }

    /// Interpret a frame received from the host
    pub fn from_frame(frame: &Frame) -> Self {
        let [a, b, c] = frame.params;
        match frame.command {
            CMD_DEVICE_INFO => HostRequest::QueryInfo,
            CMD_DEVICE_NAME => HostRequest::QueryName,
            CMD_RESET => HostRequest::Reset,
            CMD_DEPOSIT => HostRequest::Deposit(DepositHeader {
                address: join_u16(a, b),
                length: join_u16(c, frame.reserved),
            }),
            command => HostRequest::Command { command, a, b, c },
        }
    }
}
