//! Frame encoding and decoding for the SSC protocol.
//!
//! Frame format:
//! - COMMAND (1 byte): handler index on the receiving side
//! - PARAMS (3 bytes): command-specific arguments a, b, c
//! - RESERVED (1 byte): zero in command frames, low length byte in deposits
//! - TERMINATOR (1 byte): always 0xFF
//!
//! Deposit header (command 0x03), big-endian fields:
//! `[0x03, addr_hi, addr_lo, len_hi, len_lo, 0xFF]`

use crate::messages::CMD_DEPOSIT;

/// Size of every frame on the wire
pub const FRAME_LEN: usize = 6;

/// Last byte of every valid frame
pub const TERMINATOR: u8 = 0xFF;

/// Errors that can occur during frame decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Last byte was not the terminator (carries the byte found)
    InvalidTerminator(u8),
    /// Frame was expected to be a deposit header (carries the command found)
    NotADeposit(u8),
    /// Fewer than [`FRAME_LEN`] bytes supplied
    Incomplete,
}

/// A single 6-byte protocol frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Command identifier
    pub command: u8,
    /// Parameter bytes a, b, c
    pub params: [u8; 3],
    /// Reserved byte (zero in command frames)
    pub reserved: u8,
}

impl Frame {
    /// Create a command frame with the reserved byte cleared
    pub const fn new(command: u8, a: u8, b: u8, c: u8) -> Self {
        Self {
            command,
            params: [a, b, c],
            reserved: 0,
        }
    }

    /// First parameter byte
    pub fn a(&self) -> u8 {
        self.params[0]
    }

    /// Second parameter byte
    pub fn b(&self) -> u8 {
        self.params[1]
    }

    /// Third parameter byte
    pub fn c(&self) -> u8 {
        self.params[2]
    }

    /// Whether this frame announces a deposit payload
    pub fn is_deposit(&self) -> bool {
        self.command == CMD_DEPOSIT
    }

    /// Encode into wire bytes
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        [
            self.command,
            self.params[0],
            self.params[1],
            self.params[2],
            self.reserved,
            TERMINATOR,
        ]
    }

    /// Decode from wire bytes
    ///
    /// Only the first [`FRAME_LEN`] bytes are examined.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < FRAME_LEN {
            return Err(FrameError::Incomplete);
        }
        if bytes[5] != TERMINATOR {
            return Err(FrameError::InvalidTerminator(bytes[5]));
        }
        Ok(Self {
            command: bytes[0],
            params: [bytes[1], bytes[2], bytes[3]],
            reserved: bytes[4],
        })
    }
}

/// Header announcing a raw payload that follows on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DepositHeader {
    /// Destination address in the receiver's buffer space
    pub address: u16,
    /// Number of payload bytes that follow the header
    pub length: u16,
}

impl DepositHeader {
    /// Build the deposit frame for this header
    pub fn to_frame(&self) -> Frame {
        let (addr_hi, addr_lo) = split_u16(self.address);
        let (len_hi, len_lo) = split_u16(self.length);
        Frame {
            command: CMD_DEPOSIT,
            params: [addr_hi, addr_lo, len_hi],
            reserved: len_lo,
        }
    }

    /// Parse a header out of a deposit frame
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        if !frame.is_deposit() {
            return Err(FrameError::NotADeposit(frame.command));
        }
        Ok(Self {
            address: join_u16(frame.params[0], frame.params[1]),
            length: join_u16(frame.params[2], frame.reserved),
        })
    }
}

/// Split a 16-bit value into (high, low) bytes
pub fn split_u16(value: u16) -> (u8, u8) {
    let [hi, lo] = value.to_be_bytes();
    (hi, lo)
}

/// Join (high, low) bytes into a 16-bit value
pub fn join_u16(hi: u8, lo: u8) -> u16 {
    u16::from_be_bytes([hi, lo])
}
