//! SSC Serial Command Protocol
//!
//! This crate defines the wire format spoken between a device running the
//! `ssc-core` engine and a host. Every exchange is a fixed 6-byte frame:
//! ```text
//! ┌─────────┬─────────┬─────────┬─────────┬──────────┬────────────┐
//! │ COMMAND │ PARAM A │ PARAM B │ PARAM C │ RESERVED │ TERMINATOR │
//! │ 1B      │ 1B      │ 1B      │ 1B      │ 1B       │ 0xFF       │
//! └─────────┴─────────┴─────────┴─────────┴──────────┴────────────┘
//! ```
//!
//! Payloads larger than a frame travel as a deposit: a frame with command
//! `0x03` carrying a 16-bit address and length, immediately followed by the
//! raw payload bytes.
//!
//! There is no checksum and no sequence number; a frame is valid when its
//! last byte is the terminator.

#![no_std]
#![deny(unsafe_code)]

pub mod address;
pub mod frame;
pub mod log_level;
pub mod messages;

pub use address::AddressAllocator;
pub use frame::{join_u16, split_u16, DepositHeader, Frame, FrameError, FRAME_LEN, TERMINATOR};
pub use log_level::LogLevel;
pub use messages::{DeviceMessage, HostRequest, DEFAULT_BAUD_RATE};
