//! Board-agnostic protocol engine for SSC devices
//!
//! This crate contains everything a device needs to speak the protocol,
//! independent of the serial peripheral it runs on:
//!
//! - Byte channel: receive ring over an injected [`ssc_hal::Transport`]
//! - Growable sequence and address map used for handler and buffer tables
//! - Device engine: frame parsing, command dispatch, managed buffers
//! - Device configuration
//!
//! # Example
//!
//! ```ignore
//! use ssc_core::{Device, DeviceConfig};
//!
//! fn hello(device: &mut Device<Uart>, _a: u8, _b: u8, _c: u8) {
//!     let _ = device.log(LogLevel::Info, "Hello World!");
//! }
//!
//! let mut device = Device::new(DeviceConfig::new("Cool Device", 123, 2));
//! device.attach(uart);
//! device.register_handler(hello)?; // command 0x10
//! device.start();
//! loop {
//!     device.poll();
//! }
//! ```

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod channel;
pub mod collections;
pub mod config;
pub mod device;
pub mod error;

#[cfg(test)]
pub(crate) mod testing;

pub use channel::{ByteChannel, DEFAULT_RING_CAPACITY};
pub use collections::{AddressMap, Sequence};
pub use config::{DeviceConfig, MAX_NAME_LEN};
pub use device::{CommandFn, Device, DeviceState, Handler, HandlerTable, ManagedBuffer, PollOutcome};
pub use error::DeviceError;
pub use ssc_protocol::LogLevel;
