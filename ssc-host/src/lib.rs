//! Host-side client for SSC devices
//!
//! Talks to a device running `ssc-core` over any [`Link`], by default a
//! serial port:
//!
//! ```no_run
//! use ssc_host::{HostClient, HostConfig, HostEvent};
//!
//! # fn main() -> ssc_host::Result<()> {
//! let mut client = HostClient::open("/dev/ttyUSB0", HostConfig::default())?;
//! loop {
//!     match client.poll()? {
//!         Some(HostEvent::Connected { name }) => println!("connected to {name}"),
//!         Some(HostEvent::Log { level, message }) => {
//!             let level = level.map(|l| l.as_str()).unwrap_or("?");
//!             println!("[{level}] {message}");
//!         }
//!         _ => {}
//!     }
//! }
//! # }
//! ```

pub mod client;
pub mod error;
pub mod link;

pub use client::{DeviceIdentity, HostClient, HostConfig, HostEvent};
pub use error::{HostError, Result};
pub use link::Link;
pub use ssc_protocol::LogLevel;
