//! SSC Hardware Abstraction Layer
//!
//! This crate defines the transport capability the protocol engine is built
//! on. A board support crate implements [`Transport`] for its serial
//! peripheral (or wraps an `embedded-io` driver in [`IoTransport`]), and the
//! engine in `ssc-core` takes it by value at construction.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Device program (handlers, main loop)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ssc-core (channel, device engine)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ssc-hal (this crate - Transport)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  chip UART    │       │ embedded-io   │
//! │  driver       │       │ IoTransport   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`transport::Transport`] - Byte-level serial transport

#![no_std]
#![deny(unsafe_code)]

pub mod transport;

pub use transport::{IoTransport, Transport};
