//! Protocol engine
//!
//! A [`Device`] owns the byte channel, the handler table and the managed
//! buffer map. The host loop calls [`Device::poll`] repeatedly; each call
//! moves at most one byte off the wire and, once a whole frame is buffered,
//! parses and dispatches it.
//!
//! Lifecycle: `Uninitialized → Running`, entered once through
//! [`Device::start`]. There is no way back short of dropping the device.

mod builtins;
pub mod handlers;

use alloc::boxed::Box;
use alloc::vec;

use ssc_hal::Transport;
use ssc_protocol::messages::{BUILTIN_COMMAND_COUNT, CMD_DEPOSIT, EXCEPTION_TEXT_END};
use ssc_protocol::{
    join_u16, AddressAllocator, DepositHeader, DeviceMessage, Frame, FrameError, LogLevel,
    FRAME_LEN, TERMINATOR,
};

use crate::channel::ByteChannel;
use crate::collections::AddressMap;
use crate::config::DeviceConfig;
use crate::error::DeviceError;

pub use handlers::{CommandFn, Handler, HandlerTable};

/// Owned byte block stored at a 16-bit address
pub type ManagedBuffer = Box<[u8]>;

/// Device lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    /// Created, not yet started
    Uninitialized,
    /// Started; frames are being processed
    Running,
}

/// What a single [`Device::poll`] call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollOutcome {
    /// No complete frame yet (or the device is not running)
    Idle,
    /// One misaligned byte was discarded
    Resynced,
    /// A complete frame failed validation and was discarded
    Dropped(FrameError),
    /// A command frame was dispatched
    Dispatched { command: u8 },
    /// A deposit was stored (and its command dispatched)
    Deposited { address: u16, length: u16 },
}

/// Protocol engine for one serial link
pub struct Device<T> {
    config: DeviceConfig,
    channel: Option<ByteChannel<T>>,
    handlers: HandlerTable<T>,
    buffers: AddressMap<u16, ManagedBuffer>,
    state: DeviceState,
    addresses: AddressAllocator,
}

impl<T> Device<T> {
    /// Create an unstarted device with no transport attached
    pub fn new(config: DeviceConfig) -> Self {
        Self {
            config,
            channel: None,
            handlers: HandlerTable::new(),
            buffers: AddressMap::new(),
            state: DeviceState::Uninitialized,
            addresses: AddressAllocator::new(),
        }
    }

    /// Device configuration
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Current lifecycle state
    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Whether [`start`](Self::start) has run
    pub fn is_running(&self) -> bool {
        self.state == DeviceState::Running
    }

    /// Whether a transport is attached
    pub fn is_attached(&self) -> bool {
        self.channel.is_some()
    }

    /// Address the next outbound buffer will be sent to
    ///
    /// Outbound addresses are never reused until [`reset`](Self::reset).
    pub fn next_address(&self) -> u16 {
        self.addresses.next_address()
    }

    /// Number of managed buffers currently held
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Register a command handler and return its command id
    ///
    /// Before [`start`](Self::start) the handler is queued behind the
    /// built-in slots, so the first registered handler is always `0x10`.
    pub fn register_handler(&mut self, handler: CommandFn<T>) -> Result<u8, DeviceError> {
        let offset = if self.is_running() {
            0
        } else {
            usize::from(BUILTIN_COMMAND_COUNT)
        };
        let command = u8::try_from(offset + self.handlers.len())
            .map_err(|_| DeviceError::HandlerTableFull)?;
        self.handlers.register(Handler::Command(handler));
        Ok(command)
    }

    /// Managed buffer at `address`
    pub fn read_buffer(&self, address: u16) -> Result<&[u8], DeviceError> {
        self.buffers
            .get(&address)
            .map(|buffer| &**buffer)
            .ok_or(DeviceError::BufferNotFound(address))
    }

    /// Managed buffer addressed by two handler parameters (high, low)
    pub fn buffer_param(&self, hi: u8, lo: u8) -> Result<&[u8], DeviceError> {
        self.read_buffer(join_u16(hi, lo))
    }

    /// Remove a managed buffer and hand ownership to the caller
    pub fn take_buffer(&mut self, address: u16) -> Result<ManagedBuffer, DeviceError> {
        self.buffers
            .remove(&address)
            .ok_or(DeviceError::BufferNotFound(address))
    }

    /// Release one managed buffer
    pub fn clear_buffer(&mut self, address: u16) -> Result<(), DeviceError> {
        self.take_buffer(address)?;
        debug!("buffer {=u16:#x} cleared", address);
        Ok(())
    }

    /// Release every managed buffer
    pub fn clear_all_buffers(&mut self) {
        debug!("clearing {} buffers", self.buffers.len());
        self.buffers.clear();
    }

    /// Release every managed buffer and restart address allocation at 0
    pub fn reset(&mut self) {
        self.clear_all_buffers();
        self.addresses.reset();
    }
}

impl<T: Transport> Device<T> {
    /// Create an unstarted device over `transport`
    pub fn with_transport(config: DeviceConfig, transport: T) -> Self {
        let mut device = Self::new(config);
        device.channel = Some(ByteChannel::new(transport));
        device
    }

    /// Attach a transport, returning the one it replaces
    ///
    /// On a running device the new transport is brought up immediately.
    pub fn attach(&mut self, transport: T) -> Option<T> {
        let mut channel = ByteChannel::new(transport);
        if self.is_running() {
            channel.begin(self.config.baud_rate);
        }
        self.channel
            .replace(channel)
            .map(ByteChannel::into_transport)
    }

    /// Bring up the transport, install the built-in handlers and start running
    ///
    /// No-op if already running or if no transport is attached.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let Some(channel) = self.channel.as_mut() else {
            warn!("start ignored: no transport attached");
            return;
        };
        channel.begin(self.config.baud_rate);

        let queued = core::mem::replace(&mut self.handlers, builtins::table());
        for handler in queued {
            self.handlers.register(handler);
        }

        self.state = DeviceState::Running;
        info!(
            "device {} started at {} baud, {} handlers",
            self.config.device_id,
            self.config.baud_rate,
            self.handlers.len()
        );
    }

    /// Run one iteration of the protocol loop
    ///
    /// Non-blocking, except that a deposit frame blocks until its whole
    /// payload has arrived.
    pub fn poll(&mut self) -> PollOutcome {
        if !self.is_running() {
            return PollOutcome::Idle;
        }
        let resync = self.config.resync;
        let Some(channel) = self.channel.as_mut() else {
            return PollOutcome::Idle;
        };

        channel.poll();
        if channel.available() < FRAME_LEN {
            return PollOutcome::Idle;
        }
        if resync && channel.peek(FRAME_LEN - 1) != Some(TERMINATOR) {
            channel.discard(1);
            trace!("resync: discarded one byte");
            return PollOutcome::Resynced;
        }

        let mut raw = [0u8; FRAME_LEN];
        channel.read(&mut raw);
        let frame = match Frame::decode(&raw) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("dropping invalid frame: {}", e);
                // The announced payload is still on the wire
                if raw[0] == CMD_DEPOSIT {
                    channel.skip_exact(usize::from(join_u16(raw[3], raw[4])));
                }
                return PollOutcome::Dropped(e);
            }
        };

        let mut outcome = PollOutcome::Dispatched {
            command: frame.command,
        };
        if let Ok(header) = DepositHeader::from_frame(&frame) {
            let mut payload = vec![0u8; usize::from(header.length)].into_boxed_slice();
            channel.read_exact(&mut payload);
            debug!(
                "deposit of {} bytes at {=u16:#x}",
                header.length, header.address
            );
            self.buffers.put(header.address, payload);
            outcome = PollOutcome::Deposited {
                address: header.address,
                length: header.length,
            };
        }

        self.dispatch(frame.command, frame.a(), frame.b(), frame.c());
        outcome
    }

    /// Invoke the handler registered for `command`
    ///
    /// Unknown ids, and any id before the device is running, do nothing.
    pub fn dispatch(&mut self, command: u8, a: u8, b: u8, c: u8) {
        if !self.is_running() {
            return;
        }
        trace!("dispatch {=u8:#x}", command);
        let handler = self.handlers.resolve(command);
        handler.invoke(self, a, b, c);
    }

    fn write_raw(&mut self, bytes: &[u8]) {
        match self.channel.as_mut() {
            Some(channel) => channel.write(bytes),
            None => warn!("{} bytes dropped: no transport attached", bytes.len()),
        }
    }

    /// Send a typed message frame
    pub fn send_message(&mut self, message: &DeviceMessage) {
        self.write_raw(&message.to_frame().encode());
    }

    /// Send the command frame `[command, a, b, c, 0, 0xFF]`
    pub fn send_command(&mut self, command: u8, a: u8, b: u8, c: u8) {
        self.write_raw(&Frame::new(command, a, b, c).encode());
    }

    /// Deposit `data` on the host and return the address it was sent to
    ///
    /// Writes the deposit header followed immediately by the payload.
    pub fn write_buffer(&mut self, data: &[u8]) -> Result<u16, DeviceError> {
        if self.channel.is_none() {
            return Err(DeviceError::NotAttached);
        }
        let length =
            u16::try_from(data.len()).map_err(|_| DeviceError::PayloadTooLarge(data.len()))?;
        let address = self
            .addresses
            .allocate()
            .ok_or(DeviceError::AddressSpaceExhausted)?;
        self.send_message(&DeviceMessage::Deposit(DepositHeader { address, length }));
        self.write_raw(data);
        Ok(address)
    }

    /// Send a log message to the host
    ///
    /// The text is deposited first, then announced with a log frame.
    pub fn log(&mut self, level: LogLevel, message: &str) -> Result<u16, DeviceError> {
        let address = self.write_buffer(message.as_bytes())?;
        self.send_message(&DeviceMessage::Log {
            level: level.to_byte(),
            address,
        });
        Ok(address)
    }

    /// Report a fatal condition to the host
    ///
    /// Sends an exception frame carrying `code`, then the message text up to
    /// its first newline, then a newline.
    pub fn raise_exception(&mut self, code: u8, message: &str) {
        let text = message
            .split(char::from(EXCEPTION_TEXT_END))
            .next()
            .unwrap_or_default();
        self.send_message(&DeviceMessage::Exception { code });
        self.write_raw(text.as_bytes());
        self.write_raw(&[EXCEPTION_TEXT_END]);
    }

    /// Tear the device down, returning the transport
    pub fn dispose(mut self) -> Option<T> {
        self.clear_all_buffers();
        self.handlers.clear();
        self.channel.take().map(ByteChannel::into_transport)
    }
}
