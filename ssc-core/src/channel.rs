//! Buffered byte channel over a serial transport
//!
//! Inbound bytes trickle into a fixed-capacity ring, one per [`ByteChannel::poll`],
//! so the device loop never blocks waiting for a frame. Bulk payloads bypass
//! the ring with the blocking [`ByteChannel::read_exact`].

use heapless::Deque;
use ssc_hal::Transport;

/// Default receive ring size in bytes
pub const DEFAULT_RING_CAPACITY: usize = 16;

/// Receive ring plus blocking write path over a [`Transport`]
///
/// When the ring is full the oldest unread byte is overwritten.
pub struct ByteChannel<T, const N: usize = DEFAULT_RING_CAPACITY> {
    transport: T,
    ring: Deque<u8, N>,
    overwritten: u32,
}

impl<T: Transport, const N: usize> ByteChannel<T, N> {
    /// Create a channel over the given transport
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            ring: Deque::new(),
            overwritten: 0,
        }
    }

    /// Bring up the underlying transport
    pub fn begin(&mut self, baud_rate: u32) {
        self.transport.begin(baud_rate);
    }

    /// Move at most one ready byte from the transport into the ring
    ///
    /// Returns `true` if a byte was taken. Must be called once per loop
    /// iteration for [`available`](Self::available) to advance.
    pub fn poll(&mut self) -> bool {
        if !self.transport.byte_ready() {
            return false;
        }
        let byte = self.transport.read_byte();
        if self.ring.is_full() {
            self.ring.pop_front();
            self.overwritten = self.overwritten.wrapping_add(1);
            warn!("receive ring full, oldest byte overwritten");
        }
        // A slot is always free here
        let _ = self.ring.push_back(byte);
        true
    }

    /// Number of unread bytes in the ring
    pub fn available(&self) -> usize {
        self.ring.len()
    }

    /// Ring capacity in bytes
    pub fn capacity(&self) -> usize {
        N
    }

    /// Count of bytes lost to ring overflow since creation
    pub fn overwritten(&self) -> u32 {
        self.overwritten
    }

    /// Look at an unread byte without consuming it
    pub fn peek(&self, index: usize) -> Option<u8> {
        self.ring.iter().nth(index).copied()
    }

    /// Drop up to `count` unread bytes, returning how many were dropped
    pub fn discard(&mut self, count: usize) -> usize {
        let mut dropped = 0;
        while dropped < count && self.ring.pop_front().is_some() {
            dropped += 1;
        }
        dropped
    }

    /// Non-blocking read from the ring
    ///
    /// Fills `buf` with up to `buf.len()` unread bytes and returns the
    /// number copied; a short read means fewer bytes were buffered.
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut count = 0;
        for slot in buf.iter_mut() {
            match self.ring.pop_front() {
                Some(byte) => *slot = byte,
                None => break,
            }
            count += 1;
        }
        count
    }

    /// Blocking read of exactly `buf.len()` bytes
    ///
    /// Bytes already sitting in the ring are taken first so stream order is
    /// kept; the rest are pulled straight from the transport, waiting on
    /// readiness for each one. Never returns if the transport stalls.
    pub fn read_exact(&mut self, buf: &mut [u8]) {
        let buffered = self.read(buf);
        for slot in &mut buf[buffered..] {
            while !self.transport.byte_ready() {}
            *slot = self.transport.read_byte();
        }
    }

    /// Blocking discard of exactly `count` bytes
    ///
    /// Same ordering as [`read_exact`](Self::read_exact): ring first, then
    /// the transport.
    pub fn skip_exact(&mut self, count: usize) {
        let buffered = self.discard(count);
        for _ in buffered..count {
            while !self.transport.byte_ready() {}
            self.transport.read_byte();
        }
    }

    /// Blocking write of every byte in `data`
    pub fn write(&mut self, data: &[u8]) {
        self.transport.write_bytes(data);
        self.transport.flush();
    }

    /// Get mutable access to the underlying transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Release the underlying transport
    pub fn into_transport(self) -> T {
        self.transport
    }
}
