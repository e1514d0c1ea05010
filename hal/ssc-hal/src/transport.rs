//! Serial transport abstraction
//!
//! The protocol only needs four primitives from the wire: a one-time
//! `begin`, a non-blocking readiness check, and blocking single-byte read
//! and write. Transports are infallible at this level; a peripheral that
//! never becomes ready simply blocks the caller.

use embedded_io::{Read, ReadReady, Write};

/// Byte-oriented serial transport
///
/// Implemented by chip-specific UART drivers and by test doubles.
pub trait Transport {
    /// Bring up the peripheral at the given baud rate
    ///
    /// Called once, when the device is started.
    fn begin(&mut self, baud_rate: u32);

    /// Check whether a received byte is waiting
    ///
    /// Must not block.
    fn byte_ready(&mut self) -> bool;

    /// Read one byte
    ///
    /// Blocks until a byte has been received.
    fn read_byte(&mut self) -> u8;

    /// Write one byte
    ///
    /// Blocks until the peripheral has accepted the byte.
    fn write_byte(&mut self, byte: u8);

    /// Write a run of bytes, one at a time
    fn write_bytes(&mut self, data: &[u8]) {
        for &byte in data {
            self.write_byte(byte);
        }
    }

    /// Flush any bytes the peripheral is still holding
    fn flush(&mut self) {}
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn begin(&mut self, baud_rate: u32) {
        (**self).begin(baud_rate);
    }

    fn byte_ready(&mut self) -> bool {
        (**self).byte_ready()
    }

    fn read_byte(&mut self) -> u8 {
        (**self).read_byte()
    }

    fn write_byte(&mut self, byte: u8) {
        (**self).write_byte(byte);
    }

    fn write_bytes(&mut self, data: &[u8]) {
        (**self).write_bytes(data);
    }

    fn flush(&mut self) {
        (**self).flush();
    }
}

/// Adapter from a blocking `embedded-io` serial port to [`Transport`]
///
/// The peripheral is expected to be configured (pins, baud rate) by its own
/// HAL before it is wrapped; `begin` only records the requested rate.
/// Peripheral errors are absorbed: a failed readiness check reads as "not
/// ready" and failed reads/writes are retried until they succeed.
pub struct IoTransport<P> {
    port: P,
    baud_rate: Option<u32>,
}

impl<P> IoTransport<P> {
    /// Wrap an `embedded-io` serial port
    pub fn new(port: P) -> Self {
        Self {
            port,
            baud_rate: None,
        }
    }

    /// Baud rate requested by `begin`, if it has been called
    pub fn baud_rate(&self) -> Option<u32> {
        self.baud_rate
    }

    /// Get mutable access to the wrapped port
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Release the wrapped port
    pub fn into_inner(self) -> P {
        self.port
    }
}

impl<P: Read + Write + ReadReady> Transport for IoTransport<P> {
    fn begin(&mut self, baud_rate: u32) {
        self.baud_rate = Some(baud_rate);
    }

    fn byte_ready(&mut self) -> bool {
        self.port.read_ready().unwrap_or(false)
    }

    fn read_byte(&mut self) -> u8 {
        let mut buf = [0u8; 1];
        loop {
            if let Ok(1) = self.port.read(&mut buf) {
                return buf[0];
            }
        }
    }

    fn write_byte(&mut self, byte: u8) {
        while !matches!(self.port.write(&[byte]), Ok(1)) {}
    }

    fn flush(&mut self) {
        while self.port.flush().is_err() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{ErrorKind, ErrorType};

    /// Port that fails every other operation, then succeeds
    struct FlakyPort {
        rx: [u8; 4],
        rx_pos: usize,
        tx: [u8; 4],
        tx_len: usize,
        fail_next: bool,
    }

    impl FlakyPort {
        fn new(rx: [u8; 4]) -> Self {
            Self {
                rx,
                rx_pos: 0,
                tx: [0; 4],
                tx_len: 0,
                fail_next: true,
            }
        }

        fn flip(&mut self) -> bool {
            let fail = self.fail_next;
            self.fail_next = !self.fail_next;
            fail
        }
    }

    impl ErrorType for FlakyPort {
        type Error = ErrorKind;
    }

    impl Read for FlakyPort {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            if self.flip() {
                return Err(ErrorKind::Other);
            }
            buf[0] = self.rx[self.rx_pos];
            self.rx_pos += 1;
            Ok(1)
        }
    }

    impl Write for FlakyPort {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            if self.flip() {
                return Err(ErrorKind::Other);
            }
            self.tx[self.tx_len] = buf[0];
            self.tx_len += 1;
            Ok(1)
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    impl ReadReady for FlakyPort {
        fn read_ready(&mut self) -> Result<bool, Self::Error> {
            if self.flip() {
                return Err(ErrorKind::Other);
            }
            Ok(self.rx_pos < self.rx.len())
        }
    }

    #[test]
    fn test_begin_records_baud_rate() {
        let mut transport = IoTransport::new(FlakyPort::new([0; 4]));
        assert_eq!(transport.baud_rate(), None);
        transport.begin(9600);
        assert_eq!(transport.baud_rate(), Some(9600));
    }

    #[test]
    fn test_ready_error_reads_as_not_ready() {
        let mut transport = IoTransport::new(FlakyPort::new([1, 2, 3, 4]));
        assert!(!transport.byte_ready()); // first call fails
        assert!(transport.byte_ready());
    }

    #[test]
    fn test_read_retries_until_success() {
        let mut transport = IoTransport::new(FlakyPort::new([0x10, 0x20, 0x30, 0x40]));
        assert_eq!(transport.read_byte(), 0x10);
        assert_eq!(transport.read_byte(), 0x20);
    }

    #[test]
    fn test_write_bytes_retries_each_byte() {
        let mut transport = IoTransport::new(FlakyPort::new([0; 4]));
        transport.write_bytes(&[0xAA, 0xBB, 0xCC]);
        let port = transport.into_inner();
        assert_eq!(port.tx_len, 3);
        assert_eq!(&port.tx[..3], &[0xAA, 0xBB, 0xCC]);
    }
}
