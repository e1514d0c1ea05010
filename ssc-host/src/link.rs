//! Byte link between host and device
//!
//! A [`Link`] is whatever carries bytes to the device: a serial port in
//! production, an in-memory pipe in tests.

use std::io;

/// Blocking byte link with a receive-count query
pub trait Link {
    /// Bytes received and waiting to be read
    fn bytes_to_read(&mut self) -> io::Result<usize>;

    /// Read exactly `buf.len()` bytes
    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()>;

    /// Write all of `data`
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Push any buffered output onto the wire
    fn flush(&mut self) -> io::Result<()>;
}

impl<L: Link + ?Sized> Link for &mut L {
    fn bytes_to_read(&mut self) -> io::Result<usize> {
        (**self).bytes_to_read()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        (**self).read_exact(buf)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write_all(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

#[cfg(feature = "serial")]
pub mod serial {
    //! Serial port link

    use super::Link;
    use crate::client::{HostClient, HostConfig};
    use crate::error::Result;
    use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
    use std::io::{self, Read, Write};

    impl Link for Box<dyn SerialPort> {
        fn bytes_to_read(&mut self) -> io::Result<usize> {
            let count = SerialPort::bytes_to_read(&**self).map_err(io::Error::from)?;
            Ok(count as usize)
        }

        fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
            Read::read_exact(self, buf)
        }

        fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
            Write::write_all(self, data)
        }

        fn flush(&mut self) -> io::Result<()> {
            Write::flush(self)
        }
    }

    /// Open `path` as an 8N1 serial port
    pub fn open_port(path: &str, config: &HostConfig) -> Result<Box<dyn SerialPort>> {
        let port = serialport::new(path, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.read_timeout)
            .open()?;

        log::info!("Opened serial port {} at {} baud", path, config.baud_rate);
        Ok(port)
    }

    impl HostClient<Box<dyn SerialPort>> {
        /// Open a serial port and attach a client to it
        ///
        /// Queries the device's info and name right away when
        /// [`HostConfig::query_on_open`] is set.
        pub fn open(path: &str, config: HostConfig) -> Result<Self> {
            let port = open_port(path, &config)?;
            let query = config.query_on_open;
            let mut client = HostClient::with_config(port, config);
            if query {
                client.begin()?;
            }
            Ok(client)
        }
    }
}
