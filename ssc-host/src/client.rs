//! Host-side protocol client
//!
//! Mirrors the device engine from the other end of the wire: frames are
//! read once six bytes are waiting, deposits are reassembled into a local
//! buffer map, and the device's built-in replies are turned into
//! [`HostEvent`]s.

use std::collections::HashMap;
use std::time::Duration;

use ssc_protocol::messages::{CMD_DEPOSIT, EXCEPTION_TEXT_END};
use ssc_protocol::{
    join_u16, AddressAllocator, DepositHeader, DeviceMessage, Frame, HostRequest, LogLevel,
    DEFAULT_BAUD_RATE, FRAME_LEN,
};

use crate::error::{HostError, Result};
use crate::link::Link;

/// Default time to wait for bytes that a frame promised
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Longest exception text accepted before the line is cut off
const MAX_EXCEPTION_TEXT: usize = 1024;

/// Host client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Serial baud rate
    pub baud_rate: u32,
    /// Serial read timeout
    pub read_timeout: Duration,
    /// Send info and name queries as soon as the port is open
    pub query_on_open: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
            query_on_open: true,
        }
    }
}

impl HostConfig {
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn with_query_on_open(mut self, query_on_open: bool) -> Self {
        self.query_on_open = query_on_open;
        self
    }
}

/// What the host has learned about the device so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub device_id: Option<u8>,
    pub protocol_version: Option<u8>,
    pub device_version: Option<u8>,
    pub name: Option<String>,
}

/// Something the device told the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Device-info reply
    Info {
        device_id: u8,
        protocol_version: u8,
        device_version: u8,
    },
    /// Device-name reply; the device is now connected
    Connected { name: String },
    /// Log message from the device
    Log {
        /// `None` for a level byte outside the known set
        level: Option<LogLevel>,
        message: String,
    },
    /// Payload stored in the local buffer map
    Deposited { address: u16, length: u16 },
    /// Any other command frame
    Command { command: u8, a: u8, b: u8, c: u8 },
}

/// Client for one device on one link
pub struct HostClient<L> {
    link: L,
    config: HostConfig,
    identity: DeviceIdentity,
    buffers: HashMap<u16, Vec<u8>>,
    addresses: AddressAllocator,
}

impl<L: Link> HostClient<L> {
    /// Create a client over an already open link
    pub fn new(link: L) -> Self {
        Self::with_config(link, HostConfig::default())
    }

    pub fn with_config(link: L, config: HostConfig) -> Self {
        Self {
            link,
            config,
            identity: DeviceIdentity::default(),
            buffers: HashMap::new(),
            addresses: AddressAllocator::new(),
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Ask the device for its info and name
    ///
    /// The replies arrive through [`poll`](Self::poll).
    pub fn begin(&mut self) -> Result<()> {
        log::debug!("Querying device info and name");
        self.send_request(&HostRequest::QueryInfo)?;
        self.send_request(&HostRequest::QueryName)
    }

    /// Read and handle at most one frame
    ///
    /// Returns `Ok(None)` while fewer than six bytes are waiting.
    pub fn poll(&mut self) -> Result<Option<HostEvent>> {
        if self.link.bytes_to_read()? < FRAME_LEN {
            return Ok(None);
        }
        let mut raw = [0u8; FRAME_LEN];
        self.link.read_exact(&mut raw)?;

        let frame = match Frame::decode(&raw) {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Invalid frame {:02X?}: {:?}", raw, e);
                // Keep the stream aligned past the announced payload
                if raw[0] == CMD_DEPOSIT {
                    let mut payload = vec![0u8; usize::from(join_u16(raw[3], raw[4]))];
                    self.link.read_exact(&mut payload)?;
                }
                return Err(HostError::InvalidFrame(e));
            }
        };

        let event = match DeviceMessage::from_frame(&frame) {
            DeviceMessage::Deposit(DepositHeader { address, length }) => {
                let mut payload = vec![0u8; usize::from(length)];
                self.link.read_exact(&mut payload)?;
                log::trace!("Deposit of {} bytes at 0x{:04X}", length, address);
                self.buffers.insert(address, payload);
                HostEvent::Deposited { address, length }
            }
            DeviceMessage::DeviceInfo {
                device_id,
                protocol_version,
                device_version,
            } => {
                self.identity.device_id = Some(device_id);
                self.identity.protocol_version = Some(protocol_version);
                self.identity.device_version = Some(device_version);
                HostEvent::Info {
                    device_id,
                    protocol_version,
                    device_version,
                }
            }
            DeviceMessage::DeviceName { address } => {
                let name = self.take_text(address)?;
                log::info!("Connected to device \"{}\"", name);
                self.identity.name = Some(name.clone());
                HostEvent::Connected { name }
            }
            DeviceMessage::Log { level, address } => {
                let message = self.take_text(address)?;
                let level = LogLevel::from_byte(level);
                log::debug!("Device log [{:?}]: {}", level, message);
                HostEvent::Log { level, message }
            }
            DeviceMessage::Exception { code } => {
                let message = self.read_exception_text()?;
                log::error!("Device exception 0x{:02X}: {}", code, message);
                return Err(HostError::DeviceException { code, message });
            }
            DeviceMessage::Command { command, a, b, c } => HostEvent::Command { command, a, b, c },
        };
        Ok(Some(event))
    }

    fn read_exception_text(&mut self) -> Result<String> {
        let mut text = Vec::new();
        let mut byte = [0u8; 1];
        while text.len() < MAX_EXCEPTION_TEXT {
            self.link.read_exact(&mut byte)?;
            if byte[0] == EXCEPTION_TEXT_END {
                break;
            }
            text.push(byte[0]);
        }
        Ok(String::from_utf8_lossy(&text).into_owned())
    }

    fn take_text(&mut self, address: u16) -> Result<String> {
        let bytes = self.take_buffer(address)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a typed request frame
    pub fn send_request(&mut self, request: &HostRequest) -> Result<()> {
        self.link.write_all(&request.to_frame().encode())?;
        self.link.flush()?;
        Ok(())
    }

    /// Invoke device handler `command`
    pub fn send_command(&mut self, command: u8, a: u8, b: u8, c: u8) -> Result<()> {
        self.send_request(&HostRequest::Command { command, a, b, c })
    }

    /// Drop every buffer on the device and restart its address counter
    ///
    /// Every address this client has deposited to becomes free again.
    pub fn reset_device(&mut self) -> Result<()> {
        self.send_request(&HostRequest::Reset)?;
        self.addresses.reset();
        Ok(())
    }

    /// Deposit `data` on the device and return its address
    ///
    /// Addresses are not reused until [`reset_device`](Self::reset_device).
    pub fn write_buffer(&mut self, data: &[u8]) -> Result<u16> {
        let length =
            u16::try_from(data.len()).map_err(|_| HostError::PayloadTooLarge(data.len()))?;
        let address = self
            .addresses
            .allocate()
            .ok_or(HostError::AddressSpaceExhausted)?;
        let header = HostRequest::Deposit(DepositHeader { address, length });
        self.link.write_all(&header.to_frame().encode())?;
        self.link.write_all(data)?;
        self.link.flush()?;
        log::trace!("Wrote {} bytes to 0x{:04X}", length, address);
        Ok(address)
    }

    /// Buffer the device deposited at `address`
    pub fn read_buffer(&self, address: u16) -> Result<&[u8]> {
        self.buffers
            .get(&address)
            .map(Vec::as_slice)
            .ok_or(HostError::BufferNotFound(address))
    }

    /// Remove a buffer and return it
    pub fn take_buffer(&mut self, address: u16) -> Result<Vec<u8>> {
        self.buffers
            .remove(&address)
            .ok_or(HostError::BufferNotFound(address))
    }

    /// Forget a buffer
    pub fn release_buffer(&mut self, address: u16) -> Result<()> {
        self.take_buffer(address).map(drop)
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Whether the device has answered the name query
    pub fn is_connected(&self) -> bool {
        self.identity.name.is_some()
    }

    /// Device name, once connected
    pub fn device_name(&self) -> Result<&str> {
        self.identity
            .name
            .as_deref()
            .ok_or(HostError::NotConnected)
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn into_link(self) -> L {
        self.link
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;

    #[derive(Default)]
    struct ScriptedLink {
        rx: VecDeque<u8>,
        tx: Vec<u8>,
    }

    impl ScriptedLink {
        fn with_rx(bytes: &[u8]) -> Self {
            Self {
                rx: bytes.iter().copied().collect(),
                tx: Vec::new(),
            }
        }
    }

    impl Link for ScriptedLink {
        fn bytes_to_read(&mut self) -> io::Result<usize> {
            Ok(self.rx.len())
        }

        fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
            if self.rx.len() < buf.len() {
                return Err(io::ErrorKind::TimedOut.into());
            }
            for slot in buf.iter_mut() {
                *slot = self.rx.pop_front().unwrap();
            }
            Ok(())
        }

        fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
            self.tx.extend_from_slice(data);
            Ok(())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn client(rx: &[u8]) -> HostClient<ScriptedLink> {
        HostClient::new(ScriptedLink::with_rx(rx))
    }

    #[test]
    fn test_begin_sends_queries() {
        let mut client = client(&[]);
        client.begin().unwrap();
        assert_eq!(
            client.link_mut().tx,
            [0x01, 0, 0, 0, 0, 0xFF, 0x02, 0, 0, 0, 0, 0xFF]
        );
    }

    #[test]
    fn test_poll_waits_for_full_frame() {
        let mut client = client(&[0x01, 7, 1]);
        assert_eq!(client.poll().unwrap(), None);
    }

    #[test]
    fn test_info_reply_updates_identity() {
        let mut client = client(&[0x01, 123, 1, 2, 0, 0xFF]);
        assert_eq!(
            client.poll().unwrap(),
            Some(HostEvent::Info {
                device_id: 123,
                protocol_version: 1,
                device_version: 2
            })
        );
        assert_eq!(client.identity().device_id, Some(123));
        assert!(!client.is_connected());
    }

    #[test]
    fn test_name_reply_connects_and_consumes_buffer() {
        let mut rx = vec![0x03, 0x00, 0x05, 0x00, 0x04, 0xFF];
        rx.extend_from_slice(b"Cool");
        rx.extend_from_slice(&[0x02, 0x00, 0x05, 0, 0, 0xFF]);
        let mut client = client(&rx);

        assert_eq!(
            client.poll().unwrap(),
            Some(HostEvent::Deposited {
                address: 5,
                length: 4
            })
        );
        assert_eq!(
            client.poll().unwrap(),
            Some(HostEvent::Connected {
                name: "Cool".into()
            })
        );
        assert_eq!(client.device_name().unwrap(), "Cool");
        assert_eq!(client.buffer_count(), 0);
    }

    #[test]
    fn test_device_name_before_connect() {
        let client = client(&[]);
        assert!(matches!(client.device_name(), Err(HostError::NotConnected)));
    }

    #[test]
    fn test_log_reply() {
        let mut rx = vec![0x03, 0x01, 0x00, 0x00, 0x02, 0xFF];
        rx.extend_from_slice(b"hi");
        rx.extend_from_slice(&[0x04, 0x02, 0x01, 0x00, 0, 0xFF]);
        let mut client = client(&rx);
        client.poll().unwrap();

        assert_eq!(
            client.poll().unwrap(),
            Some(HostEvent::Log {
                level: Some(LogLevel::Warn),
                message: "hi".into()
            })
        );
        assert!(matches!(
            client.read_buffer(0x0100),
            Err(HostError::BufferNotFound(0x0100))
        ));
    }

    #[test]
    fn test_log_without_buffer_is_an_error() {
        let mut client = client(&[0x04, 0x03, 0x00, 0x09, 0, 0xFF]);
        assert!(matches!(client.poll(), Err(HostError::BufferNotFound(9))));
    }

    #[test]
    fn test_exception_reads_rest_of_line() {
        let mut rx = vec![0x07, 0x05, 0, 0, 0, 0xFF];
        rx.extend_from_slice(b"boom\n");
        rx.extend_from_slice(&[0x20, 0, 0, 0, 0, 0xFF]);
        let mut client = client(&rx);

        match client.poll() {
            Err(HostError::DeviceException { code, message }) => {
                assert_eq!(code, 5);
                assert_eq!(message, "boom");
            }
            other => panic!("expected exception, got {:?}", other),
        }
        assert_eq!(
            client.poll().unwrap(),
            Some(HostEvent::Command {
                command: 0x20,
                a: 0,
                b: 0,
                c: 0
            })
        );
    }

    #[test]
    fn test_invalid_terminator() {
        let mut client = client(&[0x20, 0, 0, 0, 0, 0x00]);
        assert!(matches!(client.poll(), Err(HostError::InvalidFrame(_))));
    }

    #[test]
    fn test_invalid_deposit_header_discards_payload() {
        let mut rx = vec![0x03, 0x00, 0x01, 0x00, 0x06, 0x00];
        rx.extend_from_slice(&[0x20, 0, 0, 0, 0, 0xFF]);
        rx.extend_from_slice(&[0x21, 1, 2, 3, 0, 0xFF]);
        let mut client = client(&rx);

        assert!(matches!(client.poll(), Err(HostError::InvalidFrame(_))));
        assert_eq!(
            client.poll().unwrap(),
            Some(HostEvent::Command {
                command: 0x21,
                a: 1,
                b: 2,
                c: 3
            })
        );
        assert_eq!(client.buffer_count(), 0);
    }

    #[test]
    fn test_write_buffer_frames_payload() {
        let mut client = client(&[]);
        assert_eq!(client.write_buffer(b"abc").unwrap(), 0);
        assert_eq!(client.write_buffer(b"de").unwrap(), 1);

        let mut expected = vec![0x03, 0x00, 0x00, 0x00, 0x03, 0xFF];
        expected.extend_from_slice(b"abc");
        expected.extend_from_slice(&[0x03, 0x00, 0x01, 0x00, 0x02, 0xFF]);
        expected.extend_from_slice(b"de");
        assert_eq!(client.link_mut().tx, expected);
    }

    #[test]
    fn test_inbound_deposits_do_not_shift_outbound_addresses() {
        let mut client = client(&[0x03, 0x00, 0x00, 0x00, 0x00, 0xFF]);
        client.poll().unwrap();
        assert_eq!(client.write_buffer(b"x").unwrap(), 0);
    }

    #[test]
    fn test_outbound_address_not_reissued_until_reset() {
        let mut client = client(&[]);
        assert_eq!(client.write_buffer(b"held by device").unwrap(), 0);
        for _ in 1..=u16::MAX {
            assert_ne!(client.write_buffer(&[]).unwrap(), 0);
        }
        assert!(matches!(
            client.write_buffer(b"other"),
            Err(HostError::AddressSpaceExhausted)
        ));

        client.reset_device().unwrap();
        assert_eq!(client.write_buffer(b"other").unwrap(), 0);
    }

    #[test]
    fn test_write_buffer_rejects_oversized_payload() {
        let mut client = client(&[]);
        let big = vec![0u8; 70_000];
        assert!(matches!(
            client.write_buffer(&big),
            Err(HostError::PayloadTooLarge(70_000))
        ));
        assert!(client.link_mut().tx.is_empty());
    }

    #[test]
    fn test_release_buffer() {
        let mut client = client(&[0x03, 0x00, 0x02, 0x00, 0x01, 0xFF, 0x7F]);
        client.poll().unwrap();
        assert_eq!(client.read_buffer(2).unwrap(), &[0x7F]);
        client.release_buffer(2).unwrap();
        assert!(client.release_buffer(2).is_err());
    }

    #[test]
    fn test_truncated_deposit_payload_is_io_error() {
        let mut client = client(&[0x03, 0x00, 0x02, 0x00, 0x04, 0xFF, 0x01]);
        assert!(matches!(client.poll(), Err(HostError::Io(_))));
    }

    #[test]
    fn test_send_command_and_reset() {
        let mut client = client(&[]);
        client.send_command(0x10, 1, 2, 3).unwrap();
        client.reset_device().unwrap();
        assert_eq!(
            client.link_mut().tx,
            [0x10, 1, 2, 3, 0, 0xFF, 0x04, 0, 0, 0, 0, 0xFF]
        );
    }
}
