//! Scripted transport shared by unit tests

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use ssc_hal::Transport;

#[derive(Default)]
struct Wire {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    baud_rate: Option<u32>,
    begin_calls: usize,
}

/// In-memory transport; clones share the same wire so a test can keep a
/// handle after the transport has been moved into a device.
#[derive(Clone, Default)]
pub(crate) struct MockTransport {
    wire: Rc<RefCell<Wire>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for the device to receive
    pub(crate) fn feed(&self, bytes: &[u8]) {
        self.wire.borrow_mut().rx.extend(bytes.iter().copied());
    }

    /// Bytes received by the wire but not yet read
    pub(crate) fn pending(&self) -> usize {
        self.wire.borrow().rx.len()
    }

    /// Drain everything the device has written so far
    pub(crate) fn take_sent(&self) -> Vec<u8> {
        core::mem::take(&mut self.wire.borrow_mut().tx)
    }

    pub(crate) fn baud_rate(&self) -> Option<u32> {
        self.wire.borrow().baud_rate
    }

    pub(crate) fn begin_calls(&self) -> usize {
        self.wire.borrow().begin_calls
    }
}

impl Transport for MockTransport {
    fn begin(&mut self, baud_rate: u32) {
        let mut wire = self.wire.borrow_mut();
        wire.baud_rate = Some(baud_rate);
        wire.begin_calls += 1;
    }

    fn byte_ready(&mut self) -> bool {
        !self.wire.borrow().rx.is_empty()
    }

    fn read_byte(&mut self) -> u8 {
        self.wire
            .borrow_mut()
            .rx
            .pop_front()
            .expect("blocking read on an empty mock wire")
    }

    fn write_byte(&mut self, byte: u8) {
        self.wire.borrow_mut().tx.push(byte);
    }
}
