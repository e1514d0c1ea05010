//! Command handler table
//!
//! A handler's position in the table is its command id. Slots are only
//! ever appended, so an id never changes once assigned.

use core::fmt;

use ssc_hal::Transport;

use super::Device;
use crate::collections::Sequence;

/// Command callback: receives the device and the frame's three parameters
pub type CommandFn<T> = fn(&mut Device<T>, u8, u8, u8);

/// A handler table slot
pub enum Handler<T> {
    /// Does nothing; also what unknown ids resolve to
    Noop,
    /// Calls the function
    Command(CommandFn<T>),
}

// Derives would require T: Clone + Debug
impl<T> Clone for Handler<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handler<T> {}

impl<T> fmt::Debug for Handler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Noop => f.write_str("Noop"),
            Handler::Command(_) => f.write_str("Command"),
        }
    }
}

impl<T> Handler<T> {
    /// Whether this slot is a no-op
    pub fn is_noop(&self) -> bool {
        matches!(self, Handler::Noop)
    }
}

impl<T: Transport> Handler<T> {
    /// Run the handler against a device
    pub fn invoke(self, device: &mut Device<T>, a: u8, b: u8, c: u8) {
        if let Handler::Command(f) = self {
            f(device, a, b, c);
        }
    }
}

/// Ordered table mapping command id to handler
pub struct HandlerTable<T> {
    slots: Sequence<Handler<T>>,
}

impl<T> Default for HandlerTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandlerTable<T> {
    /// Create an empty table
    pub const fn new() -> Self {
        Self {
            slots: Sequence::new(),
        }
    }

    /// Append a handler, returning the index it was given
    pub fn register(&mut self, handler: Handler<T>) -> usize {
        self.slots.append(handler)
    }

    /// Handler for `command`; out-of-range ids resolve to [`Handler::Noop`]
    pub fn resolve(&self, command: u8) -> Handler<T> {
        self.slots
            .at(usize::from(command))
            .copied()
            .unwrap_or(Handler::Noop)
    }

    /// Number of slots, no-ops included
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the table has no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop every slot
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl<T> IntoIterator for HandlerTable<T> {
    type Item = Handler<T>;
    type IntoIter = alloc::vec::IntoIter<Handler<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.into_iter()
    }
}
