//! Device engine errors
//!
//! Frame-level problems never surface here: invalid frames are dropped
//! during polling and reported through `PollOutcome::Dropped`.

/// Errors returned by device buffer and registration operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError {
    /// No managed buffer at this address (never allocated or already cleared)
    BufferNotFound(u16),
    /// Payload does not fit the 16-bit length field
    PayloadTooLarge(usize),
    /// Every 16-bit address has been issued since the last reset
    AddressSpaceExhausted,
    /// No transport attached to carry the bytes
    NotAttached,
    /// All 256 command ids are taken
    HandlerTableFull,
}
