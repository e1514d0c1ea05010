//! Outbound buffer address allocation
//!
//! The sender cannot see when the receiver clears a buffer, so an address
//! counts as live from the moment it is issued until the next reset. The
//! counter wraps 0xFFFF → 0x0000, but it never hands out an address twice
//! between resets: once all 65536 have been issued, allocation fails.

const ADDRESS_SPACE: u32 = 1 << 16;

/// Sequential 16-bit address counter with reset-scoped uniqueness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AddressAllocator {
    next: u16,
    issued: u32,
}

impl AddressAllocator {
    /// Counter starting at address 0
    pub const fn new() -> Self {
        Self { next: 0, issued: 0 }
    }

    /// Counter starting at `next`
    pub const fn starting_at(next: u16) -> Self {
        Self { next, issued: 0 }
    }

    /// Address the next allocation will return
    pub fn next_address(&self) -> u16 {
        self.next
    }

    /// Addresses issued since the last reset
    pub fn issued(&self) -> u32 {
        self.issued
    }

    /// Addresses still available before a reset is needed
    pub fn remaining(&self) -> u32 {
        ADDRESS_SPACE - self.issued
    }

    /// Issue the next address, or `None` when every address is outstanding
    pub fn allocate(&mut self) -> Option<u16> {
        if self.issued >= ADDRESS_SPACE {
            return None;
        }
        let address = self.next;
        self.next = address.wrapping_add(1);
        self.issued += 1;
        Some(address)
    }

    /// Forget every issued address and restart at 0
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
