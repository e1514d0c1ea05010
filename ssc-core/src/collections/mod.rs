//! Table primitives used by the device engine
//!
//! Both are insertion-ordered and index-addressable; neither sorts nor
//! deduplicates on its own.

pub mod address_map;
pub mod sequence;

pub use address_map::AddressMap;
pub use sequence::Sequence;
