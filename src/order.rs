//! Order record - the fixed-size element stored inside a flow.
//!
//! The flow container never interprets the payload; it only needs a
//! fixed byte size and a stable wire layout so that persisted blocks
//! stay readable.

use byteorder::{ByteOrder, LittleEndian};
use std::fmt;

/// Byte size of one order slot inside a flow block.
pub const ORDER_SIZE: usize = 32;

/// A single trade order - exactly 32 bytes on the wire.
///
/// # Wire Layout (little-endian)
///
/// | Field      | Type | Offset | Size |
/// |------------|------|--------|------|
/// | id         | u64  | 0      | 8    |
/// | own        | u64  | 8      | 8    |
/// | qtt        | u64  | 16     | 8    |
/// | flags      | u32  | 24     | 4    |
/// | _reserved  | u32  | 28     | 4    |
/// | **Total**  |      |        | 32   |
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FlowOrder {
    /// External order identity (uniqueness is the caller's concern)
    pub id: u64,

    /// Owner / counterparty id
    pub own: u64,

    /// Offered quantity
    pub qtt: u64,

    /// Status flags (uninterpreted by the container)
    pub flags: u32,

    /// Reserved for future use, zero on construction
    pub _reserved: u32,
}

// Compile-time assertion: FlowOrder must be exactly 32 bytes
const _: () = assert!(
    std::mem::size_of::<FlowOrder>() == ORDER_SIZE,
    "FlowOrder must be exactly 32 bytes"
);

impl FlowOrder {
    /// Create a new order with the given identity, owner, and quantity
    #[inline]
    pub const fn new(id: u64, own: u64, qtt: u64) -> Self {
        Self {
            id,
            own,
            qtt,
            flags: 0,
            _reserved: 0,
        }
    }

    /// Create a zeroed order (empty slot contents)
    #[inline]
    pub const fn empty() -> Self {
        Self {
            id: 0,
            own: 0,
            qtt: 0,
            flags: 0,
            _reserved: 0,
        }
    }

    /// Encode into exactly one `ORDER_SIZE` slot.
    ///
    /// # Panics
    /// Panics if `buf` is shorter than `ORDER_SIZE`.
    #[inline]
    pub fn write_to(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= ORDER_SIZE, "Slot too small");
        LittleEndian::write_u64(&mut buf[0..8], self.id);
        LittleEndian::write_u64(&mut buf[8..16], self.own);
        LittleEndian::write_u64(&mut buf[16..24], self.qtt);
        LittleEndian::write_u32(&mut buf[24..28], self.flags);
        LittleEndian::write_u32(&mut buf[28..32], self._reserved);
    }

    /// Decode from exactly one `ORDER_SIZE` slot.
    ///
    /// # Panics
    /// Panics if `buf` is shorter than `ORDER_SIZE`.
    #[inline]
    pub fn read_from(buf: &[u8]) -> Self {
        debug_assert!(buf.len() >= ORDER_SIZE, "Slot too small");
        Self {
            id: LittleEndian::read_u64(&buf[0..8]),
            own: LittleEndian::read_u64(&buf[8..16]),
            qtt: LittleEndian::read_u64(&buf[16..24]),
            flags: LittleEndian::read_u32(&buf[24..28]),
            _reserved: LittleEndian::read_u32(&buf[28..32]),
        }
    }
}

impl fmt::Debug for FlowOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowOrder")
            .field("id", &self.id)
            .field("own", &self.own)
            .field("qtt", &self.qtt)
            .field("flags", &self.flags)
            .finish()
    }
}
