//! Flow - an ordered sequence of orders in one self-describing block.
//!
//! A flow owns a single [`RawBlock`] laid out per [`crate::layout`]:
//! 8-byte header, then `dim` tightly packed orders, then allocated but
//! unused capacity. Two extend paths exist:
//!
//! - [`Flow::extend_in_place`] takes the flow by value and gives back
//!   the only valid handle to the (possibly relocated) block. Exclusive
//!   ownership is the whole safety story; there is no runtime aliasing
//!   check because the borrow checker already enforces the contract.
//! - [`Flow::extend_with_copy`] never touches its input and returns an
//!   independent flow, for blocks that may be referenced elsewhere.
//!
//! Neither path checks whether the order's identity already appears in
//! the flow; duplicate prevention belongs to the caller.

use crate::arena::{AllocError, FlowArena, RawBlock};
use crate::layout::{
    grown_size, read_header, required_size, slot_offset, validate_header, write_header,
    write_total_size, HeaderError, BLOCK_SIZE, HEADER_SIZE, MAX_DIM,
};
use crate::order::{FlowOrder, ORDER_SIZE};
use std::fmt;
use thiserror::Error;

/// Failures surfaced by flow operations.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Alloc(#[from] AllocError),

    #[error(transparent)]
    Header(#[from] HeaderError),
}

/// An ordered sequence of [`FlowOrder`]s in one length-prefixed block.
pub struct Flow {
    block: RawBlock,
}

impl Flow {
    // ========================================================================
    // Factory Operations
    // ========================================================================

    /// Create an empty flow with room for one growth increment
    /// (`BLOCK_SIZE` = 2 orders) before the first reallocation.
    pub fn init(arena: &mut FlowArena) -> Result<Self, AllocError> {
        let size = required_size(BLOCK_SIZE);
        let mut block = arena.alloc_zeroed(size)?;
        write_header(block.bytes_mut(), size as u32, 0);
        Ok(Self { block })
    }

    /// Create a scratch flow pre-sized for `MAX_DIM` orders.
    ///
    /// Only the self-describing length is set; `dim` and the slots are
    /// unspecified until the caller populates the block through
    /// [`Flow::as_bytes_mut`]. Reading the flow before that is a
    /// contract violation.
    pub fn placeholder(arena: &mut FlowArena) -> Result<Self, AllocError> {
        let size = required_size(MAX_DIM);
        let mut block = arena.alloc(size)?;
        write_total_size(block.bytes_mut(), size as u32);
        Ok(Self { block })
    }

    /// Byte-identical duplicate of this flow, including unused trailing
    /// capacity. The copy is fully independent.
    pub fn duplicate(&self, arena: &mut FlowArena) -> Result<Self, AllocError> {
        let mut block = arena.alloc(self.block.len())?;
        block.bytes_mut().copy_from_slice(self.block.bytes());
        Ok(Self { block })
    }

    /// Reinterpret a persisted block as a flow, validating its header
    /// against the byte length before accepting it.
    pub fn from_bytes(bytes: &[u8], arena: &mut FlowArena) -> Result<Self, FlowError> {
        validate_header(bytes)?;
        let mut block = arena.alloc(bytes.len())?;
        block.bytes_mut().copy_from_slice(bytes);
        Ok(Self { block })
    }

    // ========================================================================
    // Extend Operations
    // ========================================================================

    /// Append or prepend one order, mutating this flow's block.
    ///
    /// Takes the flow by value: growth may relocate the block, and the
    /// returned flow is the only valid handle afterwards. Grows by
    /// exactly one `BLOCK_SIZE` increment, and only when `dim` has
    /// reached capacity.
    ///
    /// # Panics
    /// Panics if the stored `total_size` is inconsistent with `dim`;
    /// proceeding would risk an out-of-bounds write.
    pub fn extend_in_place(
        self,
        order: &FlowOrder,
        at_front: bool,
        arena: &mut FlowArena,
    ) -> Result<Self, AllocError> {
        let (dim, used, total) = self.check_extend_invariant();

        let mut block = self.block;
        if used + ORDER_SIZE > total {
            block = arena.grow(block, grown_size(total))?;
        }

        let bytes = block.bytes_mut();
        if at_front {
            // Overlap-safe shift opens slot 0
            bytes.copy_within(slot_offset(0)..slot_offset(dim), slot_offset(1));
            order.write_to(&mut bytes[slot_offset(0)..]);
        } else {
            order.write_to(&mut bytes[slot_offset(dim)..]);
        }

        let new_total = bytes.len() as u32;
        write_header(bytes, new_total, (dim + 1) as i16);
        Ok(Self { block })
    }

    /// Append or prepend one order into a brand-new flow, leaving this
    /// flow's bytes untouched.
    ///
    /// Applies the same growth rule as [`Flow::extend_in_place`], but
    /// to a freshly allocated block. Safe under sharing: any number of
    /// references to `self` may exist.
    ///
    /// # Panics
    /// Panics if the stored `total_size` is inconsistent with `dim`.
    pub fn extend_with_copy(
        &self,
        order: &FlowOrder,
        at_front: bool,
        arena: &mut FlowArena,
    ) -> Result<Self, AllocError> {
        let (dim, used, total) = self.check_extend_invariant();

        let new_size = if used + ORDER_SIZE > total {
            grown_size(total)
        } else {
            total
        };
        let mut block = arena.alloc(new_size)?;

        let src = self.block.bytes();
        let dst = block.bytes_mut();
        if at_front {
            dst[..HEADER_SIZE].copy_from_slice(&src[..HEADER_SIZE]);
            order.write_to(&mut dst[slot_offset(0)..]);
            dst[slot_offset(1)..slot_offset(dim + 1)]
                .copy_from_slice(&src[slot_offset(0)..slot_offset(dim)]);
        } else {
            dst[..used].copy_from_slice(&src[..used]);
            order.write_to(&mut dst[slot_offset(dim)..]);
        }

        write_header(dst, new_size as u32, (dim + 1) as i16);
        Ok(Self { block })
    }

    /// Entry invariant shared by both extend paths. Returns
    /// `(dim, occupied bytes, block length)`.
    fn check_extend_invariant(&self) -> (usize, usize, usize) {
        let (stored, dim) = read_header(self.block.bytes());
        assert!(dim >= 0, "Negative element count {dim}");
        let dim = dim as usize;
        let used = required_size(dim);
        assert!(
            stored as usize >= used,
            "Corrupt flow header: total_size {stored} cannot hold {dim} orders"
        );
        debug_assert_eq!(stored as usize, self.block.len());
        (dim, used, self.block.len())
    }

    // ========================================================================
    // Read Access
    // ========================================================================

    /// Number of orders currently stored.
    #[inline]
    pub fn dim(&self) -> usize {
        let (_, dim) = read_header(self.block.bytes());
        debug_assert!(dim >= 0);
        dim as usize
    }

    /// Orders the current allocation can hold without growing.
    #[inline]
    pub fn capacity(&self) -> usize {
        (self.block.len() - HEADER_SIZE) / ORDER_SIZE
    }

    /// Self-describing block length from the header.
    #[inline]
    pub fn total_size(&self) -> usize {
        let (total_size, _) = read_header(self.block.bytes());
        total_size as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dim() == 0
    }

    /// Decode the order at `index`.
    ///
    /// # Panics
    /// Panics if `index >= dim`.
    #[inline]
    pub fn order_at(&self, index: usize) -> FlowOrder {
        assert!(index < self.dim(), "Order index {index} out of bounds");
        FlowOrder::read_from(&self.block.bytes()[slot_offset(index)..])
    }

    /// Decode all stored orders, in sequence order.
    pub fn orders(&self) -> Vec<FlowOrder> {
        (0..self.dim()).map(|i| self.order_at(i)).collect()
    }

    /// The raw block, header and unused capacity included, ready to
    /// hand to a storage collaborator.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.block.bytes()
    }

    /// Write access to the raw block, for populating placeholders.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.block.bytes_mut()
    }
}

impl fmt::Debug for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flow")
            .field("dim", &self.dim())
            .field("capacity", &self.capacity())
            .field("total_size", &self.total_size())
            .finish()
    }
}
