//! Flow Arena - request-scoped block allocator.
//!
//! Every flow block comes out of an arena carrying a fixed byte budget
//! for the current request. The arena never frees individual blocks;
//! the whole region is reclaimed when the request ends, so bookkeeping
//! only ever grows. Exhausting the budget is an ordinary error that
//! propagates to the caller rather than aborting.

use thiserror::Error;

/// The arena cannot satisfy an allocation within its budget.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("arena budget exhausted: requested {requested} bytes, {available} available")]
pub struct AllocError {
    /// Bytes the failed request asked for
    pub requested: usize,
    /// Bytes left in the budget at the time of the request
    pub available: usize,
}

/// An owned, relocatable byte block handed out by a [`FlowArena`].
///
/// A `RawBlock` is a unique handle: growing it consumes the old handle
/// and returns a new one, which may live at a different address. Code
/// holding a stale handle after a grow cannot compile.
#[derive(Debug)]
pub struct RawBlock {
    bytes: Vec<u8>,
}

impl RawBlock {
    /// Block length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Read access to the block's bytes.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Write access to the block's bytes.
    #[inline]
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

/// Bounded allocator for flow blocks.
///
/// Mirrors the discipline of a per-request memory context: allocate and
/// grow during the request, reclaim everything at once afterwards by
/// dropping the arena.
#[derive(Debug)]
pub struct FlowArena {
    /// Total bytes this arena may hand out
    budget: usize,

    /// Bytes handed out so far (never decreases)
    allocated: usize,
}

impl FlowArena {
    /// Create an arena that will hand out at most `budget` bytes.
    pub fn with_budget(budget: usize) -> Self {
        Self {
            budget,
            allocated: 0,
        }
    }

    /// Allocate a block of `size` bytes with unspecified contents.
    ///
    /// Callers must fully initialize the block before trusting any of
    /// it; scratch placeholders rely on this.
    pub fn alloc(&mut self, size: usize) -> Result<RawBlock, AllocError> {
        self.charge(size)?;
        Ok(RawBlock {
            bytes: vec![0u8; size],
        })
    }

    /// Allocate a block of `size` bytes, guaranteed zero-filled.
    pub fn alloc_zeroed(&mut self, size: usize) -> Result<RawBlock, AllocError> {
        self.charge(size)?;
        Ok(RawBlock {
            bytes: vec![0u8; size],
        })
    }

    /// Grow `block` to `new_size` bytes, preserving its contents.
    ///
    /// Consumes the old handle and returns the only valid handle to the
    /// (possibly relocated) block. New trailing bytes are unspecified.
    pub fn grow(&mut self, mut block: RawBlock, new_size: usize) -> Result<RawBlock, AllocError> {
        debug_assert!(new_size >= block.len(), "Grow must not shrink");
        self.charge(new_size - block.len())?;
        block.bytes.resize(new_size, 0);
        Ok(block)
    }

    /// Bytes handed out so far.
    #[inline]
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Total byte budget.
    #[inline]
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Bytes still available.
    #[inline]
    pub fn available(&self) -> usize {
        self.budget - self.allocated
    }

    fn charge(&mut self, size: usize) -> Result<(), AllocError> {
        let available = self.available();
        if size > available {
            return Err(AllocError {
                requested: size,
                available,
            });
        }
        self.allocated += size;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_within_budget() {
        let mut arena = FlowArena::with_budget(100);
        let block = arena.alloc(40).unwrap();
        assert_eq!(block.len(), 40);
        assert_eq!(arena.allocated(), 40);
        assert_eq!(arena.available(), 60);
    }

    #[test]
    fn test_alloc_zeroed() {
        let mut arena = FlowArena::with_budget(64);
        let block = arena.alloc_zeroed(64).unwrap();
        assert!(block.bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_alloc_exhausted() {
        let mut arena = FlowArena::with_budget(32);
        arena.alloc(20).unwrap();
        let err = arena.alloc(20).unwrap_err();
        assert_eq!(
            err,
            AllocError {
                requested: 20,
                available: 12
            }
        );
        // A smaller request still fits
        assert!(arena.alloc(12).is_ok());
    }

    #[test]
    fn test_grow_preserves_contents() {
        let mut arena = FlowArena::with_budget(100);
        let mut block = arena.alloc(8).unwrap();
        block.bytes_mut().copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);

        let grown = arena.grow(block, 16).unwrap();
        assert_eq!(grown.len(), 16);
        assert_eq!(&grown.bytes()[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
        // Only the delta is charged
        assert_eq!(arena.allocated(), 16);
    }

    #[test]
    fn test_grow_exhausted() {
        let mut arena = FlowArena::with_budget(10);
        let block = arena.alloc(8).unwrap();
        let err = arena.grow(block, 16).unwrap_err();
        assert_eq!(err.requested, 8);
        assert_eq!(err.available, 2);
    }
}
