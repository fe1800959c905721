//! Block layout and growth policy.
//!
//! A flow is a single self-describing byte block: a fixed 8-byte header
//! followed by tightly packed order slots. Capacity is never stored; it
//! is recomputed from the block's own length. Growth happens in fixed
//! `BLOCK_SIZE` increments, applied lazily when an insertion would
//! overflow the current capacity.
//!
//! # Header Layout (little-endian)
//!
//! | Field      | Offset | Size | Meaning                              |
//! |------------|--------|------|--------------------------------------|
//! | total_size | 0      | 4    | u32, block length including header   |
//! | dim        | 4      | 2    | i16, stored element count            |
//! | (padding)  | 6      | 2    | aligns the first slot to offset 8    |

use crate::order::ORDER_SIZE;
use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

/// Fixed header size; the first order slot starts here.
pub const HEADER_SIZE: usize = 8;

/// Growth increment, in element slots. A freshly grown block absorbs
/// this many insertions before the next reallocation. Deliberately a
/// fixed increment rather than a doubling policy: flows stay short, and
/// bounded waste matters more than reallocation count.
pub const BLOCK_SIZE: usize = 2;

/// Declared maximum flow length; sizes the scratch placeholder block.
pub const MAX_DIM: usize = 8;

const TOTAL_SIZE_OFFSET: usize = 0;
const DIM_OFFSET: usize = 4;

/// Header validation failures when reinterpreting foreign bytes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("block of {len} bytes is too short for the 8-byte header")]
    Truncated { len: usize },

    #[error("stored total_size {stored} does not match block length {actual}")]
    LengthMismatch { stored: u32, actual: usize },

    #[error("block body of {body} bytes is not a whole number of {ORDER_SIZE}-byte slots")]
    MisalignedBody { body: usize },

    #[error("negative element count {dim}")]
    NegativeDim { dim: i16 },

    #[error("element count {dim} exceeds capacity {capacity}")]
    DimOverflow { dim: i16, capacity: usize },
}

/// Exact byte size needed to hold `dim` elements (no spare capacity).
#[inline]
pub const fn required_size(dim: usize) -> usize {
    HEADER_SIZE + dim * ORDER_SIZE
}

/// Number of element slots a block of `total_size` bytes can hold.
#[inline]
pub fn capacity_of(total_size: usize) -> usize {
    debug_assert!(total_size >= HEADER_SIZE, "Block smaller than header");
    (total_size - HEADER_SIZE) / ORDER_SIZE
}

/// Block size after one growth step: exactly one `BLOCK_SIZE` increment,
/// never more.
#[inline]
pub const fn grown_size(total_size: usize) -> usize {
    total_size + BLOCK_SIZE * ORDER_SIZE
}

/// Byte offset of element slot `index`.
#[inline]
pub const fn slot_offset(index: usize) -> usize {
    HEADER_SIZE + index * ORDER_SIZE
}

/// Write `total_size` and `dim` into a block header.
/// The two padding bytes at offsets 6..8 are left untouched.
#[inline]
pub fn write_header(block: &mut [u8], total_size: u32, dim: i16) {
    write_total_size(block, total_size);
    LittleEndian::write_i16(&mut block[DIM_OFFSET..DIM_OFFSET + 2], dim);
}

/// Write only the self-describing length, leaving `dim` untouched.
/// Placeholder blocks set their length without committing a count.
#[inline]
pub fn write_total_size(block: &mut [u8], total_size: u32) {
    LittleEndian::write_u32(&mut block[TOTAL_SIZE_OFFSET..TOTAL_SIZE_OFFSET + 4], total_size);
}

/// Read `(total_size, dim)` from a block header without validation.
/// Use [`validate_header`] for foreign bytes.
#[inline]
pub fn read_header(block: &[u8]) -> (u32, i16) {
    let total_size = LittleEndian::read_u32(&block[TOTAL_SIZE_OFFSET..TOTAL_SIZE_OFFSET + 4]);
    let dim = LittleEndian::read_i16(&block[DIM_OFFSET..DIM_OFFSET + 2]);
    (total_size, dim)
}

/// Validate a block of foreign bytes and return `(total_size, dim)`.
///
/// Checks, in order: the header fits, the stored length matches the
/// block length, the body is whole slots, and `0 <= dim <= capacity`.
pub fn validate_header(block: &[u8]) -> Result<(u32, i16), HeaderError> {
    if block.len() < HEADER_SIZE {
        return Err(HeaderError::Truncated { len: block.len() });
    }
    let (total_size, dim) = read_header(block);
    if total_size as usize != block.len() {
        return Err(HeaderError::LengthMismatch {
            stored: total_size,
            actual: block.len(),
        });
    }
    let body = block.len() - HEADER_SIZE;
    if body % ORDER_SIZE != 0 {
        return Err(HeaderError::MisalignedBody { body });
    }
    if dim < 0 {
        return Err(HeaderError::NegativeDim { dim });
    }
    let capacity = capacity_of(block.len());
    if dim as usize > capacity {
        return Err(HeaderError::DimOverflow { dim, capacity });
    }
    Ok((total_size, dim))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_math() {
        assert_eq!(required_size(0), 8);
        assert_eq!(required_size(2), 8 + 2 * ORDER_SIZE);
        assert_eq!(capacity_of(required_size(2)), 2);
        assert_eq!(capacity_of(required_size(2) + ORDER_SIZE - 1), 2);
        assert_eq!(grown_size(required_size(2)), required_size(4));
        assert_eq!(slot_offset(0), HEADER_SIZE);
        assert_eq!(slot_offset(3), HEADER_SIZE + 3 * ORDER_SIZE);
    }

    #[test]
    fn test_header_round_trip() {
        let mut block = vec![0u8; required_size(2)];
        let len = block.len() as u32;
        write_header(&mut block, len, 1);
        let (total_size, dim) = read_header(&block);
        assert_eq!(total_size as usize, block.len());
        assert_eq!(dim, 1);
    }

    #[test]
    fn test_header_is_little_endian() {
        let mut block = vec![0u8; required_size(2)];
        write_header(&mut block, 0x0102, 0x0304);
        assert_eq!(&block[0..4], &[0x02, 0x01, 0x00, 0x00]);
        assert_eq!(&block[4..6], &[0x04, 0x03]);
    }

    #[test]
    fn test_validate_ok() {
        let mut block = vec![0u8; required_size(4)];
        let len = block.len() as u32;
        write_header(&mut block, len, 3);
        assert_eq!(validate_header(&block), Ok((block.len() as u32, 3)));
    }

    #[test]
    fn test_validate_truncated() {
        assert_eq!(
            validate_header(&[0u8; 5]),
            Err(HeaderError::Truncated { len: 5 })
        );
    }

    #[test]
    fn test_validate_length_mismatch() {
        let mut block = vec![0u8; required_size(2)];
        write_header(&mut block, 999, 0);
        assert_eq!(
            validate_header(&block),
            Err(HeaderError::LengthMismatch {
                stored: 999,
                actual: block.len()
            })
        );
    }

    #[test]
    fn test_validate_negative_dim() {
        let mut block = vec![0u8; required_size(2)];
        let len = block.len() as u32;
        write_header(&mut block, len, -1);
        assert_eq!(
            validate_header(&block),
            Err(HeaderError::NegativeDim { dim: -1 })
        );
    }

    #[test]
    fn test_validate_dim_overflow() {
        let mut block = vec![0u8; required_size(2)];
        let len = block.len() as u32;
        write_header(&mut block, len, 3);
        assert_eq!(
            validate_header(&block),
            Err(HeaderError::DimOverflow { dim: 3, capacity: 2 })
        );
    }

    #[test]
    fn test_validate_misaligned_body() {
        let len = required_size(1) + 7;
        let mut block = vec![0u8; len];
        write_header(&mut block, len as u32, 0);
        assert_eq!(
            validate_header(&block),
            Err(HeaderError::MisalignedBody { body: ORDER_SIZE + 7 })
        );
    }
}
