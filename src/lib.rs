//! # Orderflow
//!
//! A self-describing, length-prefixed flow container for fixed-size
//! trade orders.
//!
//! ## Design Principles
//!
//! - **Self-Describing Blocks**: every flow is one byte block carrying
//!   its own total length in its header, ready for record-oriented
//!   storage as-is
//! - **Fixed-Increment Growth**: capacity grows lazily by two-order
//!   blocks, never geometrically; waste stays bounded for short flows
//! - **Ownership, Not Locks**: in-place extension takes the flow by
//!   value and returns the only valid handle; copying extension never
//!   mutates its shared input
//! - **Arena Allocation**: blocks come from a request-scoped arena with
//!   an explicit byte budget
//!
//! ## Architecture
//!
//! ```text
//! [FlowArena] --alloc/grow--> [Flow block: header | orders | spare]
//!                                      |
//!                        extend_in_place / extend_with_copy
//!                                      |
//!                              [storage collaborator]
//! ```

pub mod arena;
pub mod flow;
pub mod layout;
pub mod order;

// Re-exports for convenience
pub use arena::{AllocError, FlowArena, RawBlock};
pub use flow::{Flow, FlowError};
pub use layout::{HeaderError, BLOCK_SIZE, HEADER_SIZE, MAX_DIM};
pub use order::{FlowOrder, ORDER_SIZE};
