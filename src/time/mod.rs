//! Logical-time utilities.
//!
//! Slice-level vector clock arithmetic lives in `time::vector`; the owning
//! `VClock` type is in `crate::primitives`.

pub mod vector;

// Re-export for convenience
pub use vector::*;
