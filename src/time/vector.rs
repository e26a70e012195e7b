//! Coordinate-wise vector clock arithmetic on raw slices.
//!
//! `VClock` in `crate::primitives` wraps these helpers; they are kept free of
//! any node or message types so transports and tests can reuse them on plain
//! `u64` slices. Both functions require equal lengths and report a mismatch
//! instead of padding with zeros, since every clock in a session has exactly
//! N coordinates.

use crate::error::{ClockError, ClockResult};

/// Result of comparing two vector clocks under the happened-before order.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PartialOrder {
    /// Every coordinate `<=`, at least one `<`.
    LessThan,
    /// Every coordinate `>=`, at least one `>`.
    GreaterThan,
    Equal,
    /// Neither dominates the other.
    Concurrent,
}

fn check_len(expected: usize, found: usize) -> ClockResult<()> {
    if expected != found {
        return Err(ClockError::ClockSizeMismatch { expected, found });
    }
    Ok(())
}

/// `local[k] = max(local[k], incoming[k])` for every coordinate.
pub fn merge_into(local: &mut [u64], incoming: &[u64]) -> ClockResult<()> {
    check_len(local.len(), incoming.len())?;
    for (mine, theirs) in local.iter_mut().zip(incoming) {
        *mine = (*mine).max(*theirs);
    }
    Ok(())
}

pub fn compare(vc1: &[u64], vc2: &[u64]) -> ClockResult<PartialOrder> {
    check_len(vc1.len(), vc2.len())?;

    let mut vc1_le_vc2 = true;
    let mut vc2_le_vc1 = true;
    for (a, b) in vc1.iter().zip(vc2) {
        if a > b { vc1_le_vc2 = false; }
        if a < b { vc2_le_vc1 = false; }
    }

    Ok(match (vc1_le_vc2, vc2_le_vc1) {
        (true, true) => PartialOrder::Equal,
        (true, false) => PartialOrder::LessThan,
        (false, true) => PartialOrder::GreaterThan,
        (false, false) => PartialOrder::Concurrent,
    })
}
