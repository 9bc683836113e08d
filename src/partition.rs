//! Cumulative-size index routing global offsets to admitted sources.
//!
//! Slot `i` owns the half-open offset range `[bounds[i], bounds[i + 1])`, so an
//! offset sitting exactly on a boundary belongs to the slot that starts there.

use std::num::NonZeroUsize;
use std::ops::Range;

/// Append-only cumulative sizes `P[0] = 0, P[1], ..., P[m]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionIndex {
    bounds: Vec<usize>,
}

impl Default for PartitionIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl PartitionIndex {
    /// Empty index (`P = [0]`).
    pub fn new() -> Self {
        Self { bounds: vec![0] }
    }

    /// Append a partition of `size` entries and return its slot.
    ///
    /// Sizes are non-zero so bounds stay strictly increasing past `P[0]`.
    pub fn push(&mut self, size: NonZeroUsize) -> usize {
        let slot = self.len();
        self.bounds.push(self.total() + size.get());
        slot
    }

    /// Sum of every partition size (`P[m]`).
    pub fn total(&self) -> usize {
        *self.bounds.last().expect("partition bounds always hold P[0]")
    }

    /// Number of partitions.
    pub fn len(&self) -> usize {
        self.bounds.len() - 1
    }

    /// True when no partition has been appended.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slot owning global `offset`, or `None` when `offset >= total()`.
    pub fn locate(&self, offset: usize) -> Option<usize> {
        if offset >= self.total() {
            return None;
        }
        // First index with P[i] > offset, minus one.
        Some(self.bounds.partition_point(|&bound| bound <= offset) - 1)
    }

    /// Offset range owned by `slot`.
    pub fn range(&self, slot: usize) -> Option<Range<usize>> {
        let start = *self.bounds.get(slot)?;
        let end = *self.bounds.get(slot + 1)?;
        Some(start..end)
    }

    /// Cumulative bounds including the leading zero.
    pub fn as_slice(&self) -> &[usize] {
        &self.bounds
    }

    /// Drop every partition.
    pub fn clear(&mut self) {
        self.bounds.truncate(1);
    }
}
