use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// A contiguous, inclusive range of slot indices on a single link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotRange {
    pub first: u32,
    pub last: u32,
}

impl SlotRange {
    /// Returns `None` if `first > last`.
    pub fn new(first: u32, last: u32) -> Option<Self> {
        if first > last {
            return None;
        }

        Some(SlotRange { first, last })
    }

    /// Builds the range of `len` slots starting at `first`. `len` must be positive.
    pub fn with_len(first: u32, len: u32) -> Option<Self> {
        if len == 0 {
            return None;
        }

        SlotRange::new(first, first.checked_add(len - 1)?)
    }

    /// Saturates at `u32::MAX` for the full-width range `[0, u32::MAX]`, which no link can hold.
    pub fn len(&self) -> u32 {
        (self.last - self.first).saturating_add(1)
    }

    pub fn contains(&self, slot: u32) -> bool {
        self.first <= slot && slot <= self.last
    }

    pub fn overlaps(&self, other: &SlotRange) -> bool {
        self.first <= other.last && other.first <= self.last
    }

    /// Number of slots shared with `other`.
    pub fn intersection_len(&self, other: &SlotRange) -> u32 {
        if !self.overlaps(other) {
            return 0;
        }

        self.last.min(other.last) - self.first.max(other.first) + 1
    }

    pub fn slots(&self) -> RangeInclusive<u32> {
        self.first..=self.last
    }

    /// Collapses a sorted list of slot indices into a range, or `None` if they are empty or have gaps.
    pub fn from_sorted_slots(slots: &[u32]) -> Option<Self> {
        let (first, last) = (*slots.first()?, *slots.last()?);

        let is_contiguous = slots.windows(2).all(|pair| pair[1] == pair[0] + 1);
        if !is_contiguous {
            return None;
        }

        SlotRange::new(first, last)
    }
}

impl fmt::Display for SlotRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.first, self.last)
    }
}
