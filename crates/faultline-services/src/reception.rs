//! Reception tracking: which sequence numbers arrived, and in what shape.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Outcome for a sequence number that reached the receiver.
/// A sequence number with no entry never arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStatus {
    /// Checksum matched; the payload is part of the output.
    Valid,
    /// Checksum mismatch; the payload was discarded.
    Invalid,
}

/// Per-sequence-number reception status, built while reading the transport.
#[derive(Debug, Clone, Default)]
pub struct ReceptionRecord {
    statuses: BTreeMap<u64, SegmentStatus>,
}

impl ReceptionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for `seq`. A later arrival overwrites an earlier one.
    pub fn mark(&mut self, seq: u64, status: SegmentStatus) {
        self.statuses.insert(seq, status);
    }

    pub fn status(&self, seq: u64) -> Option<SegmentStatus> {
        self.statuses.get(&seq).copied()
    }

    /// Number of distinct sequence numbers seen.
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn valid_count(&self) -> usize {
        self.count(SegmentStatus::Valid)
    }

    pub fn invalid_count(&self) -> usize {
        self.count(SegmentStatus::Invalid)
    }

    fn count(&self, status: SegmentStatus) -> usize {
        self.statuses.values().filter(|s| **s == status).count()
    }

    /// Highest sequence number seen, valid or not.
    pub fn highest(&self) -> Option<u64> {
        self.statuses.keys().next_back().copied()
    }

    /// Gaps in `0..=highest()`: runs of sequence numbers that never arrived.
    ///
    /// Losses after the highest arrival are invisible here: the receiver has
    /// no way to know how many segments were sent. Use
    /// [`ReceptionRecord::lost_within`] when the total is known.
    pub fn lost(&self) -> Vec<RangeInclusive<u64>> {
        match self.highest() {
            Some(highest) => self.gaps_below(highest),
            None => Vec::new(),
        }
    }

    /// Gaps in `0..total`.
    pub fn lost_within(&self, total: u64) -> Vec<RangeInclusive<u64>> {
        self.gaps_below(total)
    }

    /// Number of sequence numbers covered by [`ReceptionRecord::lost`].
    pub fn lost_count(&self) -> u64 {
        count_in(&self.lost())
    }

    /// Walk adjacent keys below `end` (exclusive). Cost grows with the number
    /// of keys, never with the size of the gaps.
    fn gaps_below(&self, end: u64) -> Vec<RangeInclusive<u64>> {
        let mut gaps = Vec::new();
        let mut next = 0u64;
        for &seq in self.statuses.range(..end).map(|(seq, _)| seq) {
            if seq > next {
                gaps.push(next..=seq - 1);
            }
            // seq < end, so this cannot overflow.
            next = seq + 1;
        }
        if next < end {
            gaps.push(next..=end - 1);
        }
        gaps
    }

    /// Log every gap found by [`ReceptionRecord::lost`], one line per run,
    /// and return them.
    pub fn report_lost(&self) -> Vec<RangeInclusive<u64>> {
        let lost = self.lost();
        for gap in &lost {
            tracing::warn!(
                from = *gap.start(),
                to = *gap.end(),
                count = count_in(std::slice::from_ref(gap)),
                "segments lost"
            );
        }
        lost
    }
}

/// Total sequence numbers covered by `gaps`.
pub fn count_in(gaps: &[RangeInclusive<u64>]) -> u64 {
    gaps.iter()
        .map(|g| (g.end() - g.start()).saturating_add(1))
        .fold(0u64, u64::saturating_add)
}
