//! Segment receiving: read records, parse, verify, track.
//!
//! The loop reads one newline-terminated record at a time until the peer
//! closes the stream. Malformed records are logged and skipped without
//! touching the reception record. Checksum mismatches are recorded as
//! invalid and their payload is discarded. A read error ends everything:
//! the caller gets the error and none of the segments collected so far.

use std::ops::RangeInclusive;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

use faultline_core::wire::{self, MAX_RECORD_LEN, RECORD_DELIMITER};
use faultline_core::Segment;

use crate::reception::{ReceptionRecord, SegmentStatus};

#[derive(Debug, thiserror::Error)]
pub enum ReceiveError {
    #[error("transport read failed: {0}")]
    Transport(#[from] std::io::Error),
    #[error("record exceeds {} bytes without a newline", MAX_RECORD_LEN)]
    RecordTooLong,
}

/// Everything learned from one connection.
#[derive(Debug, Default)]
pub struct Reception {
    /// Segments whose checksum matched, in arrival order.
    pub segments: Vec<Segment>,
    pub record: ReceptionRecord,
    /// Records accepted into `segments`.
    pub accepted: usize,
    /// Records discarded for a checksum mismatch.
    pub rejected: usize,
    /// Records skipped because they could not be parsed.
    pub malformed: usize,
}

impl Reception {
    /// Parse and validate a single record (newline already stripped).
    fn ingest(&mut self, line: &[u8]) {
        let segment = match wire::decode(line) {
            Ok(segment) => segment,
            Err(e) => {
                self.malformed += 1;
                tracing::warn!(
                    error = %e,
                    record = %String::from_utf8_lossy(line),
                    "malformed record, skipping"
                );
                return;
            }
        };

        let seq = segment.sequence_number;
        if segment.is_intact() {
            tracing::info!(seq, payload_len = segment.len(), "segment received");
            self.record.mark(seq, SegmentStatus::Valid);
            self.segments.push(segment);
            self.accepted += 1;
        } else {
            tracing::warn!(seq, "segment checksum mismatch, discarding");
            self.record.mark(seq, SegmentStatus::Invalid);
            self.rejected += 1;
        }
    }

    /// Runs of sequence numbers missing below the highest arrival.
    pub fn lost(&self) -> Vec<RangeInclusive<u64>> {
        self.record.lost()
    }
}

/// Read records from `transport` until end of stream.
///
/// A record longer than [`MAX_RECORD_LEN`] aborts the read like any other
/// transport failure.
pub async fn receive<R>(transport: R) -> Result<Reception, ReceiveError>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(transport);
    let mut reception = Reception::default();
    let mut line = Vec::new();

    loop {
        line.clear();
        let n = (&mut reader)
            .take(MAX_RECORD_LEN as u64)
            .read_until(RECORD_DELIMITER, &mut line)
            .await?;
        if n == 0 {
            break;
        }
        if n == MAX_RECORD_LEN && line.last() != Some(&RECORD_DELIMITER) {
            return Err(ReceiveError::RecordTooLong);
        }
        reception.ingest(wire::trim_line(&line));
    }

    tracing::debug!(
        accepted = reception.accepted,
        rejected = reception.rejected,
        malformed = reception.malformed,
        "end of stream"
    );

    Ok(reception)
}
