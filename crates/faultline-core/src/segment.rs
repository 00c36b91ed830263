//! Segments: the unit of transmission in Faultline.

use bytes::Bytes;

use crate::checksum;
use crate::wire::{FIELD_DELIMITER, RECORD_DELIMITER};

/// Payload written in place of the real data when a segment is corrupted.
/// The checksum is left untouched, so the receiver sees a mismatch.
pub const CORRUPTED_PAYLOAD: &[u8] = b"CORRUPTED DATA";

/// A sequence-numbered, checksummed slice of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Position of this segment in the original file, counting from 0.
    pub sequence_number: u64,
    pub payload: Bytes,
    /// Lowercase hex checksum. Equal to `checksum::digest(payload)` unless
    /// the segment was corrupted in flight.
    pub checksum: String,
}

impl Segment {
    /// Build a segment and compute its checksum.
    pub fn new(sequence_number: u64, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        let checksum = checksum::digest(&payload);
        Self {
            sequence_number,
            payload,
            checksum,
        }
    }

    /// Build a segment from fields read off the wire, keeping the claimed checksum.
    pub fn from_parts(sequence_number: u64, payload: Bytes, checksum: String) -> Self {
        Self {
            sequence_number,
            payload,
            checksum,
        }
    }

    /// Whether the carried checksum matches the payload.
    pub fn is_intact(&self) -> bool {
        checksum::verify(&self.payload, &self.checksum)
    }

    /// Whether the payload can be framed without breaking the record.
    /// Payloads holding `|` or `\n` are sent anyway and will be misparsed.
    pub fn is_frame_safe(&self) -> bool {
        !self
            .payload
            .iter()
            .any(|b| *b == FIELD_DELIMITER || *b == RECORD_DELIMITER)
    }

    /// Replace the payload with [`CORRUPTED_PAYLOAD`], leaving the checksum stale.
    pub fn corrupt(&mut self) {
        self.payload = Bytes::from_static(CORRUPTED_PAYLOAD);
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
