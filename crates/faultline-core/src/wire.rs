//! Faultline wire format: one text record per segment.
//!
//! ```text
//! <sequence_number:decimal>|<payload:raw bytes>|<checksum:32 hex chars>\n
//! ```
//!
//! Payload bytes are written as-is. Nothing is escaped, so a payload holding
//! `|` or `\n` breaks framing and the receiver will reject or misparse the
//! record. Changing this means changing the wire format on both ends.

use bytes::Bytes;

use crate::segment::Segment;

/// Separates the three fields of a record.
pub const FIELD_DELIMITER: u8 = b'|';

/// Terminates a record.
pub const RECORD_DELIMITER: u8 = b'\n';

/// Number of fields in a well-formed record.
pub const FIELD_COUNT: usize = 3;

/// Longest record a receiver will buffer, delimiter included. A peer that
/// sends more than this without a newline is treated as a broken transport.
/// Segment sizes must stay well below it.
pub const MAX_RECORD_LEN: usize = 64 * 1024;

// ── Encoding ─────────────────────────────────────────────────────────────────

/// Serialize a segment as a single newline-terminated record.
pub fn encode(segment: &Segment) -> Vec<u8> {
    let seq = segment.sequence_number.to_string();
    let mut record =
        Vec::with_capacity(seq.len() + segment.payload.len() + segment.checksum.len() + 3);
    record.extend_from_slice(seq.as_bytes());
    record.push(FIELD_DELIMITER);
    record.extend_from_slice(&segment.payload);
    record.push(FIELD_DELIMITER);
    record.extend_from_slice(segment.checksum.as_bytes());
    record.push(RECORD_DELIMITER);
    record
}

// ── Decoding ─────────────────────────────────────────────────────────────────

/// Strip the record delimiter and an optional carriage return before it.
pub fn trim_line(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(&[RECORD_DELIMITER]).unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Parse one record (without its trailing newline) into a segment.
///
/// The checksum is carried over as claimed; checking it is the receiver's job.
pub fn decode(line: &[u8]) -> Result<Segment, WireError> {
    let fields: Vec<&[u8]> = line.split(|b| *b == FIELD_DELIMITER).collect();
    if fields.len() != FIELD_COUNT {
        return Err(WireError::FieldCount(fields.len()));
    }

    let sequence_number = std::str::from_utf8(fields[0])
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| WireError::BadSequence(String::from_utf8_lossy(fields[0]).into_owned()))?;

    Ok(Segment::from_parts(
        sequence_number,
        Bytes::copy_from_slice(fields[1]),
        String::from_utf8_lossy(fields[2]).into_owned(),
    ))
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Errors that can arise when interpreting a wire record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("expected {} fields, found {0}", FIELD_COUNT)]
    FieldCount(usize),

    #[error("invalid sequence number: {0:?}")]
    BadSequence(String),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
