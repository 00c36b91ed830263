//! Segmenter: split a file into ordered, checksummed segments.

use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use faultline_core::Segment;

/// Read buffer size. Independent of the segment size.
const READ_BUF_SIZE: usize = 8 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    #[error("segment size must be non-zero")]
    ZeroSize,
    #[error("failed to open {0}: {1}")]
    Open(PathBuf, io::Error),
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, io::Error),
}

/// Split the file at `path` into segments of `segment_size` bytes.
///
/// The last segment holds whatever is left and may be shorter. An empty file
/// produces no segments. On any I/O failure the cause is logged and nothing
/// is returned.
pub fn segment_file(path: &Path, segment_size: usize) -> Result<Vec<Segment>, SegmentError> {
    if segment_size == 0 {
        return Err(SegmentError::ZeroSize);
    }

    let result = File::open(path)
        .map_err(|e| SegmentError::Open(path.to_path_buf(), e))
        .and_then(|file| {
            segment_reader(BufReader::new(file), segment_size)
                .map_err(|e| SegmentError::Read(path.to_path_buf(), e))
        });

    match &result {
        Ok(segments) => tracing::debug!(
            path = %path.display(),
            segments = segments.len(),
            segment_size,
            "file segmented"
        ),
        Err(e) => tracing::warn!(error = %e, "failed to segment file"),
    }

    result
}

/// Split everything `reader` yields into segments of `segment_size` bytes.
///
/// Sequence numbers start at 0 and follow input order.
pub fn segment_reader<R: Read>(mut reader: R, segment_size: usize) -> io::Result<Vec<Segment>> {
    if segment_size == 0 {
        return Err(io::Error::new(
            ErrorKind::InvalidInput,
            "segment size must be non-zero",
        ));
    }

    let mut segments = Vec::new();
    let mut pending: Vec<u8> = Vec::with_capacity(segment_size);
    let mut read_buf = vec![0u8; READ_BUF_SIZE];
    let mut sequence_number = 0u64;

    loop {
        let n = match reader.read(&mut read_buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        let mut rest = &read_buf[..n];
        while !rest.is_empty() {
            let take = (segment_size - pending.len()).min(rest.len());
            pending.extend_from_slice(&rest[..take]);
            rest = &rest[take..];

            if pending.len() == segment_size {
                let full = std::mem::replace(&mut pending, Vec::with_capacity(segment_size));
                segments.push(Segment::new(sequence_number, Bytes::from(full)));
                sequence_number += 1;
            }
        }
    }

    if !pending.is_empty() {
        segments.push(Segment::new(sequence_number, Bytes::from(pending)));
    }

    Ok(segments)
}
