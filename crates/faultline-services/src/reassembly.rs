//! File reassembly: order accepted segments and write them out.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use faultline_core::Segment;

#[derive(Debug, thiserror::Error)]
pub enum ReassemblyError {
    #[error("failed to create {0}: {1}")]
    Create(PathBuf, io::Error),
    #[error("failed to write {0}: {1}")]
    Write(PathBuf, io::Error),
}

/// Order segments by sequence number.
///
/// The sort is stable, so if a sequence number shows up twice the copy that
/// arrived first stays first.
pub fn reassemble(mut segments: Vec<Segment>) -> Vec<Segment> {
    segments.sort_by_key(|s| s.sequence_number);
    segments
}

/// Concatenate payloads in the given order into `path`, replacing any
/// existing file. Returns the number of bytes written.
///
/// On failure the file may be left truncated or partially written.
pub fn write_output(path: &Path, segments: &[Segment]) -> Result<u64, ReassemblyError> {
    let file = File::create(path).map_err(|e| ReassemblyError::Create(path.to_path_buf(), e))?;
    let mut out = BufWriter::new(file);
    let mut total = 0u64;

    for segment in segments {
        out.write_all(&segment.payload)
            .map_err(|e| ReassemblyError::Write(path.to_path_buf(), e))?;
        total += segment.payload.len() as u64;
    }

    out.flush()
        .map_err(|e| ReassemblyError::Write(path.to_path_buf(), e))?;

    tracing::info!(
        path = %path.display(),
        bytes = total,
        segments = segments.len(),
        "file reassembled"
    );

    Ok(total)
}
