//! One-shot transfer sessions over TCP.
//!
//! [`transmit_file`] is the sending side: segment, connect, send.
//! [`serve_once`] is the receiving side: accept one connection, read it to
//! the end, report gaps, reassemble, write the output file.

use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

use crate::fault::FaultModel;
use crate::reassembly::{reassemble, write_output, ReassemblyError};
use crate::receiver::{receive, ReceiveError};
use crate::reception::count_in;
use crate::segmenter::{segment_file, SegmentError};
use crate::sender::{send, SendReport};

#[derive(Debug, thiserror::Error)]
pub enum TransmitError {
    #[error(transparent)]
    Segment(#[from] SegmentError),
    #[error("failed to connect to {0}: {1}")]
    Connect(String, std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),
    #[error(transparent)]
    Receive(#[from] ReceiveError),
    #[error(transparent)]
    Reassembly(#[from] ReassemblyError),
}

/// Result of a completed receiving session.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub peer: SocketAddr,
    pub accepted: usize,
    pub rejected: usize,
    pub malformed: usize,
    /// Runs of missing sequence numbers below the highest one that arrived.
    pub lost: Vec<RangeInclusive<u64>>,
    /// Sequence numbers covered by `lost`.
    pub lost_count: u64,
    pub bytes_written: u64,
    pub output_path: PathBuf,
}

/// Segment the file at `path` and send it to `addr`.
///
/// The file is read before connecting, so an unreadable file never opens a
/// connection. The stream is closed when this returns.
pub async fn transmit_file<F>(
    path: &Path,
    addr: &str,
    segment_size: usize,
    faults: &mut F,
) -> Result<SendReport, TransmitError>
where
    F: FaultModel + ?Sized,
{
    let segments = segment_file(path, segment_size)?;
    let total = segments.len();

    let mut stream = TcpStream::connect(addr)
        .await
        .map_err(|e| TransmitError::Connect(addr.to_string(), e))?;
    tracing::info!(addr, segments = total, "connected, sending segments");

    let report = send(segments, &mut stream, faults).await;

    if let Err(e) = stream.shutdown().await {
        tracing::debug!(error = %e, "stream shutdown failed");
    }

    Ok(report)
}

/// Accept exactly one connection on `listener` and rebuild the file it carries.
pub async fn serve_once(
    listener: &TcpListener,
    output_path: &Path,
) -> Result<SessionOutcome, SessionError> {
    let (stream, peer) = listener.accept().await.map_err(SessionError::Accept)?;
    tracing::info!(%peer, "connection accepted");

    // The stream is consumed and closed by the time receive returns.
    let reception = receive(stream).await?;

    let lost = reception.record.report_lost();
    let lost_count = count_in(&lost);
    let accepted = reception.accepted;
    let rejected = reception.rejected;
    let malformed = reception.malformed;

    let ordered = reassemble(reception.segments);
    let bytes_written = write_output(output_path, &ordered)?;

    tracing::info!(
        %peer,
        accepted,
        rejected,
        malformed,
        lost = lost_count,
        "segments received correctly"
    );

    Ok(SessionOutcome {
        peer,
        accepted,
        rejected,
        malformed,
        lost,
        lost_count,
        bytes_written,
        output_path: output_path.to_path_buf(),
    })
}
