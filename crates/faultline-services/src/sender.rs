//! Segment sending: reorder, inject faults, frame, transmit.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use faultline_core::{wire, Segment};

use crate::fault::{Fault, FaultModel};

/// What happened to the segments handed to [`send`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendReport {
    /// Records handed to the transport in full. Includes corrupted ones.
    /// When `aborted` is set after a failed flush, a buffering transport
    /// may not have delivered all of them.
    pub written: usize,
    /// Segments skipped by the fault model.
    pub dropped: usize,
    /// Written records whose payload was replaced.
    pub corrupted: usize,
    /// A write failed and the remaining segments were never attempted, or
    /// the final flush failed.
    pub aborted: bool,
}

/// Send `segments` over `transport`, letting `faults` decide order and fate.
///
/// A write failure stops the loop immediately. The report then holds the
/// number of records written before the failing one. Nothing is retried.
pub async fn send<W, F>(mut segments: Vec<Segment>, transport: &mut W, faults: &mut F) -> SendReport
where
    W: AsyncWrite + Unpin + ?Sized,
    F: FaultModel + ?Sized,
{
    faults.reorder(&mut segments);

    let mut report = SendReport::default();

    for mut segment in segments {
        let seq = segment.sequence_number;
        let fault = faults.decide(&segment);

        match fault {
            Fault::Drop => {
                report.dropped += 1;
                tracing::debug!(seq, "segment dropped");
                continue;
            }
            Fault::Corrupt => {
                segment.corrupt();
                tracing::debug!(seq, "segment corrupted");
            }
            Fault::Deliver => {}
        }

        if !segment.is_frame_safe() {
            tracing::warn!(seq, "payload contains a delimiter, record will not frame cleanly");
        }

        let record = wire::encode(&segment);
        if let Err(e) = transport.write_all(&record).await {
            tracing::warn!(seq, error = %e, "failed to send segment");
            report.aborted = true;
            return report;
        }

        report.written += 1;
        if fault == Fault::Corrupt {
            report.corrupted += 1;
        }
        tracing::trace!(seq, payload_len = segment.len(), "segment sent");
    }

    if let Err(e) = transport.flush().await {
        tracing::warn!(error = %e, "failed to flush transport");
        report.aborted = true;
    }

    report
}
