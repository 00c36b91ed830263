//! faultline-services: the transfer pipeline.
//!
//! Segmenter → fault model → sender → transport → receiver → reassembler.

pub mod fault;
pub mod reassembly;
pub mod receiver;
pub mod reception;
pub mod segmenter;
pub mod sender;
pub mod session;

pub use fault::{ChaosFaults, Fault, FaultModel, NoFaults};
pub use reassembly::{reassemble, write_output, ReassemblyError};
pub use receiver::{receive, Reception, ReceiveError};
pub use reception::{count_in, ReceptionRecord, SegmentStatus};
pub use segmenter::{segment_file, segment_reader, SegmentError};
pub use sender::{send, SendReport};
pub use session::{serve_once, transmit_file, SessionError, SessionOutcome, TransmitError};
