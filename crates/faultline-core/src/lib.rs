//! faultline-core: segment type, checksums, wire format, and configuration.
//! The services crate and both binaries depend on this one.

pub mod checksum;
pub mod config;
pub mod segment;
pub mod wire;

pub use segment::{Segment, CORRUPTED_PAYLOAD};
