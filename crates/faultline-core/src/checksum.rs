//! Content checksums for segment payloads.
//!
//! A checksum is the first 16 bytes of the BLAKE3 extendable output over the
//! payload, rendered as 32 lowercase hex characters. Sender and receiver
//! compute it independently, so the encoding must never change.
//!
//! This is an integrity check against accidental corruption. It is not used
//! for authentication.

/// Digest length in bytes.
pub const DIGEST_LEN: usize = 16;

/// Length of the hex-encoded checksum carried on the wire.
pub const CHECKSUM_HEX_LEN: usize = DIGEST_LEN * 2;

/// Hash a byte slice, returning a 16-byte BLAKE3 digest.
pub fn hash(data: &[u8]) -> [u8; DIGEST_LEN] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(data);
    let mut out = [0u8; DIGEST_LEN];
    hasher.finalize_xof().fill(&mut out);
    out
}

/// Lowercase hex checksum of `data`, as written into wire records.
pub fn digest(data: &[u8]) -> String {
    hex::encode(hash(data))
}

/// Recompute the checksum of `data` and compare it to `claimed`.
pub fn verify(data: &[u8], claimed: &str) -> bool {
    digest(data) == claimed
}
