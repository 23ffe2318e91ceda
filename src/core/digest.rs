//! Double SHA-256 digest used for payload checksums.

use crate::config::CHECKSUM_LENGTH;
use sha2::{Digest, Sha256};

/// SHA-256 applied twice: `SHA256(SHA256(bytes))`.
#[inline]
pub fn digest(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(Sha256::digest(bytes)).into()
}

/// First four bytes of [`digest`], as carried in the frame header.
#[inline]
pub fn checksum(bytes: &[u8]) -> [u8; CHECKSUM_LENGTH] {
    let full = digest(bytes);
    let mut out = [0u8; CHECKSUM_LENGTH];
    out.copy_from_slice(&full[..CHECKSUM_LENGTH]);
    out
}
