//! Blake2b hashing for work digests.

use blake2::digest::consts::{U32, U8};
use blake2::{Blake2b, Digest};
use latticepow_types::Root;

type Blake2b256 = Blake2b<U32>;

/// Blake2b configured for an 8-byte digest, as used by the work hash.
///
/// The output length is part of the Blake2b parameter block, so this is not
/// the same as truncating a longer digest.
type Blake2b64 = Blake2b<U8>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices into an 8-byte Blake2b digest.
pub fn blake2b_64_multi(parts: &[&[u8]]) -> [u8; 8] {
    let mut hasher = Blake2b64::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 8];
    output.copy_from_slice(&result);
    output
}

/// The work digest of a candidate against a root, read as a little-endian
/// `u64`.
///
/// `nonce` is the little-endian search representation of the candidate.
#[inline]
pub fn work_digest(nonce: &[u8; 8], root: &Root) -> u64 {
    u64::from_le_bytes(blake2b_64_multi(&[nonce, root.as_bytes()]))
}
