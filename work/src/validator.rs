//! PoW validation.

use latticepow_crypto::work_digest;
use latticepow_types::{Root, Work};

/// The digest value of `work` against `root`.
///
/// The work bytes are reversed back into the little-endian search
/// representation, hashed as `Blake2b-64(nonce || root)` and read as a
/// little-endian `u64`.
pub fn work_value(root: &Root, work: Work) -> u64 {
    work_digest(&work.search_bytes(), root)
}

/// Check that `work` meets `difficulty` for `root`.
pub fn is_valid(root: &Root, difficulty: u64, work: Work) -> bool {
    work_value(root, work) >= difficulty
}

/// Check a raw search candidate without going through [`Work`].
pub(crate) fn is_valid_nonce(root: &Root, difficulty: u64, nonce: u64) -> bool {
    work_digest(&nonce.to_le_bytes(), root) >= difficulty
}
