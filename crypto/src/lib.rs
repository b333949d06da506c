//! Cryptographic primitives for block-lattice proof-of-work.
//!
//! - **Blake2b-64** (8-byte digest) for the work hash
//! - **Blake2b-256** for deriving roots in fixtures and tools

pub mod hash;

pub use hash::{blake2b_256, blake2b_64_multi, work_digest};
