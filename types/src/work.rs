//! The 8-byte proof-of-work nonce.
//!
//! Searches run over a `u64` candidate that is hashed in little-endian
//! order. Externally the nonce is exposed big-endian, so the bytes of a
//! [`Work`] are the reverse of the bytes that were hashed. The textual
//! form is therefore just the candidate printed as 16 hex digits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{decode_fixed, TypesError};

/// An externally visible work value (big-endian nonce).
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Work([u8; 8]);

impl Work {
    /// Copy up to 8 bytes into a work value.
    ///
    /// Shorter input is zero-padded on the right, longer input is truncated.
    pub fn new(bytes: &[u8]) -> Self {
        let mut out = [0u8; 8];
        let n = bytes.len().min(8);
        out[..n].copy_from_slice(&bytes[..n]);
        Self(out)
    }

    /// Wrap a search candidate, storing it big-endian.
    pub fn from_nonce(nonce: u64) -> Self {
        Self(nonce.to_be_bytes())
    }

    /// The search candidate this work value represents.
    pub fn nonce(&self) -> u64 {
        u64::from_be_bytes(self.0)
    }

    /// The byte-reversed form that is fed into the work hash.
    pub fn search_bytes(&self) -> [u8; 8] {
        let mut bytes = self.0;
        bytes.reverse();
        bytes
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; 8] {
        self.0
    }
}

impl From<[u8; 8]> for Work {
    fn from(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Work {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Work({self})")
    }
}

impl fmt::Display for Work {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl FromStr for Work {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<8>(s.trim()).map(Self)
    }
}
