//! Absolute difficulty threshold.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// A 64-bit work threshold. A work digest, read as a little-endian `u64`,
/// must be greater than or equal to this value.
///
/// Thresholds are derived from a multiplier; see
/// `latticepow_work::compute_difficulty`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Difficulty(u64);

impl Difficulty {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for Difficulty {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Difficulty> for u64 {
    fn from(d: Difficulty) -> Self {
        d.0
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl FromStr for Difficulty {
    type Err = TypesError;

    /// Accepts hex with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        u64::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|e| TypesError::InvalidDifficulty(format!("{s}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_prefixed_hex() {
        assert_eq!(
            Difficulty::new(0xffffffc000000000).to_string(),
            "0xffffffc000000000"
        );
        assert_eq!(Difficulty::new(1).to_string(), "0x0000000000000001");
    }

    #[test]
    fn parse_with_and_without_prefix() {
        let a: Difficulty = "0xfffffff800000000".parse().unwrap();
        let b: Difficulty = "fffffff800000000".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.value(), 0xfffffff800000000);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("0xnothex".parse::<Difficulty>().is_err());
        assert!("1ffffffffffffffff".parse::<Difficulty>().is_err());
    }

    #[test]
    fn ordering_follows_value() {
        assert!(Difficulty::new(2) > Difficulty::new(1));
    }
}
