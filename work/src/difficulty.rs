//! Difficulty thresholds derived from a signed multiplier.
//!
//! A threshold is expressed through its "inverse gap" `u64::MAX - threshold`.
//! A positive multiplier divides the base gap (raising the threshold, harder
//! work); a negative multiplier multiplies it (lowering the threshold, easier
//! work). All arithmetic is fixed-width `u64` with wrap-around, which is what
//! makes a threshold interoperable with other implementations.

/// Largest possible threshold.
pub const MAX_DIFFICULTY: u64 = u64::MAX;

/// Inverse gap of the base threshold (`0x3f_ffff_ffff`).
pub const BASE_GAP: u64 = MAX_DIFFICULTY - 0xffff_ffc0_0000_0000;

/// Original base threshold (multiplier 0).
pub const V1_BASE_DIFFICULTY: u64 = compute_difficulty(0);

/// Stricter threshold for send/change blocks (multiplier 8).
pub const V2_BASE_DIFFICULTY: u64 = compute_difficulty(8);

/// Lenient threshold for receive/open blocks (multiplier -8).
pub const V2_RECEIVE_DIFFICULTY: u64 = compute_difficulty(-8);

/// Convert a difficulty multiplier into an absolute threshold.
///
/// A multiplier of `0` is treated as `1`. Negative multipliers are mapped
/// back to their magnitude through wrapping subtraction on the unsigned
/// reinterpretation, so `i64::MIN` and friends produce the same bits as
/// every other implementation of this formula.
pub const fn compute_difficulty(multiplier: i64) -> u64 {
    if multiplier < 0 {
        let magnitude = MAX_DIFFICULTY
            .wrapping_sub(multiplier as u64)
            .wrapping_add(1);
        return MAX_DIFFICULTY.wrapping_sub(BASE_GAP.wrapping_mul(magnitude));
    }

    let multiplier = if multiplier == 0 { 1 } else { multiplier as u64 };
    MAX_DIFFICULTY - BASE_GAP / multiplier
}

/// How many times harder `difficulty` is than `base`.
///
/// Values below `1.0` mean easier. Only meant for reporting; validation
/// always compares absolute thresholds.
pub fn multiplier_of(difficulty: u64, base: u64) -> f64 {
    let gap = (MAX_DIFFICULTY - difficulty).max(1) as f64;
    (MAX_DIFFICULTY - base) as f64 / gap
}
