use thiserror::Error;

/// Errors raised while parsing value types from their textual form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("expected {expected} hex characters, got {actual}")]
    InvalidHexLength { expected: usize, actual: usize },

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid difficulty: {0}")]
    InvalidDifficulty(String),
}

/// Decode exactly `N` bytes from a hex string.
pub(crate) fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], TypesError> {
    if s.len() != N * 2 {
        return Err(TypesError::InvalidHexLength {
            expected: N * 2,
            actual: s.len(),
        });
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(s, &mut out).map_err(|e| TypesError::InvalidHex(e.to_string()))?;
    Ok(out)
}
