//! Error types for the proof-of-work engine

use thiserror::Error;

/// Errors surfaced by hashing and nonce search operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PowError {
    #[error("invalid scrypt parameters (N={n}, r={r}, p={p}): {reason}")]
    InvalidScryptParams {
        n: u32,
        r: u32,
        p: u32,
        reason: &'static str,
    },

    #[error("invalid output length {len}: must be between 1 and {max}")]
    InvalidOutputLength { len: usize, max: usize },

    #[error("iteration count must be at least 1")]
    InvalidIterationCount,

    #[error("invalid nonce range: start {start} > end {end}")]
    InvalidNonceRange { start: u64, end: u64 },

    #[error("nonce {nonce} exceeds the layout maximum {max}")]
    NonceOutOfRange { nonce: u64, max: u64 },

    #[error("nonce offset {offset} does not fit a {len}-byte buffer")]
    NonceOffsetOutOfBounds { offset: usize, len: usize },

    #[error("invalid length: expected {expected} got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("invalid compact target {bits:#010x}: {reason}")]
    InvalidCompactTarget { bits: u32, reason: &'static str },

    #[error("hex decode error: {0}")]
    Hex(String),

    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("failed to allocate {bytes} bytes for {what}")]
    Allocation { what: &'static str, bytes: usize },
}

impl From<hex::FromHexError> for PowError {
    fn from(err: hex::FromHexError) -> Self {
        PowError::Hex(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, PowError>;
