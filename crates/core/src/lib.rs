//! # powhash core
//!
//! Proof-of-work hashing engine for a mobile CPU miner: a set of 32-byte
//! digest functions and a nonce search loop.
//!
//! Every algorithm here is an intentionally reduced variant. Only SHA-256
//! and SHA256d are interoperable with production chains; the others are
//! self-consistent but must be validated before use against real networks.
//!
//! ## Algorithms
//!
//! - **SHA-256 / SHA256d**: FIPS 180-4, used for Bitcoin-style headers
//! - **Scrypt**: PBKDF2-HMAC-SHA256 + ROMix/BlockMix/Salsa20/8, any `N >= 1`
//! - **BLAKE3 (simplified)**: linear chaining, no chunk tree
//! - **RandomX-light**: 256 KB scratchpad VM, 2048 instructions
//!
//! ## Nonce Layouts
//!
//! ```text
//! header : bytes 0..76 || nonce (u32 LE) || ...        (80-byte block header)
//! append : data || nonce (u64 LE)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use powhash_core::{Target, mine_blake3, mine_sha256d, sha256};
//!
//! // Single-shot hashing
//! let digest = sha256::digest_double(b"input data");
//! assert_eq!(digest.len(), 32);
//!
//! // First nonce whose digest has 8 leading zero bits
//! let result = mine_blake3(b"payload", 8, 0, 1_000_000).unwrap();
//! assert!(result.nonce.is_some());
//!
//! // Header mining against a compact target
//! let target = Target::from_compact(0x1d00ffff).unwrap();
//! let result = mine_sha256d(&[0u8; 80], &target, 0, 10).unwrap();
//! assert_eq!(result.hash_count, 11);
//! ```
//!
//! Search is single-threaded; split nonce ranges across threads to scale.

mod buffer;

pub mod benchmark;
pub mod blake3;
pub mod error;
pub mod ffi;
pub mod hasher;
pub mod miner;
pub mod params;
pub mod primitives;
pub mod randomx;
pub mod scrypt;
pub mod sha256;
pub mod target;

/// 32-byte digest produced by every algorithm
pub type Digest = [u8; 32];

pub use benchmark::BenchmarkReport;
pub use error::{PowError, Result};
pub use hasher::{
    Algorithm, Blake3Simplified, DoubleSha256, HasherOptions, PowHasher, RandomXLight, SingleSha256,
};
pub use miner::{MiningResult, NonceLayout, mine_blake3, mine_sha256d, search};
pub use params::*;
pub use scrypt::{Scrypt, ScryptParams};
pub use target::{Difficulty, Target, leading_zero_bits, meets_difficulty};

#[cfg(test)]
mod tests;
