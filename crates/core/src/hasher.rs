//! Pluggable digest capability
//!
//! The nonce search and the benchmark only need "bytes in, 32-byte digest
//! out". [`PowHasher`] is that capability; stateful implementations keep
//! their working memory between calls.

use core::fmt;
use core::str::FromStr;

use crate::Digest;
use crate::blake3;
use crate::error::{PowError, Result};
use crate::randomx;
use crate::scrypt::{Scrypt, ScryptParams};
use crate::sha256;

/// A digest function usable by the nonce search
pub trait PowHasher {
    fn hash(&mut self, input: &[u8]) -> Digest;
}

impl<F> PowHasher for F
where
    F: FnMut(&[u8]) -> Digest,
{
    #[inline(always)]
    fn hash(&mut self, input: &[u8]) -> Digest {
        self(input)
    }
}

/// Single SHA-256
#[derive(Debug, Default, Clone, Copy)]
pub struct SingleSha256;

impl PowHasher for SingleSha256 {
    #[inline(always)]
    fn hash(&mut self, input: &[u8]) -> Digest {
        sha256::digest(input)
    }
}

/// Double SHA-256 (block header hashing)
#[derive(Debug, Default, Clone, Copy)]
pub struct DoubleSha256;

impl PowHasher for DoubleSha256 {
    #[inline(always)]
    fn hash(&mut self, input: &[u8]) -> Digest {
        sha256::digest_double(input)
    }
}

/// Simplified BLAKE3
#[derive(Debug, Default, Clone, Copy)]
pub struct Blake3Simplified;

impl PowHasher for Blake3Simplified {
    #[inline(always)]
    fn hash(&mut self, input: &[u8]) -> Digest {
        blake3::hash(input)
    }
}

/// Scrypt with password = salt = input, reusing one workspace
impl PowHasher for Scrypt {
    #[inline(always)]
    fn hash(&mut self, input: &[u8]) -> Digest {
        Scrypt::hash(self, input)
    }
}

/// RandomX-light VM hash
///
/// Without a fixed key the input itself seeds the scratchpad.
#[derive(Debug, Default, Clone)]
pub struct RandomXLight {
    key: Option<Vec<u8>>,
}

impl RandomXLight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: Some(key.into()),
        }
    }
}

impl PowHasher for RandomXLight {
    fn hash(&mut self, input: &[u8]) -> Digest {
        let key = self.key.as_deref().unwrap_or(input);
        randomx::hash(input, key)
    }
}

/// Options for constructing a hasher by algorithm name
#[derive(Debug, Clone, Default)]
pub struct HasherOptions {
    pub scrypt: ScryptParams,
    pub randomx_key: Option<Vec<u8>>,
}

/// Supported proof-of-work digests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Sha256,
    Sha256d,
    Blake3,
    Scrypt,
    RandomX,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Sha256,
        Algorithm::Sha256d,
        Algorithm::Blake3,
        Algorithm::Scrypt,
        Algorithm::RandomX,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha256d => "sha256d",
            Algorithm::Blake3 => "blake3",
            Algorithm::Scrypt => "scrypt",
            Algorithm::RandomX => "randomx",
        }
    }

    /// Numeric identifier used over the C ABI
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(Algorithm::Sha256),
            1 => Some(Algorithm::Scrypt),
            2 => Some(Algorithm::RandomX),
            3 => Some(Algorithm::Blake3),
            4 => Some(Algorithm::Sha256d),
            _ => None,
        }
    }

    /// Hashes computed between clock checks while benchmarking
    pub fn benchmark_batch(&self) -> u64 {
        match self {
            Algorithm::Sha256 | Algorithm::Sha256d | Algorithm::Blake3 => 10_000,
            Algorithm::Scrypt => 10,
            Algorithm::RandomX => 1,
        }
    }

    /// Build a boxed hasher, allocating any working memory up front
    pub fn hasher(&self, options: &HasherOptions) -> Result<Box<dyn PowHasher + Send>> {
        Ok(match self {
            Algorithm::Sha256 => Box::new(SingleSha256),
            Algorithm::Sha256d => Box::new(DoubleSha256),
            Algorithm::Blake3 => Box::new(Blake3Simplified),
            Algorithm::Scrypt => Box::new(Scrypt::new(options.scrypt)?),
            Algorithm::RandomX => Box::new(RandomXLight {
                key: options.randomx_key.clone(),
            }),
        })
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = PowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Algorithm::Sha256),
            "sha256d" | "double-sha256" | "bitcoin" => Ok(Algorithm::Sha256d),
            "blake3" => Ok(Algorithm::Blake3),
            "scrypt" | "litecoin" => Ok(Algorithm::Scrypt),
            "randomx" | "randomx-light" | "monero" => Ok(Algorithm::RandomX),
            _ => Err(PowError::UnknownAlgorithm(s.to_string())),
        }
    }
}
