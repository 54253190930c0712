//! Difficulty targets
//!
//! A digest is read as a little-endian 256-bit integer: byte 31 is the most
//! significant. This is the Bitcoin convention, so a target decoded from a
//! header's `nBits` field compares directly against the raw SHA256d output.
//! Hex strings are written the way block explorers show them, most
//! significant byte first.

use core::fmt;

use crate::Digest;
use crate::error::{PowError, Result};
use crate::params::DIGEST_SIZE;

/// 256-bit mining target in digest byte order
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target([u8; DIGEST_SIZE]);

impl Target {
    /// Every digest meets this target
    pub const MAX: Target = Target([0xFF; DIGEST_SIZE]);

    /// Only the all-zero digest meets this target
    pub const ZERO: Target = Target([0u8; DIGEST_SIZE]);

    /// Wrap bytes already in digest (little-endian) order
    pub const fn from_le_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    /// Wrap bytes in display (big-endian) order
    pub fn from_be_bytes(mut bytes: [u8; DIGEST_SIZE]) -> Self {
        bytes.reverse();
        Self(bytes)
    }

    /// Build from a little-endian slice, which must be exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; DIGEST_SIZE] = bytes.try_into().map_err(|_| PowError::InvalidLength {
            expected: DIGEST_SIZE,
            got: bytes.len(),
        })?;
        Ok(Self(bytes))
    }

    /// Parse big-endian display hex (64 hex characters, optional `0x`)
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let decoded = hex::decode(s)?;
        let bytes: [u8; DIGEST_SIZE] =
            decoded
                .as_slice()
                .try_into()
                .map_err(|_| PowError::InvalidLength {
                    expected: DIGEST_SIZE,
                    got: decoded.len(),
                })?;
        Ok(Self::from_be_bytes(bytes))
    }

    /// Decode a compact `nBits` value: `mantissa * 256^(exponent - 3)`
    pub fn from_compact(bits: u32) -> Result<Self> {
        let exponent = (bits >> 24) as usize;
        let mantissa = bits & 0x007f_ffff;

        if bits & 0x0080_0000 != 0 && mantissa != 0 {
            return Err(PowError::InvalidCompactTarget {
                bits,
                reason: "negative target",
            });
        }

        let mut le = [0u8; DIGEST_SIZE];
        let mantissa_bytes = mantissa.to_le_bytes();

        if exponent <= 3 {
            let value = mantissa >> (8 * (3 - exponent));
            le[..4].copy_from_slice(&value.to_le_bytes());
            return Ok(Self(le));
        }

        // Mantissa byte i lands at position (exponent - 3 + i)
        let shift = exponent - 3;
        for (i, &byte) in mantissa_bytes[..3].iter().enumerate() {
            if byte == 0 {
                continue;
            }
            match le.get_mut(shift + i) {
                Some(slot) => *slot = byte,
                None => {
                    return Err(PowError::InvalidCompactTarget {
                        bits,
                        reason: "target exceeds 256 bits",
                    });
                }
            }
        }
        Ok(Self(le))
    }

    /// Bytes in digest (little-endian) order
    pub fn as_le_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    /// Bytes in display (big-endian) order
    pub fn to_be_bytes(&self) -> [u8; DIGEST_SIZE] {
        let mut bytes = self.0;
        bytes.reverse();
        bytes
    }

    /// Big-endian display hex
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_be_bytes())
    }

    /// True if `digest <= target`
    ///
    /// Bytes are compared from the most significant (index 31) down; the
    /// first unequal byte decides and an exact match succeeds.
    #[inline(always)]
    pub fn is_met_by(&self, digest: &Digest) -> bool {
        for i in (0..DIGEST_SIZE).rev() {
            if digest[i] < self.0[i] {
                return true;
            }
            if digest[i] > self.0[i] {
                return false;
            }
        }
        true
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::MAX
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Target({})", self.to_hex())
    }
}

/// Number of leading zero bits, counting from byte 0 most significant bit first
#[inline(always)]
pub fn leading_zero_bits(hash: &Digest) -> u32 {
    let mut zero_bits = 0u32;

    for byte in hash.iter() {
        if *byte == 0 {
            zero_bits += 8;
        } else {
            zero_bits += byte.leading_zeros();
            break;
        }
    }

    zero_bits
}

/// Check if hash meets difficulty requirement
///
/// Difficulty is the number of leading zero bits required.
#[inline(always)]
pub fn meets_difficulty(hash: &Digest, difficulty: u32) -> bool {
    leading_zero_bits(hash) >= difficulty
}

/// Success predicate for a nonce search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    /// Digest, read little-endian, must not exceed the target
    Target(Target),
    /// Digest must start with at least this many zero bits
    LeadingZeros(u32),
}

impl Difficulty {
    #[inline(always)]
    pub fn is_met_by(&self, digest: &Digest) -> bool {
        match self {
            Difficulty::Target(target) => target.is_met_by(digest),
            Difficulty::LeadingZeros(bits) => meets_difficulty(digest, *bits),
        }
    }
}

impl From<Target> for Difficulty {
    fn from(target: Target) -> Self {
        Difficulty::Target(target)
    }
}
