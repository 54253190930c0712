//! Nonce search
//!
//! Scans an inclusive nonce range in ascending order, hashing the candidate
//! buffer for each nonce and stopping at the first digest that satisfies the
//! difficulty. The returned nonce is therefore the smallest satisfying one in
//! the range, and the hash count is exactly the number of digests computed.

use tracing::debug;

use crate::Digest;
use crate::error::{PowError, Result};
use crate::hasher::{Blake3Simplified, DoubleSha256, PowHasher};
use crate::params::{HEADER_NONCE_OFFSET, HEADER_SIZE};
use crate::target::{Difficulty, Target};

/// Outcome of a nonce search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiningResult {
    /// Smallest satisfying nonce, if any
    pub nonce: Option<u64>,
    /// Digests computed, including the successful one
    pub hash_count: u64,
    /// Digest of the winning candidate
    pub digest: Option<Digest>,
}

impl MiningResult {
    pub fn found(&self) -> bool {
        self.nonce.is_some()
    }
}

/// Where the nonce goes in the candidate buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceLayout {
    /// Overwrite a little-endian u32 at `offset`
    Header { offset: usize },
    /// Append a little-endian u64 after the data
    Append,
}

impl NonceLayout {
    /// Bitcoin-style 80-byte header, nonce in bytes 76..80
    pub const BITCOIN_HEADER: NonceLayout = NonceLayout::Header {
        offset: HEADER_NONCE_OFFSET,
    };
}

/// Search `[start, end]` for the first nonce whose digest meets `difficulty`
///
/// Fails without hashing if `start > end`, or, for the header layout, if the
/// nonce field does not fit the buffer or `end` exceeds `u32::MAX`.
pub fn search<H: PowHasher + ?Sized>(
    data: &[u8],
    layout: NonceLayout,
    difficulty: &Difficulty,
    start: u64,
    end: u64,
    hasher: &mut H,
) -> Result<MiningResult> {
    if start > end {
        return Err(PowError::InvalidNonceRange { start, end });
    }

    let mut candidate = match layout {
        NonceLayout::Header { offset } => {
            if offset.checked_add(4).is_none_or(|field_end| field_end > data.len()) {
                return Err(PowError::NonceOffsetOutOfBounds {
                    offset,
                    len: data.len(),
                });
            }
            if end > u32::MAX as u64 {
                return Err(PowError::NonceOutOfRange {
                    nonce: end,
                    max: u32::MAX as u64,
                });
            }
            data.to_vec()
        }
        NonceLayout::Append => {
            let mut buf = Vec::with_capacity(data.len() + 8);
            buf.extend_from_slice(data);
            buf.extend_from_slice(&[0u8; 8]);
            buf
        }
    };

    let nonce_field = match layout {
        NonceLayout::Header { offset } => offset..offset + 4,
        NonceLayout::Append => data.len()..data.len() + 8,
    };

    let mut hash_count = 0u64;
    for nonce in start..=end {
        let field = &mut candidate[nonce_field.clone()];
        match layout {
            NonceLayout::Header { .. } => field.copy_from_slice(&(nonce as u32).to_le_bytes()),
            NonceLayout::Append => field.copy_from_slice(&nonce.to_le_bytes()),
        }

        let digest = hasher.hash(&candidate);
        hash_count += 1;

        if difficulty.is_met_by(&digest) {
            debug!(nonce, hash_count, digest = %hex::encode(digest), "nonce found");
            return Ok(MiningResult {
                nonce: Some(nonce),
                hash_count,
                digest: Some(digest),
            });
        }
    }

    debug!(start, end, hash_count, "nonce range exhausted");
    Ok(MiningResult {
        nonce: None,
        hash_count,
        digest: None,
    })
}

/// Mine an 80-byte block header with double SHA-256 against `target`
pub fn mine_sha256d(
    header: &[u8; HEADER_SIZE],
    target: &Target,
    start: u32,
    end: u32,
) -> Result<MiningResult> {
    search(
        header,
        NonceLayout::BITCOIN_HEADER,
        &Difficulty::Target(*target),
        start as u64,
        end as u64,
        &mut DoubleSha256,
    )
}

/// Mine `data || nonce_le_u64` with simplified BLAKE3 for leading zero bits
pub fn mine_blake3(
    data: &[u8],
    difficulty_bits: u32,
    start: u64,
    end: u64,
) -> Result<MiningResult> {
    search(
        data,
        NonceLayout::Append,
        &Difficulty::LeadingZeros(difficulty_bits),
        start,
        end,
        &mut Blake3Simplified,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{blake3, sha256};

    #[test]
    fn test_zero_difficulty_returns_start() {
        let result = mine_blake3(b"anything", 0, 42, 100).unwrap();
        assert_eq!(result.nonce, Some(42));
        assert_eq!(result.hash_count, 1);
    }

    #[test]
    fn test_exhausted_range_counts_every_attempt() {
        let header = [0u8; HEADER_SIZE];
        let result = mine_sha256d(&header, &Target::ZERO, 0, 99).unwrap();
        assert_eq!(result.nonce, None);
        assert_eq!(result.hash_count, 100);
        assert!(!result.found());
    }

    #[test]
    fn test_single_nonce_range() {
        let result = mine_blake3(b"data", 0, 7, 7).unwrap();
        assert_eq!(result.nonce, Some(7));
        assert_eq!(result.hash_count, 1);
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert_eq!(
            mine_blake3(b"data", 0, 10, 9),
            Err(PowError::InvalidNonceRange { start: 10, end: 9 })
        );
    }

    #[test]
    fn test_header_layout_bounds() {
        let short = [0u8; 10];
        let err = search(
            &short,
            NonceLayout::Header { offset: 8 },
            &Difficulty::LeadingZeros(0),
            0,
            1,
            &mut DoubleSha256,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PowError::NonceOffsetOutOfBounds { offset: 8, len: 10 }
        ));

        let err = search(
            &[0u8; HEADER_SIZE],
            NonceLayout::BITCOIN_HEADER,
            &Difficulty::LeadingZeros(0),
            0,
            u32::MAX as u64 + 1,
            &mut DoubleSha256,
        )
        .unwrap_err();
        assert!(matches!(err, PowError::NonceOutOfRange { .. }));
    }

    #[test]
    fn test_nonce_written_little_endian() {
        let mut seen = Vec::new();
        let mut recorder = |input: &[u8]| {
            seen.push(input.to_vec());
            sha256::digest(input)
        };
        search(
            &[0xAAu8; HEADER_SIZE],
            NonceLayout::BITCOIN_HEADER,
            &Difficulty::Target(Target::ZERO),
            0x0102_0304,
            0x0102_0305,
            &mut recorder,
        )
        .unwrap();

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0][76..80], [0x04, 0x03, 0x02, 0x01]);
        assert_eq!(seen[1][76..80], [0x05, 0x03, 0x02, 0x01]);
        assert!(seen[0][..76].iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn test_append_layout_matches_manual_digest() {
        let result = mine_blake3(b"prefix", 0, 5, 5).unwrap();
        let mut manual = b"prefix".to_vec();
        manual.extend_from_slice(&5u64.to_le_bytes());
        assert_eq!(result.digest, Some(blake3::hash(&manual)));
    }

    #[test]
    fn test_found_digest_meets_difficulty() {
        let result = mine_blake3(b"find me", 8, 0, 100_000).unwrap();
        let nonce = result.nonce.expect("8 bits within 100k nonces");
        assert!(crate::meets_difficulty(&result.digest.unwrap(), 8));
        assert_eq!(result.hash_count, nonce + 1);
    }
}
