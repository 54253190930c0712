//! SHA-256 (FIPS 180-4)
//!
//! Block-cipher-style hash used directly for header mining and as the keyed
//! hash inside the scrypt KDF. The padding length field carries the total
//! number of message bits, accumulated as data is absorbed.

use crate::Digest;
use crate::params::{BLOCK_SIZE, DIGEST_SIZE};
use crate::primitives::{SHA256_IV, sha256_compress};

/// Incremental SHA-256 hasher
#[derive(Clone)]
pub struct Sha256 {
    state: [u32; 8],
    buffer: [u8; BLOCK_SIZE],
    buffer_len: usize,
    /// Total bytes absorbed so far
    total_len: u64,
}

impl Sha256 {
    pub fn new() -> Self {
        Self {
            state: SHA256_IV,
            buffer: [0u8; BLOCK_SIZE],
            buffer_len: 0,
            total_len: 0,
        }
    }

    /// Absorb more message bytes
    pub fn update(&mut self, data: &[u8]) {
        self.total_len = self.total_len.wrapping_add(data.len() as u64);
        let mut data = data;

        // Top up a partially filled buffer first
        if self.buffer_len > 0 {
            let take = (BLOCK_SIZE - self.buffer_len).min(data.len());
            self.buffer[self.buffer_len..self.buffer_len + take].copy_from_slice(&data[..take]);
            self.buffer_len += take;
            data = &data[take..];

            if self.buffer_len < BLOCK_SIZE {
                return;
            }
            sha256_compress(&mut self.state, &self.buffer);
            self.buffer_len = 0;
        }

        let blocks = data.chunks_exact(BLOCK_SIZE);
        let tail = blocks.remainder();
        for block in blocks {
            sha256_compress(&mut self.state, block);
        }

        self.buffer[..tail.len()].copy_from_slice(tail);
        self.buffer_len = tail.len();
    }

    /// Pad with the total message length and return the digest
    pub fn finalize(self) -> Digest {
        let bit_len = self.total_len.wrapping_mul(8);
        self.finalize_with_bit_len(bit_len)
    }

    fn finalize_with_bit_len(mut self, bit_len: u64) -> Digest {
        let mut block = [0u8; BLOCK_SIZE];
        block[..self.buffer_len].copy_from_slice(&self.buffer[..self.buffer_len]);
        block[self.buffer_len] = 0x80;

        // No room for the 8-byte length field: spill into an extra block
        if self.buffer_len >= BLOCK_SIZE - 8 {
            sha256_compress(&mut self.state, &block);
            block = [0u8; BLOCK_SIZE];
        }

        block[BLOCK_SIZE - 8..].copy_from_slice(&bit_len.to_be_bytes());
        sha256_compress(&mut self.state, &block);

        let mut out = [0u8; DIGEST_SIZE];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.state) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        out
    }
}

impl Default for Sha256 {
    fn default() -> Self {
        Self::new()
    }
}

/// SHA-256 of `data`
pub fn digest(data: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize()
}

/// Double SHA-256 (`SHA256(SHA256(data))`), as used for block headers
pub fn digest_double(data: &[u8]) -> Digest {
    digest(&digest(data))
}

/// SHA-256 with the historical length-field defect
///
/// The older native miner wrote only the bit length of the final partial
/// block into the padding, so any input of 64 bytes or more (every 80-byte
/// header) hashed to a non-standard value. This reproduces that output for
/// replaying previously mined data; inputs shorter than 64 bytes match
/// [`digest`].
#[cfg(feature = "legacy-length-field")]
pub fn digest_legacy(data: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let tail_bits = (hasher.buffer_len as u64) * 8;
    hasher.finalize_with_bit_len(tail_bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::Digest as _;

    fn reference(data: &[u8]) -> Digest {
        sha2::Sha256::digest(data).into()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(
            hex::encode(digest(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_fips_vectors() {
        assert_eq!(
            hex::encode(digest(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            hex::encode(digest(
                b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq"
            )),
            "248d6a61d20638b8e5c026930c3e6039a33ce45964ff2167f6ecedd419db06c1"
        );
    }

    #[test]
    fn test_matches_reference_across_lengths() {
        // Covers every padding boundary: 55/56/63/64 and multi-block tails
        let data: Vec<u8> = (0..300u32).map(|i| (i * 31 + 5) as u8).collect();
        for len in 0..=data.len() {
            assert_eq!(
                digest(&data[..len]),
                reference(&data[..len]),
                "mismatch at length {}",
                len
            );
        }
    }

    #[test]
    fn test_length_field_counts_whole_message() {
        // 80 bytes = one full block + 16-byte tail; the length field must say 640 bits
        let header = [0u8; 80];
        assert_eq!(digest(&header), reference(&header));
        assert_eq!(
            hex::encode(digest(&[0u8; 64])),
            "f5a5fd42d16a20302798ef6ed309979b43003d2320d9f0e8ea9831a92759fb4b"
        );
    }

    #[test]
    fn test_incremental_updates_match_one_shot() {
        let data: Vec<u8> = (0..200u8).collect();
        let mut hasher = Sha256::new();
        for piece in data.chunks(7) {
            hasher.update(piece);
        }
        assert_eq!(hasher.finalize(), digest(&data));
    }

    #[test]
    fn test_double_hash() {
        let once = digest(b"hello");
        assert_eq!(digest_double(b"hello"), digest(&once));
    }

    #[cfg(feature = "legacy-length-field")]
    #[test]
    fn test_legacy_length_field() {
        // Short inputs are unaffected
        assert_eq!(digest_legacy(b"abc"), digest(b"abc"));

        // Multi-block inputs diverge from the standard digest
        let header = [0x11u8; 80];
        assert_ne!(digest_legacy(&header), digest(&header));

        // The legacy value equals a standard compression run with a 128-bit length field
        let mut hasher = Sha256::new();
        hasher.update(&header);
        assert_eq!(digest_legacy(&header), hasher.finalize_with_bit_len(16 * 8));
        assert_eq!(
            hex::encode(digest_legacy(&header)),
            "5801b60988f01c57c71b8c2aed431f906275cbf73d3c88a846cb7e70d9b9621b"
        );
    }
}
