//! Simplified BLAKE3
//!
//! Runs the real BLAKE3 compression function as a single linear chain of
//! 64-byte blocks with the counter fixed at zero. There is no 1024-byte
//! chunking and no Merkle tree:
//!
//! ```text
//! len <= 64   : one block, CHUNK_START | CHUNK_END | ROOT
//! len  > 64   : first block CHUNK_START, middle blocks no flags,
//!               final block (1..=64 bytes, zero padded) CHUNK_END | ROOT
//! ```
//!
//! For inputs up to 1024 bytes this is exactly standard BLAKE3. Longer
//! inputs produce a deterministic digest that differs from the standard one.

use crate::Digest;
use crate::params::{BLOCK_SIZE, DIGEST_SIZE};
use crate::primitives::{BLAKE3_IV, CHUNK_END, CHUNK_START, ROOT, blake3_compress};

/// Simplified BLAKE3 digest of `input`
pub fn hash(input: &[u8]) -> Digest {
    if input.len() <= BLOCK_SIZE {
        let out = compress_tail(&BLAKE3_IV, input, CHUNK_START | CHUNK_END | ROOT);
        return output_bytes(&out);
    }

    let mut cv = BLAKE3_IV;
    let mut remaining = input;
    let mut flags = CHUNK_START;

    // Every block except the last (which may be full) is chained without output flags
    while remaining.len() > BLOCK_SIZE {
        let (block, rest) = remaining.split_at(BLOCK_SIZE);
        let mut buf = [0u8; BLOCK_SIZE];
        buf.copy_from_slice(block);
        let out = blake3_compress(&cv, &buf, 0, BLOCK_SIZE as u32, flags);
        cv.copy_from_slice(&out[..8]);
        remaining = rest;
        flags = 0;
    }

    output_bytes(&compress_tail(&cv, remaining, CHUNK_END | ROOT))
}

/// Compress a final block of 1..=64 bytes (or the empty message)
#[inline(always)]
fn compress_tail(cv: &[u32; 8], tail: &[u8], flags: u32) -> [u32; 16] {
    let mut block = [0u8; BLOCK_SIZE];
    block[..tail.len()].copy_from_slice(tail);
    blake3_compress(cv, &block, 0, tail.len() as u32, flags)
}

/// First eight output words, little-endian
#[inline(always)]
fn output_bytes(words: &[u32; 16]) -> Digest {
    let mut out = [0u8; DIGEST_SIZE];
    for (chunk, word) in out.chunks_exact_mut(4).zip(&words[..8]) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    out
}
