//! Raw compression functions
//!
//! The fixed-size cores every digest is assembled from: the SHA-256
//! compression function, the BLAKE3 compression function and the Salsa20/8
//! core used by scrypt's BlockMix.

use core::slice;

use sha2::digest::generic_array::GenericArray;

use crate::params::BLOCK_SIZE;

/// SHA-256 initial hash values (fractional parts of the square roots of the first 8 primes)
pub const SHA256_IV: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

/// SHA-256 compression function
///
/// Folds one 64-byte block into `state`. `block` must be exactly
/// [`BLOCK_SIZE`] bytes.
#[inline(always)]
pub fn sha256_compress(state: &mut [u32; 8], block: &[u8]) {
    debug_assert_eq!(block.len(), BLOCK_SIZE);
    sha2::compress256(state, slice::from_ref(GenericArray::from_slice(block)));
}

/// BLAKE3 initial chaining value (same words as the SHA-256 IV)
pub const BLAKE3_IV: [u32; 8] = SHA256_IV;

/// BLAKE3 domain flag for the first block of a chunk
pub const CHUNK_START: u32 = 1 << 0;
/// BLAKE3 domain flag for the last block of a chunk
pub const CHUNK_END: u32 = 1 << 1;
/// BLAKE3 domain flag for the block producing the output
pub const ROOT: u32 = 1 << 3;

/// Message permutation schedule for BLAKE3
const MSG_SCHEDULE: [[usize; 16]; 7] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [2, 6, 3, 10, 7, 0, 4, 13, 1, 11, 12, 5, 9, 14, 15, 8],
    [3, 4, 10, 12, 13, 2, 7, 14, 6, 5, 9, 0, 11, 15, 8, 1],
    [10, 7, 12, 9, 14, 3, 13, 15, 4, 0, 11, 2, 5, 8, 1, 6],
    [12, 13, 9, 11, 15, 10, 14, 8, 7, 2, 5, 3, 0, 1, 6, 4],
    [9, 14, 11, 5, 8, 12, 15, 1, 13, 3, 0, 10, 2, 6, 4, 7],
    [11, 15, 5, 0, 1, 9, 8, 6, 14, 10, 2, 12, 3, 4, 7, 13],
];

/// BLAKE3 compression function (7 rounds)
///
/// Returns the full 16-word output state: words 0..8 are the next chaining
/// value, words 8..16 carry the chaining value folded into the upper half.
#[inline(always)]
pub fn blake3_compress(
    cv: &[u32; 8],
    block: &[u8; BLOCK_SIZE],
    counter: u64,
    block_len: u32,
    flags: u32,
) -> [u32; 16] {
    let mut m = [0u32; 16];
    for (word, bytes) in m.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }

    let mut v = [
        cv[0],
        cv[1],
        cv[2],
        cv[3],
        cv[4],
        cv[5],
        cv[6],
        cv[7],
        BLAKE3_IV[0],
        BLAKE3_IV[1],
        BLAKE3_IV[2],
        BLAKE3_IV[3],
        counter as u32,
        (counter >> 32) as u32,
        block_len,
        flags,
    ];

    for s in &MSG_SCHEDULE {
        // Column mixing
        g(&mut v, 0, 4, 8, 12, m[s[0]], m[s[1]]);
        g(&mut v, 1, 5, 9, 13, m[s[2]], m[s[3]]);
        g(&mut v, 2, 6, 10, 14, m[s[4]], m[s[5]]);
        g(&mut v, 3, 7, 11, 15, m[s[6]], m[s[7]]);

        // Diagonal mixing
        g(&mut v, 0, 5, 10, 15, m[s[8]], m[s[9]]);
        g(&mut v, 1, 6, 11, 12, m[s[10]], m[s[11]]);
        g(&mut v, 2, 7, 8, 13, m[s[12]], m[s[13]]);
        g(&mut v, 3, 4, 9, 14, m[s[14]], m[s[15]]);
    }

    for i in 0..8 {
        v[i] ^= v[i + 8];
        v[i + 8] ^= cv[i];
    }

    v
}

/// BLAKE3 G mixing function
#[inline(always)]
fn g(v: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize, mx: u32, my: u32) {
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(mx);
    v[d] = (v[d] ^ v[a]).rotate_right(16);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(12);
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(my);
    v[d] = (v[d] ^ v[a]).rotate_right(8);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(7);
}

/// Salsa20/8 core: four double rounds over 16 words, then feed-forward
#[inline(always)]
pub fn salsa20_8(b: &mut [u32; 16]) {
    let mut x = *b;

    for _ in 0..4 {
        // Column round
        quarter_round(&mut x, 0, 4, 8, 12);
        quarter_round(&mut x, 5, 9, 13, 1);
        quarter_round(&mut x, 10, 14, 2, 6);
        quarter_round(&mut x, 15, 3, 7, 11);

        // Row round
        quarter_round(&mut x, 0, 1, 2, 3);
        quarter_round(&mut x, 5, 6, 7, 4);
        quarter_round(&mut x, 10, 11, 8, 9);
        quarter_round(&mut x, 15, 12, 13, 14);
    }

    for (out, mixed) in b.iter_mut().zip(x) {
        *out = out.wrapping_add(mixed);
    }
}

/// Salsa20 quarter round on `(y0, y1, y2, y3)`
#[inline(always)]
fn quarter_round(x: &mut [u32; 16], y0: usize, y1: usize, y2: usize, y3: usize) {
    x[y1] ^= x[y0].wrapping_add(x[y3]).rotate_left(7);
    x[y2] ^= x[y1].wrapping_add(x[y0]).rotate_left(9);
    x[y3] ^= x[y2].wrapping_add(x[y1]).rotate_left(13);
    x[y0] ^= x[y3].wrapping_add(x[y2]).rotate_left(18);
}
