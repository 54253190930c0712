//! Scrypt-style memory-hard KDF
//!
//! Pipeline:
//!
//! ```text
//! B      = PBKDF2-HMAC-SHA256(password, salt, 1, p × 128r)
//! B[i]   = ROMix(B[i])            for each of the p lanes
//! output = PBKDF2-HMAC-SHA256(password, B, 1, output_len)
//! ```
//!
//! ROMix first materializes an `N`-entry table of successive BlockMix outputs,
//! then performs `N` more BlockMix steps, each XORing in the table entry
//! selected by the low word of the last sub-block modulo `N`. The table is
//! fully written before the first randomized read.

use tracing::trace;

use crate::Digest;
use crate::buffer;
use crate::error::{PowError, Result};
use crate::params::{
    BLOCK_SIZE, DIGEST_SIZE, SALSA_BLOCK_SIZE, SCRYPT_LITECOIN_N, SCRYPT_LITECOIN_P,
    SCRYPT_LITECOIN_R,
};
use crate::primitives::salsa20_8;
use crate::sha256::{self, Sha256};

/// Words per Salsa20/8 sub-block
const SALSA_WORDS: usize = SALSA_BLOCK_SIZE / 4;

/// Largest PBKDF2 output: (2^32 - 1) blocks of 32 bytes
const PBKDF2_MAX_OUTPUT: u64 = (u32::MAX as u64) * DIGEST_SIZE as u64;

/// Validated scrypt cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScryptParams {
    n: u32,
    r: u32,
    p: u32,
}

impl ScryptParams {
    /// Litecoin parameters (N=1024, r=1, p=1)
    pub const LITECOIN: ScryptParams = ScryptParams {
        n: SCRYPT_LITECOIN_N,
        r: SCRYPT_LITECOIN_R,
        p: SCRYPT_LITECOIN_P,
    };

    /// Validate `N` (cost), `r` (block size factor) and `p` (parallelization).
    ///
    /// Rejects zero values, `r × p ≥ 2^30`, and any combination whose working
    /// buffers would not fit in `usize`. Nothing is allocated here.
    pub fn new(n: u32, r: u32, p: u32) -> Result<Self> {
        let invalid = |reason| PowError::InvalidScryptParams { n, r, p, reason };

        if n == 0 {
            return Err(invalid("N must be at least 1"));
        }
        if r == 0 {
            return Err(invalid("r must be at least 1"));
        }
        if p == 0 {
            return Err(invalid("p must be at least 1"));
        }
        if (r as u64) * (p as u64) >= 1 << 30 {
            return Err(invalid("r * p must be below 2^30"));
        }

        let params = Self { n, r, p };
        let block_len = params
            .checked_block_len()
            .ok_or_else(|| invalid("block size overflows usize"))?;
        block_len
            .checked_mul(p as usize)
            .ok_or_else(|| invalid("lane buffer overflows usize"))?;
        block_len
            .checked_mul(n as usize)
            .ok_or_else(|| invalid("ROMix table overflows usize"))?;
        block_len
            .checked_mul(2)
            .ok_or_else(|| invalid("scratch pair overflows usize"))?;

        trace!(n, r, p, "scrypt parameters accepted");
        Ok(params)
    }

    pub fn n(&self) -> u32 {
        self.n
    }

    pub fn r(&self) -> u32 {
        self.r
    }

    pub fn p(&self) -> u32 {
        self.p
    }

    /// Bytes per lane (`128 × r`)
    pub fn block_len(&self) -> usize {
        128 * self.r as usize
    }

    /// Bytes held by the ROMix table (`N × 128r`)
    pub fn table_len(&self) -> usize {
        self.block_len() * self.n as usize
    }

    fn checked_block_len(&self) -> Option<usize> {
        128usize.checked_mul(usize::try_from(self.r).ok()?)
    }

    fn block_words(&self) -> usize {
        self.block_len() / 4
    }
}

impl Default for ScryptParams {
    fn default() -> Self {
        Self::LITECOIN
    }
}

/// HMAC-SHA256 with the key schedule precomputed
///
/// Keys longer than one SHA-256 block are hashed first.
#[derive(Clone)]
pub struct HmacSha256 {
    inner: Sha256,
    outer: Sha256,
}

impl HmacSha256 {
    pub fn new(key: &[u8]) -> Self {
        let mut block_key = [0u8; BLOCK_SIZE];
        if key.len() > BLOCK_SIZE {
            block_key[..DIGEST_SIZE].copy_from_slice(&sha256::digest(key));
        } else {
            block_key[..key.len()].copy_from_slice(key);
        }

        let mut ipad = [0x36u8; BLOCK_SIZE];
        let mut opad = [0x5cu8; BLOCK_SIZE];
        for ((i, o), k) in ipad.iter_mut().zip(opad.iter_mut()).zip(block_key) {
            *i ^= k;
            *o ^= k;
        }

        let mut inner = Sha256::new();
        inner.update(&ipad);
        let mut outer = Sha256::new();
        outer.update(&opad);
        Self { inner, outer }
    }

    /// MAC over the concatenation of `parts`
    pub fn mac_parts(&self, parts: &[&[u8]]) -> Digest {
        let mut inner = self.inner.clone();
        for part in parts {
            inner.update(part);
        }
        let inner_hash = inner.finalize();

        let mut outer = self.outer.clone();
        outer.update(&inner_hash);
        outer.finalize()
    }

    pub fn mac(&self, message: &[u8]) -> Digest {
        self.mac_parts(&[message])
    }
}

/// HMAC-SHA256 of `message` under `key`
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Digest {
    HmacSha256::new(key).mac(message)
}

/// PBKDF2-HMAC-SHA256, filling `output`
pub fn pbkdf2_sha256(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    output: &mut [u8],
) -> Result<()> {
    if iterations == 0 {
        return Err(PowError::InvalidIterationCount);
    }
    check_output_len(output.len())?;
    pbkdf2_unchecked(&HmacSha256::new(password), salt, iterations, output);
    Ok(())
}

fn check_output_len(len: usize) -> Result<()> {
    if len == 0 || len as u64 > PBKDF2_MAX_OUTPUT {
        return Err(PowError::InvalidOutputLength {
            len,
            max: usize::try_from(PBKDF2_MAX_OUTPUT).unwrap_or(usize::MAX),
        });
    }
    Ok(())
}

fn pbkdf2_unchecked(prf: &HmacSha256, salt: &[u8], iterations: u32, output: &mut [u8]) {
    for (index, chunk) in output.chunks_mut(DIGEST_SIZE).enumerate() {
        // Block numbers start at 1, big-endian
        let block_num = (index as u32).wrapping_add(1).to_be_bytes();

        let mut u = prf.mac_parts(&[salt, &block_num]);
        let mut t = u;
        for _ in 1..iterations {
            u = prf.mac(&u);
            for (t_byte, u_byte) in t.iter_mut().zip(u) {
                *t_byte ^= u_byte;
            }
        }

        chunk.copy_from_slice(&t[..chunk.len()]);
    }
}

/// Reusable scrypt workspace
///
/// Owns the lane buffer, the ROMix table and the scratch pair, all sized
/// from the parameters at construction. Reusing one instance across a nonce
/// search avoids re-allocating the table for every candidate.
pub struct Scrypt {
    params: ScryptParams,
    lanes: Vec<u8>,
    table: Vec<u32>,
    scratch: Vec<u32>,
}

impl Scrypt {
    /// Allocate the working set for `params`
    pub fn new(params: ScryptParams) -> Result<Self> {
        let block_len = params.block_len();
        let words = params.block_words();

        let lanes = buffer::zeroed(block_len * params.p as usize, "scrypt lanes")?;
        let table = buffer::zeroed(words * params.n as usize, "ROMix table")?;
        let scratch = buffer::zeroed(2 * words, "ROMix scratch")?;

        Ok(Self {
            params,
            lanes,
            table,
            scratch,
        })
    }

    pub fn params(&self) -> &ScryptParams {
        &self.params
    }

    /// Derive `output.len()` bytes from `password` and `salt`
    pub fn derive_into(&mut self, password: &[u8], salt: &[u8], output: &mut [u8]) -> Result<()> {
        check_output_len(output.len())?;
        self.run(password, salt, output);
        Ok(())
    }

    /// Reduced calling convention: password = salt = `input`, 32-byte output
    pub fn hash(&mut self, input: &[u8]) -> Digest {
        let mut out = [0u8; DIGEST_SIZE];
        self.run(input, input, &mut out);
        out
    }

    fn run(&mut self, password: &[u8], salt: &[u8], output: &mut [u8]) {
        let prf = HmacSha256::new(password);
        let block_len = self.params.block_len();
        let r = self.params.r as usize;
        let n = self.params.n as usize;

        pbkdf2_unchecked(&prf, salt, 1, &mut self.lanes);

        for lane in self.lanes.chunks_exact_mut(block_len) {
            ro_mix(lane, r, n, &mut self.table, &mut self.scratch);
        }

        pbkdf2_unchecked(&prf, &self.lanes, 1, output);
    }
}

/// Derive `output_len` bytes with a one-shot workspace
pub fn derive(
    password: &[u8],
    salt: &[u8],
    params: &ScryptParams,
    output_len: usize,
) -> Result<Vec<u8>> {
    check_output_len(output_len)?;
    let mut workspace = Scrypt::new(*params)?;
    let mut out = buffer::zeroed(output_len, "scrypt output")?;
    workspace.run(password, salt, &mut out);
    Ok(out)
}

/// Scrypt digest of `input` (password = salt = input)
pub fn hash(input: &[u8], params: &ScryptParams) -> Result<Digest> {
    Ok(Scrypt::new(*params)?.hash(input))
}

/// ROMix over one lane of `128 × r` bytes
///
/// `table` holds `N × 32r` words, `scratch` holds `2 × 32r` words.
fn ro_mix(lane: &mut [u8], r: usize, n: usize, table: &mut [u32], scratch: &mut [u32]) {
    let words = 32 * r;
    let (x, y) = scratch.split_at_mut(words);

    for (word, bytes) in x.iter_mut().zip(lane.chunks_exact(4)) {
        *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }

    // Phase 1: fill the whole table before any data-dependent read
    for entry in table.chunks_exact_mut(words) {
        entry.copy_from_slice(x);
        block_mix(x, y, r);
    }

    // Phase 2: randomized reads
    for _ in 0..n {
        let j = integerify(x, r) % n;
        let entry = &table[j * words..(j + 1) * words];
        for (xw, vw) in x.iter_mut().zip(entry) {
            *xw ^= vw;
        }
        block_mix(x, y, r);
    }

    for (bytes, word) in lane.chunks_exact_mut(4).zip(x.iter()) {
        bytes.copy_from_slice(&word.to_le_bytes());
    }
}

/// First word of the last sub-block
#[inline(always)]
fn integerify(x: &[u32], r: usize) -> usize {
    x[(2 * r - 1) * SALSA_WORDS] as usize
}

/// BlockMix: Salsa20/8 chain over the `2r` sub-blocks, outputs interleaved
/// even-then-odd back into `b`. `y` must hold at least `32r` words.
fn block_mix(b: &mut [u32], y: &mut [u32], r: usize) {
    let mut x = [0u32; SALSA_WORDS];
    x.copy_from_slice(&b[(2 * r - 1) * SALSA_WORDS..2 * r * SALSA_WORDS]);

    for (sub_block, out) in b
        .chunks_exact(SALSA_WORDS)
        .zip(y.chunks_exact_mut(SALSA_WORDS))
    {
        for (xw, bw) in x.iter_mut().zip(sub_block) {
            *xw ^= bw;
        }
        salsa20_8(&mut x);
        out.copy_from_slice(&x);
    }

    for i in 0..r {
        let even = 2 * i * SALSA_WORDS;
        let odd = (2 * i + 1) * SALSA_WORDS;
        b[i * SALSA_WORDS..(i + 1) * SALSA_WORDS].copy_from_slice(&y[even..even + SALSA_WORDS]);
        b[(r + i) * SALSA_WORDS..(r + i + 1) * SALSA_WORDS]
            .copy_from_slice(&y[odd..odd + SALSA_WORDS]);
    }
}
