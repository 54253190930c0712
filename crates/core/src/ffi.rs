//! C ABI for host applications
//!
//! Buffers are passed as pointer + length; every digest is written to a
//! caller-provided 32-byte buffer. Status codes: `0` success (or nonce not
//! found), `1` nonce found, negative values are errors. Panics are caught
//! and reported as [`STATUS_PANIC`].

use core::slice;
use std::panic::{self, UnwindSafe};
use std::time::Duration;

use crate::error::PowError;
use crate::hasher::{Algorithm, HasherOptions};
use crate::params::{DIGEST_SIZE, HEADER_SIZE};
use crate::scrypt::ScryptParams;
use crate::target::Target;
use crate::{Digest, benchmark, blake3, miner, randomx, scrypt, sha256};

pub const STATUS_OK: i32 = 0;
pub const STATUS_FOUND: i32 = 1;
pub const STATUS_NULL_POINTER: i32 = -1;
pub const STATUS_INVALID_ARGUMENT: i32 = -2;
pub const STATUS_ALLOCATION: i32 = -3;
pub const STATUS_PANIC: i32 = -4;

/// NUL-terminated version string
static VERSION_CSTR: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

fn status_of(err: &PowError) -> i32 {
    match err {
        PowError::Allocation { .. } => STATUS_ALLOCATION,
        _ => STATUS_INVALID_ARGUMENT,
    }
}

fn guard<F: FnOnce() -> i32 + UnwindSafe>(f: F) -> i32 {
    panic::catch_unwind(f).unwrap_or(STATUS_PANIC)
}

/// Borrow `len` bytes at `ptr`; a zero length accepts any pointer
unsafe fn input<'a>(ptr: *const u8, len: usize) -> Option<&'a [u8]> {
    if len == 0 {
        return Some(&[]);
    }
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { slice::from_raw_parts(ptr, len) })
}

unsafe fn write_digest(output: *mut u8, digest: &Digest) {
    let out = unsafe { slice::from_raw_parts_mut(output, DIGEST_SIZE) };
    out.copy_from_slice(digest);
}

fn hash_with(data: *const u8, len: usize, output: *mut u8, f: fn(&[u8]) -> Digest) -> i32 {
    if output.is_null() {
        return STATUS_NULL_POINTER;
    }
    guard(|| unsafe {
        let Some(data) = input(data, len) else {
            return STATUS_NULL_POINTER;
        };
        write_digest(output, &f(data));
        STATUS_OK
    })
}

/// SHA-256 of `input[..input_len]` into the 32-byte `output`
#[unsafe(no_mangle)]
pub extern "C" fn powhash_sha256(input: *const u8, input_len: usize, output: *mut u8) -> i32 {
    hash_with(input, input_len, output, sha256::digest)
}

/// Double SHA-256 of `input[..input_len]` into the 32-byte `output`
#[unsafe(no_mangle)]
pub extern "C" fn powhash_sha256d(input: *const u8, input_len: usize, output: *mut u8) -> i32 {
    hash_with(input, input_len, output, sha256::digest_double)
}

/// Simplified BLAKE3 of `input[..input_len]` into the 32-byte `output`
#[unsafe(no_mangle)]
pub extern "C" fn powhash_blake3(input: *const u8, input_len: usize, output: *mut u8) -> i32 {
    hash_with(input, input_len, output, blake3::hash)
}

/// Scrypt digest (password = salt = input)
/// Returns -2 for invalid parameters and -3 if the table cannot be allocated.
#[unsafe(no_mangle)]
pub extern "C" fn powhash_scrypt(
    input: *const u8,
    input_len: usize,
    n: u32,
    r: u32,
    p: u32,
    output: *mut u8,
) -> i32 {
    if output.is_null() {
        return STATUS_NULL_POINTER;
    }
    guard(|| unsafe {
        let Some(data) = self::input(input, input_len) else {
            return STATUS_NULL_POINTER;
        };
        let digest = ScryptParams::new(n, r, p)
            .and_then(|params| scrypt::hash(data, &params));
        match digest {
            Ok(digest) => {
                write_digest(output, &digest);
                STATUS_OK
            }
            Err(err) => status_of(&err),
        }
    })
}

/// RandomX-light VM hash with the scratchpad seeded from `key`
#[unsafe(no_mangle)]
pub extern "C" fn powhash_randomx_light(
    input: *const u8,
    input_len: usize,
    key: *const u8,
    key_len: usize,
    output: *mut u8,
) -> i32 {
    if output.is_null() {
        return STATUS_NULL_POINTER;
    }
    guard(|| unsafe {
        let (Some(data), Some(key)) = (self::input(input, input_len), self::input(key, key_len))
        else {
            return STATUS_NULL_POINTER;
        };
        write_digest(output, &randomx::hash(data, key));
        STATUS_OK
    })
}

/// Mine an 80-byte header with double SHA-256
/// - target: 32 bytes in digest (little-endian) order
/// - hash_count_out: optional, receives the number of hashes computed
///
/// Returns the winning nonce, -1 if the range was exhausted, or a value
/// below -1 on error.
#[unsafe(no_mangle)]
pub extern "C" fn powhash_mine_sha256d(
    header: *const u8,
    header_len: usize,
    target: *const u8,
    start_nonce: u32,
    end_nonce: u32,
    hash_count_out: *mut u64,
) -> i64 {
    let outcome = panic::catch_unwind(|| unsafe {
        let Some(header) = self::input(header, header_len) else {
            return Err(STATUS_NULL_POINTER);
        };
        let header: &[u8; HEADER_SIZE] = header.try_into().map_err(|_| STATUS_INVALID_ARGUMENT)?;
        let Some(target) = self::input(target, DIGEST_SIZE) else {
            return Err(STATUS_NULL_POINTER);
        };
        let target = Target::from_slice(target).map_err(|e| status_of(&e))?;
        miner::mine_sha256d(header, &target, start_nonce, end_nonce)
            .map_err(|e| status_of(&e))
    });

    match outcome {
        Ok(Ok(result)) => {
            if !hash_count_out.is_null() {
                unsafe { *hash_count_out = result.hash_count };
            }
            result.nonce.map_or(-1, |nonce| nonce as i64)
        }
        Ok(Err(status)) => status as i64 - 1,
        Err(_) => STATUS_PANIC as i64 - 1,
    }
}

/// Mine `data || nonce_le_u64` with simplified BLAKE3 for `difficulty` leading zero bits
/// Returns 1 and writes `nonce_out` on success, 0 if the range was exhausted.
#[unsafe(no_mangle)]
pub extern "C" fn powhash_mine_blake3(
    data: *const u8,
    data_len: usize,
    difficulty: u32,
    start_nonce: u64,
    end_nonce: u64,
    nonce_out: *mut u64,
    hash_count_out: *mut u64,
) -> i32 {
    if nonce_out.is_null() {
        return STATUS_NULL_POINTER;
    }
    guard(|| unsafe {
        let Some(data) = input(data, data_len) else {
            return STATUS_NULL_POINTER;
        };
        match miner::mine_blake3(data, difficulty, start_nonce, end_nonce) {
            Ok(result) => {
                if !hash_count_out.is_null() {
                    *hash_count_out = result.hash_count;
                }
                match result.nonce {
                    Some(nonce) => {
                        *nonce_out = nonce;
                        STATUS_FOUND
                    }
                    None => STATUS_OK,
                }
            }
            Err(err) => status_of(&err),
        }
    })
}

/// Benchmark an algorithm for `duration_ms` milliseconds
/// Algorithm ids: 0 sha256, 1 scrypt, 2 randomx, 3 blake3, 4 sha256d.
/// Returns hashes per second, or a negative value on error.
#[unsafe(no_mangle)]
pub extern "C" fn powhash_benchmark(algorithm_id: u32, duration_ms: u32) -> f64 {
    let Some(algorithm) = Algorithm::from_id(algorithm_id) else {
        return STATUS_INVALID_ARGUMENT as f64;
    };
    let duration = Duration::from_millis(duration_ms as u64);
    let options = HasherOptions::default();
    match panic::catch_unwind(|| benchmark::run(algorithm, &options, duration)) {
        Ok(Ok(report)) => report.hashes_per_second,
        Ok(Err(err)) => status_of(&err) as f64,
        Err(_) => STATUS_PANIC as f64,
    }
}

/// Engine version as a NUL-terminated string with static lifetime
#[unsafe(no_mangle)]
pub extern "C" fn powhash_version() -> *const core::ffi::c_char {
    VERSION_CSTR.as_ptr().cast()
}
