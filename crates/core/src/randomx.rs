//! RandomX-light VM hash
//!
//! A lightweight stand-in for RandomX light mode. It is not interoperable
//! with the real RandomX algorithm.
//!
//! ## Structure
//!
//! 1. A 256 KB scratchpad is filled 16 bytes at a time by a
//!    substitution-permutation round seeded from the first 16 key bytes
//! 2. A 256-byte register file is seeded from the first 256 input bytes
//! 3. 2048 pseudo-instructions read 8 bytes at a register-derived address,
//!    mutate a register region and XOR-write back into the scratchpad
//! 4. The digest is the simplified BLAKE3 hash of the registers followed by
//!    the first 256 scratchpad bytes

use tracing::warn;

use crate::Digest;
use crate::blake3;
use crate::buffer;
use crate::error::Result;
use crate::params::{REGISTER_FILE_SIZE, SCRATCHPAD_SIZE, SCRATCHPAD_STEP, VM_INSTRUCTIONS};

/// Fixed round key mixed into every scratchpad fill step
const ROUND_KEY: [u8; SCRATCHPAD_STEP] = [
    0x6a, 0x09, 0xe6, 0x67, 0xbb, 0x67, 0xae, 0x85, 0x3c, 0x6e, 0xf3, 0x72, 0xa5, 0x4f, 0xf5, 0x3a,
];

/// Bytes read per instruction
const WORD: usize = 8;

/// VM hash of `input` with the scratchpad seeded from `key`
///
/// If the scratchpad cannot be allocated the simplified BLAKE3 digest of
/// `input` is returned instead and a warning is logged. Use [`try_hash`] to
/// observe that failure.
pub fn hash(input: &[u8], key: &[u8]) -> Digest {
    match try_hash(input, key) {
        Ok(digest) => digest,
        Err(err) => {
            warn!(error = %err, "VM scratchpad unavailable, falling back to permutation hash");
            blake3::hash(input)
        }
    }
}

/// VM hash of `input`, reporting scratchpad allocation failure
pub fn try_hash(input: &[u8], key: &[u8]) -> Result<Digest> {
    let mut scratchpad: Vec<u8> = buffer::zeroed(SCRATCHPAD_SIZE, "VM scratchpad")?;
    fill_scratchpad(&mut scratchpad, key);

    let mut registers = seed_registers(input);
    execute_program(&mut scratchpad, &mut registers);

    let mut final_input = [0u8; 2 * REGISTER_FILE_SIZE];
    final_input[..REGISTER_FILE_SIZE].copy_from_slice(&registers);
    final_input[REGISTER_FILE_SIZE..].copy_from_slice(&scratchpad[..REGISTER_FILE_SIZE]);
    Ok(blake3::hash(&final_input))
}

/// One substitution-permutation round over a 16-byte state
#[inline(always)]
fn sp_round(state: &mut [u8; SCRATCHPAD_STEP]) {
    for (s, k) in state.iter_mut().zip(ROUND_KEY) {
        *s = (*s ^ k).wrapping_mul(0x9D).wrapping_add(0x5B);
    }

    // Row 1 shifts left by one column
    let t = state[1];
    state[1] = state[5];
    state[5] = state[9];
    state[9] = state[13];
    state[13] = t;

    // Row 2 by two
    state.swap(2, 10);
    state.swap(6, 14);

    // Row 3 by three
    let t = state[15];
    state[15] = state[11];
    state[11] = state[7];
    state[7] = state[3];
    state[3] = t;
}

fn fill_scratchpad(scratchpad: &mut [u8], key: &[u8]) {
    let mut state = [0u8; SCRATCHPAD_STEP];
    let seed_len = key.len().min(SCRATCHPAD_STEP);
    state[..seed_len].copy_from_slice(&key[..seed_len]);

    for chunk in scratchpad.chunks_exact_mut(SCRATCHPAD_STEP) {
        sp_round(&mut state);
        chunk.copy_from_slice(&state);
    }
}

fn seed_registers(input: &[u8]) -> [u8; REGISTER_FILE_SIZE] {
    let mut registers = [0u8; REGISTER_FILE_SIZE];
    let len = input.len().min(REGISTER_FILE_SIZE);
    registers[..len].copy_from_slice(&input[..len]);
    registers
}

fn execute_program(scratchpad: &mut [u8], r: &mut [u8; REGISTER_FILE_SIZE]) {
    let addr_space = scratchpad.len() - WORD;

    for round in 0..VM_INSTRUCTIONS {
        let addr = (((r[0] as usize) << 8) | r[1] as usize) % addr_space;
        let mut word = [0u8; WORD];
        word.copy_from_slice(&scratchpad[addr..addr + WORD]);

        match round % 8 {
            // XOR into even registers 0..16
            0 => {
                for (i, b) in word.iter().enumerate() {
                    r[2 * i] ^= b;
                }
            }
            // ADD into odd registers 1..16
            1 => {
                for (i, b) in word.iter().enumerate() {
                    r[2 * i + 1] = r[2 * i + 1].wrapping_add(*b);
                }
            }
            // MUL, truncated to the low byte
            2 => {
                let value = u64::from_le_bytes(word);
                r[16] = value.wrapping_mul(r[0] as u64) as u8;
            }
            // ROTATE scratch bytes into 24..32
            3 => {
                let shift = (r[1] % 8) as u32;
                for (i, b) in word.iter().enumerate() {
                    r[24 + i] = b.rotate_left(shift);
                }
            }
            // SUB from 32..40
            4 => {
                for (i, b) in word.iter().enumerate() {
                    r[32 + i] = r[32 + i].wrapping_sub(*b);
                }
            }
            // SWAP
            5 => r.swap(40, 41),
            // AND into 48..56
            6 => {
                for (i, b) in word.iter().enumerate() {
                    r[48 + i] &= b;
                }
            }
            // OR into 56..64
            _ => {
                for (i, b) in word.iter().enumerate() {
                    r[56 + i] |= b;
                }
            }
        }

        let mask = r[round % REGISTER_FILE_SIZE];
        for byte in &mut scratchpad[addr..addr + WORD] {
            *byte ^= mask;
        }

        r[0] = r[1];
        r[1] = scratchpad[addr];
    }
}
